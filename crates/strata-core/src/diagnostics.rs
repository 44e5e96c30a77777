//! Debug rendering and padding poisoning.
//!
//! Neither affects offsets, sizes, or pointers. The rendering is for
//! humans; its exact text is not a stable format.

use std::fmt;

use crate::error::LayoutError;
use crate::traits::{PaddingHook, ResolvedLayout};

/// `Display` adapter rendering a resolved layout.
///
/// Each resolved array renders as `@offset<type>(elem_size)`, followed by
/// `[count]` when its count is known, joined with `"; "`.
pub struct LayoutDisplay<'a, L: ?Sized> {
    layout: &'a L,
}

impl<'a, L: ResolvedLayout + ?Sized> LayoutDisplay<'a, L> {
    /// Wrap a layout for display.
    pub fn new(layout: &'a L) -> Self {
        Self { layout }
    }
}

impl<L: ResolvedLayout + ?Sized> fmt::Display for LayoutDisplay<'_, L> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let specs = self.layout.specs();
        let counts = self.layout.counts();
        for (i, &offset) in self.layout.offsets().iter().enumerate() {
            if i > 0 {
                f.write_str("; ")?;
            }
            write!(
                f,
                "@{offset}<{}>({})",
                self.layout.element_name(i),
                specs[i].size()
            )?;
            if let Some(count) = counts.get(i) {
                write!(f, "[{count}]")?;
            }
        }
        Ok(())
    }
}

/// Padding-poisoning settings.
///
/// Poisoning is a memory-debugging aid: padding bytes are overwritten with
/// a recognisable pattern so stray reads show up in dumps.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct PoisonConfig {
    /// Whether [`ResolvedLayout::poison_padding`] does anything.
    ///
    /// Default: on in debug builds, off in release builds.
    pub enabled: bool,

    /// Byte written over every padding gap.
    ///
    /// Default: `0xA5`.
    pub fill_byte: u8,
}

impl PoisonConfig {
    /// Default fill pattern.
    pub const DEFAULT_FILL_BYTE: u8 = 0xA5;

    /// Config with defaults for the current build profile.
    pub fn new() -> Self {
        Self {
            enabled: cfg!(debug_assertions),
            fill_byte: Self::DEFAULT_FILL_BYTE,
        }
    }

    /// Config that always poisons with `fill_byte`.
    pub fn always(fill_byte: u8) -> Self {
        Self {
            enabled: true,
            fill_byte,
        }
    }
}

impl Default for PoisonConfig {
    fn default() -> Self {
        Self::new()
    }
}

/// Hook that overwrites padding with a fixed byte.
#[derive(Clone, Copy, Debug)]
pub struct FillPadding(pub u8);

impl PaddingHook for FillPadding {
    fn poison(&mut self, _offset: usize, padding: &mut [u8]) {
        padding.fill(self.0);
    }
}

pub(crate) fn poison_with<L, H>(layout: &L, buf: &mut [u8], hook: &mut H) -> Result<(), LayoutError>
where
    L: ResolvedLayout + ?Sized,
    H: PaddingHook,
{
    let required = layout.offsets().last().copied().unwrap_or(0);
    if buf.len() < required {
        tracing::debug!(required, len = buf.len(), "buffer too small to poison padding");
        return Err(LayoutError::BufferTooSmall {
            required,
            len: buf.len(),
        });
    }
    for gap in layout.padding() {
        tracing::trace!(offset = gap.start, len = gap.len(), "poisoning padding");
        hook.poison(gap.start, &mut buf[gap]);
    }
    Ok(())
}

pub(crate) fn poison<L>(layout: &L, buf: &mut [u8], config: &PoisonConfig) -> Result<(), LayoutError>
where
    L: ResolvedLayout + ?Sized,
{
    if !config.enabled {
        return Ok(());
    }
    poison_with(layout, buf, &mut FillPadding(config.fill_byte))
}
