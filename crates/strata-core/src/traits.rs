//! Core traits shared by typed and runtime layouts.
//!
//! [`ResolvedLayout`] is the read-only view of a descriptor that the
//! diagnostics and padding machinery work against. [`PaddingHook`] is the
//! advisory interface to a memory-debugging subsystem.

use std::ops::Range;

use crate::diagnostics::{self, LayoutDisplay, PoisonConfig};
use crate::error::LayoutError;
use crate::offset;
use crate::spec::ElementSpec;

/// A layout whose known counts have been resolved into offsets.
///
/// Implementors guarantee `counts().len() <= specs().len()` and
/// `offsets().len() == min(specs().len(), counts().len() + 1)`.
pub trait ResolvedLayout {
    /// Specs of every array, resolvable or not.
    fn specs(&self) -> &[ElementSpec];

    /// Display name of array `index`'s element type.
    fn element_name(&self, index: usize) -> &str;

    /// The known counts, one per leading array.
    fn counts(&self) -> &[usize];

    /// Offsets of every array whose start is computable.
    fn offsets(&self) -> &[usize];

    /// Byte just past the last known-count array.
    fn extent(&self) -> usize;

    /// Alignment the backing buffer must have.
    fn alignment(&self) -> usize {
        crate::spec::max_align(self.specs())
    }

    /// Whether every count is known.
    fn is_full(&self) -> bool {
        self.counts().len() == self.specs().len()
    }

    /// Byte ranges of the alignment gaps between resolved arrays.
    fn padding(&self) -> Vec<Range<usize>> {
        offset::padding(self.specs(), self.counts(), self.offsets()).collect()
    }

    /// Renders `@offset<type>(size)[count]; ...` for every resolved array.
    fn display(&self) -> LayoutDisplay<'_, Self>
    where
        Self: Sized,
    {
        LayoutDisplay::new(self)
    }

    /// Shorthand for `self.display().to_string()`.
    fn debug_string(&self) -> String
    where
        Self: Sized,
    {
        self.display().to_string()
    }

    /// Hand every padding gap inside `buf` to `hook`.
    ///
    /// `buf` is the start of the backing buffer; it must cover the extent.
    fn poison_padding_with<H: PaddingHook>(
        &self,
        buf: &mut [u8],
        hook: &mut H,
    ) -> Result<(), LayoutError>
    where
        Self: Sized,
    {
        diagnostics::poison_with(self, buf, hook)
    }

    /// Fill padding with the configured byte when poisoning is enabled.
    fn poison_padding(&self, buf: &mut [u8], config: &PoisonConfig) -> Result<(), LayoutError>
    where
        Self: Sized,
    {
        diagnostics::poison(self, buf, config)
    }
}

/// Receives padding regions marked as forbidden to access.
///
/// `offset` is the gap's position from the buffer start.
pub trait PaddingHook {
    /// Mark `padding` as poisoned.
    fn poison(&mut self, offset: usize, padding: &mut [u8]);
}

impl<F: FnMut(usize, &mut [u8])> PaddingHook for F {
    fn poison(&mut self, offset: usize, padding: &mut [u8]) {
        self(offset, padding)
    }
}
