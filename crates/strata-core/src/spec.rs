//! Element specs and alignment arithmetic.
//!
//! An [`ElementSpec`] is the `(size, alignment)` pair the offset math works
//! on. Everything here is `const fn` so typed element lists can fold their
//! specs and overall alignment at compile time.

use std::fmt;

use crate::error::{AlignmentError, LayoutError};

/// Size and alignment of one array's element type.
///
/// The effective alignment is the override when one is present, otherwise
/// the natural alignment. An override is always a power of two and never
/// weaker than the natural alignment.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct ElementSpec {
    size: usize,
    natural_align: usize,
    align_override: Option<usize>,
}

impl ElementSpec {
    /// Spec for the Rust type `T` with its natural alignment.
    ///
    /// # Panics
    ///
    /// Panics if `T` is zero-sized. In a `const` context this is a
    /// compile-time error.
    pub const fn of<T>() -> Self {
        let size = std::mem::size_of::<T>();
        assert!(size > 0, "zero-sized element types are not supported");
        Self {
            size,
            natural_align: std::mem::align_of::<T>(),
            align_override: None,
        }
    }

    /// Spec from a raw size and natural alignment.
    pub const fn try_new(size: usize, natural_align: usize) -> Result<Self, LayoutError> {
        if size == 0 {
            return Err(LayoutError::ZeroSizedElement);
        }
        if !natural_align.is_power_of_two() {
            return Err(LayoutError::Alignment(AlignmentError::NotPowerOfTwo {
                requested: natural_align,
            }));
        }
        Ok(Self {
            size,
            natural_align,
            align_override: None,
        })
    }

    /// The same element with its start aligned to `align` bytes.
    ///
    /// # Panics
    ///
    /// Panics if `align` is not a power of two or is lower than the natural
    /// alignment. In a `const` context this is a compile-time error.
    pub const fn with_override(self, align: usize) -> Self {
        match check_override(self.natural_align, align) {
            Ok(()) => {}
            Err(AlignmentError::NotPowerOfTwo { .. }) => {
                panic!("alignment override must be a power of two")
            }
            Err(AlignmentError::BelowNatural { .. }) => {
                panic!("alignment override can't be lower than the type's alignment")
            }
        }
        Self {
            align_override: Some(align),
            ..self
        }
    }

    /// Fallible form of [`ElementSpec::with_override`].
    pub const fn try_with_override(self, align: usize) -> Result<Self, AlignmentError> {
        match check_override(self.natural_align, align) {
            Ok(()) => Ok(Self {
                align_override: Some(align),
                ..self
            }),
            Err(err) => Err(err),
        }
    }

    /// Size of one element in bytes.
    pub const fn size(&self) -> usize {
        self.size
    }

    /// The element type's own alignment.
    pub const fn natural_align(&self) -> usize {
        self.natural_align
    }

    /// The explicit alignment override, if any.
    pub const fn align_override(&self) -> Option<usize> {
        self.align_override
    }

    /// Alignment the array start is placed at.
    pub const fn align(&self) -> usize {
        match self.align_override {
            Some(align) => align,
            None => self.natural_align,
        }
    }

    /// Byte size of an array of `count` elements, or `None` on overflow.
    pub const fn array_bytes(&self, count: usize) -> Option<usize> {
        self.size.checked_mul(count)
    }
}

impl fmt::Display for ElementSpec {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.align_override {
            Some(align) => write!(f, "({}, align {align})", self.size),
            None => write!(f, "({}, align {})", self.size, self.natural_align),
        }
    }
}

/// Validate an alignment override against a natural alignment.
pub const fn check_override(natural: usize, requested: usize) -> Result<(), AlignmentError> {
    if !requested.is_power_of_two() {
        return Err(AlignmentError::NotPowerOfTwo { requested });
    }
    if requested < natural {
        return Err(AlignmentError::BelowNatural { requested, natural });
    }
    Ok(())
}

/// Round `n` up to the next multiple of `align` (a power of two).
///
/// Wraps on overflow; use [`checked_align_up`] for untrusted input.
pub const fn align_up(n: usize, align: usize) -> usize {
    debug_assert!(align.is_power_of_two());
    n.wrapping_add(align - 1) & !(align - 1)
}

/// Round `n` up to the next multiple of `align`, or `None` on overflow.
pub const fn checked_align_up(n: usize, align: usize) -> Option<usize> {
    debug_assert!(align.is_power_of_two());
    match n.checked_add(align - 1) {
        Some(bumped) => Some(bumped & !(align - 1)),
        None => None,
    }
}

/// Largest effective alignment in `specs`, or 1 for an empty slice.
pub const fn max_align(specs: &[ElementSpec]) -> usize {
    let mut max = 1;
    let mut i = 0;
    while i < specs.len() {
        let align = specs[i].align();
        if align > max {
            max = align;
        }
        i += 1;
    }
    max
}
