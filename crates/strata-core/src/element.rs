//! Element types: the per-array half of a typed element list.
//!
//! Any [`bytemuck::Pod`] type is an element type with its natural
//! alignment. [`Aligned<T, A>`] tags `T` with a stricter start alignment.
//! References are not `Pod`, so they can never name an array.

use std::any::type_name;
use std::convert::Infallible;
use std::marker::PhantomData;

use bytemuck::Pod;

use crate::spec::ElementSpec;

/// A type that can appear in a typed element list.
pub trait ElementType: 'static {
    /// The type stored in the array.
    type Elem: Pod + 'static;

    /// Size and alignment used for layout.
    const SPEC: ElementSpec;

    /// Short name of the stored type for diagnostics.
    fn type_name() -> &'static str {
        short_type_name::<Self::Elem>()
    }
}

impl<T: Pod> ElementType for T {
    type Elem = T;
    const SPEC: ElementSpec = ElementSpec::of::<T>();
}

/// Type-level tag: an array of `T` whose start is aligned to `A` bytes.
///
/// Never instantiated. `A` must be a power of two and at least
/// `align_of::<T>()`; a violation fails to compile as soon as a layout
/// using the tag is built.
///
/// ```
/// use strata_core::{Aligned, ElementType};
///
/// assert_eq!(<Aligned<i32, 32> as ElementType>::SPEC.align(), 32);
/// ```
///
/// A non-power-of-two override fails to build:
///
/// ```compile_fail
/// use strata_core::{Aligned, ElementSpec, ElementType};
///
/// const SPEC: ElementSpec = <Aligned<i32, 12> as ElementType>::SPEC;
/// assert_eq!(SPEC.align(), 12);
/// ```
///
/// So does one below the natural alignment:
///
/// ```compile_fail
/// use strata_core::{Aligned, ElementSpec, ElementType};
///
/// const SPEC: ElementSpec = <Aligned<u64, 4> as ElementType>::SPEC;
/// assert_eq!(SPEC.align(), 4);
/// ```
pub struct Aligned<T, const A: usize> {
    _never: Infallible,
    _elem: PhantomData<T>,
}

impl<T: Pod, const A: usize> ElementType for Aligned<T, A> {
    type Elem = T;
    const SPEC: ElementSpec = ElementSpec::of::<T>().with_override(A);
}

/// `std::any::type_name` with leading module paths removed.
///
/// `alloc::string::String` becomes `String`. Generic arguments, arrays and
/// tuples are kept as rendered.
pub fn short_type_name<T: ?Sized>() -> &'static str {
    let full = type_name::<T>();
    if full.starts_with(['[', '(']) {
        return full;
    }
    let head = full.find('<').unwrap_or(full.len());
    match full[..head].rfind("::") {
        Some(pos) => &full[pos + 2..],
        None => full,
    }
}
