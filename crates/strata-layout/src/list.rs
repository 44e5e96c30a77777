//! Typed element lists.
//!
//! A tuple of [`ElementType`]s is an element list: `(u8, Aligned<i32, 32>, f64)`
//! describes three arrays. The traits here expose that tuple to the layout
//! machinery:
//!
//! - [`Elements`]: arity, specs, overall alignment, runtime type lookup.
//! - [`ElementAt<I>`]: the entry at position `I`, resolved at compile time.
//! - [`Resolve<K>`]: the pointer and slice tuples for a layout with `K`
//!   known counts. Implemented only for `K <= LEN`, so a layout with too many
//!   counts does not type-check.
//!
//! Lists of 1 to 12 arrays are supported.

#![allow(unsafe_code)]

use std::any::TypeId;
use std::fmt;

use strata_core::element::short_type_name;
use strata_core::{max_align, ElementSpec, ElementType};

use crate::raw;

/// An ordered, compile-time list of array element types.
pub trait Elements: 'static {
    /// Number of arrays.
    const LEN: usize;

    /// Spec of every array, in order.
    const SPECS: &'static [ElementSpec];

    /// Largest alignment over all arrays.
    const ALIGN: usize;

    /// Fixed-size offset storage, `[usize; LEN]`.
    type Offsets: Copy + fmt::Debug + AsRef<[usize]> + AsMut<[usize]>;

    /// All-zero offsets.
    const ZEROED: Self::Offsets;

    /// `TypeId` of the element type stored in array `index`.
    fn elem_type_id(index: usize) -> TypeId;

    /// Short name of the element type stored in array `index`.
    fn type_name(index: usize) -> &'static str;

    /// Position of the unique array storing `T`.
    ///
    /// # Panics
    ///
    /// Panics if no array, or more than one array, stores `T`.
    fn index_of<T: 'static>() -> usize {
        // `TypeId` can't be compared in const context on stable, so this is a
        // runtime scan; the list is at most 12 entries.
        let target = TypeId::of::<T>();
        let mut found = None;
        for index in 0..Self::LEN {
            if Self::elem_type_id(index) == target {
                assert!(
                    found.is_none(),
                    "element type {} appears more than once; look it up by position",
                    short_type_name::<T>()
                );
                found = Some(index);
            }
        }
        match found {
            Some(index) => index,
            None => panic!("element type {} is not in the list", short_type_name::<T>()),
        }
    }
}

/// The entry at position `I` of an element list.
pub trait ElementAt<const I: usize>: Elements {
    /// The entry as written in the tuple (possibly an `Aligned` tag).
    type Entry: ElementType;
}

/// Element type stored in array `I` of list `L`.
pub type ElemAt<L, const I: usize> = <<L as ElementAt<I>>::Entry as ElementType>::Elem;

/// Pointer and slice tuples for a layout of `L` with `K` known counts.
///
/// `Pointers` holds one pointer per array with a computable offset
/// (`min(LEN, K + 1)` of them); `Slices` holds one slice per known count.
pub trait Resolve<const K: usize>: Elements {
    /// Tuple of `*const` pointers, in array order.
    type Pointers: Copy;

    /// Tuple of `*mut` pointers, in array order.
    type PointersMut: Copy;

    /// Tuple of shared slices over the known-count arrays.
    type Slices<'a>;

    /// Tuple of exclusive slices over the known-count arrays.
    type SlicesMut<'a>;

    /// Pointers to every resolved array.
    fn pointers(base: *const u8, offsets: &[usize]) -> Self::Pointers;

    /// Mutable pointers to every resolved array.
    fn pointers_mut(base: *mut u8, offsets: &[usize]) -> Self::PointersMut;

    /// Slices over every known-count array.
    ///
    /// # Safety
    ///
    /// `base` must be aligned to [`Elements::ALIGN`] and valid for reads of
    /// the known extent, with those bytes initialised and not mutated for
    /// `'a`. `offsets` must come from resolving `counts`.
    unsafe fn slices<'a>(base: *const u8, offsets: &[usize], counts: &[usize; K]) -> Self::Slices<'a>;

    /// Exclusive slices over every known-count array.
    ///
    /// # Safety
    ///
    /// As [`Resolve::slices`], plus the known extent must not be accessed
    /// through any other pointer for `'a`.
    unsafe fn slices_mut<'a>(
        base: *mut u8,
        offsets: &[usize],
        counts: &[usize; K],
    ) -> Self::SlicesMut<'a>;
}

macro_rules! element_at {
    ([$($all:ident)+] ;) => {};
    ([$($all:ident)+] ; $idx:tt $t:ident $(, $ridx:tt $rt:ident)*) => {
        impl<$($all: ElementType),+> ElementAt<$idx> for ($($all,)+) {
            type Entry = $t;
        }
        element_at!([$($all)+] ; $($ridx $rt),*);
    };
}

macro_rules! resolve_impl {
    ([$($all:ident)+] $k:tt [$($ki:tt $kt:ident)*] [$($ni:tt $nt:ident)?]) => {
        impl<$($all: ElementType),+> Resolve<$k> for ($($all,)+) {
            type Pointers = (
                $(*const <$kt as ElementType>::Elem,)*
                $(*const <$nt as ElementType>::Elem,)?
            );
            type PointersMut = (
                $(*mut <$kt as ElementType>::Elem,)*
                $(*mut <$nt as ElementType>::Elem,)?
            );
            type Slices<'a> = ($(&'a [<$kt as ElementType>::Elem],)*);
            type SlicesMut<'a> = ($(&'a mut [<$kt as ElementType>::Elem],)*);

            fn pointers(base: *const u8, offsets: &[usize]) -> Self::Pointers {
                (
                    $(base.wrapping_add(offsets[$ki]).cast::<<$kt as ElementType>::Elem>(),)*
                    $(base.wrapping_add(offsets[$ni]).cast::<<$nt as ElementType>::Elem>(),)?
                )
            }

            fn pointers_mut(base: *mut u8, offsets: &[usize]) -> Self::PointersMut {
                (
                    $(base.wrapping_add(offsets[$ki]).cast::<<$kt as ElementType>::Elem>(),)*
                    $(base.wrapping_add(offsets[$ni]).cast::<<$nt as ElementType>::Elem>(),)?
                )
            }

            unsafe fn slices<'a>(
                base: *const u8,
                offsets: &[usize],
                counts: &[usize; $k],
            ) -> Self::Slices<'a> {
                let _ = (base, offsets, counts);
                (
                    // SAFETY: each array lies inside the known extent at an
                    // offset aligned for its element type.
                    $(unsafe { raw::view::<<$kt as ElementType>::Elem>(base, offsets[$ki], counts[$ki]) },)*
                )
            }

            unsafe fn slices_mut<'a>(
                base: *mut u8,
                offsets: &[usize],
                counts: &[usize; $k],
            ) -> Self::SlicesMut<'a> {
                let _ = (base, offsets, counts);
                (
                    // SAFETY: as above; the arrays' byte ranges are disjoint,
                    // so the exclusive views never alias.
                    $(unsafe { raw::view_mut::<<$kt as ElementType>::Elem>(base, offsets[$ki], counts[$ki]) },)*
                )
            }
        }
    };
}

macro_rules! resolve_prefixes {
    ([$($all:ident)+] [$($ki:tt $kt:ident)*] [] $len:tt) => {
        resolve_impl!([$($all)+] $len [$($ki $kt)*] []);
    };
    ([$($all:ident)+] [$($ki:tt $kt:ident)*] [$ni:tt $nt:ident $($ri:tt $rt:ident)*] $len:tt) => {
        resolve_impl!([$($all)+] $ni [$($ki $kt)*] [$ni $nt]);
        resolve_prefixes!([$($all)+] [$($ki $kt)* $ni $nt] [$($ri $rt)*] $len);
    };
}

macro_rules! element_list {
    ($len:tt => $($idx:tt $t:ident),+) => {
        impl<$($t: ElementType),+> Elements for ($($t,)+) {
            const LEN: usize = $len;
            const SPECS: &'static [ElementSpec] = &[$(<$t as ElementType>::SPEC),+];
            const ALIGN: usize = max_align(Self::SPECS);
            type Offsets = [usize; $len];
            const ZEROED: [usize; $len] = [0; $len];

            fn elem_type_id(index: usize) -> TypeId {
                match index {
                    $($idx => TypeId::of::<<$t as ElementType>::Elem>(),)+
                    _ => panic!("array index {index} out of range for {} arrays", $len),
                }
            }

            fn type_name(index: usize) -> &'static str {
                match index {
                    $($idx => <$t as ElementType>::type_name(),)+
                    _ => panic!("array index {index} out of range for {} arrays", $len),
                }
            }
        }

        element_at!([$($t)+] ; $($idx $t),+);
        resolve_prefixes!([$($t)+] [] [$($idx $t)+] $len);
    };
}

element_list!(1 => 0 T0);
element_list!(2 => 0 T0, 1 T1);
element_list!(3 => 0 T0, 1 T1, 2 T2);
element_list!(4 => 0 T0, 1 T1, 2 T2, 3 T3);
element_list!(5 => 0 T0, 1 T1, 2 T2, 3 T3, 4 T4);
element_list!(6 => 0 T0, 1 T1, 2 T2, 3 T3, 4 T4, 5 T5);
element_list!(7 => 0 T0, 1 T1, 2 T2, 3 T3, 4 T4, 5 T5, 6 T6);
element_list!(8 => 0 T0, 1 T1, 2 T2, 3 T3, 4 T4, 5 T5, 6 T6, 7 T7);
element_list!(9 => 0 T0, 1 T1, 2 T2, 3 T3, 4 T4, 5 T5, 6 T6, 7 T7, 8 T8);
element_list!(10 => 0 T0, 1 T1, 2 T2, 3 T3, 4 T4, 5 T5, 6 T6, 7 T7, 8 T8, 9 T9);
element_list!(11 => 0 T0, 1 T1, 2 T2, 3 T3, 4 T4, 5 T5, 6 T6, 7 T7, 8 T8, 9 T9, 10 T10);
element_list!(12 => 0 T0, 1 T1, 2 T2, 3 T3, 4 T4, 5 T5, 6 T6, 7 T7, 8 T8, 9 T9, 10 T10, 11 T11);

#[cfg(test)]
mod tests {
    use super::*;
    use strata_core::Aligned;

    type CharIntDouble = (u8, i32, f64);
    type Overridden = (u8, Aligned<i32, 32>, f64);

    #[test]
    fn arity_and_specs() {
        assert_eq!(<CharIntDouble as Elements>::LEN, 3);
        assert_eq!(<CharIntDouble as Elements>::SPECS[1], ElementSpec::of::<i32>());
        assert_eq!(<CharIntDouble as Elements>::ALIGN, std::mem::align_of::<f64>());
    }

    #[test]
    fn override_raises_list_alignment() {
        assert_eq!(<Overridden as Elements>::ALIGN, 32);
        assert_eq!(<Overridden as Elements>::SPECS[1].align(), 32);
    }

    #[test]
    fn entries_resolve_by_position() {
        fn same<A: 'static, B: 'static>() -> bool {
            TypeId::of::<A>() == TypeId::of::<B>()
        }
        assert!(same::<ElemAt<Overridden, 0>, u8>());
        assert!(same::<ElemAt<Overridden, 1>, i32>());
        assert!(same::<ElemAt<Overridden, 2>, f64>());
    }

    #[test]
    fn lookup_by_type_sees_through_alignment_tags() {
        assert_eq!(<Overridden as Elements>::index_of::<i32>(), 1);
        assert_eq!(<Overridden as Elements>::index_of::<f64>(), 2);
    }

    #[test]
    #[should_panic(expected = "appears more than once")]
    fn lookup_of_repeated_type_panics() {
        <(usize, usize, f32) as Elements>::index_of::<usize>();
    }

    #[test]
    #[should_panic(expected = "not in the list")]
    fn lookup_of_absent_type_panics() {
        <CharIntDouble as Elements>::index_of::<u16>();
    }

    #[test]
    fn repeated_types_still_resolve_by_position() {
        type Header = (usize, usize, f32);
        assert_eq!(<Header as Elements>::type_name(0), "usize");
        assert_eq!(<Header as Elements>::type_name(1), "usize");
        assert_eq!(<Header as Elements>::type_name(2), "f32");
    }

    #[test]
    fn twelve_arrays_are_supported() {
        type Wide = (u8, u16, u32, u64, i8, i16, i32, i64, f32, f64, u8, u8);
        assert_eq!(<Wide as Elements>::LEN, 12);
        assert_eq!(<Wide as Elements>::type_name(11), "u8");
    }
}
