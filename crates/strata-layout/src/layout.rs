//! Typed layout descriptors.
//!
//! A [`Layout<L, K>`] pairs an element list `L` (a tuple of element types)
//! with the counts of its first `K` arrays. `K < L::LEN` is a partial
//! layout; `K == L::LEN` is a full one and additionally knows its
//! allocation size.
//!
//! ```text
//!  offset 0                    4                 16
//!  +-------------+-----+-------+--------+--------+-----------------------+
//!  | u8 u8 u8    | pad | i32 i32        |  pad   | f64 f64 f64 f64       |
//!  +-------------+-----+----------------+--------+-----------------------+
//!                                                                        48
//!  Layout<(u8, i32, f64), 3>::new([3, 2, 4])
//! ```
//!
//! Indices given as const generics are range-checked at compile time:
//! asking for the offset of an array whose predecessor has no count, or for
//! the allocation size of a partial layout, fails to build.
//!
//! # Partial then full
//!
//! A record can store its own lengths in small leading arrays. A reader
//! builds a partial layout covering the header, reads the lengths, and
//! refines it into the full layout:
//!
//! ```
//! use strata_layout::Layout;
//!
//! type Record = (usize, usize, f32, f64);
//!
//! let full = Layout::<Record, 4>::new([1, 1, 3, 4]);
//! let mut storage = vec![0u64; full.alloc_size().div_ceil(8)];
//! let buf: &mut [u8] = bytemuck::cast_slice_mut(&mut storage);
//!
//! let (num_floats, num_doubles, floats, doubles) = full.slices_in_mut(buf).unwrap();
//! num_floats[0] = 3;
//! num_doubles[0] = 4;
//! floats.copy_from_slice(&[1.1, 2.2, 3.3]);
//! doubles.copy_from_slice(&[4.4, 5.5, 6.6, 7.7]);
//!
//! let header = Layout::<Record, 2>::new([1, 1]);
//! let (nf, nd) = header.slices_in(buf).unwrap();
//! let read = header.refine::<4>(&[nf[0], nd[0]]);
//! assert_eq!(read, full);
//! assert_eq!(read.slice_in::<3>(buf).unwrap(), &[4.4, 5.5, 6.6, 7.7]);
//! ```
//!
//! # Compile-time checks
//!
//! A partial layout has no allocation size:
//!
//! ```compile_fail
//! use strata_layout::Layout;
//!
//! let partial = Layout::<(u8, i32, f64), 2>::new([1, 2]);
//! let _ = partial.alloc_size();
//! ```
//!
//! With no counts known only the first offset resolves:
//!
//! ```compile_fail
//! use strata_layout::Layout;
//!
//! let empty = Layout::<(u8, i32, f64), 0>::new([]);
//! let _ = empty.offset::<1>();
//! ```
//!
//! Pointers follow the same rule:
//!
//! ```compile_fail
//! use strata_layout::Layout;
//!
//! let header = Layout::<(u8, i32, f64), 1>::new([3]);
//! let _ = header.pointer::<2>(std::ptr::null());
//! ```
//!
//! More counts than arrays:
//!
//! ```compile_fail
//! use strata_layout::Layout;
//!
//! let _ = Layout::<(u8, i32), 3>::new([1, 2, 3]);
//! ```
//!
//! An alignment override that is not a power of two:
//!
//! ```compile_fail
//! use strata_core::Aligned;
//! use strata_layout::Layout;
//!
//! let _ = Layout::<(u8, Aligned<i32, 12>, f64), 3>::new([3, 2, 4]);
//! ```
//!
//! An override weaker than the type's own alignment:
//!
//! ```compile_fail
//! use strata_core::Aligned;
//! use strata_layout::Layout;
//!
//! let _ = Layout::<(u8, Aligned<u64, 4>), 2>::new([1, 1]);
//! ```

#![allow(unsafe_code)]

use std::alloc;
use std::fmt;
use std::hash::{Hash, Hasher};
use std::marker::PhantomData;

use strata_core::offset::{self, resolvable};
use strata_core::{ElementSpec, LayoutError, ResolvedLayout};

use crate::list::{ElemAt, ElementAt, Elements, Resolve};
use crate::raw;

/// Offsets, sizes, and pointers for the arrays of element list `L` with
/// `K` known counts.
///
/// Immutable and `Copy`; refining it produces a new value.
pub struct Layout<L: Elements, const K: usize> {
    counts: [usize; K],
    offsets: L::Offsets,
    extent: usize,
    _list: PhantomData<fn() -> L>,
}

impl<L: Resolve<K>, const K: usize> Layout<L, K> {
    /// Number of arrays in the element list.
    pub const NUM_TYPES: usize = L::LEN;

    /// Number of known counts.
    pub const NUM_COUNTS: usize = K;

    /// Number of arrays whose offset is computable.
    pub const NUM_OFFSETS: usize = resolvable(L::LEN, K);

    /// Build a layout from the counts of the first `K` arrays.
    ///
    /// # Panics
    ///
    /// Panics if an array's byte size or offset overflows `usize`. Use
    /// [`Layout::try_new`] for counts from untrusted input.
    pub fn new(counts: [usize; K]) -> Self {
        match Self::try_new(counts) {
            Ok(layout) => layout,
            Err(err) => panic!("{err}"),
        }
    }

    /// Build a layout, reporting arithmetic overflow as an error.
    pub fn try_new(counts: [usize; K]) -> Result<Self, LayoutError> {
        // Evaluating the alignment validates every spec in the list.
        let _ = const { L::ALIGN };
        let mut offsets = L::ZEROED;
        let extent = offset::resolve_offsets(
            L::SPECS,
            &counts,
            &mut offsets.as_mut()[..Self::NUM_OFFSETS],
        )
        .inspect_err(|err| tracing::debug!(%err, ?counts, "rejected layout counts"))?;
        Ok(Self {
            counts,
            offsets,
            extent,
            _list: PhantomData,
        })
    }

    /// Alignment the backing buffer must have: the largest alignment of any
    /// array.
    pub const fn alignment() -> usize {
        L::ALIGN
    }

    /// Whether every count is known.
    pub const fn is_full(&self) -> bool {
        K == L::LEN
    }

    /// Byte offset of array `I`.
    pub fn offset<const I: usize>(&self) -> usize
    where
        L: ElementAt<I>,
    {
        const { assert!(I <= K, "offset unknown: a preceding array has no count") };
        self.offsets.as_ref()[I]
    }

    /// Byte offset of array `index`.
    ///
    /// # Panics
    ///
    /// Panics if `index >= NUM_OFFSETS`.
    pub fn offset_at(&self, index: usize) -> usize {
        assert!(
            index < Self::NUM_OFFSETS,
            "offset of array {index} unknown: only {} offsets resolve with {K} counts",
            Self::NUM_OFFSETS
        );
        self.offsets.as_ref()[index]
    }

    /// Byte offset of the unique array storing `T`.
    ///
    /// # Panics
    ///
    /// Panics if `T` is absent, repeated, or its offset is unknown.
    pub fn offset_of<T: 'static>(&self) -> usize {
        self.offset_at(L::index_of::<T>())
    }

    /// Offsets of every resolved array.
    pub fn offsets(&self) -> &[usize] {
        &self.offsets.as_ref()[..Self::NUM_OFFSETS]
    }

    /// Element count of array `I`.
    pub fn count<const I: usize>(&self) -> usize
    where
        L: ElementAt<I>,
    {
        const { assert!(I < K, "count unknown for this array") };
        self.counts[I]
    }

    /// Element count of array `index`.
    ///
    /// # Panics
    ///
    /// Panics if `index >= K`.
    pub fn count_at(&self, index: usize) -> usize {
        assert!(index < K, "count of array {index} unknown: only {K} counts known");
        self.counts[index]
    }

    /// Element count of the unique array storing `T`.
    pub fn count_of<T: 'static>(&self) -> usize {
        self.count_at(L::index_of::<T>())
    }

    /// The known counts.
    pub fn counts(&self) -> &[usize; K] {
        &self.counts
    }

    /// Byte just past the last known-count array (0 when `K == 0`).
    pub fn extent(&self) -> usize {
        self.extent
    }

    /// Bytes needed to hold every array.
    ///
    /// Only available on full layouts; a partial layout fails to build.
    pub fn alloc_size(&self) -> usize {
        const {
            assert!(
                K == L::LEN,
                "every count must be known to compute the allocation size"
            )
        };
        self.extent
    }

    /// Allocation request for a buffer holding every array.
    pub fn alloc_layout(&self) -> Result<alloc::Layout, LayoutError> {
        alloc::Layout::from_size_align(self.alloc_size(), L::ALIGN).map_err(|_| {
            LayoutError::Overflow {
                index: L::LEN - 1,
                count: self.counts.last().copied().unwrap_or(0),
            }
        })
    }

    /// Pointer to the start of array `I`.
    ///
    /// Computing the pointer is always safe; dereferencing it requires
    /// `base` to point at a live buffer aligned to [`Layout::alignment`]
    /// that covers the array. Alignment is asserted in debug builds.
    pub fn pointer<const I: usize>(&self, base: *const u8) -> *const ElemAt<L, I>
    where
        L: ElementAt<I>,
    {
        raw::debug_assert_aligned(base, L::ALIGN);
        base.wrapping_add(self.offset::<I>()).cast()
    }

    /// Mutable pointer to the start of array `I`.
    pub fn pointer_mut<const I: usize>(&self, base: *mut u8) -> *mut ElemAt<L, I>
    where
        L: ElementAt<I>,
    {
        raw::debug_assert_aligned(base, L::ALIGN);
        base.wrapping_add(self.offset::<I>()).cast()
    }

    /// Pointer to the start of the unique array storing `T`.
    pub fn pointer_of<T: 'static>(&self, base: *const u8) -> *const T {
        raw::debug_assert_aligned(base, L::ALIGN);
        base.wrapping_add(self.offset_of::<T>()).cast()
    }

    /// Mutable pointer to the start of the unique array storing `T`.
    pub fn pointer_of_mut<T: 'static>(&self, base: *mut u8) -> *mut T {
        raw::debug_assert_aligned(base, L::ALIGN);
        base.wrapping_add(self.offset_of::<T>()).cast()
    }

    /// Pointers to every resolved array, as a tuple in array order.
    pub fn pointers(&self, base: *const u8) -> <L as Resolve<K>>::Pointers {
        raw::debug_assert_aligned(base, L::ALIGN);
        L::pointers(base, self.offsets())
    }

    /// Mutable pointers to every resolved array.
    pub fn pointers_mut(&self, base: *mut u8) -> <L as Resolve<K>>::PointersMut {
        raw::debug_assert_aligned(base, L::ALIGN);
        L::pointers_mut(base, self.offsets())
    }

    /// View of array `I`.
    ///
    /// # Safety
    ///
    /// `base` must be aligned to [`Layout::alignment`] and valid for reads
    /// of [`Layout::extent`] initialised bytes, which must not be mutated
    /// for `'a`.
    pub unsafe fn slice<'a, const I: usize>(&self, base: *const u8) -> &'a [ElemAt<L, I>]
    where
        L: ElementAt<I>,
    {
        const { assert!(I < K, "count unknown for this array") };
        raw::debug_assert_aligned(base, L::ALIGN);
        // SAFETY: forwarded to the caller.
        unsafe { raw::view(base, self.offsets.as_ref()[I], self.counts[I]) }
    }

    /// Exclusive view of array `I`.
    ///
    /// # Safety
    ///
    /// As [`Layout::slice`], plus the array's bytes must not be accessed
    /// through any other pointer for `'a`.
    pub unsafe fn slice_mut<'a, const I: usize>(&self, base: *mut u8) -> &'a mut [ElemAt<L, I>]
    where
        L: ElementAt<I>,
    {
        const { assert!(I < K, "count unknown for this array") };
        raw::debug_assert_aligned(base, L::ALIGN);
        // SAFETY: forwarded to the caller.
        unsafe { raw::view_mut(base, self.offsets.as_ref()[I], self.counts[I]) }
    }

    /// View of the unique array storing `T`.
    ///
    /// # Safety
    ///
    /// As [`Layout::slice`].
    pub unsafe fn slice_of<'a, T: 'static>(&self, base: *const u8) -> &'a [T] {
        let index = L::index_of::<T>();
        let count = self.count_at(index);
        raw::debug_assert_aligned(base, L::ALIGN);
        // SAFETY: `index_of` matched `T` by `TypeId`, so the array holds `T`s;
        // the rest is forwarded to the caller.
        unsafe { raw::view(base, self.offsets.as_ref()[index], count) }
    }

    /// Exclusive view of the unique array storing `T`.
    ///
    /// # Safety
    ///
    /// As [`Layout::slice_mut`].
    pub unsafe fn slice_of_mut<'a, T: 'static>(&self, base: *mut u8) -> &'a mut [T] {
        let index = L::index_of::<T>();
        let count = self.count_at(index);
        raw::debug_assert_aligned(base, L::ALIGN);
        // SAFETY: as in `slice_of`.
        unsafe { raw::view_mut(base, self.offsets.as_ref()[index], count) }
    }

    /// Views of every known-count array, as a tuple in array order.
    ///
    /// # Safety
    ///
    /// As [`Layout::slice`].
    pub unsafe fn slices<'a>(&self, base: *const u8) -> <L as Resolve<K>>::Slices<'a> {
        raw::debug_assert_aligned(base, L::ALIGN);
        // SAFETY: forwarded to the caller; offsets were resolved from counts.
        unsafe { L::slices(base, self.offsets(), &self.counts) }
    }

    /// Exclusive views of every known-count array.
    ///
    /// # Safety
    ///
    /// As [`Layout::slice_mut`], for the whole known extent.
    pub unsafe fn slices_mut<'a>(&self, base: *mut u8) -> <L as Resolve<K>>::SlicesMut<'a> {
        raw::debug_assert_aligned(base, L::ALIGN);
        // SAFETY: forwarded to the caller; offsets were resolved from counts.
        unsafe { L::slices_mut(base, self.offsets(), &self.counts) }
    }

    /// Checked view of array `I` inside `buf`.
    ///
    /// Fails if `buf` is misaligned or ends before the array does.
    pub fn slice_in<'a, const I: usize>(&self, buf: &'a [u8]) -> Result<&'a [ElemAt<L, I>], LayoutError>
    where
        L: ElementAt<I>,
    {
        let range = self.array_range::<I>();
        raw::check_buffer(buf.as_ptr(), buf.len(), L::ALIGN, range.end)?;
        Ok(bytemuck::cast_slice(&buf[range]))
    }

    /// Checked exclusive view of array `I` inside `buf`.
    pub fn slice_in_mut<'a, const I: usize>(
        &self,
        buf: &'a mut [u8],
    ) -> Result<&'a mut [ElemAt<L, I>], LayoutError>
    where
        L: ElementAt<I>,
    {
        let range = self.array_range::<I>();
        raw::check_buffer(buf.as_ptr(), buf.len(), L::ALIGN, range.end)?;
        Ok(bytemuck::cast_slice_mut(&mut buf[range]))
    }

    /// Checked views of every known-count array inside `buf`.
    pub fn slices_in<'a>(&self, buf: &'a [u8]) -> Result<<L as Resolve<K>>::Slices<'a>, LayoutError> {
        raw::check_buffer(buf.as_ptr(), buf.len(), L::ALIGN, self.extent)?;
        // SAFETY: `buf` is aligned, covers the known extent, and is borrowed
        // for `'a`; element types are `Pod`, so any initialised bytes are
        // valid values.
        Ok(unsafe { L::slices(buf.as_ptr(), self.offsets(), &self.counts) })
    }

    /// Checked exclusive views of every known-count array inside `buf`.
    pub fn slices_in_mut<'a>(
        &self,
        buf: &'a mut [u8],
    ) -> Result<<L as Resolve<K>>::SlicesMut<'a>, LayoutError> {
        raw::check_buffer(buf.as_ptr(), buf.len(), L::ALIGN, self.extent)?;
        // SAFETY: as in `slices_in`, and `buf` is exclusively borrowed for
        // `'a`; the arrays' byte ranges are disjoint.
        Ok(unsafe { L::slices_mut(buf.as_mut_ptr(), self.offsets(), &self.counts) })
    }

    /// Append counts for the next `K2 - K` arrays.
    ///
    /// Offsets already resolved are unchanged in the result.
    ///
    /// # Panics
    ///
    /// Panics if `more.len() != K2 - K` or on arithmetic overflow.
    pub fn refine<const K2: usize>(&self, more: &[usize]) -> Layout<L, K2>
    where
        L: Resolve<K2>,
    {
        match self.try_refine(more) {
            Ok(layout) => layout,
            Err(err) => panic!("{err}"),
        }
    }

    /// Append counts, reporting arithmetic overflow as an error.
    ///
    /// # Panics
    ///
    /// Panics if `more.len() != K2 - K`.
    pub fn try_refine<const K2: usize>(&self, more: &[usize]) -> Result<Layout<L, K2>, LayoutError>
    where
        L: Resolve<K2>,
    {
        const { assert!(K2 >= K, "refining can't drop known counts") };
        assert_eq!(
            K + more.len(),
            K2,
            "refining {K} known counts to {K2} needs {} more, got {}",
            K2 - K,
            more.len()
        );
        let mut counts = [0; K2];
        counts[..K].copy_from_slice(&self.counts);
        counts[K..].copy_from_slice(more);
        Layout::try_new(counts)
    }

    fn array_range<const I: usize>(&self) -> std::ops::Range<usize>
    where
        L: ElementAt<I>,
    {
        const { assert!(I < K, "count unknown for this array") };
        let start = self.offsets.as_ref()[I];
        start..start + L::SPECS[I].size() * self.counts[I]
    }
}

impl<L: Resolve<K>, const K: usize> ResolvedLayout for Layout<L, K> {
    fn specs(&self) -> &[ElementSpec] {
        L::SPECS
    }

    fn element_name(&self, index: usize) -> &str {
        L::type_name(index)
    }

    fn counts(&self) -> &[usize] {
        &self.counts
    }

    fn offsets(&self) -> &[usize] {
        &self.offsets.as_ref()[..Self::NUM_OFFSETS]
    }

    fn extent(&self) -> usize {
        self.extent
    }

    fn alignment(&self) -> usize {
        L::ALIGN
    }
}

impl<L: Elements, const K: usize> Clone for Layout<L, K> {
    fn clone(&self) -> Self {
        *self
    }
}

impl<L: Elements, const K: usize> Copy for Layout<L, K> {}

impl<L: Elements, const K: usize> PartialEq for Layout<L, K> {
    fn eq(&self, other: &Self) -> bool {
        self.counts == other.counts
    }
}

impl<L: Elements, const K: usize> Eq for Layout<L, K> {}

impl<L: Elements, const K: usize> Hash for Layout<L, K> {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.counts.hash(state);
    }
}

impl<L: Elements, const K: usize> fmt::Debug for Layout<L, K> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Layout")
            .field("counts", &self.counts)
            .field("offsets", &self.offsets)
            .field("extent", &self.extent)
            .finish()
    }
}

impl<L: Resolve<K>, const K: usize> fmt::Display for Layout<L, K> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Display::fmt(&ResolvedLayout::display(self), f)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use strata_core::{Aligned, PoisonConfig};
    use strata_test_utils::fixtures::{CharIntDouble, CharWideIntDouble, CompactRecord as Record};
    use strata_test_utils::{AlignedBuf, RecordingHook};

    #[test]
    fn char_int_double_offsets() {
        let layout = Layout::<CharIntDouble, 3>::new([3, 2, 4]);
        assert_eq!(Layout::<CharIntDouble, 3>::alignment(), 8);
        assert_eq!(layout.offset::<0>(), 0);
        assert_eq!(layout.offset::<1>(), 4);
        assert_eq!(layout.offset::<2>(), 16);
        assert_eq!(layout.offset_of::<u8>(), 0);
        assert_eq!(layout.offset_of::<i32>(), 4);
        assert_eq!(layout.offset_of::<f64>(), 16);
        assert_eq!(layout.alloc_size(), 48);
    }

    #[test]
    fn custom_alignment_offsets() {
        let layout = Layout::<CharWideIntDouble, 3>::new([3, 2, 4]);
        assert_eq!(Layout::<CharWideIntDouble, 3>::alignment(), 32);
        assert_eq!(layout.offsets(), &[0, 32, 40]);
        assert_eq!(layout.offset_of::<i32>(), 32);
        assert_eq!(layout.alloc_size(), 72);
    }

    #[test]
    fn partial_layout_resolves_one_past_known_counts() {
        type L = (f64, f32, i32, u8);
        let layout = Layout::<L, 2>::new([4, 3]);
        assert_eq!(Layout::<L, 2>::NUM_TYPES, 4);
        assert_eq!(Layout::<L, 2>::NUM_COUNTS, 2);
        assert_eq!(Layout::<L, 2>::NUM_OFFSETS, 3);
        assert_eq!(layout.offsets(), &[0, 32, 44]);
        assert_eq!(layout.extent(), 44);
        assert!(!layout.is_full());
    }

    #[test]
    fn full_layout_of_four_arrays() {
        type L = (f64, f32, i32, u8);
        let layout = Layout::<L, 4>::new([4, 3, 2, 1]);
        assert_eq!(layout.offsets(), &[0, 32, 44, 52]);
        assert_eq!(layout.alloc_size(), 53);
        assert!(layout.is_full());
    }

    #[test]
    fn zero_counts_resolve_first_offset_only() {
        let layout = Layout::<CharIntDouble, 0>::new([]);
        assert_eq!(layout.offsets(), &[0]);
        assert_eq!(layout.offset::<0>(), 0);
        assert_eq!(layout.extent(), 0);
    }

    #[test]
    fn counts_by_position_and_type() {
        let layout = Layout::<CharIntDouble, 2>::new([3, 2]);
        assert_eq!(layout.count::<0>(), 3);
        assert_eq!(layout.count_at(1), 2);
        assert_eq!(layout.count_of::<i32>(), 2);
        assert_eq!(layout.counts(), &[3, 2]);
    }

    #[test]
    #[should_panic(expected = "offset of array 2 unknown")]
    fn runtime_offset_past_resolved_panics() {
        let layout = Layout::<(u8, u16, u32, u64), 1>::new([5]);
        layout.offset_at(2);
    }

    #[test]
    #[should_panic(expected = "count of array 1 unknown")]
    fn runtime_count_past_known_panics() {
        let layout = Layout::<CharIntDouble, 1>::new([5]);
        layout.count_at(1);
    }

    #[test]
    #[should_panic(expected = "appears more than once")]
    fn type_lookup_on_repeated_type_panics() {
        let layout = Layout::<Record, 4>::new([1, 1, 3, 4]);
        layout.offset_of::<usize>();
    }

    #[test]
    fn overflowing_counts_are_rejected() {
        let err = Layout::<CharIntDouble, 2>::try_new([1, usize::MAX]).unwrap_err();
        assert_eq!(
            err,
            LayoutError::Overflow {
                index: 1,
                count: usize::MAX
            }
        );
    }

    #[test]
    #[should_panic(expected = "overflows")]
    fn new_panics_on_overflow() {
        let _ = Layout::<CharIntDouble, 1>::new([usize::MAX]);
    }

    #[cfg(debug_assertions)]
    #[test]
    #[should_panic(expected = "not aligned")]
    fn pointer_into_misaligned_buffer_asserts() {
        let layout = Layout::<CharIntDouble, 3>::new([3, 2, 4]);
        let buf = AlignedBuf::offset_from_boundary(8, 64, 4);
        layout.pointer::<1>(buf.as_ptr());
    }

    #[cfg(debug_assertions)]
    #[test]
    #[should_panic(expected = "not aligned")]
    fn slices_over_misaligned_buffer_assert() {
        let layout = Layout::<CharIntDouble, 3>::new([3, 2, 4]);
        let buf = AlignedBuf::offset_from_boundary(8, 64, 4);
        // SAFETY: the alignment assertion fires before any slice is formed;
        // the buffer covers the extent either way.
        let _ = unsafe { layout.slices(buf.as_ptr()) };
    }

    #[test]
    fn pointers_match_offsets() {
        let layout = Layout::<CharIntDouble, 3>::new([3, 2, 4]);
        let buf = AlignedBuf::zeroed(8, layout.alloc_size());
        let base = buf.as_ptr();
        let (c, i, d) = layout.pointers(base);
        assert_eq!(c as usize, base as usize);
        assert_eq!(i as usize, base as usize + 4);
        assert_eq!(d as usize, base as usize + 16);
        assert_eq!(layout.pointer::<1>(base), i);
        assert_eq!(layout.pointer_of::<f64>(base), d);
    }

    #[test]
    fn partial_pointers_include_the_open_array() {
        let layout = Layout::<CharIntDouble, 1>::new([3]);
        let buf = AlignedBuf::zeroed(8, 16);
        let base = buf.as_ptr();
        let (c, i) = layout.pointers(base);
        assert_eq!(c as usize, base as usize);
        assert_eq!(i as usize, base as usize + 4);
    }

    #[test]
    fn writes_through_pointers_read_back_through_slices() {
        let layout = Layout::<CharIntDouble, 3>::new([3, 2, 4]);
        let mut buf = AlignedBuf::zeroed(8, layout.alloc_size());
        let (c, i, d) = layout.pointers_mut(buf.as_mut_ptr());
        // SAFETY: the buffer is aligned, sized by alloc_size, and each
        // write stays within its array.
        unsafe {
            for k in 0..3 {
                c.add(k).write(b'a' + k as u8);
            }
            i.write(7);
            i.add(1).write(-7);
            for k in 0..4 {
                d.add(k).write(k as f64 + 1.5);
            }
        }
        // SAFETY: initialised above, no outstanding writers.
        let (cs, is, ds) = unsafe { layout.slices(buf.as_ptr()) };
        assert_eq!(cs, b"abc");
        assert_eq!(is, &[7, -7]);
        assert_eq!(ds, &[1.5, 2.5, 3.5, 4.5]);
        // SAFETY: as above.
        let doubles = unsafe { layout.slice_of::<f64>(buf.as_ptr()) };
        assert_eq!(doubles.len(), 4);
    }

    #[test]
    fn checked_views_write_and_read() {
        let layout = Layout::<CharWideIntDouble, 3>::new([3, 2, 4]);
        let mut buf = AlignedBuf::for_layout(&layout);
        {
            let (c, i, d) = layout.slices_in_mut(buf.as_mut_slice()).unwrap();
            c.copy_from_slice(b"xyz");
            i.copy_from_slice(&[10, 20]);
            d.fill(0.25);
        }
        assert_eq!(layout.slice_in::<1>(buf.as_slice()).unwrap(), &[10, 20]);
        assert_eq!(layout.slice_in::<2>(buf.as_slice()).unwrap(), &[0.25; 4]);
        layout.slice_in_mut::<0>(buf.as_mut_slice()).unwrap()[0] = b'X';
        let (c, _, _) = layout.slices_in(buf.as_slice()).unwrap();
        assert_eq!(c, b"Xyz");
    }

    #[test]
    fn checked_views_reject_short_buffers() {
        let layout = Layout::<CharIntDouble, 3>::new([3, 2, 4]);
        let buf = AlignedBuf::zeroed(8, 40);
        let err = layout.slices_in(buf.as_slice()).unwrap_err();
        assert_eq!(err, LayoutError::BufferTooSmall { required: 48, len: 40 });
        assert!(layout.slice_in::<1>(buf.as_slice()).is_ok());
    }

    #[test]
    fn checked_views_reject_misaligned_buffers() {
        let layout = Layout::<CharIntDouble, 3>::new([3, 2, 4]);
        let buf = AlignedBuf::zeroed(8, 64);
        let err = layout.slices_in(&buf.as_slice()[4..]).unwrap_err();
        assert!(matches!(err, LayoutError::Misaligned { align: 8, .. }));
    }

    #[test]
    fn refine_appends_counts() {
        let header = Layout::<Record, 2>::new([1, 1]);
        let full = header.refine::<4>(&[3, 4]);
        assert_eq!(full, Layout::<Record, 4>::new([1, 1, 3, 4]));
        assert_eq!(&full.offsets()[..3], header.offsets());
    }

    #[test]
    #[should_panic(expected = "needs 2 more, got 1")]
    fn refine_with_wrong_number_of_counts_panics() {
        let header = Layout::<Record, 2>::new([1, 1]);
        let _ = header.refine::<4>(&[3]);
    }

    #[test]
    fn alloc_layout_matches_size_and_alignment() {
        let layout = Layout::<CharWideIntDouble, 3>::new([3, 2, 4]);
        let request = layout.alloc_layout().unwrap();
        assert_eq!(request.size(), 72);
        assert_eq!(request.align(), 32);
    }

    #[test]
    fn debug_string_renders_resolved_arrays() {
        let full = Layout::<CharIntDouble, 3>::new([3, 2, 4]);
        assert_eq!(full.to_string(), "@0<u8>(1)[3]; @4<i32>(4)[2]; @16<f64>(8)[4]");
        let partial = Layout::<CharIntDouble, 1>::new([3]);
        assert_eq!(partial.debug_string(), "@0<u8>(1)[3]; @4<i32>(4)");
    }

    #[test]
    fn padding_is_poisoned_and_data_untouched() {
        let layout = Layout::<CharWideIntDouble, 3>::new([3, 2, 4]);
        let mut buf = AlignedBuf::for_layout(&layout);
        let mut hook = RecordingHook::default();
        layout
            .poison_padding_with(buf.as_mut_slice(), &mut hook)
            .unwrap();
        assert_eq!(hook.regions(), &[(3, 29)]);
        layout
            .poison_padding(buf.as_mut_slice(), &PoisonConfig::always(0xCC))
            .unwrap();
        let bytes = buf.as_slice();
        assert!(bytes[3..32].iter().all(|&b| b == 0xCC));
        assert!(bytes[..3].iter().chain(&bytes[32..]).all(|&b| b == 0));
    }

    #[test]
    fn layouts_are_send_sync_and_copy() {
        fn assert_traits<T: Send + Sync + Copy>() {}
        assert_traits::<Layout<CharIntDouble, 3>>();
        assert_traits::<Layout<Record, 0>>();
    }

    #[cfg(not(miri))]
    mod proptests {
        use super::*;
        use proptest::prelude::*;

        type Mixed = (u8, Aligned<u16, 8>, f64, u32, [u8; 3]);

        proptest! {
            #[test]
            fn offsets_are_aligned(counts in prop::array::uniform5(0usize..100)) {
                let layout = Layout::<Mixed, 5>::new(counts);
                for (i, &offset) in layout.offsets().iter().enumerate() {
                    prop_assert_eq!(offset % <Mixed as Elements>::SPECS[i].align(), 0);
                    if i > 0 {
                        let prev = layout.offset_at(i - 1)
                            + <Mixed as Elements>::SPECS[i - 1].size() * counts[i - 1];
                        prop_assert!(offset >= prev);
                    }
                }
                let last = layout.offset::<4>() + 3 * counts[4];
                prop_assert_eq!(layout.alloc_size(), last);
            }

            #[test]
            fn partial_layouts_agree_with_full(counts in prop::array::uniform5(0usize..100)) {
                let full = Layout::<Mixed, 5>::new(counts);
                let p0 = Layout::<Mixed, 0>::new([]);
                let p2 = Layout::<Mixed, 2>::new([counts[0], counts[1]]);
                let p3 = p2.refine::<3>(&counts[2..3]);
                prop_assert_eq!(p0.offsets(), &full.offsets()[..1]);
                prop_assert_eq!(p2.offsets(), &full.offsets()[..3]);
                prop_assert_eq!(p3.offsets(), &full.offsets()[..4]);
                prop_assert_eq!(p3.refine::<5>(&counts[3..]), full);
            }

            #[test]
            fn round_trip_through_reconstructed_layout(
                bytes in prop::collection::vec(any::<u8>(), 0..16),
                words in prop::collection::vec(any::<u16>(), 0..16),
                reals in prop::collection::vec(-1e6f64..1e6, 0..16),
            ) {
                type Blob = (u8, Aligned<u16, 8>, f64);
                let writer = Layout::<Blob, 3>::new([bytes.len(), words.len(), reals.len()]);
                let mut buf = AlignedBuf::for_layout(&writer);
                {
                    let (b, w, r) = writer.slices_in_mut(buf.as_mut_slice()).unwrap();
                    b.copy_from_slice(&bytes);
                    w.copy_from_slice(&words);
                    r.copy_from_slice(&reals);
                }
                let reader = Layout::<Blob, 3>::new([bytes.len(), words.len(), reals.len()]);
                let (b, w, r) = reader.slices_in(buf.as_slice()).unwrap();
                prop_assert_eq!(b, &bytes[..]);
                prop_assert_eq!(w, &words[..]);
                prop_assert_eq!(r, &reals[..]);
            }
        }
    }
}
