//! Runtime element lists.
//!
//! [`ElementList`] is the data-driven counterpart of a typed tuple: named
//! [`ElementSpec`]s in insertion order. [`DynLayout`] resolves offsets for a
//! prefix of counts exactly like [`Layout`](crate::Layout), with indices and
//! names checked at run time instead of compile time.

use std::alloc;
use std::fmt;
use std::mem;

use bytemuck::Pod;
use indexmap::IndexSet;
use smallvec::SmallVec;
use strata_core::offset::{self, resolvable};
use strata_core::{max_align, ElementSpec, LayoutError, ResolvedLayout};

use crate::raw;

/// Inline capacity for per-array storage before spilling to the heap.
const INLINE_ARRAYS: usize = 8;

type PerArray<T> = SmallVec<[T; INLINE_ARRAYS]>;

/// Named element specs in array order.
///
/// Names are unique; [`ElementList::push`] rejects a repeat.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct ElementList {
    names: IndexSet<String>,
    specs: PerArray<ElementSpec>,
}

impl ElementList {
    /// An empty list.
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a list from `(name, spec)` pairs.
    pub fn from_specs<I, S>(entries: I) -> Result<Self, LayoutError>
    where
        I: IntoIterator<Item = (S, ElementSpec)>,
        S: Into<String>,
    {
        let mut list = Self::new();
        for (name, spec) in entries {
            list.push(name, spec)?;
        }
        Ok(list)
    }

    /// Append an array and return its index.
    pub fn push(&mut self, name: impl Into<String>, spec: ElementSpec) -> Result<usize, LayoutError> {
        let name = name.into();
        if self.names.contains(&name) {
            tracing::debug!(%name, "rejected duplicate element name");
            return Err(LayoutError::DuplicateName { name });
        }
        self.names.insert(name);
        self.specs.push(spec);
        Ok(self.specs.len() - 1)
    }

    /// Number of arrays.
    pub fn len(&self) -> usize {
        self.specs.len()
    }

    /// Whether the list has no arrays.
    pub fn is_empty(&self) -> bool {
        self.specs.is_empty()
    }

    /// Spec of array `index`.
    pub fn spec(&self, index: usize) -> Option<&ElementSpec> {
        self.specs.get(index)
    }

    /// Name of array `index`.
    pub fn name(&self, index: usize) -> Option<&str> {
        self.names.get_index(index).map(String::as_str)
    }

    /// Position of the array called `name`.
    pub fn index_of(&self, name: &str) -> Option<usize> {
        self.names.get_index_of(name)
    }

    /// Every spec, in order.
    pub fn specs(&self) -> &[ElementSpec] {
        &self.specs
    }

    /// Iterate over `(name, spec)` in array order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &ElementSpec)> {
        self.names.iter().map(String::as_str).zip(&self.specs)
    }

    /// Largest alignment over all arrays (1 for an empty list).
    pub fn alignment(&self) -> usize {
        max_align(&self.specs)
    }

    /// Resolve a layout with the given leading counts.
    pub fn layout(&self, counts: &[usize]) -> Result<DynLayout<'_>, LayoutError> {
        DynLayout::new(self, counts)
    }
}

/// A layout over a runtime [`ElementList`].
#[derive(Clone, PartialEq, Eq)]
pub struct DynLayout<'a> {
    list: &'a ElementList,
    counts: PerArray<usize>,
    offsets: PerArray<usize>,
    extent: usize,
}

impl<'a> DynLayout<'a> {
    /// Resolve offsets for `counts`, the counts of the leading arrays.
    pub fn new(list: &'a ElementList, counts: &[usize]) -> Result<Self, LayoutError> {
        if list.is_empty() {
            return Err(LayoutError::EmptyElementList);
        }
        if counts.len() > list.len() {
            return Err(LayoutError::TooManyCounts {
                counts: counts.len(),
                arrays: list.len(),
            });
        }
        let mut offsets: PerArray<usize> = smallvec::smallvec![0; resolvable(list.len(), counts.len())];
        let extent = offset::resolve_offsets(list.specs(), counts, &mut offsets)
            .inspect_err(|err| tracing::debug!(%err, ?counts, "rejected layout counts"))?;
        Ok(Self {
            list,
            counts: counts.into(),
            offsets,
            extent,
        })
    }

    /// The element list this layout resolves.
    pub fn list(&self) -> &'a ElementList {
        self.list
    }

    /// Number of arrays in the element list.
    pub fn num_types(&self) -> usize {
        self.list.len()
    }

    /// Number of known counts.
    pub fn num_counts(&self) -> usize {
        self.counts.len()
    }

    /// Number of arrays whose offset is computable.
    pub fn num_offsets(&self) -> usize {
        self.offsets.len()
    }

    /// Byte offset of array `index`.
    ///
    /// # Panics
    ///
    /// Panics if the offset is not resolved.
    pub fn offset(&self, index: usize) -> usize {
        assert!(
            index < self.offsets.len(),
            "offset of array {index} unknown: only {} offsets resolve with {} counts",
            self.offsets.len(),
            self.counts.len()
        );
        self.offsets[index]
    }

    /// Byte offset of the array called `name`.
    ///
    /// # Panics
    ///
    /// Panics if no array has that name or its offset is not resolved.
    pub fn offset_of(&self, name: &str) -> usize {
        self.offset(self.named(name))
    }

    /// Element count of array `index`.
    ///
    /// # Panics
    ///
    /// Panics if the count is not known.
    pub fn count(&self, index: usize) -> usize {
        assert!(
            index < self.counts.len(),
            "count of array {index} unknown: only {} counts known",
            self.counts.len()
        );
        self.counts[index]
    }

    /// Element count of the array called `name`.
    ///
    /// # Panics
    ///
    /// Panics if no array has that name or its count is not known.
    pub fn count_of(&self, name: &str) -> usize {
        self.count(self.named(name))
    }

    /// Byte just past the last known-count array.
    pub fn extent(&self) -> usize {
        self.extent
    }

    /// Bytes needed to hold every array; fails on a partial layout.
    pub fn alloc_size(&self) -> Result<usize, LayoutError> {
        if self.counts.len() < self.list.len() {
            return Err(LayoutError::Incomplete {
                known: self.counts.len(),
                arrays: self.list.len(),
            });
        }
        Ok(self.extent)
    }

    /// Allocation request for a buffer holding every array.
    pub fn alloc_layout(&self) -> Result<alloc::Layout, LayoutError> {
        let size = self.alloc_size()?;
        alloc::Layout::from_size_align(size, self.list.alignment()).map_err(|_| {
            LayoutError::Overflow {
                index: self.list.len() - 1,
                count: self.counts.last().copied().unwrap_or(0),
            }
        })
    }

    /// Pointer to the start of array `index`.
    ///
    /// # Panics
    ///
    /// Panics if the offset is not resolved.
    pub fn pointer(&self, base: *const u8, index: usize) -> *const u8 {
        raw::debug_assert_aligned(base, self.list.alignment());
        base.wrapping_add(self.offset(index))
    }

    /// Mutable pointer to the start of array `index`.
    pub fn pointer_mut(&self, base: *mut u8, index: usize) -> *mut u8 {
        raw::debug_assert_aligned(base, self.list.alignment());
        base.wrapping_add(self.offset(index))
    }

    /// Bytes of array `index` inside `buf`.
    pub fn bytes_in<'b>(&self, buf: &'b [u8], index: usize) -> Result<&'b [u8], LayoutError> {
        let range = self.array_range(index);
        raw::check_buffer(buf.as_ptr(), buf.len(), self.list.alignment(), range.end)?;
        Ok(&buf[range])
    }

    /// Mutable bytes of array `index` inside `buf`.
    pub fn bytes_in_mut<'b>(&self, buf: &'b mut [u8], index: usize) -> Result<&'b mut [u8], LayoutError> {
        let range = self.array_range(index);
        raw::check_buffer(buf.as_ptr(), buf.len(), self.list.alignment(), range.end)?;
        Ok(&mut buf[range])
    }

    /// Array `index` inside `buf`, viewed as `T`.
    ///
    /// `T` must have the element spec's size and an alignment the array's
    /// start satisfies.
    pub fn slice_in<'b, T: Pod>(&self, buf: &'b [u8], index: usize) -> Result<&'b [T], LayoutError> {
        self.check_element::<T>(index)?;
        self.bytes_in(buf, index).map(bytemuck::cast_slice)
    }

    /// Array `index` inside `buf`, viewed mutably as `T`.
    pub fn slice_in_mut<'b, T: Pod>(
        &self,
        buf: &'b mut [u8],
        index: usize,
    ) -> Result<&'b mut [T], LayoutError> {
        self.check_element::<T>(index)?;
        self.bytes_in_mut(buf, index).map(bytemuck::cast_slice_mut)
    }

    /// Append counts for the following arrays.
    pub fn refine(&self, more: &[usize]) -> Result<DynLayout<'a>, LayoutError> {
        let mut counts: PerArray<usize> = self.counts.clone();
        counts.extend_from_slice(more);
        Self::new(self.list, &counts)
    }

    fn named(&self, name: &str) -> usize {
        match self.list.index_of(name) {
            Some(index) => index,
            None => panic!("no array named '{name}' in the element list"),
        }
    }

    fn array_range(&self, index: usize) -> std::ops::Range<usize> {
        let count = self.count(index);
        let start = self.offsets[index];
        start..start + self.list.specs[index].size() * count
    }

    fn check_element<T: Pod>(&self, index: usize) -> Result<(), LayoutError> {
        self.count(index);
        let spec = self.list.specs[index];
        if spec.size() != mem::size_of::<T>() || spec.align() < mem::align_of::<T>() {
            tracing::debug!(index, %spec, type_size = mem::size_of::<T>(), "element type mismatch");
            return Err(LayoutError::ElementMismatch {
                index,
                spec_size: spec.size(),
                type_size: mem::size_of::<T>(),
            });
        }
        Ok(())
    }
}

impl ResolvedLayout for DynLayout<'_> {
    fn specs(&self) -> &[ElementSpec] {
        self.list.specs()
    }

    fn element_name(&self, index: usize) -> &str {
        self.list.name(index).unwrap_or("?")
    }

    fn counts(&self) -> &[usize] {
        &self.counts
    }

    fn offsets(&self) -> &[usize] {
        &self.offsets
    }

    fn extent(&self) -> usize {
        self.extent
    }
}

impl fmt::Debug for DynLayout<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("DynLayout")
            .field("arrays", &self.list.len())
            .field("counts", &self.counts)
            .field("offsets", &self.offsets)
            .field("extent", &self.extent)
            .finish()
    }
}

impl fmt::Display for DynLayout<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Display::fmt(&self.display(), f)
    }
}
