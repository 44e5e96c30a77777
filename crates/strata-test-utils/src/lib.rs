//! Test utilities for Strata development.
//!
//! Provides [`AlignedBuf`], a zeroed byte buffer with a guaranteed start
//! alignment, a [`RecordingHook`] that captures padding regions, and the
//! fixture element lists in [`fixtures`].

#![forbid(unsafe_code)]
#![allow(missing_docs)]
#![deny(rustdoc::broken_intra_doc_links)]

pub mod fixtures;

use strata_core::{PaddingHook, ResolvedLayout};

/// Zeroed bytes whose start is aligned to a requested power of two.
///
/// Over-allocates a `Vec<u8>` and exposes the aligned window inside it, so
/// tests can hand layouts correctly aligned buffers without `unsafe`.
pub struct AlignedBuf {
    storage: Vec<u8>,
    start: usize,
    len: usize,
    align: usize,
}

impl AlignedBuf {
    /// `len` zero bytes starting on an `align` boundary.
    ///
    /// # Panics
    ///
    /// Panics if `align` is not a power of two.
    pub fn zeroed(align: usize, len: usize) -> Self {
        Self::offset_from_boundary(align, len, 0)
    }

    /// A buffer sized to `layout`'s extent and aligned to its alignment.
    pub fn for_layout<L: ResolvedLayout>(layout: &L) -> Self {
        Self::zeroed(layout.alignment(), layout.extent())
    }

    /// `len` zero bytes starting exactly `shift` bytes past an `align`
    /// boundary. Used to exercise misalignment checks.
    pub fn offset_from_boundary(align: usize, len: usize, shift: usize) -> Self {
        assert!(align.is_power_of_two(), "alignment {align} is not a power of two");
        let storage = vec![0u8; len + align + shift];
        let start = storage.as_ptr().align_offset(align) + shift;
        Self {
            storage,
            start,
            len,
            align,
        }
    }

    pub fn len(&self) -> usize {
        self.len
    }

    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// Alignment requested at construction.
    pub fn align(&self) -> usize {
        self.align
    }

    pub fn as_slice(&self) -> &[u8] {
        &self.storage[self.start..self.start + self.len]
    }

    pub fn as_mut_slice(&mut self) -> &mut [u8] {
        &mut self.storage[self.start..self.start + self.len]
    }

    pub fn as_ptr(&self) -> *const u8 {
        self.as_slice().as_ptr()
    }

    pub fn as_mut_ptr(&mut self) -> *mut u8 {
        self.as_mut_slice().as_mut_ptr()
    }
}

/// Padding hook that records `(offset, len)` of every region it is given
/// and leaves the bytes alone.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct RecordingHook {
    regions: Vec<(usize, usize)>,
}

impl RecordingHook {
    pub fn regions(&self) -> &[(usize, usize)] {
        &self.regions
    }

    /// Total bytes across all recorded regions.
    pub fn total(&self) -> usize {
        self.regions.iter().map(|&(_, len)| len).sum()
    }
}

impl PaddingHook for RecordingHook {
    fn poison(&mut self, offset: usize, padding: &mut [u8]) {
        self.regions.push((offset, padding.len()));
    }
}
