//! Offset resolution shared by typed and runtime layouts.
//!
//! Array `i` starts at the end of array `i - 1` rounded up to array `i`'s
//! alignment. With `K` counts known, `min(N, K + 1)` offsets resolve: the
//! array right after the last known-length array still has a fixed start.

use std::ops::Range;

use crate::error::LayoutError;
use crate::spec::{checked_align_up, ElementSpec};

/// Number of arrays whose offset is computable with `known` counts.
pub const fn resolvable(arrays: usize, known: usize) -> usize {
    if known < arrays {
        known + 1
    } else {
        arrays
    }
}

/// Fill `offsets` for the given specs and known counts.
///
/// `offsets` must hold exactly [`resolvable`]`(specs.len(), counts.len())`
/// entries. Returns the extent: the byte just past the last known-count
/// array (0 when no count is known).
///
/// # Panics
///
/// Panics if `specs` is empty, if there are more counts than specs, or if
/// `offsets` has the wrong length.
pub fn resolve_offsets(
    specs: &[ElementSpec],
    counts: &[usize],
    offsets: &mut [usize],
) -> Result<usize, LayoutError> {
    assert!(!specs.is_empty(), "element list has no entries");
    assert!(
        counts.len() <= specs.len(),
        "{} counts for {} arrays",
        counts.len(),
        specs.len()
    );
    assert_eq!(offsets.len(), resolvable(specs.len(), counts.len()));

    offsets[0] = 0;
    let mut extent = 0;
    for (index, (&count, spec)) in counts.iter().zip(specs).enumerate() {
        let overflow = LayoutError::Overflow { index, count };
        let bytes = spec.array_bytes(count).ok_or(overflow.clone())?;
        extent = offsets[index].checked_add(bytes).ok_or(overflow.clone())?;
        if let Some(next) = offsets.get_mut(index + 1) {
            *next = checked_align_up(extent, specs[index + 1].align()).ok_or(overflow)?;
        }
    }
    Ok(extent)
}

/// Non-empty gaps between consecutive resolved arrays.
///
/// Yields the byte range between the end of array `i - 1` and the start of
/// array `i` for every resolved `i` where alignment left a gap.
pub fn padding<'a>(
    specs: &'a [ElementSpec],
    counts: &'a [usize],
    offsets: &'a [usize],
) -> impl Iterator<Item = Range<usize>> + 'a {
    (1..offsets.len()).filter_map(move |i| {
        let start = offsets[i - 1] + specs[i - 1].size() * counts[i - 1];
        (offsets[i] > start).then(|| start..offsets[i])
    })
}
