//! Benchmark workloads for Strata layouts.
//!
//! - [`write_record`]: pack a self-describing record with
//!   [`CompactRecord`] layout.
//! - [`read_record`]: read it back through a header-only layout, then the
//!   full one.
//! - [`mixed_list`]: a runtime list of eight arrays for `DynLayout`.

#![forbid(unsafe_code)]
#![deny(rustdoc::broken_intra_doc_links)]

use strata::prelude::*;
use strata_test_utils::fixtures::CompactRecord;
use strata_test_utils::AlignedBuf;

/// Pack `floats` and `doubles` behind a two-slot length header.
pub fn write_record(floats: &[f32], doubles: &[f64]) -> Result<AlignedBuf, LayoutError> {
    let layout = Layout::<CompactRecord, 4>::try_new([1, 1, floats.len(), doubles.len()])?;
    let mut buf = AlignedBuf::zeroed(Layout::<CompactRecord, 4>::alignment(), layout.alloc_size());
    let (num_floats, num_doubles, f, d) = layout.slices_in_mut(buf.as_mut_slice())?;
    num_floats[0] = floats.len();
    num_doubles[0] = doubles.len();
    f.copy_from_slice(floats);
    d.copy_from_slice(doubles);
    Ok(buf)
}

/// Read a record written by [`write_record`].
pub fn read_record(buf: &[u8]) -> Result<(&[f32], &[f64]), LayoutError> {
    let header = Layout::<CompactRecord, 2>::new([1, 1]);
    let (num_floats, num_doubles) = header.slices_in(buf)?;
    let full = header.try_refine::<4>(&[num_floats[0], num_doubles[0]])?;
    let (_, _, floats, doubles) = full.slices_in(buf)?;
    Ok((floats, doubles))
}

/// Eight arrays of assorted element sizes, two with raised alignment.
pub fn mixed_list() -> Result<ElementList, LayoutError> {
    let entries = [
        ("flags", ElementSpec::of::<u8>()),
        ("ids", ElementSpec::of::<u64>()),
        ("weights", ElementSpec::of::<f32>().with_override(16)),
        ("coords", ElementSpec::of::<[i32; 3]>()),
        ("mask", ElementSpec::of::<u8>()),
        ("values", ElementSpec::of::<f64>().with_override(64)),
        ("ranks", ElementSpec::of::<u16>()),
        ("tail", ElementSpec::of::<u32>()),
    ];
    ElementList::from_specs(entries)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn record_round_trips() {
        let buf = write_record(&[1.0, 2.0], &[3.0]).unwrap();
        let (floats, doubles) = read_record(buf.as_slice()).unwrap();
        assert_eq!(floats, &[1.0, 2.0]);
        assert_eq!(doubles, &[3.0]);
    }

    #[test]
    fn truncated_record_is_rejected() {
        let buf = write_record(&[1.0, 2.0], &[3.0]).unwrap();
        let short = &buf.as_slice()[..buf.len() - 8];
        assert!(matches!(
            read_record(short),
            Err(LayoutError::BufferTooSmall { .. })
        ));
    }

    #[test]
    fn mixed_list_has_eight_arrays() {
        let list = mixed_list().unwrap();
        assert_eq!(list.len(), 8);
        assert_eq!(list.alignment(), 64);
    }
}
