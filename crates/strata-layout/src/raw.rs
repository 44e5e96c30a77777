//! Low-level pointer primitives shared by the typed and runtime layouts.
//!
//! Forming a pointer with `wrapping_add` is always safe; only the slice
//! constructors here are `unsafe`, and each documents what its caller must
//! guarantee.

#![allow(unsafe_code)]

use std::slice;

use strata_core::LayoutError;

/// Debug-build check that `base` honours the layout alignment.
#[inline]
#[track_caller]
pub(crate) fn debug_assert_aligned(base: *const u8, align: usize) {
    debug_assert!(
        base as usize % align == 0,
        "buffer at {base:p} is not aligned to {align}"
    );
}

/// Release-build check that a buffer is aligned and long enough.
pub(crate) fn check_buffer(
    base: *const u8,
    len: usize,
    align: usize,
    required: usize,
) -> Result<(), LayoutError> {
    let addr = base as usize;
    if addr % align != 0 {
        tracing::debug!(addr, align, "rejected misaligned buffer");
        return Err(LayoutError::Misaligned { addr, align });
    }
    if len < required {
        tracing::debug!(required, len, "rejected short buffer");
        return Err(LayoutError::BufferTooSmall { required, len });
    }
    Ok(())
}

/// Shared view of `len` elements of `T` starting `offset` bytes past `base`.
///
/// # Safety
///
/// `base + offset` must be aligned for `T` and valid for reads of
/// `len * size_of::<T>()` initialised bytes that are not mutated for `'a`.
#[inline]
pub(crate) unsafe fn view<'a, T>(base: *const u8, offset: usize, len: usize) -> &'a [T] {
    // SAFETY: upheld by the caller.
    unsafe { slice::from_raw_parts(base.add(offset).cast::<T>(), len) }
}

/// Exclusive view of `len` elements of `T` starting `offset` bytes past `base`.
///
/// # Safety
///
/// As [`view`], plus the bytes must not be accessed through any other
/// pointer for `'a`.
#[inline]
pub(crate) unsafe fn view_mut<'a, T>(base: *mut u8, offset: usize, len: usize) -> &'a mut [T] {
    // SAFETY: upheld by the caller.
    unsafe { slice::from_raw_parts_mut(base.add(offset).cast::<T>(), len) }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn check_buffer_reports_misalignment_first() {
        let err = check_buffer(0x1003 as *const u8, 0, 8, 16).unwrap_err();
        assert_eq!(
            err,
            LayoutError::Misaligned {
                addr: 0x1003,
                align: 8
            }
        );
    }

    #[test]
    fn check_buffer_reports_short_length() {
        let err = check_buffer(0x1000 as *const u8, 12, 8, 16).unwrap_err();
        assert_eq!(
            err,
            LayoutError::BufferTooSmall {
                required: 16,
                len: 12
            }
        );
        assert!(check_buffer(0x1000 as *const u8, 16, 8, 16).is_ok());
    }

    #[test]
    fn views_read_what_was_written() {
        let mut words = [0u64; 4];
        let base = words.as_mut_ptr().cast::<u8>();
        // SAFETY: offsets 8..24 lie inside `words` and are u32-aligned.
        let halves: &mut [u32] = unsafe { view_mut(base, 8, 4) };
        halves.copy_from_slice(&[1, 2, 3, 4]);
        // SAFETY: same region, no live mutable view.
        let read: &[u32] = unsafe { view(base, 8, 4) };
        assert_eq!(read, &[1, 2, 3, 4]);
    }
}
