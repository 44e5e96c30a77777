//! Fixture element lists shared by unit tests, integration tests and
//! benchmarks.
//!
//! - [`CharIntDouble`]: natural alignments, `[3, 2, 4]` gives offsets
//!   `0, 4, 16` and 48 bytes.
//! - [`CharWideIntDouble`]: the `i32` array aligned to 32, `[3, 2, 4]` gives
//!   offsets `0, 32, 40` and 72 bytes.
//! - [`CompactRecord`]: a self-describing record whose first two arrays hold
//!   the lengths of the last two.

use strata_core::{Aligned, ElementSpec};

pub type CharIntDouble = (u8, i32, f64);

pub type CharWideIntDouble = (u8, Aligned<i32, 32>, f64);

/// `(num_floats, num_doubles, floats, doubles)`.
pub type CompactRecord = (usize, usize, f32, f64);

/// Runtime specs equivalent to [`CharIntDouble`].
pub fn char_int_double_specs() -> [(&'static str, ElementSpec); 3] {
    [
        ("chars", ElementSpec::of::<u8>()),
        ("ints", ElementSpec::of::<i32>()),
        ("doubles", ElementSpec::of::<f64>()),
    ]
}

/// Runtime specs equivalent to [`CharWideIntDouble`].
pub fn char_wide_int_double_specs() -> [(&'static str, ElementSpec); 3] {
    [
        ("chars", ElementSpec::of::<u8>()),
        ("ints", ElementSpec::of::<i32>().with_override(32)),
        ("doubles", ElementSpec::of::<f64>()),
    ]
}
