//! Error types for layout construction and buffer access.
//!
//! Configuration mistakes on typed element lists are rejected at compile
//! time or by panicking. The enums here cover the conditions that can
//! legitimately arise at run time: counts read from a foreign buffer,
//! element specs assembled from data, and caller-supplied byte slices.

use std::error::Error;
use std::fmt;

/// An invalid alignment override.
///
/// `Copy` so that it can be produced and inspected inside `const fn`.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum AlignmentError {
    /// The requested alignment is zero or not a power of two.
    NotPowerOfTwo {
        /// The rejected alignment.
        requested: usize,
    },
    /// The requested alignment is weaker than the element's natural alignment.
    BelowNatural {
        /// The rejected alignment.
        requested: usize,
        /// The element type's natural alignment.
        natural: usize,
    },
}

impl fmt::Display for AlignmentError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::NotPowerOfTwo { requested } => {
                write!(f, "alignment {requested} is not a power of two")
            }
            Self::BelowNatural { requested, natural } => {
                write!(
                    f,
                    "alignment {requested} is lower than the natural alignment {natural}"
                )
            }
        }
    }
}

impl Error for AlignmentError {}

/// Errors from building layouts or binding them to buffers.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum LayoutError {
    /// An element spec carries an invalid alignment.
    Alignment(AlignmentError),
    /// An element spec has size zero.
    ZeroSizedElement,
    /// A runtime element list has no entries.
    EmptyElementList,
    /// Two entries of a runtime element list share a name.
    DuplicateName {
        /// The repeated name.
        name: String,
    },
    /// More counts were supplied than there are arrays.
    TooManyCounts {
        /// Number of counts supplied.
        counts: usize,
        /// Number of arrays in the element list.
        arrays: usize,
    },
    /// An array's byte size or the running offset does not fit in `usize`.
    Overflow {
        /// Index of the array whose extent overflowed.
        index: usize,
        /// The element count that triggered the overflow.
        count: usize,
    },
    /// The operation needs every count, but only a prefix is known.
    Incomplete {
        /// Number of known counts.
        known: usize,
        /// Number of arrays in the element list.
        arrays: usize,
    },
    /// A typed view was requested with a type that doesn't match the element spec.
    ElementMismatch {
        /// Array index.
        index: usize,
        /// Element size recorded in the element spec.
        spec_size: usize,
        /// Size of the requested type.
        type_size: usize,
    },
    /// The buffer start is not aligned to the layout's alignment.
    Misaligned {
        /// Address of the buffer start.
        addr: usize,
        /// Required alignment.
        align: usize,
    },
    /// The buffer is shorter than the bytes spanned by the known arrays.
    BufferTooSmall {
        /// Bytes required.
        required: usize,
        /// Bytes available.
        len: usize,
    },
}

impl fmt::Display for LayoutError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Alignment(err) => write!(f, "invalid alignment override: {err}"),
            Self::ZeroSizedElement => write!(f, "zero-sized element types are not supported"),
            Self::EmptyElementList => write!(f, "element list has no entries"),
            Self::DuplicateName { name } => write!(f, "duplicate element name '{name}'"),
            Self::TooManyCounts { counts, arrays } => {
                write!(f, "{counts} counts supplied for {arrays} arrays")
            }
            Self::Overflow { index, count } => {
                write!(
                    f,
                    "array {index} with {count} elements overflows the address space"
                )
            }
            Self::Incomplete { known, arrays } => {
                write!(
                    f,
                    "layout is partial: {known} of {arrays} counts known"
                )
            }
            Self::ElementMismatch {
                index,
                spec_size,
                type_size,
            } => {
                write!(
                    f,
                    "array {index} holds {spec_size}-byte elements, requested type is {type_size} bytes"
                )
            }
            Self::Misaligned { addr, align } => {
                write!(f, "buffer at {addr:#x} is not aligned to {align}")
            }
            Self::BufferTooSmall { required, len } => {
                write!(
                    f,
                    "buffer too small: {required} bytes required, {len} available"
                )
            }
        }
    }
}

impl Error for LayoutError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Alignment(err) => Some(err),
            _ => None,
        }
    }
}

impl From<AlignmentError> for LayoutError {
    fn from(err: AlignmentError) -> Self {
        Self::Alignment(err)
    }
}
