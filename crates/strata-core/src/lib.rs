//! Core types for Strata multi-array layouts.
//!
//! This is the leaf crate of the workspace. It holds the pieces both the
//! typed and the runtime descriptors build on: element specs and their
//! alignment rules, offset resolution, the error types, and the
//! diagnostics that render layouts and poison padding.
//!
//! # Offset rule
//!
//! ```text
//! offset(0) = 0
//! offset(i) = align_up(offset(i-1) + size(i-1) * count(i-1), align(i))
//! ```
//!
//! With `K` of `N` counts known, offsets `0..min(N, K + 1)` resolve.

#![deny(missing_docs)]
#![deny(rustdoc::broken_intra_doc_links)]
#![forbid(unsafe_code)]

pub mod diagnostics;
pub mod element;
pub mod error;
pub mod offset;
pub mod spec;
pub mod traits;

pub use diagnostics::{FillPadding, LayoutDisplay, PoisonConfig};
pub use element::{Aligned, ElementType};
pub use error::{AlignmentError, LayoutError};
pub use spec::{align_up, checked_align_up, max_align, ElementSpec};
pub use traits::{PaddingHook, ResolvedLayout};
