//! Layout descriptors for several variable-length arrays in one buffer.
//!
//! A single allocation holds N arrays of different element types, laid out
//! back to back with each array's start rounded up to its alignment. The
//! element types and alignments are known at compile time; the lengths
//! arrive at run time, possibly only a prefix of them at a time.
//!
//! # Architecture
//!
//! ```text
//! Layout<L, K>           typed: L = (T0, T1, ..), K known counts
//! ├── list::Elements     arity, specs, overall alignment, lookup by type
//! ├── list::ElementAt<I> entry at position I (compile-time checked)
//! └── list::Resolve<K>   pointer and slice tuples for K known counts
//!
//! DynLayout<'a>          runtime: borrows an ElementList of named specs
//!
//! raw                    pointer arithmetic and buffer checks shared by both
//! ```
//!
//! Offset arithmetic, element specs, errors, and diagnostics live in
//! `strata-core`. This crate is the only one in the workspace besides the
//! test utilities that contains `unsafe` code, confined to `raw.rs`,
//! `list.rs`, and `layout.rs`.

#![deny(missing_docs)]
#![deny(rustdoc::broken_intra_doc_links)]
#![deny(unsafe_code)]

pub mod dynamic;
pub mod layout;
pub mod list;
mod raw;

// Public re-exports for the primary API surface.
pub use dynamic::{DynLayout, ElementList};
pub use layout::Layout;
pub use list::{ElemAt, ElementAt, Elements, Resolve};
