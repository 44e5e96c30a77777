//! Strata: layouts for several variable-length arrays packed into one buffer.
//!
//! This is the top-level facade crate that re-exports the public API from all
//! Strata sub-crates. For most users, adding `strata` as a single dependency
//! is sufficient.
//!
//! # Quick start
//!
//! ```rust
//! use strata::prelude::*;
//!
//! // Three arrays: bytes, ints aligned to 32, doubles.
//! type Blob = (u8, Aligned<i32, 32>, f64);
//!
//! let layout = Layout::<Blob, 3>::new([3, 2, 4]);
//! assert_eq!(Layout::<Blob, 3>::alignment(), 32);
//! assert_eq!(layout.offsets(), &[0, 32, 40]);
//! assert_eq!(layout.alloc_size(), 72);
//!
//! let mut storage = vec![0u64; 72 / 8 + 3];
//! let bytes: &mut [u8] = bytemuck::cast_slice_mut(&mut storage);
//! let skip = bytes.as_ptr().align_offset(32);
//! let buf = &mut bytes[skip..skip + 72];
//!
//! let (chars, ints, doubles) = layout.slices_in_mut(buf).unwrap();
//! chars.copy_from_slice(b"abc");
//! ints.copy_from_slice(&[1, 2]);
//! doubles.fill(0.5);
//! assert_eq!(layout.slice_in::<1>(buf).unwrap(), &[1, 2]);
//! ```
//!
//! # Modules
//!
//! | Module | Sub-crate | Contents |
//! |--------|-----------|----------|
//! | [`types`] | `strata-core` | Element specs, offset math, errors, diagnostics |
//! | [`layout`] | `strata-layout` | Typed `Layout<L, K>` and runtime `DynLayout` |

#![deny(missing_docs)]
#![deny(rustdoc::broken_intra_doc_links)]
#![forbid(unsafe_code)]

/// Element specs, offset resolution, errors, and diagnostics (`strata-core`).
///
/// Contains [`types::ElementSpec`], the [`types::Aligned`] tag, the
/// [`types::LayoutError`] enum, and the [`types::ResolvedLayout`] trait
/// shared by both descriptor kinds.
pub use strata_core as types;

/// Layout descriptors (`strata-layout`).
///
/// [`layout::Layout`] for element lists known at compile time,
/// [`layout::DynLayout`] over a runtime [`layout::ElementList`].
pub use strata_layout as layout;

/// Common imports for typical Strata usage.
///
/// ```rust
/// use strata::prelude::*;
/// ```
pub mod prelude {
    // Element types and specs
    pub use strata_core::{Aligned, ElementSpec, ElementType};

    // Descriptors
    pub use strata_layout::{DynLayout, ElementList, Layout};

    // Shared behaviour and diagnostics
    pub use strata_core::{PaddingHook, PoisonConfig, ResolvedLayout};

    // Errors
    pub use strata_core::{AlignmentError, LayoutError};
}
