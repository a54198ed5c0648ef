//! Core types for the cellmem workspace.
//!
//! This is the leaf crate with zero internal dependencies. It defines
//! the vocabulary shared by the allocator and the string layer: the
//! integer [`Handle`] and its null sentinel, the [`Scalar`] widths the
//! allocator can read and write, and the error taxonomy.

#![deny(missing_docs)]
#![deny(rustdoc::broken_intra_doc_links)]
#![forbid(unsafe_code)]

pub mod error;
pub mod handle;
pub mod scalar;

pub use error::{CellError, CellResult, HeapError, HeapResult};
pub use handle::Handle;
pub use scalar::{width, Scalar};
