//! cellmem: raw heap cells and strings built one cell per character.
//!
//! This is the top-level facade crate that re-exports the public API from
//! the cellmem sub-crates. For most users, adding `cellmem` as a single
//! dependency is sufficient.
//!
//! # Quick start
//!
//! ```rust
//! use cellmem::prelude::*;
//!
//! let mem = Memory::new();
//!
//! // Typed cells straight from the heap.
//! let h = mem.heap().allocate(width::INT).unwrap();
//! unsafe {
//!     mem.heap().write_int32(h, 42);
//!     assert_eq!(mem.heap().read_int32(h), 42);
//!     mem.heap().free(h);
//! }
//!
//! // A string with one heap cell per character.
//! let mut s = mem.mutable_cell_string("Hello").unwrap();
//! s.append(", World!").unwrap();
//! assert_eq!(s.to_text().unwrap(), "Hello, World!");
//! assert_eq!(byte_len("Hello"), 5);
//! ```
//!
//! # Modules
//!
//! | Module | Sub-crate | Contents |
//! |--------|-----------|----------|
//! | [`types`] | `cellmem-core` | `Handle`, scalar widths, error types |
//! | [`heap`] | `cellmem-heap` | `RawHeap`, `SystemHeap`, `HeapConfig` |
//! | [`string`] | `cellmem-string` | `CellString`, `MutableCellString`, dumps |

#![deny(missing_docs)]
#![deny(rustdoc::broken_intra_doc_links)]
#![forbid(unsafe_code)]

use cellmem_core::CellResult;
use cellmem_heap::{RawHeap, SystemHeap};
use cellmem_string::{CellString, MutableCellString};
use tracing::debug;

/// Handles, scalar widths, and error types (`cellmem-core`).
pub use cellmem_core as types;

/// Raw heap allocation and typed access (`cellmem-heap`).
///
/// [`heap::RawHeap`] is the allocator seam; [`heap::SystemHeap`] is the
/// process-heap implementation configured by [`heap::HeapConfig`].
pub use cellmem_heap as heap;

/// Cell-backed strings (`cellmem-string`).
pub use cellmem_string as string;

/// Byte length of `text`: the number of cells a cell string built from it
/// occupies.
pub fn byte_len(text: &str) -> usize {
    text.len()
}

/// A heap bundled with factories for strings that live on it.
///
/// Typed reads and writes go through [`heap`](Memory::heap); strings are
/// created on a clone of the same heap value.
#[derive(Clone, Debug, Default)]
pub struct Memory<H: RawHeap + Clone = SystemHeap> {
    heap: H,
}

impl Memory<SystemHeap> {
    /// Use the process heap with the default configuration.
    pub fn new() -> Self {
        Self::with_heap(SystemHeap::default())
    }
}

impl<H: RawHeap + Clone> Memory<H> {
    /// Use the given heap.
    pub fn with_heap(heap: H) -> Self {
        Self { heap }
    }

    /// The underlying heap, for raw allocation and typed access.
    pub fn heap(&self) -> &H {
        &self.heap
    }

    /// Build an immutable cell string.
    pub fn cell_string(&self, text: &str) -> CellResult<CellString<H>> {
        debug!(len = text.len(), "creating cell string");
        CellString::new_in(text, self.heap.clone())
    }

    /// Build a mutable cell string.
    pub fn mutable_cell_string(&self, text: &str) -> CellResult<MutableCellString<H>> {
        debug!(len = text.len(), "creating mutable cell string");
        MutableCellString::new_in(text, self.heap.clone())
    }
}

/// Common imports for typical cellmem usage.
///
/// ```rust
/// use cellmem::prelude::*;
/// ```
pub mod prelude {
    pub use crate::{byte_len, Memory};

    // Core types
    pub use cellmem_core::{width, CellError, CellResult, Handle, HeapError, HeapResult};

    // Heap
    pub use cellmem_heap::{HeapConfig, RawHeap, SystemHeap};

    // Strings
    pub use cellmem_string::{CellString, CellView, Lifecycle, MutableCellString};
}
