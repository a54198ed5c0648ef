//! Strings built from individually allocated heap cells.
//!
//! Each character (byte) of a string lives in its own 1-byte allocation on
//! a [`RawHeap`]; the string owns an ordered table of [`Handle`]s to those
//! cells rather than a contiguous buffer. Two variants share the storage:
//!
//! - [`CellString`]: content changes only by replacing it wholesale.
//! - [`MutableCellString`]: adds append, insert, remove, and search.
//!
//! # Trust boundary
//!
//! The heap below is unchecked. This crate is where the checks live:
//! indexes are range-checked and handles are null-checked before any
//! dereference, each handle is released exactly once, and a multi-cell
//! edit that fails part way releases what it took and leaves the string
//! as it was. All `unsafe` is confined to the private `cells` module.
//!
//! # Lifecycle
//!
//! ```text
//!            free()                      set(text)
//!   Live ───────────────▶ Freed ─────────────────────▶ Live
//!    ▲ │                   │ free(): no-op
//!    └─┘ set(text)         └──▶ reads/edits: NullHandle
//! ```
//!
//! Strings are single-owner values; neither type is `Clone`, and every
//! edit takes `&mut self`.

#![deny(missing_docs)]
#![deny(rustdoc::broken_intra_doc_links)]
#![deny(unsafe_code)]

/// Constructors and read/lifecycle methods shared by both string types.
///
/// Each type is a newtype over a `CellRun` in a field named `run`.
macro_rules! impl_cell_string {
    ($ty:ident) => {
        impl $ty<cellmem_heap::SystemHeap> {
            /// Store `text` on the process heap with the default configuration.
            pub fn new(text: &str) -> cellmem_core::CellResult<Self> {
                Self::new_in(text, cellmem_heap::SystemHeap::default())
            }
        }

        impl<H: cellmem_heap::RawHeap> $ty<H> {
            /// Store `text` in cells allocated from `heap`.
            pub fn new_in(text: &str, heap: H) -> cellmem_core::CellResult<Self> {
                Self::from_bytes_in(text.as_bytes(), heap)
            }

            /// Store raw bytes, one cell each, allocated from `heap`.
            pub fn from_bytes_in(bytes: &[u8], heap: H) -> cellmem_core::CellResult<Self> {
                Ok(Self {
                    run: $crate::cells::CellRun::new(bytes, heap)?,
                })
            }

            /// Number of cells. O(1).
            pub fn len(&self) -> usize {
                self.run.len()
            }

            /// Whether the string holds no cells.
            pub fn is_empty(&self) -> bool {
                self.run.len() == 0
            }

            /// Current lifecycle state.
            pub fn state(&self) -> $crate::Lifecycle {
                self.run.state()
            }

            /// Whether the string is live.
            pub fn is_live(&self) -> bool {
                self.run.state() == $crate::Lifecycle::Live
            }

            /// Whether the string has been freed.
            pub fn is_freed(&self) -> bool {
                self.run.state() == $crate::Lifecycle::Freed
            }

            /// The byte stored at `index`.
            pub fn byte_at(&self, index: usize) -> cellmem_core::CellResult<u8> {
                self.run.byte_at(index)
            }

            /// The character stored at `index`: the cell's byte widened to a `char`.
            pub fn char_at(&self, index: usize) -> cellmem_core::CellResult<char> {
                self.run.byte_at(index).map(char::from)
            }

            /// Replace the content with `text`.
            ///
            /// All new cells are allocated before the old ones are released, so
            /// on failure the string keeps its previous content and state. Works
            /// on a freed string, bringing it back to life.
            pub fn set(&mut self, text: &str) -> cellmem_core::CellResult<()> {
                self.run.set(text.as_bytes())
            }

            /// Read every cell back, in order.
            pub fn to_bytes(&self) -> cellmem_core::CellResult<Vec<u8>> {
                self.run.to_bytes()
            }

            /// Reassemble the text. Byte sequences that are not valid UTF-8 are
            /// replaced with U+FFFD.
            pub fn to_text(&self) -> cellmem_core::CellResult<String> {
                self.run.to_bytes().map($crate::decode)
            }

            /// Release every cell. Calling it again is a no-op.
            pub fn free(&mut self) {
                self.run.free();
            }

            /// Walk the cells for debugging.
            pub fn dump(&self) -> $crate::Dump<'_, H> {
                $crate::Dump::new(&self.run)
            }

            /// The handles currently held, in index order.
            pub fn handles(&self) -> &[cellmem_core::Handle] {
                self.run.handles()
            }

            /// The heap the cells live on.
            pub fn heap(&self) -> &H {
                self.run.heap()
            }
        }
    };
}

mod cells;
pub mod dump;
pub mod immutable;
pub mod mutable;

pub use cellmem_core::{CellError, CellResult, Handle};
pub use cellmem_heap::RawHeap;
pub use cells::{CellView, Lifecycle};
pub use dump::Dump;
pub use immutable::CellString;
pub use mutable::MutableCellString;

fn decode(bytes: Vec<u8>) -> String {
    String::from_utf8(bytes).unwrap_or_else(|e| String::from_utf8_lossy(&e.into_bytes()).into_owned())
}
