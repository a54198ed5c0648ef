//! Raw heap allocation for cellmem.
//!
//! Hands out integer [`Handle`]s to blocks of process heap memory and
//! reads or writes fixed-width values at caller-chosen addresses. This is
//! deliberately the unchecked layer: no bounds checks, no live-handle
//! tracking, no double-free detection. Those invariants belong to the
//! string layer built on top.
//!
//! This crate is one of two that may contain `unsafe` code (along with
//! the cell module of `cellmem-string`). All of it sits in `raw.rs`, with
//! the [`RawHeap`] trait declaring the unsafe entry points in `heap.rs`.
//!
//! # Quick start
//!
//! ```rust
//! use cellmem_heap::{RawHeap, SystemHeap};
//! use cellmem_core::width;
//!
//! let heap = SystemHeap::default();
//! let h = heap.allocate(width::INT).unwrap();
//! unsafe {
//!     heap.write_int32(h, 42);
//!     assert_eq!(heap.read_int32(h), 42);
//!     heap.free(h);
//! }
//! ```

#![deny(missing_docs)]
#![deny(rustdoc::broken_intra_doc_links)]
#![deny(unsafe_code)]

pub mod config;
pub mod heap;
mod raw;

pub use cellmem_core::{Handle, HeapError, HeapResult, Scalar};
pub use config::HeapConfig;
pub use heap::{RawHeap, SystemHeap};
