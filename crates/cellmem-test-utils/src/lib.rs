//! Test utilities for cellmem development.
//!
//! Provides instrumented [`RawHeap`](cellmem_heap::RawHeap) implementations
//! for leak checks and failure injection. See [`fixtures`].

#![deny(unsafe_code)]
#![allow(missing_docs)]
#![deny(rustdoc::broken_intra_doc_links)]

pub mod fixtures;

pub use fixtures::{CountingHeap, FailingHeap};
