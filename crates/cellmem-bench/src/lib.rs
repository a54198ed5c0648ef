//! Benchmark inputs for cellmem.
//!
//! - [`sample_text`]: deterministic printable ASCII of a given length
//! - [`mutable_string`]: a live [`MutableCellString`] on the system heap

#![forbid(unsafe_code)]
#![deny(rustdoc::broken_intra_doc_links)]

use cellmem_core::CellResult;
use cellmem_string::MutableCellString;

/// Text lengths exercised by the string benchmarks.
pub const SIZES: [usize; 3] = [16, 256, 4096];

/// Printable ASCII text of exactly `len` bytes, cycling through `' '..='~'`.
pub fn sample_text(len: usize) -> String {
    (b' '..=b'~').cycle().take(len).map(char::from).collect()
}

/// A mutable cell string holding [`sample_text`] of `len` bytes.
pub fn mutable_string(len: usize) -> CellResult<MutableCellString> {
    MutableCellString::new(&sample_text(len))
}
