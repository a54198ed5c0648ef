//! Error types for the allocator and string layers.
//!
//! The allocator layer reports only platform failures and bad requests
//! ([`HeapError`]). The string layer owns the checked side of the trust
//! boundary and reports argument, range, and null-handle violations
//! ([`CellError`]) before any memory is touched.

use thiserror::Error;

/// Result alias for allocator operations.
pub type HeapResult<T> = Result<T, HeapError>;

/// Result alias for string-layer operations.
pub type CellResult<T> = Result<T, CellError>;

/// Errors from the raw allocator.
#[derive(Error, Clone, Debug, PartialEq, Eq)]
pub enum HeapError {
    /// The platform allocator could not satisfy the request.
    #[error("heap exhausted: could not allocate {requested} bytes")]
    Exhausted {
        /// Number of payload bytes requested.
        requested: usize,
    },
    /// The request plus its bookkeeping header does not form a valid layout.
    #[error("allocation of {requested} bytes at alignment {align} overflows the address space")]
    LayoutOverflow {
        /// Number of payload bytes requested.
        requested: usize,
        /// Alignment the allocation would have used.
        align: usize,
    },
    /// A heap configuration value failed validation.
    #[error("invalid heap configuration: {reason}")]
    InvalidConfig {
        /// What was wrong.
        reason: String,
    },
}

/// Errors from cell-backed strings.
#[derive(Error, Clone, Debug, PartialEq, Eq)]
pub enum CellError {
    /// An argument was rejected before any allocation happened.
    #[error("invalid argument: {reason}")]
    InvalidArgument {
        /// What was wrong.
        reason: String,
    },
    /// An index fell outside the permitted range.
    #[error("index {index} out of range for length {len}")]
    IndexOutOfRange {
        /// The rejected index.
        index: usize,
        /// Length of the string at the time of the call.
        len: usize,
    },
    /// A null handle would have been dereferenced: the string was freed,
    /// or never initialised.
    #[error("{}", null_handle_message(.index))]
    NullHandle {
        /// The slot holding the null handle, if there is one.
        index: Option<usize>,
    },
    /// The allocator failed while the string was acquiring cells.
    #[error("allocation failed: {0}")]
    Heap(#[from] HeapError),
}

fn null_handle_message(index: &Option<usize>) -> String {
    match index {
        Some(i) => format!("null handle at index {i}"),
        None => "null handle: string has been freed".to_string(),
    }
}
