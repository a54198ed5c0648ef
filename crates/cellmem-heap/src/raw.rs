//! Low-level primitives for raw heap memory.
//!
//! Every pointer operation in the crate lives here. Handles cross the
//! integer boundary through exposed provenance: a block's payload address
//! is exposed when the handle is minted and recovered when it is
//! dereferenced.
//!
//! Block layout:
//!
//! ```text
//! base                      base + header_len = handle
//! │                         │
//! ▼                         ▼
//! ┌──────────┬──────────────┬──────────────────────────┐
//! │ size:usize│   padding    │     payload (size bytes) │
//! └──────────┴──────────────┴──────────────────────────┘
//! ```

#![allow(unsafe_code)]

use std::alloc::{self, Layout};
use std::ptr;

use cellmem_core::{Handle, HeapError, HeapResult, Scalar};

/// Layout of a block carrying `size` payload bytes behind a header of
/// `header_len` bytes, aligned to `header_len`.
pub(crate) fn block_layout(size: usize, header_len: usize) -> HeapResult<Layout> {
    let overflow = HeapError::LayoutOverflow {
        requested: size,
        align: header_len,
    };
    let total = size.checked_add(header_len).ok_or_else(|| overflow.clone())?;
    Layout::from_size_align(total, header_len).map_err(|_| overflow)
}

/// Allocate a block and write its size header.
///
/// Returns `None` if the platform allocator refuses the request.
/// `header_len` must be a power of two no smaller than `size_of::<usize>()`
/// and must be the alignment of `layout`.
pub(crate) fn alloc_block(
    layout: Layout,
    header_len: usize,
    size: usize,
    zeroed: bool,
) -> Option<Handle> {
    debug_assert!(header_len >= std::mem::size_of::<usize>());
    debug_assert_eq!(layout.align(), header_len);
    // SAFETY: the layout holds at least the header, so its size is non-zero.
    let base = unsafe {
        if zeroed {
            alloc::alloc_zeroed(layout)
        } else {
            alloc::alloc(layout)
        }
    };
    if base.is_null() {
        return None;
    }
    // SAFETY: `base` is aligned to `header_len >= align_of::<usize>()` and the
    // block is at least `header_len` bytes long, so both the header write and
    // the payload offset stay inside the allocation.
    unsafe {
        base.cast::<usize>().write(size);
        let payload = base.add(header_len);
        Some(Handle::from_addr(payload.expose_provenance()))
    }
}

/// Release a block minted by [`alloc_block`].
///
/// Returns the payload size recorded in the header.
///
/// # Safety
///
/// `handle` must be non-null, must have come from [`alloc_block`] with the
/// same `header_len`, and must not have been released before.
pub(crate) unsafe fn free_block(handle: Handle, header_len: usize, poison: Option<u8>) -> usize {
    let payload: *mut u8 = ptr::with_exposed_provenance_mut(handle.addr());
    // SAFETY: the caller guarantees the handle is a live payload pointer; the
    // header sits `header_len` bytes before it, inside the same allocation.
    unsafe {
        let base = payload.sub(header_len);
        let size = base.cast::<usize>().read();
        if let Some(byte) = poison {
            ptr::write_bytes(payload, byte, size);
        }
        // The same (size, align) pair passed `block_layout` at allocation.
        let layout = Layout::from_size_align_unchecked(size + header_len, header_len);
        alloc::dealloc(base, layout);
        size
    }
}

/// Read a scalar at `handle`. No alignment or bounds requirement beyond
/// the value fitting in live memory.
///
/// # Safety
///
/// `handle` must address `T::WIDTH` readable bytes.
pub(crate) unsafe fn read<T: Scalar>(handle: Handle) -> T {
    let p: *const T = ptr::with_exposed_provenance(handle.addr());
    // SAFETY: forwarded to the caller; every `Scalar` is valid for any bits.
    unsafe { p.read_unaligned() }
}

/// Write a scalar at `handle`.
///
/// # Safety
///
/// `handle` must address `T::WIDTH` writable bytes.
pub(crate) unsafe fn write<T: Scalar>(handle: Handle, value: T) {
    let p: *mut T = ptr::with_exposed_provenance_mut(handle.addr());
    // SAFETY: forwarded to the caller.
    unsafe { p.write_unaligned(value) }
}
