//! The [`RawHeap`] trait and the process-heap implementation.
//!
//! `RawHeap` is the unchecked side of the trust boundary. It hands out
//! integer handles and reads or writes fixed-width values at whatever
//! address it is given. It does not know which handles are live, does not
//! bounds-check accesses against the original request, and does not
//! protect against double release. Callers that need those guarantees
//! (the cell-string layer) enforce them on top.

#![allow(unsafe_code)]

use cellmem_core::{Handle, HeapError, HeapResult, Scalar};
use tracing::{trace, warn};

use crate::config::HeapConfig;
use crate::raw;

/// A gateway to raw heap memory addressed by [`Handle`]s.
///
/// Implementors provide `allocate` and `free`; the typed accessors have
/// default implementations that go straight to memory.
///
/// # Safety
///
/// Safe callers write through the handles `allocate` returns. A non-null
/// `Ok(handle)` from `allocate(size)` must address `size` bytes of live,
/// writable memory that no one else uses until the handle is passed to
/// `free`.
///
/// Implementing the trait therefore requires `unsafe impl`:
///
/// ```compile_fail
/// use cellmem_heap::{Handle, HeapResult, RawHeap};
///
/// struct Fabricated;
///
/// impl RawHeap for Fabricated {
///     fn allocate(&self, _size: usize) -> HeapResult<Handle> {
///         Ok(Handle::from_addr(8))
///     }
///     unsafe fn free(&self, _handle: Handle) {}
/// }
/// ```
///
/// A wrapper that forwards to a sound heap can vouch for it:
///
/// ```
/// use cellmem_heap::{Handle, HeapResult, RawHeap, SystemHeap};
///
/// struct Forwarding(SystemHeap);
///
/// // SAFETY: every handle comes from the inner `SystemHeap`.
/// unsafe impl RawHeap for Forwarding {
///     fn allocate(&self, size: usize) -> HeapResult<Handle> {
///         self.0.allocate(size)
///     }
///     unsafe fn free(&self, handle: Handle) {
///         unsafe { self.0.free(handle) }
///     }
/// }
///
/// let heap = Forwarding(SystemHeap::default());
/// let h = heap.allocate(1).unwrap();
/// unsafe {
///     heap.write_byte(h, b'x');
///     assert_eq!(heap.read_byte(h), b'x');
///     heap.free(h);
/// }
/// ```
pub unsafe trait RawHeap {
    /// Request `size` bytes.
    ///
    /// A `size` of zero is an explicit no-op that returns [`Handle::NULL`]
    /// without touching the heap. Any other success returns a non-null
    /// handle. Platform refusal is reported as an error, never as a
    /// usable-looking handle.
    fn allocate(&self, size: usize) -> HeapResult<Handle>;

    /// Release memory obtained from [`allocate`](RawHeap::allocate).
    ///
    /// Releasing [`Handle::NULL`] is a no-op.
    ///
    /// # Safety
    ///
    /// `handle` must be null or a live handle returned by `allocate` on a
    /// heap with the same configuration, and must not be used afterwards.
    unsafe fn free(&self, handle: Handle);

    /// Read a `T` starting at `handle`.
    ///
    /// # Safety
    ///
    /// `handle` must address at least `T::WIDTH` bytes of live memory. No
    /// alignment is required.
    unsafe fn read<T: Scalar>(&self, handle: Handle) -> T {
        debug_assert!(!handle.is_null(), "read through the null handle");
        // SAFETY: forwarded to the caller.
        unsafe { raw::read(handle) }
    }

    /// Write a `T` starting at `handle`.
    ///
    /// # Safety
    ///
    /// `handle` must address at least `T::WIDTH` bytes of live memory.
    unsafe fn write<T: Scalar>(&self, handle: Handle, value: T) {
        debug_assert!(!handle.is_null(), "write through the null handle");
        // SAFETY: forwarded to the caller.
        unsafe { raw::write(handle, value) }
    }

    /// Read one byte.
    ///
    /// # Safety
    ///
    /// See [`read`](RawHeap::read).
    unsafe fn read_byte(&self, handle: Handle) -> u8 {
        unsafe { self.read(handle) }
    }

    /// Write one byte.
    ///
    /// # Safety
    ///
    /// See [`write`](RawHeap::write).
    unsafe fn write_byte(&self, handle: Handle, value: u8) {
        unsafe { self.write(handle, value) }
    }

    /// Read a 16-bit integer.
    ///
    /// # Safety
    ///
    /// See [`read`](RawHeap::read).
    unsafe fn read_short(&self, handle: Handle) -> i16 {
        unsafe { self.read(handle) }
    }

    /// Write a 16-bit integer.
    ///
    /// # Safety
    ///
    /// See [`write`](RawHeap::write).
    unsafe fn write_short(&self, handle: Handle, value: i16) {
        unsafe { self.write(handle, value) }
    }

    /// Read a 32-bit integer.
    ///
    /// # Safety
    ///
    /// See [`read`](RawHeap::read).
    unsafe fn read_int32(&self, handle: Handle) -> i32 {
        unsafe { self.read(handle) }
    }

    /// Write a 32-bit integer.
    ///
    /// # Safety
    ///
    /// See [`write`](RawHeap::write).
    unsafe fn write_int32(&self, handle: Handle, value: i32) {
        unsafe { self.write(handle, value) }
    }

    /// Read a 64-bit integer.
    ///
    /// # Safety
    ///
    /// See [`read`](RawHeap::read).
    unsafe fn read_int64(&self, handle: Handle) -> i64 {
        unsafe { self.read(handle) }
    }

    /// Write a 64-bit integer.
    ///
    /// # Safety
    ///
    /// See [`write`](RawHeap::write).
    unsafe fn write_int64(&self, handle: Handle, value: i64) {
        unsafe { self.write(handle, value) }
    }

    /// Read a 32-bit float.
    ///
    /// # Safety
    ///
    /// See [`read`](RawHeap::read).
    unsafe fn read_float32(&self, handle: Handle) -> f32 {
        unsafe { self.read(handle) }
    }

    /// Write a 32-bit float.
    ///
    /// # Safety
    ///
    /// See [`write`](RawHeap::write).
    unsafe fn write_float32(&self, handle: Handle, value: f32) {
        unsafe { self.write(handle, value) }
    }

    /// Read a 64-bit float.
    ///
    /// # Safety
    ///
    /// See [`read`](RawHeap::read).
    unsafe fn read_float64(&self, handle: Handle) -> f64 {
        unsafe { self.read(handle) }
    }

    /// Write a 64-bit float.
    ///
    /// # Safety
    ///
    /// See [`write`](RawHeap::write).
    unsafe fn write_float64(&self, handle: Handle, value: f64) {
        unsafe { self.write(handle, value) }
    }
}

/// The process heap, reached through the global allocator.
///
/// Holds nothing but its configuration, so it is `Copy` and any number of
/// owners may share one. Each block carries a small size header so that
/// `free` can reconstruct the layout; no table of live handles is kept.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct SystemHeap {
    config: HeapConfig,
}

impl SystemHeap {
    /// Create a heap with a validated configuration.
    pub fn new(config: HeapConfig) -> HeapResult<Self> {
        config.validate()?;
        Ok(Self { config })
    }

    /// The configuration this heap was built with.
    pub fn config(&self) -> &HeapConfig {
        &self.config
    }
}

// SAFETY: every non-null handle is the payload of a fresh `alloc_block`
// sized for the request, and stays allocated until `free`.
unsafe impl RawHeap for SystemHeap {
    fn allocate(&self, size: usize) -> HeapResult<Handle> {
        if size == 0 {
            return Ok(Handle::NULL);
        }
        let header_len = self.config.header_len();
        let layout = raw::block_layout(size, header_len)?;
        match raw::alloc_block(layout, header_len, size, self.config.zero_fill) {
            Some(handle) => {
                trace!(%handle, size, "allocated block");
                Ok(handle)
            }
            None => {
                warn!(requested = size, align = header_len, "heap refused allocation");
                Err(HeapError::Exhausted { requested: size })
            }
        }
    }

    unsafe fn free(&self, handle: Handle) {
        if handle.is_null() {
            return;
        }
        let poison = self
            .config
            .poison_on_free
            .then_some(HeapConfig::POISON_BYTE);
        // SAFETY: the caller guarantees `handle` is live and came from a heap
        // with this configuration, hence from `alloc_block` with this header.
        let size = unsafe { raw::free_block(handle, self.config.header_len(), poison) };
        trace!(%handle, size, "freed block");
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use cellmem_core::width;

    #[test]
    fn zero_size_returns_null() {
        let heap = SystemHeap::default();
        assert_eq!(heap.allocate(0).unwrap(), Handle::NULL);
    }

    #[test]
    fn int32_round_trip() {
        let heap = SystemHeap::default();
        let h = heap.allocate(width::INT).unwrap();
        assert!(!h.is_null());
        unsafe {
            heap.write_int32(h, 42);
            assert_eq!(heap.read_int32(h), 42);
            heap.free(h);
        }
        assert_eq!(heap.allocate(0).unwrap(), Handle::NULL);
    }

    #[test]
    fn every_width_round_trips() {
        let heap = SystemHeap::default();
        let h = heap.allocate(width::DOUBLE).unwrap();
        unsafe {
            heap.write_byte(h, 0xAB);
            assert_eq!(heap.read_byte(h), 0xAB);
            heap.write_short(h, -1234);
            assert_eq!(heap.read_short(h), -1234);
            heap.write_int64(h, i64::MIN + 1);
            assert_eq!(heap.read_int64(h), i64::MIN + 1);
            heap.write_float32(h, 1.5);
            assert_eq!(heap.read_float32(h), 1.5);
            heap.write_float64(h, 3.141592653);
            assert_eq!(heap.read_float64(h), 3.141592653);
            heap.free(h);
        }
    }

    #[test]
    fn zero_fill_clears_new_blocks() {
        let heap = SystemHeap::default();
        let h = heap.allocate(width::LONG).unwrap();
        unsafe {
            assert_eq!(heap.read_int64(h), 0);
            heap.free(h);
        }
    }

    #[test]
    fn allocations_honour_alignment() {
        let heap = SystemHeap::new(HeapConfig {
            alignment: 64,
            ..HeapConfig::new()
        })
        .unwrap();
        let handles: Vec<Handle> = (0..8).map(|_| heap.allocate(1).unwrap()).collect();
        for &h in &handles {
            assert_eq!(h.addr() % 64, 0);
        }
        for h in handles {
            unsafe { heap.free(h) };
        }
    }

    #[test]
    fn distinct_live_allocations_get_distinct_handles() {
        let heap = SystemHeap::default();
        let a = heap.allocate(1).unwrap();
        let b = heap.allocate(1).unwrap();
        assert_ne!(a, b);
        unsafe {
            heap.free(a);
            heap.free(b);
        }
    }

    #[test]
    fn free_null_is_noop() {
        let heap = SystemHeap::default();
        unsafe { heap.free(Handle::NULL) };
    }

    #[test]
    fn poisoning_heap_still_frees_cleanly() {
        let heap = SystemHeap::new(HeapConfig {
            poison_on_free: true,
            ..HeapConfig::new()
        })
        .unwrap();
        let h = heap.allocate(32).unwrap();
        unsafe {
            heap.write_int32(h.offset(28).unwrap(), 7);
            heap.free(h);
        }
    }

    #[test]
    fn invalid_config_rejected() {
        let result = SystemHeap::new(HeapConfig {
            alignment: 3,
            ..HeapConfig::new()
        });
        assert!(matches!(result, Err(HeapError::InvalidConfig { .. })));
    }

    #[test]
    fn oversized_request_is_an_error_not_a_handle() {
        let heap = SystemHeap::default();
        let result = heap.allocate(usize::MAX);
        assert!(matches!(result, Err(HeapError::LayoutOverflow { .. })));
    }

    #[test]
    fn unsatisfiable_request_reports_exhaustion() {
        let heap = SystemHeap::default();
        let result = heap.allocate(isize::MAX as usize / 2);
        assert_eq!(
            result,
            Err(HeapError::Exhausted {
                requested: isize::MAX as usize / 2
            })
        );
    }

    mod proptests {
        use super::*;
        use proptest::prelude::*;

        proptest! {
            #[test]
            fn int64_at_any_offset_round_trips(
                size in 8usize..256,
                offset in 0usize..248,
                value in any::<i64>(),
            ) {
                prop_assume!(offset + 8 <= size);
                let heap = SystemHeap::default();
                let h = heap.allocate(size).unwrap();
                let at = h.offset(offset).unwrap();
                unsafe {
                    heap.write_int64(at, value);
                    prop_assert_eq!(heap.read_int64(at), value);
                    heap.free(h);
                }
            }

            #[test]
            fn nonzero_sizes_never_return_null(size in 1usize..4096) {
                let heap = SystemHeap::default();
                let h = heap.allocate(size).unwrap();
                prop_assert!(!h.is_null());
                unsafe { heap.free(h) };
            }
        }
    }
}
