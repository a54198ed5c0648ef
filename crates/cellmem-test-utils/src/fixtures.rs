//! Reusable heap fixtures.
//!
//! - [`CountingHeap`]: tracks live handles; panics on a release of a
//!   handle it does not consider live.
//! - [`FailingHeap`]: exhausts deterministically after N allocations.
//!
//! Both wrap [`SystemHeap`] and share their counters between clones
//! through `Rc`, so a test can hand a clone to the code under test and
//! inspect the original afterwards. They are single-threaded, as is the
//! code they instrument.

#![allow(unsafe_code)]

use std::cell::{Cell, RefCell};
use std::collections::HashSet;
use std::rc::Rc;

use cellmem_core::{Handle, HeapError, HeapResult};
use cellmem_heap::{RawHeap, SystemHeap};

#[derive(Debug, Default)]
struct Ledger {
    live: HashSet<Handle>,
    allocations: usize,
    frees: usize,
}

/// A system heap that records every allocation and release.
///
/// Useful for leak checks (`live_count() == 0` after the value under test
/// is gone) and for catching double releases, which panic.
#[derive(Clone, Debug, Default)]
pub struct CountingHeap {
    inner: SystemHeap,
    ledger: Rc<RefCell<Ledger>>,
}

impl CountingHeap {
    pub fn new() -> Self {
        Self::default()
    }

    /// Handles allocated and not yet released.
    pub fn live_count(&self) -> usize {
        self.ledger.borrow().live.len()
    }

    /// Successful non-null allocations so far.
    pub fn allocations(&self) -> usize {
        self.ledger.borrow().allocations
    }

    /// Releases of non-null handles so far.
    pub fn frees(&self) -> usize {
        self.ledger.borrow().frees
    }

    /// Whether `handle` is currently live on this heap.
    pub fn is_live(&self, handle: Handle) -> bool {
        self.ledger.borrow().live.contains(&handle)
    }
}

// SAFETY: every handle comes straight from the inner `SystemHeap`.
unsafe impl RawHeap for CountingHeap {
    fn allocate(&self, size: usize) -> HeapResult<Handle> {
        let handle = self.inner.allocate(size)?;
        if !handle.is_null() {
            let mut ledger = self.ledger.borrow_mut();
            ledger.live.insert(handle);
            ledger.allocations += 1;
        }
        Ok(handle)
    }

    unsafe fn free(&self, handle: Handle) {
        if handle.is_null() {
            return;
        }
        {
            let mut ledger = self.ledger.borrow_mut();
            assert!(
                ledger.live.remove(&handle),
                "release of handle {handle} that is not live"
            );
            ledger.frees += 1;
        }
        // SAFETY: the ledger confirmed the handle is live on the inner heap.
        unsafe { self.inner.free(handle) };
    }
}

/// Succeeds a fixed number of allocations, then reports exhaustion.
///
/// Useful for testing that multi-cell operations roll back cleanly when
/// the heap gives out part way through. Releases are always honoured.
#[derive(Clone, Debug)]
pub struct FailingHeap {
    inner: CountingHeap,
    remaining: Rc<Cell<usize>>,
}

impl FailingHeap {
    /// Create a heap that allows `succeed_count` non-empty allocations.
    pub fn new(succeed_count: usize) -> Self {
        Self {
            inner: CountingHeap::new(),
            remaining: Rc::new(Cell::new(succeed_count)),
        }
    }

    /// Allocations left before the heap starts failing.
    pub fn remaining(&self) -> usize {
        self.remaining.get()
    }

    /// Reset the allocation allowance.
    pub fn refill(&self, succeed_count: usize) {
        self.remaining.set(succeed_count);
    }

    /// The counters of the underlying heap.
    pub fn counter(&self) -> &CountingHeap {
        &self.inner
    }
}

// SAFETY: allocations either fail or are forwarded to `CountingHeap`.
unsafe impl RawHeap for FailingHeap {
    fn allocate(&self, size: usize) -> HeapResult<Handle> {
        if size == 0 {
            return Ok(Handle::NULL);
        }
        let left = self.remaining.get();
        if left == 0 {
            return Err(HeapError::Exhausted { requested: size });
        }
        self.remaining.set(left - 1);
        self.inner.allocate(size)
    }

    unsafe fn free(&self, handle: Handle) {
        // SAFETY: forwarded to the caller.
        unsafe { self.inner.free(handle) };
    }
}
