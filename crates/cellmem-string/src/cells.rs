//! The owned handle sequence behind both string types.
//!
//! A [`CellRun`] owns one single-byte heap cell per character and keeps
//! their handles in index order. It is the checked side of the trust
//! boundary: every dereference in this crate happens here, after the
//! index has been range-checked and the handle has been checked against
//! [`Handle::NULL`].
//!
//! Invariants while [`Lifecycle::Live`]:
//!
//! - every slot holds a non-null handle to a live 1-byte allocation made
//!   by `heap`;
//! - no handle appears twice, and none is shared with another run.
//!
//! After [`CellRun::free`] the run is [`Lifecycle::Freed`]: every slot
//! holds `Handle::NULL` and the slot count is unchanged.
//!
//! Soundness rests on the `unsafe impl` of [`RawHeap`]: a non-null handle
//! from `allocate(1)` is a live byte no one else touches.
//!
//! Multi-cell edits acquire all new cells before touching `slots`, so a
//! failed allocation leaves the run exactly as it was.

#![allow(unsafe_code)]

use std::fmt;

use cellmem_core::{width, CellError, CellResult, Handle, HeapError};
use cellmem_heap::RawHeap;
use smallvec::SmallVec;
use tracing::debug;

/// Slots stored inline before the sequence spills to the heap.
const INLINE_SLOTS: usize = 16;

pub(crate) type Slots = SmallVec<[Handle; INLINE_SLOTS]>;

/// Lifecycle state of a cell-backed string.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Lifecycle {
    /// Every slot holds a live cell; all operations are permitted.
    Live,
    /// Every slot holds the null handle; reads and edits fail until the
    /// string is `set` again.
    Freed,
}

/// One cell as seen by a diagnostic dump.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct CellView {
    /// Position of the cell in the string.
    pub index: usize,
    /// Handle stored in the slot.
    pub handle: Handle,
    /// The cell's byte, or `None` if the slot holds the null handle.
    pub byte: Option<u8>,
}

impl fmt::Display for CellView {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.byte {
            Some(b) => write!(f, "@ mem location: {} - char: {}", self.handle, char::from(b)),
            None => write!(f, "@ mem location: {} - char: <null>", self.handle),
        }
    }
}

pub(crate) struct CellRun<H: RawHeap> {
    heap: H,
    slots: Slots,
    state: Lifecycle,
}

impl<H: RawHeap> CellRun<H> {
    pub(crate) fn new(bytes: &[u8], heap: H) -> CellResult<Self> {
        let slots = alloc_cells(&heap, bytes)?;
        debug!(len = slots.len(), "constructed cell run");
        Ok(Self {
            heap,
            slots,
            state: Lifecycle::Live,
        })
    }

    pub(crate) fn heap(&self) -> &H {
        &self.heap
    }

    pub(crate) fn len(&self) -> usize {
        self.slots.len()
    }

    pub(crate) fn state(&self) -> Lifecycle {
        self.state
    }

    pub(crate) fn handles(&self) -> &[Handle] {
        &self.slots
    }

    /// Range check, then null check. Never touches memory.
    fn checked_handle(&self, index: usize) -> CellResult<Handle> {
        let handle = *self
            .slots
            .get(index)
            .ok_or_else(|| CellError::IndexOutOfRange {
                index,
                len: self.slots.len(),
            })?;
        if handle.is_null() {
            return Err(CellError::NullHandle { index: Some(index) });
        }
        Ok(handle)
    }

    fn ensure_live(&self) -> CellResult<()> {
        match self.state {
            Lifecycle::Live => Ok(()),
            Lifecycle::Freed => Err(CellError::NullHandle { index: None }),
        }
    }

    pub(crate) fn byte_at(&self, index: usize) -> CellResult<u8> {
        let handle = self.checked_handle(index)?;
        // SAFETY: non-null slots hold live 1-byte cells owned by this run.
        Ok(unsafe { self.heap.read_byte(handle) })
    }

    pub(crate) fn to_bytes(&self) -> CellResult<Vec<u8>> {
        self.ensure_live()?;
        if let Some(index) = self.slots.iter().position(|h| h.is_null()) {
            return Err(CellError::NullHandle { index: Some(index) });
        }
        Ok(self
            .slots
            .iter()
            // SAFETY: all slots were just checked to be non-null, and
            // non-null slots hold live 1-byte cells owned by this run.
            .map(|&h| unsafe { self.heap.read_byte(h) })
            .collect())
    }

    /// Inspect a slot without failing on null.
    pub(crate) fn view(&self, index: usize) -> Option<CellView> {
        let handle = *self.slots.get(index)?;
        let byte = if handle.is_null() {
            None
        } else {
            // SAFETY: non-null slots hold live 1-byte cells owned by this run.
            Some(unsafe { self.heap.read_byte(handle) })
        };
        Some(CellView {
            index,
            handle,
            byte,
        })
    }

    /// Replace the whole content. Valid from either state.
    pub(crate) fn set(&mut self, bytes: &[u8]) -> CellResult<()> {
        let fresh = alloc_cells(&self.heap, bytes)?;
        let old = std::mem::replace(&mut self.slots, fresh);
        release(&self.heap, old);
        self.state = Lifecycle::Live;
        debug!(len = self.slots.len(), "reset cell run");
        Ok(())
    }

    /// Release every cell and null out the slots. Repeated calls are no-ops.
    pub(crate) fn free(&mut self) {
        if self.state == Lifecycle::Freed {
            return;
        }
        for slot in self.slots.iter_mut() {
            let handle = std::mem::replace(slot, Handle::NULL);
            // SAFETY: the handle was live and owned by this run; its slot now
            // holds NULL so it can never be released or read again.
            unsafe { self.heap.free(handle) };
        }
        self.state = Lifecycle::Freed;
        debug!(len = self.slots.len(), "freed cell run");
    }

    pub(crate) fn append(&mut self, bytes: &[u8]) -> CellResult<()> {
        self.ensure_live()?;
        let fresh = alloc_cells(&self.heap, bytes)?;
        self.slots.extend(fresh);
        Ok(())
    }

    pub(crate) fn remove_at(&mut self, index: usize) -> CellResult<u8> {
        let handle = self.checked_handle(index)?;
        // SAFETY: checked non-null, owned by this run.
        let byte = unsafe { self.heap.read_byte(handle) };
        self.slots.remove(index);
        // SAFETY: the handle has left the sequence and is released exactly once.
        unsafe { self.heap.free(handle) };
        Ok(byte)
    }

    pub(crate) fn insert_at(&mut self, byte: u8, index: usize) -> CellResult<()> {
        let len = self.slots.len();
        if index > len {
            return Err(CellError::IndexOutOfRange { index, len });
        }
        self.ensure_live()?;
        let handle = alloc_cell(&self.heap, byte)?;
        self.slots.insert(index, handle);
        Ok(())
    }
}

impl<H: RawHeap> Drop for CellRun<H> {
    fn drop(&mut self) {
        self.free();
    }
}

impl<H: RawHeap> fmt::Debug for CellRun<H> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CellRun")
            .field("state", &self.state)
            .field("slots", &self.slots.as_slice())
            .finish()
    }
}

fn alloc_cell<H: RawHeap>(heap: &H, byte: u8) -> CellResult<Handle> {
    let handle = heap.allocate(width::BYTE)?;
    if handle.is_null() {
        // A heap must not answer a 1-byte request with the sentinel.
        return Err(HeapError::Exhausted {
            requested: width::BYTE,
        }
        .into());
    }
    // SAFETY: the `RawHeap` contract makes a non-null handle from
    // `allocate(1)` a live byte owned by the caller.
    unsafe { heap.write_byte(handle, byte) };
    Ok(handle)
}

/// Allocate one cell per byte, all or nothing.
fn alloc_cells<H: RawHeap>(heap: &H, bytes: &[u8]) -> CellResult<Slots> {
    let mut slots = Slots::with_capacity(bytes.len());
    for &byte in bytes {
        match alloc_cell(heap, byte) {
            Ok(handle) => slots.push(handle),
            Err(e) => {
                debug!(
                    allocated = slots.len(),
                    requested = bytes.len(),
                    "rolling back partial cell allocation"
                );
                release(heap, slots);
                return Err(e);
            }
        }
    }
    Ok(slots)
}

fn release<H: RawHeap>(heap: &H, handles: Slots) {
    for handle in handles {
        // SAFETY: callers pass handles that were removed from (or never
        // entered) a run, so each is live, owned, and released once. Null
        // slots from a freed run are no-ops.
        unsafe { heap.free(handle) };
    }
}
