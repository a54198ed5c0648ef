//! Lazy diagnostic walk over a string's cells.

use std::iter::FusedIterator;

use cellmem_heap::RawHeap;

use crate::cells::{CellRun, CellView};

/// Iterator over the cells of a string, in index order.
///
/// Produced by `dump()` on either string type. Each item pairs a slot's
/// handle with the byte it holds; slots holding the null handle are
/// reported with `byte: None` rather than dereferenced. For debugging only.
pub struct Dump<'a, H: RawHeap> {
    run: &'a CellRun<H>,
    next: usize,
}

impl<'a, H: RawHeap> Dump<'a, H> {
    pub(crate) fn new(run: &'a CellRun<H>) -> Self {
        Self { run, next: 0 }
    }
}

impl<H: RawHeap> Iterator for Dump<'_, H> {
    type Item = CellView;

    fn next(&mut self) -> Option<CellView> {
        let view = self.run.view(self.next)?;
        self.next += 1;
        Some(view)
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        let remaining = self.run.len().saturating_sub(self.next);
        (remaining, Some(remaining))
    }
}

impl<H: RawHeap> ExactSizeIterator for Dump<'_, H> {}

impl<H: RawHeap> FusedIterator for Dump<'_, H> {}
