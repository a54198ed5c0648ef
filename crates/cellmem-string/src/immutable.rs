//! [`CellString`]: a string whose content changes only wholesale.

use cellmem_heap::{RawHeap, SystemHeap};

use crate::cells::CellRun;

/// A string stored as one independently allocated heap cell per byte.
///
/// Content is fixed after construction except through [`set`](Self::set),
/// which replaces every cell. [`free`](Self::free) releases all cells and
/// leaves the string [`Lifecycle::Freed`](crate::Lifecycle::Freed): reads then fail with
/// [`CellError::NullHandle`](cellmem_core::CellError::NullHandle) until the
/// string is `set` again. Dropping a live string frees it.
#[derive(Debug)]
pub struct CellString<H: RawHeap = SystemHeap> {
    run: CellRun<H>,
}

impl_cell_string!(CellString);
