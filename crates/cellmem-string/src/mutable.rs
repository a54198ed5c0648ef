//! [`MutableCellString`]: a cell-backed string with structural edits.

use cellmem_core::{CellError, CellResult};
use cellmem_heap::{RawHeap, SystemHeap};

use crate::cells::CellRun;

/// A cell-backed string that supports append, insert, and remove.
///
/// Shares the storage model and lifecycle of
/// [`CellString`](crate::CellString): one heap cell per byte, referenced
/// from an ordered handle sequence. Every edit either completes or leaves
/// the string exactly as it was; existing cells are never reallocated by
/// an edit.
///
/// ```rust
/// use cellmem_string::MutableCellString;
///
/// let mut s = MutableCellString::new("Hello, World!").unwrap();
/// s.append("Hello, World!").unwrap();
/// assert_eq!(s.to_text().unwrap(), "Hello, World!Hello, World!");
///
/// assert_eq!(s.remove_at(0).unwrap(), 'H');
/// assert!(s.to_text().unwrap().starts_with("ello,"));
/// s.insert_at('H', 0).unwrap();
/// assert!(s.to_text().unwrap().starts_with("Hello,"));
/// ```
#[derive(Debug)]
pub struct MutableCellString<H: RawHeap = SystemHeap> {
    run: CellRun<H>,
}

impl_cell_string!(MutableCellString);

impl<H: RawHeap> MutableCellString<H> {
    /// Append `text`, one new cell per byte.
    ///
    /// Existing cells are untouched. If any allocation fails, the cells
    /// already taken for this call are released and the string is unchanged.
    pub fn append(&mut self, text: &str) -> CellResult<()> {
        self.run.append(text.as_bytes())
    }

    /// Remove the character at `index`, releasing its cell.
    ///
    /// Requires `index < len()`. Later characters shift down by one.
    pub fn remove_at(&mut self, index: usize) -> CellResult<char> {
        self.run.remove_at(index).map(char::from)
    }

    /// Insert `ch` before position `index`.
    ///
    /// `index == len()` appends. Only ASCII characters fit in a single
    /// cell; anything else is rejected with
    /// [`CellError::InvalidArgument`].
    pub fn insert_at(&mut self, ch: char, index: usize) -> CellResult<()> {
        if !ch.is_ascii() {
            return Err(CellError::InvalidArgument {
                reason: format!("character {ch:?} does not fit in a single-byte cell"),
            });
        }
        self.run.insert_at(ch as u8, index)
    }

    /// Insert a raw byte before position `index`.
    pub fn insert_byte_at(&mut self, byte: u8, index: usize) -> CellResult<()> {
        self.run.insert_at(byte, index)
    }

    /// Whether `needle` occurs in the text.
    ///
    /// The empty needle always matches, even on a freed string. Otherwise
    /// the full text is reassembled and searched.
    pub fn contains(&self, needle: &str) -> CellResult<bool> {
        if needle.is_empty() {
            return Ok(true);
        }
        Ok(self.to_text()?.contains(needle))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use cellmem_core::Handle;

    #[test]
    fn append_extends_without_touching_existing_cells() {
        let mut s = MutableCellString::new("Hello, World!").unwrap();
        let before: Vec<Handle> = s.handles().to_vec();
        s.append("Hello, World!").unwrap();
        assert_eq!(s.to_text().unwrap(), "Hello, World!Hello, World!");
        assert_eq!(&s.handles()[..before.len()], before.as_slice());
        assert_eq!(s.len(), 26);
    }

    #[test]
    fn remove_then_insert_restores_prefix() {
        let mut s = MutableCellString::new("Hello, World!Hello, World!").unwrap();
        assert_eq!(s.remove_at(0).unwrap(), 'H');
        assert!(s.to_text().unwrap().starts_with("ello,"));
        s.insert_at('H', 0).unwrap();
        assert!(s.to_text().unwrap().starts_with("Hello,"));
    }

    #[test]
    fn remove_out_of_range() {
        let mut s = MutableCellString::new("ab").unwrap();
        assert_eq!(
            s.remove_at(2),
            Err(CellError::IndexOutOfRange { index: 2, len: 2 })
        );
        assert_eq!(s.to_text().unwrap(), "ab");
    }

    #[test]
    fn insert_bounds_are_inclusive_of_len() {
        let mut s = MutableCellString::new("ab").unwrap();
        s.insert_at('c', 2).unwrap();
        assert_eq!(s.to_text().unwrap(), "abc");
        assert_eq!(
            s.insert_at('d', 4),
            Err(CellError::IndexOutOfRange { index: 4, len: 3 })
        );
    }

    #[test]
    fn insert_into_middle_shifts_tail() {
        let mut s = MutableCellString::new("ac").unwrap();
        s.insert_at('b', 1).unwrap();
        assert_eq!(s.to_text().unwrap(), "abc");
    }

    #[test]
    fn non_ascii_insert_is_invalid_argument() {
        let mut s = MutableCellString::new("x").unwrap();
        let err = s.insert_at('é', 0).unwrap_err();
        assert!(matches!(err, CellError::InvalidArgument { .. }));
        assert_eq!(s.len(), 1);
    }

    #[test]
    fn insert_byte_accepts_any_byte() {
        let mut s = MutableCellString::new("").unwrap();
        s.insert_byte_at(0xFF, 0).unwrap();
        assert_eq!(s.byte_at(0).unwrap(), 0xFF);
        assert_eq!(s.to_text().unwrap(), "\u{FFFD}");
    }

    #[test]
    fn contains_empty_is_always_true() {
        let mut s = MutableCellString::new("abc").unwrap();
        assert!(s.contains("").unwrap());
        s.free();
        assert!(s.contains("").unwrap());
    }

    #[test]
    fn contains_searches_substrings() {
        let s = MutableCellString::new("Hello, World!").unwrap();
        assert!(s.contains("World").unwrap());
        assert!(s.contains("Hello, World!").unwrap());
        assert!(!s.contains("world").unwrap());
        assert!(!s.contains("Hello, World!!").unwrap());
    }

    #[test]
    fn edits_on_freed_string_fail_with_null_handle() {
        let mut s = MutableCellString::new("abc").unwrap();
        s.free();
        assert_eq!(s.append("d"), Err(CellError::NullHandle { index: None }));
        assert_eq!(s.remove_at(0), Err(CellError::NullHandle { index: Some(0) }));
        assert_eq!(s.insert_at('z', 0), Err(CellError::NullHandle { index: None }));
        assert_eq!(s.contains("a"), Err(CellError::NullHandle { index: None }));
        assert!(s.handles().iter().all(|h| h.is_null()));
    }

    #[test]
    fn remove_every_character() {
        let mut s = MutableCellString::new("abc").unwrap();
        while !s.is_empty() {
            s.remove_at(0).unwrap();
        }
        assert!(s.is_live());
        assert_eq!(s.to_text().unwrap(), "");
    }
}
