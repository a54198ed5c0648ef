//! Integer handles to raw heap allocations.

use std::fmt;

/// Address of a single raw allocation, expressed as an integer.
///
/// `Handle(0)` is the universal null sentinel: it is never returned for a
/// live allocation, and dereferencing it is a programming error. Holding a
/// `Handle` conveys no ownership and no validity guarantee; the allocator
/// does not track which handles are live.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Default)]
#[repr(transparent)]
pub struct Handle(usize);

impl Handle {
    /// The null handle. Denotes "no allocation".
    pub const NULL: Handle = Handle(0);

    /// Wrap a raw address.
    ///
    /// Any integer is accepted. Fabricating a handle does not make it safe
    /// to read or write through.
    pub const fn from_addr(addr: usize) -> Self {
        Self(addr)
    }

    /// The raw address.
    pub const fn addr(self) -> usize {
        self.0
    }

    /// Whether this is the null sentinel.
    pub const fn is_null(self) -> bool {
        self.0 == 0
    }

    /// A handle `bytes` past this one, for addressing inside a
    /// multi-byte allocation.
    ///
    /// Returns `None` for the null handle or on address overflow.
    pub fn offset(self, bytes: usize) -> Option<Handle> {
        if self.is_null() {
            return None;
        }
        self.0.checked_add(bytes).map(Handle)
    }
}

impl fmt::Display for Handle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:#x}", self.0)
    }
}

impl From<Handle> for usize {
    fn from(h: Handle) -> Self {
        h.0
    }
}
