//! Fixed-width scalar types the allocator can read and write.

/// Size constants, in bytes, for sizing `allocate` calls.
pub mod width {
    /// One byte.
    pub const BYTE: usize = 1;
    /// A 16-bit integer.
    pub const SHORT: usize = 2;
    /// A 32-bit integer.
    pub const INT: usize = 4;
    /// A 64-bit integer.
    pub const LONG: usize = 8;
    /// A 32-bit float.
    pub const FLOAT: usize = 4;
    /// A 64-bit float.
    pub const DOUBLE: usize = 8;
}

mod sealed {
    pub trait Sealed {}
}

/// A plain-old-data value with a fixed byte width.
///
/// Sealed: the allocator's typed accessors are only defined for the six
/// widths below, each of which is valid for every bit pattern.
pub trait Scalar: Copy + sealed::Sealed + 'static {
    /// Width of the value in bytes.
    const WIDTH: usize;
}

macro_rules! impl_scalar {
    ($($ty:ty => $width:expr),* $(,)?) => {
        $(
            impl sealed::Sealed for $ty {}
            impl Scalar for $ty {
                const WIDTH: usize = $width;
            }
        )*
    };
}

impl_scalar! {
    u8 => width::BYTE,
    i16 => width::SHORT,
    i32 => width::INT,
    i64 => width::LONG,
    f32 => width::FLOAT,
    f64 => width::DOUBLE,
}
