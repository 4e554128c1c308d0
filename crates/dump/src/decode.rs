//! The [`Decoder`] trait for reading primitive values.

use std::io;

use crate::{Dump, DumpFailure};

/// A source of primitive values in some binary format.
///
/// The dual of [`Encoder`](crate::Encoder). Every method fails with
/// [`io::ErrorKind::UnexpectedEof`] when the input runs out and with
/// [`io::ErrorKind::InvalidData`] when the bytes cannot represent the
/// requested value.
pub trait Decoder {
    // =========================================================================
    // Required methods
    // =========================================================================

    /// Reads a single unsigned byte.
    fn read_u8(&mut self) -> io::Result<u8>;

    /// Reads a 16-bit unsigned integer.
    fn read_u16(&mut self) -> io::Result<u16>;

    /// Reads a 32-bit unsigned integer.
    fn read_u32(&mut self) -> io::Result<u32>;

    /// Reads a 64-bit unsigned integer.
    fn read_u64(&mut self) -> io::Result<u64>;

    /// Reads a 128-bit unsigned integer.
    fn read_u128(&mut self) -> io::Result<u128>;

    /// Reads a platform-sized unsigned integer.
    ///
    /// This is deserialized from a 64-bit value for portability.
    fn read_usize(&mut self) -> io::Result<usize>;

    /// Reads a single signed byte.
    fn read_i8(&mut self) -> io::Result<i8>;

    /// Reads a 16-bit signed integer.
    fn read_i16(&mut self) -> io::Result<i16>;

    /// Reads a 32-bit signed integer.
    fn read_i32(&mut self) -> io::Result<i32>;

    /// Reads a 64-bit signed integer.
    fn read_i64(&mut self) -> io::Result<i64>;

    /// Reads a 128-bit signed integer.
    fn read_i128(&mut self) -> io::Result<i128>;

    /// Reads a platform-sized signed integer.
    ///
    /// This is deserialized from a 64-bit value for portability.
    fn read_isize(&mut self) -> io::Result<isize>;

    /// Reads exactly `len` raw bytes.
    fn read_raw_bytes(&mut self, len: usize) -> io::Result<Vec<u8>>;

    // =========================================================================
    // Default implementations
    // =========================================================================

    /// Reads a boolean. Only `0` and `1` are accepted.
    fn read_bool(&mut self) -> io::Result<bool> {
        match self.read_u8()? {
            0 => Ok(false),
            1 => Ok(true),
            other => Err(io::Error::new(
                io::ErrorKind::InvalidData,
                format!("invalid boolean byte: {other}"),
            )),
        }
    }

    /// Reads a Unicode character from its 32-bit scalar value.
    fn read_char(&mut self) -> io::Result<char> {
        let code = self.read_u32()?;
        char::from_u32(code).ok_or_else(|| {
            io::Error::new(
                io::ErrorKind::InvalidData,
                format!("invalid Unicode scalar value: {code}"),
            )
        })
    }

    /// Reads a 32-bit float from its IEEE 754 bits.
    fn read_f32(&mut self) -> io::Result<f32> {
        Ok(f32::from_bits(self.read_u32()?))
    }

    /// Reads a 64-bit float from its IEEE 754 bits.
    fn read_f64(&mut self) -> io::Result<f64> {
        Ok(f64::from_bits(self.read_u64()?))
    }

    /// Reads a length-prefixed UTF-8 string.
    fn read_str(&mut self) -> io::Result<String> {
        let len = self.read_usize()?;
        let bytes = self.read_raw_bytes(len)?;
        String::from_utf8(bytes).map_err(|e| {
            io::Error::new(
                io::ErrorKind::InvalidData,
                format!("invalid UTF-8: {e}"),
            )
        })
    }

    /// Undumps a value of type `T` from this decoder.
    ///
    /// # Errors
    ///
    /// Returns [`DumpFailure`] if the input is truncated or malformed.
    fn undump<T: Dump>(&mut self) -> Result<T, DumpFailure> {
        T::undump(self)
    }
}
