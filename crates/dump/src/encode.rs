//! The [`Encoder`] trait for emitting primitive values.

use std::io;

use crate::{Dump, DumpFailure};

/// A sink for primitive values in some binary format.
///
/// Implementors provide the low-level layout of primitives; [`Dump`]
/// implementations are written against this trait and never see the bytes
/// directly. The default methods delegate to the required ones and can be
/// overridden where a format wants a different layout.
///
/// All methods return [`io::Result`] so that writers backed by files or
/// sockets can report failures.
///
/// # Example
///
/// ```ignore
/// struct CountingEncoder {
///     written: usize,
/// }
///
/// impl Encoder for CountingEncoder {
///     fn emit_u8(&mut self, _: u8) -> io::Result<()> {
///         self.written += 1;
///         Ok(())
///     }
///
///     fn emit_raw_bytes(&mut self, s: &[u8]) -> io::Result<()> {
///         self.written += s.len();
///         Ok(())
///     }
///
///     // ... implement other required methods
/// }
/// ```
pub trait Encoder {
    // =========================================================================
    // Required methods
    // =========================================================================

    /// Emits a single unsigned byte.
    fn emit_u8(&mut self, v: u8) -> io::Result<()>;

    /// Emits a 16-bit unsigned integer.
    fn emit_u16(&mut self, v: u16) -> io::Result<()>;

    /// Emits a 32-bit unsigned integer.
    fn emit_u32(&mut self, v: u32) -> io::Result<()>;

    /// Emits a 64-bit unsigned integer.
    fn emit_u64(&mut self, v: u64) -> io::Result<()>;

    /// Emits a 128-bit unsigned integer.
    fn emit_u128(&mut self, v: u128) -> io::Result<()>;

    /// Emits a platform-sized unsigned integer.
    ///
    /// This is serialized as a 64-bit value for portability.
    fn emit_usize(&mut self, v: usize) -> io::Result<()>;

    /// Emits a single signed byte.
    fn emit_i8(&mut self, v: i8) -> io::Result<()>;

    /// Emits a 16-bit signed integer.
    fn emit_i16(&mut self, v: i16) -> io::Result<()>;

    /// Emits a 32-bit signed integer.
    fn emit_i32(&mut self, v: i32) -> io::Result<()>;

    /// Emits a 64-bit signed integer.
    fn emit_i64(&mut self, v: i64) -> io::Result<()>;

    /// Emits a 128-bit signed integer.
    fn emit_i128(&mut self, v: i128) -> io::Result<()>;

    /// Emits a platform-sized signed integer.
    ///
    /// This is serialized as a 64-bit value for portability.
    fn emit_isize(&mut self, v: isize) -> io::Result<()>;

    /// Emits raw bytes with no length prefix.
    fn emit_raw_bytes(&mut self, s: &[u8]) -> io::Result<()>;

    // =========================================================================
    // Default implementations
    // =========================================================================

    /// Emits a boolean as `1u8` or `0u8`.
    fn emit_bool(&mut self, v: bool) -> io::Result<()> {
        self.emit_u8(u8::from(v))
    }

    /// Emits a Unicode character as its 32-bit scalar value.
    fn emit_char(&mut self, v: char) -> io::Result<()> {
        self.emit_u32(v as u32)
    }

    /// Emits a 32-bit float using its IEEE 754 bits.
    fn emit_f32(&mut self, v: f32) -> io::Result<()> {
        self.emit_u32(v.to_bits())
    }

    /// Emits a 64-bit float using its IEEE 754 bits.
    fn emit_f64(&mut self, v: f64) -> io::Result<()> {
        self.emit_u64(v.to_bits())
    }

    /// Emits a string as a `usize` length followed by its UTF-8 bytes.
    fn emit_str(&mut self, v: &str) -> io::Result<()> {
        self.emit_usize(v.len())?;
        self.emit_raw_bytes(v.as_bytes())
    }

    /// Dumps `value` into this encoder.
    ///
    /// # Errors
    ///
    /// Propagates the failure of the underlying writer.
    fn dump<T: Dump>(&mut self, value: &T) -> Result<(), DumpFailure> {
        value.dump(self)
    }
}
