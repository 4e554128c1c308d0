//! Postcard-style binary layout for primitives.
//!
//! [`PostcardEncoder`] and [`PostcardDecoder`] implement [`Encoder`] and
//! [`Decoder`] with a layout close to the
//! [`postcard`](https://docs.rs/postcard) crate.
//!
//! # Format Overview
//!
//! - **Unsigned integers** wider than a byte use LEB128 varints: each byte
//!   carries 7 bits of payload and the high bit marks continuation.
//! - **Signed integers** wider than a byte are zigzag-mapped to unsigned before
//!   the varint step, so small negative numbers stay short.
//! - `u8`, `i8` and `bool` take exactly one byte.
//! - `f32` and `f64` are little-endian IEEE 754.
//! - Strings carry a varint length prefix.

use std::io::{self, Read, Write};

use crate::{Decoder, Encoder};

// =============================================================================
// Varint helpers
// =============================================================================

/// Writes `value` as a LEB128 varint into `buf`, returning the number of
/// bytes used.
macro_rules! encode_varint {
    ($name:ident, $ty:ty, $max:expr) => {
        #[inline]
        #[allow(clippy::cast_possible_truncation)]
        const fn $name(mut value: $ty, buf: &mut [u8; $max]) -> usize {
            let mut i = 0;
            while value >= 0x80 {
                buf[i] = (value as u8) | 0x80;
                value >>= 7;
                i += 1;
            }
            buf[i] = value as u8;
            i + 1
        }
    };
}

const MAX_VARINT_U16_BYTES: usize = 3;
const MAX_VARINT_U32_BYTES: usize = 5;
const MAX_VARINT_U64_BYTES: usize = 10;
const MAX_VARINT_U128_BYTES: usize = 19;

encode_varint!(encode_varint_u16, u16, MAX_VARINT_U16_BYTES);
encode_varint!(encode_varint_u32, u32, MAX_VARINT_U32_BYTES);
encode_varint!(encode_varint_u64, u64, MAX_VARINT_U64_BYTES);
encode_varint!(encode_varint_u128, u128, MAX_VARINT_U128_BYTES);

macro_rules! zigzag {
    ($encode:ident, $decode:ident, $signed:ty, $unsigned:ty) => {
        #[inline]
        #[allow(clippy::cast_sign_loss)]
        const fn $encode(value: $signed) -> $unsigned {
            ((value << 1) ^ (value >> (<$signed>::BITS - 1))) as $unsigned
        }

        #[inline]
        #[allow(clippy::cast_possible_wrap)]
        const fn $decode(value: $unsigned) -> $signed {
            ((value >> 1) as $signed) ^ (-((value & 1) as $signed))
        }
    };
}

zigzag!(zigzag_encode_i16, zigzag_decode_i16, i16, u16);
zigzag!(zigzag_encode_i32, zigzag_decode_i32, i32, u32);
zigzag!(zigzag_encode_i64, zigzag_decode_i64, i64, u64);
zigzag!(zigzag_encode_i128, zigzag_decode_i128, i128, u128);

// =============================================================================
// PostcardEncoder
// =============================================================================

/// A postcard-style encoder over any [`Write`] implementation.
///
/// # Example
///
/// ```ignore
/// use picklejar_dump::{Encoder, PostcardEncoder};
///
/// let mut encoder = PostcardEncoder::new(Vec::new());
/// encoder.emit_u32(300).unwrap();
/// assert_eq!(encoder.into_inner(), vec![0xAC, 0x02]);
/// ```
#[derive(Debug)]
pub struct PostcardEncoder<W> {
    writer: W,
}

impl<W> PostcardEncoder<W> {
    /// Creates a new encoder wrapping the given writer.
    #[must_use]
    pub const fn new(writer: W) -> Self { Self { writer } }

    /// Returns a reference to the underlying writer.
    #[must_use]
    pub const fn get_ref(&self) -> &W { &self.writer }

    /// Returns a mutable reference to the underlying writer.
    #[must_use]
    #[allow(clippy::missing_const_for_fn)]
    pub fn get_mut(&mut self) -> &mut W { &mut self.writer }

    /// Consumes the encoder and returns the underlying writer.
    #[must_use]
    pub fn into_inner(self) -> W { self.writer }
}

impl<W: Write> Encoder for PostcardEncoder<W> {
    fn emit_u8(&mut self, v: u8) -> io::Result<()> {
        self.writer.write_all(&[v])
    }

    fn emit_u16(&mut self, v: u16) -> io::Result<()> {
        let mut buf = [0u8; MAX_VARINT_U16_BYTES];
        let len = encode_varint_u16(v, &mut buf);
        self.writer.write_all(&buf[..len])
    }

    fn emit_u32(&mut self, v: u32) -> io::Result<()> {
        let mut buf = [0u8; MAX_VARINT_U32_BYTES];
        let len = encode_varint_u32(v, &mut buf);
        self.writer.write_all(&buf[..len])
    }

    fn emit_u64(&mut self, v: u64) -> io::Result<()> {
        let mut buf = [0u8; MAX_VARINT_U64_BYTES];
        let len = encode_varint_u64(v, &mut buf);
        self.writer.write_all(&buf[..len])
    }

    fn emit_u128(&mut self, v: u128) -> io::Result<()> {
        let mut buf = [0u8; MAX_VARINT_U128_BYTES];
        let len = encode_varint_u128(v, &mut buf);
        self.writer.write_all(&buf[..len])
    }

    fn emit_usize(&mut self, v: usize) -> io::Result<()> {
        self.emit_u64(v as u64)
    }

    #[allow(clippy::cast_sign_loss)]
    fn emit_i8(&mut self, v: i8) -> io::Result<()> {
        self.writer.write_all(&[v as u8])
    }

    fn emit_i16(&mut self, v: i16) -> io::Result<()> {
        self.emit_u16(zigzag_encode_i16(v))
    }

    fn emit_i32(&mut self, v: i32) -> io::Result<()> {
        self.emit_u32(zigzag_encode_i32(v))
    }

    fn emit_i64(&mut self, v: i64) -> io::Result<()> {
        self.emit_u64(zigzag_encode_i64(v))
    }

    fn emit_i128(&mut self, v: i128) -> io::Result<()> {
        self.emit_u128(zigzag_encode_i128(v))
    }

    fn emit_isize(&mut self, v: isize) -> io::Result<()> {
        self.emit_i64(v as i64)
    }

    fn emit_raw_bytes(&mut self, s: &[u8]) -> io::Result<()> {
        self.writer.write_all(s)
    }

    fn emit_f32(&mut self, v: f32) -> io::Result<()> {
        self.writer.write_all(&v.to_le_bytes())
    }

    fn emit_f64(&mut self, v: f64) -> io::Result<()> {
        self.writer.write_all(&v.to_le_bytes())
    }
}

// =============================================================================
// PostcardDecoder
// =============================================================================

/// A postcard-style decoder over any [`Read`] implementation.
///
/// Length prefixes come from untrusted input, so
/// [`read_raw_bytes`](Decoder::read_raw_bytes) grows its buffer as bytes
/// actually arrive instead of allocating the announced length up front.
#[derive(Debug)]
pub struct PostcardDecoder<R> {
    reader: R,
}

impl<R> PostcardDecoder<R> {
    /// Creates a new decoder wrapping the given reader.
    #[must_use]
    pub const fn new(reader: R) -> Self { Self { reader } }

    /// Returns a reference to the underlying reader.
    #[must_use]
    pub const fn get_ref(&self) -> &R { &self.reader }

    /// Returns a mutable reference to the underlying reader.
    #[must_use]
    #[allow(clippy::missing_const_for_fn)]
    pub fn get_mut(&mut self) -> &mut R { &mut self.reader }

    /// Consumes the decoder and returns the underlying reader.
    #[must_use]
    pub fn into_inner(self) -> R { self.reader }
}

macro_rules! read_varint {
    ($name:ident, $ty:ty) => {
        fn $name(&mut self) -> io::Result<$ty> {
            let mut result: $ty = 0;
            let mut shift = 0;

            loop {
                let byte = self.read_byte()?;
                let payload = <$ty>::from(byte & 0x7F);

                // the last byte may carry fewer than 7 payload bits and no
                // continuation
                let room = <$ty>::BITS - shift;
                if room <= 7 && (byte & 0x80 != 0 || payload >> room != 0) {
                    return Err(io::Error::new(
                        io::ErrorKind::InvalidData,
                        concat!("varint overflows ", stringify!($ty)),
                    ));
                }

                result |= payload << shift;

                if byte & 0x80 == 0 {
                    return Ok(result);
                }

                shift += 7;
            }
        }
    };
}

impl<R: Read> PostcardDecoder<R> {
    fn read_byte(&mut self) -> io::Result<u8> {
        let mut buf = [0u8; 1];
        self.reader.read_exact(&mut buf)?;
        Ok(buf[0])
    }

    read_varint!(read_varint_u16, u16);
    read_varint!(read_varint_u32, u32);
    read_varint!(read_varint_u64, u64);
    read_varint!(read_varint_u128, u128);

}

impl<R: Read> Decoder for PostcardDecoder<R> {
    fn read_u8(&mut self) -> io::Result<u8> { self.read_byte() }

    fn read_u16(&mut self) -> io::Result<u16> { self.read_varint_u16() }

    fn read_u32(&mut self) -> io::Result<u32> { self.read_varint_u32() }

    fn read_u64(&mut self) -> io::Result<u64> { self.read_varint_u64() }

    fn read_u128(&mut self) -> io::Result<u128> { self.read_varint_u128() }

    fn read_usize(&mut self) -> io::Result<usize> {
        let value = self.read_u64()?;
        usize::try_from(value).map_err(|_| {
            io::Error::new(
                io::ErrorKind::InvalidData,
                "usize value out of range for this platform",
            )
        })
    }

    #[allow(clippy::cast_possible_wrap)]
    fn read_i8(&mut self) -> io::Result<i8> { Ok(self.read_u8()? as i8) }

    fn read_i16(&mut self) -> io::Result<i16> {
        Ok(zigzag_decode_i16(self.read_varint_u16()?))
    }

    fn read_i32(&mut self) -> io::Result<i32> {
        Ok(zigzag_decode_i32(self.read_varint_u32()?))
    }

    fn read_i64(&mut self) -> io::Result<i64> {
        Ok(zigzag_decode_i64(self.read_varint_u64()?))
    }

    fn read_i128(&mut self) -> io::Result<i128> {
        Ok(zigzag_decode_i128(self.read_varint_u128()?))
    }

    fn read_isize(&mut self) -> io::Result<isize> {
        let value = self.read_i64()?;
        isize::try_from(value).map_err(|_| {
            io::Error::new(
                io::ErrorKind::InvalidData,
                "isize value out of range for this platform",
            )
        })
    }

    fn read_raw_bytes(&mut self, len: usize) -> io::Result<Vec<u8>> {
        let mut buf = Vec::new();
        (&mut self.reader).take(len as u64).read_to_end(&mut buf)?;

        if buf.len() == len {
            Ok(buf)
        } else {
            Err(io::Error::new(
                io::ErrorKind::UnexpectedEof,
                format!("expected {len} bytes, found {}", buf.len()),
            ))
        }
    }

    fn read_f32(&mut self) -> io::Result<f32> {
        let mut buf = [0u8; 4];
        self.reader.read_exact(&mut buf)?;
        Ok(f32::from_le_bytes(buf))
    }

    fn read_f64(&mut self) -> io::Result<f64> {
        let mut buf = [0u8; 8];
        self.reader.read_exact(&mut buf)?;
        Ok(f64::from_le_bytes(buf))
    }
}

#[cfg(test)]
mod test;
