//! Compact binary codec without structural sharing.
//!
//! This crate provides the plain recursive-descent layer of picklejar:
//!
//! - [`Encoder`]: low-level trait for emitting primitive values
//! - [`Decoder`]: low-level trait for reading primitive values
//! - [`Dump`]: types that write and read themselves through those traits
//! - [`PostcardEncoder`] / [`PostcardDecoder`]: the varint-based layout used
//!   everywhere in picklejar
//!
//! A `Dump` encoding is exactly the concatenation of its parts. Nothing is
//! tagged and nothing is shared, which keeps it small for leaf data. The
//! `picklejar` crate builds type-tagged, sharing-aware records on top of it.
//!
//! # Entry Points
//!
//! | Encode        | Decode         | Medium                               |
//! |---------------|----------------|--------------------------------------|
//! | [`to_buffer`] | [`from_bytes`] | in-memory buffer                     |
//! | [`to_string`] | [`from_string`]| one `char` per byte (see [`text`])   |
//! | [`to_channel`]| [`from_channel`]| any [`Write`] / [`Read`]            |
//! |               | [`from_stream`]| byte-at-a-time iterator              |
//!
//! # Example
//!
//! ```ignore
//! let bytes = picklejar_dump::to_bytes(&(42u32, "hi".to_string())).unwrap();
//! let back: (u32, String) = picklejar_dump::from_bytes(&bytes).unwrap();
//! assert_eq!(back, (42, "hi".to_string()));
//! ```

use std::io::{Read, Write};

pub mod decode;
pub mod dump;
pub mod encode;
pub mod postcard;
pub mod stream;
pub mod text;

mod error;

pub use decode::Decoder;
pub use dump::Dump;
pub use encode::Encoder;
pub use error::DumpFailure;
pub use postcard::{PostcardDecoder, PostcardEncoder};
pub use stream::IterReader;

/// Appends the encoding of `value` to `buffer`.
///
/// # Errors
///
/// Returns a [`DumpFailure`] if `value` refuses to encode.
pub fn to_buffer<T: Dump>(
    value: &T,
    buffer: &mut Vec<u8>,
) -> Result<(), DumpFailure> {
    value.dump(&mut PostcardEncoder::new(buffer))
}

/// Encodes `value` into a fresh byte vector.
///
/// # Errors
///
/// Returns a [`DumpFailure`] if `value` refuses to encode.
pub fn to_bytes<T: Dump>(value: &T) -> Result<Vec<u8>, DumpFailure> {
    let mut buffer = Vec::new();
    to_buffer(value, &mut buffer)?;
    Ok(buffer)
}

/// Encodes `value` into a string holding one character per byte.
///
/// # Errors
///
/// Returns a [`DumpFailure`] if `value` refuses to encode.
pub fn to_string<T: Dump>(value: &T) -> Result<String, DumpFailure> {
    to_bytes(value).map(|bytes| text::bytes_to_text(&bytes))
}

/// Encodes `value` into `writer` and flushes it.
///
/// # Errors
///
/// Returns [`DumpFailure::Io`] if the writer fails.
pub fn to_channel<T: Dump, W: Write>(
    value: &T,
    writer: W,
) -> Result<(), DumpFailure> {
    let mut encoder = PostcardEncoder::new(writer);
    value.dump(&mut encoder)?;
    Ok(encoder.get_mut().flush()?)
}

/// Decodes a value from a byte-at-a-time source.
///
/// Bytes after the value are left in the source.
///
/// # Errors
///
/// Returns [`DumpFailure::Truncated`] if the source ends early and
/// [`DumpFailure::Malformed`] if the bytes do not describe a `T`.
pub fn from_stream<T: Dump, I: IntoIterator<Item = u8>>(
    source: I,
) -> Result<T, DumpFailure> {
    T::undump(&mut PostcardDecoder::new(IterReader::new(source.into_iter())))
}

/// Decodes a value that must span all of `bytes`.
///
/// # Errors
///
/// Same as [`from_stream`], plus [`DumpFailure::Malformed`] if bytes are left
/// over after the value.
pub fn from_bytes<T: Dump>(bytes: &[u8]) -> Result<T, DumpFailure> {
    let mut decoder = PostcardDecoder::new(bytes);
    let value = T::undump(&mut decoder)?;

    let rest = decoder.into_inner().len();
    if rest != 0 {
        tracing::debug!(rest, "trailing input after dumped value");
        return Err(DumpFailure::malformed(format!(
            "{rest} byte(s) of trailing input after a complete value"
        )));
    }

    Ok(value)
}

/// Decodes a value from a string produced by [`to_string`].
///
/// # Errors
///
/// Same as [`from_bytes`], plus [`DumpFailure::Malformed`] if `text` holds a
/// character above U+00FF.
pub fn from_string<T: Dump>(text: &str) -> Result<T, DumpFailure> {
    from_bytes(&text::text_to_bytes(text)?)
}

/// Decodes a value from `reader`.
///
/// Bytes after the value are left in the reader.
///
/// # Errors
///
/// Same as [`from_stream`], plus [`DumpFailure::Io`] if the reader fails.
pub fn from_channel<T: Dump, R: Read>(reader: R) -> Result<T, DumpFailure> {
    T::undump(&mut PostcardDecoder::new(reader))
}
