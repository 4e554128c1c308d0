//! Byte strings carried in [`String`]s.
//!
//! Every byte maps to the `char` with the same code point, so an encoding of
//! `n` bytes becomes a string of exactly `n` characters in the range
//! U+0000..=U+00FF. The mapping is lossless in both directions for strings
//! produced by [`bytes_to_text`].

use crate::DumpFailure;

/// Maps every byte of `bytes` to the character with the same code point.
#[must_use]
pub fn bytes_to_text(bytes: &[u8]) -> String {
    bytes.iter().copied().map(char::from).collect()
}

/// Maps every character of `text` back to a byte.
///
/// # Errors
///
/// Returns [`DumpFailure::Malformed`] if `text` contains a character above
/// U+00FF, which no encoder could have produced.
pub fn text_to_bytes(text: &str) -> Result<Vec<u8>, DumpFailure> {
    text.chars()
        .map(|c| {
            u8::try_from(c).map_err(|_| {
                DumpFailure::malformed(format!(
                    "character {c:?} does not stand for a single byte"
                ))
            })
        })
        .collect()
}
