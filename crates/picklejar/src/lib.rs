//! Sharing-aware, type-tagged serialization of object graphs.
//!
//! A value is written as a tree of *records*. Each record starts with the
//! wire [`Tag`] of its type, a discriminant and a session-local [`RefId`]:
//!
//! ```text
//! [tag: u16 LE][FRESH = 0 | BACKREF = 1][ref-id: varint] fields...
//! ```
//!
//! While encoding, every value is compared against the values of the same
//! type already written in the session. An equal one turns the new record
//! into a back-reference, so structurally equal substructure is stored once
//! and decodes to shared values.
//!
//! # Crate Layout
//!
//! - [`Pickle`]: the per-type record codec
//! - [`WriteState`] / [`ReadState`]: one encoding or decoding session
//! - [`Configuration`]: session options and the top-level entry points
//! - [`Registry`]: pickling of type-erased [`Dynamic`] values
//! - [`pickle_from_dump!`]: lifts a [`Dump`] implementation into [`Pickle`]
//!
//! # Example
//!
//! ```ignore
//! let bytes = picklejar::to_bytes(&vec![1i32, 2, 1]).unwrap();
//!
//! // the second `1` is a back-reference to the first
//! assert_eq!(bytes, [
//!     0x22, 0x00, 0x00, 0x00, 0x03, // Vec, fresh #0, three elements
//!     0x0A, 0x00, 0x00, 0x01, 0x02, // i32, fresh #1, value 1
//!     0x0A, 0x00, 0x00, 0x02, 0x04, // i32, fresh #2, value 2
//!     0x0A, 0x00, 0x01, 0x01,       // i32, back-reference to #1
//! ]);
//!
//! let back: Vec<i32> = picklejar::from_bytes(&bytes).unwrap();
//! assert_eq!(back, [1, 2, 1]);
//! ```

use std::io::{Read, Write};

mod config;
mod error;
mod from_dump;
mod impls;
mod pickle;
mod read;
mod record;
mod registry;
mod write;

pub use config::Configuration;
pub use error::PickleError;
#[doc(hidden)]
pub use from_dump::dump_hint;
pub use pickle::Pickle;
pub use picklejar_dump::{self as dump, Decoder, Dump, DumpFailure, Encoder};
pub use picklejar_type_rep::{
    CastFailure, Dynamic, TypeRep, Typeable, typeable,
};
pub use read::ReadState;
pub use record::{RefId, Tag};
pub use registry::{PickleVTable, Registry};
pub use write::WriteState;

/// Appends the pickle of `value` to `buffer` using the default
/// [`Configuration`].
///
/// # Errors
///
/// See [`Configuration::to_buffer`].
pub fn to_buffer<T: Pickle>(
    value: &T,
    buffer: &mut Vec<u8>,
) -> Result<(), PickleError> {
    Configuration::default().to_buffer(value, buffer)
}

/// Pickles `value` into a fresh byte vector using the default
/// [`Configuration`].
///
/// # Errors
///
/// See [`Configuration::to_bytes`].
pub fn to_bytes<T: Pickle>(value: &T) -> Result<Vec<u8>, PickleError> {
    Configuration::default().to_bytes(value)
}

/// Pickles `value` into a string holding one character per byte.
///
/// # Errors
///
/// See [`Configuration::to_string`].
pub fn to_string<T: Pickle>(value: &T) -> Result<String, PickleError> {
    Configuration::default().to_string(value)
}

/// Pickles `value` into `writer` and flushes it.
///
/// # Errors
///
/// See [`Configuration::to_channel`].
pub fn to_channel<T: Pickle, W: Write>(
    value: &T,
    writer: W,
) -> Result<(), PickleError> {
    Configuration::default().to_channel(value, writer)
}

/// Unpickles a value from a byte-at-a-time source.
///
/// # Errors
///
/// See [`Configuration::from_stream`].
pub fn from_stream<T: Pickle, I: IntoIterator<Item = u8>>(
    source: I,
) -> Result<T, PickleError> {
    Configuration::default().from_stream(source)
}

/// Unpickles a value that must span all of `bytes`.
///
/// # Errors
///
/// See [`Configuration::from_bytes`].
pub fn from_bytes<T: Pickle>(bytes: &[u8]) -> Result<T, PickleError> {
    Configuration::default().from_bytes(bytes)
}

/// Unpickles a value from a string produced by [`to_string`].
///
/// # Errors
///
/// See [`Configuration::from_string`].
pub fn from_string<T: Pickle>(text: &str) -> Result<T, PickleError> {
    Configuration::default().from_string(text)
}

/// Unpickles a value from `reader`.
///
/// # Errors
///
/// See [`Configuration::from_channel`].
pub fn from_channel<T: Pickle, R: Read>(reader: R) -> Result<T, PickleError> {
    Configuration::default().from_channel(reader)
}
