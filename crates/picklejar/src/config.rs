//! Session configuration and the top-level entry points.

use std::io::{Read, Write};

use bon::Builder;
use picklejar_dump::{IterReader, dump::MAX_PREALLOCATION, text};

use crate::{Pickle, PickleError, ReadState, WriteState};

/// Options shared by every session started from the same configuration.
///
/// # Example
///
/// ```ignore
/// use picklejar::Configuration;
///
/// let config = Configuration::builder().sharing(false).max_depth(64).build();
///
/// let bytes = config.to_bytes(&vec![1u8, 1, 1]).unwrap();
/// let back: Vec<u8> = config.from_bytes(&bytes).unwrap();
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Builder)]
pub struct Configuration {
    /// Whether equal values of one type are written once and
    /// back-referenced afterwards.
    ///
    /// With sharing off every value becomes a fresh record. Ids are still
    /// assigned, so the output stays readable by any decoder.
    #[builder(default = true)]
    pub sharing: bool,

    /// The deepest nesting of fresh records a session writes or reads.
    #[builder(default = 512)]
    pub max_depth: usize,

    /// Upper bound on the capacity reserved from an untrusted length prefix.
    #[builder(default = MAX_PREALLOCATION)]
    pub max_preallocation: usize,
}

impl Default for Configuration {
    fn default() -> Self { Self::builder().build() }
}

impl Configuration {
    /// Appends the pickle of `value` to `buffer`.
    ///
    /// # Errors
    ///
    /// Returns an error if a [`Pickle`] implementation refuses to encode.
    #[tracing::instrument(
        level = "debug",
        skip_all,
        fields(ty = T::type_rep().name())
    )]
    pub fn to_buffer<T: Pickle>(
        &self,
        value: &T,
        buffer: &mut Vec<u8>,
    ) -> Result<(), PickleError> {
        let mut writer = WriteState::new(*self);
        writer.pickle(value)?;
        buffer.extend_from_slice(&writer.finish());
        Ok(())
    }

    /// Pickles `value` into a fresh byte vector.
    ///
    /// # Errors
    ///
    /// Returns an error if a [`Pickle`] implementation refuses to encode.
    pub fn to_bytes<T: Pickle>(
        &self,
        value: &T,
    ) -> Result<Vec<u8>, PickleError> {
        let mut buffer = Vec::new();
        self.to_buffer(value, &mut buffer)?;
        Ok(buffer)
    }

    /// Pickles `value` into a string holding one character per byte.
    ///
    /// # Errors
    ///
    /// Returns an error if a [`Pickle`] implementation refuses to encode.
    pub fn to_string<T: Pickle>(
        &self,
        value: &T,
    ) -> Result<String, PickleError> {
        self.to_bytes(value).map(|bytes| text::bytes_to_text(&bytes))
    }

    /// Pickles `value` into `writer` and flushes it.
    ///
    /// The whole pickle is produced before the first byte is written, so a
    /// failing value never leaves a partial record in `writer`.
    ///
    /// # Errors
    ///
    /// Returns [`PickleError::Io`] if the writer fails.
    pub fn to_channel<T: Pickle, W: Write>(
        &self,
        value: &T,
        mut writer: W,
    ) -> Result<(), PickleError> {
        let bytes = self.to_bytes(value)?;
        writer.write_all(&bytes)?;
        writer.flush()?;
        Ok(())
    }

    /// Unpickles a value from a byte-at-a-time source.
    ///
    /// Bytes after the value are left in the source.
    ///
    /// # Errors
    ///
    /// Returns [`PickleError::UnknownTag`] if the input starts with a record
    /// of another type and [`PickleError::Unpickling`] if it is truncated or
    /// malformed.
    pub fn from_stream<T: Pickle, I: IntoIterator<Item = u8>>(
        &self,
        source: I,
    ) -> Result<T, PickleError> {
        self.read_from(&mut IterReader::new(source.into_iter()))
    }

    /// Unpickles a value that must span all of `bytes`.
    ///
    /// # Errors
    ///
    /// Same as [`from_stream`](Self::from_stream), plus
    /// [`PickleError::Unpickling`] if bytes are left over after the value.
    pub fn from_bytes<T: Pickle>(
        &self,
        bytes: &[u8],
    ) -> Result<T, PickleError> {
        let mut rest = bytes;
        let value = self.read_from(&mut rest)?;

        if !rest.is_empty() {
            tracing::debug!(rest = rest.len(), "trailing input after pickle");
            return Err(PickleError::unpickling(format!(
                "{} byte(s) of trailing input after a complete value",
                rest.len()
            )));
        }

        Ok(value)
    }

    /// Unpickles a value from a string produced by
    /// [`to_string`](Self::to_string).
    ///
    /// # Errors
    ///
    /// Same as [`from_bytes`](Self::from_bytes), plus
    /// [`PickleError::Unpickling`] if `text` holds a character above U+00FF.
    pub fn from_string<T: Pickle>(
        &self,
        text: &str,
    ) -> Result<T, PickleError> {
        self.from_bytes(&text::text_to_bytes(text)?)
    }

    /// Unpickles a value from `reader`.
    ///
    /// Bytes after the value are left in the reader.
    ///
    /// # Errors
    ///
    /// Same as [`from_stream`](Self::from_stream), plus [`PickleError::Io`]
    /// if the reader fails.
    pub fn from_channel<T: Pickle, R: Read>(
        &self,
        mut reader: R,
    ) -> Result<T, PickleError> {
        self.read_from(&mut reader)
    }

    #[tracing::instrument(
        level = "debug",
        skip_all,
        fields(ty = T::type_rep().name())
    )]
    fn read_from<T: Pickle>(
        &self,
        input: &mut dyn Read,
    ) -> Result<T, PickleError> {
        let mut reader = ReadState::new(input, *self);

        match reader.unpickle::<T>() {
            Ok(value) => {
                reader.finish();
                Ok(value)
            }
            Err(error) => {
                tracing::debug!(%error, "unpickling failed");
                Err(error)
            }
        }
    }
}
