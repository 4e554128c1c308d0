use std::io;

/// Failure raised by [`Dump`](crate::Dump) encoding and decoding.
///
/// A failed decode never yields a partial value; the caller should discard
/// the whole input.
#[derive(Debug, thiserror::Error)]
pub enum DumpFailure {
    /// The input ended in the middle of a value.
    #[error("dump failure: unexpected end of input")]
    Truncated,

    /// The input does not describe a value of the requested type.
    #[error("dump failure: {0}")]
    Malformed(String),

    /// The underlying reader or writer failed.
    #[error("dump failure: {0}")]
    Io(#[source] io::Error),
}

impl DumpFailure {
    /// Creates a [`DumpFailure::Malformed`] with the given message.
    pub fn malformed(message: impl Into<String>) -> Self {
        Self::Malformed(message.into())
    }
}

impl From<io::Error> for DumpFailure {
    fn from(error: io::Error) -> Self {
        match error.kind() {
            io::ErrorKind::UnexpectedEof => Self::Truncated,
            io::ErrorKind::InvalidData => Self::Malformed(error.to_string()),
            _ => Self::Io(error),
        }
    }
}
