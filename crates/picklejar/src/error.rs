use std::io;

use picklejar_dump::DumpFailure;

use crate::Tag;

/// Failure raised while pickling or unpickling.
///
/// Decoding failures are never recoverable mid-stream: the caller should
/// discard the whole input. No partially decoded value is ever returned.
#[derive(Debug, thiserror::Error)]
pub enum PickleError {
    /// The value cannot be written within the session's limits.
    #[error("pickling error: {0}")]
    Pickling(String),

    /// The input is truncated, malformed or internally inconsistent.
    #[error("unpickling error: {0}")]
    Unpickling(String),

    /// A record carries a tag that is not acceptable where it appears.
    #[error("unknown tag {tag}: {context}")]
    UnknownTag {
        /// The offending tag as read from the input.
        tag: Tag,

        /// What the decoder was expecting at that point.
        context: String,
    },

    /// A dynamic value's type has no entry in the registry.
    #[error("type `{0}` is not registered")]
    Unregistered(&'static str),

    /// Two different types were registered under the same tag.
    #[error(
        "tag {tag} is already registered for `{existing}`, cannot register \
         `{rejected}`"
    )]
    TagConflict {
        /// The contested tag.
        tag: Tag,

        /// The type already holding the tag.
        existing: &'static str,

        /// The type that was turned away.
        rejected: &'static str,
    },

    /// The underlying reader or writer failed.
    #[error("pickle i/o error: {0}")]
    Io(#[source] io::Error),
}

impl PickleError {
    /// Creates a [`PickleError::Unpickling`] with the given message.
    pub fn unpickling(message: impl Into<String>) -> Self {
        Self::Unpickling(message.into())
    }
}

impl From<DumpFailure> for PickleError {
    fn from(failure: DumpFailure) -> Self {
        match failure {
            DumpFailure::Truncated => {
                Self::unpickling("unexpected end of input")
            }
            DumpFailure::Malformed(message) => Self::Unpickling(message),
            DumpFailure::Io(error) => Self::Io(error),
        }
    }
}

impl From<io::Error> for PickleError {
    fn from(error: io::Error) -> Self { DumpFailure::from(error).into() }
}
