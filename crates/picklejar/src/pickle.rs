//! The [`Pickle`] trait.

use picklejar_type_rep::Typeable;

use crate::{PickleError, ReadState, Tag, WriteState};

/// A type that can be written as a tagged, sharing-aware record.
///
/// An implementation supplies a wire [`Tag`] and the encoding of its fields.
/// Record headers, id assignment and sharing are handled by
/// [`WriteState::pickle`] and [`ReadState::unpickle`], which call into
/// [`pickle_fields`](Self::pickle_fields) and
/// [`unpickle_fields`](Self::unpickle_fields) for fresh records only.
///
/// Sub-values should be written with [`WriteState::pickle`] so that each one
/// becomes a record of its own and takes part in sharing. Scalars that never
/// need sharing can be written with [`WriteState::dump`].
///
/// [`PartialEq`] decides sharing: two values of one type that compare equal
/// are written once. The implementation must behave as a congruence for the
/// values it will see, otherwise a decoded graph may differ from the pickled
/// one.
///
/// The sharing table compares a new value against every earlier value of its
/// type, unless the type supplies a [`sharing_hint`](Self::sharing_hint).
/// Types lifted with `pickle_from_dump!` get one for free.
///
/// # Example
///
/// ```ignore
/// #[derive(Debug, Clone, PartialEq)]
/// struct Edge {
///     from: String,
///     to: String,
/// }
///
/// typeable!(Edge);
///
/// impl Pickle for Edge {
///     const TAG: Tag = Tag::user(1);
///
///     fn pickle_fields<'v>(
///         &'v self,
///         writer: &mut WriteState<'v>,
///     ) -> Result<(), PickleError> {
///         writer.pickle(&self.from)?;
///         writer.pickle(&self.to)?;
///         Ok(())
///     }
///
///     fn unpickle_fields(
///         reader: &mut ReadState<'_>,
///     ) -> Result<Self, PickleError> {
///         Ok(Self { from: reader.unpickle()?, to: reader.unpickle()? })
///     }
/// }
/// ```
#[diagnostic::on_unimplemented(
    message = "The type `{Self}` does not implement `Pickle`",
    note = "Implement `Pickle` by hand or lift a `Dump` implementation with \
            `pickle_from_dump!`"
)]
pub trait Pickle: Typeable + PartialEq + Clone {
    /// The wire tag written in front of every record of this type.
    const TAG: Tag;

    /// Writes the fields of `self` after a fresh record header.
    ///
    /// # Errors
    ///
    /// Propagates failures from nested records.
    fn pickle_fields<'v>(
        &'v self,
        writer: &mut WriteState<'v>,
    ) -> Result<(), PickleError>;

    /// Reads the fields written by [`pickle_fields`](Self::pickle_fields).
    ///
    /// # Errors
    ///
    /// Returns an error if the input is truncated or malformed.
    fn unpickle_fields(reader: &mut ReadState<'_>) -> Result<Self, PickleError>;

    /// Returns a hash that narrows the sharing lookup for `self`.
    ///
    /// Only values with the same hint are compared for sharing, so values
    /// with different hints are never shared. Equal values should return
    /// equal hints. `None` falls back to comparing against every earlier
    /// value of the type that also returned `None`.
    fn sharing_hint(&self) -> Option<u64> { None }
}
