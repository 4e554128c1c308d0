//! The decoding side of a pickling session.

use std::{any::Any, io::Read};

use picklejar_dump::{Decoder, Dump, PostcardDecoder};
use picklejar_type_rep::TypeRep;

use crate::{
    Configuration, Pickle, PickleError,
    record::{Kind, RefId, Tag},
};

/// An entry of the reconstruction table.
enum Slot {
    /// Reserved for a record whose fields are still being decoded.
    Open(TypeRep),

    /// Holds the finished value of a record.
    Closed(Box<dyn Any>),
}

/// State threaded through one decoding session.
///
/// The reconstruction table is indexed by [`RefId`]. A fresh record reserves
/// the next slot before its fields are decoded and fills it afterwards; a
/// back-reference is answered with a clone of the filled slot. A
/// back-reference to a slot that is still open, that is, to an ancestor of
/// the record being decoded, is rejected.
pub struct ReadState<'r> {
    decoder: PostcardDecoder<&'r mut dyn Read>,
    table: Vec<Slot>,
    depth: usize,
    back_references: usize,
    configuration: Configuration,
}

impl<'r> ReadState<'r> {
    /// Starts an empty session reading from `input`.
    pub fn new(input: &'r mut dyn Read, configuration: Configuration) -> Self {
        Self {
            decoder: PostcardDecoder::new(input),
            table: Vec::new(),
            depth: 0,
            back_references: 0,
            configuration,
        }
    }

    /// Returns the configuration this session was started with.
    #[must_use]
    pub const fn configuration(&self) -> &Configuration { &self.configuration }

    /// Reads the next record, which must be a `T`.
    ///
    /// # Errors
    ///
    /// Returns [`PickleError::UnknownTag`] if the record carries a tag other
    /// than `T::TAG`, and [`PickleError::Unpickling`] if the input is
    /// truncated, malformed or refers to ids inconsistently.
    pub fn unpickle<T: Pickle>(&mut self) -> Result<T, PickleError> {
        let tag = self.read_tag()?;

        if tag != T::TAG {
            return Err(PickleError::UnknownTag {
                tag,
                context: format!(
                    "expected a record of `{}` tagged {}",
                    T::type_rep().name(),
                    T::TAG
                ),
            });
        }

        self.unpickle_body()
    }

    /// Reads a length prefix.
    ///
    /// The length is untrusted. Use [`capacity_for`](Self::capacity_for)
    /// before reserving memory for it.
    ///
    /// # Errors
    ///
    /// Returns [`PickleError::Unpickling`] if the input is truncated.
    pub fn read_len(&mut self) -> Result<usize, PickleError> {
        Ok(self.decoder.read_usize()?)
    }

    /// Returns how many elements may be reserved up front for a sequence
    /// announcing `len` elements.
    #[must_use]
    pub fn capacity_for(&self, len: usize) -> usize {
        len.min(self.configuration.max_preallocation)
    }

    /// Reads a value in its plain [`Dump`] encoding, outside of any record.
    ///
    /// # Errors
    ///
    /// Returns [`PickleError::Unpickling`] if the input is truncated or
    /// malformed.
    pub fn undump<T: Dump>(&mut self) -> Result<T, PickleError> {
        Ok(self.decoder.undump()?)
    }

    /// Returns the number of records decoded so far, back-references
    /// excluded.
    #[must_use]
    pub fn records(&self) -> usize { self.table.len() }

    /// Ends the session.
    pub fn finish(self) {
        tracing::debug!(
            records = self.table.len(),
            back_references = self.back_references,
            "unpickling session finished"
        );
    }

    pub(crate) fn read_tag(&mut self) -> Result<Tag, PickleError> {
        let low = self.decoder.read_u8()?;
        let high = self.decoder.read_u8()?;
        Ok(Tag::from_wire([low, high]))
    }

    /// Reads everything after the tag of a record already known to be a `T`.
    pub(crate) fn unpickle_body<T: Pickle>(
        &mut self,
    ) -> Result<T, PickleError> {
        let byte = self.decoder.read_u8()?;
        let kind = Kind::from_byte(byte).ok_or_else(|| {
            PickleError::unpickling(format!(
                "invalid record discriminant {byte:#04x} for `{}`",
                T::type_rep().name()
            ))
        })?;
        let id = RefId(self.decoder.read_u64()?);

        match kind {
            Kind::Backref => self.resolve(id),
            Kind::Fresh => self.unpickle_fresh(id),
        }
    }

    fn unpickle_fresh<T: Pickle>(
        &mut self,
        id: RefId,
    ) -> Result<T, PickleError> {
        let expected = self.table.len() as u64;
        if id.0 != expected {
            return Err(PickleError::unpickling(format!(
                "fresh record {id} out of order, expected #{expected}"
            )));
        }

        if self.depth >= self.configuration.max_depth {
            return Err(PickleError::unpickling(format!(
                "records nested deeper than {}",
                self.configuration.max_depth
            )));
        }

        self.table.push(Slot::Open(T::type_rep()));

        self.depth += 1;
        let value = T::unpickle_fields(self);
        self.depth -= 1;
        let value = value?;

        #[allow(clippy::cast_possible_truncation)]
        {
            self.table[id.0 as usize] = Slot::Closed(Box::new(value.clone()));
        }

        Ok(value)
    }

    fn resolve<T: Pickle>(&mut self, id: RefId) -> Result<T, PickleError> {
        let slot = usize::try_from(id.0)
            .ok()
            .and_then(|index| self.table.get(index))
            .ok_or_else(|| {
                PickleError::unpickling(format!(
                    "back-reference to unassigned id {id}"
                ))
            })?;

        let value = match slot {
            Slot::Open(type_rep) => {
                return Err(PickleError::unpickling(format!(
                    "back-reference to {id}, a `{}` that is still being \
                     decoded",
                    type_rep.name()
                )));
            }
            Slot::Closed(value) => value,
        };

        let value = value.downcast_ref::<T>().cloned().ok_or_else(|| {
            PickleError::unpickling(format!(
                "back-reference to {id} does not hold a `{}`",
                T::type_rep().name()
            ))
        })?;

        self.back_references += 1;
        Ok(value)
    }
}

impl std::fmt::Debug for ReadState<'_> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ReadState")
            .field("records", &self.table.len())
            .field("depth", &self.depth)
            .field("back_references", &self.back_references)
            .field("configuration", &self.configuration)
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod test;
