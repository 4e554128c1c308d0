//! The encoding side of a pickling session.

use std::any::Any;

use fxhash::FxHashMap;
use picklejar_dump::{Dump, Encoder, PostcardEncoder};
use picklejar_type_rep::TypeRep;

use crate::{
    Configuration, Pickle, PickleError,
    record::{Kind, RefId, Tag},
};

/// A value already written in this session, kept for sharing detection.
#[derive(Debug, Clone, Copy)]
struct Written<'v> {
    value: &'v dyn Any,
    id: RefId,
}

/// The written values of one type, split by [`Pickle::sharing_hint`].
#[derive(Debug, Default)]
struct Bucket<'v> {
    hinted: FxHashMap<u64, Vec<Written<'v>>>,
    unhinted: Vec<Written<'v>>,
}

impl<'v> Bucket<'v> {
    fn candidates(&self, hint: Option<u64>) -> &[Written<'v>] {
        match hint {
            Some(hint) => {
                self.hinted.get(&hint).map(Vec::as_slice).unwrap_or_default()
            }
            None => &self.unhinted,
        }
    }

    fn insert(&mut self, hint: Option<u64>, written: Written<'v>) {
        match hint {
            Some(hint) => self.hinted.entry(hint).or_default().push(written),
            None => self.unhinted.push(written),
        }
    }
}

/// State threaded through one encoding session.
///
/// A `WriteState` owns the output buffer and the sharing table. The table
/// maps each [`TypeRep`] to the values of that type written so far, together
/// with the id they were written under. Values are borrowed for `'v`, so the
/// whole object graph must outlive the session.
///
/// Most callers go through [`to_bytes`](crate::to_bytes) and friends, which
/// run exactly one session per call. Creating a `WriteState` by hand lets
/// several values share one session and therefore one id space.
///
/// # Example
///
/// ```ignore
/// let shared = "config".to_string();
///
/// let mut writer = WriteState::new(Configuration::default());
/// let first = writer.pickle(&shared)?;
/// let second = writer.pickle(&shared)?;
/// assert_eq!(first, second);
///
/// let bytes = writer.finish();
/// ```
pub struct WriteState<'v> {
    encoder: PostcardEncoder<Vec<u8>>,
    written: FxHashMap<TypeRep, Bucket<'v>>,
    next_id: u64,
    depth: usize,
    back_references: usize,
    configuration: Configuration,
}

impl<'v> WriteState<'v> {
    /// Starts an empty session.
    #[must_use]
    pub fn new(configuration: Configuration) -> Self {
        Self {
            encoder: PostcardEncoder::new(Vec::new()),
            written: FxHashMap::default(),
            next_id: 0,
            depth: 0,
            back_references: 0,
            configuration,
        }
    }

    /// Returns the configuration this session was started with.
    #[must_use]
    pub const fn configuration(&self) -> &Configuration { &self.configuration }

    /// Writes `value` as a record and returns its id.
    ///
    /// If sharing is enabled and an equal value of the same type was already
    /// written, only a back-reference to it is emitted. Otherwise a fresh
    /// record is written and `value` becomes a sharing candidate once all of
    /// its fields are complete, so a back-reference never points into a
    /// record that is still open.
    ///
    /// Fresh records nest at most [`Configuration::max_depth`] deep, the same
    /// limit the decoder enforces.
    ///
    /// # Errors
    ///
    /// Returns [`PickleError::Pickling`] if the nesting limit is exceeded and
    /// propagates any error from [`Pickle::pickle_fields`].
    pub fn pickle<T: Pickle>(
        &mut self,
        value: &'v T,
    ) -> Result<RefId, PickleError> {
        let type_rep = T::type_rep();
        let hint =
            self.configuration.sharing.then(|| value.sharing_hint()).flatten();

        if self.configuration.sharing
            && let Some(id) = self.find_written(type_rep, hint, value)
        {
            tracing::trace!(tag = %T::TAG, %id, "back-reference");

            self.write_header(T::TAG, Kind::Backref, id)?;
            self.back_references += 1;
            return Ok(id);
        }

        if self.depth >= self.configuration.max_depth {
            return Err(PickleError::Pickling(format!(
                "records nested deeper than {}",
                self.configuration.max_depth
            )));
        }

        let id = RefId(self.next_id);
        self.next_id += 1;

        self.write_header(T::TAG, Kind::Fresh, id)?;

        self.depth += 1;
        let fields = value.pickle_fields(self);
        self.depth -= 1;
        fields?;

        if self.configuration.sharing {
            self.written
                .entry(type_rep)
                .or_default()
                .insert(hint, Written { value, id });
        }

        Ok(id)
    }

    /// Writes a length prefix for a sequence of `len` records.
    ///
    /// # Errors
    ///
    /// Returns an error if the output cannot be written.
    pub fn emit_len(&mut self, len: usize) -> Result<(), PickleError> {
        Ok(self.encoder.emit_usize(len)?)
    }

    /// Writes `value` with its plain [`Dump`] encoding, outside of any
    /// record.
    ///
    /// # Errors
    ///
    /// Propagates the [`Dump`] implementation's failure.
    pub fn dump<T: Dump>(&mut self, value: &T) -> Result<(), PickleError> {
        Ok(self.encoder.dump(value)?)
    }

    /// Returns the number of records written so far, back-references
    /// excluded.
    #[must_use]
    #[allow(clippy::cast_possible_truncation)]
    pub const fn records(&self) -> usize { self.next_id as usize }

    /// Ends the session and returns the encoded bytes.
    #[must_use]
    pub fn finish(self) -> Vec<u8> {
        let bytes = self.encoder.into_inner();

        tracing::debug!(
            records = self.next_id,
            back_references = self.back_references,
            bytes = bytes.len(),
            "pickling session finished"
        );

        bytes
    }

    fn find_written<T: Pickle>(
        &self,
        type_rep: TypeRep,
        hint: Option<u64>,
        value: &T,
    ) -> Option<RefId> {
        let bucket = self.written.get(&type_rep)?;
        bucket.candidates(hint).iter().find_map(|written| {
            let candidate = written.value.downcast_ref::<T>()?;
            (std::ptr::eq(candidate, value) || candidate == value)
                .then_some(written.id)
        })
    }

    fn write_header(
        &mut self,
        tag: Tag,
        kind: Kind,
        id: RefId,
    ) -> Result<(), PickleError> {
        self.encoder.emit_raw_bytes(&tag.to_wire())?;
        self.encoder.emit_u8(kind as u8)?;
        self.encoder.emit_u64(id.0)?;
        Ok(())
    }
}

impl std::fmt::Debug for WriteState<'_> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("WriteState")
            .field("bytes", &self.encoder.get_ref().len())
            .field("records", &self.next_id)
            .field("depth", &self.depth)
            .field("back_references", &self.back_references)
            .field("configuration", &self.configuration)
            .finish_non_exhaustive()
    }
}
