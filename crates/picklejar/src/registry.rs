//! Pickling of type-erased [`Dynamic`] values.
//!
//! A [`Dynamic`] does not know its own wire format. The [`Registry`] maps
//! each participating type to a [`PickleVTable`], a plain record of function
//! pointers built once per type from its [`Pickle`] implementation. Encoding
//! looks the table up by [`TypeRep`]; decoding reads the leading tag and
//! looks it up by [`Tag`].

use std::{
    any::Any,
    io::{Read, Write},
};

use fxhash::FxHashMap;
use picklejar_dump::{IterReader, text};
use picklejar_type_rep::{Dynamic, TypeRep};

use crate::{
    Configuration, Pickle, PickleError, ReadState, WriteState,
    record::{RefId, Tag},
};

/// The capabilities of one [`Pickle`] type, with the type erased.
#[derive(Clone, Copy)]
pub struct PickleVTable {
    tag: Tag,
    type_rep: TypeRep,
    encode: for<'v> fn(
        &'v dyn Any,
        &mut WriteState<'v>,
    ) -> Result<RefId, PickleError>,
    decode: fn(&mut ReadState<'_>) -> Result<Dynamic, PickleError>,
    eq: fn(&dyn Any, &dyn Any) -> bool,
}

impl PickleVTable {
    /// Builds the table for `T` from its [`Pickle`] implementation.
    #[must_use]
    pub fn of<T: Pickle>() -> Self {
        Self {
            tag: T::TAG,
            type_rep: T::type_rep(),
            encode: encode_erased::<T>,
            decode: decode_erased::<T>,
            eq: eq_erased::<T>,
        }
    }

    /// Returns the wire tag of the type.
    #[must_use]
    pub const fn tag(&self) -> Tag { self.tag }

    /// Returns the runtime identity of the type.
    #[must_use]
    pub const fn type_rep(&self) -> TypeRep { self.type_rep }

    /// Returns the name of the type, for diagnostics.
    #[must_use]
    pub const fn name(&self) -> &'static str { self.type_rep.name() }
}

impl std::fmt::Debug for PickleVTable {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PickleVTable")
            .field("tag", &self.tag)
            .field("type", &self.name())
            .finish_non_exhaustive()
    }
}

fn encode_erased<'v, T: Pickle>(
    value: &'v dyn Any,
    writer: &mut WriteState<'v>,
) -> Result<RefId, PickleError> {
    let value = value
        .downcast_ref::<T>()
        .ok_or_else(|| PickleError::Unregistered(T::type_rep().name()))?;
    writer.pickle(value)
}

fn decode_erased<T: Pickle>(
    reader: &mut ReadState<'_>,
) -> Result<Dynamic, PickleError> {
    reader.unpickle_body::<T>().map(Dynamic::new)
}

fn eq_erased<T: Pickle>(left: &dyn Any, right: &dyn Any) -> bool {
    match (left.downcast_ref::<T>(), right.downcast_ref::<T>()) {
        (Some(left), Some(right)) => left == right,
        _ => false,
    }
}

/// A set of [`PickleVTable`]s, keyed by both tag and type.
///
/// # Example
///
/// ```ignore
/// let mut registry = Registry::new();
/// registry.register::<i64>()?;
/// registry.register::<String>()?;
///
/// let bytes = registry.to_bytes(&"hello".to_string().make_dynamic())?;
/// let back = registry.from_bytes(&bytes)?;
/// assert_eq!(String::cast(back).as_deref(), Some("hello"));
/// ```
#[derive(Debug, Default)]
pub struct Registry {
    by_tag: FxHashMap<Tag, PickleVTable>,
    by_type: FxHashMap<TypeRep, Tag>,
    configuration: Configuration,
}

impl Registry {
    /// Creates an empty registry using the default [`Configuration`].
    #[must_use]
    pub fn new() -> Self { Self::default() }

    /// Creates an empty registry whose sessions use `configuration`.
    #[must_use]
    pub fn with_configuration(configuration: Configuration) -> Self {
        Self { configuration, ..Self::default() }
    }

    /// Registers `T`.
    ///
    /// Registering the same type twice is a no-op.
    ///
    /// # Errors
    ///
    /// Returns [`PickleError::TagConflict`] if another type already holds
    /// `T::TAG`.
    pub fn register<T: Pickle>(&mut self) -> Result<(), PickleError> {
        self.register_vtable(PickleVTable::of::<T>())
    }

    /// Registers a prebuilt [`PickleVTable`].
    ///
    /// # Errors
    ///
    /// Returns [`PickleError::TagConflict`] if another type already holds
    /// the table's tag.
    pub fn register_vtable(
        &mut self,
        vtable: PickleVTable,
    ) -> Result<(), PickleError> {
        if let Some(existing) = self.by_tag.get(&vtable.tag) {
            if existing.type_rep == vtable.type_rep {
                return Ok(());
            }

            return Err(PickleError::TagConflict {
                tag: vtable.tag,
                existing: existing.name(),
                rejected: vtable.name(),
            });
        }

        tracing::debug!(tag = %vtable.tag, ty = vtable.name(), "registered");

        self.by_type.insert(vtable.type_rep, vtable.tag);
        self.by_tag.insert(vtable.tag, vtable);
        Ok(())
    }

    /// Returns the table registered under `tag`.
    #[must_use]
    pub fn get(&self, tag: Tag) -> Option<&PickleVTable> {
        self.by_tag.get(&tag)
    }

    /// Returns the table registered for `type_rep`.
    #[must_use]
    pub fn get_by_type(&self, type_rep: TypeRep) -> Option<&PickleVTable> {
        self.by_type.get(&type_rep).and_then(|tag| self.by_tag.get(tag))
    }

    /// Returns the number of registered types.
    #[must_use]
    pub fn len(&self) -> usize { self.by_tag.len() }

    /// Returns `true` if no type is registered.
    #[must_use]
    pub fn is_empty(&self) -> bool { self.by_tag.is_empty() }

    /// Compares two dynamic values through their registered equality.
    ///
    /// Values of different types are never equal.
    ///
    /// # Errors
    ///
    /// Returns [`PickleError::Unregistered`] if the values share a type that
    /// is not registered.
    pub fn dynamic_eq(
        &self,
        left: &Dynamic,
        right: &Dynamic,
    ) -> Result<bool, PickleError> {
        if left.type_rep() != right.type_rep() {
            return Ok(false);
        }

        let vtable = self.vtable_for(left)?;
        Ok((vtable.eq)(left.as_any(), right.as_any()))
    }

    /// Appends the pickle of `value` to `buffer`.
    ///
    /// The output is byte-identical to pickling the unwrapped value with
    /// [`Configuration::to_buffer`].
    ///
    /// # Errors
    ///
    /// Returns [`PickleError::Unregistered`] if the type of `value` is not
    /// registered.
    #[tracing::instrument(
        level = "debug",
        skip_all,
        fields(ty = value.type_rep().name())
    )]
    pub fn to_buffer(
        &self,
        value: &Dynamic,
        buffer: &mut Vec<u8>,
    ) -> Result<(), PickleError> {
        let vtable = self.vtable_for(value)?;

        let mut writer = WriteState::new(self.configuration);
        (vtable.encode)(value.as_any(), &mut writer)?;
        buffer.extend_from_slice(&writer.finish());
        Ok(())
    }

    /// Pickles `value` into a fresh byte vector.
    ///
    /// # Errors
    ///
    /// Same as [`to_buffer`](Self::to_buffer).
    pub fn to_bytes(&self, value: &Dynamic) -> Result<Vec<u8>, PickleError> {
        let mut buffer = Vec::new();
        self.to_buffer(value, &mut buffer)?;
        Ok(buffer)
    }

    /// Pickles `value` into a string holding one character per byte.
    ///
    /// # Errors
    ///
    /// Same as [`to_buffer`](Self::to_buffer).
    pub fn to_string(&self, value: &Dynamic) -> Result<String, PickleError> {
        self.to_bytes(value).map(|bytes| text::bytes_to_text(&bytes))
    }

    /// Pickles `value` into `writer` and flushes it.
    ///
    /// # Errors
    ///
    /// Same as [`to_buffer`](Self::to_buffer), plus [`PickleError::Io`] if
    /// the writer fails.
    pub fn to_channel<W: Write>(
        &self,
        value: &Dynamic,
        mut writer: W,
    ) -> Result<(), PickleError> {
        let bytes = self.to_bytes(value)?;
        writer.write_all(&bytes)?;
        writer.flush()?;
        Ok(())
    }

    /// Unpickles a dynamic value that must span all of `bytes`.
    ///
    /// # Errors
    ///
    /// Returns [`PickleError::UnknownTag`] if the leading tag is not
    /// registered and [`PickleError::Unpickling`] if the input is truncated,
    /// malformed or followed by trailing bytes.
    pub fn from_bytes(&self, bytes: &[u8]) -> Result<Dynamic, PickleError> {
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

    /// Unpickles a dynamic value from a string produced by
    /// [`to_string`](Self::to_string).
    ///
    /// # Errors
    ///
    /// Same as [`from_bytes`](Self::from_bytes), plus
    /// [`PickleError::Unpickling`] if `text` holds a character above U+00FF.
    pub fn from_string(&self, text: &str) -> Result<Dynamic, PickleError> {
        self.from_bytes(&text::text_to_bytes(text)?)
    }

    /// Unpickles a dynamic value from a byte-at-a-time source, leaving the
    /// bytes after it in the source.
    ///
    /// # Errors
    ///
    /// Same as [`from_bytes`](Self::from_bytes) without the trailing input
    /// check.
    pub fn from_stream<I: IntoIterator<Item = u8>>(
        &self,
        source: I,
    ) -> Result<Dynamic, PickleError> {
        self.read_from(&mut IterReader::new(source.into_iter()))
    }

    /// Unpickles a dynamic value from `reader`.
    ///
    /// # Errors
    ///
    /// Same as [`from_bytes`](Self::from_bytes) without the trailing input
    /// check, plus [`PickleError::Io`] if the reader fails.
    pub fn from_channel<R: Read>(
        &self,
        mut reader: R,
    ) -> Result<Dynamic, PickleError> {
        self.read_from(&mut reader)
    }

    fn vtable_for(
        &self,
        value: &Dynamic,
    ) -> Result<&PickleVTable, PickleError> {
        self.get_by_type(value.type_rep())
            .ok_or_else(|| PickleError::Unregistered(value.type_rep().name()))
    }

    fn unpickle_dynamic(
        &self,
        reader: &mut ReadState<'_>,
    ) -> Result<Dynamic, PickleError> {
        let tag = reader.read_tag()?;
        let vtable = self.get(tag).ok_or_else(|| PickleError::UnknownTag {
            tag,
            context: "no registered type carries this tag".to_string(),
        })?;

        (vtable.decode)(reader)
    }

    #[tracing::instrument(level = "debug", skip_all)]
    fn read_from(
        &self,
        input: &mut dyn Read,
    ) -> Result<Dynamic, PickleError> {
        let mut reader = ReadState::new(input, self.configuration);

        match self.unpickle_dynamic(&mut reader) {
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
