//! [`Pickle`] implementations for standard types.
//!
//! Scalars and `String` are lifted from their [`Dump`](picklejar_dump::Dump)
//! encoding. Containers write every element as a record of its own, so
//! sharing reaches inside them.

use std::{collections::BTreeMap, rc::Rc, sync::Arc};

use crate::{Pickle, PickleError, ReadState, Tag, WriteState};

crate::pickle_from_dump! {
    () => Tag::UNIT,
    bool => Tag::BOOL,
    u8 => Tag::U8,
    u16 => Tag::U16,
    u32 => Tag::U32,
    u64 => Tag::U64,
    u128 => Tag::U128,
    usize => Tag::USIZE,
    i8 => Tag::I8,
    i16 => Tag::I16,
    i32 => Tag::I32,
    i64 => Tag::I64,
    i128 => Tag::I128,
    isize => Tag::ISIZE,
    f32 => Tag::F32,
    f64 => Tag::F64,
    char => Tag::CHAR,
    String => Tag::STRING,
}

// =============================================================================
// Option and Result
// =============================================================================

impl<T: Pickle> Pickle for Option<T> {
    const TAG: Tag = Tag::OPTION;

    fn pickle_fields<'v>(
        &'v self,
        writer: &mut WriteState<'v>,
    ) -> Result<(), PickleError> {
        writer.dump(&self.is_some())?;
        if let Some(value) = self {
            writer.pickle(value)?;
        }
        Ok(())
    }

    fn unpickle_fields(
        reader: &mut ReadState<'_>,
    ) -> Result<Self, PickleError> {
        if reader.undump::<bool>()? {
            reader.unpickle().map(Some)
        } else {
            Ok(None)
        }
    }
}

impl<T: Pickle, E: Pickle> Pickle for Result<T, E> {
    const TAG: Tag = Tag::RESULT;

    fn pickle_fields<'v>(
        &'v self,
        writer: &mut WriteState<'v>,
    ) -> Result<(), PickleError> {
        writer.dump(&self.is_ok())?;
        match self {
            Ok(value) => writer.pickle(value)?,
            Err(error) => writer.pickle(error)?,
        };
        Ok(())
    }

    fn unpickle_fields(
        reader: &mut ReadState<'_>,
    ) -> Result<Self, PickleError> {
        if reader.undump::<bool>()? {
            reader.unpickle().map(Ok)
        } else {
            reader.unpickle().map(Err)
        }
    }
}

// =============================================================================
// Pointers
// =============================================================================

// The pointer and its pointee are separate records. Equal `Rc`s share at the
// pointer level, so a back-reference clones the decoded `Rc` and the aliasing
// comes back.
macro_rules! pickle_pointer {
    ($($ptr:ident => $tag:expr),+ $(,)?) => {
        $(
            impl<T: Pickle> Pickle for $ptr<T> {
                const TAG: Tag = $tag;

                fn pickle_fields<'v>(
                    &'v self,
                    writer: &mut WriteState<'v>,
                ) -> Result<(), PickleError> {
                    writer.pickle::<T>(self)?;
                    Ok(())
                }

                fn unpickle_fields(
                    reader: &mut ReadState<'_>,
                ) -> Result<Self, PickleError> {
                    reader.unpickle::<T>().map($ptr::new)
                }
            }
        )+
    };
}

pickle_pointer! {
    Box => Tag::BOX,
    Rc => Tag::RC,
    Arc => Tag::ARC,
}

// =============================================================================
// Collections
// =============================================================================

impl<T: Pickle> Pickle for Vec<T> {
    const TAG: Tag = Tag::VEC;

    fn pickle_fields<'v>(
        &'v self,
        writer: &mut WriteState<'v>,
    ) -> Result<(), PickleError> {
        writer.emit_len(self.len())?;
        for item in self {
            writer.pickle(item)?;
        }
        Ok(())
    }

    fn unpickle_fields(
        reader: &mut ReadState<'_>,
    ) -> Result<Self, PickleError> {
        let len = reader.read_len()?;
        let mut vec = Self::with_capacity(reader.capacity_for(len));
        for _ in 0..len {
            vec.push(reader.unpickle()?);
        }
        Ok(vec)
    }
}

impl<K: Pickle + Ord, V: Pickle> Pickle for BTreeMap<K, V> {
    const TAG: Tag = Tag::BTREE_MAP;

    fn pickle_fields<'v>(
        &'v self,
        writer: &mut WriteState<'v>,
    ) -> Result<(), PickleError> {
        writer.emit_len(self.len())?;
        for (key, value) in self {
            writer.pickle(key)?;
            writer.pickle(value)?;
        }
        Ok(())
    }

    fn unpickle_fields(
        reader: &mut ReadState<'_>,
    ) -> Result<Self, PickleError> {
        let len = reader.read_len()?;
        let mut map = Self::new();
        for _ in 0..len {
            let key = reader.unpickle()?;
            let value = reader.unpickle()?;
            if map.insert(key, value).is_some() {
                return Err(PickleError::unpickling("duplicate map key"));
            }
        }
        Ok(map)
    }
}

// =============================================================================
// Tuples
// =============================================================================

macro_rules! pickle_tuple {
    ($tag:expr => $($name:ident),+) => {
        impl<$($name: Pickle),+> Pickle for ($($name,)+) {
            const TAG: Tag = $tag;

            #[allow(non_snake_case)]
            fn pickle_fields<'v>(
                &'v self,
                writer: &mut WriteState<'v>,
            ) -> Result<(), PickleError> {
                let ($($name,)+) = self;
                $(
                    writer.pickle($name)?;
                )+
                Ok(())
            }

            fn unpickle_fields(
                reader: &mut ReadState<'_>,
            ) -> Result<Self, PickleError> {
                Ok(($(reader.unpickle::<$name>()?,)+))
            }
        }
    };
}

pickle_tuple!(Tag::TUPLE2 => A, B);
pickle_tuple!(Tag::TUPLE3 => A, B, C);
pickle_tuple!(Tag::TUPLE4 => A, B, C, D);
