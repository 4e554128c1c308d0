//! The [`Dump`] trait and its implementations for standard types.

use std::{
    collections::{BTreeMap, BTreeSet, VecDeque},
    rc::Rc,
    sync::Arc,
};

use crate::{Decoder, DumpFailure, Encoder};

/// Upper bound on the capacity reserved from an untrusted length prefix.
pub const MAX_PREALLOCATION: usize = 4096;

/// A type that can be written and read by plain structural recursion.
///
/// `Dump` keeps no table of what has already been written: a value that
/// appears twice is encoded twice. Use it for leaf data and small records;
/// the sharing-aware codec in the `picklejar` crate can lift any `Dump` type
/// into a record of its own.
///
/// # Example
///
/// ```ignore
/// struct Point {
///     x: i32,
///     y: i32,
/// }
///
/// impl Dump for Point {
///     fn dump<E: Encoder + ?Sized>(
///         &self,
///         encoder: &mut E,
///     ) -> Result<(), DumpFailure> {
///         self.x.dump(encoder)?;
///         self.y.dump(encoder)
///     }
///
///     fn undump<D: Decoder + ?Sized>(
///         decoder: &mut D,
///     ) -> Result<Self, DumpFailure> {
///         Ok(Self { x: i32::undump(decoder)?, y: i32::undump(decoder)? })
///     }
/// }
/// ```
pub trait Dump: Sized {
    /// Writes `self` to `encoder`.
    ///
    /// # Errors
    ///
    /// Returns an error if the underlying writer fails.
    fn dump<E: Encoder + ?Sized>(
        &self,
        encoder: &mut E,
    ) -> Result<(), DumpFailure>;

    /// Reads a value of this type from `decoder`.
    ///
    /// # Errors
    ///
    /// Returns [`DumpFailure::Truncated`] if the input ends early and
    /// [`DumpFailure::Malformed`] if the bytes do not describe a `Self`.
    fn undump<D: Decoder + ?Sized>(
        decoder: &mut D,
    ) -> Result<Self, DumpFailure>;
}

// =============================================================================
// Primitives
// =============================================================================

macro_rules! dump_primitive {
    ($($ty:ty => $emit:ident, $read:ident;)+) => {
        $(
            impl Dump for $ty {
                fn dump<E: Encoder + ?Sized>(
                    &self,
                    encoder: &mut E,
                ) -> Result<(), DumpFailure> {
                    Ok(encoder.$emit(*self)?)
                }

                fn undump<D: Decoder + ?Sized>(
                    decoder: &mut D,
                ) -> Result<Self, DumpFailure> {
                    Ok(decoder.$read()?)
                }
            }
        )+
    };
}

dump_primitive! {
    u8 => emit_u8, read_u8;
    u16 => emit_u16, read_u16;
    u32 => emit_u32, read_u32;
    u64 => emit_u64, read_u64;
    u128 => emit_u128, read_u128;
    usize => emit_usize, read_usize;
    i8 => emit_i8, read_i8;
    i16 => emit_i16, read_i16;
    i32 => emit_i32, read_i32;
    i64 => emit_i64, read_i64;
    i128 => emit_i128, read_i128;
    isize => emit_isize, read_isize;
    bool => emit_bool, read_bool;
    char => emit_char, read_char;
    f32 => emit_f32, read_f32;
    f64 => emit_f64, read_f64;
}

impl Dump for () {
    fn dump<E: Encoder + ?Sized>(&self, _: &mut E) -> Result<(), DumpFailure> {
        Ok(())
    }

    fn undump<D: Decoder + ?Sized>(_: &mut D) -> Result<Self, DumpFailure> {
        Ok(())
    }
}

impl Dump for String {
    fn dump<E: Encoder + ?Sized>(
        &self,
        encoder: &mut E,
    ) -> Result<(), DumpFailure> {
        Ok(encoder.emit_str(self)?)
    }

    fn undump<D: Decoder + ?Sized>(
        decoder: &mut D,
    ) -> Result<Self, DumpFailure> {
        Ok(decoder.read_str()?)
    }
}

// =============================================================================
// Smart pointers
// =============================================================================

macro_rules! dump_pointer {
    ($($ptr:ident),+) => {
        $(
            impl<T: Dump> Dump for $ptr<T> {
                fn dump<E: Encoder + ?Sized>(
                    &self,
                    encoder: &mut E,
                ) -> Result<(), DumpFailure> {
                    (**self).dump(encoder)
                }

                fn undump<D: Decoder + ?Sized>(
                    decoder: &mut D,
                ) -> Result<Self, DumpFailure> {
                    T::undump(decoder).map($ptr::new)
                }
            }
        )+
    };
}

dump_pointer!(Box, Rc, Arc);

// =============================================================================
// Option and Result
// =============================================================================

impl<T: Dump> Dump for Option<T> {
    fn dump<E: Encoder + ?Sized>(
        &self,
        encoder: &mut E,
    ) -> Result<(), DumpFailure> {
        match self {
            Some(v) => {
                encoder.emit_bool(true)?;
                v.dump(encoder)
            }
            None => Ok(encoder.emit_bool(false)?),
        }
    }

    fn undump<D: Decoder + ?Sized>(
        decoder: &mut D,
    ) -> Result<Self, DumpFailure> {
        if decoder.read_bool()? {
            T::undump(decoder).map(Some)
        } else {
            Ok(None)
        }
    }
}

impl<T: Dump, U: Dump> Dump for Result<T, U> {
    fn dump<E: Encoder + ?Sized>(
        &self,
        encoder: &mut E,
    ) -> Result<(), DumpFailure> {
        match self {
            Ok(v) => {
                encoder.emit_bool(true)?;
                v.dump(encoder)
            }
            Err(e) => {
                encoder.emit_bool(false)?;
                e.dump(encoder)
            }
        }
    }

    fn undump<D: Decoder + ?Sized>(
        decoder: &mut D,
    ) -> Result<Self, DumpFailure> {
        if decoder.read_bool()? {
            T::undump(decoder).map(Ok)
        } else {
            U::undump(decoder).map(Err)
        }
    }
}

// =============================================================================
// Collections
// =============================================================================

fn dump_sequence<'a, T: Dump + 'a, E: Encoder + ?Sized>(
    len: usize,
    items: impl IntoIterator<Item = &'a T>,
    encoder: &mut E,
) -> Result<(), DumpFailure> {
    encoder.emit_usize(len)?;
    for item in items {
        item.dump(encoder)?;
    }
    Ok(())
}

/// Vectors of zero-sized elements consume no input per element, so their
/// length is capped at [`MAX_PREALLOCATION`] on decode.
impl<T: Dump> Dump for Vec<T> {
    fn dump<E: Encoder + ?Sized>(
        &self,
        encoder: &mut E,
    ) -> Result<(), DumpFailure> {
        dump_sequence(self.len(), self, encoder)
    }

    fn undump<D: Decoder + ?Sized>(
        decoder: &mut D,
    ) -> Result<Self, DumpFailure> {
        let len = decoder.read_usize()?;
        if size_of::<T>() == 0 && len > MAX_PREALLOCATION {
            return Err(DumpFailure::malformed(format!(
                "{len} zero-sized elements exceed the limit of \
                 {MAX_PREALLOCATION}"
            )));
        }

        let mut vec = Self::with_capacity(len.min(MAX_PREALLOCATION));
        for _ in 0..len {
            vec.push(T::undump(decoder)?);
        }
        Ok(vec)
    }
}

impl<T: Dump> Dump for VecDeque<T> {
    fn dump<E: Encoder + ?Sized>(
        &self,
        encoder: &mut E,
    ) -> Result<(), DumpFailure> {
        dump_sequence(self.len(), self, encoder)
    }

    fn undump<D: Decoder + ?Sized>(
        decoder: &mut D,
    ) -> Result<Self, DumpFailure> {
        Vec::<T>::undump(decoder).map(Self::from)
    }
}

impl<T: Dump + Ord> Dump for BTreeSet<T> {
    fn dump<E: Encoder + ?Sized>(
        &self,
        encoder: &mut E,
    ) -> Result<(), DumpFailure> {
        dump_sequence(self.len(), self, encoder)
    }

    fn undump<D: Decoder + ?Sized>(
        decoder: &mut D,
    ) -> Result<Self, DumpFailure> {
        let len = decoder.read_usize()?;
        let mut set = Self::new();
        for _ in 0..len {
            if !set.insert(T::undump(decoder)?) {
                return Err(DumpFailure::malformed("duplicate set element"));
            }
        }
        Ok(set)
    }
}

impl<K: Dump + Ord, V: Dump> Dump for BTreeMap<K, V> {
    fn dump<E: Encoder + ?Sized>(
        &self,
        encoder: &mut E,
    ) -> Result<(), DumpFailure> {
        encoder.emit_usize(self.len())?;
        for (key, value) in self {
            key.dump(encoder)?;
            value.dump(encoder)?;
        }
        Ok(())
    }

    fn undump<D: Decoder + ?Sized>(
        decoder: &mut D,
    ) -> Result<Self, DumpFailure> {
        let len = decoder.read_usize()?;
        let mut map = Self::new();
        for _ in 0..len {
            let key = K::undump(decoder)?;
            let value = V::undump(decoder)?;
            if map.insert(key, value).is_some() {
                return Err(DumpFailure::malformed("duplicate map key"));
            }
        }
        Ok(map)
    }
}

// =============================================================================
// Tuples
// =============================================================================

macro_rules! dump_tuple {
    ($($name:ident),+) => {
        impl<$($name: Dump),+> Dump for ($($name,)+) {
            #[allow(non_snake_case)]
            fn dump<Enc: Encoder + ?Sized>(
                &self,
                encoder: &mut Enc,
            ) -> Result<(), DumpFailure> {
                let ($($name,)+) = self;
                $(
                    $name.dump(encoder)?;
                )+
                Ok(())
            }

            fn undump<Dec: Decoder + ?Sized>(
                decoder: &mut Dec,
            ) -> Result<Self, DumpFailure> {
                Ok(($($name::undump(decoder)?,)+))
            }
        }
    };
}

dump_tuple!(A);
dump_tuple!(A, B);
dump_tuple!(A, B, C);
dump_tuple!(A, B, C, D);
dump_tuple!(A, B, C, D, E);
dump_tuple!(A, B, C, D, E, F);
