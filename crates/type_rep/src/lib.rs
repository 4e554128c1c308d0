//! Contains the definition of the [`TypeRep`] type, the [`Typeable`] trait and
//! the type-erased [`Dynamic`] container.
//!
//! A [`TypeRep`] is handed out by a process-wide registry the first time a
//! type asks for one. Handles are cheap to copy, totally ordered, and stay
//! valid for the lifetime of the process. They are a runtime notion only:
//! nothing about a [`TypeRep`] is meant to be written to disk, and the order in
//! which types are registered depends on the order in which the program first
//! touches them.
//!
//! # Examples
//!
//! ```ignore
//! use picklejar_type_rep::{Dynamic, Typeable, TypeRep, typeable};
//!
//! #[derive(Debug, PartialEq)]
//! struct Meters(f64);
//!
//! typeable!(Meters);
//!
//! let boxed = Meters(3.5).make_dynamic();
//! assert!(Meters::has_type(&boxed));
//! assert_eq!(boxed.type_rep(), TypeRep::of::<Meters>());
//! assert_eq!(Meters::cast(boxed), Some(Meters(3.5)));
//! ```

use std::{
    any::{Any, TypeId},
    cmp::Ordering,
    collections::BTreeMap,
    hash::{Hash, Hasher},
    rc::Rc,
    sync::{
        Arc, LazyLock,
        atomic::{self, AtomicU32},
    },
};

use dashmap::DashMap;
use fxhash::FxBuildHasher;

mod dynamic;

pub use dynamic::{CastFailure, Dynamic};

/// The registry backing [`TypeRep::of`].
static REGISTRY: LazyLock<DashMap<TypeId, TypeRep, FxBuildHasher>> =
    LazyLock::new(|| DashMap::with_hasher(FxBuildHasher::default()));

/// The index handed to the next type that registers.
static NEXT_INDEX: AtomicU32 = AtomicU32::new(0);

/// A runtime identifier for a concrete type.
///
/// Two `TypeRep`s compare equal if and only if they were produced for the same
/// type. Equality, ordering and hashing only look at the registration index,
/// so a `TypeRep` is a perfectly good key for both hash maps and ordered maps.
///
/// The human-readable [`name`](Self::name) is carried along for diagnostics
/// and does not take part in comparisons.
#[derive(Debug, Clone, Copy)]
pub struct TypeRep {
    index: u32,
    name: &'static str,
}

impl TypeRep {
    /// Returns the identifier of `T`, registering it on first use.
    ///
    /// Concurrent first calls for the same type agree on a single index: the
    /// registry hands out an index while holding the entry for `T`.
    #[must_use]
    pub fn of<T: ?Sized + 'static>() -> Self {
        let type_id = TypeId::of::<T>();

        if let Some(existing) = REGISTRY.get(&type_id) {
            return *existing;
        }

        *REGISTRY.entry(type_id).or_insert_with(|| Self {
            index: NEXT_INDEX.fetch_add(1, atomic::Ordering::Relaxed),
            name: std::any::type_name::<T>(),
        })
    }

    /// Returns the registration index of this type.
    ///
    /// Indices are dense and start at zero, in first-use order.
    #[must_use]
    pub const fn index(&self) -> u32 { self.index }

    /// Returns the name of the type as reported by
    /// [`std::any::type_name`].
    #[must_use]
    pub const fn name(&self) -> &'static str { self.name }

    /// Returns the number of types registered so far in this process.
    #[must_use]
    pub fn registered_count() -> usize { REGISTRY.len() }
}

impl PartialEq for TypeRep {
    fn eq(&self, other: &Self) -> bool { self.index == other.index }
}

impl Eq for TypeRep {}

impl PartialOrd for TypeRep {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for TypeRep {
    fn cmp(&self, other: &Self) -> Ordering { self.index.cmp(&other.index) }
}

impl Hash for TypeRep {
    fn hash<H: Hasher>(&self, state: &mut H) { self.index.hash(state); }
}

impl std::fmt::Display for TypeRep {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name)
    }
}

/// A type that can report its [`TypeRep`] and move in and out of a
/// [`Dynamic`].
///
/// Only [`type_rep`](Self::type_rep) has to be written by hand; every other
/// method is derived from it. For non-generic types the [`typeable!`] macro
/// writes that single method.
///
/// # Examples
///
/// ```ignore
/// struct Celsius(f32);
///
/// impl Typeable for Celsius {
///     fn type_rep() -> TypeRep { TypeRep::of::<Self>() }
/// }
/// ```
#[diagnostic::on_unimplemented(
    message = "The type `{Self}` does not implement `Typeable`",
    note = "Implement `type_rep` or use the `typeable!` macro",
    label = "`Typeable` is required for runtime type identification"
)]
pub trait Typeable: Any {
    /// Returns the runtime identifier of `Self`.
    fn type_rep() -> TypeRep
    where
        Self: Sized;

    /// Returns `true` if `dynamic` holds a value of type `Self`.
    fn has_type(dynamic: &Dynamic) -> bool
    where
        Self: Sized,
    {
        dynamic.type_rep() == Self::type_rep()
    }

    /// Unwraps `dynamic` if it holds a `Self`, returning `None` otherwise.
    fn cast(dynamic: Dynamic) -> Option<Self>
    where
        Self: Sized,
    {
        dynamic.try_cast::<Self>().ok()
    }

    /// Borrows the payload of `dynamic` if it holds a `Self`.
    fn cast_ref(dynamic: &Dynamic) -> Option<&Self>
    where
        Self: Sized,
    {
        if Self::has_type(dynamic) { dynamic.payload_ref() } else { None }
    }

    /// Unwraps `dynamic`, failing with a [`CastFailure`] that names both types
    /// when it does not hold a `Self`.
    ///
    /// # Errors
    ///
    /// Returns [`CastFailure`] on a type mismatch.
    fn throwing_cast(dynamic: Dynamic) -> Result<Self, CastFailure>
    where
        Self: Sized,
    {
        let found = dynamic.type_rep();
        dynamic.try_cast::<Self>().map_err(|_| CastFailure {
            expected: Self::type_rep(),
            found,
        })
    }

    /// Wraps `self` together with its [`TypeRep`].
    fn make_dynamic(self) -> Dynamic
    where
        Self: Sized,
    {
        Dynamic::new(self)
    }
}

/// Implements [`Typeable`] for one or more non-generic types.
///
/// ```ignore
/// struct UserId(u64);
/// struct Email(String);
///
/// picklejar_type_rep::typeable!(UserId, Email);
/// ```
#[macro_export]
macro_rules! typeable {
    ($($ty:ty),+ $(,)?) => {
        $(
            impl $crate::Typeable for $ty {
                fn type_rep() -> $crate::TypeRep {
                    $crate::TypeRep::of::<Self>()
                }
            }
        )+
    };
}

typeable!(
    (),
    bool,
    char,
    u8,
    u16,
    u32,
    u64,
    u128,
    usize,
    i8,
    i16,
    i32,
    i64,
    i128,
    isize,
    f32,
    f64,
    String,
);

macro_rules! typeable_generic {
    ($($outer:ident<$($param:ident),+>),+ $(,)?) => {
        $(
            impl<$($param: Typeable),+> Typeable for $outer<$($param),+> {
                fn type_rep() -> TypeRep { TypeRep::of::<Self>() }
            }
        )+
    };
}

typeable_generic!(
    Vec<T>,
    Option<T>,
    Box<T>,
    Rc<T>,
    Arc<T>,
    Result<T, E>,
    BTreeMap<K, V>,
);

macro_rules! typeable_tuple {
    ($($name:ident)+) => {
        impl<$($name: Typeable),+> Typeable for ($($name,)+) {
            fn type_rep() -> TypeRep { TypeRep::of::<Self>() }
        }
    };
}

typeable_tuple! { A }
typeable_tuple! { A B }
typeable_tuple! { A B C }
typeable_tuple! { A B C D }
typeable_tuple! { A B C D E }
typeable_tuple! { A B C D E F }

#[cfg(test)]
mod test;
