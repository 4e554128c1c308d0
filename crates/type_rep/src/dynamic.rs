use std::any::Any;

use crate::{TypeRep, Typeable};

/// Error returned when a [`Dynamic`] is unwrapped at the wrong type.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, thiserror::Error)]
#[error(
    "cast failure: expected a value of type `{}`, found `{}`",
    .expected.name(),
    .found.name()
)]
pub struct CastFailure {
    /// The type the caller asked for.
    pub expected: TypeRep,

    /// The type actually stored in the dynamic value.
    pub found: TypeRep,
}

/// A type-erased value tagged with the [`TypeRep`] of its concrete type.
///
/// A `Dynamic` is meant to be short-lived: build one with [`Dynamic::new`] or
/// [`Typeable::make_dynamic`], pass it around, and get the concrete value back
/// with [`Typeable::cast`] or [`Typeable::throwing_cast`].
pub struct Dynamic {
    type_rep: TypeRep,
    payload: Box<dyn Any>,
}

impl Dynamic {
    /// Wraps `value` together with its [`TypeRep`].
    #[must_use]
    pub fn new<T: Typeable>(value: T) -> Self {
        Self { type_rep: T::type_rep(), payload: Box::new(value) }
    }

    /// Returns the [`TypeRep`] recorded when this value was wrapped.
    #[must_use]
    pub const fn type_rep(&self) -> TypeRep { self.type_rep }

    /// Unwraps the payload as a `T`, handing `self` back untouched on a
    /// mismatch.
    ///
    /// # Errors
    ///
    /// Returns `self` when the stored type is not `T`.
    pub fn try_cast<T: Typeable>(self) -> Result<T, Self> {
        if self.type_rep != T::type_rep() {
            return Err(self);
        }

        let type_rep = self.type_rep;
        self.payload
            .downcast::<T>()
            .map(|boxed| *boxed)
            .map_err(|payload| Self { type_rep, payload })
    }

    /// Returns the payload as a `&dyn Any`.
    #[must_use]
    pub fn as_any(&self) -> &dyn Any { &*self.payload }

    pub(crate) fn payload_ref<T: Any>(&self) -> Option<&T> {
        self.payload.downcast_ref()
    }
}

impl std::fmt::Debug for Dynamic {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Dynamic")
            .field("type_rep", &self.type_rep.name())
            .finish_non_exhaustive()
    }
}
