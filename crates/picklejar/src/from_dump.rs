//! Lifting [`Dump`](picklejar_dump::Dump) implementations into
//! [`Pickle`](crate::Pickle).
//!
//! A lifted type is written as a single fresh record whose payload is its
//! plain dump. Sharing still applies to the value as a whole, but nothing
//! inside the dump is ever shared, since the dump encoder has no view of the
//! session's sharing table.
//!
//! The sharing hint of a lifted value is a hash of its dump, so equal values
//! with identical dumps are found without a scan.

use picklejar_dump::{Dump, PostcardEncoder};

/// Hashes the dump of `value`, or returns `None` if it cannot be dumped.
#[doc(hidden)]
#[must_use]
pub fn dump_hint<T: Dump>(value: &T) -> Option<u64> {
    let mut encoder = PostcardEncoder::new(Vec::new());
    value.dump(&mut encoder).ok()?;
    Some(fxhash::hash64(encoder.get_ref()))
}

/// Implements [`Pickle`](crate::Pickle) for types that already implement
/// [`Dump`](picklejar_dump::Dump), [`Typeable`](picklejar_type_rep::Typeable),
/// [`PartialEq`] and [`Clone`].
///
/// ```ignore
/// #[derive(Debug, Clone, PartialEq)]
/// struct Rgb(u8, u8, u8);
///
/// impl Dump for Rgb { /* ... */ }
///
/// typeable!(Rgb);
/// pickle_from_dump!(Rgb => Tag::user(7));
/// ```
#[macro_export]
macro_rules! pickle_from_dump {
    ($($ty:ty => $tag:expr),+ $(,)?) => {
        $(
            impl $crate::Pickle for $ty {
                const TAG: $crate::Tag = $tag;

                fn pickle_fields<'v>(
                    &'v self,
                    writer: &mut $crate::WriteState<'v>,
                ) -> ::std::result::Result<(), $crate::PickleError> {
                    writer.dump(self)
                }

                fn unpickle_fields(
                    reader: &mut $crate::ReadState<'_>,
                ) -> ::std::result::Result<Self, $crate::PickleError> {
                    reader.undump()
                }

                fn sharing_hint(&self) -> ::std::option::Option<u64> {
                    $crate::dump_hint(self)
                }
            }
        )+
    };
}
