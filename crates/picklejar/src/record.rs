//! Record framing: wire tags, reference ids and the fresh/back-reference
//! discriminant.
//!
//! Every pickled value starts with a header
//!
//! ```text
//! [tag: u16, little-endian, 2 bytes][kind: u8][ref-id: LEB128 varint]
//! ```
//!
//! A `FRESH` header is followed by the fields of the value. A `BACKREF` header
//! stands for the value previously written under the same id and carries no
//! further bytes.

use std::fmt;

/// The wire identifier of a [`Pickle`](crate::Pickle) type.
///
/// Tags are chosen by whoever writes the `Pickle` implementation and must be
/// unique among the types a decoder is prepared to accept. They are written
/// into every record, so changing a tag breaks previously written data.
///
/// Tag `0` is never valid. Tags `0x0001..=0x00FF` belong to the built-in
/// implementations of this crate; user types should start at
/// [`Tag::USER_BASE`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Tag(u16);

impl Tag {
    /// The first tag available to user-defined types.
    pub const USER_BASE: Self = Self(0x0100);

    /// Creates a tag from its wire value.
    ///
    /// # Panics
    ///
    /// Panics if `value` is `0`. In a `const` item this is a compile error.
    #[must_use]
    pub const fn new(value: u16) -> Self {
        assert!(value != 0, "tag 0 is reserved");
        Self(value)
    }

    /// Creates the tag `offset` places after [`Tag::USER_BASE`].
    ///
    /// # Panics
    ///
    /// Panics if the result does not fit in 16 bits.
    #[must_use]
    pub const fn user(offset: u16) -> Self {
        match Self::USER_BASE.0.checked_add(offset) {
            Some(value) => Self(value),
            None => panic!("user tag out of range"),
        }
    }

    /// Returns the wire value of this tag.
    #[must_use]
    pub const fn value(self) -> u16 { self.0 }

    pub(crate) const fn from_wire(bytes: [u8; 2]) -> Self {
        Self(u16::from_le_bytes(bytes))
    }

    pub(crate) const fn to_wire(self) -> [u8; 2] { self.0.to_le_bytes() }
}

impl fmt::Display for Tag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:#06x}", self.0)
    }
}

// =============================================================================
// Built-in tags
// =============================================================================

impl Tag {
    pub const UNIT: Self = Self::new(0x01);
    pub const BOOL: Self = Self::new(0x02);
    pub const U8: Self = Self::new(0x03);
    pub const U16: Self = Self::new(0x04);
    pub const U32: Self = Self::new(0x05);
    pub const U64: Self = Self::new(0x06);
    pub const USIZE: Self = Self::new(0x07);
    pub const I8: Self = Self::new(0x08);
    pub const I16: Self = Self::new(0x09);
    pub const I32: Self = Self::new(0x0A);
    pub const I64: Self = Self::new(0x0B);
    pub const ISIZE: Self = Self::new(0x0C);
    pub const F32: Self = Self::new(0x0D);
    pub const F64: Self = Self::new(0x0E);
    pub const CHAR: Self = Self::new(0x0F);
    pub const STRING: Self = Self::new(0x10);
    pub const U128: Self = Self::new(0x11);
    pub const I128: Self = Self::new(0x12);

    pub const OPTION: Self = Self::new(0x20);
    pub const RESULT: Self = Self::new(0x21);
    pub const VEC: Self = Self::new(0x22);
    pub const BOX: Self = Self::new(0x23);
    pub const RC: Self = Self::new(0x24);
    pub const ARC: Self = Self::new(0x25);
    pub const TUPLE2: Self = Self::new(0x26);
    pub const TUPLE3: Self = Self::new(0x27);
    pub const TUPLE4: Self = Self::new(0x28);
    pub const BTREE_MAP: Self = Self::new(0x29);
}

/// Identifies a record within one encoding or decoding session.
///
/// Ids are assigned in write order starting at zero. They mean nothing
/// outside the session that produced them.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct RefId(pub(crate) u64);

impl RefId {
    /// Returns the numeric value of this id.
    #[must_use]
    pub const fn value(self) -> u64 { self.0 }
}

impl fmt::Display for RefId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// The byte following the tag.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u8)]
pub(crate) enum Kind {
    Fresh = 0,
    Backref = 1,
}

impl Kind {
    pub(crate) const fn from_byte(byte: u8) -> Option<Self> {
        match byte {
            0 => Some(Self::Fresh),
            1 => Some(Self::Backref),
            _ => None,
        }
    }
}
