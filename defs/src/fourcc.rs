//! Four-character record and sub-record tags.

use std::fmt;

/// Packs four ASCII bytes into the little-endian integer key used on the wire.
///
/// `fourcc(b"TES3")` equals `u32::from_le_bytes(*b"TES3")`, independent of
/// the host byte order.
#[must_use]
pub const fn fourcc(name: &[u8; 4]) -> u32 {
    (name[0] as u32) | (name[1] as u32) << 8 | (name[2] as u32) << 16 | (name[3] as u32) << 24
}

/// A record or sub-record tag.
#[derive(Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct RecName([u8; 4]);

impl RecName {
    /// Creates a tag from its four bytes.
    #[must_use]
    pub const fn new(name: [u8; 4]) -> Self {
        Self(name)
    }

    /// Recovers a tag from its packed integer key.
    #[must_use]
    pub const fn from_int(value: u32) -> Self {
        Self(value.to_le_bytes())
    }

    /// Returns the packed integer key.
    #[must_use]
    pub const fn to_int(self) -> u32 {
        fourcc(&self.0)
    }

    /// Returns the raw tag bytes.
    #[must_use]
    pub const fn as_bytes(&self) -> &[u8; 4] {
        &self.0
    }
}

impl From<[u8; 4]> for RecName {
    fn from(name: [u8; 4]) -> Self {
        Self(name)
    }
}

impl From<&[u8; 4]> for RecName {
    fn from(name: &[u8; 4]) -> Self {
        Self(*name)
    }
}

impl From<RecName> for u32 {
    fn from(name: RecName) -> Self {
        name.to_int()
    }
}

impl PartialEq<[u8; 4]> for RecName {
    fn eq(&self, other: &[u8; 4]) -> bool {
        self.0 == *other
    }
}

impl PartialEq<&[u8; 4]> for RecName {
    fn eq(&self, other: &&[u8; 4]) -> bool {
        self.0 == **other
    }
}

impl fmt::Display for RecName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for &byte in &self.0 {
            if byte.is_ascii_graphic() || byte == b' ' {
                write!(f, "{}", byte as char)?;
            } else {
                write!(f, "\\x{byte:02X}")?;
            }
        }
        Ok(())
    }
}

impl fmt::Debug for RecName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "RecName(\"{self}\")")
    }
}
