//! Reference ids naming game objects.

use std::cmp::Ordering;
use std::fmt;
use std::hash::{Hash, Hasher};

use crate::fourcc::RecName;

/// Identifies a referenced game object.
///
/// String ids compare, hash and order ASCII case-insensitively, so
/// `"Gold_001"` and `"gold_001"` are the same id. An empty string id is the
/// same id as [`RefId::Empty`]. Ids of different kinds order by kind first.
#[derive(Clone, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum RefId {
    /// No object.
    #[default]
    Empty,
    /// Free-text id of any length.
    String(String),
    /// Plugin-relative form id.
    FormId { index: u32, content_file: i32 },
    /// Runtime generated id.
    Generated(u64),
    /// Index into a record table identified by its tag.
    Index { record_type: RecName, value: u32 },
    /// Exterior cell at grid coordinates.
    Esm3ExteriorCell { x: i32, y: i32 },
}

/// Tag byte preceding a binary encoded [`RefId`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u8)]
pub enum RefIdType {
    Empty = 0,
    SizedString = 1,
    UnsizedString = 2,
    FormId = 3,
    Generated = 4,
    Index = 5,
    Esm3ExteriorCell = 6,
}

impl RefIdType {
    /// Decodes a tag byte.
    #[must_use]
    pub const fn from_u8(value: u8) -> Option<Self> {
        match value {
            0 => Some(Self::Empty),
            1 => Some(Self::SizedString),
            2 => Some(Self::UnsizedString),
            3 => Some(Self::FormId),
            4 => Some(Self::Generated),
            5 => Some(Self::Index),
            6 => Some(Self::Esm3ExteriorCell),
            _ => None,
        }
    }

    /// Returns the tag byte.
    #[must_use]
    pub const fn as_u8(self) -> u8 {
        self as u8
    }
}

impl RefId {
    /// Creates a string id. An empty string yields [`RefId::Empty`].
    #[must_use]
    pub fn string_ref_id(value: impl Into<String>) -> Self {
        let value = value.into();
        if value.is_empty() {
            Self::Empty
        } else {
            Self::String(value)
        }
    }

    /// Creates the id of the exterior cell at `(x, y)`.
    #[must_use]
    pub const fn esm3_exterior_cell(x: i32, y: i32) -> Self {
        Self::Esm3ExteriorCell { x, y }
    }

    /// Creates a runtime generated id.
    #[must_use]
    pub const fn generated(value: u64) -> Self {
        Self::Generated(value)
    }

    /// Creates an index id into the table of `record_type`.
    #[must_use]
    pub const fn index(record_type: RecName, value: u32) -> Self {
        Self::Index { record_type, value }
    }

    /// Creates a form id.
    #[must_use]
    pub const fn form_id(index: u32, content_file: i32) -> Self {
        Self::FormId {
            index,
            content_file,
        }
    }

    /// Returns `true` for [`RefId::Empty`] and the empty string id.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        match self {
            Self::Empty => true,
            Self::String(value) => value.is_empty(),
            _ => false,
        }
    }

    /// Returns the text of a string id, `""` for the empty id.
    #[must_use]
    pub fn as_str(&self) -> Option<&str> {
        match self {
            Self::Empty => Some(""),
            Self::String(value) => Some(value),
            _ => None,
        }
    }

    /// Case-insensitive comparison against a string id.
    #[must_use]
    pub fn eq_str(&self, other: &str) -> bool {
        self.as_str()
            .is_some_and(|value| value.eq_ignore_ascii_case(other))
    }

    fn rank(&self) -> u8 {
        match self {
            Self::Empty => 0,
            Self::String(value) if value.is_empty() => 0,
            Self::String(_) => 1,
            Self::FormId { .. } => 2,
            Self::Generated(_) => 3,
            Self::Index { .. } => 4,
            Self::Esm3ExteriorCell { .. } => 5,
        }
    }
}

fn cmp_ignore_ascii_case(lhs: &str, rhs: &str) -> Ordering {
    lhs.bytes()
        .map(|b| b.to_ascii_lowercase())
        .cmp(rhs.bytes().map(|b| b.to_ascii_lowercase()))
}

impl PartialEq for RefId {
    fn eq(&self, other: &Self) -> bool {
        if self.is_empty() || other.is_empty() {
            return self.is_empty() && other.is_empty();
        }
        match (self, other) {
            (Self::String(lhs), Self::String(rhs)) => lhs.eq_ignore_ascii_case(rhs),
            (
                Self::FormId {
                    index: li,
                    content_file: lc,
                },
                Self::FormId {
                    index: ri,
                    content_file: rc,
                },
            ) => li == ri && lc == rc,
            (Self::Generated(lhs), Self::Generated(rhs)) => lhs == rhs,
            (
                Self::Index {
                    record_type: lt,
                    value: lv,
                },
                Self::Index {
                    record_type: rt,
                    value: rv,
                },
            ) => lt == rt && lv == rv,
            (
                Self::Esm3ExteriorCell { x: lx, y: ly },
                Self::Esm3ExteriorCell { x: rx, y: ry },
            ) => lx == rx && ly == ry,
            _ => false,
        }
    }
}

impl Eq for RefId {}

impl Hash for RefId {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.rank().hash(state);
        match self {
            Self::Empty => {}
            Self::String(value) => {
                for byte in value.bytes() {
                    state.write_u8(byte.to_ascii_lowercase());
                }
            }
            Self::FormId {
                index,
                content_file,
            } => {
                index.hash(state);
                content_file.hash(state);
            }
            Self::Generated(value) => value.hash(state),
            Self::Index { record_type, value } => {
                record_type.hash(state);
                value.hash(state);
            }
            Self::Esm3ExteriorCell { x, y } => {
                x.hash(state);
                y.hash(state);
            }
        }
    }
}

impl Ord for RefId {
    fn cmp(&self, other: &Self) -> Ordering {
        match (self, other) {
            (Self::String(lhs), Self::String(rhs)) => cmp_ignore_ascii_case(lhs, rhs),
            (
                Self::FormId {
                    index: li,
                    content_file: lc,
                },
                Self::FormId {
                    index: ri,
                    content_file: rc,
                },
            ) => (lc, li).cmp(&(rc, ri)),
            (Self::Generated(lhs), Self::Generated(rhs)) => lhs.cmp(rhs),
            (
                Self::Index {
                    record_type: lt,
                    value: lv,
                },
                Self::Index {
                    record_type: rt,
                    value: rv,
                },
            ) => (lt, lv).cmp(&(rt, rv)),
            (
                Self::Esm3ExteriorCell { x: lx, y: ly },
                Self::Esm3ExteriorCell { x: rx, y: ry },
            ) => (lx, ly).cmp(&(rx, ry)),
            _ => self.rank().cmp(&other.rank()),
        }
    }
}

impl PartialOrd for RefId {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl From<&str> for RefId {
    fn from(value: &str) -> Self {
        Self::string_ref_id(value)
    }
}

impl From<String> for RefId {
    fn from(value: String) -> Self {
        Self::string_ref_id(value)
    }
}

impl fmt::Display for RefId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Empty => Ok(()),
            Self::String(value) => f.write_str(value),
            Self::FormId {
                index,
                content_file,
            } => write!(f, "FormId:0x{index:x}:{content_file}"),
            Self::Generated(value) => write!(f, "Generated:0x{value:x}"),
            Self::Index { record_type, value } => write!(f, "Index:{record_type}:0x{value:x}"),
            Self::Esm3ExteriorCell { x, y } => write!(f, "#{x}, {y}"),
        }
    }
}

impl fmt::Debug for RefId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Empty => f.write_str("RefId::Empty"),
            Self::String(value) => write!(f, "RefId::String({value:?})"),
            other => write!(f, "RefId({other})"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::hash_map::DefaultHasher;

    fn hash_of(id: &RefId) -> u64 {
        let mut hasher = DefaultHasher::new();
        id.hash(&mut hasher);
        hasher.finish()
    }

    #[test]
    fn direct_empty_string_matches_empty_id() {
        let direct = RefId::String(String::new());
        assert!(direct.is_empty());
        assert_eq!(direct, RefId::Empty);
        assert_eq!(RefId::Empty, direct);
        assert_eq!(hash_of(&direct), hash_of(&RefId::Empty));
        assert_eq!(direct.cmp(&RefId::Empty), Ordering::Equal);
        assert!(direct < RefId::string_ref_id("a"));
        assert_ne!(direct, RefId::string_ref_id("a"));
    }

    #[test]
    fn empty_string_is_empty_id() {
        assert_eq!(RefId::string_ref_id(""), RefId::Empty);
        assert!(RefId::string_ref_id("").is_empty());
        assert!(RefId::default().is_empty());
    }

    #[test]
    fn string_ids_compare_case_insensitively() {
        let lower = RefId::string_ref_id("gold_001");
        let upper = RefId::string_ref_id("Gold_001");
        assert_eq!(lower, upper);
        assert_eq!(hash_of(&lower), hash_of(&upper));
        assert_eq!(lower.cmp(&upper), Ordering::Equal);
    }

    #[test]
    fn string_ids_order_case_insensitively() {
        let a = RefId::string_ref_id("B");
        let b = RefId::string_ref_id("a");
        assert!(b < a);
    }

    #[test]
    fn string_keeps_original_case() {
        let id = RefId::string_ref_id("Gold_001");
        assert_eq!(id.as_str(), Some("Gold_001"));
        assert_eq!(id.to_string(), "Gold_001");
    }

    #[test]
    fn different_kinds_are_not_equal() {
        let cell = RefId::esm3_exterior_cell(0, 0);
        let generated = RefId::generated(0);
        assert_ne!(cell, generated);
        assert_ne!(RefId::Empty, RefId::string_ref_id("x"));
    }

    #[test]
    fn kinds_order_by_rank() {
        let mut ids = vec![
            RefId::esm3_exterior_cell(1, 2),
            RefId::index(RecName::new(*b"MGEF"), 1),
            RefId::generated(7),
            RefId::form_id(1, 2),
            RefId::string_ref_id("a"),
            RefId::Empty,
        ];
        ids.sort();
        assert!(ids[0].is_empty());
        assert!(matches!(ids[1], RefId::String(_)));
        assert!(matches!(ids[2], RefId::FormId { .. }));
        assert!(matches!(ids[3], RefId::Generated(_)));
        assert!(matches!(ids[4], RefId::Index { .. }));
        assert!(matches!(ids[5], RefId::Esm3ExteriorCell { .. }));
    }

    #[test]
    fn exterior_cells_compare_by_coordinates() {
        assert_eq!(
            RefId::esm3_exterior_cell(-3, 4),
            RefId::esm3_exterior_cell(-3, 4)
        );
        assert!(RefId::esm3_exterior_cell(-3, 4) < RefId::esm3_exterior_cell(-3, 5));
    }

    #[test]
    fn display_forms() {
        assert_eq!(RefId::esm3_exterior_cell(1, -2).to_string(), "#1, -2");
        assert_eq!(RefId::generated(255).to_string(), "Generated:0xff");
        assert_eq!(RefId::form_id(16, 2).to_string(), "FormId:0x10:2");
        assert_eq!(
            RefId::index(RecName::new(*b"SKIL"), 3).to_string(),
            "Index:SKIL:0x3"
        );
        assert_eq!(RefId::Empty.to_string(), "");
    }

    #[test]
    fn as_str_only_for_strings() {
        assert_eq!(RefId::Empty.as_str(), Some(""));
        assert_eq!(RefId::generated(1).as_str(), None);
    }

    #[test]
    fn eq_str_ignores_case() {
        assert!(RefId::string_ref_id("FFFF").eq_str("ffff"));
        assert!(!RefId::generated(1).eq_str("ffff"));
    }

    #[test]
    fn ref_id_type_roundtrip() {
        for raw in 0..=6u8 {
            let kind = RefIdType::from_u8(raw).unwrap();
            assert_eq!(kind.as_u8(), raw);
        }
        assert_eq!(RefIdType::from_u8(7), None);
    }

    #[test]
    fn long_string_ids_are_accepted() {
        let long = "x".repeat(33);
        assert_eq!(RefId::string_ref_id(long.clone()).as_str(), Some(long.as_str()));
    }
}
