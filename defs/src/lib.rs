//! Shared definitions for the esmkit ESM codec.
//!
//! This crate holds the vocabulary every other esmkit crate speaks: the
//! four-character tags that name records and sub-records, the registry of
//! format versions, and the [`RefId`] value type. It performs no I/O.
//!
//! # Design Principles
//!
//! - **Wire-stable tags** - [`fourcc`] packs bytes little-endian on every host.
//! - **Named versions only** - Callers compare against the constants in this
//!   crate, never against raw numbers.
//! - **Value semantics** - [`RefId`] compares by content, not by identity.

mod fourcc;
mod refid;
mod version;

pub use fourcc::{fourcc, RecName};
pub use refid::{RefId, RefIdType};
pub use version::{
    is_supported_format_version, test_format_versions, FormatVersion,
    CURRENT_CONTENT_FORMAT_VERSION, CURRENT_SAVE_GAME_FORMAT_VERSION, DEFAULT_FORMAT_VERSION,
    MAX_ACTIVE_SPELL_SLOT_INDEX_FORMAT_VERSION, MAX_CLEAR_MODIFIERS_FORMAT_VERSION,
    MAX_INT_FALLBACK_FORMAT_VERSION, MAX_LIMITED_SIZE_STRINGS_FORMAT_VERSION,
    MAX_NAME_IS_REF_ID_ONLY_FORMAT_VERSION, MAX_OLD_AI_PACKAGE_FORMAT_VERSION,
    MAX_OLD_COUNT_FORMAT_VERSION, MAX_OLD_CREATURE_STATS_FORMAT_VERSION,
    MAX_OLD_DEATH_ANIMATION_FORMAT_VERSION, MAX_OLD_FOG_OF_WAR_FORMAT_VERSION,
    MAX_OLD_RESTOCKING_FORMAT_VERSION, MAX_OLD_SKILLS_AND_ATTRIBUTES_FORMAT_VERSION,
    MAX_OLD_TIME_LEFT_FORMAT_VERSION, MAX_OLD_WEATHER_FORMAT_VERSION,
    MAX_SAVED_GAME_CELL_NAME_AS_REF_ID_FORMAT_VERSION, MAX_STRING_REF_ID_FORMAT_VERSION,
    MAX_UNOPTIMIZED_CHARACTER_DATA_FORMAT_VERSION, MAX_USE_ESM_CELL_ID_FORMAT_VERSION,
};

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn public_api_exports() {
        let _ = fourcc(b"TES3");
        let _ = RecName::new(*b"TES3");
        let _ = RefId::Empty;
        let _ = RefIdType::SizedString;
        let _: FormatVersion = CURRENT_SAVE_GAME_FORMAT_VERSION;
        let _ = test_format_versions();
    }

    #[test]
    fn exterior_cell_id_is_structured() {
        let id = RefId::esm3_exterior_cell(2, 3);
        assert!(id.as_str().is_none());
    }
}
