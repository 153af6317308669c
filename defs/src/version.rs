//! Format version registry.
//!
//! Every version-dependent encoding decision compares the session's format
//! version against one of the named constants below.

/// Integer format version stored in the `FORM` sub-record of a file header.
pub type FormatVersion = u32;

/// Version assumed when a header carries no `FORM` sub-record.
pub const DEFAULT_FORMAT_VERSION: FormatVersion = 0;

/// Format of content files (plugins, masters). Never carries player state.
pub const CURRENT_CONTENT_FORMAT_VERSION: FormatVersion = 1;

pub const MAX_OLD_WEATHER_FORMAT_VERSION: FormatVersion = 1;
pub const MAX_OLD_DEATH_ANIMATION_FORMAT_VERSION: FormatVersion = 2;
pub const MAX_OLD_FOG_OF_WAR_FORMAT_VERSION: FormatVersion = 6;
pub const MAX_UNOPTIMIZED_CHARACTER_DATA_FORMAT_VERSION: FormatVersion = 7;
pub const MAX_OLD_TIME_LEFT_FORMAT_VERSION: FormatVersion = 8;

/// Last version storing creature stat values as integers.
pub const MAX_INT_FALLBACK_FORMAT_VERSION: FormatVersion = 10;

pub const MAX_OLD_RESTOCKING_FORMAT_VERSION: FormatVersion = 14;
pub const MAX_CLEAR_MODIFIERS_FORMAT_VERSION: FormatVersion = 16;

/// Last version where an escort package did not persist its own duration.
pub const MAX_OLD_AI_PACKAGE_FORMAT_VERSION: FormatVersion = 17;

pub const MAX_OLD_SKILLS_AND_ATTRIBUTES_FORMAT_VERSION: FormatVersion = 18;
pub const MAX_OLD_CREATURE_STATS_FORMAT_VERSION: FormatVersion = 19;

/// Last version where maybe-fixed-size strings are NUL padded to a width.
pub const MAX_LIMITED_SIZE_STRINGS_FORMAT_VERSION: FormatVersion = 22;

/// Last version where reference ids are stored as plain strings.
pub const MAX_STRING_REF_ID_FORMAT_VERSION: FormatVersion = 23;

pub const MAX_SAVED_GAME_CELL_NAME_AS_REF_ID_FORMAT_VERSION: FormatVersion = 24;

/// Last version where a dialogue topic is identified by its `NAME` alone.
pub const MAX_NAME_IS_REF_ID_ONLY_FORMAT_VERSION: FormatVersion = 25;

/// Last version where cell references use the `SPAC`/`CIDX` layout.
pub const MAX_USE_ESM_CELL_ID_FORMAT_VERSION: FormatVersion = 26;

pub const MAX_ACTIVE_SPELL_SLOT_INDEX_FORMAT_VERSION: FormatVersion = 27;
pub const MAX_OLD_COUNT_FORMAT_VERSION: FormatVersion = 30;

/// Newest version this crate reads and writes.
pub const CURRENT_SAVE_GAME_FORMAT_VERSION: FormatVersion = 34;

/// Returns `true` if `version` can be decoded by this implementation.
#[must_use]
pub const fn is_supported_format_version(version: FormatVersion) -> bool {
    version <= CURRENT_SAVE_GAME_FORMAT_VERSION
}

/// Versions worth exercising in round-trip tests.
///
/// The content version and the two string milestones, followed by every
/// version after the string `RefId` milestone up to the current save format.
#[must_use]
pub fn test_format_versions() -> Vec<FormatVersion> {
    let mut versions = vec![
        CURRENT_CONTENT_FORMAT_VERSION,
        MAX_LIMITED_SIZE_STRINGS_FORMAT_VERSION,
        MAX_STRING_REF_ID_FORMAT_VERSION,
    ];
    versions.extend(MAX_STRING_REF_ID_FORMAT_VERSION + 1..=CURRENT_SAVE_GAME_FORMAT_VERSION);
    versions
}
