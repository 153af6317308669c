//! Record types of the ESM3 content and save-game formats.
//!
//! Each module pairs a plain value type with the `save`/`load` code that
//! maps it onto sub-records through [`esm::EsmWriter`] and
//! [`esm::EsmReader`]. Top-level records implement [`esm::Record`];
//! values embedded in other records (cell references, AI packages, stats)
//! expose inherent `save`/`load` methods.
//!
//! # Design Principles
//!
//! - **Versioned by the writer** - Records ask the writer or reader for the
//!   session format version instead of taking it as a parameter.
//! - **Defaults are not written** - Optional sub-records are omitted when
//!   they hold the value `Default` would produce, and read back as such.
//! - **Tolerant where the data is** - Malformed but recoverable payloads
//!   (script variable tables, dialogue conditions) are logged and skipped.
//!
//! # Example
//!
//! ```
//! use std::io::Cursor;
//! use esm::{EsmReader, EsmWriter, Record};
//! use records::{ContItem, Container};
//!
//! let mut container = Container::default();
//! container.id = "chest_small_01".into();
//! container.weight = 50.0;
//! container.inventory.list.push(ContItem {
//!     count: 3,
//!     item: "gold_001".into(),
//! });
//!
//! let mut writer = EsmWriter::new();
//! writer.set_format_version(defs::CURRENT_SAVE_GAME_FORMAT_VERSION);
//! writer.save(Cursor::new(Vec::new())).unwrap();
//! container.write_record(&mut writer, false).unwrap();
//! let bytes = writer.close().unwrap().into_inner();
//!
//! let mut reader = EsmReader::new();
//! reader.open(Cursor::new(bytes), "chest").unwrap();
//! assert_eq!(reader.get_rec_name().unwrap(), Container::REC_NAME);
//! let (loaded, deleted) = Container::load_record(&mut reader).unwrap();
//! assert!(!deleted);
//! assert_eq!(loaded, container);
//! ```

mod aipackage;
mod aisequence;
mod cellref;
mod condition;
mod container;
mod creaturestats;
mod dialinfo;
mod dialogue;
mod effectlist;
mod land;
mod player;
mod position;
mod quickkeys;
mod region;
mod script;
mod weapon;

pub use aipackage::{services, AIData};
pub use aisequence::{
    package_type as ai_package_type, AiEscort, AiEscortData, AiPackage, AiSequence, AiTravel,
    AiTravelData, AiWander, AiWanderData, AiWanderDuration,
};
pub use cellref::{CellRef, RefNum};
pub use condition::{Comparison, ConditionFunction, ConditionValue, DialogueCondition};
pub use container::{
    flags as container_flags, ContItem, Container, InventoryList, ITEM_ID_SIZE, REC_CONT,
};
pub use creaturestats::{
    actor_flags, CreatureStats, StatState, TimeStamp, ATTRIBUTE_COUNT, DYNAMIC_COUNT,
};
pub use dialinfo::{DialInfo, Gender, InfoData, QuestStatus, FACTIONLESS, REC_INFO};
pub use dialogue::{Dialogue, DialogueType, REC_DIAL};
pub use effectlist::{range as effect_range, EffectEntry, EffectList, IndexedEffect};
pub use land::{
    data_types as land_data_types, generate_wnam, land_flags, load_land_record_data, Land,
    LandData, GLOBAL_MAP_LOD_SIZE, GLOBAL_MAP_LOD_SIZE_SQRT, HEIGHT_SCALE, LAND_NUM_TEXTURES,
    LAND_NUM_VERTS, LAND_SIZE, LAND_TEXTURE_SIZE, REC_LAND,
};
pub use player::{ObjectState, Player, REC_PLAY};
pub use position::Position;
pub use quickkeys::{QuickKey, QuickKeyType, QuickKeys, REC_KEYS};
pub use region::{Region, SoundRef, WeatherChances, REC_REGN, SOUND_ID_SIZE};
pub use script::{Script, ScriptData, REC_SCPT, SCRIPT_ID_SIZE};
pub use weapon::{weapon_flags, weapon_type, Weapon, WeaponData, REC_WEAP};

#[cfg(test)]
pub(crate) mod test_util {
    //! Helpers wrapping record bodies in a throwaway `FAKE` record.

    use std::io::Cursor;

    use defs::FormatVersion;
    use esm::{EsmReader, EsmResult, EsmWriter};

    pub type TestWriter = EsmWriter<Cursor<Vec<u8>>>;
    pub type TestReader = EsmReader<Cursor<Vec<u8>>>;

    /// Writes `body` inside a `FAKE` record after letting `configure`
    /// adjust the header.
    pub fn save_fake_with(
        version: FormatVersion,
        configure: impl FnOnce(&mut TestWriter),
        body: impl FnOnce(&mut TestWriter) -> EsmResult<()>,
    ) -> Vec<u8> {
        let mut writer = EsmWriter::new();
        writer.set_format_version(version);
        configure(&mut writer);
        writer.save(Cursor::new(Vec::new())).unwrap();
        writer.start_record(b"FAKE", 0).unwrap();
        body(&mut writer).unwrap();
        writer.end_record(b"FAKE").unwrap();
        writer.close().unwrap().into_inner()
    }

    pub fn save_fake(
        version: FormatVersion,
        body: impl FnOnce(&mut TestWriter) -> EsmResult<()>,
    ) -> Vec<u8> {
        save_fake_with(version, |_| {}, body)
    }

    /// Opens `bytes`, enters the `FAKE` record and runs `body` on its
    /// sub-records.
    pub fn try_load_fake<T>(
        bytes: Vec<u8>,
        body: impl FnOnce(&mut TestReader) -> EsmResult<T>,
    ) -> EsmResult<T> {
        let mut reader = EsmReader::new();
        reader.open(Cursor::new(bytes), "fake")?;
        assert_eq!(reader.get_rec_name()?, b"FAKE");
        reader.get_rec_header()?;
        body(&mut reader)
    }

    pub fn load_fake<T>(bytes: Vec<u8>, body: impl FnOnce(&mut TestReader) -> EsmResult<T>) -> T {
        try_load_fake(bytes, body).unwrap()
    }
}
