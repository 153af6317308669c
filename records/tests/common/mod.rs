//! Stream helpers and sample records shared by the integration tests.

#![allow(dead_code)]

use std::io::Cursor;

use defs::{FormatVersion, RefId};
use esm::{EsmReader, EsmResult, EsmWriter, Record};
use records::{
    container_flags, weapon_type, ContItem, Container, DialInfo, Dialogue, DialogueType,
    InventoryList, QuestStatus, Region, Script, ScriptData, SoundRef, WeatherChances, Weapon,
    WeaponData,
};

pub type TestWriter = EsmWriter<Cursor<Vec<u8>>>;
pub type TestReader = EsmReader<Cursor<Vec<u8>>>;

pub fn writer(version: FormatVersion) -> TestWriter {
    let mut writer = EsmWriter::new();
    writer.set_format_version(version);
    writer
}

/// Writes a complete stream at `version`, with `body` producing the records.
pub fn write_stream(
    version: FormatVersion,
    body: impl FnOnce(&mut TestWriter) -> EsmResult<()>,
) -> EsmResult<Vec<u8>> {
    let mut writer = writer(version);
    writer.save(Cursor::new(Vec::new()))?;
    body(&mut writer)?;
    Ok(writer.close()?.into_inner())
}

pub fn open_stream(bytes: Vec<u8>) -> TestReader {
    let mut reader = EsmReader::new();
    reader.open(Cursor::new(bytes), "integration").unwrap();
    reader
}

/// Writes `record` as the only record of a stream.
pub fn save_record<T: Record>(record: &T, version: FormatVersion) -> Vec<u8> {
    write_stream(version, |w| record.write_record(w, false)).unwrap()
}

/// Reads the next record, asserting it has the tag of `T`.
pub fn next_record<T: Record>(reader: &mut TestReader) -> (T, bool) {
    assert_eq!(reader.get_rec_name().unwrap(), T::REC_NAME);
    T::load_record(reader).unwrap()
}

pub fn roundtrip<T: Record>(record: &T, version: FormatVersion) -> T {
    let mut reader = open_stream(save_record(record, version));
    let (result, deleted) = next_record::<T>(&mut reader);
    assert!(!deleted);
    assert!(!reader.has_more_recs());
    result
}

/// Writes `body` inside a throwaway `FAKE` record.
pub fn write_fake(
    version: FormatVersion,
    body: impl FnOnce(&mut TestWriter) -> EsmResult<()>,
) -> Vec<u8> {
    write_stream(version, |w| {
        w.start_record(b"FAKE", 0)?;
        body(w)?;
        w.end_record(b"FAKE")
    })
    .unwrap()
}

pub fn read_fake<T>(bytes: Vec<u8>, body: impl FnOnce(&mut TestReader) -> EsmResult<T>) -> T {
    let mut reader = open_stream(bytes);
    assert_eq!(reader.get_rec_name().unwrap(), b"FAKE");
    reader.get_rec_header().unwrap();
    body(&mut reader).unwrap()
}

pub fn sample_container() -> Container {
    Container {
        id: "chest_small_02_dwrv".into(),
        name: "Dwemer Chest".into(),
        model: "o\\contain_dwrv_chest10.nif".into(),
        script: "chest_scr".into(),
        weight: 150.0,
        flags: container_flags::UNKNOWN | container_flags::RESPAWN,
        inventory: InventoryList {
            list: vec![
                ContItem {
                    count: 25,
                    item: "gold_001".into(),
                },
                ContItem {
                    count: -1,
                    item: "ingred_scrap_metal_01".into(),
                },
            ],
        },
        record_flags: 0,
    }
}

pub fn sample_region() -> Region {
    Region {
        id: "Ascadian Isles Region".into(),
        name: "Ascadian Isles".into(),
        weather: WeatherChances {
            clear: 30,
            cloudy: 25,
            foggy: 10,
            overcast: 15,
            rain: 10,
            thunder: 5,
            ash: 0,
            blight: 0,
            snow: 3,
            blizzard: 2,
        },
        sleep_list: "ex_ascadianisles_sleep".into(),
        map_color: 0x00d0_8040,
        sound_list: vec![
            SoundRef {
                sound: "Bird 1".into(),
                chance: 20,
            },
            SoundRef {
                sound: "Crickets".into(),
                chance: 5,
            },
        ],
        record_flags: 0,
    }
}

/// A script with `shorts`, `longs` and `floats` variables and a compiled
/// body of `blob_len` bytes.
pub fn sample_script(shorts: u32, longs: u32, floats: u32, blob_len: usize) -> Script {
    let var_names: Vec<String> = (0..shorts + longs + floats)
        .map(|i| format!("var{i}"))
        .collect();
    let string_table_size = var_names.iter().map(|name| name.len() + 1).sum::<usize>() as u32;
    Script {
        id: "BalmoraScript".into(),
        data: ScriptData {
            num_shorts: shorts,
            num_longs: longs,
            num_floats: floats,
            script_data_size: blob_len as u32,
            string_table_size,
        },
        var_names,
        script_data: (0..blob_len).map(|i| i as u8).collect(),
        script_text: "Begin BalmoraScript\nshort var0\nEnd".into(),
        record_flags: 0,
    }
}

pub fn sample_dialogue() -> Dialogue {
    Dialogue {
        id: "Background".into(),
        string_id: "Background".into(),
        dialogue_type: DialogueType::Topic,
        info_order: Vec::new(),
        record_flags: 0,
    }
}

pub fn sample_info() -> DialInfo {
    DialInfo {
        id: "3149715341161611876".into(),
        prev: "1521718141192111443".into(),
        actor: "fargoth".into(),
        cell: "Seyda Neen".into(),
        response: "Hello, friend!".into(),
        quest_status: QuestStatus::None,
        ..DialInfo::default()
    }
}

pub fn sample_weapon() -> Weapon {
    Weapon {
        id: "iron dagger".into(),
        name: "Iron Dagger".into(),
        model: "w\\W_Dagger_iron.nif".into(),
        icon: "w\\Tx_dagger_iron.tga".into(),
        data: WeaponData {
            weight: 3.0,
            value: 10,
            weapon_type: weapon_type::SHORT_BLADE_ONE_HAND,
            health: 400,
            speed: 2.5,
            reach: 1.0,
            enchant: 50,
            chop: [3, 6],
            slash: [3, 6],
            thrust: [4, 6],
            flags: 0,
        },
        enchant: RefId::Empty,
        script: RefId::Empty,
        record_flags: 0,
    }
}
