//! Dialogue responses (`INFO`).

use std::io::{Read, Seek, Write};

use defs::{RecName, RefId};
use esm::{decode_padding, encode_padding, Composite, EsmError, EsmReader, EsmResult, EsmWriter, Record};

use crate::condition::DialogueCondition;
use crate::dialogue::DialogueType;

pub const REC_INFO: RecName = RecName::new(*b"INFO");

/// Faction id marking a response as only valid for faction-less actors.
pub const FACTIONLESS: &str = "FFFF";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[repr(i8)]
pub enum Gender {
    Male = 0,
    Female = 1,
    #[default]
    NotApplicable = -1,
}

impl Gender {
    #[must_use]
    pub const fn from_i8(value: i8) -> Self {
        match value {
            0 => Self::Male,
            1 => Self::Female,
            _ => Self::NotApplicable,
        }
    }
}

/// Response requirements (`DATA`).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct InfoData {
    pub dialogue_type: DialogueType,
    /// Minimum disposition, or the journal index for journal entries.
    pub disposition: i32,
    /// Required rank in the speaker's faction, -1 for any.
    pub rank: i8,
    pub gender: Gender,
    /// Required player rank in the speaker's faction, -1 for any.
    pub pc_rank: i8,
}

impl Default for InfoData {
    fn default() -> Self {
        Self {
            dialogue_type: DialogueType::Topic,
            disposition: 0,
            rank: -1,
            gender: Gender::NotApplicable,
            pc_rank: -1,
        }
    }
}

impl Composite for InfoData {
    const SIZE: usize = 12;

    fn encode(&self, out: &mut Vec<u8>) {
        self.dialogue_type.as_i8().encode(out);
        encode_padding(out, 3);
        self.disposition.encode(out);
        self.rank.encode(out);
        (self.gender as i8).encode(out);
        self.pc_rank.encode(out);
        encode_padding(out, 1);
    }

    fn decode(input: &mut &[u8]) -> Self {
        let dialogue_type = DialogueType::from_i8(i8::decode(input));
        decode_padding(input, 3);
        let data = Self {
            dialogue_type,
            disposition: i32::decode(input),
            rank: i8::decode(input),
            gender: Gender::from_i8(i8::decode(input)),
            pc_rank: i8::decode(input),
        };
        decode_padding(input, 1);
        data
    }
}

/// Journal quest markers on a response.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum QuestStatus {
    #[default]
    None,
    /// The response names the quest.
    Name,
    Finished,
    Restart,
}

/// A dialogue response (`INFO`).
#[derive(Debug, Clone, PartialEq, Default)]
pub struct DialInfo {
    pub id: RefId,
    /// Neighbouring responses in the topic's linked list.
    pub prev: RefId,
    pub next: RefId,
    pub data: InfoData,
    pub actor: RefId,
    pub race: RefId,
    pub class: RefId,
    pub faction: RefId,
    pub pc_faction: RefId,
    pub cell: RefId,
    /// Only faction-less speakers may say this. Stored in place of
    /// `faction`, which is then left empty.
    pub factionless: bool,
    pub sound: String,
    pub response: String,
    pub result_script: String,
    pub selects: Vec<DialogueCondition>,
    pub quest_status: QuestStatus,
    pub record_flags: u32,
}

impl DialInfo {
    pub fn blank(&mut self) {
        let id = std::mem::take(&mut self.id);
        *self = Self { id, ..Self::default() };
    }

    fn load_data<R: Read + Seek>(&mut self, r: &mut EsmReader<R>) -> EsmResult<bool> {
        let mut deleted = false;
        while r.has_more_subs() {
            let name = r.get_sub_name()?;
            match name.as_bytes() {
                b"DATA" => self.data = r.get_ht()?,
                b"ONAM" => self.actor = r.get_h_ref_id()?,
                b"RNAM" => self.race = r.get_h_ref_id()?,
                b"CNAM" => self.class = r.get_h_ref_id()?,
                b"FNAM" => {
                    let faction = r.get_h_ref_id()?;
                    if faction.eq_str(FACTIONLESS) {
                        self.factionless = true;
                        self.faction = RefId::Empty;
                    } else {
                        self.faction = faction;
                    }
                }
                b"ANAM" => self.cell = r.get_h_ref_id()?,
                b"DNAM" => self.pc_faction = r.get_h_ref_id()?,
                b"SNAM" => self.sound = r.get_h_string()?,
                b"NAME" => self.response = r.get_h_string()?,
                b"SCVR" => {
                    if let Some(condition) = DialogueCondition::load(r, &self.id)? {
                        self.selects.push(condition);
                    }
                }
                b"BNAM" => self.result_script = r.get_h_string()?,
                b"QSTN" | b"QSTF" | b"QSTR" => {
                    self.quest_status = match name.as_bytes() {
                        b"QSTN" => QuestStatus::Name,
                        b"QSTF" => QuestStatus::Finished,
                        _ => QuestStatus::Restart,
                    };
                    r.skip_h_sub()?;
                }
                b"DELE" => {
                    r.skip_h_sub()?;
                    deleted = true;
                }
                _ => {
                    return Err(EsmError::UnexpectedTag {
                        expected: None,
                        found: name,
                        record: REC_INFO,
                    })
                }
            }
        }
        Ok(deleted)
    }
}

impl Record for DialInfo {
    const REC_NAME: RecName = REC_INFO;

    fn record_flags(&self) -> u32 {
        self.record_flags
    }

    fn save<W: Write + Seek>(&self, w: &mut EsmWriter<W>, deleted: bool) -> EsmResult<()> {
        w.write_hnc_ref_id(b"INAM", &self.id)?;
        w.write_hnc_ref_id(b"PNAM", &self.prev)?;
        w.write_hnc_ref_id(b"NNAM", &self.next)?;
        if deleted {
            return w.write_deleted();
        }

        w.write_hnt(b"DATA", &self.data)?;
        w.write_hnoc_ref_id(b"ONAM", &self.actor)?;
        w.write_hnoc_ref_id(b"RNAM", &self.race)?;
        w.write_hnoc_ref_id(b"CNAM", &self.class)?;
        if self.factionless {
            w.write_hnc_ref_id(b"FNAM", &RefId::string_ref_id(FACTIONLESS))?;
        } else {
            w.write_hnoc_ref_id(b"FNAM", &self.faction)?;
        }
        w.write_hnoc_ref_id(b"ANAM", &self.cell)?;
        w.write_hnoc_ref_id(b"DNAM", &self.pc_faction)?;
        w.write_hnoc_string(b"SNAM", &self.sound)?;
        w.write_hno_string(b"NAME", &self.response)?;

        for select in &self.selects {
            select.save(w)?;
        }

        w.write_hno_string(b"BNAM", &self.result_script)?;

        match self.quest_status {
            QuestStatus::None => Ok(()),
            QuestStatus::Name => w.write_hnt(b"QSTN", &1u8),
            QuestStatus::Finished => w.write_hnt(b"QSTF", &1u8),
            QuestStatus::Restart => w.write_hnt(b"QSTR", &1u8),
        }
    }

    fn load<R: Read + Seek>(&mut self, r: &mut EsmReader<R>) -> EsmResult<bool> {
        self.record_flags = r.get_rec_flags();
        self.selects.clear();
        self.quest_status = QuestStatus::None;
        self.factionless = false;

        self.id = r.get_hn_ref_id(b"INAM")?;
        self.prev = r.get_hn_ref_id(b"PNAM")?;
        self.next = r.get_hn_ref_id(b"NNAM")?;
        self.load_data(r)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::condition::{Comparison, ConditionFunction, ConditionValue};
    use crate::test_util::{save_fake, try_load_fake};
    use defs::test_format_versions;

    fn load_info(bytes: Vec<u8>) -> (DialInfo, bool) {
        try_load_fake(bytes, |r| {
            let mut result = DialInfo::default();
            let deleted = result.load(r)?;
            Ok((result, deleted))
        })
        .unwrap()
    }

    #[test]
    fn info_data_layout() {
        let data = InfoData {
            dialogue_type: DialogueType::Journal,
            disposition: 100,
            rank: 2,
            gender: Gender::Female,
            pc_rank: 3,
        };
        let mut out = Vec::new();
        data.encode(&mut out);
        assert_eq!(out, vec![4, 0, 0, 0, 100, 0, 0, 0, 2, 1, 3, 0]);
        assert_eq!(InfoData::decode(&mut out.as_slice()), data);
    }

    #[test]
    fn info_roundtrip_every_version() {
        let record = DialInfo {
            id: RefId::string_ref_id("1964322741120019911"),
            prev: RefId::string_ref_id("2113223381107220432"),
            next: RefId::Empty,
            actor: RefId::string_ref_id("caius cosades"),
            faction: RefId::string_ref_id("Blades"),
            sound: "Vo\\i\\m\\Hlo_IM001.mp3".into(),
            response: "What do you want?".into(),
            result_script: "Goodbye".into(),
            selects: vec![DialogueCondition {
                variable: "nolore".into(),
                value: ConditionValue::Int(0),
                index: 0,
                function: ConditionFunction::NotLocal,
                comparison: Comparison::Eq,
            }],
            quest_status: QuestStatus::Finished,
            ..DialInfo::default()
        };
        for version in test_format_versions() {
            let bytes = save_fake(version, |w| record.save(w, false));
            let (result, deleted) = load_info(bytes);
            assert!(!deleted);
            assert_eq!(result, record, "version {version}");
        }
    }

    #[test]
    fn factionless_marker() {
        let record = DialInfo {
            id: RefId::string_ref_id("x"),
            factionless: true,
            ..DialInfo::default()
        };
        for version in test_format_versions() {
            let bytes = save_fake(version, |w| record.save(w, false));
            let (result, _) = load_info(bytes);
            assert!(result.factionless);
            assert_eq!(result.faction, RefId::Empty);
            assert_eq!(result, record, "version {version}");
        }
    }

    #[test]
    fn quest_flag_does_not_hide_later_fields() {
        let bytes = save_fake(defs::CURRENT_SAVE_GAME_FORMAT_VERSION, |w| {
            w.write_hnc_ref_id(b"INAM", &RefId::string_ref_id("i"))?;
            w.write_hnc_ref_id(b"PNAM", &RefId::Empty)?;
            w.write_hnc_ref_id(b"NNAM", &RefId::Empty)?;
            w.write_hnt(b"QSTN", &1u8)?;
            w.write_hn_string(b"NAME", "later")
        });
        let (result, _) = load_info(bytes);
        assert_eq!(result.quest_status, QuestStatus::Name);
        assert_eq!(result.response, "later");
    }

    #[test]
    fn malformed_condition_skipped() {
        let bytes = save_fake(defs::CURRENT_SAVE_GAME_FORMAT_VERSION, |w| {
            w.write_hnc_ref_id(b"INAM", &RefId::string_ref_id("i"))?;
            w.write_hnc_ref_id(b"PNAM", &RefId::Empty)?;
            w.write_hnc_ref_id(b"NNAM", &RefId::Empty)?;
            w.write_hn_string(b"SCVR", "01")?;
            w.write_hnt(b"INTV", &5i32)?;
            w.write_hn_string(b"BNAM", "set x to 1")
        });
        let (result, _) = load_info(bytes);
        assert!(result.selects.is_empty());
        assert_eq!(result.result_script, "set x to 1");
    }
}
