//! Dialogue topics and journal entries.

use std::io::{Read, Seek, Write};

use defs::{
    RecName, RefId, MAX_NAME_IS_REF_ID_ONLY_FORMAT_VERSION, MAX_STRING_REF_ID_FORMAT_VERSION,
};
use esm::{EsmError, EsmReader, EsmResult, EsmWriter, Record};

pub const REC_DIAL: RecName = RecName::new(*b"DIAL");

/// Kind of a dialogue record.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[repr(i8)]
pub enum DialogueType {
    #[default]
    Topic = 0,
    Voice = 1,
    Greeting = 2,
    Persuasion = 3,
    Journal = 4,
    /// Placeholder for deleted records.
    Unknown = -1,
}

impl DialogueType {
    #[must_use]
    pub const fn from_i8(value: i8) -> Self {
        match value {
            0 => Self::Topic,
            1 => Self::Voice,
            2 => Self::Greeting,
            3 => Self::Persuasion,
            4 => Self::Journal,
            _ => Self::Unknown,
        }
    }

    #[must_use]
    pub const fn as_i8(self) -> i8 {
        self as i8
    }
}

/// A dialogue topic (`DIAL`).
///
/// The responses belonging to a topic are separate `INFO` records that
/// follow it in the file; `info_order` keeps their ids in file order.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Dialogue {
    pub id: RefId,
    /// Topic text as shown to the player, with its original casing.
    pub string_id: String,
    pub dialogue_type: DialogueType,
    pub info_order: Vec<RefId>,
    pub record_flags: u32,
}

impl Dialogue {
    pub fn blank(&mut self) {
        self.dialogue_type = DialogueType::Unknown;
        self.info_order.clear();
    }

    /// Inserts `id` after `prev`, or at the front when `prev` is empty or
    /// unknown. An existing entry for `id` is moved.
    pub fn insert_info(&mut self, id: RefId, prev: &RefId) {
        self.info_order.retain(|existing| existing != &id);
        let at = self
            .info_order
            .iter()
            .position(|existing| existing == prev)
            .map_or(0, |index| index + 1);
        self.info_order.insert(at, id);
    }

    /// Reads the id sub-records.
    pub fn load_id<R: Read + Seek>(&mut self, r: &mut EsmReader<R>) -> EsmResult<()> {
        let version = r.get_format_version();
        if version <= MAX_STRING_REF_ID_FORMAT_VERSION {
            self.string_id = r.get_hn_string(b"NAME")?;
            self.id = RefId::string_ref_id(self.string_id.clone());
        } else if version <= MAX_NAME_IS_REF_ID_ONLY_FORMAT_VERSION {
            self.id = r.get_hn_ref_id(b"NAME")?;
            self.string_id = self.id.to_string();
        } else {
            self.id = r.get_hn_ref_id(b"ID__")?;
            self.string_id = r.get_hn_string(b"NAME")?;
        }
        Ok(())
    }

    /// Reads the sub-records following the id.
    pub fn load_data<R: Read + Seek>(&mut self, r: &mut EsmReader<R>) -> EsmResult<bool> {
        let mut deleted = false;
        while r.has_more_subs() {
            let name = r.get_sub_name()?;
            match name.as_bytes() {
                b"DATA" => {
                    let size = r.get_sub_header()?;
                    if size == 1 {
                        self.dialogue_type = DialogueType::from_i8(r.get_t()?);
                    } else {
                        tracing::debug!(dialogue = %self.id, size, "ignoring odd sized dialogue type");
                        r.get_exact(size)?;
                    }
                }
                b"DELE" => {
                    r.skip_h_sub()?;
                    self.dialogue_type = DialogueType::Unknown;
                    deleted = true;
                }
                _ => {
                    return Err(EsmError::UnexpectedTag {
                        expected: None,
                        found: name,
                        record: REC_DIAL,
                    })
                }
            }
        }
        Ok(deleted)
    }
}

impl Record for Dialogue {
    const REC_NAME: RecName = REC_DIAL;

    fn record_flags(&self) -> u32 {
        self.record_flags
    }

    fn save<W: Write + Seek>(&self, w: &mut EsmWriter<W>, deleted: bool) -> EsmResult<()> {
        let version = w.format_version();
        if version <= MAX_STRING_REF_ID_FORMAT_VERSION {
            if !self.id.eq_str(&self.string_id) {
                return Err(EsmError::InvalidValue {
                    what: "dialogue id differs from its string id",
                    value: i64::from(version),
                });
            }
            w.write_hnc_string(b"NAME", &self.string_id)?;
        } else if version <= MAX_NAME_IS_REF_ID_ONLY_FORMAT_VERSION {
            w.write_hnc_ref_id(b"NAME", &self.id)?;
        } else {
            w.write_hnc_ref_id(b"ID__", &self.id)?;
            w.write_hnc_string(b"NAME", &self.string_id)?;
        }

        if deleted {
            return w.write_deleted();
        }
        w.write_hnt(b"DATA", &self.dialogue_type.as_i8())
    }

    fn load<R: Read + Seek>(&mut self, r: &mut EsmReader<R>) -> EsmResult<bool> {
        self.record_flags = r.get_rec_flags();
        self.load_id(r)?;
        self.load_data(r)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_util::{load_fake, save_fake};
    use defs::{test_format_versions, CURRENT_SAVE_GAME_FORMAT_VERSION};

    #[test]
    fn dialogue_type_values() {
        assert_eq!(DialogueType::from_i8(4), DialogueType::Journal);
        assert_eq!(DialogueType::from_i8(9), DialogueType::Unknown);
        assert_eq!(DialogueType::Unknown.as_i8(), -1);
    }

    #[test]
    fn dialogue_roundtrip_every_version() {
        let record = Dialogue {
            id: RefId::string_ref_id("Background"),
            string_id: "Background".into(),
            dialogue_type: DialogueType::Topic,
            ..Dialogue::default()
        };
        for version in test_format_versions() {
            let bytes = save_fake(version, |w| record.save(w, false));
            let result = load_fake(bytes, |r| {
                let mut result = Dialogue::default();
                result.load(r)?;
                Ok(result)
            });
            assert_eq!(result.id, record.id, "version {version}");
            assert_eq!(result.string_id, record.string_id, "version {version}");
            assert_eq!(result.dialogue_type, record.dialogue_type, "version {version}");
        }
    }

    #[test]
    fn deleted_dialogue_has_unknown_type() {
        let record = Dialogue {
            id: RefId::string_ref_id("x"),
            string_id: "x".into(),
            dialogue_type: DialogueType::Journal,
            ..Dialogue::default()
        };
        let bytes = save_fake(CURRENT_SAVE_GAME_FORMAT_VERSION, |w| record.save(w, true));
        let (result, deleted) = load_fake(bytes, |r| {
            let mut result = Dialogue::default();
            let deleted = result.load(r)?;
            Ok((result, deleted))
        });
        assert!(deleted);
        assert_eq!(result.dialogue_type, DialogueType::Unknown);
    }

    #[test]
    fn legacy_save_requires_matching_string_id() {
        let record = Dialogue {
            id: RefId::string_ref_id("a"),
            string_id: "b".into(),
            ..Dialogue::default()
        };
        let mut writer = esm::EsmWriter::new();
        writer.set_format_version(MAX_STRING_REF_ID_FORMAT_VERSION);
        writer.save(std::io::Cursor::new(Vec::new())).unwrap();
        writer.start_record(b"FAKE", 0).unwrap();
        assert!(matches!(
            record.save(&mut writer, false),
            Err(EsmError::InvalidValue { .. })
        ));
    }

    #[test]
    fn info_order_inserts_after_previous() {
        let mut dialogue = Dialogue::default();
        let a = RefId::string_ref_id("a");
        let b = RefId::string_ref_id("b");
        let c = RefId::string_ref_id("c");
        dialogue.insert_info(a.clone(), &RefId::Empty);
        dialogue.insert_info(c.clone(), &a);
        dialogue.insert_info(b.clone(), &a);
        assert_eq!(dialogue.info_order, vec![a.clone(), b.clone(), c.clone()]);

        dialogue.insert_info(a.clone(), &c);
        assert_eq!(dialogue.info_order, vec![b, c, a]);
    }
}
