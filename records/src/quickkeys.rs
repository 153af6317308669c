//! Quick key bindings stored in save games.

use std::io::{Read, Seek, Write};

use defs::{RecName, RefId};
use esm::{EsmError, EsmReader, EsmResult, EsmWriter};

pub const REC_KEYS: RecName = RecName::new(*b"KEYS");

/// What a quick key slot activates.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[repr(u32)]
pub enum QuickKeyType {
    Magic = 0,
    Item = 1,
    #[default]
    Unassigned = 2,
    MagicItem = 3,
}

impl QuickKeyType {
    #[must_use]
    pub const fn from_u32(value: u32) -> Option<Self> {
        match value {
            0 => Some(Self::Magic),
            1 => Some(Self::Item),
            2 => Some(Self::Unassigned),
            3 => Some(Self::MagicItem),
            _ => None,
        }
    }

    #[must_use]
    pub const fn as_u32(self) -> u32 {
        self as u32
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct QuickKey {
    pub key_type: QuickKeyType,
    pub id: RefId,
}

/// The full set of quick key slots.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct QuickKeys {
    pub keys: Vec<QuickKey>,
}

impl QuickKeys {
    pub fn save<W: Write + Seek>(&self, w: &mut EsmWriter<W>) -> EsmResult<()> {
        for key in &self.keys {
            w.write_hnt(b"TYPE", &key.key_type.as_u32())?;
            w.write_hn_ref_id(b"ID__", &key.id)?;
        }
        Ok(())
    }

    pub fn load<R: Read + Seek>(&mut self, r: &mut EsmReader<R>) -> EsmResult<()> {
        self.keys.clear();
        while r.is_next_sub(b"TYPE")? {
            let raw: u32 = r.get_ht()?;
            let key_type = QuickKeyType::from_u32(raw).ok_or(EsmError::InvalidValue {
                what: "quick key type",
                value: i64::from(raw),
            })?;
            let id = r.get_hn_ref_id(b"ID__")?;
            self.keys.push(QuickKey { key_type, id });
        }
        Ok(())
    }
}
