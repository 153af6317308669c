//! Weapon definitions.

use std::io::{Read, Seek, Write};

use defs::{RecName, RefId};
use esm::{Composite, EsmError, EsmReader, EsmResult, EsmWriter, Record};

pub const REC_WEAP: RecName = RecName::new(*b"WEAP");

/// Weapon type codes.
pub mod weapon_type {
    pub const SHORT_BLADE_ONE_HAND: i16 = 0;
    pub const LONG_BLADE_ONE_HAND: i16 = 1;
    pub const LONG_BLADE_TWO_HAND: i16 = 2;
    pub const BLUNT_ONE_HAND: i16 = 3;
    pub const BLUNT_TWO_CLOSE: i16 = 4;
    pub const BLUNT_TWO_WIDE: i16 = 5;
    pub const SPEAR_TWO_WIDE: i16 = 6;
    pub const AXE_ONE_HAND: i16 = 7;
    pub const AXE_TWO_HAND: i16 = 8;
    pub const MARKSMAN_BOW: i16 = 9;
    pub const MARKSMAN_CROSSBOW: i16 = 10;
    pub const MARKSMAN_THROWN: i16 = 11;
    pub const ARROW: i16 = 12;
    pub const BOLT: i16 = 13;
}

/// Bits of [`WeaponData::flags`].
pub mod weapon_flags {
    pub const MAGICAL: i32 = 0x01;
    pub const SILVER: i32 = 0x02;
}

/// Weapon statistics (`WPDT`).
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct WeaponData {
    pub weight: f32,
    pub value: i32,
    pub weapon_type: i16,
    pub health: u16,
    pub speed: f32,
    pub reach: f32,
    /// Enchantment capacity.
    pub enchant: u16,
    /// Min and max damage per attack direction.
    pub chop: [u8; 2],
    pub slash: [u8; 2],
    pub thrust: [u8; 2],
    pub flags: i32,
}

impl Composite for WeaponData {
    const SIZE: usize = 32;

    fn encode(&self, out: &mut Vec<u8>) {
        self.weight.encode(out);
        self.value.encode(out);
        self.weapon_type.encode(out);
        self.health.encode(out);
        self.speed.encode(out);
        self.reach.encode(out);
        self.enchant.encode(out);
        self.chop.encode(out);
        self.slash.encode(out);
        self.thrust.encode(out);
        self.flags.encode(out);
    }

    fn decode(input: &mut &[u8]) -> Self {
        Self {
            weight: f32::decode(input),
            value: i32::decode(input),
            weapon_type: i16::decode(input),
            health: u16::decode(input),
            speed: f32::decode(input),
            reach: f32::decode(input),
            enchant: u16::decode(input),
            chop: <[u8; 2]>::decode(input),
            slash: <[u8; 2]>::decode(input),
            thrust: <[u8; 2]>::decode(input),
            flags: i32::decode(input),
        }
    }
}

/// A weapon (`WEAP`).
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Weapon {
    pub id: RefId,
    pub name: String,
    pub model: String,
    pub icon: String,
    pub data: WeaponData,
    pub enchant: RefId,
    pub script: RefId,
    pub record_flags: u32,
}

impl Weapon {
    pub fn blank(&mut self) {
        self.record_flags = 0;
        self.data = WeaponData::default();
        self.name.clear();
        self.model.clear();
        self.icon.clear();
        self.enchant = RefId::Empty;
        self.script = RefId::Empty;
    }
}

impl Record for Weapon {
    const REC_NAME: RecName = REC_WEAP;

    fn record_flags(&self) -> u32 {
        self.record_flags
    }

    fn save<W: Write + Seek>(&self, w: &mut EsmWriter<W>, deleted: bool) -> EsmResult<()> {
        w.write_hnc_ref_id(b"NAME", &self.id)?;
        if deleted {
            return w.write_deleted();
        }
        w.write_hnc_string(b"MODL", &self.model)?;
        w.write_hnoc_string(b"FNAM", &self.name)?;
        w.write_hnt(b"WPDT", &self.data)?;
        w.write_hno_ref_id(b"SCRI", &self.script)?;
        w.write_hnoc_string(b"ITEX", &self.icon)?;
        w.write_hno_ref_id(b"ENAM", &self.enchant)
    }

    fn load<R: Read + Seek>(&mut self, r: &mut EsmReader<R>) -> EsmResult<bool> {
        self.record_flags = r.get_rec_flags();

        let mut deleted = false;
        let mut has_name = false;
        let mut has_data = false;
        while r.has_more_subs() {
            let name = r.get_sub_name()?;
            match name.as_bytes() {
                b"NAME" => {
                    self.id = r.get_h_ref_id()?;
                    has_name = true;
                }
                b"MODL" => self.model = r.get_h_string()?,
                b"FNAM" => self.name = r.get_h_string()?,
                b"WPDT" => {
                    self.data = r.get_ht()?;
                    has_data = true;
                }
                b"SCRI" => self.script = r.get_h_ref_id()?,
                b"ITEX" => self.icon = r.get_h_string()?,
                b"ENAM" => self.enchant = r.get_h_ref_id()?,
                b"DELE" => {
                    r.skip_h_sub()?;
                    deleted = true;
                }
                _ => {
                    return Err(EsmError::UnexpectedTag {
                        expected: None,
                        found: name,
                        record: REC_WEAP,
                    })
                }
            }
        }

        if !has_name {
            return Err(EsmError::MissingSubRecord {
                name: RecName::new(*b"NAME"),
                record: REC_WEAP,
            });
        }
        if !has_data && !deleted {
            return Err(EsmError::MissingSubRecord {
                name: RecName::new(*b"WPDT"),
                record: REC_WEAP,
            });
        }
        Ok(deleted)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_util::{save_fake, try_load_fake};
    use defs::CURRENT_SAVE_GAME_FORMAT_VERSION;

    #[test]
    fn weapon_data_is_32_bytes() {
        let mut out = Vec::new();
        WeaponData::default().encode(&mut out);
        assert_eq!(out.len(), 32);
    }

    #[test]
    fn weapon_roundtrip() {
        let record = Weapon {
            id: RefId::string_ref_id("iron dagger"),
            name: "Iron Dagger".into(),
            model: "w/w_iron_dagger.nif".into(),
            icon: "w/tx_iron_dagger.tga".into(),
            data: WeaponData {
                weight: 3.0,
                value: 10,
                weapon_type: weapon_type::SHORT_BLADE_ONE_HAND,
                health: 450,
                speed: 2.5,
                reach: 1.0,
                enchant: 50,
                chop: [3, 7],
                slash: [3, 7],
                thrust: [5, 10],
                flags: weapon_flags::SILVER,
            },
            enchant: RefId::string_ref_id("fire bite"),
            script: RefId::Empty,
            record_flags: 0,
        };
        let bytes = save_fake(CURRENT_SAVE_GAME_FORMAT_VERSION, |w| record.save(w, false));
        let result = try_load_fake(bytes, |r| {
            let mut result = Weapon::default();
            result.load(r)?;
            Ok(result)
        })
        .unwrap();
        assert_eq!(result, record);
    }

    #[test]
    fn missing_data_is_error() {
        let bytes = save_fake(CURRENT_SAVE_GAME_FORMAT_VERSION, |w| {
            w.write_hnc_ref_id(b"NAME", &RefId::string_ref_id("w"))
        });
        let err = try_load_fake(bytes, |r| Weapon::default().load(r)).unwrap_err();
        assert!(matches!(err, EsmError::MissingSubRecord { name, .. } if name == b"WPDT"));
    }
}
