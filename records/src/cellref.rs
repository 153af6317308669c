//! Object references placed in cells, containers and save states.

use std::io::{Read, Seek, Write};

use defs::RefId;
use esm::{EsmError, EsmReader, EsmResult, EsmWriter};

use crate::position::Position;

/// Identity of a placed reference: an index within the content file that
/// created it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct RefNum {
    pub index: u32,
    /// Content file index, -1 if the reference was created at runtime.
    pub content_file: i32,
}

impl Default for RefNum {
    fn default() -> Self {
        Self {
            index: 0,
            content_file: -1,
        }
    }
}

impl RefNum {
    #[must_use]
    pub const fn has_content_file(&self) -> bool {
        self.content_file >= 0
    }

    #[must_use]
    pub const fn is_set(&self) -> bool {
        self.index != 0 || self.content_file != -1
    }

    /// Packs into the narrow form: 24 bits of index under an 8-bit
    /// content file, `0xff` meaning none.
    pub fn to_narrow(&self) -> EsmResult<u32> {
        if self.is_set() && !self.has_content_file() {
            return Err(EsmError::InvalidValue {
                what: "narrow ref num without content file",
                value: i64::from(self.index),
            });
        }
        let content = if self.has_content_file() {
            self.content_file as u32
        } else {
            0xff
        };
        Ok((self.index & 0x00ff_ffff) | (content << 24))
    }

    #[must_use]
    pub const fn from_narrow(value: u32) -> Self {
        let content = value >> 24;
        Self {
            index: value & 0x00ff_ffff,
            content_file: if content == 0xff { -1 } else { content as i32 },
        }
    }

    /// Writes `FRMR`: index and content file in the wide form, the packed
    /// `u32` otherwise.
    pub fn save<W: Write + Seek>(&self, w: &mut EsmWriter<W>, wide: bool) -> EsmResult<()> {
        if wide {
            w.write_hnt(b"FRMR", &[self.index, self.content_file as u32])
        } else {
            w.write_hnt(b"FRMR", &self.to_narrow()?)
        }
    }

    pub fn load<R: Read + Seek>(r: &mut EsmReader<R>, wide: bool) -> EsmResult<Self> {
        if wide {
            let [index, content_file]: [u32; 2] = r.get_hnt(b"FRMR")?;
            Ok(Self {
                index,
                content_file: content_file as i32,
            })
        } else {
            Ok(Self::from_narrow(r.get_hnt(b"FRMR")?))
        }
    }
}

/// A placed reference to an object.
#[derive(Debug, Clone, PartialEq)]
pub struct CellRef {
    pub ref_num: RefNum,
    /// Id of the referenced object.
    pub ref_id: RefId,
    pub scale: f32,
    pub owner: RefId,
    /// Global variable that grants ownership when set.
    pub global_variable: String,
    /// Creature trapped in a soul gem.
    pub soul: RefId,
    pub faction: RefId,
    /// Faction rank needed to use the object, -2 for none.
    pub faction_rank: i32,
    pub enchantment_charge: f32,
    /// Remaining uses or condition, -1 for default.
    pub charge_int: i32,
    pub count: i32,
    pub teleport: bool,
    pub door_dest: Position,
    pub dest_cell: String,
    pub is_locked: bool,
    pub lock_level: i32,
    pub key: RefId,
    pub trap: RefId,
    /// -1 when unset.
    pub reference_blocked: i8,
    pub pos: Position,
}

impl Default for CellRef {
    fn default() -> Self {
        Self {
            ref_num: RefNum::default(),
            ref_id: RefId::Empty,
            scale: 1.0,
            owner: RefId::Empty,
            global_variable: String::new(),
            soul: RefId::Empty,
            faction: RefId::Empty,
            faction_rank: -2,
            enchantment_charge: -1.0,
            charge_int: -1,
            count: 1,
            teleport: false,
            door_dest: Position::default(),
            dest_cell: String::new(),
            is_locked: false,
            lock_level: 0,
            key: RefId::Empty,
            trap: RefId::Empty,
            reference_blocked: -1,
            pos: Position::default(),
        }
    }
}

impl CellRef {
    pub fn blank(&mut self) {
        *self = Self::default();
    }

    /// Reads the reference number and id, then the remaining fields.
    ///
    /// Returns `true` if the reference is marked deleted.
    pub fn load<R: Read + Seek>(&mut self, r: &mut EsmReader<R>, wide: bool) -> EsmResult<bool> {
        self.load_id(r, wide)?;
        self.load_data(r)
    }

    /// Reads `FRMR` and `NAME`, skipping a leading `NAM0` reference counter.
    pub fn load_id<R: Read + Seek>(&mut self, r: &mut EsmReader<R>, wide: bool) -> EsmResult<()> {
        if r.is_next_sub(b"NAM0")? {
            r.skip_h_sub()?;
        }
        self.blank();
        self.ref_num = RefNum::load(r, wide)?;
        self.ref_id = r.get_hno_ref_id(b"NAME")?;
        if self.ref_id.is_empty() {
            tracing::warn!(
                file = r.get_name(),
                offset = r.get_file_offset(),
                "cell reference with empty id"
            );
        }
        Ok(())
    }

    /// Reads fields until a sub-record that does not belong to the
    /// reference, which is left for the caller.
    pub fn load_data<R: Read + Seek>(&mut self, r: &mut EsmReader<R>) -> EsmResult<bool> {
        let mut deleted = false;
        while r.has_more_subs() {
            let name = r.get_sub_name()?;
            match name.as_bytes() {
                b"UNAM" => self.reference_blocked = r.get_ht()?,
                b"XSCL" => self.scale = r.get_ht::<f32>()?.clamp(0.5, 2.0),
                b"ANAM" => self.owner = r.get_h_ref_id()?,
                b"BNAM" => self.global_variable = r.get_h_string()?,
                b"XSOL" => self.soul = r.get_h_ref_id()?,
                b"CNAM" => self.faction = r.get_h_ref_id()?,
                b"INDX" => self.faction_rank = r.get_ht()?,
                b"XCHG" => self.enchantment_charge = r.get_ht()?,
                b"INTV" => self.charge_int = r.get_ht()?,
                b"NAM9" => self.count = r.get_ht()?,
                b"DODT" => {
                    self.door_dest = r.get_ht()?;
                    self.teleport = true;
                }
                b"DNAM" => self.dest_cell = r.get_h_string()?,
                b"FLTV" => {
                    self.lock_level = r.get_ht()?;
                    self.is_locked = true;
                }
                b"KNAM" => self.key = r.get_h_ref_id()?,
                b"TNAM" => self.trap = r.get_h_ref_id()?,
                b"DATA" => self.pos = r.get_ht()?,
                b"NAM0" => r.skip_h_sub()?,
                b"DELE" => {
                    r.skip_h_sub()?;
                    deleted = true;
                }
                _ => {
                    r.cache_sub_name();
                    break;
                }
            }
        }
        Ok(deleted)
    }

    /// Writes the reference. Fields that only make sense for references
    /// placed in the world are left out when `in_inventory` is set.
    pub fn save<W: Write + Seek>(
        &self,
        w: &mut EsmWriter<W>,
        wide: bool,
        in_inventory: bool,
        deleted: bool,
    ) -> EsmResult<()> {
        self.ref_num.save(w, wide)?;
        w.write_hnc_ref_id(b"NAME", &self.ref_id)?;
        if deleted {
            return w.write_deleted();
        }

        if (self.scale - 1.0).abs() > f32::EPSILON {
            w.write_hnt(b"XSCL", &self.scale.clamp(0.5, 2.0))?;
        }
        if !in_inventory {
            w.write_hnoc_ref_id(b"ANAM", &self.owner)?;
        }
        w.write_hnoc_string(b"BNAM", &self.global_variable)?;
        w.write_hnoc_ref_id(b"XSOL", &self.soul)?;

        if !in_inventory {
            w.write_hnoc_ref_id(b"CNAM", &self.faction)?;
            if self.faction_rank != -2 {
                w.write_hnt(b"INDX", &self.faction_rank)?;
            }
        }

        if self.enchantment_charge.to_bits() != (-1.0f32).to_bits() {
            w.write_hnt(b"XCHG", &self.enchantment_charge)?;
        }
        if self.charge_int != -1 {
            w.write_hnt(b"INTV", &self.charge_int)?;
        }
        if self.count != 1 {
            w.write_hnt(b"NAM9", &self.count)?;
        }

        if !in_inventory && self.teleport {
            w.write_hnt(b"DODT", &self.door_dest)?;
            w.write_hnoc_string(b"DNAM", &self.dest_cell)?;
        }
        if !in_inventory && self.is_locked {
            w.write_hnt(b"FLTV", &self.lock_level)?;
        }
        if !in_inventory {
            w.write_hnoc_ref_id(b"KNAM", &self.key)?;
            w.write_hnoc_ref_id(b"TNAM", &self.trap)?;
        }

        if self.reference_blocked != -1 {
            w.write_hnt(b"UNAM", &self.reference_blocked)?;
        }
        if !in_inventory {
            w.write_hnt(b"DATA", &self.pos)?;
        }
        Ok(())
    }
}
