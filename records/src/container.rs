//! Containers and inventory lists.

use std::io::{Read, Seek, Write};

use defs::{RecName, RefId};
use esm::{EsmError, EsmReader, EsmResult, EsmWriter, Record};

pub const REC_CONT: RecName = RecName::new(*b"CONT");

/// Width of an inventory item id in fixed-size string versions.
pub const ITEM_ID_SIZE: usize = 32;

/// One inventory line: an item and how many of it.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct ContItem {
    pub count: i32,
    pub item: RefId,
}

impl ContItem {
    /// Writes the item as an `NPCO` sub-record.
    pub fn save<W: Write + Seek>(&self, w: &mut EsmWriter<W>) -> EsmResult<()> {
        w.start_sub_record(b"NPCO")?;
        w.write_t(&self.count)?;
        w.write_maybe_fixed_size_ref_id(&self.item, ITEM_ID_SIZE)?;
        w.end_record(b"NPCO")
    }

    /// Reads an `NPCO` payload; the tag has already been consumed.
    pub fn load<R: Read + Seek>(r: &mut EsmReader<R>) -> EsmResult<Self> {
        r.get_sub_header()?;
        let count = r.get_t()?;
        let item = r.get_maybe_fixed_ref_id_size(ITEM_ID_SIZE)?;
        Ok(Self { count, item })
    }
}

/// Ordered list of inventory lines.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct InventoryList {
    pub list: Vec<ContItem>,
}

impl InventoryList {
    /// Reads one `NPCO` entry and appends it.
    pub fn add<R: Read + Seek>(&mut self, r: &mut EsmReader<R>) -> EsmResult<()> {
        self.list.push(ContItem::load(r)?);
        Ok(())
    }

    pub fn save<W: Write + Seek>(&self, w: &mut EsmWriter<W>) -> EsmResult<()> {
        for item in &self.list {
            item.save(w)?;
        }
        Ok(())
    }
}

/// Container behaviour flags.
pub mod flags {
    /// Contents regrow after looting.
    pub const ORGANIC: i32 = 0x1;
    pub const RESPAWN: i32 = 0x2;
    /// Always set in valid records.
    pub const UNKNOWN: i32 = 0x8;
}

/// A container definition (`CONT`).
#[derive(Debug, Clone, PartialEq)]
pub struct Container {
    pub id: RefId,
    pub name: String,
    pub model: String,
    pub script: RefId,
    pub weight: f32,
    pub flags: i32,
    pub inventory: InventoryList,
    pub record_flags: u32,
}

impl Default for Container {
    fn default() -> Self {
        Self {
            id: RefId::Empty,
            name: String::new(),
            model: String::new(),
            script: RefId::Empty,
            weight: 0.0,
            flags: flags::UNKNOWN,
            inventory: InventoryList::default(),
            record_flags: 0,
        }
    }
}

impl Container {
    /// Resets everything but the id.
    pub fn blank(&mut self) {
        let id = std::mem::take(&mut self.id);
        *self = Self { id, ..Self::default() };
    }
}

impl Record for Container {
    const REC_NAME: RecName = REC_CONT;

    fn record_flags(&self) -> u32 {
        self.record_flags
    }

    fn save<W: Write + Seek>(&self, w: &mut EsmWriter<W>, deleted: bool) -> EsmResult<()> {
        w.write_hnc_ref_id(b"NAME", &self.id)?;
        if deleted {
            return w.write_deleted();
        }
        w.write_hnoc_string(b"MODL", &self.model)?;
        w.write_hnoc_string(b"FNAM", &self.name)?;
        w.write_hnt(b"CNDT", &self.weight)?;
        w.write_hnt(b"FLAG", &self.flags)?;
        w.write_hnoc_ref_id(b"SCRI", &self.script)?;
        self.inventory.save(w)
    }

    fn load<R: Read + Seek>(&mut self, r: &mut EsmReader<R>) -> EsmResult<bool> {
        self.record_flags = r.get_rec_flags();
        self.inventory.list.clear();

        let mut deleted = false;
        let mut has_name = false;
        let mut has_weight = false;
        let mut has_flags = false;
        while r.has_more_subs() {
            let name = r.get_sub_name()?;
            match name.as_bytes() {
                b"NAME" => {
                    self.id = r.get_h_ref_id()?;
                    has_name = true;
                }
                b"MODL" => self.model = r.get_h_string()?,
                b"FNAM" => self.name = r.get_h_string()?,
                b"CNDT" => {
                    self.weight = r.get_ht()?;
                    has_weight = true;
                }
                b"FLAG" => {
                    self.flags = r.get_ht()?;
                    if self.flags & 0xf4 != 0 || self.flags & flags::UNKNOWN == 0 {
                        return Err(EsmError::InvalidValue {
                            what: "container flags",
                            value: i64::from(self.flags),
                        });
                    }
                    has_flags = true;
                }
                b"SCRI" => self.script = r.get_h_ref_id()?,
                b"NPCO" => self.inventory.add(r)?,
                b"DELE" => {
                    r.skip_h_sub()?;
                    deleted = true;
                }
                _ => {
                    return Err(EsmError::UnexpectedTag {
                        expected: None,
                        found: name,
                        record: REC_CONT,
                    })
                }
            }
        }

        let missing = if !has_name {
            Some(*b"NAME")
        } else if !deleted && !has_weight {
            Some(*b"CNDT")
        } else if !deleted && !has_flags {
            Some(*b"FLAG")
        } else {
            None
        };
        if let Some(missing) = missing {
            return Err(EsmError::MissingSubRecord {
                name: RecName::new(missing),
                record: REC_CONT,
            });
        }
        Ok(deleted)
    }
}
