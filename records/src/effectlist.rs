//! Magic effect lists attached to spells, potions and enchantments.

use std::io::{Read, Seek, Write};

use esm::{Composite, EsmReader, EsmResult, EsmWriter};

/// Effect ranges.
pub mod range {
    pub const SELF: i32 = 0;
    pub const TOUCH: i32 = 1;
    pub const TARGET: i32 = 2;
}

/// One effect entry (`ENAM`).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct EffectEntry {
    pub effect_id: i16,
    /// Affected skill, -1 if none.
    pub skill: i8,
    /// Affected attribute, -1 if none.
    pub attribute: i8,
    pub range: i32,
    pub area: i32,
    pub duration: i32,
    pub magn_min: i32,
    pub magn_max: i32,
}

impl Composite for EffectEntry {
    const SIZE: usize = 24;

    fn encode(&self, out: &mut Vec<u8>) {
        self.effect_id.encode(out);
        self.skill.encode(out);
        self.attribute.encode(out);
        self.range.encode(out);
        self.area.encode(out);
        self.duration.encode(out);
        self.magn_min.encode(out);
        self.magn_max.encode(out);
    }

    fn decode(input: &mut &[u8]) -> Self {
        Self {
            effect_id: i16::decode(input),
            skill: i8::decode(input),
            attribute: i8::decode(input),
            range: i32::decode(input),
            area: i32::decode(input),
            duration: i32::decode(input),
            magn_min: i32::decode(input),
            magn_max: i32::decode(input),
        }
    }
}

/// An effect together with its position in the list.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct IndexedEffect {
    pub data: EffectEntry,
    pub index: u32,
}

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct EffectList {
    pub list: Vec<IndexedEffect>,
}

impl EffectList {
    /// Reads one `ENAM` payload; the tag has already been consumed.
    pub fn add<R: Read + Seek>(&mut self, r: &mut EsmReader<R>) -> EsmResult<()> {
        let data = r.get_ht()?;
        let index = self.list.len() as u32;
        self.list.push(IndexedEffect { data, index });
        Ok(())
    }

    /// Replaces the list, numbering effects by position.
    pub fn populate(&mut self, effects: &[EffectEntry]) {
        self.list = effects
            .iter()
            .enumerate()
            .map(|(index, data)| IndexedEffect {
                data: *data,
                index: index as u32,
            })
            .collect();
    }

    /// Renumbers effects after entries were removed or reordered.
    pub fn update_indexes(&mut self) {
        for (index, effect) in self.list.iter_mut().enumerate() {
            effect.index = index as u32;
        }
    }

    pub fn load<R: Read + Seek>(&mut self, r: &mut EsmReader<R>) -> EsmResult<()> {
        self.list.clear();
        while r.is_next_sub(b"ENAM")? {
            self.add(r)?;
        }
        Ok(())
    }

    pub fn save<W: Write + Seek>(&self, w: &mut EsmWriter<W>) -> EsmResult<()> {
        for effect in &self.list {
            w.write_hnt(b"ENAM", &effect.data)?;
        }
        Ok(())
    }
}
