//! Saved runtime state of creatures and NPCs.

use std::io::{Read, Seek, Write};

use defs::{RefId, MAX_CLEAR_MODIFIERS_FORMAT_VERSION, MAX_INT_FALLBACK_FORMAT_VERSION};
use esm::{Composite, EsmReader, EsmResult, EsmWriter};

use crate::aisequence::AiSequence;

pub const ATTRIBUTE_COUNT: usize = 8;

/// Health, magicka and fatigue.
pub const DYNAMIC_COUNT: usize = 3;

/// Bits of [`CreatureStats::flags`] (`AFLG`).
pub mod actor_flags {
    pub const DEAD: i32 = 0x0001;
    pub const DEATH_ANIMATION_FINISHED: i32 = 0x0002;
    pub const DIED: i32 = 0x0004;
    pub const MURDERED: i32 = 0x0008;
    pub const TALKED_TO: i32 = 0x0010;
    pub const ALARMED: i32 = 0x0020;
    pub const ATTACKED: i32 = 0x0040;
    pub const KNOCKDOWN: i32 = 0x0080;
    pub const KNOCKDOWN_ONE_FRAME: i32 = 0x0100;
    pub const KNOCKDOWN_OVER_ONE_FRAME: i32 = 0x0200;
    pub const HIT_RECOVERY: i32 = 0x0400;
    pub const BLOCK: i32 = 0x0800;
    pub const RECALC_DYNAMIC_STATS: i32 = 0x1000;
}

/// In-game time: hour of day and day counter.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct TimeStamp {
    pub hour: f32,
    pub day: i32,
}

impl TimeStamp {
    #[must_use]
    pub fn is_zero(&self) -> bool {
        self.day == 0 && self.hour == 0.0
    }
}

impl Composite for TimeStamp {
    const SIZE: usize = 8;

    fn encode(&self, out: &mut Vec<u8>) {
        self.hour.encode(out);
        self.day.encode(out);
    }

    fn decode(input: &mut &[u8]) -> Self {
        Self {
            hour: f32::decode(input),
            day: i32::decode(input),
        }
    }
}

/// One attribute or dynamic stat.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct StatState {
    pub base: f32,
    pub modifier: f32,
    pub current: f32,
    pub damage: f32,
    pub progress: f32,
}

impl StatState {
    /// Writes `STBA` and whichever of `STMO`, `STCU`, `STDF`, `STPR` are
    /// non-zero. Old formats store the first three as integers.
    pub fn save<W: Write + Seek>(&self, w: &mut EsmWriter<W>) -> EsmResult<()> {
        let int_fallback = w.format_version() <= MAX_INT_FALLBACK_FORMAT_VERSION;
        let write_value = |w: &mut EsmWriter<W>, name: &[u8; 4], value: f32| {
            if int_fallback {
                w.write_hnt(name, &(value as i32))
            } else {
                w.write_hnt(name, &value)
            }
        };

        write_value(w, b"STBA", self.base)?;
        if self.modifier != 0.0 {
            write_value(w, b"STMO", self.modifier)?;
        }
        if self.current != 0.0 {
            write_value(w, b"STCU", self.current)?;
        }
        if self.damage != 0.0 {
            w.write_hnt(b"STDF", &self.damage)?;
        }
        if self.progress != 0.0 {
            w.write_hnt(b"STPR", &self.progress)?;
        }
        Ok(())
    }

    pub fn load<R: Read + Seek>(&mut self, r: &mut EsmReader<R>) -> EsmResult<()> {
        let int_fallback = r.get_format_version() <= MAX_INT_FALLBACK_FORMAT_VERSION;
        let read_value = |r: &mut EsmReader<R>, name: &[u8; 4]| -> EsmResult<Option<f32>> {
            if int_fallback {
                Ok(r.get_hnot::<i32>(name)?.map(|value| value as f32))
            } else {
                r.get_hnot::<f32>(name)
            }
        };

        r.get_sub_name_is(b"STBA")?;
        self.base = if int_fallback {
            r.get_ht::<i32>()? as f32
        } else {
            r.get_ht()?
        };
        self.modifier = read_value(r, b"STMO")?.unwrap_or(0.0);
        self.current = read_value(r, b"STCU")?.unwrap_or(0.0);

        // Damage used to share the integer layout of the other values.
        self.damage = read_value(r, b"STDA")?.unwrap_or(0.0);
        if let Some(damage) = r.get_hnot(b"STDF")? {
            self.damage = damage;
        }
        self.progress = r.get_hnot(b"STPR")?.unwrap_or(0.0);
        Ok(())
    }
}

/// Runtime state of an actor (`STBA` .. `DTIM`, then AI packages).
#[derive(Debug, Clone, PartialEq)]
pub struct CreatureStats {
    pub attributes: [StatState; ATTRIBUTE_COUNT],
    pub dynamic: [StatState; DYNAMIC_COUNT],
    /// Gold available for bartering.
    pub gold_pool: i32,
    /// Last time the gold pool was restocked.
    pub trade_time: TimeStamp,
    pub flags: i32,
    pub movement_flags: i32,
    pub fall_height: f32,
    pub last_hit_object: RefId,
    pub last_hit_attempt_object: RefId,
    pub draw_state: i32,
    pub level: i32,
    /// -1 before the actor is assigned an id.
    pub actor_id: i32,
    /// -1 if no death animation was chosen.
    pub death_animation: i8,
    pub time_of_death: TimeStamp,
    pub ai_sequence: AiSequence,
}

impl Default for CreatureStats {
    fn default() -> Self {
        Self {
            attributes: [StatState::default(); ATTRIBUTE_COUNT],
            dynamic: [StatState::default(); DYNAMIC_COUNT],
            gold_pool: 0,
            trade_time: TimeStamp::default(),
            flags: 0,
            movement_flags: 0,
            fall_height: 0.0,
            last_hit_object: RefId::Empty,
            last_hit_attempt_object: RefId::Empty,
            draw_state: 0,
            level: 1,
            actor_id: -1,
            death_animation: -1,
            time_of_death: TimeStamp::default(),
            ai_sequence: AiSequence::default(),
        }
    }
}

impl CreatureStats {
    pub fn blank(&mut self) {
        *self = Self::default();
    }

    #[must_use]
    pub const fn has_flag(&self, flag: i32) -> bool {
        self.flags & flag != 0
    }

    pub fn save<W: Write + Seek>(&self, w: &mut EsmWriter<W>) -> EsmResult<()> {
        for attribute in &self.attributes {
            attribute.save(w)?;
        }
        for dynamic in &self.dynamic {
            dynamic.save(w)?;
        }

        if self.gold_pool != 0 {
            w.write_hnt(b"GOLD", &self.gold_pool)?;
        }
        if !self.trade_time.is_zero() {
            w.write_hnt(b"TIME", &self.trade_time)?;
        }
        if self.flags != 0 {
            w.write_hnt(b"AFLG", &self.flags)?;
        }
        if self.movement_flags != 0 {
            w.write_hnt(b"MOVE", &self.movement_flags)?;
        }
        if self.fall_height != 0.0 {
            w.write_hnt(b"FALL", &self.fall_height)?;
        }
        w.write_hno_ref_id(b"LHIT", &self.last_hit_object)?;
        w.write_hno_ref_id(b"LHAT", &self.last_hit_attempt_object)?;
        if self.draw_state != 0 {
            w.write_hnt(b"DRAW", &self.draw_state)?;
        }
        if self.level != 1 {
            w.write_hnt(b"LEVL", &self.level)?;
        }
        if self.actor_id != -1 {
            w.write_hnt(b"ACID", &self.actor_id)?;
        }
        if self.death_animation != -1 {
            w.write_hnt(b"DANM", &self.death_animation)?;
        }
        if !self.time_of_death.is_zero() {
            w.write_hnt(b"DTIM", &self.time_of_death)?;
        }
        self.ai_sequence.save(w)
    }

    pub fn load<R: Read + Seek>(&mut self, r: &mut EsmReader<R>) -> EsmResult<()> {
        for attribute in &mut self.attributes {
            attribute.load(r)?;
        }
        for dynamic in &mut self.dynamic {
            dynamic.load(r)?;
        }

        self.gold_pool = r.get_hnot(b"GOLD")?.unwrap_or(0);
        self.trade_time = r.get_hnot(b"TIME")?.unwrap_or_default();
        self.flags = r.get_hnot(b"AFLG")?.unwrap_or(0);
        if r.get_format_version() <= MAX_CLEAR_MODIFIERS_FORMAT_VERSION {
            self.flags |= actor_flags::RECALC_DYNAMIC_STATS;
        }
        self.movement_flags = r.get_hnot(b"MOVE")?.unwrap_or(0);
        self.fall_height = r.get_hnot(b"FALL")?.unwrap_or(0.0);
        self.last_hit_object = r.get_hno_ref_id(b"LHIT")?;
        self.last_hit_attempt_object = r.get_hno_ref_id(b"LHAT")?;
        self.draw_state = r.get_hnot(b"DRAW")?.unwrap_or(0);
        self.level = r.get_hnot(b"LEVL")?.unwrap_or(1);
        self.actor_id = r.get_hnot(b"ACID")?.unwrap_or(-1);
        self.death_animation = r.get_hnot(b"DANM")?.unwrap_or(-1);
        self.time_of_death = r.get_hnot(b"DTIM")?.unwrap_or_default();
        self.ai_sequence.load(r)
    }
}
