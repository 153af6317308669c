//! Saved state of actor AI packages.

use std::io::{Read, Seek, Write};

use defs::{RefId, MAX_OLD_AI_PACKAGE_FORMAT_VERSION};
use esm::{take_array, Composite, EsmError, EsmReader, EsmResult, EsmWriter};

/// Parameters of a wander package (`DATA`).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct AiWanderData {
    pub distance: i16,
    /// Game hours to wander.
    pub duration: i16,
    pub time_of_day: u8,
    /// Chances of each idle animation.
    pub idle: [u8; 8],
    pub should_repeat: u8,
}

impl Composite for AiWanderData {
    const SIZE: usize = 14;

    fn encode(&self, out: &mut Vec<u8>) {
        self.distance.encode(out);
        self.duration.encode(out);
        self.time_of_day.encode(out);
        self.idle.encode(out);
        self.should_repeat.encode(out);
    }

    fn decode(input: &mut &[u8]) -> Self {
        Self {
            distance: i16::decode(input),
            duration: i16::decode(input),
            time_of_day: u8::decode(input),
            idle: take_array(input),
            should_repeat: u8::decode(input),
        }
    }
}

/// Remaining wander time (`STAR`).
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct AiWanderDuration {
    pub remaining_duration: f32,
    pub unused: i32,
}

impl Composite for AiWanderDuration {
    const SIZE: usize = 8;

    fn encode(&self, out: &mut Vec<u8>) {
        self.remaining_duration.encode(out);
        self.unused.encode(out);
    }

    fn decode(input: &mut &[u8]) -> Self {
        Self {
            remaining_duration: f32::decode(input),
            unused: i32::decode(input),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Default)]
pub struct AiWander {
    pub data: AiWanderData,
    pub duration_data: AiWanderDuration,
    /// Position the actor wanders around, if it was recorded.
    pub initial_actor_position: [f32; 3],
    pub stored_initial_actor_position: bool,
}

impl AiWander {
    pub fn save<W: Write + Seek>(&self, w: &mut EsmWriter<W>) -> EsmResult<()> {
        w.write_hnt(b"DATA", &self.data)?;
        w.write_hnt(b"STAR", &self.duration_data)?;
        if self.stored_initial_actor_position {
            w.write_hnt(b"POS_", &self.initial_actor_position)?;
        }
        Ok(())
    }

    pub fn load<R: Read + Seek>(&mut self, r: &mut EsmReader<R>) -> EsmResult<()> {
        self.data = r.get_hnt(b"DATA")?;
        self.duration_data = r.get_hnt(b"STAR")?;
        match r.get_hnot(b"POS_")? {
            Some(position) => {
                self.initial_actor_position = position;
                self.stored_initial_actor_position = true;
            }
            None => self.stored_initial_actor_position = false,
        }
        Ok(())
    }
}

/// Travel destination (`DATA`).
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct AiTravelData {
    pub x: f32,
    pub y: f32,
    pub z: f32,
}

impl Composite for AiTravelData {
    const SIZE: usize = 12;

    fn encode(&self, out: &mut Vec<u8>) {
        [self.x, self.y, self.z].encode(out);
    }

    fn decode(input: &mut &[u8]) -> Self {
        let [x, y, z] = <[f32; 3]>::decode(input);
        Self { x, y, z }
    }
}

#[derive(Debug, Clone, PartialEq, Default)]
pub struct AiTravel {
    pub data: AiTravelData,
    /// Package was added by a script rather than the actor definition.
    pub hidden: bool,
    pub repeat: bool,
}

impl AiTravel {
    pub fn save<W: Write + Seek>(&self, w: &mut EsmWriter<W>) -> EsmResult<()> {
        w.write_hnt(b"DATA", &self.data)?;
        w.write_hnt(b"HIDD", &self.hidden)?;
        if self.repeat {
            w.write_hnt(b"REPT", &self.repeat)?;
        }
        Ok(())
    }

    pub fn load<R: Read + Seek>(&mut self, r: &mut EsmReader<R>) -> EsmResult<()> {
        self.data = r.get_hnt(b"DATA")?;
        self.hidden = r.get_hnt(b"HIDD")?;
        self.repeat = r.get_hnot(b"REPT")?.unwrap_or(false);
        Ok(())
    }
}

/// Escort destination and duration (`DATA`).
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct AiEscortData {
    pub x: f32,
    pub y: f32,
    pub z: f32,
    /// Game hours the escort lasts.
    pub duration: i16,
}

impl Composite for AiEscortData {
    const SIZE: usize = 14;

    fn encode(&self, out: &mut Vec<u8>) {
        [self.x, self.y, self.z].encode(out);
        self.duration.encode(out);
    }

    fn decode(input: &mut &[u8]) -> Self {
        let [x, y, z] = <[f32; 3]>::decode(input);
        Self {
            x,
            y,
            z,
            duration: i16::decode(input),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct AiEscort {
    pub data: AiEscortData,
    pub target_id: RefId,
    /// Runtime actor id of the target, -1 if unknown.
    pub target_actor_id: i32,
    pub remaining_duration: f32,
    /// Cell the escort ends in, empty for exteriors.
    pub cell_id: String,
    pub repeat: bool,
}

impl Default for AiEscort {
    fn default() -> Self {
        Self {
            data: AiEscortData::default(),
            target_id: RefId::Empty,
            target_actor_id: -1,
            remaining_duration: 0.0,
            cell_id: String::new(),
            repeat: false,
        }
    }
}

impl AiEscort {
    pub fn save<W: Write + Seek>(&self, w: &mut EsmWriter<W>) -> EsmResult<()> {
        w.write_hnt(b"DATA", &self.data)?;
        w.write_hn_ref_id(b"TARG", &self.target_id)?;
        w.write_hnt(b"TAID", &self.target_actor_id)?;
        w.write_hnt(b"DURA", &self.remaining_duration)?;
        w.write_hno_string(b"CELL", &self.cell_id)?;
        if self.repeat {
            w.write_hnt(b"REPT", &self.repeat)?;
        }
        Ok(())
    }

    /// Reads the package.
    ///
    /// Old saves did not store the total duration, so it is rebuilt from
    /// the remaining duration, at least one hour when time was left.
    pub fn load<R: Read + Seek>(&mut self, r: &mut EsmReader<R>) -> EsmResult<()> {
        self.data = r.get_hnt(b"DATA")?;
        self.target_id = r.get_hn_ref_id(b"TARG")?;
        self.target_actor_id = r.get_hnot(b"TAID")?.unwrap_or(-1);
        self.remaining_duration = r.get_hnt(b"DURA")?;
        self.cell_id = r.get_hno_string(b"CELL")?;
        self.repeat = r.get_hnot(b"REPT")?.unwrap_or(false);

        if r.get_format_version() <= MAX_OLD_AI_PACKAGE_FORMAT_VERSION {
            let had_time = if self.remaining_duration > 0.0 { 1.0 } else { 0.0 };
            self.data.duration = self.remaining_duration.max(had_time) as i16;
        }
        Ok(())
    }
}

/// Package type codes written before each package (`AIPK`).
pub mod package_type {
    pub const WANDER: i32 = 0;
    pub const TRAVEL: i32 = 1;
    pub const ESCORT: i32 = 2;
}

/// One saved AI package.
#[derive(Debug, Clone, PartialEq)]
pub enum AiPackage {
    Wander(AiWander),
    Travel(AiTravel),
    Escort(AiEscort),
}

impl AiPackage {
    #[must_use]
    pub const fn type_id(&self) -> i32 {
        match self {
            Self::Wander(_) => package_type::WANDER,
            Self::Travel(_) => package_type::TRAVEL,
            Self::Escort(_) => package_type::ESCORT,
        }
    }
}

/// An actor's package stack.
#[derive(Debug, Clone, PartialEq)]
pub struct AiSequence {
    pub packages: Vec<AiPackage>,
    /// Type of the last package that ran, -1 if none.
    pub last_ai_package: i32,
}

impl Default for AiSequence {
    fn default() -> Self {
        Self {
            packages: Vec::new(),
            last_ai_package: -1,
        }
    }
}

impl AiSequence {
    pub fn save<W: Write + Seek>(&self, w: &mut EsmWriter<W>) -> EsmResult<()> {
        for package in &self.packages {
            w.write_hnt(b"AIPK", &package.type_id())?;
            match package {
                AiPackage::Wander(wander) => wander.save(w)?,
                AiPackage::Travel(travel) => travel.save(w)?,
                AiPackage::Escort(escort) => escort.save(w)?,
            }
        }
        w.write_hnt(b"LAST", &self.last_ai_package)
    }

    pub fn load<R: Read + Seek>(&mut self, r: &mut EsmReader<R>) -> EsmResult<()> {
        self.packages.clear();
        while r.is_next_sub(b"AIPK")? {
            let type_id: i32 = r.get_ht()?;
            let package = match type_id {
                package_type::WANDER => {
                    let mut wander = AiWander::default();
                    wander.load(r)?;
                    AiPackage::Wander(wander)
                }
                package_type::TRAVEL => {
                    let mut travel = AiTravel::default();
                    travel.load(r)?;
                    AiPackage::Travel(travel)
                }
                package_type::ESCORT => {
                    let mut escort = AiEscort::default();
                    escort.load(r)?;
                    AiPackage::Escort(escort)
                }
                other => {
                    return Err(EsmError::InvalidValue {
                        what: "ai package type",
                        value: i64::from(other),
                    })
                }
            };
            self.packages.push(package);
        }
        self.last_ai_package = r.get_hnot(b"LAST")?.unwrap_or(-1);
        Ok(())
    }
}
