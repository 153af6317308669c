//! Regions: weather odds, sleep creatures and ambient sounds.

use std::io::{Read, Seek, Write};

use defs::{RecName, RefId};
use esm::{Composite, EsmError, EsmReader, EsmResult, EsmWriter, Record, VER_12};

pub const REC_REGN: RecName = RecName::new(*b"REGN");

/// Width of a sound id in fixed-size string versions.
pub const SOUND_ID_SIZE: usize = 32;

/// Weather probabilities in percent.
///
/// Files written for the base game without expansions omit the snow and
/// blizzard chances.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct WeatherChances {
    pub clear: u8,
    pub cloudy: u8,
    pub foggy: u8,
    pub overcast: u8,
    pub rain: u8,
    pub thunder: u8,
    pub ash: u8,
    pub blight: u8,
    pub snow: u8,
    pub blizzard: u8,
}

impl WeatherChances {
    /// Encoded size without the expansion chances.
    pub const BASE_SIZE: usize = 8;

    /// Chances in on-disk order.
    #[must_use]
    pub const fn to_array(self) -> [u8; 10] {
        [
            self.clear,
            self.cloudy,
            self.foggy,
            self.overcast,
            self.rain,
            self.thunder,
            self.ash,
            self.blight,
            self.snow,
            self.blizzard,
        ]
    }

    #[must_use]
    pub const fn from_array(v: [u8; 10]) -> Self {
        Self {
            clear: v[0],
            cloudy: v[1],
            foggy: v[2],
            overcast: v[3],
            rain: v[4],
            thunder: v[5],
            ash: v[6],
            blight: v[7],
            snow: v[8],
            blizzard: v[9],
        }
    }
}

impl Composite for WeatherChances {
    const SIZE: usize = 10;

    fn encode(&self, out: &mut Vec<u8>) {
        self.to_array().encode(out);
    }

    fn decode(input: &mut &[u8]) -> Self {
        Self::from_array(<[u8; 10]>::decode(input))
    }
}

/// An ambient sound and its chance to play.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct SoundRef {
    pub sound: RefId,
    pub chance: u8,
}

impl SoundRef {
    pub fn save<W: Write + Seek>(&self, w: &mut EsmWriter<W>) -> EsmResult<()> {
        w.start_sub_record(b"SNAM")?;
        w.write_maybe_fixed_size_ref_id(&self.sound, SOUND_ID_SIZE)?;
        w.write_t(&self.chance)?;
        w.end_record(b"SNAM")
    }

    /// Reads an `SNAM` payload; the tag has already been consumed.
    pub fn load<R: Read + Seek>(r: &mut EsmReader<R>) -> EsmResult<Self> {
        r.get_sub_header()?;
        let sound = r.get_maybe_fixed_ref_id_size(SOUND_ID_SIZE)?;
        let chance = r.get_t()?;
        Ok(Self { sound, chance })
    }
}

/// A region definition (`REGN`).
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Region {
    pub id: RefId,
    pub name: String,
    pub weather: WeatherChances,
    /// Leveled creature list used when sleeping outdoors.
    pub sleep_list: RefId,
    /// Map colour as packed RGBA.
    pub map_color: u32,
    pub sound_list: Vec<SoundRef>,
    pub record_flags: u32,
}

impl Region {
    pub fn blank(&mut self) {
        self.record_flags = 0;
        self.name.clear();
        self.weather = WeatherChances::default();
        self.sleep_list = RefId::Empty;
        self.map_color = 0;
        self.sound_list.clear();
    }
}

impl Record for Region {
    const REC_NAME: RecName = REC_REGN;

    fn record_flags(&self) -> u32 {
        self.record_flags
    }

    fn save<W: Write + Seek>(&self, w: &mut EsmWriter<W>, deleted: bool) -> EsmResult<()> {
        w.write_hnc_ref_id(b"NAME", &self.id)?;
        if deleted {
            return w.write_deleted();
        }
        w.write_hnoc_string(b"FNAM", &self.name)?;
        if w.header().version.to_bits() == VER_12 {
            let chances = self.weather.to_array();
            w.write_hn_bytes(b"WEAT", &chances[..WeatherChances::BASE_SIZE])?;
        } else {
            w.write_hnt(b"WEAT", &self.weather)?;
        }
        w.write_hnoc_ref_id(b"BNAM", &self.sleep_list)?;
        w.write_hnt(b"CNAM", &self.map_color)?;
        for sound in &self.sound_list {
            sound.save(w)?;
        }
        Ok(())
    }

    fn load<R: Read + Seek>(&mut self, r: &mut EsmReader<R>) -> EsmResult<bool> {
        self.record_flags = r.get_rec_flags();
        self.sound_list.clear();

        let mut deleted = false;
        let mut has_name = false;
        while r.has_more_subs() {
            let name = r.get_sub_name()?;
            match name.as_bytes() {
                b"NAME" => {
                    self.id = r.get_h_ref_id()?;
                    has_name = true;
                }
                b"FNAM" => self.name = r.get_h_string()?,
                b"WEAT" => {
                    let size = r.get_sub_header()?;
                    match size {
                        WeatherChances::BASE_SIZE => {
                            let mut bytes = [0u8; 10];
                            bytes[..8].copy_from_slice(&r.get_exact(size)?);
                            self.weather = WeatherChances::from_array(bytes);
                        }
                        WeatherChances::SIZE => self.weather = r.get_t()?,
                        _ => {
                            return Err(EsmError::SizeMismatch {
                                name,
                                expected: WeatherChances::SIZE,
                                actual: size,
                            })
                        }
                    }
                }
                b"BNAM" => self.sleep_list = r.get_h_ref_id()?,
                b"CNAM" => self.map_color = r.get_ht()?,
                b"SNAM" => self.sound_list.push(SoundRef::load(r)?),
                b"DELE" => {
                    r.skip_h_sub()?;
                    deleted = true;
                }
                _ => {
                    return Err(EsmError::UnexpectedTag {
                        expected: None,
                        found: name,
                        record: REC_REGN,
                    })
                }
            }
        }

        if !has_name {
            return Err(EsmError::MissingSubRecord {
                name: RecName::new(*b"NAME"),
                record: REC_REGN,
            });
        }
        Ok(deleted)
    }
}
