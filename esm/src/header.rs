//! The `TES3` file header record.

use std::io::{Read, Seek, Write};

use defs::{FormatVersion, RecName, DEFAULT_FORMAT_VERSION};

use crate::error::{EsmError, EsmResult, LimitKind};
use crate::reader::EsmReader;
use crate::writer::EsmWriter;

/// Tag of the header record that opens every stream.
pub const REC_TES3: RecName = RecName::new(*b"TES3");

/// Bit pattern of the `1.2` header version float.
pub const VER_12: u32 = 0x3f99_999a;

/// Bit pattern of the `1.3` header version float.
pub const VER_13: u32 = 0x3fa6_6666;

/// Width of the author field in fixed-size string versions.
pub const AUTHOR_SIZE: usize = 32;

/// Width of the description field in fixed-size string versions.
pub const DESCRIPTION_SIZE: usize = 256;

/// A master file this stream depends on.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct MasterData {
    pub name: String,
    pub size: u64,
}

/// Decoded `TES3` header.
#[derive(Debug, Clone, PartialEq)]
pub struct Header {
    /// Header version float (`HEDR`), `1.3` for current files.
    pub version: f32,
    /// Format version (`FORM`), absent on the wire when zero.
    pub format_version: FormatVersion,
    /// File type: 0 plugin, 1 master, 32 save game.
    pub file_type: i32,
    pub author: String,
    pub description: String,
    /// Number of records following the header.
    pub record_count: i32,
    pub masters: Vec<MasterData>,
    /// Save game summary (`GMDT`).
    pub game_data: Option<Vec<u8>>,
    /// Save game screenshot (`SCRS`).
    pub screenshot: Option<Vec<u8>>,
}

impl Default for Header {
    fn default() -> Self {
        Self {
            version: f32::from_bits(VER_13),
            format_version: DEFAULT_FORMAT_VERSION,
            file_type: 0,
            author: String::new(),
            description: String::new(),
            record_count: 0,
            masters: Vec::new(),
            game_data: None,
            screenshot: None,
        }
    }
}

impl Header {
    /// Writes the header sub-records into the open `TES3` record.
    pub fn save<W: Write + Seek>(&self, w: &mut EsmWriter<W>) -> EsmResult<()> {
        if self.format_version > DEFAULT_FORMAT_VERSION {
            w.write_hnt(b"FORM", &self.format_version)?;
        }

        w.start_sub_record(b"HEDR")?;
        w.write_t(&self.version)?;
        w.write_t(&self.file_type)?;
        w.write_maybe_fixed_size_string(&self.author, AUTHOR_SIZE)?;
        w.write_maybe_fixed_size_string(&self.description, DESCRIPTION_SIZE)?;
        w.write_t(&self.record_count)?;
        w.end_record(b"HEDR")?;

        for master in &self.masters {
            w.write_hnc_string(b"MAST", &master.name)?;
            w.write_hnt(b"DATA", &master.size)?;
        }

        if let Some(game_data) = &self.game_data {
            w.write_hn_bytes(b"GMDT", game_data)?;
        }
        if let Some(screenshot) = &self.screenshot {
            w.write_hn_bytes(b"SCRS", screenshot)?;
        }
        Ok(())
    }

    /// Reads the header sub-records from the current `TES3` record.
    ///
    /// The reader's format version is updated as soon as `FORM` is read, so
    /// the version-dependent author and description fields decode correctly.
    pub fn load<R: Read + Seek>(&mut self, r: &mut EsmReader<R>) -> EsmResult<()> {
        self.format_version = r.get_hnot::<FormatVersion>(b"FORM")?.unwrap_or(DEFAULT_FORMAT_VERSION);
        if !defs::is_supported_format_version(self.format_version) {
            return Err(EsmError::UnsupportedFormatVersion {
                found: self.format_version,
                max: defs::CURRENT_SAVE_GAME_FORMAT_VERSION,
            });
        }
        r.set_format_version(self.format_version);

        r.get_sub_name_is(b"HEDR")?;
        r.get_sub_header()?;
        self.version = r.get_t()?;
        self.file_type = r.get_t()?;
        self.author = r.get_maybe_fixed_string_size(AUTHOR_SIZE)?;
        self.description = r.get_maybe_fixed_string_size(DESCRIPTION_SIZE)?;
        self.record_count = r.get_t()?;

        self.masters.clear();
        while r.is_next_sub(b"MAST")? {
            if self.masters.len() >= r.limits().max_masters {
                return Err(EsmError::LimitExceeded {
                    kind: LimitKind::Masters,
                    limit: r.limits().max_masters,
                    actual: self.masters.len() + 1,
                });
            }
            let name = r.get_h_string()?;
            let size = r.get_hnt::<u64>(b"DATA")?;
            self.masters.push(MasterData { name, size });
        }

        self.game_data = None;
        if r.is_next_sub(b"GMDT")? {
            self.game_data = Some(r.get_h_bytes()?);
        }
        self.screenshot = None;
        if r.is_next_sub(b"SCRS")? {
            self.screenshot = Some(r.get_h_bytes()?);
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_header_version_is_1_3() {
        let header = Header::default();
        assert_eq!(header.version.to_bits(), VER_13);
        assert_eq!(header.format_version, DEFAULT_FORMAT_VERSION);
        assert!(header.masters.is_empty());
    }

    #[test]
    fn version_constants_are_floats() {
        assert!((f32::from_bits(VER_12) - 1.2).abs() < 1e-6);
        assert!((f32::from_bits(VER_13) - 1.3).abs() < 1e-6);
    }
}
