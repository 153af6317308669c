//! Compiled scripts with their variable tables and source text.

use std::io::{Read, Seek, Write};

use defs::{RecName, RefId};
use esm::{EsmError, EsmReader, EsmResult, EsmWriter, Record};

pub const REC_SCPT: RecName = RecName::new(*b"SCPT");

/// Width of a script id in fixed-size string versions.
pub const SCRIPT_ID_SIZE: usize = 32;

/// Counts and sizes from the `SCHD` header.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct ScriptData {
    pub num_shorts: u32,
    pub num_longs: u32,
    pub num_floats: u32,
    pub script_data_size: u32,
    /// Bytes of the NUL separated variable name table.
    pub string_table_size: u32,
}

impl ScriptData {
    /// Total number of local variables.
    #[must_use]
    pub const fn num_vars(&self) -> u32 {
        self.num_shorts + self.num_longs + self.num_floats
    }
}

/// A script (`SCPT`).
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Script {
    pub id: RefId,
    pub data: ScriptData,
    /// Local variable names: shorts, then longs, then floats.
    pub var_names: Vec<String>,
    /// Compiled bytecode.
    pub script_data: Vec<u8>,
    pub script_text: String,
    pub record_flags: u32,
}

impl Script {
    /// Resets to an empty script that still parses.
    pub fn blank(&mut self) {
        self.record_flags = 0;
        self.data = ScriptData::default();
        self.var_names.clear();
        self.script_data.clear();
        self.script_text = format!("Begin {}\n\nEnd {}\n", self.id, self.id);
    }

    fn load_var_names<R: Read + Seek>(&mut self, r: &mut EsmReader<R>) -> EsmResult<()> {
        let size = r.get_sub_header()?;
        if size != self.data.string_table_size as usize {
            tracing::warn!(
                script = %self.id,
                declared = self.data.string_table_size,
                actual = size,
                "script variable table size mismatch"
            );
        }
        let mut table = r.get_exact(size)?;
        // some editors separate names with carriage returns
        for byte in &mut table {
            if *byte == b'\r' {
                *byte = 0;
            }
        }

        let body = table.strip_suffix(&[0]).unwrap_or(&table);
        self.var_names = if body.is_empty() {
            Vec::new()
        } else {
            body.split(|&b| b == 0)
                .map(|name| r.decode(name))
                .collect::<EsmResult<_>>()?
        };

        let expected = self.data.num_vars() as usize;
        if self.var_names.len() != expected {
            tracing::warn!(
                script = %self.id,
                expected,
                actual = self.var_names.len(),
                "malformed script variable table"
            );
        }
        Ok(())
    }
}

impl Record for Script {
    const REC_NAME: RecName = REC_SCPT;

    fn record_flags(&self) -> u32 {
        self.record_flags
    }

    fn save<W: Write + Seek>(&self, w: &mut EsmWriter<W>, deleted: bool) -> EsmResult<()> {
        w.start_sub_record(b"SCHD")?;
        w.write_maybe_fixed_size_ref_id(&self.id, SCRIPT_ID_SIZE)?;
        w.write_t(&self.data.num_shorts)?;
        w.write_t(&self.data.num_longs)?;
        w.write_t(&self.data.num_floats)?;
        w.write_t(&self.data.script_data_size)?;
        w.write_t(&self.data.string_table_size)?;
        w.end_record(b"SCHD")?;

        if deleted {
            return w.write_deleted();
        }

        if !self.var_names.is_empty() {
            w.start_sub_record(b"SCVR")?;
            for name in &self.var_names {
                w.write_hcstring(name)?;
            }
            w.end_record(b"SCVR")?;
        }

        w.write_hn_bytes(b"SCDT", &self.script_data)?;
        w.write_hno_string(b"SCTX", &self.script_text)
    }

    fn load<R: Read + Seek>(&mut self, r: &mut EsmReader<R>) -> EsmResult<bool> {
        self.record_flags = r.get_rec_flags();
        self.var_names.clear();
        self.script_data.clear();
        self.script_text.clear();

        let mut deleted = false;
        let mut has_header = false;
        while r.has_more_subs() {
            let name = r.get_sub_name()?;
            match name.as_bytes() {
                b"SCHD" => {
                    r.get_sub_header()?;
                    self.id = r.get_maybe_fixed_ref_id_size(SCRIPT_ID_SIZE)?;
                    self.data.num_shorts = r.get_t()?;
                    self.data.num_longs = r.get_t()?;
                    self.data.num_floats = r.get_t()?;
                    self.data.script_data_size = r.get_t()?;
                    self.data.string_table_size = r.get_t()?;
                    has_header = true;
                }
                b"SCVR" => self.load_var_names(r)?,
                b"SCDT" => {
                    let size = r.get_sub_header()?;
                    if size != self.data.script_data_size as usize {
                        tracing::debug!(
                            script = %self.id,
                            declared = self.data.script_data_size,
                            actual = size,
                            "script data size mismatch"
                        );
                        self.data.script_data_size = size as u32;
                    }
                    self.script_data = r.get_exact(size)?;
                }
                b"SCTX" => self.script_text = r.get_h_string()?,
                b"DELE" => {
                    r.skip_h_sub()?;
                    deleted = true;
                }
                _ => {
                    return Err(EsmError::UnexpectedTag {
                        expected: None,
                        found: name,
                        record: REC_SCPT,
                    })
                }
            }
        }

        if !has_header {
            return Err(EsmError::MissingSubRecord {
                name: RecName::new(*b"SCHD"),
                record: REC_SCPT,
            });
        }
        Ok(deleted)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_util::{load_fake, save_fake};
    use defs::CURRENT_SAVE_GAME_FORMAT_VERSION;

    fn load_script(bytes: Vec<u8>) -> Script {
        load_fake(bytes, |r| {
            let mut result = Script::default();
            result.load(r)?;
            Ok(result)
        })
    }

    #[test]
    fn blank_text_names_script() {
        let mut script = Script {
            id: RefId::string_ref_id("Main"),
            ..Script::default()
        };
        script.blank();
        assert_eq!(script.script_text, "Begin Main\n\nEnd Main\n");
    }

    #[test]
    fn carriage_return_separates_names() {
        let bytes = save_fake(CURRENT_SAVE_GAME_FORMAT_VERSION, |w| {
            w.start_sub_record(b"SCHD")?;
            w.write_ref_id(&RefId::string_ref_id("s"))?;
            for value in [2u32, 0, 0, 0, 6] {
                w.write_t(&value)?;
            }
            w.end_record(b"SCHD")?;
            w.write_hn_bytes(b"SCVR", b"ab\rcd\0")
        });
        let script = load_script(bytes);
        assert_eq!(script.var_names, vec!["ab".to_string(), "cd".to_string()]);
    }

    #[test]
    fn data_size_follows_blob() {
        let bytes = save_fake(CURRENT_SAVE_GAME_FORMAT_VERSION, |w| {
            w.start_sub_record(b"SCHD")?;
            w.write_ref_id(&RefId::string_ref_id("s"))?;
            for value in [0u32, 0, 0, 99, 0] {
                w.write_t(&value)?;
            }
            w.end_record(b"SCHD")?;
            w.write_hn_bytes(b"SCDT", &[1, 2, 3])
        });
        let script = load_script(bytes);
        assert_eq!(script.data.script_data_size, 3);
        assert_eq!(script.script_data, vec![1, 2, 3]);
    }

    #[test]
    fn missing_header_is_error() {
        let bytes = save_fake(CURRENT_SAVE_GAME_FORMAT_VERSION, |w| {
            w.write_hn_string(b"SCTX", "Begin x")
        });
        let err = crate::test_util::try_load_fake(bytes, |r| Script::default().load(r)).unwrap_err();
        assert!(matches!(err, EsmError::MissingSubRecord { name, .. } if name == b"SCHD"));
    }

    #[test]
    fn deleted_script_keeps_header() {
        let record = Script {
            id: RefId::string_ref_id("gone"),
            data: ScriptData {
                num_shorts: 1,
                ..ScriptData::default()
            },
            ..Script::default()
        };
        let bytes = save_fake(CURRENT_SAVE_GAME_FORMAT_VERSION, |w| record.save(w, true));
        let (result, deleted) = load_fake(bytes, |r| {
            let mut result = Script::default();
            let deleted = result.load(r)?;
            Ok((result, deleted))
        });
        assert!(deleted);
        assert_eq!(result.id, record.id);
        assert_eq!(result.data.num_shorts, 1);
    }
}
