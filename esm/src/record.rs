//! The interface shared by top-level record types.

use std::io::{Read, Seek, Write};

use defs::RecName;

use crate::error::EsmResult;
use crate::reader::EsmReader;
use crate::writer::EsmWriter;

/// A content record stored as one top-level ESM record.
///
/// `save` writes the sub-records of an already opened record and `load`
/// reads them back after the record header has been consumed. A deleted
/// record keeps only its id and the `DELE` marker.
pub trait Record: Default {
    /// Top-level tag of this record type.
    const REC_NAME: RecName;

    /// Writes the record body.
    fn save<W: Write + Seek>(&self, w: &mut EsmWriter<W>, deleted: bool) -> EsmResult<()>;

    /// Reads the record body, returning whether the record is deleted.
    fn load<R: Read + Seek>(&mut self, r: &mut EsmReader<R>) -> EsmResult<bool>;

    /// Flags written into the record header.
    fn record_flags(&self) -> u32 {
        0
    }

    /// Writes a complete record including its header.
    fn write_record<W: Write + Seek>(&self, w: &mut EsmWriter<W>, deleted: bool) -> EsmResult<()> {
        w.start_record(Self::REC_NAME, self.record_flags())?;
        self.save(w, deleted)?;
        w.end_record(Self::REC_NAME)
    }

    /// Reads a complete record whose name the caller has already matched.
    fn load_record<R: Read + Seek>(r: &mut EsmReader<R>) -> EsmResult<(Self, bool)> {
        r.get_rec_header()?;
        let mut record = Self::default();
        let deleted = record.load(r)?;
        Ok((record, deleted))
    }
}
