//! Sequential ESM writer with size backpatching.

use std::borrow::Cow;
use std::io::{Seek, SeekFrom, Write};

use defs::{
    FormatVersion, RecName, RefId, RefIdType, MAX_LIMITED_SIZE_STRINGS_FORMAT_VERSION,
    MAX_STRING_REF_ID_FORMAT_VERSION, MAX_USE_ESM_CELL_ID_FORMAT_VERSION,
};
use encoding_rs::Encoding;

use crate::cellid::CellId;
use crate::composite::Composite;
use crate::error::{EsmError, EsmResult};
use crate::header::{Header, MasterData, REC_TES3};

/// Tag of the deletion marker sub-record.
pub const SREC_DELE: RecName = RecName::new(*b"DELE");

/// Size of a top-level record header: name, size, unused, flags.
pub const RECORD_HEADER_SIZE: u64 = 16;

/// Size of a sub-record header: name, size.
pub const SUB_RECORD_HEADER_SIZE: u64 = 8;

#[derive(Debug, Clone, Copy)]
struct OpenRecord {
    name: RecName,
    size_pos: u64,
    body_start: u64,
}

/// Writes records and sub-records to a seekable stream.
///
/// Record and sub-record sizes are written as placeholders and patched when
/// the matching [`end_record`](Self::end_record) runs, so a record body must
/// be complete before it is closed. Version-dependent encodings follow the
/// header's format version. Strings are written as UTF-8 unless a legacy
/// encoding is set with [`set_encoding`](Self::set_encoding).
///
/// ```
/// use std::io::Cursor;
/// use esm::EsmWriter;
///
/// let mut writer = EsmWriter::new();
/// writer.set_format_version(defs::CURRENT_SAVE_GAME_FORMAT_VERSION);
/// writer.save(Cursor::new(Vec::new())).unwrap();
/// writer.start_record(b"FAKE", 0).unwrap();
/// writer.write_hnt(b"DATA", &42u32).unwrap();
/// writer.end_record(b"FAKE").unwrap();
/// let bytes = writer.close().unwrap().into_inner();
/// assert!(bytes.starts_with(b"TES3"));
/// ```
#[derive(Debug)]
pub struct EsmWriter<W> {
    stream: Option<W>,
    header: Header,
    records: Vec<OpenRecord>,
    records_written: usize,
    encoding: Option<&'static Encoding>,
}

impl<W> Default for EsmWriter<W> {
    fn default() -> Self {
        Self {
            stream: None,
            header: Header::default(),
            records: Vec::new(),
            records_written: 0,
            encoding: None,
        }
    }
}

impl<W: Write + Seek> EsmWriter<W> {
    /// Creates an unbound writer with a default header.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set_format_version(&mut self, version: FormatVersion) {
        self.header.format_version = version;
    }

    /// Sets the 8-bit encoding used for strings, `None` for UTF-8.
    pub fn set_encoding(&mut self, encoding: Option<&'static Encoding>) {
        self.encoding = encoding;
    }

    #[must_use]
    pub const fn format_version(&self) -> FormatVersion {
        self.header.format_version
    }

    /// Sets the `HEDR` version float.
    pub fn set_version(&mut self, version: f32) {
        self.header.version = version;
    }

    pub fn set_type(&mut self, file_type: i32) {
        self.header.file_type = file_type;
    }

    pub fn set_author(&mut self, author: impl Into<String>) {
        self.header.author = author.into();
    }

    pub fn set_description(&mut self, description: impl Into<String>) {
        self.header.description = description.into();
    }

    pub fn set_record_count(&mut self, count: i32) {
        self.header.record_count = count;
    }

    pub fn add_master(&mut self, name: impl Into<String>, size: u64) {
        self.header.masters.push(MasterData {
            name: name.into(),
            size,
        });
    }

    pub fn clear_masters(&mut self) {
        self.header.masters.clear();
    }

    pub fn set_game_data(&mut self, game_data: Option<Vec<u8>>) {
        self.header.game_data = game_data;
    }

    pub fn set_screenshot(&mut self, screenshot: Option<Vec<u8>>) {
        self.header.screenshot = screenshot;
    }

    #[must_use]
    pub const fn header(&self) -> &Header {
        &self.header
    }

    /// Number of top-level records started since [`save`](Self::save),
    /// excluding the header record.
    #[must_use]
    pub const fn records_written(&self) -> usize {
        self.records_written
    }

    /// Binds `stream` and writes the `TES3` header record.
    pub fn save(&mut self, stream: W) -> EsmResult<()> {
        self.stream = Some(stream);
        self.records.clear();

        let header = self.header.clone();
        self.start_record(REC_TES3, 0)?;
        header.save(self)?;
        self.end_record(REC_TES3)?;

        self.records_written = 0;
        Ok(())
    }

    /// Flushes and releases the stream.
    pub fn close(&mut self) -> EsmResult<W> {
        if !self.records.is_empty() {
            return Err(EsmError::RecordsStillOpen {
                count: self.records.len(),
            });
        }
        let mut stream = self.stream.take().ok_or(EsmError::NotOpen)?;
        stream.flush()?;
        Ok(stream)
    }

    fn stream(&mut self) -> EsmResult<&mut W> {
        self.stream.as_mut().ok_or(EsmError::NotOpen)
    }

    fn position(&mut self) -> EsmResult<u64> {
        Ok(self.stream()?.stream_position()?)
    }

    /// Writes raw bytes.
    pub fn write(&mut self, bytes: &[u8]) -> EsmResult<()> {
        self.stream()?.write_all(bytes)?;
        Ok(())
    }

    /// Opens a top-level record.
    pub fn start_record(&mut self, name: impl Into<RecName>, flags: u32) -> EsmResult<()> {
        let name = name.into();
        let start = self.position()?;
        self.write(name.as_bytes())?;
        self.write(&0u32.to_le_bytes())?;
        self.write(&0u32.to_le_bytes())?;
        self.write(&flags.to_le_bytes())?;

        if self.records.is_empty() {
            self.records_written += 1;
        }
        self.records.push(OpenRecord {
            name,
            size_pos: start + 4,
            body_start: start + RECORD_HEADER_SIZE,
        });
        Ok(())
    }

    /// Opens a sub-record inside the current record.
    pub fn start_sub_record(&mut self, name: impl Into<RecName>) -> EsmResult<()> {
        let name = name.into();
        let start = self.position()?;
        self.write(name.as_bytes())?;
        self.write(&0u32.to_le_bytes())?;
        self.records.push(OpenRecord {
            name,
            size_pos: start + 4,
            body_start: start + SUB_RECORD_HEADER_SIZE,
        });
        Ok(())
    }

    /// Closes the innermost open record or sub-record and patches its size.
    pub fn end_record(&mut self, name: impl Into<RecName>) -> EsmResult<()> {
        let name = name.into();
        let open = match self.records.last() {
            None => return Err(EsmError::NoOpenRecord { found: name }),
            Some(open) if open.name != name => {
                return Err(EsmError::RecordNesting {
                    expected: open.name,
                    found: name,
                })
            }
            Some(open) => *open,
        };

        let end = self.position()?;
        let size = end - open.body_start;
        let size = u32::try_from(size).map_err(|_| EsmError::InvalidValue {
            what: "record size",
            value: size as i64,
        })?;

        let stream = self.stream()?;
        stream.seek(SeekFrom::Start(open.size_pos))?;
        stream.write_all(&size.to_le_bytes())?;
        stream.seek(SeekFrom::Start(end))?;

        self.records.pop();
        tracing::trace!(record = %name, size, "closed record");
        Ok(())
    }

    /// Writes a fixed-width value without a sub-record header.
    pub fn write_t<T: Composite>(&mut self, value: &T) -> EsmResult<()> {
        let mut buf = Vec::with_capacity(T::SIZE);
        value.encode(&mut buf);
        self.write(&buf)
    }

    /// Writes a fixed-width value straight into the record body.
    pub fn write_composite<T: Composite>(&mut self, value: &T) -> EsmResult<()> {
        self.write_t(value)
    }

    /// Writes a fixed-width value as sub-record `name`.
    pub fn write_hnt<T: Composite>(&mut self, name: impl Into<RecName>, value: &T) -> EsmResult<()> {
        let name = name.into();
        self.start_sub_record(name)?;
        self.write_t(value)?;
        self.end_record(name)
    }

    /// Writes `bytes` as sub-record `name`.
    pub fn write_hn_bytes(&mut self, name: impl Into<RecName>, bytes: &[u8]) -> EsmResult<()> {
        let name = name.into();
        self.start_sub_record(name)?;
        self.write(bytes)?;
        self.end_record(name)
    }

    /// Converts `value` to the bytes stored on disk.
    pub fn encode<'a>(&self, value: &'a str) -> EsmResult<Cow<'a, [u8]>> {
        let Some(encoding) = self.encoding else {
            return Ok(Cow::Borrowed(value.as_bytes()));
        };
        let (bytes, _, unmappable) = encoding.encode(value);
        if unmappable {
            return Err(EsmError::InvalidEncoding {
                encoding: encoding.name(),
            });
        }
        Ok(bytes)
    }

    /// Writes string bytes; an empty string is written as a single NUL.
    pub fn write_hstring(&mut self, value: &str) -> EsmResult<()> {
        if value.is_empty() {
            return self.write(b"\0");
        }
        let bytes = self.encode(value)?;
        self.write(&bytes)
    }

    /// Writes string bytes followed by a terminating NUL.
    pub fn write_hcstring(&mut self, value: &str) -> EsmResult<()> {
        self.write_hstring(value)?;
        if !value.is_empty() && !value.ends_with('\0') {
            self.write(b"\0")?;
        }
        Ok(())
    }

    pub fn write_hn_string(&mut self, name: impl Into<RecName>, value: &str) -> EsmResult<()> {
        let name = name.into();
        self.start_sub_record(name)?;
        self.write_hstring(value)?;
        self.end_record(name)
    }

    /// Writes `value` as sub-record `name`, NUL padded to `size` bytes.
    pub fn write_hn_string_fixed(
        &mut self,
        name: impl Into<RecName>,
        value: &str,
        size: usize,
    ) -> EsmResult<()> {
        let len = self.encode(value)?.len();
        if len > size {
            return Err(EsmError::StringTooLong { len, max: size });
        }
        let name = name.into();
        self.start_sub_record(name)?;
        self.write_hstring(value)?;
        self.write(&vec![0u8; size - len])?;
        self.end_record(name)
    }

    pub fn write_hnc_string(&mut self, name: impl Into<RecName>, value: &str) -> EsmResult<()> {
        let name = name.into();
        self.start_sub_record(name)?;
        self.write_hcstring(value)?;
        self.end_record(name)
    }

    /// Writes `value` as sub-record `name` unless it is empty.
    pub fn write_hno_string(&mut self, name: impl Into<RecName>, value: &str) -> EsmResult<()> {
        if value.is_empty() {
            return Ok(());
        }
        self.write_hn_string(name, value)
    }

    /// Writes `value` NUL terminated as sub-record `name` unless it is empty.
    pub fn write_hnoc_string(&mut self, name: impl Into<RecName>, value: &str) -> EsmResult<()> {
        if value.is_empty() {
            return Ok(());
        }
        self.write_hnc_string(name, value)
    }

    /// Writes exactly `size` bytes: `value` followed by NUL padding.
    pub fn write_fixed_size_string(&mut self, value: &str, size: usize) -> EsmResult<()> {
        let bytes = self.encode(value)?;
        if bytes.len() > size {
            return Err(EsmError::StringTooLong {
                len: bytes.len(),
                max: size,
            });
        }
        self.write(&bytes)?;
        self.write(&vec![0u8; size - bytes.len()])
    }

    /// Writes a `u32` length followed by the string bytes.
    pub fn write_sized_string(&mut self, value: &str) -> EsmResult<()> {
        let bytes = self.encode(value)?;
        let len = u32::try_from(bytes.len()).map_err(|_| EsmError::InvalidValue {
            what: "string length",
            value: bytes.len() as i64,
        })?;
        self.write_t(&len)?;
        self.write(&bytes)
    }

    /// Writes a fixed-width string in limited-size versions, a sized string
    /// otherwise.
    pub fn write_maybe_fixed_size_string(&mut self, value: &str, size: usize) -> EsmResult<()> {
        if self.format_version() <= MAX_LIMITED_SIZE_STRINGS_FORMAT_VERSION {
            self.write_fixed_size_string(value, size)
        } else {
            self.write_sized_string(value)
        }
    }

    fn legacy_ref_id<'a>(&self, id: &'a RefId) -> EsmResult<&'a str> {
        id.as_str().ok_or(EsmError::NonStringRefId {
            version: self.format_version(),
        })
    }

    const fn uses_string_ref_ids(&self) -> bool {
        self.format_version() <= MAX_STRING_REF_ID_FORMAT_VERSION
    }

    /// Writes the binary form of `id`: a type tag and its payload.
    pub fn write_ref_id(&mut self, id: &RefId) -> EsmResult<()> {
        match id {
            RefId::String(value) if !value.is_empty() => {
                self.write_t(&RefIdType::SizedString.as_u8())?;
                self.write_sized_string(value)
            }
            RefId::FormId {
                index,
                content_file,
            } => {
                self.write_t(&RefIdType::FormId.as_u8())?;
                self.write_t(index)?;
                self.write_t(content_file)
            }
            RefId::Generated(value) => {
                self.write_t(&RefIdType::Generated.as_u8())?;
                self.write_t(value)
            }
            RefId::Index { record_type, value } => {
                self.write_t(&RefIdType::Index.as_u8())?;
                self.write_t(&record_type.to_int())?;
                self.write_t(value)
            }
            RefId::Esm3ExteriorCell { x, y } => {
                self.write_t(&RefIdType::Esm3ExteriorCell.as_u8())?;
                self.write_t(x)?;
                self.write_t(y)
            }
            RefId::Empty | RefId::String(_) => self.write_t(&RefIdType::Empty.as_u8()),
        }
    }

    /// Writes `id` as the whole payload of sub-record `name`.
    pub fn write_hn_ref_id(&mut self, name: impl Into<RecName>, id: &RefId) -> EsmResult<()> {
        if self.uses_string_ref_ids() {
            let value = self.legacy_ref_id(id)?;
            return self.write_hn_string(name, value);
        }
        let name = name.into();
        self.start_sub_record(name)?;
        self.write_ref_id(id)?;
        self.end_record(name)
    }

    /// Like [`write_hn_ref_id`](Self::write_hn_ref_id), NUL terminated in
    /// string versions.
    pub fn write_hnc_ref_id(&mut self, name: impl Into<RecName>, id: &RefId) -> EsmResult<()> {
        if self.uses_string_ref_ids() {
            let value = self.legacy_ref_id(id)?;
            return self.write_hnc_string(name, value);
        }
        self.write_hn_ref_id(name, id)
    }

    pub fn write_hno_ref_id(&mut self, name: impl Into<RecName>, id: &RefId) -> EsmResult<()> {
        if id.is_empty() {
            return Ok(());
        }
        self.write_hn_ref_id(name, id)
    }

    pub fn write_hnoc_ref_id(&mut self, name: impl Into<RecName>, id: &RefId) -> EsmResult<()> {
        if id.is_empty() {
            return Ok(());
        }
        self.write_hnc_ref_id(name, id)
    }

    /// Writes `id` inside the current sub-record: a string of at most
    /// `size` bytes in string versions, the binary form otherwise.
    pub fn write_maybe_fixed_size_ref_id(&mut self, id: &RefId, size: usize) -> EsmResult<()> {
        if !self.uses_string_ref_ids() {
            return self.write_ref_id(id);
        }
        let value = self.legacy_ref_id(id)?;
        let len = self.encode(value)?.len();
        if self.format_version() <= MAX_LIMITED_SIZE_STRINGS_FORMAT_VERSION && len > size {
            return Err(EsmError::RefIdTooLongForFormat {
                len,
                max: size,
                version: self.format_version(),
            });
        }
        self.write_maybe_fixed_size_string(value, size)
    }

    /// Writes a cell reference: `SPAC`/`CIDX` in old versions, a `NAME`
    /// reference id otherwise.
    pub fn write_cell_id(&mut self, id: &RefId) -> EsmResult<()> {
        if self.format_version() <= MAX_USE_ESM_CELL_ID_FORMAT_VERSION {
            return CellId::from_ref_id(id).save(self);
        }
        self.write_hn_ref_id(b"NAME", id)
    }

    /// Writes the deletion marker sub-record.
    pub fn write_deleted(&mut self) -> EsmResult<()> {
        self.write_hn_string_fixed(SREC_DELE, "", 3)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use defs::CURRENT_SAVE_GAME_FORMAT_VERSION;
    use std::io::Cursor;

    fn open_writer(version: FormatVersion) -> EsmWriter<Cursor<Vec<u8>>> {
        let mut writer = EsmWriter::new();
        writer.set_format_version(version);
        writer.save(Cursor::new(Vec::new())).unwrap();
        writer
    }

    fn body(writer: &mut EsmWriter<Cursor<Vec<u8>>>) -> Vec<u8> {
        let header_len = {
            let bytes = writer.stream.as_ref().unwrap().get_ref();
            let size = u32::from_le_bytes(bytes[4..8].try_into().unwrap());
            RECORD_HEADER_SIZE as usize + size as usize
        };
        writer.close().unwrap().into_inner()[header_len..].to_vec()
    }

    #[test]
    fn primitives_require_open_stream() {
        let mut writer: EsmWriter<Cursor<Vec<u8>>> = EsmWriter::new();
        assert!(matches!(writer.write_t(&1u32), Err(EsmError::NotOpen)));
        assert!(matches!(writer.close(), Err(EsmError::NotOpen)));
    }

    #[test]
    fn header_record_comes_first() {
        let mut writer = open_writer(CURRENT_SAVE_GAME_FORMAT_VERSION);
        let bytes = writer.close().unwrap().into_inner();
        assert_eq!(&bytes[0..4], b"TES3");
        let size = u32::from_le_bytes(bytes[4..8].try_into().unwrap()) as usize;
        assert_eq!(bytes.len(), RECORD_HEADER_SIZE as usize + size);
        assert_eq!(&bytes[16..20], b"FORM");
    }

    #[test]
    fn default_version_omits_form() {
        let mut writer = open_writer(defs::DEFAULT_FORMAT_VERSION);
        let bytes = writer.close().unwrap().into_inner();
        assert_eq!(&bytes[16..20], b"HEDR");
    }

    #[test]
    fn end_record_backpatches_size() {
        let mut writer = open_writer(CURRENT_SAVE_GAME_FORMAT_VERSION);
        writer.start_record(b"FAKE", 0x20).unwrap();
        writer.write_hnt(b"DATA", &7u32).unwrap();
        writer.end_record(b"FAKE").unwrap();
        let bytes = body(&mut writer);

        assert_eq!(&bytes[0..4], b"FAKE");
        assert_eq!(u32::from_le_bytes(bytes[4..8].try_into().unwrap()), 12);
        assert_eq!(u32::from_le_bytes(bytes[8..12].try_into().unwrap()), 0);
        assert_eq!(u32::from_le_bytes(bytes[12..16].try_into().unwrap()), 0x20);
        assert_eq!(&bytes[16..20], b"DATA");
        assert_eq!(u32::from_le_bytes(bytes[20..24].try_into().unwrap()), 4);
        assert_eq!(u32::from_le_bytes(bytes[24..28].try_into().unwrap()), 7);
    }

    #[test]
    fn end_record_tag_mismatch() {
        let mut writer = open_writer(CURRENT_SAVE_GAME_FORMAT_VERSION);
        writer.start_record(b"FAKE", 0).unwrap();
        writer.start_sub_record(b"SNAM").unwrap();
        let err = writer.end_record(b"FAKE").unwrap_err();
        assert!(matches!(
            err,
            EsmError::RecordNesting { expected, found }
                if expected == b"SNAM" && found == b"FAKE"
        ));
    }

    #[test]
    fn end_record_without_open_record() {
        let mut writer = open_writer(CURRENT_SAVE_GAME_FORMAT_VERSION);
        let err = writer.end_record(b"FAKE").unwrap_err();
        assert!(matches!(err, EsmError::NoOpenRecord { found } if found == b"FAKE"));
    }

    #[test]
    fn close_with_open_record_fails() {
        let mut writer = open_writer(CURRENT_SAVE_GAME_FORMAT_VERSION);
        writer.start_record(b"FAKE", 0).unwrap();
        assert!(matches!(
            writer.close(),
            Err(EsmError::RecordsStillOpen { count: 1 })
        ));
    }

    #[test]
    fn records_written_counts_top_level_only() {
        let mut writer = open_writer(CURRENT_SAVE_GAME_FORMAT_VERSION);
        for _ in 0..3 {
            writer.start_record(b"FAKE", 0).unwrap();
            writer.write_hnt(b"DATA", &1u8).unwrap();
            writer.end_record(b"FAKE").unwrap();
        }
        assert_eq!(writer.records_written(), 3);
    }

    #[test]
    fn deleted_marker_is_four_zero_bytes() {
        let mut writer = open_writer(CURRENT_SAVE_GAME_FORMAT_VERSION);
        writer.start_record(b"FAKE", 0).unwrap();
        writer.write_deleted().unwrap();
        writer.end_record(b"FAKE").unwrap();
        let bytes = body(&mut writer);
        assert_eq!(&bytes[16..20], b"DELE");
        assert_eq!(u32::from_le_bytes(bytes[20..24].try_into().unwrap()), 4);
        assert_eq!(&bytes[24..28], &[0, 0, 0, 0]);
    }

    #[test]
    fn hstring_forms() {
        let mut writer = open_writer(CURRENT_SAVE_GAME_FORMAT_VERSION);
        writer.start_record(b"FAKE", 0).unwrap();
        writer.write_hn_string(b"AAAA", "").unwrap();
        writer.write_hnc_string(b"BBBB", "ab").unwrap();
        writer.write_hno_string(b"CCCC", "").unwrap();
        writer.end_record(b"FAKE").unwrap();
        let bytes = body(&mut writer);

        assert_eq!(&bytes[16..20], b"AAAA");
        assert_eq!(&bytes[20..25], &[1, 0, 0, 0, 0]);
        assert_eq!(&bytes[25..29], b"BBBB");
        assert_eq!(&bytes[29..33], &[3, 0, 0, 0]);
        assert_eq!(&bytes[33..36], b"ab\0");
        assert_eq!(bytes.len(), 36);
    }

    #[test]
    fn fixed_size_string_pads_and_rejects_overflow() {
        let mut writer = open_writer(defs::MAX_LIMITED_SIZE_STRINGS_FORMAT_VERSION);
        writer.start_record(b"FAKE", 0).unwrap();
        writer.start_sub_record(b"DATA").unwrap();
        writer.write_maybe_fixed_size_string("abc", 8).unwrap();
        assert!(matches!(
            writer.write_fixed_size_string("too long", 4),
            Err(EsmError::StringTooLong { len: 8, max: 4 })
        ));
        writer.end_record(b"DATA").unwrap();
        writer.end_record(b"FAKE").unwrap();
        let bytes = body(&mut writer);
        assert_eq!(&bytes[24..32], b"abc\0\0\0\0\0");
    }

    #[test]
    fn maybe_fixed_ref_id_rejects_long_legacy_ids() {
        let mut writer = open_writer(defs::MAX_LIMITED_SIZE_STRINGS_FORMAT_VERSION);
        writer.start_record(b"FAKE", 0).unwrap();
        writer.start_sub_record(b"NPCO").unwrap();
        let id = RefId::string_ref_id("x".repeat(33));
        let err = writer.write_maybe_fixed_size_ref_id(&id, 32).unwrap_err();
        assert!(matches!(
            err,
            EsmError::RefIdTooLongForFormat {
                len: 33,
                max: 32,
                version: 22
            }
        ));
    }

    #[test]
    fn maybe_fixed_ref_id_is_sized_string_at_string_ref_id_version() {
        let mut writer = open_writer(MAX_STRING_REF_ID_FORMAT_VERSION);
        writer.start_record(b"FAKE", 0).unwrap();
        writer.start_sub_record(b"NPCO").unwrap();
        let id = RefId::string_ref_id("x".repeat(33));
        writer.write_maybe_fixed_size_ref_id(&id, 32).unwrap();
        writer.end_record(b"NPCO").unwrap();
        writer.end_record(b"FAKE").unwrap();
        let bytes = body(&mut writer);
        assert_eq!(u32::from_le_bytes(bytes[20..24].try_into().unwrap()), 37);
        assert_eq!(u32::from_le_bytes(bytes[24..28].try_into().unwrap()), 33);
    }

    #[test]
    fn structured_ref_id_rejected_in_string_versions() {
        let mut writer = open_writer(MAX_STRING_REF_ID_FORMAT_VERSION);
        writer.start_record(b"FAKE", 0).unwrap();
        let err = writer
            .write_hn_ref_id(b"NAME", &RefId::generated(1))
            .unwrap_err();
        assert!(matches!(err, EsmError::NonStringRefId { version: 23 }));
    }

    #[test]
    fn binary_ref_id_layout() {
        let mut writer = open_writer(CURRENT_SAVE_GAME_FORMAT_VERSION);
        writer.start_record(b"FAKE", 0).unwrap();
        writer
            .write_hn_ref_id(b"NAME", &RefId::esm3_exterior_cell(-1, 2))
            .unwrap();
        writer.end_record(b"FAKE").unwrap();
        let bytes = body(&mut writer);
        assert_eq!(u32::from_le_bytes(bytes[20..24].try_into().unwrap()), 9);
        assert_eq!(bytes[24], RefIdType::Esm3ExteriorCell.as_u8());
        assert_eq!(i32::from_le_bytes(bytes[25..29].try_into().unwrap()), -1);
        assert_eq!(i32::from_le_bytes(bytes[29..33].try_into().unwrap()), 2);
    }

    #[test]
    fn optional_ref_id_skips_empty() {
        let mut writer = open_writer(CURRENT_SAVE_GAME_FORMAT_VERSION);
        writer.start_record(b"FAKE", 0).unwrap();
        writer.write_hno_ref_id(b"SCRI", &RefId::Empty).unwrap();
        writer.write_hnoc_ref_id(b"SCRI", &RefId::Empty).unwrap();
        writer.end_record(b"FAKE").unwrap();
        assert_eq!(body(&mut writer).len(), 16);
    }
}
