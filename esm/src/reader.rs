//! Sequential ESM reader with record and sub-record cursors.

use std::io::{self, Read, Seek, SeekFrom};

use defs::{
    FormatVersion, RecName, RefId, RefIdType, MAX_LIMITED_SIZE_STRINGS_FORMAT_VERSION,
    MAX_STRING_REF_ID_FORMAT_VERSION, MAX_USE_ESM_CELL_ID_FORMAT_VERSION,
};
use encoding_rs::Encoding;

use crate::cellid::CellId;
use crate::composite::Composite;
use crate::context::ReaderContext;
use crate::error::{EsmError, EsmResult, LimitKind};
use crate::header::{Header, MasterData, REC_TES3};
use crate::limits::ReaderLimits;

/// Reads records and sub-records from a seekable stream.
///
/// The reader keeps three cursors: bytes left in the file after the
/// current record, bytes left in the current record, and bytes left in the
/// current sub-record. Requesting the next record discards whatever the
/// previous record's loader left unread, so newer writers may append
/// sub-records that older loaders never look at.
///
/// Strings must be valid UTF-8 unless a legacy encoding is set with
/// [`set_encoding`](Self::set_encoding); invalid bytes are an error, never
/// replaced.
#[derive(Debug)]
pub struct EsmReader<R> {
    stream: Option<R>,
    name: String,
    session: u64,
    header: Header,
    limits: ReaderLimits,
    encoding: Option<&'static Encoding>,
    file_size: u64,
    pos: u64,
    left_file: u64,
    left_rec: u64,
    left_sub: u64,
    rec_end: u64,
    rec_name: RecName,
    rec_flags: u32,
    sub_name: RecName,
    sub_cached: bool,
}

impl<R> Default for EsmReader<R> {
    fn default() -> Self {
        Self::with_limits(ReaderLimits::default())
    }
}

impl<R> EsmReader<R> {
    /// Creates an unopened reader enforcing `limits`.
    #[must_use]
    pub fn with_limits(limits: ReaderLimits) -> Self {
        Self {
            stream: None,
            name: String::new(),
            session: 0,
            header: Header::default(),
            limits,
            encoding: None,
            file_size: 0,
            pos: 0,
            left_file: 0,
            left_rec: 0,
            left_sub: 0,
            rec_end: 0,
            rec_name: RecName::default(),
            rec_flags: 0,
            sub_name: RecName::default(),
            sub_cached: false,
        }
    }
}

impl<R: Read + Seek> EsmReader<R> {
    /// Creates an unopened reader with default limits.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Binds `stream` and parses the `TES3` header.
    ///
    /// `name` labels the session in diagnostics and reader contexts.
    pub fn open(&mut self, mut stream: R, name: impl Into<String>) -> EsmResult<()> {
        let file_size = stream.seek(SeekFrom::End(0))?;
        stream.seek(SeekFrom::Start(0))?;

        self.stream = Some(stream);
        self.name = name.into();
        self.session += 1;
        self.header = Header::default();
        self.file_size = file_size;
        self.pos = 0;
        self.left_file = file_size;
        self.left_rec = 0;
        self.left_sub = 0;
        self.rec_end = 0;
        self.rec_flags = 0;
        self.sub_cached = false;

        let found = self.get_rec_name()?;
        if found != REC_TES3 {
            return Err(EsmError::InvalidSignature {
                expected: REC_TES3,
                found,
            });
        }
        self.get_rec_header()?;

        let mut header = Header::default();
        header.load(self)?;
        self.header = header;
        Ok(())
    }

    /// Sets the 8-bit encoding strings are decoded from, `None` for UTF-8.
    /// Applies to the next [`open`](Self::open) as well.
    pub fn set_encoding(&mut self, encoding: Option<&'static Encoding>) {
        self.encoding = encoding;
    }

    /// Decodes on-disk string bytes.
    pub fn decode(&self, bytes: &[u8]) -> EsmResult<String> {
        let Some(encoding) = self.encoding else {
            return String::from_utf8(bytes.to_vec()).map_err(|_| EsmError::InvalidEncoding {
                encoding: encoding_rs::UTF_8.name(),
            });
        };
        encoding
            .decode_without_bom_handling_and_without_replacement(bytes)
            .map(std::borrow::Cow::into_owned)
            .ok_or(EsmError::InvalidEncoding {
                encoding: encoding.name(),
            })
    }

    /// Releases the stream.
    pub fn close(&mut self) -> Option<R> {
        self.left_file = 0;
        self.left_rec = 0;
        self.left_sub = 0;
        self.sub_cached = false;
        self.stream.take()
    }

    #[must_use]
    pub fn get_name(&self) -> &str {
        &self.name
    }

    #[must_use]
    pub const fn header(&self) -> &Header {
        &self.header
    }

    #[must_use]
    pub fn get_author(&self) -> &str {
        &self.header.author
    }

    #[must_use]
    pub fn get_desc(&self) -> &str {
        &self.header.description
    }

    #[must_use]
    pub const fn get_ver(&self) -> f32 {
        self.header.version
    }

    #[must_use]
    pub const fn get_format_version(&self) -> FormatVersion {
        self.header.format_version
    }

    pub(crate) fn set_format_version(&mut self, version: FormatVersion) {
        self.header.format_version = version;
    }

    #[must_use]
    pub fn get_masters(&self) -> &[MasterData] {
        &self.header.masters
    }

    #[must_use]
    pub const fn get_record_count(&self) -> i32 {
        self.header.record_count
    }

    #[must_use]
    pub const fn limits(&self) -> &ReaderLimits {
        &self.limits
    }

    /// Absolute offset of the next byte to be read.
    #[must_use]
    pub const fn get_file_offset(&self) -> u64 {
        self.pos
    }

    #[must_use]
    pub const fn get_rec_flags(&self) -> u32 {
        self.rec_flags
    }

    /// Tag of the current top-level record.
    #[must_use]
    pub const fn rec_name(&self) -> RecName {
        self.rec_name
    }

    /// Tag of the most recently read sub-record.
    #[must_use]
    pub const fn sub_name(&self) -> RecName {
        self.sub_name
    }

    /// Unread bytes of the current sub-record payload.
    #[must_use]
    pub const fn left_sub(&self) -> u64 {
        self.left_sub
    }

    /// `true` if another top-level record follows the current one.
    #[must_use]
    pub const fn has_more_recs(&self) -> bool {
        self.left_file > 0
    }

    /// `true` if the current record has unread sub-records.
    #[must_use]
    pub const fn has_more_subs(&self) -> bool {
        self.sub_cached || self.left_rec > 0
    }

    fn stream(&mut self) -> EsmResult<&mut R> {
        self.stream.as_mut().ok_or(EsmError::NotOpen)
    }

    fn read_raw(&mut self, n: usize) -> EsmResult<Vec<u8>> {
        let available = self.file_size.saturating_sub(self.pos);
        if n as u64 > available {
            return Err(EsmError::Truncated {
                needed: n as u64,
                available,
            });
        }
        let mut buf = vec![0u8; n];
        match self.stream()?.read_exact(&mut buf) {
            Ok(()) => {}
            Err(err) if err.kind() == io::ErrorKind::UnexpectedEof => {
                return Err(EsmError::Truncated {
                    needed: n as u64,
                    available,
                })
            }
            Err(err) => return Err(err.into()),
        }
        self.pos += n as u64;
        Ok(buf)
    }

    fn read_raw_t<T: Composite>(&mut self) -> EsmResult<T> {
        let bytes = self.read_raw(T::SIZE)?;
        Ok(T::decode(&mut bytes.as_slice()))
    }

    fn seek_to(&mut self, pos: u64) -> EsmResult<()> {
        self.stream()?.seek(SeekFrom::Start(pos))?;
        self.pos = pos;
        Ok(())
    }

    /// Reads the tag of the next top-level record.
    ///
    /// Any part of the previous record that its loader did not consume is
    /// skipped first.
    pub fn get_rec_name(&mut self) -> EsmResult<RecName> {
        if self.pos < self.rec_end {
            tracing::debug!(
                file = %self.name,
                record = %self.rec_name,
                skipped = self.rec_end - self.pos,
                "skipping unread record bytes"
            );
            self.seek_to(self.rec_end)?;
        }
        self.left_rec = 0;
        self.left_sub = 0;
        self.sub_cached = false;

        if self.left_file < 4 {
            return Err(EsmError::Truncated {
                needed: 4,
                available: self.left_file,
            });
        }
        let name: [u8; 4] = self.read_raw_t()?;
        self.left_file -= 4;
        self.rec_name = RecName::new(name);
        Ok(self.rec_name)
    }

    /// Reads the size and flags of the current record and returns the flags.
    pub fn get_rec_header(&mut self) -> EsmResult<u32> {
        if self.left_file < 12 {
            return Err(EsmError::Truncated {
                needed: 12,
                available: self.left_file,
            });
        }
        let size: u32 = self.read_raw_t()?;
        let _unused: u32 = self.read_raw_t()?;
        let flags: u32 = self.read_raw_t()?;
        self.left_file -= 12;

        if size as usize > self.limits.max_record_bytes {
            return Err(EsmError::LimitExceeded {
                kind: LimitKind::RecordBytes,
                limit: self.limits.max_record_bytes,
                actual: size as usize,
            });
        }
        let size = u64::from(size);
        if size > self.left_file {
            return Err(EsmError::Truncated {
                needed: size,
                available: self.left_file,
            });
        }

        self.left_file -= size;
        self.left_rec = size;
        self.left_sub = 0;
        self.rec_end = self.pos + size;
        self.rec_flags = flags;
        self.sub_cached = false;
        tracing::trace!(file = %self.name, record = %self.rec_name, size, flags, "record header");
        Ok(flags)
    }

    /// Skips the rest of the current record.
    pub fn skip_record(&mut self) -> EsmResult<()> {
        if self.pos < self.rec_end {
            self.seek_to(self.rec_end)?;
        }
        self.left_rec = 0;
        self.left_sub = 0;
        self.sub_cached = false;
        Ok(())
    }

    /// Reads the next sub-record tag, or returns the cached one.
    pub fn get_sub_name(&mut self) -> EsmResult<RecName> {
        if self.sub_cached {
            self.sub_cached = false;
            return Ok(self.sub_name);
        }
        if self.left_sub > 0 {
            let skip = self.left_sub;
            self.seek_to(self.pos + skip)?;
            self.left_sub = 0;
        }
        if self.left_rec < 4 {
            return Err(EsmError::Truncated {
                needed: 4,
                available: self.left_rec,
            });
        }
        let name: [u8; 4] = self.read_raw_t()?;
        self.left_rec -= 4;
        self.sub_name = RecName::new(name);
        Ok(self.sub_name)
    }

    /// Pushes the last sub-record tag back so the next
    /// [`get_sub_name`](Self::get_sub_name) returns it again.
    pub fn cache_sub_name(&mut self) {
        self.sub_cached = true;
    }

    /// Reads the next sub-record tag and requires it to be `name`.
    pub fn get_sub_name_is(&mut self, name: impl Into<RecName>) -> EsmResult<()> {
        let name = name.into();
        let found = self.get_sub_name()?;
        if found != name {
            return Err(EsmError::UnexpectedTag {
                expected: Some(name),
                found,
                record: self.rec_name,
            });
        }
        Ok(())
    }

    /// Consumes the next sub-record tag if it is `name`.
    pub fn is_next_sub(&mut self, name: impl Into<RecName>) -> EsmResult<bool> {
        if !self.has_more_subs() {
            return Ok(false);
        }
        let found = self.get_sub_name()?;
        if found != name.into() {
            self.cache_sub_name();
            return Ok(false);
        }
        Ok(true)
    }

    /// Checks whether the next sub-record tag is `name` without consuming it.
    pub fn peek_next_sub(&mut self, name: impl Into<RecName>) -> EsmResult<bool> {
        if !self.has_more_subs() {
            return Ok(false);
        }
        let found = self.get_sub_name()?;
        self.cache_sub_name();
        Ok(found == name.into())
    }

    /// Reads the size of the current sub-record.
    pub fn get_sub_header(&mut self) -> EsmResult<usize> {
        if self.left_rec < 4 {
            return Err(EsmError::SubRecordOverflow {
                name: self.sub_name,
                size: 4,
                left: self.left_rec,
            });
        }
        let size: u32 = self.read_raw_t()?;
        self.left_rec -= 4;

        if size as usize > self.limits.max_sub_record_bytes {
            return Err(EsmError::LimitExceeded {
                kind: LimitKind::SubRecordBytes,
                limit: self.limits.max_sub_record_bytes,
                actual: size as usize,
            });
        }
        let size = u64::from(size);
        if size > self.left_rec {
            return Err(EsmError::SubRecordOverflow {
                name: self.sub_name,
                size,
                left: self.left_rec,
            });
        }
        self.left_rec -= size;
        self.left_sub = size;
        Ok(size as usize)
    }

    /// Skips the payload of the current sub-record.
    pub fn skip_h_sub(&mut self) -> EsmResult<()> {
        self.get_sub_header()?;
        let skip = self.left_sub;
        self.seek_to(self.pos + skip)?;
        self.left_sub = 0;
        Ok(())
    }

    /// Reads `n` bytes of the current sub-record payload.
    pub fn get_exact(&mut self, n: usize) -> EsmResult<Vec<u8>> {
        if n as u64 > self.left_sub {
            return Err(EsmError::SubRecordOverflow {
                name: self.sub_name,
                size: n as u64,
                left: self.left_sub,
            });
        }
        let bytes = self.read_raw(n)?;
        self.left_sub -= n as u64;
        Ok(bytes)
    }

    /// Reads the whole payload of the current sub-record after its header.
    pub fn get_h_bytes(&mut self) -> EsmResult<Vec<u8>> {
        let size = self.get_sub_header()?;
        self.get_exact(size)
    }

    /// Reads a fixed-width value from the current sub-record payload.
    pub fn get_t<T: Composite>(&mut self) -> EsmResult<T> {
        let bytes = self.get_exact(T::SIZE)?;
        Ok(T::decode(&mut bytes.as_slice()))
    }

    /// Reads a sub-record header and a value filling it exactly.
    pub fn get_ht<T: Composite>(&mut self) -> EsmResult<T> {
        let size = self.get_sub_header()?;
        if size != T::SIZE {
            return Err(EsmError::SizeMismatch {
                name: self.sub_name,
                expected: T::SIZE,
                actual: size,
            });
        }
        self.get_t()
    }

    /// Reads sub-record `name` holding a fixed-width value.
    pub fn get_hnt<T: Composite>(&mut self, name: impl Into<RecName>) -> EsmResult<T> {
        self.get_sub_name_is(name)?;
        self.get_ht()
    }

    /// Reads sub-record `name` if it comes next.
    pub fn get_hnot<T: Composite>(&mut self, name: impl Into<RecName>) -> EsmResult<Option<T>> {
        if self.is_next_sub(name)? {
            return self.get_ht().map(Some);
        }
        Ok(None)
    }

    /// Reads a fixed-width value straight from the record body.
    pub fn get_composite<T: Composite>(&mut self) -> EsmResult<T> {
        if T::SIZE as u64 > self.left_rec {
            return Err(EsmError::Truncated {
                needed: T::SIZE as u64,
                available: self.left_rec,
            });
        }
        let value = self.read_raw_t()?;
        self.left_rec -= T::SIZE as u64;
        Ok(value)
    }

    /// Reads `n` payload bytes as a string ending at the first NUL.
    pub fn get_string(&mut self, n: usize) -> EsmResult<String> {
        let bytes = self.get_exact(n)?;
        let len = bytes.iter().position(|&b| b == 0).unwrap_or(bytes.len());
        self.decode(&bytes[..len])
    }

    /// Reads the whole current sub-record as a string.
    ///
    /// A payload holding a single NUL, as older writers emit for empty
    /// strings, reads as `""`.
    pub fn get_h_string(&mut self) -> EsmResult<String> {
        let size = self.get_sub_header()?;
        self.get_string(size)
    }

    pub fn get_hn_string(&mut self, name: impl Into<RecName>) -> EsmResult<String> {
        self.get_sub_name_is(name)?;
        self.get_h_string()
    }

    /// Reads sub-record `name` as a string, `""` if it is absent.
    pub fn get_hno_string(&mut self, name: impl Into<RecName>) -> EsmResult<String> {
        if self.is_next_sub(name)? {
            return self.get_h_string();
        }
        Ok(String::new())
    }

    fn check_string_len(&self, len: usize) -> EsmResult<()> {
        if len > self.limits.max_string_bytes {
            return Err(EsmError::LimitExceeded {
                kind: LimitKind::StringBytes,
                limit: self.limits.max_string_bytes,
                actual: len,
            });
        }
        Ok(())
    }

    /// Reads a `u32` length followed by that many string bytes.
    pub fn get_sized_string(&mut self) -> EsmResult<String> {
        let len = self.get_t::<u32>()? as usize;
        self.check_string_len(len)?;
        let bytes = self.get_exact(len)?;
        self.decode(&bytes)
    }

    /// Reads a string written by `write_maybe_fixed_size_string`.
    pub fn get_maybe_fixed_string_size(&mut self, size: usize) -> EsmResult<String> {
        if self.get_format_version() <= MAX_LIMITED_SIZE_STRINGS_FORMAT_VERSION {
            self.get_string(size)
        } else {
            self.get_sized_string()
        }
    }

    /// Reads the binary form of a reference id.
    pub fn get_ref_id(&mut self) -> EsmResult<RefId> {
        let tag: u8 = self.get_t()?;
        let kind = RefIdType::from_u8(tag).ok_or(EsmError::InvalidRefIdType { tag })?;
        let id = match kind {
            RefIdType::Empty => RefId::Empty,
            RefIdType::SizedString => RefId::string_ref_id(self.get_sized_string()?),
            RefIdType::UnsizedString => {
                let len = self.left_sub as usize;
                self.check_string_len(len)?;
                RefId::string_ref_id(self.get_string(len)?)
            }
            RefIdType::FormId => {
                let index = self.get_t()?;
                let content_file = self.get_t()?;
                RefId::form_id(index, content_file)
            }
            RefIdType::Generated => RefId::generated(self.get_t()?),
            RefIdType::Index => {
                let record_type = RecName::from_int(self.get_t()?);
                RefId::index(record_type, self.get_t()?)
            }
            RefIdType::Esm3ExteriorCell => {
                let x = self.get_t()?;
                let y = self.get_t()?;
                RefId::esm3_exterior_cell(x, y)
            }
        };
        Ok(id)
    }

    /// Reads the current sub-record as a reference id.
    pub fn get_h_ref_id(&mut self) -> EsmResult<RefId> {
        let size = self.get_sub_header()?;
        if self.get_format_version() <= MAX_STRING_REF_ID_FORMAT_VERSION {
            return Ok(RefId::string_ref_id(self.get_string(size)?));
        }
        self.get_ref_id()
    }

    pub fn get_hn_ref_id(&mut self, name: impl Into<RecName>) -> EsmResult<RefId> {
        self.get_sub_name_is(name)?;
        self.get_h_ref_id()
    }

    /// Reads sub-record `name` as a reference id, empty if it is absent.
    pub fn get_hno_ref_id(&mut self, name: impl Into<RecName>) -> EsmResult<RefId> {
        if self.is_next_sub(name)? {
            return self.get_h_ref_id();
        }
        Ok(RefId::Empty)
    }

    /// Reads a reference id written by `write_maybe_fixed_size_ref_id`.
    pub fn get_maybe_fixed_ref_id_size(&mut self, size: usize) -> EsmResult<RefId> {
        if self.get_format_version() <= MAX_STRING_REF_ID_FORMAT_VERSION {
            return Ok(RefId::string_ref_id(self.get_maybe_fixed_string_size(size)?));
        }
        self.get_ref_id()
    }

    /// Reads a cell reference written by `write_cell_id`.
    pub fn get_cell_id(&mut self) -> EsmResult<RefId> {
        if self.get_format_version() <= MAX_USE_ESM_CELL_ID_FORMAT_VERSION {
            return Ok(CellId::load(self)?.to_ref_id());
        }
        self.get_hn_ref_id(b"NAME")
    }

    /// Captures the cursor state for a later [`restore_context`](Self::restore_context).
    #[must_use]
    pub fn get_context(&self) -> ReaderContext {
        ReaderContext {
            filename: self.name.clone(),
            session: self.session,
            file_pos: self.pos,
            left_file: self.left_file,
            left_rec: self.left_rec,
            left_sub: self.left_sub,
            rec_end: self.rec_end,
            rec_name: self.rec_name,
            rec_flags: self.rec_flags,
            sub_name: self.sub_name,
            sub_cached: self.sub_cached,
        }
    }

    /// Returns to a state captured by [`get_context`](Self::get_context).
    ///
    /// The context must come from the current session of this reader.
    pub fn restore_context(&mut self, ctx: &ReaderContext) -> EsmResult<()> {
        if self.stream.is_none() {
            return Err(EsmError::NotOpen);
        }
        if ctx.filename != self.name || ctx.session != self.session || ctx.file_pos > self.file_size
        {
            return Err(EsmError::StaleContext {
                expected: format!("{}#{}", self.name, self.session),
                found: format!("{}#{}", ctx.filename, ctx.session),
            });
        }
        self.seek_to(ctx.file_pos)?;
        self.left_file = ctx.left_file;
        self.left_rec = ctx.left_rec;
        self.left_sub = ctx.left_sub;
        self.rec_end = ctx.rec_end;
        self.rec_name = ctx.rec_name;
        self.rec_flags = ctx.rec_flags;
        self.sub_name = ctx.sub_name;
        self.sub_cached = ctx.sub_cached;
        Ok(())
    }
}
