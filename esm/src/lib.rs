//! Record-oriented reader and writer for ESM3 streams.
//!
//! An ESM stream is a `TES3` header record followed by top-level records.
//! Every record is a four-character tag, a size, a flags word, and a body of
//! tagged, sized sub-records. This crate provides [`EsmWriter`] and
//! [`EsmReader`] for producing and consuming that layout, plus the
//! version-dependent encodings of strings, reference ids and cell ids.
//!
//! # Design Principles
//!
//! - **One version switch** - Every encoding decision reads the header's
//!   format version; callers never branch on it for primitives.
//! - **Bounded reads** - Declared sizes are validated against the stream and
//!   [`ReaderLimits`] before allocating.
//! - **Explicit errors** - All failures return [`EsmError`], never panic.
//! - **Forward compatible** - Unread trailing bytes of a record are skipped.
//!
//! # Example
//!
//! ```
//! use std::io::Cursor;
//! use esm::{EsmReader, EsmWriter};
//!
//! let mut writer = EsmWriter::new();
//! writer.set_format_version(defs::CURRENT_SAVE_GAME_FORMAT_VERSION);
//! writer.set_author("me");
//! writer.save(Cursor::new(Vec::new())).unwrap();
//! writer.start_record(b"FAKE", 0).unwrap();
//! writer.write_hn_string(b"NAME", "hello").unwrap();
//! writer.end_record(b"FAKE").unwrap();
//! let bytes = writer.close().unwrap().into_inner();
//!
//! let mut reader = EsmReader::new();
//! reader.open(Cursor::new(bytes), "example").unwrap();
//! assert_eq!(reader.get_author(), "me");
//! assert_eq!(reader.get_rec_name().unwrap(), b"FAKE");
//! reader.get_rec_header().unwrap();
//! assert_eq!(reader.get_hn_string(b"NAME").unwrap(), "hello");
//! ```

mod cellid;
mod composite;
mod context;
mod error;
mod header;
mod limits;
mod reader;
mod record;
mod writer;

pub use cellid::{CellId, CellIndex, DEFAULT_WORLDSPACE};
pub use composite::{decode_padding, encode_padding, take_array, Composite};
pub use context::ReaderContext;
pub use error::{EsmError, EsmResult, LimitKind};
pub use header::{
    Header, MasterData, AUTHOR_SIZE, DESCRIPTION_SIZE, REC_TES3, VER_12, VER_13,
};
pub use limits::ReaderLimits;
pub use reader::EsmReader;
pub use record::Record;
pub use writer::{EsmWriter, RECORD_HEADER_SIZE, SREC_DELE, SUB_RECORD_HEADER_SIZE};
