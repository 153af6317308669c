//! Error types for ESM reading and writing.

use std::fmt;
use std::io;

use defs::{FormatVersion, RecName};

/// Result type for ESM operations.
pub type EsmResult<T> = Result<T, EsmError>;

/// Errors raised by [`EsmWriter`](crate::EsmWriter) and
/// [`EsmReader`](crate::EsmReader).
///
/// Every error is fatal to the session: the stream position is unspecified
/// afterwards and the reader or writer should be discarded.
#[derive(Debug)]
#[non_exhaustive]
pub enum EsmError {
    /// Underlying stream failure.
    Io(io::Error),

    /// The stream does not start with the expected record.
    InvalidSignature { expected: RecName, found: RecName },

    /// The header declares a format version newer than this implementation.
    UnsupportedFormatVersion {
        found: FormatVersion,
        max: FormatVersion,
    },

    /// A declared size runs past the end of the stream.
    Truncated { needed: u64, available: u64 },

    /// A sub-record runs past the end of its record.
    SubRecordOverflow { name: RecName, size: u64, left: u64 },

    /// A fixed-width sub-record has the wrong size.
    SizeMismatch {
        name: RecName,
        expected: usize,
        actual: usize,
    },

    /// A sub-record tag is not valid at this point.
    UnexpectedTag {
        expected: Option<RecName>,
        found: RecName,
        record: RecName,
    },

    /// A required sub-record is absent.
    MissingSubRecord { name: RecName, record: RecName },

    /// `end_record` named a record other than the innermost open one.
    RecordNesting { expected: RecName, found: RecName },

    /// `end_record` was called with no record open.
    NoOpenRecord { found: RecName },

    /// `close` was called while records were still open.
    RecordsStillOpen { count: usize },

    /// A primitive was used before a stream was bound.
    NotOpen,

    /// A string does not fit its fixed-width field.
    StringTooLong { len: usize, max: usize },

    /// A reference id does not fit the fixed-width field of this version.
    RefIdTooLongForFormat {
        len: usize,
        max: usize,
        version: FormatVersion,
    },

    /// A structured reference id cannot be stored in a string-only version.
    NonStringRefId { version: FormatVersion },

    /// Unknown binary reference id tag.
    InvalidRefIdType { tag: u8 },

    /// String bytes are not valid in the session's text encoding, or a
    /// string has characters that encoding cannot represent.
    InvalidEncoding { encoding: &'static str },

    /// A field holds a value its encoding cannot represent.
    InvalidValue { what: &'static str, value: i64 },

    /// A reader context was captured from a different session.
    StaleContext { expected: String, found: String },

    /// A configured limit was exceeded.
    LimitExceeded {
        kind: LimitKind,
        limit: usize,
        actual: usize,
    },
}

/// Reader limits that can be exceeded.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LimitKind {
    RecordBytes,
    SubRecordBytes,
    StringBytes,
    Masters,
}

impl fmt::Display for EsmError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Io(err) => write!(f, "i/o error: {err}"),
            Self::InvalidSignature { expected, found } => {
                write!(f, "invalid signature: expected {expected}, found {found}")
            }
            Self::UnsupportedFormatVersion { found, max } => {
                write!(f, "unsupported format version {found} (newest supported is {max})")
            }
            Self::Truncated { needed, available } => {
                write!(f, "truncated stream: need {needed} bytes, have {available}")
            }
            Self::SubRecordOverflow { name, size, left } => {
                write!(
                    f,
                    "sub-record {name} of {size} bytes overflows record with {left} bytes left"
                )
            }
            Self::SizeMismatch {
                name,
                expected,
                actual,
            } => {
                write!(
                    f,
                    "sub-record {name} has {actual} bytes, expected {expected}"
                )
            }
            Self::UnexpectedTag {
                expected: Some(expected),
                found,
                record,
            } => {
                write!(f, "expected sub-record {expected} in {record}, found {found}")
            }
            Self::UnexpectedTag {
                expected: None,
                found,
                record,
            } => {
                write!(f, "unknown sub-record {found} in {record}")
            }
            Self::MissingSubRecord { name, record } => {
                write!(f, "missing sub-record {name} in {record}")
            }
            Self::RecordNesting { expected, found } => {
                write!(f, "cannot end record {found}: innermost open record is {expected}")
            }
            Self::NoOpenRecord { found } => {
                write!(f, "cannot end record {found}: no record is open")
            }
            Self::RecordsStillOpen { count } => {
                write!(f, "{count} record(s) still open at close")
            }
            Self::NotOpen => write!(f, "no stream is open"),
            Self::StringTooLong { len, max } => {
                write!(f, "string of {len} bytes exceeds fixed width {max}")
            }
            Self::RefIdTooLongForFormat { len, max, version } => {
                write!(
                    f,
                    "reference id of {len} bytes exceeds {max} bytes allowed by format version {version}"
                )
            }
            Self::NonStringRefId { version } => {
                write!(
                    f,
                    "format version {version} can only store string reference ids"
                )
            }
            Self::InvalidRefIdType { tag } => write!(f, "invalid reference id type: {tag}"),
            Self::InvalidEncoding { encoding } => {
                write!(f, "string is not representable as {encoding}")
            }
            Self::InvalidValue { what, value } => write!(f, "invalid {what}: {value}"),
            Self::StaleContext { expected, found } => {
                write!(
                    f,
                    "stale reader context: session {found} does not match {expected}"
                )
            }
            Self::LimitExceeded {
                kind,
                limit,
                actual,
            } => {
                write!(f, "{kind} limit exceeded: {actual} > {limit}")
            }
        }
    }
}

impl fmt::Display for LimitKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::RecordBytes => "record bytes",
            Self::SubRecordBytes => "sub-record bytes",
            Self::StringBytes => "string bytes",
            Self::Masters => "master count",
        };
        write!(f, "{name}")
    }
}

impl std::error::Error for EsmError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Io(err) => Some(err),
            _ => None,
        }
    }
}

impl From<io::Error> for EsmError {
    fn from(err: io::Error) -> Self {
        Self::Io(err)
    }
}
