//! Snapshots of reader state for re-reading part of a record.

use defs::RecName;

/// Cursor state captured by [`EsmReader::get_context`](crate::EsmReader::get_context).
///
/// A context is tied to the reader session that produced it. Restoring it
/// after the reader has been reopened fails with
/// [`EsmError::StaleContext`](crate::EsmError::StaleContext).
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct ReaderContext {
    /// Name the stream was opened under.
    pub filename: String,
    pub(crate) session: u64,
    /// Absolute stream offset.
    pub file_pos: u64,
    pub(crate) left_file: u64,
    pub(crate) left_rec: u64,
    pub(crate) left_sub: u64,
    pub(crate) rec_end: u64,
    /// Tag of the record the context points into.
    pub rec_name: RecName,
    pub(crate) rec_flags: u32,
    pub(crate) sub_name: RecName,
    pub(crate) sub_cached: bool,
}
