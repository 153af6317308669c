//! Legacy cell addressing by worldspace name and grid index.

use std::io::{Read, Seek, Write};

use defs::{RefId, MAX_SAVED_GAME_CELL_NAME_AS_REF_ID_FORMAT_VERSION};

use crate::error::EsmResult;
use crate::reader::EsmReader;
use crate::writer::EsmWriter;

/// Worldspace name of paged exterior cells.
pub const DEFAULT_WORLDSPACE: &str = "sys::default";

/// Grid coordinates of an exterior cell.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct CellIndex {
    pub x: i32,
    pub y: i32,
}

/// A cell as stored by format versions that predate cell reference ids.
///
/// Interior cells carry their name as the worldspace and are not paged.
/// Exterior cells live in [`DEFAULT_WORLDSPACE`] and carry a `CIDX` index.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct CellId {
    pub worldspace: String,
    pub index: CellIndex,
    pub paged: bool,
}

impl CellId {
    /// Converts a cell reference id into the legacy layout.
    #[must_use]
    pub fn from_ref_id(id: &RefId) -> Self {
        match id {
            RefId::Esm3ExteriorCell { x, y } => Self {
                worldspace: DEFAULT_WORLDSPACE.to_string(),
                index: CellIndex { x: *x, y: *y },
                paged: true,
            },
            other => Self {
                worldspace: other.to_string(),
                index: CellIndex::default(),
                paged: false,
            },
        }
    }

    /// Converts back into a cell reference id.
    #[must_use]
    pub fn to_ref_id(&self) -> RefId {
        if self.paged {
            RefId::esm3_exterior_cell(self.index.x, self.index.y)
        } else {
            RefId::string_ref_id(self.worldspace.clone())
        }
    }

    pub fn save<W: Write + Seek>(&self, w: &mut EsmWriter<W>) -> EsmResult<()> {
        if w.format_version() <= MAX_SAVED_GAME_CELL_NAME_AS_REF_ID_FORMAT_VERSION {
            w.write_hn_string(b"SPAC", &self.worldspace)?;
        } else {
            w.write_hn_ref_id(b"SPAC", &RefId::string_ref_id(self.worldspace.clone()))?;
        }
        if self.paged {
            w.write_hnt(b"CIDX", &[self.index.x, self.index.y])?;
        }
        Ok(())
    }

    pub fn load<R: Read + Seek>(r: &mut EsmReader<R>) -> EsmResult<Self> {
        let worldspace = if r.get_format_version() <= MAX_SAVED_GAME_CELL_NAME_AS_REF_ID_FORMAT_VERSION {
            r.get_hn_string(b"SPAC")?
        } else {
            r.get_hn_ref_id(b"SPAC")?.to_string()
        };
        let index = r.get_hnot::<[i32; 2]>(b"CIDX")?;
        Ok(Self {
            worldspace,
            index: index.map_or_else(CellIndex::default, |[x, y]| CellIndex { x, y }),
            paged: index.is_some(),
        })
    }
}
