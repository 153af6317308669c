//! Player save state (`PLAY`).

use std::collections::BTreeMap;
use std::io::{Read, Seek, Write};

use defs::{FormatVersion, RecName, RefId, CURRENT_CONTENT_FORMAT_VERSION};
use esm::{EsmReader, EsmResult, EsmWriter};

use crate::cellref::CellRef;
use crate::position::Position;

pub const REC_PLAY: RecName = RecName::new(*b"PLAY");

/// Saved state of a single object instance.
#[derive(Debug, Clone, PartialEq)]
pub struct ObjectState {
    pub cell_ref: CellRef,
    pub enabled: bool,
    pub position: Position,
    pub flags: u32,
}

impl Default for ObjectState {
    fn default() -> Self {
        Self {
            cell_ref: CellRef::default(),
            enabled: true,
            position: Position::default(),
            flags: 0,
        }
    }
}

impl ObjectState {
    /// Reads the state that follows an already loaded reference id.
    pub fn load<R: Read + Seek>(&mut self, r: &mut EsmReader<R>) -> EsmResult<()> {
        self.cell_ref.load_data(r)?;
        self.enabled = r.get_hnot::<u8>(b"ENAB")?.map_or(true, |enabled| enabled != 0);
        self.position = r.get_hnot(b"POS_")?.unwrap_or(self.cell_ref.pos);
        self.flags = r.get_hnot(b"FLAG")?.unwrap_or(0);
        Ok(())
    }

    pub fn save<W: Write + Seek>(&self, w: &mut EsmWriter<W>, in_inventory: bool) -> EsmResult<()> {
        self.cell_ref.save(w, true, in_inventory, false)?;
        if !self.enabled && !in_inventory {
            w.write_hnt(b"ENAB", &0u8)?;
        }
        if !in_inventory && self.position != self.cell_ref.pos {
            w.write_hnt(b"POS_", &self.position)?;
        }
        if self.flags != 0 {
            w.write_hnt(b"FLAG", &self.flags)?;
        }
        Ok(())
    }
}

/// The player character's save-game state.
///
/// Content files never carry a player; see [`Player::is_supported`].
#[derive(Debug, Clone, PartialEq)]
pub struct Player {
    pub object: ObjectState,
    pub cell_id: RefId,
    pub last_known_exterior_position: [f32; 3],
    /// Position and cell of the Mark spell target, if set.
    pub mark: Option<(Position, RefId)>,
    pub birthsign: RefId,
    /// -1 when there is none.
    pub current_crime_id: i32,
    pub paid_crime_id: i32,
    /// Items replaced by bound items, keyed by the bound item.
    pub previous_items: BTreeMap<RefId, RefId>,
}

impl Default for Player {
    fn default() -> Self {
        Self {
            object: ObjectState::default(),
            cell_id: RefId::Empty,
            last_known_exterior_position: [0.0; 3],
            mark: None,
            birthsign: RefId::Empty,
            current_crime_id: -1,
            paid_crime_id: -1,
            previous_items: BTreeMap::new(),
        }
    }
}

impl Player {
    /// Returns `true` if player state may be written at `version`.
    ///
    /// The content format has no player; callers skip the record there.
    #[must_use]
    pub const fn is_supported(version: FormatVersion) -> bool {
        version != CURRENT_CONTENT_FORMAT_VERSION
    }

    pub fn save<W: Write + Seek>(&self, w: &mut EsmWriter<W>) -> EsmResult<()> {
        self.object.save(w, false)?;
        w.write_cell_id(&self.cell_id)?;
        w.write_hnt(b"LKEP", &self.last_known_exterior_position)?;
        if let Some((position, cell)) = &self.mark {
            w.write_hnt(b"MARK", position)?;
            w.write_cell_id(cell)?;
        }
        w.write_hn_ref_id(b"SIGN", &self.birthsign)?;
        w.write_hnt(b"CURD", &self.current_crime_id)?;
        w.write_hnt(b"PAYD", &self.paid_crime_id)?;
        for (bound, previous) in &self.previous_items {
            w.write_hn_ref_id(b"BOUN", bound)?;
            w.write_hn_ref_id(b"PREV", previous)?;
        }
        Ok(())
    }

    pub fn load<R: Read + Seek>(&mut self, r: &mut EsmReader<R>) -> EsmResult<()> {
        self.object.cell_ref.load_id(r, true)?;
        self.object.load(r)?;
        self.cell_id = r.get_cell_id()?;
        self.last_known_exterior_position = r.get_hnt(b"LKEP")?;
        self.mark = match r.get_hnot::<Position>(b"MARK")? {
            Some(position) => Some((position, r.get_cell_id()?)),
            None => None,
        };

        // Automove, no longer used.
        if r.is_next_sub(b"AMOV")? {
            r.skip_h_sub()?;
        }

        self.birthsign = r.get_hn_ref_id(b"SIGN")?;
        self.current_crime_id = r.get_hnot(b"CURD")?.unwrap_or(-1);
        self.paid_crime_id = r.get_hnot(b"PAYD")?.unwrap_or(-1);

        self.previous_items.clear();
        while r.peek_next_sub(b"BOUN")? {
            let bound = r.get_hn_ref_id(b"BOUN")?;
            let previous = r.get_hn_ref_id(b"PREV")?;
            self.previous_items.insert(bound, previous);
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_util::{save_fake, try_load_fake};
    use defs::{test_format_versions, CURRENT_SAVE_GAME_FORMAT_VERSION};

    fn roundtrip(record: &Player, version: FormatVersion) -> Player {
        let bytes = save_fake(version, |w| record.save(w));
        try_load_fake(bytes, |r| {
            let mut result = Player::default();
            result.load(r)?;
            Ok(result)
        })
        .unwrap()
    }

    fn sample() -> Player {
        let mut player = Player::default();
        player.object.cell_ref.ref_id = RefId::string_ref_id("player");
        player.object.cell_ref.pos = Position::new([10.0, 20.0, 30.0], [0.0; 3]);
        player.object.position = Position::new([11.0, 21.0, 31.0], [0.0, 0.0, 1.0]);
        player.cell_id = RefId::esm3_exterior_cell(-2, 5);
        player.last_known_exterior_position = [-16000.0, 42000.0, 200.0];
        player.mark = Some((
            Position::new([1.0, 2.0, 3.0], [0.0; 3]),
            RefId::string_ref_id("Balmora, Caius Cosades' House"),
        ));
        player.birthsign = RefId::string_ref_id("Lady's Favor");
        player.current_crime_id = 3;
        player.paid_crime_id = 2;
        player.previous_items.insert(
            RefId::string_ref_id("bound_dagger"),
            RefId::string_ref_id("iron dagger"),
        );
        player
    }

    #[test]
    fn content_version_has_no_player() {
        assert!(!Player::is_supported(CURRENT_CONTENT_FORMAT_VERSION));
        assert!(Player::is_supported(CURRENT_SAVE_GAME_FORMAT_VERSION));
    }

    #[test]
    fn roundtrip_save_game_versions() {
        let record = sample();
        for version in test_format_versions() {
            if !Player::is_supported(version) {
                continue;
            }
            assert_eq!(roundtrip(&record, version), record, "version {version}");
        }
    }

    #[test]
    fn object_position_defaults_to_reference_position() {
        let mut record = sample();
        record.object.position = record.object.cell_ref.pos;
        record.mark = None;
        assert_eq!(roundtrip(&record, CURRENT_SAVE_GAME_FORMAT_VERSION), record);
    }

    #[test]
    fn disabled_object_state() {
        let state = ObjectState {
            enabled: false,
            flags: 4,
            ..ObjectState::default()
        };
        let bytes = save_fake(CURRENT_SAVE_GAME_FORMAT_VERSION, |w| state.save(w, false));
        let result = try_load_fake(bytes, |r| {
            let mut result = ObjectState::default();
            result.cell_ref.load_id(r, true)?;
            result.load(r)?;
            Ok(result)
        })
        .unwrap();
        assert_eq!(result, state);
    }

    #[test]
    fn automove_is_skipped() {
        let record = sample();
        let bytes = save_fake(CURRENT_SAVE_GAME_FORMAT_VERSION, |w| {
            record.object.save(w, false)?;
            w.write_cell_id(&record.cell_id)?;
            w.write_hnt(b"LKEP", &record.last_known_exterior_position)?;
            w.write_hnt(b"AMOV", &1u8)?;
            w.write_hn_ref_id(b"SIGN", &record.birthsign)
        });
        let result = try_load_fake(bytes, |r| {
            let mut result = Player::default();
            result.load(r)?;
            Ok(result)
        })
        .unwrap();
        assert!(result.birthsign.eq_str("lady's favor"));
        assert_eq!(result.current_crime_id, -1);
    }
}
