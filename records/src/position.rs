//! World placement shared by references, doors and player marks.

use esm::Composite;

/// Location and rotation in world units and radians.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Position {
    pub pos: [f32; 3],
    pub rot: [f32; 3],
}

impl Position {
    #[must_use]
    pub const fn new(pos: [f32; 3], rot: [f32; 3]) -> Self {
        Self { pos, rot }
    }

    /// Grid coordinates of the exterior cell containing this position.
    #[must_use]
    pub fn cell_index(&self) -> (i32, i32) {
        const CELL_SIZE: f32 = 8192.0;
        (
            (self.pos[0] / CELL_SIZE).floor() as i32,
            (self.pos[1] / CELL_SIZE).floor() as i32,
        )
    }
}

impl Composite for Position {
    const SIZE: usize = 24;

    fn encode(&self, out: &mut Vec<u8>) {
        self.pos.encode(out);
        self.rot.encode(out);
    }

    fn decode(input: &mut &[u8]) -> Self {
        Self {
            pos: <[f32; 3]>::decode(input),
            rot: <[f32; 3]>::decode(input),
        }
    }
}
