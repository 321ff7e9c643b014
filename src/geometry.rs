// =============================================================================
// GEOMETRY.RS: tile grid math for large scenery
//
// Pure coordinate operations used when placing tile images:
// - Isometric projection of tile offsets into pixel offsets
// - The four 90° turntable rotations of a tile offset
// =============================================================================

use serde::{Deserialize, Serialize};

/// Position of one tile in an object's footprint, relative to the origin tile.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct TileCoord {
    pub x: i32,
    pub y: i32,
}

impl TileCoord {
    pub const fn new(x: i32, y: i32) -> Self {
        Self { x, y }
    }
}

impl From<(i32, i32)> for TileCoord {
    fn from((x, y): (i32, i32)) -> Self {
        Self { x, y }
    }
}

// =============================================================================
// ROTATION
// =============================================================================

/// One of the four pre-rendered orientations, counter-clockwise around the
/// grid origin.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub enum Rotation {
    R0,
    R90,
    R180,
    R270,
}

impl Rotation {
    /// All rotations in output order.
    pub const ALL: [Rotation; 4] = [Rotation::R0, Rotation::R90, Rotation::R180, Rotation::R270];

    /// Rotation for quarter-turn count `k`, taken modulo 4.
    pub fn from_index(k: usize) -> Self {
        Self::ALL[k % 4]
    }

    pub fn index(self) -> usize {
        match self {
            Rotation::R0 => 0,
            Rotation::R90 => 1,
            Rotation::R180 => 2,
            Rotation::R270 => 3,
        }
    }
}

/// Rotate a tile offset by `rotation`.
///
/// ```text
/// R0   (x, y) -> ( x,  y)
/// R90  (x, y) -> ( y, -x)
/// R180 (x, y) -> (-x, -y)
/// R270 (x, y) -> (-y,  x)
/// ```
#[inline]
pub fn rotate(coord: TileCoord, rotation: Rotation) -> TileCoord {
    let TileCoord { x, y } = coord;
    match rotation {
        Rotation::R0 => TileCoord::new(x, y),
        Rotation::R90 => TileCoord::new(y, -x),
        Rotation::R180 => TileCoord::new(-x, -y),
        Rotation::R270 => TileCoord::new(-y, x),
    }
}

// =============================================================================
// PROJECTION
// =============================================================================

/// Project a tile offset to a pixel offset on the isometric grid.
///
/// `px = x - y`, `py = floor(-(x + y) / 2)`. The division floors toward
/// negative infinity, so `(1, 0)` projects to `(1, -1)`.
#[inline]
pub fn tile_offset_to_pixel(coord: TileCoord) -> (i32, i32) {
    let px = coord.x - coord.y;
    let py = (-(coord.x + coord.y)).div_euclid(2);
    (px, py)
}
