//! Sprite placement: where each loaded image lands in the packaged object.
//!
//! Placement is computed from tile coordinates, rotation and the sprite's own
//! anchor only, so the records can be checked without touching pixel data.

use log::{error, info};

use crate::description::SourceImage;
use crate::error::{Error, ImageFailure, ImagePhase, Result};
use crate::geometry::{Rotation, TileCoord, rotate, tile_offset_to_pixel};
use crate::palette::Recolor;
use crate::sprite::Sprite;

/// Box the game draws object thumbnails into, `(width, height)`.
pub const THUMBNAIL_SIZE: (u32, u32) = (64, 78);
/// Number of thumbnail images, one per rotation.
pub const THUMBNAIL_COUNT: usize = 4;
/// Vertical registration bias of tile images.
pub const TILE_Y_BIAS: i32 = 15;

// ── PlacementRecord ──────────────────────────────────────────────────────────

/// Final position and output path of one image.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct PlacementRecord {
    pub x: i32,
    pub y: i32,
    /// Path relative to the object root, e.g. `images/tile_0_im_1.png`.
    pub path: String,
    /// Index of the source image this record was produced from.
    pub source: usize,
}

/// A placement together with the pixels that go with it.
#[derive(Clone, Debug, PartialEq)]
pub struct Placed {
    pub record: PlacementRecord,
    pub sprite: Sprite,
}

pub fn thumbnail_path(index: usize) -> String {
    format!("images/thumb_{index}.png")
}

pub fn tile_path(tile_index: usize, rotation: Rotation) -> String {
    format!("images/tile_{tile_index}_im_{}.png", rotation.index())
}

pub fn glyph_path(atlas_index: usize, export_slot: usize) -> String {
    format!("images/font_{atlas_index}_{export_slot}.png")
}

// ── Offsets ──────────────────────────────────────────────────────────────────

/// Offset of a thumbnail: horizontally centred, vertically centred in the
/// thumbnail box. Uses floor division.
pub fn thumbnail_offset(width: u32, height: u32) -> (i32, i32) {
    let x = (-(width as i32)).div_euclid(2);
    let y = (THUMBNAIL_SIZE.1 as i32 - height as i32).div_euclid(2);
    (x, y)
}

/// Offset of a tile image for `tile` seen under `rotation`, given the
/// sprite's anchor.
pub fn tile_image_offset(tile: TileCoord, rotation: Rotation, anchor: (i32, i32)) -> (i32, i32) {
    let (px, py) = tile_offset_to_pixel(rotate(tile, rotation));
    (anchor.0 + px, anchor.1 + py + TILE_Y_BIAS)
}

// ── Loading ──────────────────────────────────────────────────────────────────

/// Load the sprite for manifest `slot`, applying the explicit anchor and the
/// recolour when configured.
pub fn load_source(
    sources: &[SourceImage],
    slot: usize,
    recolor: Option<&Recolor>,
) -> Result<Sprite, ImageFailure> {
    let Some(source) = sources.get(slot) else {
        return Err(ImageFailure {
            slot,
            path: None,
            reason: format!("no entry in 'images' (list has {} entries)", sources.len()),
        });
    };
    let mut sprite = Sprite::open(&source.path).map_err(|e| ImageFailure {
        slot,
        path: Some(source.path.clone()),
        reason: e.to_string(),
    })?;
    if let Some((x, y)) = source.anchor {
        sprite = sprite.with_anchor(x, y);
    }
    sprite.recolor(recolor);
    Ok(sprite)
}

fn finish_phase(phase: ImagePhase, placed: Vec<Placed>, failures: Vec<ImageFailure>) -> Result<Vec<Placed>> {
    if failures.is_empty() {
        Ok(placed)
    } else {
        Err(Error::ImagePhase { phase, failures })
    }
}

// ── Phases ───────────────────────────────────────────────────────────────────

/// Load the four thumbnails from `images[0..4]`.
///
/// Every slot is attempted; if any fails the phase fails with all failures.
pub fn plan_thumbnails(sources: &[SourceImage], recolor: Option<&Recolor>) -> Result<Vec<Placed>> {
    let mut placed = Vec::with_capacity(THUMBNAIL_COUNT);
    let mut failures = Vec::new();

    for i in 0..THUMBNAIL_COUNT {
        match load_source(sources, i, recolor) {
            Ok(sprite) => {
                let (x, y) = thumbnail_offset(sprite.width(), sprite.height());
                info!("loaded thumbnail {i} {:?} with offset ({x}, {y})", sprite.size());
                placed.push(Placed {
                    record: PlacementRecord { x, y, path: thumbnail_path(i), source: i },
                    sprite,
                });
            }
            Err(failure) => {
                error!("error loading thumbnail {failure}");
                failures.push(failure);
            }
        }
    }

    finish_phase(ImagePhase::Thumbnails, placed, failures)
}

/// Load four rotation images per tile, starting at `images[first_slot]`.
///
/// Tiles are processed in input order, rotations 0 → 3; tile `t` rotation
/// `r` reads `images[first_slot + 4t + r]`.
pub fn plan_tiles(
    tiles: &[TileCoord],
    sources: &[SourceImage],
    first_slot: usize,
    recolor: Option<&Recolor>,
) -> Result<Vec<Placed>> {
    let mut placed = Vec::with_capacity(tiles.len() * Rotation::ALL.len());
    let mut failures = Vec::new();
    let mut slot = first_slot;

    for (tile_index, &tile) in tiles.iter().enumerate() {
        info!("loading images for tile {tile_index} at ({}, {})", tile.x, tile.y);
        for rotation in Rotation::ALL {
            match load_source(sources, slot, recolor) {
                Ok(sprite) => {
                    let (x, y) = tile_image_offset(tile, rotation, (sprite.x, sprite.y));
                    info!("loaded tile image {slot} {:?} with offset ({x}, {y})", sprite.size());
                    placed.push(Placed {
                        record: PlacementRecord { x, y, path: tile_path(tile_index, rotation), source: slot },
                        sprite,
                    });
                }
                Err(failure) => {
                    error!("error loading tile image {failure}");
                    failures.push(failure);
                }
            }
            slot += 1;
        }
    }

    finish_phase(ImagePhase::Tiles, placed, failures)
}
