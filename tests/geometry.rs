use sceneryc::geometry::*;
use sceneryc::placement::tile_image_offset;

fn sample_coords() -> Vec<TileCoord> {
    let mut out = Vec::new();
    for x in -3..=3 {
        for y in -3..=3 {
            out.push(TileCoord::new(x * 32, y * 32));
            out.push(TileCoord::new(x, y));
        }
    }
    out
}

// ── Rotation ──────────────────────────────────────────────────────────────

#[test]
fn test_rotation_composes() {
    for c in sample_coords() {
        assert_eq!(rotate(rotate(c, Rotation::R90), Rotation::R90), rotate(c, Rotation::R180));
        assert_eq!(rotate(rotate(c, Rotation::R180), Rotation::R90), rotate(c, Rotation::R270));
    }
}

#[test]
fn test_four_quarter_turns_are_identity() {
    for c in sample_coords() {
        let mut r = c;
        for _ in 0..4 {
            r = rotate(r, Rotation::R90);
        }
        assert_eq!(r, c);
    }
}

#[test]
fn test_r0_is_identity() {
    for c in sample_coords() {
        assert_eq!(rotate(c, Rotation::R0), c);
    }
}

// ── Projection ────────────────────────────────────────────────────────────

#[test]
fn test_projection_origin() {
    assert_eq!(tile_offset_to_pixel(TileCoord::new(0, 0)), (0, 0));
}

#[test]
fn test_projection_is_additive_on_even_lattice() {
    let even: Vec<TileCoord> = sample_coords()
        .into_iter()
        .filter(|c| (c.x + c.y) % 2 == 0)
        .collect();
    for a in &even {
        for b in &even {
            let sum = TileCoord::new(a.x + b.x, a.y + b.y);
            let (ax, ay) = tile_offset_to_pixel(*a);
            let (bx, by) = tile_offset_to_pixel(*b);
            assert_eq!(tile_offset_to_pixel(sum), (ax + bx, ay + by), "{a:?} + {b:?}");
        }
    }
}

#[test]
fn test_projection_of_standard_tile_steps() {
    assert_eq!(tile_offset_to_pixel(TileCoord::new(32, 0)), (32, -16));
    assert_eq!(tile_offset_to_pixel(TileCoord::new(0, 32)), (-32, -16));
    assert_eq!(tile_offset_to_pixel(TileCoord::new(32, 32)), (0, -32));
}

// ── Placement ─────────────────────────────────────────────────────────────

#[test]
fn test_origin_tile_placement_has_vertical_bias() {
    assert_eq!(tile_image_offset(TileCoord::new(0, 0), Rotation::R0, (0, 0)), (0, 15));
}

#[test]
fn test_placement_adds_sprite_anchor() {
    let tile = TileCoord::new(0, 32);
    for r in Rotation::ALL {
        let (px, py) = tile_offset_to_pixel(rotate(tile, r));
        assert_eq!(tile_image_offset(tile, r, (-31, -40)), (px - 31, py - 40 + 15));
    }
}
