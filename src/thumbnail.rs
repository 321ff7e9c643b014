use log::{info, warn};

use crate::placement::{Placed, THUMBNAIL_SIZE, thumbnail_offset};

// ── ThumbnailScale ───────────────────────────────────────────────────────────

/// How thumbnails are scaled before packaging.
#[derive(Copy, Clone, Debug, PartialEq)]
pub enum ThumbnailScale {
    /// Leave thumbnails at their native size.
    Native,
    /// Shrink uniformly so every thumbnail fits the thumbnail box.
    Fit,
    /// Scale by an explicit percentage. May enlarge past the box.
    Percent(f64),
}

impl ThumbnailScale {
    pub fn from_config(resize: bool, percent: Option<f64>) -> Self {
        match (resize, percent) {
            (false, _) => ThumbnailScale::Native,
            (true, Some(p)) => ThumbnailScale::Percent(p),
            (true, None) => ThumbnailScale::Fit,
        }
    }
}

/// The largest factor `<= 1` at which every size fits the thumbnail box.
pub fn fit_scale(sizes: &[(u32, u32)]) -> f64 {
    let (box_w, box_h) = (THUMBNAIL_SIZE.0 as f64, THUMBNAIL_SIZE.1 as f64);
    sizes.iter().fold(1.0_f64, |s, &(w, h)| {
        s.min(box_w / w as f64).min(box_h / h as f64)
    })
}

/// `size` scaled by `scale`, rounded, never below one pixel.
pub fn scaled_size((w, h): (u32, u32), scale: f64) -> (u32, u32) {
    let dim = |d: u32| ((d as f64 * scale).round() as u32).max(1);
    (dim(w), dim(h))
}

/// Scale every thumbnail by one shared factor and recompute its offset from
/// the scaled size. Returns the factor applied.
pub fn normalize(thumbnails: &mut [Placed], scale: ThumbnailScale) -> f64 {
    let factor = match scale {
        ThumbnailScale::Native => return 1.0,
        ThumbnailScale::Fit => {
            let sizes: Vec<(u32, u32)> = thumbnails.iter().map(|t| t.sprite.size()).collect();
            fit_scale(&sizes)
        }
        ThumbnailScale::Percent(p) => p / 100.0,
    };
    info!("scaling thumbnails to {}%", factor * 100.0);

    for thumb in thumbnails.iter_mut() {
        let (w, h) = scaled_size(thumb.sprite.size(), factor);
        thumb.sprite.resize_nearest(w, h);
        if w > THUMBNAIL_SIZE.0 || h > THUMBNAIL_SIZE.1 {
            warn!(
                "thumbnail {} is {w}x{h}, larger than the {}x{} thumbnail box",
                thumb.record.path, THUMBNAIL_SIZE.0, THUMBNAIL_SIZE.1
            );
        }
        let (x, y) = thumbnail_offset(w, h);
        thumb.record.x = x;
        thumb.record.y = y;
    }
    factor
}
