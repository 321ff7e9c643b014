use std::path::Path;

use image::RgbaImage;
use image::imageops::{self, FilterType};

use crate::error::{Error, Result};
use crate::palette::Recolor;

// ── Sprite ───────────────────────────────────────────────────────────────────

/// A decoded image plus its registration point.
///
/// `x`/`y` is the offset of the image's top-left corner from the point the
/// game anchors the sprite to. Freshly decoded sprites are registered on
/// their centre.
#[derive(Clone, Debug, PartialEq)]
pub struct Sprite {
    pub image: RgbaImage,
    pub x: i32,
    pub y: i32,
}

impl Sprite {
    /// Wrap `image`, registering it on its centre.
    pub fn new(image: RgbaImage) -> Self {
        let x = -((image.width() / 2) as i32);
        let y = -((image.height() / 2) as i32);
        Self { image, x, y }
    }

    /// Decode a PNG (or any format the `image` crate was built with).
    pub fn open(path: &Path) -> Result<Self, image::ImageError> {
        Ok(Self::new(image::open(path)?.to_rgba8()))
    }

    pub fn with_anchor(mut self, x: i32, y: i32) -> Self {
        self.x = x;
        self.y = y;
        self
    }

    pub fn width(&self) -> u32 {
        self.image.width()
    }

    pub fn height(&self) -> u32 {
        self.image.height()
    }

    pub fn size(&self) -> (u32, u32) {
        self.image.dimensions()
    }

    /// `true` when every pixel is fully transparent, or there are no pixels.
    pub fn is_empty(&self) -> bool {
        self.image.pixels().all(|p| p.0[3] == 0)
    }

    pub fn recolor(&mut self, recolor: Option<&Recolor>) {
        if let Some(r) = recolor {
            r.apply(&mut self.image);
        }
    }

    /// Resample to exactly `width × height` without interpolation.
    pub fn resize_nearest(&mut self, width: u32, height: u32) {
        if (width, height) == self.size() {
            return;
        }
        self.image = imageops::resize(&self.image, width, height, FilterType::Nearest);
    }

    pub fn save(&self, path: &Path) -> Result<()> {
        self.image.save(path).map_err(|source| Error::Encode { path: path.to_path_buf(), source })
    }
}
