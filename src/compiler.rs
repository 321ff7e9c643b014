//! The compile pipeline: description in, compiled object out.

use std::path::{Path, PathBuf};

use log::info;
use serde_json::Value;

use crate::description::Description;
use crate::error::Result;
use crate::font::{DirectorySource, FontConfig, GlyphAtlas, build_glyph_atlas};
use crate::manifest::{Manifest, assemble};
use crate::package::{ExportMode, package};
use crate::placement::{THUMBNAIL_COUNT, plan_thumbnails, plan_tiles};
use crate::thumbnail::{ThumbnailScale, normalize};

/// A fully compiled object, ready to package.
#[derive(Clone, Debug)]
pub struct CompiledObject {
    pub id: String,
    pub manifest: Manifest,
    pub atlas: Option<GlyphAtlas>,
    /// The output description document.
    pub document: Value,
    /// Scale factor applied to the thumbnails.
    pub thumbnail_scale: f64,
}

/// Number of output image slots for an object with `tile_count` tiles and,
/// when it has a font, `font` = `(export_increment, usable_characters)`.
pub fn expected_image_count(tile_count: usize, font: Option<(usize, usize)>) -> usize {
    let font_slots = font.map_or(0, |(export, chars)| export * (1 + chars));
    THUMBNAIL_COUNT + 4 * tile_count + font_slots
}

/// Run every compile phase on a parsed description.
pub fn compile(description: &Description) -> Result<CompiledObject> {
    let mut manifest = Manifest::new();

    let atlas = match (&description.import.font, description.has_font()) {
        (Some(import), true) => {
            let config = FontConfig::resolve(import, &description.base_dir)?;
            config.check_assets()?;
            info!(
                "building font atlas from {} ({})",
                config.directory.display(),
                config.pattern
            );
            let mut source = DirectorySource { directory: &config.directory, pattern: &config.pattern };
            let atlas = build_glyph_atlas(&config, &mut source)?;
            manifest.extend_atlas(atlas.slots.iter().cloned());
            Some(atlas)
        }
        _ => None,
    };

    let sources = description.source_images();
    let import = &description.import;

    let mut thumbnails = plan_thumbnails(&sources, import.thumbnail_recolor().as_ref())?;
    let scale = ThumbnailScale::from_config(import.resize_thumbnail, import.resize_percent);
    let thumbnail_scale = normalize(&mut thumbnails, scale);
    manifest.extend_placed(thumbnails);

    let tiles = plan_tiles(&description.tiles, &sources, THUMBNAIL_COUNT, import.tile_recolor().as_ref())?;
    manifest.extend_placed(tiles);

    let document = assemble(description, &manifest, atlas.as_ref())?;
    info!("compiled '{}' with {} image slots", description.id, manifest.len());

    Ok(CompiledObject {
        id: description.id.clone(),
        manifest,
        atlas,
        document,
        thumbnail_scale,
    })
}

/// Load, compile and package one description file.
pub fn build_scenery(path: &Path, mode: &ExportMode) -> Result<Option<PathBuf>> {
    info!("loading file '{}'", path.display());
    let description = Description::load(path)?;
    info!("object id is '{}'", description.id);
    let compiled = compile(&description)?;
    package(&compiled.id, &compiled.manifest, &compiled.document, mode)
}
