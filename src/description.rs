//! The object description document: the parts the compiler reads, and the
//! untouched remainder that is written back out.

use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};

use serde::Deserialize;
use serde_json::{Map, Value};

use crate::error::{Error, Result};
use crate::geometry::TileCoord;
use crate::palette::{NamedColor, Recolor};

/// Key of the import-instruction section stripped from the output.
pub const IMPORT_KEY: &str = "importImages";
/// Key of the 3D sign font, both under `properties` and under `importImages`.
pub const FONT_KEY: &str = "3dFont";

// ── Import configuration (JSON-facing) ───────────────────────────────────────

/// One entry of `importImages.images`: either a bare path or a path with an
/// explicit sprite anchor.
#[derive(Clone, Debug, PartialEq, Deserialize)]
#[serde(untagged)]
pub enum ImageSource {
    Path(PathBuf),
    Anchored { path: PathBuf, x: i32, y: i32 },
}

impl ImageSource {
    pub fn path(&self) -> &Path {
        match self {
            ImageSource::Path(p) | ImageSource::Anchored { path: p, .. } => p,
        }
    }

    pub fn anchor(&self) -> Option<(i32, i32)> {
        match self {
            ImageSource::Path(_) => None,
            ImageSource::Anchored { x, y, .. } => Some((*x, *y)),
        }
    }
}

/// The `importImages` section.
#[derive(Clone, Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ImportImages {
    pub images: Vec<ImageSource>,
    #[serde(default)]
    pub image_base_path: Option<PathBuf>,
    #[serde(default)]
    pub recolor_to: Option<NamedColor>,
    /// Falls back to `recolorTo` when unset.
    #[serde(default)]
    pub thumbnail_recolor_to: Option<NamedColor>,
    #[serde(default, alias = "importSelectedColors")]
    pub selected_colors: Option<Vec<NamedColor>>,
    /// Falls back to `selectedColors` when unset.
    #[serde(default)]
    pub thumbnail_selected_colors: Option<Vec<NamedColor>>,
    #[serde(default = "default_true")]
    pub resize_thumbnail: bool,
    #[serde(default)]
    pub resize_percent: Option<f64>,
    #[serde(default, rename = "3dFont")]
    pub font: Option<FontImport>,
}

fn default_true() -> bool {
    true
}

impl ImportImages {
    pub fn tile_recolor(&self) -> Option<Recolor> {
        Recolor::from_config(self.recolor_to, self.selected_colors.as_deref())
    }

    pub fn thumbnail_recolor(&self) -> Option<Recolor> {
        Recolor::from_config(
            self.thumbnail_recolor_to.or(self.recolor_to),
            self.thumbnail_selected_colors.as_deref().or(self.selected_colors.as_deref()),
        )
    }
}

/// The `importImages.3dFont` section describing where glyph images live and
/// how they are grouped.
#[derive(Clone, Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FontImport {
    pub image_directory: PathBuf,
    /// File name with a `{}` or `{:0N}` numeric placeholder.
    pub file_name: String,
    #[serde(default)]
    pub import_increment: Option<usize>,
    #[serde(default)]
    pub export_increment: Option<usize>,
    /// Export slot → import slot; `null` leaves the export slot blank.
    #[serde(default)]
    pub images_map: Option<Vec<Option<usize>>>,
    #[serde(default = "default_glyph_width")]
    pub default_width: i32,
    #[serde(default = "default_glyph_height")]
    pub default_height: i32,
    #[serde(default)]
    pub width_offset: i32,
    /// Keyed by the literal character or its decimal codepoint.
    #[serde(default)]
    pub width_overrides: BTreeMap<String, i32>,
    #[serde(default)]
    pub start_codepoint: i32,
    #[serde(default)]
    pub include_names: bool,
    #[serde(default)]
    pub recolor_to: Option<NamedColor>,
    #[serde(default)]
    pub selected_colors: Option<Vec<NamedColor>>,
}

fn default_glyph_width() -> i32 {
    8
}

fn default_glyph_height() -> i32 {
    15
}

// ── SourceImage ──────────────────────────────────────────────────────────────

/// An `images` entry with its path resolved against the description.
#[derive(Clone, Debug, PartialEq)]
pub struct SourceImage {
    pub path: PathBuf,
    pub anchor: Option<(i32, i32)>,
}

// ── Description ──────────────────────────────────────────────────────────────

/// A parsed object description.
///
/// `document` holds everything except the import section; the compiler
/// writes its results back into it.
#[derive(Clone, Debug)]
pub struct Description {
    pub id: String,
    pub tiles: Vec<TileCoord>,
    pub import: ImportImages,
    /// Directory relative source paths are resolved against.
    pub base_dir: PathBuf,
    pub document: Map<String, Value>,
}

impl Description {
    /// Read and parse a description file. The file must have a `.json`
    /// extension.
    pub fn load(path: &Path) -> Result<Self> {
        let is_json = path
            .extension()
            .and_then(|e| e.to_str())
            .is_some_and(|e| e.eq_ignore_ascii_case("json"));
        if !is_json {
            return Err(Error::malformed(format!(
                "expected a .json input file, got '{}'",
                path.display()
            )));
        }

        let text = fs::read_to_string(path).map_err(|e| Error::io(path, e))?;
        let value: Value = serde_json::from_str(&text)
            .map_err(|e| Error::malformed(format!("invalid JSON in '{}': {e}", path.display())))?;
        let absolute = std::path::absolute(path).map_err(|e| Error::io(path, e))?;
        let base_dir = absolute.parent().map(Path::to_path_buf).unwrap_or_default();
        Self::from_value(value, base_dir)
    }

    /// Parse an already-decoded document. `base_dir` anchors relative paths.
    pub fn from_value(value: Value, base_dir: PathBuf) -> Result<Self> {
        let Value::Object(mut document) = value else {
            return Err(Error::malformed("description root must be an object"));
        };

        let id = match document.get("id") {
            Some(Value::String(s)) if !s.is_empty() => s.clone(),
            _ => return Err(Error::malformed("missing string 'id'")),
        };

        let import_value = document
            .shift_remove(IMPORT_KEY)
            .ok_or_else(|| Error::malformed(format!("missing '{IMPORT_KEY}' object")))?;
        if !import_value.get("images").is_some_and(Value::is_array) {
            return Err(Error::malformed(format!("expected 'images' array in '{IMPORT_KEY}'")));
        }
        let import: ImportImages = serde_json::from_value(import_value)
            .map_err(|e| Error::malformed(format!("invalid '{IMPORT_KEY}': {e}")))?;

        let tiles_value = document
            .get("properties")
            .and_then(|p| p.get("tiles"))
            .ok_or_else(|| Error::malformed("missing 'properties.tiles' array"))?;
        let tiles: Vec<TileCoord> = serde_json::from_value(tiles_value.clone())
            .map_err(|e| Error::malformed(format!("invalid 'properties.tiles': {e}")))?;

        let font_value = document.get("properties").and_then(|p| p.get(FONT_KEY));
        if font_value.is_some_and(|f| !f.is_null() && !f.is_object()) {
            return Err(Error::malformed(format!("'properties.{FONT_KEY}' must be an object")));
        }

        let description = Self { id, tiles, import, base_dir, document };
        if description.has_font() && description.import.font.is_none() {
            return Err(Error::MissingFontAssets(format!(
                "'properties.{FONT_KEY}' is declared but '{IMPORT_KEY}.{FONT_KEY}' is missing"
            )));
        }
        Ok(description)
    }

    /// Whether the object declares a 3D sign font.
    pub fn has_font(&self) -> bool {
        self.document
            .get("properties")
            .and_then(|p| p.get(FONT_KEY))
            .is_some_and(|f| !f.is_null())
    }

    /// Resolve `path` against the description directory and `imageBasePath`.
    pub fn resolve(&self, path: &Path) -> PathBuf {
        match &self.import.image_base_path {
            Some(base) => self.base_dir.join(base).join(path),
            None => self.base_dir.join(path),
        }
    }

    /// The `images` list with every path resolved.
    pub fn source_images(&self) -> Vec<SourceImage> {
        self.import
            .images
            .iter()
            .map(|s| SourceImage { path: self.resolve(s.path()), anchor: s.anchor() })
            .collect()
    }
}
