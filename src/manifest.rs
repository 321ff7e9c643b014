//! Accumulates output image slots across compile phases and writes the final
//! object description.

use std::path::Path;

use serde::ser::SerializeMap;
use serde::{Serialize, Serializer};
use serde_json::{Map, Value};

use crate::description::{Description, FONT_KEY};
use crate::error::{Error, Result};
use crate::font::GlyphAtlas;
use crate::placement::Placed;

// ── ManifestEntry ────────────────────────────────────────────────────────────

/// One slot of the output `images` list.
#[derive(Clone, Debug, PartialEq)]
pub enum ManifestEntry {
    /// Occupies a slot but has no pixels. Serialised as `""`.
    Blank,
    Image(Placed),
}

impl Serialize for ManifestEntry {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        match self {
            ManifestEntry::Blank => serializer.serialize_str(""),
            ManifestEntry::Image(placed) => {
                let mut map = serializer.serialize_map(Some(3))?;
                map.serialize_entry("x", &placed.record.x)?;
                map.serialize_entry("y", &placed.record.y)?;
                map.serialize_entry("path", &placed.record.path)?;
                map.end()
            }
        }
    }
}

// ── Manifest ─────────────────────────────────────────────────────────────────

/// Ordered output image slots. Each phase appends its slots in order.
#[derive(Clone, Debug, Default)]
pub struct Manifest {
    entries: Vec<ManifestEntry>,
}

impl Manifest {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, placed: Placed) {
        self.entries.push(ManifestEntry::Image(placed));
    }

    pub fn push_blank(&mut self) {
        self.entries.push(ManifestEntry::Blank);
    }

    pub fn extend_placed(&mut self, placed: impl IntoIterator<Item = Placed>) {
        for p in placed {
            self.push(p);
        }
    }

    /// Append the atlas slots of a glyph atlas, blanks included.
    pub fn extend_atlas(&mut self, slots: impl IntoIterator<Item = Option<Placed>>) {
        for slot in slots {
            match slot {
                Some(placed) => self.push(placed),
                None => self.push_blank(),
            }
        }
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn entries(&self) -> &[ManifestEntry] {
        &self.entries
    }

    /// Placed images only, in slot order.
    pub fn images(&self) -> impl Iterator<Item = &Placed> {
        self.entries.iter().filter_map(|e| match e {
            ManifestEntry::Image(p) => Some(p),
            ManifestEntry::Blank => None,
        })
    }

    /// Write every placed image as PNG under `root`, creating parent
    /// directories as needed. Blank slots write nothing.
    pub fn write_images(&self, root: &Path) -> Result<()> {
        for placed in self.images() {
            let path = root.join(&placed.record.path);
            if let Some(parent) = path.parent() {
                std::fs::create_dir_all(parent).map_err(|e| Error::io(parent, e))?;
            }
            placed.sprite.save(&path)?;
            log::debug!("saved image {}", path.display());
        }
        Ok(())
    }
}

// ── Assembly ─────────────────────────────────────────────────────────────────

/// Build the output description: the input document with `images` replaced
/// by the manifest and, when a font was built, the glyph table written into
/// `properties.3dFont`.
pub fn assemble(description: &Description, manifest: &Manifest, atlas: Option<&GlyphAtlas>) -> Result<Value> {
    let mut document: Map<String, Value> = description.document.clone();
    document.insert("images".to_string(), serde_json::to_value(manifest.entries())?);

    if let Some(atlas) = atlas {
        let font = document
            .get_mut("properties")
            .and_then(|p| p.get_mut(FONT_KEY))
            .and_then(Value::as_object_mut)
            .ok_or_else(|| Error::malformed(format!("'properties.{FONT_KEY}' must be an object")))?;
        font.insert("numImages".to_string(), Value::from(atlas.num_images()));
        font.insert("glyphs".to_string(), serde_json::to_value(&atlas.glyphs)?);
    }

    Ok(Value::Object(document))
}
