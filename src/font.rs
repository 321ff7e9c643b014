//! 3D sign font: glyph atlas construction from per-character source images.
//!
//! Source images are numbered files in one directory. Each codepoint owns a
//! group of `import_increment` consecutive file numbers; a codepoint with at
//! least one non-empty image in its group becomes an atlas entry and emits
//! `export_increment` output images. Every one of the 256 codepoints gets a
//! glyph table entry regardless.

use std::collections::{BTreeMap, HashMap};
use std::fmt;
use std::ops::{Index, IndexMut};
use std::path::{Path, PathBuf};

use log::{debug, info};
use serde::{Serialize, Serializer};

use crate::description::FontImport;
use crate::error::{Error, ImageFailure, Result};
use crate::palette::Recolor;
use crate::placement::{Placed, PlacementRecord, glyph_path};
use crate::sprite::Sprite;

/// Number of glyph table entries, one per 8-bit codepoint.
pub const CODEPOINT_COUNT: usize = 256;

// ── Glyph ────────────────────────────────────────────────────────────────────

/// Metrics for one codepoint of the sign font.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct Glyph {
    /// Atlas entry index; `0` is the reserved blank entry.
    #[serde(rename = "image")]
    pub atlas_index: usize,
    pub width: i32,
    pub height: i32,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub codepoint: Option<u8>,
}

impl Glyph {
    /// A glyph with no imagery.
    pub fn blank(width: i32, height: i32) -> Self {
        Self { atlas_index: 0, width, height, name: None, codepoint: None }
    }
}

// ── GlyphTable ───────────────────────────────────────────────────────────────

/// Dense, codepoint-indexed glyph table. Always exactly 256 entries.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct GlyphTable {
    glyphs: Box<[Glyph; CODEPOINT_COUNT]>,
}

impl GlyphTable {
    /// A table with every entry set to `default`.
    pub fn filled(default: &Glyph) -> Self {
        Self { glyphs: Box::new(std::array::from_fn(|_| default.clone())) }
    }

    pub fn len(&self) -> usize {
        CODEPOINT_COUNT
    }

    pub fn is_empty(&self) -> bool {
        false
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Glyph> {
        self.glyphs.iter()
    }
}

impl Index<u8> for GlyphTable {
    type Output = Glyph;

    fn index(&self, codepoint: u8) -> &Glyph {
        &self.glyphs[codepoint as usize]
    }
}

impl IndexMut<u8> for GlyphTable {
    fn index_mut(&mut self, codepoint: u8) -> &mut Glyph {
        &mut self.glyphs[codepoint as usize]
    }
}

impl Serialize for GlyphTable {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        serializer.collect_seq(self.glyphs.iter())
    }
}

// ── FileNamePattern ──────────────────────────────────────────────────────────

/// A file name with one numeric placeholder: `{}` or zero-padded `{:0N}`.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct FileNamePattern {
    prefix: String,
    suffix: String,
    pad: usize,
}

impl FileNamePattern {
    pub fn parse(pattern: &str) -> Result<Self> {
        let bad = || Error::malformed(format!("font file name '{pattern}' needs one '{{}}' or '{{:0N}}' placeholder"));
        let open = pattern.find('{').ok_or_else(bad)?;
        let close = open + pattern[open..].find('}').ok_or_else(bad)?;
        let placeholder = &pattern[open + 1..close];
        let pad = match placeholder {
            "" => 0,
            _ => placeholder
                .strip_prefix(":0")
                .and_then(|n| n.parse::<usize>().ok())
                .ok_or_else(bad)?,
        };
        let suffix = &pattern[close + 1..];
        if suffix.contains('{') {
            return Err(bad());
        }
        Ok(Self { prefix: pattern[..open].to_string(), suffix: suffix.to_string(), pad })
    }

    pub fn format(&self, number: usize) -> String {
        format!("{}{:0pad$}{}", self.prefix, number, self.suffix, pad = self.pad)
    }
}

impl fmt::Display for FileNamePattern {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.pad {
            0 => write!(f, "{}{{}}{}", self.prefix, self.suffix),
            n => write!(f, "{}{{:0{n}}}{}", self.prefix, self.suffix),
        }
    }
}

// ── FontConfig ───────────────────────────────────────────────────────────────

/// Resolved atlas-construction parameters.
#[derive(Clone, Debug)]
pub struct FontConfig {
    pub directory: PathBuf,
    pub pattern: FileNamePattern,
    /// Source images per codepoint group.
    pub import_increment: usize,
    /// Output images per imported codepoint.
    pub export_increment: usize,
    /// Export slot → import slot. Slots past the end, or `None`, are blank.
    pub images_map: Vec<Option<usize>>,
    pub default_width: i32,
    pub default_height: i32,
    pub width_offset: i32,
    pub width_overrides: BTreeMap<String, i32>,
    /// Codepoint whose group starts at file number 0.
    pub start_codepoint: i32,
    pub include_names: bool,
    pub recolor: Option<Recolor>,
}

impl FontConfig {
    /// Apply defaults to the JSON-facing configuration. `base_dir` anchors a
    /// relative image directory.
    pub fn resolve(import: &FontImport, base_dir: &Path) -> Result<Self> {
        let export_default = import.images_map.as_ref().map_or(4, Vec::len);
        let export_increment = import.export_increment.unwrap_or(export_default);
        let images_map = match &import.images_map {
            Some(map) => map.clone(),
            None => (0..export_increment).map(Some).collect(),
        };
        let import_increment = import
            .import_increment
            .unwrap_or_else(|| images_map.iter().flatten().max().map_or(1, |m| m + 1));

        if import_increment == 0 {
            return Err(Error::malformed("font 'importIncrement' must be at least 1"));
        }
        if export_increment == 0 {
            return Err(Error::malformed("font 'exportIncrement' must be at least 1"));
        }

        Ok(Self {
            directory: base_dir.join(&import.image_directory),
            pattern: FileNamePattern::parse(&import.file_name)?,
            import_increment,
            export_increment,
            images_map,
            default_width: import.default_width,
            default_height: import.default_height,
            width_offset: import.width_offset,
            width_overrides: import.width_overrides.clone(),
            start_codepoint: import.start_codepoint,
            include_names: import.include_names,
            recolor: Recolor::from_config(import.recolor_to, import.selected_colors.as_deref()),
        })
    }

    /// First file number of `codepoint`'s group, or `None` when the codepoint
    /// lies below `start_codepoint`.
    pub fn file_base(&self, codepoint: u8) -> Option<usize> {
        let biased = codepoint as i64 - self.start_codepoint as i64;
        usize::try_from(biased).ok().map(|b| b * self.import_increment)
    }

    /// Width override for `codepoint`: by literal character first, then by
    /// decimal codepoint.
    pub fn width_override(&self, codepoint: u8) -> i32 {
        let ch = char::from(codepoint).to_string();
        self.width_overrides
            .get(&ch)
            .or_else(|| self.width_overrides.get(&codepoint.to_string()))
            .copied()
            .unwrap_or(0)
    }

    /// Fail unless the image directory exists and holds at least one file.
    pub fn check_assets(&self) -> Result<()> {
        if !self.directory.is_dir() {
            return Err(Error::MissingFontAssets(format!(
                "font image directory '{}' does not exist",
                self.directory.display()
            )));
        }
        let has_files = walkdir::WalkDir::new(&self.directory)
            .min_depth(1)
            .max_depth(1)
            .into_iter()
            .filter_map(|e| e.ok())
            .any(|e| e.file_type().is_file());
        if !has_files {
            return Err(Error::MissingFontAssets(format!(
                "font image directory '{}' contains no files",
                self.directory.display()
            )));
        }
        Ok(())
    }
}

// ── GlyphSource ──────────────────────────────────────────────────────────────

/// Supplies numbered glyph images.
pub trait GlyphSource {
    /// Load file `number`. `Ok(None)` when no such file exists; `Err` when a
    /// file exists but cannot be decoded.
    fn load(&mut self, number: usize) -> Result<Option<Sprite>>;
}

/// Glyph images read from a directory through a [`FileNamePattern`].
pub struct DirectorySource<'a> {
    pub directory: &'a Path,
    pub pattern: &'a FileNamePattern,
}

impl GlyphSource for DirectorySource<'_> {
    fn load(&mut self, number: usize) -> Result<Option<Sprite>> {
        let path = self.directory.join(self.pattern.format(number));
        if !path.is_file() {
            return Ok(None);
        }
        match Sprite::open(&path) {
            Ok(sprite) => Ok(Some(sprite)),
            Err(e) => Err(Error::ImageDecode(ImageFailure {
                slot: number,
                path: Some(path),
                reason: e.to_string(),
            })),
        }
    }
}

/// In-memory glyph images keyed by file number.
impl GlyphSource for HashMap<usize, Sprite> {
    fn load(&mut self, number: usize) -> Result<Option<Sprite>> {
        Ok(self.get(&number).cloned())
    }
}

// ── GlyphAtlas ───────────────────────────────────────────────────────────────

/// The output of [`build_glyph_atlas`].
#[derive(Clone, Debug)]
pub struct GlyphAtlas {
    /// Output image slots in order; `None` is a blank placeholder. The first
    /// `export_increment` slots are the reserved atlas entry 0.
    pub slots: Vec<Option<Placed>>,
    pub glyphs: GlyphTable,
    /// Codepoints that received an atlas entry, ascending.
    pub characters: Vec<u8>,
}

impl GlyphAtlas {
    /// Atlas entries including the reserved entry 0.
    pub fn num_images(&self) -> usize {
        self.characters.len() + 1
    }
}

fn unicode_name(codepoint: u8) -> Option<String> {
    unicode_names2::name(char::from(codepoint)).map(|n| n.to_string())
}

/// Build the glyph atlas and glyph table.
///
/// A present file that fails to decode aborts immediately.
pub fn build_glyph_atlas(config: &FontConfig, source: &mut impl GlyphSource) -> Result<GlyphAtlas> {
    let mut glyphs = GlyphTable::filled(&Glyph::blank(config.default_width, config.default_height));
    let mut slots: Vec<Option<Placed>> = (0..config.export_increment).map(|_| None).collect();
    let mut characters = Vec::new();

    for codepoint in 0..=u8::MAX {
        if config.include_names {
            glyphs[codepoint].codepoint = Some(codepoint);
            glyphs[codepoint].name = unicode_name(codepoint);
        }
        let Some(base) = config.file_base(codepoint) else { continue };

        let mut imported: Vec<Option<(usize, Sprite)>> = Vec::with_capacity(config.import_increment);
        for j in 0..config.import_increment {
            let number = base + j;
            let sprite = source.load(number)?.filter(|s| !s.is_empty()).map(|mut s| {
                s.recolor(config.recolor.as_ref());
                (number, s)
            });
            imported.push(sprite);
        }
        if imported.iter().all(Option::is_none) {
            debug!("codepoint {codepoint} has no images; skipping");
            continue;
        }

        characters.push(codepoint);
        let atlas_index = characters.len();
        let mut widest: Option<u32> = None;

        for k in 0..config.export_increment {
            let picked = config
                .images_map
                .get(k)
                .copied()
                .flatten()
                .and_then(|j| imported.get(j))
                .and_then(Option::as_ref);
            slots.push(picked.map(|(number, sprite)| {
                widest = Some(widest.map_or(sprite.width(), |w| w.max(sprite.width())));
                Placed {
                    record: PlacementRecord {
                        x: sprite.x,
                        y: sprite.y,
                        path: glyph_path(atlas_index, k),
                        source: *number,
                    },
                    sprite: sprite.clone(),
                }
            }));
        }

        let glyph = &mut glyphs[codepoint];
        glyph.atlas_index = atlas_index;
        glyph.width = widest.map_or(config.default_width, |w| w as i32)
            + config.width_offset
            + config.width_override(codepoint);
        debug!("codepoint {codepoint} -> atlas entry {atlas_index}, width {}", glyph.width);
    }

    info!(
        "imported {} font characters into {} atlas images",
        characters.len(),
        slots.len()
    );
    Ok(GlyphAtlas { slots, glyphs, characters })
}
