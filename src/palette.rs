//! Named object colours and remap-style recolouring of sprites.
//!
//! The game recolours parts of an object at runtime; source art marks those
//! parts with a remap colour (bright pink by convention). Recolouring a sprite
//! here repaints every opaque pixel whose nearest named colour is in the
//! selection with the target colour, keeping the pixel's relative brightness.
//! Pixels are matched against a shade ramp of each colour, so shadowed and
//! highlighted remap pixels still count as remap.

use std::fmt;

use image::{Rgba, RgbaImage};
use serde::Deserialize;

// ── NamedColor ───────────────────────────────────────────────────────────────

macro_rules! named_colors {
    ($($variant:ident => $name:literal, [$r:literal, $g:literal, $b:literal];)*) => {
        /// One of the game's 32 object colours.
        #[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, Deserialize)]
        #[serde(try_from = "String")]
        pub enum NamedColor {
            $($variant,)*
        }

        impl NamedColor {
            pub const ALL: &'static [NamedColor] = &[$(NamedColor::$variant,)*];

            /// Canonical snake_case name.
            pub fn name(self) -> &'static str {
                match self {
                    $(NamedColor::$variant => $name,)*
                }
            }

            /// Representative mid-ramp RGB value.
            pub fn rgb(self) -> [u8; 3] {
                match self {
                    $(NamedColor::$variant => [$r, $g, $b],)*
                }
            }
        }
    };
}

named_colors! {
    Black           => "black",             [ 35,  35,  35];
    Grey            => "grey",              [123, 123, 123];
    White           => "white",             [231, 231, 231];
    DarkPurple      => "dark_purple",       [ 87,  35, 103];
    LightPurple     => "light_purple",      [155, 107, 171];
    BrightPurple    => "bright_purple",     [163,  63, 223];
    DarkBlue        => "dark_blue",         [ 27,  51, 135];
    LightBlue       => "light_blue",        [ 95, 135, 195];
    IcyBlue         => "icy_blue",          [143, 187, 211];
    Teal            => "teal",              [ 39, 111, 111];
    Aquamarine      => "aquamarine",        [ 79, 167, 151];
    SaturatedGreen  => "saturated_green",   [ 43, 131,  55];
    DarkGreen       => "dark_green",        [ 43,  79,  35];
    MossGreen       => "moss_green",        [ 91, 107,  47];
    BrightGreen     => "bright_green",      [107, 203,  31];
    OliveGreen      => "olive_green",       [131, 139,  63];
    DarkOliveGreen  => "dark_olive_green",  [ 79,  87,  35];
    BrightYellow    => "bright_yellow",     [251, 231,   7];
    Yellow          => "yellow",            [219, 175,  43];
    DarkYellow      => "dark_yellow",       [163, 119,  15];
    LightOrange     => "light_orange",      [243, 151,  47];
    DarkOrange      => "dark_orange",       [203,  95,  27];
    LightBrown      => "light_brown",       [167, 123,  79];
    SaturatedBrown  => "saturated_brown",   [143,  79,  31];
    DarkBrown       => "dark_brown",        [ 91,  59,  39];
    SalmonPink      => "salmon_pink",       [235, 143, 123];
    BordeauxRed     => "bordeaux_red",      [123,  23,  39];
    SaturatedRed    => "saturated_red",     [199,  23,  23];
    BrightRed       => "bright_red",        [255,  39,  39];
    DarkPink        => "dark_pink",         [183,  39,  99];
    BrightPink      => "bright_pink",       [255,  75, 187];
    LightPink       => "light_pink",        [243, 155, 199];
}

impl NamedColor {
    /// The colour source art uses to mark recolourable areas.
    pub const REMAP: NamedColor = NamedColor::BrightPink;

    /// Look a colour up by name. Case, spaces and hyphens are ignored, so
    /// `"Bright Pink"`, `"bright-pink"` and `"bright_pink"` are the same colour.
    pub fn from_name(name: &str) -> Option<Self> {
        let key: String = name
            .trim()
            .chars()
            .map(|c| match c {
                ' ' | '-' => '_',
                c => c.to_ascii_lowercase(),
            })
            .collect();
        Self::ALL.iter().copied().find(|c| c.name() == key)
    }

    /// The named colour closest to `rgb` by squared distance.
    pub fn nearest(rgb: [u8; 3]) -> Self {
        Self::ALL
            .iter()
            .copied()
            .min_by_key(|c| distance_sq(c.rgb(), rgb))
            .unwrap_or(NamedColor::Black)
    }

    /// The named colour whose shade ramp passes closest to `rgb`.
    pub fn nearest_shade(rgb: [u8; 3]) -> Self {
        Self::ALL
            .iter()
            .copied()
            .min_by_key(|c| c.shades().map(|shade| distance_sq(shade, rgb)).min().unwrap_or(i32::MAX))
            .unwrap_or(NamedColor::Black)
    }

    /// The mid-ramp value scaled by each of [`SHADE_FACTORS`].
    pub fn shades(self) -> impl Iterator<Item = [u8; 3]> {
        let rgb = self.rgb();
        SHADE_FACTORS
            .iter()
            .map(move |&k| rgb.map(|c| (c as f32 * k).round().min(255.0) as u8))
    }
}

/// Brightness multipliers making up a colour's shade ramp.
pub const SHADE_FACTORS: [f32; 7] = [0.4, 0.55, 0.7, 0.85, 1.0, 1.15, 1.3];

fn distance_sq(a: [u8; 3], b: [u8; 3]) -> i32 {
    a.iter()
        .zip(b)
        .map(|(&x, y)| {
            let d = x as i32 - y as i32;
            d * d
        })
        .sum()
}

impl TryFrom<String> for NamedColor {
    type Error = String;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        NamedColor::from_name(&value).ok_or_else(|| format!("unknown colour name '{value}'"))
    }
}

impl fmt::Display for NamedColor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

// ── Recolor ──────────────────────────────────────────────────────────────────

/// A configured recolour: which colours to repaint and what to paint them.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Recolor {
    pub target: NamedColor,
    /// Source colours that get repainted. Empty means [`NamedColor::REMAP`].
    pub selection: Vec<NamedColor>,
}

impl Recolor {
    /// Build a recolour from optional configuration. `None` when no target is set.
    pub fn from_config(target: Option<NamedColor>, selection: Option<&[NamedColor]>) -> Option<Self> {
        target.map(|target| Self {
            target,
            selection: selection.map(<[NamedColor]>::to_vec).unwrap_or_default(),
        })
    }

    fn selects(&self, color: NamedColor) -> bool {
        if self.selection.is_empty() {
            color == NamedColor::REMAP
        } else {
            self.selection.contains(&color)
        }
    }

    /// Repaint `img` in place. Fully transparent pixels are left alone.
    pub fn apply(&self, img: &mut RgbaImage) {
        let [tr, tg, tb] = self.target.rgb();
        for px in img.pixels_mut() {
            let Rgba([r, g, b, a]) = *px;
            if a == 0 {
                continue;
            }
            let source = NamedColor::nearest_shade([r, g, b]);
            if !self.selects(source) {
                continue;
            }
            let scale = luma([r, g, b]) / luma(source.rgb()).max(1.0);
            let shade = |c: u8| (c as f32 * scale).round().clamp(0.0, 255.0) as u8;
            *px = Rgba([shade(tr), shade(tg), shade(tb), a]);
        }
    }
}

fn luma([r, g, b]: [u8; 3]) -> f32 {
    0.299 * r as f32 + 0.587 * g as f32 + 0.114 * b as f32
}
