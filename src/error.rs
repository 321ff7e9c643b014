use std::fmt;
use std::path::PathBuf;

// ── ImagePhase ───────────────────────────────────────────────────────────────

/// The image-loading phase a failure was collected in.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum ImagePhase {
    Thumbnails,
    Tiles,
}

impl fmt::Display for ImagePhase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            ImagePhase::Thumbnails => "thumbnail",
            ImagePhase::Tiles => "tile",
        })
    }
}

// ── ImageFailure ─────────────────────────────────────────────────────────────

/// One source image that could not be loaded.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ImageFailure {
    /// Index into the description's `images` list (or the file number for fonts).
    pub slot: usize,
    /// Resolved source path, when the slot referenced one.
    pub path: Option<PathBuf>,
    pub reason: String,
}

impl fmt::Display for ImageFailure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.path {
            Some(p) => write!(f, "image {} ({}): {}", self.slot, p.display(), self.reason),
            None => write!(f, "image {}: {}", self.slot, self.reason),
        }
    }
}

// ── Error ────────────────────────────────────────────────────────────────────

#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// The description is missing a required section or has the wrong shape.
    #[error("malformed input: {0}")]
    MalformedInput(String),

    /// A single image failed while the phase was set to fail fast.
    #[error("failed to decode {0}")]
    ImageDecode(ImageFailure),

    /// Every image failure collected during one phase.
    #[error("{} {phase} image(s) failed to load", .failures.len())]
    ImagePhase {
        phase: ImagePhase,
        failures: Vec<ImageFailure>,
    },

    /// The object declares a 3D sign but its glyph images are unavailable.
    #[error("missing font assets: {0}")]
    MissingFontAssets(String),

    #[error("io error at {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error(transparent)]
    Json(#[from] serde_json::Error),

    #[error("failed to encode {path}: {source}")]
    Encode {
        path: PathBuf,
        #[source]
        source: image::ImageError,
    },

    #[error(transparent)]
    Archive(#[from] zip::result::ZipError),
}

impl Error {
    pub(crate) fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Error::Io { path: path.into(), source }
    }

    pub(crate) fn malformed(msg: impl Into<String>) -> Self {
        Error::MalformedInput(msg.into())
    }
}

pub type Result<T, E = Error> = std::result::Result<T, E>;
