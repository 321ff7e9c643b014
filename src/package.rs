//! Writing a compiled object to disk: a staging directory, then either a
//! loose object directory or a `.parkobj` archive.

use std::ffi::OsString;
use std::fs::{self, File};
use std::io::{self, BufWriter, Write};
use std::path::{Path, PathBuf};

use log::info;
use serde_json::Value;
use tempfile::TempDir;
use zip::write::SimpleFileOptions;
use zip::{CompressionMethod, ZipWriter};

use crate::error::{Error, Result};
use crate::manifest::Manifest;

/// Extension the game expects on object archives.
pub const ARCHIVE_EXTENSION: &str = "parkobj";
/// Name of the description inside the object.
pub const DESCRIPTION_FILE: &str = "object.json";

// ── ExportMode ───────────────────────────────────────────────────────────────

/// Where and how a compiled object is written.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum ExportMode {
    /// Compile and validate only.
    NoExport,
    /// Loose directory named after the object id inside this directory.
    Unzip(PathBuf),
    /// Loose directory at exactly this path.
    UnzipAbs(PathBuf),
    /// `<id>.parkobj` inside this directory.
    Parkobj(PathBuf),
    /// Archive at this path (`.parkobj` is appended when missing).
    ParkobjAbs(PathBuf),
}

impl ExportMode {
    /// Destination for object `id`, or `None` for [`ExportMode::NoExport`].
    pub fn destination(&self, id: &str) -> Option<PathBuf> {
        match self {
            ExportMode::NoExport => None,
            ExportMode::Unzip(dir) => Some(dir.join(id)),
            ExportMode::UnzipAbs(path) => Some(path.clone()),
            ExportMode::Parkobj(dir) => Some(with_archive_extension(&dir.join(id))),
            ExportMode::ParkobjAbs(path) => Some(with_archive_extension(path)),
        }
    }
}

fn append_extension(path: &Path, ext: &str) -> PathBuf {
    let mut s = OsString::from(path.as_os_str());
    s.push(".");
    s.push(ext);
    PathBuf::from(s)
}

/// Object ids contain dots, so the extension is appended rather than swapped.
fn with_archive_extension(path: &Path) -> PathBuf {
    if path.extension().is_some_and(|e| e == ARCHIVE_EXTENSION) {
        path.to_path_buf()
    } else {
        append_extension(path, ARCHIVE_EXTENSION)
    }
}

// ── Staging ──────────────────────────────────────────────────────────────────

/// Write all images and the description into a fresh temporary directory.
/// The directory is removed when the returned handle drops.
pub fn stage(manifest: &Manifest, document: &Value) -> Result<TempDir> {
    let staging = tempfile::Builder::new()
        .prefix("sceneryc-")
        .tempdir()
        .map_err(|e| Error::io(std::env::temp_dir(), e))?;
    let root = staging.path();
    info!("created staging directory {}", root.display());

    fs::create_dir_all(root.join("images")).map_err(|e| Error::io(root.join("images"), e))?;
    manifest.write_images(root)?;

    let json_path = root.join(DESCRIPTION_FILE);
    let file = File::create(&json_path).map_err(|e| Error::io(&json_path, e))?;
    serde_json::to_writer_pretty(BufWriter::new(file), document)?;
    info!("saved configuration {}", json_path.display());
    Ok(staging)
}

// ── Output ───────────────────────────────────────────────────────────────────

/// Package a compiled object according to `mode`. Returns the written path.
pub fn package(id: &str, manifest: &Manifest, document: &Value, mode: &ExportMode) -> Result<Option<PathBuf>> {
    let Some(destination) = mode.destination(id) else {
        info!("no-export requested; nothing written");
        return Ok(None);
    };
    let staging = stage(manifest, document)?;

    match mode {
        ExportMode::Unzip(_) | ExportMode::UnzipAbs(_) => {
            write_directory(staging.path(), &destination)?;
            info!("unzipped object written to {}", destination.display());
        }
        _ => {
            write_archive(staging.path(), &destination)?;
            info!("parkobj written to {}", destination.display());
        }
    }
    Ok(Some(destination))
}

/// Replace `destination` with a copy of the staged tree.
pub fn write_directory(staging: &Path, destination: &Path) -> Result<()> {
    match fs::remove_dir_all(destination) {
        Ok(()) => {}
        Err(e) if e.kind() == io::ErrorKind::NotFound => {}
        Err(e) => return Err(Error::io(destination, e)),
    }
    fs::create_dir_all(destination).map_err(|e| Error::io(destination, e))?;

    for entry in walkdir::WalkDir::new(staging).min_depth(1).sort_by_file_name() {
        let entry = entry.map_err(|e| Error::io(staging, e.into()))?;
        let relative = entry.path().strip_prefix(staging).unwrap_or(entry.path());
        let target = destination.join(relative);
        if entry.file_type().is_dir() {
            fs::create_dir_all(&target).map_err(|e| Error::io(&target, e))?;
        } else {
            fs::copy(entry.path(), &target).map_err(|e| Error::io(&target, e))?;
        }
    }
    Ok(())
}

/// Zip the staged tree into a temporary file beside `destination`, then
/// persist it into place. The temporary file is deleted on any failure.
pub fn write_archive(staging: &Path, destination: &Path) -> Result<()> {
    let parent = match destination.parent().filter(|p| !p.as_os_str().is_empty()) {
        Some(parent) => parent,
        None => Path::new("."),
    };
    fs::create_dir_all(parent).map_err(|e| Error::io(parent, e))?;
    let mut archive = tempfile::Builder::new()
        .prefix(".sceneryc-")
        .suffix(".zip")
        .tempfile_in(parent)
        .map_err(|e| Error::io(parent, e))?;
    let archive_path = archive.path().to_path_buf();

    let mut zip = ZipWriter::new(BufWriter::new(archive.as_file_mut()));
    let options = SimpleFileOptions::default().compression_method(CompressionMethod::Deflated);

    for entry in walkdir::WalkDir::new(staging).min_depth(1).sort_by_file_name() {
        let entry = entry.map_err(|e| Error::io(staging, e.into()))?;
        let relative = entry.path().strip_prefix(staging).unwrap_or(entry.path());
        let name = relative
            .components()
            .map(|c| c.as_os_str().to_string_lossy())
            .collect::<Vec<_>>()
            .join("/");
        if entry.file_type().is_dir() {
            zip.add_directory(name, options)?;
        } else {
            zip.start_file(name, options)?;
            let mut src = File::open(entry.path()).map_err(|e| Error::io(entry.path(), e))?;
            io::copy(&mut src, &mut zip).map_err(|e| Error::io(entry.path(), e))?;
        }
    }
    zip.finish()?.flush().map_err(|e| Error::io(&archive_path, e))?;

    archive.persist(destination).map_err(|e| Error::io(destination, e.error))?;
    Ok(())
}
