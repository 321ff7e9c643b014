use std::fs;
use std::io::Read;
use std::path::Path;

use image::{Rgba, RgbaImage};
use sceneryc::compiler::expected_image_count;
use sceneryc::description::Description;
use sceneryc::error::ImagePhase;
use sceneryc::manifest::ManifestEntry;
use sceneryc::package::{ExportMode, package};
use sceneryc::{Error, build_scenery, compile};
use serde_json::{Value, json};

// ── fixtures ──────────────────────────────────────────────────────────────

fn write_png(path: &Path, w: u32, h: u32, seed: u8) {
    let mut img = RgbaImage::new(w, h);
    for (x, y, p) in img.enumerate_pixels_mut() {
        *p = Rgba([seed, (x % 256) as u8, (y % 256) as u8, 255]);
    }
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent).unwrap();
    }
    img.save(path).unwrap();
}

/// Writes a two-tile object with thumbnails and tile images under `root`.
fn write_object(root: &Path, with_font: bool) -> std::path::PathBuf {
    let mut images = Vec::new();
    for i in 0..4 {
        let name = format!("art/thumb{i}.png");
        write_png(&root.join(&name), 128, 156, i as u8);
        images.push(json!(format!("thumb{i}.png")));
    }
    for t in 0..2 {
        for r in 0..4 {
            let name = format!("tile{t}_{r}.png");
            write_png(&root.join("art").join(&name), 64, 48, (10 + t * 4 + r) as u8);
            images.push(json!(name));
        }
    }
    // Explicit anchor on tile 1 rotation 0.
    images[8] = json!({ "path": "tile1_0.png", "x": -32, "y": -40 });

    let mut doc = json!({
        "id": "test.scenery_large.sign",
        "objectType": "scenery_large",
        "properties": {
            "price": 10,
            "tiles": [ { "x": 0, "y": 0, "z": 0 }, { "x": 32, "y": 0, "z": 0 } ]
        },
        "importImages": {
            "imageBasePath": "art",
            "images": images
        }
    });

    if with_font {
        let glyphs = root.join("glyphs");
        fs::create_dir_all(&glyphs).unwrap();
        write_png(&glyphs.join("g65.png"), 6, 10, 1);
        write_png(&glyphs.join("g66.png"), 8, 10, 2);
        doc["properties"]["3dFont"] = json!({ "maxWidth": 64, "numLines": 1 });
        doc["importImages"]["3dFont"] = json!({
            "imageDirectory": "glyphs",
            "fileName": "g{}.png",
            "importIncrement": 1,
            "imagesMap": [0, null],
            "defaultHeight": 10,
            "includeNames": true
        });
    }

    let path = root.join("object.json");
    fs::write(&path, serde_json::to_string_pretty(&doc).unwrap()).unwrap();
    path
}

// ── compile ───────────────────────────────────────────────────────────────

#[test]
fn compiled_manifest_has_expected_layout() {
    let tmp = tempfile::tempdir().unwrap();
    let path = write_object(tmp.path(), false);
    let compiled = compile(&Description::load(&path).unwrap()).unwrap();

    assert_eq!(compiled.manifest.len(), expected_image_count(2, None));
    assert_eq!(compiled.thumbnail_scale, 0.5);

    let images = compiled.document["images"].as_array().unwrap();
    assert_eq!(images.len(), 12);
    assert_eq!(images[0], json!({ "x": -32, "y": 0, "path": "images/thumb_0.png" }));
    // Tile 0 at the origin; default anchor is the sprite centre (-32, -24).
    assert_eq!(images[4], json!({ "x": -32, "y": -24 + 15, "path": "images/tile_0_im_0.png" }));
    // Tile 1 rotation 0 uses its explicit anchor; (32, 0) projects to (32, -16).
    assert_eq!(images[8], json!({ "x": 0, "y": -40 - 16 + 15, "path": "images/tile_1_im_0.png" }));
    // Tile 1 rotation 1: (0, -32) projects to (32, 16).
    assert_eq!(images[9], json!({ "x": 0, "y": -24 + 16 + 15, "path": "images/tile_1_im_1.png" }));

    assert!(compiled.document.get("importImages").is_none());
    assert_eq!(compiled.document["properties"]["price"], json!(10));
}

#[test]
fn font_slots_come_first() {
    let tmp = tempfile::tempdir().unwrap();
    let path = write_object(tmp.path(), true);
    let compiled = compile(&Description::load(&path).unwrap()).unwrap();

    assert_eq!(compiled.manifest.len(), expected_image_count(2, Some((2, 2))));
    let entries = compiled.manifest.entries();
    assert_eq!(entries[0], ManifestEntry::Blank);
    assert_eq!(entries[1], ManifestEntry::Blank);
    assert!(matches!(&entries[2], ManifestEntry::Image(p) if p.record.path == "images/font_1_0.png"));
    assert_eq!(entries[3], ManifestEntry::Blank);

    let font = &compiled.document["properties"]["3dFont"];
    assert_eq!(font["numImages"], json!(3));
    assert_eq!(font["maxWidth"], json!(64));
    let glyphs = font["glyphs"].as_array().unwrap();
    assert_eq!(glyphs.len(), 256);
    assert_eq!(glyphs[66]["image"], json!(2));
    assert_eq!(glyphs[66]["width"], json!(8));
    assert_eq!(glyphs[66]["name"], json!("LATIN CAPITAL LETTER B"));
    assert_eq!(glyphs[67]["image"], json!(0));
    assert_eq!(glyphs[67]["codepoint"], json!(67));

    let images = compiled.document["images"].as_array().unwrap();
    assert_eq!(images[0], json!(""));
    assert_eq!(images[6]["path"], json!("images/thumb_0.png"));
}

#[test]
fn missing_images_are_all_reported() {
    let tmp = tempfile::tempdir().unwrap();
    let path = write_object(tmp.path(), false);
    fs::remove_file(tmp.path().join("art/tile0_1.png")).unwrap();
    fs::remove_file(tmp.path().join("art/tile1_3.png")).unwrap();

    let out = tmp.path().join("out");
    let err = build_scenery(&path, &ExportMode::Unzip(out.clone())).unwrap_err();
    match err {
        Error::ImagePhase { phase, failures } => {
            assert_eq!(phase, ImagePhase::Tiles);
            let slots: Vec<usize> = failures.iter().map(|f| f.slot).collect();
            assert_eq!(slots, vec![5, 11]);
        }
        other => panic!("unexpected error {other:?}"),
    }
    assert!(!out.exists(), "nothing is written on failure");
}

#[test]
fn missing_thumbnails_are_all_reported_before_tiles() {
    let tmp = tempfile::tempdir().unwrap();
    let path = write_object(tmp.path(), false);
    fs::remove_file(tmp.path().join("art/thumb1.png")).unwrap();
    fs::remove_file(tmp.path().join("art/thumb3.png")).unwrap();
    // A tile failure would be reported too if the tile phase had run.
    fs::remove_file(tmp.path().join("art/tile0_0.png")).unwrap();

    let out = tmp.path().join("out");
    let err = build_scenery(&path, &ExportMode::Unzip(out.clone())).unwrap_err();
    match err {
        Error::ImagePhase { phase, failures } => {
            assert_eq!(phase, ImagePhase::Thumbnails);
            let slots: Vec<usize> = failures.iter().map(|f| f.slot).collect();
            assert_eq!(slots, vec![1, 3]);
            assert!(failures.iter().all(|f| f.path.is_some()));
        }
        other => panic!("unexpected error {other:?}"),
    }
    assert!(!out.exists());
}

#[test]
fn invalid_json_is_malformed() {
    let tmp = tempfile::tempdir().unwrap();
    let path = tmp.path().join("object.json");
    fs::write(&path, "{ \"id\": ").unwrap();
    assert!(matches!(Description::load(&path), Err(Error::MalformedInput(_))));
}

#[test]
fn non_object_font_fails_before_image_work() {
    let tmp = tempfile::tempdir().unwrap();
    let path = write_object(tmp.path(), false);
    let mut doc: Value = serde_json::from_str(&fs::read_to_string(&path).unwrap()).unwrap();
    doc["properties"]["3dFont"] = json!(true);
    fs::write(&path, doc.to_string()).unwrap();
    fs::remove_dir_all(tmp.path().join("art")).unwrap();

    assert!(matches!(build_scenery(&path, &ExportMode::NoExport), Err(Error::MalformedInput(_))));
}

#[test]
fn wrong_extension_is_rejected() {
    let tmp = tempfile::tempdir().unwrap();
    let path = tmp.path().join("object.txt");
    fs::write(&path, "{}").unwrap();
    assert!(matches!(Description::load(&path), Err(Error::MalformedInput(_))));
}

#[test]
fn font_without_glyph_directory_aborts() {
    let tmp = tempfile::tempdir().unwrap();
    let path = write_object(tmp.path(), true);
    fs::remove_dir_all(tmp.path().join("glyphs")).unwrap();
    let err = compile(&Description::load(&path).unwrap()).unwrap_err();
    assert!(matches!(err, Error::MissingFontAssets(_)));
}

// ── packaging ─────────────────────────────────────────────────────────────

#[test]
fn unzip_round_trip_preserves_pixels_and_description() {
    let tmp = tempfile::tempdir().unwrap();
    let path = write_object(tmp.path(), true);
    let compiled = compile(&Description::load(&path).unwrap()).unwrap();

    let out = tmp.path().join("out");
    let written = package(&compiled.id, &compiled.manifest, &compiled.document, &ExportMode::Unzip(out.clone()))
        .unwrap()
        .unwrap();
    assert_eq!(written, out.join("test.scenery_large.sign"));

    let text = fs::read_to_string(written.join("object.json")).unwrap();
    let doc: Value = serde_json::from_str(&text).unwrap();
    assert_eq!(doc, compiled.document);

    for placed in compiled.manifest.images() {
        let decoded = image::open(written.join(&placed.record.path)).unwrap().to_rgba8();
        assert_eq!(decoded, placed.sprite.image, "{}", placed.record.path);
    }
    let files = fs::read_dir(written.join("images")).unwrap().count();
    assert_eq!(files, compiled.manifest.images().count());
}

#[test]
fn unzip_replaces_existing_directory() {
    let tmp = tempfile::tempdir().unwrap();
    let path = write_object(tmp.path(), false);
    let dest = tmp.path().join("exact");
    fs::create_dir_all(dest.join("images")).unwrap();
    fs::write(dest.join("images/stale.png"), b"old").unwrap();

    build_scenery(&path, &ExportMode::UnzipAbs(dest.clone())).unwrap();
    assert!(!dest.join("images/stale.png").exists());
    assert!(dest.join("object.json").is_file());
}

#[test]
fn parkobj_is_a_zip_with_description_and_images() {
    let tmp = tempfile::tempdir().unwrap();
    let path = write_object(tmp.path(), false);
    let out = tmp.path().join("objects");

    let written = build_scenery(&path, &ExportMode::Parkobj(out.clone())).unwrap().unwrap();
    assert_eq!(written, out.join("test.scenery_large.sign.parkobj"));
    assert!(!out.join("test.scenery_large.sign.zip").exists());

    let mut archive = zip::ZipArchive::new(fs::File::open(&written).unwrap()).unwrap();
    let mut json = String::new();
    archive.by_name("object.json").unwrap().read_to_string(&mut json).unwrap();
    let doc: Value = serde_json::from_str(&json).unwrap();
    assert_eq!(doc["images"].as_array().unwrap().len(), 12);
    assert!(archive.by_name("images/tile_1_im_3.png").is_ok());
}

#[test]
fn failed_parkobj_write_leaves_no_partial_archive() {
    let tmp = tempfile::tempdir().unwrap();
    let path = write_object(tmp.path(), false);
    let out = tmp.path().join("objects");
    let blocked = out.join("test.scenery_large.sign.parkobj");
    fs::create_dir_all(&blocked).unwrap();

    let err = build_scenery(&path, &ExportMode::Parkobj(out.clone())).unwrap_err();
    assert!(matches!(err, Error::Io { .. }), "{err:?}");
    let left: Vec<_> = fs::read_dir(&out).unwrap().map(|e| e.unwrap().path()).collect();
    assert_eq!(left, vec![blocked.clone()]);
    assert!(fs::read_dir(&blocked).unwrap().next().is_none());
}

#[test]
fn no_export_writes_nothing() {
    let tmp = tempfile::tempdir().unwrap();
    let path = write_object(tmp.path(), false);
    assert_eq!(build_scenery(&path, &ExportMode::NoExport).unwrap(), None);
}
