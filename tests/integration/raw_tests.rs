//! RAW files through an external decoder.
//!
//! Tests verify:
//! - Registered attributes reported by the decoder land in the store
//! - Thumbnails are taken from the reserved keys (inline bytes or file range)
//! - RAW sources are read-only

use std::fs;

use exif_editor::metadata::keys;
use exif_editor::{
    names, DirectoryGroup, ExifError, ExifFile, RawAttributes, RawValue, SourceKind,
};

use super::test_utils::create_thumbnail;

/// A fake RAW container: magic, padding, then the thumbnail bytes.
const RAW_MAGIC: &[u8] = b"FAKERAW\0";
const THUMBNAIL_OFFSET: usize = 64;

fn create_raw() -> Vec<u8> {
    let mut data = RAW_MAGIC.to_vec();
    data.resize(THUMBNAIL_OFFSET, 0);
    data.extend(create_thumbnail());
    data.extend([0u8; 16]);
    data
}

fn attributes(pairs: Vec<(&str, RawValue)>) -> RawAttributes {
    pairs
        .into_iter()
        .map(|(key, value)| (key.to_string(), value))
        .collect()
}

/// Decoder reporting the thumbnail as a file range.
fn range_decoder(data: &[u8]) -> Result<Option<RawAttributes>, ExifError> {
    if !data.starts_with(RAW_MAGIC) {
        return Ok(None);
    }
    Ok(Some(attributes(vec![
        (names::MAKE, "Fakon".into()),
        (names::MODEL, "R1".into()),
        (names::F_NUMBER, "4.0".into()),
        ("MakerSecret", "ignored".into()),
        (keys::HAS_THUMBNAIL, "true".into()),
        (keys::THUMBNAIL_OFFSET, THUMBNAIL_OFFSET.to_string().into()),
        (keys::THUMBNAIL_LENGTH, create_thumbnail().len().to_string().into()),
    ])))
}

fn write_raw() -> (tempfile::TempDir, std::path::PathBuf) {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("photo.raw");
    fs::write(&path, create_raw()).unwrap();
    (dir, path)
}

// =============================================================================
// Import Tests
// =============================================================================

#[test]
fn test_raw_attributes_are_imported() {
    let (_dir, path) = write_raw();
    let file = ExifFile::load_with_decoder(path.as_path(), &range_decoder).unwrap();

    assert_eq!(file.source_kind(), SourceKind::Raw);
    assert!(file.is_supported());
    assert_eq!(file.attribute(names::MAKE).as_deref(), Some("Fakon"));
    assert_eq!(file.attribute(names::F_NUMBER).as_deref(), Some("4.0"));
    assert!(!file.has_attribute("MakerSecret"));
    assert!(!file.has_attribute(keys::HAS_THUMBNAIL));

    // With a thumbnail present, thumbnail-group tags are written there too
    assert!(file
        .store()
        .contains_in(DirectoryGroup::Thumbnail, names::MAKE));
}

#[test]
fn test_raw_thumbnail_from_file_range() {
    let (_dir, path) = write_raw();
    let file = ExifFile::load_with_decoder(path.as_path(), &range_decoder).unwrap();

    assert_eq!(
        file.thumbnail_range(),
        Some((THUMBNAIL_OFFSET as u64, create_thumbnail().len()))
    );
    assert_eq!(
        file.thumbnail().unwrap().unwrap().as_ref(),
        create_thumbnail().as_slice()
    );
}

#[test]
fn test_raw_thumbnail_from_inline_bytes() {
    let decoder = |_: &[u8]| -> Result<Option<RawAttributes>, ExifError> {
        Ok(Some(attributes(vec![
            (keys::HAS_THUMBNAIL, "true".into()),
            (keys::THUMBNAIL_DATA, create_thumbnail().into()),
        ])))
    };
    let (_dir, path) = write_raw();
    let file = ExifFile::load_with_decoder(path.as_path(), &decoder).unwrap();

    assert!(file.has_thumbnail());
    assert_eq!(
        file.thumbnail().unwrap().unwrap().as_ref(),
        create_thumbnail().as_slice()
    );
}

#[test]
fn test_raw_without_thumbnail() {
    let decoder = |_: &[u8]| -> Result<Option<RawAttributes>, ExifError> {
        Ok(Some(attributes(vec![
            (keys::HAS_THUMBNAIL, "false".into()),
            (keys::THUMBNAIL_OFFSET, "64".into()),
            (keys::THUMBNAIL_LENGTH, "10".into()),
            (names::MAKE, "Fakon".into()),
        ])))
    };
    let (_dir, path) = write_raw();
    let file = ExifFile::load_with_decoder(path.as_path(), &decoder).unwrap();

    assert!(!file.has_thumbnail());
    assert!(file.store().is_group_empty(DirectoryGroup::Thumbnail));
}

// =============================================================================
// Fallback Tests
// =============================================================================

#[test]
fn test_unrecognized_raw_is_unsupported() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("photo.bin");
    fs::write(&path, b"something else entirely").unwrap();

    let file = ExifFile::load_with_decoder(path.as_path(), &range_decoder).unwrap();
    assert_eq!(file.source_kind(), SourceKind::Unsupported);
    assert_eq!(file.attribute(names::ORIENTATION).as_deref(), Some("0"));
}

#[test]
fn test_jpeg_bypasses_decoder() {
    let decoder = |_: &[u8]| -> Result<Option<RawAttributes>, ExifError> {
        panic!("decoder must not be called for JPEG data")
    };
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("photo.jpg");
    fs::write(&path, super::test_utils::create_test_jpeg(16, 16, 80)).unwrap();

    let file = ExifFile::load_with_decoder(path.as_path(), &decoder).unwrap();
    assert_eq!(file.source_kind(), SourceKind::Jpeg);
}

#[test]
fn test_raw_save_is_rejected() {
    let (_dir, path) = write_raw();
    let mut file = ExifFile::load_with_decoder(path.as_path(), &range_decoder).unwrap();

    file.set_attribute(names::MODEL, Some("R2"));
    let result = file.save_attributes();

    assert!(matches!(result, Err(ExifError::UnsupportedSource(_))));
    assert_eq!(fs::read(&path).unwrap(), create_raw());
}
