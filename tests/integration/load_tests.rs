//! Loading and querying metadata.
//!
//! Tests verify:
//! - Both byte orders decode to the same attributes
//! - Exif and GPS sub-directories are followed, IFD1 becomes the thumbnail group
//! - Legacy tags read back in their decimal / `HH:MM:SS` forms
//! - Broken input either fails (truncation) or degrades to defaults

use std::fs;
use std::io::Cursor;

use exif_editor::{
    names, AttributeValue, ByteOrder, DirectoryGroup, ExifError, ExifFile, ImageSource,
    SourceKind,
};

use super::test_utils::{
    camera_exif, create_exif_jpeg, create_test_jpeg, create_thumbnail, insert_segment, tag,
    ByteOrderType, ExifBuilder, IfdBuilder, Value,
};

fn write_temp(data: &[u8]) -> (tempfile::TempDir, std::path::PathBuf) {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("photo.jpg");
    fs::write(&path, data).unwrap();
    (dir, path)
}

fn load_bytes(data: &[u8]) -> ExifFile {
    ExifFile::load(ImageSource::stream(Cursor::new(data.to_vec()))).unwrap()
}

// =============================================================================
// Byte Order Tests
// =============================================================================

#[test]
fn test_little_and_big_endian_decode_identically() {
    let le = load_bytes(&create_exif_jpeg(&camera_exif(ByteOrderType::LittleEndian)));
    let be = load_bytes(&create_exif_jpeg(&camera_exif(ByteOrderType::BigEndian)));

    assert_eq!(le.byte_order(), ByteOrder::LittleEndian);
    assert_eq!(be.byte_order(), ByteOrder::BigEndian);
    assert_eq!(le.store(), be.store());
    assert_eq!(le.source_kind(), SourceKind::Jpeg);
}

#[test]
fn test_primary_attributes() {
    let file = load_bytes(&create_exif_jpeg(&camera_exif(ByteOrderType::LittleEndian)));

    assert!(file.is_supported());
    assert_eq!(file.attribute(names::MAKE).as_deref(), Some("Acme"));
    assert_eq!(file.attribute(names::MODEL).as_deref(), Some("Shooter 3000"));
    assert_eq!(file.attribute_int(names::ORIENTATION, 0), 6);
    assert_eq!(file.rotation_degrees(), 90);
    assert_eq!(file.attribute("NotATag"), None);
}

#[test]
fn test_frame_dimensions_override_tags() {
    let file = load_bytes(&create_exif_jpeg(&camera_exif(ByteOrderType::BigEndian)));

    assert_eq!(file.attribute(names::IMAGE_WIDTH).as_deref(), Some("64"));
    assert_eq!(file.attribute(names::IMAGE_LENGTH).as_deref(), Some("48"));
    assert_eq!(
        file.store().get_in(DirectoryGroup::Primary, names::IMAGE_WIDTH),
        Some(&AttributeValue::Long(vec![64]))
    );
}

// =============================================================================
// Sub-directory Tests
// =============================================================================

#[test]
fn test_exif_group_and_legacy_values() {
    let file = load_bytes(&create_exif_jpeg(&camera_exif(ByteOrderType::LittleEndian)));

    assert!(file.store().contains_in(DirectoryGroup::Exif, names::F_NUMBER));
    assert_eq!(file.attribute(names::F_NUMBER).as_deref(), Some("2.8"));
    assert_eq!(file.attribute(names::EXPOSURE_TIME).as_deref(), Some("0.01"));
    assert_eq!(file.attribute_double(names::F_NUMBER, 0.0), 2.8);
    assert_eq!(file.attribute_int(names::ISO_SPEED_RATINGS, 0), 200);

    // Pointer tags are structural and never surface as attributes
    assert!(!file.has_attribute(names::EXIF_IFD_POINTER));
    assert!(!file.has_attribute(names::GPS_INFO_IFD_POINTER));
}

#[test]
fn test_gps_accessors() {
    let file = load_bytes(&create_exif_jpeg(&camera_exif(ByteOrderType::BigEndian)));

    let (latitude, longitude) = file.lat_long().unwrap();
    assert!((latitude - 37.422166).abs() < 1e-5, "{latitude}");
    assert!((longitude + 122.084).abs() < 1e-5, "{longitude}");

    assert_eq!(file.altitude(0.0), -12.5);
    assert_eq!(file.attribute(names::GPS_TIMESTAMP).as_deref(), Some("08:30:15"));
    assert_eq!(file.gps_date_time(), Some(1_456_734_615_000));
}

#[test]
fn test_date_time_uses_original_and_subseconds() {
    let file = load_bytes(&create_exif_jpeg(&camera_exif(ByteOrderType::LittleEndian)));

    // DateTime is replaced by DateTimeOriginal on load
    assert_eq!(
        file.attribute(names::DATETIME).as_deref(),
        Some("2016:02:29 12:00:00")
    );
    assert_eq!(file.date_time(), Some(1_456_747_200_123));
}

// =============================================================================
// Thumbnail Tests
// =============================================================================

#[test]
fn test_primary_shadows_thumbnail() {
    let file = load_bytes(&create_exif_jpeg(&camera_exif(ByteOrderType::LittleEndian)));

    assert_eq!(file.attribute(names::MAKE).as_deref(), Some("Acme"));
    assert_eq!(
        file.store().get_in(DirectoryGroup::Thumbnail, names::MAKE),
        Some(&AttributeValue::Ascii("ThumbMaker".to_string()))
    );
}

#[test]
fn test_thumbnail_from_file() {
    let jpeg = create_exif_jpeg(&camera_exif(ByteOrderType::BigEndian));
    let (_dir, path) = write_temp(&jpeg);
    let file = ExifFile::load(path.as_path()).unwrap();

    assert!(file.has_thumbnail());
    let thumbnail = file.thumbnail().unwrap().unwrap();
    assert_eq!(thumbnail.as_ref(), create_thumbnail().as_slice());

    let (offset, length) = file.thumbnail_range().unwrap();
    assert_eq!(&jpeg[offset as usize..offset as usize + length], thumbnail.as_ref());
}

#[test]
fn test_thumbnail_cached_for_streams() {
    let file = load_bytes(&create_exif_jpeg(&camera_exif(ByteOrderType::LittleEndian)));
    let thumbnail = file.thumbnail().unwrap().unwrap();
    assert_eq!(thumbnail.as_ref(), create_thumbnail().as_slice());
}

#[test]
fn test_thumbnail_absent() {
    let tiff = ExifBuilder::new()
        .primary(IfdBuilder::new().entry(tag::MAKE, Value::ascii("Acme")))
        .build();
    let file = load_bytes(&create_exif_jpeg(&tiff));

    assert!(!file.has_thumbnail());
    assert!(file.thumbnail().unwrap().is_none());
    assert!(file.store().is_group_empty(DirectoryGroup::Thumbnail));
}

#[test]
fn test_invalid_next_ifd_offset_is_ignored() {
    let tiff = ExifBuilder::new()
        .primary(IfdBuilder::new().entry(tag::MODEL, Value::ascii("X")))
        .with_next_ifd_offset(0x00FF_FFFF)
        .build();
    let file = load_bytes(&create_exif_jpeg(&tiff));

    assert!(file.is_supported());
    assert_eq!(file.attribute(names::MODEL).as_deref(), Some("X"));
    assert!(file.store().is_group_empty(DirectoryGroup::Thumbnail));
    assert!(!file.has_thumbnail());
}

#[test]
fn test_truncated_next_ifd_target_is_ignored() {
    let primary = || IfdBuilder::new().entry(tag::MODEL, Value::ascii("X"));
    let len = ExifBuilder::new().primary(primary()).build().len();
    // Points at the final byte, too short for an entry count
    let tiff = ExifBuilder::new()
        .primary(primary())
        .with_next_ifd_offset(len as u32 - 1)
        .build();
    assert_eq!(tiff.len(), len);

    let file = ExifFile::load(ImageSource::stream(Cursor::new(create_exif_jpeg(&tiff)))).unwrap();

    assert!(file.is_supported());
    assert_eq!(file.attribute(names::MODEL).as_deref(), Some("X"));
    assert!(file.store().is_group_empty(DirectoryGroup::Thumbnail));
    assert!(!file.has_thumbnail());
}

// =============================================================================
// Defaults and Degraded Input
// =============================================================================

#[test]
fn test_defaults_without_exif() {
    let file = load_bytes(&create_test_jpeg(32, 16, 80));

    assert!(file.is_supported());
    assert_eq!(file.attribute(names::IMAGE_WIDTH).as_deref(), Some("32"));
    assert_eq!(file.attribute(names::IMAGE_LENGTH).as_deref(), Some("16"));
    assert_eq!(file.attribute(names::ORIENTATION).as_deref(), Some("0"));
    assert_eq!(file.attribute(names::LIGHT_SOURCE).as_deref(), Some("0"));
    assert_eq!(file.rotation_degrees(), 0);
    assert_eq!(file.date_time(), None);
    assert_eq!(file.lat_long(), None);
}

#[test]
fn test_comment_segment_becomes_user_comment() {
    let jpeg = insert_segment(&create_test_jpeg(16, 16, 80), 0xFE, b"hello world\0");
    let file = load_bytes(&jpeg);
    assert_eq!(file.attribute(names::USER_COMMENT).as_deref(), Some("hello world"));
}

#[test]
fn test_truncated_file_is_an_error() {
    let jpeg = create_exif_jpeg(&camera_exif(ByteOrderType::LittleEndian));
    let result = ExifFile::load(ImageSource::stream(Cursor::new(jpeg[..40].to_vec())));

    match result {
        Err(err) => assert!(err.is_truncation(), "{err}"),
        Ok(_) => panic!("truncated input must fail"),
    }
}

#[test]
fn test_corrupt_tiff_header_degrades_to_defaults() {
    let file = load_bytes(&create_exif_jpeg(b"XX\x00\x2a\x00\x00\x00\x08\x00\x00"));

    assert!(!file.is_supported());
    assert_eq!(file.source_kind(), SourceKind::Unsupported);
    assert_eq!(file.attribute(names::ORIENTATION).as_deref(), Some("0"));
    assert_eq!(file.attribute(names::IMAGE_WIDTH).as_deref(), Some("0"));
}

#[test]
fn test_non_jpeg_without_decoder_is_unsupported() {
    let file = load_bytes(b"definitely not an image");
    assert!(!file.is_supported());
    assert!(!file.has_thumbnail());
}

#[test]
fn test_missing_file_is_io_error() {
    let dir = tempfile::tempdir().unwrap();
    let result = ExifFile::load(dir.path().join("missing.jpg").as_path());
    assert!(matches!(result, Err(ExifError::Io(_))));
}
