//! The public load/query/modify/save API for one image file.

use std::fs::{self, File};
use std::io::{BufWriter, Read, Seek, SeekFrom, Write};
use std::path::{Path, PathBuf};

use bytes::Bytes;
use chrono::NaiveDateTime;
use tracing::{debug, info, warn};

use crate::error::{ExifError, ValueError};
use crate::format::detect::{detect_format, ImageFormat};
use crate::format::jpeg::{self, build_app1_segment, write_with_exif};
use crate::format::tiff::{
    names, parse_exif, thumbnail_location, write_exif, AttributeValue, DirectoryGroup,
};
use crate::io::ByteOrder;

use super::raw::{self, RawDecoder};
use super::store::AttributeStore;

/// Format of `DateTime`-style tags.
const DATETIME_FORMAT: &str = "%Y:%m:%d %H:%M:%S";

// =============================================================================
// ImageSource
// =============================================================================

/// Where image bytes come from.
///
/// Only file sources can be saved back; streams are read once.
pub enum ImageSource {
    File(PathBuf),
    Stream(Box<dyn Read>),
}

impl ImageSource {
    pub fn stream<R: Read + 'static>(reader: R) -> Self {
        ImageSource::Stream(Box::new(reader))
    }
}

impl From<PathBuf> for ImageSource {
    fn from(path: PathBuf) -> Self {
        ImageSource::File(path)
    }
}

impl From<&Path> for ImageSource {
    fn from(path: &Path) -> Self {
        ImageSource::File(path.to_path_buf())
    }
}

/// What kind of data a loaded file turned out to contain.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SourceKind {
    Jpeg,
    Raw,
    /// The load failed; the store only holds defaults.
    Unsupported,
}

#[derive(Debug, Clone)]
struct Thumbnail {
    /// Offset from the start of the file
    offset: u64,
    length: usize,
    /// Bytes kept in memory when the source cannot be re-read
    cached: Option<Bytes>,
}

// =============================================================================
// ExifFile
// =============================================================================

/// Exif metadata of one image, loaded into memory.
#[derive(Debug, Clone)]
pub struct ExifFile {
    path: Option<PathBuf>,
    kind: SourceKind,
    store: AttributeStore,
    byte_order: ByteOrder,
    thumbnail: Option<Thumbnail>,
}

impl ExifFile {
    /// Load metadata from a JPEG file or stream.
    ///
    /// Truncated input is an error. Any other problem with the metadata
    /// is logged and yields a file whose [`is_supported`](Self::is_supported)
    /// is `false`.
    pub fn load(source: impl Into<ImageSource>) -> Result<Self, ExifError> {
        Self::load_inner(source.into(), None)
    }

    /// Like [`load`](Self::load), handing non-JPEG data to `decoder`.
    pub fn load_with_decoder(
        source: impl Into<ImageSource>,
        decoder: &dyn RawDecoder,
    ) -> Result<Self, ExifError> {
        Self::load_inner(source.into(), Some(decoder))
    }

    fn load_inner(source: ImageSource, decoder: Option<&dyn RawDecoder>) -> Result<Self, ExifError> {
        let (path, data) = match source {
            ImageSource::File(path) => {
                let data = Bytes::from(fs::read(&path)?);
                (Some(path), data)
            }
            ImageSource::Stream(mut reader) => {
                let mut buf = Vec::new();
                reader.read_to_end(&mut buf)?;
                (None, Bytes::from(buf))
            }
        };

        let mut file = ExifFile {
            path,
            kind: SourceKind::Unsupported,
            store: AttributeStore::new(),
            byte_order: ByteOrder::default(),
            thumbnail: None,
        };

        match file.populate(&data, decoder) {
            Ok(kind) => file.kind = kind,
            Err(err) if err.is_truncation() => return Err(err),
            Err(err) => {
                warn!(path = ?file.path, error = %err, "Failed to read metadata, using defaults");
                file.kind = SourceKind::Unsupported;
            }
        }

        file.add_default_values();
        debug!(
            path = ?file.path,
            kind = ?file.kind,
            byte_order = file.byte_order.name(),
            has_thumbnail = file.thumbnail.is_some(),
            "Loaded metadata"
        );
        Ok(file)
    }

    fn populate(
        &mut self,
        data: &Bytes,
        decoder: Option<&dyn RawDecoder>,
    ) -> Result<SourceKind, ExifError> {
        let format = detect_format(data);
        if format == ImageFormat::Jpeg {
            self.read_jpeg(data)?;
            return Ok(SourceKind::Jpeg);
        }

        let Some(decoder) = decoder else {
            return Err(ExifError::UnsupportedFormat(format!(
                "{} data is not a JPEG",
                format.name()
            )));
        };

        let attributes = decoder.decode(data)?.ok_or_else(|| {
            ExifError::UnsupportedFormat("RAW decoder did not recognize the data".to_string())
        })?;

        if let Some(thumbnail) = raw::import(&attributes, &mut self.store) {
            self.thumbnail = match (thumbnail.offset, thumbnail.length, thumbnail.data) {
                (offset, _, Some(bytes)) => Some(Thumbnail {
                    offset: offset.unwrap_or(0),
                    length: bytes.len(),
                    cached: Some(bytes),
                }),
                (Some(offset), Some(length), None) if length > 0 => Some(Thumbnail {
                    offset,
                    length,
                    cached: self.path.is_none().then(|| slice_at(data, offset, length)).flatten(),
                }),
                _ => None,
            };
        }
        Ok(SourceKind::Raw)
    }

    fn read_jpeg(&mut self, data: &Bytes) -> Result<(), ExifError> {
        let scan = jpeg::scan(data)?;

        if let Some(range) = scan.exif.clone() {
            let tiff = &data[range.clone()];
            let header = parse_exif(tiff, &mut self.store)?;
            self.byte_order = header.byte_order;

            if let Some((offset, length)) = thumbnail_location(&self.store, tiff.len()) {
                let start = range.start + offset;
                self.thumbnail = Some(Thumbnail {
                    offset: start as u64,
                    length,
                    cached: self
                        .path
                        .is_none()
                        .then(|| data.slice(start..start + length)),
                });
            }
        }

        if let Some(comment) = scan.comment {
            self.store.insert_if_absent(
                DirectoryGroup::Exif,
                names::USER_COMMENT,
                AttributeValue::Ascii(comment),
            );
        }

        if let Some((height, width)) = scan.dimensions {
            let primary = DirectoryGroup::Primary;
            self.store
                .insert(primary, names::IMAGE_LENGTH, AttributeValue::Long(vec![height.into()]));
            self.store
                .insert(primary, names::IMAGE_WIDTH, AttributeValue::Long(vec![width.into()]));
        }

        Ok(())
    }

    /// Fill in tags that callers expect to always find.
    fn add_default_values(&mut self) {
        let store = &mut self.store;
        if let Some(original) = store
            .get_in(DirectoryGroup::Exif, names::DATETIME_ORIGINAL)
            .cloned()
        {
            store.insert(DirectoryGroup::Primary, names::DATETIME, original);
        }

        for name in [names::IMAGE_WIDTH, names::IMAGE_LENGTH] {
            if !store.contains(name) {
                store.insert(DirectoryGroup::Primary, name, AttributeValue::Long(vec![0]));
            }
        }
        if !store.contains(names::ORIENTATION) {
            store.insert(
                DirectoryGroup::Primary,
                names::ORIENTATION,
                AttributeValue::Short(vec![0]),
            );
        }
        if !store.contains(names::LIGHT_SOURCE) {
            store.insert(
                DirectoryGroup::Exif,
                names::LIGHT_SOURCE,
                AttributeValue::Long(vec![0]),
            );
        }
    }

    // -------------------------------------------------------------------------
    // Attribute access
    // -------------------------------------------------------------------------

    /// String value of a tag, or `None` if no group holds it.
    pub fn attribute(&self, name: &str) -> Option<String> {
        self.store.get_string(name)
    }

    /// Integer value of a single-component tag, else `default`.
    pub fn attribute_int(&self, name: &str, default: i64) -> i64 {
        self.store
            .get(name)
            .and_then(|(_, value)| value.as_i64())
            .unwrap_or(default)
    }

    /// Floating point value of a single-component tag, else `default`.
    pub fn attribute_double(&self, name: &str, default: f64) -> f64 {
        self.store
            .get(name)
            .and_then(|(_, value)| value.as_f64())
            .unwrap_or(default)
    }

    pub fn has_attribute(&self, name: &str) -> bool {
        self.store.contains(name)
    }

    /// Set (`Some`) or remove (`None`) a tag, logging rejected values.
    pub fn set_attribute(&mut self, name: &str, value: Option<&str>) {
        if let Err(err) = self.try_set_attribute(name, value) {
            warn!(tag = name, error = %err, "Attribute not set");
        }
    }

    /// Set or remove a tag, returning how many groups were changed.
    pub fn try_set_attribute(&mut self, name: &str, value: Option<&str>) -> Result<usize, ValueError> {
        match value {
            Some(value) => self
                .store
                .set_string(name, value, self.thumbnail.is_some()),
            None => Ok(self.store.remove(name)),
        }
    }

    /// Remove a tag from every group.
    pub fn remove_attribute(&mut self, name: &str) -> usize {
        self.store.remove(name)
    }

    /// Read-only view of every loaded tag.
    pub fn store(&self) -> &AttributeStore {
        &self.store
    }

    pub fn byte_order(&self) -> ByteOrder {
        self.byte_order
    }

    pub fn source_kind(&self) -> SourceKind {
        self.kind
    }

    /// Whether the metadata was read successfully.
    pub fn is_supported(&self) -> bool {
        self.kind != SourceKind::Unsupported
    }

    // -------------------------------------------------------------------------
    // Thumbnail
    // -------------------------------------------------------------------------

    pub fn has_thumbnail(&self) -> bool {
        self.thumbnail.is_some()
    }

    /// File offset and length of the embedded thumbnail.
    pub fn thumbnail_range(&self) -> Option<(u64, usize)> {
        self.thumbnail.as_ref().map(|t| (t.offset, t.length))
    }

    /// The embedded thumbnail's bytes.
    pub fn thumbnail(&self) -> Result<Option<Bytes>, ExifError> {
        let Some(thumbnail) = &self.thumbnail else {
            return Ok(None);
        };
        if let Some(bytes) = &thumbnail.cached {
            return Ok(Some(bytes.clone()));
        }
        let Some(path) = &self.path else {
            return Ok(None);
        };

        let mut file = File::open(path)?;
        file.seek(SeekFrom::Start(thumbnail.offset))?;
        let mut buf = vec![0u8; thumbnail.length];
        file.read_exact(&mut buf)?;
        Ok(Some(Bytes::from(buf)))
    }

    // -------------------------------------------------------------------------
    // Saving
    // -------------------------------------------------------------------------

    /// Rewrite the file's Exif segment from the in-memory attributes.
    ///
    /// The original is first renamed to `<path>.tmp`, the new file is
    /// written in its place and the temporary file is removed afterwards.
    /// Every segment other than the Exif segment is copied unchanged.
    ///
    /// # Errors
    /// `UnsupportedSource` for RAW, stream and failed loads. No file is
    /// touched in that case, nor when the new segment would be too large.
    pub fn save_attributes(&mut self) -> Result<(), ExifError> {
        match self.kind {
            SourceKind::Jpeg => {}
            SourceKind::Raw => {
                return Err(ExifError::UnsupportedSource(
                    "metadata can only be written to JPEG files".to_string(),
                ))
            }
            SourceKind::Unsupported => {
                return Err(ExifError::UnsupportedSource(
                    "metadata of this file could not be read".to_string(),
                ))
            }
        }
        let path = self.path.clone().ok_or_else(|| {
            ExifError::UnsupportedSource("stream sources cannot be saved".to_string())
        })?;

        let thumbnail = self.thumbnail()?;
        let encoded = write_exif(&self.store, self.byte_order, thumbnail.as_deref());
        let app1 = build_app1_segment(&encoded.tiff)?;

        let temp_path = temp_path_for(&path);
        fs::rename(&path, &temp_path)?;
        let original = fs::read(&temp_path)?;
        let scan = jpeg::scan(&original)?;

        let mut out = BufWriter::new(File::create(&path)?);
        let tiff_start = write_with_exif(&original, &scan, &app1, &mut out)?;
        out.flush()?;
        drop(out);
        fs::remove_file(&temp_path)?;

        self.thumbnail = match (encoded.thumbnail_offset, thumbnail) {
            (Some(offset), Some(bytes)) => {
                self.store.insert(
                    DirectoryGroup::Thumbnail,
                    names::JPEG_INTERCHANGE_FORMAT,
                    AttributeValue::Long(vec![offset as u32]),
                );
                self.store.insert(
                    DirectoryGroup::Thumbnail,
                    names::JPEG_INTERCHANGE_FORMAT_LENGTH,
                    AttributeValue::Long(vec![bytes.len() as u32]),
                );
                Some(Thumbnail {
                    offset: (tiff_start + offset) as u64,
                    length: bytes.len(),
                    cached: None,
                })
            }
            _ => None,
        };

        info!(
            path = %path.display(),
            exif_size = encoded.tiff.len(),
            "Saved metadata"
        );
        Ok(())
    }

    // -------------------------------------------------------------------------
    // Derived values
    // -------------------------------------------------------------------------

    /// Latitude and longitude in decimal degrees, south and west negative.
    pub fn lat_long(&self) -> Option<(f64, f64)> {
        let latitude = self.attribute(names::GPS_LATITUDE)?;
        let latitude_ref = self.attribute(names::GPS_LATITUDE_REF)?;
        let longitude = self.attribute(names::GPS_LONGITUDE)?;
        let longitude_ref = self.attribute(names::GPS_LONGITUDE_REF)?;

        let parsed = dms_to_degrees(&latitude, &latitude_ref)
            .zip(dms_to_degrees(&longitude, &longitude_ref));
        if parsed.is_none() {
            warn!(
                latitude = %latitude,
                latitude_ref = %latitude_ref,
                longitude = %longitude,
                longitude_ref = %longitude_ref,
                "Invalid GPS coordinates"
            );
        }
        parsed
    }

    /// Write latitude and longitude as degree/minute/second rationals.
    pub fn set_lat_long(&mut self, latitude: f64, longitude: f64) -> Result<(), ValueError> {
        let invalid = |tag: &str, value: f64| ValueError::BadValueString {
            tag: tag.to_string(),
            value: value.to_string(),
        };
        if !(-90.0..=90.0).contains(&latitude) {
            return Err(invalid(names::GPS_LATITUDE, latitude));
        }
        if !(-180.0..=180.0).contains(&longitude) {
            return Err(invalid(names::GPS_LONGITUDE, longitude));
        }

        let latitude_ref = if latitude >= 0.0 { "N" } else { "S" };
        let longitude_ref = if longitude >= 0.0 { "E" } else { "W" };
        self.try_set_attribute(names::GPS_LATITUDE, Some(&degrees_to_dms(latitude)))?;
        self.try_set_attribute(names::GPS_LATITUDE_REF, Some(latitude_ref))?;
        self.try_set_attribute(names::GPS_LONGITUDE, Some(&degrees_to_dms(longitude)))?;
        self.try_set_attribute(names::GPS_LONGITUDE_REF, Some(longitude_ref))?;
        Ok(())
    }

    /// Altitude in meters, negative below sea level, else `default`.
    pub fn altitude(&self, default: f64) -> f64 {
        let altitude = self.attribute_double(names::GPS_ALTITUDE, -1.0);
        let reference = self.attribute_int(names::GPS_ALTITUDE_REF, -1);
        if altitude >= 0.0 && reference >= 0 {
            if reference == 1 {
                -altitude
            } else {
                altitude
            }
        } else {
            default
        }
    }

    /// `DateTime` (plus `SubSecTime`) as milliseconds since the Unix epoch, in UTC.
    pub fn date_time(&self) -> Option<i64> {
        let value = self.attribute(names::DATETIME)?;
        if !has_nonzero_digit(&value) {
            return None;
        }
        let millis = parse_datetime_millis(&value)?;

        let sub_seconds = self
            .attribute(names::SUBSEC_TIME)
            .and_then(|s| s.trim().parse::<i64>().ok())
            .map(|mut sub| {
                while sub > 1000 {
                    sub /= 10;
                }
                sub
            })
            .unwrap_or(0);
        Some(millis + sub_seconds)
    }

    /// `GPSDateStamp` and `GPSTimeStamp` as milliseconds since the Unix epoch.
    pub fn gps_date_time(&self) -> Option<i64> {
        let date = self.attribute(names::GPS_DATESTAMP)?;
        let time = self.attribute(names::GPS_TIMESTAMP)?;
        if !has_nonzero_digit(&date) && !has_nonzero_digit(&time) {
            return None;
        }
        parse_datetime_millis(&format!("{date} {time}"))
    }

    /// Clockwise rotation implied by `Orientation`.
    pub fn rotation_degrees(&self) -> u16 {
        match self.attribute_int(names::ORIENTATION, 1) {
            6 | 7 => 90,
            3 | 4 => 180,
            8 | 5 => 270,
            _ => 0,
        }
    }
}

// =============================================================================
// Helpers
// =============================================================================

fn temp_path_for(path: &Path) -> PathBuf {
    let mut name = path.as_os_str().to_owned();
    name.push(".tmp");
    PathBuf::from(name)
}

fn slice_at(data: &Bytes, offset: u64, length: usize) -> Option<Bytes> {
    let start = usize::try_from(offset).ok()?;
    let end = start.checked_add(length)?;
    (end <= data.len()).then(|| data.slice(start..end))
}

fn has_nonzero_digit(value: &str) -> bool {
    value.chars().any(|c| ('1'..='9').contains(&c))
}

/// Parse a `yyyy:MM:dd HH:mm:ss` prefix as UTC milliseconds.
fn parse_datetime_millis(value: &str) -> Option<i64> {
    NaiveDateTime::parse_and_remainder(value.trim(), DATETIME_FORMAT)
        .ok()
        .map(|(datetime, _)| datetime.and_utc().timestamp_millis())
}

/// Convert `D/d,M/m,S/s` plus a hemisphere reference to signed degrees.
fn dms_to_degrees(value: &str, reference: &str) -> Option<f64> {
    let parts: Vec<f64> = value
        .split(',')
        .map(|part| {
            let (numerator, denominator) = part.split_once('/')?;
            let numerator = numerator.trim().parse::<f64>().ok()?;
            let denominator = denominator.trim().parse::<f64>().ok()?;
            (denominator != 0.0).then(|| numerator / denominator)
        })
        .collect::<Option<_>>()?;

    let [degrees, minutes, seconds] = parts[..] else {
        return None;
    };
    let magnitude = degrees + minutes / 60.0 + seconds / 3600.0;

    match reference {
        "N" | "E" => Some(magnitude),
        "S" | "W" => Some(-magnitude),
        _ => None,
    }
}

/// Convert signed degrees to the unsigned `D/1,M/1,S/1000` form.
fn degrees_to_dms(value: f64) -> String {
    let value = value.abs();
    let degrees = value.trunc();
    let minutes = ((value - degrees) * 60.0).trunc();
    let milliseconds = ((value - degrees - minutes / 60.0) * 3_600_000.0).round();
    format!(
        "{}/1,{}/1,{}/1000",
        degrees as i64, minutes as i64, milliseconds as i64
    )
}
