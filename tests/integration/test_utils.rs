//! Test utilities for integration tests.
//!
//! Fixture JPEGs are produced by the `image` crate's encoder; the Exif
//! payload is assembled by [`ExifBuilder`], which lays out TIFF directories
//! on its own so the library's writer is never used to build its input.

use image::codecs::jpeg::JpegEncoder;
use image::{Rgb, RgbImage};

// =============================================================================
// Test JPEG Creation
// =============================================================================

/// Create a test RGB JPEG image without any metadata segment.
pub fn create_test_jpeg(width: u32, height: u32, quality: u8) -> Vec<u8> {
    let img = RgbImage::from_fn(width, height, |x, y| {
        let r = (x % 256) as u8;
        let g = (y % 256) as u8;
        let b = ((x + y) % 256) as u8;
        Rgb([r, g, b])
    });

    let mut buf = Vec::new();
    let mut encoder = JpegEncoder::new_with_quality(&mut buf, quality);
    encoder.encode_image(&img).unwrap();
    buf
}

/// Small JPEG used as an embedded thumbnail.
pub fn create_thumbnail() -> Vec<u8> {
    create_test_jpeg(8, 8, 50)
}

/// Insert a segment right after SOI.
pub fn insert_segment(jpeg: &[u8], marker: u8, payload: &[u8]) -> Vec<u8> {
    assert_eq!(&jpeg[..2], &[0xFF, 0xD8], "not a JPEG");
    let mut out = jpeg[..2].to_vec();
    out.extend([0xFF, marker]);
    out.extend(((payload.len() + 2) as u16).to_be_bytes());
    out.extend(payload);
    out.extend(&jpeg[2..]);
    out
}

/// Insert an Exif APP1 segment carrying `tiff` right after SOI.
pub fn insert_exif(jpeg: &[u8], tiff: &[u8]) -> Vec<u8> {
    let mut payload = b"Exif\0\0".to_vec();
    payload.extend(tiff);
    insert_segment(jpeg, 0xE1, &payload)
}

/// A test JPEG with the given Exif payload.
pub fn create_exif_jpeg(tiff: &[u8]) -> Vec<u8> {
    insert_exif(&create_test_jpeg(64, 48, 85), tiff)
}

/// Copy of `jpeg` with every Exif APP1 segment removed.
///
/// Used to check that a rewrite leaves all other bytes alone.
pub fn strip_exif(jpeg: &[u8]) -> Vec<u8> {
    let mut out = jpeg[..2].to_vec();
    let mut pos = 2;
    while pos + 4 <= jpeg.len() {
        let marker = jpeg[pos + 1];
        if marker == 0xDA || marker == 0xD9 {
            break;
        }
        let length = u16::from_be_bytes([jpeg[pos + 2], jpeg[pos + 3]]) as usize;
        let end = pos + 2 + length;
        let is_exif = marker == 0xE1 && jpeg[pos + 4..end].starts_with(b"Exif\0\0");
        if !is_exif {
            out.extend(&jpeg[pos..end]);
        }
        pos = end;
    }
    out.extend(&jpeg[pos..]);
    out
}

/// Payload of the first Exif APP1 segment, without the identifier.
pub fn exif_payload(jpeg: &[u8]) -> Option<&[u8]> {
    let mut pos = 2;
    while pos + 4 <= jpeg.len() {
        let marker = jpeg[pos + 1];
        if marker == 0xDA || marker == 0xD9 {
            return None;
        }
        let length = u16::from_be_bytes([jpeg[pos + 2], jpeg[pos + 3]]) as usize;
        let end = pos + 2 + length;
        if marker == 0xE1 && jpeg[pos + 4..end].starts_with(b"Exif\0\0") {
            return Some(&jpeg[pos + 10..end]);
        }
        pos = end;
    }
    None
}

// =============================================================================
// Exif Payload Builders
// =============================================================================

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ByteOrderType {
    LittleEndian,
    BigEndian,
}

/// A typed entry value, encoded when the payload is built.
#[derive(Clone, Debug)]
pub enum Value {
    Byte(Vec<u8>),
    Ascii(String),
    Short(Vec<u16>),
    Long(Vec<u32>),
    Rational(Vec<(u32, u32)>),
    Undefined(Vec<u8>),
}

impl Value {
    pub fn ascii(text: &str) -> Self {
        Value::Ascii(text.to_string())
    }

    fn field_type(&self) -> u16 {
        match self {
            Value::Byte(_) => 1,
            Value::Ascii(_) => 2,
            Value::Short(_) => 3,
            Value::Long(_) => 4,
            Value::Rational(_) => 5,
            Value::Undefined(_) => 7,
        }
    }

    fn count(&self) -> u32 {
        match self {
            Value::Byte(v) | Value::Undefined(v) => v.len() as u32,
            Value::Ascii(s) => s.len() as u32 + 1,
            Value::Short(v) => v.len() as u32,
            Value::Long(v) => v.len() as u32,
            Value::Rational(v) => v.len() as u32,
        }
    }

    fn encode(&self, order: ByteOrderType) -> Vec<u8> {
        let mut out = Vec::new();
        match self {
            Value::Byte(v) | Value::Undefined(v) => out.extend(v),
            Value::Ascii(s) => {
                out.extend(s.as_bytes());
                out.push(0);
            }
            Value::Short(v) => v.iter().for_each(|&x| write_value(&mut out, order, x as u64, 2)),
            Value::Long(v) => v.iter().for_each(|&x| write_value(&mut out, order, x as u64, 4)),
            Value::Rational(v) => v.iter().for_each(|&(n, d)| {
                write_value(&mut out, order, n as u64, 4);
                write_value(&mut out, order, d as u64, 4);
            }),
        }
        out
    }
}

/// Builder for one directory.
#[derive(Clone, Debug, Default)]
pub struct IfdBuilder {
    entries: Vec<(u16, Value)>,
}

impl IfdBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a tag entry.
    pub fn entry(mut self, tag: u16, value: Value) -> Self {
        self.entries.push((tag, value));
        self
    }

    /// Entry table plus its overflow area.
    fn size(&self) -> usize {
        let overflow: usize = self
            .entries
            .iter()
            .map(|(_, value)| {
                let len = value.count() as usize * type_size(value.field_type());
                if len > 4 {
                    len + len % 2
                } else {
                    0
                }
            })
            .sum();
        2 + self.entries.len() * 12 + 4 + overflow
    }

    fn set(&mut self, tag: u16, value: Value) {
        self.entries.retain(|(t, _)| *t != tag);
        self.entries.push((tag, value));
    }

    fn write_to(&self, data: &mut Vec<u8>, order: ByteOrderType, next_ifd_offset: u32) {
        let mut entries = self.entries.clone();
        entries.sort_by_key(|(tag, _)| *tag);

        write_value(data, order, entries.len() as u64, 2);
        let mut overflow_offset = data.len() + entries.len() * 12 + 4;
        let mut overflow = Vec::new();

        for (tag, value) in &entries {
            write_value(data, order, *tag as u64, 2);
            write_value(data, order, value.field_type() as u64, 2);
            write_value(data, order, value.count() as u64, 4);

            let mut bytes = value.encode(order);
            if bytes.len() <= 4 {
                bytes.resize(4, 0);
                data.extend(bytes);
            } else {
                write_value(data, order, overflow_offset as u64, 4);
                if bytes.len() % 2 == 1 {
                    bytes.push(0);
                }
                overflow_offset += bytes.len();
                overflow.extend(bytes);
            }
        }

        write_value(data, order, next_ifd_offset as u64, 4);
        data.extend(overflow);
    }
}

/// Builder for a complete Exif TIFF payload.
///
/// Directories are laid out as header, IFD0, Exif IFD, GPS IFD, IFD1 and
/// finally the thumbnail bytes.
pub struct ExifBuilder {
    byte_order: ByteOrderType,
    primary: IfdBuilder,
    exif: Option<IfdBuilder>,
    gps: Option<IfdBuilder>,
    thumbnail: Option<(IfdBuilder, Vec<u8>)>,
    next_ifd_override: Option<u32>,
}

impl ExifBuilder {
    pub fn new() -> Self {
        Self {
            byte_order: ByteOrderType::LittleEndian,
            primary: IfdBuilder::new(),
            exif: None,
            gps: None,
            thumbnail: None,
            next_ifd_override: None,
        }
    }

    pub fn with_byte_order(mut self, order: ByteOrderType) -> Self {
        self.byte_order = order;
        self
    }

    pub fn primary(mut self, ifd: IfdBuilder) -> Self {
        self.primary = ifd;
        self
    }

    pub fn exif(mut self, ifd: IfdBuilder) -> Self {
        self.exif = Some(ifd);
        self
    }

    pub fn gps(mut self, ifd: IfdBuilder) -> Self {
        self.gps = Some(ifd);
        self
    }

    /// Add IFD1 describing `jpeg` as the embedded thumbnail.
    pub fn thumbnail(mut self, ifd: IfdBuilder, jpeg: Vec<u8>) -> Self {
        self.thumbnail = Some((ifd, jpeg));
        self
    }

    /// Force IFD0's next-directory link to `offset`.
    pub fn with_next_ifd_offset(mut self, offset: u32) -> Self {
        self.next_ifd_override = Some(offset);
        self
    }

    /// Build the TIFF payload.
    pub fn build(self) -> Vec<u8> {
        let order = self.byte_order;
        let mut primary = self.primary;
        let mut exif = self.exif;
        let mut gps = self.gps;
        let mut thumbnail = self.thumbnail;

        // Placeholders first so sizes are final before offsets are assigned
        if exif.is_some() {
            primary.set(0x8769, Value::Long(vec![0]));
        }
        if gps.is_some() {
            primary.set(0x8825, Value::Long(vec![0]));
        }
        if let Some((ifd, jpeg)) = thumbnail.as_mut() {
            ifd.set(0x0201, Value::Long(vec![0]));
            ifd.set(0x0202, Value::Long(vec![jpeg.len() as u32]));
        }

        let primary_offset = 8;
        let exif_offset = primary_offset + primary.size();
        let gps_offset = exif_offset + exif.as_ref().map_or(0, IfdBuilder::size);
        let thumbnail_ifd_offset = gps_offset + gps.as_ref().map_or(0, IfdBuilder::size);
        let thumbnail_data_offset =
            thumbnail_ifd_offset + thumbnail.as_ref().map_or(0, |(ifd, _)| ifd.size());

        if exif.is_some() {
            primary.set(0x8769, Value::Long(vec![exif_offset as u32]));
        }
        if gps.is_some() {
            primary.set(0x8825, Value::Long(vec![gps_offset as u32]));
        }
        if let Some((ifd, _)) = thumbnail.as_mut() {
            ifd.set(0x0201, Value::Long(vec![thumbnail_data_offset as u32]));
        }

        let mut data = Vec::new();
        match order {
            ByteOrderType::LittleEndian => data.extend(b"II"),
            ByteOrderType::BigEndian => data.extend(b"MM"),
        }
        write_value(&mut data, order, 42, 2);
        write_value(&mut data, order, primary_offset as u64, 4);

        let next = self.next_ifd_override.unwrap_or(if thumbnail.is_some() {
            thumbnail_ifd_offset as u32
        } else {
            0
        });
        primary.write_to(&mut data, order, next);
        if let Some(ifd) = exif.take() {
            ifd.write_to(&mut data, order, 0);
        }
        if let Some(ifd) = gps.take() {
            ifd.write_to(&mut data, order, 0);
        }
        if let Some((ifd, jpeg)) = thumbnail {
            ifd.write_to(&mut data, order, 0);
            assert_eq!(data.len(), thumbnail_data_offset);
            data.extend(jpeg);
        }

        data
    }
}

impl Default for ExifBuilder {
    fn default() -> Self {
        Self::new()
    }
}

fn type_size(field_type: u16) -> usize {
    match field_type {
        1 | 2 | 7 => 1,
        3 => 2,
        4 => 4,
        5 => 8,
        _ => 1,
    }
}

fn write_value(data: &mut Vec<u8>, byte_order: ByteOrderType, value: u64, size: usize) {
    match byte_order {
        ByteOrderType::LittleEndian => match size {
            1 => data.push(value as u8),
            2 => data.extend(&(value as u16).to_le_bytes()),
            4 => data.extend(&(value as u32).to_le_bytes()),
            _ => {}
        },
        ByteOrderType::BigEndian => match size {
            1 => data.push(value as u8),
            2 => data.extend(&(value as u16).to_be_bytes()),
            4 => data.extend(&(value as u32).to_be_bytes()),
            _ => {}
        },
    }
}

// =============================================================================
// Common Fixtures
// =============================================================================

/// Tag numbers used by the fixtures.
pub mod tag {
    pub const MAKE: u16 = 0x010F;
    pub const MODEL: u16 = 0x0110;
    pub const ORIENTATION: u16 = 0x0112;
    pub const DATETIME: u16 = 0x0132;
    pub const COMPRESSION: u16 = 0x0103;
    pub const EXPOSURE_TIME: u16 = 0x829A;
    pub const F_NUMBER: u16 = 0x829D;
    pub const ISO_SPEED_RATINGS: u16 = 0x8827;
    pub const DATETIME_ORIGINAL: u16 = 0x9003;
    pub const SUBSEC_TIME: u16 = 0x9290;
    pub const USER_COMMENT: u16 = 0x9286;
    pub const GPS_LATITUDE_REF: u16 = 0x0001;
    pub const GPS_LATITUDE: u16 = 0x0002;
    pub const GPS_LONGITUDE_REF: u16 = 0x0003;
    pub const GPS_LONGITUDE: u16 = 0x0004;
    pub const GPS_ALTITUDE_REF: u16 = 0x0005;
    pub const GPS_ALTITUDE: u16 = 0x0006;
    pub const GPS_TIMESTAMP: u16 = 0x0007;
    pub const GPS_DATESTAMP: u16 = 0x001D;
}

/// A camera-like payload: IFD0, Exif, GPS and a thumbnail.
pub fn camera_exif(order: ByteOrderType) -> Vec<u8> {
    ExifBuilder::new()
        .with_byte_order(order)
        .primary(
            IfdBuilder::new()
                .entry(tag::MAKE, Value::ascii("Acme"))
                .entry(tag::MODEL, Value::ascii("Shooter 3000"))
                .entry(tag::ORIENTATION, Value::Short(vec![6]))
                .entry(tag::DATETIME, Value::ascii("2001:01:01 00:00:00")),
        )
        .exif(
            IfdBuilder::new()
                .entry(tag::EXPOSURE_TIME, Value::Rational(vec![(1, 100)]))
                .entry(tag::F_NUMBER, Value::Rational(vec![(28, 10)]))
                .entry(tag::ISO_SPEED_RATINGS, Value::Short(vec![200]))
                .entry(tag::DATETIME_ORIGINAL, Value::ascii("2016:02:29 12:00:00"))
                .entry(tag::SUBSEC_TIME, Value::ascii("123")),
        )
        .gps(
            IfdBuilder::new()
                .entry(tag::GPS_LATITUDE_REF, Value::ascii("N"))
                .entry(
                    tag::GPS_LATITUDE,
                    Value::Rational(vec![(37, 1), (25, 1), (19800, 1000)]),
                )
                .entry(tag::GPS_LONGITUDE_REF, Value::ascii("W"))
                .entry(
                    tag::GPS_LONGITUDE,
                    Value::Rational(vec![(122, 1), (5, 1), (2400, 1000)]),
                )
                .entry(tag::GPS_ALTITUDE_REF, Value::Byte(vec![1]))
                .entry(tag::GPS_ALTITUDE, Value::Rational(vec![(125, 10)]))
                .entry(tag::GPS_TIMESTAMP, Value::Rational(vec![(8, 1), (30, 1), (15, 1)]))
                .entry(tag::GPS_DATESTAMP, Value::ascii("2016:02:29")),
        )
        .thumbnail(
            IfdBuilder::new()
                .entry(tag::COMPRESSION, Value::Short(vec![6]))
                .entry(tag::MAKE, Value::ascii("ThumbMaker")),
            create_thumbnail(),
        )
        .build()
}

/// Check that `data` starts with a JPEG SOI marker and ends with EOI.
pub fn is_valid_jpeg(data: &[u8]) -> bool {
    data.len() >= 4 && data[..2] == [0xFF, 0xD8] && data[data.len() - 2..] == [0xFF, 0xD9]
}
