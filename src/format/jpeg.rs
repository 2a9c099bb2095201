//! JPEG segment scanning and Exif segment substitution.
//!
//! A JPEG file is a sequence of marker-delimited segments:
//!
//! ```text
//! FF D8                       SOI
//! FF xx LL LL <payload>       segment, LLLL = big-endian length incl. itself
//! ...
//! FF DA ... <entropy data>    SOS, everything from here is opaque
//! FF D9                       EOI
//! ```
//!
//! Scanning records where every segment lives so a save can copy all of
//! them byte for byte and only substitute the Exif APP1 segment.

use std::io::Write;
use std::ops::Range;

use tracing::{debug, warn};

use crate::error::ExifError;
use crate::io::{ByteOrder, ByteReader, ByteWriter};

// =============================================================================
// JPEG Markers
// =============================================================================

/// Every marker starts with this byte
pub const MARKER_PREFIX: u8 = 0xFF;

/// Start Of Image marker
pub const SOI: [u8; 2] = [0xFF, 0xD8];

/// End Of Image marker
pub const EOI: u8 = 0xD9;

/// Start Of Scan marker
pub const SOS: u8 = 0xDA;

/// Application segment 1 (Exif) marker
pub const APP1: u8 = 0xE1;

/// Comment marker
pub const COM: u8 = 0xFE;

/// Start Of Frame markers span 0xC0..=0xCF except these
const NON_SOF_MARKERS: [u8; 3] = [0xC4, 0xC8, 0xCC];

/// Identifier that opens the payload of an Exif APP1 segment
pub const EXIF_IDENTIFIER: &[u8; 6] = b"Exif\0\0";

/// Bytes between the start of an APP1 segment and its TIFF header
pub const APP1_HEADER_SIZE: usize = 4 + EXIF_IDENTIFIER.len();

/// Largest payload a segment length field can describe
pub const MAX_SEGMENT_PAYLOAD: usize = u16::MAX as usize - 2;

fn is_sof(marker: u8) -> bool {
    (0xC0..=0xCF).contains(&marker) && !NON_SOF_MARKERS.contains(&marker)
}

/// RSTn and TEM carry no length field.
fn is_standalone(marker: u8) -> bool {
    (0xD0..=0xD7).contains(&marker) || marker == 0x01
}

// =============================================================================
// Scanning
// =============================================================================

/// One segment between SOI and the scan data.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Segment {
    pub marker: u8,

    /// File range of the whole segment, including fill bytes and marker
    pub range: Range<usize>,

    /// Whether this is an APP1 segment carrying Exif data
    pub is_exif: bool,
}

/// What a scan found in a JPEG file.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct JpegScan {
    /// Segments in file order
    pub segments: Vec<Segment>,

    /// File range of the first Exif payload's TIFF data
    pub exif: Option<Range<usize>>,

    /// Text of the first comment segment
    pub comment: Option<String>,

    /// Image (height, width) from the first start-of-frame segment
    pub dimensions: Option<(u16, u16)>,

    /// Offset of SOS or EOI; everything from here on is copied verbatim
    pub tail_start: usize,
}

/// Walk the segments of a JPEG file.
///
/// # Errors
/// - `MalformedSegment` for a missing SOI, a missing marker prefix or a
///   length field below 2
/// - `UnexpectedEndOfData` if the file ends before SOS or EOI
pub fn scan(data: &[u8]) -> Result<JpegScan, ExifError> {
    let mut reader = ByteReader::new(data, ByteOrder::BigEndian);
    if reader.read_bytes(2)? != SOI {
        return Err(ExifError::MalformedSegment(
            "missing start-of-image marker".to_string(),
        ));
    }

    let mut result = JpegScan::default();

    loop {
        let start = reader.position();
        let prefix = reader.read_u8()?;
        if prefix != MARKER_PREFIX {
            return Err(ExifError::MalformedSegment(format!(
                "expected marker at offset {start}, found 0x{prefix:02X}"
            )));
        }
        while reader.peek_u8() == Some(MARKER_PREFIX) {
            reader.skip(1)?;
        }
        let marker = reader.read_u8()?;

        if marker == SOS || marker == EOI {
            result.tail_start = start;
            break;
        }

        if is_standalone(marker) {
            result.segments.push(Segment {
                marker,
                range: start..reader.position(),
                is_exif: false,
            });
            continue;
        }

        let length = reader.read_u16()? as usize;
        if length < 2 {
            return Err(ExifError::MalformedSegment(format!(
                "invalid length {length} for marker 0x{marker:02X} at offset {start}"
            )));
        }
        let payload_start = reader.position();
        let payload = reader.read_bytes(length - 2)?;

        let mut is_exif = false;
        match marker {
            APP1 if payload.starts_with(EXIF_IDENTIFIER) => {
                is_exif = true;
                if result.exif.is_none() {
                    let tiff_start = payload_start + EXIF_IDENTIFIER.len();
                    result.exif = Some(tiff_start..reader.position());
                    debug!(offset = tiff_start, size = payload.len() - 6, "Found Exif segment");
                } else {
                    warn!(offset = start, "Ignoring additional Exif segment");
                }
            }
            COM if result.comment.is_none() => {
                let text = String::from_utf8_lossy(payload);
                result.comment = Some(text.trim_end_matches('\0').to_string());
            }
            m if is_sof(m) && result.dimensions.is_none() => {
                if payload.len() >= 5 {
                    let height = u16::from_be_bytes([payload[1], payload[2]]);
                    let width = u16::from_be_bytes([payload[3], payload[4]]);
                    result.dimensions = Some((height, width));
                }
            }
            _ => {}
        }

        result.segments.push(Segment {
            marker,
            range: start..reader.position(),
            is_exif,
        });
    }

    Ok(result)
}

// =============================================================================
// Writing
// =============================================================================

/// Wrap a TIFF payload into a complete APP1 segment.
///
/// # Errors
/// `SegmentTooLarge` if the payload does not fit the 16-bit length field.
pub fn build_app1_segment(tiff: &[u8]) -> Result<Vec<u8>, ExifError> {
    let payload_len = EXIF_IDENTIFIER.len() + tiff.len();
    if payload_len > MAX_SEGMENT_PAYLOAD {
        return Err(ExifError::SegmentTooLarge(payload_len));
    }

    let mut writer = ByteWriter::with_capacity(ByteOrder::BigEndian, payload_len + 4);
    writer.write_u8(MARKER_PREFIX);
    writer.write_u8(APP1);
    writer.write_segment_length((payload_len + 2) as u16);
    writer.write_bytes(EXIF_IDENTIFIER);
    writer.write_bytes(tiff);
    Ok(writer.into_inner())
}

/// Copy `data` to `out`, substituting `app1` for its Exif segment.
///
/// The new segment takes the place of the first Exif segment, later Exif
/// segments are dropped, and a file without one gets it right after SOI.
/// Everything else is copied unchanged. Returns the file offset of the new
/// segment's TIFF header.
pub fn write_with_exif<W: Write>(
    data: &[u8],
    scan: &JpegScan,
    app1: &[u8],
    out: &mut W,
) -> Result<usize, ExifError> {
    let mut written = 0;
    let mut tiff_start = None;

    let mut emit = |bytes: &[u8], written: &mut usize| -> Result<(), ExifError> {
        out.write_all(bytes)?;
        *written += bytes.len();
        Ok(())
    };

    emit(&SOI, &mut written)?;
    let has_exif = scan.segments.iter().any(|segment| segment.is_exif);
    if !has_exif {
        tiff_start = Some(written + APP1_HEADER_SIZE);
        emit(app1, &mut written)?;
    }

    for segment in &scan.segments {
        if !segment.is_exif {
            emit(&data[segment.range.clone()], &mut written)?;
        } else if tiff_start.is_none() {
            tiff_start = Some(written + APP1_HEADER_SIZE);
            emit(app1, &mut written)?;
        }
    }

    emit(&data[scan.tail_start..], &mut written)?;

    Ok(tiff_start.unwrap_or(SOI.len() + APP1_HEADER_SIZE))
}

// =============================================================================
// Tests
// =============================================================================
