//! Container sniffing for image sources.
//!
//! Only JPEG containers carry a writable Exif segment. Everything else is
//! either handed to a RAW decoder or rejected as unsupported.

use crate::io::ByteOrder;

use super::tiff::TIFF_HEADER_SIZE;

// =============================================================================
// ImageFormat
// =============================================================================

/// Detected container format.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ImageFormat {
    /// JPEG stream starting with the SOI marker
    Jpeg,

    /// Bare TIFF stream (most camera RAW formats are TIFF based)
    Tiff,

    /// Anything else
    Unknown,
}

impl ImageFormat {
    /// Get a human-readable name for the format.
    pub const fn name(&self) -> &'static str {
        match self {
            ImageFormat::Jpeg => "JPEG",
            ImageFormat::Tiff => "TIFF",
            ImageFormat::Unknown => "unknown",
        }
    }
}

// =============================================================================
// Format Detection
// =============================================================================

/// JPEG start-of-image signature.
const JPEG_SIGNATURE: [u8; 2] = [0xFF, 0xD8];

/// Detect the container format from the leading bytes of a file.
pub fn detect_format(bytes: &[u8]) -> ImageFormat {
    if is_jpeg(bytes) {
        ImageFormat::Jpeg
    } else if is_tiff_header(bytes) {
        ImageFormat::Tiff
    } else {
        ImageFormat::Unknown
    }
}

/// Check if bytes start with the JPEG SOI marker.
pub fn is_jpeg(bytes: &[u8]) -> bool {
    bytes.starts_with(&JPEG_SIGNATURE)
}

/// Check if bytes represent a classic TIFF header.
///
/// This is a quick check that can be used before attempting full parsing.
pub fn is_tiff_header(bytes: &[u8]) -> bool {
    if bytes.len() < TIFF_HEADER_SIZE {
        return false;
    }

    let byte_order = match &bytes[0..2] {
        b"II" => ByteOrder::LittleEndian,
        b"MM" => ByteOrder::BigEndian,
        _ => return false,
    };

    byte_order.read_u16(&bytes[2..4]) == 42
}

// =============================================================================
// Tests
// =============================================================================
