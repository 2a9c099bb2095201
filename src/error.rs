use thiserror::Error;

use crate::format::tiff::DirectoryGroup;

/// Errors returned by the public load/save operations.
#[derive(Debug, Error)]
pub enum ExifError {
    /// Underlying file system error
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// A read ran past the end of the buffer (truncated file)
    #[error("Unexpected end of data: requested {requested} bytes at offset {offset}, size is {size}")]
    UnexpectedEndOfData {
        offset: u64,
        requested: u64,
        size: u64,
    },

    /// Bad JPEG marker or segment length
    #[error("Malformed JPEG segment: {0}")]
    MalformedSegment(String),

    /// Operation is not available for this kind of source (RAW, stream, failed load)
    #[error("Unsupported source: {0}")]
    UnsupportedSource(String),

    /// Input is neither a JPEG nor something the RAW decoder accepted
    #[error("Unsupported format: {0}")]
    UnsupportedFormat(String),

    /// Rewritten Exif payload does not fit into a single JPEG segment
    #[error("Exif segment too large: {0} bytes, a JPEG segment holds at most 65533")]
    SegmentTooLarge(usize),

    /// TIFF header inside the Exif payload is invalid
    #[error("TIFF error: {0}")]
    Tiff(#[from] TiffError),
}

impl ExifError {
    /// Whether the error means the input was cut short.
    pub fn is_truncation(&self) -> bool {
        matches!(self, ExifError::UnexpectedEndOfData { .. })
    }
}

/// Errors that can occur when parsing the TIFF header of an Exif payload
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TiffError {
    /// Invalid TIFF magic bytes (not II or MM)
    #[error("Invalid TIFF magic bytes: expected 0x4949 (II) or 0x4D4D (MM), got 0x{0:04X}")]
    InvalidMagic(u16),

    /// Invalid TIFF version number
    #[error("Invalid TIFF version: expected 42, got {0}")]
    InvalidVersion(u16),

    /// Payload is too small to contain a valid TIFF header
    #[error("Exif payload too small: need at least {required} bytes, got {actual}")]
    FileTooSmall { required: u64, actual: u64 },

    /// First IFD offset points outside the payload
    #[error("Invalid IFD offset: {0}")]
    InvalidIfdOffset(u64),
}

/// Problems with a single directory entry. The entry is skipped and parsing continues.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum EntryError {
    /// Tag number is not registered for the directory group being parsed
    #[error("Unknown tag 0x{tag:04X} in {group} directory")]
    UnknownTag { group: DirectoryGroup, tag: u16 },

    /// Format discriminant outside 1..=12
    #[error("Invalid format {format} for tag 0x{tag:04X}")]
    InvalidFormat { tag: u16, format: u16 },

    /// Value or sub-directory offset outside the Exif payload
    #[error("Invalid offset {offset} for tag 0x{tag:04X}")]
    InvalidOffset { tag: u16, offset: u64 },
}

/// Rejections of a string value passed to `set_attribute`.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValueError {
    /// Tag name is not defined in any directory group
    #[error("Unknown tag name: {0}")]
    UnknownTag(String),

    /// The string does not parse into the format chosen for the tag
    #[error("Invalid value for {tag}: {value:?}")]
    BadValueString { tag: String, value: String },

    /// The guessed formats match none of the formats the tag accepts
    #[error("Value {value:?} does not match any format accepted by {tag}")]
    FormatMismatch { tag: String, value: String },
}
