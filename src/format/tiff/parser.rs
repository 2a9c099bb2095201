//! TIFF header and directory parsing.
//!
//! The Exif payload of an APP1 segment is a small TIFF stream. All offsets
//! inside it are relative to the start of the TIFF header.
//!
//! # TIFF Header Structure
//!
//! ```text
//! Bytes 0-1: Byte order (0x4949 = little-endian "II", 0x4D4D = big-endian "MM")
//! Bytes 2-3: Version (42 = 0x002A)
//! Bytes 4-7: Offset to first IFD (4 bytes)
//! ```
//!
//! # Directory Structure
//!
//! ```text
//! Bytes 0-1:  Entry count N
//! N x 12:     Entries (tag u16, format u16, count u32, value-or-offset 4 bytes)
//! Bytes 0-3:  Offset of the next IFD (0 = none)
//! ```
//!
//! The primary directory links to the Exif and GPS directories through
//! pointer tags, the Exif directory links to the Interoperability
//! directory, and the primary directory's next-IFD link leads to the
//! thumbnail directory.

use std::collections::HashSet;

use tracing::{debug, warn};

use crate::error::{EntryError, ExifError, TiffError};
use crate::io::{ByteOrder, ByteReader};
use crate::metadata::AttributeStore;

use super::tags::{names, pointer_target, DirectoryGroup, FieldType, TagRegistry};
use super::values::AttributeValue;

// =============================================================================
// Constants
// =============================================================================

/// Magic bytes indicating little-endian byte order ("II" for Intel)
const BYTE_ORDER_LITTLE_ENDIAN: u16 = 0x4949;

/// Magic bytes indicating big-endian byte order ("MM" for Motorola)
const BYTE_ORDER_BIG_ENDIAN: u16 = 0x4D4D;

/// Version number for classic TIFF
pub const TIFF_VERSION: u16 = 42;

/// Size of the TIFF header in bytes
pub const TIFF_HEADER_SIZE: usize = 8;

/// Size of a directory entry in bytes
pub const IFD_ENTRY_SIZE: usize = 12;

/// Pointer directories nest at most this deep below the primary directory.
const MAX_DIRECTORY_DEPTH: usize = 2;

// =============================================================================
// TiffHeader
// =============================================================================

/// Parsed TIFF header of an Exif payload.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TiffHeader {
    /// Byte order for all multi-byte values in the payload
    pub byte_order: ByteOrder,

    /// Offset to the primary directory
    pub first_ifd_offset: u64,
}

impl TiffHeader {
    /// Parse a TIFF header from the start of an Exif payload.
    ///
    /// # Errors
    /// - `FileTooSmall` if there aren't enough bytes for the header
    /// - `InvalidMagic` if byte order bytes are not II or MM
    /// - `InvalidVersion` if version is not 42
    /// - `InvalidIfdOffset` if the first IFD offset is outside the payload
    pub fn parse(bytes: &[u8], region_len: u64) -> Result<Self, TiffError> {
        if bytes.len() < TIFF_HEADER_SIZE {
            return Err(TiffError::FileTooSmall {
                required: TIFF_HEADER_SIZE as u64,
                actual: bytes.len() as u64,
            });
        }

        // Read as big-endian because we're matching literal byte patterns
        let magic = u16::from_be_bytes([bytes[0], bytes[1]]);
        let byte_order = match magic {
            BYTE_ORDER_LITTLE_ENDIAN => ByteOrder::LittleEndian,
            BYTE_ORDER_BIG_ENDIAN => ByteOrder::BigEndian,
            _ => return Err(TiffError::InvalidMagic(magic)),
        };

        let version = byte_order.read_u16(&bytes[2..4]);
        if version != TIFF_VERSION {
            return Err(TiffError::InvalidVersion(version));
        }

        let first_ifd_offset = byte_order.read_u32(&bytes[4..8]) as u64;
        if first_ifd_offset >= region_len {
            return Err(TiffError::InvalidIfdOffset(first_ifd_offset));
        }

        Ok(TiffHeader {
            byte_order,
            first_ifd_offset,
        })
    }
}

// =============================================================================
// Directory Parser
// =============================================================================

/// Parse an Exif payload (starting at its TIFF header) into `store`.
///
/// Per-entry problems are logged and skipped. Truncation inside the
/// primary directory table is returned as an error; a linked directory
/// whose table runs off the payload is dropped with a warning.
pub fn parse_exif(data: &[u8], store: &mut AttributeStore) -> Result<TiffHeader, ExifError> {
    let header = TiffHeader::parse(data, data.len() as u64)?;
    debug!(
        byte_order = header.byte_order.name(),
        first_ifd = header.first_ifd_offset,
        "Parsing Exif payload"
    );

    let mut parser = DirectoryParser::new(data, header.byte_order);
    parser.parse_directory(
        header.first_ifd_offset as usize,
        DirectoryGroup::Primary,
        0,
        store,
    )?;

    Ok(header)
}

/// Recursive directory decoder with cycle protection.
struct DirectoryParser<'a> {
    reader: ByteReader<'a>,
    visited: HashSet<usize>,
}

impl<'a> DirectoryParser<'a> {
    fn new(data: &'a [u8], byte_order: ByteOrder) -> Self {
        Self {
            reader: ByteReader::new(data, byte_order),
            visited: HashSet::new(),
        }
    }

    fn parse_directory(
        &mut self,
        offset: usize,
        group: DirectoryGroup,
        depth: usize,
        store: &mut AttributeStore,
    ) -> Result<(), ExifError> {
        self.visited.insert(offset);
        self.reader.seek(offset)?;
        let entry_count = self.reader.read_u16()? as usize;
        let table_start = offset + 2;

        for index in 0..entry_count {
            // Every entry starts at a fixed position so a bad value read
            // cannot shift the ones that follow.
            let entry_start = table_start + index * IFD_ENTRY_SIZE;
            self.reader.seek(entry_start)?;
            let tag = self.reader.read_u16()?;
            let format = self.reader.read_u16()?;
            let count = self.reader.read_u32()?;

            match self.read_entry(group, tag, format, count) {
                Ok(value) => {
                    let child = TagRegistry::global()
                        .by_number(group, tag)
                        .and_then(|descriptor| pointer_target(descriptor.name));
                    match child {
                        Some(child) => self.follow_pointer(tag, &value, child, depth, store)?,
                        None => {
                            store.group_mut(group).insert(tag, value);
                        }
                    }
                }
                Err(err @ EntryError::UnknownTag { .. }) => {
                    debug!(tag, %group, "Skipping entry: {}", err);
                }
                Err(err) => {
                    warn!(tag, %group, "Skipping entry: {}", err);
                }
            }
        }

        let next_offset_at = table_start + entry_count * IFD_ENTRY_SIZE;
        if group != DirectoryGroup::Primary {
            return Ok(());
        }
        if self.reader.seek(next_offset_at).is_err() || self.reader.remaining() < 4 {
            return Ok(());
        }

        let next = self.reader.read_u32()? as usize;
        if next == 0 {
            return Ok(());
        }
        if next <= TIFF_HEADER_SIZE || next >= self.reader.len() || self.visited.contains(&next) {
            warn!(offset = next, "Ignoring invalid next IFD offset");
            return Ok(());
        }

        debug!(offset = next, "Parsing thumbnail directory");
        self.parse_linked_directory(next, DirectoryGroup::Thumbnail, 1, store);
        Ok(())
    }

    /// Parse a directory reached through a link, discarding the whole group
    /// if its table is truncated.
    fn parse_linked_directory(
        &mut self,
        offset: usize,
        group: DirectoryGroup,
        depth: usize,
        store: &mut AttributeStore,
    ) {
        if let Err(err) = self.parse_directory(offset, group, depth, store) {
            warn!(%group, offset, "Dropping unreadable directory: {}", err);
            store.group_mut(group).clear();
        }
    }

    /// Decode one entry's value. The reader sits on the value field.
    fn read_entry(
        &mut self,
        group: DirectoryGroup,
        tag: u16,
        format: u16,
        count: u32,
    ) -> Result<AttributeValue, EntryError> {
        if TagRegistry::global().by_number(group, tag).is_none() {
            return Err(EntryError::UnknownTag { group, tag });
        }

        let field_type =
            FieldType::from_u16(format).ok_or(EntryError::InvalidFormat { tag, format })?;

        let byte_count = field_type.size_in_bytes() as u64 * count as u64;
        let value_field = self.reader.position();

        let value_offset = if byte_count > FieldType::INLINE_THRESHOLD as u64 {
            let offset = self
                .reader
                .read_u32()
                .map_err(|_| EntryError::InvalidOffset { tag, offset: value_field as u64 })?
                as u64;
            if offset + byte_count > self.reader.len() as u64 {
                return Err(EntryError::InvalidOffset { tag, offset });
            }
            offset as usize
        } else {
            value_field
        };

        self.reader
            .seek(value_offset)
            .map_err(|_| EntryError::InvalidOffset { tag, offset: value_offset as u64 })?;
        let bytes = self
            .reader
            .read_bytes(byte_count as usize)
            .map_err(|_| EntryError::InvalidOffset { tag, offset: value_offset as u64 })?;

        AttributeValue::decode(field_type, count as usize, bytes, self.reader.byte_order())
            .map_err(|_| EntryError::InvalidOffset { tag, offset: value_offset as u64 })
    }

    fn follow_pointer(
        &mut self,
        tag: u16,
        value: &AttributeValue,
        child: DirectoryGroup,
        depth: usize,
        store: &mut AttributeStore,
    ) -> Result<(), ExifError> {
        let Some(offset) = value.as_i64() else {
            warn!(tag, %child, "Pointer tag does not hold a single integer");
            return Ok(());
        };

        if depth >= MAX_DIRECTORY_DEPTH {
            warn!(tag, %child, depth, "Directory nesting too deep, skipping");
            return Ok(());
        }
        if offset <= 0 || offset as u64 >= self.reader.len() as u64 {
            warn!(tag, %child, offset, "Pointer outside Exif payload, skipping");
            return Ok(());
        }
        let offset = offset as usize;
        if self.visited.contains(&offset) {
            warn!(tag, %child, offset, "Directory already parsed, skipping");
            return Ok(());
        }

        debug!(%child, offset, "Following directory pointer");
        self.parse_linked_directory(offset, child, depth + 1, store);
        Ok(())
    }
}

// =============================================================================
// Thumbnail Location
// =============================================================================

/// Locate the embedded thumbnail inside an Exif payload of `region_len` bytes.
///
/// Uses the thumbnail directory's offset/length tags, falling back to the
/// primary directory's. Returns `(offset, length)` relative to the payload,
/// with the length clamped to the payload.
pub fn thumbnail_location(store: &AttributeStore, region_len: usize) -> Option<(usize, usize)> {
    let (offset, length) = [DirectoryGroup::Thumbnail, DirectoryGroup::Primary]
        .into_iter()
        .find_map(|group| {
            let offset = store.get_in(group, names::JPEG_INTERCHANGE_FORMAT)?.as_i64()?;
            let length = store
                .get_in(group, names::JPEG_INTERCHANGE_FORMAT_LENGTH)?
                .as_i64()?;
            Some((offset, length))
        })?;

    if offset <= 0 || length <= 0 {
        return None;
    }

    let offset = usize::try_from(offset).ok()?;
    let length = usize::try_from(length).ok()?;
    let end = offset.saturating_add(length).min(region_len);
    (end > offset).then(|| (offset, end - offset))
}

// =============================================================================
// Tests
// =============================================================================
