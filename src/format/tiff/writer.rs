//! Exif payload serialization.
//!
//! Writing happens in two passes. [`LayoutPlan::new`] works on a copy of
//! the store: it strips the structural tags, re-inserts the pointer and
//! thumbnail tags that the current contents need, sizes every directory
//! and patches the final offsets in. [`LayoutPlan::write`] then emits the
//! TIFF stream in a single forward pass.

use tracing::debug;

use crate::io::{ByteOrder, ByteWriter};
use crate::metadata::{AttributeMap, AttributeStore};

use super::parser::{IFD_ENTRY_SIZE, TIFF_HEADER_SIZE, TIFF_VERSION};
use super::tags::{names, DirectoryGroup, TagRegistry};
use super::values::AttributeValue;

/// Tags whose values depend on the layout and are always recomputed.
const STRUCTURAL_TAGS: [&str; 5] = [
    names::EXIF_IFD_POINTER,
    names::GPS_INFO_IFD_POINTER,
    names::INTEROPERABILITY_IFD_POINTER,
    names::JPEG_INTERCHANGE_FORMAT,
    names::JPEG_INTERCHANGE_FORMAT_LENGTH,
];

/// A serialized Exif payload.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EncodedExif {
    /// TIFF header, directories and thumbnail
    pub tiff: Vec<u8>,

    /// Offset of the thumbnail within `tiff`
    pub thumbnail_offset: Option<usize>,
}

// =============================================================================
// LayoutPlan
// =============================================================================

/// Final directory contents and offsets for one payload.
#[derive(Debug, Clone)]
pub struct LayoutPlan {
    groups: [AttributeMap; 5],
    offsets: [Option<usize>; 5],
    thumbnail_offset: Option<usize>,
    total_len: usize,
}

impl LayoutPlan {
    /// Plan the layout of `store` plus an optional thumbnail of `thumbnail_len` bytes.
    pub fn new(store: &AttributeStore, thumbnail_len: Option<usize>) -> Self {
        let registry = TagRegistry::global();
        let mut groups = store.clone().into_groups();

        for group in DirectoryGroup::ALL {
            for name in STRUCTURAL_TAGS {
                if let Some(descriptor) = registry.by_name(group, name) {
                    groups[group.index()].remove(&descriptor.number);
                }
            }
        }

        // Interop first: its pointer can make an otherwise empty Exif group non-empty.
        for child in [DirectoryGroup::Interop, DirectoryGroup::Exif, DirectoryGroup::Gps] {
            if groups[child.index()].is_empty() {
                continue;
            }
            if let Some((parent, name)) = child.pointer() {
                if let Some(descriptor) = registry.by_name(parent, name) {
                    groups[parent.index()].insert(descriptor.number, AttributeValue::Long(vec![0]));
                }
            }
        }

        if let Some(len) = thumbnail_len {
            set_long(&mut groups, DirectoryGroup::Thumbnail, names::JPEG_INTERCHANGE_FORMAT, 0);
            set_long(
                &mut groups,
                DirectoryGroup::Thumbnail,
                names::JPEG_INTERCHANGE_FORMAT_LENGTH,
                len as u32,
            );
        }

        let mut offsets = [None; 5];
        let mut position = TIFF_HEADER_SIZE;
        for group in DirectoryGroup::ALL {
            let entries = &groups[group.index()];
            if entries.is_empty() && group != DirectoryGroup::Primary {
                continue;
            }
            offsets[group.index()] = Some(position);
            position += directory_size(entries);
        }

        let thumbnail_offset = thumbnail_len.map(|_| position);
        let total_len = position + thumbnail_len.unwrap_or(0);

        for child in [DirectoryGroup::Exif, DirectoryGroup::Gps, DirectoryGroup::Interop] {
            if let (Some(offset), Some((parent, name))) = (offsets[child.index()], child.pointer()) {
                set_long(&mut groups, parent, name, offset as u32);
            }
        }
        if let Some(offset) = thumbnail_offset {
            set_long(
                &mut groups,
                DirectoryGroup::Thumbnail,
                names::JPEG_INTERCHANGE_FORMAT,
                offset as u32,
            );
        }

        Self {
            groups,
            offsets,
            thumbnail_offset,
            total_len,
        }
    }

    /// Offset of a group's directory, if it is written.
    pub fn group_offset(&self, group: DirectoryGroup) -> Option<usize> {
        self.offsets[group.index()]
    }

    /// Offset of the thumbnail bytes, if a thumbnail is written.
    pub fn thumbnail_offset(&self) -> Option<usize> {
        self.thumbnail_offset
    }

    /// Final entries of a group, including patched structural tags.
    pub fn entries(&self, group: DirectoryGroup) -> &AttributeMap {
        &self.groups[group.index()]
    }

    /// Total payload size in bytes.
    pub fn len(&self) -> usize {
        self.total_len
    }

    pub fn is_empty(&self) -> bool {
        self.total_len == 0
    }

    /// Emit the payload described by this plan.
    pub fn write(&self, byte_order: ByteOrder, thumbnail: Option<&[u8]>) -> Vec<u8> {
        let mut writer = ByteWriter::with_capacity(byte_order, self.total_len);
        writer.write_bytes(&byte_order.marker());
        writer.write_u16(TIFF_VERSION);
        writer.write_u32(TIFF_HEADER_SIZE as u32);

        let thumbnail_ifd = self.offsets[DirectoryGroup::Thumbnail.index()];

        for group in DirectoryGroup::ALL {
            let Some(offset) = self.offsets[group.index()] else {
                continue;
            };
            debug_assert_eq!(writer.position(), offset);

            let entries = &self.groups[group.index()];
            writer.write_u16(entries.len() as u16);

            let mut overflow_position = offset + 2 + entries.len() * IFD_ENTRY_SIZE + 4;
            for (&tag, value) in entries {
                writer.write_u16(tag);
                writer.write_u16(value.field_type() as u16);
                writer.write_u32(value.component_count() as u32);
                if value.needs_overflow() {
                    writer.write_u32(overflow_position as u32);
                    overflow_position += value.size_in_bytes();
                } else {
                    let start = writer.position();
                    value.encode_into(&mut writer);
                    writer.pad(4 - (writer.position() - start));
                }
            }

            let next = match (group, thumbnail_ifd) {
                (DirectoryGroup::Primary, Some(thumbnail)) => thumbnail as u32,
                _ => 0,
            };
            writer.write_u32(next);

            for value in entries.values().filter(|value| value.needs_overflow()) {
                value.encode_into(&mut writer);
            }
        }

        if let Some(bytes) = thumbnail {
            debug_assert_eq!(Some(writer.position()), self.thumbnail_offset);
            writer.write_bytes(bytes);
        }

        debug!(
            size = writer.position(),
            byte_order = byte_order.name(),
            "Serialized Exif payload"
        );
        writer.into_inner()
    }
}

/// Encoded size of a directory: count, entries, next link and overflow area.
fn directory_size(entries: &AttributeMap) -> usize {
    let overflow: usize = entries
        .values()
        .filter(|value| value.needs_overflow())
        .map(AttributeValue::size_in_bytes)
        .sum();
    2 + entries.len() * IFD_ENTRY_SIZE + 4 + overflow
}

fn set_long(groups: &mut [AttributeMap; 5], group: DirectoryGroup, name: &str, value: u32) {
    if let Some(descriptor) = TagRegistry::global().by_name(group, name) {
        groups[group.index()].insert(descriptor.number, AttributeValue::Long(vec![value]));
    }
}

/// Serialize `store` (and the thumbnail, if any) into a TIFF payload.
pub fn write_exif(
    store: &AttributeStore,
    byte_order: ByteOrder,
    thumbnail: Option<&[u8]>,
) -> EncodedExif {
    let plan = LayoutPlan::new(store, thumbnail.map(<[u8]>::len));
    EncodedExif {
        tiff: plan.write(byte_order, thumbnail),
        thumbnail_offset: plan.thumbnail_offset(),
    }
}

// =============================================================================
// Tests
// =============================================================================
