//! TIFF structures embedded in Exif payloads.
//!
//! # Key Concepts
//!
//! - **Byte order**: the payload declares its endianness (II = little-endian,
//!   MM = big-endian) in the header. All multi-byte values must be read and
//!   written respecting this order.
//!
//! - **Directory groups**: an Exif payload holds up to five directories
//!   (primary, Exif, GPS, Interoperability, thumbnail) linked by pointer tags
//!   and the primary directory's next-IFD link.
//!
//! - **Inline vs offset values**: values of at most 4 bytes are stored inline
//!   in the directory entry, larger values live in an overflow area and the
//!   entry holds their offset.

pub mod coerce;
mod parser;
mod tags;
mod values;
mod writer;

pub use parser::{
    parse_exif, thumbnail_location, TiffHeader, IFD_ENTRY_SIZE, TIFF_HEADER_SIZE, TIFF_VERSION,
};
pub use tags::{names, pointer_target, DirectoryGroup, FieldType, TagDescriptor, TagRegistry};
pub use values::{AttributeValue, Rational};
pub use writer::{write_exif, EncodedExif, LayoutPlan};
