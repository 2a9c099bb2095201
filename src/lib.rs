//! # Exif Editor
//!
//! Read, edit and rewrite EXIF/TIFF metadata embedded in JPEG files.
//!
//! The library parses the Exif APP1 segment of a JPEG into typed attributes,
//! lets callers query and modify them through string-based accessors, and
//! writes a freshly laid out Exif segment back while every other segment and
//! the compressed image data are copied byte for byte.
//!
//! ## Architecture
//!
//! - [`io`] - byte-order-aware readers and writers
//! - [`mod@format`] - JPEG segment scanning and the TIFF directory codec
//! - [`metadata`] - the attribute store and the [`ExifFile`] API
//! - [`config`] - CLI types of the `exif-editor` binary
//!
//! ## Example
//!
//! ```rust,no_run
//! use exif_editor::ExifFile;
//! use std::path::Path;
//!
//! # fn main() -> Result<(), exif_editor::ExifError> {
//! let mut file = ExifFile::load(Path::new("photo.jpg"))?;
//! println!("Taken with {:?}", file.attribute("Model"));
//!
//! file.set_attribute("Orientation", Some("6"));
//! file.set_attribute("GPSTimeStamp", Some("12:34:56"));
//! file.save_attributes()?;
//! # Ok(())
//! # }
//! ```

pub mod config;
pub mod error;
pub mod format;
pub mod io;
pub mod metadata;

// Re-export commonly used types
pub use config::{Cli, Command, DumpConfig, GetConfig, GpsConfig, SetConfig, ThumbnailConfig};
pub use error::{EntryError, ExifError, TiffError, ValueError};
pub use format::tiff::{
    names, AttributeValue, DirectoryGroup, FieldType, Rational, TagDescriptor, TagRegistry,
};
pub use format::{detect_format, ImageFormat};
pub use io::ByteOrder;
pub use metadata::{
    AttributeStore, ExifFile, ImageSource, RawAttributes, RawDecoder, RawValue, SourceKind,
};
