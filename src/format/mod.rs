//! Container and payload formats.
//!
//! - [`detect`] sniffs the container type from the leading bytes
//! - [`jpeg`] walks JPEG segments and splices a rewritten Exif segment in
//! - [`tiff`] decodes and encodes the TIFF directories inside that segment

pub mod detect;
pub mod jpeg;
pub mod tiff;

pub use detect::{detect_format, is_jpeg, is_tiff_header, ImageFormat};
pub use jpeg::{build_app1_segment, scan, write_with_exif, JpegScan};
