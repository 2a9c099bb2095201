//! In-memory metadata model and the file-level API.
//!
//! - [`AttributeStore`] holds decoded tags per directory group
//! - [`ExifFile`] loads a JPEG (or RAW via a [`RawDecoder`]), exposes typed
//!   accessors and writes the edited metadata back

mod file;
mod raw;
mod store;

pub use file::{ExifFile, ImageSource, SourceKind};
pub use raw::{keys, RawAttributes, RawDecoder, RawThumbnail, RawValue};
pub use store::{AttributeMap, AttributeStore};
