//! Byte-level I/O: endianness helpers and in-memory cursors.

mod cursor;
mod endian;

pub use cursor::{ByteReader, ByteWriter};
pub use endian::ByteOrder;
