//! Seekable byte cursors over in-memory regions.
//!
//! Both cursors honour a byte order. The TIFF header selects it; the JPEG
//! container around it is always big-endian.

use crate::error::ExifError;

use super::endian::ByteOrder;

// =============================================================================
// ByteReader
// =============================================================================

/// Read cursor over a fixed byte region with an absolute position.
#[derive(Debug, Clone)]
pub struct ByteReader<'a> {
    data: &'a [u8],
    position: usize,
    byte_order: ByteOrder,
}

macro_rules! generate_read {
    ($name:ident, $int_type:ty, $size:literal) => {
        #[inline]
        pub fn $name(&mut self) -> Result<$int_type, ExifError> {
            let bytes = self.read_bytes($size)?;
            Ok(self.byte_order.$name(bytes))
        }
    };
}

impl<'a> ByteReader<'a> {
    /// Create a reader positioned at the start of `data`.
    pub fn new(data: &'a [u8], byte_order: ByteOrder) -> Self {
        Self {
            data,
            position: 0,
            byte_order,
        }
    }

    /// Total length of the region.
    #[inline]
    pub fn len(&self) -> usize {
        self.data.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    /// Current absolute position.
    #[inline]
    pub fn position(&self) -> usize {
        self.position
    }

    /// Bytes left between the position and the end of the region.
    #[inline]
    pub fn remaining(&self) -> usize {
        self.data.len() - self.position
    }

    #[inline]
    pub fn byte_order(&self) -> ByteOrder {
        self.byte_order
    }

    pub fn set_byte_order(&mut self, byte_order: ByteOrder) {
        self.byte_order = byte_order;
    }

    /// Move to an absolute position. Seeking exactly to the end is allowed.
    pub fn seek(&mut self, position: usize) -> Result<(), ExifError> {
        if position > self.data.len() {
            return Err(self.out_of_range(position, 0));
        }
        self.position = position;
        Ok(())
    }

    /// Move forward by `count` bytes.
    pub fn skip(&mut self, count: usize) -> Result<(), ExifError> {
        if count > self.remaining() {
            return Err(self.out_of_range(self.position, count));
        }
        self.position += count;
        Ok(())
    }

    /// Read exactly `count` bytes, borrowing them from the region.
    pub fn read_bytes(&mut self, count: usize) -> Result<&'a [u8], ExifError> {
        if count > self.remaining() {
            return Err(self.out_of_range(self.position, count));
        }
        let start = self.position;
        self.position += count;
        Ok(&self.data[start..self.position])
    }

    /// Look at the next byte without consuming it.
    pub fn peek_u8(&self) -> Option<u8> {
        self.data.get(self.position).copied()
    }

    #[inline]
    pub fn read_u8(&mut self) -> Result<u8, ExifError> {
        Ok(self.read_bytes(1)?[0])
    }

    #[inline]
    pub fn read_i8(&mut self) -> Result<i8, ExifError> {
        Ok(self.read_u8()? as i8)
    }

    generate_read!(read_u16, u16, 2);
    generate_read!(read_i16, i16, 2);
    generate_read!(read_u32, u32, 4);
    generate_read!(read_i32, i32, 4);
    generate_read!(read_u64, u64, 8);
    generate_read!(read_i64, i64, 8);
    generate_read!(read_f32, f32, 4);
    generate_read!(read_f64, f64, 8);

    fn out_of_range(&self, offset: usize, requested: usize) -> ExifError {
        ExifError::UnexpectedEndOfData {
            offset: offset as u64,
            requested: requested as u64,
            size: self.data.len() as u64,
        }
    }
}

// =============================================================================
// ByteWriter
// =============================================================================

/// Append-only write cursor that produces an owned buffer.
#[derive(Debug, Clone, Default)]
pub struct ByteWriter {
    buf: Vec<u8>,
    byte_order: ByteOrder,
}

macro_rules! generate_write {
    ($name:ident, $encode:ident, $int_type:ty) => {
        #[inline]
        pub fn $name(&mut self, value: $int_type) {
            let bytes = self.byte_order.$encode(value);
            self.buf.extend_from_slice(&bytes);
        }
    };
}

impl ByteWriter {
    pub fn new(byte_order: ByteOrder) -> Self {
        Self {
            buf: Vec::new(),
            byte_order,
        }
    }

    pub fn with_capacity(byte_order: ByteOrder, capacity: usize) -> Self {
        Self {
            buf: Vec::with_capacity(capacity),
            byte_order,
        }
    }

    /// Number of bytes written so far, i.e. the offset of the next write.
    #[inline]
    pub fn position(&self) -> usize {
        self.buf.len()
    }

    #[inline]
    pub fn byte_order(&self) -> ByteOrder {
        self.byte_order
    }

    pub fn set_byte_order(&mut self, byte_order: ByteOrder) {
        self.byte_order = byte_order;
    }

    pub fn write_bytes(&mut self, bytes: &[u8]) {
        self.buf.extend_from_slice(bytes);
    }

    /// Write `count` zero bytes.
    pub fn pad(&mut self, count: usize) {
        self.buf.resize(self.buf.len() + count, 0);
    }

    #[inline]
    pub fn write_u8(&mut self, value: u8) {
        self.buf.push(value);
    }

    #[inline]
    pub fn write_i8(&mut self, value: i8) {
        self.buf.push(value as u8);
    }

    generate_write!(write_u16, encode_u16, u16);
    generate_write!(write_i16, encode_i16, i16);
    generate_write!(write_u32, encode_u32, u32);
    generate_write!(write_i32, encode_i32, i32);
    generate_write!(write_u64, encode_u64, u64);
    generate_write!(write_i64, encode_i64, i64);
    generate_write!(write_f32, encode_f32, f32);
    generate_write!(write_f64, encode_f64, f64);

    /// Write a JPEG segment length. JPEG is big-endian regardless of the
    /// writer's current byte order.
    pub fn write_segment_length(&mut self, length: u16) {
        self.buf.extend_from_slice(&length.to_be_bytes());
    }

    pub fn as_slice(&self) -> &[u8] {
        &self.buf
    }

    pub fn into_inner(self) -> Vec<u8> {
        self.buf
    }
}

// =============================================================================
// Tests
// =============================================================================
