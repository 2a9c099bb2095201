//! Byte order selection and fixed-width integer helpers.
//!
//! Exif payloads declare their endianness once in the TIFF header
//! (II = little-endian, MM = big-endian) and every multi-byte value that
//! follows must be read and written in that order. The surrounding JPEG
//! container is always big-endian.

// =============================================================================
// ByteOrder
// =============================================================================

/// Byte order (endianness) of an Exif payload.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum ByteOrder {
    /// Little-endian ("II" = Intel)
    LittleEndian,
    /// Big-endian ("MM" = Motorola)
    #[default]
    BigEndian,
}

macro_rules! generate_decode {
    ($name:ident, $int_type:ty, $size:literal) => {
        /// Decode a value from the first bytes of `bytes` using this byte order.
        ///
        /// # Panics
        /// Panics if the slice is shorter than the value.
        #[inline]
        pub fn $name(self, bytes: &[u8]) -> $int_type {
            let mut buf = [0u8; $size];
            buf.copy_from_slice(&bytes[..$size]);
            match self {
                ByteOrder::LittleEndian => <$int_type>::from_le_bytes(buf),
                ByteOrder::BigEndian => <$int_type>::from_be_bytes(buf),
            }
        }
    };
}

macro_rules! generate_encode {
    ($name:ident, $int_type:ty, $size:literal) => {
        /// Encode a value using this byte order.
        #[inline]
        pub fn $name(self, value: $int_type) -> [u8; $size] {
            match self {
                ByteOrder::LittleEndian => value.to_le_bytes(),
                ByteOrder::BigEndian => value.to_be_bytes(),
            }
        }
    };
}

impl ByteOrder {
    /// The two-byte marker that opens a TIFF header in this order.
    pub const fn marker(self) -> [u8; 2] {
        match self {
            ByteOrder::LittleEndian => *b"II",
            ByteOrder::BigEndian => *b"MM",
        }
    }

    /// Short name used in logs and CLI output.
    pub const fn name(self) -> &'static str {
        match self {
            ByteOrder::LittleEndian => "little-endian",
            ByteOrder::BigEndian => "big-endian",
        }
    }

    generate_decode!(read_u16, u16, 2);
    generate_decode!(read_i16, i16, 2);
    generate_decode!(read_u32, u32, 4);
    generate_decode!(read_i32, i32, 4);
    generate_decode!(read_u64, u64, 8);
    generate_decode!(read_i64, i64, 8);
    generate_decode!(read_f32, f32, 4);
    generate_decode!(read_f64, f64, 8);

    generate_encode!(encode_u16, u16, 2);
    generate_encode!(encode_i16, i16, 2);
    generate_encode!(encode_u32, u32, 4);
    generate_encode!(encode_i32, i32, 4);
    generate_encode!(encode_u64, u64, 8);
    generate_encode!(encode_i64, i64, 8);
    generate_encode!(encode_f32, f32, 4);
    generate_encode!(encode_f64, f64, 8);
}

// =============================================================================
// Tests
// =============================================================================
