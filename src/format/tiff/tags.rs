//! Field types, directory groups and the tag registry.
//!
//! The registry maps tag numbers and tag names to the formats each tag
//! accepts, separately for each of the five directory groups. It is built
//! once on first use and never mutated afterwards.

use std::collections::HashMap;
use std::fmt;

use once_cell::sync::Lazy;

// =============================================================================
// Field Types
// =============================================================================

/// TIFF field types that determine how values are encoded.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(u16)]
pub enum FieldType {
    /// Unsigned 8-bit integer (1 byte)
    Byte = 1,

    /// 8-bit ASCII character, NUL terminated (1 byte)
    Ascii = 2,

    /// Unsigned 16-bit integer (2 bytes)
    Short = 3,

    /// Unsigned 32-bit integer (4 bytes)
    Long = 4,

    /// Two unsigned 32-bit integers, numerator then denominator (8 bytes)
    Rational = 5,

    /// Signed 8-bit integer (1 byte)
    SByte = 6,

    /// Opaque byte data (1 byte per element)
    Undefined = 7,

    /// Signed 16-bit integer (2 bytes)
    SShort = 8,

    /// Signed 32-bit integer (4 bytes)
    SLong = 9,

    /// Two signed 32-bit integers (8 bytes)
    SRational = 10,

    /// IEEE single precision float (4 bytes)
    Float = 11,

    /// IEEE double precision float (8 bytes)
    Double = 12,
}

impl FieldType {
    /// Maximum bytes stored inline in the value/offset field of an entry.
    pub const INLINE_THRESHOLD: usize = 4;

    /// Size of a single value of this type in bytes.
    #[inline]
    pub const fn size_in_bytes(self) -> usize {
        match self {
            FieldType::Byte | FieldType::Ascii | FieldType::SByte | FieldType::Undefined => 1,
            FieldType::Short | FieldType::SShort => 2,
            FieldType::Long | FieldType::SLong | FieldType::Float => 4,
            FieldType::Rational | FieldType::SRational | FieldType::Double => 8,
        }
    }

    /// Create a FieldType from its numeric value.
    ///
    /// Returns `None` for discriminants outside 1..=12.
    pub fn from_u16(value: u16) -> Option<Self> {
        match value {
            1 => Some(FieldType::Byte),
            2 => Some(FieldType::Ascii),
            3 => Some(FieldType::Short),
            4 => Some(FieldType::Long),
            5 => Some(FieldType::Rational),
            6 => Some(FieldType::SByte),
            7 => Some(FieldType::Undefined),
            8 => Some(FieldType::SShort),
            9 => Some(FieldType::SLong),
            10 => Some(FieldType::SRational),
            11 => Some(FieldType::Float),
            12 => Some(FieldType::Double),
            _ => None,
        }
    }

    /// Check if `count` values of this type fit in the 4-byte value field.
    #[inline]
    pub fn fits_inline(self, count: u64) -> bool {
        self.size_in_bytes() as u64 * count <= Self::INLINE_THRESHOLD as u64
    }

    /// Container formats that accept any string without conversion.
    pub const fn is_permissive(self) -> bool {
        matches!(
            self,
            FieldType::Byte | FieldType::Undefined | FieldType::Ascii
        )
    }

    pub const fn name(self) -> &'static str {
        match self {
            FieldType::Byte => "BYTE",
            FieldType::Ascii => "ASCII",
            FieldType::Short => "SHORT",
            FieldType::Long => "LONG",
            FieldType::Rational => "RATIONAL",
            FieldType::SByte => "SBYTE",
            FieldType::Undefined => "UNDEFINED",
            FieldType::SShort => "SSHORT",
            FieldType::SLong => "SLONG",
            FieldType::SRational => "SRATIONAL",
            FieldType::Float => "FLOAT",
            FieldType::Double => "DOUBLE",
        }
    }
}

impl fmt::Display for FieldType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

// =============================================================================
// Directory Groups
// =============================================================================

/// The five independent tag directories of an Exif payload.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum DirectoryGroup {
    /// IFD0, the primary image (TIFF tags)
    Primary,
    /// Exif private directory, reached through ExifIFDPointer
    Exif,
    /// GPS directory, reached through GPSInfoIFDPointer
    Gps,
    /// Interoperability directory, reached through InteroperabilityIFDPointer
    Interop,
    /// IFD1, the thumbnail image
    Thumbnail,
}

impl DirectoryGroup {
    /// All groups in read-priority order.
    pub const ALL: [DirectoryGroup; 5] = [
        DirectoryGroup::Primary,
        DirectoryGroup::Exif,
        DirectoryGroup::Gps,
        DirectoryGroup::Interop,
        DirectoryGroup::Thumbnail,
    ];

    #[inline]
    pub const fn index(self) -> usize {
        match self {
            DirectoryGroup::Primary => 0,
            DirectoryGroup::Exif => 1,
            DirectoryGroup::Gps => 2,
            DirectoryGroup::Interop => 3,
            DirectoryGroup::Thumbnail => 4,
        }
    }

    pub const fn name(self) -> &'static str {
        match self {
            DirectoryGroup::Primary => "Primary",
            DirectoryGroup::Exif => "Exif",
            DirectoryGroup::Gps => "GPS",
            DirectoryGroup::Interop => "Interoperability",
            DirectoryGroup::Thumbnail => "Thumbnail",
        }
    }

    /// The pointer tag that links this group from its parent, with the parent.
    pub const fn pointer(self) -> Option<(DirectoryGroup, &'static str)> {
        match self {
            DirectoryGroup::Exif => Some((DirectoryGroup::Primary, names::EXIF_IFD_POINTER)),
            DirectoryGroup::Gps => Some((DirectoryGroup::Primary, names::GPS_INFO_IFD_POINTER)),
            DirectoryGroup::Interop => {
                Some((DirectoryGroup::Exif, names::INTEROPERABILITY_IFD_POINTER))
            }
            DirectoryGroup::Primary | DirectoryGroup::Thumbnail => None,
        }
    }
}

impl fmt::Display for DirectoryGroup {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

// =============================================================================
// Tag Names
// =============================================================================

/// Canonical names of the tags the library treats specially.
pub mod names {
    pub const IMAGE_WIDTH: &str = "ImageWidth";
    pub const IMAGE_LENGTH: &str = "ImageLength";
    pub const ORIENTATION: &str = "Orientation";
    pub const DATETIME: &str = "DateTime";
    pub const MAKE: &str = "Make";
    pub const MODEL: &str = "Model";
    pub const JPEG_INTERCHANGE_FORMAT: &str = "JPEGInterchangeFormat";
    pub const JPEG_INTERCHANGE_FORMAT_LENGTH: &str = "JPEGInterchangeFormatLength";
    pub const EXIF_IFD_POINTER: &str = "ExifIFDPointer";
    pub const GPS_INFO_IFD_POINTER: &str = "GPSInfoIFDPointer";
    pub const INTEROPERABILITY_IFD_POINTER: &str = "InteroperabilityIFDPointer";

    pub const EXPOSURE_TIME: &str = "ExposureTime";
    pub const F_NUMBER: &str = "FNumber";
    pub const ISO_SPEED_RATINGS: &str = "ISOSpeedRatings";
    pub const DATETIME_ORIGINAL: &str = "DateTimeOriginal";
    pub const DATETIME_DIGITIZED: &str = "DateTimeDigitized";
    pub const SUBJECT_DISTANCE: &str = "SubjectDistance";
    pub const LIGHT_SOURCE: &str = "LightSource";
    pub const FLASH: &str = "Flash";
    pub const FOCAL_LENGTH: &str = "FocalLength";
    pub const USER_COMMENT: &str = "UserComment";
    pub const SUBSEC_TIME: &str = "SubSecTime";
    pub const WHITE_BALANCE: &str = "WhiteBalance";
    pub const DIGITAL_ZOOM_RATIO: &str = "DigitalZoomRatio";

    pub const GPS_LATITUDE_REF: &str = "GPSLatitudeRef";
    pub const GPS_LATITUDE: &str = "GPSLatitude";
    pub const GPS_LONGITUDE_REF: &str = "GPSLongitudeRef";
    pub const GPS_LONGITUDE: &str = "GPSLongitude";
    pub const GPS_ALTITUDE_REF: &str = "GPSAltitudeRef";
    pub const GPS_ALTITUDE: &str = "GPSAltitude";
    pub const GPS_TIMESTAMP: &str = "GPSTimeStamp";
    pub const GPS_PROCESSING_METHOD: &str = "GPSProcessingMethod";
    pub const GPS_DATESTAMP: &str = "GPSDateStamp";

    pub const INTEROPERABILITY_INDEX: &str = "InteroperabilityIndex";
}

// =============================================================================
// Tag Descriptors
// =============================================================================

/// Registry entry for one tag within one directory group.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TagDescriptor {
    pub number: u16,
    pub name: &'static str,
    pub primary: FieldType,
    pub secondary: Option<FieldType>,
}

impl TagDescriptor {
    const fn new(number: u16, name: &'static str, primary: FieldType) -> Self {
        Self {
            number,
            name,
            primary,
            secondary: None,
        }
    }

    const fn with_alt(
        number: u16,
        name: &'static str,
        primary: FieldType,
        secondary: FieldType,
    ) -> Self {
        Self {
            number,
            name,
            primary,
            secondary: Some(secondary),
        }
    }

    /// Whether the tag accepts `field_type` as either of its formats.
    pub fn accepts(&self, field_type: FieldType) -> bool {
        self.primary == field_type || self.secondary == Some(field_type)
    }

    /// Whether this descriptor links to a child directory.
    pub fn is_pointer(&self) -> bool {
        pointer_target(self.name).is_some()
    }
}

use FieldType::{Ascii, Byte, Long, Rational, SRational, Short, Undefined};

const PRIMARY_TAGS: &[TagDescriptor] = &[
    TagDescriptor::with_alt(0x0100, names::IMAGE_WIDTH, Short, Long),
    TagDescriptor::with_alt(0x0101, names::IMAGE_LENGTH, Short, Long),
    TagDescriptor::new(0x0102, "BitsPerSample", Short),
    TagDescriptor::new(0x0103, "Compression", Short),
    TagDescriptor::new(0x0106, "PhotometricInterpretation", Short),
    TagDescriptor::new(0x010E, "ImageDescription", Ascii),
    TagDescriptor::new(0x010F, names::MAKE, Ascii),
    TagDescriptor::new(0x0110, names::MODEL, Ascii),
    TagDescriptor::with_alt(0x0111, "StripOffsets", Short, Long),
    TagDescriptor::new(0x0112, names::ORIENTATION, Short),
    TagDescriptor::new(0x0115, "SamplesPerPixel", Short),
    TagDescriptor::with_alt(0x0116, "RowsPerStrip", Short, Long),
    TagDescriptor::with_alt(0x0117, "StripByteCounts", Short, Long),
    TagDescriptor::new(0x011A, "XResolution", Rational),
    TagDescriptor::new(0x011B, "YResolution", Rational),
    TagDescriptor::new(0x011C, "PlanarConfiguration", Short),
    TagDescriptor::new(0x0128, "ResolutionUnit", Short),
    TagDescriptor::new(0x012D, "TransferFunction", Short),
    TagDescriptor::new(0x0131, "Software", Ascii),
    TagDescriptor::new(0x0132, names::DATETIME, Ascii),
    TagDescriptor::new(0x013B, "Artist", Ascii),
    TagDescriptor::new(0x013E, "WhitePoint", Rational),
    TagDescriptor::new(0x013F, "PrimaryChromaticities", Rational),
    TagDescriptor::new(0x0201, names::JPEG_INTERCHANGE_FORMAT, Long),
    TagDescriptor::new(0x0202, names::JPEG_INTERCHANGE_FORMAT_LENGTH, Long),
    TagDescriptor::new(0x0211, "YCbCrCoefficients", Rational),
    TagDescriptor::new(0x0212, "YCbCrSubSampling", Short),
    TagDescriptor::new(0x0213, "YCbCrPositioning", Short),
    TagDescriptor::new(0x0214, "ReferenceBlackWhite", Rational),
    TagDescriptor::new(0x8298, "Copyright", Ascii),
    TagDescriptor::new(0x8769, names::EXIF_IFD_POINTER, Long),
    TagDescriptor::new(0x8825, names::GPS_INFO_IFD_POINTER, Long),
];

const EXIF_TAGS: &[TagDescriptor] = &[
    TagDescriptor::new(0x829A, names::EXPOSURE_TIME, Rational),
    TagDescriptor::new(0x829D, names::F_NUMBER, Rational),
    TagDescriptor::new(0x8822, "ExposureProgram", Short),
    TagDescriptor::new(0x8824, "SpectralSensitivity", Ascii),
    TagDescriptor::new(0x8827, names::ISO_SPEED_RATINGS, Short),
    TagDescriptor::new(0x8828, "OECF", Undefined),
    TagDescriptor::new(0x9000, "ExifVersion", Ascii),
    TagDescriptor::new(0x9003, names::DATETIME_ORIGINAL, Ascii),
    TagDescriptor::new(0x9004, names::DATETIME_DIGITIZED, Ascii),
    TagDescriptor::new(0x9101, "ComponentsConfiguration", Undefined),
    TagDescriptor::new(0x9102, "CompressedBitsPerPixel", Rational),
    TagDescriptor::new(0x9201, "ShutterSpeedValue", SRational),
    TagDescriptor::new(0x9202, "ApertureValue", Rational),
    TagDescriptor::new(0x9203, "BrightnessValue", SRational),
    TagDescriptor::new(0x9204, "ExposureBiasValue", SRational),
    TagDescriptor::new(0x9205, "MaxApertureValue", Rational),
    TagDescriptor::new(0x9206, names::SUBJECT_DISTANCE, Rational),
    TagDescriptor::new(0x9207, "MeteringMode", Short),
    TagDescriptor::new(0x9208, names::LIGHT_SOURCE, Short),
    TagDescriptor::new(0x9209, names::FLASH, Short),
    TagDescriptor::new(0x920A, names::FOCAL_LENGTH, Rational),
    TagDescriptor::new(0x9214, "SubjectArea", Short),
    TagDescriptor::new(0x927C, "MakerNote", Undefined),
    TagDescriptor::new(0x9286, names::USER_COMMENT, Undefined),
    TagDescriptor::new(0x9290, names::SUBSEC_TIME, Ascii),
    TagDescriptor::new(0x9291, "SubSecTimeOriginal", Ascii),
    TagDescriptor::new(0x9292, "SubSecTimeDigitized", Ascii),
    TagDescriptor::new(0xA000, "FlashpixVersion", Undefined),
    TagDescriptor::new(0xA001, "ColorSpace", Short),
    TagDescriptor::with_alt(0xA002, "PixelXDimension", Short, Long),
    TagDescriptor::with_alt(0xA003, "PixelYDimension", Short, Long),
    TagDescriptor::new(0xA004, "RelatedSoundFile", Ascii),
    TagDescriptor::new(0xA005, names::INTEROPERABILITY_IFD_POINTER, Long),
    TagDescriptor::new(0xA20B, "FlashEnergy", Rational),
    TagDescriptor::new(0xA20C, "SpatialFrequencyResponse", Undefined),
    TagDescriptor::new(0xA20E, "FocalPlaneXResolution", Rational),
    TagDescriptor::new(0xA20F, "FocalPlaneYResolution", Rational),
    TagDescriptor::new(0xA210, "FocalPlaneResolutionUnit", Short),
    TagDescriptor::new(0xA214, "SubjectLocation", Short),
    TagDescriptor::new(0xA215, "ExposureIndex", Rational),
    TagDescriptor::new(0xA217, "SensingMethod", Short),
    TagDescriptor::new(0xA300, "FileSource", Undefined),
    TagDescriptor::new(0xA301, "SceneType", Undefined),
    TagDescriptor::new(0xA302, "CFAPattern", Undefined),
    TagDescriptor::new(0xA401, "CustomRendered", Short),
    TagDescriptor::new(0xA402, "ExposureMode", Short),
    TagDescriptor::new(0xA403, names::WHITE_BALANCE, Short),
    TagDescriptor::new(0xA404, names::DIGITAL_ZOOM_RATIO, Rational),
    TagDescriptor::new(0xA405, "FocalLengthIn35mmFilm", Short),
    TagDescriptor::new(0xA406, "SceneCaptureType", Short),
    TagDescriptor::new(0xA407, "GainControl", Short),
    TagDescriptor::new(0xA408, "Contrast", Short),
    TagDescriptor::new(0xA409, "Saturation", Short),
    TagDescriptor::new(0xA40A, "Sharpness", Short),
    TagDescriptor::new(0xA40B, "DeviceSettingDescription", Undefined),
    TagDescriptor::new(0xA40C, "SubjectDistanceRange", Short),
    TagDescriptor::new(0xA420, "ImageUniqueID", Ascii),
];

const GPS_TAGS: &[TagDescriptor] = &[
    TagDescriptor::new(0x0000, "GPSVersionID", Byte),
    TagDescriptor::new(0x0001, names::GPS_LATITUDE_REF, Ascii),
    TagDescriptor::new(0x0002, names::GPS_LATITUDE, Rational),
    TagDescriptor::new(0x0003, names::GPS_LONGITUDE_REF, Ascii),
    TagDescriptor::new(0x0004, names::GPS_LONGITUDE, Rational),
    TagDescriptor::new(0x0005, names::GPS_ALTITUDE_REF, Byte),
    TagDescriptor::new(0x0006, names::GPS_ALTITUDE, Rational),
    TagDescriptor::new(0x0007, names::GPS_TIMESTAMP, Rational),
    TagDescriptor::new(0x0008, "GPSSatellites", Ascii),
    TagDescriptor::new(0x0009, "GPSStatus", Ascii),
    TagDescriptor::new(0x000A, "GPSMeasureMode", Ascii),
    TagDescriptor::new(0x000B, "GPSDOP", Rational),
    TagDescriptor::new(0x000C, "GPSSpeedRef", Ascii),
    TagDescriptor::new(0x000D, "GPSSpeed", Rational),
    TagDescriptor::new(0x000E, "GPSTrackRef", Ascii),
    TagDescriptor::new(0x000F, "GPSTrack", Rational),
    TagDescriptor::new(0x0010, "GPSImgDirectionRef", Ascii),
    TagDescriptor::new(0x0011, "GPSImgDirection", Rational),
    TagDescriptor::new(0x0012, "GPSMapDatum", Ascii),
    TagDescriptor::new(0x0013, "GPSDestLatitudeRef", Ascii),
    TagDescriptor::new(0x0014, "GPSDestLatitude", Rational),
    TagDescriptor::new(0x0015, "GPSDestLongitudeRef", Ascii),
    TagDescriptor::new(0x0016, "GPSDestLongitude", Rational),
    TagDescriptor::new(0x0017, "GPSDestBearingRef", Ascii),
    TagDescriptor::new(0x0018, "GPSDestBearing", Rational),
    TagDescriptor::new(0x0019, "GPSDestDistanceRef", Ascii),
    TagDescriptor::new(0x001A, "GPSDestDistance", Rational),
    TagDescriptor::new(0x001B, names::GPS_PROCESSING_METHOD, Undefined),
    TagDescriptor::new(0x001C, "GPSAreaInformation", Undefined),
    TagDescriptor::new(0x001D, names::GPS_DATESTAMP, Ascii),
    TagDescriptor::new(0x001E, "GPSDifferential", Short),
];

const INTEROP_TAGS: &[TagDescriptor] = &[
    TagDescriptor::new(0x0001, names::INTEROPERABILITY_INDEX, Ascii),
];

const THUMBNAIL_TAGS: &[TagDescriptor] = &[
    TagDescriptor::with_alt(0x0100, names::IMAGE_WIDTH, Short, Long),
    TagDescriptor::with_alt(0x0101, names::IMAGE_LENGTH, Short, Long),
    TagDescriptor::new(0x0102, "BitsPerSample", Short),
    TagDescriptor::new(0x0103, "Compression", Short),
    TagDescriptor::new(0x0106, "PhotometricInterpretation", Short),
    TagDescriptor::new(0x010E, "ImageDescription", Ascii),
    TagDescriptor::new(0x010F, names::MAKE, Ascii),
    TagDescriptor::new(0x0110, names::MODEL, Ascii),
    TagDescriptor::with_alt(0x0111, "StripOffsets", Short, Long),
    TagDescriptor::new(0x0112, names::ORIENTATION, Short),
    TagDescriptor::new(0x0115, "SamplesPerPixel", Short),
    TagDescriptor::with_alt(0x0116, "RowsPerStrip", Short, Long),
    TagDescriptor::with_alt(0x0117, "StripByteCounts", Short, Long),
    TagDescriptor::new(0x011A, "XResolution", Rational),
    TagDescriptor::new(0x011B, "YResolution", Rational),
    TagDescriptor::new(0x011C, "PlanarConfiguration", Short),
    TagDescriptor::new(0x0128, "ResolutionUnit", Short),
    TagDescriptor::new(0x012D, "TransferFunction", Short),
    TagDescriptor::new(0x0131, "Software", Ascii),
    TagDescriptor::new(0x0132, names::DATETIME, Ascii),
    TagDescriptor::new(0x013B, "Artist", Ascii),
    TagDescriptor::new(0x013E, "WhitePoint", Rational),
    TagDescriptor::new(0x013F, "PrimaryChromaticities", Rational),
    TagDescriptor::new(0x0201, names::JPEG_INTERCHANGE_FORMAT, Long),
    TagDescriptor::new(0x0202, names::JPEG_INTERCHANGE_FORMAT_LENGTH, Long),
    TagDescriptor::new(0x0211, "YCbCrCoefficients", Rational),
    TagDescriptor::new(0x0212, "YCbCrSubSampling", Short),
    TagDescriptor::new(0x0213, "YCbCrPositioning", Short),
    TagDescriptor::new(0x0214, "ReferenceBlackWhite", Rational),
    TagDescriptor::new(0x8298, "Copyright", Ascii),
];

/// Child group reached through a pointer tag name.
pub fn pointer_target(name: &str) -> Option<DirectoryGroup> {
    match name {
        names::EXIF_IFD_POINTER => Some(DirectoryGroup::Exif),
        names::GPS_INFO_IFD_POINTER => Some(DirectoryGroup::Gps),
        names::INTEROPERABILITY_IFD_POINTER => Some(DirectoryGroup::Interop),
        _ => None,
    }
}

// =============================================================================
// Tag Registry
// =============================================================================

#[derive(Debug, Default)]
struct GroupTable {
    by_number: HashMap<u16, &'static TagDescriptor>,
    by_name: HashMap<&'static str, &'static TagDescriptor>,
}

impl GroupTable {
    fn build(tags: &'static [TagDescriptor]) -> Self {
        let mut table = GroupTable::default();
        for tag in tags {
            table.by_number.insert(tag.number, tag);
            table.by_name.insert(tag.name, tag);
        }
        table
    }
}

/// Immutable bidirectional tag lookup, partitioned by directory group.
#[derive(Debug)]
pub struct TagRegistry {
    groups: [GroupTable; 5],
}

static REGISTRY: Lazy<TagRegistry> = Lazy::new(TagRegistry::build);

impl TagRegistry {
    /// The process-wide registry, built on first access.
    pub fn global() -> &'static TagRegistry {
        &REGISTRY
    }

    fn build() -> Self {
        TagRegistry {
            groups: [
                GroupTable::build(PRIMARY_TAGS),
                GroupTable::build(EXIF_TAGS),
                GroupTable::build(GPS_TAGS),
                GroupTable::build(INTEROP_TAGS),
                GroupTable::build(THUMBNAIL_TAGS),
            ],
        }
    }

    /// Look up a tag by number within a group.
    pub fn by_number(&self, group: DirectoryGroup, number: u16) -> Option<&'static TagDescriptor> {
        self.groups[group.index()].by_number.get(&number).copied()
    }

    /// Look up a tag by name within a group.
    pub fn by_name(&self, group: DirectoryGroup, name: &str) -> Option<&'static TagDescriptor> {
        self.groups[group.index()].by_name.get(name).copied()
    }

    /// Every group whose table defines `name`, in priority order.
    pub fn groups_defining(&self, name: &str) -> Vec<DirectoryGroup> {
        DirectoryGroup::ALL
            .into_iter()
            .filter(|group| self.by_name(*group, name).is_some())
            .collect()
    }

    /// Whether any group defines `name`.
    pub fn is_known(&self, name: &str) -> bool {
        DirectoryGroup::ALL
            .into_iter()
            .any(|group| self.by_name(group, name).is_some())
    }
}

// =============================================================================
// Tests
// =============================================================================
