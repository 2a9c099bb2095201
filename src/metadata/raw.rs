//! Import of metadata produced by an external RAW decoder.
//!
//! The library does not parse camera RAW formats itself. A [`RawDecoder`]
//! turns the file bytes into a flat name/value map; names matching the tag
//! registry are folded into the store, and a few reserved keys describe
//! the embedded thumbnail.

use std::collections::HashMap;

use bytes::Bytes;
use tracing::{debug, warn};

use crate::error::ExifError;
use crate::format::tiff::TagRegistry;

use super::store::AttributeStore;

/// Reserved keys of a RAW attribute map.
pub mod keys {
    /// `"true"` when the RAW file embeds a thumbnail
    pub const HAS_THUMBNAIL: &str = "HasThumbnail";
    /// Decimal file offset of the thumbnail
    pub const THUMBNAIL_OFFSET: &str = "ThumbnailOffset";
    /// Decimal thumbnail length in bytes
    pub const THUMBNAIL_LENGTH: &str = "ThumbnailLength";
    /// Thumbnail bytes
    pub const THUMBNAIL_DATA: &str = "ThumbnailData";

    pub(crate) const ALL: [&str; 4] = [
        HAS_THUMBNAIL,
        THUMBNAIL_OFFSET,
        THUMBNAIL_LENGTH,
        THUMBNAIL_DATA,
    ];
}

/// A value reported by a RAW decoder.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RawValue {
    Text(String),
    Bytes(Bytes),
}

impl RawValue {
    pub fn as_text(&self) -> Option<&str> {
        match self {
            RawValue::Text(text) => Some(text),
            RawValue::Bytes(_) => None,
        }
    }
}

impl From<&str> for RawValue {
    fn from(text: &str) -> Self {
        RawValue::Text(text.to_string())
    }
}

impl From<String> for RawValue {
    fn from(text: String) -> Self {
        RawValue::Text(text)
    }
}

impl From<Vec<u8>> for RawValue {
    fn from(bytes: Vec<u8>) -> Self {
        RawValue::Bytes(Bytes::from(bytes))
    }
}

/// Flat attribute map returned by a RAW decoder.
pub type RawAttributes = HashMap<String, RawValue>;

/// Opaque RAW-format decoder.
///
/// Returns `Ok(None)` when the data is not a format the decoder handles.
pub trait RawDecoder {
    fn decode(&self, data: &[u8]) -> Result<Option<RawAttributes>, ExifError>;
}

impl<F> RawDecoder for F
where
    F: Fn(&[u8]) -> Result<Option<RawAttributes>, ExifError>,
{
    fn decode(&self, data: &[u8]) -> Result<Option<RawAttributes>, ExifError> {
        self(data)
    }
}

/// Thumbnail description reported through the reserved keys.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RawThumbnail {
    pub offset: Option<u64>,
    pub length: Option<usize>,
    pub data: Option<Bytes>,
}

/// Fold a RAW attribute map into `store`.
///
/// Returns the thumbnail description when the map reports one.
pub(crate) fn import(attributes: &RawAttributes, store: &mut AttributeStore) -> Option<RawThumbnail> {
    let has_thumbnail = attributes
        .get(keys::HAS_THUMBNAIL)
        .and_then(RawValue::as_text)
        .is_some_and(|value| value.eq_ignore_ascii_case("true"));

    let registry = TagRegistry::global();
    let mut imported = 0usize;
    for (name, value) in attributes {
        if keys::ALL.contains(&name.as_str()) {
            continue;
        }
        if !registry.is_known(name) {
            debug!(tag = %name, "Ignoring unregistered RAW attribute");
            continue;
        }
        let Some(text) = value.as_text() else {
            debug!(tag = %name, "Ignoring binary RAW attribute");
            continue;
        };
        match store.set_string(name, text, has_thumbnail) {
            Ok(_) => imported += 1,
            Err(err) => warn!(tag = %name, error = %err, "Skipping RAW attribute"),
        }
    }
    debug!(imported, has_thumbnail, "Imported RAW attributes");

    if !has_thumbnail {
        return None;
    }

    let number = |key: &str| {
        attributes
            .get(key)
            .and_then(RawValue::as_text)
            .and_then(|value| value.trim().parse::<u64>().ok())
    };
    let data = match attributes.get(keys::THUMBNAIL_DATA) {
        Some(RawValue::Bytes(bytes)) => Some(bytes.clone()),
        _ => None,
    };

    Some(RawThumbnail {
        offset: number(keys::THUMBNAIL_OFFSET),
        length: number(keys::THUMBNAIL_LENGTH).map(|length| length as usize),
        data,
    })
}
