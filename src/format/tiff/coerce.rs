//! Conversion between public string values and typed tag values.
//!
//! Writes go through three steps: guess the formats a string could be,
//! pick the format the tag descriptor accepts, then parse the string into
//! that format. A handful of legacy tags are exchanged as decimals (or a
//! clock time) instead of raw rationals.

use once_cell::sync::Lazy;
use regex::Regex;

use crate::error::ValueError;

use super::tags::{names, FieldType, TagDescriptor};
use super::values::{format_decimal, AttributeValue, Rational};

/// The format guess for a string: a primary format and an optional alternative.
pub type FormatGuess = (FieldType, Option<FieldType>);

/// Denominator used when a legacy decimal is stored as a rational.
pub const LEGACY_DENOMINATOR: i64 = 10_000;

static GPS_TIMESTAMP_PATTERN: Lazy<Option<Regex>> =
    Lazy::new(|| Regex::new(r"^(\d\d):(\d\d):(\d\d)$").ok());

const LEGACY_DECIMAL_TAGS: [&str; 4] = [
    names::F_NUMBER,
    names::DIGITAL_ZOOM_RATIO,
    names::EXPOSURE_TIME,
    names::SUBJECT_DISTANCE,
];

// =============================================================================
// Format Guessing
// =============================================================================

/// Guess which formats a string value could be stored as.
pub fn guess_format(value: &str) -> FormatGuess {
    if value.contains(',') {
        return guess_list_format(value);
    }

    if value.contains('/') {
        return guess_rational_format(value);
    }

    if let Ok(integer) = value.parse::<i64>() {
        return if (0..=65535).contains(&integer) {
            (FieldType::Short, Some(FieldType::Long))
        } else if integer < 0 {
            (FieldType::SLong, None)
        } else {
            (FieldType::Long, None)
        };
    }

    if value.parse::<f64>().is_ok() {
        return (FieldType::Double, None);
    }

    (FieldType::Ascii, None)
}

/// Intersect the guesses of every component, falling back to ASCII.
fn guess_list_format(value: &str) -> FormatGuess {
    let mut components = value.split(',');
    let mut guess = guess_format(components.next().unwrap_or_default().trim());
    if guess.0 == FieldType::Ascii {
        return guess;
    }

    for component in components {
        let (primary, secondary) = guess_format(component.trim());
        let accepts = |candidate: FieldType| primary == candidate || secondary == Some(candidate);

        let keep_first = accepts(guess.0);
        let keep_second = guess.1.filter(|&second| accepts(second));

        guess = match (keep_first, keep_second) {
            (false, None) => return (FieldType::Ascii, None),
            (false, Some(second)) => (second, None),
            (true, None) => (guess.0, None),
            (true, Some(second)) => (guess.0, Some(second)),
        };
    }

    guess
}

fn guess_rational_format(value: &str) -> FormatGuess {
    let parts = value
        .split_once('/')
        .filter(|(_, denominator)| !denominator.contains('/'))
        .and_then(|(n, d)| Some((n.parse::<i64>().ok()?, d.parse::<i64>().ok()?)));

    let Some((numerator, denominator)) = parts else {
        return (FieldType::Ascii, None);
    };

    if numerator < 0 || denominator < 0 {
        (FieldType::SRational, None)
    } else if numerator > u32::MAX as i64 || denominator > u32::MAX as i64 {
        (FieldType::SRational, None)
    } else if numerator > i32::MAX as i64 || denominator > i32::MAX as i64 {
        (FieldType::Rational, None)
    } else {
        (FieldType::SRational, Some(FieldType::Rational))
    }
}

// =============================================================================
// Format Selection
// =============================================================================

/// Choose the format a tag stores for a guessed value.
///
/// Returns `None` when the tag accepts none of the guessed formats and its
/// primary format is not a permissive container.
pub fn select_format(descriptor: &TagDescriptor, guess: FormatGuess) -> Option<FieldType> {
    let matches = |format: FieldType| guess.0 == format || guess.1 == Some(format);

    if matches(descriptor.primary) {
        Some(descriptor.primary)
    } else if let Some(secondary) = descriptor.secondary.filter(|&s| matches(s)) {
        Some(secondary)
    } else if descriptor.primary.is_permissive() {
        Some(descriptor.primary)
    } else {
        None
    }
}

// =============================================================================
// Parsing
// =============================================================================

/// Parse a string into a value of the given format.
pub fn parse_value(field_type: FieldType, value: &str) -> Option<AttributeValue> {
    fn list<T: std::str::FromStr>(value: &str) -> Option<Vec<T>> {
        value.split(',').map(|part| part.trim().parse().ok()).collect()
    }

    fn rationals(value: &str, min: i64, max: i64) -> Option<Vec<Rational>> {
        value
            .split(',')
            .map(|part| {
                let (n, d) = part.split_once('/')?;
                let n = n.trim().parse::<i64>().ok()?;
                let d = d.trim().parse::<i64>().ok()?;
                let in_range = |x: i64| (min..=max).contains(&x);
                (in_range(n) && in_range(d)).then(|| Rational::new(n, d))
            })
            .collect()
    }

    let parsed = match field_type {
        FieldType::Ascii => AttributeValue::Ascii(value.to_string()),
        FieldType::Byte => {
            AttributeValue::Byte(list::<u8>(value).unwrap_or_else(|| value.as_bytes().to_vec()))
        }
        FieldType::Undefined => {
            let mut bytes = value.as_bytes().to_vec();
            bytes.push(0);
            AttributeValue::Undefined(bytes)
        }
        FieldType::Short => AttributeValue::Short(list(value)?),
        FieldType::Long => AttributeValue::Long(list(value)?),
        FieldType::SByte => AttributeValue::SByte(list(value)?),
        FieldType::SShort => AttributeValue::SShort(list(value)?),
        FieldType::SLong => AttributeValue::SLong(list(value)?),
        FieldType::Float => AttributeValue::Float(list(value)?),
        FieldType::Double => AttributeValue::Double(list(value)?),
        FieldType::Rational => AttributeValue::Rational(rationals(value, 0, u32::MAX as i64)?),
        FieldType::SRational => AttributeValue::SRational(rationals(
            value,
            i32::MIN as i64,
            i32::MAX as i64,
        )?),
    };

    Some(parsed)
}

/// Coerce a string into the value a tag descriptor stores.
pub fn coerce_for_tag(descriptor: &TagDescriptor, value: &str) -> Result<AttributeValue, ValueError> {
    let field_type =
        select_format(descriptor, guess_format(value)).ok_or_else(|| ValueError::FormatMismatch {
            tag: descriptor.name.to_string(),
            value: value.to_string(),
        })?;

    parse_value(field_type, value).ok_or_else(|| ValueError::BadValueString {
        tag: descriptor.name.to_string(),
        value: value.to_string(),
    })
}

// =============================================================================
// Legacy Conversions
// =============================================================================

/// Whether the tag is exchanged in its legacy string form.
pub fn is_legacy_tag(name: &str) -> bool {
    name == names::GPS_TIMESTAMP || LEGACY_DECIMAL_TAGS.contains(&name)
}

/// Rewrite a legacy string into the rational form stored in the file.
///
/// Non-legacy tags pass through unchanged.
pub fn legacy_to_stored(name: &str, value: &str) -> Result<String, ValueError> {
    let bad_value = || ValueError::BadValueString {
        tag: name.to_string(),
        value: value.to_string(),
    };

    if name == names::GPS_TIMESTAMP {
        let captures = GPS_TIMESTAMP_PATTERN
            .as_ref()
            .and_then(|pattern| pattern.captures(value))
            .ok_or_else(bad_value)?;
        let field = |i: usize| -> Result<u32, ValueError> {
            captures
                .get(i)
                .and_then(|m| m.as_str().parse().ok())
                .ok_or_else(bad_value)
        };
        return Ok(format!("{}/1,{}/1,{}/1", field(1)?, field(2)?, field(3)?));
    }

    if LEGACY_DECIMAL_TAGS.contains(&name) {
        let decimal = value.trim().parse::<f64>().map_err(|_| bad_value())?;
        if !decimal.is_finite() {
            return Err(bad_value());
        }
        let scaled = (decimal * LEGACY_DENOMINATOR as f64).round() as i64;
        return Ok(format!("{scaled}/{LEGACY_DENOMINATOR}"));
    }

    Ok(value.to_string())
}

/// Render a stored value the way callers read it back.
///
/// Legacy tags render as a decimal or `HH:MM:SS`; a legacy value that
/// cannot be rendered that way yields `None`.
pub fn display_value(name: &str, value: &AttributeValue) -> Option<String> {
    if name == names::GPS_TIMESTAMP {
        return match value.as_rationals()? {
            [h, m, s] => Some(format!(
                "{:02}:{:02}:{:02}",
                h.to_f64() as i64,
                m.to_f64() as i64,
                s.to_f64() as i64
            )),
            _ => None,
        };
    }

    if LEGACY_DECIMAL_TAGS.contains(&name) {
        return value.as_f64().map(format_decimal);
    }

    Some(value.to_display_string())
}

// =============================================================================
// Tests
// =============================================================================
