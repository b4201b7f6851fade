//! Field value validation and sanitization.
use std::ops::RangeInclusive;

use chrono::{Datelike, NaiveDate};
use unicode_normalization::{char::is_combining_mark, UnicodeNormalization};

use super::registry::{DateFormat, FieldSchema, FieldType};

/// Years accepted in date fields.
pub const YEAR_RANGE: RangeInclusive<i32> = 1800..=2200;

/// ASCII character class.
pub trait CharClass {
    fn contains(c: u8) -> bool;

    fn all(bytes: &[u8]) -> bool {
        bytes.iter().copied().all(Self::contains)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Numeric;

impl CharClass for Numeric {
    fn contains(c: u8) -> bool {
        c.is_ascii_digit()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct UpperAlphaNumeric;

impl CharClass for UpperAlphaNumeric {
    fn contains(c: u8) -> bool {
        c.is_ascii_uppercase() || c.is_ascii_digit()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Printable;

impl CharClass for Printable {
    fn contains(c: u8) -> bool {
        (0x20..0x7f).contains(&c)
    }
}

/// Reason a value was rejected.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum InvalidReason {
    #[error("value is required")]
    Missing,

    #[error("not one of the allowed values")]
    NotAnOption,

    #[error("{len} characters, at most {max} allowed")]
    TooLong { max: usize, len: usize },

    #[error("not a valid {0} date")]
    InvalidDate(DateFormat),

    #[error("not a 5 digit or ZIP+4 postal code")]
    InvalidZip,

    #[error("not a single uppercase letter or digit")]
    InvalidChar,
}

/// Checks a single value against its schema.
pub fn validate(schema: &FieldSchema, value: &str) -> bool {
    check(schema, value).is_ok()
}

/// Same as [`validate`], with the reason of the rejection.
///
/// The value is measured as given. The encoder runs this on sanitized values
/// after checking the raw length itself.
pub fn check(schema: &FieldSchema, value: &str) -> Result<(), InvalidReason> {
    if value.is_empty() {
        return if schema.required {
            Err(InvalidReason::Missing)
        } else {
            Ok(())
        };
    }

    if let Some(options) = schema.options {
        if !options.iter().any(|o| o.value == value) {
            return Err(InvalidReason::NotAnOption);
        }
    }

    if let Some(max) = schema.max_len {
        let len = value.chars().count();
        if len > max {
            return Err(InvalidReason::TooLong { max, len });
        }
    }

    match schema.ty {
        FieldType::Date => parse_date(value, schema.date_format)
            .map(|_| ())
            .ok_or(InvalidReason::InvalidDate(schema.date_format)),
        FieldType::Zip => {
            if is_zip(value.as_bytes()) {
                Ok(())
            } else {
                Err(InvalidReason::InvalidZip)
            }
        }
        FieldType::Char => {
            if schema.options.is_some()
                || (value.len() == 1 && UpperAlphaNumeric::all(value.as_bytes()))
            {
                Ok(())
            } else {
                Err(InvalidReason::InvalidChar)
            }
        }
        FieldType::String => Ok(()),
    }
}

/// Parses an 8 digit date in the given layout.
pub fn parse_date(value: &str, format: DateFormat) -> Option<NaiveDate> {
    let bytes = value.as_bytes();
    if bytes.len() != 8 || !Numeric::all(bytes) {
        return None;
    }

    let (year, month, day) = match format {
        DateFormat::MonthDayYear => (&value[4..8], &value[0..2], &value[2..4]),
        DateFormat::YearMonthDay => (&value[0..4], &value[4..6], &value[6..8]),
    };

    let year: i32 = year.parse().ok()?;
    let month: u32 = month.parse().ok()?;
    let day: u32 = day.parse().ok()?;

    if !YEAR_RANGE.contains(&year) {
        return None;
    }

    NaiveDate::from_ymd_opt(year, month, day)
        .filter(|d| d.year() == year && d.month() == month && d.day() == day)
}

fn is_zip(bytes: &[u8]) -> bool {
    match bytes.len() {
        5 => Numeric::all(bytes),
        10 => Numeric::all(&bytes[..5]) && bytes[5] == b'-' && Numeric::all(&bytes[6..]),
        _ => false,
    }
}

/// Reduces a raw value to printable ASCII.
///
/// Control characters are removed, accented letters lose their accents and
/// any other non-ASCII character is dropped. Every type but dates is
/// uppercased.
pub fn sanitize(ty: FieldType, raw: &str) -> String {
    let ascii = raw
        .chars()
        .filter(|c| !c.is_ascii_control())
        .nfd()
        .filter(|c| !is_combining_mark(*c))
        .filter(|c| c.is_ascii() && Printable::contains(*c as u8));

    match ty {
        FieldType::Date => ascii.collect(),
        FieldType::String | FieldType::Zip | FieldType::Char => {
            ascii.map(|c| c.to_ascii_uppercase()).collect()
        }
    }
}
