//! Language-neutral attribute values.
//!
//! `FieldValue` is what filters compare against, what validators consume
//! and produce, and what the path resolver returns as a sort key.

use chrono::{NaiveDate, NaiveDateTime};
use std::cmp::Ordering;
use std::fmt::{Display, Formatter};

/// Storage format for calendar dates.
pub const DATE_STORAGE_FORMAT: &str = "%Y-%m-%d";
/// Storage format for timestamps (minute precision is what users enter).
pub const DATETIME_STORAGE_FORMAT: &str = "%Y-%m-%d %H:%M:%S";
/// Display/input format for calendar dates.
pub const DATE_DISPLAY_FORMAT: &str = "%d-%m-%Y";
/// Display/input format for timestamps.
pub const DATETIME_DISPLAY_FORMAT: &str = "%d-%m-%Y %H:%M";

/// One scalar attribute value.
#[derive(Debug, Clone, PartialEq)]
pub enum FieldValue {
    Null,
    Bool(bool),
    Integer(i64),
    Real(f64),
    Text(String),
    Date(NaiveDate),
    DateTime(NaiveDateTime),
}

impl FieldValue {
    /// Value returned by path resolution when any hop is absent.
    pub fn empty_sentinel() -> Self {
        Self::Text(String::new())
    }

    pub fn is_null(&self) -> bool {
        matches!(self, Self::Null)
    }

    /// `Null` or whitespace-only text.
    pub fn is_blank(&self) -> bool {
        match self {
            Self::Null => true,
            Self::Text(text) => text.trim().is_empty(),
            _ => false,
        }
    }

    pub fn as_text(&self) -> Option<&str> {
        match self {
            Self::Text(text) => Some(text.as_str()),
            _ => None,
        }
    }

    /// Integer view; numeric text is parsed after trimming.
    pub fn as_i64(&self) -> Option<i64> {
        match self {
            Self::Integer(value) => Some(*value),
            Self::Text(text) => text.trim().parse().ok(),
            _ => None,
        }
    }

    /// Numeric view; integers widen and numeric text is parsed.
    pub fn as_f64(&self) -> Option<f64> {
        match self {
            Self::Real(value) => Some(*value),
            Self::Integer(value) => Some(*value as f64),
            Self::Text(text) => text.trim().parse().ok(),
            _ => None,
        }
    }

    pub fn as_bool(&self) -> Option<bool> {
        match self {
            Self::Bool(value) => Some(*value),
            _ => None,
        }
    }

    /// Total order used when sorting by resolved paths.
    ///
    /// `Null` and the empty-string sentinel are the smallest values. Numbers
    /// compare numerically across `Integer`/`Real`. Mismatched kinds fall
    /// back to a fixed kind rank so sorting never fails.
    pub fn sort_cmp(&self, other: &Self) -> Ordering {
        match (self, other) {
            (Self::Integer(a), Self::Integer(b)) => a.cmp(b),
            (Self::Bool(a), Self::Bool(b)) => a.cmp(b),
            (Self::Text(a), Self::Text(b)) => a.cmp(b),
            (Self::Date(a), Self::Date(b)) => a.cmp(b),
            (Self::DateTime(a), Self::DateTime(b)) => a.cmp(b),
            (a, b) => match (a.numeric(), b.numeric()) {
                (Some(x), Some(y)) => x.total_cmp(&y),
                _ => a.sort_rank().cmp(&b.sort_rank()),
            },
        }
    }

    fn numeric(&self) -> Option<f64> {
        match self {
            Self::Integer(value) => Some(*value as f64),
            Self::Real(value) => Some(*value),
            _ => None,
        }
    }

    fn sort_rank(&self) -> u8 {
        match self {
            Self::Null => 0,
            Self::Text(text) if text.is_empty() => 0,
            Self::Bool(_) => 1,
            Self::Integer(_) | Self::Real(_) => 2,
            Self::Date(_) => 3,
            Self::DateTime(_) => 4,
            Self::Text(_) => 5,
        }
    }
}

impl Display for FieldValue {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Null => Ok(()),
            Self::Bool(true) => f.write_str("yes"),
            Self::Bool(false) => f.write_str("no"),
            Self::Integer(value) => write!(f, "{value}"),
            Self::Real(value) => write!(f, "{value}"),
            Self::Text(text) => f.write_str(text),
            Self::Date(date) => write!(f, "{}", date.format(DATE_DISPLAY_FORMAT)),
            Self::DateTime(at) => write!(f, "{}", at.format(DATETIME_DISPLAY_FORMAT)),
        }
    }
}

impl From<&str> for FieldValue {
    fn from(value: &str) -> Self {
        Self::Text(value.to_string())
    }
}

impl From<String> for FieldValue {
    fn from(value: String) -> Self {
        Self::Text(value)
    }
}

impl From<i64> for FieldValue {
    fn from(value: i64) -> Self {
        Self::Integer(value)
    }
}

impl From<f64> for FieldValue {
    fn from(value: f64) -> Self {
        Self::Real(value)
    }
}

impl From<bool> for FieldValue {
    fn from(value: bool) -> Self {
        Self::Bool(value)
    }
}

impl From<NaiveDate> for FieldValue {
    fn from(value: NaiveDate) -> Self {
        Self::Date(value)
    }
}

impl From<NaiveDateTime> for FieldValue {
    fn from(value: NaiveDateTime) -> Self {
        Self::DateTime(value)
    }
}

impl<T: Into<FieldValue>> From<Option<T>> for FieldValue {
    fn from(value: Option<T>) -> Self {
        value.map_or(Self::Null, Into::into)
    }
}
