//! Dotted attribute path resolution over loaded records.
//!
//! # Invariants
//! - Resolution never fails: an absent hop or unknown name yields the
//!   empty-string sentinel, which sorts before every other value.
//! - A path ending on a loaded relation yields that record's id.

use crate::model::record::{Attr, Record};
use crate::model::value::FieldValue;

/// Follows `path` (e.g. `"contract.client.company_name"`) from `root`.
pub fn resolve(root: &Record, path: &str) -> FieldValue {
    let mut current = root;
    let mut segments = path.split('.').peekable();

    while let Some(segment) = segments.next() {
        let is_last = segments.peek().is_none();
        match current.attribute(segment) {
            Some(Attr::Related(next)) if is_last => {
                return next.id().map_or_else(FieldValue::empty_sentinel, FieldValue::Integer);
            }
            Some(Attr::Related(next)) => current = next,
            Some(Attr::Value(value)) if is_last && !value.is_null() => return value,
            _ => return FieldValue::empty_sentinel(),
        }
    }

    FieldValue::empty_sentinel()
}
