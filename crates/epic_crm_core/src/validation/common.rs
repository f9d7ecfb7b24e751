//! Parsers shared by the per-kind validators.

use crate::model::value::FieldValue;
use crate::model::RecordId;
use chrono::{NaiveDate, NaiveDateTime};
use rusqlite::{Connection, OptionalExtension};

const DATE_INPUT_FORMAT: &str = "%d-%m-%Y";
const DATETIME_INPUT_FORMAT: &str = "%d-%m-%Y %H:%M";
const YES_WORDS: [&str; 5] = ["y", "yes", "true", "o", "oui"];

/// `y`, `yes`, `true`, `o`, `oui` (any case) are true; anything else is false.
pub(crate) fn yes_word(value: &FieldValue) -> Result<FieldValue, String> {
    let flag = match value {
        FieldValue::Bool(flag) => *flag,
        FieldValue::Text(text) => YES_WORDS.contains(&text.trim().to_lowercase().as_str()),
        _ => false,
    };
    Ok(FieldValue::Bool(flag))
}

/// Non-blank text, returned unchanged.
pub(crate) fn required_text(value: &FieldValue, message: &str) -> Result<String, String> {
    match value {
        FieldValue::Text(text) if !text.trim().is_empty() => Ok(text.clone()),
        _ => Err(message.to_string()),
    }
}

/// Any value rendered as text; `Null` stays `Null`.
pub(crate) fn free_text(value: &FieldValue) -> Result<FieldValue, String> {
    Ok(match value {
        FieldValue::Null => FieldValue::Null,
        other => FieldValue::Text(other.to_string()),
    })
}

/// `DD-MM-YYYY` (or `DD/MM/YYYY`) text, or an already-parsed date.
pub(crate) fn parse_date(value: &FieldValue) -> Result<NaiveDate, String> {
    match value {
        FieldValue::Date(date) => Ok(*date),
        FieldValue::Text(text) => {
            let normalized = text.replace('/', "-");
            NaiveDate::parse_from_str(normalized.trim(), DATE_INPUT_FORMAT).map_err(|_| {
                format!("Invalid date or wrong format (expected DD-MM-YYYY): {text}")
            })
        }
        _ => Err("A date is required (expected DD-MM-YYYY).".to_string()),
    }
}

/// `DD-MM-YYYY HH:MM` text, or an already-parsed timestamp.
pub(crate) fn parse_datetime(value: &FieldValue) -> Result<NaiveDateTime, String> {
    match value {
        FieldValue::DateTime(at) => Ok(*at),
        FieldValue::Text(text) => {
            let normalized = text.replace('/', "-");
            NaiveDateTime::parse_from_str(normalized.trim(), DATETIME_INPUT_FORMAT).map_err(|_| {
                format!("Invalid date or wrong format (expected DD-MM-YYYY HH:MM): {text}")
            })
        }
        _ => Err("A date and time is required (expected DD-MM-YYYY HH:MM).".to_string()),
    }
}

/// Record id from an integer or numeric text; `None` for blank or zero.
pub(crate) fn parse_id(value: &FieldValue) -> Option<RecordId> {
    value.as_i64().filter(|id| *id != 0)
}

/// Role of collaborator `id`, regardless of archive state.
pub(crate) fn collaborator_role(conn: &Connection, id: RecordId) -> Result<Option<String>, String> {
    conn.query_row(
        "SELECT role FROM collaborators WHERE id = ?1;",
        [id],
        |row| row.get::<_, String>(0),
    )
    .optional()
    .map_err(|err| format!("Storage error: {err}"))
}

/// Whether `column = value` already exists in `table`.
pub(crate) fn value_taken(
    conn: &Connection,
    table: &str,
    column: &str,
    value: &str,
) -> Result<bool, String> {
    conn.query_row(
        &format!("SELECT EXISTS (SELECT 1 FROM {table} WHERE {column} = ?1);"),
        [value],
        |row| row.get::<_, bool>(0),
    )
    .map_err(|err| format!("Storage error: {err}"))
}

#[cfg(test)]
mod tests {
    use super::{parse_date, parse_datetime, parse_id, yes_word};
    use crate::model::value::FieldValue;
    use chrono::NaiveDate;

    #[test]
    fn yes_words_are_case_insensitive() {
        for word in ["Y", "yes", "TRUE", "o", "Oui"] {
            assert_eq!(yes_word(&FieldValue::from(word)), Ok(FieldValue::Bool(true)));
        }
        for word in ["no", "n", "", "1"] {
            assert_eq!(yes_word(&FieldValue::from(word)), Ok(FieldValue::Bool(false)));
        }
    }

    #[test]
    fn dates_accept_slashes() {
        let expected = NaiveDate::from_ymd_opt(2025, 3, 25).expect("valid date");
        assert_eq!(parse_date(&FieldValue::from("25/03/2025")), Ok(expected));
        assert_eq!(parse_date(&FieldValue::from(" 25-03-2025 ")), Ok(expected));
        assert!(parse_date(&FieldValue::from("2025-03-25")).is_err());
    }

    #[test]
    fn datetimes_require_minutes() {
        assert!(parse_datetime(&FieldValue::from("08-06-2025 09:00")).is_ok());
        assert!(parse_datetime(&FieldValue::from("08-06-2025")).is_err());
    }

    #[test]
    fn ids_parse_from_text() {
        assert_eq!(parse_id(&FieldValue::from("12")), Some(12));
        assert_eq!(parse_id(&FieldValue::from("0")), None);
        assert_eq!(parse_id(&FieldValue::Null), None);
    }
}
