//! Row mapping between SQLite and record kinds.

use crate::model::client::Client;
use crate::model::collaborator::Collaborator;
use crate::model::contract::Contract;
use crate::model::event::Event;
use crate::model::record::{Record, Related};
use crate::model::value::{FieldValue, DATETIME_STORAGE_FORMAT, DATE_STORAGE_FORMAT};
use crate::model::{EntityKind, Role};
use crate::repo::{RepoError, RepoResult};
use chrono::{NaiveDate, NaiveDateTime};
use rusqlite::types::Value;
use rusqlite::Row;

/// `t0.col AS col, ...` for every column of `kind`.
pub(crate) fn select_list(kind: EntityKind, alias: &str) -> String {
    kind.table()
        .columns
        .iter()
        .map(|column| format!("{alias}.{column} AS {column}"))
        .collect::<Vec<_>>()
        .join(", ")
}

pub(crate) fn parse_row(kind: EntityKind, row: &Row<'_>) -> RepoResult<Record> {
    let record = match kind {
        EntityKind::Collaborator => {
            let role_text: String = row.get("role")?;
            let role = Role::parse(&role_text).ok_or_else(|| {
                RepoError::InvalidData(format!(
                    "invalid role `{role_text}` in collaborators.role"
                ))
            })?;
            Collaborator {
                id: Some(row.get("id")?),
                full_name: row.get("full_name")?,
                password: row.get("password")?,
                email: row.get("email")?,
                role,
                archived: parse_flag(row, "collaborators", "archived")?,
                related: Related::new(),
            }
            .into()
        }
        EntityKind::Client => Client {
            id: Some(row.get("id")?),
            full_name: row.get("full_name")?,
            email: row.get("email")?,
            phone: row.get("phone")?,
            company_name: row.get("company_name")?,
            created_date: parse_optional_date(row, "clients", "created_date")?,
            last_contact_date: parse_optional_date(row, "clients", "last_contact_date")?,
            id_commercial: row.get("id_commercial")?,
            archived: parse_flag(row, "clients", "archived")?,
            related: Related::new(),
        }
        .into(),
        EntityKind::Contract => Contract {
            id: Some(row.get("id")?),
            client_id: row.get("client_id")?,
            total_amount: row.get("total_amount")?,
            amount_due: row.get("amount_due")?,
            created_date: parse_optional_date(row, "contracts", "created_date")?,
            signed: parse_flag(row, "contracts", "signed")?,
            archived: parse_flag(row, "contracts", "archived")?,
            related: Related::new(),
        }
        .into(),
        EntityKind::Event => Event {
            id: Some(row.get("id")?),
            contract_id: row.get("contract_id")?,
            support_id: row.get("support_id")?,
            title: row.get("title")?,
            start_date: parse_datetime(row, "events", "start_date")?,
            end_date: parse_datetime(row, "events", "end_date")?,
            location: row.get("location")?,
            participants: row.get("participants")?,
            notes: row.get("notes")?,
            archived: parse_flag(row, "events", "archived")?,
            related: Related::new(),
        }
        .into(),
    };
    Ok(record)
}

/// Converts a field value to its bound SQL form.
pub(crate) fn to_sql_value(value: &FieldValue) -> Value {
    match value {
        FieldValue::Null => Value::Null,
        FieldValue::Bool(flag) => Value::Integer(bool_to_int(*flag)),
        FieldValue::Integer(number) => Value::Integer(*number),
        FieldValue::Real(number) => Value::Real(*number),
        FieldValue::Text(text) => Value::Text(text.clone()),
        FieldValue::Date(date) => Value::Text(date.format(DATE_STORAGE_FORMAT).to_string()),
        FieldValue::DateTime(at) => Value::Text(at.format(DATETIME_STORAGE_FORMAT).to_string()),
    }
}

fn parse_flag(row: &Row<'_>, table: &str, column: &str) -> RepoResult<bool> {
    match row.get::<_, i64>(column)? {
        0 => Ok(false),
        1 => Ok(true),
        other => Err(RepoError::InvalidData(format!(
            "invalid flag value `{other}` in {table}.{column}"
        ))),
    }
}

fn parse_optional_date(row: &Row<'_>, table: &str, column: &str) -> RepoResult<Option<NaiveDate>> {
    match row.get::<_, Option<String>>(column)? {
        Some(text) => NaiveDate::parse_from_str(&text, DATE_STORAGE_FORMAT)
            .map(Some)
            .map_err(|_| {
                RepoError::InvalidData(format!("invalid date `{text}` in {table}.{column}"))
            }),
        None => Ok(None),
    }
}

fn parse_datetime(row: &Row<'_>, table: &str, column: &str) -> RepoResult<NaiveDateTime> {
    let text: String = row.get(column)?;
    NaiveDateTime::parse_from_str(&text, DATETIME_STORAGE_FORMAT).map_err(|_| {
        RepoError::InvalidData(format!("invalid timestamp `{text}` in {table}.{column}"))
    })
}

fn bool_to_int(value: bool) -> i64 {
    if value {
        1
    } else {
        0
    }
}
