use super::common::{
    collaborator_role, free_text, parse_datetime, parse_id, required_text, yes_word,
};
use super::{Checked, Validator};
use crate::config::QueryOptions;
use crate::model::value::FieldValue;
use crate::model::{Actor, EntityKind, Role};
use crate::repo::{EntityRepository, Filters, RepoError, SqliteEntityRepository};
use rusqlite::Connection;

pub(super) const VALIDATORS: &[(&str, Validator)] = &[
    ("contract_id", Validator::SessionUser(validate_contract_id)),
    ("title", Validator::Value(validate_title)),
    ("start_date", Validator::Value(validate_start_date)),
    (
        "end_date",
        Validator::Peer {
            peer: "start_date",
            check: validate_end_date,
        },
    ),
    ("location", Validator::Value(free_text)),
    ("participants", Validator::Value(validate_participants)),
    ("notes", Validator::Value(free_text)),
    ("support_id", Validator::Session(validate_support_id)),
    ("archived", Validator::Value(yes_word)),
];

/// The contract must be active, signed, free of events and, unless the user
/// is an administrator, belong to one of the user's clients.
fn validate_contract_id(conn: &Connection, user: &Actor, value: &FieldValue) -> Checked {
    let id = parse_id(value).ok_or_else(|| "Missing contract id.".to_string())?;
    let repo = SqliteEntityRepository::new(conn);
    let storage_error = |err: RepoError| format!("Storage error: {err}");

    let mut contract = repo
        .filter(
            EntityKind::Contract,
            QueryOptions::active_only(),
            &Filters::new().eq("id", id),
        )
        .map_err(storage_error)?
        .into_iter()
        .next()
        .ok_or_else(|| format!("Contract ID {id} not found."))?;

    if repo.load_relation(&mut contract, "event").map_err(storage_error)? {
        return Err("This contract already has a linked event.".to_string());
    }
    if contract.scalar("signed").and_then(|flag| flag.as_bool()) != Some(true) {
        return Err("The contract must be signed before assigning to an event.".to_string());
    }

    repo.load_relation(&mut contract, "client")
        .map_err(storage_error)?;
    let owner = contract
        .as_contract()
        .and_then(|contract| contract.client())
        .and_then(|client| client.id_commercial);
    if owner != Some(user.id) && !user.role.is_admin() {
        return Err(
            "You are not allowed to create events for another commercial's clients.".to_string(),
        );
    }

    Ok(FieldValue::Integer(id))
}

fn validate_title(value: &FieldValue) -> Checked {
    required_text(value, "Title is required.").map(FieldValue::Text)
}

fn validate_start_date(value: &FieldValue) -> Checked {
    parse_datetime(value).map(FieldValue::DateTime)
}

/// End timestamp, never before the already-entered start.
fn validate_end_date(start_date: &FieldValue, value: &FieldValue) -> Checked {
    let end = parse_datetime(value)?;
    if let Ok(start) = parse_datetime(start_date) {
        if start > end {
            return Err("The start date cannot be after the end date.".to_string());
        }
    }
    Ok(FieldValue::DateTime(end))
}

fn validate_participants(value: &FieldValue) -> Checked {
    let participants = value
        .as_i64()
        .ok_or_else(|| "Participants must be an integer.".to_string())?;
    if participants < 0 {
        return Err("Participants must be a positive integer.".to_string());
    }
    Ok(FieldValue::Integer(participants))
}

/// Optional; when set it must name a support collaborator.
fn validate_support_id(conn: &Connection, value: &FieldValue) -> Checked {
    if value.is_blank() {
        return Ok(FieldValue::Null);
    }
    let id = parse_id(value).ok_or_else(|| format!("Invalid collaborator id: {value}"))?;
    match collaborator_role(conn, id)? {
        None => Err(format!("Collaborator ID {id} not found.")),
        Some(role) if role != Role::Support.as_str() => {
            Err("The selected collaborator is not in the 'support' role.".to_string())
        }
        Some(_) => Ok(FieldValue::Integer(id)),
    }
}
