use super::common::{required_text, value_taken, yes_word};
use super::{Checked, Validator};
use crate::model::collaborator::{hash_password, MAX_PASSWORD_CHARS};
use crate::model::value::FieldValue;
use crate::model::Role;
use once_cell::sync::Lazy;
use regex::Regex;
use rusqlite::Connection;

static NAME_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^[A-Za-zÀ-ÖØ-öø-ÿ' \-]+$").expect("valid name regex"));
static EMAIL_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^[a-zA-Z0-9_.+\-]+@[a-zA-Z0-9\-]+\.[a-zA-Z0-9.\-]+$").expect("valid email regex")
});

pub(super) const VALIDATORS: &[(&str, Validator)] = &[
    ("full_name", Validator::Session(validate_full_name)),
    ("email", Validator::Session(validate_email)),
    ("role", Validator::Value(validate_role)),
    ("password", Validator::Value(validate_password)),
    ("archived", Validator::Value(yes_word)),
];

fn validate_full_name(conn: &Connection, value: &FieldValue) -> Checked {
    let full_name = required_text(value, "Full name must not be empty.")?;
    if !NAME_RE.is_match(&full_name) {
        return Err(
            "Full name must contain only letters, spaces, hyphens or apostrophes.".to_string(),
        );
    }
    if value_taken(conn, "collaborators", "full_name", &full_name)? {
        return Err("This full name is already in use.".to_string());
    }
    Ok(full_name.into())
}

fn validate_email(conn: &Connection, value: &FieldValue) -> Checked {
    let email = value.as_text().unwrap_or_default();
    if !EMAIL_RE.is_match(email) {
        return Err("Invalid email address format.".to_string());
    }
    if value_taken(conn, "collaborators", "email", email)? {
        return Err("This email address is already in use.".to_string());
    }
    Ok(email.into())
}

fn validate_role(value: &FieldValue) -> Checked {
    let text = value.as_text().unwrap_or_default();
    match Role::parse(text) {
        Some(role) => Ok(role.as_str().into()),
        None => {
            let names: Vec<&str> = Role::ALL.iter().map(|role| role.as_str()).collect();
            Err(format!(
                "Invalid role '{text}'. Must be one of: {}.",
                names.join(", ")
            ))
        }
    }
}

/// Checks the plain password and returns its hash.
fn validate_password(value: &FieldValue) -> Checked {
    let password = required_text(value, "Password must not be empty.")?;
    if password.chars().count() > MAX_PASSWORD_CHARS {
        return Err(format!(
            "Password exceeds the maximum length of {MAX_PASSWORD_CHARS} characters."
        ));
    }
    hash_password(&password)
        .map(FieldValue::Text)
        .map_err(|err| format!("Password could not be hashed: {err}"))
}
