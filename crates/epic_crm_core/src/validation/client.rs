use super::common::{collaborator_role, parse_date, parse_id, required_text, yes_word};
use super::{Checked, Validator};
use crate::model::value::FieldValue;
use crate::model::Role;
use once_cell::sync::Lazy;
use regex::Regex;
use rusqlite::Connection;

static NAME_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^[A-Za-zÀ-ÖØ-öø-ÿ\- ]+$").expect("valid name regex"));
static EMAIL_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^[^@]+@[^@]+\.[^@]+$").expect("valid email regex"));
static NATIONAL_PHONE_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^0[1-9](?:[.\-]?\d{2}){4}$").expect("valid phone regex"));
static INTERNATIONAL_PHONE_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^\+33[1-9](?:[.\-]?\d{2}){4}$").expect("valid phone regex"));

pub(super) const VALIDATORS: &[(&str, Validator)] = &[
    ("full_name", Validator::Value(validate_full_name)),
    ("email", Validator::Value(validate_email)),
    ("phone", Validator::Value(validate_phone)),
    ("company_name", Validator::Value(validate_company_name)),
    ("created_date", Validator::Value(validate_date)),
    ("last_contact_date", Validator::Value(validate_date)),
    ("id_commercial", Validator::Session(validate_id_commercial)),
    ("archived", Validator::Value(yes_word)),
];

fn validate_full_name(value: &FieldValue) -> Checked {
    let full_name = required_text(value, "Full name must not be empty.")?;
    if !NAME_RE.is_match(&full_name) {
        return Err("Full name must be alphabetical.".to_string());
    }
    Ok(full_name.into())
}

fn validate_email(value: &FieldValue) -> Checked {
    let email = value.as_text().unwrap_or_default();
    if !EMAIL_RE.is_match(email) {
        return Err(format!("Invalid email format: {email}"));
    }
    Ok(email.into())
}

/// French national (`0X XX XX XX XX`) or international (`+33X...`) number.
fn validate_phone(value: &FieldValue) -> Checked {
    let phone = value.as_text().unwrap_or_default().replace(' ', "");
    if NATIONAL_PHONE_RE.is_match(&phone) || INTERNATIONAL_PHONE_RE.is_match(&phone) {
        Ok(phone.into())
    } else {
        Err(format!("Invalid phone number: {phone}"))
    }
}

fn validate_company_name(value: &FieldValue) -> Checked {
    required_text(value, "Company name is invalid or empty.").map(FieldValue::Text)
}

fn validate_date(value: &FieldValue) -> Checked {
    parse_date(value).map(FieldValue::Date)
}

fn validate_id_commercial(conn: &Connection, value: &FieldValue) -> Checked {
    let id = parse_id(value).ok_or_else(|| "Missing commercial id.".to_string())?;
    match collaborator_role(conn, id)? {
        Some(role) if role == Role::Commercial.as_str() => Ok(FieldValue::Integer(id)),
        _ => Err(format!("No commercial found with id={id}.")),
    }
}
