use super::common::{parse_id, yes_word};
use super::{Checked, Validator};
use crate::model::value::FieldValue;
use rusqlite::{Connection, OptionalExtension};

pub(super) const VALIDATORS: &[(&str, Validator)] = &[
    ("client_id", Validator::Session(validate_client_id)),
    ("total_amount", Validator::Value(validate_total_amount)),
    (
        "amount_due",
        Validator::Peer {
            peer: "total_amount",
            check: validate_amount_due,
        },
    ),
    ("signed", Validator::Value(yes_word)),
    ("archived", Validator::Value(yes_word)),
];

fn validate_client_id(conn: &Connection, value: &FieldValue) -> Checked {
    let id = parse_id(value).ok_or_else(|| "Missing client_id.".to_string())?;
    let found = conn
        .query_row("SELECT id FROM clients WHERE id = ?1;", [id], |row| {
            row.get::<_, i64>(0)
        })
        .optional()
        .map_err(|err| format!("Storage error: {err}"))?;
    match found {
        Some(id) => Ok(FieldValue::Integer(id)),
        None => Err(format!("No client found with id={id}.")),
    }
}

fn validate_total_amount(value: &FieldValue) -> Checked {
    let total = value
        .as_f64()
        .filter(|total| total.is_finite())
        .ok_or_else(|| "Total amount must be a valid number.".to_string())?;
    if total < 0.0 {
        return Err("Amount must be positive.".to_string());
    }
    Ok(FieldValue::Real(total))
}

/// Due amount, bounded by the already-entered total.
fn validate_amount_due(total_amount: &FieldValue, value: &FieldValue) -> Checked {
    let finite = |amount: &FieldValue| amount.as_f64().filter(|amount| amount.is_finite());
    let (Some(total), Some(due)) = (finite(total_amount), finite(value)) else {
        return Err("Amounts must be valid numbers.".to_string());
    };
    if due < 0.0 {
        return Err("Amounts must be positive.".to_string());
    }
    if due > total {
        return Err("Amount due exceeds total amount.".to_string());
    }
    Ok(FieldValue::Real(due))
}

#[cfg(test)]
mod tests {
    use super::{validate_amount_due, validate_total_amount};
    use crate::model::value::FieldValue;

    #[test]
    fn total_must_be_non_negative_number() {
        assert_eq!(
            validate_total_amount(&FieldValue::from("1000")),
            Ok(FieldValue::Real(1000.0))
        );
        assert!(validate_total_amount(&FieldValue::from("-1")).is_err());
        assert!(validate_total_amount(&FieldValue::from("lots")).is_err());
    }

    #[test]
    fn non_finite_amounts_are_rejected() {
        for raw in ["NaN", "inf", "-inf"] {
            let err = validate_total_amount(&FieldValue::from(raw)).expect_err("not finite");
            assert!(err.contains("valid number"), "{raw}: {err}");
            let total = FieldValue::Real(1000.0);
            assert!(validate_amount_due(&total, &FieldValue::from(raw)).is_err());
            assert!(validate_amount_due(&FieldValue::from(raw), &FieldValue::from("10")).is_err());
        }
    }

    #[test]
    fn due_cannot_exceed_total() {
        let err = validate_amount_due(&FieldValue::Real(1000.0), &FieldValue::from("1200"))
            .expect_err("due above total");
        assert!(err.contains("exceeds total"));
        assert_eq!(
            validate_amount_due(&FieldValue::Real(1000.0), &FieldValue::from("1000")),
            Ok(FieldValue::Real(1000.0))
        );
        assert!(validate_amount_due(&FieldValue::Null, &FieldValue::from("10")).is_err());
    }
}
