//! Record construction from validated form values.

use crate::model::client::Client;
use crate::model::collaborator::Collaborator;
use crate::model::contract::Contract;
use crate::model::event::Event;
use crate::model::record::Record;
use crate::model::{EntityKind, Role};
use crate::service::{ServiceError, ServiceResult};
use crate::validation::FormData;
use chrono::NaiveDateTime;

/// Fields a new record of `kind` cannot be created without.
pub fn mandatory_fields(kind: EntityKind) -> &'static [&'static str] {
    match kind {
        EntityKind::Collaborator => &["full_name", "email", "role", "password"],
        EntityKind::Client => &["full_name", "email", "id_commercial"],
        EntityKind::Contract => &["client_id", "total_amount", "amount_due", "signed"],
        EntityKind::Event => &[
            "contract_id",
            "title",
            "start_date",
            "end_date",
            "location",
            "participants",
        ],
    }
}

/// Builds an unsaved record of `kind` from validated values.
///
/// Keys that are not persisted columns of `kind` (display paths, `id`) are
/// ignored. Dates of creation default to today.
pub fn build_record(kind: EntityKind, form: &FormData) -> ServiceResult<Record> {
    let missing: Vec<&'static str> = mandatory_fields(kind)
        .iter()
        .copied()
        .filter(|name| form.get(*name).map_or(true, |value| value.is_blank()))
        .collect();
    if !missing.is_empty() {
        return Err(ServiceError::MissingFields {
            kind,
            fields: missing,
        });
    }

    let mut record: Record = match kind {
        EntityKind::Collaborator => Collaborator::new("", "", Role::Support, "").into(),
        EntityKind::Client => Client::new("", "", None).into(),
        EntityKind::Contract => Contract::new(0, 0.0, 0.0, false).into(),
        EntityKind::Event => {
            Event::new(0, "", NaiveDateTime::default(), NaiveDateTime::default()).into()
        }
    };

    let table = kind.table();
    for (name, value) in form {
        if name != "id" && table.has_column(name) {
            record.set_field(name, value.clone())?;
        }
    }
    Ok(record)
}
