//! Event record.

use crate::model::collaborator::Collaborator;
use crate::model::contract::Contract;
use crate::model::record::{FieldEdit, RecordError, Related};
use crate::model::value::FieldValue;
use crate::model::RecordId;
use chrono::NaiveDateTime;

/// Scheduled event realizing a signed contract.
#[derive(Debug, Clone, PartialEq)]
pub struct Event {
    pub id: Option<RecordId>,
    pub contract_id: RecordId,
    /// Assigned support collaborator, if any.
    pub support_id: Option<RecordId>,
    pub title: String,
    pub start_date: NaiveDateTime,
    /// Not before `start_date` once validated.
    pub end_date: NaiveDateTime,
    pub location: Option<String>,
    pub participants: i64,
    pub notes: Option<String>,
    pub archived: bool,
    pub related: Related,
}

impl Event {
    pub fn new(
        contract_id: RecordId,
        title: impl Into<String>,
        start_date: NaiveDateTime,
        end_date: NaiveDateTime,
    ) -> Self {
        Self {
            id: None,
            contract_id,
            support_id: None,
            title: title.into(),
            start_date,
            end_date,
            location: None,
            participants: 0,
            notes: None,
            archived: false,
            related: Related::new(),
        }
    }

    pub fn contract(&self) -> Option<&Contract> {
        self.related
            .get("contract")
            .and_then(|record| record.as_contract())
    }

    pub fn support(&self) -> Option<&Collaborator> {
        self.related
            .get("support")
            .and_then(|record| record.as_collaborator())
    }

    pub(crate) fn scalar(&self, name: &str) -> Option<FieldValue> {
        let value = match name {
            "contract_id" => self.contract_id.into(),
            "support_id" => self.support_id.into(),
            "title" => self.title.as_str().into(),
            "start_date" => self.start_date.into(),
            "end_date" => self.end_date.into(),
            "location" => self.location.clone().into(),
            "participants" => self.participants.into(),
            "notes" => self.notes.clone().into(),
            "archived" => self.archived.into(),
            _ => return None,
        };
        Some(value)
    }

    pub(crate) fn set_field(&mut self, edit: &mut FieldEdit<'_>) -> Result<(), RecordError> {
        match edit.name {
            "contract_id" => self.contract_id = edit.integer()?,
            "support_id" => self.support_id = edit.optional_integer()?,
            "title" => self.title = edit.text()?,
            "start_date" => self.start_date = edit.datetime()?,
            "end_date" => self.end_date = edit.datetime()?,
            "location" => self.location = edit.optional_text()?,
            "participants" => self.participants = edit.integer()?,
            "notes" => self.notes = edit.optional_text()?,
            "archived" => self.archived = edit.boolean()?,
            _ => return Err(edit.unknown()),
        }
        Ok(())
    }
}
