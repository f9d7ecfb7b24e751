//! Contract record.

use crate::model::client::Client;
use crate::model::event::Event;
use crate::model::record::{FieldEdit, RecordError, Related};
use crate::model::value::FieldValue;
use crate::model::RecordId;
use chrono::{Local, NaiveDate};

/// Service contract for one client, optionally realized by one event.
#[derive(Debug, Clone, PartialEq)]
pub struct Contract {
    pub id: Option<RecordId>,
    pub client_id: RecordId,
    pub total_amount: f64,
    /// Never above `total_amount` once validated.
    pub amount_due: f64,
    pub created_date: Option<NaiveDate>,
    pub signed: bool,
    pub archived: bool,
    pub related: Related,
}

impl Contract {
    /// Creates an unsaved contract dated today.
    pub fn new(client_id: RecordId, total_amount: f64, amount_due: f64, signed: bool) -> Self {
        Self {
            id: None,
            client_id,
            total_amount,
            amount_due,
            created_date: Some(Local::now().date_naive()),
            signed,
            archived: false,
            related: Related::new(),
        }
    }

    pub fn client(&self) -> Option<&Client> {
        self.related.get("client").and_then(|record| record.as_client())
    }

    /// Linked event, when loaded.
    pub fn event(&self) -> Option<&Event> {
        self.related.get("event").and_then(|record| record.as_event())
    }

    pub(crate) fn scalar(&self, name: &str) -> Option<FieldValue> {
        let value = match name {
            "client_id" => self.client_id.into(),
            "total_amount" => self.total_amount.into(),
            "amount_due" => self.amount_due.into(),
            "created_date" => self.created_date.into(),
            "signed" => self.signed.into(),
            "archived" => self.archived.into(),
            _ => return None,
        };
        Some(value)
    }

    pub(crate) fn set_field(&mut self, edit: &mut FieldEdit<'_>) -> Result<(), RecordError> {
        match edit.name {
            "client_id" => self.client_id = edit.integer()?,
            "total_amount" => self.total_amount = edit.real()?,
            "amount_due" => self.amount_due = edit.real()?,
            "created_date" => self.created_date = edit.optional_date()?,
            "signed" => self.signed = edit.boolean()?,
            "archived" => self.archived = edit.boolean()?,
            _ => return Err(edit.unknown()),
        }
        Ok(())
    }
}
