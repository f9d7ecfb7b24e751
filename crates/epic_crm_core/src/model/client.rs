//! Client record.

use crate::model::collaborator::Collaborator;
use crate::model::record::{FieldEdit, RecordError, Related};
use crate::model::value::FieldValue;
use crate::model::RecordId;
use chrono::{Local, NaiveDate};

/// Customer contact owned by one commercial collaborator.
#[derive(Debug, Clone, PartialEq)]
pub struct Client {
    pub id: Option<RecordId>,
    pub full_name: String,
    /// Unique.
    pub email: String,
    pub phone: Option<String>,
    pub company_name: Option<String>,
    pub created_date: Option<NaiveDate>,
    pub last_contact_date: Option<NaiveDate>,
    /// Owning commercial collaborator.
    pub id_commercial: Option<RecordId>,
    pub archived: bool,
    pub related: Related,
}

impl Client {
    /// Creates an unsaved client dated today.
    pub fn new(
        full_name: impl Into<String>,
        email: impl Into<String>,
        id_commercial: Option<RecordId>,
    ) -> Self {
        Self {
            id: None,
            full_name: full_name.into(),
            email: email.into(),
            phone: None,
            company_name: None,
            created_date: Some(Local::now().date_naive()),
            last_contact_date: None,
            id_commercial,
            archived: false,
            related: Related::new(),
        }
    }

    /// Owning commercial, when loaded.
    pub fn commercial(&self) -> Option<&Collaborator> {
        self.related
            .get("commercial")
            .and_then(|record| record.as_collaborator())
    }

    pub(crate) fn scalar(&self, name: &str) -> Option<FieldValue> {
        let value = match name {
            "full_name" => self.full_name.as_str().into(),
            "email" => self.email.as_str().into(),
            "phone" => self.phone.clone().into(),
            "company_name" => self.company_name.clone().into(),
            "created_date" => self.created_date.into(),
            "last_contact_date" => self.last_contact_date.into(),
            "id_commercial" => self.id_commercial.into(),
            "archived" => self.archived.into(),
            _ => return None,
        };
        Some(value)
    }

    pub(crate) fn set_field(&mut self, edit: &mut FieldEdit<'_>) -> Result<(), RecordError> {
        match edit.name {
            "full_name" => self.full_name = edit.text()?,
            "email" => self.email = edit.text()?,
            "phone" => self.phone = edit.optional_text()?,
            "company_name" => self.company_name = edit.optional_text()?,
            "created_date" => self.created_date = edit.optional_date()?,
            "last_contact_date" => self.last_contact_date = edit.optional_date()?,
            "id_commercial" => self.id_commercial = edit.optional_integer()?,
            "archived" => self.archived = edit.boolean()?,
            _ => return Err(edit.unknown()),
        }
        Ok(())
    }
}
