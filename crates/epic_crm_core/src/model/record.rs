//! Closed union over the four record kinds.
//!
//! # Responsibility
//! - Give generic code (repository, path resolver, permissions) one handle
//!   type with uniform attribute access.
//! - Apply validated in-place edits without persisting them.
//!
//! # Invariants
//! - `attribute` answers relation names before column names.
//! - A relation that was never loaded reads as `Null`.

use crate::model::client::Client;
use crate::model::collaborator::Collaborator;
use crate::model::contract::Contract;
use crate::model::event::Event;
use crate::model::value::FieldValue;
use crate::model::{EntityKind, RecordId};
use chrono::{NaiveDate, NaiveDateTime};
use std::collections::BTreeMap;
use std::error::Error;
use std::fmt::{Display, Formatter};

/// Relations materialized on a record, keyed by relation name.
pub type Related = BTreeMap<&'static str, Record>;

/// Result of looking up one path segment on a record.
#[derive(Debug, Clone, PartialEq)]
pub enum Attr<'a> {
    Value(FieldValue),
    Related(&'a Record),
}

/// Errors raised while editing a record in memory.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RecordError {
    UnknownField {
        kind: EntityKind,
        field: String,
    },
    ReadOnlyField {
        kind: EntityKind,
        field: String,
    },
    TypeMismatch {
        kind: EntityKind,
        field: String,
        expected: &'static str,
    },
}

impl Display for RecordError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::UnknownField { kind, field } => write!(f, "{kind} has no field `{field}`"),
            Self::ReadOnlyField { kind, field } => {
                write!(f, "{kind} field `{field}` cannot be edited")
            }
            Self::TypeMismatch {
                kind,
                field,
                expected,
            } => write!(f, "{kind} field `{field}` expects {expected}"),
        }
    }
}

impl Error for RecordError {}

/// One persisted (or about to be persisted) record.
#[derive(Debug, Clone, PartialEq)]
pub enum Record {
    Collaborator(Collaborator),
    Client(Client),
    Contract(Contract),
    Event(Event),
}

impl Record {
    pub fn kind(&self) -> EntityKind {
        match self {
            Self::Collaborator(_) => EntityKind::Collaborator,
            Self::Client(_) => EntityKind::Client,
            Self::Contract(_) => EntityKind::Contract,
            Self::Event(_) => EntityKind::Event,
        }
    }

    /// `None` until storage assigned an id.
    pub fn id(&self) -> Option<RecordId> {
        match self {
            Self::Collaborator(item) => item.id,
            Self::Client(item) => item.id,
            Self::Contract(item) => item.id,
            Self::Event(item) => item.id,
        }
    }

    pub(crate) fn set_id(&mut self, id: RecordId) {
        match self {
            Self::Collaborator(item) => item.id = Some(id),
            Self::Client(item) => item.id = Some(id),
            Self::Contract(item) => item.id = Some(id),
            Self::Event(item) => item.id = Some(id),
        }
    }

    pub fn is_archived(&self) -> bool {
        match self {
            Self::Collaborator(item) => item.archived,
            Self::Client(item) => item.archived,
            Self::Contract(item) => item.archived,
            Self::Event(item) => item.archived,
        }
    }

    pub fn set_archived(&mut self, archived: bool) {
        match self {
            Self::Collaborator(item) => item.archived = archived,
            Self::Client(item) => item.archived = archived,
            Self::Contract(item) => item.archived = archived,
            Self::Event(item) => item.archived = archived,
        }
    }

    pub fn related(&self) -> &Related {
        match self {
            Self::Collaborator(item) => &item.related,
            Self::Client(item) => &item.related,
            Self::Contract(item) => &item.related,
            Self::Event(item) => &item.related,
        }
    }

    pub fn related_mut(&mut self) -> &mut Related {
        match self {
            Self::Collaborator(item) => &mut item.related,
            Self::Client(item) => &mut item.related,
            Self::Contract(item) => &mut item.related,
            Self::Event(item) => &mut item.related,
        }
    }

    /// Looks up one path segment: a relation or a column.
    ///
    /// Returns `None` for names this kind does not define.
    pub fn attribute(&self, name: &str) -> Option<Attr<'_>> {
        if let Some(relation) = self.kind().table().relation(name) {
            return Some(match self.related().get(relation.name) {
                Some(record) => Attr::Related(record),
                None => Attr::Value(FieldValue::Null),
            });
        }
        self.scalar(name).map(Attr::Value)
    }

    /// Column value by name, `None` when the column does not exist.
    pub fn scalar(&self, name: &str) -> Option<FieldValue> {
        if name == "id" {
            return Some(self.id().into());
        }
        match self {
            Self::Collaborator(item) => item.scalar(name),
            Self::Client(item) => item.scalar(name),
            Self::Contract(item) => item.scalar(name),
            Self::Event(item) => item.scalar(name),
        }
    }

    /// Applies one validated value in memory. Nothing is persisted until
    /// the repository commits the record.
    pub fn set_field(&mut self, name: &str, value: FieldValue) -> Result<(), RecordError> {
        let kind = self.kind();
        if name == "id" || kind.table().relation(name).is_some() {
            return Err(RecordError::ReadOnlyField {
                kind,
                field: name.to_string(),
            });
        }
        let mut edit = FieldEdit { kind, name, value };
        match self {
            Self::Collaborator(item) => item.set_field(&mut edit),
            Self::Client(item) => item.set_field(&mut edit),
            Self::Contract(item) => item.set_field(&mut edit),
            Self::Event(item) => item.set_field(&mut edit),
        }
    }

    /// Persistable columns except `id`, in table order.
    pub fn columns(&self) -> Vec<(&'static str, FieldValue)> {
        self.kind()
            .table()
            .columns
            .iter()
            .filter(|column| **column != "id")
            .map(|column| (*column, self.scalar(column).unwrap_or(FieldValue::Null)))
            .collect()
    }

    pub fn as_collaborator(&self) -> Option<&Collaborator> {
        match self {
            Self::Collaborator(item) => Some(item),
            _ => None,
        }
    }

    pub fn as_client(&self) -> Option<&Client> {
        match self {
            Self::Client(item) => Some(item),
            _ => None,
        }
    }

    pub fn as_contract(&self) -> Option<&Contract> {
        match self {
            Self::Contract(item) => Some(item),
            _ => None,
        }
    }

    pub fn as_event(&self) -> Option<&Event> {
        match self {
            Self::Event(item) => Some(item),
            _ => None,
        }
    }
}

impl From<Collaborator> for Record {
    fn from(value: Collaborator) -> Self {
        Self::Collaborator(value)
    }
}

impl From<Client> for Record {
    fn from(value: Client) -> Self {
        Self::Client(value)
    }
}

impl From<Contract> for Record {
    fn from(value: Contract) -> Self {
        Self::Contract(value)
    }
}

impl From<Event> for Record {
    fn from(value: Event) -> Self {
        Self::Event(value)
    }
}

/// One pending in-memory edit, with typed extractors for the entity setters.
pub(crate) struct FieldEdit<'a> {
    kind: EntityKind,
    pub(crate) name: &'a str,
    value: FieldValue,
}

impl FieldEdit<'_> {
    pub(crate) fn unknown(&self) -> RecordError {
        RecordError::UnknownField {
            kind: self.kind,
            field: self.name.to_string(),
        }
    }

    pub(crate) fn mismatch(&self, expected: &'static str) -> RecordError {
        RecordError::TypeMismatch {
            kind: self.kind,
            field: self.name.to_string(),
            expected,
        }
    }

    pub(crate) fn text(&mut self) -> Result<String, RecordError> {
        match std::mem::replace(&mut self.value, FieldValue::Null) {
            FieldValue::Text(text) => Ok(text),
            other => {
                self.value = other;
                Err(self.mismatch("text"))
            }
        }
    }

    pub(crate) fn optional_text(&mut self) -> Result<Option<String>, RecordError> {
        if self.value.is_null() {
            return Ok(None);
        }
        self.text().map(Some)
    }

    pub(crate) fn boolean(&self) -> Result<bool, RecordError> {
        self.value.as_bool().ok_or_else(|| self.mismatch("a boolean"))
    }

    pub(crate) fn integer(&self) -> Result<i64, RecordError> {
        match &self.value {
            FieldValue::Integer(value) => Ok(*value),
            _ => Err(self.mismatch("an integer")),
        }
    }

    pub(crate) fn optional_integer(&self) -> Result<Option<i64>, RecordError> {
        if self.value.is_null() {
            return Ok(None);
        }
        self.integer().map(Some)
    }

    pub(crate) fn real(&self) -> Result<f64, RecordError> {
        match &self.value {
            FieldValue::Real(value) => Ok(*value),
            FieldValue::Integer(value) => Ok(*value as f64),
            _ => Err(self.mismatch("a number")),
        }
    }

    pub(crate) fn optional_date(&self) -> Result<Option<NaiveDate>, RecordError> {
        match &self.value {
            FieldValue::Null => Ok(None),
            FieldValue::Date(date) => Ok(Some(*date)),
            _ => Err(self.mismatch("a date")),
        }
    }

    pub(crate) fn datetime(&self) -> Result<NaiveDateTime, RecordError> {
        match &self.value {
            FieldValue::DateTime(at) => Ok(*at),
            _ => Err(self.mismatch("a date and time")),
        }
    }
}
