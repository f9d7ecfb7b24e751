//! Per-field validation dispatch.
//!
//! # Responsibility
//! - Map `(kind, field)` to the validator registered for it.
//! - Hand each validator exactly the context it declares: the raw value,
//!   the storage session, the acting user, or an earlier field's value.
//!
//! # Invariants
//! - A field without a registered validator is a hard error naming the
//!   missing `validate_<field>` entry; it is never skipped.
//! - Validators never write to storage.

mod client;
mod collaborator;
pub(crate) mod common;
mod contract;
mod event;

use crate::access::FieldDescriptor;
use crate::model::value::FieldValue;
use crate::model::{Actor, EntityKind};
use log::warn;
use rusqlite::Connection;
use std::collections::BTreeMap;
use std::error::Error;
use std::fmt::{Display, Formatter};

/// Values gathered so far for the record being built or edited.
pub type FormData = BTreeMap<String, FieldValue>;

/// Outcome of one validator: the normalized value or a user-facing message.
pub type Checked = Result<FieldValue, String>;

/// Everything a validator may ask for.
pub struct ValidationContext<'a> {
    pub session: &'a Connection,
    pub user: &'a Actor,
    pub data: &'a FormData,
}

impl<'a> ValidationContext<'a> {
    pub fn new(session: &'a Connection, user: &'a Actor, data: &'a FormData) -> Self {
        Self {
            session,
            user,
            data,
        }
    }

    fn value(&self, name: &str) -> FieldValue {
        self.data.get(name).cloned().unwrap_or(FieldValue::Null)
    }
}

/// A registered validator, tagged with the context it consumes.
#[derive(Clone, Copy)]
pub enum Validator {
    Value(fn(&FieldValue) -> Checked),
    Session(fn(&Connection, &FieldValue) -> Checked),
    SessionUser(fn(&Connection, &Actor, &FieldValue) -> Checked),
    /// Reads the already-entered value of `peer` (e.g. `start_date`) first.
    Peer {
        peer: &'static str,
        check: fn(&FieldValue, &FieldValue) -> Checked,
    },
}

impl Validator {
    fn run(&self, ctx: &ValidationContext<'_>, value: &FieldValue) -> Checked {
        match self {
            Self::Value(check) => check(value),
            Self::Session(check) => check(ctx.session, value),
            Self::SessionUser(check) => check(ctx.session, ctx.user, value),
            Self::Peer { peer, check } => check(&ctx.value(peer), value),
        }
    }
}

type Registry = &'static [(&'static str, Validator)];

fn registry(kind: EntityKind) -> Registry {
    match kind {
        EntityKind::Collaborator => collaborator::VALIDATORS,
        EntityKind::Client => client::VALIDATORS,
        EntityKind::Contract => contract::VALIDATORS,
        EntityKind::Event => event::VALIDATORS,
    }
}

/// The validator registered for `field` on `kind`, if any.
pub fn validator_for(kind: EntityKind, field: &str) -> Option<Validator> {
    registry(kind)
        .iter()
        .find(|(name, _)| *name == field)
        .map(|(_, validator)| *validator)
}

/// A field-level, user-correctable rejection.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidationError {
    pub field: String,
    pub message: String,
}

impl Display for ValidationError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}: {}", self.field, self.message)
    }
}

impl Error for ValidationError {}

/// Validates `ctx.data[field.name]` with the validator registered for `kind`.
///
/// Returns the normalized value to store, or the message to redisplay.
pub fn validate(
    kind: EntityKind,
    field: &FieldDescriptor,
    ctx: &ValidationContext<'_>,
) -> Result<FieldValue, ValidationError> {
    let reject = |message: String| {
        warn!(
            "event=field_validate module=validation status=error kind={} field={}",
            kind, field.name
        );
        ValidationError {
            field: field.name.to_string(),
            message,
        }
    };

    let validator = validator_for(kind, field.name)
        .ok_or_else(|| reject(format!("no validator `validate_{}` for {kind}", field.name)))?;
    validator.run(ctx, &ctx.value(field.name)).map_err(reject)
}
