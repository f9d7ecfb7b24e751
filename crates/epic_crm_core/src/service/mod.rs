//! Core use-case services.
//!
//! # Responsibility
//! - Orchestrate visibility, validation, permission and repository calls
//!   into the create/edit/delete/sign-in use cases.
//! - Keep presentation layers decoupled from storage details.

pub mod builder;
pub mod entity_service;

use crate::access::Action;
use crate::model::record::RecordError;
use crate::model::{EntityKind, RecordId};
use crate::repo::RepoError;
use crate::validation::ValidationError;
use std::error::Error;
use std::fmt::{Display, Formatter};

pub use builder::{build_record, mandatory_fields};
pub use entity_service::{DeleteOutcome, EntityService};

pub type ServiceResult<T> = Result<T, ServiceError>;

#[derive(Debug)]
pub enum ServiceError {
    PermissionDenied {
        action: Action,
        kind: EntityKind,
        id: Option<RecordId>,
    },
    MissingFields {
        kind: EntityKind,
        fields: Vec<&'static str>,
    },
    Validation(ValidationError),
    Repo(RepoError),
}

impl Display for ServiceError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::PermissionDenied { action, kind, id } => match id {
                Some(id) => write!(f, "not allowed to {} {kind} {id}", action.as_str()),
                None => write!(f, "not allowed to {} {kind}", action.as_str()),
            },
            Self::MissingFields { kind, fields } => {
                write!(f, "missing {kind} fields: {}", fields.join(", "))
            }
            Self::Validation(err) => write!(f, "{err}"),
            Self::Repo(err) => write!(f, "{err}"),
        }
    }
}

impl Error for ServiceError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Validation(err) => Some(err),
            Self::Repo(err) => Some(err),
            Self::PermissionDenied { .. } | Self::MissingFields { .. } => None,
        }
    }
}

impl From<ValidationError> for ServiceError {
    fn from(value: ValidationError) -> Self {
        Self::Validation(value)
    }
}

impl From<RepoError> for ServiceError {
    fn from(value: RepoError) -> Self {
        Self::Repo(value)
    }
}

impl From<RecordError> for ServiceError {
    fn from(value: RecordError) -> Self {
        Self::Repo(RepoError::Record(value))
    }
}
