//! Core domain logic for the Epic Events CRM.
//! This crate is the single source of truth for access rules and record invariants.

pub mod access;
pub mod config;
pub mod db;
pub mod logging;
pub mod model;
pub mod repo;
pub mod service;
pub mod validation;

pub use access::{allowed_actions, authorized, editable_fields, fields, Action, FieldDescriptor};
pub use config::{CoreConfig, QueryOptions};
pub use db::{open_configured_db, open_db, open_db_in_memory, DbError};
pub use logging::{default_log_level, init_logging, init_logging_from_config, logging_status};
pub use model::record::{Record, RecordError};
pub use model::value::FieldValue;
pub use model::{Actor, EntityKind, Purpose, RecordId, Role};
pub use repo::{resolve, EntityRepository, Filters, RepoError, RepoResult, SqliteEntityRepository};
pub use service::{DeleteOutcome, EntityService, ServiceError, ServiceResult};
pub use validation::{validate, FormData, ValidationContext, ValidationError};

/// Minimal health-check API for early integration.
pub fn ping() -> &'static str {
    "pong"
}

/// Returns the core crate version.
pub fn core_version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}

#[cfg(test)]
mod tests {
    use super::{core_version, ping};

    #[test]
    fn ping_returns_pong() {
        assert_eq!(ping(), "pong");
    }

    #[test]
    fn version_is_not_empty() {
        assert!(!core_version().is_empty());
    }
}
