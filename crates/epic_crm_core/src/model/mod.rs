//! Domain model for collaborators, clients, contracts and events.
//!
//! # Responsibility
//! - Define the four record kinds and the closed `Record` union over them.
//! - Define role, purpose and identity types shared by access control.
//! - Describe the persisted layout (`schema`) used by generic queries.
//!
//! # Invariants
//! - Every record carries an integer id assigned by storage at creation.
//! - Deletion is a soft `archived` flag unless explicitly hard-deleted.
//! - The bootstrap administrator always has id `BOOTSTRAP_ADMIN_ID`.

pub mod client;
pub mod collaborator;
pub mod contract;
pub mod event;
pub mod record;
pub mod schema;
pub mod value;

use std::fmt::{Display, Formatter};

/// Storage-assigned integer identity shared by every record kind.
pub type RecordId = i64;

/// Id of the administrator created when the database is bootstrapped.
pub const BOOTSTRAP_ADMIN_ID: RecordId = 1;

/// Closed set of record kinds managed by the CRM.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum EntityKind {
    Collaborator,
    Client,
    Contract,
    Event,
}

impl EntityKind {
    pub const ALL: [EntityKind; 4] = [
        EntityKind::Collaborator,
        EntityKind::Client,
        EntityKind::Contract,
        EntityKind::Event,
    ];

    /// Stable lowercase name used in logs and caller-facing APIs.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Collaborator => "collaborator",
            Self::Client => "client",
            Self::Contract => "contract",
            Self::Event => "event",
        }
    }

    pub fn parse(value: &str) -> Option<Self> {
        match value.trim() {
            "collaborator" => Some(Self::Collaborator),
            "client" => Some(Self::Client),
            "contract" => Some(Self::Contract),
            "event" => Some(Self::Event),
            _ => None,
        }
    }
}

impl Display for EntityKind {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Collaborator role. Persisted with the service names used by the business.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Role {
    /// Administrative role; bypasses object-level checks.
    Admin,
    /// Management service ("gestion").
    Management,
    /// Sales service owning clients.
    Commercial,
    /// Support service organizing events.
    Support,
}

impl Role {
    pub const ALL: [Role; 4] = [Role::Admin, Role::Management, Role::Commercial, Role::Support];

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Admin => "admin",
            Self::Management => "gestion",
            Self::Commercial => "commercial",
            Self::Support => "support",
        }
    }

    /// Parses a persisted or user-entered role name. Exact match only.
    pub fn parse(value: &str) -> Option<Self> {
        match value {
            "admin" => Some(Self::Admin),
            "gestion" => Some(Self::Management),
            "commercial" => Some(Self::Commercial),
            "support" => Some(Self::Support),
            _ => None,
        }
    }

    pub fn is_admin(self) -> bool {
        self == Self::Admin
    }
}

impl Display for Role {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Intent that shapes which fields a caller sees or edits.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Purpose {
    List,
    Create,
    Modify,
}

impl Purpose {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::List => "list",
            Self::Create => "create",
            Self::Modify => "modify",
        }
    }

    pub fn parse(value: &str) -> Option<Self> {
        match value.trim() {
            "list" => Some(Self::List),
            "create" => Some(Self::Create),
            "modify" => Some(Self::Modify),
            _ => None,
        }
    }
}

/// Authenticated identity acting on records.
///
/// Access control only needs the id and the role; the full collaborator row
/// stays with the identity provider.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Actor {
    pub id: RecordId,
    pub role: Role,
}

impl Actor {
    pub fn new(id: RecordId, role: Role) -> Self {
        Self { id, role }
    }
}
