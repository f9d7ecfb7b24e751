//! Role-based access: field visibility, object permissions and default scopes.
//!
//! # Responsibility
//! - Decide which fields a role sees or edits for a purpose (`fields`).
//! - Decide whether an actor may act on one record (`permission`).
//! - Provide the default listing filters per role and purpose (`scope`).
//!
//! # Invariants
//! - Everything here is pure: no storage access, no mutation.

pub mod fields;
pub mod permission;
pub mod scope;

pub use fields::{editable_fields, fields, FieldDescriptor};
pub use permission::{allowed_actions, authorized, Action};
pub use scope::record_scope;
