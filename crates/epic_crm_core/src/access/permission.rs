//! Object-level authorization.
//!
//! `authorized` answers "may this actor do this to that record"; the menu
//! matrix in `allowed_actions` answers "which actions does this role get for
//! this kind". Both are total and never fail.

use crate::model::record::Record;
use crate::model::{Actor, EntityKind, Role};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Action {
    /// Show one record with its relations.
    Details,
    Create,
    /// Menu entry leading to an edit session.
    Modify,
    /// Committing edits to an existing record.
    Update,
    Delete,
    /// Changing a collaborator's password.
    Password,
}

impl Action {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Details => "details",
            Self::Create => "create",
            Self::Modify => "modify",
            Self::Update => "update",
            Self::Delete => "delete",
            Self::Password => "password",
        }
    }

    pub fn parse(value: &str) -> Option<Self> {
        match value.trim() {
            "details" => Some(Self::Details),
            "create" => Some(Self::Create),
            "modify" => Some(Self::Modify),
            "update" => Some(Self::Update),
            "delete" => Some(Self::Delete),
            "password" => Some(Self::Password),
            _ => None,
        }
    }
}

/// Whether `actor` may perform `action` on `record`.
pub fn authorized(actor: &Actor, action: Action, record: &Record) -> bool {
    if actor.role.is_admin() {
        return true;
    }

    match record {
        Record::Collaborator(collaborator) => {
            collaborator.id == Some(actor.id)
                || (actor.role == Role::Management && action != Action::Password)
        }
        Record::Client(client) => client.id_commercial == Some(actor.id),
        Record::Contract(_) => actor.role == Role::Management,
        Record::Event(event) => {
            event.support_id == Some(actor.id)
                || (actor.role == Role::Management && action == Action::Update)
        }
    }
}

const FULL: &[Action] = &[Action::Details, Action::Create, Action::Modify, Action::Delete];
const DETAILS_ONLY: &[Action] = &[Action::Details];
const DETAILS_MODIFY: &[Action] = &[Action::Details, Action::Modify];

/// Menu actions offered to `role` for `kind`.
pub fn allowed_actions(kind: EntityKind, role: Role) -> &'static [Action] {
    match (kind, role) {
        (_, Role::Admin) => FULL,
        (EntityKind::Collaborator, Role::Management) => FULL,
        (EntityKind::Collaborator, Role::Commercial | Role::Support) => DETAILS_MODIFY,
        (EntityKind::Client, Role::Commercial) => FULL,
        (EntityKind::Client, Role::Management | Role::Support) => DETAILS_ONLY,
        (EntityKind::Contract, Role::Management) => FULL,
        (EntityKind::Contract, Role::Commercial | Role::Support) => DETAILS_ONLY,
        (EntityKind::Event, Role::Management) => DETAILS_MODIFY,
        (EntityKind::Event, Role::Commercial) => &[Action::Details, Action::Create],
        (EntityKind::Event, Role::Support) => &[Action::Details, Action::Modify, Action::Delete],
    }
}

#[cfg(test)]
mod tests {
    use super::{allowed_actions, authorized, Action};
    use crate::model::client::Client;
    use crate::model::collaborator::Collaborator;
    use crate::model::contract::Contract;
    use crate::model::event::Event;
    use crate::model::record::Record;
    use crate::model::{Actor, EntityKind, Role};
    use chrono::NaiveDate;

    const ACTIONS: [Action; 6] = [
        Action::Details,
        Action::Create,
        Action::Modify,
        Action::Update,
        Action::Delete,
        Action::Password,
    ];

    fn records() -> Vec<Record> {
        let mut collaborator = Collaborator::new("Ann Lee", "ann@corp.test", Role::Support, "x");
        collaborator.id = Some(4);
        let at = NaiveDate::from_ymd_opt(2025, 6, 8)
            .and_then(|date| date.and_hms_opt(9, 0, 0))
            .expect("valid timestamp");
        let mut event = Event::new(1, "Kickoff", at, at);
        event.support_id = Some(4);
        vec![
            collaborator.into(),
            Client::new("Jane Doe", "jane@corp.test", Some(3)).into(),
            Contract::new(1, 10.0, 0.0, true).into(),
            event.into(),
        ]
    }

    #[test]
    fn admin_is_always_authorized() {
        let admin = Actor::new(1, Role::Admin);
        for record in records() {
            for action in ACTIONS {
                assert!(authorized(&admin, action, &record));
            }
        }
    }

    #[test]
    fn client_requires_owner() {
        let client: Record = Client::new("Jane Doe", "jane@corp.test", Some(3)).into();
        assert!(authorized(&Actor::new(3, Role::Commercial), Action::Modify, &client));
        assert!(!authorized(&Actor::new(5, Role::Commercial), Action::Modify, &client));
        assert!(!authorized(&Actor::new(2, Role::Management), Action::Update, &client));
    }

    #[test]
    fn collaborator_password_is_owner_only_for_management() {
        let records = records();
        let support = &records[0];
        let manager = Actor::new(2, Role::Management);
        assert!(authorized(&manager, Action::Update, support));
        assert!(!authorized(&manager, Action::Password, support));
        assert!(authorized(&Actor::new(4, Role::Support), Action::Password, support));
        assert!(!authorized(&Actor::new(6, Role::Support), Action::Update, support));
    }

    #[test]
    fn event_rules() {
        let records = records();
        let event = &records[3];
        assert!(authorized(&Actor::new(4, Role::Support), Action::Delete, event));
        assert!(!authorized(&Actor::new(9, Role::Support), Action::Update, event));
        assert!(authorized(&Actor::new(2, Role::Management), Action::Update, event));
        assert!(!authorized(&Actor::new(2, Role::Management), Action::Delete, event));
        assert!(!authorized(&Actor::new(3, Role::Commercial), Action::Update, event));
    }

    #[test]
    fn contract_is_management_only() {
        let records = records();
        assert!(authorized(&Actor::new(2, Role::Management), Action::Delete, &records[2]));
        assert!(!authorized(&Actor::new(3, Role::Commercial), Action::Update, &records[2]));
    }

    #[test]
    fn menu_matrix() {
        assert_eq!(
            allowed_actions(EntityKind::Event, Role::Commercial),
            &[Action::Details, Action::Create]
        );
        assert_eq!(
            allowed_actions(EntityKind::Client, Role::Management),
            &[Action::Details]
        );
        assert!(allowed_actions(EntityKind::Contract, Role::Admin).contains(&Action::Delete));
        assert_eq!(Action::parse("password"), Some(Action::Password));
    }
}
