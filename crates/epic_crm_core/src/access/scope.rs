//! Default listing filters per role and purpose.

use crate::model::value::FieldValue;
use crate::model::{Actor, EntityKind, Purpose, Role};
use crate::repo::Filters;

/// Filters applied before showing `kind` to `actor` for `purpose`.
///
/// Administrators are never scoped.
pub fn record_scope(actor: &Actor, kind: EntityKind, purpose: Purpose) -> Filters {
    if actor.role.is_admin() {
        return Filters::new();
    }

    match (purpose, kind, actor.role) {
        (Purpose::List, EntityKind::Contract, Role::Commercial) => Filters::new()
            .eq("signed", true)
            .eq("client.commercial", actor.id)
            .eq("event", FieldValue::Null),
        (Purpose::List, EntityKind::Event, Role::Management) => {
            Filters::new().eq("support_id", FieldValue::Null)
        }
        (Purpose::Modify, EntityKind::Collaborator, Role::Commercial | Role::Support) => {
            Filters::new().eq("id", actor.id)
        }
        (Purpose::Modify, EntityKind::Client, _) => Filters::new().eq("commercial", actor.id),
        (Purpose::Modify, EntityKind::Event, Role::Support) => {
            Filters::new().eq("support", actor.id)
        }
        _ => Filters::new(),
    }
}

#[cfg(test)]
mod tests {
    use super::record_scope;
    use crate::model::value::FieldValue;
    use crate::model::{Actor, EntityKind, Purpose, Role};

    #[test]
    fn commercial_contract_listing_targets_own_unplanned_signed_contracts() {
        let scope = record_scope(
            &Actor::new(3, Role::Commercial),
            EntityKind::Contract,
            Purpose::List,
        );
        assert_eq!(scope.len(), 3);
        assert_eq!(scope.get("client.commercial"), Some(&FieldValue::Integer(3)));
        assert_eq!(scope.get("event"), Some(&FieldValue::Null));
    }

    #[test]
    fn modify_scopes() {
        let support = Actor::new(4, Role::Support);
        assert_eq!(
            record_scope(&support, EntityKind::Collaborator, Purpose::Modify).get("id"),
            Some(&FieldValue::Integer(4))
        );
        assert_eq!(
            record_scope(&support, EntityKind::Event, Purpose::Modify).get("support"),
            Some(&FieldValue::Integer(4))
        );
        let manager = Actor::new(2, Role::Management);
        assert!(record_scope(&manager, EntityKind::Collaborator, Purpose::Modify).is_empty());
    }

    #[test]
    fn admin_is_never_scoped() {
        let admin = Actor::new(1, Role::Admin);
        for kind in EntityKind::ALL {
            for purpose in [Purpose::List, Purpose::Create, Purpose::Modify] {
                assert!(record_scope(&admin, kind, purpose).is_empty());
            }
        }
    }
}
