//! Field visibility per kind, role and purpose.
//!
//! Each kind owns a full ordered field table and one exclusion set per
//! purpose. Paths such as `commercial.full_name` are display-only and are
//! resolved through relations.

use crate::model::record::Record;
use crate::model::{Actor, EntityKind, Purpose, Role};

/// One `(name, label)` pair shown to or requested from the user.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct FieldDescriptor {
    pub name: &'static str,
    pub label: &'static str,
}

const fn field(name: &'static str, label: &'static str) -> FieldDescriptor {
    FieldDescriptor { name, label }
}

pub const ARCHIVED: FieldDescriptor = field("archived", "Archived");
pub const PASSWORD: FieldDescriptor = field("password", "Password");

struct FieldTable {
    all: &'static [FieldDescriptor],
    list_excludes: &'static [&'static str],
    create_excludes: &'static [&'static str],
    modify_excludes: &'static [&'static str],
    create_roles: &'static [Role],
    modify_roles: &'static [Role],
}

static COLLABORATOR_FIELDS: FieldTable = FieldTable {
    all: &[
        field("id", "Id"),
        field("full_name", "Name"),
        PASSWORD,
        field("email", "Email"),
        field("role", "Service"),
        ARCHIVED,
    ],
    list_excludes: &["password", "archived"],
    create_excludes: &["id", "archived"],
    modify_excludes: &["id", "password", "archived"],
    create_roles: &[Role::Admin, Role::Management],
    modify_roles: &[Role::Admin, Role::Management],
};

static CLIENT_FIELDS: FieldTable = FieldTable {
    all: &[
        field("id", "Id"),
        field("full_name", "Contact name"),
        field("email", "Email"),
        field("phone", "Phone"),
        field("company_name", "Company"),
        field("created_date", "Created on"),
        field("last_contact_date", "Last contact"),
        field("commercial.full_name", "Commercial"),
        field("id_commercial", "Commercial id"),
        ARCHIVED,
    ],
    list_excludes: &["id_commercial", "archived"],
    create_excludes: &["id", "commercial.full_name", "created_date", "archived"],
    modify_excludes: &["id", "commercial.full_name", "archived"],
    create_roles: &[Role::Admin, Role::Commercial],
    modify_roles: &[Role::Admin, Role::Commercial],
};

static CONTRACT_FIELDS: FieldTable = FieldTable {
    all: &[
        field("id", "Id"),
        field("client_id", "Client id"),
        field("client.company_name", "Client"),
        field("total_amount", "Total amount"),
        field("amount_due", "Amount due"),
        field("created_date", "Created on"),
        field("signed", "Signed"),
        ARCHIVED,
    ],
    list_excludes: &["client_id", "archived"],
    create_excludes: &["id", "client.company_name", "created_date", "archived"],
    modify_excludes: &[
        "id",
        "client_id",
        "client.company_name",
        "created_date",
        "archived",
    ],
    create_roles: &[Role::Admin, Role::Management],
    modify_roles: &[Role::Admin, Role::Management],
};

static EVENT_FIELDS: FieldTable = FieldTable {
    all: &[
        field("id", "Id"),
        field("contract.client.company_name", "Client"),
        field("contract_id", "Contract id"),
        field("title", "Title"),
        field("start_date", "Start"),
        field("end_date", "End"),
        field("location", "Location"),
        field("participants", "Participants"),
        field("notes", "Notes"),
        field("support.full_name", "Support"),
        field("support_id", "Support id"),
        ARCHIVED,
    ],
    list_excludes: &["support_id", "archived"],
    create_excludes: &[
        "id",
        "contract.client.company_name",
        "support.full_name",
        "support_id",
        "archived",
    ],
    modify_excludes: &[
        "id",
        "contract.client.company_name",
        "contract_id",
        "support.full_name",
        "archived",
    ],
    create_roles: &[Role::Admin, Role::Commercial],
    modify_roles: &[Role::Admin, Role::Management, Role::Support],
};

fn table(kind: EntityKind) -> &'static FieldTable {
    match kind {
        EntityKind::Collaborator => &COLLABORATOR_FIELDS,
        EntityKind::Client => &CLIENT_FIELDS,
        EntityKind::Contract => &CONTRACT_FIELDS,
        EntityKind::Event => &EVENT_FIELDS,
    }
}

/// Ordered descriptors `role` may see (`List`) or fill in (`Create`, `Modify`).
///
/// An empty list for `Create`/`Modify` means the role may not perform that
/// purpose on this kind at all.
pub fn fields(kind: EntityKind, role: Role, purpose: Purpose) -> Vec<FieldDescriptor> {
    let table = table(kind);
    let (excludes, allowed) = match purpose {
        Purpose::List => (table.list_excludes, None),
        Purpose::Create => (table.create_excludes, Some(table.create_roles)),
        Purpose::Modify => (table.modify_excludes, Some(table.modify_roles)),
    };

    if allowed.is_some_and(|roles| !roles.contains(&role)) {
        return Vec::new();
    }

    let mut visible: Vec<FieldDescriptor> = table
        .all
        .iter()
        .filter(|descriptor| !excludes.contains(&descriptor.name))
        .copied()
        .collect();

    // Management only assigns support; support edits everything but the assignment.
    if kind == EntityKind::Event && purpose == Purpose::Modify {
        match role {
            Role::Management => visible.retain(|descriptor| descriptor.name == "support_id"),
            Role::Support => visible.retain(|descriptor| descriptor.name != "support_id"),
            Role::Admin | Role::Commercial => {}
        }
    }

    if role.is_admin() && purpose != Purpose::Create {
        visible.push(ARCHIVED);
    }
    visible
}

/// Modify descriptors for `record`, plus `password` when it is the actor's own row.
pub fn editable_fields(actor: &Actor, record: &Record) -> Vec<FieldDescriptor> {
    let mut editable = fields(record.kind(), actor.role, Purpose::Modify);
    let is_self = record.kind() == EntityKind::Collaborator && record.id() == Some(actor.id);
    if is_self {
        if matches!(actor.role, Role::Admin | Role::Management) && !editable.is_empty() {
            editable.insert(1, PASSWORD);
        } else {
            editable.push(PASSWORD);
        }
    }
    editable
}

/// Descriptor for `name` in the full table of `kind`.
pub fn descriptor(kind: EntityKind, name: &str) -> Option<FieldDescriptor> {
    table(kind)
        .all
        .iter()
        .find(|descriptor| descriptor.name == name)
        .copied()
}
