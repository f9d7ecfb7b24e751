//! Persisted layout of each record kind.
//!
//! Generic queries (filter joins, relation loading) read this table instead
//! of carrying per-kind SQL.

use crate::model::EntityKind;

/// How a relation is stored.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RelationLink {
    /// This table holds `column` referencing the target's `id`.
    Owning { column: &'static str },
    /// The target table holds `column` referencing this row; at most one row.
    InverseOne { column: &'static str },
    /// The target table holds `column` referencing this row; any number of rows.
    InverseMany { column: &'static str },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RelationDef {
    pub name: &'static str,
    pub target: EntityKind,
    pub link: RelationLink,
}

/// Table name, ordered columns and relations of one record kind.
#[derive(Debug)]
pub struct TableDef {
    pub kind: EntityKind,
    pub table: &'static str,
    pub columns: &'static [&'static str],
    pub relations: &'static [RelationDef],
}

impl TableDef {
    pub fn has_column(&self, name: &str) -> bool {
        self.columns.contains(&name)
    }

    pub fn relation(&self, name: &str) -> Option<&'static RelationDef> {
        self.relations.iter().find(|relation| relation.name == name)
    }
}

static COLLABORATORS: TableDef = TableDef {
    kind: EntityKind::Collaborator,
    table: "collaborators",
    columns: &["id", "full_name", "password", "email", "role", "archived"],
    relations: &[
        RelationDef {
            name: "clients",
            target: EntityKind::Client,
            link: RelationLink::InverseMany {
                column: "id_commercial",
            },
        },
        RelationDef {
            name: "events",
            target: EntityKind::Event,
            link: RelationLink::InverseMany {
                column: "support_id",
            },
        },
    ],
};

static CLIENTS: TableDef = TableDef {
    kind: EntityKind::Client,
    table: "clients",
    columns: &[
        "id",
        "full_name",
        "email",
        "phone",
        "company_name",
        "created_date",
        "last_contact_date",
        "id_commercial",
        "archived",
    ],
    relations: &[
        RelationDef {
            name: "commercial",
            target: EntityKind::Collaborator,
            link: RelationLink::Owning {
                column: "id_commercial",
            },
        },
        RelationDef {
            name: "contracts",
            target: EntityKind::Contract,
            link: RelationLink::InverseMany { column: "client_id" },
        },
    ],
};

static CONTRACTS: TableDef = TableDef {
    kind: EntityKind::Contract,
    table: "contracts",
    columns: &[
        "id",
        "client_id",
        "total_amount",
        "amount_due",
        "created_date",
        "signed",
        "archived",
    ],
    relations: &[
        RelationDef {
            name: "client",
            target: EntityKind::Client,
            link: RelationLink::Owning { column: "client_id" },
        },
        RelationDef {
            name: "event",
            target: EntityKind::Event,
            link: RelationLink::InverseOne {
                column: "contract_id",
            },
        },
    ],
};

static EVENTS: TableDef = TableDef {
    kind: EntityKind::Event,
    table: "events",
    columns: &[
        "id",
        "title",
        "start_date",
        "end_date",
        "location",
        "participants",
        "notes",
        "archived",
        "contract_id",
        "support_id",
    ],
    relations: &[
        RelationDef {
            name: "contract",
            target: EntityKind::Contract,
            link: RelationLink::Owning {
                column: "contract_id",
            },
        },
        RelationDef {
            name: "support",
            target: EntityKind::Collaborator,
            link: RelationLink::Owning {
                column: "support_id",
            },
        },
    ],
};

impl EntityKind {
    /// Persisted layout for this kind.
    pub fn table(self) -> &'static TableDef {
        match self {
            Self::Collaborator => &COLLABORATORS,
            Self::Client => &CLIENTS,
            Self::Contract => &CONTRACTS,
            Self::Event => &EVENTS,
        }
    }
}
