//! Equality filters over dotted paths and their SQL translation.
//!
//! # Responsibility
//! - Hold caller filters as `path -> value` pairs combined with AND.
//! - Build one `SELECT` that joins every relation hop of every path.
//!
//! # Invariants
//! - Every segment but the last must name a relation of the current kind.
//! - The last segment names a column, or a relation compared by id.
//! - `archived = 0` is always added when archived rows are not requested,
//!   even when the caller filters on `archived` itself.

use crate::config::QueryOptions;
use crate::model::schema::{RelationLink, TableDef};
use crate::model::value::FieldValue;
use crate::model::{EntityKind, Role, BOOTSTRAP_ADMIN_ID};
use crate::repo::rows::{select_list, to_sql_value};
use crate::repo::{RepoError, RepoResult};
use rusqlite::types::Value;
use std::collections::BTreeMap;

/// AND-combined equality filters keyed by dotted path.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Filters {
    entries: BTreeMap<String, FieldValue>,
}

impl Filters {
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds (or replaces) one `path = value` condition.
    pub fn eq(mut self, path: impl Into<String>, value: impl Into<FieldValue>) -> Self {
        self.entries.insert(path.into(), value.into());
        self
    }

    pub fn insert(&mut self, path: impl Into<String>, value: impl Into<FieldValue>) {
        self.entries.insert(path.into(), value.into());
    }

    pub fn get(&self, path: &str) -> Option<&FieldValue> {
        self.entries.get(path)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &FieldValue)> {
        self.entries.iter().map(|(path, value)| (path.as_str(), value))
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }
}

impl<K: Into<String>, V: Into<FieldValue>> FromIterator<(K, V)> for Filters {
    fn from_iter<T: IntoIterator<Item = (K, V)>>(iter: T) -> Self {
        Self {
            entries: iter
                .into_iter()
                .map(|(path, value)| (path.into(), value.into()))
                .collect(),
        }
    }
}

/// Which listing the query serves; selects the bootstrap-admin exclusions.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Listing {
    Filter,
    Ordered,
}

/// SQL text plus bind values for one record query.
#[derive(Debug)]
pub(crate) struct SelectQuery {
    pub(crate) sql: String,
    pub(crate) binds: Vec<Value>,
}

pub(crate) fn build_select(
    kind: EntityKind,
    filters: &Filters,
    options: QueryOptions,
    listing: Listing,
) -> RepoResult<SelectQuery> {
    let mut builder = SelectBuilder::new(kind);
    for (path, value) in filters.iter() {
        builder.add_filter(path, value)?;
    }

    if !options.include_archived {
        builder.conditions.push("t0.archived = 0".to_string());
    }

    if kind == EntityKind::Collaborator {
        builder.conditions.push("t0.id <> ?".to_string());
        builder.binds.push(Value::Integer(BOOTSTRAP_ADMIN_ID));
        if listing == Listing::Ordered {
            builder.conditions.push("t0.role <> ?".to_string());
            builder.binds.push(Value::Text(Role::Admin.as_str().to_string()));
        }
    }

    Ok(builder.finish())
}

struct SelectBuilder {
    root: &'static TableDef,
    joins: Vec<String>,
    conditions: Vec<String>,
    binds: Vec<Value>,
    next_alias: usize,
}

impl SelectBuilder {
    fn new(kind: EntityKind) -> Self {
        Self {
            root: kind.table(),
            joins: Vec::new(),
            conditions: Vec::new(),
            binds: Vec::new(),
            next_alias: 1,
        }
    }

    fn add_filter(&mut self, path: &str, value: &FieldValue) -> RepoResult<()> {
        let kind = self.root.kind;
        let unknown = || RepoError::UnknownField {
            kind,
            path: path.to_string(),
        };
        let segments: Vec<&str> = path.split('.').collect();
        let Some((last, hops)) = segments.split_last() else {
            return Err(unknown());
        };

        let mut table = self.root;
        let mut alias = "t0".to_string();
        let mut joins = Vec::new();
        for hop in hops {
            let relation = table.relation(hop).ok_or_else(unknown)?;
            let target = relation.target.table();
            let next_alias = format!("t{}", self.next_alias + joins.len());
            let on = match relation.link {
                RelationLink::Owning { column } => format!("{next_alias}.id = {alias}.{column}"),
                RelationLink::InverseOne { column } | RelationLink::InverseMany { column } => {
                    format!("{next_alias}.{column} = {alias}.id")
                }
            };
            joins.push(format!("INNER JOIN {} {next_alias} ON {on}", target.table));
            table = target;
            alias = next_alias;
        }

        let condition = if table.has_column(last) {
            self.compare(format!("{alias}.{last}"), value)
        } else if let Some(relation) = table.relation(last) {
            match relation.link {
                RelationLink::Owning { column } => self.compare(format!("{alias}.{column}"), value),
                RelationLink::InverseOne { column } | RelationLink::InverseMany { column } => {
                    let target = relation.target.table().table;
                    if value.is_null() {
                        format!(
                            "NOT EXISTS (SELECT 1 FROM {target} r WHERE r.{column} = {alias}.id)"
                        )
                    } else {
                        self.binds.push(to_sql_value(value));
                        format!(
                            "EXISTS (SELECT 1 FROM {target} r WHERE r.{column} = {alias}.id AND r.id = ?)"
                        )
                    }
                }
            }
        } else {
            return Err(unknown());
        };

        self.next_alias += joins.len();
        self.joins.extend(joins);
        self.conditions.push(condition);
        Ok(())
    }

    fn compare(&mut self, column: String, value: &FieldValue) -> String {
        if value.is_null() {
            format!("{column} IS NULL")
        } else {
            self.binds.push(to_sql_value(value));
            format!("{column} = ?")
        }
    }

    fn finish(self) -> SelectQuery {
        let mut sql = format!(
            "SELECT DISTINCT {} FROM {} t0",
            select_list(self.root.kind, "t0"),
            self.root.table
        );
        for join in &self.joins {
            sql.push(' ');
            sql.push_str(join);
        }
        if !self.conditions.is_empty() {
            sql.push_str(" WHERE ");
            sql.push_str(&self.conditions.join(" AND "));
        }
        sql.push_str(" ORDER BY t0.id");
        SelectQuery {
            sql,
            binds: self.binds,
        }
    }
}
