//! Entity repository contract and SQLite implementation.
//!
//! # Responsibility
//! - Filtered and ordered retrieval for every record kind.
//! - Create, update, soft-delete and hard-delete with rollback on failure.
//! - Hydrate relations on demand for path resolution and detail views.
//!
//! # Invariants
//! - Each mutation commits independently in an immediate transaction.
//! - A failed mutation leaves both storage and the in-memory record as
//!   they were before the call.

use crate::config::QueryOptions;
use crate::model::record::Record;
use crate::model::schema::RelationLink;
use crate::model::{EntityKind, RecordId};
use crate::repo::filter::{build_select, Filters, Listing, SelectQuery};
use crate::repo::path::resolve;
use crate::repo::rows::{parse_row, select_list, to_sql_value};
use crate::repo::{RepoError, RepoResult};
use log::{error, info};
use rusqlite::types::Value;
use rusqlite::{params_from_iter, Connection, Transaction, TransactionBehavior};
use std::time::Instant;

/// Repository interface shared by every record kind.
pub trait EntityRepository {
    /// Records of `kind` matching every filter (AND), ordered by id.
    fn filter(&self, kind: EntityKind, options: QueryOptions, filters: &Filters)
        -> RepoResult<Vec<Record>>;
    /// All visible records of `kind` sorted in memory by the resolved `path`.
    fn order_by(
        &self,
        kind: EntityKind,
        path: &str,
        descending: bool,
        options: QueryOptions,
    ) -> RepoResult<Vec<Record>>;
    fn get(&self, kind: EntityKind, id: RecordId, options: QueryOptions) -> RepoResult<Record>;
    /// Re-reads `record`, discarding uncommitted in-memory edits.
    fn refresh(&self, record: &mut Record) -> RepoResult<()>;
    /// Inserts `record` and stores the assigned id on it.
    fn create(&self, record: &mut Record) -> RepoResult<RecordId>;
    fn update(&self, record: &Record) -> RepoResult<()>;
    /// Sets `archived` and commits. Applying it twice is harmless.
    fn soft_delete(&self, record: &mut Record) -> RepoResult<()>;
    fn hard_delete(&self, record: &Record) -> RepoResult<()>;
    /// Loads the named relation onto `record`; `false` when it has no target.
    fn load_relation(&self, record: &mut Record, relation: &str) -> RepoResult<bool>;
    /// Records on the far side of a relation, honoring `options` for inverse links.
    fn list_related(
        &self,
        record: &Record,
        relation: &str,
        options: QueryOptions,
    ) -> RepoResult<Vec<Record>>;
}

/// SQLite-backed entity repository.
pub struct SqliteEntityRepository<'conn> {
    conn: &'conn Connection,
}

impl<'conn> SqliteEntityRepository<'conn> {
    pub fn new(conn: &'conn Connection) -> Self {
        Self { conn }
    }

    /// Loads every relation hop of `path` (e.g. `contract.client`) onto `record`.
    ///
    /// Stops quietly at the first segment that is not a single-valued relation.
    pub fn load_path(&self, record: &mut Record, path: &str) -> RepoResult<()> {
        let segments: Vec<&str> = path.split('.').collect();
        self.load_segments(record, &segments)
    }

    fn load_segments(&self, record: &mut Record, segments: &[&str]) -> RepoResult<()> {
        let Some((first, rest)) = segments.split_first() else {
            return Ok(());
        };
        match record.kind().table().relation(first) {
            Some(def) if !matches!(def.link, RelationLink::InverseMany { .. }) => {}
            _ => return Ok(()),
        }
        self.load_relation(record, first)?;
        if let Some(child) = record.related_mut().get_mut(*first) {
            self.load_segments(child, rest)?;
        }
        Ok(())
    }

    fn run_select(&self, kind: EntityKind, query: SelectQuery) -> RepoResult<Vec<Record>> {
        let mut stmt = self.conn.prepare(&query.sql)?;
        let mut rows = stmt.query(params_from_iter(query.binds))?;
        let mut records = Vec::new();
        while let Some(row) = rows.next()? {
            records.push(parse_row(kind, row)?);
        }
        Ok(records)
    }

    fn fetch_one(
        &self,
        kind: EntityKind,
        column: &str,
        value: RecordId,
        options: QueryOptions,
    ) -> RepoResult<Option<Record>> {
        let mut sql = format!(
            "SELECT {} FROM {} t0 WHERE t0.{column} = ?1",
            select_list(kind, "t0"),
            kind.table().table
        );
        if !options.include_archived {
            sql.push_str(" AND t0.archived = 0");
        }
        sql.push_str(" ORDER BY t0.id LIMIT 1");

        let mut stmt = self.conn.prepare(&sql)?;
        let mut rows = stmt.query([value])?;
        match rows.next()? {
            Some(row) => Ok(Some(parse_row(kind, row)?)),
            None => Ok(None),
        }
    }

    fn write(
        &self,
        event: &str,
        record: &Record,
        apply: impl FnOnce(&Transaction<'_>) -> RepoResult<RecordId>,
    ) -> RepoResult<RecordId> {
        let started_at = Instant::now();
        let kind = record.kind();
        let outcome = Transaction::new_unchecked(self.conn, TransactionBehavior::Immediate)
            .map_err(RepoError::from)
            .and_then(|tx| {
                let id = apply(&tx)?;
                tx.commit()?;
                Ok(id)
            });

        match &outcome {
            Ok(id) => info!(
                "event={} module=repo status=ok kind={} id={} duration_ms={}",
                event,
                kind,
                id,
                started_at.elapsed().as_millis()
            ),
            Err(err) => error!(
                "event={} module=repo status=error kind={} id={} duration_ms={} error_code={} error={}",
                event,
                kind,
                record.id().map_or_else(|| "none".to_string(), |id| id.to_string()),
                started_at.elapsed().as_millis(),
                err.code(),
                err
            ),
        }
        outcome
    }
}

impl EntityRepository for SqliteEntityRepository<'_> {
    fn filter(
        &self,
        kind: EntityKind,
        options: QueryOptions,
        filters: &Filters,
    ) -> RepoResult<Vec<Record>> {
        build_select(kind, filters, options, Listing::Filter)
            .and_then(|query| self.run_select(kind, query))
            .inspect_err(|err| {
                error!(
                    "event=entity_filter module=repo status=error kind={} filters={} error_code={} error={}",
                    kind,
                    filters.len(),
                    err.code(),
                    err
                );
            })
    }

    fn order_by(
        &self,
        kind: EntityKind,
        path: &str,
        descending: bool,
        options: QueryOptions,
    ) -> RepoResult<Vec<Record>> {
        let records = build_select(kind, &Filters::new(), options, Listing::Ordered)
            .and_then(|query| self.run_select(kind, query))
            .and_then(|records| {
                records
                    .into_iter()
                    .map(|mut record| {
                        self.load_path(&mut record, path)?;
                        Ok(record)
                    })
                    .collect::<RepoResult<Vec<_>>>()
            })
            .inspect_err(|err| {
                error!(
                    "event=entity_order_by module=repo status=error kind={} error_code={} error={}",
                    kind,
                    err.code(),
                    err
                );
            })?;

        let mut keyed: Vec<_> = records
            .into_iter()
            .map(|record| (resolve(&record, path), record))
            .collect();
        keyed.sort_by(|(left, _), (right, _)| {
            let ordering = left.sort_cmp(right);
            if descending {
                ordering.reverse()
            } else {
                ordering
            }
        });
        Ok(keyed.into_iter().map(|(_, record)| record).collect())
    }

    fn get(&self, kind: EntityKind, id: RecordId, options: QueryOptions) -> RepoResult<Record> {
        self.fetch_one(kind, "id", id, options)?
            .ok_or(RepoError::NotFound { kind, id })
    }

    fn refresh(&self, record: &mut Record) -> RepoResult<()> {
        let kind = record.kind();
        let id = record
            .id()
            .ok_or_else(|| RepoError::InvalidData(format!("cannot refresh an unsaved {kind}")))?;
        *record = self.get(kind, id, QueryOptions::with_archived())?;
        Ok(())
    }

    fn create(&self, record: &mut Record) -> RepoResult<RecordId> {
        let table = record.kind().table();
        let mut columns = record.columns();
        if let Some(id) = record.id() {
            columns.insert(0, ("id", id.into()));
        }
        let names: Vec<&str> = columns.iter().map(|(name, _)| *name).collect();
        let placeholders: Vec<String> = (1..=columns.len()).map(|n| format!("?{n}")).collect();
        let sql = format!(
            "INSERT INTO {} ({}) VALUES ({});",
            table.table,
            names.join(", "),
            placeholders.join(", ")
        );
        let binds: Vec<Value> = columns.iter().map(|(_, value)| to_sql_value(value)).collect();

        let id = self.write("entity_create", record, |tx| {
            tx.execute(&sql, params_from_iter(binds))?;
            Ok(tx.last_insert_rowid())
        })?;
        record.set_id(id);
        Ok(id)
    }

    fn update(&self, record: &Record) -> RepoResult<()> {
        let kind = record.kind();
        let id = record
            .id()
            .ok_or_else(|| RepoError::InvalidData(format!("cannot update an unsaved {kind}")))?;
        let columns = record.columns();
        let assignments: Vec<String> = columns
            .iter()
            .enumerate()
            .map(|(index, (name, _))| format!("{name} = ?{}", index + 1))
            .collect();
        let sql = format!(
            "UPDATE {} SET {} WHERE id = ?{};",
            kind.table().table,
            assignments.join(", "),
            columns.len() + 1
        );
        let mut binds: Vec<Value> = columns.iter().map(|(_, value)| to_sql_value(value)).collect();
        binds.push(Value::Integer(id));

        self.write("entity_update", record, |tx| {
            let changed = tx.execute(&sql, params_from_iter(binds))?;
            if changed == 0 {
                return Err(RepoError::NotFound { kind, id });
            }
            Ok(id)
        })?;
        Ok(())
    }

    fn soft_delete(&self, record: &mut Record) -> RepoResult<()> {
        let previous = record.is_archived();
        record.set_archived(true);
        let result = self.update(record);
        match &result {
            Ok(()) => info!(
                "event=entity_soft_delete module=repo status=ok kind={} id={}",
                record.kind(),
                record.id().unwrap_or_default()
            ),
            Err(_) => {
                record.set_archived(previous);
                error!(
                    "event=entity_soft_delete module=repo status=error kind={}",
                    record.kind()
                );
            }
        }
        result
    }

    fn hard_delete(&self, record: &Record) -> RepoResult<()> {
        let kind = record.kind();
        let id = record
            .id()
            .ok_or_else(|| RepoError::InvalidData(format!("cannot delete an unsaved {kind}")))?;
        let sql = format!("DELETE FROM {} WHERE id = ?1;", kind.table().table);

        self.write("entity_hard_delete", record, |tx| {
            let changed = tx.execute(&sql, [id])?;
            if changed == 0 {
                return Err(RepoError::NotFound { kind, id });
            }
            Ok(id)
        })?;
        Ok(())
    }

    fn load_relation(&self, record: &mut Record, relation: &str) -> RepoResult<bool> {
        let kind = record.kind();
        let def = kind
            .table()
            .relation(relation)
            .ok_or_else(|| RepoError::UnknownField {
                kind,
                path: relation.to_string(),
            })?;

        let loaded = match def.link {
            RelationLink::Owning { column } => {
                match record.scalar(column).and_then(|value| value.as_i64()) {
                    Some(target_id) => self.fetch_one(
                        def.target,
                        "id",
                        target_id,
                        QueryOptions::with_archived(),
                    )?,
                    None => None,
                }
            }
            RelationLink::InverseOne { column } => match record.id() {
                Some(id) => self.fetch_one(def.target, column, id, QueryOptions::with_archived())?,
                None => None,
            },
            RelationLink::InverseMany { .. } => {
                return Err(RepoError::InvalidData(format!(
                    "{kind}.{relation} holds many records; use list_related"
                )));
            }
        };

        Ok(match loaded {
            Some(target) => {
                record.related_mut().insert(def.name, target);
                true
            }
            None => {
                record.related_mut().remove(def.name);
                false
            }
        })
    }

    fn list_related(
        &self,
        record: &Record,
        relation: &str,
        options: QueryOptions,
    ) -> RepoResult<Vec<Record>> {
        let kind = record.kind();
        let def = kind
            .table()
            .relation(relation)
            .ok_or_else(|| RepoError::UnknownField {
                kind,
                path: relation.to_string(),
            })?;

        match def.link {
            RelationLink::Owning { column } => {
                let target_id = record.scalar(column).and_then(|value| value.as_i64());
                match target_id {
                    Some(target_id) => Ok(self
                        .fetch_one(def.target, "id", target_id, QueryOptions::with_archived())?
                        .into_iter()
                        .collect()),
                    None => Ok(Vec::new()),
                }
            }
            RelationLink::InverseOne { column } | RelationLink::InverseMany { column } => {
                match record.id() {
                    Some(id) => self.filter(def.target, options, &Filters::new().eq(column, id)),
                    None => Ok(Vec::new()),
                }
            }
        }
    }
}
