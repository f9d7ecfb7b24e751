//! Entity use-case service.
//!
//! # Responsibility
//! - Run the create, edit, delete and sign-in flows for every record kind.
//! - Combine field visibility, validation and permission checks before
//!   handing records to the repository.
//!
//! # Invariants
//! - No write reaches the repository without a permission check.
//! - Every value stored through this service went through its validator.

use crate::access::{
    allowed_actions, authorized, editable_fields, fields, record_scope, Action, FieldDescriptor,
};
use crate::config::QueryOptions;
use crate::model::collaborator::{hash_password, Collaborator};
use crate::model::record::Record;
use crate::model::schema::RelationLink;
use crate::model::value::FieldValue;
use crate::model::{Actor, EntityKind, Purpose, RecordId, Role, BOOTSTRAP_ADMIN_ID};
use crate::repo::{EntityRepository, Filters, RepoError, SqliteEntityRepository};
use crate::service::builder::build_record;
use crate::service::{ServiceError, ServiceResult};
use crate::validation::{validate, FormData, ValidationContext, ValidationError};
use log::{info, warn};
use rusqlite::{Connection, OptionalExtension};

/// What `delete` did to the record.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DeleteOutcome {
    /// Row removed from storage (administrators).
    Removed,
    /// Row kept with `archived` set.
    Archived,
}

/// Use-case service bound to one storage session.
pub struct EntityService<'conn> {
    conn: &'conn Connection,
    repo: SqliteEntityRepository<'conn>,
}

impl<'conn> EntityService<'conn> {
    pub fn new(conn: &'conn Connection) -> Self {
        Self {
            conn,
            repo: SqliteEntityRepository::new(conn),
        }
    }

    /// Repository used by this service, for raw filter/order queries.
    pub fn repo(&self) -> &SqliteEntityRepository<'conn> {
        &self.repo
    }

    pub fn fields(
        &self,
        actor: &Actor,
        kind: EntityKind,
        purpose: Purpose,
    ) -> Vec<FieldDescriptor> {
        fields(kind, actor.role, purpose)
    }

    pub fn actions(&self, actor: &Actor, kind: EntityKind) -> &'static [Action] {
        allowed_actions(kind, actor.role)
    }

    /// Fills fields the actor is never prompted for.
    ///
    /// A commercial creating a client becomes its owner.
    pub fn prefill(&self, actor: &Actor, kind: EntityKind, form: &mut FormData) {
        if kind == EntityKind::Client && actor.role == Role::Commercial {
            form.insert("id_commercial".to_string(), FieldValue::Integer(actor.id));
        }
    }

    /// Validates one field of `form` on behalf of `actor`.
    pub fn validate_field(
        &self,
        actor: &Actor,
        kind: EntityKind,
        field: &FieldDescriptor,
        form: &FormData,
    ) -> Result<FieldValue, ValidationError> {
        let ctx = ValidationContext::new(self.conn, actor, form);
        validate(kind, field, &ctx)
    }

    /// Validates `form` field by field, builds the record and persists it.
    ///
    /// # Contract
    /// - Roles without create fields for `kind` get `PermissionDenied`.
    /// - Keys outside the role's create fields are dropped before validation.
    /// - Fields absent from `form` are not validated; mandatory ones are then
    ///   reported together as `MissingFields`.
    /// - Each normalized value replaces the raw one before later fields are
    ///   validated, so peer checks see typed values.
    pub fn create(
        &self,
        actor: &Actor,
        kind: EntityKind,
        mut form: FormData,
    ) -> ServiceResult<Record> {
        let descriptors = fields(kind, actor.role, Purpose::Create);
        if descriptors.is_empty() {
            return Err(deny(actor, Action::Create, kind, None));
        }

        self.prefill(actor, kind, &mut form);
        form.retain(|name, _| {
            descriptors
                .iter()
                .any(|descriptor| descriptor.name == name.as_str())
        });
        for descriptor in &descriptors {
            if !form.contains_key(descriptor.name) {
                continue;
            }
            let value = self.validate_field(actor, kind, descriptor, &form)?;
            form.insert(descriptor.name.to_string(), value);
        }

        let mut record = build_record(kind, &form)?;
        self.repo.create(&mut record)?;
        Ok(record)
    }

    /// Records of `kind` in the default scope of `actor` for `purpose`.
    pub fn list(
        &self,
        actor: &Actor,
        kind: EntityKind,
        purpose: Purpose,
        options: QueryOptions,
    ) -> ServiceResult<Vec<Record>> {
        let scope = record_scope(actor, kind, purpose);
        Ok(self.repo.filter(kind, options, &scope)?)
    }

    /// `list` narrowed by additional filters; caller filters win on conflict.
    pub fn search(
        &self,
        actor: &Actor,
        kind: EntityKind,
        options: QueryOptions,
        filters: &Filters,
    ) -> ServiceResult<Vec<Record>> {
        let mut scope = record_scope(actor, kind, Purpose::List);
        for (path, value) in filters.iter() {
            scope.insert(path, value.clone());
        }
        Ok(self.repo.filter(kind, options, &scope)?)
    }

    /// One record with every single-valued relation loaded.
    pub fn details(
        &self,
        kind: EntityKind,
        id: RecordId,
        options: QueryOptions,
    ) -> ServiceResult<Record> {
        let mut record = self.repo.get(kind, id, options)?;
        self.load_relations(&mut record)?;
        Ok(record)
    }

    /// Loads owning and one-to-one relations onto `record`.
    pub fn load_relations(&self, record: &mut Record) -> ServiceResult<()> {
        for relation in record.kind().table().relations {
            if !matches!(relation.link, RelationLink::InverseMany { .. }) {
                self.repo.load_relation(record, relation.name)?;
            }
        }
        Ok(())
    }

    /// Validates `raw` for `field` and applies it to `record` in memory.
    ///
    /// The edit is not persisted until `save_changes`. Returns the stored
    /// (normalized) value.
    pub fn apply_edit(
        &self,
        actor: &Actor,
        record: &mut Record,
        field: &str,
        raw: FieldValue,
    ) -> ServiceResult<FieldValue> {
        let kind = record.kind();
        let action = if field == "password" {
            Action::Password
        } else {
            Action::Update
        };
        if !authorized(actor, action, record) {
            return Err(deny(actor, action, kind, record.id()));
        }
        let Some(descriptor) = editable_fields(actor, record)
            .into_iter()
            .find(|descriptor| descriptor.name == field)
        else {
            return Err(deny(actor, action, kind, record.id()));
        };

        let mut form: FormData = record
            .columns()
            .into_iter()
            .map(|(name, value)| (name.to_string(), value))
            .collect();
        form.insert(field.to_string(), raw);

        let value = self.validate_field(actor, kind, &descriptor, &form)?;
        record.set_field(field, value.clone())?;
        Ok(value)
    }

    /// Commits the in-memory edits of `record`.
    pub fn save_changes(&self, actor: &Actor, record: &Record) -> ServiceResult<()> {
        if !authorized(actor, Action::Update, record) {
            return Err(deny(actor, Action::Update, record.kind(), record.id()));
        }
        Ok(self.repo.update(record)?)
    }

    /// Drops uncommitted edits by re-reading `record`.
    pub fn discard_changes(&self, record: &mut Record) -> ServiceResult<()> {
        Ok(self.repo.refresh(record)?)
    }

    /// Administrators remove the row; everyone else archives it.
    pub fn delete(&self, actor: &Actor, record: &mut Record) -> ServiceResult<DeleteOutcome> {
        if !authorized(actor, Action::Delete, record) {
            return Err(deny(actor, Action::Delete, record.kind(), record.id()));
        }
        if actor.role.is_admin() {
            self.repo.hard_delete(record)?;
            Ok(DeleteOutcome::Removed)
        } else {
            self.repo.soft_delete(record)?;
            Ok(DeleteOutcome::Archived)
        }
    }

    /// Active collaborator named `full_name` whose password matches.
    pub fn authenticate(
        &self,
        full_name: &str,
        password: &str,
    ) -> ServiceResult<Option<Collaborator>> {
        let id: Option<RecordId> = self
            .conn
            .query_row(
                "SELECT id FROM collaborators WHERE full_name = ?1 AND archived = 0;",
                [full_name],
                |row| row.get(0),
            )
            .optional()
            .map_err(RepoError::from)?;

        let found = match id {
            Some(id) => {
                let record =
                    self.repo
                        .get(EntityKind::Collaborator, id, QueryOptions::active_only())?;
                match record {
                    Record::Collaborator(collaborator) if collaborator.check_password(password) => {
                        Some(collaborator)
                    }
                    _ => None,
                }
            }
            None => None,
        };

        match &found {
            Some(collaborator) => info!(
                "event=authenticate module=service status=ok id={} role={}",
                collaborator.id.unwrap_or_default(),
                collaborator.role
            ),
            None => warn!("event=authenticate module=service status=error"),
        }
        Ok(found)
    }

    /// Creates the bootstrap administrator when it does not exist yet.
    ///
    /// Returns `true` when a row was inserted.
    pub fn ensure_bootstrap_admin(
        &self,
        full_name: &str,
        email: &str,
        password: &str,
    ) -> ServiceResult<bool> {
        match self
            .repo
            .get(EntityKind::Collaborator, BOOTSTRAP_ADMIN_ID, QueryOptions::with_archived())
        {
            Ok(_) => return Ok(false),
            Err(RepoError::NotFound { .. }) => {}
            Err(err) => return Err(err.into()),
        }

        let hash = hash_password(password).map_err(|message| ValidationError {
            field: "password".to_string(),
            message,
        })?;
        let mut admin = Collaborator::new(full_name, email, Role::Admin, hash);
        admin.id = Some(BOOTSTRAP_ADMIN_ID);
        let mut record = Record::from(admin);
        self.repo.create(&mut record)?;
        Ok(true)
    }
}

fn deny(actor: &Actor, action: Action, kind: EntityKind, id: Option<RecordId>) -> ServiceError {
    warn!(
        "event=permission_denied module=service status=error actor={} role={} action={} kind={} id={}",
        actor.id,
        actor.role,
        action.as_str(),
        kind,
        id.map_or_else(|| "none".to_string(), |id| id.to_string())
    );
    ServiceError::PermissionDenied { action, kind, id }
}
