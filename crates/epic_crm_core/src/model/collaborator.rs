//! Collaborator record and credential helpers.

use crate::model::record::{FieldEdit, RecordError, Related};
use crate::model::value::FieldValue;
use crate::model::{Actor, RecordId, Role};
use argon2::Argon2;
use password_hash::rand_core::OsRng;
use password_hash::{PasswordHash, PasswordHasher, PasswordVerifier, SaltString};

/// Longest accepted plain-text password.
pub const MAX_PASSWORD_CHARS: usize = 72;

/// Company staff member; also the authenticated identity.
#[derive(Debug, Clone, PartialEq)]
pub struct Collaborator {
    pub id: Option<RecordId>,
    /// Unique.
    pub full_name: String,
    /// argon2 PHC string, never the plain password.
    pub password: String,
    /// Unique.
    pub email: String,
    pub role: Role,
    pub archived: bool,
    pub related: Related,
}

impl Collaborator {
    pub fn new(
        full_name: impl Into<String>,
        email: impl Into<String>,
        role: Role,
        password_hash: impl Into<String>,
    ) -> Self {
        Self {
            id: None,
            full_name: full_name.into(),
            password: password_hash.into(),
            email: email.into(),
            role,
            archived: false,
            related: Related::new(),
        }
    }

    /// Identity used by access checks; `None` for unsaved rows.
    pub fn actor(&self) -> Option<Actor> {
        self.id.map(|id| Actor::new(id, self.role))
    }

    /// Verifies `raw_password` against the stored hash.
    pub fn check_password(&self, raw_password: &str) -> bool {
        verify_password(raw_password, &self.password)
    }

    pub(crate) fn scalar(&self, name: &str) -> Option<FieldValue> {
        let value = match name {
            "full_name" => self.full_name.as_str().into(),
            "password" => self.password.as_str().into(),
            "email" => self.email.as_str().into(),
            "role" => self.role.as_str().into(),
            "archived" => self.archived.into(),
            _ => return None,
        };
        Some(value)
    }

    pub(crate) fn set_field(&mut self, edit: &mut FieldEdit<'_>) -> Result<(), RecordError> {
        match edit.name {
            "full_name" => self.full_name = edit.text()?,
            "password" => self.password = edit.text()?,
            "email" => self.email = edit.text()?,
            "role" => {
                let text = edit.text()?;
                self.role = Role::parse(&text).ok_or_else(|| edit.mismatch("a role name"))?;
            }
            "archived" => self.archived = edit.boolean()?,
            _ => return Err(edit.unknown()),
        }
        Ok(())
    }
}

/// Hashes a plain password with argon2id and a random salt.
pub fn hash_password(password: &str) -> Result<String, String> {
    let salt = SaltString::generate(&mut OsRng);
    Argon2::default()
        .hash_password(password.as_bytes(), &salt)
        .map(|hash| hash.to_string())
        .map_err(|err| err.to_string())
}

/// Verifies a password against an argon2 PHC string. Malformed hashes never match.
pub fn verify_password(password: &str, hash: &str) -> bool {
    match PasswordHash::new(hash) {
        Ok(parsed) => Argon2::default()
            .verify_password(password.as_bytes(), &parsed)
            .is_ok(),
        Err(_) => false,
    }
}

#[cfg(test)]
mod tests {
    use super::{hash_password, verify_password, Collaborator};
    use crate::model::{Actor, Role};

    #[test]
    fn hash_roundtrip_and_rejects_wrong_password() {
        let hash = hash_password("s3cret").expect("hashing should succeed");
        assert_ne!(hash, "s3cret");
        assert!(verify_password("s3cret", &hash));
        assert!(!verify_password("other", &hash));
    }

    #[test]
    fn malformed_hash_never_matches() {
        let collaborator = Collaborator::new("Ann Lee", "ann@corp.test", Role::Support, "plain");
        assert!(!collaborator.check_password("plain"));
    }

    #[test]
    fn unsaved_collaborator_has_no_actor() {
        let mut collaborator =
            Collaborator::new("Ann Lee", "ann@corp.test", Role::Support, "x");
        assert_eq!(collaborator.actor(), None);
        collaborator.id = Some(4);
        assert_eq!(collaborator.actor(), Some(Actor::new(4, Role::Support)));
    }
}
