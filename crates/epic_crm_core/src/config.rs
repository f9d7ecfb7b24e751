//! Core runtime configuration.
//!
//! # Responsibility
//! - Select the database file (named profile or explicit path).
//! - Carry logging bootstrap settings and the default archive visibility.
//!
//! # Invariants
//! - Archive visibility is an explicit per-call value (`QueryOptions`), never
//!   process-global state.

use crate::logging::default_log_level;
use serde::Deserialize;
use std::error::Error;
use std::fmt::{Display, Formatter};
use std::path::{Path, PathBuf};

/// Named database files shipped with the application.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DatabaseProfile {
    #[default]
    Main,
    Demo,
    Test,
}

impl DatabaseProfile {
    pub fn file_name(self) -> &'static str {
        match self {
            Self::Main => "epic_events.db",
            Self::Demo => "demo_epic_event.db",
            Self::Test => "test_epic_event.db",
        }
    }

    pub fn parse(value: &str) -> Option<Self> {
        match value.trim().to_ascii_lowercase().as_str() {
            "main" => Some(Self::Main),
            "demo" => Some(Self::Demo),
            "test" => Some(Self::Test),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Default, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct CoreConfig {
    pub database: DatabaseProfile,
    /// Overrides `database` when set.
    pub database_path: Option<PathBuf>,
    pub log_level: Option<String>,
    pub log_dir: Option<PathBuf>,
    pub show_archived: bool,
}

impl CoreConfig {
    /// Parses a JSON configuration document. Missing keys take defaults.
    pub fn from_json_str(raw: &str) -> Result<Self, ConfigError> {
        serde_json::from_str(raw).map_err(ConfigError::Parse)
    }

    /// Reads and parses a JSON configuration file.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let raw = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_json_str(&raw)
    }

    /// Database file to open.
    pub fn database_file(&self) -> PathBuf {
        self.database_path
            .clone()
            .unwrap_or_else(|| PathBuf::from(self.database.file_name()))
    }

    /// Configured level, or the build-mode default.
    pub fn effective_log_level(&self) -> &str {
        self.log_level.as_deref().unwrap_or(default_log_level())
    }

    /// Initial query options for a new session.
    pub fn query_options(&self) -> QueryOptions {
        QueryOptions {
            include_archived: self.show_archived,
        }
    }
}

/// Per-call read options threaded through repository queries.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct QueryOptions {
    /// Return archived rows as well.
    pub include_archived: bool,
}

impl QueryOptions {
    pub fn active_only() -> Self {
        Self {
            include_archived: false,
        }
    }

    pub fn with_archived() -> Self {
        Self {
            include_archived: true,
        }
    }

    /// Flips archive visibility (the "show archived" toggle).
    pub fn toggled(self) -> Self {
        Self {
            include_archived: !self.include_archived,
        }
    }
}

#[derive(Debug)]
pub enum ConfigError {
    Io {
        path: PathBuf,
        source: std::io::Error,
    },
    Parse(serde_json::Error),
}

impl Display for ConfigError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Io { path, source } => {
                write!(f, "failed to read config `{}`: {source}", path.display())
            }
            Self::Parse(err) => write!(f, "invalid config: {err}"),
        }
    }
}

impl Error for ConfigError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Io { source, .. } => Some(source),
            Self::Parse(err) => Some(err),
        }
    }
}
