//! Application store database: connection setup and the `applications`
//! schema.
//!
//! # Responsibility
//! - Open file-backed or in-memory connections with foreign keys and a busy
//!   timeout configured.
//! - Bring the `applications` table and its deadline, stage and country list
//!   indexes up to the latest embedded migration.
//!
//! # Invariants
//! - Schema version lives in `PRAGMA user_version`; pending migrations run
//!   in file order inside one transaction.
//! - A database stamped with a version newer than this build knows is
//!   rejected with [`DbError::UnsupportedSchemaVersion`] and left untouched.
//! - Repositories only receive connections returned by [`open_db`] or
//!   [`open_db_in_memory`].

use std::error::Error;
use std::fmt::{Display, Formatter};

pub mod migrations;
mod open;

pub use open::{open_db, open_db_in_memory};

pub type DbResult<T> = Result<T, DbError>;

#[derive(Debug)]
pub enum DbError {
    Sqlite(rusqlite::Error),
    /// The file was written by a newer build with an unknown schema.
    UnsupportedSchemaVersion {
        db_version: u32,
        latest_supported: u32,
    },
}

impl Display for DbError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Sqlite(err) => write!(f, "{err}"),
            Self::UnsupportedSchemaVersion {
                db_version,
                latest_supported,
            } => write!(
                f,
                "database schema version {db_version} is newer than supported {latest_supported}"
            ),
        }
    }
}

impl Error for DbError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Sqlite(err) => Some(err),
            Self::UnsupportedSchemaVersion { .. } => None,
        }
    }
}

impl From<rusqlite::Error> for DbError {
    fn from(value: rusqlite::Error) -> Self {
        Self::Sqlite(value)
    }
}
