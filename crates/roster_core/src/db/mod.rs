//! Roster database bootstrap.
//!
//! The roster keeps everything in one SQLite file: four entity tables
//! (`students`, `classes`, `teachers`, `subjects`) and two join tables
//! (`enrollments`, `teaching_assignments`) that hold the many-to-many
//! links. `open_db` is the only supported way to obtain a connection; it
//! turns on foreign keys, so deleting a student or class cascades into the
//! join tables, and migrates the file before handing it out.
//!
//! A file written by a newer build is refused with
//! `UnsupportedSchemaVersion` rather than opened read-write, since the
//! older binary cannot know what the extra tables or columns mean.

use std::error::Error;
use std::fmt::{Display, Formatter};

pub mod migrations;
mod open;

pub use open::{open_db, open_db_in_memory};

pub type DbResult<T> = Result<T, DbError>;

#[derive(Debug)]
pub enum DbError {
    Sqlite(rusqlite::Error),
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
                "roster schema version {db_version} is newer than supported {latest_supported}"
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
