//! Entity repository contracts and SQLite implementation.
//!
//! # Responsibility
//! - Provide create/get/list/delete over every roster entity kind through a
//!   single generic implementation.
//! - Keep SQL details inside the core persistence boundary.
//!
//! # Invariants
//! - Write paths call `Entity::validate_record()` before SQL mutations.
//! - A second create with an existing id fails with `Duplicate`; it never
//!   overwrites or adds a row.
//! - Deleting an entity clears its join-table rows in the same transaction.
//! - Read paths reject invalid persisted rows instead of masking them.
//! - A roster table missing at query time surfaces as
//!   `MissingRequiredTable`, the same error `try_new` reports.

use crate::db::DbError;
use crate::model::entity::{EntityKind, ValidationError};
use crate::repo::schema::{required_tables, Entity};
use rusqlite::{
    ffi, params_from_iter, Connection, ErrorCode, Row, Transaction, TransactionBehavior,
};
use std::error::Error;
use std::fmt::{Display, Formatter};

pub type RepoResult<T> = Result<T, RepoError>;

/// Repository error for roster persistence and query operations.
#[derive(Debug)]
pub enum RepoError {
    Validation(ValidationError),
    Db(DbError),
    NotFound {
        kind: EntityKind,
        id: String,
    },
    Duplicate {
        kind: EntityKind,
        id: String,
    },
    /// Both entities exist but are not associated.
    NotLinked {
        left: EntityKind,
        left_id: String,
        right: EntityKind,
        right_id: String,
    },
    MissingRequiredTable(&'static str),
    InvalidData(String),
}

impl RepoError {
    pub(crate) fn not_found<E: Entity>(id: &E::Id) -> Self {
        Self::NotFound {
            kind: E::KIND,
            id: id.to_string(),
        }
    }
}

impl Display for RepoError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Validation(err) => write!(f, "{err}"),
            Self::Db(err) => write!(f, "{err}"),
            Self::NotFound { kind, id } => write!(f, "{kind} not found: {id}"),
            Self::Duplicate { kind, id } => write!(f, "{kind} already exists: {id}"),
            Self::NotLinked {
                left,
                left_id,
                right,
                right_id,
            } => write!(f, "{left} {left_id} is not linked to {right} {right_id}"),
            Self::MissingRequiredTable(table) => {
                write!(f, "missing required table `{table}`")
            }
            Self::InvalidData(message) => write!(f, "invalid persisted roster data: {message}"),
        }
    }
}

impl Error for RepoError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Validation(err) => Some(err),
            Self::Db(err) => Some(err),
            _ => None,
        }
    }
}

impl From<ValidationError> for RepoError {
    fn from(value: ValidationError) -> Self {
        Self::Validation(value)
    }
}

impl From<DbError> for RepoError {
    fn from(value: DbError) -> Self {
        Self::Db(value)
    }
}

impl From<rusqlite::Error> for RepoError {
    fn from(value: rusqlite::Error) -> Self {
        match missing_table(&value) {
            Some(table) => Self::MissingRequiredTable(table),
            None => Self::Db(DbError::Sqlite(value)),
        }
    }
}

/// Resolves a `no such table: <name>` failure to the roster table it names.
///
/// Tables outside the roster schema are left as plain DB errors.
fn missing_table(err: &rusqlite::Error) -> Option<&'static str> {
    // Statement preparation reports token-anchored errors as `SqlInputError`.
    let message = match err {
        rusqlite::Error::SqliteFailure(_, Some(message)) => message,
        rusqlite::Error::SqlInputError { msg, .. } => msg,
        _ => return None,
    };
    let name = message.strip_prefix("no such table: ")?.trim();
    let name = name.strip_prefix("main.").unwrap_or(name);
    required_tables().into_iter().find(|table| *table == name)
}

/// Repository interface for entity CRUD operations.
pub trait EntityRepository {
    /// Inserts a new entity. Fails with `Duplicate` when the id is taken.
    fn create<E: Entity>(&self, entity: &E) -> RepoResult<()>;
    fn get<E: Entity>(&self, id: &E::Id) -> RepoResult<Option<E>>;
    /// Lists every entity of kind `E`, ordered by id.
    fn list<E: Entity>(&self) -> RepoResult<Vec<E>>;
    /// Deletes one entity together with all of its links.
    fn delete<E: Entity>(&self, id: &E::Id) -> RepoResult<()>;
    /// Inserts an entity under the next free integer id: one past the
    /// highest stored id, or 1 for an empty table. `build` receives that id.
    fn create_with_next_id<E, F>(&self, build: F) -> RepoResult<E>
    where
        E: Entity<Id = i64>,
        F: FnOnce(i64) -> Result<E, ValidationError>;
}

/// SQLite-backed roster repository.
///
/// Borrows one open connection; every call is its own unit of work and is
/// committed before returning.
pub struct SqliteRosterRepository<'conn> {
    pub(crate) conn: &'conn Connection,
}

impl<'conn> SqliteRosterRepository<'conn> {
    /// Constructs a repository from a migrated connection.
    ///
    /// Fails with `MissingRequiredTable` when the roster schema is absent,
    /// e.g. for a raw connection that never went through `open_db`.
    pub fn try_new(conn: &'conn Connection) -> RepoResult<Self> {
        ensure_roster_connection_ready(conn)?;
        Ok(Self { conn })
    }

    pub(crate) fn begin(&self) -> RepoResult<Transaction<'conn>> {
        Ok(Transaction::new_unchecked(
            self.conn,
            TransactionBehavior::Immediate,
        )?)
    }
}

impl EntityRepository for SqliteRosterRepository<'_> {
    fn create<E: Entity>(&self, entity: &E) -> RepoResult<()> {
        entity.validate_record()?;

        let tx = self.begin()?;
        insert_in_tx(&tx, entity)?;
        tx.commit()?;
        Ok(())
    }

    fn get<E: Entity>(&self, id: &E::Id) -> RepoResult<Option<E>> {
        let mut stmt = self.conn.prepare(&format!(
            "SELECT {} FROM {} WHERE id = ?1;",
            E::COLUMNS.join(", "),
            E::TABLE
        ))?;

        let mut rows = stmt.query([id])?;
        if let Some(row) = rows.next()? {
            return Ok(Some(decode_row::<E>(row)?));
        }

        Ok(None)
    }

    fn list<E: Entity>(&self) -> RepoResult<Vec<E>> {
        let mut stmt = self.conn.prepare(&format!(
            "SELECT {} FROM {} ORDER BY id ASC;",
            E::COLUMNS.join(", "),
            E::TABLE
        ))?;

        let mut rows = stmt.query([])?;
        let mut entities = Vec::new();
        while let Some(row) = rows.next()? {
            entities.push(decode_row::<E>(row)?);
        }

        Ok(entities)
    }

    fn delete<E: Entity>(&self, id: &E::Id) -> RepoResult<()> {
        let tx = self.begin()?;

        for link in E::LINKS {
            tx.execute(
                &format!("DELETE FROM {} WHERE {} = ?1;", link.table, link.column),
                [id],
            )?;
        }

        let changed = tx.execute(&format!("DELETE FROM {} WHERE id = ?1;", E::TABLE), [id])?;
        if changed == 0 {
            // Dropping `tx` rolls back the (empty) link deletes.
            return Err(RepoError::not_found::<E>(id));
        }

        tx.commit()?;
        Ok(())
    }

    fn create_with_next_id<E, F>(&self, build: F) -> RepoResult<E>
    where
        E: Entity<Id = i64>,
        F: FnOnce(i64) -> Result<E, ValidationError>,
    {
        let tx = self.begin()?;
        let next_id: i64 = tx.query_row(
            &format!("SELECT COALESCE(MAX(id), 0) + 1 FROM {};", E::TABLE),
            [],
            |row| row.get(0),
        )?;

        let entity = build(next_id)?;
        entity.validate_record()?;
        insert_in_tx(&tx, &entity)?;
        tx.commit()?;
        Ok(entity)
    }
}

fn insert_in_tx<E: Entity>(tx: &Transaction<'_>, entity: &E) -> RepoResult<()> {
    if entity_exists::<E>(tx, entity.id())? {
        return Err(RepoError::Duplicate {
            kind: E::KIND,
            id: entity.id().to_string(),
        });
    }

    let placeholders = vec!["?"; E::COLUMNS.len()].join(", ");
    let sql = format!(
        "INSERT INTO {} ({}) VALUES ({placeholders});",
        E::TABLE,
        E::COLUMNS.join(", ")
    );
    match tx.execute(&sql, params_from_iter(entity.to_params())) {
        Ok(_) => Ok(()),
        Err(err) if is_uniqueness_violation(&err) => Err(RepoError::Duplicate {
            kind: E::KIND,
            id: entity.conflict_label(),
        }),
        Err(err) => Err(err.into()),
    }
}

/// Decodes one row and re-validates it against model rules.
pub(crate) fn decode_row<E: Entity>(row: &Row<'_>) -> RepoResult<E> {
    let entity = E::from_row(row)?;
    entity.validate_record().map_err(|err| {
        RepoError::InvalidData(format!(
            "invalid {} row `{}` in {}: {err}",
            E::KIND,
            entity.id(),
            E::TABLE
        ))
    })?;
    Ok(entity)
}

pub(crate) fn entity_exists<E: Entity>(conn: &Connection, id: &E::Id) -> RepoResult<bool> {
    let exists: i64 = conn.query_row(
        &format!("SELECT EXISTS(SELECT 1 FROM {} WHERE id = ?1);", E::TABLE),
        [id],
        |row| row.get(0),
    )?;
    Ok(exists == 1)
}

/// True only for primary-key and UNIQUE conflicts; CHECK, NOT NULL, foreign
/// key and trigger aborts stay DB errors.
fn is_uniqueness_violation(err: &rusqlite::Error) -> bool {
    matches!(
        err,
        rusqlite::Error::SqliteFailure(failure, _)
            if failure.code == ErrorCode::ConstraintViolation
                && matches!(
                    failure.extended_code,
                    ffi::SQLITE_CONSTRAINT_PRIMARYKEY | ffi::SQLITE_CONSTRAINT_UNIQUE
                )
    )
}

fn ensure_roster_connection_ready(conn: &Connection) -> RepoResult<()> {
    for table in required_tables() {
        if !table_exists(conn, table)? {
            return Err(RepoError::MissingRequiredTable(table));
        }
    }
    Ok(())
}

fn table_exists(conn: &Connection, table: &str) -> RepoResult<bool> {
    let exists: i64 = conn.query_row(
        "SELECT EXISTS(
            SELECT 1
            FROM sqlite_master
            WHERE type = 'table' AND name = ?1
        );",
        [table],
        |row| row.get(0),
    )?;
    Ok(exists == 1)
}
