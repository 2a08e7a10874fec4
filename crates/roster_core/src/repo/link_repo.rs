//! Association (join-table) repository contracts and SQLite implementation.
//!
//! # Responsibility
//! - Link, unlink and traverse many-to-many associations between entities.
//!
//! # Invariants
//! - A link row is written only when both referenced entities exist; a
//!   missing endpoint yields `NotFound` and leaves the join table untouched.
//! - Each `(left, right)` pair is stored at most once.
//! - Traversal from a missing anchor entity is `NotFound`; from an existing
//!   entity with no links it is an empty list.

use crate::repo::entity_repo::{
    decode_row, entity_exists, RepoError, RepoResult, SqliteRosterRepository,
};
use crate::repo::schema::{Association, Entity};
use rusqlite::{params, Connection, ToSql};

/// Result of a link request on an existing pair of entities.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LinkOutcome {
    /// A new join row was stored.
    Linked,
    /// The pair was already linked; nothing changed.
    AlreadyLinked,
}

type LeftId<A> = <<A as Association>::Left as Entity>::Id;
type RightId<A> = <<A as Association>::Right as Entity>::Id;

/// Repository interface for many-to-many associations.
pub trait AssociationRepository {
    fn link<A: Association>(&self, left: &LeftId<A>, right: &RightId<A>)
        -> RepoResult<LinkOutcome>;
    fn unlink<A: Association>(&self, left: &LeftId<A>, right: &RightId<A>) -> RepoResult<()>;
    /// Right-hand entities linked to `left`, ordered by id.
    fn list_rights<A: Association>(&self, left: &LeftId<A>) -> RepoResult<Vec<A::Right>>;
    /// Left-hand entities linked to `right`, ordered by id.
    fn list_lefts<A: Association>(&self, right: &RightId<A>) -> RepoResult<Vec<A::Left>>;
}

impl AssociationRepository for SqliteRosterRepository<'_> {
    fn link<A: Association>(
        &self,
        left: &LeftId<A>,
        right: &RightId<A>,
    ) -> RepoResult<LinkOutcome> {
        let tx = self.begin()?;
        ensure_exists::<A::Left>(&tx, left)?;
        ensure_exists::<A::Right>(&tx, right)?;

        let changed = tx.execute(
            &format!(
                "INSERT OR IGNORE INTO {} ({}, {}) VALUES (?1, ?2);",
                A::TABLE,
                A::LEFT_COLUMN,
                A::RIGHT_COLUMN
            ),
            params![left, right],
        )?;
        tx.commit()?;

        Ok(if changed == 0 {
            LinkOutcome::AlreadyLinked
        } else {
            LinkOutcome::Linked
        })
    }

    fn unlink<A: Association>(&self, left: &LeftId<A>, right: &RightId<A>) -> RepoResult<()> {
        let tx = self.begin()?;
        ensure_exists::<A::Left>(&tx, left)?;
        ensure_exists::<A::Right>(&tx, right)?;

        let changed = tx.execute(
            &format!(
                "DELETE FROM {} WHERE {} = ?1 AND {} = ?2;",
                A::TABLE,
                A::LEFT_COLUMN,
                A::RIGHT_COLUMN
            ),
            params![left, right],
        )?;
        if changed == 0 {
            return Err(RepoError::NotLinked {
                left: <A::Left as Entity>::KIND,
                left_id: left.to_string(),
                right: <A::Right as Entity>::KIND,
                right_id: right.to_string(),
            });
        }

        tx.commit()?;
        Ok(())
    }

    fn list_rights<A: Association>(&self, left: &LeftId<A>) -> RepoResult<Vec<A::Right>> {
        ensure_exists::<A::Left>(self.conn, left)?;
        list_joined::<A::Right, _>(self.conn, A::TABLE, A::RIGHT_COLUMN, A::LEFT_COLUMN, left)
    }

    fn list_lefts<A: Association>(&self, right: &RightId<A>) -> RepoResult<Vec<A::Left>> {
        ensure_exists::<A::Right>(self.conn, right)?;
        list_joined::<A::Left, _>(self.conn, A::TABLE, A::LEFT_COLUMN, A::RIGHT_COLUMN, right)
    }
}

fn ensure_exists<E: Entity>(conn: &Connection, id: &E::Id) -> RepoResult<()> {
    if entity_exists::<E>(conn, id)? {
        Ok(())
    } else {
        Err(RepoError::not_found::<E>(id))
    }
}

/// Selects `E` rows joined through `link_table`, where `target_column`
/// references `E` and `anchor_column` equals `anchor`.
fn list_joined<E: Entity, I: ToSql>(
    conn: &Connection,
    link_table: &str,
    target_column: &str,
    anchor_column: &str,
    anchor: &I,
) -> RepoResult<Vec<E>> {
    let columns = E::COLUMNS
        .iter()
        .map(|column| format!("e.{column} AS {column}"))
        .collect::<Vec<_>>()
        .join(", ");
    let mut stmt = conn.prepare(&format!(
        "SELECT {columns}
         FROM {table} e
         INNER JOIN {link_table} l ON l.{target_column} = e.id
         WHERE l.{anchor_column} = ?1
         ORDER BY e.id ASC;",
        table = E::TABLE,
    ))?;

    let mut rows = stmt.query([anchor])?;
    let mut entities = Vec::new();
    while let Some(row) = rows.next()? {
        entities.push(decode_row::<E>(row)?);
    }
    Ok(entities)
}
