//! Core domain logic for the school roster.
//! This crate is the single source of truth for roster invariants: unique
//! entity ids, links only between existing entities, and cascading removal.

pub mod db;
pub mod logging;
pub mod model;
pub mod repo;
pub mod service;

pub use logging::{default_log_level, init_logging, logging_status, LoggingError};
pub use model::entity::{EntityKind, ValidationError, MAX_AGE};
pub use model::records::{
    Class, ClassId, Student, StudentId, Subject, SubjectId, Teacher, TeacherId,
};
pub use repo::entity_repo::{EntityRepository, RepoError, RepoResult, SqliteRosterRepository};
pub use repo::link_repo::{AssociationRepository, LinkOutcome};
pub use repo::schema::{Association, Enrollment, Entity, LinkColumn, TeachingAssignment};
pub use service::roster_service::{RosterService, RosterServiceError, ServiceResult};

/// Returns the core crate version.
pub fn core_version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}
