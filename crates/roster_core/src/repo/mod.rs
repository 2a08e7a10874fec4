//! Repository layer abstractions and persistence implementations.
//!
//! # Responsibility
//! - Define use-case oriented data access contracts for entities and their
//!   associations.
//! - Isolate SQLite query details from service orchestration.
//!
//! # Invariants
//! - Repository writes validate records before persistence.
//! - Repository APIs return semantic errors (`NotFound`, `Duplicate`,
//!   `NotLinked`) in addition to DB transport errors.

pub mod entity_repo;
pub mod link_repo;
pub mod schema;
