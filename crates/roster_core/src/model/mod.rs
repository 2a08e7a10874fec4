//! Roster domain model.
//!
//! # Responsibility
//! - Define the records stored by the roster (students, classes, teachers,
//!   subjects) and the validation rules applied before persistence.
//!
//! # Invariants
//! - Every record has an id unique per kind. Students, classes and teachers
//!   bring their own; subjects are numbered by the store.
//! - Text fields are trimmed on construction and never blank.

pub mod entity;
pub mod records;
