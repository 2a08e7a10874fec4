//! Table mappings for roster records and join tables.
//!
//! # Responsibility
//! - Describe each entity kind once (table, columns, row codec) so the
//!   repository can run the same SQL shape for every kind.
//! - Describe each many-to-many association by its join table.
//!
//! # Invariants
//! - Every entity table has its primary key in a column named `id`, listed
//!   first in `COLUMNS`.
//! - `to_params()` yields owned values in `COLUMNS` order; derived columns
//!   such as `subjects.name_key` are computed there.
//! - `LINKS` names every join-table column referencing the entity, so that
//!   deleting the entity can clear them.

use crate::model::entity::{EntityKind, ValidationError};
use crate::model::records::{
    Class, ClassId, Student, StudentId, Subject, SubjectId, Teacher, TeacherId,
};
use rusqlite::types::{FromSql, ToSql, Value};
use rusqlite::Row;
use std::fmt::Display;

/// One join-table column pointing at an entity table.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LinkColumn {
    pub table: &'static str,
    pub column: &'static str,
}

/// Storage mapping for an entity kind.
pub trait Entity: Sized {
    type Id: ToSql + FromSql + Display + Clone;

    const KIND: EntityKind;
    const TABLE: &'static str;
    const COLUMNS: &'static [&'static str];
    const LINKS: &'static [LinkColumn];

    fn id(&self) -> &Self::Id;

    fn validate_record(&self) -> Result<(), ValidationError>;

    fn to_params(&self) -> Vec<Value>;

    fn from_row(row: &Row<'_>) -> rusqlite::Result<Self>;

    /// Label reported when an insert hits a uniqueness constraint that is
    /// not the primary key.
    fn conflict_label(&self) -> String {
        self.id().to_string()
    }
}

/// Many-to-many association stored in a join table keyed by
/// `(LEFT_COLUMN, RIGHT_COLUMN)`.
pub trait Association {
    type Left: Entity;
    type Right: Entity;

    const TABLE: &'static str;
    const LEFT_COLUMN: &'static str;
    const RIGHT_COLUMN: &'static str;
}

/// Student ↔ class membership.
#[derive(Debug, Clone, Copy)]
pub struct Enrollment;

/// Teacher ↔ class assignment.
#[derive(Debug, Clone, Copy)]
pub struct TeachingAssignment;

const ENROLLMENT_STUDENT: LinkColumn = LinkColumn {
    table: "enrollments",
    column: "student_id",
};
const ENROLLMENT_CLASS: LinkColumn = LinkColumn {
    table: "enrollments",
    column: "class_id",
};
const ASSIGNMENT_TEACHER: LinkColumn = LinkColumn {
    table: "teaching_assignments",
    column: "teacher_id",
};
const ASSIGNMENT_CLASS: LinkColumn = LinkColumn {
    table: "teaching_assignments",
    column: "class_id",
};

impl Association for Enrollment {
    type Left = Student;
    type Right = Class;

    const TABLE: &'static str = ENROLLMENT_STUDENT.table;
    const LEFT_COLUMN: &'static str = ENROLLMENT_STUDENT.column;
    const RIGHT_COLUMN: &'static str = ENROLLMENT_CLASS.column;
}

impl Association for TeachingAssignment {
    type Left = Teacher;
    type Right = Class;

    const TABLE: &'static str = ASSIGNMENT_TEACHER.table;
    const LEFT_COLUMN: &'static str = ASSIGNMENT_TEACHER.column;
    const RIGHT_COLUMN: &'static str = ASSIGNMENT_CLASS.column;
}

impl Entity for Student {
    type Id = StudentId;

    const KIND: EntityKind = EntityKind::Student;
    const TABLE: &'static str = "students";
    const COLUMNS: &'static [&'static str] = &["id", "name", "age"];
    const LINKS: &'static [LinkColumn] = &[ENROLLMENT_STUDENT];

    fn id(&self) -> &Self::Id {
        &self.id
    }

    fn validate_record(&self) -> Result<(), ValidationError> {
        self.validate()
    }

    fn to_params(&self) -> Vec<Value> {
        vec![
            Value::from(self.id.clone()),
            Value::from(self.name.clone()),
            Value::from(self.age),
        ]
    }

    fn from_row(row: &Row<'_>) -> rusqlite::Result<Self> {
        Ok(Self {
            id: row.get("id")?,
            name: row.get("name")?,
            age: row.get("age")?,
        })
    }
}

impl Entity for Class {
    type Id = ClassId;

    const KIND: EntityKind = EntityKind::Class;
    const TABLE: &'static str = "classes";
    const COLUMNS: &'static [&'static str] = &["id", "year", "section"];
    const LINKS: &'static [LinkColumn] = &[ENROLLMENT_CLASS, ASSIGNMENT_CLASS];

    fn id(&self) -> &Self::Id {
        &self.id
    }

    fn validate_record(&self) -> Result<(), ValidationError> {
        self.validate()
    }

    fn to_params(&self) -> Vec<Value> {
        vec![
            Value::from(self.id.clone()),
            Value::from(self.year.clone()),
            Value::from(self.section.clone()),
        ]
    }

    fn from_row(row: &Row<'_>) -> rusqlite::Result<Self> {
        Ok(Self {
            id: row.get("id")?,
            year: row.get("year")?,
            section: row.get("section")?,
        })
    }
}

impl Entity for Teacher {
    type Id = TeacherId;

    const KIND: EntityKind = EntityKind::Teacher;
    const TABLE: &'static str = "teachers";
    const COLUMNS: &'static [&'static str] = &["id", "name"];
    const LINKS: &'static [LinkColumn] = &[ASSIGNMENT_TEACHER];

    fn id(&self) -> &Self::Id {
        &self.id
    }

    fn validate_record(&self) -> Result<(), ValidationError> {
        self.validate()
    }

    fn to_params(&self) -> Vec<Value> {
        vec![Value::from(self.id), Value::from(self.name.clone())]
    }

    fn from_row(row: &Row<'_>) -> rusqlite::Result<Self> {
        Ok(Self {
            id: row.get("id")?,
            name: row.get("name")?,
        })
    }
}

impl Entity for Subject {
    type Id = SubjectId;

    const KIND: EntityKind = EntityKind::Subject;
    const TABLE: &'static str = "subjects";
    const COLUMNS: &'static [&'static str] = &["id", "name", "name_key"];
    const LINKS: &'static [LinkColumn] = &[];

    fn id(&self) -> &Self::Id {
        &self.id
    }

    fn validate_record(&self) -> Result<(), ValidationError> {
        self.validate()
    }

    fn to_params(&self) -> Vec<Value> {
        vec![
            Value::from(self.id),
            Value::from(self.name.clone()),
            Value::from(self.name_key()),
        ]
    }

    // `name_key` is derived on insert and never read back.
    fn from_row(row: &Row<'_>) -> rusqlite::Result<Self> {
        Ok(Self {
            id: row.get("id")?,
            name: row.get("name")?,
        })
    }

    // `subjects.name_key` carries its own UNIQUE constraint.
    fn conflict_label(&self) -> String {
        self.name.clone()
    }
}

/// Tables that must exist before a repository accepts a connection.
pub(crate) fn required_tables() -> [&'static str; 6] {
    [
        Student::TABLE,
        Class::TABLE,
        Teacher::TABLE,
        Subject::TABLE,
        Enrollment::TABLE,
        TeachingAssignment::TABLE,
    ]
}
