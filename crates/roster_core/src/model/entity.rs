//! Entity kinds and shared validation rules.

use serde::{Deserialize, Serialize};
use std::error::Error;
use std::fmt::{Display, Formatter};

/// Upper bound accepted for `Student::age`.
pub const MAX_AGE: i64 = 150;

/// Kind of record held by the entity store.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EntityKind {
    Student,
    Class,
    Teacher,
    Subject,
}

impl EntityKind {
    /// Stable lowercase label used in log events and messages.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Student => "student",
            Self::Class => "class",
            Self::Teacher => "teacher",
            Self::Subject => "subject",
        }
    }
}

impl Display for EntityKind {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Validation failure raised before a record reaches storage.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ValidationError {
    /// A required text field is empty after trimming.
    BlankField {
        kind: EntityKind,
        field: &'static str,
    },
    /// Integer ids must be non-negative.
    NegativeId { kind: EntityKind, id: i64 },
    /// Age outside `0..=MAX_AGE`.
    AgeOutOfRange(i64),
}

impl Display for ValidationError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::BlankField { kind, field } => write!(f, "{kind} {field} cannot be blank"),
            Self::NegativeId { kind, id } => {
                write!(f, "{kind} id must be non-negative, got {id}")
            }
            Self::AgeOutOfRange(age) => {
                write!(f, "age must be between 0 and {MAX_AGE}, got {age}")
            }
        }
    }
}

impl Error for ValidationError {}

pub(crate) fn require_text(
    kind: EntityKind,
    field: &'static str,
    value: &str,
) -> Result<(), ValidationError> {
    if value.trim().is_empty() {
        return Err(ValidationError::BlankField { kind, field });
    }
    Ok(())
}

pub(crate) fn require_non_negative(kind: EntityKind, id: i64) -> Result<(), ValidationError> {
    if id < 0 {
        return Err(ValidationError::NegativeId { kind, id });
    }
    Ok(())
}
