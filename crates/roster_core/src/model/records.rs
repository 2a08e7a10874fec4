//! Stored roster records.
//!
//! Constructors trim their text inputs and validate; `validate()` is also
//! called by the repository before every write, so records built by hand or
//! deserialized from elsewhere are checked too.

use crate::model::entity::{
    require_non_negative, require_text, EntityKind, ValidationError, MAX_AGE,
};
use serde::{Deserialize, Serialize};
use std::fmt::{Display, Formatter};

/// Student identifier (school registration code, e.g. `"001"`).
pub type StudentId = String;
/// Class identifier (e.g. `"7A"`).
pub type ClassId = String;
/// Teacher registration number.
pub type TeacherId = i64;
/// Subject number.
pub type SubjectId = i64;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Student {
    pub id: StudentId,
    pub name: String,
    pub age: i64,
}

impl Student {
    pub fn new(
        id: impl Into<String>,
        name: impl Into<String>,
        age: i64,
    ) -> Result<Self, ValidationError> {
        let student = Self {
            id: trimmed(id),
            name: trimmed(name),
            age,
        };
        student.validate()?;
        Ok(student)
    }

    pub fn validate(&self) -> Result<(), ValidationError> {
        require_text(EntityKind::Student, "id", &self.id)?;
        require_text(EntityKind::Student, "name", &self.name)?;
        if !(0..=MAX_AGE).contains(&self.age) {
            return Err(ValidationError::AgeOutOfRange(self.age));
        }
        Ok(())
    }
}

impl Display for Student {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} (id: {}, age: {})", self.name, self.id, self.age)
    }
}

/// A school class: one year/section pair, e.g. year `7` section `A`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Class {
    pub id: ClassId,
    pub year: String,
    pub section: String,
}

impl Class {
    pub fn new(
        id: impl Into<String>,
        year: impl Into<String>,
        section: impl Into<String>,
    ) -> Result<Self, ValidationError> {
        let class = Self {
            id: trimmed(id),
            year: trimmed(year),
            section: trimmed(section),
        };
        class.validate()?;
        Ok(class)
    }

    pub fn validate(&self) -> Result<(), ValidationError> {
        require_text(EntityKind::Class, "id", &self.id)?;
        require_text(EntityKind::Class, "year", &self.year)?;
        require_text(EntityKind::Class, "section", &self.section)
    }
}

impl Display for Class {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} (year: {}, section: {})", self.id, self.year, self.section)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Teacher {
    pub id: TeacherId,
    pub name: String,
}

impl Teacher {
    pub fn new(id: TeacherId, name: impl Into<String>) -> Result<Self, ValidationError> {
        let teacher = Self {
            id,
            name: trimmed(name),
        };
        teacher.validate()?;
        Ok(teacher)
    }

    pub fn validate(&self) -> Result<(), ValidationError> {
        require_non_negative(EntityKind::Teacher, self.id)?;
        require_text(EntityKind::Teacher, "name", &self.name)
    }
}

impl Display for Teacher {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} (id: {})", self.name, self.id)
    }
}

/// Taught subject. Names are unique regardless of case.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Subject {
    pub id: SubjectId,
    pub name: String,
}

impl Subject {
    pub fn new(id: SubjectId, name: impl Into<String>) -> Result<Self, ValidationError> {
        let subject = Self {
            id,
            name: trimmed(name),
        };
        subject.validate()?;
        Ok(subject)
    }

    pub fn validate(&self) -> Result<(), ValidationError> {
        require_non_negative(EntityKind::Subject, self.id)?;
        require_text(EntityKind::Subject, "name", &self.name)
    }

    /// Case-folded name used for the uniqueness check. Folds non-ASCII
    /// letters too, so `Matemática` and `MATEMÁTICA` collide.
    pub fn name_key(&self) -> String {
        self.name.to_lowercase()
    }
}

impl Display for Subject {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} (id: {})", self.name, self.id)
    }
}

fn trimmed(value: impl Into<String>) -> String {
    let value = value.into();
    let trimmed = value.trim();
    if trimmed.len() == value.len() {
        value
    } else {
        trimmed.to_string()
    }
}
