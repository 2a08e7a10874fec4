//! Roster use-case service.
//!
//! # Responsibility
//! - Expose one entry point per roster action (add, list, link, unlink,
//!   traverse, remove) over a caller-supplied repository.
//! - Translate repository errors into caller-facing categories.
//! - Emit one metadata-only log event per mutation.
//!
//! # Invariants
//! - Service APIs never bypass repository validation/persistence contracts.
//! - Each call performs exactly one repository operation.
//! - Log events carry kinds, ids and outcomes only, never names.

use crate::model::entity::{EntityKind, ValidationError};
use crate::model::records::{Class, Student, Subject, SubjectId, Teacher, TeacherId};
use crate::repo::entity_repo::{EntityRepository, RepoError};
use crate::repo::link_repo::{AssociationRepository, LinkOutcome};
use crate::repo::schema::{Enrollment, Entity, TeachingAssignment};
use log::{info, warn};
use std::error::Error;
use std::fmt::{Display, Formatter};

pub type ServiceResult<T> = Result<T, RosterServiceError>;

/// Service error for roster use-cases.
#[derive(Debug)]
pub enum RosterServiceError {
    /// Input failed model validation; nothing was written.
    InvalidInput(ValidationError),
    /// An entity with the same identifier (or unique name) already exists.
    AlreadyExists { kind: EntityKind, id: String },
    /// A referenced entity does not exist.
    NotFound { kind: EntityKind, id: String },
    /// Unlink target pair was never linked.
    NotLinked(String),
    /// The roster tables are missing; nothing has been recorded yet.
    SchemaMissing(&'static str),
    /// Persistence-layer failure.
    Repo(RepoError),
}

impl Display for RosterServiceError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::InvalidInput(err) => write!(f, "invalid input: {err}"),
            Self::AlreadyExists { kind, id } => write!(f, "{kind} `{id}` already exists"),
            Self::NotFound { kind, id } => write!(f, "{kind} `{id}` not found"),
            Self::NotLinked(details) => write!(f, "{details}"),
            Self::SchemaMissing(table) => write!(
                f,
                "no roster data yet (table `{table}` is missing); add a record first"
            ),
            Self::Repo(err) => write!(f, "{err}"),
        }
    }
}

impl Error for RosterServiceError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::InvalidInput(err) => Some(err),
            Self::Repo(err) => Some(err),
            _ => None,
        }
    }
}

impl From<ValidationError> for RosterServiceError {
    fn from(value: ValidationError) -> Self {
        Self::InvalidInput(value)
    }
}

impl From<RepoError> for RosterServiceError {
    fn from(value: RepoError) -> Self {
        match value {
            RepoError::Validation(err) => Self::InvalidInput(err),
            RepoError::Duplicate { kind, id } => Self::AlreadyExists { kind, id },
            RepoError::NotFound { kind, id } => Self::NotFound { kind, id },
            err @ RepoError::NotLinked { .. } => Self::NotLinked(err.to_string()),
            RepoError::MissingRequiredTable(table) => Self::SchemaMissing(table),
            other => Self::Repo(other),
        }
    }
}

impl RosterServiceError {
    fn code(&self) -> &'static str {
        match self {
            Self::InvalidInput(_) => "invalid_input",
            Self::AlreadyExists { .. } => "already_exists",
            Self::NotFound { .. } => "not_found",
            Self::NotLinked(_) => "not_linked",
            Self::SchemaMissing(_) => "schema_missing",
            Self::Repo(_) => "repo_failure",
        }
    }
}

/// Roster facade over repository implementations.
pub struct RosterService<R> {
    repo: R,
}

impl<R> RosterService<R>
where
    R: EntityRepository + AssociationRepository,
{
    /// Creates a service using the provided repository implementation.
    pub fn new(repo: R) -> Self {
        Self { repo }
    }

    /// Records a new student. Rejects an id that is already registered.
    pub fn add_student(&self, id: &str, name: &str, age: i64) -> ServiceResult<Student> {
        let student = Student::new(id, name, age)?;
        self.create(student)
    }

    /// Records a new class, e.g. id `7A`, year `7`, section `A`.
    pub fn add_class(&self, id: &str, year: &str, section: &str) -> ServiceResult<Class> {
        let class = Class::new(id, year, section)?;
        self.create(class)
    }

    pub fn add_teacher(&self, id: TeacherId, name: &str) -> ServiceResult<Teacher> {
        let teacher = Teacher::new(id, name)?;
        self.create(teacher)
    }

    /// Records a subject under the next free id. The name must not match an
    /// existing subject, ignoring case.
    pub fn add_subject(&self, name: &str) -> ServiceResult<Subject> {
        let result = self
            .repo
            .create_with_next_id(|id| Subject::new(id, name))
            .map_err(RosterServiceError::from);
        match &result {
            Ok(subject) => info!(
                "event=subject_create module=service status=ok id={}",
                subject.id
            ),
            Err(err) => warn!(
                "event=subject_create module=service status=error error_code={}",
                err.code()
            ),
        }
        result
    }

    pub fn list_students(&self) -> ServiceResult<Vec<Student>> {
        Ok(self.repo.list::<Student>()?)
    }

    pub fn list_classes(&self) -> ServiceResult<Vec<Class>> {
        Ok(self.repo.list::<Class>()?)
    }

    pub fn list_teachers(&self) -> ServiceResult<Vec<Teacher>> {
        Ok(self.repo.list::<Teacher>()?)
    }

    pub fn list_subjects(&self) -> ServiceResult<Vec<Subject>> {
        Ok(self.repo.list::<Subject>()?)
    }

    pub fn get_student(&self, id: &str) -> ServiceResult<Option<Student>> {
        Ok(self.repo.get::<Student>(&key(id))?)
    }

    pub fn get_class(&self, id: &str) -> ServiceResult<Option<Class>> {
        Ok(self.repo.get::<Class>(&key(id))?)
    }

    pub fn get_teacher(&self, id: TeacherId) -> ServiceResult<Option<Teacher>> {
        Ok(self.repo.get::<Teacher>(&id)?)
    }

    /// Adds a student to a class.
    ///
    /// Both must exist; re-enrolling is reported as `AlreadyLinked`.
    pub fn enroll_student(&self, student_id: &str, class_id: &str) -> ServiceResult<LinkOutcome> {
        let result = self
            .repo
            .link::<Enrollment>(&key(student_id), &key(class_id))
            .map_err(RosterServiceError::from);
        log_link("enrollment_link", &result);
        result
    }

    pub fn withdraw_student(&self, student_id: &str, class_id: &str) -> ServiceResult<()> {
        let result = self
            .repo
            .unlink::<Enrollment>(&key(student_id), &key(class_id))
            .map_err(RosterServiceError::from);
        log_outcome("enrollment_unlink", &result);
        result
    }

    /// Assigns a teacher to a class. Both must exist.
    pub fn assign_teacher(
        &self,
        teacher_id: TeacherId,
        class_id: &str,
    ) -> ServiceResult<LinkOutcome> {
        let result = self
            .repo
            .link::<TeachingAssignment>(&teacher_id, &key(class_id))
            .map_err(RosterServiceError::from);
        log_link("assignment_link", &result);
        result
    }

    pub fn unassign_teacher(&self, teacher_id: TeacherId, class_id: &str) -> ServiceResult<()> {
        let result = self
            .repo
            .unlink::<TeachingAssignment>(&teacher_id, &key(class_id))
            .map_err(RosterServiceError::from);
        log_outcome("assignment_unlink", &result);
        result
    }

    /// Students enrolled in a class, ordered by student id.
    pub fn list_class_students(&self, class_id: &str) -> ServiceResult<Vec<Student>> {
        Ok(self.repo.list_lefts::<Enrollment>(&key(class_id))?)
    }

    pub fn list_class_teachers(&self, class_id: &str) -> ServiceResult<Vec<Teacher>> {
        Ok(self.repo.list_lefts::<TeachingAssignment>(&key(class_id))?)
    }

    pub fn list_student_classes(&self, student_id: &str) -> ServiceResult<Vec<Class>> {
        Ok(self.repo.list_rights::<Enrollment>(&key(student_id))?)
    }

    pub fn list_teacher_classes(&self, teacher_id: TeacherId) -> ServiceResult<Vec<Class>> {
        Ok(self.repo.list_rights::<TeachingAssignment>(&teacher_id)?)
    }

    /// Deletes a student and every class enrollment it had.
    pub fn remove_student(&self, id: &str) -> ServiceResult<()> {
        self.remove::<Student>(&key(id))
    }

    /// Deletes a class together with its enrollments and teacher assignments.
    pub fn remove_class(&self, id: &str) -> ServiceResult<()> {
        self.remove::<Class>(&key(id))
    }

    pub fn remove_teacher(&self, id: TeacherId) -> ServiceResult<()> {
        self.remove::<Teacher>(&id)
    }

    pub fn remove_subject(&self, id: SubjectId) -> ServiceResult<()> {
        self.remove::<Subject>(&id)
    }

    fn create<E: Entity>(&self, entity: E) -> ServiceResult<E> {
        match self.repo.create(&entity) {
            Ok(()) => {
                info!(
                    "event={}_create module=service status=ok id={}",
                    E::KIND,
                    entity.id()
                );
                Ok(entity)
            }
            Err(err) => {
                let err = RosterServiceError::from(err);
                warn!(
                    "event={}_create module=service status=error id={} error_code={}",
                    E::KIND,
                    entity.id(),
                    err.code()
                );
                Err(err)
            }
        }
    }

    fn remove<E: Entity>(&self, id: &E::Id) -> ServiceResult<()> {
        let result = self
            .repo
            .delete::<E>(id)
            .map_err(RosterServiceError::from);
        match &result {
            Ok(()) => info!(
                "event={}_delete module=service status=ok id={}",
                E::KIND,
                id
            ),
            Err(err) => warn!(
                "event={}_delete module=service status=error id={} error_code={}",
                E::KIND,
                id,
                err.code()
            ),
        }
        result
    }
}

fn key(id: &str) -> String {
    id.trim().to_string()
}

fn log_link(event: &'static str, result: &ServiceResult<LinkOutcome>) {
    match result {
        Ok(LinkOutcome::Linked) => info!("event={event} module=service status=ok"),
        Ok(LinkOutcome::AlreadyLinked) => {
            info!("event={event} module=service status=ok outcome=already_linked")
        }
        Err(err) => warn!(
            "event={event} module=service status=error error_code={}",
            err.code()
        ),
    }
}

fn log_outcome(event: &'static str, result: &ServiceResult<()>) {
    match result {
        Ok(()) => info!("event={event} module=service status=ok"),
        Err(err) => warn!(
            "event={event} module=service status=error error_code={}",
            err.code()
        ),
    }
}
