use roster_core::db::open_db_in_memory;
use roster_core::{
    EntityKind, LinkOutcome, RosterService, RosterServiceError, SqliteRosterRepository, Student,
    Subject, ValidationError,
};

#[test]
fn enroll_and_list_class_students() {
    let conn = open_db_in_memory().unwrap();
    let service = RosterService::new(SqliteRosterRepository::try_new(&conn).unwrap());

    service.add_student("001", "Ana", 12).unwrap();
    service.add_class("7A", "7", "A").unwrap();

    assert_eq!(
        service.enroll_student("001", "7A").unwrap(),
        LinkOutcome::Linked
    );
    assert_eq!(
        service.list_class_students("7A").unwrap(),
        vec![Student {
            id: "001".to_string(),
            name: "Ana".to_string(),
            age: 12,
        }]
    );
}

#[test]
fn enrolling_unknown_student_is_not_found() {
    let conn = open_db_in_memory().unwrap();
    let service = RosterService::new(SqliteRosterRepository::try_new(&conn).unwrap());
    service.add_class("7A", "7", "A").unwrap();

    let err = service.enroll_student("999", "7A").unwrap_err();
    match err {
        RosterServiceError::NotFound { kind, id } => {
            assert_eq!(kind, EntityKind::Student);
            assert_eq!(id, "999");
        }
        other => panic!("unexpected error: {other}"),
    }
    assert!(service.list_class_students("7A").unwrap().is_empty());
}

#[test]
fn adding_existing_id_reports_already_exists() {
    let conn = open_db_in_memory().unwrap();
    let service = RosterService::new(SqliteRosterRepository::try_new(&conn).unwrap());

    service.add_class("7A", "7", "A").unwrap();
    let err = service.add_class(" 7A ", "8", "B").unwrap_err();

    assert!(matches!(
        err,
        RosterServiceError::AlreadyExists {
            kind: EntityKind::Class,
            ..
        }
    ));
    assert_eq!(err.to_string(), "class `7A` already exists");
    assert_eq!(service.list_classes().unwrap().len(), 1);
}

#[test]
fn invalid_input_is_rejected_before_storage() {
    let conn = open_db_in_memory().unwrap();
    let service = RosterService::new(SqliteRosterRepository::try_new(&conn).unwrap());

    let err = service.add_student("  ", "Ana", 12).unwrap_err();
    assert!(matches!(
        err,
        RosterServiceError::InvalidInput(ValidationError::BlankField {
            kind: EntityKind::Student,
            field: "id",
        })
    ));

    let err = service.add_teacher(-3, "Carla").unwrap_err();
    assert!(matches!(
        err,
        RosterServiceError::InvalidInput(ValidationError::NegativeId { id: -3, .. })
    ));

    assert!(service.list_students().unwrap().is_empty());
    assert!(service.list_teachers().unwrap().is_empty());
}

#[test]
fn remove_student_clears_class_membership() {
    let conn = open_db_in_memory().unwrap();
    let service = RosterService::new(SqliteRosterRepository::try_new(&conn).unwrap());
    service.add_student("001", "Ana", 12).unwrap();
    service.add_student("002", "Bruno", 13).unwrap();
    service.add_class("7A", "7", "A").unwrap();
    service.enroll_student("001", "7A").unwrap();
    service.enroll_student("002", "7A").unwrap();

    service.remove_student("001").unwrap();

    let members = service.list_class_students("7A").unwrap();
    assert_eq!(members.len(), 1);
    assert_eq!(members[0].id, "002");
    assert!(service.get_student("001").unwrap().is_none());

    let err = service.remove_student("001").unwrap_err();
    assert!(matches!(err, RosterServiceError::NotFound { .. }));
}

#[test]
fn teachers_can_be_assigned_listed_and_unassigned() {
    let conn = open_db_in_memory().unwrap();
    let service = RosterService::new(SqliteRosterRepository::try_new(&conn).unwrap());
    service.add_teacher(10, "Carla").unwrap();
    service.add_class("7A", "7", "A").unwrap();
    service.add_class("8B", "8", "B").unwrap();

    service.assign_teacher(10, "7A").unwrap();
    service.assign_teacher(10, "8B").unwrap();
    assert_eq!(
        service.assign_teacher(10, "8B").unwrap(),
        LinkOutcome::AlreadyLinked
    );

    let teachers = service.list_class_teachers("7A").unwrap();
    assert_eq!(teachers.len(), 1);
    assert_eq!(teachers[0].name, "Carla");
    assert_eq!(service.list_teacher_classes(10).unwrap().len(), 2);

    service.unassign_teacher(10, "7A").unwrap();
    assert!(service.list_class_teachers("7A").unwrap().is_empty());

    let err = service.unassign_teacher(10, "7A").unwrap_err();
    assert!(matches!(err, RosterServiceError::NotLinked(_)));
}

#[test]
fn student_classes_and_withdrawal() {
    let conn = open_db_in_memory().unwrap();
    let service = RosterService::new(SqliteRosterRepository::try_new(&conn).unwrap());
    service.add_student("001", "Ana", 12).unwrap();
    service.add_class("7A", "7", "A").unwrap();
    service.add_class("7B", "7", "B").unwrap();
    service.enroll_student("001", "7A").unwrap();
    service.enroll_student("001", "7B").unwrap();

    service.withdraw_student("001", "7A").unwrap();

    let classes = service.list_student_classes("001").unwrap();
    assert_eq!(classes.len(), 1);
    assert_eq!(classes[0].id, "7B");
}

#[test]
fn subjects_are_unique_by_name() {
    let conn = open_db_in_memory().unwrap();
    let service = RosterService::new(SqliteRosterRepository::try_new(&conn).unwrap());

    service.add_subject("Mathematics").unwrap();
    let err = service.add_subject("mathematics").unwrap_err();
    assert!(matches!(
        err,
        RosterServiceError::AlreadyExists {
            kind: EntityKind::Subject,
            ..
        }
    ));

    let subjects = service.list_subjects().unwrap();
    assert_eq!(subjects.len(), 1);
    service.remove_subject(1).unwrap();
    assert!(service.list_subjects().unwrap().is_empty());
}

#[test]
fn remove_class_and_teacher() {
    let conn = open_db_in_memory().unwrap();
    let service = RosterService::new(SqliteRosterRepository::try_new(&conn).unwrap());
    service.add_teacher(10, "Carla").unwrap();
    service.add_class("7A", "7", "A").unwrap();
    service.assign_teacher(10, "7A").unwrap();

    service.remove_class("7A").unwrap();
    assert!(service.list_teacher_classes(10).unwrap().is_empty());
    assert!(service.get_class("7A").unwrap().is_none());

    service.remove_teacher(10).unwrap();
    assert!(service.get_teacher(10).unwrap().is_none());
}

#[test]
fn table_dropped_after_startup_reports_schema_missing() {
    let conn = open_db_in_memory().unwrap();
    let service = RosterService::new(SqliteRosterRepository::try_new(&conn).unwrap());
    service.add_class("7A", "7", "A").unwrap();
    conn.execute_batch("DROP TABLE enrollments;").unwrap();

    let err = service.list_class_students("7A").unwrap_err();
    assert!(
        matches!(err, RosterServiceError::SchemaMissing("enrollments")),
        "unexpected error: {err:?}"
    );
    assert_eq!(
        err.to_string(),
        "no roster data yet (table `enrollments` is missing); add a record first"
    );

    let err = service.enroll_student("001", "7A").unwrap_err();
    assert!(matches!(err, RosterServiceError::NotFound { .. }));
    service.add_student("001", "Ana", 12).unwrap();
    let err = service.enroll_student("001", "7A").unwrap_err();
    assert!(matches!(
        err,
        RosterServiceError::SchemaMissing("enrollments")
    ));
}

#[test]
fn unassigning_unlinked_teacher_names_both_sides() {
    let conn = open_db_in_memory().unwrap();
    let service = RosterService::new(SqliteRosterRepository::try_new(&conn).unwrap());
    service.add_teacher(10, "Carla").unwrap();
    service.add_class("7A", "7", "A").unwrap();

    let err = service.unassign_teacher(10, "7A").unwrap_err();
    assert!(matches!(err, RosterServiceError::NotLinked(_)));
    assert_eq!(err.to_string(), "teacher 10 is not linked to class 7A");
}

#[test]
fn subject_ids_follow_the_highest_stored_id() {
    let conn = open_db_in_memory().unwrap();
    let service = RosterService::new(SqliteRosterRepository::try_new(&conn).unwrap());

    assert_eq!(service.add_subject("Matemática").unwrap().id, 1);
    assert_eq!(
        service.add_subject("  História ").unwrap(),
        Subject {
            id: 2,
            name: "História".to_string(),
        }
    );
    service.remove_subject(1).unwrap();
    assert_eq!(service.add_subject("Física").unwrap().id, 3);

    let err = service.add_subject("   ").unwrap_err();
    assert!(matches!(err, RosterServiceError::InvalidInput(_)));
    let ids: Vec<i64> = service
        .list_subjects()
        .unwrap()
        .into_iter()
        .map(|subject| subject.id)
        .collect();
    assert_eq!(ids, vec![2, 3]);
}

#[test]
fn unmigrated_connection_maps_to_schema_missing() {
    let raw = rusqlite::Connection::open_in_memory().unwrap();

    let err = RosterServiceError::from(SqliteRosterRepository::try_new(&raw).err().unwrap());
    assert!(matches!(err, RosterServiceError::SchemaMissing("students")));
    assert!(err.to_string().ends_with("add a record first"));
}
