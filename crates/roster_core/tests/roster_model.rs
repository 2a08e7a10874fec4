use roster_core::{Class, EntityKind, Student, Subject, Teacher, ValidationError, MAX_AGE};

#[test]
fn constructors_trim_text_fields() {
    let student = Student::new("  001 ", " Ana ", 12).unwrap();
    assert_eq!(student.id, "001");
    assert_eq!(student.name, "Ana");

    let class = Class::new("7A", " 7 ", "A\n").unwrap();
    assert_eq!(class.year, "7");
    assert_eq!(class.section, "A");
}

#[test]
fn student_age_must_be_in_range() {
    assert!(Student::new("001", "Ana", 0).is_ok());
    assert!(Student::new("001", "Ana", MAX_AGE).is_ok());
    assert_eq!(
        Student::new("001", "Ana", MAX_AGE + 1).unwrap_err(),
        ValidationError::AgeOutOfRange(MAX_AGE + 1)
    );
}

#[test]
fn blank_fields_are_named_in_errors() {
    let err = Teacher::new(1, "   ").unwrap_err();
    assert_eq!(
        err,
        ValidationError::BlankField {
            kind: EntityKind::Teacher,
            field: "name",
        }
    );
    assert_eq!(err.to_string(), "teacher name cannot be blank");

    let err = Subject::new(-1, "Art").unwrap_err();
    assert_eq!(err.to_string(), "subject id must be non-negative, got -1");
}

#[test]
fn records_serialize_with_plain_field_names() {
    let student = Student::new("001", "Ana", 12).unwrap();
    let json = serde_json::to_value(&student).unwrap();
    assert_eq!(json, serde_json::json!({"id": "001", "name": "Ana", "age": 12}));

    let decoded: Student = serde_json::from_value(json).unwrap();
    assert_eq!(decoded, student);

    assert_eq!(
        serde_json::to_value(EntityKind::Class).unwrap(),
        serde_json::json!("class")
    );
}

#[test]
fn display_formats_are_human_readable() {
    let class = Class::new("7A", "7", "A").unwrap();
    assert_eq!(class.to_string(), "7A (year: 7, section: A)");

    let teacher = Teacher::new(10, "Carla").unwrap();
    assert_eq!(teacher.to_string(), "Carla (id: 10)");
}
