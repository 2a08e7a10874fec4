//! Interactive numbered menu over `RosterService`.
//!
//! # Responsibility
//! - Read one command number, prompt for its fields, run exactly one
//!   service call and echo the outcome.
//!
//! # Invariants
//! - Bad input (unknown number, unparsable field, service error) prints a
//!   message and returns to the menu; it never ends the loop.
//! - End of input ends the loop cleanly.

use roster_core::{
    AssociationRepository, EntityRepository, LinkOutcome, RosterService, ServiceResult,
};
use std::fmt::Display;
use std::io::{self, BufRead, Write};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MenuCommand {
    AddStudent,
    AddClass,
    AddTeacher,
    AddSubject,
    ListStudents,
    ListClasses,
    ListTeachers,
    ListSubjects,
    EnrollStudent,
    AssignTeacher,
    ListClassStudents,
    ListClassTeachers,
    ListStudentClasses,
    WithdrawStudent,
    UnassignTeacher,
    RemoveStudent,
    Exit,
}

impl MenuCommand {
    pub const ALL: [MenuCommand; 17] = [
        Self::AddStudent,
        Self::AddClass,
        Self::AddTeacher,
        Self::AddSubject,
        Self::ListStudents,
        Self::ListClasses,
        Self::ListTeachers,
        Self::ListSubjects,
        Self::EnrollStudent,
        Self::AssignTeacher,
        Self::ListClassStudents,
        Self::ListClassTeachers,
        Self::ListStudentClasses,
        Self::WithdrawStudent,
        Self::UnassignTeacher,
        Self::RemoveStudent,
        Self::Exit,
    ];

    pub fn number(self) -> u8 {
        match self {
            Self::AddStudent => 1,
            Self::AddClass => 2,
            Self::AddTeacher => 3,
            Self::AddSubject => 4,
            Self::ListStudents => 5,
            Self::ListClasses => 6,
            Self::ListTeachers => 7,
            Self::ListSubjects => 8,
            Self::EnrollStudent => 9,
            Self::AssignTeacher => 10,
            Self::ListClassStudents => 11,
            Self::ListClassTeachers => 12,
            Self::ListStudentClasses => 13,
            Self::WithdrawStudent => 14,
            Self::UnassignTeacher => 15,
            Self::RemoveStudent => 16,
            Self::Exit => 0,
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            Self::AddStudent => "Add student",
            Self::AddClass => "Add class",
            Self::AddTeacher => "Add teacher",
            Self::AddSubject => "Add subject",
            Self::ListStudents => "List students",
            Self::ListClasses => "List classes",
            Self::ListTeachers => "List teachers",
            Self::ListSubjects => "List subjects",
            Self::EnrollStudent => "Enroll student in class",
            Self::AssignTeacher => "Assign teacher to class",
            Self::ListClassStudents => "List students of class",
            Self::ListClassTeachers => "List teachers of class",
            Self::ListStudentClasses => "List classes of student",
            Self::WithdrawStudent => "Withdraw student from class",
            Self::UnassignTeacher => "Unassign teacher from class",
            Self::RemoveStudent => "Remove student",
            Self::Exit => "Exit",
        }
    }

    pub fn parse(input: &str) -> Option<Self> {
        let number = input.trim().parse::<u8>().ok()?;
        Self::ALL
            .into_iter()
            .find(|command| command.number() == number)
    }
}

enum Flow {
    Continue,
    Exit,
}

pub struct Menu<'svc, Repo, In, Out> {
    service: &'svc RosterService<Repo>,
    input: In,
    output: Out,
}

impl<'svc, Repo, In, Out> Menu<'svc, Repo, In, Out>
where
    Repo: EntityRepository + AssociationRepository,
    In: BufRead,
    Out: Write,
{
    pub fn new(service: &'svc RosterService<Repo>, input: In, output: Out) -> Self {
        Self {
            service,
            input,
            output,
        }
    }

    /// Runs until `Exit` is chosen or input ends.
    pub fn run(&mut self) -> io::Result<()> {
        loop {
            self.print_menu()?;
            let Some(line) = self.prompt("Option")? else {
                return Ok(());
            };
            let Some(command) = MenuCommand::parse(&line) else {
                writeln!(self.output, "Invalid option `{}`. Try again.", line.trim())?;
                continue;
            };
            if let Flow::Exit = self.execute(command)? {
                return Ok(());
            }
        }
    }

    fn print_menu(&mut self) -> io::Result<()> {
        writeln!(self.output)?;
        writeln!(self.output, "Choose an option:")?;
        for command in MenuCommand::ALL {
            writeln!(self.output, "{:>2}. {}", command.number(), command.label())?;
        }
        Ok(())
    }

    fn execute(&mut self, command: MenuCommand) -> io::Result<Flow> {
        let service = self.service;
        match command {
            MenuCommand::Exit => return Ok(Flow::Exit),
            MenuCommand::AddStudent => {
                let Some(id) = self.prompt("Student id")? else {
                    return Ok(Flow::Exit);
                };
                let Some(name) = self.prompt("Student name")? else {
                    return Ok(Flow::Exit);
                };
                let Some(age) = self.prompt_number("Student age")? else {
                    return Ok(Flow::Continue);
                };
                let result = service.add_student(&id, &name, age);
                self.report(result, |student| format!("Student {student} added."))?;
            }
            MenuCommand::AddClass => {
                let Some(id) = self.prompt("Class id")? else {
                    return Ok(Flow::Exit);
                };
                let Some(year) = self.prompt("Class year")? else {
                    return Ok(Flow::Exit);
                };
                let Some(section) = self.prompt("Class section")? else {
                    return Ok(Flow::Exit);
                };
                let result = service.add_class(&id, &year, &section);
                self.report(result, |class| format!("Class {class} added."))?;
            }
            MenuCommand::AddTeacher => {
                let Some(id) = self.prompt_number("Teacher id")? else {
                    return Ok(Flow::Continue);
                };
                let Some(name) = self.prompt("Teacher name")? else {
                    return Ok(Flow::Exit);
                };
                let result = service.add_teacher(id, &name);
                self.report(result, |teacher| format!("Teacher {teacher} added."))?;
            }
            MenuCommand::AddSubject => {
                let Some(name) = self.prompt("Subject name")? else {
                    return Ok(Flow::Exit);
                };
                let result = service.add_subject(&name);
                self.report(result, |subject| format!("Subject {subject} added."))?;
            }
            MenuCommand::ListStudents => {
                self.print_list("Students", "No students recorded yet.", service.list_students())?;
            }
            MenuCommand::ListClasses => {
                self.print_list("Classes", "No classes recorded yet.", service.list_classes())?;
            }
            MenuCommand::ListTeachers => {
                self.print_list("Teachers", "No teachers recorded yet.", service.list_teachers())?;
            }
            MenuCommand::ListSubjects => {
                self.print_list("Subjects", "No subjects recorded yet.", service.list_subjects())?;
            }
            MenuCommand::EnrollStudent => {
                let Some((student_id, class_id)) = self.prompt_pair("Student id", "Class id")?
                else {
                    return Ok(Flow::Exit);
                };
                let result = service.enroll_student(&student_id, &class_id);
                self.report(result, |outcome| {
                    link_message(outcome, &format!("Student {student_id}"), &class_id)
                })?;
            }
            MenuCommand::AssignTeacher => {
                let Some(teacher_id) = self.prompt_number("Teacher id")? else {
                    return Ok(Flow::Continue);
                };
                let Some(class_id) = self.prompt("Class id")? else {
                    return Ok(Flow::Exit);
                };
                let result = service.assign_teacher(teacher_id, &class_id);
                self.report(result, |outcome| {
                    link_message(outcome, &format!("Teacher {teacher_id}"), &class_id)
                })?;
            }
            MenuCommand::ListClassStudents => {
                let Some(class_id) = self.prompt("Class id")? else {
                    return Ok(Flow::Exit);
                };
                let result = service.list_class_students(&class_id);
                self.print_list(
                    &format!("Students in class {}", class_id.trim()),
                    "No students in this class.",
                    result,
                )?;
            }
            MenuCommand::ListClassTeachers => {
                let Some(class_id) = self.prompt("Class id")? else {
                    return Ok(Flow::Exit);
                };
                let result = service.list_class_teachers(&class_id);
                self.print_list(
                    &format!("Teachers of class {}", class_id.trim()),
                    "No teachers assigned to this class.",
                    result,
                )?;
            }
            MenuCommand::ListStudentClasses => {
                let Some(student_id) = self.prompt("Student id")? else {
                    return Ok(Flow::Exit);
                };
                let result = service.list_student_classes(&student_id);
                self.print_list(
                    &format!("Classes of student {}", student_id.trim()),
                    "This student is not enrolled in any class.",
                    result,
                )?;
            }
            MenuCommand::WithdrawStudent => {
                let Some((student_id, class_id)) = self.prompt_pair("Student id", "Class id")?
                else {
                    return Ok(Flow::Exit);
                };
                let result = service.withdraw_student(&student_id, &class_id);
                self.report(result, |()| {
                    format!(
                        "Student {} withdrawn from class {}.",
                        student_id.trim(),
                        class_id.trim()
                    )
                })?;
            }
            MenuCommand::UnassignTeacher => {
                let Some(teacher_id) = self.prompt_number("Teacher id")? else {
                    return Ok(Flow::Continue);
                };
                let Some(class_id) = self.prompt("Class id")? else {
                    return Ok(Flow::Exit);
                };
                let result = service.unassign_teacher(teacher_id, &class_id);
                self.report(result, |()| {
                    format!(
                        "Teacher {teacher_id} unassigned from class {}.",
                        class_id.trim()
                    )
                })?;
            }
            MenuCommand::RemoveStudent => {
                let Some(student_id) = self.prompt("Student id")? else {
                    return Ok(Flow::Exit);
                };
                let result = service.remove_student(&student_id);
                self.report(result, |()| {
                    format!("Student {} removed.", student_id.trim())
                })?;
            }
        }
        Ok(Flow::Continue)
    }

    /// Returns `None` at end of input.
    fn prompt(&mut self, label: &str) -> io::Result<Option<String>> {
        write!(self.output, "{label}: ")?;
        self.output.flush()?;

        let mut line = String::new();
        if self.input.read_line(&mut line)? == 0 {
            return Ok(None);
        }
        Ok(Some(line.trim_end_matches(['\r', '\n']).to_string()))
    }

    /// Returns `None` at end of input or when the value is not an integer;
    /// the latter is reported to the user.
    fn prompt_number(&mut self, label: &str) -> io::Result<Option<i64>> {
        let Some(raw) = self.prompt(label)? else {
            return Ok(None);
        };
        match raw.trim().parse::<i64>() {
            Ok(value) => Ok(Some(value)),
            Err(_) => {
                writeln!(self.output, "`{}` is not a valid number.", raw.trim())?;
                Ok(None)
            }
        }
    }

    fn prompt_pair(&mut self, first: &str, second: &str) -> io::Result<Option<(String, String)>> {
        let Some(first) = self.prompt(first)? else {
            return Ok(None);
        };
        let Some(second) = self.prompt(second)? else {
            return Ok(None);
        };
        Ok(Some((first, second)))
    }

    fn report<T>(
        &mut self,
        result: ServiceResult<T>,
        on_success: impl FnOnce(T) -> String,
    ) -> io::Result<()> {
        match result {
            Ok(value) => writeln!(self.output, "{}", on_success(value)),
            Err(err) => writeln!(self.output, "Error: {err}"),
        }
    }

    fn print_list<T: Display>(
        &mut self,
        title: &str,
        empty_message: &str,
        result: ServiceResult<Vec<T>>,
    ) -> io::Result<()> {
        let items = match result {
            Ok(items) => items,
            Err(err) => return writeln!(self.output, "Error: {err}"),
        };
        if items.is_empty() {
            return writeln!(self.output, "{empty_message}");
        }
        writeln!(self.output, "{title}:")?;
        for item in items {
            writeln!(self.output, " - {item}")?;
        }
        Ok(())
    }
}

fn link_message(outcome: LinkOutcome, who: &str, class_id: &str) -> String {
    match outcome {
        LinkOutcome::Linked => format!("{} added to class {}.", who.trim(), class_id.trim()),
        LinkOutcome::AlreadyLinked => {
            format!("{} is already in class {}.", who.trim(), class_id.trim())
        }
    }
}

#[cfg(test)]
mod tests {
    use super::{Menu, MenuCommand};
    use roster_core::db::open_db_in_memory;
    use roster_core::{RosterService, SqliteRosterRepository};
    use rusqlite::Connection;
    use std::io::Cursor;

    fn run_script(script: &str) -> String {
        let conn = open_db_in_memory().unwrap();
        run_script_on(&conn, script)
    }

    fn run_script_on(conn: &Connection, script: &str) -> String {
        let service = RosterService::new(SqliteRosterRepository::try_new(conn).unwrap());
        let mut output = Vec::new();
        Menu::new(&service, Cursor::new(script.as_bytes()), &mut output)
            .run()
            .unwrap();
        String::from_utf8(output).unwrap()
    }

    #[test]
    fn command_numbers_are_unique_and_round_trip() {
        for command in MenuCommand::ALL {
            assert_eq!(
                MenuCommand::parse(&command.number().to_string()),
                Some(command)
            );
        }
        assert_eq!(MenuCommand::parse(" 9 \n"), Some(MenuCommand::EnrollStudent));
        assert_eq!(MenuCommand::parse("add student"), None);
        assert_eq!(MenuCommand::parse("42"), None);
    }

    #[test]
    fn enroll_then_list_class_students() {
        let output = run_script("1\n001\nAna\n12\n2\n7A\n7\nA\n9\n001\n7A\n11\n7A\n0\n");

        assert!(output.contains("Student Ana (id: 001, age: 12) added."));
        assert!(output.contains("Class 7A (year: 7, section: A) added."));
        assert!(output.contains("Student 001 added to class 7A."));
        assert!(output.contains("Students in class 7A:\n - Ana (id: 001, age: 12)"));
    }

    #[test]
    fn errors_are_reported_and_loop_continues() {
        let output = run_script("9\n999\n7A\nabc\n3\nten\n5\n");

        assert!(output.contains("Error: student `999` not found"));
        assert!(output.contains("Invalid option `abc`. Try again."));
        assert!(output.contains("`ten` is not a valid number."));
        assert!(output.contains("No students recorded yet."));
    }

    #[test]
    fn missing_table_is_reported_with_guidance() {
        let conn = open_db_in_memory().unwrap();
        SqliteRosterRepository::try_new(&conn).unwrap();
        conn.execute_batch("DROP TABLE students;").unwrap();

        let output = run_script_on(&conn, "5\n1\n001\nAna\n12\n7\n0\n");

        let guidance = "Error: no roster data yet (table `students` is missing); add a record first";
        assert_eq!(output.matches(guidance).count(), 2);
        assert!(output.contains("No teachers recorded yet."));
    }

    #[test]
    fn subjects_are_numbered_on_add() {
        let output = run_script("4\nMatemática\n4\nHistória\n4\nMATEMÁTICA\n8\n0\n");

        assert!(output.contains("Subject Matemática (id: 1) added."));
        assert!(output.contains("Subject História (id: 2) added."));
        assert!(output.contains("Error: subject `MATEMÁTICA` already exists"));
        assert!(output.contains("Subjects:\n - Matemática (id: 1)\n - História (id: 2)"));
    }

    #[test]
    fn duplicate_add_is_reported() {
        let output = run_script("3\n10\nCarla\n3\n10\nDavi\n7\n0\n");

        assert!(output.contains("Error: teacher `10` already exists"));
        assert!(output.contains("Teachers:\n - Carla (id: 10)"));
        assert!(!output.contains("Davi (id: 10)"));
    }

    #[test]
    fn removed_student_leaves_class_listing() {
        let output = run_script(
            "1\n001\nAna\n12\n2\n7A\n7\nA\n9\n001\n7A\n16\n001\n11\n7A\n13\n001\n",
        );

        assert!(output.contains("Student 001 removed."));
        assert!(output.contains("No students in this class."));
        assert!(output.contains("Error: student `001` not found"));
    }
}
