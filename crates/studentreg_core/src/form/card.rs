//! Read-only list card projection for one student.

use crate::model::student::{DocId, Student};

/// Display lines for one list entry plus the key its edit/delete buttons act on.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StudentCard {
    pub doc_id: DocId,
    pub lines: Vec<String>,
}

impl From<&Student> for StudentCard {
    fn from(student: &Student) -> Self {
        let mut lines = vec![
            format!("ID: {}", student.id),
            format!("Name: {}", student.name),
            format!("Program: {}", student.program),
        ];
        if !student.phones.is_empty() {
            lines.push("Phones:".to_string());
            lines.extend(student.phones.iter().map(|phone| format!("- {phone}")));
        }

        Self {
            doc_id: student.doc_id.clone(),
            lines,
        }
    }
}

/// Projects a whole list in order.
pub fn student_cards(students: &[Student]) -> Vec<StudentCard> {
    students.iter().map(StudentCard::from).collect()
}
