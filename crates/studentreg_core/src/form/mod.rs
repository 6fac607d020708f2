//! Registration screen state and actions.
//!
//! # Responsibility
//! - Hold uncommitted form input and the "currently editing" pointer.
//! - Dispatch submit/edit/delete actions to the student repository.
//! - Project repository records into list cards.
//!
//! # Invariants
//! - Nothing reaches the repository before `submit` or `delete_entry`.
//! - `submit` resets every field and the editing pointer whether or not the
//!   backend write succeeded; the write result is returned to the caller.
//! - The editing pointer is only set by `begin_edit`.

use crate::model::student::{DocId, Student};
use crate::repo::student_repo::{RepoResult, SaveOutcome, StudentRepository};
use crate::store::DocumentStore;
use log::{info, warn};
use std::error::Error;
use std::fmt::{Display, Formatter};

mod card;
mod phones;

pub use card::{student_cards, StudentCard};
pub use phones::PhoneList;

pub type FormResult<T> = Result<T, FormError>;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FormError {
    PhoneIndexOutOfRange { index: usize, len: usize },
}

impl Display for FormError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::PhoneIndexOutOfRange { index, len } => {
                write!(f, "phone index {index} out of range for {len} entries")
            }
        }
    }
}

impl Error for FormError {}

/// Write path chosen by a submit.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SubmitAction {
    Create,
    Update(DocId),
}

/// Result of one submit. The form is already reset when this is returned.
#[derive(Debug)]
pub struct SubmitOutcome {
    pub action: SubmitAction,
    pub result: RepoResult<SaveOutcome>,
}

impl SubmitOutcome {
    pub fn is_ok(&self) -> bool {
        self.result.is_ok()
    }
}

/// Mutable view state owned by the registration screen.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RegistrationForm {
    pub student_id: String,
    pub name: String,
    pub program: String,
    /// Text in the "Phone Number" input before it is added to `phones`.
    pub phone_input: String,
    pub phones: PhoneList,
    editing_doc_id: Option<DocId>,
}

impl RegistrationForm {
    pub fn new() -> Self {
        Self::default()
    }

    /// Key of the record being edited, if any.
    pub fn editing_doc_id(&self) -> Option<&str> {
        self.editing_doc_id.as_deref()
    }

    pub fn is_editing(&self) -> bool {
        self.editing_doc_id.is_some()
    }

    pub fn submit_label(&self) -> &'static str {
        if self.is_editing() {
            "Update"
        } else {
            "Submit"
        }
    }

    /// Appends `phone_input` to the phone list and clears the input.
    ///
    /// Blank input is ignored and left untouched. Returns whether a phone was
    /// added.
    pub fn add_phone_from_input(&mut self) -> bool {
        if self.phone_input.trim().is_empty() {
            return false;
        }
        let phone = std::mem::take(&mut self.phone_input);
        self.phones.push(phone);
        true
    }

    /// Loads a listed record into the form and points edits at its key.
    ///
    /// A record without a key only fills the fields; the next submit creates.
    pub fn begin_edit(&mut self, student: &Student) {
        self.student_id = student.id.clone();
        self.name = student.name.clone();
        self.program = student.program.clone();
        self.phones = PhoneList::from_vec(student.phones.clone());
        self.editing_doc_id = (!student.is_new()).then(|| student.doc_id.clone());
    }

    /// Builds the record a submit would write, without touching state.
    pub fn to_student(&self) -> Student {
        let student = Student::new(
            self.student_id.clone(),
            self.name.clone(),
            self.program.clone(),
            self.phones.as_slice().to_vec(),
        );
        match &self.editing_doc_id {
            Some(doc_id) => student.with_doc_id(doc_id.clone()),
            None => student,
        }
    }

    /// Writes the form through the repository, then resets the form.
    ///
    /// Updates when an edit is in progress, creates otherwise. The reset
    /// happens on failure too; inspect `SubmitOutcome::result` to report it.
    pub fn submit<S: DocumentStore>(&mut self, repo: &StudentRepository<S>) -> SubmitOutcome {
        let student = self.to_student();
        let action = match &self.editing_doc_id {
            Some(doc_id) => SubmitAction::Update(doc_id.clone()),
            None => SubmitAction::Create,
        };

        let result = repo.save_student(&student);
        match &result {
            Ok(outcome) => info!(
                "event=form_submit module=form status=ok doc_id={}",
                outcome.doc_id()
            ),
            Err(err) => warn!(
                "event=form_submit module=form status=error editing={} error={}",
                self.is_editing(),
                err
            ),
        }

        self.reset();
        SubmitOutcome { action, result }
    }

    /// Deletes a listed record immediately. The form itself is unchanged.
    pub fn delete_entry<S: DocumentStore>(
        &self,
        repo: &StudentRepository<S>,
        student: &Student,
    ) -> RepoResult<()> {
        repo.delete_student(student)
    }

    /// Clears every field and the editing pointer.
    pub fn reset(&mut self) {
        *self = Self::default();
    }
}
