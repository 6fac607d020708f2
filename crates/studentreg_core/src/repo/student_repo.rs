//! Student repository (screen view model).
//!
//! # Responsibility
//! - Provide add/update/delete entry points over one document collection.
//! - Hold the latest snapshot as an ordered `Student` list.
//! - Notify registered observers whenever a new list is applied.
//!
//! # Invariants
//! - A record with empty `doc_id` is created; any other record is updated
//!   under its exact key and never duplicated.
//! - Writes never touch the local list; only `sync()` replaces it, wholesale.
//! - A document that fails to decode is skipped and logged; the rest of its
//!   snapshot is still applied.

use crate::model::student::{DocId, Student, StudentDocument};
use crate::store::{DocumentStore, Snapshot, StoreError, Subscription};
use log::{debug, error, info, warn};
use std::error::Error;
use std::fmt::{Display, Formatter};

/// Collection name used by the registration screen.
pub const DEFAULT_COLLECTION: &str = "students";

pub type RepoResult<T> = Result<T, RepoError>;

/// Repository error for student persistence operations.
#[derive(Debug)]
pub enum RepoError {
    Store(StoreError),
    NotFound(DocId),
    MissingDocId,
}

impl Display for RepoError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Store(err) => write!(f, "{err}"),
            Self::NotFound(doc_id) => write!(f, "student not found: {doc_id}"),
            Self::MissingDocId => write!(f, "student has no document id"),
        }
    }
}

impl Error for RepoError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Store(err) => Some(err),
            Self::NotFound(_) | Self::MissingDocId => None,
        }
    }
}

impl From<StoreError> for RepoError {
    fn from(value: StoreError) -> Self {
        match value {
            StoreError::NotFound { doc_id, .. } => Self::NotFound(doc_id),
            other => Self::Store(other),
        }
    }
}

/// Which write path a save took.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SaveOutcome {
    Created(DocId),
    Updated(DocId),
}

impl SaveOutcome {
    pub fn doc_id(&self) -> &str {
        match self {
            Self::Created(doc_id) | Self::Updated(doc_id) => doc_id,
        }
    }
}

/// Handle returned by `observe`, used to unregister.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ObserverId(u64);

type Observer = Box<dyn FnMut(&[Student])>;

/// View model over one student collection.
pub struct StudentRepository<S: DocumentStore> {
    store: S,
    collection: String,
    subscription: Subscription,
    students: Vec<Student>,
    observers: Vec<(ObserverId, Observer)>,
    next_observer_id: u64,
}

impl<S: DocumentStore> StudentRepository<S> {
    /// Subscribes to `collection` and applies its current snapshot.
    pub fn new(store: S, collection: impl Into<String>) -> RepoResult<Self> {
        let collection = collection.into();
        let subscription = store.subscribe(&collection)?;
        let mut repo = Self {
            store,
            collection,
            subscription,
            students: Vec::new(),
            observers: Vec::new(),
            next_observer_id: 0,
        };
        repo.sync();
        Ok(repo)
    }

    /// Same as `new` with the `students` collection.
    pub fn with_default_collection(store: S) -> RepoResult<Self> {
        Self::new(store, DEFAULT_COLLECTION)
    }

    /// Current list in snapshot order.
    pub fn students(&self) -> &[Student] {
        &self.students
    }

    pub fn find(&self, doc_id: &str) -> Option<&Student> {
        self.students.iter().find(|student| student.doc_id == doc_id)
    }

    /// Creates a document for a new record and returns its assigned key.
    ///
    /// Records that already carry a `doc_id` are updated under that key
    /// instead.
    pub fn add_student(&self, student: &Student) -> RepoResult<DocId> {
        if !student.is_new() {
            debug!(
                "event=student_add module=repo status=routed route=update doc_id={}",
                student.doc_id
            );
            self.update_student(student)?;
            return Ok(student.doc_id.clone());
        }

        let fields = document_fields(student)?;
        match self.store.insert_document(&self.collection, &fields) {
            Ok(doc_id) => {
                info!(
                    "event=student_add module=repo status=ok collection={} doc_id={} phones={}",
                    self.collection,
                    doc_id,
                    student.phones.len()
                );
                Ok(doc_id)
            }
            Err(err) => {
                error!(
                    "event=student_add module=repo status=error collection={} error={}",
                    self.collection, err
                );
                Err(err.into())
            }
        }
    }

    /// Overwrites the stored fields of an existing record.
    pub fn update_student(&self, student: &Student) -> RepoResult<()> {
        if student.is_new() {
            return Err(RepoError::MissingDocId);
        }

        let fields = document_fields(student)?;
        match self
            .store
            .set_document(&self.collection, &student.doc_id, &fields)
        {
            Ok(()) => {
                info!(
                    "event=student_update module=repo status=ok collection={} doc_id={} phones={}",
                    self.collection,
                    student.doc_id,
                    student.phones.len()
                );
                Ok(())
            }
            Err(err) => {
                error!(
                    "event=student_update module=repo status=error collection={} doc_id={} error={}",
                    self.collection, student.doc_id, err
                );
                Err(err.into())
            }
        }
    }

    /// Removes the stored document of an existing record.
    pub fn delete_student(&self, student: &Student) -> RepoResult<()> {
        if student.is_new() {
            return Err(RepoError::MissingDocId);
        }

        match self
            .store
            .delete_document(&self.collection, &student.doc_id)
        {
            Ok(()) => {
                info!(
                    "event=student_delete module=repo status=ok collection={} doc_id={}",
                    self.collection, student.doc_id
                );
                Ok(())
            }
            Err(err) => {
                error!(
                    "event=student_delete module=repo status=error collection={} doc_id={} error={}",
                    self.collection, student.doc_id, err
                );
                Err(err.into())
            }
        }
    }

    /// Creates new records and updates existing ones.
    pub fn save_student(&self, student: &Student) -> RepoResult<SaveOutcome> {
        if student.is_new() {
            self.add_student(student).map(SaveOutcome::Created)
        } else {
            self.update_student(student)?;
            Ok(SaveOutcome::Updated(student.doc_id.clone()))
        }
    }

    /// Applies the newest pending snapshot, if any.
    ///
    /// Returns `true` when the list was replaced and observers notified.
    pub fn sync(&mut self) -> bool {
        let Some(snapshot) = self.subscription.latest() else {
            return false;
        };

        self.students = decode_snapshot(&snapshot);
        debug!(
            "event=student_sync module=repo status=ok collection={} students={} observers={}",
            self.collection,
            self.students.len(),
            self.observers.len()
        );

        for (_, observer) in &mut self.observers {
            observer(&self.students);
        }
        true
    }

    /// Registers a callback invoked with the full list after every applied
    /// snapshot.
    pub fn observe(&mut self, observer: impl FnMut(&[Student]) + 'static) -> ObserverId {
        let id = ObserverId(self.next_observer_id);
        self.next_observer_id += 1;
        self.observers.push((id, Box::new(observer)));
        id
    }

    /// Removes a previously registered observer. Returns whether it existed.
    pub fn unobserve(&mut self, id: ObserverId) -> bool {
        let before = self.observers.len();
        self.observers.retain(|(observer_id, _)| *observer_id != id);
        self.observers.len() != before
    }
}

fn document_fields(student: &Student) -> RepoResult<serde_json::Value> {
    serde_json::to_value(student.to_document())
        .map_err(|err| RepoError::Store(StoreError::Encode(err)))
}

fn decode_snapshot(snapshot: &Snapshot) -> Vec<Student> {
    snapshot
        .documents
        .iter()
        .filter_map(|document| {
            match serde_json::from_value::<StudentDocument>(document.fields.clone()) {
                Ok(body) => Some(Student::from_document(document.doc_id.clone(), body)),
                Err(err) => {
                    warn!(
                        "event=student_decode module=repo status=skipped collection={} doc_id={} error={}",
                        snapshot.collection, document.doc_id, err
                    );
                    None
                }
            }
        })
        .collect()
}
