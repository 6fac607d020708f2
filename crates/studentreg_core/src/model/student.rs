//! Student record model.
//!
//! # Responsibility
//! - Define the `Student` record and its document body projection.
//! - Decide new-vs-existing state from the backend document key.
//!
//! # Invariants
//! - `doc_id` is assigned by the store and is immutable once set.
//! - No field is validated here; empty strings are legal values.

use serde::{Deserialize, Serialize};

/// Backend-assigned opaque document key.
///
/// Kept as a type alias to make semantic intent explicit in signatures.
pub type DocId = String;

/// Registered student as rendered in the list and edited in the form.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Student {
    /// User-supplied external identifier. Not unique, not the storage key.
    pub id: String,
    pub name: String,
    pub program: String,
    /// Insertion order is meaningful; duplicates are allowed.
    pub phones: Vec<String>,
    /// Empty until the first successful create.
    pub doc_id: DocId,
}

impl Student {
    /// Creates a new, not yet persisted record.
    pub fn new(
        id: impl Into<String>,
        name: impl Into<String>,
        program: impl Into<String>,
        phones: Vec<String>,
    ) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            program: program.into(),
            phones,
            doc_id: DocId::new(),
        }
    }

    /// Returns whether saving this record must create a document.
    pub fn is_new(&self) -> bool {
        self.doc_id.is_empty()
    }

    /// Returns this record bound to an existing backend key.
    pub fn with_doc_id(mut self, doc_id: impl Into<DocId>) -> Self {
        self.doc_id = doc_id.into();
        self
    }

    /// Projects the record into its stored document body.
    pub fn to_document(&self) -> StudentDocument {
        StudentDocument {
            id: self.id.clone(),
            name: self.name.clone(),
            program: self.program.clone(),
            phones: self.phones.clone(),
        }
    }

    /// Rebuilds a record from a stored body and its backend key.
    pub fn from_document(doc_id: impl Into<DocId>, document: StudentDocument) -> Self {
        Self {
            id: document.id,
            name: document.name,
            program: document.program,
            phones: document.phones,
            doc_id: doc_id.into(),
        }
    }
}

/// Document body stored per student.
///
/// Absent fields decode to empty defaults so partially written documents
/// still render.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct StudentDocument {
    pub id: String,
    pub name: String,
    pub program: String,
    pub phones: Vec<String>,
}
