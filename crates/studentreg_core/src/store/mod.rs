//! Document store contracts.
//!
//! # Responsibility
//! - Define the backend collaborator used by the student repository: keyed
//!   documents grouped in named collections plus a snapshot change stream.
//! - Keep backend details (SQL, key generation) behind one trait.
//!
//! # Invariants
//! - Document keys are generated by the store on insert and never reused.
//! - Snapshots are full, ordered by document creation; updates keep position.
//! - A subscriber receives the current snapshot on subscribe and one snapshot
//!   per successful write to its collection afterwards.

use crate::db::DbError;
use crate::model::student::DocId;
use serde_json::Value;
use std::error::Error;
use std::fmt::{Display, Formatter};
use std::sync::mpsc::{Receiver, TryRecvError};

mod sqlite_store;

pub use sqlite_store::SqliteDocumentStore;

pub type StoreResult<T> = Result<T, StoreError>;

/// Backend errors for document operations.
#[derive(Debug)]
pub enum StoreError {
    Db(DbError),
    NotFound { collection: String, doc_id: DocId },
    Encode(serde_json::Error),
    Decode { doc_id: DocId, source: serde_json::Error },
}

impl Display for StoreError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Db(err) => write!(f, "{err}"),
            Self::NotFound { collection, doc_id } => {
                write!(f, "document not found: {collection}/{doc_id}")
            }
            Self::Encode(err) => write!(f, "failed to encode document fields: {err}"),
            Self::Decode { doc_id, source } => {
                write!(f, "failed to decode document `{doc_id}`: {source}")
            }
        }
    }
}

impl Error for StoreError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Db(err) => Some(err),
            Self::NotFound { .. } => None,
            Self::Encode(err) => Some(err),
            Self::Decode { source, .. } => Some(source),
        }
    }
}

impl From<DbError> for StoreError {
    fn from(value: DbError) -> Self {
        Self::Db(value)
    }
}

impl From<rusqlite::Error> for StoreError {
    fn from(value: rusqlite::Error) -> Self {
        Self::Db(DbError::Sqlite(value))
    }
}

/// One stored document: backend key plus JSON body.
#[derive(Debug, Clone, PartialEq)]
pub struct Document {
    pub doc_id: DocId,
    pub fields: Value,
}

/// Full ordered view of a collection at one point in time.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Snapshot {
    pub collection: String,
    pub documents: Vec<Document>,
}

impl Snapshot {
    pub fn len(&self) -> usize {
        self.documents.len()
    }

    pub fn is_empty(&self) -> bool {
        self.documents.is_empty()
    }
}

/// Receiving end of a collection change stream.
pub struct Subscription {
    receiver: Receiver<Snapshot>,
}

impl Subscription {
    pub fn new(receiver: Receiver<Snapshot>) -> Self {
        Self { receiver }
    }

    /// Drains every pending snapshot and returns only the newest one.
    ///
    /// Returns `None` when nothing arrived since the last call. A closed
    /// stream behaves like an empty one.
    pub fn latest(&self) -> Option<Snapshot> {
        let mut latest = None;
        loop {
            match self.receiver.try_recv() {
                Ok(snapshot) => latest = Some(snapshot),
                Err(TryRecvError::Empty) | Err(TryRecvError::Disconnected) => return latest,
            }
        }
    }
}

/// Backend collaborator for keyed document collections.
pub trait DocumentStore {
    /// Inserts a document and returns the store-generated key.
    fn insert_document(&self, collection: &str, fields: &Value) -> StoreResult<DocId>;
    /// Overwrites all fields of an existing document.
    fn set_document(&self, collection: &str, doc_id: &str, fields: &Value) -> StoreResult<()>;
    /// Removes one document.
    fn delete_document(&self, collection: &str, doc_id: &str) -> StoreResult<()>;
    /// Reads the current ordered snapshot of a collection.
    fn snapshot(&self, collection: &str) -> StoreResult<Snapshot>;
    /// Opens a change stream; the current snapshot is delivered immediately.
    fn subscribe(&self, collection: &str) -> StoreResult<Subscription>;
}

impl<T: DocumentStore + ?Sized> DocumentStore for &T {
    fn insert_document(&self, collection: &str, fields: &Value) -> StoreResult<DocId> {
        (**self).insert_document(collection, fields)
    }

    fn set_document(&self, collection: &str, doc_id: &str, fields: &Value) -> StoreResult<()> {
        (**self).set_document(collection, doc_id, fields)
    }

    fn delete_document(&self, collection: &str, doc_id: &str) -> StoreResult<()> {
        (**self).delete_document(collection, doc_id)
    }

    fn snapshot(&self, collection: &str) -> StoreResult<Snapshot> {
        (**self).snapshot(collection)
    }

    fn subscribe(&self, collection: &str) -> StoreResult<Subscription> {
        (**self).subscribe(collection)
    }
}
