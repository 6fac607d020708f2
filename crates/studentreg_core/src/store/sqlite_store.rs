//! SQLite-backed document store.
//!
//! # Responsibility
//! - Persist documents of any collection as JSON bodies in `documents`.
//! - Generate opaque document keys on insert.
//! - Push full snapshots to subscribers after each successful write.
//!
//! # Invariants
//! - Snapshot order is `seq ASC` (creation order).
//! - A failed write publishes nothing.
//! - Publishing failures are logged and never turn a committed write into an
//!   error.

use super::{Document, DocumentStore, Snapshot, StoreError, StoreResult, Subscription};
use crate::model::student::DocId;
use log::{debug, warn};
use rusqlite::{params, Connection};
use serde_json::Value;
use std::cell::RefCell;
use std::sync::mpsc::{channel, Sender};
use uuid::Uuid;

struct Subscriber {
    collection: String,
    sender: Sender<Snapshot>,
}

/// Document store over a migrated SQLite connection.
pub struct SqliteDocumentStore<'conn> {
    conn: &'conn Connection,
    subscribers: RefCell<Vec<Subscriber>>,
}

impl<'conn> SqliteDocumentStore<'conn> {
    /// Wraps a connection returned by `db::open_db*`.
    pub fn new(conn: &'conn Connection) -> Self {
        Self {
            conn,
            subscribers: RefCell::new(Vec::new()),
        }
    }

    /// Returns the number of live subscriptions for `collection`.
    pub fn subscriber_count(&self, collection: &str) -> usize {
        self.subscribers
            .borrow()
            .iter()
            .filter(|subscriber| subscriber.collection == collection)
            .count()
    }

    fn publish(&self, collection: &str) {
        let snapshot = match self.snapshot(collection) {
            Ok(snapshot) => snapshot,
            Err(err) => {
                warn!(
                    "event=snapshot_publish module=store status=error collection={} error={}",
                    collection, err
                );
                return;
            }
        };

        let mut subscribers = self.subscribers.borrow_mut();
        // Dropped subscriptions are pruned on the next publish.
        subscribers.retain(|subscriber| {
            subscriber.collection != collection || subscriber.sender.send(snapshot.clone()).is_ok()
        });
        debug!(
            "event=snapshot_publish module=store status=ok collection={} documents={} subscribers={}",
            collection,
            snapshot.len(),
            subscribers
                .iter()
                .filter(|subscriber| subscriber.collection == collection)
                .count()
        );
    }
}

impl DocumentStore for SqliteDocumentStore<'_> {
    fn insert_document(&self, collection: &str, fields: &Value) -> StoreResult<DocId> {
        let body = serde_json::to_string(fields).map_err(StoreError::Encode)?;
        let doc_id = new_doc_id();

        self.conn.execute(
            "INSERT INTO documents (collection, doc_id, fields) VALUES (?1, ?2, ?3);",
            params![collection, doc_id.as_str(), body],
        )?;

        self.publish(collection);
        Ok(doc_id)
    }

    fn set_document(&self, collection: &str, doc_id: &str, fields: &Value) -> StoreResult<()> {
        let body = serde_json::to_string(fields).map_err(StoreError::Encode)?;

        let changed = self.conn.execute(
            "UPDATE documents
             SET
                fields = ?1,
                updated_at = (strftime('%s', 'now') * 1000)
             WHERE collection = ?2 AND doc_id = ?3;",
            params![body, collection, doc_id],
        )?;

        if changed == 0 {
            return Err(not_found(collection, doc_id));
        }

        self.publish(collection);
        Ok(())
    }

    fn delete_document(&self, collection: &str, doc_id: &str) -> StoreResult<()> {
        let changed = self.conn.execute(
            "DELETE FROM documents WHERE collection = ?1 AND doc_id = ?2;",
            params![collection, doc_id],
        )?;

        if changed == 0 {
            return Err(not_found(collection, doc_id));
        }

        self.publish(collection);
        Ok(())
    }

    fn snapshot(&self, collection: &str) -> StoreResult<Snapshot> {
        let mut stmt = self.conn.prepare(
            "SELECT doc_id, fields
             FROM documents
             WHERE collection = ?1
             ORDER BY seq ASC;",
        )?;

        let mut rows = stmt.query([collection])?;
        let mut documents = Vec::new();
        while let Some(row) = rows.next()? {
            let doc_id: String = row.get("doc_id")?;
            let body: String = row.get("fields")?;
            let fields = serde_json::from_str(&body).map_err(|source| StoreError::Decode {
                doc_id: doc_id.clone(),
                source,
            })?;
            documents.push(Document { doc_id, fields });
        }

        Ok(Snapshot {
            collection: collection.to_string(),
            documents,
        })
    }

    fn subscribe(&self, collection: &str) -> StoreResult<Subscription> {
        let initial = self.snapshot(collection)?;
        let (sender, receiver) = channel();
        // The receiver is still in scope, so this send cannot fail.
        let _ = sender.send(initial);

        self.subscribers.borrow_mut().push(Subscriber {
            collection: collection.to_string(),
            sender,
        });
        Ok(Subscription::new(receiver))
    }
}

fn new_doc_id() -> DocId {
    Uuid::new_v4().simple().to_string()
}

fn not_found(collection: &str, doc_id: &str) -> StoreError {
    StoreError::NotFound {
        collection: collection.to_string(),
        doc_id: doc_id.to_string(),
    }
}
