use serde_json::{json, Value};
use std::cell::RefCell;
use std::rc::Rc;
use studentreg_core::db::{open_db, open_db_in_memory};
use studentreg_core::{
    DocId, DocumentStore, RepoError, SaveOutcome, Snapshot, SqliteDocumentStore, StoreError,
    StoreResult, Student, StudentRepository, Subscription,
};

fn student(id: &str, name: &str, program: &str) -> Student {
    Student::new(id, name, program, Vec::new())
}

#[test]
fn add_then_sync_assigns_doc_id_and_keeps_fields() {
    let conn = open_db_in_memory().unwrap();
    let mut repo =
        StudentRepository::with_default_collection(SqliteDocumentStore::new(&conn)).unwrap();
    assert!(repo.students().is_empty());

    let record = Student::new(
        "S1",
        "Ann",
        "CS",
        vec!["555-1000".to_string(), "555-1000".to_string()],
    );
    let doc_id = repo.add_student(&record).unwrap();
    assert!(!doc_id.is_empty());

    // Writes never touch the local list directly.
    assert!(repo.students().is_empty());
    assert!(repo.sync());

    let listed = repo.students();
    assert_eq!(listed.len(), 1);
    assert_eq!(listed[0].doc_id, doc_id);
    assert_eq!(listed[0].name, "Ann");
    assert_eq!(listed[0].program, "CS");
    assert_eq!(listed[0].phones, ["555-1000", "555-1000"]);
}

#[test]
fn empty_doc_id_routes_to_create() {
    let conn = open_db_in_memory().unwrap();
    let mut repo =
        StudentRepository::with_default_collection(SqliteDocumentStore::new(&conn)).unwrap();

    let first = repo.save_student(&student("S1", "Ann", "CS")).unwrap();
    let second = repo.save_student(&student("S1", "Ann", "CS")).unwrap();
    assert!(matches!(first, SaveOutcome::Created(_)));
    assert!(matches!(second, SaveOutcome::Created(_)));
    assert_ne!(first.doc_id(), second.doc_id());

    repo.sync();
    assert_eq!(repo.students().len(), 2);
}

#[test]
fn existing_doc_id_routes_to_update_without_duplicates() {
    let conn = open_db_in_memory().unwrap();
    let mut repo =
        StudentRepository::with_default_collection(SqliteDocumentStore::new(&conn)).unwrap();

    let doc_id = repo.add_student(&student("S1", "Ann", "CS")).unwrap();
    let edited = student("S1", "Anna", "CS").with_doc_id(doc_id.clone());

    assert_eq!(
        repo.save_student(&edited).unwrap(),
        SaveOutcome::Updated(doc_id.clone())
    );
    // add with a key is routed to update as well.
    assert_eq!(repo.add_student(&edited).unwrap(), doc_id);

    repo.sync();
    assert_eq!(repo.students().len(), 1);
    assert_eq!(repo.students()[0].name, "Anna");
    assert_eq!(repo.students()[0].doc_id, doc_id);
}

#[test]
fn update_and_delete_require_doc_id() {
    let conn = open_db_in_memory().unwrap();
    let repo =
        StudentRepository::with_default_collection(SqliteDocumentStore::new(&conn)).unwrap();

    let record = student("S1", "Ann", "CS");
    assert!(matches!(
        repo.update_student(&record).unwrap_err(),
        RepoError::MissingDocId
    ));
    assert!(matches!(
        repo.delete_student(&record).unwrap_err(),
        RepoError::MissingDocId
    ));
}

#[test]
fn update_of_removed_document_returns_not_found() {
    let conn = open_db_in_memory().unwrap();
    let repo =
        StudentRepository::with_default_collection(SqliteDocumentStore::new(&conn)).unwrap();

    let doc_id = repo.add_student(&student("S1", "Ann", "CS")).unwrap();
    let existing = student("S1", "Ann", "CS").with_doc_id(doc_id.clone());
    repo.delete_student(&existing).unwrap();

    let err = repo.update_student(&existing).unwrap_err();
    assert!(matches!(err, RepoError::NotFound(id) if id == doc_id));
    let err = repo.delete_student(&existing).unwrap_err();
    assert!(matches!(err, RepoError::NotFound(_)));
}

#[test]
fn delete_removes_exactly_one_and_keeps_order() {
    let conn = open_db_in_memory().unwrap();
    let mut repo =
        StudentRepository::with_default_collection(SqliteDocumentStore::new(&conn)).unwrap();

    for (id, name) in [("S1", "Ann"), ("S2", "Bo"), ("S3", "Cy"), ("S4", "Di")] {
        repo.add_student(&student(id, name, "CS")).unwrap();
    }
    repo.sync();

    let target = repo.students()[1].clone();
    repo.delete_student(&target).unwrap();
    repo.sync();

    let names: Vec<&str> = repo.students().iter().map(|s| s.name.as_str()).collect();
    assert_eq!(names, ["Ann", "Cy", "Di"]);
    assert!(repo.find(&target.doc_id).is_none());
}

#[test]
fn update_keeps_position_in_snapshot() {
    let conn = open_db_in_memory().unwrap();
    let mut repo =
        StudentRepository::with_default_collection(SqliteDocumentStore::new(&conn)).unwrap();

    let first = repo.add_student(&student("S1", "Ann", "CS")).unwrap();
    repo.add_student(&student("S2", "Bo", "EE")).unwrap();
    repo.update_student(&student("S1", "Anna", "CS").with_doc_id(first))
        .unwrap();
    repo.sync();

    let names: Vec<&str> = repo.students().iter().map(|s| s.name.as_str()).collect();
    assert_eq!(names, ["Anna", "Bo"]);
}

#[test]
fn observers_receive_each_applied_list() {
    let conn = open_db_in_memory().unwrap();
    let mut repo =
        StudentRepository::with_default_collection(SqliteDocumentStore::new(&conn)).unwrap();

    let seen = Rc::new(RefCell::new(Vec::<usize>::new()));
    let sink = Rc::clone(&seen);
    let observer = repo.observe(move |students| sink.borrow_mut().push(students.len()));

    repo.add_student(&student("S1", "Ann", "CS")).unwrap();
    repo.add_student(&student("S2", "Bo", "CS")).unwrap();
    // Two pending snapshots collapse into the newest one.
    assert!(repo.sync());
    assert!(!repo.sync());
    assert_eq!(*seen.borrow(), [2]);

    assert!(repo.unobserve(observer));
    assert!(!repo.unobserve(observer));
    repo.add_student(&student("S3", "Cy", "CS")).unwrap();
    repo.sync();
    assert_eq!(*seen.borrow(), [2]);
}

#[test]
fn existing_documents_load_on_construction() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("students.db");
    {
        let conn = open_db(&path).unwrap();
        let repo =
            StudentRepository::with_default_collection(SqliteDocumentStore::new(&conn)).unwrap();
        repo.add_student(&student("S1", "Ann", "CS")).unwrap();
    }

    let conn = open_db(&path).unwrap();
    let repo =
        StudentRepository::with_default_collection(SqliteDocumentStore::new(&conn)).unwrap();
    assert_eq!(repo.students().len(), 1);
    assert_eq!(repo.students()[0].id, "S1");
}

#[test]
fn undecodable_document_is_skipped_and_rest_of_list_applied() {
    let conn = open_db_in_memory().unwrap();
    let store = SqliteDocumentStore::new(&conn);
    let mut repo = StudentRepository::with_default_collection(&store).unwrap();

    repo.add_student(&student("S1", "Ann", "CS")).unwrap();
    store
        .insert_document("students", &json!({"name": 42}))
        .unwrap();
    repo.add_student(&student("S2", "Bo", "EE")).unwrap();
    assert!(repo.sync());

    let names: Vec<&str> = repo.students().iter().map(|s| s.name.as_str()).collect();
    assert_eq!(names, ["Ann", "Bo"]);
}

#[test]
fn undecodable_document_does_not_block_construction_or_delete() {
    let conn = open_db_in_memory().unwrap();
    let store = SqliteDocumentStore::new(&conn);
    store
        .insert_document("students", &json!({"id": "S1", "name": "Ann"}))
        .unwrap();
    let bad_doc_id = store
        .insert_document("students", &json!({"name": 42}))
        .unwrap();

    let mut repo = StudentRepository::with_default_collection(&store).unwrap();
    assert_eq!(repo.students().len(), 1);
    assert!(repo.find(&bad_doc_id).is_none());

    let target = Student::default().with_doc_id(bad_doc_id.clone());
    repo.delete_student(&target).unwrap();
    repo.sync();

    assert_eq!(repo.students().len(), 1);
    assert_eq!(store.snapshot("students").unwrap().len(), 1);
    let err = repo.delete_student(&target).unwrap_err();
    assert!(matches!(err, RepoError::NotFound(id) if id == bad_doc_id));
}

/// Store double whose writes always fail, as an unreachable backend would.
struct UnavailableStore<'a> {
    inner: &'a SqliteDocumentStore<'a>,
}

impl DocumentStore for UnavailableStore<'_> {
    fn insert_document(&self, _collection: &str, _fields: &Value) -> StoreResult<DocId> {
        Err(unavailable())
    }

    fn set_document(&self, _collection: &str, _doc_id: &str, _fields: &Value) -> StoreResult<()> {
        Err(unavailable())
    }

    fn delete_document(&self, _collection: &str, _doc_id: &str) -> StoreResult<()> {
        Err(unavailable())
    }

    fn snapshot(&self, collection: &str) -> StoreResult<Snapshot> {
        self.inner.snapshot(collection)
    }

    fn subscribe(&self, collection: &str) -> StoreResult<Subscription> {
        self.inner.subscribe(collection)
    }
}

fn unavailable() -> StoreError {
    StoreError::Db(studentreg_core::db::DbError::Sqlite(
        rusqlite::Error::InvalidQuery,
    ))
}

#[test]
fn failed_write_leaves_list_unchanged() {
    let conn = open_db_in_memory().unwrap();
    let store = SqliteDocumentStore::new(&conn);
    let seeded = store
        .insert_document("students", &json!({"id": "S1", "name": "Ann"}))
        .unwrap();

    let mut repo =
        StudentRepository::with_default_collection(UnavailableStore { inner: &store }).unwrap();
    assert_eq!(repo.students().len(), 1);

    let err = repo.add_student(&student("S2", "Bo", "CS")).unwrap_err();
    assert!(matches!(err, RepoError::Store(_)));
    let err = repo
        .update_student(&student("S1", "Anna", "CS").with_doc_id(seeded))
        .unwrap_err();
    assert!(matches!(err, RepoError::Store(_)));

    assert!(!repo.sync());
    assert_eq!(repo.students().len(), 1);
    assert_eq!(repo.students()[0].name, "Ann");
}
