//! FFI use-case API for the Flutter registration screen.
//!
//! # Responsibility
//! - Expose list/submit/delete use-cases to Dart via FRB.
//! - Keep error semantics simple: every call returns an envelope.
//!
//! # Invariants
//! - Exported functions must not panic across the FFI boundary.
//! - Form state lives in Dart; each submit carries the whole form.
//! - Submit reports backend failures but the caller still clears its form.

use log::warn;
use std::sync::OnceLock;
use studentreg_core::db::open_db;
use studentreg_core::{
    core_version as core_version_inner, init_logging as init_logging_inner, ping as ping_inner,
    RegistrationForm, RegistryConfig, RepoResult, SqliteDocumentStore, Student, StudentCard,
    StudentRepository, SubmitAction,
};

static REGISTRY_CONFIG: OnceLock<RegistryConfig> = OnceLock::new();

/// Minimal health-check API for FRB smoke integration.
///
/// # FFI contract
/// - Sync call, non-blocking.
/// - Never throws; always returns a UTF-8 string.
#[flutter_rust_bridge::frb(sync)]
pub fn ping() -> String {
    ping_inner().to_owned()
}

/// Expose core crate version through FFI.
#[flutter_rust_bridge::frb(sync)]
pub fn core_version() -> String {
    core_version_inner().to_owned()
}

/// Initializes Rust core logging once per process.
///
/// Input semantics:
/// - `level`: one of `trace|debug|info|warn|error` (case-insensitive).
/// - `log_dir`: absolute directory path where rolling logs are written.
///
/// # FFI contract
/// - Safe to call repeatedly with the same `level + log_dir`.
/// - Returns empty string on success and error message on failure.
#[flutter_rust_bridge::frb(sync)]
pub fn init_logging(level: String, log_dir: String) -> String {
    match init_logging_inner(level.as_str(), log_dir.as_str()) {
        Ok(()) => String::new(),
        Err(err) => err.to_string(),
    }
}

/// One list entry as rendered by the screen.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StudentItem {
    /// Backend key used by edit/delete buttons.
    pub doc_id: String,
    pub id: String,
    pub name: String,
    pub program: String,
    pub phones: Vec<String>,
    /// Pre-formatted card lines (`ID: ..`, `Name: ..`, ...).
    pub card_lines: Vec<String>,
}

/// List response envelope.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StudentListResponse {
    pub ok: bool,
    /// Items in snapshot order (empty on failure).
    pub items: Vec<StudentItem>,
    pub message: String,
}

/// Whole form as held by the Dart screen at submit time.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct StudentFormInput {
    pub student_id: String,
    pub name: String,
    pub program: String,
    pub phones: Vec<String>,
    /// Set while editing a listed record; `None` creates.
    pub editing_doc_id: Option<String>,
}

/// Generic action response envelope.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StudentActionResponse {
    pub ok: bool,
    /// Key of the created/updated/deleted document.
    pub doc_id: Option<String>,
    pub message: String,
}

impl StudentActionResponse {
    fn success(message: impl Into<String>, doc_id: String) -> Self {
        Self {
            ok: true,
            doc_id: Some(doc_id),
            message: message.into(),
        }
    }

    fn failure(message: impl Into<String>) -> Self {
        Self {
            ok: false,
            doc_id: None,
            message: message.into(),
        }
    }
}

/// Lists registered students.
///
/// # FFI contract
/// - Sync call, DB-backed execution.
/// - Never panics.
#[flutter_rust_bridge::frb(sync)]
pub fn student_list() -> StudentListResponse {
    match with_repo(|repo| Ok(repo.students().iter().map(to_student_item).collect::<Vec<_>>())) {
        Ok(items) => {
            let message = if items.is_empty() {
                "No students.".to_string()
            } else {
                format!("{} student(s).", items.len())
            };
            StudentListResponse {
                ok: true,
                items,
                message,
            }
        }
        Err(err) => StudentListResponse {
            ok: false,
            items: Vec::new(),
            message: format!("student_list failed: {err}"),
        },
    }
}

/// Submits the form: updates when `editing_doc_id` is set, creates otherwise.
///
/// # FFI contract
/// - Sync call, DB-backed execution.
/// - Never panics.
/// - Returns the written document key on success.
#[flutter_rust_bridge::frb(sync)]
pub fn student_submit(input: StudentFormInput) -> StudentActionResponse {
    let mut form = form_from_input(input);
    let outcome = with_repo(|repo| Ok(form.submit(repo)));

    match outcome {
        Ok(outcome) => match (outcome.action, outcome.result) {
            (SubmitAction::Create, Ok(saved)) => {
                StudentActionResponse::success("Student added.", saved.doc_id().to_string())
            }
            (SubmitAction::Update(_), Ok(saved)) => {
                StudentActionResponse::success("Student updated.", saved.doc_id().to_string())
            }
            (_, Err(err)) => {
                StudentActionResponse::failure(format!("student_submit failed: {err}"))
            }
        },
        Err(err) => StudentActionResponse::failure(format!("student_submit failed: {err}")),
    }
}

/// Deletes one listed student by document key. No confirmation step.
///
/// # FFI contract
/// - Sync call, DB-backed execution.
/// - Never panics.
#[flutter_rust_bridge::frb(sync)]
pub fn student_delete(doc_id: String) -> StudentActionResponse {
    let doc_id = doc_id.trim().to_string();
    let result = with_repo(|repo| {
        let target = Student::default().with_doc_id(doc_id.clone());
        RegistrationForm::new().delete_entry(repo, &target)
    });

    match result {
        Ok(()) => StudentActionResponse::success("Student deleted.", doc_id),
        Err(err) => StudentActionResponse::failure(format!("student_delete failed: {err}")),
    }
}

fn form_from_input(input: StudentFormInput) -> RegistrationForm {
    let student = Student::new(input.student_id, input.name, input.program, input.phones)
        .with_doc_id(input.editing_doc_id.unwrap_or_default().trim());
    let mut form = RegistrationForm::new();
    form.begin_edit(&student);
    form
}

fn registry_config() -> &'static RegistryConfig {
    REGISTRY_CONFIG.get_or_init(RegistryConfig::from_env)
}

fn with_repo<T>(
    f: impl FnOnce(&StudentRepository<SqliteDocumentStore<'_>>) -> RepoResult<T>,
) -> Result<T, String> {
    let config = registry_config();
    let conn = open_db(&config.db_path).map_err(|err| format!("registry DB open failed: {err}"))?;
    let repo = StudentRepository::new(SqliteDocumentStore::new(&conn), config.collection.as_str())
        .map_err(|err| {
            warn!(
                "event=ffi_repo_open module=ffi status=error collection={} error={}",
                config.collection, err
            );
            format!("registry load failed: {err}")
        })?;
    f(&repo).map_err(|err| err.to_string())
}

fn to_student_item(student: &Student) -> StudentItem {
    StudentItem {
        doc_id: student.doc_id.clone(),
        id: student.id.clone(),
        name: student.name.clone(),
        program: student.program.clone(),
        phones: student.phones.clone(),
        card_lines: StudentCard::from(student).lines,
    }
}
