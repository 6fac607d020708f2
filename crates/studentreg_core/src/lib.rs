//! Core domain logic for the student registration screen.
//! UI shells (FFI, CLI) call into this crate and never touch storage directly.

pub mod config;
pub mod db;
pub mod form;
pub mod logging;
pub mod model;
pub mod repo;
pub mod store;

pub use config::RegistryConfig;
pub use form::{
    student_cards, FormError, PhoneList, RegistrationForm, StudentCard, SubmitAction,
    SubmitOutcome,
};
pub use logging::{default_log_level, init_logging, logging_status, LogLevel, LoggingError};
pub use model::student::{DocId, Student, StudentDocument};
pub use repo::student_repo::{
    ObserverId, RepoError, RepoResult, SaveOutcome, StudentRepository, DEFAULT_COLLECTION,
};
pub use store::{
    Document, DocumentStore, Snapshot, SqliteDocumentStore, StoreError, StoreResult, Subscription,
};

/// Minimal health-check API for early integration.
pub fn ping() -> &'static str {
    "pong"
}

/// Returns the core crate version.
pub fn core_version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}

#[cfg(test)]
mod tests {
    use super::{core_version, ping};

    #[test]
    fn ping_returns_pong() {
        assert_eq!(ping(), "pong");
    }

    #[test]
    fn version_is_not_empty() {
        assert!(!core_version().is_empty());
    }
}
