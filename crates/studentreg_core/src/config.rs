//! Runtime configuration for hosts embedding the registry core.
//!
//! # Responsibility
//! - Resolve database path and collection name from the environment.
//!
//! # Invariants
//! - Blank environment values fall back to defaults.

use crate::repo::student_repo::DEFAULT_COLLECTION;
use std::path::PathBuf;

pub const DB_PATH_ENV: &str = "STUDENTREG_DB_PATH";
pub const COLLECTION_ENV: &str = "STUDENTREG_COLLECTION";
pub const DEFAULT_DB_FILE_NAME: &str = "studentreg.sqlite3";

/// Where documents live and which collection the screen shows.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RegistryConfig {
    pub db_path: PathBuf,
    pub collection: String,
}

impl Default for RegistryConfig {
    fn default() -> Self {
        Self {
            db_path: std::env::temp_dir().join(DEFAULT_DB_FILE_NAME),
            collection: DEFAULT_COLLECTION.to_string(),
        }
    }
}

impl RegistryConfig {
    /// Reads `STUDENTREG_DB_PATH` and `STUDENTREG_COLLECTION`.
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let mut config = Self::default();
        if let Some(path) = non_blank(lookup(DB_PATH_ENV)) {
            config.db_path = PathBuf::from(path);
        }
        if let Some(collection) = non_blank(lookup(COLLECTION_ENV)) {
            config.collection = collection;
        }
        config
    }
}

fn non_blank(value: Option<String>) -> Option<String> {
    value
        .map(|raw| raw.trim().to_string())
        .filter(|trimmed| !trimmed.is_empty())
}
