//! Domain model for student registration.
//!
//! # Responsibility
//! - Define the record shape shared by repository, form and FFI layers.
//!
//! # Invariants
//! - A record is new exactly when its `doc_id` is empty.
//! - The backend key (`doc_id`) is never part of the stored document body.

pub mod student;
