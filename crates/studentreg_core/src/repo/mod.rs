//! Repository layer between the registration screen and the document store.
//!
//! # Responsibility
//! - Route record writes to create or update by document key presence.
//! - Own the rendered student list and publish it to observers.
//!
//! # Invariants
//! - The list only changes when a store snapshot is applied.
//! - Repository APIs return semantic errors (`NotFound`, `MissingDocId`) in
//!   addition to backend transport errors.

pub mod student_repo;
