//! Flutter bridge crate for the student registration core.

pub mod api;
