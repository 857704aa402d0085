//! Core data model for confer environments.
//!
//! A *schema* tree describes what a deployment document must provide; a
//! *value* tree is what a document actually provided. The two are linked by
//! the structural matcher ([`Schema::admits`]) and, when a document falls
//! short, by field-level diagnostics ([`diagnose`]).
//!
//! This crate is deliberately free of runtime concerns. Registration,
//! injection, and the resolved-environment container live in
//! `confer-runtime`.

pub mod diagnostics;
mod matcher;
pub mod schema;
pub mod value;

pub use diagnostics::{diagnose, Finding};
pub use schema::{Schema, SchemaKind};
pub use value::{Value, ValueKind};
