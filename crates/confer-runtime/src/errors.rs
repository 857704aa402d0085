//! Error types for requirements computation and resolution.
//!
//! The split that matters to callers is rejection versus contract violation.
//! A [`EnvError::Rejected`] means the supplied document is wrong and a
//! corrected document will resolve; a [`EnvError::Contract`] means the
//! program itself misuses the system and no document edit can help.

use std::fmt;

use confer_core::{diagnose, Finding, Schema, Value, ValueKind};
use thiserror::Error;
use uuid::Uuid;

use crate::store::StoreError;

/// Everything that can go wrong while computing requirements or resolving
/// a document into an environment.
#[derive(Debug, Error)]
pub enum EnvError {
    /// The document does not satisfy the composite requirements. Correct the
    /// document and resolve again; the registry is unaffected.
    #[error("document rejected: {0}")]
    Rejected(Box<RejectedDocument>),

    /// A programming or integration bug, never fixable by editing the
    /// document.
    #[error("environment contract violated: {0}")]
    Contract(#[from] ContractViolation),

    /// The record store failed while computing requirements or injecting.
    #[error("record store failure: {0}")]
    Store(#[from] StoreError),

    /// An environment document file could not be read.
    #[error("could not read environment document: {0}")]
    Io(#[from] std::io::Error),

    /// An environment document could not be decoded from JSON.
    #[error("could not decode environment document: {0}")]
    Decode(#[from] serde_json::Error),
}

impl EnvError {
    pub(crate) fn rejected(requirements: Schema, document: Value) -> Self {
        EnvError::Rejected(Box::new(RejectedDocument {
            requirements,
            document,
        }))
    }

    /// True for failures a corrected document can fix.
    pub fn is_validation(&self) -> bool {
        matches!(self, EnvError::Rejected(_))
    }
}

/// A rejected document, kept together with the requirements it failed so
/// diagnostics can be produced after the fact.
#[derive(Debug, Clone, PartialEq)]
pub struct RejectedDocument {
    pub requirements: Schema,
    pub document: Value,
}

impl RejectedDocument {
    /// Field-level mismatch report: path, what was required, what was given.
    pub fn findings(&self) -> Vec<Finding> {
        diagnose(&self.requirements, &self.document)
    }
}

impl fmt::Display for RejectedDocument {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let findings = self.findings();
        write!(
            f,
            "{} mismatch(es) against requirements `{}`",
            findings.len(),
            self.requirements.name
        )?;
        if let Some(first) = findings.first() {
            write!(f, "; first: {first}")?;
        }
        Ok(())
    }
}

/// Misuses of the environment system by the hosting program.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ContractViolation {
    /// An injector read a dependency whose own injector has not run yet.
    #[error("dependency `{tag}` was read before it was injected; a dependency may only read ones registered before it")]
    ReadBeforeResolved { tag: String },

    /// A lookup for a dependency type that was never registered.
    #[error("dependency type `{type_name}` was never registered with this environment's registry")]
    NeverRegistered { type_name: &'static str },

    /// An injector received a value kind its own schema should have excluded.
    #[error("injector expected a `{expected}` value, got `{found}`")]
    KindMismatch {
        expected: &'static str,
        found: String,
    },

    /// A value passed its schema bound but cannot be represented in the
    /// declared target type.
    #[error("{found} passed its bound check but is not representable: {detail}")]
    Unrepresentable { found: String, detail: String },

    /// A selected record vanished from the store between schema computation
    /// and injection.
    #[error("record {id} vanished from collection `{collection}` between schema computation and injection")]
    RecordVanished { collection: String, id: Uuid },
}

impl ContractViolation {
    /// Shorthand for the common wrong-kind case in injectors.
    pub fn kind_mismatch(expected: &'static str, found: &ValueKind) -> Self {
        ContractViolation::KindMismatch {
            expected,
            found: found.kind_name().to_string(),
        }
    }
}
