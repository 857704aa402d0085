//! The contract every registrable dependency implements.

use async_trait::async_trait;
use confer_core::{SchemaKind, ValueKind};

use crate::environment::Environment;
use crate::errors::EnvError;
use crate::store::RecordStore;

/// A named, typed environment dependency.
///
/// Implementations are marker types; the type itself is the container
/// lookup key, so a dependency is usually a zero-sized struct that is never
/// instantiated. `requirements` may consult the record store (a selection
/// enumerates live records), which is why producing a schema fragment is
/// asynchronous in general.
///
/// `inject` only ever receives kinds the matcher has already admitted
/// against this dependency's own schema fragment; anything else is a
/// [`crate::ContractViolation::KindMismatch`]. Dependencies registered
/// earlier are readable from `env` during `inject`; reading one registered
/// later fails with [`crate::ContractViolation::ReadBeforeResolved`].
///
/// ```ignore
/// struct ApiToken;
///
/// #[async_trait]
/// impl Dependency for ApiToken {
///     const TAG: &'static str = "apiToken";
///     type Value = String;
///
///     async fn requirements(_: &dyn RecordStore) -> Result<SchemaKind, EnvError> {
///         Ok(SchemaKind::string_capped(64))
///     }
///
///     async fn inject(
///         kind: ValueKind,
///         _: &Environment,
///         _: &dyn RecordStore,
///     ) -> Result<String, EnvError> {
///         match kind {
///             ValueKind::RawString(token) => Ok(token),
///             other => Err(ContractViolation::kind_mismatch("rawString", &other).into()),
///         }
///     }
/// }
/// ```
#[async_trait]
pub trait Dependency: 'static {
    /// Stable field tag inside the composite document.
    const TAG: &'static str;

    /// The value this dependency resolves to.
    type Value: Send + Sync + 'static;

    /// Compute this dependency's slice of the composite requirements.
    async fn requirements(store: &dyn RecordStore) -> Result<SchemaKind, EnvError>;

    /// Turn an admitted value kind into the typed value.
    async fn inject(
        kind: ValueKind,
        env: &Environment,
        store: &dyn RecordStore,
    ) -> Result<Self::Value, EnvError>;
}
