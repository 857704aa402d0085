//! Runtime resolution for confer environments.
//!
//! Dependencies are declared as types implementing [`Dependency`], appended
//! in order to a [`Registry`], and resolved against an external document
//! into a typed [`Environment`]:
//!
//! ```ignore
//! let mut registry = Registry::new();
//! registry.register::<RangedInt<Port>>();
//! registry.register::<CappedString<Host>>();
//!
//! let env = registry.resolve(document, &store).await?;
//! let port = env.get::<RangedInt<Port>>()?;
//! ```
//!
//! Registration order is load-bearing: it fixes the composite schema's field
//! order, the injection order, and which dependencies may read which others
//! during injection.

pub mod combinators;
pub mod dependency;
pub mod environment;
pub mod errors;
pub mod registry;
pub mod store;

pub use combinators::{
    CappedString, Computed, ComputeSpec, DoubleSpec, IntSpec, Maybe, Multiple, RangedDouble,
    RangedInt, Selected, SelectSpec, StringSpec,
};
pub use dependency::Dependency;
pub use environment::Environment;
pub use errors::{ContractViolation, EnvError, RejectedDocument};
pub use registry::Registry;
pub use store::{MemoryStore, RecordRef, RecordStore, StoreError};
