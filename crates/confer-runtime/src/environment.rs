//! The resolved-environment container.

use std::any::{Any, TypeId};
use std::collections::HashMap;
use std::fmt;

use crate::dependency::Dependency;
use crate::errors::{ContractViolation, EnvError};

/// Type-keyed container of resolved dependency values.
///
/// Built incrementally by [`crate::Registry::resolve`] and handed to the
/// caller only once every injector has run. During resolution, injectors
/// receive the partially populated container and may read dependencies
/// registered before their own; reading a later one fails with
/// [`ContractViolation::ReadBeforeResolved`].
pub struct Environment {
    /// Registered keys and tags, in registration order.
    tags: Vec<(TypeId, String)>,
    values: HashMap<TypeId, Box<dyn Any + Send + Sync>>,
    resolved: bool,
}

impl Environment {
    pub(crate) fn unresolved(tags: Vec<(TypeId, String)>) -> Self {
        Self {
            values: HashMap::with_capacity(tags.len()),
            tags,
            resolved: false,
        }
    }

    pub(crate) fn insert(&mut self, key: TypeId, value: Box<dyn Any + Send + Sync>) {
        self.values.insert(key, value);
    }

    pub(crate) fn mark_resolved(&mut self) {
        self.resolved = true;
    }

    /// Typed lookup of a resolved dependency value.
    ///
    /// Fails with [`ContractViolation::ReadBeforeResolved`] when `D` is
    /// registered but its injector has not run yet, and with
    /// [`ContractViolation::NeverRegistered`] when `D` is unknown to the
    /// owning registry.
    pub fn get<D: Dependency>(&self) -> Result<&D::Value, EnvError> {
        let key = TypeId::of::<D>();
        if let Some(slot) = self.values.get(&key) {
            let value = slot
                .downcast_ref::<D::Value>()
                .expect("environment slot holds a value of a foreign type");
            return Ok(value);
        }
        if let Some((_, tag)) = self.tags.iter().find(|(k, _)| *k == key) {
            return Err(ContractViolation::ReadBeforeResolved { tag: tag.clone() }.into());
        }
        Err(ContractViolation::NeverRegistered {
            type_name: std::any::type_name::<D>(),
        }
        .into())
    }

    /// True once every registered injector has completed.
    pub fn is_resolved(&self) -> bool {
        self.resolved
    }

    /// Number of values injected so far.
    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    /// Wire tags of the registered dependencies, in registration order.
    pub fn tags(&self) -> impl Iterator<Item = &str> {
        self.tags.iter().map(|(_, tag)| tag.as_str())
    }
}

impl fmt::Debug for Environment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Environment")
            .field("tags", &self.tags.iter().map(|(_, t)| t).collect::<Vec<_>>())
            .field("injected", &self.values.len())
            .field("resolved", &self.resolved)
            .finish()
    }
}
