//! Ordered dependency registry and the resolution pipeline.

use std::any::{Any, TypeId};
use std::fmt;
use std::path::Path;

use futures::future::BoxFuture;
use tracing::{debug, info, warn};

use confer_core::{Schema, SchemaKind, Value, ValueKind};

use crate::dependency::Dependency;
use crate::environment::Environment;
use crate::errors::EnvError;
use crate::store::RecordStore;

type Injected = Box<dyn Any + Send + Sync>;

type RequirementsFn =
    for<'a> fn(&'a dyn RecordStore) -> BoxFuture<'a, Result<Schema, EnvError>>;

type InjectFn = for<'a> fn(
    ValueKind,
    &'a Environment,
    &'a dyn RecordStore,
) -> BoxFuture<'a, Result<Injected, EnvError>>;

/// One registered dependency, erased to a requirements provider and an
/// injector keyed by the dependency's type.
struct EagerLoader {
    key: TypeId,
    tag: &'static str,
    requirements: RequirementsFn,
    inject: InjectFn,
}

fn requirements_of<D: Dependency>(
    store: &dyn RecordStore,
) -> BoxFuture<'_, Result<Schema, EnvError>> {
    Box::pin(async move {
        let kind = D::requirements(store).await?;
        Ok(Schema::new(D::TAG, kind))
    })
}

fn inject_of<'a, D: Dependency>(
    kind: ValueKind,
    env: &'a Environment,
    store: &'a dyn RecordStore,
) -> BoxFuture<'a, Result<Injected, EnvError>> {
    Box::pin(async move {
        let value = D::inject(kind, env, store).await?;
        Ok(Box::new(value) as Injected)
    })
}

/// Ordered collection of registered dependencies.
///
/// Order is append order and is never deduplicated or sorted: field *i* of
/// the composite schema always corresponds to loader *i*, and injectors run
/// in exactly this order.
#[derive(Default)]
pub struct Registry {
    loaders: Vec<EagerLoader>,
}

impl Registry {
    /// Name of the composite root in schemas and documents.
    pub const COMPOSITE_NAME: &'static str = "Env";

    pub fn new() -> Self {
        Self {
            loaders: Vec::new(),
        }
    }

    /// Append a dependency.
    ///
    /// Registration order is load-bearing: it fixes the composite field
    /// order and the injection order, and a dependency may only read
    /// dependencies registered before it.
    pub fn register<D: Dependency>(&mut self) {
        let key = TypeId::of::<D>();
        if self.loaders.iter().any(|loader| loader.key == key) {
            warn!(
                "dependency `{}` registered twice; the later injection wins its container slot",
                D::TAG
            );
        } else if self.loaders.iter().any(|loader| loader.tag == D::TAG) {
            warn!(
                "tag `{}` is already used by another dependency; fields stay positional but operator tooling may conflate them",
                D::TAG
            );
        }
        debug!("registered dependency `{}`", D::TAG);
        self.loaders.push(EagerLoader {
            key,
            tag: D::TAG,
            requirements: requirements_of::<D>,
            inject: inject_of::<D>,
        });
    }

    /// Number of registered dependencies.
    pub fn len(&self) -> usize {
        self.loaders.len()
    }

    pub fn is_empty(&self) -> bool {
        self.loaders.is_empty()
    }

    /// Compute the composite requirements, consulting the store afresh.
    ///
    /// Two calls may differ when the store changed in between; nothing is
    /// cached.
    pub async fn requirements(&self, store: &dyn RecordStore) -> Result<Schema, EnvError> {
        debug!(
            "computing composite requirements from {} dependencies",
            self.loaders.len()
        );
        let mut fields = Vec::with_capacity(self.loaders.len());
        for loader in &self.loaders {
            fields.push((loader.requirements)(store).await?);
        }
        Ok(Schema::new(Self::COMPOSITE_NAME, SchemaKind::Cons(fields)))
    }

    /// Validate `document` against freshly computed requirements, then run
    /// every injector in registration order.
    ///
    /// On rejection nothing is injected and the registry is unchanged, so a
    /// corrected document can be resolved with the same registry.
    pub async fn resolve(
        &self,
        document: Value,
        store: &dyn RecordStore,
    ) -> Result<Environment, EnvError> {
        let requirements = self.requirements(store).await?;

        if !requirements.admits(&document) {
            warn!("environment document `{}` rejected", document.name);
            return Err(EnvError::rejected(requirements, document));
        }

        let fields = match document.kind {
            ValueKind::Cons(fields) => fields,
            _ => unreachable!("a cons requirement only admits cons documents"),
        };

        let mut env = Environment::unresolved(
            self.loaders
                .iter()
                .map(|loader| (loader.key, loader.tag.to_string()))
                .collect(),
        );

        // Strictly sequential: injector i completes before i + 1 starts, so
        // later injectors can read earlier results.
        for (loader, field) in self.loaders.iter().zip(fields) {
            debug!("injecting dependency `{}`", loader.tag);
            let value = (loader.inject)(field.kind, &env, store).await?;
            env.insert(loader.key, value);
        }

        env.mark_resolved();
        info!(
            "environment resolved with {} dependencies",
            self.loaders.len()
        );
        Ok(env)
    }

    /// Read a JSON document from `path` and resolve it.
    pub async fn resolve_file(
        &self,
        path: &Path,
        store: &dyn RecordStore,
    ) -> Result<Environment, EnvError> {
        let raw = std::fs::read_to_string(path)?;
        let document: Value = serde_json::from_str(&raw)?;
        info!("resolving environment document from {}", path.display());
        self.resolve(document, store).await
    }
}

impl fmt::Debug for Registry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Registry")
            .field(
                "tags",
                &self.loaders.iter().map(|l| l.tag).collect::<Vec<_>>(),
            )
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::combinators::{CappedString, IntSpec, RangedInt, StringSpec};
    use crate::store::MemoryStore;
    use pretty_assertions::assert_eq;

    struct Port;
    impl IntSpec for Port {
        const TAG: &'static str = "port";
        type Value = u16;
        fn range() -> Option<std::ops::RangeInclusive<i64>> {
            Some(1..=65535)
        }
    }

    struct Host;
    impl StringSpec for Host {
        const TAG: &'static str = "host";
        type Value = String;
        fn max_length() -> Option<usize> {
            Some(255)
        }
    }

    #[tokio::test]
    async fn test_requirements_follow_registration_order() {
        let mut registry = Registry::new();
        registry.register::<RangedInt<Port>>();
        registry.register::<CappedString<Host>>();

        let store = MemoryStore::new();
        let requirements = registry.requirements(&store).await.unwrap();
        assert_eq!(
            requirements,
            Schema::new(
                "Env",
                SchemaKind::cons(vec![
                    Schema::new("port", SchemaKind::int_in(1..=65535)),
                    Schema::new("host", SchemaKind::string_capped(255)),
                ])
            )
        );
    }

    #[tokio::test]
    async fn test_registration_order_changes_shape() {
        let store = MemoryStore::new();

        let mut forward = Registry::new();
        forward.register::<RangedInt<Port>>();
        forward.register::<CappedString<Host>>();

        let mut reversed = Registry::new();
        reversed.register::<CappedString<Host>>();
        reversed.register::<RangedInt<Port>>();

        let a = forward.requirements(&store).await.unwrap();
        let b = reversed.requirements(&store).await.unwrap();
        assert_ne!(a, b);
    }

    #[tokio::test]
    async fn test_empty_registry_resolves_empty_document() {
        let registry = Registry::new();
        let store = MemoryStore::new();
        let document = Value::new("Env", ValueKind::Cons(Vec::new()));

        let env = registry.resolve(document, &store).await.unwrap();
        assert!(env.is_resolved());
        assert!(env.is_empty());
    }

    #[tokio::test]
    async fn test_duplicate_registration_appends() {
        let mut registry = Registry::new();
        registry.register::<RangedInt<Port>>();
        registry.register::<RangedInt<Port>>();
        assert_eq!(registry.len(), 2);

        let store = MemoryStore::new();
        let requirements = registry.requirements(&store).await.unwrap();
        match requirements.kind {
            SchemaKind::Cons(fields) => assert_eq!(fields.len(), 2),
            other => panic!("expected a cons composite, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_duplicate_registration_later_value_wins() {
        let mut registry = Registry::new();
        registry.register::<RangedInt<Port>>();
        registry.register::<RangedInt<Port>>();

        let store = MemoryStore::new();
        let document = Value::new(
            "Env",
            ValueKind::Cons(vec![
                Value::new("port", ValueKind::Int(1111)),
                Value::new("port", ValueKind::Int(2222)),
            ]),
        );

        let env = registry.resolve(document, &store).await.unwrap();
        assert_eq!(*env.get::<RangedInt<Port>>().unwrap(), 2222u16);
        assert_eq!(env.tags().collect::<Vec<_>>(), vec!["port", "port"]);
        // Two injections, one slot.
        assert_eq!(env.len(), 1);
    }

    #[test]
    fn test_debug_lists_tags() {
        let mut registry = Registry::new();
        registry.register::<RangedInt<Port>>();
        registry.register::<CappedString<Host>>();
        assert_eq!(format!("{registry:?}"), r#"Registry { tags: ["port", "host"] }"#);
    }
}
