//! Built-in dependency shapes.
//!
//! Scalar dependencies are declared through small spec traits (an
//! [`IntSpec`] names a tag, a target type, and an optional bound) and
//! carried by generic marker structs ([`RangedInt`] and friends) that do the
//! [`Dependency`] plumbing. [`Maybe`] and [`Multiple`] wrap any other
//! dependency; [`Selected`] resolves a choice among live store records;
//! [`Computed`] derives its value from earlier dependencies instead of the
//! document.

use std::marker::PhantomData;
use std::ops::RangeInclusive;

use async_trait::async_trait;
use serde::de::DeserializeOwned;

use confer_core::{Schema, SchemaKind, ValueKind};

use crate::dependency::Dependency;
use crate::environment::Environment;
use crate::errors::{ContractViolation, EnvError};
use crate::store::RecordStore;

/// Makes any dependency optional.
///
/// The schema wraps the inner requirement in `optional`; an explicit `empty`
/// in the document injects as `None`, anything else is handed to the inner
/// dependency and injects as `Some`.
pub struct Maybe<D>(PhantomData<D>);

#[async_trait]
impl<D: Dependency> Dependency for Maybe<D> {
    const TAG: &'static str = D::TAG;
    type Value = Option<D::Value>;

    async fn requirements(store: &dyn RecordStore) -> Result<SchemaKind, EnvError> {
        Ok(SchemaKind::Optional(Box::new(D::requirements(store).await?)))
    }

    async fn inject(
        kind: ValueKind,
        env: &Environment,
        store: &dyn RecordStore,
    ) -> Result<Self::Value, EnvError> {
        if kind.is_empty() {
            return Ok(None);
        }
        Ok(Some(D::inject(kind, env, store).await?))
    }
}

/// A homogeneous list of another dependency's values.
///
/// Elements inject strictly left to right: each element's injector runs to
/// completion, store I/O included, before the next element starts.
pub struct Multiple<D>(PhantomData<D>);

#[async_trait]
impl<D: Dependency> Dependency for Multiple<D> {
    const TAG: &'static str = D::TAG;
    type Value = Vec<D::Value>;

    async fn requirements(store: &dyn RecordStore) -> Result<SchemaKind, EnvError> {
        Ok(SchemaKind::List(Box::new(D::requirements(store).await?)))
    }

    async fn inject(
        kind: ValueKind,
        env: &Environment,
        store: &dyn RecordStore,
    ) -> Result<Self::Value, EnvError> {
        let elements = match kind {
            ValueKind::List(elements) => elements,
            other => return Err(ContractViolation::kind_mismatch("list", &other).into()),
        };
        let mut values = Vec::with_capacity(elements.len());
        for element in elements {
            values.push(D::inject(element, env, store).await?);
        }
        Ok(values)
    }
}

/// Declares an integer dependency: a tag, a target type, and an optional
/// closed bound checked by the matcher before injection ever runs.
pub trait IntSpec: 'static {
    const TAG: &'static str;

    /// Target type, converted from the wire integer via `TryFrom`.
    type Value: TryFrom<i64> + Send + Sync + 'static;

    /// Accepted closed range; `None` accepts any wire integer.
    fn range() -> Option<RangeInclusive<i64>> {
        None
    }
}

/// Carrier for an [`IntSpec`].
pub struct RangedInt<S>(PhantomData<S>);

#[async_trait]
impl<S: IntSpec> Dependency for RangedInt<S> {
    const TAG: &'static str = S::TAG;
    type Value = S::Value;

    async fn requirements(_store: &dyn RecordStore) -> Result<SchemaKind, EnvError> {
        Ok(SchemaKind::Int { range: S::range() })
    }

    async fn inject(
        kind: ValueKind,
        _env: &Environment,
        _store: &dyn RecordStore,
    ) -> Result<Self::Value, EnvError> {
        let raw = match kind {
            ValueKind::Int(raw) => raw,
            other => return Err(ContractViolation::kind_mismatch("int", &other).into()),
        };
        S::Value::try_from(raw).map_err(|_| {
            EnvError::Contract(ContractViolation::Unrepresentable {
                found: raw.to_string(),
                detail: format!("does not fit {}", std::any::type_name::<S::Value>()),
            })
        })
    }
}

/// Declares a floating-point dependency with an optional closed bound.
pub trait DoubleSpec: 'static {
    const TAG: &'static str;

    type Value: TryFrom<f64> + Send + Sync + 'static;

    fn range() -> Option<RangeInclusive<f64>> {
        None
    }
}

/// Carrier for a [`DoubleSpec`].
pub struct RangedDouble<S>(PhantomData<S>);

#[async_trait]
impl<S: DoubleSpec> Dependency for RangedDouble<S> {
    const TAG: &'static str = S::TAG;
    type Value = S::Value;

    async fn requirements(_store: &dyn RecordStore) -> Result<SchemaKind, EnvError> {
        Ok(SchemaKind::Double { range: S::range() })
    }

    async fn inject(
        kind: ValueKind,
        _env: &Environment,
        _store: &dyn RecordStore,
    ) -> Result<Self::Value, EnvError> {
        let raw = match kind {
            ValueKind::Double(raw) => raw,
            other => return Err(ContractViolation::kind_mismatch("double", &other).into()),
        };
        S::Value::try_from(raw).map_err(|_| {
            EnvError::Contract(ContractViolation::Unrepresentable {
                found: raw.to_string(),
                detail: format!("does not fit {}", std::any::type_name::<S::Value>()),
            })
        })
    }
}

/// Declares a string dependency with an optional length cap.
///
/// The cap counts characters, not bytes.
pub trait StringSpec: 'static {
    const TAG: &'static str;

    type Value: TryFrom<String> + Send + Sync + 'static;

    fn max_length() -> Option<usize> {
        None
    }
}

/// Carrier for a [`StringSpec`].
pub struct CappedString<S>(PhantomData<S>);

#[async_trait]
impl<S: StringSpec> Dependency for CappedString<S> {
    const TAG: &'static str = S::TAG;
    type Value = S::Value;

    async fn requirements(_store: &dyn RecordStore) -> Result<SchemaKind, EnvError> {
        Ok(SchemaKind::RawString {
            max_length: S::max_length(),
        })
    }

    async fn inject(
        kind: ValueKind,
        _env: &Environment,
        _store: &dyn RecordStore,
    ) -> Result<Self::Value, EnvError> {
        let raw = match kind {
            ValueKind::RawString(raw) => raw,
            other => return Err(ContractViolation::kind_mismatch("rawString", &other).into()),
        };
        let display = raw.clone();
        S::Value::try_from(raw).map_err(|_| {
            EnvError::Contract(ContractViolation::Unrepresentable {
                found: format!("{display:?}"),
                detail: format!("rejected by {}", std::any::type_name::<S::Value>()),
            })
        })
    }
}

/// Declares a dependency chosen from the live records of one store
/// collection.
pub trait SelectSpec: 'static {
    const TAG: &'static str;

    /// Store collection the alternatives are enumerated from.
    const COLLECTION: &'static str;

    /// Decoded record type.
    type Record: DeserializeOwned + Send + Sync + 'static;
}

/// Selection-by-identifier carrier for a [`SelectSpec`].
///
/// Requirements enumerate every record currently in the collection as a
/// named alternative carrying that record's id; injection re-fetches the
/// chosen id. A record that disappears between the two reads is a
/// store-state race and surfaces as
/// [`ContractViolation::RecordVanished`], not as a document problem.
pub struct Selected<S>(PhantomData<S>);

#[async_trait]
impl<S: SelectSpec> Dependency for Selected<S> {
    const TAG: &'static str = S::TAG;
    type Value = S::Record;

    async fn requirements(store: &dyn RecordStore) -> Result<SchemaKind, EnvError> {
        let records = store.list_all(S::COLLECTION).await?;
        let possible_values = records
            .into_iter()
            .map(|record| Schema::new(record.name, SchemaKind::Id { id: record.id }))
            .collect();
        Ok(SchemaKind::Selection { possible_values })
    }

    async fn inject(
        kind: ValueKind,
        _env: &Environment,
        store: &dyn RecordStore,
    ) -> Result<Self::Value, EnvError> {
        let chosen = match kind {
            ValueKind::Selection { value } => *value,
            other => return Err(ContractViolation::kind_mismatch("selection", &other).into()),
        };
        let id = match chosen.kind {
            ValueKind::Id { id } => id,
            other => return Err(ContractViolation::kind_mismatch("id", &other).into()),
        };
        let body = store.find_by_id(S::COLLECTION, id).await?.ok_or_else(|| {
            EnvError::Contract(ContractViolation::RecordVanished {
                collection: S::COLLECTION.to_string(),
                id,
            })
        })?;
        let record =
            serde_json::from_value(body).map_err(|e| EnvError::Store(e.into()))?;
        Ok(record)
    }
}

/// Declares a value computed in code from earlier dependencies instead of
/// supplied by the document.
#[async_trait]
pub trait ComputeSpec: 'static {
    const TAG: &'static str;

    type Value: Send + Sync + 'static;

    /// Derive the value; may read any dependency registered earlier.
    async fn compute(env: &Environment, store: &dyn RecordStore)
        -> Result<Self::Value, EnvError>;
}

/// Carrier for a [`ComputeSpec`]; the document supplies the bare `auto`
/// placeholder and nothing else.
pub struct Computed<S>(PhantomData<S>);

#[async_trait]
impl<S: ComputeSpec> Dependency for Computed<S> {
    const TAG: &'static str = S::TAG;
    type Value = S::Value;

    async fn requirements(_store: &dyn RecordStore) -> Result<SchemaKind, EnvError> {
        Ok(SchemaKind::Auto)
    }

    async fn inject(
        kind: ValueKind,
        env: &Environment,
        store: &dyn RecordStore,
    ) -> Result<Self::Value, EnvError> {
        if !matches!(kind, ValueKind::Auto) {
            return Err(ContractViolation::kind_mismatch("auto", &kind).into());
        }
        S::compute(env, store).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::MemoryStore;
    use confer_core::Value;
    use pretty_assertions::assert_eq;
    use serde::{Deserialize, Serialize};
    use uuid::Uuid;

    struct Port;
    impl IntSpec for Port {
        const TAG: &'static str = "port";
        type Value = u16;
        fn range() -> Option<RangeInclusive<i64>> {
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

    struct Jitter;
    impl DoubleSpec for Jitter {
        const TAG: &'static str = "jitter";
        type Value = f64;
        fn range() -> Option<RangeInclusive<f64>> {
            Some(0.0..=1.0)
        }
    }

    fn empty_env() -> Environment {
        Environment::unresolved(Vec::new())
    }

    #[tokio::test]
    async fn test_ranged_int_bound_and_narrowing() {
        let store = MemoryStore::new();
        let kind = RangedInt::<Port>::requirements(&store).await.unwrap();
        assert_eq!(kind, SchemaKind::int_in(1..=65535));

        let value = RangedInt::<Port>::inject(ValueKind::Int(8080), &empty_env(), &store)
            .await
            .unwrap();
        assert_eq!(value, 8080u16);
    }

    #[tokio::test]
    async fn test_ranged_int_rejects_foreign_kind() {
        let store = MemoryStore::new();
        let err = RangedInt::<Port>::inject(ValueKind::string("8080"), &empty_env(), &store)
            .await
            .unwrap_err();
        match err {
            EnvError::Contract(ContractViolation::KindMismatch { expected, found }) => {
                assert_eq!(expected, "int");
                assert_eq!(found, "rawString");
            }
            other => panic!("expected a kind mismatch, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_unrepresentable_value() {
        // An i64 bound wider than the u16 target admits 100000.
        struct WidePort;
        impl IntSpec for WidePort {
            const TAG: &'static str = "widePort";
            type Value = u16;
            fn range() -> Option<RangeInclusive<i64>> {
                Some(1..=1_000_000)
            }
        }

        let store = MemoryStore::new();
        let err = RangedInt::<WidePort>::inject(ValueKind::Int(100_000), &empty_env(), &store)
            .await
            .unwrap_err();
        assert!(matches!(
            err,
            EnvError::Contract(ContractViolation::Unrepresentable { .. })
        ));
    }

    #[tokio::test]
    async fn test_capped_string_and_ranged_double() {
        let store = MemoryStore::new();
        let host = CappedString::<Host>::inject(
            ValueKind::string("example.com"),
            &empty_env(),
            &store,
        )
        .await
        .unwrap();
        assert_eq!(host, "example.com");

        let jitter = RangedDouble::<Jitter>::inject(ValueKind::Double(0.25), &empty_env(), &store)
            .await
            .unwrap();
        assert_eq!(jitter, 0.25);
    }

    #[tokio::test]
    async fn test_maybe_maps_empty_to_none() {
        let store = MemoryStore::new();
        let kind = Maybe::<RangedInt<Port>>::requirements(&store).await.unwrap();
        assert_eq!(kind, SchemaKind::optional(SchemaKind::int_in(1..=65535)));

        let none = Maybe::<RangedInt<Port>>::inject(ValueKind::Empty, &empty_env(), &store)
            .await
            .unwrap();
        assert_eq!(none, None);

        let some = Maybe::<RangedInt<Port>>::inject(ValueKind::Int(443), &empty_env(), &store)
            .await
            .unwrap();
        assert_eq!(some, Some(443u16));
    }

    #[tokio::test]
    async fn test_multiple_preserves_order() {
        let store = MemoryStore::new();
        let kind = Multiple::<CappedString<Host>>::requirements(&store)
            .await
            .unwrap();
        assert_eq!(kind, SchemaKind::list(SchemaKind::string_capped(255)));

        let hosts = Multiple::<CappedString<Host>>::inject(
            ValueKind::List(vec![
                ValueKind::string("a.example.com"),
                ValueKind::string("b.example.com"),
            ]),
            &empty_env(),
            &store,
        )
        .await
        .unwrap();
        assert_eq!(hosts, vec!["a.example.com", "b.example.com"]);
    }

    #[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
    struct Theme {
        accent: String,
    }

    struct ActiveTheme;
    impl SelectSpec for ActiveTheme {
        const TAG: &'static str = "theme";
        const COLLECTION: &'static str = "themes";
        type Record = Theme;
    }

    #[tokio::test]
    async fn test_selected_enumerates_live_records() {
        let mut store = MemoryStore::new();
        let dark = store
            .insert("themes", "dark", &Theme { accent: "teal".into() })
            .unwrap();
        let light = store
            .insert("themes", "light", &Theme { accent: "coral".into() })
            .unwrap();

        let kind = Selected::<ActiveTheme>::requirements(&store).await.unwrap();
        assert_eq!(
            kind,
            SchemaKind::selection(vec![
                Schema::new("dark", SchemaKind::id(dark)),
                Schema::new("light", SchemaKind::id(light)),
            ])
        );
    }

    #[tokio::test]
    async fn test_selected_injects_chosen_record() {
        let mut store = MemoryStore::new();
        let dark = store
            .insert("themes", "dark", &Theme { accent: "teal".into() })
            .unwrap();

        let chosen = ValueKind::selection(Value::new("dark", ValueKind::Id { id: dark }));
        let theme = Selected::<ActiveTheme>::inject(chosen, &empty_env(), &store)
            .await
            .unwrap();
        assert_eq!(theme, Theme { accent: "teal".into() });
    }

    #[tokio::test]
    async fn test_vanished_record_contract_violation() {
        let store = MemoryStore::new();
        let gone = Uuid::now_v7();
        let chosen = ValueKind::selection(Value::new("dark", ValueKind::Id { id: gone }));
        let err = Selected::<ActiveTheme>::inject(chosen, &empty_env(), &store)
            .await
            .unwrap_err();
        match err {
            EnvError::Contract(ContractViolation::RecordVanished { collection, id }) => {
                assert_eq!(collection, "themes");
                assert_eq!(id, gone);
            }
            other => panic!("expected a vanished record, got {other:?}"),
        }
    }

    struct Greeting;
    #[async_trait]
    impl ComputeSpec for Greeting {
        const TAG: &'static str = "greeting";
        type Value = String;

        async fn compute(
            _env: &Environment,
            _store: &dyn RecordStore,
        ) -> Result<Self::Value, EnvError> {
            Ok("hello".to_string())
        }
    }

    #[tokio::test]
    async fn test_computed_requires_auto() {
        let store = MemoryStore::new();
        assert_eq!(
            Computed::<Greeting>::requirements(&store).await.unwrap(),
            SchemaKind::Auto
        );

        let value = Computed::<Greeting>::inject(ValueKind::Auto, &empty_env(), &store)
            .await
            .unwrap();
        assert_eq!(value, "hello");

        let err = Computed::<Greeting>::inject(ValueKind::Int(1), &empty_env(), &store)
            .await
            .unwrap_err();
        assert!(matches!(
            err,
            EnvError::Contract(ContractViolation::KindMismatch { .. })
        ));
    }
}
