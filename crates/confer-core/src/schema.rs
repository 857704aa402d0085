//! Schema trees: the shape a deployment document must satisfy.

use std::ops::RangeInclusive;

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::value::{Value, ValueKind};

/// A named schema node.
///
/// `name` is the owning dependency's stable tag. Name uniqueness among
/// siblings is the registry's responsibility and is not enforced here.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Schema {
    pub name: String,
    pub kind: SchemaKind,
}

/// The shape and constraints one value tree must satisfy.
///
/// Serializes as externally tagged JSON with camelCase tags, so
/// `SchemaKind::Int { range: None }` becomes `{"int":{"range":null}}` and
/// `SchemaKind::Auto` becomes `"auto"`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", rename_all_fields = "camelCase")]
pub enum SchemaKind {
    /// A 64-bit integer, optionally confined to a closed range.
    Int { range: Option<RangeInclusive<i64>> },
    /// A floating-point number, optionally confined to a closed range.
    Double { range: Option<RangeInclusive<f64>> },
    /// A string, optionally capped at a maximum length in characters.
    RawString { max_length: Option<usize> },
    /// Exactly one acceptable record identifier.
    Id { id: Uuid },
    /// A choice among named alternatives; a document commits to one of them.
    Selection { possible_values: Vec<Schema> },
    /// A homogeneous list of the given element shape.
    List(Box<SchemaKind>),
    /// A fixed-arity composite of named fields, matched by position.
    Cons(Vec<Schema>),
    /// The inner shape, or an explicit `empty` marker.
    Optional(Box<SchemaKind>),
    /// Computed in code from other resolved values; a document supplies the
    /// `auto` placeholder and nothing else.
    Auto,
}

impl Schema {
    pub fn new(name: impl Into<String>, kind: SchemaKind) -> Self {
        Self {
            name: name.into(),
            kind,
        }
    }

    /// Produce the skeleton document an operator would start from.
    ///
    /// Names are carried over unchanged. Leaves that require operator input
    /// scaffold to [`ValueKind::Empty`]; the two kinds a machine can already
    /// fill in are prefilled (`Id` with its sole acceptable identifier,
    /// `Auto` with the `auto` placeholder).
    pub fn scaffold(&self) -> Value {
        Value::new(self.name.clone(), self.kind.scaffold())
    }
}

impl SchemaKind {
    /// An unconstrained integer.
    pub fn int() -> Self {
        SchemaKind::Int { range: None }
    }

    /// An integer confined to `range`.
    pub fn int_in(range: RangeInclusive<i64>) -> Self {
        SchemaKind::Int { range: Some(range) }
    }

    /// An unconstrained double.
    pub fn double() -> Self {
        SchemaKind::Double { range: None }
    }

    /// A double confined to `range`.
    pub fn double_in(range: RangeInclusive<f64>) -> Self {
        SchemaKind::Double { range: Some(range) }
    }

    /// An unconstrained string.
    pub fn string() -> Self {
        SchemaKind::RawString { max_length: None }
    }

    /// A string of at most `max_length` characters.
    pub fn string_capped(max_length: usize) -> Self {
        SchemaKind::RawString {
            max_length: Some(max_length),
        }
    }

    pub fn id(id: Uuid) -> Self {
        SchemaKind::Id { id }
    }

    pub fn selection(possible_values: Vec<Schema>) -> Self {
        SchemaKind::Selection { possible_values }
    }

    pub fn list(element: SchemaKind) -> Self {
        SchemaKind::List(Box::new(element))
    }

    pub fn cons(fields: Vec<Schema>) -> Self {
        SchemaKind::Cons(fields)
    }

    pub fn optional(inner: SchemaKind) -> Self {
        SchemaKind::Optional(Box::new(inner))
    }

    /// The wire tag of this kind, as used in diagnostics.
    pub fn kind_name(&self) -> &'static str {
        match self {
            SchemaKind::Int { .. } => "int",
            SchemaKind::Double { .. } => "double",
            SchemaKind::RawString { .. } => "rawString",
            SchemaKind::Id { .. } => "id",
            SchemaKind::Selection { .. } => "selection",
            SchemaKind::List(_) => "list",
            SchemaKind::Cons(_) => "cons",
            SchemaKind::Optional(_) => "optional",
            SchemaKind::Auto => "auto",
        }
    }

    /// Skeleton value for this kind. See [`Schema::scaffold`].
    pub fn scaffold(&self) -> ValueKind {
        match self {
            SchemaKind::Int { .. }
            | SchemaKind::Double { .. }
            | SchemaKind::RawString { .. }
            | SchemaKind::Selection { .. }
            | SchemaKind::List(_)
            | SchemaKind::Optional(_) => ValueKind::Empty,
            SchemaKind::Id { id } => ValueKind::Id { id: *id },
            SchemaKind::Cons(fields) => {
                ValueKind::Cons(fields.iter().map(Schema::scaffold).collect())
            }
            SchemaKind::Auto => ValueKind::Auto,
        }
    }
}
