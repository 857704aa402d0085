//! Value trees: what a deployment document actually supplied.

use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// A named value node, mirroring [`crate::Schema`] on the document side.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Value {
    pub name: String,
    pub kind: ValueKind,
}

/// One concrete value shape.
///
/// Shares the wire conventions of [`crate::SchemaKind`]: externally tagged,
/// camelCase. `ValueKind::Int(8080)` is `{"int":8080}` on the wire and the
/// unit markers are the bare strings `"empty"` and `"auto"`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", rename_all_fields = "camelCase")]
pub enum ValueKind {
    Int(i64),
    Double(f64),
    RawString(String),
    Id { id: Uuid },
    /// The alternative a document committed to.
    Selection { value: Box<Value> },
    List(Vec<ValueKind>),
    Cons(Vec<Value>),
    /// Deliberate absence, only admissible under an optional schema.
    Empty,
    /// Placeholder for a value computed in code.
    Auto,
}

impl Value {
    pub fn new(name: impl Into<String>, kind: ValueKind) -> Self {
        Self {
            name: name.into(),
            kind,
        }
    }
}

impl ValueKind {
    pub fn string(value: impl Into<String>) -> Self {
        ValueKind::RawString(value.into())
    }

    /// Wrap the chosen alternative of a selection.
    pub fn selection(value: Value) -> Self {
        ValueKind::Selection {
            value: Box::new(value),
        }
    }

    /// The wire tag of this kind, as used in diagnostics.
    pub fn kind_name(&self) -> &'static str {
        match self {
            ValueKind::Int(_) => "int",
            ValueKind::Double(_) => "double",
            ValueKind::RawString(_) => "rawString",
            ValueKind::Id { .. } => "id",
            ValueKind::Selection { .. } => "selection",
            ValueKind::List(_) => "list",
            ValueKind::Cons(_) => "cons",
            ValueKind::Empty => "empty",
            ValueKind::Auto => "auto",
        }
    }

    pub fn as_int(&self) -> Option<i64> {
        match self {
            ValueKind::Int(v) => Some(*v),
            _ => None,
        }
    }

    pub fn as_double(&self) -> Option<f64> {
        match self {
            ValueKind::Double(v) => Some(*v),
            _ => None,
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            ValueKind::RawString(s) => Some(s),
            _ => None,
        }
    }

    pub fn as_id(&self) -> Option<Uuid> {
        match self {
            ValueKind::Id { id } => Some(*id),
            _ => None,
        }
    }

    pub fn is_empty(&self) -> bool {
        matches!(self, ValueKind::Empty)
    }
}
