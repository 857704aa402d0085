//! Structural matching between schema and value trees.
//!
//! Matching is pure and total: any schema/value pair yields a boolean, and
//! the same pair always yields the same answer. Optionality is resolved
//! before the shape comparison, so `Empty` is admissible exactly where the
//! schema says `Optional`.

use crate::schema::{Schema, SchemaKind};
use crate::value::{Value, ValueKind};

impl Schema {
    /// True when `value` carries this node's name and an admissible kind.
    pub fn admits(&self, value: &Value) -> bool {
        self.name == value.name && self.kind.admits(&value.kind)
    }
}

impl SchemaKind {
    /// True when `value` satisfies this shape and its constraints.
    pub fn admits(&self, value: &ValueKind) -> bool {
        match self {
            // Checked first so that Empty never reaches a shape comparison.
            SchemaKind::Optional(inner) => value.is_empty() || inner.admits(value),
            SchemaKind::Int { range } => match value {
                ValueKind::Int(v) => range.as_ref().map_or(true, |r| r.contains(v)),
                _ => false,
            },
            SchemaKind::Double { range } => match value {
                ValueKind::Double(v) => range.as_ref().map_or(true, |r| r.contains(v)),
                _ => false,
            },
            SchemaKind::RawString { max_length } => match value {
                ValueKind::RawString(s) => {
                    max_length.map_or(true, |max| s.chars().count() <= max)
                }
                _ => false,
            },
            SchemaKind::Id { id } => matches!(value, ValueKind::Id { id: given } if given == id),
            SchemaKind::Selection { possible_values } => match value {
                ValueKind::Selection { value } => {
                    possible_values.iter().any(|alt| alt.admits(value))
                }
                _ => false,
            },
            SchemaKind::List(element) => match value {
                ValueKind::List(elements) => elements.iter().all(|e| element.admits(e)),
                _ => false,
            },
            SchemaKind::Cons(fields) => match value {
                ValueKind::Cons(given) => {
                    fields.len() == given.len()
                        && fields.iter().zip(given).all(|(field, v)| field.admits(v))
                }
                _ => false,
            },
            SchemaKind::Auto => matches!(value, ValueKind::Auto),
        }
    }
}
