//! Field-level explanations for schema/value mismatches.
//!
//! [`diagnose`] walks the two trees in lockstep and reports every point of
//! disagreement with a dotted path, so an operator can fix a rejected
//! document without reading the schema by hand. An empty report means the
//! same thing as [`Schema::admits`] returning true.

use std::fmt;

use crate::schema::{Schema, SchemaKind};
use crate::value::{Value, ValueKind};

/// One mismatch between a schema node and the value supplied for it.
#[derive(Debug, Clone, PartialEq)]
pub struct Finding {
    /// Dotted path from the composite root, with `[i]` for list positions.
    pub path: String,
    pub message: String,
    pub expected: Option<String>,
    pub actual: Option<String>,
}

impl Finding {
    fn new(path: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            path: path.into(),
            message: message.into(),
            expected: None,
            actual: None,
        }
    }

    fn with_expected(mut self, expected: impl Into<String>) -> Self {
        self.expected = Some(expected.into());
        self
    }

    fn with_actual(mut self, actual: impl Into<String>) -> Self {
        self.actual = Some(actual.into());
        self
    }
}

impl fmt::Display for Finding {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.path, self.message)?;
        match (&self.expected, &self.actual) {
            (Some(expected), Some(actual)) => {
                write!(f, " (expected {expected}, found {actual})")
            }
            (Some(expected), None) => write!(f, " (expected {expected})"),
            (None, Some(actual)) => write!(f, " (found {actual})"),
            (None, None) => Ok(()),
        }
    }
}

/// Explain every way `value` fails `schema`.
///
/// Returns an empty vector exactly when `schema.admits(value)` holds.
pub fn diagnose(schema: &Schema, value: &Value) -> Vec<Finding> {
    let mut findings = Vec::new();
    walk(schema, value, &schema.name, &mut findings);
    findings
}

fn walk(schema: &Schema, value: &Value, path: &str, findings: &mut Vec<Finding>) {
    if schema.name != value.name {
        findings.push(
            Finding::new(path, "field name mismatch")
                .with_expected(format!("`{}`", schema.name))
                .with_actual(format!("`{}`", value.name)),
        );
        // The kinds under a misnamed node would only add noise.
        return;
    }
    walk_kind(&schema.kind, &value.kind, path, findings);
}

fn walk_kind(schema: &SchemaKind, value: &ValueKind, path: &str, findings: &mut Vec<Finding>) {
    match schema {
        SchemaKind::Optional(inner) => {
            if !value.is_empty() {
                walk_kind(inner, value, path, findings);
            }
        }
        SchemaKind::Int { range } => match value {
            ValueKind::Int(v) => {
                if let Some(range) = range {
                    if !range.contains(v) {
                        findings.push(
                            Finding::new(path, format!("{v} is outside the accepted range"))
                                .with_expected(format!("{}..={}", range.start(), range.end()))
                                .with_actual(v.to_string()),
                        );
                    }
                }
            }
            other => findings.push(wrong_kind(path, schema, other)),
        },
        SchemaKind::Double { range } => match value {
            ValueKind::Double(v) => {
                if let Some(range) = range {
                    if !range.contains(v) {
                        findings.push(
                            Finding::new(path, format!("{v} is outside the accepted range"))
                                .with_expected(format!("{}..={}", range.start(), range.end()))
                                .with_actual(v.to_string()),
                        );
                    }
                }
            }
            other => findings.push(wrong_kind(path, schema, other)),
        },
        SchemaKind::RawString { max_length } => match value {
            ValueKind::RawString(s) => {
                if let Some(max) = max_length {
                    let length = s.chars().count();
                    if length > *max {
                        findings.push(
                            Finding::new(
                                path,
                                format!("string of {length} characters exceeds the cap"),
                            )
                            .with_expected(format!("at most {max} characters"))
                            .with_actual(format!("{s:?}")),
                        );
                    }
                }
            }
            other => findings.push(wrong_kind(path, schema, other)),
        },
        SchemaKind::Id { id } => match value {
            ValueKind::Id { id: given } => {
                if given != id {
                    findings.push(
                        Finding::new(path, "unexpected identifier")
                            .with_expected(id.to_string())
                            .with_actual(given.to_string()),
                    );
                }
            }
            other => findings.push(wrong_kind(path, schema, other)),
        },
        SchemaKind::Selection { possible_values } => match value {
            ValueKind::Selection { value: chosen } => {
                if !possible_values.iter().any(|alt| alt.admits(chosen)) {
                    let names: Vec<String> = possible_values
                        .iter()
                        .map(|alt| format!("`{}`", alt.name))
                        .collect();
                    findings.push(
                        Finding::new(
                            path,
                            format!("`{}` matches none of the alternatives", chosen.name),
                        )
                        .with_expected(if names.is_empty() {
                            "no alternatives are currently available".to_string()
                        } else {
                            format!("one of {}", names.join(", "))
                        }),
                    );
                }
            }
            other => findings.push(wrong_kind(path, schema, other)),
        },
        SchemaKind::List(element) => match value {
            ValueKind::List(elements) => {
                for (index, elem) in elements.iter().enumerate() {
                    walk_kind(element, elem, &format!("{path}[{index}]"), findings);
                }
            }
            other => findings.push(wrong_kind(path, schema, other)),
        },
        SchemaKind::Cons(fields) => match value {
            ValueKind::Cons(given) => {
                if fields.len() != given.len() {
                    findings.push(
                        Finding::new(path, "wrong number of fields")
                            .with_expected(format!("{} fields", fields.len()))
                            .with_actual(format!("{} fields", given.len())),
                    );
                }
                // Fields correspond by position; compare as many pairs as exist.
                for (field, v) in fields.iter().zip(given) {
                    walk(field, v, &format!("{path}.{}", field.name), findings);
                }
            }
            other => findings.push(wrong_kind(path, schema, other)),
        },
        SchemaKind::Auto => {
            if !matches!(value, ValueKind::Auto) {
                findings.push(wrong_kind(path, schema, value));
            }
        }
    }
}

fn wrong_kind(path: &str, schema: &SchemaKind, value: &ValueKind) -> Finding {
    let rendered = serde_json::to_string(value)
        .unwrap_or_else(|_| format!("<{}>", value.kind_name()));
    Finding::new(
        path,
        format!(
            "expected `{}`, found `{}`",
            schema.kind_name(),
            value.kind_name()
        ),
    )
    .with_expected(schema.kind_name())
    .with_actual(rendered)
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn port_env() -> Schema {
        Schema::new(
            "Env",
            SchemaKind::cons(vec![
                Schema::new("port", SchemaKind::int_in(1..=65535)),
                Schema::new("host", SchemaKind::string_capped(255)),
            ]),
        )
    }

    #[test]
    fn test_clean_document_no_findings() {
        let document = Value::new(
            "Env",
            ValueKind::Cons(vec![
                Value::new("port", ValueKind::Int(8080)),
                Value::new("host", ValueKind::string("example.com")),
            ]),
        );
        assert_eq!(diagnose(&port_env(), &document), Vec::new());
    }

    #[test]
    fn test_out_of_range_names_field_and_bound() {
        let document = Value::new(
            "Env",
            ValueKind::Cons(vec![
                Value::new("port", ValueKind::Int(70000)),
                Value::new("host", ValueKind::string("example.com")),
            ]),
        );
        let findings = diagnose(&port_env(), &document);
        assert_eq!(findings.len(), 1);
        assert_eq!(findings[0].path, "Env.port");
        assert_eq!(findings[0].expected.as_deref(), Some("1..=65535"));
        assert_eq!(findings[0].actual.as_deref(), Some("70000"));
    }

    #[test]
    fn test_wrong_kind_reports_both_sides() {
        let document = Value::new(
            "Env",
            ValueKind::Cons(vec![
                Value::new("port", ValueKind::string("8080")),
                Value::new("host", ValueKind::string("example.com")),
            ]),
        );
        let findings = diagnose(&port_env(), &document);
        assert_eq!(findings.len(), 1);
        assert_eq!(findings[0].message, "expected `int`, found `rawString`");
        assert_eq!(findings[0].actual.as_deref(), Some("{\"rawString\":\"8080\"}"));
    }

    #[test]
    fn test_arity_mismatch_reported_first() {
        let document = Value::new(
            "Env",
            ValueKind::Cons(vec![Value::new("port", ValueKind::Int(0))]),
        );
        let findings = diagnose(&port_env(), &document);
        assert_eq!(findings[0].path, "Env");
        assert_eq!(findings[0].message, "wrong number of fields");
        assert_eq!(findings[1].path, "Env.port");
    }

    #[test]
    fn test_list_findings_carry_indices() {
        let schema = Schema::new("admins", SchemaKind::list(SchemaKind::string_capped(5)));
        let document = Value::new(
            "admins",
            ValueKind::List(vec![
                ValueKind::string("ada"),
                ValueKind::string("marguerite"),
            ]),
        );
        let findings = diagnose(&schema, &document);
        assert_eq!(findings.len(), 1);
        assert_eq!(findings[0].path, "admins[1]");
    }

    #[test]
    fn test_name_mismatch_suppresses_nested() {
        let schema = Schema::new("db", SchemaKind::cons(vec![
            Schema::new("host", SchemaKind::string()),
        ]));
        let document = Value::new("database", ValueKind::Int(1));
        let findings = diagnose(&schema, &document);
        assert_eq!(findings.len(), 1);
        assert_eq!(findings[0].expected.as_deref(), Some("`db`"));
        assert_eq!(findings[0].actual.as_deref(), Some("`database`"));
    }

    #[test]
    fn test_rejected_selection_lists_alternatives() {
        let schema = Schema::new(
            "role",
            SchemaKind::selection(vec![
                Schema::new("admin", SchemaKind::id(uuid::Uuid::from_u128(1))),
                Schema::new("viewer", SchemaKind::id(uuid::Uuid::from_u128(2))),
            ]),
        );
        let document = Value::new(
            "role",
            ValueKind::selection(Value::new("owner", ValueKind::Id {
                id: uuid::Uuid::from_u128(3),
            })),
        );
        let findings = diagnose(&schema, &document);
        assert_eq!(findings.len(), 1);
        assert_eq!(
            findings[0].expected.as_deref(),
            Some("one of `admin`, `viewer`")
        );
    }

    #[test]
    fn test_finding_display() {
        let finding = Finding::new("Env.port", "70000 is outside the accepted range")
            .with_expected("1..=65535")
            .with_actual("70000");
        assert_eq!(
            finding.to_string(),
            "Env.port: 70000 is outside the accepted range (expected 1..=65535, found 70000)"
        );
    }

    #[test]
    fn test_optional_silent_on_empty() {
        let schema = Schema::new("logLevel", SchemaKind::optional(SchemaKind::string_capped(3)));
        assert!(diagnose(&schema, &Value::new("logLevel", ValueKind::Empty)).is_empty());
        let findings = diagnose(&schema, &Value::new("logLevel", ValueKind::string("debug")));
        assert_eq!(findings.len(), 1);
        assert_eq!(findings[0].path, "logLevel");
    }
}
