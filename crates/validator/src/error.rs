use menu_kit_core::frontmatter::value_kind;
use serde::Serialize;
use serde_json::Value;
use std::fmt;
use thiserror::Error;

/// The constraint a field failed
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum ViolationKind {
    MissingRequiredField,
    TypeMismatch,
    EnumConstraintViolation,
    RangeConstraintViolation,
}

impl fmt::Display for ViolationKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            ViolationKind::MissingRequiredField => "MissingRequiredField",
            ViolationKind::TypeMismatch => "TypeMismatch",
            ViolationKind::EnumConstraintViolation => "EnumConstraintViolation",
            ViolationKind::RangeConstraintViolation => "RangeConstraintViolation",
        };
        f.write_str(name)
    }
}

/// A single failed field
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Violation {
    /// Field path within the record, e.g. `spicyLevel` or `hours[2].closed`
    pub path: String,
    pub kind: ViolationKind,
    pub message: String,
    /// The offending raw value; `None` when the field was missing
    #[serde(skip_serializing_if = "Option::is_none")]
    pub received: Option<Value>,
}

impl Violation {
    pub fn missing(path: impl Into<String>) -> Self {
        Self {
            path: path.into(),
            kind: ViolationKind::MissingRequiredField,
            message: "missing required field".to_string(),
            received: None,
        }
    }

    pub fn type_mismatch(path: impl Into<String>, expected: &str, received: &Value) -> Self {
        Self {
            path: path.into(),
            kind: ViolationKind::TypeMismatch,
            message: format!("expected {}, received {}", expected, value_kind(received)),
            received: Some(received.clone()),
        }
    }

    pub fn not_in_enum(path: impl Into<String>, allowed: &[&str], received: &Value) -> Self {
        Self {
            path: path.into(),
            kind: ViolationKind::EnumConstraintViolation,
            message: format!("expected enum member (one of {})", allowed.join(", ")),
            received: Some(received.clone()),
        }
    }

    pub fn below_minimum(path: impl Into<String>, min: f64, received: &Value) -> Self {
        Self {
            path: path.into(),
            kind: ViolationKind::RangeConstraintViolation,
            message: format!("value below minimum {}", min),
            received: Some(received.clone()),
        }
    }

    pub fn above_maximum(path: impl Into<String>, max: f64, received: &Value) -> Self {
        Self {
            path: path.into(),
            kind: ViolationKind::RangeConstraintViolation,
            message: format!("value above maximum {}", max),
            received: Some(received.clone()),
        }
    }
}

impl fmt::Display for Violation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let path = if self.path.is_empty() {
            "(root)"
        } else {
            &self.path
        };
        write!(f, "{}: {} [{}]", path, self.message, self.kind)?;
        if let Some(received) = &self.received {
            write!(f, " (received {})", received)?;
        }
        Ok(())
    }
}

/// Every violation found in one record
///
/// Never empty: a record with no violations validates successfully.
#[derive(Debug, Clone, PartialEq, Error)]
#[error("invalid {schema}: {}", render(.violations))]
pub struct ValidationError {
    pub schema: &'static str,
    pub violations: Vec<Violation>,
}

fn render(violations: &[Violation]) -> String {
    match violations {
        [single] => single.to_string(),
        _ => {
            let mut out = format!("{} violations", violations.len());
            for v in violations {
                out.push_str("\n  - ");
                out.push_str(&v.to_string());
            }
            out
        }
    }
}

impl ValidationError {
    pub fn new(schema: &'static str, violations: Vec<Violation>) -> Self {
        debug_assert!(!violations.is_empty());
        Self { schema, violations }
    }

    pub fn violations_for<'a>(&'a self, path: &'a str) -> impl Iterator<Item = &'a Violation> {
        self.violations.iter().filter(move |v| v.path == path)
    }

    /// Whether a violation of `kind` was recorded at `path`
    pub fn has(&self, kind: ViolationKind, path: &str) -> bool {
        self.violations_for(path).any(|v| v.kind == kind)
    }

    pub fn count(&self, kind: ViolationKind) -> usize {
        self.violations.iter().filter(|v| v.kind == kind).count()
    }
}
