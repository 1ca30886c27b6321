//! Raw record extraction from content files.
//!
//! Collection files carry a YAML block between `---` fences ahead of the
//! body; the data files are plain JSON objects. Both end up as a
//! [`RawRecord`], the untyped input the schema validator works on.

use crate::error::{Error, Result};
use serde_json::{Map, Value};

/// Untyped field-name to value mapping, as read from a source file
pub type RawRecord = Map<String, Value>;

const FENCE: &str = "---";

fn front_matter_error(reason: impl Into<String>) -> Error {
    Error::FrontMatter {
        reason: reason.into(),
    }
}

/// Split a content file into its front-matter block and body.
///
/// The first line must be `---` and the block runs until the next `---`
/// line. Trailing whitespace on fence lines and a leading UTF-8 BOM are
/// tolerated. The body is returned exactly as written.
pub fn split(content: &str) -> Result<(&str, &str)> {
    let content = content.strip_prefix('\u{feff}').unwrap_or(content);
    let mut lines = content.split_inclusive('\n');

    let first = lines
        .next()
        .ok_or_else(|| front_matter_error("file is empty"))?;
    if first.trim_end() != FENCE {
        return Err(front_matter_error("file must start with a '---' line"));
    }

    let start = first.len();
    let mut offset = start;
    for line in lines {
        if line.trim_end() == FENCE {
            let front = &content[start..offset];
            let body = &content[offset + line.len()..];
            return Ok((front, body));
        }
        offset += line.len();
    }

    Err(front_matter_error("front-matter block is not closed with '---'"))
}

/// Parse the front-matter of a content file into a raw record plus body
pub fn parse_front_matter(content: &str) -> Result<(RawRecord, &str)> {
    let (front, body) = split(content)?;

    if front.trim().is_empty() {
        return Ok((RawRecord::new(), body));
    }

    let yaml: serde_yaml::Value = serde_yaml::from_str(front)?;
    match yaml_to_json(yaml, "")? {
        Value::Object(record) => Ok((record, body)),
        // A block holding only comments
        Value::Null => Ok((RawRecord::new(), body)),
        other => Err(front_matter_error(format!(
            "front-matter must be a mapping of fields, found {}",
            value_kind(&other)
        ))),
    }
}

/// Convert parsed YAML into the raw value model.
///
/// JSON numbers cannot hold `.inf` or `.nan`, so those are rejected here
/// with the field path rather than surfacing later as a `null`.
fn yaml_to_json(yaml: serde_yaml::Value, path: &str) -> Result<Value> {
    use serde_yaml::Value as Yaml;

    Ok(match yaml {
        Yaml::Null => Value::Null,
        Yaml::Bool(b) => Value::Bool(b),
        Yaml::Number(n) => {
            if let Some(i) = n.as_i64() {
                Value::from(i)
            } else if let Some(u) = n.as_u64() {
                Value::from(u)
            } else {
                let f = n.as_f64().unwrap_or(f64::NAN);
                serde_json::Number::from_f64(f).map(Value::Number).ok_or_else(|| {
                    front_matter_error(format!(
                        "field '{}' holds a non-finite number ({})",
                        path, n
                    ))
                })?
            }
        }
        Yaml::String(s) => Value::String(s),
        Yaml::Sequence(items) => Value::Array(
            items
                .into_iter()
                .enumerate()
                .map(|(idx, item)| yaml_to_json(item, &format!("{}[{}]", path, idx)))
                .collect::<Result<_>>()?,
        ),
        Yaml::Mapping(mapping) => {
            let mut record = RawRecord::new();
            for (key, value) in mapping {
                let key = match key {
                    Yaml::String(s) => s,
                    Yaml::Number(n) => n.to_string(),
                    Yaml::Bool(b) => b.to_string(),
                    _ => {
                        return Err(front_matter_error(format!(
                            "unsupported key type under '{}'",
                            path
                        )));
                    }
                };
                let child = if path.is_empty() {
                    key.clone()
                } else {
                    format!("{}.{}", path, key)
                };
                record.insert(key, yaml_to_json(value, &child)?);
            }
            Value::Object(record)
        }
        // Tags such as `!Special` carry no meaning for content fields
        Yaml::Tagged(tagged) => yaml_to_json(tagged.value, path)?,
    })
}

/// Parse a JSON data file that must hold a single top-level object
pub fn parse_json_record(content: &str) -> Result<RawRecord> {
    match serde_json::from_str::<Value>(content)? {
        Value::Object(record) => Ok(record),
        other => Err(Error::InvalidData(format!(
            "expected a JSON object at the top level, found {}",
            value_kind(&other)
        ))),
    }
}

/// Name of a value's type as it reads in diagnostics
pub fn value_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}
