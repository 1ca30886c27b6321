//! The schema interpreter.
//!
//! [`validate_raw`] walks every declared field of a [`Schema`], records
//! every violation it finds and, when there are none, returns the record
//! normalized: defaults inserted, dates rewritten as `YYYY-MM-DD`,
//! integers stored as integers and undeclared fields dropped. The typed
//! front ends decode that normalized record into the core types.

use crate::error::{ValidationError, Violation, ViolationKind};
use crate::schema::{
    CONTACT, FieldSpec, FieldType, HOURS, MENU_ITEM, Refinement, SPECIAL, Schema, SchemaKind,
};
use chrono::{DateTime, NaiveDate};
use menu_kit_core::{Contact, Hours, MenuItem, RawRecord, Special};
use serde::de::DeserializeOwned;
use serde_json::{Number, Value};
use tracing::debug;

/// A validated record of any kind
#[derive(Debug, Clone, PartialEq)]
pub enum Record {
    MenuItem(MenuItem),
    Special(Special),
    Hours(Hours),
    Contact(Contact),
}

impl Record {
    pub fn kind(&self) -> SchemaKind {
        match self {
            Record::MenuItem(_) => SchemaKind::MenuItem,
            Record::Special(_) => SchemaKind::Special,
            Record::Hours(_) => SchemaKind::Hours,
            Record::Contact(_) => SchemaKind::Contact,
        }
    }
}

/// Validate a raw record against the schema `kind` selects
pub fn validate(kind: SchemaKind, raw: &RawRecord) -> Result<Record, ValidationError> {
    Ok(match kind {
        SchemaKind::MenuItem => Record::MenuItem(validate_menu_item(raw)?),
        SchemaKind::Special => Record::Special(validate_special(raw)?),
        SchemaKind::Hours => Record::Hours(validate_hours(raw)?),
        SchemaKind::Contact => Record::Contact(validate_contact(raw)?),
    })
}

pub fn validate_menu_item(raw: &RawRecord) -> Result<MenuItem, ValidationError> {
    validate_typed(&MENU_ITEM, raw)
}

pub fn validate_special(raw: &RawRecord) -> Result<Special, ValidationError> {
    validate_typed(&SPECIAL, raw)
}

pub fn validate_hours(raw: &RawRecord) -> Result<Hours, ValidationError> {
    validate_typed(&HOURS, raw)
}

pub fn validate_contact(raw: &RawRecord) -> Result<Contact, ValidationError> {
    validate_typed(&CONTACT, raw)
}

fn validate_typed<T: DeserializeOwned>(schema: &Schema, raw: &RawRecord) -> Result<T, ValidationError> {
    let normalized = validate_raw(schema, raw)?;

    // The normalized record already satisfies the schema, so decoding only
    // fails if the schema table and the Rust type disagree.
    serde_json::from_value(Value::Object(normalized)).map_err(|e| {
        ValidationError::new(
            schema.name,
            vec![Violation {
                path: String::new(),
                kind: ViolationKind::TypeMismatch,
                message: format!("record does not decode: {}", e),
                received: None,
            }],
        )
    })
}

/// Check `raw` against `schema`, reporting every violation at once
pub fn validate_raw(schema: &Schema, raw: &RawRecord) -> Result<RawRecord, ValidationError> {
    let mut violations = Vec::new();
    let normalized = check_record(schema, raw, "", &mut violations);

    if violations.is_empty() {
        Ok(normalized)
    } else {
        Err(ValidationError::new(schema.name, violations))
    }
}

fn check_record(
    schema: &Schema,
    raw: &RawRecord,
    prefix: &str,
    violations: &mut Vec<Violation>,
) -> RawRecord {
    let mut out = RawRecord::new();

    for field in schema.fields {
        let path = join_path(prefix, field.name);
        match raw.get(field.name) {
            Some(value) => {
                if let Some(checked) = check_field(field, value, &path, violations) {
                    out.insert(field.name.to_string(), checked);
                }
            }
            None => {
                if let Some(default) = field.default {
                    out.insert(field.name.to_string(), default.to_value());
                } else if field.required {
                    violations.push(Violation::missing(path));
                }
            }
        }
    }

    for key in raw.keys() {
        if schema.field(key).is_none() {
            debug!(
                "Dropping unknown field '{}' from {} record",
                join_path(prefix, key),
                schema.name
            );
        }
    }

    out
}

fn check_field(
    field: &FieldSpec,
    value: &Value,
    path: &str,
    violations: &mut Vec<Violation>,
) -> Option<Value> {
    let checked = match field.ty {
        FieldType::String => value.as_str().map(|s| Value::String(s.to_string())),
        FieldType::Number => value.is_number().then(|| value.clone()),
        FieldType::Integer => as_integer(value),
        FieldType::Boolean => value.as_bool().map(Value::Bool),
        FieldType::Date => value
            .as_str()
            .and_then(parse_date)
            .map(|d| Value::String(d.format("%Y-%m-%d").to_string())),
        FieldType::List(item_schema) => {
            return check_list(item_schema, value, path, violations);
        }
    };

    let Some(checked) = checked else {
        violations.push(Violation::type_mismatch(path, field.ty.describe(), value));
        return None;
    };

    match field.refinement {
        Some(Refinement::OneOf(allowed)) => {
            let member = checked.as_str().is_some_and(|s| allowed.contains(&s));
            if !member {
                violations.push(Violation::not_in_enum(path, allowed, value));
                return None;
            }
        }
        Some(Refinement::Range { min, max }) => {
            if let Some(n) = checked.as_f64() {
                if n < min {
                    violations.push(Violation::below_minimum(path, min, value));
                    return None;
                }
                if n > max {
                    violations.push(Violation::above_maximum(path, max, value));
                    return None;
                }
            }
        }
        None => {}
    }

    Some(checked)
}

fn check_list(
    item_schema: &Schema,
    value: &Value,
    path: &str,
    violations: &mut Vec<Violation>,
) -> Option<Value> {
    let Some(items) = value.as_array() else {
        violations.push(Violation::type_mismatch(path, "array", value));
        return None;
    };

    let before = violations.len();
    let mut out = Vec::with_capacity(items.len());
    for (idx, item) in items.iter().enumerate() {
        let item_path = format!("{}[{}]", path, idx);
        match item.as_object() {
            Some(record) => {
                out.push(Value::Object(check_record(
                    item_schema,
                    record,
                    &item_path,
                    violations,
                )));
            }
            None => violations.push(Violation::type_mismatch(item_path, "object", item)),
        }
    }

    (violations.len() == before).then_some(Value::Array(out))
}

/// Integral numbers only; `2.0` is accepted as `2`, `1.5` is not.
///
/// Integral floats beyond the i64 range are returned unchanged so the
/// range refinement, not the type check, rejects them.
fn as_integer(value: &Value) -> Option<Value> {
    let Value::Number(n) = value else {
        return None;
    };
    if n.is_i64() || n.is_u64() {
        return Some(value.clone());
    }

    let f = n.as_f64()?;
    if f.fract() != 0.0 {
        return None;
    }
    if f < i64::MIN as f64 || f > i64::MAX as f64 {
        return Some(value.clone());
    }
    Some(Value::Number(Number::from(f as i64)))
}

/// Accepts `YYYY-MM-DD` or an RFC 3339 date-time, keeping the date part
fn parse_date(s: &str) -> Option<NaiveDate> {
    let s = s.trim();
    NaiveDate::parse_from_str(s, "%Y-%m-%d")
        .ok()
        .or_else(|| DateTime::parse_from_rfc3339(s).ok().map(|dt| dt.date_naive()))
}

fn join_path(prefix: &str, name: &str) -> String {
    if prefix.is_empty() {
        name.to_string()
    } else {
        format!("{}.{}", prefix, name)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use menu_kit_core::Category;
    use serde_json::json;

    fn raw(value: Value) -> RawRecord {
        match value {
            Value::Object(map) => map,
            other => panic!("test record must be an object, got {}", other),
        }
    }

    fn tacos() -> Value {
        json!({
            "title": "Tacos",
            "category": "Entradas",
            "price": 45,
            "description": "..."
        })
    }

    fn with(mut base: Value, key: &str, value: Value) -> RawRecord {
        base[key] = value;
        raw(base)
    }

    fn without(base: Value, keys: &[&str]) -> RawRecord {
        let mut record = raw(base);
        for key in keys {
            record.remove(*key);
        }
        record
    }

    #[test]
    fn test_menu_item_defaults_applied() {
        let item = validate_menu_item(&raw(tacos())).unwrap();
        assert_eq!(item.title, "Tacos");
        assert_eq!(item.category, Category::Entradas);
        assert_eq!(item.price, 45.0);
        assert!(!item.vegetarian);
        assert!(!item.vegan);
        assert!(!item.gluten_free);
        assert!(item.published);
        assert_eq!(item.spicy_level, None);
        assert_eq!(item.image, None);
    }

    #[test]
    fn test_menu_item_explicit_flags_kept() {
        let mut value = tacos();
        value["vegetarian"] = json!(true);
        value["vegan"] = json!(true);
        value["glutenFree"] = json!(true);
        value["published"] = json!(false);
        value["image"] = json!("/images/tacos.jpg");

        let item = validate_menu_item(&raw(value)).unwrap();
        assert!(item.vegetarian && item.vegan && item.gluten_free);
        assert!(!item.published);
        assert_eq!(item.image.as_deref(), Some("/images/tacos.jpg"));
    }

    #[test]
    fn test_every_category_label_accepted() {
        for label in Category::LABELS {
            let item = validate_menu_item(&with(tacos(), "category", json!(label))).unwrap();
            assert_eq!(item.category.as_str(), label);
        }
    }

    #[test]
    fn test_unknown_category_is_enum_violation() {
        let err = validate_menu_item(&with(tacos(), "category", json!("Bebidas-Extra"))).unwrap_err();
        assert_eq!(err.violations.len(), 1);
        let v = &err.violations[0];
        assert_eq!(v.path, "category");
        assert_eq!(v.kind, ViolationKind::EnumConstraintViolation);
        assert_eq!(v.received, Some(json!("Bebidas-Extra")));
        assert!(v.message.starts_with("expected enum member"));
    }

    #[test]
    fn test_category_is_case_sensitive() {
        for label in ["entradas", "BEBIDAS", " Extras", ""] {
            let err = validate_menu_item(&with(tacos(), "category", json!(label))).unwrap_err();
            assert!(err.has(ViolationKind::EnumConstraintViolation, "category"));
        }
    }

    #[test]
    fn test_non_string_category_is_type_mismatch() {
        let err = validate_menu_item(&with(tacos(), "category", json!(3))).unwrap_err();
        assert!(err.has(ViolationKind::TypeMismatch, "category"));
        assert!(!err.has(ViolationKind::EnumConstraintViolation, "category"));
    }

    #[test]
    fn test_spicy_level_boundaries() {
        for level in [0, 1, 2, 3] {
            let item = validate_menu_item(&with(tacos(), "spicyLevel", json!(level))).unwrap();
            assert_eq!(item.spicy_level, Some(level as u8));
        }
    }

    #[test]
    fn test_spicy_level_out_of_range() {
        let err = validate_menu_item(&with(tacos(), "spicyLevel", json!(-1))).unwrap_err();
        assert!(err.has(ViolationKind::RangeConstraintViolation, "spicyLevel"));
        assert_eq!(err.violations[0].message, "value below minimum 0");

        let err = validate_menu_item(&with(tacos(), "spicyLevel", json!(4))).unwrap_err();
        assert!(err.has(ViolationKind::RangeConstraintViolation, "spicyLevel"));
        assert_eq!(err.violations[0].message, "value above maximum 3");

        let err = validate_menu_item(&with(tacos(), "spicyLevel", json!(100))).unwrap_err();
        assert!(err.has(ViolationKind::RangeConstraintViolation, "spicyLevel"));
    }

    #[test]
    fn test_spicy_level_huge_values_are_range_violations() {
        let err = validate_menu_item(&with(tacos(), "spicyLevel", json!(1e20))).unwrap_err();
        assert_eq!(err.violations.len(), 1);
        assert!(err.has(ViolationKind::RangeConstraintViolation, "spicyLevel"));
        assert_eq!(err.violations[0].message, "value above maximum 3");

        let err = validate_menu_item(&with(tacos(), "spicyLevel", json!(-1e20))).unwrap_err();
        assert!(err.has(ViolationKind::RangeConstraintViolation, "spicyLevel"));
        assert_eq!(err.violations[0].message, "value below minimum 0");

        let err = validate_menu_item(&with(tacos(), "spicyLevel", json!(u64::MAX))).unwrap_err();
        assert!(err.has(ViolationKind::RangeConstraintViolation, "spicyLevel"));
    }

    #[test]
    fn test_spicy_level_must_be_integral() {
        let item = validate_menu_item(&with(tacos(), "spicyLevel", json!(2.0))).unwrap();
        assert_eq!(item.spicy_level, Some(2));

        let err = validate_menu_item(&with(tacos(), "spicyLevel", json!(1.5))).unwrap_err();
        assert!(err.has(ViolationKind::TypeMismatch, "spicyLevel"));
        assert_eq!(err.violations[0].message, "expected integer, received number");

        let err = validate_menu_item(&with(tacos(), "spicyLevel", json!("2"))).unwrap_err();
        assert!(err.has(ViolationKind::TypeMismatch, "spicyLevel"));
    }

    #[test]
    fn test_missing_required_fields_reported_together() {
        let err = validate_menu_item(&without(tacos(), &["title", "price", "description"])).unwrap_err();
        assert_eq!(err.violations.len(), 3);
        assert_eq!(err.count(ViolationKind::MissingRequiredField), 3);
        for field in ["title", "price", "description"] {
            assert!(err.has(ViolationKind::MissingRequiredField, field));
            assert_eq!(err.violations_for(field).count(), 1);
        }
    }

    #[test]
    fn test_mixed_violations_reported_together() {
        let record = raw(json!({
            "category": "Postres",
            "price": "45",
            "description": "...",
            "spicyLevel": 9,
            "vegan": "yes"
        }));
        let err = validate_menu_item(&record).unwrap_err();
        assert_eq!(err.violations.len(), 5);
        assert!(err.has(ViolationKind::MissingRequiredField, "title"));
        assert!(err.has(ViolationKind::EnumConstraintViolation, "category"));
        assert!(err.has(ViolationKind::TypeMismatch, "price"));
        assert!(err.has(ViolationKind::RangeConstraintViolation, "spicyLevel"));
        assert!(err.has(ViolationKind::TypeMismatch, "vegan"));
    }

    #[test]
    fn test_null_is_not_absence() {
        let err = validate_menu_item(&with(tacos(), "image", Value::Null)).unwrap_err();
        assert!(err.has(ViolationKind::TypeMismatch, "image"));
        assert_eq!(err.violations[0].message, "expected string, received null");

        let err = validate_menu_item(&with(tacos(), "published", Value::Null)).unwrap_err();
        assert!(err.has(ViolationKind::TypeMismatch, "published"));
    }

    #[test]
    fn test_unknown_fields_dropped() {
        let record = with(tacos(), "chef", json!("Doña Rosa"));
        let normalized = validate_raw(&MENU_ITEM, &record).unwrap();
        assert!(!normalized.contains_key("chef"));
        assert_eq!(normalized["published"], true);
    }

    #[test]
    fn test_menu_item_idempotent() {
        let mut value = tacos();
        value["spicyLevel"] = json!(2);
        value["glutenFree"] = json!(true);
        let first = validate_menu_item(&raw(value)).unwrap();

        let reserialized = raw(serde_json::to_value(&first).unwrap());
        let second = validate_menu_item(&reserialized).unwrap();
        assert_eq!(first, second);
    }

    fn special() -> Value {
        json!({
            "title": "Martes de Tacos",
            "startDate": "2025-03-04",
            "endDate": "2025-03-25T23:00:00-06:00",
            "description": "Dos por uno"
        })
    }

    #[test]
    fn test_special_dates_parsed() {
        let s = validate_special(&raw(special())).unwrap();
        assert_eq!(s.start_date, NaiveDate::from_ymd_opt(2025, 3, 4).unwrap());
        assert_eq!(s.end_date, NaiveDate::from_ymd_opt(2025, 3, 25).unwrap());
        assert!(!s.featured);
        assert_eq!(s.price, None);
        assert_eq!(s.regular_price, None);
    }

    #[test]
    fn test_special_invalid_date() {
        let err = validate_special(&with(special(), "startDate", json!("next tuesday"))).unwrap_err();
        assert!(err.has(ViolationKind::TypeMismatch, "startDate"));
        assert_eq!(err.violations[0].message, "expected date, received string");

        let err = validate_special(&with(special(), "endDate", json!("2025-02-30"))).unwrap_err();
        assert!(err.has(ViolationKind::TypeMismatch, "endDate"));

        let err = validate_special(&with(special(), "endDate", json!(20250325))).unwrap_err();
        assert!(err.has(ViolationKind::TypeMismatch, "endDate"));
    }

    #[test]
    fn test_special_idempotent() {
        let mut value = special();
        value["price"] = json!(79.5);
        value["regularPrice"] = json!(120);
        value["featured"] = json!(true);
        let first = validate_special(&raw(value)).unwrap();

        let second = validate_special(&raw(serde_json::to_value(&first).unwrap())).unwrap();
        assert_eq!(first, second);
        assert_eq!(first.savings(), Some(40.5));
    }

    #[test]
    fn test_hours_nested_defaults_and_paths() {
        let record = raw(json!({
            "hours": [
                {"day": "Lunes", "open": "09:00", "close": "18:00"},
                {"day": "Domingo", "open": "", "close": "", "closed": true}
            ]
        }));
        let hours = validate_hours(&record).unwrap();
        assert_eq!(hours.hours.len(), 2);
        assert!(!hours.hours[0].closed);
        assert!(hours.hours[1].closed);

        let record = raw(json!({
            "hours": [
                {"day": "Lunes", "open": "09:00", "close": "18:00"},
                {"day": "Martes", "open": 9, "closed": "no"},
                "Miércoles"
            ]
        }));
        let err = validate_hours(&record).unwrap_err();
        assert!(err.has(ViolationKind::TypeMismatch, "hours[1].open"));
        assert!(err.has(ViolationKind::MissingRequiredField, "hours[1].close"));
        assert!(err.has(ViolationKind::TypeMismatch, "hours[1].closed"));
        assert!(err.has(ViolationKind::TypeMismatch, "hours[2]"));
        assert_eq!(err.violations.len(), 4);
    }

    #[test]
    fn test_hours_idempotent() {
        let record = raw(json!({
            "hours": [
                {"day": "Lunes", "open": "09:00", "close": "18:00"},
                {"day": "Domingo", "open": "", "close": "", "closed": true}
            ]
        }));
        let first = validate_hours(&record).unwrap();
        assert!(!first.hours[0].closed);

        let reserialized = raw(serde_json::to_value(&first).unwrap());
        assert_eq!(reserialized["hours"][0]["closed"], false);
        let second = validate_hours(&reserialized).unwrap();
        assert_eq!(first, second);
    }

    #[test]
    fn test_contact_idempotent() {
        let with_map = raw(json!({
            "name": "La Cocina",
            "address": "Av. Juárez 100",
            "city": "Monterrey",
            "state": "NL",
            "zip": "64000",
            "phone": "+52 81 5555 5555",
            "email": "hola@lacocina.mx",
            "mapUrl": "https://maps.example.com/?q=la+cocina"
        }));
        let mut without_map = with_map.clone();
        without_map.remove("mapUrl");

        for record in [with_map, without_map] {
            let first = validate_contact(&record).unwrap();
            let second = validate_contact(&raw(serde_json::to_value(&first).unwrap())).unwrap();
            assert_eq!(first, second);
        }
    }

    #[test]
    fn test_hours_requires_list() {
        let err = validate_hours(&RawRecord::new()).unwrap_err();
        assert!(err.has(ViolationKind::MissingRequiredField, "hours"));

        let err = validate_hours(&raw(json!({"hours": {"day": "Lunes"}}))).unwrap_err();
        assert!(err.has(ViolationKind::TypeMismatch, "hours"));
    }

    #[test]
    fn test_contact() {
        let value = json!({
            "name": "La Cocina",
            "address": "Av. Juárez 100",
            "city": "Monterrey",
            "state": "NL",
            "zip": "64000",
            "phone": "+52 81 5555 5555",
            "email": "hola@lacocina.mx"
        });
        let contact = validate_contact(&raw(value.clone())).unwrap();
        assert_eq!(contact.map_url, None);

        let err = validate_contact(&without(value, &["zip", "email"])).unwrap_err();
        assert_eq!(err.count(ViolationKind::MissingRequiredField), 2);

        let err = validate_contact(&with(
            json!({"name": "x", "address": "x", "city": "x", "state": "x", "phone": "x", "email": "x"}),
            "zip",
            json!(64000),
        ))
        .unwrap_err();
        assert!(err.has(ViolationKind::TypeMismatch, "zip"));
    }

    #[test]
    fn test_validate_dispatches_by_kind() {
        let record = validate(SchemaKind::MenuItem, &raw(tacos())).unwrap();
        assert_eq!(record.kind(), SchemaKind::MenuItem);

        let err = validate(SchemaKind::Special, &raw(tacos())).unwrap_err();
        assert_eq!(err.schema, "special");
        assert!(err.has(ViolationKind::MissingRequiredField, "startDate"));
        assert!(err.has(ViolationKind::MissingRequiredField, "endDate"));
    }

    #[test]
    fn test_empty_record_reports_every_required_field() {
        for kind in SchemaKind::ALL {
            let err = validate(kind, &RawRecord::new()).unwrap_err();
            let required = kind.schema().fields.iter().filter(|f| f.required).count();
            assert_eq!(err.count(ViolationKind::MissingRequiredField), required);
        }
    }
}
