//! Declarative schema tables.
//!
//! Each content kind is described as plain data: field name, semantic
//! type, whether it is required, an optional default and an optional
//! refinement. A single interpreter in [`crate::validate`] walks these
//! tables; nothing here does any work on its own.

use menu_kit_core::Category;
use serde_json::Value;
use std::fmt;

/// Semantic type of a field
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum FieldType {
    String,
    Number,
    /// A number with no fractional part
    Integer,
    Boolean,
    /// `YYYY-MM-DD` or an RFC 3339 date-time string
    Date,
    /// A list of records, each checked against the nested schema
    List(&'static Schema),
}

impl FieldType {
    /// Name used in "expected ..." diagnostics
    pub fn describe(&self) -> &'static str {
        match self {
            FieldType::String => "string",
            FieldType::Number => "number",
            FieldType::Integer => "integer",
            FieldType::Boolean => "boolean",
            FieldType::Date => "date",
            FieldType::List(_) => "array",
        }
    }
}

/// Constraint applied after the type check passes
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Refinement {
    /// Exact, case-sensitive membership
    OneOf(&'static [&'static str]),
    /// Inclusive numeric bounds
    Range { min: f64, max: f64 },
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum DefaultValue {
    Bool(bool),
}

impl DefaultValue {
    pub fn to_value(self) -> Value {
        match self {
            DefaultValue::Bool(b) => Value::Bool(b),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FieldSpec {
    pub name: &'static str,
    pub ty: FieldType,
    pub required: bool,
    pub default: Option<DefaultValue>,
    pub refinement: Option<Refinement>,
}

impl FieldSpec {
    pub const fn required(name: &'static str, ty: FieldType) -> Self {
        Self {
            name,
            ty,
            required: true,
            default: None,
            refinement: None,
        }
    }

    pub const fn optional(name: &'static str, ty: FieldType) -> Self {
        Self {
            name,
            ty,
            required: false,
            default: None,
            refinement: None,
        }
    }

    /// Optional boolean that is filled in when omitted
    pub const fn flag(name: &'static str, default: bool) -> Self {
        Self {
            name,
            ty: FieldType::Boolean,
            required: false,
            default: Some(DefaultValue::Bool(default)),
            refinement: None,
        }
    }

    pub const fn refined(self, refinement: Refinement) -> Self {
        Self {
            refinement: Some(refinement),
            ..self
        }
    }
}

/// The recognized field set of one record kind
#[derive(Debug, PartialEq)]
pub struct Schema {
    pub name: &'static str,
    pub fields: &'static [FieldSpec],
}

impl Schema {
    pub fn field(&self, name: &str) -> Option<&FieldSpec> {
        self.fields.iter().find(|f| f.name == name)
    }
}

pub const MENU_ITEM: Schema = Schema {
    name: "menu item",
    fields: &[
        FieldSpec::required("title", FieldType::String),
        FieldSpec::required("category", FieldType::String)
            .refined(Refinement::OneOf(&Category::LABELS)),
        FieldSpec::required("price", FieldType::Number),
        FieldSpec::required("description", FieldType::String),
        FieldSpec::optional("image", FieldType::String),
        FieldSpec::flag("vegetarian", false),
        FieldSpec::flag("vegan", false),
        FieldSpec::flag("glutenFree", false),
        FieldSpec::optional("spicyLevel", FieldType::Integer)
            .refined(Refinement::Range { min: 0.0, max: 3.0 }),
        FieldSpec::flag("published", true),
    ],
};

pub const SPECIAL: Schema = Schema {
    name: "special",
    fields: &[
        FieldSpec::required("title", FieldType::String),
        FieldSpec::required("startDate", FieldType::Date),
        FieldSpec::required("endDate", FieldType::Date),
        FieldSpec::required("description", FieldType::String),
        FieldSpec::optional("price", FieldType::Number),
        FieldSpec::optional("regularPrice", FieldType::Number),
        FieldSpec::optional("image", FieldType::String),
        FieldSpec::flag("featured", false),
    ],
};

pub const DAY_HOURS: Schema = Schema {
    name: "day hours",
    fields: &[
        FieldSpec::required("day", FieldType::String),
        FieldSpec::required("open", FieldType::String),
        FieldSpec::required("close", FieldType::String),
        FieldSpec::flag("closed", false),
    ],
};

pub const HOURS: Schema = Schema {
    name: "hours",
    fields: &[FieldSpec::required("hours", FieldType::List(&DAY_HOURS))],
};

pub const CONTACT: Schema = Schema {
    name: "contact",
    fields: &[
        FieldSpec::required("name", FieldType::String),
        FieldSpec::required("address", FieldType::String),
        FieldSpec::required("city", FieldType::String),
        FieldSpec::required("state", FieldType::String),
        FieldSpec::required("zip", FieldType::String),
        FieldSpec::required("phone", FieldType::String),
        FieldSpec::required("email", FieldType::String),
        FieldSpec::optional("mapUrl", FieldType::String),
    ],
};

/// Selects which schema a raw record is checked against
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SchemaKind {
    MenuItem,
    Special,
    Hours,
    Contact,
}

impl SchemaKind {
    pub const ALL: [SchemaKind; 4] = [
        SchemaKind::MenuItem,
        SchemaKind::Special,
        SchemaKind::Hours,
        SchemaKind::Contact,
    ];

    pub fn schema(self) -> &'static Schema {
        match self {
            SchemaKind::MenuItem => &MENU_ITEM,
            SchemaKind::Special => &SPECIAL,
            SchemaKind::Hours => &HOURS,
            SchemaKind::Contact => &CONTACT,
        }
    }
}

impl fmt::Display for SchemaKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.schema().name)
    }
}
