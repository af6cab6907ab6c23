//! # Schema Model
//!
//! Compiles a JSON-compatible schema document into an immutable tree of
//! typed [`Schema`] nodes.
//!
//! ## Supported Keywords
//!
//! | `type`    | keywords                                            |
//! |-----------|-----------------------------------------------------|
//! | any       | `enum`                                              |
//! | `object`  | `properties` (mandatory), `required`, `additionalProperties` (boolean) |
//! | `string`  | `format`, `minLength`, `maxLength`                  |
//! | `integer` | `minimum`, `maximum`                                |
//! | `number`  | `minimum`, `maximum`                                |
//! | `array`   | `items`, `minItems`, `maxItems`, `uniqueItems`      |
//! | `boolean` | —                                                   |
//!
//! Annotation keywords (`$schema`, `$id`, `$comment`, `title`,
//! `description`, `examples`, `default`) and `x-` extensions are accepted
//! and ignored. Any other keyword is a [`SchemaError::UnsupportedKeyword`]:
//! a constraint this crate cannot check must not pass silently.
//!
//! The tree is acyclic by construction; `$ref` is not supported.

use std::collections::BTreeMap;
use std::fmt;

use serde_json::{Map, Number, Value};
use thiserror::Error;

use crate::format::StringFormat;

const ANNOTATION_KEYWORDS: &[&str] = &[
    "$schema",
    "$id",
    "$comment",
    "title",
    "description",
    "examples",
    "default",
];

/// The value of a schema's `type` attribute.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SchemaType {
    Object,
    String,
    Integer,
    Number,
    Boolean,
    Array,
}

impl SchemaType {
    /// Parse a `type` token. Returns `None` for unrecognised tokens.
    pub fn parse(token: &str) -> Option<Self> {
        match token {
            "object" => Some(Self::Object),
            "string" => Some(Self::String),
            "integer" => Some(Self::Integer),
            "number" => Some(Self::Number),
            "boolean" => Some(Self::Boolean),
            "array" => Some(Self::Array),
            _ => None,
        }
    }

    /// The schema token for this type.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Object => "object",
            Self::String => "string",
            Self::Integer => "integer",
            Self::Number => "number",
            Self::Boolean => "boolean",
            Self::Array => "array",
        }
    }

    fn keywords(&self) -> &'static [&'static str] {
        match self {
            Self::Object => &["properties", "required", "additionalProperties"],
            Self::String => &["format", "minLength", "maxLength"],
            Self::Integer | Self::Number => &["minimum", "maximum"],
            Self::Array => &["items", "minItems", "maxItems", "uniqueItems"],
            Self::Boolean => &[],
        }
    }
}

impl fmt::Display for SchemaType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// The schema document itself is malformed.
///
/// Every variant carries `pointer`, a JSON Pointer (rooted at `#`) to the
/// offending node inside the schema document.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum SchemaError {
    /// A schema node is not a JSON object.
    #[error("schema at '{pointer}' must be an object, found {found}")]
    NotAnObject { pointer: String, found: String },

    /// A schema node has no `type` attribute.
    #[error("schema at '{pointer}' has no 'type' attribute")]
    MissingType { pointer: String },

    /// `type` names a type outside the supported set.
    #[error("schema at '{pointer}' declares unknown type '{found}'")]
    UnknownType { pointer: String, found: String },

    /// A mandatory attribute for the declared type is absent.
    #[error("schema at '{pointer}' of type '{schema_type}' is missing mandatory attribute '{attribute}'")]
    MissingAttribute {
        pointer: String,
        schema_type: SchemaType,
        attribute: &'static str,
    },

    /// An attribute is present but has the wrong shape.
    #[error("schema at '{pointer}' has invalid '{attribute}': {reason}")]
    InvalidAttribute {
        pointer: String,
        attribute: String,
        reason: String,
    },

    /// `format` names a format this crate cannot check.
    #[error("schema at '{pointer}' declares unknown string format '{format}'")]
    UnknownFormat { pointer: String, format: String },

    /// A keyword that is not supported for the declared type.
    #[error("schema at '{pointer}' uses unsupported keyword '{keyword}' for type '{schema_type}'")]
    UnsupportedKeyword {
        pointer: String,
        keyword: String,
        schema_type: SchemaType,
    },
}

/// A compiled schema node.
#[derive(Debug, Clone, PartialEq)]
pub struct Schema {
    kind: SchemaKind,
    allowed: Option<Vec<Value>>,
}

/// Type-specific constraints of a schema node.
#[derive(Debug, Clone, PartialEq)]
pub enum SchemaKind {
    Object(ObjectSchema),
    String(StringSchema),
    Integer(IntegerSchema),
    Number(NumberSchema),
    Boolean,
    Array(ArraySchema),
}

/// Constraints of an `object` schema.
///
/// Non-strict by default: record fields not declared in `properties` are
/// ignored. `"additionalProperties": false` makes them violations.
#[derive(Debug, Clone, PartialEq)]
pub struct ObjectSchema {
    pub properties: BTreeMap<String, Schema>,
    /// Required field names, in declaration order.
    pub required: Vec<String>,
    pub additional_properties: bool,
}

#[derive(Debug, Clone, PartialEq)]
pub struct StringSchema {
    pub format: Option<StringFormat>,
    pub min_length: Option<usize>,
    pub max_length: Option<usize>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct IntegerSchema {
    pub minimum: Option<i64>,
    pub maximum: Option<i64>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct NumberSchema {
    pub minimum: Option<Number>,
    pub maximum: Option<Number>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ArraySchema {
    pub items: Option<Box<Schema>>,
    pub min_items: Option<usize>,
    pub max_items: Option<usize>,
    pub unique_items: bool,
}

impl Schema {
    /// Compile a schema document.
    ///
    /// # Errors
    ///
    /// Returns [`SchemaError`] for the first malformed node found, walking
    /// the document depth-first.
    pub fn from_value(document: &Value) -> Result<Self, SchemaError> {
        compile(document, "#")
    }

    /// The declared `type` of this node.
    pub fn schema_type(&self) -> SchemaType {
        match self.kind {
            SchemaKind::Object(_) => SchemaType::Object,
            SchemaKind::String(_) => SchemaType::String,
            SchemaKind::Integer(_) => SchemaType::Integer,
            SchemaKind::Number(_) => SchemaType::Number,
            SchemaKind::Boolean => SchemaType::Boolean,
            SchemaKind::Array(_) => SchemaType::Array,
        }
    }

    pub fn kind(&self) -> &SchemaKind {
        &self.kind
    }

    /// Values listed under `enum`, if declared.
    pub fn allowed_values(&self) -> Option<&[Value]> {
        self.allowed.as_deref()
    }
}

impl TryFrom<&Value> for Schema {
    type Error = SchemaError;

    fn try_from(document: &Value) -> Result<Self, Self::Error> {
        Self::from_value(document)
    }
}

fn compile(node: &Value, pointer: &str) -> Result<Schema, SchemaError> {
    let obj = node.as_object().ok_or_else(|| SchemaError::NotAnObject {
        pointer: pointer.to_string(),
        found: json_kind(node).to_string(),
    })?;

    let schema_type = match obj.get("type") {
        None => {
            return Err(SchemaError::MissingType {
                pointer: pointer.to_string(),
            })
        }
        Some(Value::String(token)) => {
            SchemaType::parse(token).ok_or_else(|| SchemaError::UnknownType {
                pointer: pointer.to_string(),
                found: token.clone(),
            })?
        }
        Some(other) => {
            return Err(invalid(
                pointer,
                "type",
                format!("expected a type name string, found {}", json_kind(other)),
            ))
        }
    };

    for keyword in obj.keys() {
        let known = keyword == "type"
            || keyword == "enum"
            || keyword.starts_with("x-")
            || ANNOTATION_KEYWORDS.contains(&keyword.as_str())
            || schema_type.keywords().contains(&keyword.as_str());
        if !known {
            return Err(SchemaError::UnsupportedKeyword {
                pointer: pointer.to_string(),
                keyword: keyword.clone(),
                schema_type,
            });
        }
    }

    let allowed = match obj.get("enum") {
        None => None,
        Some(Value::Array(values)) if !values.is_empty() => Some(values.clone()),
        Some(_) => {
            return Err(invalid(pointer, "enum", "expected a non-empty array"));
        }
    };

    let kind = match schema_type {
        SchemaType::Object => SchemaKind::Object(compile_object(obj, pointer)?),
        SchemaType::String => SchemaKind::String(StringSchema {
            format: match obj.get("format") {
                None => None,
                Some(Value::String(token)) => {
                    Some(StringFormat::parse(token).ok_or_else(|| {
                        SchemaError::UnknownFormat {
                            pointer: pointer.to_string(),
                            format: token.clone(),
                        }
                    })?)
                }
                Some(_) => return Err(invalid(pointer, "format", "expected a string")),
            },
            min_length: count_attr(obj, "minLength", pointer)?,
            max_length: count_attr(obj, "maxLength", pointer)?,
        }),
        SchemaType::Integer => SchemaKind::Integer(IntegerSchema {
            minimum: integer_attr(obj, "minimum", pointer)?,
            maximum: integer_attr(obj, "maximum", pointer)?,
        }),
        SchemaType::Number => SchemaKind::Number(NumberSchema {
            minimum: number_attr(obj, "minimum", pointer)?,
            maximum: number_attr(obj, "maximum", pointer)?,
        }),
        SchemaType::Boolean => SchemaKind::Boolean,
        SchemaType::Array => SchemaKind::Array(ArraySchema {
            items: match obj.get("items") {
                None => None,
                Some(items) => Some(Box::new(compile(items, &format!("{pointer}/items"))?)),
            },
            min_items: count_attr(obj, "minItems", pointer)?,
            max_items: count_attr(obj, "maxItems", pointer)?,
            unique_items: bool_attr(obj, "uniqueItems", pointer)?.unwrap_or(false),
        }),
    };

    Ok(Schema { kind, allowed })
}

fn compile_object(obj: &Map<String, Value>, pointer: &str) -> Result<ObjectSchema, SchemaError> {
    let declared = match obj.get("properties") {
        Some(Value::Object(declared)) => declared,
        Some(_) => return Err(invalid(pointer, "properties", "expected an object")),
        None => {
            return Err(SchemaError::MissingAttribute {
                pointer: pointer.to_string(),
                schema_type: SchemaType::Object,
                attribute: "properties",
            })
        }
    };

    let mut properties = BTreeMap::new();
    for (name, child) in declared {
        let child_pointer = format!("{pointer}/properties/{}", escape_pointer(name));
        properties.insert(name.clone(), compile(child, &child_pointer)?);
    }

    let required = match obj.get("required") {
        None => Vec::new(),
        Some(Value::Array(names)) => {
            let mut required: Vec<String> = Vec::with_capacity(names.len());
            for name in names {
                let name = name
                    .as_str()
                    .ok_or_else(|| invalid(pointer, "required", "expected an array of strings"))?;
                if !required.iter().any(|r| r == name) {
                    required.push(name.to_string());
                }
            }
            required
        }
        Some(_) => return Err(invalid(pointer, "required", "expected an array of strings")),
    };

    let additional_properties = match obj.get("additionalProperties") {
        None => true,
        Some(Value::Bool(allowed)) => *allowed,
        Some(_) => {
            return Err(invalid(
                pointer,
                "additionalProperties",
                "only boolean values are supported",
            ))
        }
    };

    Ok(ObjectSchema {
        properties,
        required,
        additional_properties,
    })
}

fn count_attr(
    obj: &Map<String, Value>,
    attribute: &str,
    pointer: &str,
) -> Result<Option<usize>, SchemaError> {
    match obj.get(attribute) {
        None => Ok(None),
        Some(value) => value
            .as_u64()
            .and_then(|n| usize::try_from(n).ok())
            .map(Some)
            .ok_or_else(|| invalid(pointer, attribute, "expected a non-negative integer")),
    }
}

fn integer_attr(
    obj: &Map<String, Value>,
    attribute: &str,
    pointer: &str,
) -> Result<Option<i64>, SchemaError> {
    match obj.get(attribute) {
        None => Ok(None),
        Some(value) => value
            .as_i64()
            .or_else(|| value.as_f64().and_then(integral_f64))
            .map(Some)
            .ok_or_else(|| invalid(pointer, attribute, "expected an integer")),
    }
}

/// `1.0` -> `Some(1)`; fractional or out-of-range values -> `None`.
fn integral_f64(f: f64) -> Option<i64> {
    let in_range = f >= i64::MIN as f64 && f < i64::MAX as f64;
    (f.is_finite() && f.fract() == 0.0 && in_range).then_some(f as i64)
}

fn number_attr(
    obj: &Map<String, Value>,
    attribute: &str,
    pointer: &str,
) -> Result<Option<Number>, SchemaError> {
    match obj.get(attribute) {
        None => Ok(None),
        Some(Value::Number(n)) => Ok(Some(n.clone())),
        Some(_) => Err(invalid(pointer, attribute, "expected a number")),
    }
}

fn bool_attr(
    obj: &Map<String, Value>,
    attribute: &str,
    pointer: &str,
) -> Result<Option<bool>, SchemaError> {
    match obj.get(attribute) {
        None => Ok(None),
        Some(Value::Bool(b)) => Ok(Some(*b)),
        Some(_) => Err(invalid(pointer, attribute, "expected a boolean")),
    }
}

fn invalid(pointer: &str, attribute: &str, reason: impl Into<String>) -> SchemaError {
    SchemaError::InvalidAttribute {
        pointer: pointer.to_string(),
        attribute: attribute.to_string(),
        reason: reason.into(),
    }
}

/// RFC 6901 escaping for a single reference token.
fn escape_pointer(token: &str) -> String {
    token.replace('~', "~0").replace('/', "~1")
}

pub(crate) fn json_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}
