//! # Record Validation
//!
//! Recursive, single-pass comparison of a record (any `serde_json::Value`
//! tree) against a compiled [`Schema`].
//!
//! ## Invariants
//!
//! - Every violation is collected; validation never stops at the first.
//! - A type mismatch at a node is reported once and suppresses that node's
//!   remaining keyword checks.
//! - Wrong-shaped records (e.g. `null` where an object is required) are
//!   violations, never panics or errors. Only a malformed schema is an
//!   error, and that is caught when the schema is compiled.

use std::fmt;

use serde::{Serialize, Serializer};
use serde_json::{Map, Number, Value};

use crate::format::StringFormat;
use crate::schema::{
    ArraySchema, IntegerSchema, NumberSchema, ObjectSchema, Schema, SchemaError, SchemaKind,
    SchemaType, StringSchema,
};

/// One step of a path into a record.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
#[serde(untagged)]
pub enum PathSegment {
    Field(String),
    Index(usize),
}

impl fmt::Display for PathSegment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Field(name) => f.write_str(name),
            Self::Index(i) => write!(f, "{i}"),
        }
    }
}

impl From<&str> for PathSegment {
    fn from(name: &str) -> Self {
        Self::Field(name.to_string())
    }
}

impl From<usize> for PathSegment {
    fn from(index: usize) -> Self {
        Self::Index(index)
    }
}

/// The constraint a violating node failed to satisfy.
#[derive(Debug, Clone, PartialEq)]
pub enum Constraint {
    /// The node's JSON type did not match the schema's `type`.
    Type(SchemaType),
    /// A field listed in `required` is absent.
    Required(String),
    Format(StringFormat),
    MinLength(usize),
    MaxLength(usize),
    Minimum(Number),
    Maximum(Number),
    MinItems(usize),
    MaxItems(usize),
    /// The element duplicates an earlier element of the same array.
    UniqueItems,
    /// The value is not one of the `enum` values.
    OneOf(Vec<Value>),
    /// The field is not declared and the object is strict.
    NoAdditionalProperties,
}

impl fmt::Display for Constraint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Type(t) => write!(f, "{t}"),
            Self::Required(field) => write!(f, "required field missing: {field}"),
            Self::Format(format) => write!(f, "format {format}"),
            Self::MinLength(n) => write!(f, "minLength {n}"),
            Self::MaxLength(n) => write!(f, "maxLength {n}"),
            Self::Minimum(n) => write!(f, "minimum {n}"),
            Self::Maximum(n) => write!(f, "maximum {n}"),
            Self::MinItems(n) => write!(f, "minItems {n}"),
            Self::MaxItems(n) => write!(f, "maxItems {n}"),
            Self::UniqueItems => f.write_str("unique items"),
            Self::OneOf(values) => {
                let rendered: Vec<String> = values.iter().map(Value::to_string).collect();
                write!(f, "one of [{}]", rendered.join(", "))
            }
            Self::NoAdditionalProperties => f.write_str("no additional properties"),
        }
    }
}

impl Serialize for Constraint {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

/// A single localized mismatch between a record and its schema.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Violation {
    /// Field names and array indices from the record root to the node.
    pub path: Vec<PathSegment>,
    pub expected: Constraint,
    /// The offending value; `None` when the value is absent.
    pub actual: Option<Value>,
}

impl Violation {
    /// JSON Pointer (RFC 6901) to the violating node; empty for the root.
    pub fn pointer(&self) -> String {
        self.path
            .iter()
            .map(|seg| format!("/{}", seg.to_string().replace('~', "~0").replace('/', "~1")))
            .collect()
    }
}

impl fmt::Display for Violation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let location = if self.path.is_empty() {
            "(root)".to_string()
        } else {
            self.pointer()
        };
        match &self.actual {
            Some(actual) => write!(f, "  {location}: expected {}, found {actual}", self.expected),
            None => write!(f, "  {location}: {}", self.expected),
        }
    }
}

/// Non-empty, ordered collection of violations.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(transparent)]
pub struct ValidationViolations {
    violations: Vec<Violation>,
}

impl ValidationViolations {
    pub fn len(&self) -> usize {
        self.violations.len()
    }

    pub fn is_empty(&self) -> bool {
        self.violations.is_empty()
    }

    pub fn violations(&self) -> &[Violation] {
        &self.violations
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Violation> {
        self.violations.iter()
    }

    pub fn into_inner(self) -> Vec<Violation> {
        self.violations
    }
}

impl fmt::Display for ValidationViolations {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, v) in self.violations.iter().enumerate() {
            if i > 0 {
                writeln!(f)?;
            }
            write!(f, "{v}")?;
        }
        Ok(())
    }
}

impl<'a> IntoIterator for &'a ValidationViolations {
    type Item = &'a Violation;
    type IntoIter = std::slice::Iter<'a, Violation>;

    fn into_iter(self) -> Self::IntoIter {
        self.violations.iter()
    }
}

/// Outcome of validating one record.
#[derive(Debug, Clone, PartialEq)]
pub enum ValidationResult {
    Valid,
    Invalid(ValidationViolations),
}

impl ValidationResult {
    fn from_violations(violations: Vec<Violation>) -> Self {
        if violations.is_empty() {
            Self::Valid
        } else {
            Self::Invalid(ValidationViolations { violations })
        }
    }

    pub fn is_valid(&self) -> bool {
        matches!(self, Self::Valid)
    }

    /// All violations; empty when valid.
    pub fn violations(&self) -> &[Violation] {
        match self {
            Self::Valid => &[],
            Self::Invalid(v) => v.violations(),
        }
    }

    pub fn into_violations(self) -> Vec<Violation> {
        match self {
            Self::Valid => Vec::new(),
            Self::Invalid(v) => v.into_inner(),
        }
    }
}

/// Validates records against one compiled schema.
///
/// Stateless between calls and `Send + Sync`; share one instance across
/// threads freely.
#[derive(Debug, Clone, PartialEq)]
pub struct RecordValidator {
    schema: Schema,
}

impl RecordValidator {
    pub fn new(schema: Schema) -> Self {
        Self { schema }
    }

    /// Compile a schema document and wrap it.
    ///
    /// # Errors
    ///
    /// Returns [`SchemaError`] if the document is malformed.
    pub fn from_value(document: &Value) -> Result<Self, SchemaError> {
        Schema::from_value(document).map(Self::new)
    }

    pub fn schema(&self) -> &Schema {
        &self.schema
    }

    /// Validate `record`, collecting every violation.
    pub fn validate(&self, record: &Value) -> ValidationResult {
        let mut walk = Walk::default();
        walk.node(&self.schema, record);
        ValidationResult::from_violations(walk.violations)
    }

    pub fn is_valid(&self, record: &Value) -> bool {
        self.validate(record).is_valid()
    }
}

/// Validate `record` against the schema document `schema`.
///
/// # Errors
///
/// Returns [`SchemaError`] if `schema` is malformed. That is distinct from
/// an [`ValidationResult::Invalid`] record.
pub fn validate(record: &Value, schema: &Value) -> Result<ValidationResult, SchemaError> {
    Ok(RecordValidator::from_value(schema)?.validate(record))
}

#[derive(Default)]
struct Walk {
    path: Vec<PathSegment>,
    violations: Vec<Violation>,
}

impl Walk {
    fn report(&mut self, expected: Constraint, actual: Option<&Value>) {
        self.violations.push(Violation {
            path: self.path.clone(),
            expected,
            actual: actual.cloned(),
        });
    }

    fn descend(&mut self, segment: PathSegment, schema: &Schema, value: &Value) {
        self.path.push(segment);
        self.node(schema, value);
        self.path.pop();
    }

    fn node(&mut self, schema: &Schema, value: &Value) {
        let type_ok = match schema.kind() {
            SchemaKind::Object(obj) => match value {
                Value::Object(fields) => {
                    self.object(obj, fields);
                    true
                }
                _ => false,
            },
            SchemaKind::String(s) => match value {
                Value::String(text) => {
                    self.string(s, value, text);
                    true
                }
                _ => false,
            },
            SchemaKind::Integer(int) => match value {
                Value::Number(n) if is_integral(n) => {
                    self.integer(int, value, n);
                    true
                }
                _ => false,
            },
            SchemaKind::Number(num) => match value {
                Value::Number(n) => {
                    self.number(num, value, n);
                    true
                }
                _ => false,
            },
            SchemaKind::Boolean => value.is_boolean(),
            SchemaKind::Array(arr) => match value {
                Value::Array(items) => {
                    self.array(arr, value, items);
                    true
                }
                _ => false,
            },
        };

        if !type_ok {
            self.report(Constraint::Type(schema.schema_type()), Some(value));
            return;
        }

        if let Some(allowed) = schema.allowed_values() {
            if !allowed.iter().any(|candidate| json_eq(candidate, value)) {
                self.report(Constraint::OneOf(allowed.to_vec()), Some(value));
            }
        }
    }

    fn object(&mut self, schema: &ObjectSchema, fields: &Map<String, Value>) {
        for name in &schema.required {
            if !fields.contains_key(name) {
                self.report(Constraint::Required(name.clone()), None);
            }
        }

        for (name, child) in &schema.properties {
            if let Some(field) = fields.get(name) {
                self.descend(PathSegment::Field(name.clone()), child, field);
            }
        }

        if !schema.additional_properties {
            for (name, field) in fields {
                if !schema.properties.contains_key(name) {
                    self.path.push(PathSegment::Field(name.clone()));
                    self.report(Constraint::NoAdditionalProperties, Some(field));
                    self.path.pop();
                }
            }
        }
    }

    fn string(&mut self, schema: &StringSchema, value: &Value, text: &str) {
        if let Some(format) = schema.format {
            if !format.matches(text) {
                self.report(Constraint::Format(format), Some(value));
            }
        }
        let len = text.chars().count();
        if let Some(min) = schema.min_length {
            if len < min {
                self.report(Constraint::MinLength(min), Some(value));
            }
        }
        if let Some(max) = schema.max_length {
            if len > max {
                self.report(Constraint::MaxLength(max), Some(value));
            }
        }
    }

    fn integer(&mut self, schema: &IntegerSchema, value: &Value, n: &Number) {
        if let Some(min) = schema.minimum {
            if compare_to_i64(n, min) == Some(std::cmp::Ordering::Less) {
                self.report(Constraint::Minimum(Number::from(min)), Some(value));
            }
        }
        if let Some(max) = schema.maximum {
            if compare_to_i64(n, max) == Some(std::cmp::Ordering::Greater) {
                self.report(Constraint::Maximum(Number::from(max)), Some(value));
            }
        }
    }

    fn number(&mut self, schema: &NumberSchema, value: &Value, n: &Number) {
        let Some(x) = n.as_f64() else {
            return;
        };
        if let Some(min) = &schema.minimum {
            if min.as_f64().is_some_and(|m| x < m) {
                self.report(Constraint::Minimum(min.clone()), Some(value));
            }
        }
        if let Some(max) = &schema.maximum {
            if max.as_f64().is_some_and(|m| x > m) {
                self.report(Constraint::Maximum(max.clone()), Some(value));
            }
        }
    }

    fn array(&mut self, schema: &ArraySchema, value: &Value, items: &[Value]) {
        if let Some(min) = schema.min_items {
            if items.len() < min {
                self.report(Constraint::MinItems(min), Some(value));
            }
        }
        if let Some(max) = schema.max_items {
            if items.len() > max {
                self.report(Constraint::MaxItems(max), Some(value));
            }
        }
        if schema.unique_items {
            for (i, item) in items.iter().enumerate() {
                if items[..i].iter().any(|earlier| json_eq(earlier, item)) {
                    self.path.push(PathSegment::Index(i));
                    self.report(Constraint::UniqueItems, Some(item));
                    self.path.pop();
                }
            }
        }
        if let Some(child) = &schema.items {
            for (i, item) in items.iter().enumerate() {
                self.descend(PathSegment::Index(i), child, item);
            }
        }
    }
}

/// `3` and `3.0` are integral; `3.5` and `"3"` are not.
fn is_integral(n: &Number) -> bool {
    n.is_i64() || n.is_u64() || n.as_f64().is_some_and(|f| f.is_finite() && f.fract() == 0.0)
}

/// JSON equality: numbers compare by value (`1 == 1.0`), arrays and
/// objects member-wise.
fn json_eq(a: &Value, b: &Value) -> bool {
    match (a, b) {
        (Value::Number(x), Value::Number(y)) => numbers_eq(x, y),
        (Value::Array(xs), Value::Array(ys)) => {
            xs.len() == ys.len() && xs.iter().zip(ys).all(|(x, y)| json_eq(x, y))
        }
        (Value::Object(xm), Value::Object(ym)) => {
            xm.len() == ym.len()
                && xm
                    .iter()
                    .all(|(key, x)| ym.get(key).is_some_and(|y| json_eq(x, y)))
        }
        _ => a == b,
    }
}

fn numbers_eq(x: &Number, y: &Number) -> bool {
    let as_i128 = |n: &Number| {
        n.as_i64()
            .map(i128::from)
            .or_else(|| n.as_u64().map(i128::from))
    };
    match (as_i128(x), as_i128(y)) {
        (Some(a), Some(b)) => a == b,
        _ => matches!((x.as_f64(), y.as_f64()), (Some(a), Some(b)) if a == b),
    }
}

fn compare_to_i64(n: &Number, bound: i64) -> Option<std::cmp::Ordering> {
    if let Some(i) = n.as_i64() {
        Some(i.cmp(&bound))
    } else if let Some(u) = n.as_u64() {
        Some(i128::from(u).cmp(&i128::from(bound)))
    } else {
        n.as_f64().and_then(|f| f.partial_cmp(&(bound as f64)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn user_schema() -> Value {
        json!({
            "type": "object",
            "required": ["email", "name"],
            "properties": {
                "id": { "type": "integer", "minimum": 1 },
                "email": { "type": "string", "format": "email" },
                "name": { "type": "string", "minLength": 1, "maxLength": 100 },
                "roles": {
                    "type": "array",
                    "items": { "type": "string", "enum": ["admin", "user", "moderator"] },
                    "uniqueItems": true
                },
                "active": { "type": "boolean" },
                "score": { "type": "number", "minimum": 0, "maximum": 1.5 }
            }
        })
    }

    fn check(record: Value) -> ValidationResult {
        validate(&record, &user_schema()).unwrap()
    }

    fn path(segments: &[PathSegment]) -> Vec<PathSegment> {
        segments.to_vec()
    }

    #[test]
    fn test_conforming_record_is_valid() {
        let result = check(json!({
            "id": 1,
            "email": "john.doe@example.com",
            "name": "John Doe",
            "roles": ["user", "admin"],
            "active": true,
            "score": 0.75
        }));
        assert_eq!(result, ValidationResult::Valid);
        assert!(result.violations().is_empty());
    }

    #[test]
    fn test_empty_object_reports_each_required_field() {
        let violations = check(json!({})).into_violations();
        assert_eq!(
            violations,
            vec![
                Violation {
                    path: vec![],
                    expected: Constraint::Required("email".into()),
                    actual: None,
                },
                Violation {
                    path: vec![],
                    expected: Constraint::Required("name".into()),
                    actual: None,
                },
            ]
        );
    }

    #[test]
    fn test_string_id_is_not_an_integer() {
        let violations = check(json!({
            "id": "not_a_number",
            "email": "a@example.com",
            "name": "A"
        }))
        .into_violations();
        assert_eq!(
            violations,
            vec![Violation {
                path: path(&["id".into()]),
                expected: Constraint::Type(SchemaType::Integer),
                actual: Some(json!("not_a_number")),
            }]
        );
        assert_eq!(violations[0].expected.to_string(), "integer");
    }

    #[test]
    fn test_integral_float_counts_as_integer() {
        assert!(check(json!({ "id": 3.0, "email": "a@example.com", "name": "A" })).is_valid());
        let violations =
            check(json!({ "id": 3.5, "email": "a@example.com", "name": "A" })).into_violations();
        assert_eq!(violations[0].expected, Constraint::Type(SchemaType::Integer));
    }

    #[test]
    fn test_all_violations_are_collected() {
        let violations = check(json!({
            "id": "not_a_number",
            "email": "invalid-email",
            "name": ""
        }))
        .into_violations();
        let pointers: Vec<String> = violations.iter().map(Violation::pointer).collect();
        assert_eq!(pointers, vec!["/email", "/id", "/name"]);
        assert_eq!(violations[0].expected, Constraint::Format(StringFormat::Email));
        assert_eq!(violations[2].expected, Constraint::MinLength(1));
    }

    #[test]
    fn test_undeclared_fields_are_ignored() {
        let result = check(json!({
            "email": "a@example.com",
            "name": "A",
            "age": 30,
            "nickname": null
        }));
        assert!(result.is_valid());
    }

    #[test]
    fn test_strict_object_rejects_undeclared_fields() {
        let schema = json!({
            "type": "object",
            "additionalProperties": false,
            "properties": { "bio": { "type": "string" } }
        });
        let violations = validate(&json!({ "bio": "hi", "age": 30 }), &schema)
            .unwrap()
            .into_violations();
        assert_eq!(
            violations,
            vec![Violation {
                path: path(&["age".into()]),
                expected: Constraint::NoAdditionalProperties,
                actual: Some(json!(30)),
            }]
        );
    }

    #[test]
    fn test_null_where_object_required_is_a_violation() {
        let violations = check(Value::Null).into_violations();
        assert_eq!(violations.len(), 1);
        assert_eq!(violations[0].expected, Constraint::Type(SchemaType::Object));
        assert_eq!(violations[0].actual, Some(Value::Null));
    }

    #[test]
    fn test_enum_violation_inside_array_is_indexed() {
        let violations = check(json!({
            "email": "a@example.com",
            "name": "A",
            "roles": ["user", "invalid_role"]
        }))
        .into_violations();
        assert_eq!(violations.len(), 1);
        assert_eq!(violations[0].path, path(&["roles".into(), PathSegment::Index(1)]));
        assert!(matches!(violations[0].expected, Constraint::OneOf(_)));
        assert_eq!(violations[0].pointer(), "/roles/1");
    }

    #[test]
    fn test_duplicate_array_items_are_reported() {
        let violations = check(json!({
            "email": "a@example.com",
            "name": "A",
            "roles": ["user", "admin", "user"]
        }))
        .into_violations();
        assert_eq!(violations.len(), 1);
        assert_eq!(violations[0].expected, Constraint::UniqueItems);
        assert_eq!(violations[0].path, path(&["roles".into(), PathSegment::Index(2)]));
    }

    #[test]
    fn test_enum_compares_numbers_by_value() {
        let schema = json!({ "type": "integer", "enum": [1, 2] });
        assert!(validate(&json!(1.0), &schema).unwrap().is_valid());
        assert!(validate(&json!(2), &schema).unwrap().is_valid());
        assert!(!validate(&json!(3.0), &schema).unwrap().is_valid());

        let nested = json!({ "type": "array", "enum": [[1, { "k": 2 }]] });
        assert!(validate(&json!([1.0, { "k": 2.0 }]), &nested).unwrap().is_valid());
        assert!(!validate(&json!([1, { "k": 2, "x": 0 }]), &nested).unwrap().is_valid());
    }

    #[test]
    fn test_unique_items_compares_numbers_by_value() {
        let schema = json!({ "type": "array", "uniqueItems": true });
        let violations = validate(&json!([1, 1.0]), &schema).unwrap().into_violations();
        assert_eq!(violations.len(), 1);
        assert_eq!(violations[0].expected, Constraint::UniqueItems);
        assert_eq!(violations[0].path, path(&[PathSegment::Index(1)]));

        let objects = validate(&json!([{ "a": [1] }, { "a": [1.0] }]), &schema)
            .unwrap()
            .into_violations();
        assert_eq!(objects.len(), 1);
        assert!(validate(&json!([1, 2, "1"]), &schema).unwrap().is_valid());
    }

    #[test]
    fn test_boolean_and_number_type_mismatches() {
        let violations = check(json!({
            "email": "a@example.com",
            "name": "A",
            "active": "yes",
            "score": "1"
        }))
        .into_violations();
        assert_eq!(violations.len(), 2);

        assert_eq!(violations[0].path, path(&["active".into()]));
        assert_eq!(violations[0].expected, Constraint::Type(SchemaType::Boolean));
        assert_eq!(violations[0].actual, Some(json!("yes")));

        assert_eq!(violations[1].path, path(&["score".into()]));
        assert_eq!(violations[1].expected, Constraint::Type(SchemaType::Number));
        assert_eq!(violations[1].actual, Some(json!("1")));

        assert!(check(json!({
            "email": "a@example.com",
            "name": "A",
            "active": false,
            "score": 0.5
        }))
        .is_valid());
    }

    #[test]
    fn test_type_mismatch_suppresses_keyword_checks() {
        let schema = json!({ "type": "string", "minLength": 5, "enum": ["hello"] });
        let violations = validate(&json!(42), &schema).unwrap().into_violations();
        assert_eq!(violations.len(), 1);
        assert_eq!(violations[0].expected, Constraint::Type(SchemaType::String));
    }

    #[test]
    fn test_numeric_bounds() {
        let base = json!({ "email": "a@example.com", "name": "A" });
        let with = |field: &str, v: Value| {
            let mut record = base.clone();
            record[field] = v;
            check(record).into_violations()
        };
        assert_eq!(with("id", json!(0))[0].expected, Constraint::Minimum(Number::from(1)));
        assert!(with("id", json!(u64::MAX)).is_empty());
        assert!(matches!(with("score", json!(-0.1))[0].expected, Constraint::Minimum(_)));
        assert!(matches!(with("score", json!(2))[0].expected, Constraint::Maximum(_)));
        assert!(with("score", json!(1)).is_empty());
    }

    #[test]
    fn test_string_length_counts_characters_not_bytes() {
        let schema = json!({ "type": "string", "maxLength": 3 });
        assert_eq!(validate(&json!("żółw"), &schema).unwrap().violations().len(), 1);
        assert!(validate(&json!("żół"), &schema).unwrap().is_valid());
    }

    #[test]
    fn test_array_length_bounds() {
        let schema = json!({ "type": "array", "minItems": 1, "maxItems": 2 });
        assert_eq!(
            validate(&json!([]), &schema).unwrap().violations()[0].expected,
            Constraint::MinItems(1)
        );
        assert_eq!(
            validate(&json!([1, 2, 3]), &schema).unwrap().violations()[0].expected,
            Constraint::MaxItems(2)
        );
    }

    #[test]
    fn test_malformed_schema_is_error_not_invalid() {
        let err = validate(&json!({}), &json!({ "type": "unknown_type" })).unwrap_err();
        assert!(matches!(err, SchemaError::UnknownType { .. }));
    }

    #[test]
    fn test_violation_display_format() {
        let v = Violation {
            path: path(&["profile".into(), "website".into()]),
            expected: Constraint::Format(StringFormat::Uri),
            actual: Some(json!("johndoe.dev")),
        };
        let display = v.to_string();
        assert!(display.contains("/profile/website"));
        assert!(display.contains("expected format uri"));
    }

    #[test]
    fn test_violation_display_root() {
        let v = Violation {
            path: vec![],
            expected: Constraint::Required("email".into()),
            actual: None,
        };
        assert_eq!(v.to_string(), "  (root): required field missing: email");
    }

    #[test]
    fn test_violation_serializes_to_flat_json() {
        let v = Violation {
            path: path(&["roles".into(), PathSegment::Index(0)]),
            expected: Constraint::Type(SchemaType::String),
            actual: Some(json!(7)),
        };
        assert_eq!(
            serde_json::to_value(&v).unwrap(),
            json!({ "path": ["roles", 0], "expected": "string", "actual": 7 })
        );
    }

    #[test]
    fn test_validator_is_send_and_sync() {
        fn assert_send_sync<T: Send + Sync>() {}
        assert_send_sync::<RecordValidator>();
    }
}
