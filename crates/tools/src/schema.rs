//! Declarative input schemas and argument validation.
//!
//! Each operation declares its inputs as an ordered list of fields. The
//! schema is rendered to JSON Schema for discovery and evaluated against the
//! caller's arguments before anything else happens.

use serde::{Serialize, Serializer};
use serde_json::{Map, Number, Value, json};

use crate::error::InvocationError;

/// Primitive type of an input field.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum FieldType {
    String,
    Integer,
    Number,
    Boolean,
}

impl FieldType {
    /// JSON Schema type name.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::String => "string",
            Self::Integer => "integer",
            Self::Number => "number",
            Self::Boolean => "boolean",
        }
    }
}

/// One declared input field.
#[derive(Debug, Clone, PartialEq)]
pub struct FieldSpec {
    pub name: String,
    pub field_type: FieldType,
    pub description: String,
    pub required: bool,
    /// Value applied when an optional field is absent.
    pub default: Option<Value>,
    /// Inclusive lower bound for numeric fields.
    pub minimum: Option<f64>,
    /// Inclusive upper bound for numeric fields.
    pub maximum: Option<f64>,
}

impl FieldSpec {
    fn to_json_schema(&self) -> Value {
        let mut prop = Map::new();
        prop.insert("type".into(), json!(self.field_type.as_str()));
        prop.insert("description".into(), json!(self.description));
        if let Some(default) = &self.default {
            prop.insert("default".into(), default.clone());
        }
        if let Some(minimum) = self.minimum {
            prop.insert("minimum".into(), number_value(minimum));
        }
        if let Some(maximum) = self.maximum {
            prop.insert("maximum".into(), number_value(maximum));
        }
        Value::Object(prop)
    }
}

/// Ordered set of input fields for one operation.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct InputSchema {
    fields: Vec<FieldSpec>,
}

impl InputSchema {
    /// A schema with no inputs.
    #[must_use]
    pub const fn empty() -> Self {
        Self { fields: Vec::new() }
    }

    /// Add a required field.
    #[must_use]
    pub fn required(self, name: &str, field_type: FieldType, description: &str) -> Self {
        self.push(name, field_type, description, true, None)
    }

    /// Add an optional field without a default.
    #[must_use]
    pub fn optional(self, name: &str, field_type: FieldType, description: &str) -> Self {
        self.push(name, field_type, description, false, None)
    }

    /// Add an optional field that takes `default` when absent.
    #[must_use]
    pub fn with_default(
        self,
        name: &str,
        field_type: FieldType,
        description: &str,
        default: Value,
    ) -> Self {
        self.push(name, field_type, description, false, Some(default))
    }

    /// Set the inclusive minimum of the most recently added field.
    #[must_use]
    pub fn minimum(mut self, minimum: f64) -> Self {
        if let Some(field) = self.fields.last_mut() {
            field.minimum = Some(minimum);
        }
        self
    }

    /// Set the inclusive maximum of the most recently added field.
    #[must_use]
    pub fn maximum(mut self, maximum: f64) -> Self {
        if let Some(field) = self.fields.last_mut() {
            field.maximum = Some(maximum);
        }
        self
    }

    fn push(
        mut self,
        name: &str,
        field_type: FieldType,
        description: &str,
        required: bool,
        default: Option<Value>,
    ) -> Self {
        self.fields.push(FieldSpec {
            name: name.to_string(),
            field_type,
            description: description.to_string(),
            required,
            default,
            minimum: None,
            maximum: None,
        });
        self
    }

    /// Declared fields in declaration order.
    #[must_use]
    pub fn fields(&self) -> &[FieldSpec] {
        &self.fields
    }

    /// Look up a field by name.
    #[must_use]
    pub fn field(&self, name: &str) -> Option<&FieldSpec> {
        self.fields.iter().find(|f| f.name == name)
    }

    /// Render as a JSON Schema object.
    #[must_use]
    pub fn to_json_schema(&self) -> Value {
        let properties: Map<String, Value> = self
            .fields
            .iter()
            .map(|f| (f.name.clone(), f.to_json_schema()))
            .collect();
        let required: Vec<&str> = self
            .fields
            .iter()
            .filter(|f| f.required)
            .map(|f| f.name.as_str())
            .collect();

        json!({
            "type": "object",
            "properties": properties,
            "required": required,
        })
    }

    /// Validate raw arguments against this schema.
    ///
    /// Fields not declared in the schema are ignored and `null` counts as
    /// absent. Supplied values are coerced to their declared type (numeric
    /// strings to numbers, numbers to strings, `"true"`/`"false"` to
    /// booleans). Defaults are applied only once every supplied field has
    /// passed.
    ///
    /// # Errors
    ///
    /// Returns [`InvocationError::InvalidArguments`] naming the first field
    /// that is missing, of the wrong type, or out of bounds.
    pub fn validate(&self, arguments: &Value) -> Result<Arguments, InvocationError> {
        let empty = Map::new();
        let supplied = match arguments {
            Value::Null => &empty,
            Value::Object(map) => map,
            _ => return Err(InvocationError::invalid("arguments", "must be a JSON object")),
        };

        let mut validated = Map::new();
        for field in &self.fields {
            let value = match supplied.get(&field.name) {
                None | Some(Value::Null) => None,
                Some(Value::String(s)) if s.is_empty() && !field.required => None,
                Some(value) => Some(value),
            };

            let Some(value) = value else {
                if field.required {
                    return Err(InvocationError::invalid(&field.name, "is required"));
                }
                continue;
            };

            let coerced = coerce(field, value)?;
            check_bounds(field, &coerced)?;
            validated.insert(field.name.clone(), coerced);
        }

        for field in &self.fields {
            if let Some(default) = &field.default {
                validated
                    .entry(field.name.clone())
                    .or_insert_with(|| default.clone());
            }
        }

        Ok(Arguments(validated))
    }
}

impl Serialize for InputSchema {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        self.to_json_schema().serialize(serializer)
    }
}

fn coerce(field: &FieldSpec, value: &Value) -> Result<Value, InvocationError> {
    let mismatch = || {
        InvocationError::invalid(
            &field.name,
            format!("must be of type {}", field.field_type.as_str()),
        )
    };

    match field.field_type {
        FieldType::String => match value {
            Value::String(s) if field.required && s.trim().is_empty() => {
                Err(InvocationError::invalid(&field.name, "must not be empty"))
            }
            Value::String(_) => Ok(value.clone()),
            Value::Number(n) => Ok(Value::String(n.to_string())),
            _ => Err(mismatch()),
        },
        FieldType::Integer => match value {
            Value::Number(n) => n
                .as_i64()
                .or_else(|| n.as_f64().and_then(integral))
                .map(Value::from)
                .ok_or_else(mismatch),
            Value::String(s) => {
                let s = s.trim();
                s.parse::<i64>()
                    .ok()
                    .or_else(|| s.parse::<f64>().ok().and_then(integral))
                    .map(Value::from)
                    .ok_or_else(mismatch)
            }
            _ => Err(mismatch()),
        },
        FieldType::Number => match value {
            Value::Number(_) => Ok(value.clone()),
            Value::String(s) => s
                .trim()
                .parse::<f64>()
                .ok()
                .and_then(Number::from_f64)
                .map(Value::Number)
                .ok_or_else(mismatch),
            _ => Err(mismatch()),
        },
        FieldType::Boolean => match value {
            Value::Bool(_) => Ok(value.clone()),
            Value::String(s) if s.eq_ignore_ascii_case("true") => Ok(Value::Bool(true)),
            Value::String(s) if s.eq_ignore_ascii_case("false") => Ok(Value::Bool(false)),
            _ => Err(mismatch()),
        },
    }
}

fn check_bounds(field: &FieldSpec, value: &Value) -> Result<(), InvocationError> {
    let Some(n) = value.as_f64() else {
        return Ok(());
    };
    if let Some(minimum) = field.minimum.filter(|&minimum| n < minimum) {
        return Err(InvocationError::invalid(
            &field.name,
            format!("must be at least {minimum}"),
        ));
    }
    if let Some(maximum) = field.maximum.filter(|&maximum| n > maximum) {
        return Err(InvocationError::invalid(
            &field.name,
            format!("must be at most {maximum}"),
        ));
    }
    Ok(())
}

#[allow(
    clippy::cast_possible_truncation,
    clippy::cast_precision_loss,
    clippy::float_cmp
)]
fn integral(f: f64) -> Option<i64> {
    let in_range = f.is_finite() && f >= i64::MIN as f64 && f <= i64::MAX as f64;
    (in_range && f.trunc() == f).then(|| f as i64)
}

fn number_value(f: f64) -> Value {
    integral(f).map_or_else(
        || Number::from_f64(f).map_or(Value::Null, Value::Number),
        Value::from,
    )
}

/// Arguments that passed schema validation, with defaults applied.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(transparent)]
pub struct Arguments(Map<String, Value>);

impl Arguments {
    /// Raw value of a field.
    #[must_use]
    pub fn get(&self, name: &str) -> Option<&Value> {
        self.0.get(name)
    }

    /// String value of a field.
    #[must_use]
    pub fn str(&self, name: &str) -> Option<&str> {
        self.0.get(name).and_then(Value::as_str)
    }

    /// Integer value of a field.
    #[must_use]
    pub fn i64(&self, name: &str) -> Option<i64> {
        self.0.get(name).and_then(Value::as_i64)
    }

    /// Numeric value of a field.
    #[must_use]
    pub fn f64(&self, name: &str) -> Option<f64> {
        self.0.get(name).and_then(Value::as_f64)
    }

    /// String value of a field that must be present.
    ///
    /// # Errors
    ///
    /// Returns [`InvocationError::InvalidArguments`] if the field is absent.
    pub fn require_str(&self, name: &str) -> Result<&str, InvocationError> {
        self.str(name)
            .ok_or_else(|| InvocationError::invalid(name, "is required"))
    }

    /// Integer value of a field that must be present.
    ///
    /// # Errors
    ///
    /// Returns [`InvocationError::InvalidArguments`] if the field is absent.
    pub fn require_i64(&self, name: &str) -> Result<i64, InvocationError> {
        self.i64(name)
            .ok_or_else(|| InvocationError::invalid(name, "is required"))
    }

    /// Unsigned integer value of a field that must be present.
    ///
    /// # Errors
    ///
    /// Returns [`InvocationError::InvalidArguments`] if the field is absent
    /// or does not fit in a `u32`.
    pub fn require_u32(&self, name: &str) -> Result<u32, InvocationError> {
        let value = self.require_i64(name)?;
        u32::try_from(value).map_err(|_| InvocationError::invalid(name, "is out of range"))
    }
}
