//! Dynamic thing record

use std::collections::HashMap;

use chrono::DateTime;
use chrono::Utc;

use super::Value;
use crate::error::FieldError;

/// Name of the unique identifier field present on every fetched record.
pub const ID_FIELD: &str = "_id";

/// A schema-less record ("thing") from the Bubble Data API.
///
/// Records hold field values as a `HashMap<String, Value>`, allowing dynamic
/// access to any field. Every record returned by the API carries the unique
/// identifier field `_id`. Typed getter methods provide safe access with
/// proper error handling.
///
/// # Example
///
/// ```
/// use bubble_lib::model::Record;
///
/// let record = Record::new()
///     .set("name", "Acme")
///     .set("rank", 42i64);
///
/// assert_eq!(record.get_string("name").unwrap(), Some("Acme"));
/// ```
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Record {
    /// The field values.
    pub(crate) fields: HashMap<String, Value>,
}

impl Record {
    /// Creates a new empty record.
    pub fn new() -> Self {
        Self {
            fields: HashMap::new(),
        }
    }

    /// Returns the unique Bubble ID of the record, if present.
    pub fn id(&self) -> Option<&str> {
        self.fields.get(ID_FIELD).and_then(Value::as_str)
    }

    // =========================================================================
    // Raw field access
    // =========================================================================

    /// Returns a reference to the field value, if it exists.
    pub fn get(&self, field: &str) -> Option<&Value> {
        self.fields.get(field)
    }

    /// Returns `true` if the record contains the given field.
    pub fn contains(&self, field: &str) -> bool {
        self.fields.contains_key(field)
    }

    /// Returns a reference to all fields.
    pub fn fields(&self) -> &HashMap<String, Value> {
        &self.fields
    }

    /// Returns a mutable reference to all fields.
    pub fn fields_mut(&mut self) -> &mut HashMap<String, Value> {
        &mut self.fields
    }

    // =========================================================================
    // Setters
    // =========================================================================

    /// Sets a field value (builder pattern).
    pub fn set(mut self, field: impl Into<String>, value: impl Into<Value>) -> Self {
        self.fields.insert(field.into(), value.into());
        self
    }

    /// Inserts a field value.
    pub fn insert(&mut self, field: impl Into<String>, value: impl Into<Value>) {
        self.fields.insert(field.into(), value.into());
    }

    /// Removes a field and returns its value.
    pub fn remove(&mut self, field: &str) -> Option<Value> {
        self.fields.remove(field)
    }

    // =========================================================================
    // Typed getters
    //
    // Return Err if field is missing or wrong type.
    // Return Ok(None) only if the field exists and is Value::Null.
    // =========================================================================

    /// Gets a string field value.
    pub fn get_string(&self, field: &str) -> Result<Option<&str>, FieldError> {
        match self.fields.get(field) {
            None => Err(missing(field)),
            Some(Value::Null) => Ok(None),
            Some(Value::String(s)) => Ok(Some(s.as_str())),
            Some(other) => Err(mismatch(field, "string", other)),
        }
    }

    /// Gets a boolean field value.
    pub fn get_bool(&self, field: &str) -> Result<Option<bool>, FieldError> {
        match self.fields.get(field) {
            None => Err(missing(field)),
            Some(Value::Null) => Ok(None),
            Some(Value::Bool(b)) => Ok(Some(*b)),
            Some(other) => Err(mismatch(field, "bool", other)),
        }
    }

    /// Gets an integer field value.
    pub fn get_int(&self, field: &str) -> Result<Option<i64>, FieldError> {
        match self.fields.get(field) {
            None => Err(missing(field)),
            Some(Value::Null) => Ok(None),
            Some(Value::Int(n)) => Ok(Some(*n)),
            Some(other) => Err(mismatch(field, "int", other)),
        }
    }

    /// Gets a floating point field value.
    pub fn get_float(&self, field: &str) -> Result<Option<f64>, FieldError> {
        match self.fields.get(field) {
            None => Err(missing(field)),
            Some(Value::Null) => Ok(None),
            Some(Value::Float(n)) => Ok(Some(*n)),
            Some(Value::Int(n)) => Ok(Some(*n as f64)), // Allow widening
            Some(other) => Err(mismatch(field, "float", other)),
        }
    }

    /// Gets a DateTime field value.
    pub fn get_datetime(&self, field: &str) -> Result<Option<DateTime<Utc>>, FieldError> {
        match self.fields.get(field) {
            None => Err(missing(field)),
            Some(Value::Null) => Ok(None),
            Some(Value::DateTime(dt)) => Ok(Some(*dt)),
            Some(other) => Err(mismatch(field, "datetime", other)),
        }
    }

    /// Gets a list field value.
    pub fn get_list(&self, field: &str) -> Result<Option<&Vec<Value>>, FieldError> {
        match self.fields.get(field) {
            None => Err(missing(field)),
            Some(Value::Null) => Ok(None),
            Some(Value::List(items)) => Ok(Some(items)),
            Some(other) => Err(mismatch(field, "list", other)),
        }
    }
}

fn missing(field: &str) -> FieldError {
    FieldError::Missing {
        field: field.to_string(),
    }
}

fn mismatch(field: &str, expected: &'static str, value: &Value) -> FieldError {
    FieldError::TypeMismatch {
        field: field.to_string(),
        expected,
        actual: value.type_name(),
    }
}
