//! Per-request snapshot of submitted field values

use indexmap::IndexMap;
use serde::Serialize;
use serde_json::Value;
use std::collections::HashMap;

use crate::core::error::ValidationError;

/// Where a field value was read from
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum FieldLocation {
    Body,
    Params,
    Query,
}

/// A submitted value and the request location it came from
#[derive(Debug, Clone, PartialEq)]
pub struct FieldEntry {
    pub value: Value,
    pub location: FieldLocation,
}

/// Field values of one request
///
/// Built from the JSON body first, then path parameters, then the query
/// string. A name already present keeps its earlier value.
#[derive(Debug, Clone, Default)]
pub struct ValidationContext {
    fields: IndexMap<String, FieldEntry>,
}

impl ValidationContext {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a context from a JSON body
    ///
    /// `null` (an empty body) yields an empty context; any other non-object
    /// body is rejected.
    pub fn from_body(body: Value) -> Result<Self, ValidationError> {
        let mut ctx = Self::new();
        ctx.merge_body(body)?;
        Ok(ctx)
    }

    pub fn merge_body(&mut self, body: Value) -> Result<(), ValidationError> {
        match body {
            Value::Null => Ok(()),
            Value::Object(map) => {
                for (name, value) in map {
                    self.insert_if_absent(name, value, FieldLocation::Body);
                }
                Ok(())
            }
            other => Err(ValidationError::InvalidJson {
                message: format!("expected a JSON object, got {}", json_type(&other)),
            }),
        }
    }

    pub fn with_params(mut self, params: HashMap<String, String>) -> Self {
        self.merge_strings(params, FieldLocation::Params);
        self
    }

    pub fn with_query(mut self, query: HashMap<String, String>) -> Self {
        self.merge_strings(query, FieldLocation::Query);
        self
    }

    fn merge_strings(&mut self, values: HashMap<String, String>, location: FieldLocation) {
        let mut values: Vec<_> = values.into_iter().collect();
        values.sort();
        for (name, value) in values {
            self.insert_if_absent(name, Value::String(value), location);
        }
    }

    fn insert_if_absent(&mut self, name: String, value: Value, location: FieldLocation) {
        self.fields
            .entry(name)
            .or_insert(FieldEntry { value, location });
    }

    pub fn get(&self, field: &str) -> Option<&FieldEntry> {
        self.fields.get(field)
    }

    pub fn value(&self, field: &str) -> Option<&Value> {
        self.fields.get(field).map(|entry| &entry.value)
    }

    pub fn contains(&self, field: &str) -> bool {
        self.fields.contains_key(field)
    }

    pub fn len(&self) -> usize {
        self.fields.len()
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }
}

fn json_type(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "an object",
    }
}
