//! Vendor schema documents as returned by `GET /wapi/v{version}/{type}?_schema`.
//!
//! Decoding is deliberately lenient: WAPI versions disagree on which keys are
//! present, so every member has a default and unknown keys are ignored.

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// A raw object schema (or a nested struct schema inside a field).
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct RawSchema {
    #[serde(rename = "type", default, skip_serializing_if = "Option::is_none")]
    pub type_name: Option<String>,

    #[serde(default, deserialize_with = "null_as_default")]
    pub fields: Vec<RawField>,

    #[serde(default, skip_serializing_if = "Restrictions::is_empty")]
    pub restrictions: Restrictions,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub schema_version: Option<Value>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub version: Option<String>,
}

impl RawSchema {
    /// Decode a schema from an already-parsed JSON payload.
    pub fn from_value(value: Value) -> Result<Self, serde_json::Error> {
        serde_json::from_value(value)
    }

    /// An empty document carries nothing to generate from.
    pub fn is_empty(&self) -> bool {
        self.type_name.is_none() && self.fields.is_empty() && self.restrictions.is_empty()
    }
}

/// Operations an object type disallows. WAPI has shipped this both as a bare
/// list and wrapped in `{"list": [...]}`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Restrictions {
    List(Vec<String>),
    Wrapped {
        #[serde(default)]
        list: Vec<String>,
    },
    Other(Value),
}

impl Default for Restrictions {
    fn default() -> Self {
        Restrictions::List(Vec::new())
    }
}

impl Restrictions {
    pub fn as_list(&self) -> &[String] {
        match self {
            Restrictions::List(list) | Restrictions::Wrapped { list } => list.as_slice(),
            Restrictions::Other(_) => &[],
        }
    }

    pub fn is_empty(&self) -> bool {
        self.as_list().is_empty()
    }

    pub fn contains(&self, operation: &str) -> bool {
        self.as_list().iter().any(|r| r == operation)
    }
}

/// One field descriptor of a raw schema.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct RawField {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,

    /// Any of `r`, `w`, `d` (plus `s`/`u` which are ignored here).
    #[serde(default, deserialize_with = "null_as_default")]
    pub supports: String,

    /// Declared type list; only the first entry is authoritative.
    #[serde(rename = "type", default, skip_serializing_if = "Value::is_null")]
    pub types: Value,

    #[serde(default, deserialize_with = "null_as_default")]
    pub is_array: bool,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub doc: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub searchable_by: Option<String>,

    #[serde(default, deserialize_with = "null_as_default")]
    pub required: bool,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub enum_values: Option<Vec<Value>>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub schema: Option<Box<RawSchema>>,
}

impl RawField {
    /// The authoritative vendor type token, `string` when none is declared.
    pub fn primary_type(&self) -> &str {
        match &self.types {
            Value::Array(items) => items.first().and_then(Value::as_str).unwrap_or("string"),
            _ => "string",
        }
    }

    /// The nested struct schema, if one with any content was supplied.
    pub fn nested_schema(&self) -> Option<&RawSchema> {
        self.schema.as_deref().filter(|s| !s.is_empty())
    }
}

fn null_as_default<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: serde::Deserializer<'de>,
    T: Default + Deserialize<'de>,
{
    Ok(Option::<T>::deserialize(deserializer)?.unwrap_or_default())
}
