use serde_json::Value;

use crate::normalize::{Access, FieldKind, NormalizedField};
use crate::openapi::{Schema, SchemaOrRef, SchemaType};

/// OpenAPI type of a vendor type token, `None` when the token is unmapped.
fn mapped_type(token: &str) -> Option<SchemaType> {
    match token {
        "string" | "enum" => Some(SchemaType::String),
        "uint" | "int" | "integer" | "timestamp" => Some(SchemaType::Integer),
        "bool" => Some(SchemaType::Boolean),
        "extattr" => Some(SchemaType::Object),
        _ => None,
    }
}

fn vendor_format(token: &str) -> Option<&'static str> {
    match token {
        "timestamp" | "uint" | "int" => Some("int64"),
        _ => None,
    }
}

/// Schema for a single vendor type token.
///
/// Unmapped tokens fall back to `fallback` and keep the token as a
/// one-element enumeration so the vendor type name survives translation.
fn token_schema(token: &str, fallback: SchemaType) -> Schema {
    let mapped = mapped_type(token);
    let mut schema = Schema::typed(mapped.unwrap_or(fallback));
    schema.format = vendor_format(token).map(str::to_string);
    if mapped.is_none() && !token.is_empty() {
        schema.enum_values = vec![Value::String(token.to_string())];
    }
    schema
}

/// Item schema of an array field without a nested struct.
///
/// Bare array items are never forced to `object`: an unmapped element type
/// stays a string carrying the vendor token.
pub fn array_items(field: &NormalizedField) -> Schema {
    let mut items = token_schema(&field.original_kind, SchemaType::String);
    if let Some(values) = field.enum_values.as_ref().filter(|v| !v.is_empty()) {
        items.enum_values = values.clone();
    }
    items
}

/// Convert a normalized field into its OpenAPI property definition.
pub fn to_openapi_property(field: &NormalizedField) -> Schema {
    let mut schema = if field.kind == FieldKind::Array {
        Schema::typed(SchemaType::Array).with_items(SchemaOrRef::inline(array_items(field)))
    } else {
        let mut schema = token_schema(&field.original_kind, SchemaType::Object);
        if let Some(values) = field.enum_values.as_ref().filter(|v| !v.is_empty()) {
            schema.enum_values = values.clone();
        }
        schema
    };

    if !field.description.is_empty() {
        schema.description = Some(field.description.clone());
    }

    match field.access {
        Access::ReadOnly => schema.read_only = Some(true),
        Access::WriteOnly => schema.write_only = Some(true),
        Access::ReadWrite | Access::DeleteOnly => {}
    }

    schema
}

/// The type-only part of a property, used for query parameters.
pub fn parameter_schema(field: &NormalizedField) -> Schema {
    let property = to_openapi_property(field);
    let mut schema = Schema {
        schema_type: property.schema_type,
        format: property.format,
        items: property.items,
        ..Default::default()
    };
    if field.kind != FieldKind::Array {
        if let Some(values) = field.enum_values.as_ref() {
            schema.enum_values = values.clone();
        }
    }
    schema
}

/// Example value for a property of the given type.
pub fn example_for(schema_type: SchemaType, field_name: &str) -> Option<Value> {
    match schema_type {
        SchemaType::String => Some(Value::String(format!("Example {field_name}"))),
        SchemaType::Integer => Some(Value::from(1)),
        SchemaType::Boolean => Some(Value::Bool(false)),
        SchemaType::Array | SchemaType::Object => None,
    }
}
