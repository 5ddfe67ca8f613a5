//! Typed OpenAPI 3.0 document model, serialized with `serde`.

pub mod document;
pub mod operation;
pub mod schema;
pub mod security;

pub use document::{Components, Contact, Info, OpenApiDocument, Tag};
pub use operation::{
    MediaType, Operation, Parameter, ParameterLocation, ParameterOrRef, PathItem, RequestBody,
    Response,
};
pub use schema::{AdditionalProperties, Schema, SchemaOrRef, SchemaType};
pub use security::{SecurityRequirement, SecurityScheme, SecuritySchemeType};

/// Serialize a document as JSON indented with `indent` spaces, or compact when `None`.
pub fn to_json(document: &OpenApiDocument, indent: Option<usize>) -> serde_json::Result<String> {
    match indent {
        None => serde_json::to_string(document),
        Some(width) => {
            use serde::Serialize;

            let indent = " ".repeat(width);
            let formatter = serde_json::ser::PrettyFormatter::with_indent(indent.as_bytes());
            let mut buf = Vec::new();
            let mut ser = serde_json::Serializer::with_formatter(&mut buf, formatter);
            document.serialize(&mut ser)?;
            // serde_json only ever writes valid UTF-8
            Ok(String::from_utf8_lossy(&buf).into_owned())
        }
    }
}

/// Serialize a document as block-style YAML.
pub fn to_yaml(document: &OpenApiDocument) -> Result<String, serde_yaml_ng::Error> {
    serde_yaml_ng::to_string(document)
}
