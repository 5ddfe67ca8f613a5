//! Normalized schemas → OpenAPI components, paths and documents.

pub mod document;
pub mod paths;
pub mod property;
pub mod schemas;

pub use document::{DocumentOptions, build_document};
pub use paths::{common_parameters, emit_paths, emit_tags};
pub use property::to_openapi_property;
pub use schemas::{EXTATTRS_SCHEMA, EmitOptions, SchemaEmitter, emit_schemas};
