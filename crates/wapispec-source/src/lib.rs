//! [`SchemaSource`](wapispec_core::SchemaSource) implementations.

pub mod dir;
pub mod http;

pub use dir::DirSchemaSource;
pub use http::{HttpSchemaSource, WapiConnection};
