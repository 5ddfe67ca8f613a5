//! Raw WAPI schemas → normalized field and schema records.
//!
//! Normalization is a pure, non-recursive pass: nested struct schemas are
//! recorded as [`NestedSchemaRef`]s and expanded later by the emitter.

mod field;
mod schema;

pub use field::{Access, FieldKind, NormalizedField, Operations, clean_doc, normalize_field};
pub use schema::{NestedSchemaRef, NormalizeContext, NormalizedSchema, normalize_schema};
