use serde_json::Value;

use crate::raw::{RawField, RawSchema};

/// Structural kind of a field after vendor type translation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FieldKind {
    String,
    Integer,
    Boolean,
    Object,
    Array,
}

impl FieldKind {
    /// Translate a vendor type token. Unknown tokens are structs, hence objects.
    pub fn from_vendor(token: &str) -> Self {
        match token {
            "string" | "enum" => FieldKind::String,
            "uint" | "int" | "integer" | "timestamp" => FieldKind::Integer,
            "bool" => FieldKind::Boolean,
            _ => FieldKind::Object,
        }
    }
}

/// Which of read/write/delete a field takes part in.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Operations {
    pub read: bool,
    pub write: bool,
    pub delete: bool,
}

impl Operations {
    /// Parse a WAPI `supports` string such as `"rwus"`.
    pub fn parse(supports: &str) -> Self {
        Operations {
            read: supports.contains('r'),
            write: supports.contains('w'),
            delete: supports.contains('d'),
        }
    }
}

/// Access mode exposed in the generated document.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Access {
    ReadWrite,
    ReadOnly,
    WriteOnly,
    DeleteOnly,
}

impl From<Operations> for Access {
    fn from(ops: Operations) -> Self {
        match (ops.read, ops.write, ops.delete) {
            (true, false, _) => Access::ReadOnly,
            (false, true, _) => Access::WriteOnly,
            (false, false, true) => Access::DeleteOnly,
            _ => Access::ReadWrite,
        }
    }
}

/// A field descriptor with its vendor quirks resolved.
#[derive(Debug, Clone, PartialEq)]
pub struct NormalizedField {
    pub name: String,
    pub kind: FieldKind,
    /// The untranslated vendor type token (`"uint"`, `"awsrte53recordinfo"`, ...).
    pub original_kind: String,
    pub description: String,
    pub operations: Operations,
    pub access: Access,
    pub is_array: bool,
    pub required: bool,
    pub filterable: bool,
    pub enum_values: Option<Vec<Value>>,
    pub nested_schema: Option<RawSchema>,
}

impl NormalizedField {
    pub fn is_writable(&self) -> bool {
        self.operations.write
    }
}

/// Normalize one raw field. Fields without a name are dropped.
pub fn normalize_field(raw: &RawField) -> Option<NormalizedField> {
    let name = raw.name.as_deref().filter(|n| !n.is_empty())?;

    let original_kind = raw.primary_type().to_string();
    let kind = if raw.is_array {
        FieldKind::Array
    } else {
        FieldKind::from_vendor(&original_kind)
    };

    let operations = Operations::parse(&raw.supports);

    Some(NormalizedField {
        name: name.to_string(),
        kind,
        original_kind,
        description: raw.doc.as_deref().map(clean_doc).unwrap_or_default(),
        operations,
        access: Access::from(operations),
        is_array: raw.is_array,
        required: raw.required,
        filterable: raw.searchable_by.as_deref().is_some_and(|s| !s.is_empty()),
        enum_values: raw.enum_values.clone(),
        nested_schema: raw.nested_schema().cloned(),
    })
}

/// Collapse runs of whitespace and control characters into single spaces.
pub fn clean_doc(doc: &str) -> String {
    doc.split(|c: char| c.is_whitespace() || c.is_control())
        .filter(|word| !word.is_empty())
        .collect::<Vec<_>>()
        .join(" ")
}
