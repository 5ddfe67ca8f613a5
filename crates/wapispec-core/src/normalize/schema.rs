use indexmap::IndexMap;

use crate::grouping::{Grouping, Selection};
use crate::naming::{capitalize, nested_schema_name, snake_name};
use crate::raw::RawSchema;

use super::field::{Access, NormalizedField, normalize_field};

/// A nested struct schema still waiting to be expanded into a component.
#[derive(Debug, Clone, PartialEq)]
pub struct NestedSchemaRef {
    /// Component name the nested schema will be emitted under.
    pub name: String,
    pub schema: RawSchema,
    /// Field of the owning schema that carries it.
    pub field_name: String,
}

/// One WAPI object type, ready for emission.
#[derive(Debug, Clone, PartialEq)]
pub struct NormalizedSchema {
    pub object_type: String,
    pub schema_name: String,
    pub fields: IndexMap<String, NormalizedField>,
    pub required_fields: Vec<String>,
    pub filterable_fields: Vec<String>,
    pub nested_schema_refs: Vec<NestedSchemaRef>,
    pub restrictions: Vec<String>,
    pub supports_create: bool,
    pub supports_delete: bool,
    pub supports_modify: bool,
    pub group: String,
}

impl NormalizedSchema {
    pub fn list_response_name(&self) -> String {
        format!("List{}Response", self.schema_name)
    }

    pub fn create_response_name(&self) -> String {
        format!("Create{}Response", self.schema_name)
    }

    pub fn get_response_name(&self) -> String {
        format!("Get{}Response", self.schema_name)
    }

    pub fn update_response_name(&self) -> String {
        format!("Update{}Response", self.schema_name)
    }

    /// Name used for tags and as the `operationId` prefix.
    pub fn display_name(&self) -> String {
        capitalize(&self.object_type)
    }

    /// The nested schema reference recorded for `field_name`, if any.
    pub fn nested_ref(&self, field_name: &str) -> Option<&NestedSchemaRef> {
        self.nested_schema_refs
            .iter()
            .find(|r| r.field_name == field_name)
    }

    /// Fields that only take part in delete calls.
    pub fn delete_only_fields(&self) -> impl Iterator<Item = &NormalizedField> {
        self.fields
            .values()
            .filter(|f| f.access == Access::DeleteOnly)
    }
}

/// Everything besides the raw schema that normalization depends on.
#[derive(Debug, Clone, Copy)]
pub struct NormalizeContext<'a> {
    pub grouping: &'a Grouping,
    pub selection: &'a Selection,
    pub pascal_case_schemas: bool,
}

/// Normalize a raw object schema. An empty schema yields `None`.
pub fn normalize_schema(
    raw: &RawSchema,
    object_type: &str,
    ctx: &NormalizeContext<'_>,
) -> Option<NormalizedSchema> {
    if raw.is_empty() {
        return None;
    }

    let type_name = raw
        .type_name
        .as_deref()
        .filter(|t| !t.is_empty())
        .unwrap_or(object_type)
        .to_string();

    let mut fields: IndexMap<String, NormalizedField> = IndexMap::new();
    for raw_field in &raw.fields {
        if let Some(field) = normalize_field(raw_field) {
            fields.insert(field.name.clone(), field);
        }
    }

    let required_fields = fields
        .values()
        .filter(|f| f.required)
        .map(|f| f.name.clone())
        .collect();
    let filterable_fields = fields
        .values()
        .filter(|f| f.filterable)
        .map(|f| f.name.clone())
        .collect();
    let nested_schema_refs = fields
        .values()
        .filter_map(|f| {
            f.nested_schema.as_ref().map(|schema| NestedSchemaRef {
                name: nested_schema_name(&type_name, &f.name),
                schema: schema.clone(),
                field_name: f.name.clone(),
            })
        })
        .collect();

    let schema_name = if ctx.pascal_case_schemas {
        capitalize(&type_name)
    } else {
        snake_name(&type_name)
    };

    let restrictions = raw.restrictions.as_list().to_vec();

    Some(NormalizedSchema {
        group: ctx.grouping.resolve_group(object_type, ctx.selection),
        supports_create: !raw.restrictions.contains("create"),
        supports_delete: !raw.restrictions.contains("delete"),
        supports_modify: fields.values().any(NormalizedField::is_writable),
        object_type: type_name,
        schema_name,
        fields,
        required_fields,
        filterable_fields,
        nested_schema_refs,
        restrictions,
    })
}
