use std::collections::HashSet;

use indexmap::IndexMap;
use log::{debug, warn};

use crate::naming::nested_schema_name;
use crate::normalize::{NestedSchemaRef, NormalizedField, NormalizedSchema, normalize_field};
use crate::openapi::{AdditionalProperties, Schema, SchemaOrRef, SchemaType};
use crate::raw::RawSchema;

use super::property::{example_for, to_openapi_property};

/// Component name of the shared extensible-attributes schema.
pub const EXTATTRS_SCHEMA: &str = "ExtAttrs";

/// Knobs that change the emitted component schemas.
#[derive(Debug, Clone)]
pub struct EmitOptions {
    pub include_examples: bool,
    /// Object type → fields whose value may be a function-call descriptor.
    pub callbacks: IndexMap<String, Vec<String>>,
}

impl Default for EmitOptions {
    fn default() -> Self {
        Self {
            include_examples: true,
            callbacks: IndexMap::new(),
        }
    }
}

impl EmitOptions {
    fn is_callback(&self, object_type: &str, field_name: &str) -> bool {
        self.callbacks
            .get(object_type)
            .is_some_and(|fields| fields.iter().any(|f| f == field_name))
    }
}

/// Accumulates `components.schemas` for one document.
///
/// The emitted-name set lives and dies with the emitter, so independent
/// documents never share de-duplication state.
pub struct SchemaEmitter<'a> {
    options: &'a EmitOptions,
    emitted: HashSet<String>,
    /// Names owned by primary schemas; nested expansion never takes them.
    reserved: HashSet<String>,
    schemas: IndexMap<String, SchemaOrRef>,
}

impl<'a> SchemaEmitter<'a> {
    pub fn new(options: &'a EmitOptions) -> Self {
        let mut emitter = Self {
            options,
            emitted: HashSet::new(),
            reserved: HashSet::new(),
            schemas: IndexMap::new(),
        };
        emitter.insert(EXTATTRS_SCHEMA.to_string(), extensible_attributes_schema());
        emitter
    }

    pub fn schemas(&self) -> &IndexMap<String, SchemaOrRef> {
        &self.schemas
    }

    pub fn finish(self) -> IndexMap<String, SchemaOrRef> {
        self.schemas
    }

    /// Keep the primary and response names of `schema` away from nested schemas.
    pub fn reserve(&mut self, schema: &NormalizedSchema) {
        self.reserved.extend([
            schema.schema_name.clone(),
            schema.list_response_name(),
            schema.create_response_name(),
            schema.get_response_name(),
            schema.update_response_name(),
        ]);
    }

    fn insert(&mut self, name: String, schema: Schema) {
        self.emitted.insert(name.clone());
        self.schemas.insert(name, SchemaOrRef::inline(schema));
    }

    /// Emit the primary schema, its nested schemas and its response variants.
    pub fn emit_schema(&mut self, schema: &NormalizedSchema) {
        if self.emitted.contains(&schema.schema_name) {
            warn!(
                "schema {} for {} already emitted, skipping",
                schema.schema_name, schema.object_type
            );
            return;
        }

        let mut primary = Schema::typed(SchemaType::Object).with_property(
            "_ref",
            SchemaOrRef::inline(
                Schema::typed(SchemaType::String).with_description("The reference to the object."),
            ),
        );
        primary.additional_properties = Some(AdditionalProperties::Bool(false));
        primary.required = schema.required_fields.clone();

        for field in schema.fields.values() {
            if field.name == "_ref" {
                continue;
            }
            let nested = schema.nested_ref(&field.name).map(|r| r.name.as_str());
            let property = self.field_property(Some(&schema.object_type), field, nested);
            primary.properties.insert(field.name.clone(), property);
        }
        self.insert(schema.schema_name.clone(), primary);

        for nested in &schema.nested_schema_refs {
            self.expand_nested(nested);
        }

        self.emit_response_variants(schema);
    }

    /// Expand a nested schema and everything reachable from it.
    ///
    /// Names already emitted are skipped, so expanding the same reference
    /// twice leaves the map untouched. Expansion walks an explicit stack in
    /// depth-first pre-order and terminates on any input.
    pub fn expand_nested(&mut self, nested: &NestedSchemaRef) {
        let mut stack: Vec<(String, &RawSchema)> = vec![(nested.name.clone(), &nested.schema)];

        while let Some((name, raw)) = stack.pop() {
            if self.emitted.contains(&name) {
                debug!("nested schema {name} already emitted");
                continue;
            }
            if self.reserved.contains(&name) {
                warn!("nested schema {name} collides with an object schema, using the object schema");
                continue;
            }

            let mut object = Schema::typed(SchemaType::Object);
            let mut children = Vec::new();
            for raw_field in &raw.fields {
                let Some(field) = normalize_field(raw_field) else {
                    continue;
                };
                let child = raw_field
                    .nested_schema()
                    .map(|child| (nested_schema_name(&name, &field.name), child));
                let property =
                    self.field_property(None, &field, child.as_ref().map(|(n, _)| n.as_str()));
                object.properties.insert(field.name.clone(), property);
                children.extend(child);
            }

            self.insert(name, object);
            stack.extend(children.into_iter().rev());
        }
    }

    /// Property of one field after structural overrides.
    ///
    /// `owner` is the object type for primary schemas and `None` inside
    /// nested schemas, where callbacks do not apply.
    fn field_property(
        &self,
        owner: Option<&str>,
        field: &NormalizedField,
        nested: Option<&str>,
    ) -> SchemaOrRef {
        let base = to_openapi_property(field);

        let property = if field.name == "extattrs" {
            let mut schema = base;
            schema.additional_properties = Some(AdditionalProperties::Schema(Box::new(
                SchemaOrRef::component(EXTATTRS_SCHEMA),
            )));
            schema
        } else if let Some(object_type) =
            owner.filter(|o| self.options.is_callback(o, &field.name))
        {
            callback_property(object_type, field, base)
        } else if let Some(child) = nested {
            if field.is_array {
                Schema {
                    schema_type: Some(SchemaType::Array),
                    description: base.description,
                    read_only: base.read_only,
                    write_only: base.write_only,
                    ..Default::default()
                }
                .with_items(SchemaOrRef::component(child))
            } else {
                return SchemaOrRef::component(child);
            }
        } else {
            base
        };

        SchemaOrRef::inline(self.with_example(property, &field.name))
    }

    fn with_example(&self, mut schema: Schema, field_name: &str) -> Schema {
        if !self.options.include_examples || !schema.enum_values.is_empty() {
            return schema;
        }
        if let Some(schema_type) = schema.schema_type {
            schema.example = example_for(schema_type, field_name);
        }
        schema
    }

    fn emit_response_variants(&mut self, schema: &NormalizedSchema) {
        let name = &schema.schema_name;
        let object = || SchemaOrRef::component(name);
        let wrapped = |description: String, title: String| {
            Schema::typed(SchemaType::Object)
                .with_description(description)
                .with_title(title)
                .with_property("result", object())
        };

        let list_name = schema.list_response_name();
        let list_description = format!("The response format to retrieve __{name}__ objects.");
        let list = Schema {
            one_of: vec![
                SchemaOrRef::inline(
                    Schema::typed(SchemaType::Array)
                        .with_description(list_description.clone())
                        .with_title(format!("{list_name}Array"))
                        .with_items(object()),
                ),
                SchemaOrRef::inline(
                    Schema::typed(SchemaType::Object)
                        .with_description(list_description)
                        .with_title(format!("{list_name}Object"))
                        .with_property(
                            "result",
                            SchemaOrRef::inline(Schema::typed(SchemaType::Array).with_items(object())),
                        ),
                ),
            ],
            ..Default::default()
        };
        self.insert(list_name, list);

        if schema.supports_create {
            let create_name = schema.create_response_name();
            let create = Schema {
                one_of: vec![
                    SchemaOrRef::inline(wrapped(
                        format!("The response format to create __{name}__ in object format."),
                        format!("{create_name}AsObject"),
                    )),
                    SchemaOrRef::inline(
                        Schema::typed(SchemaType::String)
                            .with_description(format!("The response format to create __{name}__."))
                            .with_title(create_name.clone()),
                    ),
                ],
                ..Default::default()
            };
            self.insert(create_name, create);
        }

        let get_name = schema.get_response_name();
        let mut get_wrapped = wrapped(
            format!("The response format to retrieve __{name}__ objects."),
            format!("{get_name}ObjectAsResult"),
        );
        get_wrapped.additional_properties = Some(AdditionalProperties::Bool(false));
        let get = Schema {
            one_of: vec![object(), SchemaOrRef::inline(get_wrapped)],
            ..Default::default()
        };
        self.insert(get_name, get);

        if schema.supports_modify {
            let update_name = schema.update_response_name();
            let update = Schema {
                one_of: vec![
                    SchemaOrRef::inline(wrapped(
                        format!("The response format to update __{name}__ in object format."),
                        format!("{update_name}AsObject"),
                    )),
                    SchemaOrRef::inline(
                        Schema::typed(SchemaType::String)
                            .with_description(format!("The response format to update __{name}__."))
                            .with_title(update_name.clone()),
                    ),
                ],
                ..Default::default()
            };
            self.insert(update_name, update);
        }
    }
}

/// Emit all component schemas of one document.
pub fn emit_schemas(
    schemas: &[NormalizedSchema],
    options: &EmitOptions,
) -> IndexMap<String, SchemaOrRef> {
    let mut emitter = SchemaEmitter::new(options);
    for schema in schemas {
        emitter.reserve(schema);
    }
    for schema in schemas {
        emitter.emit_schema(schema);
    }
    emitter.finish()
}

fn extensible_attributes_schema() -> Schema {
    let mut schema = Schema::typed(SchemaType::Object)
        .with_description("Extensible attributes associated with the object.")
        .with_property(
            "value",
            SchemaOrRef::inline(
                Schema::default().with_description("The value of the extensible attribute."),
            ),
        );
    schema.required = vec!["value".to_string()];
    schema
}

/// A field that accepts either a plain value or a function-call descriptor.
fn callback_property(object_type: &str, field: &NormalizedField, base: Schema) -> Schema {
    let description = format!("{object_type}: {}", field.description);
    let typed = |t: SchemaType| SchemaOrRef::inline(Schema::typed(t));

    let mut call = Schema::typed(SchemaType::Object)
        .with_description(description.clone())
        .with_property("_object_function", typed(SchemaType::String))
        .with_property("_parameters", typed(SchemaType::Object))
        .with_property("_result_field", typed(SchemaType::String))
        .with_property("_object", typed(SchemaType::String))
        .with_property("_object_parameters", typed(SchemaType::Object));
    if field.name == "network" {
        call = call.with_property(
            "_object_ref",
            SchemaOrRef::inline(Schema::typed(SchemaType::String).with_description(
                "A WAPI object reference on which the function calls. \
                 Either _object or _object_ref must be set.",
            )),
        );
    }

    Schema {
        description: base.description,
        read_only: base.read_only,
        write_only: base.write_only,
        one_of: vec![
            SchemaOrRef::inline(Schema::typed(SchemaType::String).with_description(description)),
            SchemaOrRef::inline(call),
        ],
        ..Default::default()
    }
}
