use indexmap::IndexMap;
use serde_json::json;

use crate::normalize::{NormalizedField, NormalizedSchema};
use crate::openapi::{
    MediaType, Operation, Parameter, ParameterLocation, ParameterOrRef, PathItem, RequestBody,
    Response, Schema, SchemaOrRef, SchemaType, SecurityRequirement, Tag,
};

use super::property::parameter_schema;

/// Name of the security scheme every operation requires.
pub const BASIC_AUTH: &str = "basicAuth";

const LIST_PARAMETERS: [&str; 12] = [
    "ReturnFields",
    "ReturnFieldsPlus",
    "MaxResults",
    "ReturnAsObject",
    "Paging",
    "PageId",
    "ProxySearch",
    "Schema",
    "SchemaVersion",
    "GetDoc",
    "SchemaSearchable",
    "Inheritance",
];
const READ_PARAMETERS: [&str; 4] = [
    "ReturnFields",
    "ReturnFieldsPlus",
    "ReturnAsObject",
    "Inheritance",
];
const UPDATE_PARAMETERS: [&str; 3] = ["ReturnFields", "ReturnFieldsPlus", "ReturnAsObject"];

fn query(name: &str, description: &str, schema: Schema) -> ParameterOrRef {
    ParameterOrRef::Parameter(Parameter {
        name: name.to_string(),
        location: ParameterLocation::Query,
        description: Some(description.to_string()),
        required: false,
        schema: Some(SchemaOrRef::inline(schema)),
    })
}

fn flag(values: [i64; 2]) -> Schema {
    Schema::typed(SchemaType::Integer).with_enum(values.iter().map(|v| json!(v)).collect())
}

/// The WAPI query arguments shared by every object type.
pub fn common_parameters() -> IndexMap<String, ParameterOrRef> {
    let string = || Schema::typed(SchemaType::String);
    let mut max_results = Schema::typed(SchemaType::Integer);
    max_results.format = Some("int32".to_string());
    max_results.minimum = Some(1);

    [
        (
            "ReturnFields",
            query("_return_fields", "Enter the field names followed by comma", string()),
        ),
        (
            "ReturnFieldsPlus",
            query(
                "_return_fields+",
                "Enter the field names followed by comma, this returns the required fields \
                 along with the default fields",
                string(),
            ),
        ),
        (
            "MaxResults",
            query("_max_results", "Enter the number of results to be fetched", max_results),
        ),
        (
            "ReturnAsObject",
            query("_return_as_object", "Select 1 if result is required as an object", flag([0, 1])),
        ),
        ("Paging", query("_paging", "Control paging of results", flag([0, 1]))),
        (
            "PageId",
            query("_page_id", "Page id for retrieving next page of results", string()),
        ),
        ("ProxySearch", query("_proxy_search", "Search Grid members for data", string())),
        ("Schema", query("_schema", "Return schema for this object type", flag([0, 1]))),
        (
            "SchemaVersion",
            query("_schema_version", "Schema version to use", flag([1, 2])),
        ),
        ("GetDoc", query("_get_doc", "Return documentation with schema", flag([0, 1]))),
        (
            "SchemaSearchable",
            query("_schema_searchable", "Return searchable fields with schema", flag([0, 1])),
        ),
        (
            "Inheritance",
            query(
                "_inheritance",
                "If this option is set to True, fields which support inheritance, will display \
                 data properly.",
                Schema::typed(SchemaType::Boolean),
            ),
        ),
    ]
    .into_iter()
    .map(|(key, parameter)| (key.to_string(), parameter))
    .collect()
}

/// One tag per distinct object type, in order of first appearance.
pub fn emit_tags(schemas: &[NormalizedSchema]) -> Vec<Tag> {
    let mut tags: Vec<Tag> = Vec::new();
    for schema in schemas {
        let name = schema.display_name();
        if tags.iter().any(|t| t.name == name) {
            continue;
        }
        tags.push(Tag {
            name,
            description: Some(format!("Operations for {} objects", schema.object_type)),
        });
    }
    tags
}

/// Collection and item path items for every schema, in input order.
pub fn emit_paths(schemas: &[NormalizedSchema]) -> IndexMap<String, PathItem> {
    let mut paths = IndexMap::new();
    for schema in schemas {
        let builder = OperationBuilder::new(schema);

        let collection = PathItem {
            get: Some(builder.list()),
            post: schema.supports_create.then(|| builder.create()),
            ..Default::default()
        };
        let item = PathItem {
            get: Some(builder.read()),
            put: schema.supports_modify.then(|| builder.update()),
            delete: schema.supports_delete.then(|| builder.delete()),
            ..Default::default()
        };

        paths.insert(format!("/{}", schema.object_type), collection);
        paths.insert(format!("/{}/{{reference}}", schema.object_type), item);
    }
    paths
}

struct OperationBuilder<'a> {
    schema: &'a NormalizedSchema,
    tag: String,
}

impl<'a> OperationBuilder<'a> {
    fn new(schema: &'a NormalizedSchema) -> Self {
        Self {
            schema,
            tag: schema.display_name(),
        }
    }

    fn operation(&self, suffix: &str, summary: String, description: String) -> Operation {
        let mut requirement = SecurityRequirement::new();
        requirement.insert(BASIC_AUTH.to_string(), Vec::new());
        Operation {
            tags: vec![self.tag.clone()],
            operation_id: Some(format!("{}{suffix}", self.tag)),
            summary: Some(summary),
            description: Some(description),
            parameters: Vec::new(),
            request_body: None,
            responses: IndexMap::new(),
            security: Some(vec![requirement]),
        }
    }

    fn reference(&self) -> ParameterOrRef {
        ParameterOrRef::Parameter(Parameter {
            name: "reference".to_string(),
            location: ParameterLocation::Path,
            description: Some(format!("Reference of the {} object", self.schema.object_type)),
            required: true,
            schema: Some(SchemaOrRef::inline(Schema::typed(SchemaType::String))),
        })
    }

    fn body(&self, description: &str) -> RequestBody {
        let mut content = IndexMap::new();
        content.insert(
            "application/json".to_string(),
            MediaType {
                schema: Some(SchemaOrRef::component(&self.schema.schema_name)),
            },
        );
        RequestBody {
            description: Some(description.to_string()),
            required: true,
            content,
        }
    }

    fn list(&self) -> Operation {
        let object_type = &self.schema.object_type;
        let mut op = self.operation(
            "List",
            format!("Retrieve {object_type} objects"),
            format!("Returns a list of {object_type} objects matching the search criteria"),
        );
        op.parameters = refs(&LIST_PARAMETERS);
        for field in self
            .schema
            .filterable_fields
            .iter()
            .filter_map(|name| self.schema.fields.get(name))
        {
            op.parameters
                .push(field_parameter(field, &format!("Filter by {}", field.name)));
        }
        op.responses = responses(
            "200",
            Response::json(
                "Successful operation",
                SchemaOrRef::component(&self.schema.list_response_name()),
            ),
            true,
        );
        op
    }

    fn create(&self) -> Operation {
        let object_type = &self.schema.object_type;
        let mut op = self.operation(
            "Create",
            format!("Create a {object_type} object"),
            format!("Creates a new {object_type} object"),
        );
        op.parameters = refs(&READ_PARAMETERS);
        op.request_body = Some(self.body("Object data to create"));
        op.responses = responses(
            "201",
            Response::json(
                "Object created successfully",
                SchemaOrRef::component(&self.schema.create_response_name()),
            ),
            false,
        );
        op
    }

    fn read(&self) -> Operation {
        let object_type = &self.schema.object_type;
        let mut op = self.operation(
            "Read",
            format!("Get a specific {object_type} object"),
            format!("Returns a specific {object_type} object by reference"),
        );
        op.parameters = vec![self.reference()];
        op.parameters.extend(refs(&READ_PARAMETERS));
        op.responses = responses(
            "200",
            Response::json(
                "Successful operation",
                SchemaOrRef::component(&self.schema.get_response_name()),
            ),
            true,
        );
        op
    }

    fn update(&self) -> Operation {
        let object_type = &self.schema.object_type;
        let mut op = self.operation(
            "Update",
            format!("Update a {object_type} object"),
            format!("Updates a specific {object_type} object by reference"),
        );
        op.parameters = vec![self.reference()];
        op.parameters.extend(refs(&UPDATE_PARAMETERS));
        op.request_body = Some(self.body("Object data to update"));
        op.responses = responses(
            "200",
            Response::json(
                "Object updated successfully",
                SchemaOrRef::component(&self.schema.update_response_name()),
            ),
            true,
        );
        op
    }

    fn delete(&self) -> Operation {
        let object_type = &self.schema.object_type;
        let mut op = self.operation(
            "Delete",
            format!("Delete a {object_type} object"),
            format!("Deletes a specific {object_type} object by reference"),
        );
        op.parameters = vec![self.reference()];
        for field in self.schema.delete_only_fields() {
            op.parameters
                .push(field_parameter(field, &format!("Delete option: {}", field.name)));
        }
        op.responses = responses("200", Response::empty("Object deleted successfully"), true);
        op
    }
}

fn refs(names: &[&str]) -> Vec<ParameterOrRef> {
    names.iter().map(|name| ParameterOrRef::component(name)).collect()
}

fn field_parameter(field: &NormalizedField, fallback: &str) -> ParameterOrRef {
    let description = if field.description.is_empty() {
        fallback
    } else {
        field.description.as_str()
    };
    query(&field.name, description, parameter_schema(field))
}

fn responses(code: &str, success: Response, not_found: bool) -> IndexMap<String, Response> {
    let mut responses = IndexMap::new();
    responses.insert(code.to_string(), success);
    responses.insert("400".to_string(), Response::empty("Bad request"));
    responses.insert("401".to_string(), Response::empty("Unauthorized"));
    responses.insert("403".to_string(), Response::empty("Forbidden"));
    if not_found {
        responses.insert("404".to_string(), Response::empty("Not found"));
    }
    responses
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::grouping::{Grouping, Selection};
    use crate::normalize::{NormalizeContext, normalize_schema};
    use crate::raw::RawSchema;

    fn normalized(value: serde_json::Value) -> NormalizedSchema {
        let raw = RawSchema::from_value(value).unwrap();
        let grouping = Grouping::default();
        let selection = Selection::All;
        let ctx = NormalizeContext {
            grouping: &grouping,
            selection: &selection,
            pascal_case_schemas: true,
        };
        let object_type = raw.type_name.clone().unwrap();
        normalize_schema(&raw, &object_type, &ctx).unwrap()
    }

    fn record_a() -> NormalizedSchema {
        normalized(json!({
            "type": "record:a",
            "fields": [
                {"name": "name", "type": ["string"], "supports": "rwus", "searchable_by": "=~:",
                 "doc": "Name for the A record."},
                {"name": "ipv4addr", "type": ["string"], "supports": "rw", "searchable_by": "="},
                {"name": "ttl", "type": ["uint"], "supports": "rw", "searchable_by": "<=>"},
                {"name": "remove_associated_ptr", "type": ["bool"], "supports": "d"},
            ],
        }))
    }

    fn names(parameters: &[ParameterOrRef]) -> Vec<String> {
        parameters
            .iter()
            .map(|p| match p {
                ParameterOrRef::Ref { ref_path } => ref_path.rsplit('/').next().unwrap().to_string(),
                ParameterOrRef::Parameter(p) => p.name.clone(),
            })
            .collect()
    }

    #[test]
    fn test_common_parameters() {
        let params = common_parameters();
        let keys: Vec<_> = params.keys().map(String::as_str).collect();
        assert_eq!(keys, LIST_PARAMETERS);

        let max = params["MaxResults"].as_parameter().unwrap();
        assert_eq!(max.name, "_max_results");
        assert_eq!(max.location, ParameterLocation::Query);
        assert!(!max.required);
        let schema = max.schema.as_ref().and_then(SchemaOrRef::as_schema).unwrap();
        assert_eq!(schema.format.as_deref(), Some("int32"));
        assert_eq!(schema.minimum, Some(1));

        let version = params["SchemaVersion"].as_parameter().unwrap();
        let schema = version.schema.as_ref().and_then(SchemaOrRef::as_schema).unwrap();
        assert_eq!(schema.enum_values, vec![json!(1), json!(2)]);
    }

    #[test]
    fn test_collection_path() {
        let paths = emit_paths(&[record_a()]);
        let collection = &paths["/record:a"];
        let list = collection.get.as_ref().unwrap();

        assert_eq!(list.operation_id.as_deref(), Some("RecordAList"));
        assert_eq!(list.tags, ["RecordA"]);
        let mut expected: Vec<String> = LIST_PARAMETERS.iter().map(|s| s.to_string()).collect();
        expected.extend(["name", "ipv4addr", "ttl"].map(String::from));
        assert_eq!(names(&list.parameters), expected);

        let name = list.parameters[12].as_parameter().unwrap();
        assert_eq!(name.description.as_deref(), Some("Name for the A record."));
        let ipv4addr = list.parameters[13].as_parameter().unwrap();
        assert_eq!(ipv4addr.description.as_deref(), Some("Filter by ipv4addr"));
        let ttl = list.parameters[14].as_parameter().unwrap();
        let schema = ttl.schema.as_ref().and_then(SchemaOrRef::as_schema).unwrap();
        assert_eq!(schema.schema_type, Some(SchemaType::Integer));

        assert_eq!(
            list.responses["200"].schema_ref(),
            Some("#/components/schemas/ListRecordAResponse")
        );
        let codes: Vec<_> = list.responses.keys().map(String::as_str).collect();
        assert_eq!(codes, ["200", "400", "401", "403", "404"]);
        assert_eq!(list.security.as_ref().unwrap()[0][BASIC_AUTH], Vec::<String>::new());

        let create = collection.post.as_ref().unwrap();
        assert_eq!(create.operation_id.as_deref(), Some("RecordACreate"));
        assert_eq!(names(&create.parameters), READ_PARAMETERS);
        let body = create.request_body.as_ref().unwrap();
        assert!(body.required);
        assert_eq!(
            body.content["application/json"].schema.as_ref().and_then(SchemaOrRef::ref_path),
            Some("#/components/schemas/RecordA")
        );
        let codes: Vec<_> = create.responses.keys().map(String::as_str).collect();
        assert_eq!(codes, ["201", "400", "401", "403"]);
    }

    #[test]
    fn test_item_path() {
        let paths = emit_paths(&[record_a()]);
        let item = &paths["/record:a/{reference}"];

        let read = item.get.as_ref().unwrap();
        assert_eq!(read.operation_id.as_deref(), Some("RecordARead"));
        let reference = read.parameters[0].as_parameter().unwrap();
        assert_eq!(reference.location, ParameterLocation::Path);
        assert!(reference.required);
        assert_eq!(
            read.responses["200"].schema_ref(),
            Some("#/components/schemas/GetRecordAResponse")
        );

        let update = item.put.as_ref().unwrap();
        assert_eq!(names(&update.parameters), ["reference", "ReturnFields", "ReturnFieldsPlus", "ReturnAsObject"]);
        assert_eq!(
            update.responses["200"].schema_ref(),
            Some("#/components/schemas/UpdateRecordAResponse")
        );

        let delete = item.delete.as_ref().unwrap();
        assert_eq!(names(&delete.parameters), ["reference", "remove_associated_ptr"]);
        let option = delete.parameters[1].as_parameter().unwrap();
        assert!(!option.required);
        assert_eq!(option.description.as_deref(), Some("Delete option: remove_associated_ptr"));
        assert!(delete.responses["200"].content.is_empty());
    }

    #[test]
    fn test_capabilities_gate_operations() {
        let schema = normalized(json!({
            "type": "capacityreport",
            "restrictions": ["create", "delete"],
            "fields": [{"name": "name", "type": ["string"], "supports": "rs"}],
        }));
        let paths = emit_paths(&[schema]);
        assert!(paths["/capacityreport"].post.is_none());
        let item = &paths["/capacityreport/{reference}"];
        assert!(item.get.is_some());
        assert!(item.put.is_none());
        assert!(item.delete.is_none());
    }

    #[test]
    fn test_tags_deduplicated() {
        let tags = emit_tags(&[record_a(), record_a()]);
        assert_eq!(tags.len(), 1);
        assert_eq!(tags[0].name, "RecordA");
        assert_eq!(tags[0].description.as_deref(), Some("Operations for record:a objects"));
    }
}
