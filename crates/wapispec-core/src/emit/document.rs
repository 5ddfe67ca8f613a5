use indexmap::IndexMap;

use crate::normalize::NormalizedSchema;
use crate::openapi::{Components, Contact, Info, OpenApiDocument, SecurityScheme};

use super::paths::{BASIC_AUTH, common_parameters, emit_paths, emit_tags};
use super::schemas::{EmitOptions, emit_schemas};

pub const OPENAPI_VERSION: &str = "3.0.0";

/// Document-level settings shared by every group of one run.
#[derive(Debug, Clone)]
pub struct DocumentOptions {
    pub wapi_version: String,
    pub contact: Contact,
    pub emit: EmitOptions,
}

impl Default for DocumentOptions {
    fn default() -> Self {
        Self {
            wapi_version: String::new(),
            contact: default_contact(),
            emit: EmitOptions::default(),
        }
    }
}

pub fn default_contact() -> Contact {
    Contact {
        name: Some("Infoblox".to_string()),
        url: Some("https://www.infoblox.com".to_string()),
        email: None,
    }
}

/// Assemble the OpenAPI document of one group.
pub fn build_document(
    group: &str,
    schemas: &[NormalizedSchema],
    options: &DocumentOptions,
) -> OpenApiDocument {
    let upper = group.to_uppercase();

    let mut security_schemes = IndexMap::new();
    security_schemes.insert(BASIC_AUTH.to_string(), SecurityScheme::basic());

    OpenApiDocument {
        openapi: OPENAPI_VERSION.to_string(),
        info: Info {
            title: format!("Infoblox {upper} API"),
            description: Some(format!(
                "OpenAPI specification for Infoblox NIOS WAPI {upper} objects"
            )),
            version: options.wapi_version.clone(),
            contact: Some(options.contact.clone()),
        },
        tags: emit_tags(schemas),
        paths: emit_paths(schemas),
        components: Components {
            parameters: common_parameters(),
            schemas: emit_schemas(schemas, &options.emit),
            security_schemes,
        },
    }
}
