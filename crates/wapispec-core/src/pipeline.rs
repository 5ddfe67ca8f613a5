//! Fetch → normalize → emit, one document per group.

use log::{error, info, warn};

use crate::config::WapiConfig;
use crate::emit::document::{DocumentOptions, build_document};
use crate::failure::FailureRecord;
use crate::grouping::{Grouping, Selection};
use crate::normalize::{NormalizeContext, NormalizedSchema, normalize_schema};
use crate::openapi::OpenApiDocument;
use crate::source::{SchemaSource, fetch_ordered};

/// Settings for one generation run.
#[derive(Debug, Clone)]
pub struct GenerationOptions {
    pub document: DocumentOptions,
    pub pascal_case_schemas: bool,
    pub max_workers: usize,
}

impl Default for GenerationOptions {
    fn default() -> Self {
        Self {
            document: DocumentOptions::default(),
            pascal_case_schemas: true,
            max_workers: 10,
        }
    }
}

impl From<&WapiConfig> for GenerationOptions {
    fn from(config: &WapiConfig) -> Self {
        Self {
            document: config.document_options(),
            pascal_case_schemas: config.schema_options.pascal_case_schemas,
            max_workers: config.max_workers(),
        }
    }
}

/// A finished document and the object types it covers.
#[derive(Debug, Clone)]
pub struct GroupDocument {
    pub group: String,
    pub object_types: Vec<String>,
    pub document: OpenApiDocument,
}

#[derive(Debug, Default)]
pub struct GenerationOutcome {
    /// Documents in group order; groups without a usable schema are absent.
    pub documents: Vec<GroupDocument>,
    pub failures: Vec<FailureRecord>,
    /// Schemas that made it into a document.
    pub processed: usize,
}

impl GenerationOutcome {
    pub fn is_empty(&self) -> bool {
        self.documents.is_empty()
    }
}

/// Generate one document per planned group.
///
/// Per-object failures are recorded and skipped.
pub async fn generate<S>(
    source: &S,
    grouping: &Grouping,
    selection: &Selection,
    options: &GenerationOptions,
) -> GenerationOutcome
where
    S: SchemaSource + ?Sized,
{
    let plans = grouping.plan(selection);
    let ctx = NormalizeContext {
        grouping,
        selection,
        pascal_case_schemas: options.pascal_case_schemas,
    };

    let mut outcome = GenerationOutcome::default();
    for plan in plans {
        info!(
            "Processing group '{}' with {} objects using up to {} workers",
            plan.group,
            plan.objects.len(),
            options.max_workers
        );

        let fetched = fetch_ordered(source, &plan.objects, options.max_workers).await;
        let total = fetched.len();

        let mut schemas: Vec<NormalizedSchema> = Vec::new();
        for (index, item) in fetched.into_iter().enumerate() {
            let raw = match item.result {
                Ok(raw) => raw,
                Err(err) => {
                    error!("Failed to fetch schema for {} ({}): {err}", item.object_type, item.url);
                    outcome.failures.push(FailureRecord::from_source_error(
                        &item.object_type,
                        &plan.group,
                        item.url,
                        &err,
                    ));
                    continue;
                }
            };

            match normalize_schema(&raw, &item.object_type, &ctx) {
                Some(schema) => {
                    info!("Completed {} [{}/{total}]", item.object_type, index + 1);
                    schemas.push(schema);
                }
                None => {
                    warn!("Skipping {} due to schema processing error", item.object_type);
                    outcome.failures.push(FailureRecord::unprocessable(
                        &item.object_type,
                        &plan.group,
                        item.url,
                    ));
                }
            }
        }

        if schemas.is_empty() {
            warn!("No schemas available for group '{}'", plan.group);
            continue;
        }

        outcome.processed += schemas.len();
        let document = build_document(&plan.group, &schemas, &options.document);
        outcome.documents.push(GroupDocument {
            group: plan.group,
            object_types: schemas.into_iter().map(|s| s.object_type).collect(),
            document,
        });
    }

    outcome
}
