pub mod config;
pub mod emit;
pub mod error;
pub mod failure;
pub mod grouping;
pub mod naming;
pub mod normalize;
pub mod openapi;
pub mod pipeline;
pub mod raw;
pub mod source;

pub use config::{WapiConfig, load_config};
pub use emit::document::{DocumentOptions, build_document};
pub use error::{ConfigError, SourceError};
pub use failure::{FailureRecord, FailureReport, FailureStatus};
pub use grouping::{Grouping, Selection};
pub use normalize::{NormalizedField, NormalizedSchema, normalize_field, normalize_schema};
pub use pipeline::{GenerationOptions, GenerationOutcome, GroupDocument, generate};
pub use source::{SchemaSource, fetch_ordered};
