use std::io::ErrorKind;
use std::path::PathBuf;

use async_trait::async_trait;
use log::debug;
use wapispec_core::naming::snake_name;
use wapispec_core::raw::RawSchema;
use wapispec_core::{SchemaSource, SourceError};

/// Reads previously saved schema payloads from `{dir}/{object_type}.json`,
/// with `:` in the object type replaced by `_`.
#[derive(Debug, Clone)]
pub struct DirSchemaSource {
    root: PathBuf,
}

impl DirSchemaSource {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn path_for(&self, object_type: &str) -> PathBuf {
        self.root.join(format!("{}.json", snake_name(object_type)))
    }
}

#[async_trait]
impl SchemaSource for DirSchemaSource {
    fn describe(&self, object_type: &str) -> String {
        self.path_for(object_type).display().to_string()
    }

    async fn fetch(&self, object_type: &str) -> Result<RawSchema, SourceError> {
        let path = self.path_for(object_type);
        debug!("Reading schema for {object_type} from {}", path.display());

        let bytes = match tokio::fs::read(&path).await {
            Ok(bytes) => bytes,
            Err(e) if e.kind() == ErrorKind::NotFound => {
                return Err(SourceError::Status {
                    code: 404,
                    body: format!("no saved schema at {}", path.display()),
                });
            }
            Err(e) => return Err(SourceError::Network(e.to_string())),
        };

        let value: serde_json::Value =
            serde_json::from_slice(&bytes).map_err(|e| SourceError::Decode(e.to_string()))?;
        RawSchema::from_value(value).map_err(|e| SourceError::Decode(e.to_string()))
    }
}
