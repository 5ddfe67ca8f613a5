use std::time::Duration;

use async_trait::async_trait;
use log::{debug, info};
use wapispec_core::config::ConnectionConfig;
use wapispec_core::raw::RawSchema;
use wapispec_core::{ConfigError, SchemaSource, SourceError};

/// Resolved connection settings for a Grid Master.
#[derive(Debug, Clone)]
pub struct WapiConnection {
    pub hostname: String,
    pub username: String,
    pub password: String,
    pub wapi_version: String,
    pub verify_ssl: bool,
    pub timeout: Duration,
}

impl WapiConnection {
    pub fn from_config(config: &ConnectionConfig) -> Result<Self, ConfigError> {
        let required = |value: &Option<String>, name: &'static str| {
            value
                .clone()
                .filter(|v| !v.is_empty())
                .ok_or(ConfigError::MissingConnection(name))
        };
        Ok(Self {
            hostname: required(&config.hostname, "hostname")?,
            username: required(&config.username, "username")?,
            password: required(&config.password, "password")?,
            wapi_version: required(&config.wapi_version, "wapi_version")?,
            verify_ssl: config.verify_ssl,
            timeout: Duration::from_secs(config.timeout_secs),
        })
    }

    /// Schema introspection URL of one object type.
    pub fn schema_url(&self, object_type: &str) -> String {
        format!(
            "https://{}/wapi/v{}/{object_type}?_schema_version=2&_schema&_get_doc=1",
            self.hostname, self.wapi_version
        )
    }
}

/// Fetches schemas from a live WAPI endpoint.
pub struct HttpSchemaSource {
    client: reqwest::Client,
    connection: WapiConnection,
}

impl HttpSchemaSource {
    pub fn new(connection: WapiConnection) -> Result<Self, SourceError> {
        let client = reqwest::Client::builder()
            .timeout(connection.timeout)
            .danger_accept_invalid_certs(!connection.verify_ssl)
            .user_agent(concat!("wapispec/", env!("CARGO_PKG_VERSION")))
            .build()
            .map_err(|e| SourceError::Network(e.to_string()))?;
        Ok(Self { client, connection })
    }
}

#[async_trait]
impl SchemaSource for HttpSchemaSource {
    fn describe(&self, object_type: &str) -> String {
        self.connection.schema_url(object_type)
    }

    async fn fetch(&self, object_type: &str) -> Result<RawSchema, SourceError> {
        let url = self.connection.schema_url(object_type);
        info!("Fetching schema for {object_type} from {url}");

        let response = self
            .client
            .get(&url)
            .basic_auth(&self.connection.username, Some(&self.connection.password))
            .send()
            .await
            .map_err(|e| SourceError::Network(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(SourceError::Status {
                code: status.as_u16(),
                body,
            });
        }

        let bytes = response
            .bytes()
            .await
            .map_err(|e| SourceError::Network(e.to_string()))?;
        debug!("{object_type}: {} bytes of schema", bytes.len());

        let value: serde_json::Value =
            serde_json::from_slice(&bytes).map_err(|e| SourceError::Decode(e.to_string()))?;
        RawSchema::from_value(value).map_err(|e| SourceError::Decode(e.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn config() -> ConnectionConfig {
        ConnectionConfig {
            hostname: Some("127.0.0.1:1".to_string()),
            username: Some("admin".to_string()),
            password: Some("infoblox".to_string()),
            wapi_version: Some("2.13.6".to_string()),
            verify_ssl: false,
            timeout_secs: 5,
        }
    }

    #[test]
    fn test_schema_url() {
        let connection = WapiConnection::from_config(&config()).unwrap();
        assert_eq!(
            connection.schema_url("record:a"),
            "https://127.0.0.1:1/wapi/v2.13.6/record:a?_schema_version=2&_schema&_get_doc=1"
        );
        assert_eq!(connection.timeout, Duration::from_secs(5));
    }

    #[test]
    fn test_describe_is_schema_url() {
        let connection = WapiConnection::from_config(&config()).unwrap();
        let url = connection.schema_url("network");
        let source = HttpSchemaSource::new(connection).unwrap();
        assert_eq!(source.describe("network"), url);
    }

    #[test]
    fn test_missing_credentials() {
        let mut config = config();
        config.password = Some(String::new());
        assert!(matches!(
            WapiConnection::from_config(&config),
            Err(ConfigError::MissingConnection("password"))
        ));
    }

    #[tokio::test]
    async fn test_unreachable_host_is_network_error() {
        let connection = WapiConnection::from_config(&config()).unwrap();
        let source = HttpSchemaSource::new(connection).unwrap();
        let err = source.fetch("record:a").await.unwrap_err();
        assert!(matches!(err, SourceError::Network(_)));
    }
}
