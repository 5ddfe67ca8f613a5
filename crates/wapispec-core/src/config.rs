use std::fmt;
use std::fs;
use std::path::Path;

use indexmap::IndexMap;
use log::warn;
use serde::Deserialize;

use crate::emit::document::{DocumentOptions, default_contact};
use crate::emit::schemas::EmitOptions;
use crate::error::ConfigError;
use crate::grouping::Grouping;
use crate::openapi::Contact;

/// Top-level configuration loaded from `wapispec.yaml` (or a JSON file).
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct WapiConfig {
    pub connection: ConnectionConfig,
    pub output: OutputConfig,
    /// Group name → object types, in output order.
    pub object_groups: IndexMap<String, Vec<String>>,
    /// Object type → fields that accept a function-call descriptor.
    pub func_callbacks: IndexMap<String, Vec<String>>,
    pub performance: PerformanceConfig,
    pub schema_options: SchemaOptions,
    pub api_info: ApiInfo,
}

/// Where and how to reach the Grid Master.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ConnectionConfig {
    pub hostname: Option<String>,
    pub username: Option<String>,
    pub password: Option<String>,
    pub wapi_version: Option<String>,
    pub verify_ssl: bool,
    /// Per-request timeout in seconds.
    pub timeout_secs: u64,
}

impl Default for ConnectionConfig {
    fn default() -> Self {
        Self {
            hostname: None,
            username: None,
            password: None,
            wapi_version: None,
            verify_ssl: false,
            timeout_secs: 30,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct OutputConfig {
    /// `json` or `yaml`; anything else falls back to JSON.
    pub format: String,
    pub directory: String,
    /// Indent JSON output; compact when false.
    pub format_json: bool,
    /// Where failure reports are written.
    pub logs_directory: String,
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            format: "json".to_string(),
            directory: "output".to_string(),
            format_json: true,
            logs_directory: "logs".to_string(),
        }
    }
}

impl OutputConfig {
    /// The configured format, falling back to JSON with a warning.
    pub fn resolved_format(&self) -> OutputFormat {
        match self.format.to_lowercase().as_str() {
            "json" => OutputFormat::Json,
            "yaml" | "yml" => OutputFormat::Yaml,
            other => {
                warn!("Invalid output format '{other}' specified, defaulting to 'json'");
                OutputFormat::Json
            }
        }
    }
}

/// Serialization of generated documents.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputFormat {
    Json,
    Yaml,
}

impl OutputFormat {
    pub fn extension(self) -> &'static str {
        match self {
            OutputFormat::Json => "json",
            OutputFormat::Yaml => "yaml",
        }
    }
}

impl fmt::Display for OutputFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.extension())
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct PerformanceConfig {
    /// Concurrent schema fetches.
    pub max_workers: usize,
}

impl Default for PerformanceConfig {
    fn default() -> Self {
        Self { max_workers: 10 }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct SchemaOptions {
    pub pascal_case_schemas: bool,
    pub include_examples: bool,
}

impl Default for SchemaOptions {
    fn default() -> Self {
        Self {
            pascal_case_schemas: true,
            include_examples: true,
        }
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct ApiInfo {
    pub contact: Option<Contact>,
}

/// Command-line values that take precedence over the file.
#[derive(Debug, Clone, Default)]
pub struct Overrides {
    pub hostname: Option<String>,
    pub username: Option<String>,
    pub password: Option<String>,
    pub wapi_version: Option<String>,
    pub output_dir: Option<String>,
    pub output_format: Option<String>,
}

impl WapiConfig {
    pub fn apply_overrides(&mut self, overrides: Overrides) {
        let conn = &mut self.connection;
        conn.hostname = overrides.hostname.or(conn.hostname.take());
        conn.username = overrides.username.or(conn.username.take());
        conn.password = overrides.password.or(conn.password.take());
        conn.wapi_version = overrides.wapi_version.or(conn.wapi_version.take());
        if let Some(dir) = overrides.output_dir {
            self.output.directory = dir;
        }
        if let Some(format) = overrides.output_format {
            self.output.format = format;
        }
    }

    /// Check that everything a run needs is present.
    ///
    /// Credentials are only needed when schemas are fetched over HTTP.
    pub fn validate(&self, needs_credentials: bool) -> Result<(), ConfigError> {
        let conn = &self.connection;
        let present = |value: &Option<String>| value.as_deref().is_some_and(|v| !v.is_empty());

        if needs_credentials {
            if !present(&conn.hostname) {
                return Err(ConfigError::MissingConnection("hostname"));
            }
            if !present(&conn.username) {
                return Err(ConfigError::MissingConnection("username"));
            }
            if !present(&conn.password) {
                return Err(ConfigError::MissingConnection("password"));
            }
        }
        if !present(&conn.wapi_version) {
            return Err(ConfigError::MissingConnection("wapi_version"));
        }
        if self.output.directory.trim().is_empty() {
            return Err(ConfigError::MissingOutputDirectory);
        }
        Ok(())
    }

    pub fn wapi_version(&self) -> &str {
        self.connection.wapi_version.as_deref().unwrap_or_default()
    }

    pub fn max_workers(&self) -> usize {
        self.performance.max_workers.max(1)
    }

    pub fn grouping(&self) -> Grouping {
        Grouping::new(self.object_groups.clone())
    }

    pub fn document_options(&self) -> DocumentOptions {
        DocumentOptions {
            wapi_version: self.wapi_version().to_string(),
            contact: self.api_info.contact.clone().unwrap_or_else(default_contact),
            emit: EmitOptions {
                include_examples: self.schema_options.include_examples,
                callbacks: self.func_callbacks.clone(),
            },
        }
    }
}

/// Default config file name.
pub const CONFIG_FILE_NAME: &str = "wapispec.yaml";

/// Load config from a YAML or JSON file, chosen by extension.
pub fn load_config(path: &Path) -> Result<WapiConfig, ConfigError> {
    let display = path.display().to_string();
    let content = fs::read_to_string(path).map_err(|source| ConfigError::Read {
        path: display.clone(),
        source,
    })?;

    let is_json = path
        .extension()
        .and_then(|e| e.to_str())
        .is_some_and(|e| e.eq_ignore_ascii_case("json"));
    if is_json {
        serde_json::from_str(&content).map_err(|source| ConfigError::Json {
            path: display,
            source,
        })
    } else {
        serde_yaml_ng::from_str(&content).map_err(|source| ConfigError::Yaml {
            path: display,
            source,
        })
    }
}

/// Generate the default config file content.
pub fn default_config_content() -> &'static str {
    r#"# wapispec configuration
connection:
  hostname: grid-master.example.com
  username: admin
  # password: infoblox        # or pass --password
  wapi_version: "2.13.6"
  verify_ssl: false
  timeout_secs: 30

output:
  format: json              # json | yaml
  directory: output
  format_json: true         # indent JSON output
  logs_directory: logs      # failure reports

performance:
  max_workers: 10

schema_options:
  pascal_case_schemas: true
  include_examples: true

# api_info:
#   contact:
#     name: Infoblox
#     url: https://www.infoblox.com

object_groups:
  dns:
    - record:a
    - record:aaaa
    - record:cname
    - record:host
    - zone_auth
  dhcp:
    - range
    - fixedaddress
  ipam:
    - network
    - networkcontainer

# Fields that accept a function call instead of a plain value
func_callbacks:
  record:a:
    - ipv4addr
  fixedaddress:
    - ipv4addr
  network:
    - network
"#
}
