use std::fs;
use std::path::Path;

use serde::Deserialize;

use crate::error::ConfigError;
use crate::model::Mode;

/// Base URL of the public Swagger generator service.
pub const DEFAULT_BASE_URL: &str = "https://generator.swagger.io/api";

/// Address `oagp serve` listens on unless configured otherwise.
pub const DEFAULT_BIND: &str = "127.0.0.1:8080";

/// Top-level project configuration loaded from `.oagp.yaml`.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct OagpConfig {
    pub service: ServiceConfig,
    pub server: ServerConfig,
    pub default_mode: Mode,
}

/// Remote generation service settings.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ServiceConfig {
    pub base_url: String,
    /// Request timeout; transport defaults apply when unset.
    pub timeout_secs: Option<u64>,
}

impl Default for ServiceConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_string(),
            timeout_secs: None,
        }
    }
}

/// Settings for the local web form.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    pub bind: String,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            bind: DEFAULT_BIND.to_string(),
        }
    }
}

/// Default config file name.
pub const CONFIG_FILE_NAME: &str = ".oagp.yaml";

/// Load config from a YAML file. Returns `None` if the file doesn't exist.
pub fn load_config(path: &Path) -> Result<Option<OagpConfig>, ConfigError> {
    if !path.exists() {
        return Ok(None);
    }
    let content = fs::read_to_string(path).map_err(|error| ConfigError::Read {
        path: path.display().to_string(),
        error,
    })?;
    let config: OagpConfig =
        serde_yaml_ng::from_str(&content).map_err(|error| ConfigError::Parse {
            path: path.display().to_string(),
            error,
        })?;
    Ok(Some(config))
}

/// Generate the default config file content.
pub fn default_config_content() -> &'static str {
    r#"# oagp configuration
service:
  base_url: https://generator.swagger.io/api
  # timeout_secs: 30

server:
  bind: 127.0.0.1:8080

default_mode: client    # client | server
"#
}
