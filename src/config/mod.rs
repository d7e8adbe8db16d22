//! Application configuration loaded from YAML

use serde::{Deserialize, Serialize};
use std::path::Path;

use crate::core::error::{Error, Result};

fn default_host() -> String {
    "127.0.0.1".to_string()
}

fn default_port() -> u16 {
    3000
}

/// Server configuration with sensible local defaults
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AppConfig {
    #[serde(default = "default_host")]
    pub host: String,
    #[serde(default = "default_port")]
    pub port: u16,
    /// Secret handed to the credential plugin's `register`
    #[serde(default)]
    pub jwt_secret: Option<String>,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
            jwt_secret: None,
        }
    }
}

impl AppConfig {
    pub fn from_yaml(raw: &str) -> Result<Self> {
        serde_yaml::from_str(raw).map_err(|e| Error::BadRequest(format!("Invalid config: {e}")))
    }

    pub fn from_file(path: impl AsRef<Path>) -> Result<Self> {
        let raw = std::fs::read_to_string(&path).map_err(|e| {
            Error::BadRequest(format!(
                "Cannot read config file {}: {e}",
                path.as_ref().display()
            ))
        })?;
        Self::from_yaml(&raw)
    }

    /// The bind address for [`ServerBuilder::serve`](crate::server::ServerBuilder::serve)
    pub fn addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}
