//! Connection configuration

use std::path::Path;
use std::time::Duration;

use aria2_protocol::Endpoint;
use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};

/// Where the daemon lives and how to authenticate against it
///
/// Every field has a default, so a TOML file only needs the values that
/// differ:
///
/// ```toml
/// host = "seedbox.lan"
/// secret = "hunter2"
/// request_timeout_ms = 30000
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ClientConfig {
    /// Use `wss`/`https` instead of `ws`/`http`
    #[serde(default)]
    pub secure: bool,
    #[serde(default = "default_host")]
    pub host: String,
    #[serde(default = "default_port")]
    pub port: u16,
    #[serde(default = "default_path")]
    pub path: String,
    /// Shared secret (`--rpc-secret`). Empty disables the token parameter.
    #[serde(default)]
    pub secret: String,
    /// Fail calls that get no response in time. Unset means calls wait
    /// for their response indefinitely.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub request_timeout_ms: Option<u64>,
}

fn default_host() -> String {
    "localhost".to_string()
}
fn default_port() -> u16 {
    6800
}
fn default_path() -> String {
    "/jsonrpc".to_string()
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            secure: false,
            host: default_host(),
            port: default_port(),
            path: default_path(),
            secret: String::new(),
            request_timeout_ms: None,
        }
    }
}

impl ClientConfig {
    pub fn endpoint(&self) -> Endpoint {
        Endpoint::new(self.secure, self.host.clone(), self.port, self.path.clone())
    }

    pub fn request_timeout(&self) -> Option<Duration> {
        self.request_timeout_ms.map(Duration::from_millis)
    }

    #[must_use]
    pub fn with_secret(mut self, secret: impl Into<String>) -> Self {
        self.secret = secret.into();
        self
    }

    #[must_use]
    pub fn with_request_timeout(mut self, timeout: Duration) -> Self {
        self.request_timeout_ms = Some(u64::try_from(timeout.as_millis()).unwrap_or(u64::MAX));
        self
    }

    pub fn from_toml_str(contents: &str) -> Result<Self> {
        toml::from_str(contents).map_err(|e| Error::Config(e.to_string()))
    }

    /// Load a TOML configuration file.
    pub fn load(path: &Path) -> Result<Self> {
        let contents = std::fs::read_to_string(path)
            .map_err(|e| Error::Config(format!("Failed to read {}: {}", path.display(), e)))?;
        Self::from_toml_str(&contents)
    }
}
