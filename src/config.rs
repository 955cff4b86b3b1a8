//! Startup configuration.
//!
//! The daemon reads a single YAML document with a `server` section:
//!
//! ```yaml
//! server:
//!   port: 8080
//!   doc_root: ~/www
//!   mime_types: ~/mime.types
//! ```
//!
//! Loading either produces an immutable [`Config`] or a [`ConfigError`]
//! describing what is wrong. Nothing here exits the process.

use serde::Deserialize;
use std::path::{Path, PathBuf};
use std::time::Duration;
use thiserror::Error;

/// Errors produced while loading or validating the configuration.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config file {path}: {source}")]
    Read {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("invalid config: {0}")]
    Syntax(#[from] serde_yaml::Error),

    #[error("port was not in the config file")]
    MissingPort,

    #[error("invalid port {0:?}")]
    InvalidPort(String),

    #[error("doc_root was not in the config file")]
    MissingDocRoot,

    #[error("{0} must be greater than zero")]
    ZeroLimit(&'static str),
}

#[derive(Debug, Clone)]
pub struct Config {
    pub server: ServerConfig,
}

/// The `server` section, after validation.
#[derive(Debug, Clone)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
    pub doc_root: PathBuf,
    pub mime_types: Option<PathBuf>,
    pub default_document: String,
    pub idle_timeout_secs: u64,
    pub write_timeout_secs: u64,
    pub max_connections: usize,
    pub max_request_bytes: usize,
}

/// Ports may be written either as a YAML number or a string.
#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum PortValue {
    Number(u64),
    Text(String),
}

#[derive(Debug, Deserialize)]
struct RawConfig {
    #[serde(default)]
    server: Option<RawServer>,
}

#[derive(Debug, Default, Deserialize)]
struct RawServer {
    #[serde(default = "default_host")]
    host: String,
    port: Option<PortValue>,
    doc_root: Option<String>,
    mime_types: Option<String>,
    #[serde(default = "default_document")]
    default_document: String,
    #[serde(default = "default_idle_timeout")]
    idle_timeout_secs: u64,
    #[serde(default = "default_write_timeout")]
    write_timeout_secs: u64,
    #[serde(default = "default_max_connections")]
    max_connections: usize,
    #[serde(default = "default_max_request_bytes")]
    max_request_bytes: usize,
}

fn default_host() -> String {
    "0.0.0.0".to_string()
}

fn default_document() -> String {
    "index.html".to_string()
}

fn default_idle_timeout() -> u64 {
    5
}

fn default_write_timeout() -> u64 {
    30
}

fn default_max_connections() -> usize {
    1024
}

fn default_max_request_bytes() -> usize {
    8192
}

impl Config {
    /// Reads and validates the YAML file at `path`.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let text = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.display().to_string(),
            source,
        })?;
        Self::from_yaml(&text)
    }

    /// Parses and validates a YAML document.
    pub fn from_yaml(text: &str) -> Result<Self, ConfigError> {
        let raw: RawConfig = serde_yaml::from_str(text)?;
        let raw = raw.server.unwrap_or_default();

        let port = match raw.port {
            None => return Err(ConfigError::MissingPort),
            Some(PortValue::Number(n)) => {
                u16::try_from(n).map_err(|_| ConfigError::InvalidPort(n.to_string()))?
            }
            Some(PortValue::Text(s)) => {
                let trimmed = s.trim();
                if trimmed.is_empty() {
                    return Err(ConfigError::MissingPort);
                }
                trimmed
                    .parse()
                    .map_err(|_| ConfigError::InvalidPort(s.clone()))?
            }
        };

        let doc_root = match raw.doc_root.as_deref().map(str::trim) {
            Some(dr) if !dr.is_empty() => expand_tilde(dr),
            _ => return Err(ConfigError::MissingDocRoot),
        };

        let mime_types = raw
            .mime_types
            .as_deref()
            .map(str::trim)
            .filter(|p| !p.is_empty())
            .map(expand_tilde);

        if raw.idle_timeout_secs == 0 {
            return Err(ConfigError::ZeroLimit("idle_timeout_secs"));
        }
        if raw.write_timeout_secs == 0 {
            return Err(ConfigError::ZeroLimit("write_timeout_secs"));
        }
        if raw.max_connections == 0 {
            return Err(ConfigError::ZeroLimit("max_connections"));
        }
        if raw.max_request_bytes == 0 {
            return Err(ConfigError::ZeroLimit("max_request_bytes"));
        }

        Ok(Self {
            server: ServerConfig {
                host: raw.host,
                port,
                doc_root,
                mime_types,
                default_document: raw.default_document,
                idle_timeout_secs: raw.idle_timeout_secs,
                write_timeout_secs: raw.write_timeout_secs,
                max_connections: raw.max_connections,
                max_request_bytes: raw.max_request_bytes,
            },
        })
    }

    pub fn listen_addr(&self) -> String {
        format!("{}:{}", self.server.host, self.server.port)
    }

    pub fn doc_root(&self) -> &Path {
        &self.server.doc_root
    }

    pub fn mime_types(&self) -> Option<&Path> {
        self.server.mime_types.as_deref()
    }

    pub fn idle_timeout(&self) -> Duration {
        Duration::from_secs(self.server.idle_timeout_secs)
    }

    pub fn write_timeout(&self) -> Duration {
        Duration::from_secs(self.server.write_timeout_secs)
    }
}

/// Expands a leading `~` to the invoking user's home directory.
///
/// Only `~` on its own or followed by `/` is expanded; `~user` forms and
/// paths without a tilde are returned unchanged, as is everything when
/// `HOME` is unset.
pub fn expand_tilde(path: &str) -> PathBuf {
    let home = match std::env::var_os("HOME") {
        Some(h) if !h.is_empty() => PathBuf::from(h),
        _ => return PathBuf::from(path),
    };

    if path == "~" {
        home
    } else if let Some(rest) = path.strip_prefix("~/") {
        home.join(rest)
    } else {
        PathBuf::from(path)
    }
}
