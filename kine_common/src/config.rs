//! Session configuration plumbing.
//!
//! Every kine session file is TOML with a `[shared]` table common to all
//! components. Component crates define their own tables next to it and get
//! file loading for free through [`ConfigLoader`].
//!
//! ```rust,no_run
//! use kine_common::config::{ConfigError, ConfigLoader, SharedConfig};
//! use serde::Deserialize;
//! use std::path::Path;
//!
//! #[derive(Deserialize)]
//! struct Session {
//!     #[serde(default)]
//!     shared: SharedConfig,
//!     sample_period: f64,
//! }
//!
//! let session = Session::load(Path::new("leg-01.toml"))?;
//! session.shared.validate()?;
//! # Ok::<(), ConfigError>(())
//! ```

use std::io::ErrorKind;
use std::path::Path;

use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Error)]
pub enum ConfigError {
    #[error("session file does not exist")]
    FileNotFound,

    /// Unreadable file or malformed TOML.
    #[error("cannot parse session file: {0}")]
    ParseError(String),

    /// Well-formed TOML with out-of-range values.
    #[error("invalid session configuration: {0}")]
    ValidationError(String),
}

/// Verbosity the host should install its `tracing` subscriber at.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LogLevel {
    /// Per-cycle observer and controller steps.
    Trace,
    /// Construction and gain changes.
    Debug,
    #[default]
    Info,
    /// Ill-conditioned maps and singular inertia.
    Warn,
    Error,
}

impl From<LogLevel> for tracing::Level {
    fn from(level: LogLevel) -> Self {
        match level {
            LogLevel::Trace => Self::TRACE,
            LogLevel::Debug => Self::DEBUG,
            LogLevel::Info => Self::INFO,
            LogLevel::Warn => Self::WARN,
            LogLevel::Error => Self::ERROR,
        }
    }
}

fn default_session_name() -> String {
    "kine".to_string()
}

/// The `[shared]` table.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct SharedConfig {
    #[serde(default)]
    pub log_level: LogLevel,

    /// Name tagged onto log output.
    #[serde(default = "default_session_name")]
    pub session_name: String,
}

impl Default for SharedConfig {
    fn default() -> Self {
        Self {
            log_level: LogLevel::default(),
            session_name: default_session_name(),
        }
    }
}

impl SharedConfig {
    /// Rejects an empty or whitespace-only session name.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.session_name.trim().is_empty() {
            return Err(ConfigError::ValidationError(
                "shared.session_name is empty".to_string(),
            ));
        }
        Ok(())
    }
}

/// TOML loading for any deserializable configuration type.
///
/// A missing file maps to `FileNotFound`. Any other I/O failure and any
/// syntax or type error maps to `ParseError`. Semantic checks are left to
/// the caller.
pub trait ConfigLoader: Sized + DeserializeOwned {
    fn load(path: &Path) -> Result<Self, ConfigError> {
        match std::fs::read_to_string(path) {
            Ok(content) => Self::from_toml_str(&content),
            Err(e) if e.kind() == ErrorKind::NotFound => Err(ConfigError::FileNotFound),
            Err(e) => Err(ConfigError::ParseError(format!("{}: {e}", path.display()))),
        }
    }

    fn from_toml_str(content: &str) -> Result<Self, ConfigError> {
        toml::from_str(content).map_err(|e| ConfigError::ParseError(e.message().to_string()))
    }
}

impl<T: DeserializeOwned> ConfigLoader for T {}

// ─── Tests ──────────────────────────────────────────────────────────
