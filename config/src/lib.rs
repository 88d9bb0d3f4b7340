//! Configuration loading for Handoff.
//!
//! ```toml
//! [audit]
//! runtime_checks = true
//!
//! [logging]
//! filter = "handoff_core=debug"
//! ```
//!
//! The file lives at `~/.handoff/config.toml`. `HANDOFF_RUNTIME_CHECKS`
//! overrides `audit.runtime_checks` at deployment time.

use std::path::{Path, PathBuf};
use std::{env, fs, io};

use serde::Deserialize;
use thiserror::Error;

use handoff_types::RuntimeChecks;

pub const RUNTIME_CHECKS_ENV: &str = "HANDOFF_RUNTIME_CHECKS";

// Default value function for serde (bool::default() is false, so only true needs a fn)
const fn default_true() -> bool {
    true
}

#[derive(Debug, Default, Deserialize)]
pub struct HandoffConfig {
    pub audit: Option<AuditConfig>,
    pub logging: Option<LoggingConfig>,
}

#[derive(Debug, Deserialize)]
pub struct AuditConfig {
    /// Audit transfers at runtime. Default: true.
    #[serde(default = "default_true")]
    pub runtime_checks: bool,
}

impl Default for AuditConfig {
    fn default() -> Self {
        Self {
            runtime_checks: true,
        }
    }
}

#[derive(Debug, Default, Deserialize)]
pub struct LoggingConfig {
    /// `tracing-subscriber` filter directive, used when `RUST_LOG` is unset.
    pub filter: Option<String>,
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config at {}: {source}", .path.display())]
    Read { path: PathBuf, source: io::Error },
    #[error("failed to parse config at {}: {source}", .path.display())]
    Parse {
        path: PathBuf,
        source: toml::de::Error,
    },
}

impl ConfigError {
    pub fn path(&self) -> &PathBuf {
        match self {
            ConfigError::Read { path, .. } | ConfigError::Parse { path, .. } => path,
        }
    }
}

impl HandoffConfig {
    pub fn load() -> Result<Option<Self>, ConfigError> {
        match config_path() {
            Some(path) => Self::load_from(&path),
            None => Ok(None),
        }
    }

    /// Load from an explicit path. A missing file is not an error.
    pub fn load_from(path: &Path) -> Result<Option<Self>, ConfigError> {
        if !path.exists() {
            return Ok(None);
        }

        // Loading runs before the subscriber exists, so failures are returned
        // rather than logged here.
        let content = fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        Self::parse(&content)
            .map(Some)
            .map_err(|source| ConfigError::Parse {
                path: path.to_path_buf(),
                source,
            })
    }

    pub fn parse(content: &str) -> Result<Self, toml::de::Error> {
        toml::from_str(content)
    }

    /// Runtime-check setting after applying `HANDOFF_RUNTIME_CHECKS`.
    #[must_use]
    pub fn runtime_checks(&self) -> RuntimeChecks {
        let raw = env::var(RUNTIME_CHECKS_ENV).ok();
        self.runtime_checks_with_override(raw.as_deref())
    }

    #[must_use]
    pub fn runtime_checks_with_override(&self, raw: Option<&str>) -> RuntimeChecks {
        let from_file = RuntimeChecks::from_bool(
            self.audit
                .as_ref()
                .is_none_or(|audit| audit.runtime_checks),
        );
        let Some(raw) = raw else {
            return from_file;
        };
        RuntimeChecks::parse(raw).unwrap_or_else(|| {
            tracing::warn!(
                value = raw,
                "Ignoring unrecognized {RUNTIME_CHECKS_ENV}; using {}",
                from_file.as_str()
            );
            from_file
        })
    }

    #[must_use]
    pub fn log_filter(&self) -> Option<&str> {
        self.logging.as_ref()?.filter.as_deref()
    }
}

pub fn config_path() -> Option<PathBuf> {
    dirs::home_dir().map(|home| home.join(".handoff").join("config.toml"))
}
