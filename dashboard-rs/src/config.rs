/**
 * config.rs
 * Dashboard configuration (YAML) and credential resolution.
 *
 * Format:
 * ```yaml
 * api:
 *   base_url: https://resource.metadatacenter.org
 *   folder_id: https://repo.metadatacenter.org/folders/b451e291-0a49-4d5c-a626-933043006eae
 * auth:
 *   credential_env: PGHD_API_KEY
 *   credential_file: ~/.config/pghd/apikey   # optional fallback
 * ```
 *
 * The credential value itself never appears in the config file, in logs,
 * or in error messages.
 */

use std::env;
use std::fs;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::errors::{DashboardError, Result};

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Default)]
pub struct DashboardConfig {
    #[serde(default)]
    pub api: ApiConfig,
    #[serde(default)]
    pub auth: AuthConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ApiConfig {
    pub base_url: String,
    pub folder_id: String,
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            base_url: "https://resource.metadatacenter.org".to_string(),
            folder_id:
                "https://repo.metadatacenter.org/folders/b451e291-0a49-4d5c-a626-933043006eae"
                    .to_string(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct AuthConfig {
    /// Environment variable checked first.
    pub credential_env: String,
    /// Optional secrets file checked second (whole file, trimmed).
    #[serde(skip_serializing_if = "Option::is_none")]
    pub credential_file: Option<PathBuf>,
}

impl Default for AuthConfig {
    fn default() -> Self {
        Self {
            credential_env: "PGHD_API_KEY".to_string(),
            credential_file: None,
        }
    }
}

impl DashboardConfig {
    /// Load from a YAML file; a missing file falls back to defaults.
    pub fn load(path: &Path) -> Result<Self> {
        if !path.exists() {
            debug!(path = %path.display(), "no config file, using defaults");
            return Ok(Self::default());
        }
        let content = fs::read_to_string(path)?;
        let config = serde_yaml::from_str(&content)?;
        debug!(path = %path.display(), "loaded dashboard config");
        Ok(config)
    }

    /// Resolve the API credential: env var first, secrets file second.
    pub fn resolve_credential(&self) -> Result<String> {
        if let Ok(value) = env::var(&self.auth.credential_env) {
            if !value.trim().is_empty() {
                return Ok(value.trim().to_string());
            }
        }

        if let Some(file) = &self.auth.credential_file {
            let value = fs::read_to_string(file).map_err(|_| {
                DashboardError::Config(format!(
                    "credential file not readable: {}",
                    file.display()
                ))
            })?;
            let value = value.trim();
            if !value.is_empty() {
                return Ok(value.to_string());
            }
        }

        Err(DashboardError::Config(format!(
            "no credential: set {} or configure auth.credential_file",
            self.auth.credential_env
        )))
    }
}
