//! `load_config` module: loads a static YAML config file, including
//! environment secret injection, into the typed settings of the core crate.
//!
//! This is the only place where untrusted YAML is parsed and mapped to rich,
//! strongly-typed internal structs. The auth token never lives in the config
//! file; it is injected from the environment here.

use anyhow::Result;
use canvas_sync_core::api::ApiConfig;
use canvas_sync_core::config::SyncSettings;
use serde::Deserialize;
use std::fs;
use std::path::Path;
use tracing::{error, info};

/// Environment variable holding the Canvas bearer token.
pub const TOKEN_ENV_VAR: &str = "CANVAS_API_TOKEN";

/// Fully resolved configuration: sync settings plus API connection.
#[derive(Debug)]
pub struct LoadedConfig {
    pub settings: SyncSettings,
    pub api: ApiConfig,
}

#[derive(Debug, Deserialize)]
struct RawConfig {
    sync: SyncSettings,
    api: ApiSection,
}

#[derive(Debug, Deserialize)]
struct ApiSection {
    domain: String,
    /// Optional in the file; normally supplied through the environment.
    #[serde(default)]
    token: Option<String>,
}

/// Loads a static YAML config file (no secrets) and injects required env
/// vars for secrets.
pub fn load_config<P: AsRef<Path>>(path: P) -> Result<LoadedConfig> {
    let path_ref = path.as_ref();
    info!(config_path = ?path_ref, "Loading configuration from file");

    let config_content = match fs::read_to_string(path_ref) {
        Ok(content) => {
            info!(config_path = ?path_ref, "Config file read successfully");
            content
        }
        Err(e) => {
            error!(error = ?e, config_path = ?path_ref, "Failed to read config file");
            return Err(anyhow::anyhow!(
                "Failed to read config file {:?}: {}",
                path_ref,
                e
            ));
        }
    };

    let raw: RawConfig = match serde_yaml::from_str(&config_content) {
        Ok(conf) => {
            info!(config_path = ?path_ref, "Parsed config YAML successfully");
            conf
        }
        Err(e) => {
            error!(error = ?e, config_path = ?path_ref, "Failed to parse config YAML");
            return Err(anyhow::anyhow!("Failed to parse config YAML: {e}"));
        }
    };

    let token = match raw.api.token {
        Some(token) => token,
        None => std::env::var(TOKEN_ENV_VAR).map_err(|_| {
            error!(var = TOKEN_ENV_VAR, "Auth token missing from config and environment");
            anyhow::anyhow!(
                "No auth token: set `api.token` in the config file or the {TOKEN_ENV_VAR} environment variable"
            )
        })?,
    };

    Ok(LoadedConfig {
        settings: raw.sync,
        api: ApiConfig {
            domain: raw.api.domain,
            token,
        },
    })
}
