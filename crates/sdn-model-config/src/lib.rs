//! Driver configuration for the sdn-model core.
//!
//! TOML driver definitions layered with environment overrides, and
//! translation into a [`DriverRegistry`] that can be installed into a
//! [`DriverService`](sdn_model_core::DriverService). Behaviour
//! implementations are compiled into the hosting process and looked up
//! by name through a [`BehaviourCatalog`].

use std::path::{Path, PathBuf};

use directories::ProjectDirs;
use figment::{
    Figment,
    providers::{Env, Format, Serialized, Toml},
};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::{debug, info};

use sdn_model_core::{BehaviourCatalog, DriverDefinition, DriverRegistry, ModelError};

/// Environment variable prefix for overrides (`SDN_MODEL_DEFAULT_DRIVER`).
pub const ENV_PREFIX: &str = "SDN_MODEL_";

// ── Error ───────────────────────────────────────────────────────────

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("invalid {field}: {reason}")]
    Validation { field: String, reason: String },

    #[error("failed to serialize config: {0}")]
    Serialization(#[from] toml::ser::Error),

    #[error("config loading failed: {0}")]
    Figment(Box<figment::Error>),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error(transparent)]
    Model(#[from] ModelError),
}

impl From<figment::Error> for ConfigError {
    fn from(err: figment::Error) -> Self {
        Self::Figment(Box::new(err))
    }
}

// ── TOML config structs ─────────────────────────────────────────────

/// Top-level configuration: the driver catalogue and its fallback.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize, Serialize)]
pub struct ModelConfig {
    /// Driver bound when no manufacturer pattern matches.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub default_driver: Option<String>,

    /// Declarative driver definitions (`[[drivers]]` tables).
    #[serde(default)]
    pub drivers: Vec<DriverDefinition>,
}

impl ModelConfig {
    /// Definition named `name`, if present.
    pub fn driver(&self, name: &str) -> Option<&DriverDefinition> {
        self.drivers.iter().find(|d| d.name == name)
    }

    /// Structural checks that do not need a behaviour catalog.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if let Some(index) = self.drivers.iter().position(|d| d.name.trim().is_empty()) {
            return Err(validation("drivers", format!("entry {index} has no name")));
        }
        if let Some(default) = &self.default_driver {
            if self.driver(default).is_none() {
                return Err(validation(
                    "default_driver",
                    format!("'{default}' is not a defined driver"),
                ));
            }
        }
        Ok(())
    }
}

fn validation(field: &str, reason: impl Into<String>) -> ConfigError {
    ConfigError::Validation {
        field: field.to_owned(),
        reason: reason.into(),
    }
}

// ── Config file path ────────────────────────────────────────────────

/// Resolve the config file path via XDG / platform conventions.
pub fn config_path() -> PathBuf {
    ProjectDirs::from("org", "sdn-model", "sdn-model").map_or_else(
        || {
            let mut p = dirs_fallback();
            p.push("drivers.toml");
            p
        },
        |dirs| dirs.config_dir().join("drivers.toml"),
    )
}

fn dirs_fallback() -> PathBuf {
    let mut p = PathBuf::from(std::env::var("HOME").unwrap_or_else(|_| ".".into()));
    p.push(".config");
    p.push("sdn-model");
    p
}

// ── Config loading ──────────────────────────────────────────────────

/// Provider stack for `path`: defaults, then the file, then environment.
pub fn figment(path: &Path) -> Figment {
    Figment::new()
        .merge(Serialized::defaults(ModelConfig::default()))
        .merge(Toml::file(path))
        .merge(Env::prefixed(ENV_PREFIX).split("__"))
}

/// Load the config from the canonical path plus environment.
pub fn load_config() -> Result<ModelConfig, ConfigError> {
    load_config_from(&config_path())
}

/// Load the config from an explicit file plus environment. A missing
/// file yields the defaults.
pub fn load_config_from(path: &Path) -> Result<ModelConfig, ConfigError> {
    let config: ModelConfig = figment(path).extract()?;
    config.validate()?;
    debug!(
        path = %path.display(),
        drivers = config.drivers.len(),
        "driver config loaded"
    );
    Ok(config)
}

/// Load config, returning a default if loading fails.
pub fn load_config_or_default() -> ModelConfig {
    load_config().unwrap_or_default()
}

// ── Config saving ───────────────────────────────────────────────────

/// Serialize config to TOML and write to the canonical config path.
pub fn save_config(cfg: &ModelConfig) -> Result<(), ConfigError> {
    save_config_to(cfg, &config_path())
}

/// Serialize config to TOML and write it to `path`, creating parents.
pub fn save_config_to(cfg: &ModelConfig, path: &Path) -> Result<(), ConfigError> {
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)?;
    }
    let toml_str = toml::to_string_pretty(cfg)?;
    std::fs::write(path, toml_str)?;
    Ok(())
}

// ── Registry construction ───────────────────────────────────────────

/// Build a driver registry from `config`, binding behaviour
/// implementation names through `catalog`.
///
/// Definition problems (unknown parents, `extends` cycles, unknown
/// implementations, duplicate names) surface as `Validation` errors on
/// the `drivers` field.
pub fn build_registry(
    config: &ModelConfig,
    catalog: &BehaviourCatalog,
) -> Result<DriverRegistry, ConfigError> {
    config.validate()?;
    let registry =
        DriverRegistry::from_definitions(&config.drivers, catalog, config.default_driver.as_deref())
            .map_err(|err| match err {
                ModelError::InvalidArgument { message } => validation("drivers", message),
                other => ConfigError::Model(other),
            })?;
    info!(
        drivers = registry.len(),
        default = registry.default_driver().unwrap_or("-"),
        "driver registry ready"
    );
    Ok(registry)
}
