//! # PMODvb Configuration Module
//!
//! This module provides configuration management for PMODvb, including:
//! - Loading configuration from YAML files
//! - Merging with embedded default configuration
//! - Environment variable overrides
//! - Type-safe getters and setters for configuration values
//! - Thread-safe singleton access pattern
//!
//! ## Usage
//!
//! ```no_run
//! use pmoconfig::get_config;
//!
//! // Get the global configuration
//! let config = get_config();
//!
//! // Access configuration values
//! let level = config.get_log_min_level()?;
//!
//! // Update configuration values
//! config.set_log_min_level("DEBUG".to_string())?;
//! # Ok::<(), anyhow::Error>(())
//! ```
//!
//! Source crates add their own typed accessors through extension traits
//! (see `pmodvb::DvbConfigExt`).

use anyhow::{anyhow, Result};
use dirs::home_dir;
use lazy_static::lazy_static;
use serde_yaml::{Mapping, Value};
use std::{
    env, fs,
    path::{Path, PathBuf},
    sync::{Arc, Mutex, MutexGuard},
};
use tracing::{info, warn};

// Configuration par défaut intégrée
const DEFAULT_CONFIG: &str = include_str!("pmodvb.yaml");

lazy_static! {
    static ref CONFIG: Arc<Config> =
        Arc::new(Config::load_config("").expect("Failed to load PMODvb configuration"));
}

const ENV_CONFIG_DIR: &str = "PMODVB_CONFIG";
const ENV_PREFIX: &str = "PMODVB_CONFIG__";
const CONFIG_DIR_NAME: &str = ".pmodvb";

// Default values for configuration
const DEFAULT_LOG_MIN_LEVEL: &str = "INFO";
const DEFAULT_LOG_ENABLE_CONSOLE: bool = true;

/// Macro to generate getter/setter for bool values with default
macro_rules! impl_bool_config {
    ($getter:ident, $setter:ident, $path:expr, $default:expr) => {
        pub fn $getter(&self) -> Result<bool> {
            match self.get_value($path)? {
                Value::Bool(b) => Ok(b),
                _ => Ok($default),
            }
        }

        pub fn $setter(&self, value: bool) -> Result<()> {
            self.set_value($path, Value::Bool(value))
        }
    };
}

/// Configuration manager for PMODvb
///
/// This structure manages the application configuration, including:
/// - Loading configuration from YAML files
/// - Merging with default configuration
/// - Handling environment variable overrides
/// - Providing typed getters/setters for configuration values
///
/// A configuration created with [`Config::from_yaml_str`] lives in memory
/// only and is never written back to disk.
#[derive(Debug)]
pub struct Config {
    config_dir: String,
    path: String,
    data: Mutex<Value>,
}

// Implémentation manuelle de Clone
impl Clone for Config {
    fn clone(&self) -> Self {
        let data = self.lock().clone();
        Self {
            config_dir: self.config_dir.clone(),
            path: self.path.clone(),
            data: Mutex::new(data),
        }
    }
}

impl Config {
    /// Returns the configuration directory, creating it if needed.
    ///
    /// The first candidate wins:
    /// 1. `directory` when not empty
    /// 2. the `PMODVB_CONFIG` environment variable
    /// 3. `.pmodvb` in the current directory, if present
    /// 4. `.pmodvb` in the home directory, if present
    /// 5. `.pmodvb` in the current directory
    pub fn config_dir(directory: &str) -> Result<String> {
        let dir = Some(directory.to_string())
            .filter(|d| !d.is_empty())
            .or_else(|| {
                env::var(ENV_CONFIG_DIR).ok().inspect(|dir| {
                    info!(env_var = ENV_CONFIG_DIR, path = %dir, "Config directory from env")
                })
            })
            .or_else(|| {
                let home = home_dir().map(|h| h.join(CONFIG_DIR_NAME));
                std::iter::once(PathBuf::from(CONFIG_DIR_NAME))
                    .chain(home)
                    .find(|candidate| candidate.is_dir())
                    .map(|candidate| candidate.to_string_lossy().into_owned())
            })
            .unwrap_or_else(|| CONFIG_DIR_NAME.to_string());

        fs::create_dir_all(&dir)?;
        let metadata = fs::metadata(&dir)?;
        if metadata.permissions().readonly() {
            return Err(anyhow!("config directory {} is read-only", dir));
        }
        Ok(dir)
    }

    /// Loads `config.yaml` from the configuration directory over the
    /// embedded defaults, applies env overrides, and writes the result back.
    ///
    /// A missing `config.yaml` is not an error.
    pub fn load_config(directory: &str) -> Result<Self> {
        let config_dir = Self::config_dir(directory)?;
        info!(config_dir = %config_dir, "Using config directory");

        let path = Path::new(&config_dir)
            .join("config.yaml")
            .to_string_lossy()
            .into_owned();
        let external = fs::read_to_string(&path).ok();
        if external.is_none() {
            info!(config_file = %path, "No config file, using embedded defaults");
        }

        let config = Config {
            config_dir,
            path,
            data: Mutex::new(Self::build_value(external.as_deref())?),
        };
        config.save()?;
        Ok(config)
    }

    /// Builds an in-memory configuration from a YAML document
    ///
    /// The document is merged over the embedded defaults and environment
    /// overrides are applied, like [`Config::load_config`], but nothing is
    /// read from or written to disk.
    pub fn from_yaml_str(yaml: &str) -> Result<Self> {
        Ok(Config {
            config_dir: String::new(),
            path: String::new(),
            data: Mutex::new(Self::build_value(Some(yaml))?),
        })
    }

    fn build_value(external: Option<&str>) -> Result<Value> {
        let mut value = Value::Null;
        merge_yaml(&mut value, serde_yaml::from_str(DEFAULT_CONFIG)?);
        if let Some(yaml) = external {
            merge_yaml(&mut value, serde_yaml::from_str(yaml)?);
        }
        for (name, raw) in env::vars() {
            if let Some(stripped) = name.strip_prefix(ENV_PREFIX) {
                let path: Vec<&str> = stripped.split("__").collect();
                if let Err(err) = insert_at(&mut value, &path, Self::convert_env_value(&raw)) {
                    warn!(env_var = %name, "Ignoring env override: {}", err);
                }
            }
        }
        Ok(value)
    }

    /// Directory holding `config.yaml`, empty for in-memory configurations
    pub fn directory(&self) -> &str {
        &self.config_dir
    }

    fn lock(&self) -> MutexGuard<'_, Value> {
        // A poisoned lock still holds a consistent YAML tree
        self.data.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    /// Saves the current configuration to the config.yaml file
    pub fn save(&self) -> Result<()> {
        if self.path.is_empty() {
            return Ok(());
        }
        let yaml = serde_yaml::to_string(&*self.lock())?;
        fs::write(&self.path, yaml)?;
        Ok(())
    }

    /// Sets the value at `path` (keys are case-insensitive) and saves.
    ///
    /// Missing intermediate mappings are created.
    pub fn set_value(&self, path: &[&str], value: Value) -> Result<()> {
        insert_at(&mut self.lock(), path, value)?;
        self.save()
    }

    /// Gets the value at `path` (keys are case-insensitive).
    ///
    /// Returns an error if the path doesn't exist.
    pub fn get_value(&self, path: &[&str]) -> Result<Value> {
        let data = self.lock();
        let mut node = &*data;
        for (depth, key) in path.iter().enumerate() {
            node = node
                .get(yaml_key(key))
                .ok_or_else(|| anyhow!("Path {} does not exist", path[..=depth].join(".")))?;
        }
        Ok(node.clone())
    }

    fn convert_env_value(value: &str) -> Value {
        serde_yaml::from_str(value).unwrap_or_else(|_| Value::String(value.to_string()))
    }

    impl_bool_config!(
        get_log_enable_console,
        set_log_enable_console,
        &["host", "logger", "enable_console"],
        DEFAULT_LOG_ENABLE_CONSOLE
    );

    /// Récupère le niveau de log minimum depuis la configuration
    pub fn get_log_min_level(&self) -> Result<String> {
        match self.get_value(&["host", "logger", "min_level"]) {
            Ok(Value::String(s)) => Ok(s),
            _ => Ok(DEFAULT_LOG_MIN_LEVEL.to_string()),
        }
    }

    /// Définit le niveau de log minimum dans la configuration
    pub fn set_log_min_level(&self, level: String) -> Result<()> {
        self.set_value(&["host", "logger", "min_level"], Value::String(level))
    }
}

/// Returns the global configuration instance
///
/// This function provides access to the singleton configuration instance,
/// which is lazily loaded on first access.
///
/// # Panics
///
/// Panics on first access if the configuration directory cannot be
/// prepared or the configuration file is not valid YAML.
pub fn get_config() -> Arc<Config> {
    CONFIG.clone()
}

/// Configuration keys are stored lower-cased
fn yaml_key(key: &str) -> Value {
    Value::String(key.to_lowercase())
}

/// Stores `value` at `path`, creating missing mappings on the way
fn insert_at(root: &mut Value, path: &[&str], value: Value) -> Result<()> {
    let Some((last, parents)) = path.split_last() else {
        *root = value;
        return Ok(());
    };
    let mut node = root;
    for key in parents {
        node = node
            .as_mapping_mut()
            .ok_or_else(|| anyhow!("{} is not a mapping", key))?
            .entry(yaml_key(key))
            .or_insert_with(|| Value::Mapping(Mapping::new()));
    }
    node.as_mapping_mut()
        .ok_or_else(|| anyhow!("parent of {} is not a mapping", last))?
        .insert(yaml_key(last), value);
    Ok(())
}

/// Merges `overlay` into `base`, lower-casing the overlay's keys.
///
/// Mappings merge key by key; any other overlay value replaces the base.
fn merge_yaml(base: &mut Value, overlay: Value) {
    let Value::Mapping(entries) = overlay else {
        *base = overlay;
        return;
    };
    if !base.is_mapping() {
        *base = Value::Mapping(Mapping::new());
    }
    if let Value::Mapping(map) = base {
        for (key, child) in entries {
            let key = match key {
                Value::String(name) => Value::String(name.to_lowercase()),
                other => other,
            };
            merge_yaml(map.entry(key).or_insert(Value::Null), child);
        }
    }
}
