use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use thiserror::Error;
use tracing::{info, warn};

use crate::itunes::DEFAULT_BASE_URL;

pub const DEFAULT_TERM: &str = "technology";
pub const DEFAULT_USER_AGENT: &str = concat!("nai/", env!("CARGO_PKG_VERSION"));
const CONFIG_FILE: &str = "config.yaml";

/// Configuration errors
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Serialization error: {0}")]
    Serialization(String),
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// YAML config file structure. Every key is optional.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ConfigYaml {
    /// Directory base URL, e.g. a local mirror
    #[serde(default)]
    pub base_url: Option<String>,
    /// Term searched when the search screen first opens
    #[serde(default)]
    pub default_term: Option<String>,
    #[serde(default)]
    pub user_agent: Option<String>,
}

/// Application configuration
#[derive(Clone, Debug, PartialEq)]
pub struct Config {
    pub base_url: String,
    pub default_term: String,
    pub user_agent: String,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_string(),
            default_term: DEFAULT_TERM.to_string(),
            user_agent: DEFAULT_USER_AGENT.to_string(),
        }
    }
}

impl Config {
    pub fn load() -> Self {
        let dev_mode = std::env::var("NAI_DEV_MODE").is_ok() || dotenvy::dotenv().is_ok();
        if dev_mode {
            info!("Dev mode activated - loading from environment");
            Self::from_vars(|key| std::env::var(key).ok())
        } else {
            Self::from_config_file()
        }
    }

    /// Build a config from `NAI_*` variables, looked up through `var`.
    fn from_vars(var: impl Fn(&str) -> Option<String>) -> Self {
        let non_empty = |key: &str| var(key).filter(|v| !v.is_empty());
        let defaults = Self::default();
        Self {
            base_url: non_empty("NAI_BASE_URL").unwrap_or(defaults.base_url),
            default_term: var("NAI_DEFAULT_TERM").unwrap_or(defaults.default_term),
            user_agent: non_empty("NAI_USER_AGENT").unwrap_or(defaults.user_agent),
        }
    }

    fn from_config_file() -> Self {
        match config_dir() {
            Some(dir) => Self::load_from_dir(&dir),
            None => {
                warn!("No home directory, using default config");
                Self::default()
            }
        }
    }

    /// Load `config.yaml` from `dir`. A missing or unreadable file yields defaults.
    pub fn load_from_dir(dir: &Path) -> Self {
        let path = dir.join(CONFIG_FILE);
        if !path.exists() {
            info!("No config at {}, using defaults", path.display());
            return Self::default();
        }

        let yaml = match std::fs::read_to_string(&path)
            .map_err(ConfigError::from)
            .and_then(|content| {
                serde_yaml::from_str::<ConfigYaml>(&content)
                    .map_err(|e| ConfigError::Serialization(e.to_string()))
            }) {
            Ok(yaml) => yaml,
            Err(e) => {
                warn!("Failed to load {}: {}, using defaults", path.display(), e);
                return Self::default();
            }
        };

        info!("Loaded config from {}", path.display());
        Self::from_yaml(yaml)
    }

    fn from_yaml(yaml: ConfigYaml) -> Self {
        let defaults = Self::default();
        Self {
            base_url: yaml.base_url.unwrap_or(defaults.base_url),
            default_term: yaml.default_term.unwrap_or(defaults.default_term),
            user_agent: yaml.user_agent.unwrap_or(defaults.user_agent),
        }
    }

    /// Write this config to `dir/config.yaml`, creating `dir` if needed.
    pub fn save_to_yaml(&self, dir: &Path) -> Result<(), ConfigError> {
        std::fs::create_dir_all(dir)?;
        let yaml = ConfigYaml {
            base_url: Some(self.base_url.clone()),
            default_term: Some(self.default_term.clone()),
            user_agent: Some(self.user_agent.clone()),
        };
        let content =
            serde_yaml::to_string(&yaml).map_err(|e| ConfigError::Serialization(e.to_string()))?;
        std::fs::write(dir.join(CONFIG_FILE), content)?;
        Ok(())
    }
}

/// `~/.nai`
pub fn config_dir() -> Option<PathBuf> {
    dirs::home_dir().map(|home| home.join(".nai"))
}
