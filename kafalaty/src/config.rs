//! Application configuration.
//!
//! Read from a YAML file, then overridden by `KAFALATY_*` environment
//! variables. Every field has a default, so an empty file is a valid config.

use anyhow::{Context, Result};
use log::{info, warn};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use crate::domain::validation::DEFAULT_MIN_PASSWORD_LENGTH;
use crate::io::Locale;

pub const DEFAULT_EMAIL_DOMAIN: &str = "kafalaty.app";

pub const ENV_EMAIL_DOMAIN: &str = "KAFALATY_EMAIL_DOMAIN";
pub const ENV_LOCALE: &str = "KAFALATY_LOCALE";
pub const ENV_DATA_DIR: &str = "KAFALATY_DATA_DIR";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct KafalatyConfig {
    /// Domain of the emails derived from local identifiers
    pub email_domain: String,
    pub locale: Locale,
    pub min_password_length: usize,
    /// Where the file store keeps its documents; in-memory when unset
    pub data_directory: Option<PathBuf>,
}

impl Default for KafalatyConfig {
    fn default() -> Self {
        Self {
            email_domain: DEFAULT_EMAIL_DOMAIN.to_string(),
            locale: Locale::default(),
            min_password_length: DEFAULT_MIN_PASSWORD_LENGTH,
            data_directory: None,
        }
    }
}

impl KafalatyConfig {
    /// Load configuration from a YAML file and apply environment overrides
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        info!("Loading configuration from {:?}", path);

        let contents = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file {:?}", path))?;
        let config = Self::from_yaml_str(&contents)
            .with_context(|| format!("Failed to parse config file {:?}", path))?;

        Ok(config.apply_env_overrides())
    }

    pub fn from_yaml_str(contents: &str) -> Result<Self> {
        if contents.trim().is_empty() {
            return Ok(Self::default());
        }
        let config: Self = serde_yaml::from_str(contents)?;
        Ok(config)
    }

    /// Apply `KAFALATY_*` overrides from the process environment
    pub fn apply_env_overrides(self) -> Self {
        self.with_overrides(|key| std::env::var(key).ok())
    }

    /// Apply overrides from any key lookup. Empty values are ignored, as is
    /// a locale that cannot be parsed.
    pub fn with_overrides<F>(mut self, lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let value_of = |key: &str| lookup(key).filter(|value| !value.trim().is_empty());

        if let Some(domain) = value_of(ENV_EMAIL_DOMAIN) {
            self.email_domain = domain.trim().to_string();
        }

        if let Some(locale) = value_of(ENV_LOCALE) {
            match locale.parse::<Locale>() {
                Ok(locale) => self.locale = locale,
                Err(e) => warn!("Ignoring {}: {}", ENV_LOCALE, e),
            }
        }

        if let Some(directory) = value_of(ENV_DATA_DIR) {
            self.data_directory = Some(PathBuf::from(directory));
        }

        self
    }
}
