//! Configuration for the `how` CLI and its provider

use std::path::{Path, PathBuf};
use std::time::Duration;

use log::{debug, warn};
use serde::{Deserialize, Serialize};

use crate::error::Error;

pub const DEFAULT_MODEL: &str = "models/gemini-3-flash-preview";
pub const DEFAULT_API_BASE: &str
  = "https://generativelanguage.googleapis.com/v1beta";
/// Provider budget of 30s plus a 5s margin
pub const DEFAULT_TIMEOUT_SECS: u64 = 35;

pub const CONFIG_DIR_NAME: &str = ".how-cli";
pub const CONFIG_FILE_NAME: &str = "config.json";
pub const API_KEY_FILE_NAME: &str = ".google_api_key";
pub const HISTORY_FILE_NAME: &str = "history.log";

pub const ENV_API_KEY: &str = "GOOGLE_API_KEY";
pub const ENV_MODEL: &str = "HOW_MODEL";
pub const ENV_TIMEOUT_SECS: &str = "HOW_TIMEOUT_SECS";
pub const ENV_CONFIG_DIR: &str = "HOW_CONFIG_DIR";

/// Retry configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RetryConfig
{   /// Max attempts per request
    pub max_retries: usize
  , /// Backoff multiplier for retries
    pub backoff_multiplier: f32
  , /// Initial backoff duration in milliseconds
    pub initial_backoff_ms: u64
}

impl Default for RetryConfig
{   fn default() -> Self
    {   RetryConfig
        {   max_retries: 3
          , backoff_multiplier: 2.0
          , initial_backoff_ms: 1000
        }
    }
}

/// `how` configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct HowConfig
{   /// Directory holding the key file, history and config file
    #[serde(skip)]
    pub config_dir: PathBuf
  , /// Model identifier
    pub model: String
  , /// Per-request timeout in seconds, `None` to wait indefinitely
    pub timeout_secs: Option<u64>
  , /// Provider API base URL
    pub api_base: String
  , /// Retry configuration
    pub retry: RetryConfig
}

impl Default for HowConfig
{   fn default() -> Self
    {   HowConfig
        {   config_dir: default_config_dir()
              .unwrap_or_else(|_| PathBuf::from(CONFIG_DIR_NAME))
          , model: DEFAULT_MODEL.to_string()
          , timeout_secs: Some(DEFAULT_TIMEOUT_SECS)
          , api_base: DEFAULT_API_BASE.to_string()
          , retry: RetryConfig::default()
        }
    }
}

impl HowConfig
{   /// Load configuration from the default directory and the process
    /// environment.
    pub fn load() -> Result<Self, Error>
    {   let dir = match std::env::var(ENV_CONFIG_DIR)
        {   Ok(dir) if !dir.trim().is_empty() => PathBuf::from(dir)
          , _ => default_config_dir()?
        };
        let mut config = HowConfig::load_from_dir(&dir)?;
        config.apply_env(|name| std::env::var(name).ok());
        Ok(config)
    }

    /// Load `config.json` from `dir` if present, defaults otherwise.
    /// Environment variables are not consulted.
    pub fn load_from_dir(dir: &Path) -> Result<Self, Error>
    {   let path = dir.join(CONFIG_FILE_NAME);
        let mut config = if path.is_file()
        {   debug!("Loading config from {}", path.display());
            let raw = std::fs::read_to_string(&path)?;
            serde_json::from_str::<HowConfig>(&raw).map_err(|e| {
              Error::InvalidConfiguration(
                format!("{}: {}", path.display(), e)
              )
            })?
        } else
        {   HowConfig::default()
        };
        if config.timeout_secs == Some(0)
        {   config.timeout_secs = None;
        }
        config.config_dir = dir.to_path_buf();
        config.validate()?;
        Ok(config)
    }

    /// Apply environment overrides through `lookup`.
    pub fn apply_env<F>(&mut self, lookup: F)
    where
      F: Fn(&str) -> Option<String>
    {   if let Some(model) = lookup(ENV_MODEL)
        {   let model = model.trim();
            if !model.is_empty()
            {   debug!("Model overridden by {}: {}", ENV_MODEL, model);
                self.model = model.to_string();
            }
        }
        if let Some(raw) = lookup(ENV_TIMEOUT_SECS)
        {   match raw.trim().parse::<u64>()
            {   Ok(0) => self.timeout_secs = None
              , Ok(secs) => self.timeout_secs = Some(secs)
              , Err(_) => {
                  warn!("Ignoring invalid {}: {:?}", ENV_TIMEOUT_SECS, raw)
                }
            }
        }
    }

    fn validate(&self) -> Result<(), Error>
    {   if self.model.trim().is_empty()
        {   return Err(Error::InvalidConfiguration(
              "model must not be empty".to_string()
            ));
        }
        if self.api_base.trim().is_empty()
        {   return Err(Error::InvalidConfiguration(
              "api_base must not be empty".to_string()
            ));
        }
        Ok(())
    }

    /// Zero means no timeout, wherever it was configured.
    pub fn timeout(&self) -> Option<Duration>
    {   self.timeout_secs
          .filter(|secs| *secs > 0)
          .map(Duration::from_secs)
    }

    pub fn api_key_file(&self) -> PathBuf
    {   self.config_dir.join(API_KEY_FILE_NAME)
    }

    pub fn history_file(&self) -> PathBuf
    {   self.config_dir.join(HISTORY_FILE_NAME)
    }
}

/// `~/.how-cli`
pub fn default_config_dir() -> Result<PathBuf, Error>
{   dirs::home_dir()
      .map(|home| home.join(CONFIG_DIR_NAME))
      .ok_or_else(|| {
        Error::InvalidConfiguration(
          "could not determine home directory".to_string()
        )
      })
}
