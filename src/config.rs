//! Tuning configuration.
//!
//! Values are layered with figment, later layers winning:
//!
//! 1. built-in defaults
//! 2. a TOML file: `--config <FILE>` if given, otherwise `config.toml` in
//!    the platform config directory when it exists
//! 3. environment variables prefixed `RMDUPS_` (e.g. `RMDUPS_READ_CHUNK_SIZE`)
//!
//! ```toml
//! prefix_cache_size = 4096
//! read_chunk_size = 1048576
//! wipe_chunk_size = 65536
//! ```

use std::path::{Path, PathBuf};

use directories::ProjectDirs;
use figment::providers::{Env, Format, Serialized, Toml};
use figment::Figment;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::actions::WIPE_CHUNK_SIZE;
use crate::duplicates::{Comparer, PREFIX_CACHE_SIZE, READ_CHUNK_SIZE};

/// Environment variable prefix for configuration keys.
pub const ENV_PREFIX: &str = "RMDUPS_";

/// Errors from loading configuration.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// The explicitly requested file does not exist.
    #[error("config file not found: {0}")]
    FileNotFound(PathBuf),

    /// A layer could not be read or has the wrong shape.
    #[error("invalid configuration: {0}")]
    Invalid(#[from] Box<figment::Error>),

    /// A value is out of range.
    #[error("invalid value for {key}: {reason}")]
    OutOfRange {
        /// Name of the offending setting
        key: &'static str,
        /// What the value must satisfy
        reason: String,
    },
}

/// Tuning options.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Leading bytes of each file remembered for later comparisons
    pub prefix_cache_size: usize,
    /// Bytes read from each file per comparison step
    pub read_chunk_size: usize,
    /// Bytes of zeros written per step when wiping
    pub wipe_chunk_size: usize,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            prefix_cache_size: PREFIX_CACHE_SIZE,
            read_chunk_size: READ_CHUNK_SIZE,
            wipe_chunk_size: WIPE_CHUNK_SIZE,
        }
    }
}

impl Config {
    /// Load configuration, using `file` instead of the default location.
    ///
    /// # Errors
    ///
    /// Returns an error if `file` is given but missing, if any layer fails
    /// to parse, or if a value is out of range.
    pub fn load(file: Option<&Path>) -> Result<Self, ConfigError> {
        let toml_path = match file {
            Some(path) if !path.is_file() => {
                return Err(ConfigError::FileNotFound(path.to_path_buf()))
            }
            Some(path) => Some(path.to_path_buf()),
            None => Self::default_path().filter(|p| p.is_file()),
        };
        if let Some(path) = &toml_path {
            log::debug!("loading config from {}", path.display());
        }
        Self::extract(Self::figment(toml_path.as_deref()))
    }

    /// The layered figment without the platform default file lookup.
    #[must_use]
    pub fn figment(toml_path: Option<&Path>) -> Figment {
        let mut figment = Figment::from(Serialized::defaults(Self::default()));
        if let Some(path) = toml_path {
            figment = figment.merge(Toml::file(path));
        }
        figment.merge(Env::prefixed(ENV_PREFIX).ignore(&["config"]))
    }

    /// Extract and validate a config from `figment`.
    ///
    /// # Errors
    ///
    /// Returns an error if extraction or validation fails.
    pub fn extract(figment: Figment) -> Result<Self, ConfigError> {
        let config: Self = figment.extract().map_err(Box::new)?;
        config.validate()?;
        Ok(config)
    }

    /// Check value ranges.
    ///
    /// # Errors
    ///
    /// Returns `OutOfRange` for a zero chunk size.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.read_chunk_size == 0 {
            return Err(ConfigError::OutOfRange {
                key: "read_chunk_size",
                reason: "must be greater than zero".to_string(),
            });
        }
        if self.wipe_chunk_size == 0 {
            return Err(ConfigError::OutOfRange {
                key: "wipe_chunk_size",
                reason: "must be greater than zero".to_string(),
            });
        }
        Ok(())
    }

    /// A comparer using these settings.
    #[must_use]
    pub fn comparer(&self) -> Comparer {
        Comparer::new(self.prefix_cache_size, self.read_chunk_size)
    }

    /// Platform-specific default config file location.
    #[must_use]
    pub fn default_path() -> Option<PathBuf> {
        ProjectDirs::from("", "", "rmdups").map(|dirs| dirs.config_dir().join("config.toml"))
    }
}
