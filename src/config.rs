//! Configuration file support.
//!
//! Settings live in a TOML file, by default `<config dir>/safecalc/config.toml`:
//!
//! ```toml
//! max_depth = 64
//! max_input_len = 4096
//! thousands_separator = true
//! ```

use std::path::{Path, PathBuf};

use serde::Deserialize;
use thiserror::Error;
use tracing::debug;

use crate::calculator::{
    DEFAULT_MAX_DEPTH, DEFAULT_MAX_INPUT_LEN, MAX_DEPTH_CEILING, MAX_INPUT_LEN_CEILING,
};

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read {}: {source}", .path.display())]
    Read {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error("failed to parse {}: {source}", .path.display())]
    Parse {
        path: PathBuf,
        source: toml::de::Error,
    },
    #[error("invalid configuration: {0}")]
    Invalid(String),
}

/// Evaluator limits and output settings.
#[derive(Clone, Debug, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct Config {
    /// Maximum nesting of parentheses and unary minuses.
    pub max_depth: usize,
    /// Maximum input length in characters.
    pub max_input_len: usize,
    /// Group integer digits with `,` in displayed results.
    pub thousands_separator: bool,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            max_depth: DEFAULT_MAX_DEPTH,
            max_input_len: DEFAULT_MAX_INPUT_LEN,
            thousands_separator: true,
        }
    }
}

impl Config {
    /// Default location of the configuration file, if a config dir exists.
    pub fn default_path() -> Option<PathBuf> {
        dirs::config_dir().map(|dir| dir.join("safecalc").join("config.toml"))
    }

    /// Load configuration.
    ///
    /// An explicit `path` must exist. Without one, the default location is
    /// read when present and built-in defaults are used otherwise.
    pub fn load(path: Option<&Path>) -> Result<Self, ConfigError> {
        match path {
            Some(path) => Self::load_file(path),
            None => match Self::default_path() {
                Some(path) if path.exists() => Self::load_file(&path),
                _ => {
                    debug!("no config file found, using defaults");
                    Ok(Self::default())
                }
            },
        }
    }

    fn load_file(path: &Path) -> Result<Self, ConfigError> {
        debug!(path = %path.display(), "loading config");
        let contents = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        let config: Self = toml::from_str(&contents).map_err(|source| ConfigError::Parse {
            path: path.to_path_buf(),
            source,
        })?;
        config.validate()?;
        Ok(config)
    }

    /// Check that the limits are usable.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.max_depth == 0 || self.max_depth > MAX_DEPTH_CEILING {
            return Err(ConfigError::Invalid(format!(
                "max_depth must be between 1 and {}, got {}",
                MAX_DEPTH_CEILING, self.max_depth
            )));
        }
        if self.max_input_len == 0 || self.max_input_len > MAX_INPUT_LEN_CEILING {
            return Err(ConfigError::Invalid(format!(
                "max_input_len must be between 1 and {}, got {}",
                MAX_INPUT_LEN_CEILING, self.max_input_len
            )));
        }
        Ok(())
    }
}
