#![forbid(unsafe_code)]
#![warn(missing_docs)]
#![deny(clippy::unwrap_used)]

//! protoc-gen-openapiv2 Configuration
//!
//! This crate provides the configuration surface of the generator:
//! - Generation options ([`GenOption`], [`OptionsBuilder`], [`GeneratorOptions`])
//! - Parsing of the protoc plugin parameter string
//! - An optional TOML configuration file holding logging and generator settings
//!
//! Options are applied in caller order to one builder and then frozen, so every
//! later stage sees a read-only configuration.

pub mod options;
pub mod parameter;

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use thiserror::Error;

pub use options::{
    GenOption, GeneratorOptions, OptionsBuilder, PathParamSeparator, DEFAULT_MERGE_FILE_NAME,
    DEFAULT_RECURSIVE_DEPTH,
};
pub use parameter::{parse_parameter, PluginParameters};

/// Errors that can occur while building configuration
#[derive(Debug, Error)]
pub enum ConfigError {
    /// Failed to read the configuration file from disk
    #[error("Failed to read config file: {0}")]
    FileRead(#[from] std::io::Error),
    /// Failed to parse the TOML configuration file
    #[error("Failed to parse config file: {0}")]
    Parse(#[from] toml::de::Error),
    /// Failed to serialize configuration to TOML format
    #[error("Failed to serialize config: {0}")]
    Serialize(#[from] toml::ser::Error),
    /// Could not locate the user's configuration directory
    #[error("Could not find user config directory")]
    ConfigDirUnavailable,
    /// Repeated path parameter separator outside the recognised set
    #[error("unknown repeated path parameter separator: {0:?} (expected csv, pipes, ssv or tsv)")]
    InvalidSeparator(String),
    /// Malformed plugin parameter
    #[error("invalid plugin parameter: {0}")]
    InvalidParameter(String),
}

/// Configuration file contents
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Config {
    /// Logging configuration
    #[serde(default)]
    pub logging: LoggingConfig,
    /// Generator settings
    #[serde(default)]
    pub generator: GeneratorSection,
}

/// Logging configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LoggingConfig {
    /// Log level (trace, debug, info, warn, error)
    pub level: String,
}

impl Default for LoggingConfig {
    fn default() -> Self { Self { level: "warn".to_string() } }
}

/// Generator settings; unset fields keep the option defaults.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct GeneratorSection {
    /// See [`GenOption::UseJsonNamesForFields`]
    #[serde(skip_serializing_if = "Option::is_none")]
    pub use_json_names_for_fields: Option<bool>,
    /// See [`GenOption::RecursiveDepth`]
    #[serde(skip_serializing_if = "Option::is_none")]
    pub recursive_depth: Option<usize>,
    /// See [`GenOption::EnumsAsInts`]
    #[serde(skip_serializing_if = "Option::is_none")]
    pub enums_as_ints: Option<bool>,
    /// See [`GenOption::MergeFileName`]
    #[serde(skip_serializing_if = "Option::is_none")]
    pub merge_file_name: Option<String>,
    /// See [`GenOption::DisableDefaultErrors`]
    #[serde(skip_serializing_if = "Option::is_none")]
    pub disable_default_errors: Option<bool>,
    /// See [`GenOption::AllowMerge`]
    #[serde(skip_serializing_if = "Option::is_none")]
    pub allow_merge: Option<bool>,
    /// Generate RPC-derived artifacts only
    #[serde(skip_serializing_if = "Option::is_none")]
    pub generate_rpc_methods: Option<bool>,
    /// Repeated path parameter separator token
    #[serde(skip_serializing_if = "Option::is_none")]
    pub repeated_path_param_separator: Option<String>,
}

impl GeneratorSection {
    /// The caller options set in this section, in declaration order.
    pub fn to_options(&self) -> Vec<GenOption> {
        let mut opts = Vec::new();
        if let Some(b) = self.use_json_names_for_fields {
            opts.push(GenOption::UseJsonNamesForFields(b));
        }
        if let Some(depth) = self.recursive_depth {
            opts.push(GenOption::RecursiveDepth(depth));
        }
        if let Some(b) = self.enums_as_ints {
            opts.push(GenOption::EnumsAsInts(b));
        }
        if let Some(name) = &self.merge_file_name {
            opts.push(GenOption::MergeFileName(name.clone()));
        }
        if let Some(b) = self.disable_default_errors {
            opts.push(GenOption::DisableDefaultErrors(b));
        }
        if let Some(b) = self.allow_merge {
            opts.push(GenOption::AllowMerge(b));
        }
        opts
    }
}

impl Config {
    /// Load configuration from a TOML file at `path`
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        let contents = std::fs::read_to_string(path.as_ref())?;
        let config = toml::from_str(&contents)?;
        Ok(config)
    }

    /// Save this configuration as a pretty-printed TOML file at `path`
    pub fn save<P: AsRef<Path>>(&self, path: P) -> Result<(), ConfigError> {
        let contents = toml::to_string_pretty(self)?;
        std::fs::write(path, contents)?;
        Ok(())
    }

    /// Returns the default config file path:
    /// `{config_dir()}/protoc-gen-openapiv2/config.toml`
    pub fn default_path() -> Result<PathBuf, ConfigError> {
        let config_dir = dirs::config_dir()
            .ok_or(ConfigError::ConfigDirUnavailable)?
            .join("protoc-gen-openapiv2");
        Ok(config_dir.join("config.toml"))
    }
}
