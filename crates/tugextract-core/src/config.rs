//! Layered configuration for tugextract.
//!
//! Settings come from (lowest to highest precedence):
//! 1. Built-in defaults
//! 2. User config: `<config_dir>/tugx/config.toml`
//! 3. Project config: `<workspace>/.tugx.toml` (or `--config <path>`)
//! 4. Environment variables (`TUGX_*`)
//! 5. CLI flags
//!
//! Each resolved value remembers where it came from.
//!
//! ```toml
//! [extract]
//! default_access = "private"
//! known_static_types = ["Guard", "Log"]
//! strict_mixed_returns = false
//! promote_static = true
//! ```

use std::fs;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::debug;

/// Project config file name, relative to the workspace root.
pub const PROJECT_CONFIG_FILE: &str = ".tugx.toml";

/// Errors raised while loading configuration.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// The config file could not be read.
    #[error("cannot read {path}: {source}")]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },

    /// The config file is not valid TOML for this schema.
    #[error("cannot parse {path}: {source}")]
    Parse {
        path: PathBuf,
        source: toml::de::Error,
    },

    /// An environment variable holds a value of the wrong shape.
    #[error("invalid value '{value}' for {key}")]
    InvalidValue { key: String, value: String },
}

// ============================================================================
// File Schema
// ============================================================================

/// Contents of a config file. Every setting is optional so layers can be merged.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ConfigFile {
    /// Extract-method settings.
    #[serde(default, alias = "tugx")]
    pub extract: ExtractSettings,
}

/// `[extract]` table.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ExtractSettings {
    /// Access modifier used when the caller does not pass one.
    #[serde(default)]
    pub default_access: Option<String>,

    /// Extra type names treated as static receivers, never as variables.
    #[serde(default)]
    pub known_static_types: Vec<String>,

    /// Fail instead of degrading when returned values mix declarations and assignments.
    #[serde(default)]
    pub strict_mixed_returns: Option<bool>,

    /// Make the new method static when the enclosing member is static.
    #[serde(default)]
    pub promote_static: Option<bool>,

    /// Session directory override, relative to the workspace.
    #[serde(default)]
    pub session_dir: Option<PathBuf>,
}

impl ConfigFile {
    /// Parse a config file from disk.
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let text = fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::parse(&text, path)
    }

    /// Parse config text; `origin` is used in error messages.
    pub fn parse(text: &str, origin: &Path) -> Result<Self, ConfigError> {
        toml::from_str(text).map_err(|source| ConfigError::Parse {
            path: origin.to_path_buf(),
            source,
        })
    }
}

// ============================================================================
// Configuration Sources
// ============================================================================

/// Configuration value source (for precedence tracking).
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ConfigSource {
    /// Built-in default value.
    Default = 0,
    /// From the user config file.
    UserConfig = 1,
    /// From the project config file.
    ProjectConfig = 2,
    /// From environment variable.
    EnvVar = 3,
    /// From CLI flag (highest precedence).
    CliFlag = 4,
}

/// A configuration value with its source.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ConfigValue<T> {
    /// The actual value.
    pub value: T,
    /// Where the value came from.
    pub source: ConfigSource,
}

impl<T> ConfigValue<T> {
    /// Create a new config value with the given source.
    pub fn new(value: T, source: ConfigSource) -> Self {
        ConfigValue { value, source }
    }

    /// Merge with another value, preferring higher precedence.
    pub fn merge(self, other: Self) -> Self {
        if other.source >= self.source {
            other
        } else {
            self
        }
    }
}

// ============================================================================
// Configuration Resolution
// ============================================================================

/// CLI configuration overrides.
#[derive(Debug, Clone, Default)]
pub struct CliOverrides {
    /// Explicit `--config` file, used in place of the project file.
    pub config_path: Option<PathBuf>,
    /// `--access` flag.
    pub default_access: Option<String>,
    /// `--strict-mixed-returns` flag.
    pub strict_mixed_returns: Option<bool>,
    /// `--no-promote-static` flag (as `Some(false)`).
    pub promote_static: Option<bool>,
}

/// Resolved configuration with precedence information.
#[derive(Debug, Clone, Serialize)]
pub struct ResolvedConfig {
    /// Access modifier used when a request does not carry one.
    pub default_access: Option<ConfigValue<String>>,
    /// Known static types, accumulated across layers.
    pub known_static_types: Vec<ConfigValue<String>>,
    /// Whether mixed declare/assign returns fail the request.
    pub strict_mixed_returns: ConfigValue<bool>,
    /// Whether static members promote extracted methods to static.
    pub promote_static: ConfigValue<bool>,
    /// Session directory override.
    pub session_dir: Option<ConfigValue<PathBuf>>,
}

impl Default for ResolvedConfig {
    fn default() -> Self {
        ResolvedConfig {
            default_access: None,
            known_static_types: Vec::new(),
            strict_mixed_returns: ConfigValue::new(false, ConfigSource::Default),
            promote_static: ConfigValue::new(true, ConfigSource::Default),
            session_dir: None,
        }
    }
}

impl ResolvedConfig {
    /// Resolve configuration from all sources.
    pub fn resolve(workspace_root: &Path, overrides: &CliOverrides) -> Result<Self, ConfigError> {
        let mut config = ResolvedConfig::default();

        if let Some(user_path) = user_config_path() {
            if user_path.exists() {
                config.apply_file(&ConfigFile::load(&user_path)?, ConfigSource::UserConfig);
            }
        }

        let project_path = overrides
            .config_path
            .clone()
            .unwrap_or_else(|| workspace_root.join(PROJECT_CONFIG_FILE));
        if project_path.exists() {
            config.apply_file(&ConfigFile::load(&project_path)?, ConfigSource::ProjectConfig);
        } else if overrides.config_path.is_some() {
            return Err(ConfigError::Io {
                path: project_path,
                source: std::io::Error::from(std::io::ErrorKind::NotFound),
            });
        }

        config.apply_env(|key| std::env::var(key).ok())?;
        config.apply_cli_overrides(overrides);

        debug!(
            strict_mixed_returns = config.strict_mixed_returns.value,
            promote_static = config.promote_static.value,
            known_static_types = config.known_static_types.len(),
            "configuration resolved"
        );
        Ok(config)
    }

    /// Apply one config file layer.
    pub fn apply_file(&mut self, file: &ConfigFile, source: ConfigSource) {
        let settings = &file.extract;
        if let Some(access) = &settings.default_access {
            self.default_access = Some(ConfigValue::new(access.clone(), source));
        }
        for name in &settings.known_static_types {
            if !self.known_static_types.iter().any(|v| &v.value == name) {
                self.known_static_types
                    .push(ConfigValue::new(name.clone(), source));
            }
        }
        if let Some(strict) = settings.strict_mixed_returns {
            self.strict_mixed_returns = self
                .strict_mixed_returns
                .clone()
                .merge(ConfigValue::new(strict, source));
        }
        if let Some(promote) = settings.promote_static {
            self.promote_static = self
                .promote_static
                .clone()
                .merge(ConfigValue::new(promote, source));
        }
        if let Some(dir) = &settings.session_dir {
            self.session_dir = Some(ConfigValue::new(dir.clone(), source));
        }
    }

    /// Apply environment variables read through `lookup`.
    pub fn apply_env(
        &mut self,
        lookup: impl Fn(&str) -> Option<String>,
    ) -> Result<(), ConfigError> {
        if let Some(access) = lookup("TUGX_ACCESS") {
            self.default_access = Some(ConfigValue::new(access, ConfigSource::EnvVar));
        }
        if let Some(raw) = lookup("TUGX_STRICT_MIXED_RETURNS") {
            let value = parse_bool("TUGX_STRICT_MIXED_RETURNS", &raw)?;
            self.strict_mixed_returns = ConfigValue::new(value, ConfigSource::EnvVar);
        }
        if let Some(raw) = lookup("TUGX_PROMOTE_STATIC") {
            let value = parse_bool("TUGX_PROMOTE_STATIC", &raw)?;
            self.promote_static = ConfigValue::new(value, ConfigSource::EnvVar);
        }
        if let Some(raw) = lookup("TUGX_KNOWN_STATIC_TYPES") {
            for name in raw.split(',').map(str::trim).filter(|s| !s.is_empty()) {
                if !self.known_static_types.iter().any(|v| v.value == name) {
                    self.known_static_types
                        .push(ConfigValue::new(name.to_string(), ConfigSource::EnvVar));
                }
            }
        }
        Ok(())
    }

    fn apply_cli_overrides(&mut self, overrides: &CliOverrides) {
        if let Some(ref access) = overrides.default_access {
            self.default_access = Some(ConfigValue::new(access.clone(), ConfigSource::CliFlag));
        }
        if let Some(strict) = overrides.strict_mixed_returns {
            self.strict_mixed_returns = ConfigValue::new(strict, ConfigSource::CliFlag);
        }
        if let Some(promote) = overrides.promote_static {
            self.promote_static = ConfigValue::new(promote, ConfigSource::CliFlag);
        }
    }

    /// Known static type names, without provenance.
    pub fn known_static_type_names(&self) -> Vec<String> {
        self.known_static_types
            .iter()
            .map(|v| v.value.clone())
            .collect()
    }
}

/// Location of the user config file, if the platform has a config directory.
pub fn user_config_path() -> Option<PathBuf> {
    dirs::config_dir().map(|dir| dir.join("tugx").join("config.toml"))
}

fn parse_bool(key: &str, raw: &str) -> Result<bool, ConfigError> {
    match raw.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Ok(true),
        "0" | "false" | "no" | "off" => Ok(false),
        _ => Err(ConfigError::InvalidValue {
            key: key.to_string(),
            value: raw.to_string(),
        }),
    }
}

// ============================================================================
// Tests
// ============================================================================
