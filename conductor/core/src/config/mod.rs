//! TOML Configuration File Support
//!
//! Centralized configuration loading for docchat clients, backed by a TOML
//! file at `~/.config/docchat/client.toml`.
//!
//! # Configuration Priority
//!
//! Configuration values are loaded with the following priority (highest first):
//! 1. CLI arguments (via [`ConfigOverrides`])
//! 2. Environment variables
//! 3. TOML configuration file
//! 4. Default values
//!
//! # XDG Base Directory Compliance
//!
//! The configuration file follows XDG Base Directory specification:
//! - `$XDG_CONFIG_HOME/docchat/client.toml` (typically `~/.config/docchat/client.toml`)
//!
//! # Example Configuration
//!
//! ```toml
//! [backend]
//! base_url = "http://localhost:8000"
//! request_timeout_secs = 120
//!
//! [polling]
//! interval_secs = 5
//! max_polls = 0
//! mode = "async"
//!
//! [ui]
//! locale = "th"
//! mode = "general"
//! status_display = "status_line"
//! allowed_extensions = ["pdf"]
//! ```

use std::path::PathBuf;
use std::time::Duration;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::backend::BackendConfig;
use crate::conductor::ConductorConfig;
use crate::locale::Locale;
use crate::messages::Mode;
use crate::poller::{PollConfig, ProcessingMode};
use crate::upload::{FileFilter, StatusDisplay};

// =============================================================================
// Error Types
// =============================================================================

/// Errors that can occur when loading configuration
#[derive(Debug, Error)]
pub enum ConfigError {
    /// Failed to read config file
    #[error("Failed to read config file at {path}: {source}")]
    ReadError {
        /// The path that was attempted
        path: PathBuf,
        /// The underlying IO error
        source: std::io::Error,
    },

    /// Failed to parse TOML
    #[error("Failed to parse TOML config: {0}")]
    ParseError(#[from] toml::de::Error),

    /// Invalid configuration value
    #[error("Invalid configuration: {0}")]
    ValidationError(String),
}

// =============================================================================
// Configuration Source Tracking
// =============================================================================

/// Tracks where a configuration value came from
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum ConfigSource {
    /// Value from command-line argument
    Cli,
    /// Value from environment variable
    Env,
    /// Value from TOML configuration file
    File,
    /// Default value
    Default,
}

impl std::fmt::Display for ConfigSource {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Cli => write!(f, "CLI"),
            Self::Env => write!(f, "environment"),
            Self::File => write!(f, "config file"),
            Self::Default => write!(f, "default"),
        }
    }
}

// =============================================================================
// TOML Configuration Structures
// =============================================================================

/// Backend section of the TOML configuration
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct BackendToml {
    /// Base URL of the chat backend
    pub base_url: Option<String>,

    /// Timeout applied to every HTTP request, in seconds
    pub request_timeout_secs: Option<u64>,
}

/// Polling section of the TOML configuration
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct PollingToml {
    /// Delay before each status query, in seconds
    pub interval_secs: Option<u64>,

    /// Maximum status queries per upload (0 = unlimited)
    pub max_polls: Option<u32>,

    /// `async` polls after upload, `sync` does not
    pub mode: Option<ProcessingMode>,
}

/// UI section of the TOML configuration
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct UiToml {
    /// Display language
    pub locale: Option<Locale>,

    /// Initial request mode
    pub mode: Option<Mode>,

    /// Where upload progress is shown
    pub status_display: Option<StatusDisplay>,

    /// File extensions offered for upload
    pub allowed_extensions: Option<Vec<String>>,
}

/// Root TOML configuration structure
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct ClientToml {
    /// Backend connection
    pub backend: BackendToml,

    /// Status polling
    pub polling: PollingToml,

    /// Presentation
    pub ui: UiToml,
}

// =============================================================================
// Main Configuration Struct
// =============================================================================

/// Resolved client configuration
#[derive(Clone, Debug)]
pub struct ClientConfig {
    /// Backend connection
    pub backend: BackendConfig,

    /// Status polling
    pub poll: PollConfig,

    /// Display language
    pub locale: Locale,

    /// Initial request mode
    pub mode: Mode,

    /// Where upload progress is shown
    pub status_display: StatusDisplay,

    /// File extensions offered for upload
    pub allowed_extensions: Vec<String>,

    /// Path to the config file that was loaded (if any)
    pub config_file_path: Option<PathBuf>,

    /// Highest-priority source that contributed a value
    source: ConfigSource,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            backend: BackendConfig::default(),
            poll: PollConfig::default(),
            locale: Locale::default(),
            mode: Mode::default(),
            status_display: StatusDisplay::default(),
            allowed_extensions: FileFilter::default().extensions().to_vec(),
            config_file_path: None,
            source: ConfigSource::Default,
        }
    }
}

impl ClientConfig {
    /// Create a new configuration with default values
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Get the configuration source
    #[must_use]
    pub fn source(&self) -> ConfigSource {
        self.source
    }

    /// Set the configuration source
    pub fn set_source(&mut self, source: ConfigSource) {
        self.source = source;
    }

    /// Settings the Conductor needs
    #[must_use]
    pub fn conductor_config(&self) -> ConductorConfig {
        ConductorConfig {
            mode: self.mode,
            locale: self.locale,
            status_display: self.status_display,
            poll: self.poll.clone(),
        }
    }

    /// Upload file filter
    #[must_use]
    pub fn file_filter(&self) -> FileFilter {
        FileFilter::new(&self.allowed_extensions)
    }

    /// Check values that cannot be expressed in the types
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::ValidationError`] for a non-HTTP base URL or a
    /// zero poll interval.
    pub fn validate(&self) -> Result<(), ConfigError> {
        let url = &self.backend.base_url;
        if !(url.starts_with("http://") || url.starts_with("https://")) {
            return Err(ConfigError::ValidationError(format!(
                "backend base_url must start with http:// or https://, got {url:?}"
            )));
        }
        if self.poll.interval.is_zero() {
            return Err(ConfigError::ValidationError(
                "polling interval must be greater than zero".to_string(),
            ));
        }
        if self.backend.request_timeout.is_zero() {
            return Err(ConfigError::ValidationError(
                "request timeout must be greater than zero".to_string(),
            ));
        }
        Ok(())
    }
}

// =============================================================================
// Configuration Loading
// =============================================================================

/// Get the default configuration file path
///
/// Returns `$XDG_CONFIG_HOME/docchat/client.toml` or equivalent.
#[must_use]
pub fn default_config_path() -> Option<PathBuf> {
    dirs::config_dir().map(|p| p.join("docchat").join("client.toml"))
}

/// Load configuration from the default path and the environment
///
/// # Errors
///
/// Returns an error if the config file exists but cannot be read or parsed.
/// The result is not validated; call [`ClientConfig::validate`] once CLI
/// overrides have been applied.
pub fn load_config() -> Result<ClientConfig, ConfigError> {
    load_config_from_path(default_config_path())
}

/// Load configuration from a specific path and the environment
///
/// A missing file is not an error; defaults are used instead.
///
/// # Errors
///
/// Returns an error if the config file exists but cannot be read or parsed.
/// The result is not validated; call [`ClientConfig::validate`] once CLI
/// overrides have been applied.
pub fn load_config_from_path(path: Option<PathBuf>) -> Result<ClientConfig, ConfigError> {
    load_config_with_env(path, |key| std::env::var(key).ok())
}

/// Load configuration using `env` to look up environment variables
fn load_config_with_env(
    path: Option<PathBuf>,
    env: impl Fn(&str) -> Option<String>,
) -> Result<ClientConfig, ConfigError> {
    // Start with defaults
    let mut config = ClientConfig::default();

    // Try to load from file
    if let Some(ref config_path) = path {
        if config_path.exists() {
            let toml_content =
                std::fs::read_to_string(config_path).map_err(|e| ConfigError::ReadError {
                    path: config_path.clone(),
                    source: e,
                })?;

            let toml_config: ClientToml = toml::from_str(&toml_content)?;
            apply_toml_config(&mut config, &toml_config);
            config.config_file_path = Some(config_path.clone());
            config.source = ConfigSource::File;

            tracing::info!(
                path = %config_path.display(),
                "Loaded configuration from file"
            );
        } else {
            tracing::debug!(
                path = %config_path.display(),
                "Config file not found, using defaults"
            );
        }
    }

    // Apply environment variables (overrides file values)
    apply_env_config(&mut config, env);

    Ok(config)
}

/// Apply TOML configuration values to the config struct
fn apply_toml_config(config: &mut ClientConfig, toml: &ClientToml) {
    // Backend settings
    if let Some(ref url) = toml.backend.base_url {
        config.backend = BackendConfig {
            request_timeout: config.backend.request_timeout,
            ..BackendConfig::new(url.clone())
        };
    }
    if let Some(timeout) = toml.backend.request_timeout_secs {
        config.backend.request_timeout = Duration::from_secs(timeout);
    }

    // Polling settings
    if let Some(interval) = toml.polling.interval_secs {
        config.poll.interval = Duration::from_secs(interval);
    }
    if let Some(max_polls) = toml.polling.max_polls {
        config.poll.max_polls = max_polls;
    }
    if let Some(mode) = toml.polling.mode {
        config.poll.processing = mode;
    }

    // UI settings
    if let Some(locale) = toml.ui.locale {
        config.locale = locale;
    }
    if let Some(mode) = toml.ui.mode {
        config.mode = mode;
    }
    if let Some(display) = toml.ui.status_display {
        config.status_display = display;
    }
    if let Some(ref extensions) = toml.ui.allowed_extensions {
        config.allowed_extensions = FileFilter::new(extensions).extensions().to_vec();
    }
}

/// Parse an environment value, logging and ignoring bad input
fn parse_env<T, E>(key: &str, value: &str, parse: impl FnOnce(&str) -> Result<T, E>) -> Option<T>
where
    E: std::fmt::Display,
{
    match parse(value) {
        Ok(parsed) => Some(parsed),
        Err(e) => {
            tracing::warn!(key, value, error = %e, "Ignoring invalid environment variable");
            None
        }
    }
}

/// Parse a whole number of seconds that must be greater than zero
fn parse_positive_secs(value: &str) -> Result<u64, String> {
    match value.trim().parse::<u64>() {
        Ok(0) => Err("must be greater than zero".to_string()),
        Ok(secs) => Ok(secs),
        Err(e) => Err(e.to_string()),
    }
}

/// Apply environment variable overrides
fn apply_env_config(config: &mut ClientConfig, env: impl Fn(&str) -> Option<String>) {
    // Backend settings from environment
    if let Some(url) = env("DOCCHAT_BACKEND_URL") {
        config.backend = BackendConfig {
            request_timeout: config.backend.request_timeout,
            ..BackendConfig::new(url)
        };
        config.source = ConfigSource::Env;
    }
    if let Some(timeout) = env("DOCCHAT_REQUEST_TIMEOUT") {
        if let Some(secs) = parse_env("DOCCHAT_REQUEST_TIMEOUT", &timeout, parse_positive_secs) {
            config.backend.request_timeout = Duration::from_secs(secs);
            config.source = ConfigSource::Env;
        }
    }

    // Polling settings from environment
    if let Some(interval) = env("DOCCHAT_POLL_INTERVAL") {
        if let Some(secs) = parse_env("DOCCHAT_POLL_INTERVAL", &interval, parse_positive_secs) {
            config.poll.interval = Duration::from_secs(secs);
            config.source = ConfigSource::Env;
        }
    }
    if let Some(max_polls) = env("DOCCHAT_MAX_POLLS") {
        if let Some(n) = parse_env("DOCCHAT_MAX_POLLS", &max_polls, str::parse::<u32>) {
            config.poll.max_polls = n;
            config.source = ConfigSource::Env;
        }
    }
    if let Some(processing) = env("DOCCHAT_PROCESSING") {
        let parsed = match processing.trim().to_lowercase().as_str() {
            "async" => Some(ProcessingMode::Async),
            "sync" => Some(ProcessingMode::Sync),
            other => {
                tracing::warn!(value = other, "Ignoring invalid DOCCHAT_PROCESSING");
                None
            }
        };
        if let Some(mode) = parsed {
            config.poll.processing = mode;
            config.source = ConfigSource::Env;
        }
    }

    // UI settings from environment
    if let Some(locale) = env("DOCCHAT_LOCALE") {
        if let Some(locale) = parse_env("DOCCHAT_LOCALE", &locale, str::parse::<Locale>) {
            config.locale = locale;
            config.source = ConfigSource::Env;
        }
    }
    if let Some(mode) = env("DOCCHAT_MODE") {
        if let Some(mode) = parse_env("DOCCHAT_MODE", &mode, str::parse::<Mode>) {
            config.mode = mode;
            config.source = ConfigSource::Env;
        }
    }
    if let Some(display) = env("DOCCHAT_STATUS_DISPLAY") {
        let parsed = match display.trim().to_lowercase().as_str() {
            "status_line" | "line" => Some(StatusDisplay::StatusLine),
            "chat_message" | "chat" => Some(StatusDisplay::ChatMessage),
            other => {
                tracing::warn!(value = other, "Ignoring invalid DOCCHAT_STATUS_DISPLAY");
                None
            }
        };
        if let Some(display) = parsed {
            config.status_display = display;
            config.source = ConfigSource::Env;
        }
    }
}

// =============================================================================
// CLI Override Support
// =============================================================================

/// CLI argument overrides
///
/// Applied last, so they win over the environment and the config file.
#[derive(Clone, Debug, Default)]
pub struct ConfigOverrides {
    /// Override backend base URL
    pub backend_url: Option<String>,

    /// Override display language
    pub locale: Option<Locale>,

    /// Override initial request mode
    pub mode: Option<Mode>,

    /// Override poll interval (seconds)
    pub poll_interval_secs: Option<u64>,
}

impl ConfigOverrides {
    /// Create empty overrides
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Set backend URL override
    #[must_use]
    pub fn with_backend_url(mut self, url: impl Into<String>) -> Self {
        self.backend_url = Some(url.into());
        self
    }

    /// Set locale override
    #[must_use]
    pub fn with_locale(mut self, locale: Locale) -> Self {
        self.locale = Some(locale);
        self
    }

    /// Set mode override
    #[must_use]
    pub fn with_mode(mut self, mode: Mode) -> Self {
        self.mode = Some(mode);
        self
    }

    /// Set poll interval override
    #[must_use]
    pub fn with_poll_interval_secs(mut self, secs: u64) -> Self {
        self.poll_interval_secs = Some(secs);
        self
    }

    /// Apply overrides to a configuration
    pub fn apply(&self, config: &mut ClientConfig) {
        if self.backend_url.is_some()
            || self.locale.is_some()
            || self.mode.is_some()
            || self.poll_interval_secs.is_some()
        {
            config.source = ConfigSource::Cli;
        }

        if let Some(ref url) = self.backend_url {
            config.backend = BackendConfig {
                request_timeout: config.backend.request_timeout,
                ..BackendConfig::new(url.clone())
            };
        }

        if let Some(locale) = self.locale {
            config.locale = locale;
        }

        if let Some(mode) = self.mode {
            config.mode = mode;
        }

        if let Some(secs) = self.poll_interval_secs {
            config.poll.interval = Duration::from_secs(secs);
        }
    }
}

// =============================================================================
// Tests
// =============================================================================
