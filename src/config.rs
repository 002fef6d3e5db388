//! Configuration management for the `CloseEscape` service
//!
//! Handles loading configuration from files and environment variables,
//! and validates all settings before the server starts.

use crate::CloseEscapeError;
use anyhow::{Context, Result};
use config::{Config, Environment, File};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Environment variable consulted for the Gemini key when config has none
pub const GEMINI_API_KEY_ENV: &str = "GEMINI_API_KEY";

/// Root configuration structure for the `CloseEscape` service
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct CloseEscapeConfig {
    /// Generative model configuration
    pub gemini: GeminiConfig,
    /// Reverse geocoding configuration
    pub geocoding: GeocodingConfig,
    /// HTTP server configuration
    pub server: ServerConfig,
    /// Suggestion defaults
    pub suggestions: SuggestionsConfig,
    /// Logging configuration
    pub logging: LoggingConfig,
}

/// Gemini API configuration settings
#[derive(Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct GeminiConfig {
    /// API key, read at process start. Never hard-coded.
    pub api_key: Option<String>,
    /// Model name
    pub model: String,
    /// Base URL for the generative language API
    pub base_url: String,
    /// Client-side request timeout in seconds; unset means none
    pub timeout_seconds: Option<u64>,
}

// Keeps the key out of logs.
impl std::fmt::Debug for GeminiConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("GeminiConfig")
            .field("api_key", &self.api_key.as_ref().map(|_| "<redacted>"))
            .field("model", &self.model)
            .field("base_url", &self.base_url)
            .field("timeout_seconds", &self.timeout_seconds)
            .finish()
    }
}

/// Reverse geocoding configuration settings
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct GeocodingConfig {
    /// Resolve coordinate-only requests to a place name
    pub enabled: bool,
    /// Base URL of the Nominatim-compatible service
    pub base_url: String,
    /// User agent sent with every lookup
    pub user_agent: String,
    /// Lookup timeout in seconds
    pub timeout_seconds: u64,
}

/// HTTP server configuration settings
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    /// Interface to bind
    pub host: String,
    /// Port to bind
    pub port: u16,
    /// Directory with prebuilt static pages served for unmatched routes
    pub static_dir: Option<String>,
    /// Maximum request body size in KB
    pub body_limit_kb: usize,
    /// Transport-level request timeout in seconds; unset means none
    pub request_timeout_seconds: Option<u64>,
    /// PEM certificate chain for TLS
    pub tls_cert_path: Option<String>,
    /// PEM private key for TLS
    pub tls_key_path: Option<String>,
}

/// Suggestion defaults
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SuggestionsConfig {
    /// Number of destinations requested from the model
    pub count: u32,
    /// Currency symbol used in prompts and fallback costs
    pub currency_symbol: String,
}

/// Logging configuration settings
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// Log level (error, warn, info, debug, trace)
    pub level: String,
    /// Log format (pretty or json)
    pub format: String,
    /// OTLP/HTTP collector endpoint; unset disables export
    pub otlp_endpoint: Option<String>,
}

// Default value functions
fn default_gemini_model() -> String {
    "gemini-2.0-flash".to_string()
}

fn default_gemini_base_url() -> String {
    "https://generativelanguage.googleapis.com/v1beta".to_string()
}

fn default_geocoding_base_url() -> String {
    "https://nominatim.openstreetmap.org".to_string()
}

fn default_user_agent() -> String {
    format!("CloseEscape/{}", env!("CARGO_PKG_VERSION"))
}

fn default_geocoding_timeout() -> u64 {
    10
}

fn default_host() -> String {
    "0.0.0.0".to_string()
}

fn default_port() -> u16 {
    3000
}

fn default_body_limit_kb() -> usize {
    64
}

fn default_suggestion_count() -> u32 {
    6
}

fn default_currency_symbol() -> String {
    "₹".to_string()
}

fn default_log_level() -> String {
    "info".to_string()
}

fn default_log_format() -> String {
    "pretty".to_string()
}

impl Default for GeminiConfig {
    fn default() -> Self {
        Self {
            api_key: None,
            model: default_gemini_model(),
            base_url: default_gemini_base_url(),
            timeout_seconds: None,
        }
    }
}

impl Default for GeocodingConfig {
    fn default() -> Self {
        Self {
            enabled: false,
            base_url: default_geocoding_base_url(),
            user_agent: default_user_agent(),
            timeout_seconds: default_geocoding_timeout(),
        }
    }
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
            static_dir: None,
            body_limit_kb: default_body_limit_kb(),
            request_timeout_seconds: None,
            tls_cert_path: None,
            tls_key_path: None,
        }
    }
}

impl Default for SuggestionsConfig {
    fn default() -> Self {
        Self {
            count: default_suggestion_count(),
            currency_symbol: default_currency_symbol(),
        }
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            format: default_log_format(),
            otlp_endpoint: None,
        }
    }
}

impl CloseEscapeConfig {
    /// Load configuration from a TOML file (explicit path, else the user
    /// config dir, else `./config.toml`) and environment variables
    pub fn load_from_path(config_path: Option<PathBuf>) -> Result<Self> {
        let mut builder = Config::builder();

        let config_file = config_path.unwrap_or_else(|| {
            Self::get_config_path()
                .filter(|path| path.exists())
                .unwrap_or_else(|| PathBuf::from("config.toml"))
        });

        if config_file.exists() {
            builder = builder.add_source(
                File::from(config_file.clone())
                    .required(false)
                    .format(config::FileFormat::Toml),
            );
        }

        // CLOSEESCAPE_GEMINI__MODEL=... style overrides
        builder = builder.add_source(
            Environment::with_prefix("CLOSEESCAPE")
                .prefix_separator("_")
                .separator("__")
                .try_parsing(true),
        );

        let settings = builder
            .build()
            .with_context(|| "Failed to build configuration")?;

        let mut config: CloseEscapeConfig = settings
            .try_deserialize()
            .with_context(|| "Failed to deserialize configuration")?;

        config.apply_secret_from_env();
        config.apply_defaults();
        config.validate()?;

        Ok(config)
    }

    /// Get the default configuration file path
    #[must_use]
    pub fn get_config_path() -> Option<PathBuf> {
        dirs::config_dir().map(|dir| dir.join("closeescape").join("config.toml"))
    }

    /// Fill the Gemini key from `GEMINI_API_KEY` when no other source set it
    pub fn apply_secret_from_env(&mut self) {
        if self.gemini.api_key.is_none() {
            self.gemini.api_key = std::env::var(GEMINI_API_KEY_ENV)
                .ok()
                .filter(|key| !key.trim().is_empty());
        }
    }

    /// Apply default values to missing configuration fields
    pub fn apply_defaults(&mut self) {
        if self.gemini.model.is_empty() {
            self.gemini.model = default_gemini_model();
        }
        if self.gemini.base_url.is_empty() {
            self.gemini.base_url = default_gemini_base_url();
        }
        if self.geocoding.base_url.is_empty() {
            self.geocoding.base_url = default_geocoding_base_url();
        }
        if self.geocoding.user_agent.is_empty() {
            self.geocoding.user_agent = default_user_agent();
        }
        if self.geocoding.timeout_seconds == 0 {
            self.geocoding.timeout_seconds = default_geocoding_timeout();
        }
        if self.server.host.is_empty() {
            self.server.host = default_host();
        }
        if self.server.body_limit_kb == 0 {
            self.server.body_limit_kb = default_body_limit_kb();
        }
        if self.suggestions.currency_symbol.is_empty() {
            self.suggestions.currency_symbol = default_currency_symbol();
        }
        if self.logging.level.is_empty() {
            self.logging.level = default_log_level();
        }
        if self.logging.format.is_empty() {
            self.logging.format = default_log_format();
        }
    }

    /// Validate all configuration settings
    pub fn validate(&self) -> Result<()> {
        self.validate_api_keys()?;
        self.validate_numeric_ranges()?;
        self.validate_string_values()?;
        self.validate_tls()?;
        Ok(())
    }

    /// Validate API keys and credentials
    ///
    /// A missing key is allowed here: the server still starts and answers
    /// every suggestion call with a configuration error.
    pub fn validate_api_keys(&self) -> Result<()> {
        if let Some(api_key) = &self.gemini.api_key {
            if api_key.trim().is_empty() {
                return Err(CloseEscapeError::config(
                    "Gemini API key cannot be empty if provided. Either remove it or provide a valid key.",
                )
                .into());
            }

            if api_key.len() < 8 {
                return Err(CloseEscapeError::config(
                    "Gemini API key appears to be invalid (too short). Please check your API key.",
                )
                .into());
            }
        }

        Ok(())
    }

    /// Validate numeric configuration ranges
    fn validate_numeric_ranges(&self) -> Result<()> {
        if self.server.port == 0 {
            return Err(CloseEscapeError::config("Server port cannot be 0").into());
        }

        if !(1..=20).contains(&self.suggestions.count) {
            return Err(
                CloseEscapeError::config("Suggestion count must be between 1 and 20").into(),
            );
        }

        if self.gemini.timeout_seconds.is_some_and(|t| t == 0 || t > 600) {
            return Err(CloseEscapeError::config(
                "Gemini timeout must be between 1 and 600 seconds",
            )
            .into());
        }

        if self.geocoding.timeout_seconds > 60 {
            return Err(
                CloseEscapeError::config("Geocoding timeout cannot exceed 60 seconds").into(),
            );
        }

        if self.server.body_limit_kb > 10_240 {
            return Err(
                CloseEscapeError::config("Request body limit cannot exceed 10240 KB").into(),
            );
        }

        Ok(())
    }

    /// Validate string configuration values
    fn validate_string_values(&self) -> Result<()> {
        let valid_log_levels = ["error", "warn", "info", "debug", "trace"];
        if !valid_log_levels.contains(&self.logging.level.as_str()) {
            return Err(CloseEscapeError::config(format!(
                "Invalid log level '{}'. Must be one of: {}",
                self.logging.level,
                valid_log_levels.join(", ")
            ))
            .into());
        }

        let valid_log_formats = ["pretty", "json"];
        if !valid_log_formats.contains(&self.logging.format.as_str()) {
            return Err(CloseEscapeError::config(format!(
                "Invalid log format '{}'. Must be one of: {}",
                self.logging.format,
                valid_log_formats.join(", ")
            ))
            .into());
        }

        for (name, url) in [
            ("Gemini API base URL", &self.gemini.base_url),
            ("Geocoding base URL", &self.geocoding.base_url),
        ] {
            if !is_http_url(url) {
                return Err(CloseEscapeError::config(format!(
                    "{name} must be a valid HTTP or HTTPS URL"
                ))
                .into());
            }
        }

        if let Some(endpoint) = &self.logging.otlp_endpoint {
            if !is_http_url(endpoint) {
                return Err(CloseEscapeError::config(
                    "OTLP endpoint must be a valid HTTP or HTTPS URL",
                )
                .into());
            }
        }

        Ok(())
    }

    /// Both TLS paths or neither
    fn validate_tls(&self) -> Result<()> {
        match (&self.server.tls_cert_path, &self.server.tls_key_path) {
            (Some(_), None) | (None, Some(_)) => Err(CloseEscapeError::config(
                "TLS requires both tls_cert_path and tls_key_path",
            )
            .into()),
            _ => Ok(()),
        }
    }
}

fn is_http_url(url: &str) -> bool {
    url.starts_with("http://") || url.starts_with("https://")
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::{Mutex, PoisonError};

    #[test]
    fn test_default_config() {
        let config = CloseEscapeConfig::default();
        assert_eq!(config.gemini.model, "gemini-2.0-flash");
        assert_eq!(
            config.gemini.base_url,
            "https://generativelanguage.googleapis.com/v1beta"
        );
        assert!(config.gemini.api_key.is_none());
        assert!(config.gemini.timeout_seconds.is_none());
        assert!(!config.geocoding.enabled);
        assert_eq!(config.server.port, 3000);
        assert_eq!(config.suggestions.count, 6);
        assert_eq!(config.suggestions.currency_symbol, "₹");
        assert_eq!(config.logging.level, "info");
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_config_validation_missing_api_key() {
        let config = CloseEscapeConfig::default();
        assert!(config.validate_api_keys().is_ok());
    }

    #[test]
    fn test_config_validation_short_api_key() {
        let mut config = CloseEscapeConfig::default();
        config.gemini.api_key = Some("abc".to_string());
        let result = config.validate_api_keys();
        assert!(result.is_err());
        assert!(result.unwrap_err().to_string().contains("too short"));
    }

    #[test]
    fn test_config_validation_invalid_log_level() {
        let mut config = CloseEscapeConfig::default();
        config.logging.level = "invalid".to_string();
        let result = config.validate();
        assert!(result.is_err());
        assert!(result.unwrap_err().to_string().contains("Invalid log level"));
    }

    #[test]
    fn test_config_validation_numeric_ranges() {
        let mut config = CloseEscapeConfig::default();
        config.suggestions.count = 0;
        let result = config.validate();
        assert!(result.is_err());
        assert!(result.unwrap_err().to_string().contains("between 1 and 20"));
    }

    #[test]
    fn test_config_validation_base_url() {
        let mut config = CloseEscapeConfig::default();
        config.gemini.base_url = "ftp://example.com".to_string();
        let result = config.validate();
        assert!(result.is_err());
        assert!(result.unwrap_err().to_string().contains("Gemini API base URL"));
    }

    #[test]
    fn test_config_validation_half_tls() {
        let mut config = CloseEscapeConfig::default();
        config.server.tls_cert_path = Some("cert.pem".to_string());
        let result = config.validate();
        assert!(result.is_err());
        assert!(result.unwrap_err().to_string().contains("TLS requires both"));
    }

    #[test]
    fn test_apply_defaults_fills_blanks() {
        let mut config = CloseEscapeConfig::default();
        config.gemini.model.clear();
        config.suggestions.currency_symbol.clear();
        config.apply_defaults();
        assert_eq!(config.gemini.model, "gemini-2.0-flash");
        assert_eq!(config.suggestions.currency_symbol, "₹");
    }

    #[test]
    fn test_debug_redacts_api_key() {
        let mut config = CloseEscapeConfig::default();
        config.gemini.api_key = Some("super-secret-key-123".to_string());
        let printed = format!("{config:?}");
        assert!(!printed.contains("super-secret-key-123"));
        assert!(printed.contains("<redacted>"));
    }

    // Tests touching process environment run one at a time.
    static ENV_LOCK: Mutex<()> = Mutex::new(());

    fn set_env(key: &str, value: Option<&str>) {
        // SAFETY: callers hold ENV_LOCK
        unsafe {
            match value {
                Some(value) => std::env::set_var(key, value),
                None => std::env::remove_var(key),
            }
        }
    }

    fn missing_config_file() -> PathBuf {
        std::env::temp_dir().join("closeescape-no-such-config.toml")
    }

    #[test]
    fn test_api_key_from_gemini_env_var() {
        let _guard = ENV_LOCK.lock().unwrap_or_else(PoisonError::into_inner);
        set_env(GEMINI_API_KEY_ENV, Some("gemini-env-key-abcdef"));

        let mut config = CloseEscapeConfig::default();
        config.apply_secret_from_env();
        assert_eq!(config.gemini.api_key.as_deref(), Some("gemini-env-key-abcdef"));

        let mut preset = CloseEscapeConfig::default();
        preset.gemini.api_key = Some("configured-key-abcdef".to_string());
        preset.apply_secret_from_env();
        assert_eq!(preset.gemini.api_key.as_deref(), Some("configured-key-abcdef"));

        set_env(GEMINI_API_KEY_ENV, Some("   "));
        let mut blank = CloseEscapeConfig::default();
        blank.apply_secret_from_env();
        assert!(blank.gemini.api_key.is_none());

        set_env(GEMINI_API_KEY_ENV, None);
    }

    #[test]
    fn test_prefixed_env_key_wins_over_gemini_env_var() {
        let _guard = ENV_LOCK.lock().unwrap_or_else(PoisonError::into_inner);
        set_env(GEMINI_API_KEY_ENV, Some("gemini-env-key-abcdef"));
        set_env("CLOSEESCAPE_GEMINI__API_KEY", Some("prefixed-key-abcdef"));

        let config = CloseEscapeConfig::load_from_path(Some(missing_config_file())).unwrap();
        assert_eq!(config.gemini.api_key.as_deref(), Some("prefixed-key-abcdef"));

        set_env("CLOSEESCAPE_GEMINI__API_KEY", None);
        let config = CloseEscapeConfig::load_from_path(Some(missing_config_file())).unwrap();
        assert_eq!(config.gemini.api_key.as_deref(), Some("gemini-env-key-abcdef"));

        set_env(GEMINI_API_KEY_ENV, None);
        let config = CloseEscapeConfig::load_from_path(Some(missing_config_file())).unwrap();
        assert!(config.gemini.api_key.is_none());
    }

    #[test]
    fn test_load_from_toml_file() {
        let _guard = ENV_LOCK.lock().unwrap_or_else(PoisonError::into_inner);
        let dir = std::env::temp_dir().join(format!("closeescape-config-{}", std::process::id()));
        std::fs::create_dir_all(&dir).unwrap();
        let path = dir.join("config.toml");
        std::fs::write(
            &path,
            "[server]\nport = 8081\n\n[suggestions]\ncount = 4\ncurrency_symbol = \"$\"\n",
        )
        .unwrap();

        let config = CloseEscapeConfig::load_from_path(Some(path)).unwrap();
        assert_eq!(config.server.port, 8081);
        assert_eq!(config.suggestions.count, 4);
        assert_eq!(config.suggestions.currency_symbol, "$");
        assert_eq!(config.gemini.model, "gemini-2.0-flash");

        std::fs::remove_dir_all(dir).unwrap();
    }

    #[test]
    fn test_config_path_generation() {
        if let Some(path) = CloseEscapeConfig::get_config_path() {
            assert!(path.to_string_lossy().contains("closeescape"));
            assert!(path.to_string_lossy().contains("config.toml"));
        }
    }
}
