//! Wizard and workspace settings
//!
//! Settings come from a TOML file with optional environment overrides:
//!
//! ```toml
//! [client]
//! api_url = "https://sheetstorm.example/api/v1"
//! http_timeout_secs = 30
//!
//! [import]
//! default_entity = "timeline_events"
//! missing_values = "falsy"
//!
//! [wizard]
//! success_close_delay_ms = 2000
//!
//! [log]
//! level = "info"
//! json = false
//! ```

use serde::{Deserialize, Serialize};
use sheetstorm_client::ClientConfig;
use sheetstorm_import::{EntityType, ImportConfig};
use std::path::{Path, PathBuf};
use std::time::Duration;

/// Environment variable for the API root
pub const ENV_API_URL: &str = "SHEETSTORM_API_URL";
/// Environment variable for the bearer token
pub const ENV_API_TOKEN: &str = "SHEETSTORM_API_TOKEN";
/// Environment variable for the request timeout in seconds
pub const ENV_HTTP_TIMEOUT: &str = "HTTP_TIMEOUT";
/// Environment variable for the log level
pub const ENV_LOG_LEVEL: &str = "LOG_LEVEL";
/// Environment variable for the default target entity
pub const ENV_DEFAULT_ENTITY: &str = "SHEETSTORM_DEFAULT_ENTITY";

/// Settings error
#[derive(Debug, thiserror::Error)]
pub enum SettingsError {
    #[error("cannot read settings file {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("invalid settings: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("invalid value for {var}: {value:?}")]
    InvalidEnv { var: &'static str, value: String },
}

/// Wizard behaviour
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct WizardConfig {
    /// Delay between a successful submit and the automatic reset
    pub success_close_delay_ms: u64,
}

impl WizardConfig {
    /// Create default configuration
    #[inline]
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// With auto-close delay
    #[inline]
    #[must_use]
    pub fn with_success_close_delay(mut self, delay: Duration) -> Self {
        self.success_close_delay_ms = u64::try_from(delay.as_millis()).unwrap_or(u64::MAX);
        self
    }

    /// Auto-close delay
    #[inline]
    #[must_use]
    pub fn success_close_delay(&self) -> Duration {
        Duration::from_millis(self.success_close_delay_ms)
    }
}

impl Default for WizardConfig {
    fn default() -> Self {
        Self {
            success_close_delay_ms: 2000,
        }
    }
}

/// Log output
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct LogConfig {
    /// Filter used when `RUST_LOG` is unset
    pub level: String,
    /// Emit JSON lines instead of human-readable output
    pub json: bool,
}

impl LogConfig {
    /// With filter level
    #[inline]
    #[must_use]
    pub fn with_level(mut self, level: impl Into<String>) -> Self {
        self.level = level.into();
        self
    }

    /// With JSON output
    #[inline]
    #[must_use]
    pub fn with_json(mut self, json: bool) -> Self {
        self.json = json;
        self
    }
}

impl Default for LogConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            json: false,
        }
    }
}

/// All settings
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    pub client: ClientConfig,
    pub import: ImportConfig,
    pub wizard: WizardConfig,
    pub log: LogConfig,
}

impl Settings {
    /// Parse settings from TOML; missing sections take defaults
    ///
    /// # Errors
    /// [`SettingsError::Parse`] on malformed TOML or unknown values.
    pub fn from_toml_str(s: &str) -> Result<Self, SettingsError> {
        Ok(toml::from_str(s)?)
    }

    /// Read settings from a TOML file
    ///
    /// # Errors
    /// [`SettingsError::Io`] if the file cannot be read, `Parse` if it is malformed.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, SettingsError> {
        let path = path.as_ref();
        let text = std::fs::read_to_string(path).map_err(|source| SettingsError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_toml_str(&text)
    }

    /// Overlay values from the process environment
    ///
    /// # Errors
    /// [`SettingsError::InvalidEnv`] if a variable is set but unparsable.
    pub fn apply_env(self) -> Result<Self, SettingsError> {
        self.apply_env_from(|var| std::env::var(var).ok())
    }

    /// Overlay values from `lookup`
    ///
    /// # Errors
    /// [`SettingsError::InvalidEnv`] if a variable is set but unparsable.
    pub fn apply_env_from<F>(mut self, lookup: F) -> Result<Self, SettingsError>
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(url) = lookup(ENV_API_URL) {
            self.client.api_url = url;
        }
        if let Some(token) = lookup(ENV_API_TOKEN).filter(|t| !t.is_empty()) {
            self.client.api_token = Some(token);
        }
        if let Some(value) = lookup(ENV_HTTP_TIMEOUT) {
            self.client.http_timeout_secs =
                value.trim().parse().map_err(|_| SettingsError::InvalidEnv {
                    var: ENV_HTTP_TIMEOUT,
                    value: value.clone(),
                })?;
        }
        if let Some(level) = lookup(ENV_LOG_LEVEL) {
            self.log.level = level;
        }
        if let Some(value) = lookup(ENV_DEFAULT_ENTITY) {
            self.import.default_entity =
                value
                    .trim()
                    .parse::<EntityType>()
                    .map_err(|_| SettingsError::InvalidEnv {
                        var: ENV_DEFAULT_ENTITY,
                        value: value.clone(),
                    })?;
        }
        Ok(self)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use sheetstorm_import::MissingValuePolicy;
    use std::collections::HashMap;

    fn env(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |var| map.get(var).cloned()
    }

    #[test]
    fn empty_toml_is_default() {
        assert_eq!(Settings::from_toml_str("").unwrap(), Settings::default());
    }

    #[test]
    fn parses_sections() {
        let settings = Settings::from_toml_str(
            r#"
            [client]
            api_url = "https://ir.example/api/v1"

            [import]
            default_entity = "hosts"
            missing_values = "blank"

            [wizard]
            success_close_delay_ms = 500

            [log]
            json = true
            "#,
        )
        .unwrap();

        assert_eq!(settings.client.api_url, "https://ir.example/api/v1");
        assert_eq!(settings.client.http_timeout_secs, 30);
        assert_eq!(settings.import.default_entity, EntityType::Hosts);
        assert_eq!(settings.import.missing_values, MissingValuePolicy::Blank);
        assert_eq!(settings.wizard.success_close_delay(), Duration::from_millis(500));
        assert!(settings.log.json);
        assert_eq!(settings.log.level, "info");
    }

    #[test]
    fn unknown_entity_is_rejected() {
        let err = Settings::from_toml_str("[import]\ndefault_entity = \"printers\"").unwrap_err();
        assert!(matches!(err, SettingsError::Parse(_)));
    }

    #[test]
    fn env_overrides_file() {
        let settings = Settings::default()
            .apply_env_from(env(&[
                (ENV_API_URL, "http://backend:5000/api/v1"),
                (ENV_API_TOKEN, "secret"),
                (ENV_HTTP_TIMEOUT, "5"),
                (ENV_LOG_LEVEL, "debug"),
                (ENV_DEFAULT_ENTITY, "malware"),
            ]))
            .unwrap();

        assert_eq!(settings.client.api_url, "http://backend:5000/api/v1");
        assert_eq!(settings.client.api_token.as_deref(), Some("secret"));
        assert_eq!(settings.client.timeout(), Duration::from_secs(5));
        assert_eq!(settings.log.level, "debug");
        assert_eq!(settings.import.default_entity, EntityType::Malware);
    }

    #[test]
    fn empty_token_is_ignored() {
        let settings = Settings::default()
            .apply_env_from(env(&[(ENV_API_TOKEN, "")]))
            .unwrap();
        assert!(settings.client.api_token.is_none());
    }

    #[test]
    fn bad_env_values_are_errors() {
        let err = Settings::default()
            .apply_env_from(env(&[(ENV_HTTP_TIMEOUT, "soon")]))
            .unwrap_err();
        assert!(matches!(err, SettingsError::InvalidEnv { var: ENV_HTTP_TIMEOUT, .. }));

        let err = Settings::default()
            .apply_env_from(env(&[(ENV_DEFAULT_ENTITY, "printers")]))
            .unwrap_err();
        assert!(matches!(err, SettingsError::InvalidEnv { var: ENV_DEFAULT_ENTITY, .. }));
    }

    #[test]
    fn loads_from_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("sheetstorm.toml");
        std::fs::write(&path, "[wizard]\nsuccess_close_delay_ms = 0\n").unwrap();

        let settings = Settings::load(&path).unwrap();
        assert_eq!(settings.wizard.success_close_delay(), Duration::ZERO);

        let err = Settings::load(dir.path().join("missing.toml")).unwrap_err();
        assert!(matches!(err, SettingsError::Io { .. }));
    }
}
