use std::fmt;
use std::path::PathBuf;

use shipcheck_logging::LogFormat;
use shipcheck_vision::{DEFAULT_BASE_URL, DEFAULT_MODEL};

/// ShipCheck runtime configuration.
///
/// Read once at startup and shared read-only afterwards.
#[derive(Clone)]
pub struct Config {
    /// Upstream API key; empty means not configured
    pub api_key: String,
    /// Vision model identifier
    pub model: String,
    /// Base URL of the chat-completion API
    pub api_base_url: String,
    /// Origins permitted for cross-origin requests (`*` = any)
    pub allowed_origins: Vec<String>,
    /// HTTP server bind address
    pub bind_address: String,
    /// HTTP server port
    pub port: u16,
    /// Log level
    pub log_level: String,
    pub log_format: LogFormat,
    /// Directory for rolling log files
    pub log_dir: Option<PathBuf>,
    /// Request body cap; `None` disables the limit
    pub max_upload_bytes: Option<usize>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            api_key: String::new(),
            model: DEFAULT_MODEL.to_string(),
            api_base_url: DEFAULT_BASE_URL.to_string(),
            allowed_origins: vec!["*".to_string()],
            bind_address: "0.0.0.0".to_string(),
            port: 8000,
            log_level: "info".to_string(),
            log_format: LogFormat::Json,
            log_dir: None,
            max_upload_bytes: None,
        }
    }
}

impl Config {
    /// Load configuration from environment variables with sensible defaults.
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build configuration from an arbitrary variable lookup.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let defaults = Self::default();
        Self {
            api_key: lookup("OPENAI_API_KEY").unwrap_or_default(),
            model: lookup("OPENAI_VISION_MODEL").unwrap_or(defaults.model),
            api_base_url: lookup("OPENAI_BASE_URL").unwrap_or(defaults.api_base_url),
            allowed_origins: lookup("ALLOWED_ORIGINS")
                .map(|raw| parse_origins(&raw))
                .unwrap_or(defaults.allowed_origins),
            bind_address: lookup("SHIPCHECK_BIND").unwrap_or(defaults.bind_address),
            port: lookup("SHIPCHECK_PORT")
                .and_then(|p| p.parse().ok())
                .unwrap_or(defaults.port),
            log_level: lookup("RUST_LOG").unwrap_or(defaults.log_level),
            log_format: lookup("SHIPCHECK_LOG_FORMAT")
                .and_then(|f| f.parse().ok())
                .unwrap_or(defaults.log_format),
            log_dir: lookup("SHIPCHECK_LOG_DIR")
                .filter(|d| !d.trim().is_empty())
                .map(PathBuf::from),
            max_upload_bytes: lookup("SHIPCHECK_MAX_UPLOAD_BYTES").and_then(|n| n.parse().ok()),
        }
    }

    pub fn has_api_key(&self) -> bool {
        !self.api_key.trim().is_empty()
    }

    pub fn allows_any_origin(&self) -> bool {
        self.allowed_origins.iter().any(|o| o == "*")
    }
}

fn parse_origins(raw: &str) -> Vec<String> {
    raw.split(',')
        .map(str::trim)
        .filter(|o| !o.is_empty())
        .map(String::from)
        .collect()
}

impl fmt::Debug for Config {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Config")
            .field("api_key", &if self.has_api_key() { "<set>" } else { "<unset>" })
            .field("model", &self.model)
            .field("api_base_url", &self.api_base_url)
            .field("allowed_origins", &self.allowed_origins)
            .field("bind_address", &self.bind_address)
            .field("port", &self.port)
            .field("log_level", &self.log_level)
            .field("log_format", &self.log_format)
            .field("log_dir", &self.log_dir)
            .field("max_upload_bytes", &self.max_upload_bytes)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;

    use super::*;

    fn config_with(vars: &[(&str, &str)]) -> Config {
        let env: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        Config::from_lookup(|key| env.get(key).cloned())
    }

    #[test]
    fn defaults_when_environment_is_empty() {
        let config = config_with(&[]);
        assert!(!config.has_api_key());
        assert_eq!(config.model, "gpt-4o-mini");
        assert_eq!(config.api_base_url, "https://api.openai.com/v1");
        assert!(config.allows_any_origin());
        assert_eq!(config.port, 8000);
        assert_eq!(config.log_format, LogFormat::Json);
        assert!(config.log_dir.is_none());
        assert!(config.max_upload_bytes.is_none());
    }

    #[test]
    fn reads_overrides() {
        let config = config_with(&[
            ("OPENAI_API_KEY", "sk-live"),
            ("OPENAI_VISION_MODEL", "gpt-4o"),
            ("ALLOWED_ORIGINS", " https://a.example , https://b.example,,"),
            ("SHIPCHECK_PORT", "9100"),
            ("SHIPCHECK_LOG_FORMAT", "pretty"),
            ("SHIPCHECK_MAX_UPLOAD_BYTES", "1048576"),
        ]);
        assert!(config.has_api_key());
        assert_eq!(config.model, "gpt-4o");
        assert_eq!(
            config.allowed_origins,
            vec!["https://a.example".to_string(), "https://b.example".to_string()]
        );
        assert!(!config.allows_any_origin());
        assert_eq!(config.port, 9100);
        assert_eq!(config.log_format, LogFormat::Pretty);
        assert_eq!(config.max_upload_bytes, Some(1_048_576));
    }

    #[test]
    fn blank_key_counts_as_missing() {
        assert!(!config_with(&[("OPENAI_API_KEY", "   ")]).has_api_key());
    }

    #[test]
    fn bad_port_falls_back_to_default() {
        assert_eq!(config_with(&[("SHIPCHECK_PORT", "eighty")]).port, 8000);
    }

    #[test]
    fn debug_output_hides_key() {
        let config = config_with(&[("OPENAI_API_KEY", "sk-secret-value")]);
        let printed = format!("{config:?}");
        assert!(!printed.contains("sk-secret-value"));
        assert!(printed.contains("<set>"));
    }
}
