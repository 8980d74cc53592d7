//! Client Configuration
//!
//! Settings for one chat client: where the research backend lives, how long
//! to wait for it, and what the market panel watches.
//!
//! # Configuration Priority
//!
//! Values are layered with the following priority (highest first):
//! 1. CLI arguments ([`ConfigOverrides`], applied by the binary)
//! 2. Environment variables (`RESEARCH_*`)
//! 3. TOML configuration file
//! 4. Default values
//!
//! The file lives at `$XDG_CONFIG_HOME/research-chat/config.toml`
//! (typically `~/.config/research-chat/config.toml`). A missing file is not
//! an error.
//!
//! # Example Configuration
//!
//! ```toml
//! backend_url = "https://research.example.com"
//! request_timeout_secs = 90
//! greet_on_start = true
//!
//! [market]
//! symbols = ["BTC", "ETH"]
//! refresh_secs = 30
//! ```

use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Default backend address
pub const DEFAULT_BACKEND_URL: &str = "http://localhost:8001";

/// Default per-request timeout
pub const DEFAULT_REQUEST_TIMEOUT: Duration = Duration::from_secs(120);

/// Default market panel refresh interval
pub const DEFAULT_MARKET_REFRESH: Duration = Duration::from_secs(60);

/// Symbols shown in the market panel when nothing is configured
pub const DEFAULT_MARKET_SYMBOLS: [&str; 3] = ["BTC", "ETH", "SOL"];

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

/// Where the effective configuration came from (highest layer that set a value)
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum ConfigSource {
    /// Command-line argument
    Cli,
    /// Environment variable
    Env,
    /// TOML configuration file
    File,
    /// Built-in default
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

/// Market section of the TOML file
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct MarketToml {
    /// Symbols to watch
    pub symbols: Option<Vec<String>>,
    /// Refresh interval in seconds
    pub refresh_secs: Option<u64>,
}

/// Root of the TOML file
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct ChatToml {
    /// Research backend base URL
    pub backend_url: Option<String>,
    /// Per-request timeout in seconds
    pub request_timeout_secs: Option<u64>,
    /// Whether to show the welcome message at startup
    pub greet_on_start: Option<bool>,
    /// Log file path
    pub log_file: Option<PathBuf>,
    /// Market panel settings
    pub market: MarketToml,
}

/// Effective client configuration
#[derive(Clone, Debug)]
pub struct ChatConfig {
    /// Research backend base URL
    pub backend_url: String,
    /// Per-request timeout for chat calls
    pub request_timeout: Duration,
    /// Whether the surface shows the welcome message at startup
    pub greet_on_start: bool,
    /// Symbols for the market panel
    pub market_symbols: Vec<String>,
    /// Market panel refresh interval
    pub market_refresh: Duration,
    /// Write logs here instead of stderr
    pub log_file: Option<PathBuf>,
    /// Path of the config file that was loaded (if any)
    pub config_file_path: Option<PathBuf>,
    source: ConfigSource,
}

impl Default for ChatConfig {
    fn default() -> Self {
        Self {
            backend_url: DEFAULT_BACKEND_URL.to_string(),
            request_timeout: DEFAULT_REQUEST_TIMEOUT,
            greet_on_start: true,
            market_symbols: DEFAULT_MARKET_SYMBOLS
                .iter()
                .map(|s| (*s).to_string())
                .collect(),
            market_refresh: DEFAULT_MARKET_REFRESH,
            log_file: None,
            config_file_path: None,
            source: ConfigSource::Default,
        }
    }
}

impl ChatConfig {
    /// Defaults overlaid with environment variables (no file)
    #[must_use]
    pub fn from_env() -> Self {
        let mut config = Self::default();
        config.apply_env(|key| std::env::var(key).ok());
        config
    }

    /// Load from all sources except the CLI
    ///
    /// `path` overrides the default file location. A missing file falls back
    /// to defaults; a file that exists but cannot be read or parsed is an
    /// error.
    pub fn load(path: Option<&Path>) -> Result<Self, ConfigError> {
        let path = path.map(Path::to_path_buf).or_else(default_config_path);
        let mut config = Self::default();

        if let Some(ref config_path) = path {
            if config_path.exists() {
                let content =
                    std::fs::read_to_string(config_path).map_err(|e| ConfigError::ReadError {
                        path: config_path.clone(),
                        source: e,
                    })?;
                let file: ChatToml = toml::from_str(&content)?;
                config.apply_toml(&file);
                config.config_file_path = Some(config_path.clone());
            }
        }

        config.apply_env(|key| std::env::var(key).ok());
        config.validate()?;
        Ok(config)
    }

    /// Primary source of this configuration
    #[must_use]
    pub fn source(&self) -> ConfigSource {
        self.source
    }

    /// Log where this configuration came from
    ///
    /// Call once logging is installed; [`ChatConfig::load`] usually runs
    /// before a subscriber exists.
    pub fn log_loaded(&self) {
        match &self.config_file_path {
            Some(path) => tracing::info!(
                path = %path.display(),
                source = %self.source,
                backend = %self.backend_url,
                "Loaded configuration from file"
            ),
            None => tracing::info!(
                source = %self.source,
                backend = %self.backend_url,
                "No config file found, using defaults and environment"
            ),
        }
    }

    /// Check value constraints
    pub fn validate(&self) -> Result<(), ConfigError> {
        let url = self.backend_url.trim();
        if url.is_empty() {
            return Err(ConfigError::ValidationError(
                "backend_url must not be empty".to_string(),
            ));
        }
        if !(url.starts_with("http://") || url.starts_with("https://")) {
            return Err(ConfigError::ValidationError(format!(
                "backend_url must start with http:// or https://, got {url}"
            )));
        }
        if self.request_timeout.is_zero() {
            return Err(ConfigError::ValidationError(
                "request timeout must be greater than zero".to_string(),
            ));
        }
        Ok(())
    }

    fn apply_toml(&mut self, file: &ChatToml) {
        self.source = ConfigSource::File;

        if let Some(ref url) = file.backend_url {
            self.backend_url = url.clone();
        }
        if let Some(secs) = file.request_timeout_secs {
            self.request_timeout = Duration::from_secs(secs);
        }
        if let Some(greet) = file.greet_on_start {
            self.greet_on_start = greet;
        }
        if let Some(ref log_file) = file.log_file {
            self.log_file = Some(log_file.clone());
        }
        if let Some(ref symbols) = file.market.symbols {
            self.market_symbols = normalize_symbols(symbols.iter().map(String::as_str));
        }
        if let Some(secs) = file.market.refresh_secs {
            self.market_refresh = Duration::from_secs(secs);
        }
    }

    /// Overlay `RESEARCH_*` variables read through `lookup`
    fn apply_env(&mut self, lookup: impl Fn(&str) -> Option<String>) {
        if let Some(url) = lookup("RESEARCH_BACKEND_URL") {
            self.backend_url = url;
            self.source = ConfigSource::Env;
        }
        if let Some(timeout) = lookup("RESEARCH_REQUEST_TIMEOUT_SECS") {
            if let Ok(secs) = timeout.parse::<u64>() {
                self.request_timeout = Duration::from_secs(secs);
                self.source = ConfigSource::Env;
            }
        }
        if let Some(greet) = lookup("RESEARCH_GREET") {
            self.greet_on_start = greet != "0" && greet.to_lowercase() != "false";
            self.source = ConfigSource::Env;
        }
        if let Some(symbols) = lookup("RESEARCH_MARKET_SYMBOLS") {
            self.market_symbols = normalize_symbols(symbols.split(','));
            self.source = ConfigSource::Env;
        }
        if let Some(refresh) = lookup("RESEARCH_MARKET_REFRESH_SECS") {
            if let Ok(secs) = refresh.parse::<u64>() {
                self.market_refresh = Duration::from_secs(secs);
                self.source = ConfigSource::Env;
            }
        }
        if let Some(path) = lookup("RESEARCH_LOG_FILE") {
            self.log_file = Some(PathBuf::from(path));
            self.source = ConfigSource::Env;
        }
    }
}

/// Trimmed, upper-cased, non-empty symbols in their given order
fn normalize_symbols<'a>(symbols: impl Iterator<Item = &'a str>) -> Vec<String> {
    symbols
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(str::to_uppercase)
        .collect()
}

/// Get the default configuration file path
#[must_use]
pub fn default_config_path() -> Option<PathBuf> {
    dirs::config_dir().map(|p| p.join("research-chat").join("config.toml"))
}

/// Command-line overrides, applied after [`ChatConfig::load`]
#[derive(Clone, Debug, Default)]
pub struct ConfigOverrides {
    /// Backend URL override
    pub backend_url: Option<String>,
    /// Greeting override
    pub greet_on_start: Option<bool>,
}

impl ConfigOverrides {
    /// Create an empty set of overrides
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Set backend URL override
    #[must_use]
    pub fn with_backend_url(mut self, url: String) -> Self {
        self.backend_url = Some(url);
        self
    }

    /// Set greeting override
    #[must_use]
    pub fn with_greet_on_start(mut self, greet: bool) -> Self {
        self.greet_on_start = Some(greet);
        self
    }

    /// Apply overrides and re-validate
    pub fn apply(&self, config: &mut ChatConfig) -> Result<(), ConfigError> {
        if self.backend_url.is_some() || self.greet_on_start.is_some() {
            config.source = ConfigSource::Cli;
        }
        if let Some(ref url) = self.backend_url {
            config.backend_url = url.clone();
        }
        if let Some(greet) = self.greet_on_start {
            config.greet_on_start = greet;
        }
        config.validate()
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;
    use std::io::Write;
    use std::sync::{Arc, Mutex};

    use tempfile::NamedTempFile;

    use super::*;

    fn env(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| ((*k).to_string(), (*v).to_string()))
            .collect();
        move |key| map.get(key).cloned()
    }

    fn toml_file(content: &str) -> NamedTempFile {
        let mut file = NamedTempFile::new().unwrap();
        file.write_all(content.as_bytes()).unwrap();
        file
    }

    #[test]
    fn test_default_config() {
        let config = ChatConfig::default();
        assert_eq!(config.backend_url, DEFAULT_BACKEND_URL);
        assert_eq!(config.request_timeout, Duration::from_secs(120));
        assert!(config.greet_on_start);
        assert_eq!(config.market_symbols, vec!["BTC", "ETH", "SOL"]);
        assert_eq!(config.market_refresh, Duration::from_secs(60));
        assert_eq!(config.source(), ConfigSource::Default);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_default_config_path() {
        if let Some(p) = default_config_path() {
            assert!(p.ends_with("research-chat/config.toml"));
        }
    }

    #[test]
    fn test_apply_toml() {
        let file: ChatToml = toml::from_str(
            r#"
backend_url = "https://research.example.com"
request_timeout_secs = 30
greet_on_start = false

[market]
symbols = [" btc ", "", "eth"]
refresh_secs = 15
"#,
        )
        .unwrap();

        let mut config = ChatConfig::default();
        config.apply_toml(&file);

        assert_eq!(config.backend_url, "https://research.example.com");
        assert_eq!(config.request_timeout, Duration::from_secs(30));
        assert!(!config.greet_on_start);
        assert_eq!(config.market_symbols, vec!["BTC", "ETH"]);
        assert_eq!(config.market_refresh, Duration::from_secs(15));
        assert_eq!(config.source(), ConfigSource::File);
    }

    #[test]
    fn test_partial_toml_keeps_defaults() {
        let file: ChatToml = toml::from_str("request_timeout_secs = 5").unwrap();
        let mut config = ChatConfig::default();
        config.apply_toml(&file);

        assert_eq!(config.backend_url, DEFAULT_BACKEND_URL);
        assert_eq!(config.request_timeout, Duration::from_secs(5));
        assert_eq!(config.market_symbols.len(), 3);
    }

    #[test]
    fn test_env_overrides_file() {
        let file: ChatToml = toml::from_str(
            r#"
backend_url = "http://from-file:8001"
request_timeout_secs = 30
"#,
        )
        .unwrap();

        let mut config = ChatConfig::default();
        config.apply_toml(&file);
        config.apply_env(env(&[
            ("RESEARCH_BACKEND_URL", "http://from-env:9000"),
            ("RESEARCH_GREET", "0"),
            ("RESEARCH_MARKET_SYMBOLS", "doge, btc"),
        ]));

        assert_eq!(config.backend_url, "http://from-env:9000");
        assert_eq!(config.request_timeout, Duration::from_secs(30));
        assert!(!config.greet_on_start);
        assert_eq!(config.market_symbols, vec!["DOGE", "BTC"]);
        assert_eq!(config.source(), ConfigSource::Env);
    }

    #[test]
    fn test_unparseable_env_numbers_are_ignored() {
        let mut config = ChatConfig::default();
        config.apply_env(env(&[
            ("RESEARCH_REQUEST_TIMEOUT_SECS", "soon"),
            ("RESEARCH_MARKET_REFRESH_SECS", "-1"),
        ]));
        assert_eq!(config.request_timeout, DEFAULT_REQUEST_TIMEOUT);
        assert_eq!(config.market_refresh, DEFAULT_MARKET_REFRESH);
        assert_eq!(config.source(), ConfigSource::Default);
    }

    #[test]
    fn test_cli_overrides_env() {
        let mut config = ChatConfig::default();
        config.apply_env(env(&[("RESEARCH_BACKEND_URL", "http://from-env:9000")]));

        ConfigOverrides::new()
            .with_backend_url("http://from-cli:7000".to_string())
            .with_greet_on_start(false)
            .apply(&mut config)
            .unwrap();

        assert_eq!(config.backend_url, "http://from-cli:7000");
        assert!(!config.greet_on_start);
        assert_eq!(config.source(), ConfigSource::Cli);
    }

    #[test]
    fn test_empty_overrides_no_change() {
        let mut config = ChatConfig::default();
        ConfigOverrides::new().apply(&mut config).unwrap();
        assert_eq!(config.source(), ConfigSource::Default);
    }

    #[test]
    fn test_validation_rejects_bad_url() {
        let mut config = ChatConfig::default();
        config.backend_url = "   ".to_string();
        assert!(matches!(
            config.validate(),
            Err(ConfigError::ValidationError(_))
        ));

        config.backend_url = "localhost:8001".to_string();
        assert!(matches!(
            config.validate(),
            Err(ConfigError::ValidationError(_))
        ));
    }

    #[test]
    fn test_validation_rejects_zero_timeout() {
        let mut config = ChatConfig::default();
        config.request_timeout = Duration::ZERO;
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_load_missing_file_is_not_an_error() {
        let path = PathBuf::from("/nonexistent/research-chat/config.toml");
        let config = ChatConfig::load(Some(&path)).unwrap();
        assert!(config.config_file_path.is_none());
    }

    #[test]
    fn test_load_reads_file() {
        let file = toml_file("greet_on_start = false\n[market]\nrefresh_secs = 5\n");
        let config = ChatConfig::load(Some(file.path())).unwrap();
        assert_eq!(config.config_file_path.as_deref(), Some(file.path()));
        assert_eq!(config.market_refresh, Duration::from_secs(5));
    }

    /// Writer that collects log output for inspection
    #[derive(Clone, Default)]
    struct CapturedLogs(Arc<Mutex<Vec<u8>>>);

    impl Write for CapturedLogs {
        fn write(&mut self, buf: &[u8]) -> std::io::Result<usize> {
            self.0.lock().unwrap().extend_from_slice(buf);
            Ok(buf.len())
        }

        fn flush(&mut self) -> std::io::Result<()> {
            Ok(())
        }
    }

    fn logs_of(f: impl FnOnce()) -> String {
        let logs = CapturedLogs::default();
        let writer = logs.clone();
        let subscriber = tracing_subscriber::fmt()
            .with_ansi(false)
            .with_writer(move || writer.clone())
            .finish();
        tracing::subscriber::with_default(subscriber, f);
        let bytes = logs.0.lock().unwrap().clone();
        String::from_utf8(bytes).unwrap()
    }

    #[test]
    fn test_log_loaded_reports_file_after_logging_starts() {
        let file = toml_file("greet_on_start = false\n");
        let config = ChatConfig::load(Some(file.path())).unwrap();

        let output = logs_of(|| config.log_loaded());
        assert!(output.contains("Loaded configuration from file"));
        assert!(output.contains(&file.path().display().to_string()));
    }

    #[test]
    fn test_log_loaded_without_file() {
        let path = PathBuf::from("/nonexistent/research-chat/config.toml");
        let config = ChatConfig::load(Some(&path)).unwrap();

        let output = logs_of(|| config.log_loaded());
        assert!(output.contains("No config file found"));
    }

    #[test]
    fn test_load_malformed_toml() {
        let file = toml_file("[market\nrefresh_secs = \"soon\"\n");
        let result = ChatConfig::load(Some(file.path()));
        assert!(matches!(result, Err(ConfigError::ParseError(_))));
    }

    #[test]
    fn test_config_source_display() {
        assert_eq!(ConfigSource::Cli.to_string(), "CLI");
        assert_eq!(ConfigSource::Env.to_string(), "environment");
        assert_eq!(ConfigSource::File.to_string(), "config file");
        assert_eq!(ConfigSource::Default.to_string(), "default");
    }
}
