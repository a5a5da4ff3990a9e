//! Configuration for the search proxy.
//!
//! Values come from three layers, later ones winning: built-in defaults, an
//! optional TOML file, then environment variables.

use crate::error::{ProxyError, Result};
use search_federation::{FederationConfig, ProvidersConfig};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::str::FromStr;

/// Environment variable naming an explicit config file.
pub const CONFIG_PATH_ENV: &str = "SEARCH_PROXY_CONFIG";

/// Top-level proxy configuration.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ProxyConfig {
    /// Listener settings.
    pub server: ServerConfig,
    /// Time budgets and result caps.
    pub federation: FederationConfig,
    /// Upstream platform settings.
    pub providers: ProvidersConfig,
    /// Log output settings.
    pub logging: LoggingConfig,
}

/// HTTP listener configuration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    /// Bind address.
    pub host: String,
    /// Bind port. `0` picks a free port.
    pub port: u16,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".to_owned(),
            port: 50051,
        }
    }
}

/// Log output format.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    /// One JSON object per line.
    #[default]
    Json,
    /// Human-readable text.
    Text,
}

impl FromStr for LogFormat {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "json" => Ok(Self::Json),
            "text" | "pretty" => Ok(Self::Text),
            other => Err(format!("unknown log format {other:?} (expected json or text)")),
        }
    }
}

/// Logging configuration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// Default filter directive when `RUST_LOG` is unset.
    pub level: String,
    /// Output format.
    pub format: LogFormat,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_owned(),
            format: LogFormat::Json,
        }
    }
}

impl ProxyConfig {
    /// Load configuration from a TOML file, falling back to defaults for missing fields.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read or parsed.
    pub fn from_file(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        toml::from_str(&content).map_err(|e| ProxyError::Config(format!("{}: {e}", path.display())))
    }

    /// Build the effective configuration for the process.
    ///
    /// An explicit `path` must exist. Without one, `SEARCH_PROXY_CONFIG` is
    /// consulted, then [`default_config_path`](Self::default_config_path),
    /// which may be absent. Environment overrides are applied last.
    ///
    /// Returns the configuration together with startup warnings (ignored
    /// environment values, missing credentials) for the caller to log once
    /// logging is up.
    ///
    /// # Errors
    ///
    /// Returns an error if a named file cannot be read or parsed, or the
    /// final values are invalid.
    pub fn load(path: Option<&Path>) -> Result<(Self, Vec<String>)> {
        let explicit = path
            .map(Path::to_path_buf)
            .or_else(|| std::env::var_os(CONFIG_PATH_ENV).map(PathBuf::from));

        let mut config = match explicit {
            Some(path) => Self::from_file(&path)?,
            None => {
                let path = Self::default_config_path();
                if path.is_file() {
                    Self::from_file(&path)?
                } else {
                    Self::default()
                }
            }
        };

        let mut warnings = config.apply_env_from(|key| std::env::var(key).ok());
        config.validate()?;
        warnings.extend(
            config
                .providers
                .credential_warnings()
                .into_iter()
                .map(str::to_owned),
        );
        Ok((config, warnings))
    }

    /// Overlay values from an environment lookup.
    ///
    /// Empty values count as unset. Unparseable numbers are skipped and
    /// reported in the returned warnings.
    pub fn apply_env_from<F>(&mut self, lookup: F) -> Vec<String>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());
        let mut warnings = Vec::new();

        let port = get("GRPC_SERVER_PORT")
            .map(|v| ("GRPC_SERVER_PORT", v))
            .or_else(|| get("SERVER_PORT").map(|v| ("SERVER_PORT", v)));
        if let Some((key, value)) = port {
            parse_into(&mut self.server.port, key, &value, &mut warnings);
        }
        if let Some(host) = get("SERVER_HOST") {
            self.server.host = host;
        }

        let federation = &mut self.federation;
        if let Some(value) = get("SERVER_TIMEOUT_MS") {
            parse_into(&mut federation.global_timeout_ms, "SERVER_TIMEOUT_MS", &value, &mut warnings);
        }
        if let Some(value) = get("PER_API_TIMEOUT_MS") {
            parse_into(&mut federation.per_provider_timeout_ms, "PER_API_TIMEOUT_MS", &value, &mut warnings);
        }
        if let Some(value) = get("MAX_RESULTS_PER_PLATFORM") {
            parse_into(
                &mut federation.default_result_cap,
                "MAX_RESULTS_PER_PLATFORM",
                &value,
                &mut warnings,
            );
        }

        let providers = &mut self.providers;
        if let Some(token) = get("GITHUB_API_TOKEN") {
            providers.github.api_token = Some(token);
        }
        if let Some(url) = get("GITHUB_API_BASE_URL") {
            providers.github.base_url = url;
        }
        if let Some(key) = get("STACKOVERFLOW_API_KEY") {
            providers.stackoverflow.api_key = Some(key);
        }
        if let Some(url) = get("STACKOVERFLOW_API_BASE_URL") {
            providers.stackoverflow.base_url = url;
        }
        if let Some(agent) = get("REDDIT_USER_AGENT") {
            providers.reddit.user_agent = agent;
        }
        if let Some(url) = get("REDDIT_API_BASE_URL") {
            providers.reddit.base_url = url;
        }

        if let Some(level) = get("LOG_LEVEL") {
            self.logging.level = level;
        }
        if let Some(value) = get("LOG_FORMAT") {
            parse_into(&mut self.logging.format, "LOG_FORMAT", &value, &mut warnings);
        }

        warnings
    }

    /// Check the combined configuration.
    ///
    /// # Errors
    ///
    /// Returns [`ProxyError::Config`] for an empty host or invalid budgets.
    pub fn validate(&self) -> Result<()> {
        if self.server.host.trim().is_empty() {
            return Err(ProxyError::Config("server.host cannot be empty".into()));
        }
        self.federation
            .validate()
            .map_err(|e| ProxyError::Config(e.to_string()))
    }

    /// Returns the default config file path: `<config dir>/search-proxy/config.toml`.
    pub fn default_config_path() -> PathBuf {
        dirs::config_dir()
            .map(|d| d.join("search-proxy").join("config.toml"))
            .unwrap_or_else(|| PathBuf::from("/tmp/search-proxy-config/config.toml"))
    }
}

fn parse_into<T>(slot: &mut T, key: &str, value: &str, warnings: &mut Vec<String>)
where
    T: FromStr + std::fmt::Display,
{
    match value.trim().parse::<T>() {
        Ok(parsed) => *slot = parsed,
        Err(_) => warnings.push(format!("invalid value for {key}: {value:?}, keeping {slot}")),
    }
}

impl std::fmt::Display for LogFormat {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Json => f.write_str("json"),
            Self::Text => f.write_str("text"),
        }
    }
}
