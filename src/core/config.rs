//! Configuration management for the NetBox MCP server.
//!
//! Configuration is populated from environment variables (optionally loaded
//! from a `.env` file) on top of defaults. Server settings use the `MCP_`
//! prefix; NetBox connection settings use `NETBOX_`.

use super::transport::TransportConfig;
use serde::{Deserialize, Serialize};
use tracing::warn;

use super::error::{Error, Result};

/// Main configuration structure for the MCP server.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    /// Server identification and metadata.
    pub server: ServerConfig,

    /// Logging configuration.
    pub logging: LoggingConfig,

    /// Transport configuration.
    pub transport: TransportConfig,

    /// NetBox connection settings.
    pub netbox: NetBoxConfig,

    /// Read cache settings.
    pub cache: CacheConfig,

    /// Write safety settings.
    pub safety: SafetyConfig,
}

/// Server identification configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    /// The name of the server as reported to clients.
    pub name: String,

    /// The version of the server.
    pub version: String,
}

/// Logging configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingConfig {
    /// Log level filter (e.g., "info", "debug", "trace").
    pub level: String,
}

/// NetBox connection configuration.
#[derive(Clone, Serialize, Deserialize)]
pub struct NetBoxConfig {
    /// Base URL of the NetBox instance (e.g. `https://netbox.example.com`).
    pub url: String,

    /// API token. Never logged.
    pub token: Option<String>,

    /// Verify the server's TLS certificate.
    pub verify_ssl: bool,

    /// Per-request timeout in seconds.
    pub timeout_secs: u64,

    /// Retries for read requests that fail transiently.
    pub max_retries: u32,

    /// Page size requested from list endpoints.
    pub page_size: usize,
}

/// Custom Debug implementation to redact the token from logs.
impl std::fmt::Debug for NetBoxConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("NetBoxConfig")
            .field("url", &self.url)
            .field("token", &self.token.as_ref().map(|_| "[REDACTED]"))
            .field("verify_ssl", &self.verify_ssl)
            .field("timeout_secs", &self.timeout_secs)
            .field("max_retries", &self.max_retries)
            .field("page_size", &self.page_size)
            .finish()
    }
}

/// Read cache configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CacheConfig {
    pub enabled: bool,

    /// Entry lifetime in seconds.
    pub ttl_secs: u64,

    /// Upper bound on cached responses.
    pub max_entries: usize,
}

/// Write safety configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SafetyConfig {
    /// Register read-only tools only.
    pub read_only: bool,
}

impl Default for NetBoxConfig {
    fn default() -> Self {
        Self {
            url: "http://localhost:8000".to_string(),
            token: None,
            verify_ssl: true,
            timeout_secs: 30,
            max_retries: 3,
            page_size: 100,
        }
    }
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            ttl_secs: 300,
            max_entries: 1000,
        }
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            server: ServerConfig {
                name: "netbox-mcp-server".to_string(),
                version: env!("CARGO_PKG_VERSION").to_string(),
            },
            logging: LoggingConfig {
                level: "info".to_string(),
            },
            transport: TransportConfig::default(),
            netbox: NetBoxConfig::default(),
            cache: CacheConfig::default(),
            safety: SafetyConfig::default(),
        }
    }
}

impl NetBoxConfig {
    /// Load NetBox settings from `NETBOX_*` variables.
    pub fn from_env() -> Self {
        let mut config = Self::default();

        if let Ok(url) = std::env::var("NETBOX_URL") {
            config.url = url;
        }
        config.token = std::env::var("NETBOX_TOKEN").ok();
        config.verify_ssl = env_parse("NETBOX_VERIFY_SSL", config.verify_ssl);
        config.timeout_secs = env_parse("NETBOX_TIMEOUT", config.timeout_secs);
        config.max_retries = env_parse("NETBOX_MAX_RETRIES", config.max_retries);
        config.page_size = env_parse("NETBOX_PAGE_SIZE", config.page_size);

        config
    }
}

impl Config {
    /// Load configuration from environment variables.
    pub fn from_env() -> Self {
        dotenvy::dotenv().ok();

        let mut config = Self::default();

        if let Ok(name) = std::env::var("MCP_SERVER_NAME") {
            config.server.name = name;
        }

        if let Ok(level) = std::env::var("MCP_LOG_LEVEL") {
            config.logging.level = level;
        }

        config.transport = TransportConfig::from_env();
        config.netbox = NetBoxConfig::from_env();

        config.cache.enabled = env_parse("MCP_CACHE_ENABLED", config.cache.enabled);
        config.cache.ttl_secs = env_parse("MCP_CACHE_TTL", config.cache.ttl_secs);
        config.cache.max_entries = env_parse("MCP_CACHE_MAX_ENTRIES", config.cache.max_entries);

        config.safety.read_only = env_parse("MCP_READ_ONLY", config.safety.read_only);

        config
    }

    /// Check settings that would otherwise fail on the first request.
    pub fn validate(&self) -> Result<()> {
        let url = self.netbox.url.trim();
        if !(url.starts_with("http://") || url.starts_with("https://")) {
            return Err(Error::config(format!(
                "NETBOX_URL must start with http:// or https:// (got '{url}')"
            )));
        }
        if self
            .netbox
            .token
            .as_deref()
            .is_none_or(|t| t.trim().is_empty())
        {
            return Err(Error::config("NETBOX_TOKEN is required"));
        }
        if self.netbox.timeout_secs == 0 {
            return Err(Error::config("NETBOX_TIMEOUT must be greater than zero"));
        }
        if url.starts_with("http://") && !url.contains("localhost") && !url.contains("127.0.0.1") {
            warn!("NETBOX_URL uses plain HTTP; the API token is sent unencrypted");
        }
        Ok(())
    }
}

/// Parse an environment variable, keeping `default` when unset or invalid.
fn env_parse<T: std::str::FromStr>(key: &str, default: T) -> T {
    match std::env::var(key) {
        Ok(raw) => match raw.trim().to_lowercase().as_str() {
            "yes" | "on" => "true".parse().unwrap_or(default),
            "no" | "off" => "false".parse().unwrap_or(default),
            value => value.parse().unwrap_or_else(|_| {
                warn!("Ignoring invalid value for {}: '{}'", key, raw);
                default
            }),
        },
        Err(_) => default,
    }
}
