//! Environment-backed configuration.
//!
//! Most settings have defaults. Override with `SEMCACHE_*` environment variables; provider
//! credentials and model names come from the usual `OPENAI_*` variables.

pub mod error;


pub use error::ConfigError;

use std::env;
use std::fmt;
use std::net::IpAddr;
use std::str::FromStr;
use std::time::Duration;

use crate::cache::SemanticCacheConfig;
use crate::constants::{
    DEFAULT_CHAT_MODEL, DEFAULT_EMBEDDING_DIM, DEFAULT_EMBEDDING_MODEL, DEFAULT_OPENAI_BASE_URL,
    DEFAULT_RECENT_ENTRIES, DEFAULT_SIMILARITY_THRESHOLD, DEFAULT_TTL_SECS,
};

/// Default Redis URL used when `SEMCACHE_REDIS_URL` is not set.
pub const DEFAULT_REDIS_URL: &str = "redis://127.0.0.1:6379";

/// Where cache entries live.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum StoreBackend {
    #[default]
    Redis,
    /// Process-local; entries are lost on restart.
    Memory,
}

impl FromStr for StoreBackend {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "redis" => Ok(StoreBackend::Redis),
            "memory" => Ok(StoreBackend::Memory),
            _ => Err(ConfigError::InvalidStoreBackend {
                value: s.to_string(),
            }),
        }
    }
}

impl fmt::Display for StoreBackend {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            StoreBackend::Redis => write!(f, "redis"),
            StoreBackend::Memory => write!(f, "memory"),
        }
    }
}

/// Server configuration loaded from environment variables.
///
/// Use [`Config::from_env`] to read overrides on top of defaults.
#[derive(Clone)]
pub struct Config {
    /// HTTP server port. Default: `8080`.
    pub port: u16,

    /// IP address to bind to. Default: `127.0.0.1`.
    pub bind_addr: IpAddr,

    /// Entry storage backend. Default: `redis`.
    pub store: StoreBackend,

    /// Redis endpoint URL. Default: `redis://127.0.0.1:6379`.
    pub redis_url: String,

    /// Minimum cosine similarity for a hit. Default: `0.85`.
    pub similarity_threshold: f32,

    /// Entry retention in seconds. Default: `3600`.
    pub ttl_secs: u64,

    /// Entries reported by `/stats`. Default: `10`.
    pub recent_entries: usize,

    /// Expected embedding length. Default: `1536`.
    pub embedding_dim: usize,

    /// Serve canned responses and stub embeddings instead of calling OpenAI.
    pub mock_provider: bool,

    pub openai_api_key: Option<String>,

    /// Chat model. Default: `gpt-4o-mini`.
    pub chat_model: String,

    /// Embedding model. Default: `text-embedding-3-small`.
    pub embedding_model: String,

    pub openai_base_url: String,
}

impl fmt::Debug for Config {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Config")
            .field("port", &self.port)
            .field("bind_addr", &self.bind_addr)
            .field("store", &self.store)
            .field("redis_url", &self.redis_url)
            .field("similarity_threshold", &self.similarity_threshold)
            .field("ttl_secs", &self.ttl_secs)
            .field("recent_entries", &self.recent_entries)
            .field("embedding_dim", &self.embedding_dim)
            .field("mock_provider", &self.mock_provider)
            .field(
                "openai_api_key",
                &self.openai_api_key.as_ref().map(|_| "<redacted>"),
            )
            .field("chat_model", &self.chat_model)
            .field("embedding_model", &self.embedding_model)
            .field("openai_base_url", &self.openai_base_url)
            .finish()
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            port: 8080,
            bind_addr: IpAddr::V4(std::net::Ipv4Addr::new(127, 0, 0, 1)),
            store: StoreBackend::Redis,
            redis_url: DEFAULT_REDIS_URL.to_string(),
            similarity_threshold: DEFAULT_SIMILARITY_THRESHOLD,
            ttl_secs: DEFAULT_TTL_SECS,
            recent_entries: DEFAULT_RECENT_ENTRIES,
            embedding_dim: DEFAULT_EMBEDDING_DIM,
            mock_provider: false,
            openai_api_key: None,
            chat_model: DEFAULT_CHAT_MODEL.to_string(),
            embedding_model: DEFAULT_EMBEDDING_MODEL.to_string(),
            openai_base_url: DEFAULT_OPENAI_BASE_URL.to_string(),
        }
    }
}

impl Config {
    pub const ENV_PORT: &'static str = "SEMCACHE_PORT";
    const ENV_BIND_ADDR: &'static str = "SEMCACHE_BIND_ADDR";
    const ENV_STORE: &'static str = "SEMCACHE_STORE";
    const ENV_REDIS_URL: &'static str = "SEMCACHE_REDIS_URL";
    const ENV_SIMILARITY_THRESHOLD: &'static str = "SEMCACHE_SIMILARITY_THRESHOLD";
    const ENV_TTL_SECS: &'static str = "SEMCACHE_TTL_SECS";
    const ENV_RECENT_ENTRIES: &'static str = "SEMCACHE_RECENT_ENTRIES";
    const ENV_EMBEDDING_DIM: &'static str = "SEMCACHE_EMBEDDING_DIM";
    const ENV_MOCK_PROVIDER: &'static str = "SEMCACHE_MOCK_PROVIDER";
    const ENV_OPENAI_API_KEY: &'static str = "OPENAI_API_KEY";
    const ENV_OPENAI_MODEL: &'static str = "OPENAI_MODEL";
    const ENV_OPENAI_EMBEDDING_MODEL: &'static str = "OPENAI_EMBEDDING_MODEL";
    const ENV_OPENAI_BASE_URL: &'static str = "OPENAI_BASE_URL";

    /// Loads configuration from environment variables (falling back to defaults).
    pub fn from_env() -> Result<Self, ConfigError> {
        let defaults = Self::default();

        let port = Self::parse_port_from_env(defaults.port)?;
        let bind_addr = Self::parse_bind_addr_from_env(defaults.bind_addr)?;
        let store = match Self::parse_optional_string_from_env(Self::ENV_STORE) {
            Some(value) => value.parse()?,
            None => defaults.store,
        };
        let redis_url = Self::parse_string_from_env(Self::ENV_REDIS_URL, defaults.redis_url);
        let similarity_threshold = Self::parse_value_from_env(
            Self::ENV_SIMILARITY_THRESHOLD,
            defaults.similarity_threshold,
        )?;
        let ttl_secs = Self::parse_value_from_env(Self::ENV_TTL_SECS, defaults.ttl_secs)?;
        let recent_entries =
            Self::parse_value_from_env(Self::ENV_RECENT_ENTRIES, defaults.recent_entries)?;
        let embedding_dim =
            Self::parse_value_from_env(Self::ENV_EMBEDDING_DIM, defaults.embedding_dim)?;
        let mock_provider = Self::parse_flag_from_env(Self::ENV_MOCK_PROVIDER);
        let openai_api_key = Self::parse_optional_string_from_env(Self::ENV_OPENAI_API_KEY);
        let chat_model = Self::parse_string_from_env(Self::ENV_OPENAI_MODEL, defaults.chat_model);
        let embedding_model = Self::parse_string_from_env(
            Self::ENV_OPENAI_EMBEDDING_MODEL,
            defaults.embedding_model,
        );
        let openai_base_url =
            Self::parse_string_from_env(Self::ENV_OPENAI_BASE_URL, defaults.openai_base_url);

        Ok(Self {
            port,
            bind_addr,
            store,
            redis_url,
            similarity_threshold,
            ttl_secs,
            recent_entries,
            embedding_dim,
            mock_provider,
            openai_api_key,
            chat_model,
            embedding_model,
            openai_base_url,
        })
    }

    /// Checks value ranges that parsing alone does not enforce.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if !(self.similarity_threshold > 0.0 && self.similarity_threshold <= 1.0) {
            return Err(ConfigError::InvalidThreshold {
                value: self.similarity_threshold,
            });
        }

        if self.ttl_secs == 0 {
            return Err(ConfigError::InvalidTtl);
        }

        if self.embedding_dim == 0 {
            return Err(ConfigError::InvalidValue {
                name: Self::ENV_EMBEDDING_DIM,
                value: "0".to_string(),
            });
        }

        Ok(())
    }

    /// Returns `"{bind_addr}:{port}"` (useful for logging/binding).
    pub fn socket_addr(&self) -> String {
        format!("{}:{}", self.bind_addr, self.port)
    }

    /// `true` when an OpenAI key is available.
    pub fn has_api_key(&self) -> bool {
        self.openai_api_key.is_some()
    }

    pub fn retention(&self) -> Duration {
        Duration::from_secs(self.ttl_secs)
    }

    /// Cache tuning derived from this configuration.
    pub fn cache_config(&self) -> SemanticCacheConfig {
        SemanticCacheConfig::default()
            .threshold(self.similarity_threshold)
            .retention(self.retention())
            .recent_entries(self.recent_entries)
    }

    fn parse_port_from_env(default: u16) -> Result<u16, ConfigError> {
        match env::var(Self::ENV_PORT) {
            Ok(value) => {
                let port: u16 = value.parse().map_err(|e| ConfigError::PortParseError {
                    value: value.clone(),
                    source: e,
                })?;

                if port == 0 {
                    return Err(ConfigError::InvalidPort { value });
                }

                Ok(port)
            }
            Err(_) => Ok(default),
        }
    }

    fn parse_bind_addr_from_env(default: IpAddr) -> Result<IpAddr, ConfigError> {
        match env::var(Self::ENV_BIND_ADDR) {
            Ok(value) => value
                .parse()
                .map_err(|e| ConfigError::InvalidBindAddr { value, source: e }),
            Err(_) => Ok(default),
        }
    }

    fn parse_value_from_env<T: FromStr>(name: &'static str, default: T) -> Result<T, ConfigError> {
        match Self::parse_optional_string_from_env(name) {
            Some(value) => value
                .parse()
                .map_err(|_| ConfigError::InvalidValue { name, value }),
            None => Ok(default),
        }
    }

    fn parse_optional_string_from_env(var_name: &str) -> Option<String> {
        env::var(var_name)
            .ok()
            .map(|v| v.trim().to_string())
            .filter(|v| !v.is_empty())
    }

    fn parse_string_from_env(var_name: &str, default: String) -> String {
        Self::parse_optional_string_from_env(var_name).unwrap_or(default)
    }

    fn parse_flag_from_env(var_name: &str) -> bool {
        env::var_os(var_name).is_some_and(|v| !v.is_empty() && v != "0" && v != "false")
    }
}
