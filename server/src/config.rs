use std::env;
use thiserror::Error;

#[derive(Debug, Error, PartialEq)]
pub enum ConfigError {
    #[error("{key} has an invalid value {value:?}")]
    InvalidValue { key: &'static str, value: String },
    #[error("{0} must be greater than zero")]
    ZeroQueue(&'static str),
}

/// Process settings, read from the environment (and `.env` when present).
#[derive(Debug, Clone, PartialEq)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
    /// Origin allowed by CORS.
    pub client_url: String,
    /// Capacity of the sync engine inbox.
    pub engine_queue: usize,
    /// Capacity of each connection's outbox.
    pub connection_queue: usize,
    pub palette_seed: Option<u64>,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "127.0.0.1".into(),
            port: 3003,
            client_url: "http://localhost:3000".into(),
            engine_queue: 64,
            connection_queue: 32,
            palette_seed: None,
        }
    }
}

impl ServerConfig {
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let defaults = Self::default();
        let config = Self {
            host: lookup("HOST").unwrap_or(defaults.host),
            port: parse(&lookup, "PORT")?.unwrap_or(defaults.port),
            client_url: lookup("CLIENT_URL").unwrap_or(defaults.client_url),
            engine_queue: parse(&lookup, "ENGINE_QUEUE")?.unwrap_or(defaults.engine_queue),
            connection_queue: parse(&lookup, "CONNECTION_QUEUE")?
                .unwrap_or(defaults.connection_queue),
            palette_seed: parse(&lookup, "PALETTE_SEED")?,
        };
        if config.engine_queue == 0 {
            return Err(ConfigError::ZeroQueue("ENGINE_QUEUE"));
        }
        if config.connection_queue == 0 {
            return Err(ConfigError::ZeroQueue("CONNECTION_QUEUE"));
        }
        Ok(config)
    }

    pub fn bind_address(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

fn parse<F, T>(lookup: &F, key: &'static str) -> Result<Option<T>, ConfigError>
where
    F: Fn(&str) -> Option<String>,
    T: std::str::FromStr,
{
    match lookup(key) {
        Some(value) => value
            .trim()
            .parse()
            .map(Some)
            .map_err(|_| ConfigError::InvalidValue { key, value }),
        None => Ok(None),
    }
}
