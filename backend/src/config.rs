use std::path::PathBuf;
use std::str::FromStr;

use crate::error::ConfigError;

const DEFAULT_JSON_LIMIT: usize = 1024 * 1024;
const DEFAULT_MAX_BATCH: usize = 1000;

#[derive(Debug, Clone, PartialEq)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
    pub workers: usize,
    pub static_dir: PathBuf,
    pub json_limit: usize,
    pub max_batch: usize,
    pub cors_origins: Vec<String>,
}

impl Default for ServerConfig {
    fn default() -> Self {
        ServerConfig {
            host: "127.0.0.1".to_string(),
            port: 8080,
            workers: num_cpus::get(),
            static_dir: PathBuf::from("./static"),
            json_limit: DEFAULT_JSON_LIMIT,
            max_batch: DEFAULT_MAX_BATCH,
            cors_origins: vec![
                "http://localhost:8080".to_string(),
                "http://127.0.0.1:8080".to_string(),
            ],
        }
    }
}

impl ServerConfig {
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Builds the config from any key lookup; unset keys keep their default.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut config = ServerConfig::default();

        if let Some(host) = lookup("HOST") {
            config.host = host;
        }
        if let Some(port) = lookup("PORT") {
            config.port = parse("PORT", &port)?;
        }
        if let Some(workers) = lookup("WORKERS") {
            config.workers = parse_positive("WORKERS", &workers)?;
        }
        if let Some(dir) = lookup("STATIC_DIR") {
            config.static_dir = PathBuf::from(dir);
        }
        if let Some(limit) = lookup("JSON_LIMIT") {
            config.json_limit = parse_positive("JSON_LIMIT", &limit)?;
        }
        if let Some(max_batch) = lookup("MAX_BATCH") {
            config.max_batch = parse_positive("MAX_BATCH", &max_batch)?;
        }
        if let Some(origins) = lookup("CORS_ORIGINS") {
            config.cors_origins = origins
                .split(',')
                .map(str::trim)
                .filter(|o| !o.is_empty())
                .map(String::from)
                .collect();
        }

        Ok(config)
    }

    pub fn bind_address(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

fn parse<T>(key: &'static str, raw: &str) -> Result<T, ConfigError>
where
    T: FromStr,
    T::Err: std::fmt::Display,
{
    raw.trim()
        .parse()
        .map_err(|e: T::Err| ConfigError::invalid(key, raw, e))
}

fn parse_positive(key: &'static str, raw: &str) -> Result<usize, ConfigError> {
    match parse::<usize>(key, raw)? {
        0 => Err(ConfigError::invalid(key, raw, "must be at least 1")),
        n => Ok(n),
    }
}
