//! Configuration loaded from `ats-search.toml`.
//!
//! ```toml
//! [redis]
//! url = "${REDIS_URL}"
//!
//! [search]
//! prefix = "ats"
//! service = "recruiting"
//! default_page_size = 25
//! ```

use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::{
    errors::SearchError,
    repository::CandidateRepository,
    search::{DEFAULT_PAGE_SIZE, MAX_PAGE_SIZE},
};

pub const CONFIG_FILE_NAME: &str = "ats-search.toml";
pub const REDIS_URL_ENV: &str = "REDIS_URL";

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub redis: RedisSettings,
    #[serde(default)]
    pub search: SearchSettings,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RedisSettings {
    /// Connection URL; `${VAR}` is read from the environment.
    #[serde(default = "default_redis_url")]
    pub url: String,
}

impl Default for RedisSettings {
    fn default() -> Self {
        Self {
            url: default_redis_url(),
        }
    }
}

fn default_redis_url() -> String {
    format!("${{{REDIS_URL_ENV}}}")
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SearchSettings {
    #[serde(default = "default_prefix")]
    pub prefix: String,
    #[serde(default = "default_service")]
    pub service: String,
    #[serde(default = "default_page_size")]
    pub default_page_size: u64,
}

impl Default for SearchSettings {
    fn default() -> Self {
        Self {
            prefix: default_prefix(),
            service: default_service(),
            default_page_size: default_page_size(),
        }
    }
}

fn default_prefix() -> String {
    "ats".to_string()
}

fn default_service() -> String {
    "recruiting".to_string()
}

fn default_page_size() -> u64 {
    DEFAULT_PAGE_SIZE
}

impl Config {
    /// Load `path` if it exists, defaults otherwise.
    pub fn load(path: &Path) -> Result<Self, SearchError> {
        if !path.exists() {
            return Ok(Self::default());
        }
        let content = std::fs::read_to_string(path).map_err(|err| SearchError::Config {
            message: format!("failed to read {}: {err}", path.display()),
        })?;
        Self::from_toml(&content)
    }

    pub fn from_toml(content: &str) -> Result<Self, SearchError> {
        let config: Config = toml::from_str(content).map_err(|err| SearchError::Config {
            message: format!("failed to parse configuration: {err}"),
        })?;
        if !(1..=MAX_PAGE_SIZE).contains(&config.search.default_page_size) {
            return Err(SearchError::Config {
                message: format!("search.default_page_size must be between 1 and {MAX_PAGE_SIZE}"),
            });
        }
        Ok(config)
    }

    /// Redis URL with `${VAR}` expanded.
    pub fn redis_url(&self) -> Result<String, SearchError> {
        expand_env(&self.redis.url)
    }

    pub fn repository(&self) -> CandidateRepository {
        CandidateRepository::new(&self.search.prefix, &self.search.service)
    }
}

fn expand_env(value: &str) -> Result<String, SearchError> {
    match value.strip_prefix("${").and_then(|rest| rest.strip_suffix('}')) {
        Some(var_name) => std::env::var(var_name).map_err(|_| SearchError::Config {
            message: format!("environment variable {var_name} not set"),
        }),
        None => Ok(value.to_string()),
    }
}
