use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use ats_search::{CandidateRepository, Config, ConnectionManager};

use crate::output::OutputManager;

/// Configuration and connection settings shared by every command
pub struct CliContext {
    /// Path the configuration was loaded from (may not exist)
    pub config_path: PathBuf,
    pub config: Config,
    /// `--redis-url` / `REDIS_URL`, taking precedence over the config file
    redis_url_override: Option<String>,
}

impl CliContext {
    pub fn load(config_path: &Path, redis_url_override: Option<String>) -> Result<Self> {
        let config = Config::load(config_path)
            .with_context(|| format!("Failed to load {}", config_path.display()))?;
        Ok(Self {
            config_path: config_path.to_path_buf(),
            config,
            redis_url_override,
        })
    }

    pub fn repository(&self) -> CandidateRepository {
        self.config.repository()
    }

    pub fn default_page_size(&self) -> u64 {
        self.config.search.default_page_size
    }

    pub fn redis_url(&self) -> Result<String> {
        match &self.redis_url_override {
            Some(url) => Ok(url.clone()),
            None => self
                .config
                .redis_url()
                .context("No Redis URL configured. Set REDIS_URL or pass --redis-url."),
        }
    }

    /// Open a managed Redis connection
    pub async fn connect(&self, output: &OutputManager) -> Result<ConnectionManager> {
        let redis_url = self.redis_url()?;
        output.verbose(&format!("Connecting to Redis ({})", self.config_path.display()));
        let client = redis::Client::open(redis_url.as_str()).context("Failed to create Redis client")?;
        let conn = ConnectionManager::new(client)
            .await
            .context("Failed to connect to Redis")?;
        output.verbose("Connected to Redis");
        Ok(conn)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn override_wins_over_config() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("ats-search.toml");
        std::fs::write(&path, "[redis]\nurl = \"redis://config:6379\"\n").unwrap();

        let ctx = CliContext::load(&path, Some("redis://flag:6379".to_string())).unwrap();
        assert_eq!(ctx.redis_url().unwrap(), "redis://flag:6379");

        let ctx = CliContext::load(&path, None).unwrap();
        assert_eq!(ctx.redis_url().unwrap(), "redis://config:6379");
    }

    #[test]
    fn missing_config_uses_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let ctx = CliContext::load(&dir.path().join("absent.toml"), None).unwrap();
        assert_eq!(ctx.default_page_size(), 25);
        assert_eq!(ctx.repository().candidate_key("c1"), "ats:recruiting:candidates:c1");
    }
}
