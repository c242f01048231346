//! Portal settings
//!
//! Read from `portal.yaml` (or `.yml`/`.json`) in the config directory, then
//! overridden by environment variables. A missing file means defaults.

use std::path::PathBuf;

use config_loader::{ConfigError, ConfigLoader};
use serde::Deserialize;
use tracing::{info, warn};

use crate::store::{MemoryStore, SeedData};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    #[default]
    Pretty,
    Json,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct PortalConfig {
    pub bind_addr: String,
    pub port: u16,
    pub jwt_secret: Option<String>,
    pub jwt_algorithm: Option<String>,
    pub log_format: LogFormat,
    /// Questions per page on the question list.
    pub page_size: usize,
    /// YAML/JSON document with the initial records.
    pub seed_file: Option<PathBuf>,
}

impl Default for PortalConfig {
    fn default() -> Self {
        Self {
            bind_addr: "0.0.0.0".to_string(),
            port: 3000,
            jwt_secret: None,
            jwt_algorithm: None,
            log_format: LogFormat::Pretty,
            page_size: 10,
            seed_file: None,
        }
    }
}

impl PortalConfig {
    pub fn load(loader: &ConfigLoader) -> Result<Self, ConfigError> {
        let mut config: PortalConfig = loader.load_or_default("portal")?;
        config.apply_env_from(|key| std::env::var(key).ok());
        if config.page_size == 0 {
            warn!("pageSize must be positive, using 10");
            config.page_size = 10;
        }
        Ok(config)
    }

    /// Applies `PORT`, `BIND_ADDR`, `JWT_SECRET`, `JWT_ALGORITHM` and
    /// `PORTAL_LOG_FORMAT` from `lookup`. Unparseable values are ignored.
    pub fn apply_env_from<F>(&mut self, lookup: F)
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(port) = lookup("PORT") {
            match port.trim().parse() {
                Ok(port) => self.port = port,
                Err(_) => warn!("Ignoring invalid PORT value {:?}", port),
            }
        }
        if let Some(addr) = lookup("BIND_ADDR") {
            self.bind_addr = addr;
        }
        if let Some(secret) = lookup("JWT_SECRET").filter(|s| !s.is_empty()) {
            self.jwt_secret = Some(secret);
        }
        if let Some(algorithm) = lookup("JWT_ALGORITHM") {
            self.jwt_algorithm = Some(algorithm);
        }
        match lookup("PORTAL_LOG_FORMAT").as_deref() {
            Some("json") => self.log_format = LogFormat::Json,
            Some("pretty") => self.log_format = LogFormat::Pretty,
            Some(other) => warn!("Ignoring unknown PORTAL_LOG_FORMAT {:?}", other),
            None => {}
        }
    }

    pub fn listen_addr(&self) -> String {
        format!("{}:{}", self.bind_addr, self.port)
    }

    /// Builds the in-memory store, seeded from `seed_file` when one is set.
    pub fn open_store(&self) -> Result<MemoryStore, ConfigError> {
        match &self.seed_file {
            Some(path) => {
                let seed: SeedData = ConfigLoader::load_path(path)?;
                info!(
                    "Seeded store from {} ({} menu items, {} questions, {} late policies)",
                    path.display(),
                    seed.menu_items.len(),
                    seed.questions.len(),
                    seed.late_policies.len()
                );
                Ok(MemoryStore::from_seed(seed))
            }
            None => Ok(MemoryStore::new()),
        }
    }
}
