use anyhow::{Context, Result};
use std::env;
use std::path::PathBuf;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
    /// JSON file backing the flow repository; in memory when unset
    pub store_path: Option<PathBuf>,
}

impl ServerConfig {
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Build from any key lookup, falling back to defaults
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self> {
        let defaults = Self::default();

        let port = match lookup("FLOW_EDITOR_PORT") {
            Some(port) => port
                .parse()
                .with_context(|| format!("Invalid FLOW_EDITOR_PORT value: {port}"))?,
            None => defaults.port,
        };

        Ok(Self {
            host: lookup("FLOW_EDITOR_HOST").unwrap_or(defaults.host),
            port,
            store_path: lookup("FLOW_STORE_PATH")
                .filter(|p| !p.is_empty())
                .map(PathBuf::from),
        })
    }

    pub fn addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".to_string(),
            port: 3000,
            store_path: None,
        }
    }
}
