use std::path::{Path, PathBuf};
use std::time::Duration;

use anyhow::{Context, bail};
use serde::Deserialize;

use crate::http::stream::DEFAULT_BUFFER_SIZE;
use crate::server::dispatch::SERVLET_PREFIX;
use crate::server::processor::SERVER_INFO;

/// Environment variable naming a YAML configuration file.
pub const CONFIG_ENV: &str = "PYRMONT_CONFIG";
/// Environment variable overriding `server.listen_addr`.
pub const LISTEN_ENV: &str = "LISTEN";

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct Config {
    pub server: ServerConfig,
    pub static_files: StaticFilesConfig,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    pub listen_addr: String,
    /// Read-ahead buffer size, also the longest accepted request/header line
    pub buffer_size: usize,
    pub min_processors: usize,
    pub max_processors: usize,
    pub servlet_prefix: String,
    /// Value of the `Server` response header
    pub server_header: String,
    /// Socket read timeout; unset means a stalled client holds its processor
    pub read_timeout_ms: Option<u64>,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            listen_addr: "127.0.0.1:8080".to_string(),
            buffer_size: DEFAULT_BUFFER_SIZE,
            min_processors: 5,
            max_processors: 20,
            servlet_prefix: SERVLET_PREFIX.to_string(),
            server_header: SERVER_INFO.to_string(),
            read_timeout_ms: None,
        }
    }
}

impl ServerConfig {
    pub fn read_timeout(&self) -> Option<Duration> {
        self.read_timeout_ms
            .filter(|ms| *ms > 0)
            .map(Duration::from_millis)
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct StaticFilesConfig {
    pub root: PathBuf,
}

impl Default for StaticFilesConfig {
    fn default() -> Self {
        Self {
            root: PathBuf::from("webroot"),
        }
    }
}

impl Config {
    /// Loads the file named by `PYRMONT_CONFIG` (defaults otherwise), then
    /// applies the `LISTEN` override.
    pub fn load() -> anyhow::Result<Self> {
        let mut cfg = match std::env::var(CONFIG_ENV) {
            Ok(path) => Self::from_file(path)?,
            Err(_) => Self::default(),
        };
        if let Ok(listen_addr) = std::env::var(LISTEN_ENV) {
            cfg.server.listen_addr = listen_addr;
        }
        cfg.validate()?;
        Ok(cfg)
    }

    pub fn from_file(path: impl AsRef<Path>) -> anyhow::Result<Self> {
        let path = path.as_ref();
        let text = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file {}", path.display()))?;
        Self::from_yaml(&text).with_context(|| format!("Invalid config file {}", path.display()))
    }

    pub fn from_yaml(text: &str) -> anyhow::Result<Self> {
        let cfg: Self = serde_yaml::from_str(text).context("Failed to parse YAML configuration")?;
        cfg.validate()?;
        Ok(cfg)
    }

    pub fn validate(&self) -> anyhow::Result<()> {
        let server = &self.server;
        if server.buffer_size == 0 {
            bail!("server.buffer_size must be positive");
        }
        if server.max_processors == 0 {
            bail!("server.max_processors must be positive");
        }
        if server.min_processors > server.max_processors {
            bail!(
                "server.min_processors ({}) exceeds server.max_processors ({})",
                server.min_processors,
                server.max_processors
            );
        }
        if !server.servlet_prefix.starts_with('/') {
            bail!("server.servlet_prefix must start with '/'");
        }
        Ok(())
    }
}
