use std::net::SocketAddr;
use std::path::{Path, PathBuf};

use anyhow::Context;
use figment::Figment;
use figment::providers::{Env, Format, Serialized, Yaml};
use modkit_query::QueryConfig;
use serde::{Deserialize, Serialize};

/// Prefix of environment overrides, e.g. `QUERY_SERVER__SERVER__BIND=0.0.0.0:9000`.
pub const ENV_PREFIX: &str = "QUERY_SERVER__";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ServerConfig {
    pub bind: SocketAddr,
    /// JSON array of people loaded at startup; built-in samples when unset.
    pub seed: Option<PathBuf>,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            bind: SocketAddr::from(([127, 0, 0, 1], 8087)),
            seed: None,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct LoggingConfig {
    /// Emit JSON lines instead of human-readable output.
    pub json: bool,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    pub server: ServerConfig,
    pub logging: LoggingConfig,
    pub query: QueryConfig,
}

impl AppConfig {
    /// Layered config: defaults -> YAML (if provided) -> env (`QUERY_SERVER__*`).
    pub fn load(path: Option<&Path>) -> anyhow::Result<Self> {
        Self::from_figment(&Self::figment(path))
    }

    pub fn figment(path: Option<&Path>) -> Figment {
        let mut figment = Figment::new().merge(Serialized::defaults(AppConfig::default()));
        if let Some(path) = path {
            figment = figment.merge(Yaml::file(path));
        }
        figment.merge(Env::prefixed(ENV_PREFIX).split("__"))
    }

    pub fn from_figment(figment: &Figment) -> anyhow::Result<Self> {
        let server = figment
            .extract_inner::<ServerConfig>("server")
            .context("invalid `server` config")?;
        let logging = figment
            .extract_inner::<LoggingConfig>("logging")
            .context("invalid `logging` config")?;
        let query = QueryConfig::from_figment(figment, "query").context("invalid `query` config")?;
        Ok(Self {
            server,
            logging,
            query,
        })
    }

    pub fn apply_port_override(&mut self, port: Option<u16>) {
        if let Some(port) = port {
            self.server.bind.set_port(port);
        }
    }
}
