use serde::Deserialize;
use std::net::SocketAddr;

#[derive(Debug, Deserialize, Clone, Default)]
#[serde(default)]
pub struct Config {
    pub server: ServerConfig,
    pub metrics: MetricsConfig,
    pub seed: SeedConfig,
}

#[derive(Debug, Deserialize, Clone)]
#[serde(default)]
pub struct ServerConfig {
    pub listen_addr: String,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            listen_addr: "127.0.0.1:5000".into(),
        }
    }
}

#[derive(Debug, Deserialize, Clone)]
#[serde(default)]
pub struct MetricsConfig {
    pub enabled: bool,
    pub listen_addr: String,
}

impl Default for MetricsConfig {
    fn default() -> Self {
        Self {
            enabled: false,
            listen_addr: "127.0.0.1:9898".into(),
        }
    }
}

#[derive(Debug, Deserialize, Clone, Default)]
pub struct SeedConfig {
    #[serde(default)]
    pub demo_table: bool,
}

impl Config {
    pub fn from_path(path: &str) -> anyhow::Result<Self> {
        let contents = std::fs::read_to_string(path)?;
        Self::from_toml(&contents)
    }

    pub fn from_toml(contents: &str) -> anyhow::Result<Self> {
        let config: Config = toml::from_str(contents)?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> anyhow::Result<()> {
        let server_addr: SocketAddr = self.server.listen_addr.parse().map_err(|_| {
            anyhow::anyhow!("invalid server listen_addr: {}", self.server.listen_addr)
        })?;
        if self.metrics.enabled {
            let metrics_addr: SocketAddr = self.metrics.listen_addr.parse().map_err(|_| {
                anyhow::anyhow!("invalid metrics listen_addr: {}", self.metrics.listen_addr)
            })?;
            if metrics_addr == server_addr {
                return Err(anyhow::anyhow!(
                    "metrics listen_addr must differ from server listen_addr"
                ));
            }
        }
        Ok(())
    }
}
