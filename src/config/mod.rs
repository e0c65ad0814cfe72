use std::net::{IpAddr, Ipv4Addr, SocketAddr};
use std::path::Path;
use std::time::Duration;

use anyhow::{Context, Result, bail};
use config::{Config, ConfigError, File, FileFormat};
use serde::Deserialize;

#[derive(Debug, Clone, Deserialize)]
pub struct ApiConfig {
    pub server: ServerConfig,
    pub database: DatabaseConfig,
    pub minter: MinterConfig,
    #[serde(default)]
    pub distribution: DistributionConfig,
    pub cache: CacheConfig,
}

impl ApiConfig {
    pub fn load() -> Result<Self> {
        let configured_path =
            std::env::var("POAP_API_CONFIG").unwrap_or_else(|_| "config/api.toml".to_string());
        assert!(
            !configured_path.is_empty(),
            "Configuration path must be non-empty"
        );
        assert!(
            configured_path.len() < 4096,
            "Configuration path length exceeds hard limit"
        );

        let mut builder = Config::builder()
            .add_source(File::new(&configured_path, FileFormat::Toml).required(true));

        if let Ok(env_override) = std::env::var("POAP_API_ENV") {
            if !env_override.is_empty() {
                let env_file = format!("config/api.{}.toml", env_override);
                if Path::new(&env_file).exists() {
                    builder = builder.add_source(File::new(&env_file, FileFormat::Toml));
                }
            }
        }

        let settings = builder
            .build()
            .map_err(|err| map_config_error(err, &configured_path))?;
        let config: Self = settings
            .try_deserialize()
            .context("Failed to deserialize API configuration")?;

        config.validate()?;
        Ok(config)
    }

    fn validate(&self) -> Result<()> {
        if self.database.url.is_empty() {
            bail!("Database URL must be specified");
        }
        if self.server.port == 0 {
            bail!("Server port must be greater than zero");
        }
        if self.minter.rpc_url.is_empty() {
            bail!("Minter RPC URL must be specified");
        }
        self.minter.ensure_bounds()?;
        self.distribution.ensure_bounds()?;
        self.cache.ensure_bounds()?;
        Ok(())
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct ServerConfig {
    pub host: Option<IpAddr>,
    pub port: u16,
}

impl ServerConfig {
    pub fn address(&self) -> SocketAddr {
        let host = self.host.unwrap_or(IpAddr::V4(Ipv4Addr::LOCALHOST));
        assert!(self.port != 0, "HTTP port cannot be zero");
        SocketAddr::new(host, self.port)
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct DatabaseConfig {
    pub url: String,
    pub max_connections: u32,
    pub min_connections: Option<u32>,
}

/// Token transfer service the claim flow hands off to.
#[derive(Debug, Clone, Deserialize)]
pub struct MinterConfig {
    pub rpc_url: String,
    pub request_timeout_ms: Option<u64>,
}

impl MinterConfig {
    pub fn request_timeout(&self) -> Duration {
        let millis = self.request_timeout_ms.unwrap_or(10_000);
        assert!(millis >= 100, "Minter timeout must be at least 100ms");
        assert!(millis <= 120_000, "Minter timeout cannot exceed two minutes");
        Duration::from_millis(millis)
    }

    fn ensure_bounds(&self) -> Result<()> {
        if let Some(millis) = self.request_timeout_ms {
            if !(100..=120_000).contains(&millis) {
                bail!("minter.request_timeout_ms must be within 100..=120000");
            }
        }
        Ok(())
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct DistributionConfig {
    #[serde(default = "DistributionConfig::default_max_claim_links_per_batch")]
    pub max_claim_links_per_batch: u32,
    #[serde(default = "DistributionConfig::default_max_airdrop_addresses")]
    pub max_airdrop_addresses: u32,
}

impl Default for DistributionConfig {
    fn default() -> Self {
        Self {
            max_claim_links_per_batch: Self::default_max_claim_links_per_batch(),
            max_airdrop_addresses: Self::default_max_airdrop_addresses(),
        }
    }
}

impl DistributionConfig {
    fn ensure_bounds(&self) -> Result<()> {
        if self.max_claim_links_per_batch == 0 || self.max_claim_links_per_batch > 10_000 {
            bail!("max_claim_links_per_batch must be within 1..=10000");
        }
        if self.max_airdrop_addresses == 0 || self.max_airdrop_addresses > 50_000 {
            bail!("max_airdrop_addresses must be within 1..=50000");
        }
        Ok(())
    }

    const fn default_max_claim_links_per_batch() -> u32 {
        500
    }

    const fn default_max_airdrop_addresses() -> u32 {
        5_000
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct CacheConfig {
    pub analytics_max_capacity: u64,
    pub analytics_ttl_seconds: u64,
    pub overview_max_capacity: u64,
    pub overview_ttl_seconds: u64,
}

impl CacheConfig {
    fn ensure_bounds(&self) -> Result<()> {
        if self.analytics_max_capacity < 10 {
            bail!("Analytics cache capacity must be at least 10");
        }
        if self.overview_max_capacity < 10 {
            bail!("Overview cache capacity must be at least 10");
        }
        if self.analytics_ttl_seconds == 0 || self.analytics_ttl_seconds > 86_400 {
            bail!("Analytics cache TTL must be within one day");
        }
        if self.overview_ttl_seconds == 0 || self.overview_ttl_seconds > 86_400 {
            bail!("Overview cache TTL must be within one day");
        }
        Ok(())
    }
}

fn map_config_error(err: ConfigError, path: &str) -> ConfigError {
    match err {
        ConfigError::NotFound(_) => ConfigError::NotFound(path.to_string()),
        other => other,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn cache() -> CacheConfig {
        CacheConfig {
            analytics_max_capacity: 1_000,
            analytics_ttl_seconds: 60,
            overview_max_capacity: 100,
            overview_ttl_seconds: 120,
        }
    }

    #[test]
    fn parses_toml_with_distribution_defaults() {
        let raw = r#"
            [server]
            port = 8080

            [database]
            url = "postgres://localhost/poap"
            max_connections = 10

            [minter]
            rpc_url = "http://127.0.0.1:8899"

            [cache]
            analytics_max_capacity = 1000
            analytics_ttl_seconds = 60
            overview_max_capacity = 100
            overview_ttl_seconds = 120
        "#;
        let config: ApiConfig = Config::builder()
            .add_source(File::from_str(raw, FileFormat::Toml))
            .build()
            .unwrap()
            .try_deserialize()
            .unwrap();

        assert!(config.validate().is_ok());
        assert_eq!(config.distribution.max_claim_links_per_batch, 500);
        assert_eq!(config.distribution.max_airdrop_addresses, 5_000);
        assert_eq!(config.minter.request_timeout(), Duration::from_secs(10));
        assert_eq!(
            config.server.address(),
            SocketAddr::new(IpAddr::V4(Ipv4Addr::LOCALHOST), 8080)
        );
    }

    #[test]
    fn cache_bounds_are_enforced() {
        assert!(cache().ensure_bounds().is_ok());

        let mut zero_ttl = cache();
        zero_ttl.analytics_ttl_seconds = 0;
        assert!(zero_ttl.ensure_bounds().is_err());

        let mut tiny = cache();
        tiny.overview_max_capacity = 1;
        assert!(tiny.ensure_bounds().is_err());
    }

    #[test]
    fn out_of_range_minter_timeout_fails_validation() {
        let raw = r#"
            [server]
            port = 8080

            [database]
            url = "postgres://localhost/poap"
            max_connections = 10

            [minter]
            rpc_url = "http://127.0.0.1:8899"
            request_timeout_ms = 50

            [cache]
            analytics_max_capacity = 1000
            analytics_ttl_seconds = 60
            overview_max_capacity = 100
            overview_ttl_seconds = 120
        "#;
        let mut config: ApiConfig = Config::builder()
            .add_source(File::from_str(raw, FileFormat::Toml))
            .build()
            .unwrap()
            .try_deserialize()
            .unwrap();
        assert!(config.validate().is_err());

        config.minter.request_timeout_ms = Some(600_000);
        assert!(config.validate().is_err());

        config.minter.request_timeout_ms = Some(2_500);
        assert!(config.validate().is_ok());
        assert_eq!(config.minter.request_timeout(), Duration::from_millis(2_500));
    }

    #[test]
    fn distribution_bounds_are_enforced() {
        let config = DistributionConfig {
            max_claim_links_per_batch: 0,
            max_airdrop_addresses: 10,
        };
        assert!(config.ensure_bounds().is_err());
    }
}
