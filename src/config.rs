use alloy::primitives::{address, Address};
use config::{builder::DefaultState, Config, ConfigBuilder, ConfigError, Environment, File};
use serde::Deserialize;

use crate::multicall::utils::{DEFAULT_BATCH_SIZE, DEFAULT_CONCURRENCY, MULTICALL3_ADDRESS};

/// Where and how aggregates are sent. Passed to the executor explicitly so
/// the same process can target several chains or aggregator deployments.
#[derive(Debug, Deserialize, Clone, PartialEq, Eq)]
#[serde(default)]
pub struct MulticallConfig {
    /// Aggregator contract exposing `tryAggregate`.
    pub address: Address,
    /// Abort the whole aggregate when one sub-call fails.
    pub require_success: bool,
    /// Maximum calls per aggregate; larger batches are split.
    pub batch_size: usize,
    /// Maximum aggregates awaiting a response at once.
    pub concurrency: usize,
}

impl Default for MulticallConfig {
    fn default() -> Self {
        Self {
            address: MULTICALL3_ADDRESS,
            require_success: false,
            batch_size: DEFAULT_BATCH_SIZE,
            concurrency: DEFAULT_CONCURRENCY,
        }
    }
}

/// `tokenOfOwnerByIndex` query run by the binary.
#[derive(Debug, Deserialize, Clone, PartialEq, Eq)]
#[serde(default)]
pub struct TokenQuery {
    pub contract: Address,
    pub owner: Address,
    pub count: u64,
}

impl Default for TokenQuery {
    fn default() -> Self {
        Self {
            contract: address!("F3857306a37264f15a19ad37DA8A9485e5f7CfB3"),
            owner: address!("f3857306a37264f15a19ad37da8a9485e5f7cfb3"),
            count: 5,
        }
    }
}

#[derive(Debug, Deserialize, Clone, PartialEq, Eq)]
#[serde(default)]
pub struct Settings {
    pub rpc_url: String,
    pub log_level: String,
    pub multicall: MulticallConfig,
    pub query: TokenQuery,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            rpc_url: "https://rpc.ankr.com/bsc".to_string(),
            log_level: "info".to_string(),
            multicall: MulticallConfig::default(),
            query: TokenQuery::default(),
        }
    }
}

impl Settings {
    /// Reads an optional `multicall.{toml,yaml,json}` in the working
    /// directory, then `MULTICALL__*` environment variables
    /// (e.g. `MULTICALL__MULTICALL__BATCH_SIZE=100`).
    pub fn new() -> Result<Self, ConfigError> {
        Self::load(
            Config::builder()
                .add_source(File::with_name("multicall").required(false))
                .add_source(Environment::with_prefix("MULTICALL").separator("__")),
        )
    }

    pub fn load(builder: ConfigBuilder<DefaultState>) -> Result<Self, ConfigError> {
        builder.build()?.try_deserialize()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use config::FileFormat;

    #[test]
    fn defaults_when_nothing_is_set() {
        let settings = Settings::load(Config::builder()).unwrap();
        assert_eq!(settings, Settings::default());
        assert_eq!(settings.multicall.address, MULTICALL3_ADDRESS);
        assert!(!settings.multicall.require_success);
    }

    #[test]
    fn partial_file_overrides() {
        let toml = r#"
            rpc_url = "http://localhost:8545"

            [multicall]
            require_success = true
            batch_size = 50
            concurrency = 2
        "#;
        let settings =
            Settings::load(Config::builder().add_source(File::from_str(toml, FileFormat::Toml)))
                .unwrap();
        assert_eq!(settings.rpc_url, "http://localhost:8545");
        assert!(settings.multicall.require_success);
        assert_eq!(settings.multicall.batch_size, 50);
        assert_eq!(settings.multicall.concurrency, 2);
        assert_eq!(settings.multicall.address, MULTICALL3_ADDRESS);
        assert_eq!(settings.log_level, "info");
    }

    #[test]
    fn custom_aggregator_address() {
        let toml = r#"
            [multicall]
            address = "0x5ba1e12693dc8f9c48aad8770482f4739beed696"
        "#;
        let settings =
            Settings::load(Config::builder().add_source(File::from_str(toml, FileFormat::Toml)))
                .unwrap();
        assert_eq!(
            settings.multicall.address,
            address!("5ba1e12693dc8f9c48aad8770482f4739beed696")
        );
    }
}
