//! Configuration for the reputation ledger

use crate::types::Address;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;

/// Service configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Service name
    pub service_name: String,

    /// Service version
    pub service_version: String,

    /// Identities allowed to initiate transactions
    pub marketplaces: Vec<String>,

    /// Tracing filter directive (`RUST_LOG` syntax)
    pub log_filter: String,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            service_name: "reputation-core".to_string(),
            service_version: env!("CARGO_PKG_VERSION").to_string(),
            marketplaces: Vec::new(),
            log_filter: "info".to_string(),
        }
    }
}

impl Config {
    /// Load from file
    pub fn from_file(path: impl AsRef<std::path::Path>) -> crate::Result<Self> {
        let content = std::fs::read_to_string(path)?;
        Self::from_toml_str(&content)
    }

    /// Parse TOML text
    pub fn from_toml_str(content: &str) -> crate::Result<Self> {
        let config: Config = toml::from_str(content)
            .map_err(|e| crate::Error::Config(format!("Failed to parse config: {}", e)))?;
        Ok(config)
    }

    /// Load from environment variables
    pub fn from_env() -> crate::Result<Self> {
        let mut config = Config::default();

        if let Ok(marketplaces) = std::env::var("REPUTATION_MARKETPLACES") {
            config.marketplaces = parse_list(&marketplaces);
        }

        if let Ok(filter) = std::env::var("REPUTATION_LOG") {
            config.log_filter = filter;
        }

        Ok(config)
    }

    /// Check marketplace entries
    pub fn validate(&self) -> crate::Result<()> {
        let mut seen = HashSet::new();

        for entry in &self.marketplaces {
            let address = Address::new(entry.trim());
            if address.is_empty() {
                return Err(crate::Error::Config(
                    "Marketplace address must not be blank".to_string(),
                ));
            }
            if !seen.insert(address) {
                return Err(crate::Error::Config(format!(
                    "Duplicate marketplace address: {}",
                    entry.trim()
                )));
            }
        }

        Ok(())
    }

    /// Marketplace identities, surrounding whitespace removed
    pub fn marketplace_addresses(&self) -> Vec<Address> {
        self.marketplaces
            .iter()
            .map(|entry| Address::new(entry.trim()))
            .collect()
    }
}

fn parse_list(value: &str) -> Vec<String> {
    value
        .split(',')
        .map(str::trim)
        .filter(|entry| !entry.is_empty())
        .map(str::to_string)
        .collect()
}
