use std::path::Path;

use common::config::{ConfigManager, FileContentConfigProvider, Validate, YamlConfigSerializer};
use common::{HostSetup, Role, RoundCount, Symbol};
use serde::{Deserialize, Serialize};

pub const CONFIG_FILE: &str = "tictactoe_peer_config.yaml";

pub fn get_config_manager(
    path: &Path,
) -> ConfigManager<FileContentConfigProvider, PeerConfig, YamlConfigSerializer> {
    ConfigManager::from_yaml_file(path)
}

#[derive(Debug, PartialEq, Serialize, Deserialize, Clone, Default)]
pub struct PeerConfig {
    pub host: HostConfig,
    pub connector: ConnectorConfig,
}

impl PeerConfig {
    /// Checks only the section the chosen mode reads.
    pub fn validate_for(&self, role: Role) -> Result<(), String> {
        match role {
            Role::Host => self.host.validate(),
            Role::Connector => self.connector.validate(),
        }
    }
}

/// Sections are checked by `validate_for` once the mode is known, so a file
/// with a broken host section still serves `connect`.
impl Validate for PeerConfig {
    fn validate(&self) -> Result<(), String> {
        Ok(())
    }
}

#[derive(Debug, PartialEq, Serialize, Deserialize, Clone)]
pub struct HostConfig {
    pub bind_address: String,
    pub port: u16,
    pub symbol: Symbol,
    pub rounds: i64,
}

impl HostConfig {
    pub fn listen_address(&self) -> String {
        format!("{}:{}", self.bind_address, self.port)
    }

    pub fn setup(&self) -> HostSetup {
        HostSetup::new(self.symbol, self.rounds)
    }
}

impl Validate for HostConfig {
    fn validate(&self) -> Result<(), String> {
        if self.bind_address.is_empty() {
            return Err("host bind_address must not be empty".to_string());
        }
        if self.port == 0 {
            return Err("host port must be greater than 0".to_string());
        }
        RoundCount::new(self.rounds).map_err(|e| e.to_string())?;
        Ok(())
    }
}

impl Default for HostConfig {
    fn default() -> Self {
        Self {
            bind_address: "0.0.0.0".to_string(),
            port: 5050,
            symbol: Symbol::X,
            rounds: 3,
        }
    }
}

#[derive(Debug, PartialEq, Serialize, Deserialize, Clone)]
pub struct ConnectorConfig {
    pub address: String,
}

impl Validate for ConnectorConfig {
    fn validate(&self) -> Result<(), String> {
        if self.address.is_empty() {
            return Err("connector address must not be empty".to_string());
        }
        Ok(())
    }
}

impl Default for ConnectorConfig {
    fn default() -> Self {
        Self {
            address: "127.0.0.1:5050".to_string(),
        }
    }
}
