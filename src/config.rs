//! Runtime-overridable configuration (C2), loaded from TOML. Every field
//! defaults to the constant of the same purpose in [`crate::constants`];
//! an embedder only needs to override what it wants to change.

use crate::constants;
use crate::error::{NetError, NetResult};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
#[serde(default)]
pub struct WorldConfig {
    pub grid_edge: u32,
    pub voxel_size: f32,
    pub surface_threshold: u8,
    pub terraform_reach: f32,
    pub terraform_speed: f32,
}

impl Default for WorldConfig {
    fn default() -> Self {
        Self {
            grid_edge: constants::DEFAULT_GRID_EDGE,
            voxel_size: constants::DEFAULT_VOXEL_SIZE,
            surface_threshold: constants::SURFACE_THRESHOLD,
            terraform_reach: constants::DEFAULT_TERRAFORM_REACH,
            terraform_speed: constants::DEFAULT_TERRAFORM_SPEED,
        }
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
#[serde(default)]
pub struct NetConfig {
    pub server_port: u16,
    pub client_port: u16,
    pub command_rate_hz: f32,
    pub snapshot_rate_hz: f32,
    pub epsilon_position: f32,
    pub epsilon_direction: f32,
}

impl Default for NetConfig {
    fn default() -> Self {
        Self {
            server_port: constants::DEFAULT_SERVER_PORT,
            client_port: constants::DEFAULT_CLIENT_PORT,
            command_rate_hz: constants::DEFAULT_COMMAND_RATE,
            snapshot_rate_hz: constants::DEFAULT_SNAPSHOT_RATE,
            epsilon_position: constants::DEFAULT_EPSILON_POSITION,
            epsilon_direction: constants::DEFAULT_EPSILON_DIRECTION,
        }
    }
}

#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub world: WorldConfig,
    pub net: NetConfig,
}

impl Config {
    pub fn from_toml_str(contents: &str) -> NetResult<Self> {
        toml::from_str(contents).map_err(|e| NetError::InvalidConfig { field: "<root>".to_string(), reason: e.to_string() })
    }

    pub fn to_toml_string(&self) -> NetResult<String> {
        toml::to_string_pretty(self).map_err(|e| NetError::ConfigIo(e.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_match_constants() {
        let config = Config::default();
        assert_eq!(config.world.grid_edge, constants::DEFAULT_GRID_EDGE);
        assert_eq!(config.net.server_port, constants::DEFAULT_SERVER_PORT);
    }

    #[test]
    fn partial_toml_overrides_only_named_fields() {
        let config = Config::from_toml_str("[net]\nserver_port = 7000\n").unwrap();
        assert_eq!(config.net.server_port, 7000);
        assert_eq!(config.net.client_port, constants::DEFAULT_CLIENT_PORT);
        assert_eq!(config.world.grid_edge, constants::DEFAULT_GRID_EDGE);
    }

    #[test]
    fn malformed_toml_is_an_error() {
        assert!(Config::from_toml_str("not valid toml [[[").is_err());
    }

    #[test]
    fn round_trips_through_to_toml_string() {
        let config = Config::default();
        let text = config.to_toml_string().unwrap();
        let parsed = Config::from_toml_str(&text).unwrap();
        assert_eq!(parsed.world.grid_edge, config.world.grid_edge);
    }
}
