//! Environment configuration.

use std::env;
use std::net::SocketAddr;
use std::path::PathBuf;

use anyhow::Context;

use crate::types::DEFAULT_DISPLAY_SIZE;

pub const PROTOCOL_VERSION: &str = "1.0.0";

/// Server configuration
#[derive(Debug, Clone)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
    pub protocol_version: String,
    pub max_pending_commands: usize,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "127.0.0.1".to_string(),
            port: 7878,
            protocol_version: PROTOCOL_VERSION.to_string(),
            max_pending_commands: 16,
        }
    }
}

fn env_parse<T: std::str::FromStr>(key: &str) -> Option<T> {
    env::var(key).ok().and_then(|s| s.trim().parse().ok())
}

fn env_path(key: &str) -> Option<PathBuf> {
    env::var(key)
        .ok()
        .map(|s| s.trim().to_string())
        .filter(|s| !s.is_empty())
        .map(PathBuf::from)
}

impl ServerConfig {
    pub fn from_env() -> Self {
        let defaults = Self::default();
        Self {
            host: env::var("GUESSR_HOST").unwrap_or(defaults.host),
            port: env_parse("GUESSR_PORT").unwrap_or(defaults.port),
            protocol_version: defaults.protocol_version,
            max_pending_commands: env_parse("GUESSR_MAX_PENDING")
                .unwrap_or(defaults.max_pending_commands),
        }
    }

    pub fn socket_addr(&self) -> anyhow::Result<SocketAddr> {
        format!("{}:{}", self.host, self.port)
            .parse()
            .with_context(|| format!("invalid socket address {}:{}", self.host, self.port))
    }
}

/// Everything the binary needs to start.
#[derive(Debug, Clone)]
pub struct AppConfig {
    pub server: ServerConfig,
    pub maps_path: PathBuf,
    pub rounds_path: PathBuf,
    /// `None` falls back to the platform data directory.
    pub scores_path: Option<PathBuf>,
    pub display_size: f64,
    /// Fixed shuffle seed; unset means time based.
    pub seed: Option<u32>,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            server: ServerConfig::default(),
            maps_path: PathBuf::from("data/maps.json"),
            rounds_path: PathBuf::from("data/rounds.json"),
            scores_path: None,
            display_size: DEFAULT_DISPLAY_SIZE,
            seed: None,
        }
    }
}

impl AppConfig {
    pub fn from_env() -> Self {
        let defaults = Self::default();
        Self {
            server: ServerConfig::from_env(),
            maps_path: env_path("GUESSR_MAPS").unwrap_or(defaults.maps_path),
            rounds_path: env_path("GUESSR_ROUNDS").unwrap_or(defaults.rounds_path),
            scores_path: env_path("GUESSR_SCORES"),
            display_size: env_parse::<f64>("GUESSR_DISPLAY_SIZE")
                .filter(|v| v.is_finite() && *v > 0.0)
                .unwrap_or(defaults.display_size),
            seed: env_parse("GUESSR_SEED"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = AppConfig::default();
        assert_eq!(config.server.port, 7878);
        assert_eq!(config.server.max_pending_commands, 16);
        assert_eq!(config.display_size, 256.0);
        assert_eq!(config.maps_path, PathBuf::from("data/maps.json"));
    }

    #[test]
    fn test_socket_addr() {
        let config = ServerConfig::default();
        assert_eq!(
            config.socket_addr().unwrap(),
            "127.0.0.1:7878".parse().unwrap()
        );

        let bad = ServerConfig {
            host: "not a host".to_string(),
            ..ServerConfig::default()
        };
        assert!(bad.socket_addr().is_err());
    }

    #[test]
    fn test_from_env_does_not_panic() {
        let _config = AppConfig::from_env();
    }
}
