// SPDX-License-Identifier: MIT

//! Service configuration from the environment (`.env` is loaded by `main`)

use crate::error::RulesError;
use std::net::{IpAddr, Ipv4Addr, SocketAddr};
use std::path::PathBuf;

pub const DEFAULT_PORT: u16 = 8080;

#[derive(Debug, Clone, PartialEq)]
pub struct ServerConfig {
    pub host: IpAddr,
    pub port: u16,
    /// Rule file to preload into the registry
    pub rules_file: Option<PathBuf>,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: IpAddr::V4(Ipv4Addr::LOCALHOST),
            port: DEFAULT_PORT,
            rules_file: None,
        }
    }
}

impl ServerConfig {
    /// Read `CONDITION_HOST`, `CONDITION_PORT` and `CONDITION_RULES`
    pub fn from_env() -> Result<Self, RulesError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    fn from_lookup<F>(lookup: F) -> Result<Self, RulesError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut config = Self::default();

        if let Some(host) = lookup("CONDITION_HOST") {
            config.host = host
                .parse()
                .map_err(|e| RulesError::config(format!("CONDITION_HOST '{}': {}", host, e)))?;
        }
        if let Some(port) = lookup("CONDITION_PORT") {
            config.port = port
                .parse()
                .map_err(|e| RulesError::config(format!("CONDITION_PORT '{}': {}", port, e)))?;
        }
        config.rules_file = lookup("CONDITION_RULES")
            .filter(|s| !s.is_empty())
            .map(PathBuf::from);

        Ok(config)
    }

    pub fn addr(&self) -> SocketAddr {
        SocketAddr::new(self.host, self.port)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn config_from(pairs: &[(&str, &str)]) -> Result<ServerConfig, RulesError> {
        let env: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        ServerConfig::from_lookup(|key| env.get(key).cloned())
    }

    #[test]
    fn test_defaults() {
        let config = config_from(&[]).unwrap();
        assert_eq!(config, ServerConfig::default());
        assert_eq!(config.addr().to_string(), "127.0.0.1:8080");
    }

    #[test]
    fn test_overrides() {
        let config = config_from(&[
            ("CONDITION_HOST", "0.0.0.0"),
            ("CONDITION_PORT", "9000"),
            ("CONDITION_RULES", "rules.yaml"),
        ])
        .unwrap();
        assert_eq!(config.addr().to_string(), "0.0.0.0:9000");
        assert_eq!(config.rules_file, Some(PathBuf::from("rules.yaml")));
    }

    #[test]
    fn test_invalid_port() {
        let err = config_from(&[("CONDITION_PORT", "http")]).unwrap_err();
        assert!(matches!(err, RulesError::Config(_)));
        assert!(err.to_string().contains("CONDITION_PORT 'http'"));
    }

    #[test]
    fn test_empty_rules_path_is_ignored() {
        let config = config_from(&[("CONDITION_RULES", "")]).unwrap();
        assert!(config.rules_file.is_none());
    }
}
