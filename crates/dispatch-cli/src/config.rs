//! CLI configuration from environment and files.

use anyhow::{Context, Result};
use dispatch_core::DroneConfig;
use std::env;
use std::fs;
use std::path::{Path, PathBuf};

#[derive(Debug, Clone)]
pub struct Config {
    pub distances_path: PathBuf,
    pub orders_path: PathBuf,
    pub log_directive: String,
}

impl Config {
    pub fn from_env() -> Self {
        Self {
            distances_path: env::var("DISPATCH_DISTANCES")
                .map(PathBuf::from)
                .unwrap_or_else(|_| PathBuf::from("distances.csv")),
            orders_path: env::var("DISPATCH_ORDERS")
                .map(PathBuf::from)
                .unwrap_or_else(|_| PathBuf::from("deliveries.csv")),
            log_directive: env::var("DISPATCH_LOG")
                .unwrap_or_else(|_| "dispatch=info".to_string()),
        }
    }
}

/// Read a drone configuration from a JSON file. Missing fields take defaults.
pub fn load_drone_config(path: &Path) -> Result<DroneConfig> {
    let text = fs::read_to_string(path)
        .with_context(|| format!("reading drone config {}", path.display()))?;
    parse_drone_config(&text).with_context(|| format!("parsing drone config {}", path.display()))
}

pub fn parse_drone_config(text: &str) -> Result<DroneConfig> {
    let config: DroneConfig = serde_json::from_str(text)?;
    config.validate()?;
    Ok(config)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_partial_config() {
        let config = parse_drone_config(r#"{"payload_capacity": 800, "return_to_home": true}"#)
            .unwrap();
        assert_eq!(config.payload_capacity, 800.0);
        assert!(config.return_to_home);
        assert_eq!(config.battery_capacity, 1.0);
    }

    #[test]
    fn test_parse_rejects_invalid_capacity() {
        assert!(parse_drone_config(r#"{"battery_capacity": -1}"#).is_err());
    }

    #[test]
    fn test_parse_rejects_bad_json() {
        assert!(parse_drone_config("{ not json").is_err());
    }
}
