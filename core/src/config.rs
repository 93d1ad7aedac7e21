//! Configuration Module
//!
//! Layered loading: built-in defaults, then an optional TOML file
//! (`OPALINE_CONFIG` or `./opaline.toml`), then environment variable
//! overrides. Environment variables take precedence over TOML values.

use std::path::PathBuf;
use std::{env, fs};

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

use opaline_commitment::InstanceId;

const CONFIG_FILE_NAME: &str = "opaline.toml";

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RegistryConfig {
    /// Deployment label the instance identity is derived from.
    /// Commitments bind to it, so changing the label invalidates every
    /// pending decryption request.
    #[serde(default = "default_instance_label")]
    pub instance_label: String,
    /// Capacity of the service command channel.
    #[serde(default = "default_command_buffer")]
    pub command_buffer: usize,
}

impl Default for RegistryConfig {
    fn default() -> Self {
        Self {
            instance_label: default_instance_label(),
            command_buffer: default_command_buffer(),
        }
    }
}

fn default_instance_label() -> String {
    "opaline-dev".to_string()
}

fn default_command_buffer() -> usize {
    1000
}

impl RegistryConfig {
    /// Load configuration with env var overrides.
    pub fn load() -> Result<Self> {
        let mut config = Self::default();

        if let Some(config_path) = Self::find_config_file() {
            log::info!("Loading config from: {}", config_path.display());
            let contents = fs::read_to_string(&config_path).with_context(|| {
                format!("Failed to read config file: {}", config_path.display())
            })?;
            config = toml::from_str(&contents).with_context(|| {
                format!("Failed to parse config file: {}", config_path.display())
            })?;
        }

        config.apply_env_overrides();
        Ok(config)
    }

    /// The identity commitments bind to.
    pub fn instance(&self) -> InstanceId {
        InstanceId::from_label(&self.instance_label)
    }

    fn find_config_file() -> Option<PathBuf> {
        if let Ok(path) = env::var("OPALINE_CONFIG") {
            let path = PathBuf::from(path);
            if path.exists() {
                return Some(path);
            }
        }

        let local_path = PathBuf::from(CONFIG_FILE_NAME);
        if local_path.exists() {
            return Some(local_path);
        }

        None
    }

    fn apply_env_overrides(&mut self) {
        if let Ok(v) = env::var("OPALINE_INSTANCE") {
            self.instance_label = v;
        }
        if let Ok(v) = env::var("OPALINE_COMMAND_BUFFER") {
            if let Ok(n) = v.parse() {
                self.command_buffer = n;
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = RegistryConfig::default();
        assert_eq!(config.instance_label, "opaline-dev");
        assert_eq!(config.command_buffer, 1000);
    }

    #[test]
    fn test_parse_toml() {
        let parsed: RegistryConfig =
            toml::from_str("instance_label = \"prod-eu\"\n").unwrap();
        assert_eq!(parsed.instance_label, "prod-eu");
        assert_eq!(parsed.command_buffer, 1000, "missing fields take defaults");
    }

    #[test]
    fn test_instance_derivation_is_stable() {
        let a = RegistryConfig::default().instance();
        let b = RegistryConfig::default().instance();
        assert_eq!(a, b);
    }
}
