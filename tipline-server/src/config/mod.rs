//! Configuration module for tipline-server.
//!
//! Handles loading configuration from the TOML file and CLI arguments,
//! with validation of the PromptPay target and the matching knobs.

pub mod file;

use crate::config::file::FileConfig;
use std::net::SocketAddr;
use std::path::Path;
use thiserror::Error;
use tipline_core::promptpay;

/// Errors that can occur during configuration loading.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config file: {0}")]
    IoError(#[from] std::io::Error),

    #[error("failed to parse config file: {0}")]
    ParseError(#[from] toml::de::Error),

    #[error("validation error: {0}")]
    ValidationError(String),
}

/// Configuration loader that handles the complete loading process.
pub struct ConfigLoader {
    config_path: std::path::PathBuf,
    listen_override: Option<SocketAddr>,
}

impl ConfigLoader {
    /// Create a new config loader.
    pub fn new(config_path: impl AsRef<Path>, listen_override: Option<SocketAddr>) -> Self {
        Self {
            config_path: config_path.as_ref().to_path_buf(),
            listen_override,
        }
    }

    /// Load and validate the configuration.
    ///
    /// Reads the TOML file, applies CLI overrides, and checks that the
    /// PromptPay target and matching knobs are usable.
    pub fn load(&self) -> Result<FileConfig, ConfigError> {
        let config_content = std::fs::read_to_string(&self.config_path)?;
        let mut file_config: FileConfig = toml::from_str(&config_content)?;

        if let Some(listen) = self.listen_override {
            file_config.server.listen = listen;
        }

        self.validate(&file_config)?;
        Ok(file_config)
    }

    /// Reload the configuration (used during SIGHUP).
    pub fn reload(&self) -> Result<FileConfig, ConfigError> {
        self.load()
    }

    fn validate(&self, config: &FileConfig) -> Result<(), ConfigError> {
        // A target the payload builder rejects would fail on every single
        // donation request; refuse to start instead.
        if let Err(e) = promptpay::build_payload(&config.promptpay.target, None) {
            return Err(ConfigError::ValidationError(format!(
                "promptpay target {:?}: {e}",
                config.promptpay.target
            )));
        }

        if config.matching.tolerance.is_sign_negative() {
            return Err(ConfigError::ValidationError(format!(
                "matching tolerance must not be negative, got {}",
                config.matching.tolerance
            )));
        }
        if config.matching.ttl_secs == 0 {
            return Err(ConfigError::ValidationError(
                "matching ttl_secs must be at least 1".to_owned(),
            ));
        }
        if config.matching.sweep_secs == 0 || config.matching.pacing_secs == 0 {
            return Err(ConfigError::ValidationError(
                "sweep_secs and pacing_secs must be at least 1".to_owned(),
            ));
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    fn write_config(content: &str) -> tempfile::NamedTempFile {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        file.write_all(content.as_bytes()).unwrap();
        file
    }

    #[test]
    fn loads_a_valid_config_with_listen_override() {
        let file = write_config("[promptpay]\ntarget = \"0815404297\"\n");
        let listen: SocketAddr = "127.0.0.1:9999".parse().unwrap();
        let loader = ConfigLoader::new(file.path(), Some(listen));

        let config = loader.load().unwrap();
        assert_eq!(config.server.listen, listen);
    }

    #[test]
    fn rejects_a_digitless_promptpay_target() {
        let file = write_config("[promptpay]\ntarget = \"call me maybe\"\n");
        let loader = ConfigLoader::new(file.path(), None);

        assert!(matches!(
            loader.load(),
            Err(ConfigError::ValidationError(_))
        ));
    }

    #[test]
    fn rejects_a_zero_ttl() {
        let file = write_config(
            "[promptpay]\ntarget = \"0815404297\"\n\n[matching]\nttl_secs = 0\n",
        );
        let loader = ConfigLoader::new(file.path(), None);

        assert!(matches!(
            loader.load(),
            Err(ConfigError::ValidationError(_))
        ));
    }
}
