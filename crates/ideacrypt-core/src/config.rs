//! Runtime settings
//!
//! Loaded by the host (e.g. from a TOML file). Missing fields take their
//! defaults, so an empty document is a valid configuration.

use ideacrypt_crypto::KeyVersion;
use serde::Deserialize;

use crate::error::ConfigError;

/// Encryption settings.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct CryptoConfig {
    /// Encrypt outgoing messages automatically when a default key exists
    /// for the target (default: true)
    pub autocrypt: bool,
    /// Key expansion version used for outgoing messages (default: 3)
    pub key_version: u32,
    /// Re-emit own outgoing messages for local display (default: true)
    pub echo_formats: bool,
}

impl Default for CryptoConfig {
    fn default() -> Self {
        Self { autocrypt: true, key_version: KeyVersion::LATEST.number(), echo_formats: true }
    }
}

impl CryptoConfig {
    /// Parse and validate a TOML document.
    pub fn from_toml(source: &str) -> Result<Self, ConfigError> {
        let config: Self =
            toml::from_str(source).map_err(|err| ConfigError::Parse { reason: err.to_string() })?;
        config.validate()?;
        Ok(config)
    }

    /// Check that every field holds a supported value.
    pub fn validate(&self) -> Result<(), ConfigError> {
        self.key_version().map(|_| ())
    }

    /// Configured key expansion version.
    pub fn key_version(&self) -> Result<KeyVersion, ConfigError> {
        Ok(KeyVersion::try_from(self.key_version)?)
    }
}
