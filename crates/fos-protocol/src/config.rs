use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::ConfigError;

/// Protocol version written into, and expected at the head of, every frame.
pub const PROTOCOL_VERSION: i32 = 1;

/// Largest payload or skip region accepted by default.
pub const MAX_PAYLOAD_LEN: usize = 64 * 1024 * 1024;

/// Limits and switches for encoding batches and decoding replies.
///
/// Every field has a default, so a TOML file only needs the keys it
/// changes.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ProtocolConfig {
    /// Version a reply frame must start with.
    pub version: i32,
    /// Upper bound on the reply count of one frame.
    pub max_replies: usize,
    /// Upper bound on a single reply payload or rollback skip region.
    pub max_payload_len: usize,
    /// Upper bound on requests in one message.
    pub max_requests: usize,
    /// When `true`, a request that leaves part of its payload unread is a
    /// malformed frame rather than a logged, drained leftover.
    pub strict_payloads: bool,
}

impl Default for ProtocolConfig {
    fn default() -> Self {
        Self {
            version: PROTOCOL_VERSION,
            max_replies: 65_536,
            max_payload_len: MAX_PAYLOAD_LEN,
            max_requests: 65_536,
            strict_payloads: false,
        }
    }
}

impl ProtocolConfig {
    pub fn from_toml_str(s: &str) -> Result<Self, ConfigError> {
        let config: Self = toml::from_str(s).map_err(|e| ConfigError::Parse(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    /// Load from a TOML file.
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let text = std::fs::read_to_string(path)?;
        Self::from_toml_str(&text)
    }

    pub fn to_toml_string(&self) -> Result<String, ConfigError> {
        toml::to_string_pretty(self).map_err(|e| ConfigError::Serialization(e.to_string()))
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.version <= 0 {
            return Err(ConfigError::Invalid(format!(
                "version must be positive, got {}",
                self.version
            )));
        }
        if self.max_replies == 0 || self.max_requests == 0 {
            return Err(ConfigError::Invalid(
                "max_replies and max_requests must be non-zero".into(),
            ));
        }
        if self.max_payload_len > i32::MAX as usize {
            return Err(ConfigError::Invalid(format!(
                "max_payload_len {} exceeds the wire limit {}",
                self.max_payload_len,
                i32::MAX
            )));
        }
        Ok(())
    }
}
