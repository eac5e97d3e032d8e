//! Core configuration types and loading.

use super::defaults::{
    default_backoff_base_ms, default_max_attempts, default_store_path, default_true,
};
use crate::keys::Keypair;
use peerinvite_proto::Seed;
use serde::Deserialize;
use std::path::Path;
use std::time::Duration;
use thiserror::Error;
use tracing::warn;

/// Configuration errors.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config file: {0}")]
    Io(#[from] std::io::Error),
    #[error("failed to parse config: {0}")]
    Parse(#[from] toml::de::Error),
    #[error("server.seed is not a valid identity seed: {0}")]
    Seed(#[from] peerinvite_proto::ParseError),
}

/// Node configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    /// Server identity.
    pub server: ServerConfig,
    /// Advertised transports.
    #[serde(default)]
    pub addresses: AddressesConfig,
    /// Invite issuance and storage.
    #[serde(default)]
    pub invite: InviteConfig,
    /// Client side of invite redemption.
    #[serde(default)]
    pub accept: AcceptConfig,
}

impl Config {
    /// Load configuration from a TOML file.
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path)?;
        Self::parse(&content)
    }

    /// Parse configuration from TOML text.
    pub fn parse(content: &str) -> Result<Self, ConfigError> {
        Ok(toml::from_str(content)?)
    }
}

/// Server identity configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct ServerConfig {
    /// Human-readable name, used in logs only.
    pub name: String,
    /// Base64 32-byte seed of the server identity.
    #[serde(default)]
    pub seed: Option<String>,
}

impl ServerConfig {
    /// Derive the server keypair.
    ///
    /// Without a configured seed a fresh identity is generated; invites it
    /// issues stop working once the process exits.
    pub fn identity(&self) -> Result<Keypair, ConfigError> {
        match &self.seed {
            Some(seed) => Ok(Keypair::from_seed(&Seed::from_base64(seed)?)),
            None => {
                let keys = Keypair::generate();
                warn!(server = %self.name, id = %keys.id(), "no server.seed configured, using an ephemeral identity");
                Ok(keys)
            }
        }
    }
}

/// Transports this node can be reached on, without the `~shs` suffix.
///
/// ```toml
/// [addresses]
/// public = ["net:203.0.113.5:8008", "ws://203.0.113.5:8989"]
/// ```
#[derive(Debug, Clone, Default, Deserialize)]
pub struct AddressesConfig {
    #[serde(default)]
    pub public: Vec<String>,
    #[serde(default)]
    pub local: Vec<String>,
    #[serde(default)]
    pub private: Vec<String>,
}

/// Invite issuance configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct InviteConfig {
    /// Allow invites that point at private or loopback addresses.
    #[serde(default)]
    pub allow_private: bool,
    /// Path of the redb invite database.
    #[serde(default = "default_store_path")]
    pub store_path: String,
    /// Persist redemptions with a compare-and-put instead of a plain write.
    #[serde(default = "default_true")]
    pub strict_usage_count: bool,
}

impl Default for InviteConfig {
    fn default() -> Self {
        Self {
            allow_private: false,
            store_path: default_store_path(),
            strict_usage_count: true,
        }
    }
}

/// Connection retry policy used when accepting an invite.
#[derive(Debug, Clone, Deserialize)]
pub struct AcceptConfig {
    #[serde(default = "default_max_attempts")]
    pub max_attempts: u32,
    #[serde(default = "default_backoff_base_ms")]
    pub backoff_base_ms: u64,
}

impl AcceptConfig {
    pub fn backoff_base(&self) -> Duration {
        Duration::from_millis(self.backoff_base_ms)
    }
}

impl Default for AcceptConfig {
    fn default() -> Self {
        Self {
            max_attempts: default_max_attempts(),
            backoff_base_ms: default_backoff_base_ms(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn minimal_config_uses_defaults() {
        let config = Config::parse("[server]\nname = \"pub.example.net\"\n").unwrap();
        assert_eq!(config.server.name, "pub.example.net");
        assert!(config.addresses.public.is_empty());
        assert!(!config.invite.allow_private);
        assert_eq!(config.invite.store_path, "invites.redb");
        assert!(config.invite.strict_usage_count);
        assert_eq!(config.accept.max_attempts, 3);
        assert_eq!(config.accept.backoff_base(), Duration::from_millis(500));
    }

    #[test]
    fn full_config_parses() {
        let seed = Seed::from_bytes([9u8; 32]).to_base64();
        let text = format!(
            r#"
[server]
name = "pub"
seed = "{seed}"

[addresses]
public = ["net:203.0.113.5:8008", "ws://203.0.113.5:8989"]
local = ["net:192.168.1.4:8008"]

[invite]
allow_private = true
store_path = "/var/lib/peerinvite/invites.redb"
strict_usage_count = false

[accept]
max_attempts = 5
backoff_base_ms = 100
"#
        );
        let config = Config::parse(&text).unwrap();
        assert_eq!(config.addresses.public.len(), 2);
        assert_eq!(config.addresses.local, vec!["net:192.168.1.4:8008"]);
        assert!(config.invite.allow_private);
        assert!(!config.invite.strict_usage_count);
        assert_eq!(config.accept.max_attempts, 5);

        let a = config.server.identity().unwrap();
        let b = config.server.identity().unwrap();
        assert_eq!(a.id(), b.id());
    }

    #[test]
    fn bad_seed_is_reported() {
        let config = Config::parse("[server]\nname = \"pub\"\nseed = \"nope\"\n").unwrap();
        assert!(matches!(config.server.identity(), Err(ConfigError::Seed(_))));
    }

    #[test]
    fn missing_server_section_fails() {
        assert!(matches!(Config::parse(""), Err(ConfigError::Parse(_))));
    }
}
