//! Configuration validation.
//!
//! Validates configuration at startup to catch common errors early.

use super::Config;
use peerinvite_proto::{Seed, Transport};
use std::path::Path;
use thiserror::Error;

/// Validation errors for configuration.
#[derive(Debug, Error)]
pub enum ValidationError {
    #[error("server.name is required")]
    MissingServerName,
    #[error("server.seed must be a base64 32-byte seed")]
    InvalidSeed,
    #[error("addresses.{scope} entry '{address}' is not a valid transport")]
    InvalidTransport { scope: &'static str, address: String },
    #[error("invite.store_path parent directory does not exist: {0}")]
    StorePathInvalid(String),
    #[error("accept.max_attempts must be at least 1")]
    NoAttempts,
}

/// Validate a configuration, returning all errors found.
pub fn validate(config: &Config) -> Result<(), Vec<ValidationError>> {
    let mut errors = Vec::new();

    if config.server.name.is_empty() {
        errors.push(ValidationError::MissingServerName);
    }
    if let Some(seed) = &config.server.seed
        && Seed::from_base64(seed).is_err()
    {
        errors.push(ValidationError::InvalidSeed);
    }

    let scopes = [
        ("public", &config.addresses.public),
        ("local", &config.addresses.local),
        ("private", &config.addresses.private),
    ];
    for (scope, addresses) in scopes {
        for address in addresses {
            if address.parse::<Transport>().is_err() {
                errors.push(ValidationError::InvalidTransport {
                    scope,
                    address: address.clone(),
                });
            }
        }
    }

    let store_path = Path::new(&config.invite.store_path);
    if let Some(parent) = store_path.parent()
        && !parent.as_os_str().is_empty()
        && !parent.exists()
    {
        errors.push(ValidationError::StorePathInvalid(
            config.invite.store_path.clone(),
        ));
    }

    if config.accept.max_attempts == 0 {
        errors.push(ValidationError::NoAttempts);
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}
