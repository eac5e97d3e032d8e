//! Configuration loading and management.
//!
//! This module is split into logical submodules:
//! - [`types`]: Config struct definitions and loading
//! - [`defaults`]: serde default functions
//! - [`validation`]: startup checks that report every problem at once

mod defaults;
mod types;
mod validation;

pub use types::{
    AcceptConfig, AddressesConfig, Config, ConfigError, InviteConfig, ServerConfig,
};
pub use validation::{ValidationError, validate};
