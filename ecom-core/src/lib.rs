//! # ecom-core
//!
//! Ambient runtime pieces shared by the ecom crates: the layered
//! [`EcomConfig`] loader and the global `tracing` subscriber setup.

pub mod config;
pub mod logging;

pub use config::{
    validate_section, ConfigError, ConfigProperties, ConfigValue, DefaultSecretResolver,
    EcomConfig, FromConfigValue, MissingKeyError, PropertyMeta, SecretResolver, Section,
};
pub use logging::{init_tracing, try_init_tracing};
