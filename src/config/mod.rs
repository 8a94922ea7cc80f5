//! Configuration module for sqlbench.
//!
//! Handles the settings file, the environment registry, and credential
//! expansion from environment variables.

mod settings;

pub use settings::{
    expand_env_vars, CacheSettings, CredentialSettings, Environment, HttpConnection, QuerySettings,
    ServerSettings, Settings, SettingsError, CONFIG_ENV_VAR,
};
