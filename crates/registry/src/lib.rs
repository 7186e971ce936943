//! Read-only client for the remote script registry.
//!
//! Provides connection configuration, the token exchange and script
//! listing calls, and validation of the returned JSON into
//! [`ScriptRecord`](scriptsync_core::record::ScriptRecord)s.

pub mod client;
pub mod config;
pub mod remote;

pub use client::{RegistryClient, RegistryError};
pub use config::{ConfigError, RegistryConfig};
