//! Configuration loading and management.
//!
//! This module is split into logical submodules:
//! - [`types`]: Core config struct definitions (Config, ServerConfig) and loading
//! - [`listen`]: Network listener configuration (ListenConfig, UdpConfig)
//! - [`limits`]: Per-session limits and queue depths (LimitsConfig)
//! - [`storage`]: Session log and metrics file locations (StorageConfig)
//! - [`validation`]: Startup sanity checks

mod limits;
mod listen;
mod storage;
mod types;
mod validation;

pub use types::Config;
pub use validation::validate;
