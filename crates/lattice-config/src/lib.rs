//! Runtime settings for a lattice client, persisted as RON.
//!
//! Every section is `#[serde(default)]`, so files written by older or newer
//! versions still load. Command-line flags override loaded values.

mod cli;
mod config;
mod error;

pub use cli::CliArgs;
pub use config::{CONFIG_FILE, Config, DebugConfig, NetworkConfig, WorldConfig};
pub use error::ConfigError;
