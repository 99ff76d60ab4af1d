//! Application glue module
//!
//! Configuration for the demo shell. The library core never reads it
//! implicitly; values are passed in where they are needed.

mod config;

pub use config::{default_path, Config, ConfigError, InputConfig, Theme};
