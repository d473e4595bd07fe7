//! Configuration
//!
//! TOML file + `KPI__*` environment overrides, loaded once at startup and
//! shared through an `ArcSwap`.

mod r#impl;
mod structs;

pub use r#impl::{get_config, init_config, init_config_from};
pub use structs::*;
