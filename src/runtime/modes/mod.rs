//! Mode routing
//!
//! - Server mode (HTTP API), the default when no subcommand is given
//! - CLI mode (reports, channel and active-month management)

#[cfg(feature = "server")]
pub mod server;

#[cfg(feature = "cli")]
pub mod cli;

#[cfg(feature = "server")]
pub use server::{configure_app, run_server};

#[cfg(feature = "cli")]
pub use cli::run_cli;
