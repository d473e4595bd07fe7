//! Service layer
//!
//! Business logic shared by the HTTP API and the CLI.

mod context;
mod kpi_service;

pub use context::RequestContext;
pub use kpi_service::*;
