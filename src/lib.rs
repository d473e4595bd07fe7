//! KPI Ledger - per-user sales-funnel KPI tracking
//!
//! Users record daily pipeline activity (calls, appointments, quotes, sales)
//! and lead counts per self-defined channel. Every read recomputes monthly
//! totals, derived ratios and year-to-date figures from the stored records.
//!
//! # Features
//! - **server**: HTTP API (default)
//! - **cli**: Command-line reports and channel / active-month management
//!
//! # Architecture
//! - `metrics`: Metric schema (pipeline fields, channels, money)
//! - `aggregation`: Pure aggregation engine (totals, rollups, ratios, patches)
//! - `storage`: Daily ledger store (sea-orm)
//! - `presentation`: Display formatting
//! - `services`: KPI service shared by HTTP and CLI
//! - `api`: HTTP services and middleware
//! - `interfaces`: CLI
//! - `config`: Configuration management
//! - `runtime`: Application lifecycle and execution modes
//! - `system`: Logging

pub mod aggregation;
#[cfg(feature = "server")]
pub mod api;
#[cfg(feature = "cli")]
pub mod cli;
pub mod config;
pub mod errors;
pub mod interfaces;
pub mod metrics;
pub mod presentation;
pub mod runtime;
pub mod services;
pub mod storage;
pub mod system;
