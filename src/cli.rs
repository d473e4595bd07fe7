//! Command-line interface definitions using clap

use clap::{Parser, Subcommand};

use crate::metrics::ChannelScope;

/// KPI ledger - daily sales-funnel tracking with monthly and YTD rollups
#[derive(Parser)]
#[command(name = "kpi-ledger")]
#[command(version)]
#[command(about = "Per-user KPI ledger service", long_about = None)]
pub struct Cli {
    /// Configuration file path (default: config.toml)
    #[arg(long, short = 'c', global = true)]
    pub config: Option<String>,

    #[command(subcommand)]
    pub command: Option<Commands>,
}

/// Available commands
#[derive(Subcommand)]
pub enum Commands {
    /// Start the HTTP server (default when no command is given)
    Serve,

    /// Print a formatted monthly or yearly report
    Report {
        /// User ID
        #[arg(long, short = 'u')]
        user: i64,

        /// Year, e.g. 2026
        #[arg(long, short = 'y')]
        year: i32,

        /// Month (1-12); omit for the yearly summary
        #[arg(long, short = 'm')]
        month: Option<u32>,

        /// Channel scope: all | active
        #[arg(long)]
        scope: Option<ChannelScope>,
    },

    /// Manage lead channels
    Channel {
        #[command(subcommand)]
        action: ChannelCommands,
    },

    /// Manage the active months used for YTD and averages
    Months {
        #[command(subcommand)]
        action: MonthsCommands,
    },

    /// Configuration management
    Config {
        #[command(subcommand)]
        action: ConfigCommands,
    },
}

#[derive(Subcommand)]
pub enum ChannelCommands {
    /// Add a lead channel
    Add {
        #[arg(long, short = 'u')]
        user: i64,

        /// Channel name
        name: String,

        /// Create the channel hidden from the entry form
        #[arg(long)]
        inactive: bool,
    },

    /// List lead channels
    List {
        #[arg(long, short = 'u')]
        user: i64,

        /// Channel scope: all | active
        #[arg(long, default_value = "all")]
        scope: ChannelScope,
    },

    /// Show or hide a channel in the entry form
    Toggle {
        #[arg(long, short = 'u')]
        user: i64,

        /// Channel ID
        id: i64,

        #[arg(long, conflicts_with = "inactive", required_unless_present = "inactive")]
        active: bool,

        #[arg(long)]
        inactive: bool,
    },
}

#[derive(Subcommand)]
pub enum MonthsCommands {
    /// Show the active months of a year
    Show {
        #[arg(long, short = 'u')]
        user: i64,

        #[arg(long, short = 'y')]
        year: i32,
    },

    /// Replace the active months of a year
    ///
    /// Usage: months set --user 1 --year 2026 1 2 3
    /// Pass no month to clear all flags.
    Set {
        #[arg(long, short = 'u')]
        user: i64,

        #[arg(long, short = 'y')]
        year: i32,

        /// Active months (1-12)
        #[arg(num_args = 0.., value_parser = clap::value_parser!(u32).range(1..=12))]
        months: Vec<u32>,
    },
}

/// Configuration management commands
#[derive(Subcommand)]
pub enum ConfigCommands {
    /// Generate example configuration file
    Generate {
        /// Output path (default: config.example.toml, `-` for stdout)
        output_path: Option<String>,

        /// Force overwrite without confirmation
        #[arg(long)]
        force: bool,
    },
}
