//! CLI interface module
//!
//! Commands run directly against the ledger store; they share the
//! `KpiService` with the HTTP API, so validation and aggregation match.

pub mod commands;

use std::fmt;

use crate::cli::{ChannelCommands, Commands, ConfigCommands, MonthsCommands};
use crate::config::StaticConfig;
use crate::runtime::lifetime::startup::{StartupContext, prepare_startup};
use crate::services::RequestContext;
use commands::{
    add_channel, config_generate, list_channels, print_report, set_months, show_months,
    toggle_channel,
};

#[derive(Debug)]
pub enum CliError {
    StorageError(String),
    ParseError(String),
    CommandError(String),
}

impl CliError {
    /// Format as simple output
    pub fn format_simple(&self) -> String {
        match self {
            CliError::StorageError(msg) => format!("Storage error: {}", msg),
            CliError::ParseError(msg) => format!("Parse error: {}", msg),
            CliError::CommandError(msg) => format!("Command error: {}", msg),
        }
    }

    /// Format as colored output
    pub fn format_colored(&self) -> String {
        use colored::Colorize;
        match self {
            CliError::StorageError(msg) => {
                format!("{} {}", "Storage error:".red().bold(), msg.white())
            }
            CliError::ParseError(msg) => {
                format!("{} {}", "Parse error:".yellow().bold(), msg.white())
            }
            CliError::CommandError(msg) => {
                format!("{} {}", "Command error:".red().bold(), msg.white())
            }
        }
    }
}

impl fmt::Display for CliError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.format_simple())
    }
}

impl std::error::Error for CliError {}

impl From<crate::errors::KpiError> for CliError {
    fn from(err: crate::errors::KpiError) -> Self {
        use crate::errors::KpiError;
        match err {
            KpiError::Validation(_)
            | KpiError::DateParse(_)
            | KpiError::Serialization(_)
            | KpiError::Unauthorized(_) => CliError::ParseError(err.message().to_string()),
            KpiError::NotFound(_) => CliError::CommandError(err.message().to_string()),
            _ => CliError::StorageError(err.message().to_string()),
        }
    }
}

/// CLI 没有请求头，user id 由参数给出
fn cli_context(user: i64) -> Result<RequestContext, CliError> {
    RequestContext::new(user, format!("cli-{}", uuid::Uuid::new_v4())).map_err(CliError::from)
}

async fn startup(config: &StaticConfig) -> Result<StartupContext, CliError> {
    prepare_startup(config)
        .await
        .map_err(|e| CliError::StorageError(format!("{:#}", e)))
}

/// Run a CLI command from clap-parsed input
pub async fn run_cli_command(cmd: Commands, config: &StaticConfig) -> Result<(), CliError> {
    // Generate doesn't need DB connection
    if let Commands::Config {
        action: ConfigCommands::Generate { output_path, force },
    } = cmd
    {
        return config_generate(output_path, force).await;
    }

    let ctx = startup(config).await?;

    match cmd {
        Commands::Report {
            user,
            year,
            month,
            scope,
        } => {
            let req = cli_context(user)?;
            print_report(&ctx, &req, year, month, scope).await
        }

        Commands::Channel { action } => match action {
            ChannelCommands::Add {
                user,
                name,
                inactive,
            } => add_channel(&ctx.service, &cli_context(user)?, &name, !inactive).await,
            ChannelCommands::List { user, scope } => {
                list_channels(&ctx.service, &cli_context(user)?, scope).await
            }
            ChannelCommands::Toggle {
                user, id, active, ..
            } => toggle_channel(&ctx.service, &cli_context(user)?, id, active).await,
        },

        Commands::Months { action } => match action {
            MonthsCommands::Show { user, year } => {
                show_months(&ctx.service, &cli_context(user)?, year).await
            }
            MonthsCommands::Set { user, year, months } => {
                set_months(&ctx.service, &cli_context(user)?, year, &months).await
            }
        },

        Commands::Serve => unreachable!("handled in main"),
        Commands::Config { .. } => unreachable!("handled above"),
    }
}
