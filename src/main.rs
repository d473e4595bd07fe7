use clap::Parser;

use kpi_ledger::cli::{Cli, Commands};
use kpi_ledger::config::{DEFAULT_CONFIG_PATH, get_config, init_config_from};
use kpi_ledger::runtime::modes;
use kpi_ledger::system::init_logging;

#[actix_web::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    let cli = Cli::parse();
    init_config_from(cli.config.as_deref().unwrap_or(DEFAULT_CONFIG_PATH));
    let config = get_config();

    match cli.command {
        None | Some(Commands::Serve) => {
            // guard 必须存活到进程结束，否则缓冲的日志会丢失
            let _guard = init_logging(&config.logging);
            modes::run_server(&config).await
        }
        Some(cmd) => {
            // CLI 模式只输出 warn 以上，避免干扰命令输出
            let mut logging = config.logging.clone();
            if logging.file.is_none() {
                logging.level = "warn".to_string();
            }
            let _guard = init_logging(&logging);

            if let Err(e) = modes::run_cli(cmd, &config).await {
                eprintln!("{}", e.format_colored());
                std::process::exit(1);
            }
            Ok(())
        }
    }
}
