//! CLI commands

mod channels;
mod config_gen;
mod months;
mod report;

pub use channels::{add_channel, list_channels, toggle_channel};
pub use config_gen::config_generate;
pub use months::{set_months, show_months};
pub use report::print_report;
