use std::path::PathBuf;

use clap::Parser;

use crate::application::data::LogLevel;
use crate::config::DEFAULT_CONFIG_FILE_NAME;

/// Simulated Unix filesystem shell
#[derive(Parser, Debug, Clone)]
#[command(version)]
pub struct Cli {
    /// File with one command per line. Commands are read from stdin when absent
    pub script: Option<PathBuf>,
    #[clap(long, short, default_value = "warn", value_enum)]
    pub log_level: LogLevel,

    /// YAML file with shell settings
    #[clap(long, short, default_value = DEFAULT_CONFIG_FILE_NAME)]
    pub config: PathBuf,

    /// Echo each command before executing it
    #[clap(long)]
    pub echo: bool,
}
