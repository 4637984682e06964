use std::path::PathBuf;

use crate::cli::Cli;

#[derive(Debug, Clone)]
pub struct RuntimeConfig {
    pub script: Option<PathBuf>,
    pub config_path: PathBuf,
    /// Overrides the `echo` setting of the config file when set
    pub echo: bool,
}

impl From<Cli> for RuntimeConfig {
    fn from(cli: Cli) -> Self {
        Self {
            script: cli.script,
            config_path: cli.config,
            echo: cli.echo,
        }
    }
}
