use std::io::{self, IsTerminal};
use std::path::Path;

use compio::fs;
use snafu::Snafu;
use snafu::prelude::*;
use supports_color::Stream;
use tracing::{debug, info, warn};

use crate::application::RuntimeConfig;
use crate::config::{ShellConfig, ShellConfigError};
use crate::shell::{Shell, ShellError};

pub struct Application;

impl Application {
    pub async fn run(runtime_config: impl Into<RuntimeConfig>) -> Result<(), ApplicationError> {
        let runtime_config: RuntimeConfig = runtime_config.into();
        let mut shell_config = ShellConfig::read(&runtime_config.config_path)
            .await
            .context(ConfigSnafu)?;
        shell_config.echo |= runtime_config.echo;
        shell_config.color &= supports_color::on(Stream::Stderr).is_some();
        colored::control::set_override(shell_config.color);
        debug!("Loaded shell config: {:?}", shell_config);

        let script = match &runtime_config.script {
            Some(path) => Some(read_script(path).await?),
            None => None,
        };

        let stdout = io::stdout();
        let stderr = io::stderr();
        let mut shell = Shell::new(shell_config, stdout.lock(), stderr.lock());

        let session = match script {
            Some(script) => {
                info!("Running script with {} lines", script.lines().count());
                shell.run_script(&script)
            }
            None => {
                let stdin = io::stdin();
                let interactive = stdin.is_terminal();
                info!("Reading commands from stdin (interactive: {})", interactive);
                shell.run_interactive(stdin.lock(), interactive)
            }
        };

        debug!(
            "Session summary: {:?}, {} nodes live",
            shell.summary(),
            shell.filesystem().node_count()
        );
        let finished = shell.finish();
        settle(session, finished)
    }
}

/// Reports the session outcome ahead of any teardown failure. When both fail
/// the teardown error is logged so it is not silently dropped.
fn settle<S, F>(
    session: Result<S, ShellError>,
    finished: Result<F, ShellError>,
) -> Result<(), ApplicationError> {
    if let (Err(_), Err(error)) = (&session, &finished) {
        warn!("Failed to finish the session cleanly: {}", error);
    }
    session.context(SessionSnafu)?;
    finished.context(SessionSnafu)?;
    Ok(())
}

async fn read_script(path: &Path) -> Result<String, ApplicationError> {
    debug!("Reading script file: {}", path.display());
    let bytes = fs::read(path).await.context(ScriptReadSnafu {
        file_path: path.display().to_string(),
    })?;
    String::from_utf8(bytes).context(ScriptEncodingSnafu {
        file_path: path.display().to_string(),
    })
}

#[derive(Debug, Snafu)]
pub enum ApplicationError {
    #[snafu(display("Critical failure encountered during configuration stage"))]
    ConfigError { source: ShellConfigError },
    #[snafu(display("Failed to read the script file: {}", file_path))]
    ScriptReadError {
        file_path: String,
        source: std::io::Error,
    },
    #[snafu(display("Script file {} is not valid UTF-8", file_path))]
    ScriptEncodingError {
        file_path: String,
        source: std::string::FromUtf8Error,
    },
    #[snafu(display("Shell session ended abnormally"))]
    SessionError { source: ShellError },
}
