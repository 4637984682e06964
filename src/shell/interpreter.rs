use std::fmt::Display;
use std::io::{BufRead, Write};

use colored::Colorize;
use snafu::{ResultExt, Snafu};
use tracing::{debug, info};

use crate::config::ShellConfig;
use crate::filesystem::FileSystem;
use crate::shell::command::Command;

/// Prefix for errors that cannot be attributed to a command.
const SHELL_NAME: &str = "unixfs";

const HELP: &str = "\
touch NAME   create an empty file
mkdir NAME   create a directory
cd [NAME]    change directory (., .. and / are understood)
ls [NAME]    list a directory, or name a file
pwd          print the working directory
rm NAME      remove a file or a directory with everything inside it
help         show this help
exit         leave the shell
";

/// What the session should do after a line has been executed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Flow {
    Continue,
    Failed,
    Exit,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SessionSummary {
    pub executed: usize,
    pub failed: usize,
}

/// Line-oriented interpreter driving a single [`FileSystem`].
///
/// Command output goes to `output`, error reports to `errors`.
pub struct Shell<O, E> {
    filesystem: FileSystem,
    config: ShellConfig,
    output: O,
    errors: E,
    summary: SessionSummary,
}

impl<O: Write, E: Write> Shell<O, E> {
    pub fn new(config: ShellConfig, output: O, errors: E) -> Self {
        Self {
            filesystem: FileSystem::new(),
            config,
            output,
            errors,
            summary: SessionSummary::default(),
        }
    }

    pub fn filesystem(&self) -> &FileSystem {
        &self.filesystem
    }

    pub fn summary(&self) -> SessionSummary {
        self.summary
    }

    /// Executes every line of `script` in order.
    pub fn run_script(&mut self, script: &str) -> Result<SessionSummary, ShellError> {
        for (index, line) in script.lines().enumerate() {
            if self.run_numbered_line(index + 1, line)? == Flow::Exit {
                break;
            }
        }
        Ok(self.summary)
    }

    /// Reads and executes lines until end of input or `exit`, printing the
    /// configured prompt before each line when `prompt` is set.
    pub fn run_interactive(
        &mut self,
        mut input: impl BufRead,
        prompt: bool,
    ) -> Result<SessionSummary, ShellError> {
        let mut line = String::new();
        let mut number = 0;
        loop {
            if prompt {
                write!(self.output, "{}", self.config.prompt).context(OutputSnafu)?;
                self.output.flush().context(OutputSnafu)?;
            }

            line.clear();
            if input.read_line(&mut line).context(InputSnafu)? == 0 {
                debug!("Reached end of input after {} lines", number);
                break;
            }
            number += 1;

            if self.run_numbered_line(number, &line)? == Flow::Exit {
                break;
            }
        }
        Ok(self.summary)
    }

    /// Parses and executes a single line.
    pub fn run_line(&mut self, line: &str) -> Result<Flow, ShellError> {
        match Command::parse_line(line) {
            Ok(Some(command)) => {
                self.summary.executed += 1;
                self.execute(command)
            }
            Ok(None) => Ok(Flow::Continue),
            Err(error) => {
                self.report(SHELL_NAME, &error)?;
                Ok(Flow::Failed)
            }
        }
    }

    /// Tears the filesystem down and returns the number of nodes released.
    pub fn finish(mut self) -> Result<usize, ShellError> {
        self.output.flush().context(OutputSnafu)?;
        let released = self.filesystem.destroy();
        info!(
            "Session finished: {} commands, {} failed, {} nodes released",
            self.summary.executed, self.summary.failed, released
        );
        Ok(released)
    }

    fn run_numbered_line(&mut self, number: usize, line: &str) -> Result<Flow, ShellError> {
        let trimmed = line.trim();
        if self.config.echo && !trimmed.is_empty() {
            writeln!(self.output, "{}{}", self.config.prompt, trimmed).context(OutputSnafu)?;
        }

        let flow = self.run_line(line)?;
        if flow == Flow::Failed && self.config.halt_on_error {
            return HaltedSnafu { line: number }.fail();
        }
        Ok(flow)
    }

    fn execute(&mut self, command: Command) -> Result<Flow, ShellError> {
        debug!("Executing {:?}", command);
        let result = match &command {
            Command::Touch(name) => self.filesystem.create_file(name),
            Command::Mkdir(name) => self.filesystem.create_directory(name),
            Command::Cd(name) => self.filesystem.change_directory(name),
            Command::Ls(name) => match self.filesystem.list(name) {
                Ok(listing) => {
                    write!(self.output, "{listing}").context(OutputSnafu)?;
                    Ok(())
                }
                Err(error) => Err(error),
            },
            Command::Pwd => {
                writeln!(self.output, "{}", self.filesystem.working_directory())
                    .context(OutputSnafu)?;
                Ok(())
            }
            Command::Rm(name) => self.filesystem.remove(name).map(|_| ()),
            Command::Help => {
                self.output.write_all(HELP.as_bytes()).context(OutputSnafu)?;
                Ok(())
            }
            Command::Exit => return Ok(Flow::Exit),
        };

        match result {
            Ok(()) => Ok(Flow::Continue),
            Err(error) => {
                self.report(command.keyword(), &error)?;
                Ok(Flow::Failed)
            }
        }
    }

    fn report(&mut self, prefix: &str, error: &dyn Display) -> Result<(), ShellError> {
        self.summary.failed += 1;
        let message = format!("{prefix}: {error}");
        let written = if self.config.color {
            writeln!(self.errors, "{}", message.red())
        } else {
            writeln!(self.errors, "{message}")
        };
        written.context(ErrorOutputSnafu)
    }
}

#[derive(Debug, Snafu)]
pub enum ShellError {
    #[snafu(display("Failed to read command input"))]
    InputError { source: std::io::Error },
    #[snafu(display("Failed to write command output"))]
    OutputError { source: std::io::Error },
    #[snafu(display("Failed to write error output"))]
    ErrorOutputError { source: std::io::Error },
    #[snafu(display("Stopped at line {} after a failing command", line))]
    Halted { line: usize },
}
