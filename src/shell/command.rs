use snafu::Snafu;

use crate::filesystem::name::CURRENT_DIR;

const COMMENT_PREFIX: char = '#';

/// A single parsed shell command.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    Touch(String),
    Mkdir(String),
    Cd(String),
    Ls(String),
    Pwd,
    Rm(String),
    Help,
    Exit,
}

impl Command {
    /// Parses one input line. Blank lines and `#` comments yield `None`.
    pub fn parse_line(line: &str) -> Result<Option<Self>, ParseError> {
        let line = line.trim();
        if line.is_empty() || line.starts_with(COMMENT_PREFIX) {
            return Ok(None);
        }
        line.try_into().map(Some)
    }

    /// The keyword the command was invoked with, used to prefix error reports.
    pub fn keyword(&self) -> &'static str {
        match self {
            Command::Touch(_) => "touch",
            Command::Mkdir(_) => "mkdir",
            Command::Cd(_) => "cd",
            Command::Ls(_) => "ls",
            Command::Pwd => "pwd",
            Command::Rm(_) => "rm",
            Command::Help => "help",
            Command::Exit => "exit",
        }
    }
}

impl TryFrom<&str> for Command {
    type Error = ParseError;

    fn try_from(line: &str) -> Result<Self, Self::Error> {
        let mut tokens = line.split_ascii_whitespace();
        let Some(keyword) = tokens.next() else {
            return MissingCommandSnafu.fail();
        };
        let argument = tokens.next().map(str::to_string);
        if let Some(extra) = tokens.next() {
            return UnexpectedArgumentSnafu {
                command: keyword,
                argument: extra,
            }
            .fail();
        }

        let required = |argument: Option<String>| {
            argument.ok_or_else(|| ParseError::MissingArgument {
                command: keyword.to_string(),
            })
        };
        let optional =
            |argument: Option<String>| argument.unwrap_or_else(|| CURRENT_DIR.to_string());
        let nullary = |argument: Option<String>, command: Command| match argument {
            Some(argument) => UnexpectedArgumentSnafu {
                command: keyword,
                argument,
            }
            .fail(),
            None => Ok(command),
        };

        match keyword {
            "touch" => Ok(Command::Touch(required(argument)?)),
            "mkdir" => Ok(Command::Mkdir(required(argument)?)),
            "rm" => Ok(Command::Rm(required(argument)?)),
            "cd" => Ok(Command::Cd(optional(argument))),
            "ls" => Ok(Command::Ls(optional(argument))),
            "pwd" => nullary(argument, Command::Pwd),
            "help" => nullary(argument, Command::Help),
            "exit" | "quit" => nullary(argument, Command::Exit),
            _ => UnknownCommandSnafu { command: keyword }.fail(),
        }
    }
}

#[derive(Debug, Snafu, PartialEq, Eq)]
pub enum ParseError {
    #[snafu(display("No command given"))]
    MissingCommand,
    #[snafu(display("Unknown command '{}'", command))]
    UnknownCommand { command: String },
    #[snafu(display("'{}' requires a name", command))]
    MissingArgument { command: String },
    #[snafu(display("Unexpected argument '{}' for '{}'", argument, command))]
    UnexpectedArgument { command: String, argument: String },
}
