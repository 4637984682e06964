//! Command interpreter driving the in-memory filesystem.

mod command;
mod interpreter;

pub use interpreter::{Shell, ShellError};
