mod shell_config;

pub use shell_config::{DEFAULT_CONFIG_FILE_NAME, ShellConfig, ShellConfigError};
