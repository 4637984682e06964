use std::{
    borrow::Cow,
    io::ErrorKind,
    path::{Path, PathBuf},
};

use compio::fs;
use hashlink::LinkedHashMap;
use saphyr::{LoadableYamlNode, Scalar, Yaml};
use snafu::prelude::*;
use tracing::{debug, info};

pub const DEFAULT_CONFIG_FILE_NAME: &str = "unixfs.yaml";

const SHELL_SECTION: &str = "shell";
const DEFAULT_PROMPT: &str = "unixfs> ";

/// Interpreter settings loaded from the `shell` section of the config file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ShellConfig {
    pub prompt: String,
    /// Echo every command line to the output before executing it
    pub echo: bool,
    /// Stop the session at the first failing command
    pub halt_on_error: bool,
    pub color: bool,
}

impl Default for ShellConfig {
    fn default() -> Self {
        Self {
            prompt: DEFAULT_PROMPT.to_string(),
            echo: false,
            halt_on_error: false,
            color: true,
        }
    }
}

impl ShellConfig {
    /// Reads the config at `path`, falling back to defaults when the file does
    /// not exist.
    pub async fn read(path: &Path) -> Result<Self, ShellConfigError> {
        match Self::from_path(path.to_path_buf()).await {
            Err(ShellConfigError::ReadError { source, .. })
                if source.kind() == ErrorKind::NotFound =>
            {
                info!(
                    "No config file found at {}, using defaults",
                    path.display()
                );
                Ok(Self::default())
            }
            other => other,
        }
    }

    pub async fn from_path(path: PathBuf) -> Result<Self, ShellConfigError> {
        debug!("Reading config file: {}", path.display());
        let bytes = fs::read(&path).await.context(ReadSnafu {
            file_path: path.display().to_string(),
        })?;
        debug!("Successfully read config file: {} bytes", bytes.len());

        let contents = String::from_utf8(bytes).context(EncodingSnafu {
            file_path: path.display().to_string(),
        })?;
        contents.as_str().try_into()
    }

    fn apply_shell_section(
        &mut self,
        section: &LinkedHashMap<Yaml, Yaml>,
    ) -> Result<(), ShellConfigError> {
        for (key, value) in section {
            match key.as_str() {
                Some("prompt") => {
                    self.prompt = value
                        .as_str()
                        .context(InvalidValueSnafu { key: "prompt" })?
                        .to_string();
                }
                Some("echo") => self.echo = Self::flag(value, "echo")?,
                Some("halt_on_error") => self.halt_on_error = Self::flag(value, "halt_on_error")?,
                Some("color") => self.color = Self::flag(value, "color")?,
                _ => debug!("Skipping unknown config entry: {:?}", key),
            }
        }
        Ok(())
    }

    fn flag(value: &Yaml, key: &str) -> Result<bool, ShellConfigError> {
        match value {
            Yaml::Value(Scalar::Boolean(flag)) => Ok(*flag),
            _ => InvalidValueSnafu { key }.fail(),
        }
    }
}

impl TryFrom<&str> for ShellConfig {
    type Error = ShellConfigError;

    fn try_from(contents: &str) -> Result<Self, Self::Error> {
        let documents = Yaml::load_from_str(contents).context(ParseSnafu)?;
        let document = documents.first().context(MalformedConfigSnafu)?;
        let top_level = document.as_mapping().context(TopLevelNotMapSnafu)?;

        let mut config = ShellConfig::default();
        match top_level.get(&Yaml::Value(Scalar::String(Cow::Borrowed(SHELL_SECTION)))) {
            None | Some(Yaml::Value(Scalar::Null)) => {
                debug!("Config has no shell section, using defaults");
            }
            Some(section) => {
                let section = section.as_mapping().context(ShellNotMapSnafu)?;
                config.apply_shell_section(section)?;
            }
        }

        Ok(config)
    }
}

#[derive(Debug, Snafu)]
pub enum ShellConfigError {
    #[snafu(display("Failed to read the config file: {}", file_path))]
    ReadError {
        file_path: String,
        source: std::io::Error,
    },
    #[snafu(display("Config file {} is not valid UTF-8", file_path))]
    EncodingError {
        file_path: String,
        source: std::string::FromUtf8Error,
    },
    #[snafu(display("Failed to parse the config file"))]
    ParseError { source: saphyr::ScanError },
    #[snafu(display("Improperly formatted config file"))]
    MalformedConfig,
    #[snafu(display("Top level of config should be a map"))]
    TopLevelNotMap,
    #[snafu(display("Shell section should be a map"))]
    ShellNotMap,
    #[snafu(display("Invalid value for config entry '{}'", key))]
    InvalidValue { key: String },
}
