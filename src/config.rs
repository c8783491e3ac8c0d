use std::path::PathBuf;

use crate::error::ConfigError;

pub const DEFAULT_STATUS_PATH: &str = "/tmp/niri_status.json";
pub const DEFAULT_SOURCE_COMMAND: &str = "niri msg --json event-stream";

pub const STATUS_FILE_VAR: &str = "NIRI_STATUS_FILE";
pub const SOURCE_COMMAND_VAR: &str = "NIRI_STATUS_COMMAND";
pub const EWW_VAR_VAR: &str = "NIRI_STATUS_EWW_VAR";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Config {
    pub status_path: PathBuf,
    pub source_program: String,
    pub source_args: Vec<String>,
    pub eww_var: Option<String>,
}

impl Config {
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_parts(std::env::args().skip(1), |key| std::env::var(key).ok())
    }

    /// `args` excludes the program name. Empty variables count as unset.
    pub fn from_parts(
        args: impl IntoIterator<Item = String>,
        var: impl Fn(&str) -> Option<String>,
    ) -> Result<Self, ConfigError> {
        let lookup = |key: &str| var(key).filter(|s| !s.is_empty());

        let mut args = args.into_iter();
        let path_arg = args.next();
        if let Some(extra) = args.next() {
            return Err(ConfigError::UnexpectedArgument(extra));
        }

        let status_path = path_arg
            .or_else(|| lookup(STATUS_FILE_VAR))
            .unwrap_or_else(|| DEFAULT_STATUS_PATH.to_owned())
            .into();

        let command = lookup(SOURCE_COMMAND_VAR).unwrap_or_else(|| DEFAULT_SOURCE_COMMAND.to_owned());
        let mut tokens = command.split_whitespace().map(str::to_owned);
        let source_program = tokens.next().ok_or(ConfigError::EmptyCommand)?;

        Ok(Self {
            status_path,
            source_program,
            source_args: tokens.collect(),
            eww_var: lookup(EWW_VAR_VAR),
        })
    }
}
