use std::path::PathBuf;

use shared::config::validate_http_url;
use thiserror::Error;

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CliOptions {
    pub api_url: Option<String>,
    pub store_path: Option<PathBuf>,
}

#[derive(Debug, Error)]
pub enum CliError {
    #[error("unknown argument: {0}")]
    UnknownArgument(String),
    #[error("missing value for argument: {0}")]
    MissingValue(String),
    #[error("{0}")]
    InvalidApiUrl(String),
    #[error("help requested")]
    HelpRequested,
}

impl CliOptions {
    pub fn parse<I>(args: I) -> Result<Self, CliError>
    where
        I: IntoIterator<Item = String>,
    {
        let mut options = Self::default();

        let mut iter = args.into_iter();
        while let Some(arg) = iter.next() {
            match arg.as_str() {
                "--help" | "-h" => return Err(CliError::HelpRequested),
                "--api-url" => {
                    let value = iter.next().ok_or(CliError::MissingValue(arg.clone()))?;
                    let value = validate_http_url("--api-url", value.trim())
                        .map_err(|err| CliError::InvalidApiUrl(err.to_string()))?;
                    options.api_url = Some(value);
                }
                "--store" => {
                    let value = iter.next().ok_or(CliError::MissingValue(arg.clone()))?;
                    options.store_path = Some(PathBuf::from(value));
                }
                unknown => return Err(CliError::UnknownArgument(unknown.to_string())),
            }
        }

        Ok(options)
    }
}

/// One line typed at the prompt.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ReplCommand {
    Send(String),
    Retry,
    Clear,
    Session,
    Help,
    Quit,
    Unknown(String),
    Empty,
}

impl ReplCommand {
    pub fn parse(line: &str) -> Self {
        let trimmed = line.trim();
        if trimmed.is_empty() {
            return Self::Empty;
        }
        if !trimmed.starts_with('/') {
            return Self::Send(line.trim_end_matches(['\r', '\n']).to_string());
        }

        match trimmed {
            "/retry" => Self::Retry,
            "/clear" => Self::Clear,
            "/session" => Self::Session,
            "/help" => Self::Help,
            "/quit" | "/exit" => Self::Quit,
            other => Self::Unknown(other.to_string()),
        }
    }
}
