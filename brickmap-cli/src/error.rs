//! Error handling for the brickmap CLI

use brickmap_core::BrickError;
use std::path::PathBuf;
use thiserror::Error;

/// Errors reported to the user with suggestions
#[derive(Error, Debug)]
pub enum CliError {
    #[error("Configuration error: {message}")]
    Config { message: String },

    #[error("File not found: {path}")]
    FileNotFound { path: PathBuf },

    #[error("Invalid bounds '{input}': {message}")]
    InvalidBounds { input: String, message: String },

    #[error("Invalid point file {file}: {message}")]
    InvalidPoints { file: String, message: String },

    #[error("Density query incomplete: {message}")]
    PartialResult { message: String },

    #[error("Feature query failed: {message}")]
    Query { message: String },

    #[error("Validation error: {message}")]
    Validation { message: String },
}

impl CliError {
    pub fn config<S: Into<String>>(message: S) -> Self {
        Self::Config { message: message.into() }
    }

    pub fn file_not_found(path: PathBuf) -> Self {
        Self::FileNotFound { path }
    }

    pub fn invalid_bounds<S: Into<String>>(input: S, message: S) -> Self {
        Self::InvalidBounds {
            input: input.into(),
            message: message.into(),
        }
    }

    pub fn invalid_points<S: Into<String>>(file: S, message: S) -> Self {
        Self::InvalidPoints {
            file: file.into(),
            message: message.into(),
        }
    }

    pub fn validation<S: Into<String>>(message: S) -> Self {
        Self::Validation { message: message.into() }
    }
}

impl From<toml::de::Error> for CliError {
    fn from(err: toml::de::Error) -> Self {
        Self::config(format!("TOML parsing error: {}", err))
    }
}

impl From<BrickError> for CliError {
    fn from(err: BrickError) -> Self {
        let message = err.to_string();
        match err {
            BrickError::QueryDepthExceeded { .. } => Self::PartialResult { message },
            BrickError::QueryPrimitiveFailure { .. } | BrickError::Cancelled => Self::Query { message },
            _ => Self::validation(message),
        }
    }
}

/// Result type for CLI operations
pub type CliResult<T> = Result<T, CliError>;

/// Error text followed by hints for the common failure modes
pub fn format_error_with_suggestions(error: &CliError) -> String {
    let mut message = error.to_string();

    match error {
        CliError::FileNotFound { path } => {
            message.push_str(&format!(
                "\n\nSuggestions:\n\
                 • Check that the file path is correct: {}\n\
                 • Ensure you have read permissions for the file",
                path.display()
            ));
        }

        CliError::InvalidBounds { .. } => {
            message.push_str(
                "\n\nSuggestions:\n\
                 • Pass bounds as xmin,ymin,xmax,ymax, e.g. --bounds 0,0,256,256\n\
                 • Ensure xmax > xmin and ymax > ymin",
            );
        }

        CliError::InvalidPoints { .. } => {
            message.push_str(
                "\n\nSuggestions:\n\
                 • The point file must be a JSON array of {\"id\": .., \"x\": .., \"y\": ..}\n\
                 • Ids must be unsigned integers",
            );
        }

        CliError::PartialResult { .. } => {
            message.push_str(
                "\n\nSuggestions:\n\
                 • Raise the subdivision depth with --max-depth\n\
                 • Raise the per-request cap with --transfer-limit\n\
                 • Use --allow-partial to render the incomplete tile anyway",
            );
        }

        CliError::Config { .. } => {
            message.push_str(
                "\n\nSuggestions:\n\
                 • Check your brickmap.toml configuration file\n\
                 • Use 'brickmap config --example' to generate a sample configuration",
            );
        }

        _ => {}
    }

    message
}
