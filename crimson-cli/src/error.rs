//! Error handling for the crimson CLI

use std::path::PathBuf;
use thiserror::Error;

use crimson_core::CoreError;

#[derive(Error, Debug)]
pub enum CliError {
    #[error("Configuration error: {message}")]
    Config { message: String },

    #[error("Input/Output error: {message}")]
    Io { message: String },

    #[error("File not found: {path}")]
    FileNotFound { path: PathBuf },

    #[error("Parsing error in {file}: {message}")]
    Parse { file: String, message: String },

    #[error("No sequences found in {path}")]
    EmptyInput { path: PathBuf },

    #[error("Invalid reference sequence {name}: {source}")]
    InvalidReference {
        name: String,
        #[source]
        source: CoreError,
    },

    #[error("Mapping error: {0}")]
    Mapping(#[from] CoreError),
}

impl CliError {
    pub fn config<S: Into<String>>(message: S) -> Self {
        Self::Config { message: message.into() }
    }

    pub fn io<S: Into<String>>(message: S) -> Self {
        Self::Io { message: message.into() }
    }

    pub fn file_not_found(path: PathBuf) -> Self {
        Self::FileNotFound { path }
    }

    pub fn parse<F: Into<String>, M: Into<String>>(file: F, message: M) -> Self {
        Self::Parse {
            file: file.into(),
            message: message.into(),
        }
    }

    pub fn empty_input(path: PathBuf) -> Self {
        Self::EmptyInput { path }
    }

    pub fn invalid_reference<S: Into<String>>(name: S, source: CoreError) -> Self {
        Self::InvalidReference {
            name: name.into(),
            source,
        }
    }
}

impl From<std::io::Error> for CliError {
    fn from(err: std::io::Error) -> Self {
        Self::io(err.to_string())
    }
}

impl From<toml::de::Error> for CliError {
    fn from(err: toml::de::Error) -> Self {
        Self::config(format!("TOML parsing error: {}", err))
    }
}

impl From<toml::ser::Error> for CliError {
    fn from(err: toml::ser::Error) -> Self {
        Self::config(format!("TOML serialization error: {}", err))
    }
}

pub type CliResult<T> = Result<T, CliError>;

/// Error text followed by hints for the failures users can fix themselves.
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

        CliError::InvalidReference { .. } => {
            message.push_str(
                "\n\nSuggestions:\n\
                 • Only A, C, G and T (either case) are accepted\n\
                 • Remove or split ambiguous runs such as N before indexing",
            );
        }

        CliError::Config { .. } => {
            message.push_str(
                "\n\nSuggestions:\n\
                 • Check your crimson.toml configuration file\n\
                 • Use 'crimson config --example' to generate a sample configuration",
            );
        }

        CliError::Mapping(CoreError::InvalidParameter { .. }) => {
            message.push_str(
                "\n\nSuggestions:\n\
                 • k must be between 1 and 16 and w at least 1\n\
                 • The filter fraction must be within [0, 1]",
            );
        }

        _ => {}
    }

    message
}
