//! Errors of the command-line driver.

use jade_parse::{EditError, TreeError};
use jade_signature::SignatureError;
use thiserror::Error;

/// Why a command could not run.
///
/// Parse problems in the input are not errors: they are reported as
/// diagnostics.
#[derive(Debug, Error)]
pub enum CliError {
    #[error("cannot find file '{path}'")]
    NotFound { path: String },
    #[error("permission denied reading '{path}'")]
    PermissionDenied { path: String },
    #[error("'{path}' contains invalid UTF-8 data")]
    InvalidUtf8 { path: String },
    #[error("cannot read '{path}': {source}")]
    Read {
        path: String,
        #[source]
        source: std::io::Error,
    },
    #[error("'{path}' is larger than 4 GiB")]
    TooLarge { path: String },
    #[error("cannot write output: {0}")]
    Output(#[from] std::io::Error),
    #[error("invalid {what} '{value}'")]
    InvalidArgument { what: &'static str, value: String },
    #[error("unknown option '{0}'")]
    UnknownOption(String),
    #[error("usage: {0}")]
    Usage(&'static str),
    #[error(transparent)]
    Edit(#[from] EditError),
    #[error(transparent)]
    Tree(#[from] TreeError),
    #[error("invalid signature: {0}")]
    Signature(#[from] SignatureError),
}

impl CliError {
    /// Classify a failure to read `path`.
    pub fn read(path: &str, error: std::io::Error) -> Self {
        let path = path.to_string();
        match error.kind() {
            std::io::ErrorKind::NotFound => CliError::NotFound { path },
            std::io::ErrorKind::PermissionDenied => CliError::PermissionDenied { path },
            std::io::ErrorKind::InvalidData => CliError::InvalidUtf8 { path },
            _ => CliError::Read {
                path,
                source: error,
            },
        }
    }
}
