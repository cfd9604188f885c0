//! Error type of the CLI.

use std::{io, ops::Range};

use thiserror::Error;

use busdecl::BusdeclError;

use crate::config::ConfigError;

#[derive(Debug, Error)]
pub enum CliError {
    #[error(transparent)]
    Busdecl(#[from] BusdeclError),

    #[error("Invalid declaration file: {message}")]
    Syntax {
        message: String,
        span: Option<Range<usize>>,
        src: String,
    },

    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error("I/O error: {0}")]
    Io(#[from] io::Error),
}

impl CliError {
    /// Wraps a TOML error together with the source it was raised for.
    pub fn syntax(err: &toml::de::Error, src: impl Into<String>) -> Self {
        Self::Syntax {
            message: err.message().to_string(),
            span: err.span(),
            src: src.into(),
        }
    }
}
