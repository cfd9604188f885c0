//! CLI logic for the Busdecl introspection generator.
//!
//! Reads a TOML declaration file, declares its members through the
//! [`busdecl`] builder API and writes the resulting introspection document.

pub mod error_adapter;

mod args;
mod config;
mod declaration;
mod error;

pub use args::Args;
pub use config::ConfigError;
pub use declaration::DeclarationFile;
pub use error::CliError;

use std::{
    fs,
    io::{self, Write},
};

use log::info;

/// Run the Busdecl CLI application
///
/// # Arguments
///
/// * `args` - Command-line arguments
///
/// # Errors
///
/// Returns `CliError` for:
/// - File I/O errors
/// - Configuration loading errors
/// - Declaration file syntax errors
/// - Declaration errors raised while building the interface
pub fn run(args: &Args) -> Result<(), CliError> {
    info!(input_path = args.input; "Processing declaration");

    let config = config::load_config(args.config.as_ref())?;

    let source = fs::read_to_string(&args.input)?;
    let file: DeclarationFile = toml::from_str(&source).map_err(|err| CliError::syntax(&err, source.as_str()))?;

    let service = file.build(config)?;
    let document = service.introspection();

    match &args.output {
        Some(path) => {
            fs::write(path, document.as_bytes())?;
            info!(output_file = path, interface = service.namespace(); "Introspection document written");
        }
        None => {
            let mut stdout = io::stdout().lock();
            stdout.write_all(document.as_bytes())?;
            stdout.flush()?;
        }
    }

    Ok(())
}
