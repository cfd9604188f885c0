//! Command-line argument definitions for the Busdecl CLI.
//!
//! This module defines the [`Args`] structure parsed from the command line
//! using [`clap`]. Arguments control the declaration file, the output
//! destination, configuration file selection, and logging verbosity.

use clap::Parser;

/// Command-line arguments for the Busdecl introspection generator
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
pub struct Args {
    /// Path to the TOML declaration file
    #[arg(help = "Path to the input declaration file")]
    pub input: String,

    /// Path to the output XML file; standard output when omitted
    #[arg(short, long)]
    pub output: Option<String>,

    /// Path to configuration file (TOML)
    #[arg(short, long)]
    pub config: Option<String>,

    /// Log level (off, error, warn, info, debug, trace)
    #[arg(long, default_value = "info")]
    pub log_level: String,
}
