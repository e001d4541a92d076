//! Command-line argument definitions for the cdot CLI.
//!
//! This module defines the [`Args`] structure parsed from the command line
//! using [`clap`]. Arguments control input/output paths, configuration file
//! selection, output validation and logging verbosity.

use clap::Parser;

/// Command-line arguments for the cdot graph tool
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
pub struct Args {
    /// Path to the input source file
    #[arg(help = "Path to the input file (renders a built-in sample when omitted)")]
    pub input: Option<String>,

    /// Path to the output DOT file
    #[arg(short, long, help = "Path to the output file (stdout when omitted)")]
    pub output: Option<String>,

    /// Path to configuration file (TOML)
    #[arg(short, long)]
    pub config: Option<String>,

    /// Log level (off, error, warn, info, debug, trace)
    #[arg(long, default_value = "info")]
    pub log_level: String,

    /// Parse the generated DOT text again before writing it
    #[arg(long)]
    pub validate: bool,
}
