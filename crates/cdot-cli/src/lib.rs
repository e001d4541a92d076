//! CLI logic for the cdot graph tool.
//!
//! Reads a source file (or a built-in sample), renders its syntax tree as
//! DOT and writes the result to a file or stdout.

pub mod error_adapter;

mod args;
mod config;

pub use args::Args;

use std::{
    fs,
    io::{self, Write},
};

use log::info;

use cdot::{CdotError, GraphBuilder};

/// Program rendered when no input file is given.
pub const SAMPLE_SOURCE: &str =
    "#include <stdio.h>\n\nint main(int argc, char *argv[])\n{\n\tprintf(\"Hello, world!\");\n}";

/// Run the cdot CLI application
///
/// # Arguments
///
/// * `args` - Command-line arguments
///
/// # Errors
///
/// Returns `CdotError` for:
/// - File I/O errors
/// - Configuration loading errors
/// - Parsing errors
/// - Traversal errors
/// - Invalid DOT output when `--validate` is set
pub fn run(args: &Args) -> Result<(), CdotError> {
    info!(
        input_path = args.input.as_deref().unwrap_or("<sample>"),
        output_path = args.output.as_deref().unwrap_or("<stdout>");
        "Processing source"
    );

    let app_config = config::load_config(args.config.as_ref())?;

    let source = match &args.input {
        Some(path) => fs::read_to_string(path)?,
        None => SAMPLE_SOURCE.to_string(),
    };

    let builder = GraphBuilder::new(app_config);
    let tree = builder.parse(&source)?;
    let dot = builder.render_dot(&tree)?;

    if args.validate {
        validate(&dot)?;
    }

    match &args.output {
        Some(path) => {
            fs::write(path, &dot)?;
            info!(output_file = path.as_str(); "DOT exported successfully");
        }
        None => {
            let mut stdout = io::stdout().lock();
            stdout.write_all(dot.as_bytes())?;
            stdout.flush()?;
        }
    }

    Ok(())
}

#[cfg(feature = "graphviz")]
fn validate(dot: &str) -> Result<(), CdotError> {
    let summary = cdot::validate::check_dot(dot)?;
    info!(nodes = summary.nodes, edges = summary.edges; "DOT output is valid");
    Ok(())
}

#[cfg(not(feature = "graphviz"))]
fn validate(_dot: &str) -> Result<(), CdotError> {
    log::warn!("Built without the graphviz feature, skipping DOT validation");
    Ok(())
}
