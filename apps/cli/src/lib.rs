#![allow(clippy::print_stdout)]

//! # Blocks CLI
//!
//! Scaffolds projects from directory templates rendered with `minijinja`.
//!
//! ```text
//! blocks scaffold new my-service -t axum-service --var Port=9000
//! blocks scaffold list
//! blocks version --json
//! ```
//!
//! The [`tmpl`] module is usable without the binary:
//!
//! ```rust,no_run
//! use blocks_cli::tmpl::{GenerationConfig, generate_project};
//!
//! let report = generate_project(&GenerationConfig {
//!     template_name: "axum-service".to_owned(),
//!     output_dir: "my-service".into(),
//!     project_name: "my-service".to_owned(),
//!     ..GenerationConfig::default()
//! })
//! .unwrap();
//! println!("{} files", report.files.len());
//! ```

pub mod handlers;
pub mod models;
pub mod tmpl;

use anyhow::Result;

use crate::handlers::{scaffold, version};
use crate::models::args::{AppCommands, Cli, ScaffoldAction};

/// Dispatches a parsed command line.
///
/// # Errors
/// Returns the failing command's error.
pub fn run(cli: Cli) -> Result<()> {
    match cli.command {
        AppCommands::Scaffold { action } => match action {
            ScaffoldAction::New(args) => scaffold::new_project(&args)?,
            ScaffoldAction::List { templates_dirs } => scaffold::list(&templates_dirs)?,
        },
        AppCommands::Version { json } => version::show(json)?,
    }

    Ok(())
}
