//! # CLI Argument Definitions
//!
//! Command-line structure of the `blocks` binary.

use clap::{Args, Parser, Subcommand};
use std::path::PathBuf;

#[derive(Debug, Parser)]
#[command(name = "blocks")]
#[command(version = env!("CARGO_PKG_VERSION"))]
#[command(arg_required_else_help = true)]
#[command(about = "Scaffold backend services from templates")]
pub struct Cli {
    /// Print debug logs
    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: AppCommands,
}

#[derive(Debug, Subcommand)]
pub enum AppCommands {
    /// Generate and inspect projects from templates
    Scaffold {
        #[command(subcommand)]
        action: ScaffoldAction,
    },
    /// Show build information
    Version {
        /// Print as JSON
        #[arg(short, long)]
        json: bool,
    },
}

#[derive(Debug, Subcommand)]
pub enum ScaffoldAction {
    /// Create a new project from a template
    New(NewArgs),
    /// List available templates
    List {
        /// Additional directory to search for templates (repeatable)
        #[arg(long = "templates-dir", value_name = "DIR")]
        templates_dirs: Vec<PathBuf>,
    },
}

#[derive(Debug, Args)]
pub struct NewArgs {
    /// Name of the project to create
    pub project: String,

    /// Template to use
    #[arg(short, long, value_name = "NAME")]
    pub template: String,

    /// Output directory (defaults to ./<PROJECT>)
    #[arg(short, long, value_name = "DIR")]
    pub output: Option<PathBuf>,

    /// Module path (defaults to github.com/user/<PROJECT>)
    #[arg(short, long, value_name = "PATH")]
    pub module: Option<String>,

    /// Overwrite a non-empty output directory
    #[arg(short, long)]
    pub force: bool,

    /// Template variable (repeatable)
    #[arg(long = "var", value_name = "KEY=VALUE", value_parser = parse_key_value)]
    pub vars: Vec<(String, String)>,

    /// Additional directory to search for templates (repeatable)
    #[arg(long = "templates-dir", value_name = "DIR")]
    pub templates_dirs: Vec<PathBuf>,
}

/// Splits `KEY=VALUE` at the first `=`; the value may be empty.
fn parse_key_value(raw: &str) -> Result<(String, String), String> {
    match raw.split_once('=') {
        Some((key, value)) if !key.trim().is_empty() => Ok((key.trim().to_owned(), value.to_owned())),
        _ => Err(format!("expected KEY=VALUE, got '{raw}'")),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn command_is_well_formed() {
        Cli::command().debug_assert();
    }

    #[test]
    fn parses_scaffold_new() {
        let cli = Cli::try_parse_from([
            "blocks", "-v", "scaffold", "new", "demo", "-t", "axum-service", "--var", "Port=9000", "--var",
            "Url=http://x?a=b", "-f",
        ])
        .unwrap();
        assert!(cli.verbose);
        let AppCommands::Scaffold { action: ScaffoldAction::New(args) } = cli.command else {
            panic!("expected scaffold new");
        };
        assert_eq!(args.project, "demo");
        assert!(args.force);
        assert_eq!(args.vars[1], ("Url".to_owned(), "http://x?a=b".to_owned()));
    }

    #[test]
    fn rejects_malformed_vars() {
        assert!(parse_key_value("novalue").is_err());
        assert!(parse_key_value("=x").is_err());
        assert_eq!(parse_key_value("K=").unwrap(), ("K".to_owned(), String::new()));
    }
}
