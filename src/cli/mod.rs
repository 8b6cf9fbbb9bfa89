//! Command-line interface for `relation_manager`.
//!
//! This module provides the CLI parsing and command routing using clap.

pub mod commands;

use std::path::PathBuf;

use anyhow::Result;
use clap::{Args, Parser, Subcommand};
use clap_complete::Shell;

use crate::config::{self, CliOverrides};
use crate::logging;

/// `relation_manager` (relman) - export and re-import layer relations.
#[derive(Parser, Debug)]
#[command(name = "relman")]
#[command(
    author,
    version,
    about = "Export layer relations to JSON and re-create them in another project",
    long_about = None,
    after_help = "Layers are re-matched by name, normalized name, partial name, then source table."
)]
pub struct Cli {
    /// Output format: text (default) or json
    #[arg(long, global = true)]
    pub json: bool,

    /// Verbose output (-v debug, -vv trace)
    #[arg(short, long, global = true, action = clap::ArgAction::Count)]
    pub verbose: u8,

    /// Quiet mode (errors only)
    #[arg(short, long, global = true)]
    pub quiet: bool,

    /// Emit diagnostics as JSON lines on stderr
    #[arg(long, global = true)]
    pub log_json: bool,

    /// Config file (default: ./relman.yaml when present)
    #[arg(long, global = true, value_name = "PATH")]
    pub config: Option<PathBuf>,

    /// Project snapshot file
    #[arg(long, global = true, value_name = "PATH", env = "RELMAN_PROJECT")]
    pub project: Option<PathBuf>,

    /// The command to run
    #[command(subcommand)]
    pub command: Commands,
}

/// Available commands.
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Export all relations of the project to a JSON document
    Export(ExportArgs),

    /// Import relations from a JSON document into the project
    Import(ImportArgs),

    /// List relations registered in the project
    List,

    /// List layers loaded in the project
    Layers,

    /// Check the project snapshot for problems
    Check,

    /// Print the JSON Schema of the export document
    Schema,

    /// Generate shell completions
    Completions(CompletionsArgs),

    /// Show version information
    Version,
}

#[derive(Args, Debug, Default)]
pub struct ExportArgs {
    /// Output file (default: stdout)
    #[arg(short, long, value_name = "FILE")]
    pub output: Option<PathBuf>,

    /// Write compact JSON instead of pretty-printed
    #[arg(long)]
    pub compact: bool,
}

#[derive(Args, Debug)]
pub struct ImportArgs {
    /// Export document to import
    #[arg(value_name = "FILE")]
    pub file: PathBuf,

    /// Report what would be imported without saving the project
    #[arg(long)]
    pub dry_run: bool,

    /// Do not back up the project file before saving
    #[arg(long)]
    pub no_backup: bool,
}

#[derive(Args, Debug)]
pub struct CompletionsArgs {
    /// Target shell
    #[arg(value_enum)]
    pub shell: Shell,
}

/// Run the CLI.
///
/// # Errors
///
/// Returns an error if the command fails to execute.
pub fn run() -> Result<()> {
    let cli = Cli::parse();
    logging::init_logging(cli.verbose, cli.quiet, cli.log_json)
        .map_err(|e| anyhow::anyhow!("Failed to initialize logging: {e}"))?;

    let overrides = CliOverrides {
        config: cli.config.clone(),
        project: cli.project.clone(),
    };

    tracing::debug!(command = cli.command.name(), "Dispatching command");

    match &cli.command {
        Commands::Export(args) => commands::export::execute(args, &config::load(&overrides)?)?,
        Commands::Import(args) => {
            commands::import::execute(args, cli.json, &config::load(&overrides)?)?;
        }
        Commands::List => commands::list::execute(cli.json, &config::load(&overrides)?)?,
        Commands::Layers => commands::layers::execute(cli.json, &config::load(&overrides)?)?,
        Commands::Check => commands::check::execute(cli.json, &config::load(&overrides)?)?,
        Commands::Schema => commands::schema::execute()?,
        Commands::Completions(args) => commands::completions::execute(args),
        Commands::Version => commands::version::execute(cli.json)?,
    }

    Ok(())
}

impl Commands {
    const fn name(&self) -> &'static str {
        match self {
            Self::Export(_) => "export",
            Self::Import(_) => "import",
            Self::List => "list",
            Self::Layers => "layers",
            Self::Check => "check",
            Self::Schema => "schema",
            Self::Completions(_) => "completions",
            Self::Version => "version",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn cli_definition_is_consistent() {
        Cli::command().debug_assert();
    }

    #[test]
    fn parses_import_flags() {
        let cli = Cli::try_parse_from([
            "relman",
            "--project",
            "city.json",
            "import",
            "relations.json",
            "--dry-run",
        ])
        .unwrap();
        assert_eq!(cli.project, Some(PathBuf::from("city.json")));
        match cli.command {
            Commands::Import(args) => {
                assert!(args.dry_run);
                assert!(!args.no_backup);
                assert_eq!(args.file, PathBuf::from("relations.json"));
            }
            other => panic!("unexpected command: {other:?}"),
        }
    }

    #[test]
    fn global_flags_after_subcommand() {
        let cli = Cli::try_parse_from(["relman", "list", "--json", "-vv"]).unwrap();
        assert!(cli.json);
        assert_eq!(cli.verbose, 2);
        assert_eq!(cli.command.name(), "list");
    }
}
