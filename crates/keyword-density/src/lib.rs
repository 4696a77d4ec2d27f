//! Library interface for the `keyword-density` CLI.
//!
//! Exposes the argument parser and command implementations as a library for
//! documentation generation and testing. The entry point is in `main.rs`.
//!
//! # Structure
//!
//! - [`Cli`] - The root argument parser (clap derive)
//! - [`Commands`] - Available subcommands
//! - [`commands`] - Command implementations

pub mod commands;

#[cfg(feature = "mcp")]
pub mod server;

use clap::{CommandFactory, Parser, Subcommand};
use std::path::PathBuf;

/// Color output preference.
#[derive(Debug, Clone, Copy, Default, clap::ValueEnum)]
pub enum ColorChoice {
    /// Detect terminal capabilities automatically.
    #[default]
    Auto,
    /// Always emit colors.
    Always,
    /// Never emit colors.
    Never,
}

impl ColorChoice {
    /// Configure global color output based on this choice.
    ///
    /// Call this once at startup to set the color mode.
    pub fn apply(self) {
        match self {
            Self::Auto => {} // owo-colors auto-detects by default
            Self::Always => owo_colors::set_override(true),
            Self::Never => owo_colors::set_override(false),
        }
    }
}

const ENV_HELP: &str = "\
ENVIRONMENT VARIABLES:
    RUST_LOG                         Log filter (e.g., debug, keyword_density_core=trace)
    KEYWORD_DENSITY_LOG_PATH         Explicit log file path
    KEYWORD_DENSITY_LOG_DIR          Log directory
    KEYWORD_DENSITY_SEED             Seed for optimize and suggest
    KEYWORD_DENSITY_MAX_INPUT_BYTES  Input size limit
";

/// Command-line interface definition for keyword-density.
#[derive(Parser)]
#[command(name = "keyword-density")]
#[command(about = "Measure and tune keyword density in landing-page copy", long_about = None)]
#[command(version, arg_required_else_help = true)]
#[command(after_long_help = ENV_HELP)]
pub struct Cli {
    /// The subcommand to execute.
    #[command(subcommand)]
    pub command: Option<Commands>,

    /// Print only the version number (for scripting)
    #[arg(long)]
    pub version_only: bool,

    /// Path to configuration file (overrides discovery)
    #[arg(short, long, global = true, value_name = "FILE")]
    pub config: Option<PathBuf>,

    /// Run as if started in DIR
    #[arg(short = 'C', long, global = true)]
    pub chdir: Option<PathBuf>,

    /// Only print errors (suppresses warnings/info)
    #[arg(short, long, global = true)]
    pub quiet: bool,

    /// More detail (repeatable; e.g. -vv)
    #[arg(short, long, global = true, action = clap::ArgAction::Count)]
    pub verbose: u8,

    /// Colorize output
    #[arg(long, global = true, value_enum, default_value_t)]
    pub color: ColorChoice,

    /// Output as JSON (for scripting)
    #[arg(long, global = true)]
    pub json: bool,
}

/// Available subcommands for the CLI.
#[derive(Subcommand)]
pub enum Commands {
    /// Measure keyword densities and score them against target ranges
    Analyze(commands::analyze::AnalyzeArgs),

    /// Rewrite copy so tracked keywords land in range
    Optimize(commands::optimize::OptimizeArgs),

    /// Check a page's primary keyword for its category
    Validate(commands::validate::ValidateArgs),

    /// Validate every page listed in a JSON manifest
    ValidateBatch(commands::validate_batch::ValidateBatchArgs),

    /// Suggest where to add a keyword
    Suggest(commands::suggest::SuggestArgs),

    /// Show package information and effective keyword setup
    Info(commands::info::InfoArgs),

    /// Start MCP (Model Context Protocol) server on stdio
    #[cfg(feature = "mcp")]
    Serve(commands::serve::ServeArgs),
}

/// Returns the clap command for documentation generation
pub fn command() -> clap::Command {
    Cli::command()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn cli_definition_is_consistent() {
        command().debug_assert();
    }

    #[test]
    fn keyword_flag_repeats() {
        let cli = Cli::try_parse_from([
            "keyword-density",
            "analyze",
            "page.txt",
            "-k",
            "usb driver",
            "--keyword",
            "usb hub",
            "--min",
            "1",
        ])
        .unwrap();
        let Some(Commands::Analyze(args)) = cli.command else {
            panic!("expected analyze");
        };
        assert_eq!(args.keywords.keywords, vec!["usb driver", "usb hub"]);
        assert_eq!(args.keywords.min, Some(1.0));
    }
}
