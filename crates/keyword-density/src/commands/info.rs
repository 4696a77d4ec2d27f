//! Info command implementation

use clap::Args;
use keyword_density_core::config::{Config, ConfigSources};
use keyword_density_core::{Keyword, TargetDensity};
use owo_colors::OwoColorize;
use serde::Serialize;
use tracing::{debug, instrument};

/// Arguments for the `info` subcommand.
#[derive(Args, Debug, Default)]
pub struct InfoArgs {
    // No subcommand-specific arguments; uses global --json flag
}

#[derive(Serialize)]
struct PackageInfo {
    name: &'static str,
    version: &'static str,
    #[serde(skip_serializing_if = "str::is_empty")]
    description: &'static str,
    #[serde(skip_serializing_if = "str::is_empty")]
    repository: &'static str,
    #[serde(skip_serializing_if = "str::is_empty")]
    license: &'static str,
}

impl PackageInfo {
    const fn new() -> Self {
        Self {
            name: env!("CARGO_PKG_NAME"),
            version: env!("CARGO_PKG_VERSION"),
            description: env!("CARGO_PKG_DESCRIPTION"),
            repository: env!("CARGO_PKG_REPOSITORY"),
            license: env!("CARGO_PKG_LICENSE"),
        }
    }
}

/// A tracked keyword and the band it is held to.
#[derive(Serialize)]
struct TrackedKeyword {
    keyword: Keyword,
    target: TargetDensity,
}

#[derive(Serialize)]
struct ConfigInfo {
    #[serde(skip_serializing_if = "Option::is_none")]
    config_file: Option<String>,
    log_level: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    log_dir: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    max_input_bytes: Option<usize>,
    disable_input_limit: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    seed: Option<u64>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    keyword_sets: Vec<String>,
    tracked_keywords: Vec<TrackedKeyword>,
    categories: Vec<String>,
}

impl ConfigInfo {
    fn from_config(config: &Config, sources: &ConfigSources) -> Self {
        let analyzer = config.analyzer(&[], None);
        let tracked_keywords = analyzer
            .keywords()
            .filter_map(|k| {
                analyzer.target_for(k).map(|target| TrackedKeyword {
                    keyword: k.clone(),
                    target,
                })
            })
            .collect();
        Self {
            config_file: sources.primary_file().map(|p| p.to_string()),
            log_level: config.log_level.as_str().to_string(),
            log_dir: config.log_dir.as_ref().map(|p| p.to_string()),
            max_input_bytes: config.max_input_bytes,
            disable_input_limit: config.disable_input_limit,
            seed: config.seed,
            keyword_sets: config
                .keyword_sets
                .iter()
                .flatten()
                .map(|s| s.name.clone())
                .collect(),
            tracked_keywords,
            categories: config
                .validator()
                .categories()
                .into_iter()
                .map(str::to_string)
                .collect(),
        }
    }
}

#[derive(Serialize)]
struct FullInfo {
    #[serde(flatten)]
    package: PackageInfo,
    config: ConfigInfo,
}

/// Print package information and the effective keyword setup.
#[instrument(name = "cmd_info", skip_all, fields(json_output))]
pub fn cmd_info(
    _args: InfoArgs,
    global_json: bool,
    config: &Config,
    sources: &ConfigSources,
) -> anyhow::Result<()> {
    debug!(json_output = global_json, "executing info command");

    let full_info = FullInfo {
        package: PackageInfo::new(),
        config: ConfigInfo::from_config(config, sources),
    };

    if global_json {
        println!("{}", serde_json::to_string_pretty(&full_info)?);
        return Ok(());
    }

    println!(
        "{} {}",
        full_info.package.name.bold(),
        full_info.package.version.green()
    );
    if !full_info.package.description.is_empty() {
        println!("{}", full_info.package.description);
    }
    if !full_info.package.license.is_empty() {
        println!("{}: {}", "License".dimmed(), full_info.package.license);
    }
    if !full_info.package.repository.is_empty() {
        println!(
            "{}: {}",
            "Repository".dimmed(),
            full_info.package.repository.cyan()
        );
    }

    let cfg = &full_info.config;
    println!();
    println!("{}", "Configuration".bold().underline());
    match cfg.config_file {
        Some(ref path) => println!("{}: {}", "Config file".dimmed(), path.cyan()),
        None => println!("{}: {}", "Config file".dimmed(), "none loaded".yellow()),
    }
    println!("{}: {}", "Log level".dimmed(), cfg.log_level);
    if let Some(ref dir) = cfg.log_dir {
        println!("{}: {}", "Log directory".dimmed(), dir);
    }
    if cfg.disable_input_limit {
        println!("{}: {}", "Input limit".dimmed(), "disabled".yellow());
    } else {
        print_opt("Input limit (bytes)", &cfg.max_input_bytes);
    }
    print_opt("Seed", &cfg.seed);

    println!();
    println!("{}", "Keywords".bold().underline());
    if !cfg.keyword_sets.is_empty() {
        println!("{}: {}", "Keyword sets".dimmed(), cfg.keyword_sets.join(", "));
    }
    for t in &cfg.tracked_keywords {
        println!("  \"{}\" {}", t.keyword, t.target.dimmed());
    }
    println!("{}: {}", "Categories".dimmed(), cfg.categories.join(", "));

    Ok(())
}

/// Print an optional value or "(not set)".
fn print_opt<T: std::fmt::Display>(label: &str, value: &Option<T>) {
    match value {
        Some(v) => println!("{}: {}", label.dimmed(), v),
        None => println!("{}: {}", label.dimmed(), "(not set)".dimmed()),
    }
}
