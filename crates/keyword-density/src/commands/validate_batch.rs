//! Validate-batch command: primary-keyword gate for many pages.

use anyhow::{Context, bail};
use camino::{Utf8Path, Utf8PathBuf};
use clap::Args;
use owo_colors::OwoColorize;
use serde::Deserialize;
use tracing::{debug, instrument};

use keyword_density_core::Config;

use super::{read_copy, read_input_file};

/// Arguments for the `validate-batch` subcommand.
#[derive(Args, Debug)]
pub struct ValidateBatchArgs {
    /// JSON manifest: an array of `{"category": ..., "file": ...}` objects.
    ///
    /// Relative file paths resolve against the manifest's directory.
    pub manifest: Utf8PathBuf,
}

/// One manifest entry.
#[derive(Debug, Deserialize)]
struct ManifestEntry {
    category: String,
    file: Utf8PathBuf,
}

/// Validate every page listed in a manifest.
#[instrument(name = "cmd_validate_batch", skip_all, fields(manifest = %args.manifest))]
pub fn cmd_validate_batch(
    args: ValidateBatchArgs,
    global_json: bool,
    config: &Config,
    max_input_bytes: Option<usize>,
) -> anyhow::Result<()> {
    debug!(manifest = %args.manifest, "executing validate-batch command");

    let raw = read_input_file(&args.manifest, max_input_bytes)?;
    let entries: Vec<ManifestEntry> = serde_json::from_str(&raw)
        .with_context(|| format!("failed to parse manifest {}", args.manifest))?;
    let base = args.manifest.parent().unwrap_or_else(|| Utf8Path::new("."));

    let mut files = Vec::with_capacity(entries.len());
    let mut pairs = Vec::with_capacity(entries.len());
    for entry in entries {
        let path = if entry.file.is_relative() {
            base.join(&entry.file)
        } else {
            entry.file
        };
        let content = read_copy(&path, max_input_bytes)?;
        pairs.push((entry.category, content));
        files.push(path);
    }

    let report = config.validator().validate_batch(&pairs);

    if global_json {
        println!("{}", serde_json::to_string_pretty(&report)?);
    } else {
        for (item, file) in report.items.iter().zip(&files) {
            let verdict = if item.is_valid {
                "PASS".green().to_string()
            } else {
                "FAIL".red().to_string()
            };
            match (&item.report, &item.error) {
                (Some(r), _) => println!(
                    "{verdict} {} [{}] \"{}\" {:.2}% ({})",
                    file,
                    item.category,
                    r.primary_keyword,
                    r.density,
                    r.status.as_str(),
                ),
                (None, Some(err)) => println!("{verdict} {} [{}] {err}", file, item.category),
                (None, None) => println!("{verdict} {} [{}]", file, item.category),
            }
        }
        println!(
            "\n{} passed, {} failed",
            report.passed.green(),
            report.failed.red()
        );
    }

    if !report.all_valid() {
        bail!("{} of {} pages failed validation", report.failed, report.items.len());
    }

    Ok(())
}
