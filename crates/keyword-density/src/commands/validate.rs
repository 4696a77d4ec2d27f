//! Validate command: primary-keyword gate for one page.

use anyhow::bail;
use camino::Utf8PathBuf;
use clap::Args;
use owo_colors::OwoColorize;
use tracing::{debug, instrument};

use keyword_density_core::{Config, generate_report};

use super::read_copy;

/// Arguments for the `validate` subcommand.
#[derive(Args, Debug)]
pub struct ValidateArgs {
    /// File to validate (`.md` files are reduced to their visible copy).
    pub file: Utf8PathBuf,

    /// Content category whose primary keyword is checked.
    #[arg(long)]
    pub category: String,
}

/// Check a page's primary keyword against the required band.
///
/// Fails when the category is unknown or the density is out of range.
#[instrument(name = "cmd_validate", skip_all, fields(file = %args.file, category = %args.category))]
pub fn cmd_validate(
    args: ValidateArgs,
    global_json: bool,
    config: &Config,
    max_input_bytes: Option<usize>,
) -> anyhow::Result<()> {
    debug!(file = %args.file, category = %args.category, "executing validate command");

    let content = read_copy(&args.file, max_input_bytes)?;
    let report = config.validator().validate(&args.category, &content)?;

    if global_json {
        println!("{}", serde_json::to_string_pretty(&report)?);
    } else {
        print!("{}", generate_report(&report));
    }

    if !report.is_valid {
        bail!(
            "{}: \"{}\" is at {:.2}% ({}), required {}",
            args.file,
            report.primary_keyword,
            report.density,
            report.status.as_str(),
            report.required_range,
        );
    }
    if !global_json {
        println!(
            "{} {} \"{}\" at {:.2}%",
            "PASS:".green(),
            args.file,
            report.primary_keyword,
            report.density,
        );
    }

    Ok(())
}
