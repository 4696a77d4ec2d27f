//! Analyze command: keyword density report for a page.

use anyhow::bail;
use camino::{Utf8Path, Utf8PathBuf};
use clap::Args;
use owo_colors::OwoColorize;
use tracing::{debug, instrument};

use keyword_density_core::{AnalysisReport, Config, RecommendationKind};

use super::{KeywordArgs, read_copy};

/// Arguments for the `analyze` subcommand.
#[derive(Args, Debug)]
pub struct AnalyzeArgs {
    /// File to analyze (`.md` files are reduced to their visible copy).
    pub file: Utf8PathBuf,

    #[command(flatten)]
    pub keywords: KeywordArgs,

    /// Minimum acceptable overall score (0–100).
    #[arg(long)]
    pub min_score: Option<u8>,
}

/// Measure keyword densities in a file.
#[instrument(name = "cmd_analyze", skip_all, fields(file = %args.file))]
pub fn cmd_analyze(
    args: AnalyzeArgs,
    global_json: bool,
    config: &Config,
    max_input_bytes: Option<usize>,
) -> anyhow::Result<()> {
    debug!(file = %args.file, keywords = ?args.keywords.keywords, "executing analyze command");

    let content = read_copy(&args.file, max_input_bytes)?;
    let analyzer = config.analyzer(
        &args.keywords.keywords,
        args.keywords.target(config.target_density),
    );
    let report = analyzer.analyze(&content);

    if global_json {
        println!("{}", serde_json::to_string_pretty(&report)?);
    } else {
        print_report(&args.file, &report);
    }

    if let Some(min) = args.min_score {
        if report.overall_score < min {
            bail!(
                "{} scores {}/100 (min: {}). Bring the flagged keywords into range.",
                args.file,
                report.overall_score,
                min,
            );
        }
        if !global_json {
            println!(
                "{} {} scores {}/100 (min: {})",
                "PASS:".green(),
                args.file,
                report.overall_score,
                min,
            );
        }
    }

    Ok(())
}

fn print_report(file: &Utf8Path, report: &AnalysisReport) {
    println!("{}", file.bold());
    println!(
        "  {} {} words, score {}/100{}",
        "Summary:".cyan(),
        report.word_count,
        report.overall_score,
        if report.is_optimal { " (optimal)" } else { "" },
    );

    for rec in &report.recommendations {
        let label = match rec.kind {
            RecommendationKind::Increase => "increase".yellow().to_string(),
            RecommendationKind::Decrease => "decrease".red().to_string(),
            RecommendationKind::Optimal => "ok".green().to_string(),
        };
        println!(
            "\n  \"{}\" {:.2}% ({} hits, target {}) {}",
            rec.keyword, rec.current_density, rec.current_count, rec.target, label,
        );
        if rec.kind != RecommendationKind::Optimal {
            println!("    {}", rec.action.dimmed());
        }
    }
}
