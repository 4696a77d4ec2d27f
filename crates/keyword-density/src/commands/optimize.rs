//! Optimize command: rewrite a page so its keywords land in range.

use anyhow::Context;
use camino::Utf8PathBuf;
use clap::Args;
use owo_colors::OwoColorize;
use tracing::{debug, instrument};

use keyword_density_core::{
    ChangeKind, Config, ContentFormat, DensityOptimizer, OptimizationResult, RandomPicker,
};

use super::{KeywordArgs, read_input_file};

/// Arguments for the `optimize` subcommand.
#[derive(Args, Debug)]
pub struct OptimizeArgs {
    /// File to optimize. In markdown files only paragraphs are edited.
    pub file: Utf8PathBuf,

    #[command(flatten)]
    pub keywords: KeywordArgs,

    /// Seed for paragraph and synonym choice (reproducible output).
    #[arg(long)]
    pub seed: Option<u64>,

    /// Write the optimized copy here instead of stdout.
    #[arg(short, long, value_name = "FILE")]
    pub output: Option<Utf8PathBuf>,
}

/// Optimize keyword density in a file.
#[instrument(name = "cmd_optimize", skip_all, fields(file = %args.file))]
pub fn cmd_optimize(
    args: OptimizeArgs,
    global_json: bool,
    config: &Config,
    max_input_bytes: Option<usize>,
) -> anyhow::Result<()> {
    let seed = args.seed.or(config.seed);
    debug!(file = %args.file, ?seed, output = ?args.output, "executing optimize command");

    let content = read_input_file(&args.file, max_input_bytes)?;
    let analyzer = config.analyzer(
        &args.keywords.keywords,
        args.keywords.target(config.target_density),
    );
    let optimizer = DensityOptimizer::from_analyzer(analyzer)
        .with_format(ContentFormat::from_extension(args.file.extension()));
    let result = optimizer.optimize_with(&content, &mut RandomPicker::from_seed(seed));

    if let Some(ref output) = args.output {
        std::fs::write(output.as_std_path(), &result.content)
            .with_context(|| format!("failed to write {output}"))?;
    }

    if global_json {
        println!("{}", serde_json::to_string_pretty(&result)?);
    } else if let Some(ref output) = args.output {
        print_summary(&result);
        println!("{} wrote {}", "OK:".green(), output);
    } else {
        // Copy goes to stdout so it can be piped; the summary goes to stderr.
        print!("{}", result.content);
        if !result.content.ends_with('\n') {
            println!();
        }
        eprint_summary(&result);
    }

    Ok(())
}

fn summary_lines(result: &OptimizationResult) -> Vec<String> {
    let additions = result
        .changes
        .iter()
        .filter(|c| c.kind == ChangeKind::Addition)
        .count();
    let replacements = result.changes.len() - additions;
    let mut lines = vec![format!(
        "{} {} additions, {} replacements, score {}/100",
        "Changes:".cyan(),
        additions,
        replacements,
        result.analysis.overall_score,
    )];
    if let Some(ref imp) = result.improvement {
        lines.push(format!(
            "{} {:+} ({} keywords moved into range)",
            "Improvement:".cyan(),
            imp.score_improvement,
            imp.improved_keywords.len(),
        ));
    }
    lines
}

fn print_summary(result: &OptimizationResult) {
    for line in summary_lines(result) {
        println!("{line}");
    }
}

fn eprint_summary(result: &OptimizationResult) {
    for line in summary_lines(result) {
        eprintln!("{line}");
    }
}
