//! Suggest command: where to add a keyword without rewriting the page.

use camino::Utf8PathBuf;
use clap::Args;
use owo_colors::OwoColorize;
use tracing::{debug, instrument};

use keyword_density_core::validator::REQUIRED_RANGE;
use keyword_density_core::{Config, ContentFormat, Keyword, RandomPicker, suggest_insertions_in, text};

use super::read_input_file;

/// Arguments for the `suggest` subcommand.
#[derive(Args, Debug)]
pub struct SuggestArgs {
    /// File to inspect. Offsets refer to the raw file; markdown files only
    /// get paragraph suggestions.
    pub file: Utf8PathBuf,

    /// Keyword to add.
    #[arg(short, long)]
    pub keyword: String,

    /// Occurrences to reach. Defaults to the minimum of the 3–5% band.
    #[arg(long)]
    pub target: Option<usize>,

    /// Seed for paragraph choice.
    #[arg(long)]
    pub seed: Option<u64>,
}

/// Print insertion suggestions for a keyword.
#[instrument(name = "cmd_suggest", skip_all, fields(file = %args.file, keyword = %args.keyword))]
pub fn cmd_suggest(
    args: SuggestArgs,
    global_json: bool,
    config: &Config,
    max_input_bytes: Option<usize>,
) -> anyhow::Result<()> {
    debug!(file = %args.file, target = ?args.target, "executing suggest command");

    let content = read_input_file(&args.file, max_input_bytes)?;
    let keyword = Keyword::new(&args.keyword);
    let target = args
        .target
        .unwrap_or_else(|| REQUIRED_RANGE.min_occurrences(text::count_words(&content)));
    let mut picker = RandomPicker::from_seed(args.seed.or(config.seed));
    let format = ContentFormat::from_extension(args.file.extension());
    let suggestions = suggest_insertions_in(format, &content, &keyword, target, &mut picker);

    if global_json {
        println!("{}", serde_json::to_string_pretty(&suggestions)?);
        return Ok(());
    }

    if suggestions.is_empty() {
        let current = keyword.matcher().count(&text::clean(&content));
        if current >= target {
            println!(
                "{} \"{}\" already occurs {} time(s) in {} (target: {})",
                "OK:".green(),
                keyword,
                current,
                args.file,
                target,
            );
        } else {
            println!("{} has no paragraph to insert into", args.file);
        }
        return Ok(());
    }

    println!("{}", args.file.bold());
    for s in &suggestions {
        println!(
            "\n  {} paragraph {} (byte {}): {}",
            "At".cyan(),
            s.paragraph_index + 1,
            s.position,
            s.excerpt.dimmed(),
        );
        println!("    + {}", s.suggested_text.green());
        println!("      {}", s.reason.dimmed());
    }

    Ok(())
}
