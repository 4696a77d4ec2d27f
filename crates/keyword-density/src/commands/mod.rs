//! Command implementations.

use anyhow::Context;
use camino::Utf8Path;
use clap::Args;

use keyword_density_core::config::KeywordTier;
use keyword_density_core::{ContentFormat, TargetDensity, markdown};

pub mod analyze;
pub mod info;
pub mod optimize;
#[cfg(feature = "mcp")]
pub mod serve;
pub mod suggest;
pub mod validate;
pub mod validate_batch;

/// Keyword selection shared by `analyze` and `optimize`.
#[derive(Args, Debug, Default, Clone)]
pub struct KeywordArgs {
    /// Keyword to track (repeatable). Replaces configured keywords.
    #[arg(short, long = "keyword", value_name = "KEYWORD")]
    pub keywords: Vec<String>,

    /// Preset density band for the keywords.
    #[arg(long, value_enum)]
    pub tier: Option<KeywordTier>,

    /// Lowest optimal density, in percent.
    #[arg(long)]
    pub min: Option<f64>,

    /// Highest optimal density, in percent.
    #[arg(long)]
    pub max: Option<f64>,
}

impl KeywordArgs {
    /// Band requested on the command line, if any flag set one.
    ///
    /// `--min` and `--max` override the bounds of `--tier`, or of
    /// `configured` when no tier is given.
    pub fn target(&self, configured: Option<TargetDensity>) -> Option<TargetDensity> {
        if self.tier.is_none() && self.min.is_none() && self.max.is_none() {
            return None;
        }
        let base = self
            .tier
            .map(KeywordTier::range)
            .or(configured)
            .unwrap_or_default();
        Some(TargetDensity::new(
            self.min.unwrap_or(base.min),
            self.max.unwrap_or(base.max),
        ))
    }
}

/// Read a file and validate its size against the configured limit.
pub fn read_input_file(path: &Utf8Path, max_bytes: Option<usize>) -> anyhow::Result<String> {
    // Preflight: check file size via metadata before reading into memory.
    let metadata =
        std::fs::metadata(path.as_std_path()).with_context(|| format!("failed to read {path}"))?;
    if let Some(max) = max_bytes {
        let size = metadata.len() as usize;
        if size > max {
            anyhow::bail!("input too large: {path} is {size} bytes (limit: {max} bytes)");
        }
    }

    let content = std::fs::read_to_string(path.as_std_path())
        .with_context(|| format!("failed to read {path}"))?;
    Ok(content)
}

/// Read a file as page copy: markdown files are reduced to their visible text.
pub fn read_copy(path: &Utf8Path, max_bytes: Option<usize>) -> anyhow::Result<String> {
    let content = read_input_file(path, max_bytes)?;
    if ContentFormat::from_extension(path.extension()) == ContentFormat::Markdown {
        Ok(markdown::to_copy_text(&content))
    } else {
        Ok(content)
    }
}
