//! Core library for keyword-density.
//!
//! Measures how often tracked keywords appear in landing-page copy, rewrites
//! the copy to move each keyword into its target band, and gates pages on a
//! single primary keyword per content category.
//!
//! # Modules
//!
//! - [`density`] - Multi-keyword analysis and optimization
//! - [`validator`] - Primary-keyword gate per content category
//! - [`keyword`] - Normalized keywords and their matchers
//! - [`text`] - Cleaning, word counting and paragraph boundaries
//! - [`picker`] - Injected randomness for insertion points
//! - [`markdown`] - Markdown to page-copy conversion
//! - [`config`] - Configuration loading and management
//! - [`error`] - Error types and result aliases
//!
//! # Quick Start
//!
//! ```
//! use keyword_density_core::{DensityOptimizer, FirstPicker, TargetDensity};
//!
//! let optimizer = DensityOptimizer::new(["usb hub"], TargetDensity::PRIMARY);
//! let copy = "Windows cannot load the driver.\nReplug the device and retry.";
//! let result = optimizer.optimize_with(copy, &mut FirstPicker);
//!
//! assert!(result.content.starts_with("Regarding a solution for usb hub:"));
//! println!("score {}", result.analysis.overall_score);
//! ```
#![deny(unsafe_code)]

pub mod config;
pub mod density;
pub mod error;
pub mod keyword;
pub mod markdown;
pub mod picker;
pub mod text;
pub mod validator;

pub use config::{Config, ConfigLoader, ConfigSources, KeywordSet, KeywordTier, LogLevel};
pub use density::{
    AnalysisReport, Change, ChangeKind, DEFAULT_KEYWORDS, DensityAnalyzer, DensityOptimizer,
    Improvement, OptimizationResult, OverallImprovement, Recommendation, RecommendationKind,
    TargetDensity,
};
pub use error::{ConfigError, ConfigResult, ValidationError, ValidationResult};
pub use keyword::Keyword;
pub use picker::{FirstPicker, LastPicker, Picker, RandomPicker};
pub use text::ContentFormat;
pub use validator::{
    BatchItem, BatchReport, DensityStatus, DensityValidator, InsertionSuggestion,
    ValidationReport, generate_report, suggest_insertions, suggest_insertions_in,
};

/// Default maximum input size: 5 MiB.
pub const DEFAULT_MAX_INPUT_BYTES: usize = 5 * 1024 * 1024;
