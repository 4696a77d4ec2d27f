//! Keyword density analysis and optimization.
//!
//! [`DensityAnalyzer`] measures tracked keywords and scores them against
//! target ranges. [`DensityOptimizer`] rewrites text to move those
//! densities into range and reports what changed.
//!
//! Both are configured once and then used as pure functions of their input
//! text, so a single instance can be shared across threads.

pub mod analyzer;
pub mod optimizer;
pub mod reports;
pub mod templates;

pub use analyzer::{DEFAULT_KEYWORDS, DensityAnalyzer, density};
pub use optimizer::DensityOptimizer;
pub use reports::{
    AnalysisReport, Change, ChangeKind, Improvement, OptimizationResult, OverallImprovement,
    Recommendation, RecommendationKind, TargetDensity,
};
