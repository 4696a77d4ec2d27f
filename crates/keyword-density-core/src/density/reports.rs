//! Report structs for keyword density analysis and optimization.
//!
//! All structs derive `Serialize`, `Deserialize`, and `JsonSchema` for
//! use in both CLI JSON output and MCP tool responses.

use std::collections::BTreeMap;
use std::fmt;

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

use crate::keyword::Keyword;

/// Inclusive density range, in percent of total words.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct TargetDensity {
    /// Lowest optimal density.
    pub min: f64,
    /// Highest optimal density.
    pub max: f64,
}

impl TargetDensity {
    /// Primary keyword band (3–5%).
    pub const PRIMARY: Self = Self { min: 3.0, max: 5.0 };
    /// Secondary keyword band (1.5–4%).
    pub const SECONDARY: Self = Self { min: 1.5, max: 4.0 };
    /// Long-tail keyword band (0.3–2%).
    pub const LONG_TAIL: Self = Self { min: 0.3, max: 2.0 };

    /// Build a range, swapping the bounds if they arrive reversed.
    pub fn new(min: f64, max: f64) -> Self {
        if min <= max {
            Self { min, max }
        } else {
            Self { min: max, max: min }
        }
    }

    /// Whether `density` lies inside the range (inclusive).
    pub fn contains(&self, density: f64) -> bool {
        density >= self.min && density <= self.max
    }

    /// Occurrences needed to reach `min` for a text of `words` words.
    pub fn min_occurrences(&self, words: usize) -> usize {
        (self.min * words as f64 / 100.0).ceil() as usize
    }

    /// Occurrences allowed at `max` for a text of `words` words.
    pub fn max_occurrences(&self, words: usize) -> usize {
        (self.max * words as f64 / 100.0).floor() as usize
    }

    /// Score a density against this range (0–100).
    ///
    /// Inside the range scores 100. Below it scales linearly with
    /// `density / min`. Above it loses 10 points per percentage point of
    /// excess.
    pub fn score(&self, density: f64) -> f64 {
        if self.contains(density) {
            100.0
        } else if density < self.min {
            (density / self.min * 100.0).max(0.0)
        } else {
            let excess = density - self.max;
            excess.mul_add(-10.0, 100.0).max(0.0)
        }
    }
}

impl Default for TargetDensity {
    fn default() -> Self {
        Self::PRIMARY
    }
}

impl fmt::Display for TargetDensity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}%–{}%", self.min, self.max)
    }
}

/// What to do about one keyword.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "lowercase")]
pub enum RecommendationKind {
    /// Density is below the range.
    Increase,
    /// Density is above the range.
    Decrease,
    /// Density is inside the range.
    Optimal,
}

/// A per-keyword recommendation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct Recommendation {
    /// Direction of the recommended change.
    #[serde(rename = "type")]
    pub kind: RecommendationKind,
    /// The keyword this applies to.
    pub keyword: Keyword,
    /// Density measured now.
    pub current_density: f64,
    /// Range the keyword is measured against.
    pub target: TargetDensity,
    /// Occurrences measured now.
    pub current_count: usize,
    /// Occurrence count that would reach the nearest bound.
    pub recommended_count: usize,
    /// Human-readable instruction.
    pub action: String,
}

impl Recommendation {
    /// Build the recommendation for one keyword measurement.
    pub fn for_measurement(
        keyword: &Keyword,
        count: usize,
        density: f64,
        words: usize,
        target: TargetDensity,
    ) -> Self {
        let (kind, recommended_count, action) = if density < target.min {
            let recommended = target.min_occurrences(words);
            let add = recommended.saturating_sub(count);
            (
                RecommendationKind::Increase,
                recommended,
                format!(
                    "Add {add} more occurrence(s) of \"{keyword}\" to reach at least {}% (currently {density:.2}%)",
                    target.min
                ),
            )
        } else if density > target.max {
            let recommended = target.max_occurrences(words);
            let remove = count.saturating_sub(recommended);
            (
                RecommendationKind::Decrease,
                recommended,
                format!(
                    "Remove or rephrase {remove} occurrence(s) of \"{keyword}\" to stay at or below {}% (currently {density:.2}%)",
                    target.max
                ),
            )
        } else {
            (
                RecommendationKind::Optimal,
                count,
                format!("\"{keyword}\" is within {target} ({density:.2}%)"),
            )
        };

        Self {
            kind,
            keyword: keyword.clone(),
            current_density: density,
            target,
            current_count: count,
            recommended_count,
            action,
        }
    }

    /// Occurrences to add (increase) or shed (decrease). Zero when optimal.
    pub const fn delta(&self) -> usize {
        self.recommended_count.abs_diff(self.current_count)
    }
}

/// Density statistics for a set of tracked keywords.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct AnalysisReport {
    /// Words counted in the cleaned text.
    pub word_count: usize,
    /// Occurrences per keyword.
    pub keyword_counts: BTreeMap<Keyword, usize>,
    /// Density per keyword, in percent.
    pub densities: BTreeMap<Keyword, f64>,
    /// Range each keyword was measured against.
    pub targets: BTreeMap<Keyword, TargetDensity>,
    /// One recommendation per keyword (empty for empty input).
    pub recommendations: Vec<Recommendation>,
    /// Whether every keyword is inside its range.
    pub is_optimal: bool,
    /// Rounded mean of per-keyword scores (0–100).
    pub overall_score: u8,
}

impl AnalysisReport {
    /// Density of `keyword`, 0 when it is not tracked.
    pub fn density(&self, keyword: &Keyword) -> f64 {
        self.densities.get(keyword).copied().unwrap_or(0.0)
    }

    /// Occurrences of `keyword`, 0 when it is not tracked.
    pub fn count(&self, keyword: &Keyword) -> usize {
        self.keyword_counts.get(keyword).copied().unwrap_or(0)
    }

    /// Whether `keyword` sits inside its range.
    pub fn in_range(&self, keyword: &Keyword) -> bool {
        self.targets
            .get(keyword)
            .is_some_and(|t| t.contains(self.density(keyword)))
    }
}

/// Kind of text mutation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "lowercase")]
pub enum ChangeKind {
    /// A phrase containing the keyword was inserted.
    Addition,
    /// A keyword occurrence was replaced by a synonym.
    Replacement,
}

/// One mutation applied by the optimizer.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
pub struct Change {
    /// Addition or replacement.
    #[serde(rename = "type")]
    pub kind: ChangeKind,
    /// Keyword the change was made for.
    pub keyword: Keyword,
    /// Byte offset in the text as it stood just before this change.
    pub position: usize,
    /// Text inserted at `position`.
    pub inserted: String,
    /// Text removed from `position` (empty for additions).
    pub removed: String,
    /// Why this phrasing was chosen.
    pub reason: String,
}

/// Direction of the overall score change.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "lowercase")]
pub enum OverallImprovement {
    /// Score went up.
    Improved,
    /// Score went down.
    Worsened,
    /// Score did not move.
    Unchanged,
}

/// Before/after comparison of two analyses.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
pub struct Improvement {
    /// `after.overall_score - before.overall_score`.
    pub score_improvement: i16,
    /// Keywords that moved into their range.
    pub improved_keywords: Vec<Keyword>,
    /// Keywords that moved out of their range.
    pub worsened_keywords: Vec<Keyword>,
    /// Sign of `score_improvement`.
    pub overall: OverallImprovement,
}

impl Improvement {
    /// Compare two reports over the same keyword set.
    pub fn between(before: &AnalysisReport, after: &AnalysisReport) -> Self {
        let score_improvement = i16::from(after.overall_score) - i16::from(before.overall_score);

        let mut improved_keywords = Vec::new();
        let mut worsened_keywords = Vec::new();
        for keyword in before.targets.keys() {
            match (before.in_range(keyword), after.in_range(keyword)) {
                (false, true) => improved_keywords.push(keyword.clone()),
                (true, false) => worsened_keywords.push(keyword.clone()),
                _ => {}
            }
        }

        let overall = match score_improvement {
            s if s > 0 => OverallImprovement::Improved,
            s if s < 0 => OverallImprovement::Worsened,
            _ => OverallImprovement::Unchanged,
        };

        Self {
            score_improvement,
            improved_keywords,
            worsened_keywords,
            overall,
        }
    }
}

/// Rewritten text plus its fresh analysis.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct OptimizationResult {
    /// The rewritten text.
    pub content: String,
    /// Analysis of `content`.
    pub analysis: AnalysisReport,
    /// Mutations in the order they were applied.
    pub changes: Vec<Change>,
    /// Before/after comparison. Absent for empty input.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub improvement: Option<Improvement>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn range_bounds_are_inclusive() {
        let t = TargetDensity::PRIMARY;
        assert!(t.contains(3.0));
        assert!(t.contains(5.0));
        assert!(!t.contains(2.999));
        assert!(!t.contains(5.001));
    }

    #[test]
    fn reversed_bounds_are_swapped() {
        let t = TargetDensity::new(5.0, 3.0);
        assert_eq!(t, TargetDensity::PRIMARY);
    }

    #[test]
    fn score_at_bounds_is_full() {
        let t = TargetDensity::PRIMARY;
        assert_eq!(t.score(3.0), 100.0);
        assert_eq!(t.score(5.0), 100.0);
    }

    #[test]
    fn score_below_scales_linearly() {
        let t = TargetDensity::PRIMARY;
        assert_eq!(t.score(0.0), 0.0);
        assert!((t.score(1.5) - 50.0).abs() < 1e-9);
    }

    #[test]
    fn score_above_loses_ten_per_point() {
        let t = TargetDensity::PRIMARY;
        assert!((t.score(7.0) - 80.0).abs() < 1e-9);
        assert_eq!(t.score(25.0), 0.0);
    }

    #[test]
    fn score_is_monotonic_toward_range() {
        let t = TargetDensity::PRIMARY;
        let below: Vec<f64> = (0..=30).map(|i| f64::from(i) / 10.0).collect();
        for pair in below.windows(2) {
            assert!(t.score(pair[1]) >= t.score(pair[0]));
        }
        let above: Vec<f64> = (50..=300).rev().map(|i| f64::from(i) / 10.0).collect();
        for pair in above.windows(2) {
            assert!(t.score(pair[1]) >= t.score(pair[0]));
        }
    }

    #[test]
    fn occurrence_bounds() {
        let t = TargetDensity::PRIMARY;
        assert_eq!(t.min_occurrences(100), 3);
        assert_eq!(t.min_occurrences(12), 1);
        assert_eq!(t.max_occurrences(100), 5);
        assert_eq!(t.max_occurrences(12), 0);
    }

    #[test]
    fn increase_recommendation_counts_missing_occurrences() {
        let kw = Keyword::new("usb");
        let rec = Recommendation::for_measurement(&kw, 1, 1.0, 100, TargetDensity::PRIMARY);
        assert_eq!(rec.kind, RecommendationKind::Increase);
        assert_eq!(rec.recommended_count, 3);
        assert_eq!(rec.delta(), 2);
        assert!(rec.action.contains("Add 2"));
    }

    #[test]
    fn decrease_recommendation_counts_excess() {
        let kw = Keyword::new("usb");
        let rec = Recommendation::for_measurement(&kw, 8, 8.0, 100, TargetDensity::PRIMARY);
        assert_eq!(rec.kind, RecommendationKind::Decrease);
        assert_eq!(rec.recommended_count, 5);
        assert_eq!(rec.delta(), 3);
    }

    #[test]
    fn recommendation_serializes_type_tag() {
        let kw = Keyword::new("usb");
        let rec = Recommendation::for_measurement(&kw, 4, 4.0, 100, TargetDensity::PRIMARY);
        let json = serde_json::to_value(&rec).unwrap();
        assert_eq!(json["type"], "optimal");
        assert_eq!(json["keyword"], "usb");
    }
}
