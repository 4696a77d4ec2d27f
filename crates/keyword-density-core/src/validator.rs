//! Primary-keyword gate per content category.
//!
//! Each content category (a landing page, a troubleshooting guide) owns one
//! primary keyword that must sit inside a fixed 3–5% band. This is stricter
//! and narrower than [`DensityAnalyzer`](crate::density::DensityAnalyzer):
//! one keyword, one range, a pass/fail verdict and a printable report.

use std::collections::HashMap;
use std::fmt;

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

use crate::density::templates;
use crate::density::{Recommendation, TargetDensity, density};
use crate::error::{ValidationError, ValidationResult};
use crate::keyword::Keyword;
use crate::picker::Picker;
use crate::text::{self, ContentFormat};

/// Built-in category → primary keyword map.
const PRIMARY_KEYWORDS: &[(&str, &str)] = &[
    ("home", "usb troubleshooting"),
    ("usb-not-recognized", "usb not recognized"),
    ("usb-device-not-recognized", "usb device not recognized"),
    ("usb-driver", "usb driver"),
    ("usb-port-not-working", "usb port not working"),
    ("zh-usb-not-recognized", "usb设备无法识别"),
];

/// The band every primary keyword must meet.
pub const REQUIRED_RANGE: TargetDensity = TargetDensity::PRIMARY;

/// Where a density falls relative to [`REQUIRED_RANGE`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "snake_case")]
pub enum DensityStatus {
    /// Below the minimum.
    TooLow,
    /// Above the maximum.
    TooHigh,
    /// Inside the band.
    Optimal,
}

impl DensityStatus {
    /// Classify an already-rounded density.
    pub fn classify(density: f64, range: TargetDensity) -> Self {
        if density < range.min {
            Self::TooLow
        } else if density > range.max {
            Self::TooHigh
        } else {
            Self::Optimal
        }
    }

    /// Status label as used in JSON output.
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::TooLow => "too_low",
            Self::TooHigh => "too_high",
            Self::Optimal => "optimal",
        }
    }
}

/// Verdict for one category.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct ValidationReport {
    /// Category that was validated.
    pub category: String,
    /// Its primary keyword.
    pub primary_keyword: Keyword,
    /// Density in percent, rounded to 2 decimal places.
    pub density: f64,
    /// Keyword occurrences.
    pub count: usize,
    /// Words in the cleaned text.
    pub word_count: usize,
    /// The band that was enforced.
    pub required_range: TargetDensity,
    /// Where the density fell.
    pub status: DensityStatus,
    /// `status == optimal`.
    pub is_valid: bool,
    /// What to change.
    pub recommendations: Vec<Recommendation>,
}

/// One entry in a batch run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct BatchItem {
    /// Category that was requested.
    pub category: String,
    /// Whether this entry passed.
    pub is_valid: bool,
    /// The report, when the category is configured.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub report: Option<ValidationReport>,
    /// Why no report was produced.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

/// Results of validating several categories.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct BatchReport {
    /// Per-entry results, in input order.
    pub items: Vec<BatchItem>,
    /// Entries that passed.
    pub passed: usize,
    /// Entries that failed or errored.
    pub failed: usize,
}

impl BatchReport {
    /// Whether every entry passed.
    pub const fn all_valid(&self) -> bool {
        self.failed == 0
    }
}

/// A place to add one more occurrence of a keyword.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
pub struct InsertionSuggestion {
    /// Index into the paragraph-start list of the original text.
    pub paragraph_index: usize,
    /// Byte offset of that paragraph in the original text.
    pub position: usize,
    /// Opening of the paragraph, for orientation.
    pub excerpt: String,
    /// Sentence to add at the paragraph start.
    pub suggested_text: String,
    /// Why this sentence reads naturally.
    pub reason: String,
}

/// Validates primary keyword density per category.
#[derive(Debug, Clone)]
pub struct DensityValidator {
    categories: HashMap<String, Keyword>,
}

impl Default for DensityValidator {
    fn default() -> Self {
        Self::new()
    }
}

impl DensityValidator {
    /// Validator with the built-in category map.
    pub fn new() -> Self {
        let categories = PRIMARY_KEYWORDS
            .iter()
            .map(|(category, keyword)| ((*category).to_string(), Keyword::new(keyword)))
            .collect();
        Self { categories }
    }

    /// Add or override categories. Custom entries win over built-ins.
    pub fn with_categories<I, C, K>(mut self, custom: I) -> Self
    where
        I: IntoIterator<Item = (C, K)>,
        C: Into<String>,
        K: AsRef<str>,
    {
        for (category, keyword) in custom {
            self.categories
                .insert(category.into(), Keyword::new(keyword.as_ref()));
        }
        self
    }

    /// Configured categories, sorted.
    pub fn categories(&self) -> Vec<&str> {
        let mut names: Vec<&str> = self.categories.keys().map(String::as_str).collect();
        names.sort_unstable();
        names
    }

    /// Primary keyword for `category`.
    pub fn primary_keyword(&self, category: &str) -> ValidationResult<&Keyword> {
        self.categories
            .get(category)
            .ok_or_else(|| ValidationError::UnconfiguredCategory {
                category: category.to_string(),
                available: self.categories().join(", "),
            })
    }

    /// Validate `content` against the primary keyword of `category`.
    #[tracing::instrument(skip(self, content), fields(text_len = content.len()))]
    pub fn validate(&self, category: &str, content: &str) -> ValidationResult<ValidationReport> {
        let keyword = self.primary_keyword(category)?;

        let cleaned = text::clean(content);
        let word_count = text::count_words_cleaned(&cleaned);
        let count = keyword.matcher().count(&cleaned);
        let density = round2(density(count, word_count));
        let status = DensityStatus::classify(density, REQUIRED_RANGE);

        tracing::debug!(%keyword, count, word_count, density, status = status.as_str(), "validated");

        Ok(ValidationReport {
            category: category.to_string(),
            primary_keyword: keyword.clone(),
            density,
            count,
            word_count,
            required_range: REQUIRED_RANGE,
            status,
            is_valid: status == DensityStatus::Optimal,
            recommendations: vec![Recommendation::for_measurement(
                keyword,
                count,
                density,
                word_count,
                REQUIRED_RANGE,
            )],
        })
    }

    /// Validate several `(category, content)` pairs.
    pub fn validate_batch<C, T>(&self, entries: &[(C, T)]) -> BatchReport
    where
        C: AsRef<str>,
        T: AsRef<str>,
    {
        let items: Vec<BatchItem> = entries
            .iter()
            .map(|(category, content)| {
                let category = category.as_ref();
                match self.validate(category, content.as_ref()) {
                    Ok(report) => BatchItem {
                        category: category.to_string(),
                        is_valid: report.is_valid,
                        report: Some(report),
                        error: None,
                    },
                    Err(e) => BatchItem {
                        category: category.to_string(),
                        is_valid: false,
                        report: None,
                        error: Some(e.to_string()),
                    },
                }
            })
            .collect();

        let passed = items.iter().filter(|i| i.is_valid).count();
        BatchReport {
            failed: items.len() - passed,
            passed,
            items,
        }
    }
}

/// Suggest where to add `keyword` until it occurs `target_count` times.
///
/// Returns one suggestion per missing occurrence, bounded by the number of
/// paragraphs and insertion templates. Paragraphs are chosen by `picker`
/// without repeats.
pub fn suggest_insertions(
    content: &str,
    keyword: &Keyword,
    target_count: usize,
    picker: &mut impl Picker,
) -> Vec<InsertionSuggestion> {
    suggest_insertions_in(ContentFormat::Plain, content, keyword, target_count, picker)
}

/// [`suggest_insertions`] with paragraphs found according to `format`.
pub fn suggest_insertions_in(
    format: ContentFormat,
    content: &str,
    keyword: &Keyword,
    target_count: usize,
    picker: &mut impl Picker,
) -> Vec<InsertionSuggestion> {
    let current = keyword.matcher().count(&text::clean(content));
    let needed = target_count.saturating_sub(current);
    let mut remaining: Vec<(usize, usize)> = format
        .paragraph_starts(content)
        .into_iter()
        .enumerate()
        .collect();

    let mut suggestions = Vec::new();
    for template in templates::insertion_templates(keyword).iter().take(needed) {
        if remaining.is_empty() {
            break;
        }
        let (paragraph_index, position) = remaining.remove(picker.pick(remaining.len()));
        suggestions.push(InsertionSuggestion {
            paragraph_index,
            position,
            excerpt: text::excerpt_at(content, position, 40),
            suggested_text: template.render(keyword),
            reason: template.reason.to_string(),
        });
    }
    suggestions.sort_by_key(|s| s.position);
    suggestions
}

impl fmt::Display for ValidationReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let verdict = if self.is_valid { "PASS" } else { "FAIL" };
        writeln!(f, "Keyword density report: {}", self.category)?;
        writeln!(f, "  Primary keyword: \"{}\"", self.primary_keyword)?;
        writeln!(
            f,
            "  Density:         {:.2}% ({} of {} words)",
            self.density, self.count, self.word_count
        )?;
        writeln!(f, "  Required range:  {}", self.required_range)?;
        writeln!(f, "  Status:          {}", self.status.as_str())?;
        writeln!(f, "  Result:          {verdict}")?;
        if !self.recommendations.is_empty() {
            writeln!(f, "  Recommendations:")?;
            for rec in &self.recommendations {
                writeln!(f, "    - {}", rec.action)?;
            }
        }
        Ok(())
    }
}

/// Render a validation report as plain text.
pub fn generate_report(report: &ValidationReport) -> String {
    report.to_string()
}

fn round2(v: f64) -> f64 {
    (v * 100.0).round() / 100.0
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::density::RecommendationKind;
    use crate::picker::FirstPicker;

    /// `n` filler words with `k` occurrences of `phrase` appended.
    fn text_with(phrase: &str, k: usize, n: usize) -> String {
        let mut parts = vec!["cable"; n];
        parts.extend(std::iter::repeat_n(phrase, k));
        parts.join(" ")
    }

    #[test]
    fn unconfigured_category_is_an_error() {
        let err = DensityValidator::new()
            .validate("printers", "anything")
            .unwrap_err();
        let ValidationError::UnconfiguredCategory { ref category, ref available } = err;
        assert_eq!(category, "printers");
        assert!(available.contains("usb-driver"));
        assert!(err.to_string().starts_with("printers has no configured primary keyword"));
    }

    #[test]
    fn exact_bounds_are_optimal() {
        let v = DensityValidator::new();
        // single-word keyword keeps the arithmetic exact
        let v = v.with_categories([("hub", "hub")]);
        let at_min = v.validate("hub", &text_with("hub", 3, 97)).unwrap();
        assert_eq!(at_min.density, 3.0);
        assert_eq!(at_min.status, DensityStatus::Optimal);
        assert!(at_min.is_valid);

        let at_max = v.validate("hub", &text_with("hub", 5, 95)).unwrap();
        assert_eq!(at_max.density, 5.0);
        assert_eq!(at_max.status, DensityStatus::Optimal);
    }

    #[test]
    fn classify_just_outside_bounds() {
        assert_eq!(DensityStatus::classify(2.99, REQUIRED_RANGE), DensityStatus::TooLow);
        assert_eq!(DensityStatus::classify(5.01, REQUIRED_RANGE), DensityStatus::TooHigh);
        assert_eq!(DensityStatus::classify(3.00, REQUIRED_RANGE), DensityStatus::Optimal);
        assert_eq!(DensityStatus::classify(5.00, REQUIRED_RANGE), DensityStatus::Optimal);
    }

    #[test]
    fn density_is_rounded_to_two_places() {
        let v = DensityValidator::new().with_categories([("hub", "hub")]);
        // 1 in 30 is 3.333…%
        let report = v.validate("hub", &text_with("hub", 1, 29)).unwrap();
        assert_eq!(report.density, 3.33);
        assert_eq!(report.word_count, 30);
    }

    #[test]
    fn too_low_and_too_high() {
        let v = DensityValidator::new();
        let low = v
            .validate("usb-driver", &text_with("usb driver", 1, 98))
            .unwrap();
        assert_eq!(low.status, DensityStatus::TooLow);
        assert!(!low.is_valid);
        assert_eq!(low.recommendations[0].kind, RecommendationKind::Increase);

        let high = v
            .validate("usb-driver", &text_with("usb driver", 10, 80))
            .unwrap();
        assert_eq!(high.status, DensityStatus::TooHigh);
        assert_eq!(high.recommendations[0].kind, RecommendationKind::Decrease);
    }

    #[test]
    fn matches_analyzer_counts() {
        use crate::density::DensityAnalyzer;
        let content = "<p>USB driver problems?</p>\n\nUpdate the usb   driver. 安装usb driver后重启。";
        let report = DensityValidator::new().validate("usb-driver", content).unwrap();
        let analysis = DensityAnalyzer::new(["usb driver"], REQUIRED_RANGE).analyze(content);
        assert_eq!(report.word_count, analysis.word_count);
        assert_eq!(report.count, analysis.count(&Keyword::new("usb driver")));
    }

    #[test]
    fn cjk_category() {
        let v = DensityValidator::new();
        let content = "电脑提示usb设备无法识别怎么办";
        let report = v.validate("zh-usb-not-recognized", content).unwrap();
        // one Latin run plus 13 ideographs
        assert_eq!(report.word_count, 14);
        assert_eq!(report.count, 1);
    }

    #[test]
    fn custom_categories_override_builtins() {
        let v = DensityValidator::new().with_categories([("usb-driver", "driver download")]);
        assert_eq!(
            v.primary_keyword("usb-driver").unwrap().as_str(),
            "driver download"
        );
    }

    #[test]
    fn batch_counts_passes_and_failures() {
        let v = DensityValidator::new().with_categories([("hub", "hub")]);
        let good = text_with("hub", 4, 96);
        let bad = text_with("hub", 0, 50);
        let report = v.validate_batch(&[
            ("hub", good.as_str()),
            ("hub", bad.as_str()),
            ("nope", good.as_str()),
        ]);
        assert_eq!(report.passed, 1);
        assert_eq!(report.failed, 2);
        assert!(!report.all_valid());
        assert!(report.items[2].error.as_deref().unwrap().contains("nope"));
        assert!(report.items[2].report.is_none());
    }

    #[test]
    fn report_text_mentions_verdict() {
        let v = DensityValidator::new().with_categories([("hub", "hub")]);
        let report = v.validate("hub", &text_with("hub", 4, 96)).unwrap();
        let text = generate_report(&report);
        assert!(text.contains("hub"));
        assert!(text.contains("4.00%"));
        assert!(text.contains("optimal"));
        assert!(text.contains("PASS"));
    }

    #[test]
    fn suggestions_fill_the_gap() {
        let content = "First paragraph.\n\nSecond paragraph.\n\nThird paragraph.";
        let kw = Keyword::new("usb driver");
        let suggestions = suggest_insertions(content, &kw, 2, &mut FirstPicker);
        assert_eq!(suggestions.len(), 2);
        let starts = text::paragraph_starts(content);
        for s in &suggestions {
            assert!(starts.contains(&s.position));
            assert!(s.suggested_text.contains("usb driver"));
        }
        // no paragraph is suggested twice
        assert_ne!(suggestions[0].position, suggestions[1].position);
    }

    #[test]
    fn suggestions_respect_existing_occurrences() {
        let content = "The usb driver is fine.\n\nNothing else here.";
        let kw = Keyword::new("usb driver");
        assert!(suggest_insertions(content, &kw, 1, &mut FirstPicker).is_empty());
        assert_eq!(suggest_insertions(content, &kw, 2, &mut FirstPicker).len(), 1);
    }

    #[test]
    fn markdown_suggestions_skip_front_matter_and_headings() {
        let content = "---\ntitle: Hubs\n---\n\n# Hubs\n\nPower the hub first.\n\nThen plug the device in.\n";
        let kw = Keyword::new("usb hub");
        let suggestions =
            suggest_insertions_in(ContentFormat::Markdown, content, &kw, 5, &mut FirstPicker);
        assert_eq!(suggestions.len(), 2);
        assert!(content[suggestions[0].position..].starts_with("Power the hub"));
        assert!(content[suggestions[1].position..].starts_with("Then plug"));
    }

    #[test]
    fn report_display_matches_generate_report() {
        let v = DensityValidator::new().with_categories([("hub", "hub")]);
        let report = v.validate("hub", &text_with("hub", 1, 99)).unwrap();
        let text = report.to_string();
        assert_eq!(text, generate_report(&report));
        assert!(text.contains("too_low"));
        assert!(text.contains("FAIL"));
        assert!(text.contains("Recommendations:"));
    }

    #[test]
    fn suggestions_bounded_by_paragraphs() {
        let kw = Keyword::new("thunderbolt dock");
        let suggestions = suggest_insertions("one paragraph only", &kw, 5, &mut FirstPicker);
        assert_eq!(suggestions.len(), 1);
    }
}
