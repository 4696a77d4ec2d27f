//! Keyword density measurement and scoring.

use std::collections::BTreeMap;

use crate::keyword::{Keyword, KeywordMatcher};
use crate::text;

use super::reports::{AnalysisReport, Recommendation, TargetDensity};

/// Keywords tracked when the caller supplies none.
pub const DEFAULT_KEYWORDS: &[&str] = &[
    "usb not recognized",
    "usb device not recognized",
    "usb driver",
    "usb troubleshooting",
];

/// A keyword with its compiled matcher and target range.
#[derive(Debug, Clone)]
struct Tracked {
    keyword: Keyword,
    matcher: KeywordMatcher,
    target: TargetDensity,
}

/// Measures keyword densities against target ranges.
///
/// Configuration is fixed at construction; [`analyze`](Self::analyze) is a
/// pure function of its input.
#[derive(Debug, Clone)]
pub struct DensityAnalyzer {
    tracked: Vec<Tracked>,
}

impl DensityAnalyzer {
    /// Track `keywords` against a shared `target` range.
    ///
    /// Falls back to [`DEFAULT_KEYWORDS`] when `keywords` is empty or
    /// normalizes to nothing.
    pub fn new<I, S>(keywords: I, target: TargetDensity) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        Self::with_defaults(keywords, target, DEFAULT_KEYWORDS)
    }

    /// Like [`new`](Self::new) with an explicit fallback keyword list.
    pub fn with_defaults<I, S>(keywords: I, target: TargetDensity, defaults: &[&str]) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut pairs: Vec<(Keyword, TargetDensity)> = keywords
            .into_iter()
            .map(|k| (Keyword::new(k.as_ref()), target))
            .collect();
        if pairs.iter().all(|(k, _)| k.is_empty()) {
            pairs = defaults.iter().map(|k| (Keyword::new(k), target)).collect();
        }
        Self::with_targets(pairs)
    }

    /// Track keywords that each carry their own range.
    ///
    /// Empty and duplicate keywords are dropped; the first range given for a
    /// keyword wins. An empty list falls back to [`DEFAULT_KEYWORDS`] at
    /// [`TargetDensity::PRIMARY`].
    pub fn with_targets<I>(targets: I) -> Self
    where
        I: IntoIterator<Item = (Keyword, TargetDensity)>,
    {
        let mut tracked: Vec<Tracked> = Vec::new();
        for (keyword, target) in targets {
            if keyword.is_empty() || tracked.iter().any(|t| t.keyword == keyword) {
                continue;
            }
            tracked.push(Tracked {
                matcher: keyword.matcher(),
                keyword,
                target,
            });
        }

        if tracked.is_empty() {
            tracked = DEFAULT_KEYWORDS
                .iter()
                .map(|k| {
                    let keyword = Keyword::new(k);
                    Tracked {
                        matcher: keyword.matcher(),
                        keyword,
                        target: TargetDensity::PRIMARY,
                    }
                })
                .collect();
        }

        Self { tracked }
    }

    /// Tracked keywords, in configuration order.
    pub fn keywords(&self) -> impl Iterator<Item = &Keyword> {
        self.tracked.iter().map(|t| &t.keyword)
    }

    /// Range for `keyword`, if tracked.
    pub fn target_for(&self, keyword: &Keyword) -> Option<TargetDensity> {
        self.tracked
            .iter()
            .find(|t| &t.keyword == keyword)
            .map(|t| t.target)
    }

    pub(crate) fn matcher_for(&self, keyword: &Keyword) -> Option<&KeywordMatcher> {
        self.tracked
            .iter()
            .find(|t| &t.keyword == keyword)
            .map(|t| &t.matcher)
    }

    /// Analyze `content`. Empty input yields [`empty_report`](Self::empty_report).
    #[tracing::instrument(skip_all, fields(text_len = content.len(), keywords = self.tracked.len()))]
    pub fn analyze(&self, content: &str) -> AnalysisReport {
        if content.is_empty() {
            return self.empty_report();
        }

        let cleaned = text::clean(content);
        let word_count = text::count_words_cleaned(&cleaned);

        let mut keyword_counts = BTreeMap::new();
        let mut densities = BTreeMap::new();
        let mut targets = BTreeMap::new();
        let mut recommendations = Vec::with_capacity(self.tracked.len());
        let mut score_sum = 0.0;
        let mut is_optimal = true;

        for t in &self.tracked {
            let count = t.matcher.count(&cleaned);
            let density = density(count, word_count);
            tracing::debug!(keyword = %t.keyword, count, density, "measured keyword");

            score_sum += t.target.score(density);
            is_optimal &= t.target.contains(density);
            recommendations.push(Recommendation::for_measurement(
                &t.keyword, count, density, word_count, t.target,
            ));
            keyword_counts.insert(t.keyword.clone(), count);
            densities.insert(t.keyword.clone(), density);
            targets.insert(t.keyword.clone(), t.target);
        }

        let overall_score = (score_sum / self.tracked.len() as f64)
            .round()
            .clamp(0.0, 100.0) as u8;

        AnalysisReport {
            word_count,
            keyword_counts,
            densities,
            targets,
            recommendations,
            is_optimal,
            overall_score,
        }
    }

    /// Analyze optional content; `None` is treated like empty input.
    pub fn analyze_opt(&self, content: Option<&str>) -> AnalysisReport {
        content.map_or_else(|| self.empty_report(), |c| self.analyze(c))
    }

    /// Report for missing input: zero words, zero densities, score 0.
    pub fn empty_report(&self) -> AnalysisReport {
        let keywords = || self.tracked.iter().map(|t| t.keyword.clone());
        AnalysisReport {
            word_count: 0,
            keyword_counts: keywords().map(|k| (k, 0)).collect(),
            densities: keywords().map(|k| (k, 0.0)).collect(),
            targets: self
                .tracked
                .iter()
                .map(|t| (t.keyword.clone(), t.target))
                .collect(),
            recommendations: Vec::new(),
            is_optimal: false,
            overall_score: 0,
        }
    }
}

impl Default for DensityAnalyzer {
    fn default() -> Self {
        Self::new(Vec::<String>::new(), TargetDensity::default())
    }
}

/// `count / words * 100`, or 0 when there are no words.
pub fn density(count: usize, words: usize) -> f64 {
    if words == 0 {
        0.0
    } else {
        count as f64 * 100.0 / words as f64
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::density::reports::RecommendationKind;

    fn analyzer(keywords: &[&str]) -> DensityAnalyzer {
        DensityAnalyzer::new(keywords.iter().copied(), TargetDensity::PRIMARY)
    }

    /// `n` filler words followed by `k` occurrences of "usb".
    fn text_with(k: usize, n: usize) -> String {
        let mut words = vec!["filler"; n];
        words.extend(std::iter::repeat_n("usb", k));
        words.join(" ")
    }

    #[test]
    fn density_formula() {
        let report = analyzer(&["usb"]).analyze(&text_with(4, 96));
        let kw = Keyword::new("usb");
        assert_eq!(report.word_count, 100);
        assert_eq!(report.count(&kw), 4);
        assert!((report.density(&kw) - 4.0).abs() < 1e-9);
        assert!(report.is_optimal);
        assert_eq!(report.overall_score, 100);
    }

    #[test]
    fn empty_input_gives_empty_report() {
        let a = analyzer(&["usb"]);
        for report in [a.analyze(""), a.analyze_opt(None), a.analyze_opt(Some(""))] {
            assert_eq!(report.word_count, 0);
            assert_eq!(report.overall_score, 0);
            assert!(!report.is_optimal);
            assert!(report.recommendations.is_empty());
            assert_eq!(report.density(&Keyword::new("usb")), 0.0);
        }
    }

    #[test]
    fn punctuation_only_has_zero_density() {
        let report = analyzer(&["usb"]).analyze("!!! ... ???");
        assert_eq!(report.word_count, 0);
        assert_eq!(report.density(&Keyword::new("usb")), 0.0);
        assert_eq!(report.overall_score, 0);
    }

    #[test]
    fn analysis_is_idempotent() {
        let a = analyzer(&["usb", "driver"]);
        let input = "USB driver issues. Reinstall the USB driver, then replug the USB.";
        assert_eq!(a.analyze(input), a.analyze(input));
    }

    #[test]
    fn empty_keywords_fall_back_to_defaults() {
        let a = DensityAnalyzer::new(Vec::<String>::new(), TargetDensity::PRIMARY);
        let tracked: Vec<&str> = a.keywords().map(Keyword::as_str).collect();
        assert_eq!(tracked, DEFAULT_KEYWORDS);

        let blank = analyzer(&["  ", ""]);
        assert_eq!(blank.keywords().count(), DEFAULT_KEYWORDS.len());
    }

    #[test]
    fn custom_defaults_are_injected() {
        let a = DensityAnalyzer::with_defaults(Vec::<&str>::new(), TargetDensity::PRIMARY, &["hub"]);
        let tracked: Vec<&str> = a.keywords().map(Keyword::as_str).collect();
        assert_eq!(tracked, vec!["hub"]);
    }

    #[test]
    fn one_recommendation_per_keyword() {
        let a = analyzer(&["usb", "driver", "port"]);
        let report = a.analyze(&text_with(10, 90));
        assert_eq!(report.recommendations.len(), 3);
        let kinds: Vec<_> = report.recommendations.iter().map(|r| r.kind).collect();
        assert_eq!(
            kinds,
            vec![
                RecommendationKind::Decrease,
                RecommendationKind::Increase,
                RecommendationKind::Increase
            ]
        );
    }

    #[test]
    fn overall_score_averages_keywords() {
        let a = analyzer(&["usb", "missing"]);
        // usb at 4% scores 100, missing at 0% scores 0
        let report = a.analyze(&text_with(4, 96));
        assert_eq!(report.overall_score, 50);
        assert!(!report.is_optimal);
    }

    #[test]
    fn per_keyword_targets() {
        let a = DensityAnalyzer::with_targets([
            (Keyword::new("usb"), TargetDensity::PRIMARY),
            (Keyword::new("filler"), TargetDensity::new(90.0, 100.0)),
        ]);
        let report = a.analyze(&text_with(4, 96));
        assert!(report.is_optimal);
        assert_eq!(
            a.target_for(&Keyword::new("filler")),
            Some(TargetDensity::new(90.0, 100.0))
        );
    }

    #[test]
    fn duplicate_keywords_collapse() {
        let a = analyzer(&["USB", "usb", " usb "]);
        assert_eq!(a.keywords().count(), 1);
    }

    #[test]
    fn overlapping_keywords_count_independently() {
        let a = analyzer(&["usb", "usb not recognized"]);
        let report = a.analyze("usb not recognized");
        assert_eq!(report.count(&Keyword::new("usb")), 1);
        assert_eq!(report.count(&Keyword::new("usb not recognized")), 1);
    }

    #[test]
    fn counts_against_cleaned_text() {
        let a = analyzer(&["usb not recognized"]);
        let report = a.analyze("<h1>USB   not\n\nrecognized!</h1> <p>usb, not recognized</p>");
        // the comma is stripped before matching
        assert_eq!(report.count(&Keyword::new("usb not recognized")), 2);
    }

    #[test]
    fn end_to_end_overused_phrase() {
        let a = analyzer(&["usb device not recognized"]);
        let content = "USB device not recognized USB device not recognized USB device not recognized";
        let report = a.analyze(content);
        let kw = Keyword::new("usb device not recognized");
        assert_eq!(report.word_count, 12);
        assert_eq!(report.count(&kw), 3);
        assert!((report.density(&kw) - 25.0).abs() < 1e-9);
        assert_eq!(report.recommendations[0].kind, RecommendationKind::Decrease);
        assert_eq!(report.recommendations[0].delta(), 3);
    }
}
