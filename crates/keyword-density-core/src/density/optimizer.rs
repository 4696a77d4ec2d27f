//! Text rewriting to move keyword densities into range.
//!
//! Under-used keywords get a short sentence spliced in at a paragraph
//! start. Over-used keywords have their last occurrences swapped for
//! synonyms. Every mutation is recorded as a [`Change`], and the final text
//! is analyzed from scratch.

use std::collections::BTreeMap;

use crate::keyword::Keyword;
use crate::picker::{Picker, RandomPicker};
use crate::text::{self, CleanedText, ContentFormat};

use super::analyzer::DensityAnalyzer;
use super::reports::{
    AnalysisReport, Change, ChangeKind, Improvement, OptimizationResult, TargetDensity,
};
use super::templates;

/// Rewrites text so tracked keywords land in their target ranges.
#[derive(Debug, Clone, Default)]
pub struct DensityOptimizer {
    analyzer: DensityAnalyzer,
    format: ContentFormat,
}

impl DensityOptimizer {
    /// Optimize `keywords` toward a shared `target` range.
    pub fn new<I, S>(keywords: I, target: TargetDensity) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        Self::from_analyzer(DensityAnalyzer::new(keywords, target))
    }

    /// Wrap an existing analyzer (e.g. one with per-keyword ranges).
    pub const fn from_analyzer(analyzer: DensityAnalyzer) -> Self {
        Self {
            analyzer,
            format: ContentFormat::Plain,
        }
    }

    /// Treat input as `format` when choosing insertion points and edits.
    #[must_use]
    pub const fn with_format(mut self, format: ContentFormat) -> Self {
        self.format = format;
        self
    }

    /// The analyzer used for before/after measurement.
    pub const fn analyzer(&self) -> &DensityAnalyzer {
        &self.analyzer
    }

    /// Analyze without rewriting.
    pub fn analyze(&self, content: &str) -> AnalysisReport {
        self.analyzer.analyze(content)
    }

    /// Optimize with an environment-seeded random picker.
    pub fn optimize(&self, content: &str) -> OptimizationResult {
        self.optimize_with(content, &mut RandomPicker::new())
    }

    /// Optimize optional content; `None` is treated like empty input.
    pub fn optimize_opt(&self, content: Option<&str>) -> OptimizationResult {
        content.map_or_else(|| self.empty_result(), |c| self.optimize(c))
    }

    /// Optimize, delegating every paragraph and synonym choice to `picker`.
    #[tracing::instrument(skip_all, fields(text_len = content.len()))]
    pub fn optimize_with(&self, content: &str, picker: &mut impl Picker) -> OptimizationResult {
        if content.is_empty() {
            return self.empty_result();
        }

        let before = self.analyzer.analyze(content);
        let mut text = content.to_string();
        let mut changes = Vec::new();

        let starting_counts: BTreeMap<Keyword, usize> = before.keyword_counts.clone();
        let below_min: Vec<Keyword> = before
            .recommendations
            .iter()
            .filter(|r| r.current_density < r.target.min)
            .map(|r| r.keyword.clone())
            .collect();

        for keyword in &below_min {
            self.add_occurrences(&mut text, keyword, &before, picker, &mut changes);
        }

        let middle = self.analyzer.analyze(&text);
        for rec in &middle.recommendations {
            if rec.current_density <= rec.target.max {
                continue;
            }
            let mut excess = rec.delta();
            if below_min.contains(&rec.keyword) {
                // Only undo our own insertions for keywords that started low.
                let floor = starting_counts.get(&rec.keyword).copied().unwrap_or(0);
                excess = excess.min(rec.current_count.saturating_sub(floor));
            }
            self.replace_occurrences(&mut text, &rec.keyword, excess, picker, &mut changes);
        }

        let analysis = self.analyzer.analyze(&text);
        let improvement = Improvement::between(&before, &analysis);
        tracing::info!(
            changes = changes.len(),
            before = before.overall_score,
            after = analysis.overall_score,
            "optimization finished"
        );

        OptimizationResult {
            content: text,
            analysis,
            changes,
            improvement: Some(improvement),
        }
    }

    fn empty_result(&self) -> OptimizationResult {
        OptimizationResult {
            content: String::new(),
            analysis: self.analyzer.empty_report(),
            changes: Vec::new(),
            improvement: None,
        }
    }

    /// Splice template sentences for `keyword` at paragraph starts.
    fn add_occurrences(
        &self,
        text: &mut String,
        keyword: &Keyword,
        report: &AnalysisReport,
        picker: &mut impl Picker,
        changes: &mut Vec<Change>,
    ) {
        let Some(target) = self.analyzer.target_for(keyword) else {
            return;
        };
        let needed = target
            .min_occurrences(report.word_count)
            .saturating_sub(report.count(keyword));
        let available = templates::insertion_templates(keyword);

        for template in available.iter().take(needed) {
            let starts = self.format.paragraph_starts(text);
            if starts.is_empty() {
                tracing::debug!(keyword = %keyword, "no insertion point, skipping");
                continue;
            }
            let position = starts[picker.pick(starts.len())];
            let inserted = with_separator(template.render(keyword));
            text.insert_str(position, &inserted);
            tracing::debug!(keyword = %keyword, position, "inserted keyword sentence");
            changes.push(Change {
                kind: ChangeKind::Addition,
                keyword: keyword.clone(),
                position,
                inserted,
                removed: String::new(),
                reason: template.reason.to_string(),
            });
        }
    }

    /// Replace the last `excess` counted occurrences of `keyword`, back to front.
    ///
    /// Matches are found in the cleaned text, the same way the analyzer
    /// counts them, and mapped back to the input. Occurrences that cross a
    /// tag or fall outside prose are left alone.
    fn replace_occurrences(
        &self,
        text: &mut String,
        keyword: &Keyword,
        excess: usize,
        picker: &mut impl Picker,
        changes: &mut Vec<Change>,
    ) {
        if excess == 0 {
            return;
        }
        let Some(matcher) = self.analyzer.matcher_for(keyword) else {
            return;
        };
        let synonyms = templates::replacements(keyword);
        let cleaned = CleanedText::new(text);
        let prose = self.format.prose_spans(text);
        let matches: Vec<_> = matcher
            .find_all(cleaned.as_str())
            .into_iter()
            .filter_map(|range| cleaned.raw_range(range))
            .filter(|range| {
                prose
                    .iter()
                    .any(|span| span.start <= range.start && range.end <= span.end)
            })
            .collect();
        if matches.len() < excess {
            tracing::debug!(
                keyword = %keyword,
                editable = matches.len(),
                excess,
                "not every occurrence can be rewritten"
            );
        }
        let skip = matches.len().saturating_sub(excess);

        for range in matches[skip..].iter().rev() {
            let synonym = synonyms[picker.pick(synonyms.len())];
            let removed = text[range.clone()].to_string();
            text.replace_range(range.clone(), synonym);
            tracing::debug!(keyword = %keyword, position = range.start, "replaced keyword");
            changes.push(Change {
                kind: ChangeKind::Replacement,
                keyword: keyword.clone(),
                position: range.start,
                inserted: synonym.to_string(),
                removed,
                reason: format!("\"{keyword}\" is above its target density; replaced with a synonym"),
            });
        }
    }
}

/// Append the gap between an inserted sentence and the paragraph it opens.
///
/// CJK sentences end in full-width punctuation and take no space.
fn with_separator(mut sentence: String) -> String {
    let closes_cjk = sentence
        .chars()
        .next_back()
        .is_some_and(|c| text::is_cjk(c) || text::is_cjk_punctuation(c));
    if !closes_cjk {
        sentence.push(' ');
    }
    sentence
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::density::reports::OverallImprovement;
    use crate::picker::{FirstPicker, LastPicker};

    fn optimizer(keywords: &[&str]) -> DensityOptimizer {
        DensityOptimizer::new(keywords.iter().copied(), TargetDensity::PRIMARY)
    }

    fn distance(density: f64, target: TargetDensity) -> f64 {
        if density < target.min {
            target.min - density
        } else if density > target.max {
            density - target.max
        } else {
            0.0
        }
    }

    const ARTICLE: &str = "Plugging in a flash drive should just work.\n\n\
        Sometimes Windows shows an error instead and the drive never appears.\n\n\
        Check the cable and try another port before anything else.\n\n\
        If nothing helps, reinstall the driver from the device manager.";

    #[test]
    fn empty_input_returns_empty_result() {
        let o = optimizer(&["usb"]);
        for result in [o.optimize(""), o.optimize_opt(None)] {
            assert!(result.content.is_empty());
            assert!(result.changes.is_empty());
            assert_eq!(result.analysis.word_count, 0);
            assert!(result.improvement.is_none());
        }
    }

    #[test]
    fn inserts_under_used_keyword_at_paragraph_start() {
        let o = optimizer(&["usb not recognized"]);
        let result = o.optimize_with(ARTICLE, &mut FirstPicker);
        let kw = Keyword::new("usb not recognized");

        assert!(!result.changes.is_empty());
        let starts = text::paragraph_starts(ARTICLE);
        for change in &result.changes {
            assert_eq!(change.kind, ChangeKind::Addition);
            assert!(change.inserted.contains(kw.as_str()));
            assert!(change.removed.is_empty());
            assert!(!change.reason.is_empty());
        }
        assert!(starts.contains(&result.changes[0].position));
        assert!(result.analysis.count(&kw) >= 1);
    }

    #[test]
    fn random_insertion_lands_on_a_paragraph_start() {
        let o = optimizer(&["usb driver"]);
        for seed in 0..20 {
            let result = o.optimize_with(ARTICLE, &mut RandomPicker::with_seed(seed));
            let first = &result.changes[0];
            assert!(text::paragraph_starts(ARTICLE).contains(&first.position));
        }
    }

    #[test]
    fn additions_move_density_toward_range() {
        let o = optimizer(&["usb not recognized", "thunderbolt dock"]);
        let before = o.analyze(ARTICLE);
        let result = o.optimize_with(ARTICLE, &mut LastPicker);
        for kw in o.analyzer().keywords() {
            let target = o.analyzer().target_for(kw).unwrap();
            assert!(
                distance(result.analysis.density(kw), target)
                    <= distance(before.density(kw), target),
                "{kw} moved away from its range"
            );
        }
    }

    #[test]
    fn additions_are_absent_before_and_present_after() {
        let o = optimizer(&["thunderbolt dock"]);
        let result = o.optimize_with(ARTICLE, &mut FirstPicker);
        let mut text = ARTICLE.to_string();
        for change in &result.changes {
            assert!(!text[change.position..].starts_with(&change.inserted));
            text.insert_str(change.position, &change.inserted);
        }
        assert_eq!(text, result.content);
    }

    #[test]
    fn additions_bounded_by_template_count() {
        // a long text needs many occurrences; generic fallback offers three
        let long = (0..40)
            .map(|i| format!("Paragraph {i} talks about cables and ports at some length."))
            .collect::<Vec<_>>()
            .join("\n\n");
        let o = optimizer(&["thunderbolt dock"]);
        let result = o.optimize_with(&long, &mut FirstPicker);
        assert_eq!(result.changes.len(), 3);
    }

    #[test]
    fn whitespace_only_text_skips_insertions() {
        let o = optimizer(&["usb"]);
        let result = o.optimize_with("   \n\n  ", &mut FirstPicker);
        assert!(result.changes.is_empty());
        assert_eq!(result.content, "   \n\n  ");
    }

    #[test]
    fn replaces_last_occurrences_of_over_used_keyword() {
        let filler = vec!["cable"; 60].join(" ");
        let content = format!("usb {filler} usb usb usb usb usb usb usb");
        let o = optimizer(&["usb"]);
        let before = o.analyze(&content);
        let result = o.optimize_with(&content, &mut FirstPicker);
        let kw = Keyword::new("usb");

        // 68 words, 8 occurrences; max 5% allows 3
        assert_eq!(before.word_count, 68);
        assert_eq!(before.count(&kw), 8);
        assert_eq!(result.changes.len(), 5);
        assert!(result.content.starts_with("usb "));
        assert!(result.changes.iter().all(|c| c.kind == ChangeKind::Replacement));

        // positions descend: applied back to front
        let positions: Vec<usize> = result.changes.iter().map(|c| c.position).collect();
        assert!(positions.windows(2).all(|w| w[0] > w[1]));
        assert!(result.analysis.density(&kw) <= 5.0);
    }

    #[test]
    fn replacements_were_present_before() {
        let content = "USB device not recognized USB device not recognized USB device not recognized";
        let o = optimizer(&["usb device not recognized"]);
        let result = o.optimize_with(content, &mut FirstPicker);

        let mut text = content.to_string();
        for change in &result.changes {
            assert_eq!(change.kind, ChangeKind::Replacement);
            let end = change.position + change.removed.len();
            assert_eq!(&text[change.position..end], change.removed);
            text.replace_range(change.position..end, &change.inserted);
        }
        assert_eq!(text, result.content);
    }

    #[test]
    fn end_to_end_overused_phrase() {
        let content = "USB device not recognized USB device not recognized USB device not recognized";
        let o = optimizer(&["usb device not recognized"]);
        let result = o.optimize_with(content, &mut FirstPicker);
        let kw = Keyword::new("usb device not recognized");

        // 3 occurrences in 12 words is 25%; even one would be 8.3%
        assert_eq!(result.changes.len(), 3);
        assert_eq!(result.analysis.count(&kw), 0);
        assert!(result.analysis.word_count > 0);
        assert!(result.analysis.density(&kw) <= 5.0);
    }

    #[test]
    fn in_range_keywords_are_untouched() {
        let filler = vec!["cable"; 96].join(" ");
        let content = format!("usb usb {filler} usb usb");
        let o = optimizer(&["usb"]);
        let result = o.optimize_with(&content, &mut FirstPicker);
        assert!(result.changes.is_empty());
        assert_eq!(result.content, content);
        let improvement = result.improvement.unwrap();
        assert_eq!(improvement.score_improvement, 0);
        assert_eq!(improvement.overall, OverallImprovement::Unchanged);
    }

    #[test]
    fn improvement_lists_keywords_moved_into_range() {
        let filler = vec!["cable"; 60].join(" ");
        let content = format!("usb {filler} usb usb usb usb usb usb usb");
        let o = optimizer(&["usb"]);
        let result = o.optimize_with(&content, &mut FirstPicker);
        let improvement = result.improvement.unwrap();
        assert!(improvement.improved_keywords.contains(&Keyword::new("usb")));
        assert!(improvement.worsened_keywords.is_empty());
        assert!(improvement.score_improvement > 0);
    }

    fn filler(n: usize) -> String {
        vec!["cable"; n].join(" ")
    }

    #[test]
    fn replacements_skip_markup_and_reduce_counted_occurrences() {
        let content = format!(
            "usb usb usb usb {} <a href=\"/usb\">docs</a> <img alt=\"usb\"> <a href=\"/usb\">more</a>",
            filler(40)
        );
        let o = optimizer(&["usb"]);
        let kw = Keyword::new("usb");
        let before = o.analyze(&content);
        assert_eq!(before.count(&kw), 4);
        assert_eq!(before.word_count, 46);

        let result = o.optimize_with(&content, &mut FirstPicker);
        // 46 words allow 2 occurrences at 5%
        assert_eq!(result.changes.len(), 2);
        assert_eq!(result.analysis.count(&kw), 2);
        assert!(result.analysis.density(&kw) < before.density(&kw));
        assert!(result.content.ends_with(
            "<a href=\"/usb\">docs</a> <img alt=\"usb\"> <a href=\"/usb\">more</a>"
        ));
        assert!(result.content.starts_with("usb usb the device the device "));
    }

    #[test]
    fn replacements_skip_hyphenated_forms() {
        let content = format!("usb usb usb usb {} usb-c usb-c usb-c", filler(40));
        let o = optimizer(&["usb"]);
        let kw = Keyword::new("usb");
        // cleaning joins "usb-c" into one word that is not the keyword
        assert_eq!(o.analyze(&content).count(&kw), 4);

        let result = o.optimize_with(&content, &mut FirstPicker);
        assert_eq!(result.analysis.count(&kw), 2);
        assert!(result.content.ends_with("usb-c usb-c usb-c"));
        for change in &result.changes {
            assert_eq!(change.removed, "usb");
        }
    }

    #[test]
    fn replacement_spans_punctuation_the_count_ignores() {
        let content = format!("{} USB, not recognized. usb not recognized", filler(10));
        let o = optimizer(&["usb not recognized"]);
        let kw = Keyword::new("usb not recognized");
        assert_eq!(o.analyze(&content).count(&kw), 2);

        let result = o.optimize_with(&content, &mut FirstPicker);
        assert_eq!(result.analysis.count(&kw), 0);
        assert_eq!(result.changes.last().unwrap().removed, "USB, not recognized");
    }

    #[test]
    fn cjk_insertions_take_no_space() {
        let content = "电脑插上设备以后没有任何反应，请检查接口和数据线是否正常。";
        let o = optimizer(&["usb设备无法识别"]);
        let result = o.optimize_with(content, &mut FirstPicker);
        let first = &result.changes[0];
        assert_eq!(first.inserted, "遇到usb设备无法识别时，可以先检查数据线和接口。");
        assert!(result.content.starts_with("遇到usb设备无法识别时，可以先检查数据线和接口。电脑"));
    }

    #[test]
    fn latin_insertions_keep_a_space() {
        let result = optimizer(&["thunderbolt dock"]).optimize_with(ARTICLE, &mut FirstPicker);
        assert!(result.changes[0].inserted.ends_with(": "));
    }

    #[test]
    fn markdown_insertions_land_on_paragraphs_only() {
        let page = "---\ntitle: Docking\n---\n\n# Fixing a dock\n\nPlug the cable in and wait for the screen to wake.\n\n- check power\n- check the port\n\nTry another cable if nothing happens after a minute.\n";
        let o = optimizer(&["thunderbolt dock"]).with_format(ContentFormat::Markdown);
        let paragraphs = ContentFormat::Markdown.paragraph_starts(page);
        assert_eq!(paragraphs.len(), 2);

        for seed in 0..10 {
            let result = o.optimize_with(page, &mut RandomPicker::with_seed(seed));
            assert!(result.content.starts_with("---\ntitle: Docking\n---\n\n# Fixing a dock\n"));
            assert!(!result.changes.is_empty());
            assert!(paragraphs.contains(&result.changes[0].position));
        }
    }

    #[test]
    fn markdown_replacements_leave_code_and_links() {
        let page = format!(
            "Reinstall the usb driver today. The usb driver matters. A usb driver helps. {}\n\n```\nusb driver\n```\n\nSee [the guide](/usb-driver).\n",
            filler(20)
        );
        let o = optimizer(&["usb driver"]).with_format(ContentFormat::Markdown);
        let result = o.optimize_with(&page, &mut FirstPicker);
        assert!(!result.changes.is_empty());
        assert!(result.content.contains("```\nusb driver\n```"));
        assert!(result.content.contains("(/usb-driver)"));
    }
}
