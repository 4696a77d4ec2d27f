//! Text cleaning, word counting, and paragraph discovery.
//!
//! Word counting is script-aware: every CJK ideograph counts as one word,
//! and every maximal run of ASCII letters counts as one word. Digits and
//! punctuation never contribute.

use std::ops::Range;
use std::sync::LazyLock;

use regex::Regex;

use crate::markdown;

/// Tag-like substrings (`<p>`, `</div>`, `<br/>`).
static TAG_PATTERN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"<[^>]*>").expect("valid regex"));

/// Maximal runs of ASCII letters.
static LATIN_RUN_PATTERN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"[a-zA-Z]+").expect("valid regex"));

/// Whether `ch` is a CJK unified ideograph (U+4E00..=U+9FFF).
pub const fn is_cjk(ch: char) -> bool {
    matches!(ch, '\u{4E00}'..='\u{9FFF}')
}

/// Whether `ch` is CJK punctuation (ideographic or fullwidth forms).
pub const fn is_cjk_punctuation(ch: char) -> bool {
    matches!(ch, '\u{3000}'..='\u{303F}' | '\u{FF00}'..='\u{FFEF}')
}

/// Whether `ch` counts as a word character for keyword boundaries.
pub const fn is_ascii_word_char(ch: char) -> bool {
    ch.is_ascii_alphanumeric() || ch == '_'
}

/// Whether the text contains any CJK ideograph.
pub fn contains_cjk(text: &str) -> bool {
    text.chars().any(is_cjk)
}

/// Normalize text for counting.
///
/// Replaces tags with a space, collapses whitespace, lowercases, then drops
/// every character that is not an ASCII word character, whitespace, or a
/// CJK ideograph.
#[tracing::instrument(skip_all, fields(text_len = text.len()))]
pub fn clean(text: &str) -> String {
    CleanedText::new(text).into_string()
}

/// Cleaned text that remembers which input bytes each cleaned byte came from.
///
/// Keyword matches found in the cleaned text are exactly the ones the
/// analyzer counts; [`raw_range`](Self::raw_range) maps them back so they
/// can be edited in the original input.
#[derive(Debug, Clone)]
pub struct CleanedText {
    text: String,
    /// Input range behind each cleaned byte.
    origins: Vec<Range<usize>>,
    /// Input ranges of tags.
    tags: Vec<Range<usize>>,
}

impl CleanedText {
    /// Clean `raw`, recording offsets.
    pub fn new(raw: &str) -> Self {
        let tags: Vec<Range<usize>> = TAG_PATTERN.find_iter(raw).map(|m| m.range()).collect();
        let mut out = Self {
            text: String::with_capacity(raw.len()),
            origins: Vec::with_capacity(raw.len()),
            tags: Vec::new(),
        };

        // Input range of the whitespace run not yet emitted.
        let mut pending_space: Option<Range<usize>> = None;
        let mut next_tag = tags.iter().peekable();
        let mut pos = 0;
        while pos < raw.len() {
            if let Some(tag) = next_tag.next_if(|t| t.start == pos) {
                pending_space = Some(extend(pending_space, tag.clone()));
                pos = tag.end;
                continue;
            }
            let Some(ch) = raw[pos..].chars().next() else {
                break;
            };
            let span = pos..pos + ch.len_utf8();
            pos = span.end;

            if ch.is_whitespace() {
                pending_space = Some(extend(pending_space, span));
                continue;
            }
            // Any other character ends the run, even one that is dropped.
            if let Some(space) = pending_space.take() {
                out.push(' ', space);
            }
            for lower in ch.to_lowercase() {
                if is_ascii_word_char(lower) || is_cjk(lower) {
                    out.push(lower, span.clone());
                }
            }
        }
        if let Some(space) = pending_space {
            out.push(' ', space);
        }

        out.tags = tags;
        out
    }

    fn push(&mut self, ch: char, origin: Range<usize>) {
        self.text.push(ch);
        for _ in 0..ch.len_utf8() {
            self.origins.push(origin.clone());
        }
    }

    /// The cleaned text.
    pub fn as_str(&self) -> &str {
        &self.text
    }

    /// Consume into the cleaned string.
    pub fn into_string(self) -> String {
        self.text
    }

    /// Input range covering the cleaned range `cleaned`.
    ///
    /// `None` when the range is empty, out of bounds, or would cross a tag
    /// in the input.
    pub fn raw_range(&self, cleaned: Range<usize>) -> Option<Range<usize>> {
        if cleaned.start >= cleaned.end {
            return None;
        }
        let first = self.origins.get(cleaned.start)?;
        let last = self.origins.get(cleaned.end - 1)?;
        let raw = first.start..last.end;
        let crosses_tag = self
            .tags
            .iter()
            .any(|t| t.start < raw.end && raw.start < t.end);
        (!crosses_tag).then_some(raw)
    }
}

fn extend(run: Option<Range<usize>>, span: Range<usize>) -> Range<usize> {
    run.map_or(span.clone(), |r| r.start..span.end)
}

/// Count words in already-cleaned text.
pub fn count_words_cleaned(cleaned: &str) -> usize {
    let cjk = cleaned.chars().filter(|&c| is_cjk(c)).count();
    let latin = LATIN_RUN_PATTERN.find_iter(cleaned).count();
    cjk + latin
}

/// Clean `text` and count its words.
pub fn count_words(text: &str) -> usize {
    count_words_cleaned(&clean(text))
}

/// Byte offsets where a paragraph starts.
///
/// A paragraph start is offset 0 or the offset just after a `\n`, provided
/// the line that begins there has non-whitespace content.
pub fn paragraph_starts(text: &str) -> Vec<usize> {
    let mut starts = Vec::new();
    let mut offset = 0;
    for line in text.split_inclusive('\n') {
        if !line.trim().is_empty() {
            starts.push(offset);
        }
        offset += line.len();
    }
    starts
}

/// How paragraphs are found in raw input.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum ContentFormat {
    /// Plain text or HTML: every non-blank line starts a paragraph.
    #[default]
    Plain,
    /// Markdown: only CommonMark paragraphs take insertions and rewrites.
    Markdown,
}

impl ContentFormat {
    /// Format implied by a file extension (`md`, `markdown`).
    pub fn from_extension(ext: Option<&str>) -> Self {
        match ext {
            Some(ext) if ext.eq_ignore_ascii_case("md") || ext.eq_ignore_ascii_case("markdown") => {
                Self::Markdown
            }
            _ => Self::Plain,
        }
    }

    /// Byte offsets where a sentence may be inserted.
    pub fn paragraph_starts(self, text: &str) -> Vec<usize> {
        match self {
            Self::Plain => paragraph_starts(text),
            Self::Markdown => markdown::paragraph_starts(text),
        }
    }

    /// Byte ranges whose words may be rewritten.
    pub fn prose_spans(self, text: &str) -> Vec<Range<usize>> {
        match self {
            Self::Plain => vec![0..text.len()],
            Self::Markdown => markdown::prose_spans(text),
        }
    }
}

/// A short single-line excerpt starting at `offset`, for display.
pub fn excerpt_at(text: &str, offset: usize, max_chars: usize) -> String {
    let rest = text.get(offset..).unwrap_or_default();
    let line = rest.lines().next().unwrap_or_default().trim();
    let mut out: String = line.chars().take(max_chars).collect();
    if line.chars().count() > max_chars {
        out.push('…');
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn clean_strips_tags_and_punctuation() {
        assert_eq!(clean("<p>USB, Device!</p>"), " usb device ");
    }

    #[test]
    fn clean_collapses_whitespace() {
        assert_eq!(clean("usb\n\n\t  device"), "usb device");
    }

    #[test]
    fn clean_preserves_cjk() {
        assert_eq!(clean("USB设备，无法识别！"), "usb设备无法识别");
    }

    #[test]
    fn mixed_script_word_count() {
        // one Latin run plus two ideographs
        assert_eq!(count_words("USB设备"), 3);
    }

    #[test]
    fn digits_do_not_count() {
        assert_eq!(count_words("usb 3 0 port"), 2);
        assert_eq!(count_words("2024"), 0);
    }

    #[test]
    fn letters_split_on_digits() {
        // "usb3" is one Latin run followed by a digit
        assert_eq!(count_words("usb3 hub"), 2);
    }

    #[test]
    fn empty_text_has_no_words() {
        assert_eq!(count_words(""), 0);
        assert_eq!(count_words("   "), 0);
        assert_eq!(count_words("!!! ..."), 0);
    }

    #[test]
    fn paragraph_starts_skip_blank_lines() {
        let text = "First line.\n\nSecond para.\n   \nThird.";
        let starts = paragraph_starts(text);
        assert_eq!(starts, vec![0, 13, 30]);
        assert!(text[13..].starts_with("Second"));
        assert!(text[30..].starts_with("Third"));
    }

    #[test]
    fn paragraph_starts_single_line() {
        assert_eq!(paragraph_starts("just one line"), vec![0]);
        assert!(paragraph_starts("").is_empty());
        assert!(paragraph_starts("\n\n  \n").is_empty());
    }

    #[test]
    fn cleaned_text_matches_clean() {
        for input in [
            "<p>USB, Device!</p>",
            "a , b",
            "usb\n\n\t  device <br/> 设备，无法识别！",
            "<a href=\"/usb\">docs</a>   usb-c",
            "",
        ] {
            let cleaned = CleanedText::new(input);
            assert_eq!(cleaned.as_str(), clean(input), "input: {input:?}");
        }
        assert_eq!(clean("a , b"), "a  b");
    }

    #[test]
    fn raw_range_maps_back_to_input() {
        let input = "Fix the <b>USB</b>, not recognized";
        let cleaned = CleanedText::new(input);
        let at = cleaned.as_str().find("usb").unwrap();
        let raw = cleaned.raw_range(at..at + 3).unwrap();
        assert_eq!(&input[raw], "USB");

        let at = cleaned.as_str().find("not recognized").unwrap();
        let raw = cleaned.raw_range(at..at + "not recognized".len()).unwrap();
        assert_eq!(&input[raw], "not recognized");
    }

    #[test]
    fn raw_range_refuses_to_cross_tags() {
        let input = "usb<br>driver";
        let cleaned = CleanedText::new(input);
        assert_eq!(cleaned.as_str(), "usb driver");
        assert_eq!(cleaned.raw_range(0..10), None);
        assert_eq!(cleaned.raw_range(0..3), Some(0..3));
    }

    #[test]
    fn raw_range_covers_dropped_punctuation() {
        let input = "usb, driver";
        let cleaned = CleanedText::new(input);
        assert_eq!(cleaned.as_str(), "usb driver");
        assert_eq!(cleaned.raw_range(0..10), Some(0..11));
    }

    #[test]
    fn raw_range_of_cjk() {
        let input = "电脑：设备";
        let cleaned = CleanedText::new(input);
        assert_eq!(cleaned.as_str(), "电脑设备");
        let at = cleaned.as_str().find("设备").unwrap();
        assert_eq!(&input[cleaned.raw_range(at..at + "设备".len()).unwrap()], "设备");
    }

    #[test]
    fn format_from_extension() {
        assert_eq!(ContentFormat::from_extension(Some("md")), ContentFormat::Markdown);
        assert_eq!(ContentFormat::from_extension(Some("MD")), ContentFormat::Markdown);
        assert_eq!(ContentFormat::from_extension(Some("html")), ContentFormat::Plain);
        assert_eq!(ContentFormat::from_extension(None), ContentFormat::Plain);
    }

    #[test]
    fn cjk_punctuation() {
        assert!(is_cjk_punctuation('。'));
        assert!(is_cjk_punctuation('：'));
        assert!(!is_cjk_punctuation('.'));
        assert!(!is_cjk_punctuation('设'));
    }

    #[test]
    fn contains_cjk_detects_ideographs() {
        assert!(contains_cjk("USB设备"));
        assert!(!contains_cjk("USB device"));
    }

    #[test]
    fn excerpt_truncates() {
        assert_eq!(excerpt_at("hello world\nnext", 0, 5), "hello…");
        assert_eq!(excerpt_at("hello\nworld", 6, 20), "world");
    }
}
