//! Insertion templates and replacement synonyms.
//!
//! Each known keyword has hand-written phrasings that read as ordinary
//! copy. Unknown keywords go through [`default_templates`] and
//! [`default_replacement`], which are generic but still grammatical.

use crate::keyword::Keyword;
use crate::text::contains_cjk;

/// Placeholder substituted with the keyword phrase.
pub const KEYWORD_SLOT: &str = "{keyword}";

/// A sentence to splice in, plus why it was written that way.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct InsertionTemplate {
    /// Text with a [`KEYWORD_SLOT`].
    pub template: &'static str,
    /// Why this phrasing fits.
    pub reason: &'static str,
}

impl InsertionTemplate {
    const fn new(template: &'static str, reason: &'static str) -> Self {
        Self { template, reason }
    }

    /// Fill the slot with `keyword`.
    pub fn render(&self, keyword: &Keyword) -> String {
        self.template.replace(KEYWORD_SLOT, keyword.as_str())
    }
}

/// Known keyword → insertion templates.
const INSERTIONS: &[(&str, &[InsertionTemplate])] = &[
    (
        "usb not recognized",
        &[
            InsertionTemplate::new(
                "If you see a usb not recognized message, start with the steps below.",
                "frames the keyword as the error message users actually see",
            ),
            InsertionTemplate::new(
                "A usb not recognized error usually points to a driver or power issue.",
                "names likely causes so the sentence carries information",
            ),
            InsertionTemplate::new(
                "Most usb not recognized problems can be fixed without new hardware.",
                "reassures the reader while repeating the search phrase",
            ),
        ],
    ),
    (
        "usb device not recognized",
        &[
            InsertionTemplate::new(
                "When Windows reports usb device not recognized, check the cable first.",
                "matches the exact Windows notification wording",
            ),
            InsertionTemplate::new(
                "The usb device not recognized warning often appears after a driver update.",
                "ties the keyword to a common trigger",
            ),
            InsertionTemplate::new(
                "Fixing usb device not recognized takes only a few minutes in most cases.",
                "sets expectations in a call-to-action tone",
            ),
        ],
    ),
    (
        "usb driver",
        &[
            InsertionTemplate::new(
                "Reinstalling the usb driver clears most detection failures.",
                "pairs the keyword with a concrete action",
            ),
            InsertionTemplate::new(
                "An outdated usb driver is a frequent cause of connection drops.",
                "explains cause and effect around the keyword",
            ),
        ],
    ),
    (
        "usb port not working",
        &[
            InsertionTemplate::new(
                "A usb port not working on one side of the laptop may still work on the other.",
                "describes a real diagnostic observation",
            ),
            InsertionTemplate::new(
                "Before replacing hardware for a usb port not working, test another device.",
                "offers a cheap first step",
            ),
        ],
    ),
    (
        "usb troubleshooting",
        &[
            InsertionTemplate::new(
                "This usb troubleshooting guide walks through each check in order.",
                "introduces the page as a guide",
            ),
            InsertionTemplate::new(
                "Good usb troubleshooting starts with ruling out the cable.",
                "opens with practical advice",
            ),
        ],
    ),
    (
        "usb设备无法识别",
        &[
            InsertionTemplate::new(
                "遇到usb设备无法识别时，可以先检查数据线和接口。",
                "以用户实际遇到的提示开头",
            ),
            InsertionTemplate::new(
                "大多数usb设备无法识别的问题都与驱动程序有关。",
                "说明常见原因",
            ),
        ],
    ),
];

/// Generic Latin-script insertion phrasings.
const DEFAULT_INSERTIONS: &[InsertionTemplate] = &[
    InsertionTemplate::new(
        "Regarding a solution for {keyword}:",
        "generic lead-in for an untracked keyword",
    ),
    InsertionTemplate::new(
        "Here is what you need to know about {keyword}.",
        "generic explanatory sentence",
    ),
    InsertionTemplate::new(
        "Many readers ask about {keyword}, so this section covers it.",
        "generic question-driven sentence",
    ),
];

/// Generic CJK insertion phrasings.
const DEFAULT_CJK_INSERTIONS: &[InsertionTemplate] = &[
    InsertionTemplate::new("关于{keyword}的解决方法：", "通用的引导语"),
    InsertionTemplate::new("下面介绍{keyword}需要了解的内容。", "通用的说明句"),
    InsertionTemplate::new("很多用户关心{keyword}，本节对此进行说明。", "通用的问题引导句"),
];

/// Known keyword → synonyms used when shedding occurrences.
const REPLACEMENTS: &[(&str, &[&str])] = &[
    (
        "usb not recognized",
        &["this detection error", "the connection problem", "the issue"],
    ),
    (
        "usb device not recognized",
        &["the unrecognized device", "this detection error", "the device"],
    ),
    ("usb driver", &["the driver", "the device driver"]),
    ("usb port not working", &["the faulty port", "the port"]),
    ("usb troubleshooting", &["the diagnosis", "these checks"]),
    ("usb", &["the device", "the connector"]),
    ("usb设备无法识别", &["设备识别问题", "该问题"]),
];

/// Templates for `keyword`, falling back to [`default_templates`].
pub fn insertion_templates(keyword: &Keyword) -> &'static [InsertionTemplate] {
    INSERTIONS
        .iter()
        .find(|(k, _)| *k == keyword.as_str())
        .map_or_else(|| default_templates(keyword), |(_, templates)| *templates)
}

/// Generic templates, chosen by the keyword's script.
pub fn default_templates(keyword: &Keyword) -> &'static [InsertionTemplate] {
    if contains_cjk(keyword.as_str()) {
        DEFAULT_CJK_INSERTIONS
    } else {
        DEFAULT_INSERTIONS
    }
}

/// Synonyms for `keyword`; never empty and never containing the keyword.
pub fn replacements(keyword: &Keyword) -> Vec<&'static str> {
    let known: Vec<&'static str> = REPLACEMENTS
        .iter()
        .find(|(k, _)| *k == keyword.as_str())
        .map(|(_, synonyms)| {
            synonyms
                .iter()
                .copied()
                .filter(|s| !contains_keyword(s, keyword))
                .collect()
        })
        .unwrap_or_default();

    if known.is_empty() {
        vec![default_replacement(keyword)]
    } else {
        known
    }
}

/// Fallback synonym for an unknown keyword.
pub fn default_replacement(keyword: &Keyword) -> &'static str {
    let (primary, last_resort) = if contains_cjk(keyword.as_str()) {
        ("该设备", "它")
    } else {
        ("this device", "it")
    };
    if contains_keyword(primary, keyword) {
        last_resort
    } else {
        primary
    }
}

fn contains_keyword(text: &str, keyword: &Keyword) -> bool {
    keyword.matcher().count(text) > 0
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn every_template_contains_its_keyword() {
        for (keyword, templates) in INSERTIONS {
            let kw = Keyword::new(keyword);
            assert_eq!(Keyword::new(keyword).as_str(), *keyword, "table keys are normalized");
            for t in *templates {
                let rendered = t.render(&kw);
                assert!(
                    kw.matcher().count(&rendered) >= 1,
                    "template for {keyword} lacks the keyword: {rendered}"
                );
            }
        }
    }

    #[test]
    fn default_templates_render_keyword() {
        let kw = Keyword::new("thunderbolt dock");
        let templates = insertion_templates(&kw);
        assert_eq!(templates, DEFAULT_INSERTIONS);
        for t in templates {
            assert!(t.render(&kw).contains("thunderbolt dock"));
        }
    }

    #[test]
    fn cjk_keywords_get_cjk_defaults() {
        let kw = Keyword::new("蓝牙连接");
        assert_eq!(insertion_templates(&kw), DEFAULT_CJK_INSERTIONS);
        assert!(insertion_templates(&kw)[0].render(&kw).contains("蓝牙连接"));
    }

    #[test]
    fn replacements_never_contain_keyword() {
        for (keyword, _) in REPLACEMENTS {
            let kw = Keyword::new(keyword);
            for synonym in replacements(&kw) {
                assert_eq!(kw.matcher().count(synonym), 0, "{synonym} repeats {keyword}");
            }
        }
    }

    #[test]
    fn fallback_replacement_avoids_keyword() {
        assert_eq!(default_replacement(&Keyword::new("webcam")), "this device");
        assert_eq!(default_replacement(&Keyword::new("device")), "it");
        assert_eq!(replacements(&Keyword::new("device")), vec!["it"]);
        assert_eq!(default_replacement(&Keyword::new("蓝牙")), "该设备");
    }
}
