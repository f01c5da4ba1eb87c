//! Tag analysis across a document set.
//!
//! Finds which tags a corpus uses and which of them may carry media the
//! extractor does not pick up, so gaps show up before a migration rather
//! than as missing files after it.

use std::collections::{BTreeMap, BTreeSet, HashSet};
use std::fmt;

use serde::Serialize;

use crate::dom::parse_html;

/// Tags the extractor handles.
pub const COVERED_TAGS: &[&str] = &["img", "audio", "video", "source"];

/// Tags that never need media handling.
pub const NON_MEDIA_TAGS: &[&str] = &[
    "p", "div", "span", "h1", "h2", "h3", "h4", "h5", "h6", "a", "strong", "b", "em", "i", "u",
    "strike", "del", "blockquote", "ul", "ol", "li", "table", "tr", "td", "th", "thead", "tbody",
    "tfoot", "br", "hr", "pre", "code", "form", "input", "textarea", "button", "select", "option",
    "label", "fieldset", "legend", "nav", "header", "footer", "section", "article", "aside",
    "main", "figure", "figcaption", "time", "mark", "small", "sub", "sup", "abbr", "cite", "q",
    "dfn", "kbd", "samp", "var", "details", "summary",
];

/// Tags that may reference media even without a `src`.
pub const POTENTIAL_MEDIA_TAGS: &[&str] = &[
    "embed", "object", "iframe", "track", "area", "map", "picture", "canvas", "svg", "use",
    "image", "foreignobject",
];

/// Result of analyzing a set of documents.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TagAnalysis {
    pub all_tags: BTreeSet<String>,
    pub media_tags: BTreeSet<String>,
    pub uncovered_media_tags: BTreeSet<String>,
    /// Number of documents each tag appears in.
    pub tag_frequency: BTreeMap<String, usize>,
    /// Unique `src` values per tag, in first-seen order.
    pub media_with_src: BTreeMap<String, Vec<String>>,
}

/// Accumulates tag usage one document at a time.
#[derive(Debug, Default)]
pub struct TagAnalyzer {
    tag_frequency: BTreeMap<String, usize>,
    media_with_src: BTreeMap<String, Vec<String>>,
    seen_src: HashSet<(String, String)>,
}

impl TagAnalyzer {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add_document(&mut self, html: &str) {
        for tag in tag_names(html) {
            *self.tag_frequency.entry(tag).or_default() += 1;
        }

        let dom = parse_html(html);
        for id in dom.traverse() {
            let (Some(tag), Some(src)) = (dom.tag_name(id), dom.attr_value(id, "src")) else {
                continue;
            };
            if self.seen_src.insert((tag.to_string(), src.to_string())) {
                self.media_with_src
                    .entry(tag.to_string())
                    .or_default()
                    .push(src.to_string());
            }
        }
    }

    pub fn finish(self) -> TagAnalysis {
        let all_tags: BTreeSet<String> = self.tag_frequency.keys().cloned().collect();
        let media_tags: BTreeSet<String> = all_tags
            .iter()
            .filter(|t| {
                POTENTIAL_MEDIA_TAGS.contains(&t.as_str()) || self.media_with_src.contains_key(*t)
            })
            .cloned()
            .collect();
        let uncovered_media_tags = media_tags
            .iter()
            .filter(|t| !COVERED_TAGS.contains(&t.as_str()) && !NON_MEDIA_TAGS.contains(&t.as_str()))
            .cloned()
            .collect();

        TagAnalysis {
            all_tags,
            media_tags,
            uncovered_media_tags,
            tag_frequency: self.tag_frequency,
            media_with_src: self.media_with_src,
        }
    }
}

/// Analyze a set of HTML documents.
pub fn analyze_tags<'a>(documents: impl IntoIterator<Item = &'a str>) -> TagAnalysis {
    let mut analyzer = TagAnalyzer::new();
    for html in documents {
        analyzer.add_document(html);
    }
    analyzer.finish()
}

/// Distinct lowercase tag names written in the markup, open or close.
fn tag_names(html: &str) -> BTreeSet<String> {
    let mut names = BTreeSet::new();
    let mut rest = html;
    while let Some(lt) = rest.find('<') {
        rest = &rest[lt + 1..];
        let body = rest.strip_prefix('/').unwrap_or(rest);
        if !body.starts_with(|c: char| c.is_ascii_alphabetic()) {
            continue;
        }
        let len = body
            .find(|c: char| !c.is_ascii_alphanumeric())
            .unwrap_or(body.len());
        if body[len..].contains('>') {
            names.insert(body[..len].to_ascii_lowercase());
        }
    }
    names
}

impl TagAnalysis {
    fn frequency(&self, tag: &str) -> usize {
        self.tag_frequency.get(tag).copied().unwrap_or(0)
    }
}

impl fmt::Display for TagAnalysis {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "HTML TAG ANALYSIS REPORT")?;
        writeln!(f, "========================")?;
        writeln!(f)?;
        writeln!(f, "Total unique tags found: {}", self.all_tags.len())?;
        writeln!(f)?;

        writeln!(f, "COVERED TAGS (already handled):")?;
        for tag in COVERED_TAGS.iter().filter(|t| self.all_tags.contains(**t)) {
            writeln!(f, "- {tag} ({} occurrences)", self.frequency(tag))?;
        }
        writeln!(f)?;

        writeln!(f, "NON-MEDIA TAGS (no action needed):")?;
        for tag in self
            .all_tags
            .iter()
            .filter(|t| NON_MEDIA_TAGS.contains(&t.as_str()))
        {
            writeln!(f, "- {tag} ({} occurrences)", self.frequency(tag))?;
        }
        writeln!(f)?;

        writeln!(f, "MEDIA TAGS WITH SRC ATTRIBUTES:")?;
        for (tag, srcs) in &self.media_with_src {
            writeln!(f, "- {tag}: {} unique URLs", srcs.len())?;
            if srcs.len() <= 3 {
                for src in srcs {
                    writeln!(f, "  → {src}")?;
                }
            } else {
                for src in &srcs[..2] {
                    writeln!(f, "  → {src}")?;
                }
                writeln!(f, "  → ... and {} more", srcs.len() - 2)?;
            }
        }
        writeln!(f)?;

        if self.uncovered_media_tags.is_empty() {
            writeln!(f, "All media-related tags are covered!")
        } else {
            writeln!(f, "UNCOVERED MEDIA TAGS (need attention):")?;
            for tag in &self.uncovered_media_tags {
                writeln!(f, "- {tag} ({} occurrences)", self.frequency(tag))?;
            }
            Ok(())
        }
    }
}
