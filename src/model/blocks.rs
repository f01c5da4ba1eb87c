//! Portable block content types.
//!
//! These serialize to the JSON shape Sanity's portable text expects:
//! every block carries `_type` and `_key`, text blocks carry `style`,
//! `children` and `markDefs`, and spans reference link definitions through
//! their `marks` array.

use std::fmt;
use std::path::PathBuf;

use serde::{Deserialize, Serialize};

use super::key::new_key;

/// One logical unit of content, in document order.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "_type")]
#[non_exhaustive]
pub enum Block {
    #[serde(rename = "block")]
    Text(TextBlock),
    #[serde(rename = "image")]
    Image(ImageBlock),
    #[serde(rename = "audio")]
    Audio(AudioBlock),
    #[serde(rename = "video")]
    Video(VideoBlock),
}

impl Block {
    /// The block's `_key`.
    pub fn key(&self) -> &str {
        match self {
            Block::Text(b) => &b.key,
            Block::Image(b) => &b.key,
            Block::Audio(b) => &b.key,
            Block::Video(b) => &b.key,
        }
    }

    /// The `_type` discriminant as it appears in JSON.
    pub fn type_name(&self) -> &'static str {
        match self {
            Block::Text(_) => "block",
            Block::Image(_) => "image",
            Block::Audio(_) => "audio",
            Block::Video(_) => "video",
        }
    }

    pub fn as_text(&self) -> Option<&TextBlock> {
        match self {
            Block::Text(b) => Some(b),
            _ => None,
        }
    }
}

/// Paragraph-level style of a text block.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BlockStyle {
    #[default]
    Normal,
    H1,
    H2,
    H3,
    H4,
    H5,
    H6,
    Blockquote,
}

impl BlockStyle {
    /// Heading style for a level in `1..=6`.
    pub fn heading(level: u8) -> Option<Self> {
        match level {
            1 => Some(Self::H1),
            2 => Some(Self::H2),
            3 => Some(Self::H3),
            4 => Some(Self::H4),
            5 => Some(Self::H5),
            6 => Some(Self::H6),
            _ => None,
        }
    }

    /// HTML tag used when rendering this style.
    pub fn tag(self) -> &'static str {
        match self {
            Self::Normal => "p",
            Self::H1 => "h1",
            Self::H2 => "h2",
            Self::H3 => "h3",
            Self::H4 => "h4",
            Self::H5 => "h5",
            Self::H6 => "h6",
            Self::Blockquote => "blockquote",
        }
    }

    /// Whether plain-text extraction separates this block with a blank line.
    pub fn is_paragraph_like(self) -> bool {
        matches!(self, Self::Normal | Self::Blockquote)
    }
}

/// List membership of a text block.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ListItem {
    Bullet,
    Number,
}

/// A block of rich text.
///
/// Always has at least one span; an intentionally blank paragraph is one span
/// with empty text.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TextBlock {
    #[serde(rename = "_key")]
    pub key: String,
    pub style: BlockStyle,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub list_item: Option<ListItem>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub level: Option<u32>,
    pub children: Vec<Span>,
    #[serde(default)]
    pub mark_defs: Vec<LinkMarkDef>,
}

impl TextBlock {
    /// Build a text block, substituting one empty span for an empty child list.
    pub fn new(style: BlockStyle, mut children: Vec<Span>, mark_defs: Vec<LinkMarkDef>) -> Self {
        if children.is_empty() {
            children.push(Span::plain(""));
        }
        Self {
            key: new_key(),
            style,
            list_item: None,
            level: None,
            children,
            mark_defs,
        }
    }

    /// A single unmarked span of text.
    pub fn plain(style: BlockStyle, text: impl Into<String>) -> Self {
        Self::new(style, vec![Span::plain(text)], Vec::new())
    }

    /// The blank-line block: one span with empty text.
    pub fn empty() -> Self {
        Self::plain(BlockStyle::Normal, "")
    }

    pub fn with_list(mut self, list_item: ListItem, level: u32) -> Self {
        self.list_item = Some(list_item);
        self.level = Some(level);
        self
    }

    /// Concatenated text of all spans.
    pub fn text(&self) -> String {
        self.children.iter().map(|s| s.text.as_str()).collect()
    }

    /// Look up a link definition by key.
    pub fn mark_def(&self, key: &str) -> Option<&LinkMarkDef> {
        self.mark_defs.iter().find(|d| d.key == key)
    }
}

/// A run of text with a uniform set of marks.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "_type", rename = "span")]
pub struct Span {
    #[serde(rename = "_key")]
    pub key: String,
    pub text: String,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub marks: Vec<Mark>,
}

impl Span {
    pub fn new(text: impl Into<String>, marks: Vec<Mark>) -> Self {
        Self {
            key: new_key(),
            text: text.into(),
            marks,
        }
    }

    pub fn plain(text: impl Into<String>) -> Self {
        Self::new(text, Vec::new())
    }

    pub fn has_decorator(&self, decorator: Decorator) -> bool {
        self.marks.contains(&Mark::Decorator(decorator))
    }

    /// Key of the link this span belongs to, if any.
    pub fn link_key(&self) -> Option<&str> {
        self.marks.iter().find_map(|m| match m {
            Mark::Link(key) => Some(key.as_str()),
            Mark::Decorator(_) => None,
        })
    }
}

/// Fixed formatting tokens.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Decorator {
    Strong,
    Em,
    Underline,
    StrikeThrough,
    Code,
}

impl Decorator {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Strong => "strong",
            Self::Em => "em",
            Self::Underline => "underline",
            Self::StrikeThrough => "strike-through",
            Self::Code => "code",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "strong" => Some(Self::Strong),
            "em" => Some(Self::Em),
            "underline" => Some(Self::Underline),
            "strike-through" => Some(Self::StrikeThrough),
            "code" => Some(Self::Code),
            _ => None,
        }
    }
}

/// A span mark: either a decorator or the key of a [`LinkMarkDef`].
///
/// Serialized as a bare string, as portable text does.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum Mark {
    Decorator(Decorator),
    Link(String),
}

impl From<String> for Mark {
    fn from(s: String) -> Self {
        match Decorator::parse(&s) {
            Some(d) => Mark::Decorator(d),
            None => Mark::Link(s),
        }
    }
}

impl From<Mark> for String {
    fn from(mark: Mark) -> Self {
        match mark {
            Mark::Decorator(d) => d.as_str().to_string(),
            Mark::Link(key) => key,
        }
    }
}

impl fmt::Display for Mark {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Mark::Decorator(d) => f.write_str(d.as_str()),
            Mark::Link(key) => f.write_str(key),
        }
    }
}

/// Link target referenced by span marks, scoped to one text block.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "_type", rename = "link", rename_all = "camelCase")]
pub struct LinkMarkDef {
    #[serde(rename = "_key")]
    pub key: String,
    pub href: String,
    #[serde(default)]
    pub open_in_new_tab: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ImageBlock {
    #[serde(rename = "_key")]
    pub key: String,
    #[serde(default)]
    pub alt: String,
    pub url: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub local_path: Option<PathBuf>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AudioBlock {
    #[serde(rename = "_key")]
    pub key: String,
    pub url: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub local_path: Option<PathBuf>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(default)]
    pub show_controls: bool,
    #[serde(default)]
    pub autoplay: bool,
}

/// Where a video is hosted.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum VideoType {
    Youtube,
    Vimeo,
    Url,
}

impl VideoType {
    /// Classify a video URL by its host.
    pub fn classify(url: &str) -> Self {
        if url.contains("youtube.com") || url.contains("youtu.be") {
            Self::Youtube
        } else if url.contains("vimeo.com") {
            Self::Vimeo
        } else {
            Self::Url
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VideoBlock {
    #[serde(rename = "_key")]
    pub key: String,
    pub video_type: VideoType,
    pub url: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub local_path: Option<PathBuf>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_text_block_never_childless() {
        let block = TextBlock::new(BlockStyle::Normal, Vec::new(), Vec::new());
        assert_eq!(block.children.len(), 1);
        assert_eq!(block.children[0].text, "");
    }

    #[test]
    fn test_text_block_json_shape() {
        let mut block = TextBlock::new(
            BlockStyle::H2,
            vec![Span::new(
                "Hi",
                vec![Mark::Decorator(Decorator::Strong), Mark::Link("l1".into())],
            )],
            vec![LinkMarkDef {
                key: "l1".into(),
                href: "https://example.com".into(),
                open_in_new_tab: false,
            }],
        );
        block.key = "b1".into();
        let json = serde_json::to_value(Block::Text(block)).unwrap();

        assert_eq!(json["_type"], "block");
        assert_eq!(json["_key"], "b1");
        assert_eq!(json["style"], "h2");
        assert_eq!(json["children"][0]["_type"], "span");
        assert_eq!(json["children"][0]["marks"][0], "strong");
        assert_eq!(json["children"][0]["marks"][1], "l1");
        assert_eq!(json["markDefs"][0]["_type"], "link");
        assert_eq!(json["markDefs"][0]["href"], "https://example.com");
        assert!(json.get("listItem").is_none());
    }

    #[test]
    fn test_unmarked_span_omits_marks() {
        let json = serde_json::to_value(Span::plain("x")).unwrap();
        assert!(json.get("marks").is_none());
    }

    #[test]
    fn test_block_deserializes_by_type() {
        let json = r#"[
            {"_type":"image","_key":"a","alt":"","url":"http://x/a.jpg"},
            {"_type":"video","_key":"b","videoType":"youtube","url":"https://youtu.be/x"},
            {"_type":"block","_key":"c","style":"normal","listItem":"number","level":2,
             "children":[{"_type":"span","_key":"s","text":"t","marks":["em"]}],"markDefs":[]}
        ]"#;
        let blocks: Vec<Block> = serde_json::from_str(json).unwrap();

        assert!(matches!(blocks[0], Block::Image(_)));
        assert!(matches!(&blocks[1], Block::Video(v) if v.video_type == VideoType::Youtube));
        let text = blocks[2].as_text().unwrap();
        assert_eq!(text.list_item, Some(ListItem::Number));
        assert_eq!(text.level, Some(2));
        assert!(text.children[0].has_decorator(Decorator::Em));
    }

    #[test]
    fn test_video_type_classify() {
        assert_eq!(
            VideoType::classify("https://www.youtube.com/watch?v=abc"),
            VideoType::Youtube
        );
        assert_eq!(VideoType::classify("https://youtu.be/abc"), VideoType::Youtube);
        assert_eq!(VideoType::classify("https://vimeo.com/123"), VideoType::Vimeo);
        assert_eq!(VideoType::classify("https://cdn.example/v.mp4"), VideoType::Url);
    }

    #[test]
    fn test_heading_styles() {
        assert_eq!(BlockStyle::heading(1), Some(BlockStyle::H1));
        assert_eq!(BlockStyle::heading(6).map(BlockStyle::tag), Some("h6"));
        assert_eq!(BlockStyle::heading(7), None);
    }
}
