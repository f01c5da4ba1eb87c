//! Source records and the documents they convert into.

use serde::{Deserialize, Serialize};

use crate::export::{extract_plain_text, word_count};
use crate::media::{MediaSummary, missing_media_urls};
use crate::model::{Block, MediaReference};

/// WordPress content type of a source record.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ContentKind {
    #[default]
    Post,
    Page,
}

impl ContentKind {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Post => "post",
            Self::Page => "page",
        }
    }
}

/// One row of WordPress content, with the `wp_posts` column names.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SourceRecord {
    #[serde(rename = "ID")]
    pub id: u64,
    #[serde(rename = "post_title")]
    pub title: String,
    #[serde(rename = "post_name")]
    pub slug: String,
    #[serde(rename = "post_content")]
    pub content: String,
    #[serde(rename = "post_excerpt")]
    pub excerpt: String,
    #[serde(rename = "post_date")]
    pub date: String,
    #[serde(rename = "post_modified")]
    pub modified: String,
    #[serde(rename = "post_status")]
    pub status: String,
    #[serde(rename = "post_type")]
    pub kind: ContentKind,
    #[serde(rename = "post_parent")]
    pub parent: u64,
    pub menu_order: i64,
    pub guid: String,
}

impl SourceRecord {
    /// Label used in reports, e.g. `post: Hello world`.
    pub fn label(&self) -> String {
        format!("{}: {}", self.kind.as_str(), self.title)
    }
}

/// A document slug and the field it was derived from.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "_type", rename = "slug")]
pub struct Slug {
    pub current: String,
    pub source: String,
}

impl Slug {
    pub fn new(current: impl Into<String>, source: impl Into<String>) -> Self {
        Self {
            current: current.into(),
            source: source.into(),
        }
    }
}

/// A converted post.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PostContent {
    pub title: String,
    pub slug: Slug,
    pub content: Vec<Block>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub excerpt: Option<String>,
    pub date: String,
    pub media: Vec<MediaReference>,
    /// Plain text of `content`, for search and previews.
    pub body: String,
}

/// A page: its media is resolved, its body is left to a later step.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PageContent {
    pub name: String,
    pub slug: Slug,
    pub heading: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub subheading: Option<String>,
    pub media: Vec<MediaReference>,
}

/// Result of converting one source record.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "_type")]
pub enum Document {
    #[serde(rename = "post")]
    Post(PostContent),
    #[serde(rename = "page")]
    Page(PageContent),
}

impl Document {
    pub fn kind(&self) -> ContentKind {
        match self {
            Document::Post(_) => ContentKind::Post,
            Document::Page(_) => ContentKind::Page,
        }
    }

    pub fn title(&self) -> &str {
        match self {
            Document::Post(post) => &post.title,
            Document::Page(page) => &page.name,
        }
    }

    pub fn media(&self) -> &[MediaReference] {
        match self {
            Document::Post(post) => &post.media,
            Document::Page(page) => &page.media,
        }
    }

    pub fn media_summary(&self) -> MediaSummary {
        MediaSummary::from_refs(self.media())
    }

    pub fn missing_media_urls(&self) -> Vec<&str> {
        missing_media_urls(self.media())
    }

    pub fn has_media(&self) -> bool {
        !self.media().is_empty()
    }

    /// Words in a post body; pages carry no body and count zero.
    pub fn word_count(&self) -> usize {
        match self {
            Document::Post(post) if !post.body.is_empty() => word_count(&post.body),
            Document::Post(post) => word_count(&extract_plain_text(&post.content)),
            Document::Page(_) => 0,
        }
    }
}
