//! Document transformation: extract, resolve, parse, derive.
//!
//! A [`Transformer`] is the explicit, reusable context for converting HTML.
//! It holds configuration and a media resolver but no per-document state,
//! so one instance can serve any number of documents, from any number of
//! threads when its resolver is `Sync`.
//!
//! # Example
//!
//! ```no_run
//! use blockport::transform::transform;
//!
//! let result = transform(r#"<p>Hi</p><img src="https://s.example/a.jpg">"#, "input/uploads");
//! assert_eq!(result.content.len(), 2);
//! assert_eq!(result.media.len(), 1);
//! ```

mod document;

pub use document::{ContentKind, Document, PageContent, PostContent, SourceRecord, Slug};

use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::config::Config;
use crate::export::{DEFAULT_EXCERPT_LENGTH, derive_excerpt, extract_plain_text};
use crate::import::{ParseOptions, fallback_block, parse_blocks_with};
use crate::media::{FsResolver, MediaIndex, MediaResolver, extract_media};
use crate::model::{Block, BlockStyle, MediaMap, MediaReference, TextBlock};

/// Text of the fallback block for a post with no source content.
pub const CONVERSION_FAILED_TEXT: &str = "Content conversion failed";

/// Blocks and resolved media for one HTML body.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Transformed {
    pub content: Vec<Block>,
    pub media: Vec<MediaReference>,
}

/// Conversion context.
#[derive(Debug, Clone)]
pub struct Transformer<R = FsResolver> {
    resolver: R,
    parse: ParseOptions,
    excerpt_length: usize,
    treat_pages_as_posts: bool,
}

impl Transformer<FsResolver> {
    /// A transformer searching `media_root` live for each reference.
    pub fn new(media_root: impl AsRef<Path>) -> Self {
        Self::with_resolver(FsResolver::new(media_root))
    }
}

impl Transformer<MediaIndex> {
    /// A transformer configured from `config`, backed by a prebuilt index of
    /// the configured media root.
    pub fn from_config(config: &Config) -> Self {
        let index = MediaIndex::build(&config.media_root, config.resolve_strategy);
        Self::with_resolver(index)
            .parse_options(config.parse_options())
            .excerpt_length(config.excerpt_length)
            .treat_pages_as_posts(config.treat_pages_as_posts)
    }
}

impl<R: MediaResolver> Transformer<R> {
    pub fn with_resolver(resolver: R) -> Self {
        Self {
            resolver,
            parse: ParseOptions::default(),
            excerpt_length: DEFAULT_EXCERPT_LENGTH,
            treat_pages_as_posts: false,
        }
    }

    pub fn parse_options(mut self, options: ParseOptions) -> Self {
        self.parse = options;
        self
    }

    pub fn excerpt_length(mut self, length: usize) -> Self {
        self.excerpt_length = length;
        self
    }

    pub fn treat_pages_as_posts(mut self, enabled: bool) -> Self {
        self.treat_pages_as_posts = enabled;
        self
    }

    pub fn resolver(&self) -> &R {
        &self.resolver
    }

    /// Extract and resolve the media of an HTML body.
    pub fn media(&self, html: &str) -> Vec<MediaReference> {
        self.resolver.resolve_all(&extract_media(html))
    }

    /// Convert an HTML body into blocks plus resolved media.
    pub fn transform(&self, html: &str) -> Transformed {
        let media = self.media(html);
        let map: MediaMap = media.iter().collect();
        let content = parse_blocks_with(html, &map, &self.parse);
        Transformed { content, media }
    }

    /// Convert a source record into a post or page.
    pub fn convert(&self, record: &SourceRecord) -> Document {
        if record.kind == ContentKind::Post || self.treat_pages_as_posts {
            Document::Post(self.to_post(record))
        } else {
            Document::Page(self.to_page(record))
        }
    }

    pub fn to_post(&self, record: &SourceRecord) -> PostContent {
        let Transformed { content, media } = self.transform(&record.content);
        self.build_post(record, content, media)
    }

    pub fn to_page(&self, record: &SourceRecord) -> PageContent {
        PageContent {
            name: record.title.clone(),
            slug: Slug::new(&record.slug, "name"),
            heading: record.title.clone(),
            subheading: Some(record.excerpt.clone()).filter(|s| !s.is_empty()),
            media: self.media(&record.content),
        }
    }

    /// The stand-in post for a record whose conversion failed: one block of
    /// its stripped text, or a fixed notice when it has none, and no media.
    pub fn fallback_post(&self, record: &SourceRecord) -> PostContent {
        let block = if record.content.trim().is_empty() {
            Block::Text(TextBlock::plain(BlockStyle::Normal, CONVERSION_FAILED_TEXT))
        } else {
            fallback_block(&record.content, self.parse.fallback_text_limit)
        };
        self.build_post(record, vec![block], Vec::new())
    }

    fn build_post(
        &self,
        record: &SourceRecord,
        content: Vec<Block>,
        media: Vec<MediaReference>,
    ) -> PostContent {
        let body = extract_plain_text(&content);
        let excerpt = derive_excerpt(Some(record.excerpt.as_str()), &content, self.excerpt_length);
        PostContent {
            title: record.title.clone(),
            slug: Slug::new(&record.slug, "title"),
            content,
            excerpt,
            date: record.date.clone(),
            media,
            body,
        }
    }
}

/// Convert an HTML body against a media root with default settings.
pub fn transform(html: &str, media_root: impl AsRef<Path>) -> Transformed {
    Transformer::new(media_root).transform(html)
}
