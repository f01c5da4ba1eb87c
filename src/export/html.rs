//! Preview HTML renderer.
//!
//! Renders blocks back to HTML for human verification: one line per block,
//! blank paragraphs included. Local media is routed through a media-serving
//! endpoint so a browser can load files that only exist on disk.

use std::borrow::Cow;
use std::fmt::Write;
use std::path::Path;

use html_escape::{encode_double_quoted_attribute, encode_text};
use percent_encoding::{AsciiSet, NON_ALPHANUMERIC, utf8_percent_encode};
use url::Url;

use crate::model::{
    AudioBlock, Block, Decorator, ImageBlock, ListItem, Span, TextBlock, VideoBlock, VideoType,
};

/// Default media-serving endpoint for local files.
pub const DEFAULT_MEDIA_ROUTE: &str = "/api/serve-media";

/// Characters `encodeURIComponent` leaves alone, inverted.
const COMPONENT: &AsciiSet = &NON_ALPHANUMERIC
    .remove(b'-')
    .remove(b'_')
    .remove(b'.')
    .remove(b'!')
    .remove(b'~')
    .remove(b'*')
    .remove(b'\'')
    .remove(b'(')
    .remove(b')');

/// Inline decorators, innermost first. Links always wrap outermost.
const WRAP_ORDER: &[(Decorator, &str)] = &[
    (Decorator::Code, "code"),
    (Decorator::StrikeThrough, "s"),
    (Decorator::Underline, "u"),
    (Decorator::Em, "em"),
    (Decorator::Strong, "strong"),
];

/// Configuration for HTML rendering.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RenderOptions {
    /// Endpoint that serves a local file given `?path=`.
    pub media_route: String,
}

impl Default for RenderOptions {
    fn default() -> Self {
        Self {
            media_route: DEFAULT_MEDIA_ROUTE.to_string(),
        }
    }
}

/// Renders blocks to preview HTML.
#[derive(Debug, Clone, Default)]
pub struct HtmlRenderer {
    config: RenderOptions,
}

impl HtmlRenderer {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_config(config: RenderOptions) -> Self {
        Self { config }
    }

    /// One line per block, joined with `\n`.
    pub fn render(&self, blocks: &[Block]) -> String {
        let mut out = String::new();
        for (i, block) in blocks.iter().enumerate() {
            if i > 0 {
                out.push('\n');
            }
            self.render_block(block, &mut out);
        }
        out
    }

    fn render_block(&self, block: &Block, out: &mut String) {
        match block {
            Block::Text(text) => render_text(text, out),
            Block::Image(image) => self.render_image(image, out),
            Block::Audio(audio) => self.render_audio(audio, out),
            Block::Video(video) => self.render_video(video, out),
        }
    }

    /// `src` for a media block: the serving route for local files, else the
    /// remote URL.
    fn media_src<'a>(&self, local_path: Option<&Path>, url: &'a str) -> Cow<'a, str> {
        match local_path {
            Some(path) => {
                let path = path.to_string_lossy();
                Cow::Owned(format!(
                    "{}?path={}",
                    self.config.media_route,
                    utf8_percent_encode(&path, COMPONENT)
                ))
            }
            None => Cow::Borrowed(url),
        }
    }

    fn render_image(&self, image: &ImageBlock, out: &mut String) {
        let src = self.media_src(image.local_path.as_deref(), &image.url);
        let _ = write!(
            out,
            r#"<figure><img src="{}" alt="{}" style="max-width: 100%; height: auto;" /></figure>"#,
            encode_double_quoted_attribute(&src),
            encode_double_quoted_attribute(&image.alt),
        );
    }

    fn render_audio(&self, audio: &AudioBlock, out: &mut String) {
        let src = self.media_src(audio.local_path.as_deref(), &audio.url);
        out.push_str("<figure><audio");
        if audio.show_controls {
            out.push_str(" controls");
        }
        if audio.autoplay {
            out.push_str(" autoplay");
        }
        let _ = write!(
            out,
            r#"><source src="{}" /></audio>"#,
            encode_double_quoted_attribute(&src)
        );
        render_caption(audio.title.as_deref(), out);
        out.push_str("</figure>");
    }

    fn render_video(&self, video: &VideoBlock, out: &mut String) {
        out.push_str("<figure>");
        match video.video_type {
            VideoType::Youtube | VideoType::Vimeo if video.local_path.is_none() => {
                let src = embed_url(video.video_type, &video.url);
                let _ = write!(
                    out,
                    r#"<iframe src="{}" width="560" height="315" frameborder="0" allowfullscreen></iframe>"#,
                    encode_double_quoted_attribute(&src)
                );
            }
            _ => {
                let src = self.media_src(video.local_path.as_deref(), &video.url);
                let _ = write!(
                    out,
                    r#"<video controls src="{}"></video>"#,
                    encode_double_quoted_attribute(&src)
                );
            }
        }
        render_caption(video.title.as_deref(), out);
        out.push_str("</figure>");
    }
}

fn render_caption(title: Option<&str>, out: &mut String) {
    if let Some(title) = title.filter(|t| !t.is_empty()) {
        let _ = write!(out, "<figcaption>{}</figcaption>", encode_text(title));
    }
}

fn render_text(block: &TextBlock, out: &mut String) {
    let (open, close) = match block.list_item {
        Some(ListItem::Bullet) => ("<ul><li>", "</li></ul>"),
        Some(ListItem::Number) => ("<ol><li>", "</li></ol>"),
        None => ("", ""),
    };
    let tag = block.style.tag();
    if block.list_item.is_some() {
        out.push_str(open);
    } else {
        let _ = write!(out, "<{tag}>");
    }
    for span in &block.children {
        render_span(block, span, out);
    }
    if block.list_item.is_some() {
        out.push_str(close);
    } else {
        let _ = write!(out, "</{tag}>");
    }
}

fn render_span(block: &TextBlock, span: &Span, out: &mut String) {
    let mut html = encode_text(&span.text).replace('\n', "<br />");

    for &(decorator, tag) in WRAP_ORDER {
        if span.has_decorator(decorator) {
            html = format!("<{tag}>{html}</{tag}>");
        }
    }

    if let Some(def) = span.link_key().and_then(|key| block.mark_def(key)) {
        let href = if def.href.is_empty() { "#" } else { &def.href };
        let target = if def.open_in_new_tab {
            r#" target="_blank" rel="noopener noreferrer""#
        } else {
            ""
        };
        html = format!(
            r#"<a href="{}"{target}>{html}</a>"#,
            encode_double_quoted_attribute(href)
        );
    }

    out.push_str(&html);
}

/// Embeddable player URL for a YouTube or Vimeo page URL.
///
/// URLs that are already embeds, or that do not carry a recognizable id,
/// are returned unchanged.
pub fn embed_url(video_type: VideoType, url: &str) -> String {
    let Ok(parsed) = Url::parse(url) else {
        return url.to_string();
    };
    let host = parsed.host_str().unwrap_or_default();
    let mut segments = parsed
        .path_segments()
        .map(|s| s.filter(|s| !s.is_empty()).collect::<Vec<_>>())
        .unwrap_or_default()
        .into_iter();

    let embed = match video_type {
        VideoType::Youtube if host.ends_with("youtu.be") => segments
            .next()
            .map(|id| format!("https://www.youtube.com/embed/{id}")),
        VideoType::Youtube => match segments.next() {
            Some("watch") => parsed
                .query_pairs()
                .find(|(k, _)| k == "v")
                .map(|(_, id)| format!("https://www.youtube.com/embed/{id}")),
            Some("shorts" | "live") => segments
                .next()
                .map(|id| format!("https://www.youtube.com/embed/{id}")),
            _ => None,
        },
        VideoType::Vimeo if host.starts_with("player.") => None,
        VideoType::Vimeo => segments
            .rev()
            .find(|s| s.chars().all(|c| c.is_ascii_digit()))
            .map(|id| format!("https://player.vimeo.com/video/{id}")),
        VideoType::Url => None,
    };
    embed.unwrap_or_else(|| url.to_string())
}

/// Render blocks with the default options.
pub fn render_html(blocks: &[Block]) -> String {
    HtmlRenderer::new().render(blocks)
}

/// Render blocks with explicit options.
pub fn render_html_with(blocks: &[Block], options: &RenderOptions) -> String {
    HtmlRenderer::with_config(options.clone()).render(blocks)
}
