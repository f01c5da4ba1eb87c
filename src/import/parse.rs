//! Block content parser.
//!
//! Parses HTML into the arena DOM, numbers it in preorder, gathers candidate
//! intervals for every construct that maps to a block, schedules them, and
//! emits blocks in document order. Text that no accepted interval claims is
//! grouped by its nearest block-level container and emitted with that
//! container's style.

use crate::dom::{Dom, NodeId, Positions, inner_html, inner_html_filtered, parse_html};
use crate::error::{Error, Result};
use crate::model::{
    AudioBlock, Block, BlockStyle, ImageBlock, ListItem, MediaMap, Span, TextBlock, VideoBlock,
    VideoType, new_key,
};

use super::entities::{plain_text, truncate_chars};
use super::inline::{InlineContent, parse_inline};
use super::schedule::{Accepted, Candidate, CandidateKind, schedule};

/// Default length of the plain-text fallback block before the ellipsis.
pub const DEFAULT_FALLBACK_LIMIT: usize = 500;

/// Documents nested deeper than this are treated as unparseable.
pub const DEFAULT_MAX_DEPTH: usize = 1024;

/// Tunables for [`parse_blocks_with`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ParseOptions {
    pub fallback_text_limit: usize,
    pub max_depth: usize,
}

impl Default for ParseOptions {
    fn default() -> Self {
        Self {
            fallback_text_limit: DEFAULT_FALLBACK_LIMIT,
            max_depth: DEFAULT_MAX_DEPTH,
        }
    }
}

const TEXT_CONTAINERS: &[&str] = &["p", "h1", "h2", "h3", "h4", "h5", "h6", "li", "blockquote"];

const BLOCK_LEVEL: &[&str] = &[
    "address", "article", "aside", "blockquote", "body", "dd", "details", "div", "dl", "dt",
    "fieldset", "figcaption", "figure", "footer", "form", "h1", "h2", "h3", "h4", "h5", "h6",
    "header", "html", "li", "main", "nav", "ol", "p", "pre", "section", "summary", "table",
    "tbody", "td", "tfoot", "th", "thead", "tr", "ul",
];

/// Elements whose text is never content.
const SKIPPED: &[&str] = &["script", "style", "title", "template", "head"];

fn is_block_level(dom: &Dom, id: NodeId) -> bool {
    dom.tag_name(id).is_some_and(|t| BLOCK_LEVEL.contains(&t))
}

fn is_list(dom: &Dom, id: NodeId) -> bool {
    matches!(dom.tag_name(id), Some("ul" | "ol"))
}

/// Parse HTML into blocks, falling back to one plain-text block on failure.
pub fn parse_blocks(html: &str, media: &MediaMap) -> Vec<Block> {
    parse_blocks_with(html, media, &ParseOptions::default())
}

/// [`parse_blocks`] with explicit options.
pub fn parse_blocks_with(html: &str, media: &MediaMap, options: &ParseOptions) -> Vec<Block> {
    match try_parse_blocks(html, media, options) {
        Ok(blocks) => blocks,
        Err(err) => {
            log::warn!("block parsing failed, using plain-text fallback: {err}");
            vec![fallback_block(html, options.fallback_text_limit)]
        }
    }
}

/// The plain-text stand-in for a document that could not be parsed.
///
/// Holds the stripped, decoded text cut to `limit` characters, with `...`
/// appended only when something was cut.
pub fn fallback_block(html: &str, limit: usize) -> Block {
    let text = plain_text(html);
    let text = match truncate_chars(&text, limit) {
        (head, true) => format!("{head}..."),
        (head, false) => head.to_string(),
    };
    Block::Text(TextBlock::plain(BlockStyle::Normal, text))
}

/// Parse HTML into blocks, reporting failures instead of degrading.
pub fn try_parse_blocks(html: &str, media: &MediaMap, options: &ParseOptions) -> Result<Vec<Block>> {
    let dom = parse_html(html);
    let depth = dom.max_depth();
    if depth > options.max_depth {
        return Err(Error::NestingTooDeep(depth));
    }

    let positions = Positions::new(&dom);
    let builder = BlockBuilder {
        dom: &dom,
        positions: &positions,
        media,
    };

    let candidates = builder.candidates();
    let (accepted, coverage) = schedule(candidates);

    let mut placed: Vec<(u32, Vec<Block>)> = accepted
        .iter()
        .map(|c| (c.start, builder.build(c.kind)))
        .collect();
    placed.extend(
        builder
            .uncovered_text(&coverage)
            .into_iter()
            .map(|(pos, block)| (pos, vec![block])),
    );
    placed.sort_by_key(|(pos, _)| *pos);

    let mut blocks: Vec<Block> = placed.into_iter().flat_map(|(_, b)| b).collect();
    if blocks.is_empty() && !html.trim().is_empty() {
        // Markup with nothing recognizable still yields one block.
        blocks.push(fallback_block(html, options.fallback_text_limit));
    }
    Ok(blocks)
}

struct BlockBuilder<'a> {
    dom: &'a Dom,
    positions: &'a Positions,
    media: &'a MediaMap,
}

impl BlockBuilder<'_> {
    fn candidates(&self) -> Vec<Candidate> {
        let dom = self.dom;
        let mut out = Vec::new();

        for &id in self.positions.order() {
            let start = self.positions.start(id);
            let end = self.positions.end(id);

            if let Some(comment) = dom.comment(id) {
                if let Some(close) = self.embed_close(id, comment) {
                    let end = self.positions.start(close);
                    out.push(Candidate::new(start, end, CandidateKind::Embed { open: id }));
                }
                continue;
            }

            let Some(tag) = dom.tag_name(id) else {
                continue;
            };
            let kind = match tag {
                "figure" if self.figure_blocks(id).is_some() => CandidateKind::Figure(id),
                "img" if dom.attr_value(id, "src").is_some() => CandidateKind::Image(id),
                "audio" if self.media_src(id).is_some() => CandidateKind::Audio(id),
                "video" if self.media_src(id).is_some() => CandidateKind::Video(id),
                "iframe" if dom.attr_value(id, "src").is_some() => CandidateKind::Frame(id),
                "li" => {
                    // Nested lists belong to their own items.
                    let end = dom
                        .children(id)
                        .find(|&c| is_list(dom, c))
                        .map_or(end, |list| self.positions.start(list) - 1);
                    out.push(Candidate::new(start, end, CandidateKind::Text(id)));
                    continue;
                }
                "blockquote" if dom.children(id).any(|c| is_block_level(dom, c)) => continue,
                "p" | "h1" | "h2" | "h3" | "h4" | "h5" | "h6" | "blockquote" => {
                    CandidateKind::Text(id)
                }
                "br" if !self.in_text_container(id) => CandidateKind::Break(id),
                _ => continue,
            };
            out.push(Candidate::new(start, end, kind));
        }
        out
    }

    /// Closing comment of a `wp:embed` marker whose payload carries a URL.
    fn embed_close(&self, open: NodeId, comment: &str) -> Option<NodeId> {
        embed_url(comment)?;
        let from = self.positions.start(open) as usize + 1;
        self.positions.order()[from..].iter().copied().find(|&id| {
            self.dom
                .comment(id)
                .is_some_and(|c| c.trim().starts_with("/wp:embed"))
        })
    }

    fn in_text_container(&self, id: NodeId) -> bool {
        self.dom
            .ancestors(id)
            .any(|a| self.dom.tag_name(a).is_some_and(|t| TEXT_CONTAINERS.contains(&t)))
    }

    /// `src` of a media element, or of its first `<source>` child.
    fn media_src(&self, id: NodeId) -> Option<&str> {
        self.dom.attr_value(id, "src").or_else(|| {
            self.dom
                .descendants(id)
                .filter(|&d| self.dom.is_tag(d, "source"))
                .find_map(|d| self.dom.attr_value(d, "src"))
        })
    }

    fn first_media(&self, root: NodeId, tag: &str) -> Option<NodeId> {
        self.dom
            .descendants(root)
            .skip(1)
            .find(|&d| self.dom.is_tag(d, tag) && self.media_src(d).is_some())
    }

    fn caption(&self, figure: NodeId) -> Option<String> {
        let caption = self.dom.find_descendant(figure, "figcaption")?;
        let text = self.dom.text_content(caption).replace('\u{a0}', " ");
        let text = text.trim();
        (!text.is_empty()).then(|| text.to_string())
    }

    /// Blocks for a figure, or `None` when it wraps no media.
    ///
    /// Audio wins over video, video over frames, and a figure of images
    /// (a gallery) yields one image block per image.
    fn figure_blocks(&self, figure: NodeId) -> Option<Vec<Block>> {
        if let Some(audio) = self.first_media(figure, "audio") {
            return Some(vec![self.audio(audio, self.caption(figure))]);
        }
        if let Some(video) = self.first_media(figure, "video") {
            return Some(vec![self.video(video, self.caption(figure))]);
        }
        if let Some(frame) = self.first_media(figure, "iframe") {
            return Some(vec![self.video(frame, self.caption(figure))]);
        }
        let images: Vec<Block> = self
            .dom
            .descendants(figure)
            .filter(|&d| self.dom.is_tag(d, "img"))
            .filter_map(|d| self.image(d))
            .collect();
        (!images.is_empty()).then_some(images)
    }

    fn build(&self, kind: CandidateKind) -> Vec<Block> {
        match kind {
            CandidateKind::Figure(id) => self.figure_blocks(id).unwrap_or_default(),
            CandidateKind::Embed { open } => self.embed(open).into_iter().collect(),
            CandidateKind::Image(id) => self.image(id).into_iter().collect(),
            CandidateKind::Audio(id) => vec![self.audio(id, None)],
            CandidateKind::Video(id) | CandidateKind::Frame(id) => vec![self.video(id, None)],
            CandidateKind::Text(id) => vec![Block::Text(self.text(id))],
            CandidateKind::Break(_) => vec![Block::Text(TextBlock::empty())],
        }
    }

    fn image(&self, id: NodeId) -> Option<Block> {
        let url = self.dom.attr_value(id, "src")?;
        Some(Block::Image(ImageBlock {
            key: new_key(),
            alt: self.dom.get_attr(id, "alt").unwrap_or_default().to_string(),
            url: url.to_string(),
            local_path: self.media.local_path(url),
        }))
    }

    fn audio(&self, id: NodeId, title: Option<String>) -> Block {
        let url = self.media_src(id).unwrap_or_default();
        Block::Audio(AudioBlock {
            key: new_key(),
            url: url.to_string(),
            local_path: self.media.local_path(url),
            title,
            show_controls: self.dom.has_attr(id, "controls"),
            autoplay: self.dom.has_attr(id, "autoplay"),
        })
    }

    fn video(&self, id: NodeId, title: Option<String>) -> Block {
        let url = self.media_src(id).unwrap_or_default();
        Block::Video(VideoBlock {
            key: new_key(),
            video_type: VideoType::classify(url),
            url: url.to_string(),
            local_path: self.media.local_path(url),
            title,
        })
    }

    fn embed(&self, open: NodeId) -> Option<Block> {
        let url = self.dom.comment(open).and_then(embed_url)?;
        Some(Block::Video(VideoBlock {
            key: new_key(),
            video_type: VideoType::classify(&url),
            local_path: self.media.local_path(&url),
            url,
            title: None,
        }))
    }

    fn text(&self, id: NodeId) -> TextBlock {
        let dom = self.dom;
        // Nested lists belong to their own items.
        let cut = dom
            .is_tag(id, "li")
            .then(|| dom.children(id).find(|&c| is_list(dom, c)))
            .flatten()
            .map(|list| self.positions.start(list));
        let html = match cut {
            Some(cut) => inner_html_filtered(dom, id, |c| self.positions.start(c) < cut),
            None => inner_html(dom, id),
        };
        self.styled(id, parse_inline(&html))
    }

    /// A text block carrying the style and list context of `container`.
    fn styled(&self, container: NodeId, inline: InlineContent) -> TextBlock {
        let dom = self.dom;
        let tag = dom.tag_name(container).unwrap_or_default();

        if tag == "li" {
            let (list_item, level) = self.list_context(container);
            return TextBlock::new(BlockStyle::Normal, inline.children, inline.mark_defs)
                .with_list(list_item, level);
        }

        let style = match tag.strip_prefix('h').and_then(|n| n.parse::<u8>().ok()) {
            Some(level) => BlockStyle::heading(level).unwrap_or_default(),
            None if tag == "blockquote"
                || dom.ancestors(container).any(|a| dom.is_tag(a, "blockquote")) =>
            {
                BlockStyle::Blockquote
            }
            None => BlockStyle::Normal,
        };
        TextBlock::new(style, inline.children, inline.mark_defs)
    }

    /// Bullet or number from the nearest list, and the list nesting depth.
    fn list_context(&self, item: NodeId) -> (ListItem, u32) {
        let mut lists = self.dom.ancestors(item).filter(|&a| is_list(self.dom, a));
        let list_item = match lists.next() {
            Some(list) if self.dom.is_tag(list, "ol") => ListItem::Number,
            _ => ListItem::Bullet,
        };
        (list_item, 1 + lists.count() as u32)
    }

    /// Text blocks for runs of text no accepted interval covers, keyed by
    /// the position of their first text node.
    ///
    /// A run is cut wherever accepted content intervenes, so a paragraph split
    /// by an inline image yields one block on each side. Each run keeps the
    /// inline markup around it and the style of its container.
    fn uncovered_text(&self, coverage: &Accepted) -> Vec<(u32, Block)> {
        struct Run {
            first: u32,
            last: u32,
            container: NodeId,
        }

        let dom = self.dom;
        let mut runs: Vec<Run> = Vec::new();

        for &id in self.positions.order() {
            if dom.text(id).is_none() {
                continue;
            }
            let pos = self.positions.start(id);
            if coverage.covers(pos) || self.is_skipped(id) {
                continue;
            }
            let container = dom
                .ancestors(id)
                .find(|&a| is_block_level(dom, a))
                .unwrap_or_else(|| dom.document());

            match runs.last_mut() {
                Some(run)
                    if run.container == container
                        && (pos <= run.last + 1 || !coverage.overlaps(run.last + 1, pos - 1)) =>
                {
                    run.last = pos;
                }
                _ => runs.push(Run {
                    first: pos,
                    last: pos,
                    container,
                }),
            }
        }

        runs.into_iter()
            .filter_map(|run| {
                let html = inner_html_filtered(dom, run.container, |c| {
                    self.in_run(c, run.first, run.last, coverage)
                });
                let mut inline = parse_inline(&html);
                trim_edges(&mut inline.children);
                let block = self.styled(run.container, inline);
                (!block.text().is_empty()).then_some((run.first, Block::Text(block)))
            })
            .collect()
    }

    /// Whether `id` belongs to the uncovered run spanning `[first, last]`.
    ///
    /// Elements reaching into the run are kept so their marks apply; anything
    /// accepted elsewhere is dropped.
    fn in_run(&self, id: NodeId, first: u32, last: u32, coverage: &Accepted) -> bool {
        let start = self.positions.start(id);
        let end = self.positions.end(id);
        start <= last
            && end >= first
            && !coverage.covers(start)
            && !self.dom.tag_name(id).is_some_and(|t| SKIPPED.contains(&t))
    }

    fn is_skipped(&self, id: NodeId) -> bool {
        self.dom
            .ancestors(id)
            .any(|a| self.dom.tag_name(a).is_some_and(|t| SKIPPED.contains(&t)))
    }
}

/// Strip leading whitespace from the first span and trailing whitespace from
/// the last.
fn trim_edges(children: &mut [Span]) {
    if let Some(first) = children.first_mut() {
        first.text = first.text.trim_start().to_string();
    }
    if let Some(last) = children.last_mut() {
        last.text = last.text.trim_end().to_string();
    }
}

/// URL from a `wp:embed` comment's JSON payload.
fn embed_url(comment: &str) -> Option<String> {
    let payload = comment.trim().strip_prefix("wp:embed")?.trim();
    if !payload.starts_with('{') {
        return None;
    }
    match serde_json::from_str::<serde_json::Value>(payload) {
        Ok(value) => value
            .get("url")
            .and_then(|u| u.as_str())
            .filter(|u| !u.is_empty())
            .map(str::to_string),
        Err(err) => {
            log::warn!("skipping embed marker with unreadable attributes: {err}");
            None
        }
    }
}

#[cfg(test)]
mod tests {
    use std::path::PathBuf;

    use super::*;
    use crate::model::{Decorator, MediaKind, MediaReference};

    fn parse(html: &str) -> Vec<Block> {
        parse_blocks(html, &MediaMap::new())
    }

    fn types(blocks: &[Block]) -> Vec<&'static str> {
        blocks.iter().map(Block::type_name).collect()
    }

    fn text_of(block: &Block) -> String {
        block.as_text().map(TextBlock::text).unwrap_or_default()
    }

    #[test]
    fn test_document_order() {
        let blocks = parse(r#"<p>A</p><img src="x"><p>B</p>"#);
        assert_eq!(types(&blocks), ["block", "image", "block"]);
        assert_eq!(text_of(&blocks[0]), "A");
        assert!(matches!(&blocks[1], Block::Image(i) if i.url == "x"));
        assert_eq!(text_of(&blocks[2]), "B");
    }

    #[test]
    fn test_blank_paragraph_kept() {
        let blocks = parse("<p>First</p><p></p><p>Second</p>");
        assert_eq!(blocks.len(), 3);
        let middle = blocks[1].as_text().unwrap();
        assert_eq!(middle.children.len(), 1);
        assert_eq!(middle.children[0].text, "");
    }

    #[test]
    fn test_figure_media_emitted_once() {
        let blocks = parse(
            r#"<figure class="wp-block-image"><img src="a.jpg" alt="A"><figcaption>cap</figcaption></figure>"#,
        );
        assert_eq!(types(&blocks), ["image"]);
        assert!(matches!(&blocks[0], Block::Image(i) if i.alt == "A"));
    }

    #[test]
    fn test_mixed_media_order_and_caption() {
        let html = concat!(
            "<p>one</p>",
            r#"<figure><img src="https://s.example/a.jpg"></figure>"#,
            "<p>two</p>",
            r#"<figure class="wp-block-audio"><audio controls src="https://s.example/a.mp3"></audio><figcaption>Episode 1</figcaption></figure>"#,
            "<p>three</p>",
        );
        let blocks = parse(html);
        assert_eq!(types(&blocks), ["block", "image", "block", "audio", "block"]);
        let Block::Audio(audio) = &blocks[3] else {
            panic!("expected audio");
        };
        assert_eq!(audio.title.as_deref(), Some("Episode 1"));
        assert!(audio.show_controls);
        assert!(!audio.autoplay);
    }

    #[test]
    fn test_video_figure_caption_and_source() {
        let html = concat!(
            r#"<figure class="wp-block-video"><video controls>"#,
            r#"<source src="https://s.example/clip.mp4" type="video/mp4"></video>"#,
            "<figcaption>Walkthrough</figcaption></figure>",
        );
        let blocks = parse(html);
        assert_eq!(types(&blocks), ["video"]);
        let Block::Video(video) = &blocks[0] else {
            panic!("expected video");
        };
        assert_eq!(video.url, "https://s.example/clip.mp4");
        assert_eq!(video.title.as_deref(), Some("Walkthrough"));
        assert_eq!(video.video_type, VideoType::Url);
    }

    #[test]
    fn test_gallery_yields_one_image_per_img() {
        let blocks = parse(
            r#"<figure class="wp-block-gallery"><figure><img src="1.jpg"></figure><figure><img src="2.jpg"></figure></figure>"#,
        );
        assert_eq!(types(&blocks), ["image", "image"]);
    }

    #[test]
    fn test_audio_source_child() {
        let blocks = parse(r#"<audio autoplay><source src="b.ogg"></audio>"#);
        let Block::Audio(audio) = &blocks[0] else {
            panic!("expected audio");
        };
        assert_eq!(audio.url, "b.ogg");
        assert!(audio.autoplay);
        assert_eq!(audio.title, None);
    }

    #[test]
    fn test_embed_marker() {
        let html = concat!(
            r#"<!-- wp:embed {"url":"https://www.youtube.com/watch?v=abc","type":"video"} -->"#,
            r#"<figure class="wp-block-embed"><div class="wp-block-embed__wrapper">https://www.youtube.com/watch?v=abc</div></figure>"#,
            "<!-- /wp:embed -->",
            "<p>after</p>",
        );
        let blocks = parse(html);
        assert_eq!(types(&blocks), ["video", "block"]);
        let Block::Video(video) = &blocks[0] else {
            panic!("expected video");
        };
        assert_eq!(video.video_type, VideoType::Youtube);
        assert_eq!(video.url, "https://www.youtube.com/watch?v=abc");
    }

    #[test]
    fn test_broken_embed_payload_is_skipped() {
        let blocks = parse(r#"<!-- wp:embed {"url": --><p>x</p><!-- /wp:embed -->"#);
        assert_eq!(types(&blocks), ["block"]);
    }

    #[test]
    fn test_iframe_video() {
        let blocks = parse(r#"<p>intro</p><iframe src="https://player.vimeo.com/video/1"></iframe>"#);
        assert_eq!(types(&blocks), ["block", "video"]);
        assert!(matches!(&blocks[1], Block::Video(v) if v.video_type == VideoType::Vimeo));
    }

    #[test]
    fn test_headings_and_blockquote() {
        let blocks = parse("<h1>T</h1><h4>S</h4><blockquote><p>Q</p></blockquote><blockquote>R</blockquote>");
        let styles: Vec<_> = blocks.iter().map(|b| b.as_text().unwrap().style).collect();
        assert_eq!(
            styles,
            [BlockStyle::H1, BlockStyle::H4, BlockStyle::Blockquote, BlockStyle::Blockquote]
        );
    }

    #[test]
    fn test_lists_and_levels() {
        let blocks = parse("<ul><li>a<ol><li>b</li></ol></li><li>c</li></ul>");
        let items: Vec<_> = blocks
            .iter()
            .map(|b| {
                let t = b.as_text().unwrap();
                (t.text(), t.list_item, t.level)
            })
            .collect();
        assert_eq!(
            items,
            [
                ("a".to_string(), Some(ListItem::Bullet), Some(1)),
                ("b".to_string(), Some(ListItem::Number), Some(2)),
                ("c".to_string(), Some(ListItem::Bullet), Some(1)),
            ]
        );
    }

    #[test]
    fn test_inline_marks_flow_through() {
        let blocks = parse("<p>This is <strong>bold text</strong> in a sentence.</p>");
        let block = blocks[0].as_text().unwrap();
        assert_eq!(block.children.len(), 3);
        assert!(block.children[1].has_decorator(Decorator::Strong));
    }

    #[test]
    fn test_standalone_break_is_blank_block() {
        let blocks = parse("<div>one<br>two</div>");
        let texts: Vec<_> = blocks.iter().map(text_of).collect();
        assert_eq!(texts, ["one", "", "two"]);
    }

    #[test]
    fn test_break_inside_paragraph_is_newline() {
        let blocks = parse("<p>one<br>two</p>");
        assert_eq!(blocks.len(), 1);
        assert_eq!(text_of(&blocks[0]), "one\ntwo");
    }

    #[test]
    fn test_loose_text_becomes_plain_blocks() {
        let blocks = parse("Loose intro<p>para</p><div>tail &amp; end</div>");
        let texts: Vec<_> = blocks.iter().map(text_of).collect();
        assert_eq!(texts, ["Loose intro", "para", "tail & end"]);
    }

    #[test]
    fn test_paragraph_split_by_image() {
        let blocks = parse(r#"<p>before <img src="i.png"> after</p>"#);
        assert_eq!(types(&blocks), ["block", "image", "block"]);
        assert_eq!(text_of(&blocks[0]), "before");
        assert_eq!(text_of(&blocks[2]), "after");
    }

    #[test]
    fn test_heading_split_by_image_keeps_style() {
        let blocks = parse(r#"<h2>Chapter <img src="i.jpg"></h2>"#);
        assert_eq!(types(&blocks), ["block", "image"]);
        let heading = blocks[0].as_text().unwrap();
        assert_eq!(heading.style, BlockStyle::H2);
        assert_eq!(heading.text(), "Chapter");
    }

    #[test]
    fn test_paragraph_split_by_image_keeps_links() {
        let blocks = parse(r#"<p>Read <a href="https://s.example/post">this</a> now <img src="i.jpg"></p>"#);
        assert_eq!(types(&blocks), ["block", "image"]);
        let block = blocks[0].as_text().unwrap();
        assert_eq!(block.style, BlockStyle::Normal);
        assert_eq!(block.text(), "Read this now");
        assert_eq!(block.mark_defs.len(), 1);
        assert_eq!(block.mark_defs[0].href, "https://s.example/post");
        assert_eq!(block.children[1].text, "this");
        assert_eq!(block.children[1].link_key(), Some(block.mark_defs[0].key.as_str()));
    }

    #[test]
    fn test_link_around_image_applies_on_both_sides() {
        let blocks = parse(r#"<p><a href="/x">before <img src="i.jpg"> after</a></p>"#);
        assert_eq!(types(&blocks), ["block", "image", "block"]);
        for idx in [0, 2] {
            let block = blocks[idx].as_text().unwrap();
            assert_eq!(block.mark_defs.len(), 1);
            assert_eq!(block.children[0].link_key(), Some(block.mark_defs[0].key.as_str()));
        }
        assert_eq!(text_of(&blocks[0]), "before");
        assert_eq!(text_of(&blocks[2]), "after");
    }

    #[test]
    fn test_list_item_split_by_image_keeps_list() {
        let blocks = parse(r#"<ul><li>Item <img src="i.jpg"></li></ul><ol><li>Step <img src="j.jpg"><ul><li>x</li></ul></li></ol>"#);
        let items: Vec<_> = blocks
            .iter()
            .filter_map(Block::as_text)
            .map(|t| (t.text(), t.list_item, t.level))
            .collect();
        assert_eq!(
            items,
            [
                ("Item".to_string(), Some(ListItem::Bullet), Some(1)),
                ("Step".to_string(), Some(ListItem::Number), Some(1)),
                ("x".to_string(), Some(ListItem::Bullet), Some(2)),
            ]
        );
    }

    #[test]
    fn test_loose_text_keeps_marks() {
        let blocks = parse("Intro <strong>bold</strong> tail");
        assert_eq!(blocks.len(), 1);
        let block = blocks[0].as_text().unwrap();
        let texts: Vec<_> = block.children.iter().map(|s| s.text.as_str()).collect();
        assert_eq!(texts, ["Intro ", "bold", " tail"]);
        assert!(block.children[1].has_decorator(Decorator::Strong));
        assert!(block.children[0].marks.is_empty());
    }

    #[test]
    fn test_loose_blockquote_text_keeps_style() {
        let blocks = parse("<blockquote>intro<p>x</p><div>more</div></blockquote><div>out</div>");
        let styles: Vec<_> = blocks
            .iter()
            .map(|b| {
                let t = b.as_text().unwrap();
                (t.text(), t.style)
            })
            .collect();
        assert_eq!(
            styles,
            [
                ("intro".to_string(), BlockStyle::Blockquote),
                ("x".to_string(), BlockStyle::Blockquote),
                ("more".to_string(), BlockStyle::Blockquote),
                ("out".to_string(), BlockStyle::Normal),
            ]
        );
    }

    #[test]
    fn test_script_text_ignored() {
        let blocks = parse("<script>var x = 1;</script><p>ok</p>");
        assert_eq!(blocks.len(), 1);
        assert_eq!(text_of(&blocks[0]), "ok");
    }

    #[test]
    fn test_media_without_src_is_not_a_block() {
        let blocks = parse("<img alt=x><video></video><p>t</p>");
        assert_eq!(types(&blocks), ["block"]);
    }

    #[test]
    fn test_markup_only_input_yields_a_block() {
        for html in ["<div></div>", "<!-- note -->", "<span></span>"] {
            let blocks = parse(html);
            assert_eq!(blocks.len(), 1, "input {html:?}");
        }
        assert!(parse("").is_empty());
        assert!(parse("   ").is_empty());
    }

    #[test]
    fn test_local_path_from_media_map() {
        let found = MediaReference::unresolved("https://s.example/a.jpg", MediaKind::Image)
            .resolved(Some("/media/a.jpg".into()));
        let missing = MediaReference::unresolved("https://s.example/b.jpg", MediaKind::Image);
        let map: MediaMap = [&found, &missing].into_iter().collect();

        let blocks = parse_blocks(
            r#"<img src="https://s.example/a.jpg"><img src="https://s.example/b.jpg">"#,
            &map,
        );
        let paths: Vec<_> = blocks
            .iter()
            .map(|b| match b {
                Block::Image(i) => i.local_path.clone(),
                _ => None,
            })
            .collect();
        assert_eq!(paths, [Some(PathBuf::from("/media/a.jpg")), None]);
    }

    #[test]
    fn test_too_deep_falls_back() {
        let html = format!("{}deep text{}", "<div>".repeat(40), "</div>".repeat(40));
        let options = ParseOptions {
            max_depth: 10,
            ..ParseOptions::default()
        };
        let blocks = parse_blocks_with(&html, &MediaMap::new(), &options);
        assert_eq!(blocks.len(), 1);
        assert_eq!(text_of(&blocks[0]), "deep text");
    }

    #[test]
    fn test_fallback_truncates_with_ellipsis() {
        let long = "x".repeat(600);
        let block = fallback_block(&format!("<p>{long}</p>"), 500);
        let text = text_of(&block);
        assert_eq!(text.chars().count(), 503);
        assert!(text.ends_with("..."));

        let short = fallback_block("<p>short</p>", 500);
        assert_eq!(text_of(&short), "short");
    }

    #[test]
    fn test_embed_url_payloads() {
        assert_eq!(
            embed_url(r#" wp:embed {"url":"https://vimeo.com/1"} "#).as_deref(),
            Some("https://vimeo.com/1")
        );
        assert_eq!(embed_url(" wp:embed "), None);
        assert_eq!(embed_url(r#" wp:embed {"type":"video"} "#), None);
        assert_eq!(embed_url(" wp:paragraph "), None);
    }
}
