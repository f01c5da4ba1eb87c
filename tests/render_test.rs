//! Preview rendering of parsed and hand-built blocks.

use std::path::PathBuf;

use blockport::export::{RenderOptions, render_html_with};
use blockport::model::{
    AudioBlock, Block, BlockStyle, Decorator, ImageBlock, LinkMarkDef, Mark, MediaMap, Span,
    TextBlock, VideoBlock, VideoType,
};
use blockport::{parse_blocks, render_html};

#[test]
fn test_render_parsed_document() {
    let html = concat!(
        "<h2>News</h2>",
        "<p>Read <a href=\"https://s.example/post\">the <em>full</em> story</a>.</p>",
        "<ul><li>one</li></ul>",
        "<p>Line<br>break</p>",
    );
    let rendered = render_html(&parse_blocks(html, &MediaMap::new()));

    assert_eq!(
        rendered,
        concat!(
            "<h2>News</h2>\n",
            "<p>Read <a href=\"https://s.example/post\">the </a>",
            "<a href=\"https://s.example/post\"><em>full</em></a>",
            "<a href=\"https://s.example/post\"> story</a>.</p>\n",
            "<ul><li>one</li></ul>\n",
            "<p>Line<br />break</p>",
        )
    );
}

#[test]
fn test_mark_order_is_fixed() {
    let span = Span::new(
        "x",
        vec![
            Mark::Decorator(Decorator::Code),
            Mark::Link("k1".into()),
            Mark::Decorator(Decorator::Underline),
            Mark::Decorator(Decorator::Strong),
            Mark::Decorator(Decorator::Em),
        ],
    );
    let link = LinkMarkDef {
        key: "k1".into(),
        href: "/a?b=1&c=2".into(),
        open_in_new_tab: true,
    };
    let block = Block::Text(TextBlock::new(BlockStyle::Normal, vec![span], vec![link]));

    assert_eq!(
        render_html(&[block]),
        concat!(
            r#"<p><a href="/a?b=1&amp;c=2" target="_blank" rel="noopener noreferrer">"#,
            "<strong><em><u><code>x</code></u></em></strong></a></p>",
        )
    );
}

#[test]
fn test_text_is_escaped() {
    let blocks = parse_blocks("<p>1 &lt; 2 &amp; 3</p>", &MediaMap::new());
    assert_eq!(render_html(&blocks), "<p>1 &lt; 2 &amp; 3</p>");
}

#[test]
fn test_media_sources() {
    let blocks = vec![
        Block::Image(ImageBlock {
            key: "i".into(),
            alt: "A \"quoted\" alt".into(),
            url: "https://s.example/a.jpg".into(),
            local_path: Some(PathBuf::from("/srv/media/my photo.jpg")),
        }),
        Block::Audio(AudioBlock {
            key: "a".into(),
            url: "https://s.example/a.mp3".into(),
            local_path: None,
            title: Some("Episode".into()),
            show_controls: true,
            autoplay: true,
        }),
        Block::Video(VideoBlock {
            key: "v".into(),
            video_type: VideoType::Youtube,
            url: "https://youtu.be/abc123".into(),
            local_path: None,
            title: None,
        }),
        Block::Video(VideoBlock {
            key: "w".into(),
            video_type: VideoType::Url,
            url: "https://s.example/clip.mp4".into(),
            local_path: None,
            title: None,
        }),
    ];
    let options = RenderOptions {
        media_route: "/media".into(),
    };
    let rendered = render_html_with(&blocks, &options);
    let lines: Vec<_> = rendered.lines().collect();

    assert_eq!(
        lines,
        [
            concat!(
                r#"<figure><img src="/media?path=%2Fsrv%2Fmedia%2Fmy%20photo.jpg" "#,
                r#"alt="A &quot;quoted&quot; alt" style="max-width: 100%; height: auto;" /></figure>"#,
            ),
            concat!(
                r#"<figure><audio controls autoplay><source src="https://s.example/a.mp3" /></audio>"#,
                "<figcaption>Episode</figcaption></figure>",
            ),
            concat!(
                r#"<figure><iframe src="https://www.youtube.com/embed/abc123" width="560" "#,
                r#"height="315" frameborder="0" allowfullscreen></iframe></figure>"#,
            ),
            r#"<figure><video controls src="https://s.example/clip.mp4"></video></figure>"#,
        ]
    );
}
