//! Benchmarks for the block conversion pipeline.
//!
//! Run with: cargo bench

use std::hint::black_box;

use criterion::{Criterion, criterion_group, criterion_main};

use blockport::batch::BatchRunner;
use blockport::export::render_html;
use blockport::import::{parse_blocks, parse_inline};
use blockport::media::{MediaResolver, extract_media};
use blockport::model::MediaMap;
use blockport::transform::{ContentKind, SourceRecord, Transformer};

/// Resolves nothing, so benchmarks measure parsing rather than disk.
struct NoMedia;

impl MediaResolver for NoMedia {
    fn resolve(&self, _url: &str) -> Option<std::path::PathBuf> {
        None
    }
}

/// A long post mixing paragraphs, lists, figures and embeds.
fn sample_post() -> String {
    let section = concat!(
        "<h2>Section heading</h2>",
        "<p>Some <strong>bold</strong>, <em>italic</em> and ",
        "<a href=\"https://site.example/linked\">linked</a> text &amp; entities.</p>",
        "<figure><img src=\"https://site.example/wp-content/uploads/2020/01/photo.jpg\" alt=\"\">",
        "<figcaption>Caption</figcaption></figure>",
        "<ul><li>One<ul><li>Nested</li></ul></li><li>Two</li></ul>",
        "<!-- wp:embed {\"url\":\"https://vimeo.com/12345\"} -->",
        "<figure><div>https://vimeo.com/12345</div></figure>",
        "<!-- /wp:embed -->",
        "<p></p>",
        "<figure><audio controls src=\"https://site.example/a.mp3\"></audio></figure>",
    );
    section.repeat(40)
}

// ============================================================================
// Parsing Benchmarks
// ============================================================================

fn bench_parse_blocks(c: &mut Criterion) {
    let html = sample_post();
    let media = MediaMap::new();

    c.bench_function("parse_blocks", |b| {
        b.iter(|| parse_blocks(black_box(&html), &media));
    });
}

fn bench_parse_inline(c: &mut Criterion) {
    let fragment = "Some <strong>bold <em>and italic</em></strong> with a \
                    <a href=\"https://site.example\">link</a>, a<br>break &hellip;"
        .repeat(20);

    c.bench_function("parse_inline", |b| {
        b.iter(|| parse_inline(black_box(&fragment)));
    });
}

fn bench_extract_media(c: &mut Criterion) {
    let html = sample_post();

    c.bench_function("extract_media", |b| {
        b.iter(|| extract_media(black_box(&html)));
    });
}

// ============================================================================
// Export Benchmarks
// ============================================================================

fn bench_render_html(c: &mut Criterion) {
    let blocks = parse_blocks(&sample_post(), &MediaMap::new());

    c.bench_function("render_html", |b| {
        b.iter(|| render_html(black_box(&blocks)));
    });
}

// ============================================================================
// Batch Benchmarks
// ============================================================================

fn bench_batch(c: &mut Criterion) {
    let content = sample_post();
    let records: Vec<SourceRecord> = (0..64)
        .map(|id| SourceRecord {
            id,
            title: format!("Post {id}"),
            content: content.clone(),
            kind: ContentKind::Post,
            ..SourceRecord::default()
        })
        .collect();
    let transformer = Transformer::with_resolver(NoMedia);

    c.bench_function("batch_64_posts", |b| {
        b.iter(|| BatchRunner::new(&transformer).run(black_box(&records)).unwrap());
    });
}

criterion_group!(
    benches,
    // Parsing
    bench_parse_blocks,
    bench_parse_inline,
    bench_extract_media,
    // Export
    bench_render_html,
    // Batch
    bench_batch,
);
criterion_main!(benches);
