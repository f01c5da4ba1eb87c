//! Export from the block model: plain text, excerpts and preview HTML.
//!
//! Everything here is a pure function of its input blocks, usable on its own
//! by a preview UI.
//!
//! # Example
//!
//! ```
//! use blockport::export::{extract_plain_text, render_html};
//! use blockport::import::parse_blocks;
//! use blockport::model::MediaMap;
//!
//! let blocks = parse_blocks("<h1>Title</h1><p>Body</p>", &MediaMap::new());
//! assert_eq!(extract_plain_text(&blocks), "Title\nBody");
//! assert_eq!(render_html(&blocks), "<h1>Title</h1>\n<p>Body</p>");
//! ```

mod html;
mod text;

pub use html::{
    DEFAULT_MEDIA_ROUTE, HtmlRenderer, RenderOptions, embed_url, render_html, render_html_with,
};
pub use text::{
    DEFAULT_EXCERPT_LENGTH, derive_excerpt, excerpt_from_text, extract_plain_text, word_count,
};
