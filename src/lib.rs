//! # blockport
//!
//! Converts WordPress post bodies into Sanity portable block content.
//!
//! ## Features
//!
//! - Parse arbitrary WordPress HTML into ordered text, image, audio and video blocks
//! - Inline marks (strong, em, underline, strike, code) and link annotations
//! - Media extraction and resolution against a local uploads directory
//! - Plain text, excerpts and preview HTML rendered back from blocks
//! - Parallel batch conversion of exported `wp_posts` records
//!
//! ## Quick Start
//!
//! ```no_run
//! use blockport::{render_html, transform};
//!
//! let result = transform(
//!     r#"<p>Hello <strong>world</strong></p><img src="https://s.example/a.jpg">"#,
//!     "input/uploads",
//! );
//! for media in &result.media {
//!     println!("{} found={}", media.url, media.found);
//! }
//! println!("{}", render_html(&result.content));
//! ```
//!
//! ## Working with Blocks
//!
//! Parsing never fails; malformed markup degrades to plain text:
//!
//! ```
//! use blockport::{Block, parse_blocks};
//! use blockport::model::MediaMap;
//!
//! let blocks = parse_blocks("<h2>Intro</h2><p>Some <em>text</em>", &MediaMap::new());
//! assert_eq!(blocks.len(), 2);
//! assert!(matches!(&blocks[0], Block::Text(b) if b.text() == "Intro"));
//! ```

pub mod batch;
pub mod config;
pub mod dom;
pub mod error;
pub mod export;
pub mod import;
pub mod media;
pub mod model;
pub mod transform;

pub use config::Config;
pub use error::{Error, Result};
pub use export::{extract_plain_text, render_html};
pub use import::parse_blocks;
pub use media::extract_media;
pub use model::{Block, MediaReference};
pub use transform::{Transformer, transform};
