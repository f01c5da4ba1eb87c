//! Data model for converted content.
//!
//! This module contains:
//! - Portable block types (text, image, audio, video) and inline spans
//! - Media references and the URL lookup used while parsing
//! - `_key` generation

mod blocks;
mod key;
mod media;

pub use blocks::{
    AudioBlock, Block, BlockStyle, Decorator, ImageBlock, LinkMarkDef, ListItem, Mark, Span,
    TextBlock, VideoBlock, VideoType,
};
pub use key::new_key;
pub use media::{MediaKind, MediaMap, MediaReference};
