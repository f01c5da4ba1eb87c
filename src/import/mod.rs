//! HTML import: block content and inline mark parsing.
//!
//! [`parse_blocks`] turns a WordPress body into ordered portable blocks;
//! [`parse_inline`] turns the inner markup of one block into spans. Neither
//! fails: malformed input degrades to plain text.

mod entities;
mod inline;
mod parse;
mod schedule;

pub use entities::{decode_entities, plain_text, strip_tags, truncate_chars};
pub use inline::{InlineContent, parse_inline};
pub use parse::{
    DEFAULT_FALLBACK_LIMIT, DEFAULT_MAX_DEPTH, ParseOptions, fallback_block, parse_blocks,
    parse_blocks_with, try_parse_blocks,
};
pub use schedule::{Accepted, Candidate, CandidateKind, schedule};
