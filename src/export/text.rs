//! Plain text and excerpt derivation.

use crate::model::Block;

/// Default excerpt length in characters, before the ellipsis.
pub const DEFAULT_EXCERPT_LENGTH: usize = 150;

/// Concatenate the text of every text block.
///
/// Paragraphs and quotes are followed by a blank line, every other style by
/// a single newline. Blocks with no text and non-text blocks contribute
/// nothing. The result is trimmed.
pub fn extract_plain_text(blocks: &[Block]) -> String {
    let mut out = String::new();
    for block in blocks {
        let Block::Text(text_block) = block else {
            continue;
        };
        let text = text_block.text();
        if text.is_empty() {
            continue;
        }
        out.push_str(&text);
        out.push_str(if text_block.style.is_paragraph_like() {
            "\n\n"
        } else {
            "\n"
        });
    }
    out.trim().to_string()
}

/// Choose a document excerpt.
///
/// A non-empty source excerpt is used verbatim. Otherwise the plain text is
/// used when it fits in `max_len` characters, or its first `max_len`
/// characters, trimmed, with `...` appended. No text means no excerpt.
pub fn derive_excerpt(source: Option<&str>, blocks: &[Block], max_len: usize) -> Option<String> {
    if let Some(source) = source.filter(|s| !s.is_empty()) {
        return Some(source.to_string());
    }
    excerpt_from_text(&extract_plain_text(blocks), max_len)
}

/// Excerpt of already extracted plain text.
pub fn excerpt_from_text(text: &str, max_len: usize) -> Option<String> {
    if text.trim().is_empty() {
        return None;
    }
    match text.char_indices().nth(max_len) {
        None => Some(text.to_string()),
        Some((cut, _)) => Some(format!("{}...", text[..cut].trim())),
    }
}

/// Number of whitespace-separated words.
pub fn word_count(text: &str) -> usize {
    text.split_whitespace().count()
}
