//! Entity decoding and tag stripping for markup text.

use std::borrow::Cow;

/// Decode HTML character references.
///
/// Covers named and numeric references. Non-breaking spaces come out as
/// plain spaces, since portable text has no use for them.
pub fn decode_entities(text: &str) -> Cow<'_, str> {
    if !text.contains('&') && !text.contains('\u{a0}') {
        return Cow::Borrowed(text);
    }
    let decoded = html_escape::decode_html_entities(text);
    if decoded.contains('\u{a0}') {
        Cow::Owned(decoded.replace('\u{a0}', " "))
    } else {
        Cow::Owned(decoded.into_owned())
    }
}

/// Whether `<` at the start of `rest` opens a tag, comment or declaration.
fn opens_tag(rest: &str) -> bool {
    rest[1..]
        .chars()
        .next()
        .is_some_and(|c| c.is_ascii_alphabetic() || matches!(c, '/' | '!' | '?'))
}

/// Remove markup, keeping text. A `<` that does not open a tag is literal.
pub fn strip_tags(html: &str) -> String {
    let mut out = String::with_capacity(html.len());
    let mut rest = html;
    while let Some(lt) = rest.find('<') {
        out.push_str(&rest[..lt]);
        let candidate = &rest[lt..];
        match candidate.find('>') {
            Some(gt) if opens_tag(candidate) => rest = &candidate[gt + 1..],
            _ => {
                out.push('<');
                rest = &candidate[1..];
            }
        }
    }
    out.push_str(rest);
    out
}

/// Stripped, decoded, trimmed text of a markup fragment.
pub fn plain_text(html: &str) -> String {
    decode_entities(&strip_tags(html)).trim().to_string()
}

/// Cut `text` to at most `limit` characters.
///
/// Returns the prefix and whether anything was cut.
pub fn truncate_chars(text: &str, limit: usize) -> (&str, bool) {
    match text.char_indices().nth(limit) {
        Some((idx, _)) => (&text[..idx], true),
        None => (text, false),
    }
}
