//! Inline mark parser.
//!
//! Turns the inner markup of one block element into flat spans. The fragment
//! is scanned left to right as alternating tag and text tokens; formatting
//! tags push and pop a decorator stack, anchors push and pop a link stack,
//! and each run of text becomes a span carrying the union of what is active.

use crate::model::{Decorator, LinkMarkDef, Mark, Span, new_key};

use super::entities::{decode_entities, plain_text};

/// Spans and link definitions for one text block.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct InlineContent {
    pub children: Vec<Span>,
    pub mark_defs: Vec<LinkMarkDef>,
}

#[derive(Debug, PartialEq)]
enum Token<'a> {
    Text(&'a str),
    Open { name: String, attrs: &'a str },
    Close { name: String },
    /// Comments, doctypes and processing instructions.
    Other,
}

/// Map a tag name to the decorator it applies.
fn decorator_for(tag: &str) -> Option<Decorator> {
    match tag {
        "strong" | "b" => Some(Decorator::Strong),
        "em" | "i" => Some(Decorator::Em),
        "u" => Some(Decorator::Underline),
        "strike" | "s" | "del" => Some(Decorator::StrikeThrough),
        "code" => Some(Decorator::Code),
        _ => None,
    }
}

/// Parse an inline markup fragment into spans.
///
/// Never fails: stray closing tags are ignored, unknown tags are transparent,
/// and a fragment with no text at all yields one span holding its stripped
/// text (possibly empty).
pub fn parse_inline(html: &str) -> InlineContent {
    let mut state = InlineState::default();

    for token in Tokenizer::new(html) {
        match token {
            Token::Text(text) => state.pending.push_str(&decode_entities(text)),
            Token::Open { name, attrs } => state.open(&name, attrs),
            Token::Close { name } => state.close(&name),
            Token::Other => {}
        }
    }
    state.flush();

    let mut children = state.children;
    trim_blank_edges(&mut children);
    if children.is_empty() {
        children.push(Span::plain(plain_text(html)));
    }

    InlineContent {
        children,
        mark_defs: state.mark_defs,
    }
}

#[derive(Default)]
struct InlineState {
    decorators: Vec<Decorator>,
    /// One entry per open anchor; `None` for anchors without an href.
    links: Vec<Option<String>>,
    pending: String,
    children: Vec<Span>,
    mark_defs: Vec<LinkMarkDef>,
}

impl InlineState {
    fn open(&mut self, name: &str, attrs: &str) {
        if name == "br" {
            self.pending.push('\n');
            return;
        }
        if let Some(decorator) = decorator_for(name) {
            self.flush();
            self.decorators.push(decorator);
        } else if name == "a" {
            self.flush();
            let href = attr_value(attrs, "href").filter(|h| !h.is_empty());
            let key = href.map(|href| {
                let key = new_key();
                self.mark_defs.push(LinkMarkDef {
                    key: key.clone(),
                    href,
                    open_in_new_tab: attr_value(attrs, "target").as_deref() == Some("_blank"),
                });
                key
            });
            self.links.push(key);
        }
    }

    fn close(&mut self, name: &str) {
        if let Some(decorator) = decorator_for(name) {
            if let Some(idx) = self.decorators.iter().rposition(|&d| d == decorator) {
                self.flush();
                self.decorators.remove(idx);
            }
        } else if name == "a" && !self.links.is_empty() {
            self.flush();
            self.links.pop();
        }
    }

    fn active_marks(&self) -> Vec<Mark> {
        let mut marks: Vec<Mark> = Vec::with_capacity(self.decorators.len() + 1);
        for &d in &self.decorators {
            let mark = Mark::Decorator(d);
            if !marks.contains(&mark) {
                marks.push(mark);
            }
        }
        if let Some(key) = self.links.iter().rev().find_map(|l| l.as_ref()) {
            marks.push(Mark::Link(key.clone()));
        }
        marks
    }

    fn flush(&mut self) {
        if self.pending.is_empty() {
            return;
        }
        let text = std::mem::take(&mut self.pending);
        let marks = self.active_marks();
        self.children.push(Span::new(text, marks));
    }
}

/// Drop whitespace-only spans at either end; interior ones separate words.
fn trim_blank_edges(children: &mut Vec<Span>) {
    let is_blank = |s: &Span| s.text.trim().is_empty();
    let lead = children.iter().take_while(|s| is_blank(s)).count();
    children.drain(..lead);
    while children.last().is_some_and(is_blank) {
        children.pop();
    }
}

/// Splits markup into tag and text tokens.
struct Tokenizer<'a> {
    rest: &'a str,
}

impl<'a> Tokenizer<'a> {
    fn new(html: &'a str) -> Self {
        Self { rest: html }
    }

    /// Length of the tag starting at `<`, honouring quoted attribute values.
    fn tag_len(s: &str) -> Option<usize> {
        if s.starts_with("<!--") {
            return s.find("-->").map(|end| end + 3);
        }
        let mut quote: Option<char> = None;
        for (idx, c) in s.char_indices().skip(1) {
            match (quote, c) {
                (Some(q), c) if c == q => quote = None,
                (Some(_), _) => {}
                (None, '"' | '\'') => quote = Some(c),
                (None, '>') => return Some(idx + 1),
                (None, _) => {}
            }
        }
        None
    }

    fn tag_token(tag: &'a str) -> Token<'a> {
        let inner = tag[1..tag.len() - 1].trim_end_matches('/');
        if inner.starts_with('!') || inner.starts_with('?') {
            return Token::Other;
        }
        let (closing, body) = match inner.strip_prefix('/') {
            Some(body) => (true, body),
            None => (false, inner),
        };
        let name_len = body
            .find(|c: char| !c.is_ascii_alphanumeric())
            .unwrap_or(body.len());
        let name = body[..name_len].to_ascii_lowercase();
        if closing {
            Token::Close { name }
        } else {
            Token::Open {
                name,
                attrs: &body[name_len..],
            }
        }
    }
}

impl<'a> Iterator for Tokenizer<'a> {
    type Item = Token<'a>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.rest.is_empty() {
            return None;
        }
        let s = self.rest;
        if s.starts_with('<') {
            let opens = s[1..]
                .chars()
                .next()
                .is_some_and(|c| c.is_ascii_alphabetic() || matches!(c, '/' | '!' | '?'));
            if opens && let Some(len) = Self::tag_len(s) {
                self.rest = &s[len..];
                return Some(Self::tag_token(&s[..len]));
            }
            // A lone '<' is text; consume it with what follows up to the next '<'.
            let end = s[1..].find('<').map_or(s.len(), |i| i + 1);
            self.rest = &s[end..];
            return Some(Token::Text(&s[..end]));
        }
        let end = s.find('<').unwrap_or(s.len());
        self.rest = &s[end..];
        Some(Token::Text(&s[..end]))
    }
}

/// Value of an attribute in raw tag attribute text, entity-decoded.
fn attr_value(attrs: &str, wanted: &str) -> Option<String> {
    let mut rest = attrs;
    loop {
        rest = rest.trim_start_matches(|c: char| c.is_whitespace() || c == '/');
        if rest.is_empty() {
            return None;
        }
        let name_end = rest
            .find(|c: char| c.is_whitespace() || c == '=' || c == '/')
            .unwrap_or(rest.len());
        let name = &rest[..name_end];
        rest = rest[name_end..].trim_start();

        let value = if let Some(after_eq) = rest.strip_prefix('=') {
            let after_eq = after_eq.trim_start();
            match after_eq.chars().next() {
                Some(q @ ('"' | '\'')) => {
                    let body = &after_eq[1..];
                    let end = body.find(q).unwrap_or(body.len());
                    rest = body.get(end + 1..).unwrap_or("");
                    &body[..end]
                }
                _ => {
                    let end = after_eq
                        .find(char::is_whitespace)
                        .unwrap_or(after_eq.len());
                    rest = &after_eq[end..];
                    &after_eq[..end]
                }
            }
        } else {
            ""
        };

        if name.eq_ignore_ascii_case(wanted) {
            return Some(decode_entities(value).into_owned());
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn texts(content: &InlineContent) -> Vec<&str> {
        content.children.iter().map(|s| s.text.as_str()).collect()
    }

    #[test]
    fn test_strong_in_sentence() {
        let content = parse_inline("This is <strong>bold text</strong> in a sentence.");

        assert_eq!(texts(&content), ["This is ", "bold text", " in a sentence."]);
        assert!(content.children[0].marks.is_empty());
        assert_eq!(
            content.children[1].marks,
            vec![Mark::Decorator(Decorator::Strong)]
        );
        assert!(content.children[2].marks.is_empty());
        assert!(content.mark_defs.is_empty());
    }

    #[test]
    fn test_tag_aliases() {
        let content = parse_inline("<b>a</b><i>b</i><u>c</u><s>d</s><del>e</del><code>f</code>");
        let marks: Vec<_> = content.children.iter().map(|s| s.marks[0].clone()).collect();
        assert_eq!(
            marks,
            vec![
                Mark::Decorator(Decorator::Strong),
                Mark::Decorator(Decorator::Em),
                Mark::Decorator(Decorator::Underline),
                Mark::Decorator(Decorator::StrikeThrough),
                Mark::Decorator(Decorator::StrikeThrough),
                Mark::Decorator(Decorator::Code),
            ]
        );
    }

    #[test]
    fn test_nested_marks_union() {
        let content = parse_inline("<strong>a <em>b</em></strong>");
        assert_eq!(texts(&content), ["a ", "b"]);
        assert_eq!(
            content.children[1].marks,
            vec![
                Mark::Decorator(Decorator::Strong),
                Mark::Decorator(Decorator::Em)
            ]
        );
    }

    #[test]
    fn test_link_mark_def() {
        let content = parse_inline(
            r#"See <a href="https://example.com/?a=1&amp;b=2" target="_blank"><em>here</em></a>."#,
        );

        assert_eq!(content.mark_defs.len(), 1);
        let def = &content.mark_defs[0];
        assert_eq!(def.href, "https://example.com/?a=1&b=2");
        assert!(def.open_in_new_tab);

        let linked = &content.children[1];
        assert_eq!(linked.text, "here");
        assert_eq!(linked.link_key(), Some(def.key.as_str()));
        assert!(linked.has_decorator(Decorator::Em));
        assert_eq!(content.children[2].link_key(), None);
    }

    #[test]
    fn test_anchor_without_href_keeps_stack_balanced() {
        let content = parse_inline(r#"<a href="/outer">x <a name="n">y</a> z</a>"#);
        assert_eq!(content.mark_defs.len(), 1);
        let key = content.mark_defs[0].key.as_str();
        assert!(content.children.iter().all(|s| s.link_key() == Some(key)));
    }

    #[test]
    fn test_stray_close_is_ignored() {
        let content = parse_inline("plain</strong> text</a>");
        assert_eq!(texts(&content), ["plain text"]);
        assert!(content.children[0].marks.is_empty());
    }

    #[test]
    fn test_line_breaks_become_newlines() {
        let content = parse_inline("Line one<br />Line two<BR>Line three");
        assert_eq!(texts(&content), ["Line one\nLine two\nLine three"]);
    }

    #[test]
    fn test_entities_decoded() {
        let content = parse_inline("Fish &amp; chips&nbsp;&mdash; &lt;tasty&gt;");
        assert_eq!(texts(&content), ["Fish & chips \u{2014} <tasty>"]);
    }

    #[test]
    fn test_empty_fragment_yields_one_empty_span() {
        for input in ["", "   ", "<span></span>", "<!-- nothing -->"] {
            let content = parse_inline(input);
            assert_eq!(content.children.len(), 1, "input {input:?}");
            assert_eq!(content.children[0].text, "");
        }
    }

    #[test]
    fn test_interior_whitespace_kept() {
        let content = parse_inline("<b>a</b> <i>b</i>");
        assert_eq!(texts(&content), ["a", " ", "b"]);
    }

    #[test]
    fn test_unknown_tags_are_transparent() {
        let content = parse_inline(r#"<span class="x">one</span> two"#);
        assert_eq!(texts(&content), ["one two"]);
    }

    #[test]
    fn test_quoted_gt_in_attribute() {
        let content = parse_inline(r#"<a href="/a>b">go</a>"#);
        assert_eq!(content.mark_defs[0].href, "/a>b");
        assert_eq!(texts(&content), ["go"]);
    }

    #[test]
    fn test_lone_angle_bracket_is_text() {
        let content = parse_inline("1 < 2");
        assert_eq!(texts(&content), ["1 < 2"]);
    }

    #[test]
    fn test_attr_value_forms() {
        assert_eq!(attr_value(r#" href="a""#, "href").as_deref(), Some("a"));
        assert_eq!(attr_value(" href='b'", "href").as_deref(), Some("b"));
        assert_eq!(attr_value(" href=c target=_blank", "target").as_deref(), Some("_blank"));
        assert_eq!(attr_value(" download href=d", "href").as_deref(), Some("d"));
        assert_eq!(attr_value(" title=x", "href"), None);
    }
}
