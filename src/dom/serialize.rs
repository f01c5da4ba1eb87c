//! Serialize DOM subtrees back to HTML fragments.
//!
//! Used to hand the inline content of a block element to the inline mark
//! parser, which works on markup text.

use std::fmt::Write;

use super::arena::{Dom, NodeData, NodeId};

const VOID_ELEMENTS: &[&str] = &[
    "area", "base", "br", "col", "embed", "hr", "img", "input", "link", "meta", "source", "track",
    "wbr",
];

pub fn is_void_element(tag: &str) -> bool {
    VOID_ELEMENTS.contains(&tag)
}

enum Step {
    Open(NodeId),
    Close(NodeId),
}

/// Markup of a node's children.
pub fn inner_html(dom: &Dom, id: NodeId) -> String {
    inner_html_filtered(dom, id, |_| true)
}

/// Markup of the descendants of `id` for which `keep` returns true.
///
/// The filter applies at every depth: a rejected node is dropped with its
/// whole subtree, and a kept element is opened and closed around whichever
/// of its children are kept in turn.
pub fn inner_html_filtered<F>(dom: &Dom, id: NodeId, keep: F) -> String
where
    F: Fn(NodeId) -> bool,
{
    let mut out = String::new();
    let mut stack: Vec<Step> = dom
        .children(id)
        .filter(|&c| keep(c))
        .collect::<Vec<_>>()
        .into_iter()
        .rev()
        .map(Step::Open)
        .collect();

    while let Some(step) = stack.pop() {
        match step {
            Step::Open(node) => write_open(dom, node, &keep, &mut out, &mut stack),
            Step::Close(node) => {
                if let Some(tag) = dom.tag_name(node) {
                    let _ = write!(out, "</{tag}>");
                }
            }
        }
    }
    out
}

fn write_open<F>(dom: &Dom, node: NodeId, keep: &F, out: &mut String, stack: &mut Vec<Step>)
where
    F: Fn(NodeId) -> bool,
{
    let Some(data) = dom.get(node).map(|n| &n.data) else {
        return;
    };
    match data {
        NodeData::Text(text) => escape_text(text, out),
        NodeData::Comment(text) => {
            let _ = write!(out, "<!--{text}-->");
        }
        NodeData::Element { name, attrs } => {
            let tag = name.local.as_ref();
            out.push('<');
            out.push_str(tag);
            for attr in attrs {
                let _ = write!(out, " {}=\"", attr.name.local.as_ref());
                escape_attr(&attr.value, out);
                out.push('"');
            }
            out.push('>');
            if is_void_element(tag) {
                return;
            }
            stack.push(Step::Close(node));
            let children: Vec<_> = dom.children(node).filter(|&c| keep(c)).collect();
            stack.extend(children.into_iter().rev().map(Step::Open));
        }
        NodeData::Document | NodeData::Doctype => {}
    }
}

fn escape_text(text: &str, out: &mut String) {
    for c in text.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '\u{a0}' => out.push_str("&nbsp;"),
            _ => out.push(c),
        }
    }
}

fn escape_attr(value: &str, out: &mut String) {
    for c in value.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '"' => out.push_str("&quot;"),
            _ => out.push(c),
        }
    }
}
