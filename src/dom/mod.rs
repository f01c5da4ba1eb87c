//! HTML parsing into an arena DOM.
//!
//! html5ever does the tokenizing and tree construction, so arbitrary tag soup
//! always yields a well-formed tree. [`Positions`] then numbers the tree in
//! preorder, which is document order, giving every element a closed interval
//! that contains exactly its descendants.

mod arena;
mod serialize;
mod tree_sink;

pub use arena::{Attribute, Children, Descendants, Dom, Node, NodeData, NodeId};
pub use serialize::{inner_html, inner_html_filtered, is_void_element};
pub use tree_sink::ArenaSink;

use html5ever::driver::ParseOpts;
use html5ever::parse_document;
use html5ever::tendril::TendrilSink;

/// Parse an HTML document or fragment.
pub fn parse_html(html: &str) -> Dom {
    let sink = ArenaSink::new();
    let sink = parse_document(sink, ParseOpts::default())
        .from_utf8()
        .one(html.as_bytes());
    if sink.error_count() > 0 {
        log::trace!("html5ever recovered from {} parse errors", sink.error_count());
    }
    sink.into_dom()
}

/// Preorder numbering of a DOM.
///
/// `start(n)` is the node's preorder index and `end(n)` the index of its last
/// descendant, so `[start, end]` of an ancestor encloses the intervals of all
/// its descendants and sibling intervals never overlap.
pub struct Positions {
    start: Vec<u32>,
    end: Vec<u32>,
    order: Vec<NodeId>,
}

impl Positions {
    pub fn new(dom: &Dom) -> Self {
        let mut start = vec![u32::MAX; dom.len()];
        let mut end = vec![u32::MAX; dom.len()];
        let mut order = Vec::with_capacity(dom.len());

        for id in dom.traverse() {
            start[id.0 as usize] = order.len() as u32;
            order.push(id);
        }
        // Reverse preorder visits every child before its parent.
        for &id in order.iter().rev() {
            let own = start[id.0 as usize];
            let last = dom
                .get(id)
                .map(|n| n.last_child)
                .filter(NodeId::is_some)
                .map_or(own, |c| end[c.0 as usize]);
            end[id.0 as usize] = last;
        }

        Self { start, end, order }
    }

    pub fn start(&self, id: NodeId) -> u32 {
        self.start[id.0 as usize]
    }

    pub fn end(&self, id: NodeId) -> u32 {
        self.end[id.0 as usize]
    }

    /// Node at a preorder index.
    pub fn node_at(&self, pos: u32) -> Option<NodeId> {
        self.order.get(pos as usize).copied()
    }

    /// Nodes in document order.
    pub fn order(&self) -> &[NodeId] {
        &self.order
    }
}
