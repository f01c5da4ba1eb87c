//! Media reference extraction.

use crate::dom::{Dom, NodeId, parse_html};
use crate::model::{MediaKind, MediaReference};

/// Collect media references from HTML.
///
/// Order is fixed by element group: every `img[src]`, then `audio[src]`,
/// `audio source[src]`, `video[src]` and `video source[src]`, each group in
/// document order. Duplicates are kept; resolution handles them per URL.
pub fn extract_media(html: &str) -> Vec<MediaReference> {
    let dom = parse_html(html);
    extract_from_dom(&dom)
}

fn extract_from_dom(dom: &Dom) -> Vec<MediaReference> {
    let mut refs = Vec::new();

    let mut push_srcs = |nodes: &mut dyn Iterator<Item = NodeId>, kind: MediaKind| {
        for id in nodes {
            if let Some(src) = dom.attr_value(id, "src") {
                refs.push(MediaReference::unresolved(src, kind));
            }
        }
    };

    push_srcs(&mut elements(dom, "img"), MediaKind::Image);
    push_srcs(&mut elements(dom, "audio"), MediaKind::Audio);
    push_srcs(&mut sources_within(dom, "audio"), MediaKind::Audio);
    push_srcs(&mut elements(dom, "video"), MediaKind::Video);
    push_srcs(&mut sources_within(dom, "video"), MediaKind::Video);

    refs
}

fn elements<'a>(dom: &'a Dom, tag: &'a str) -> impl Iterator<Item = NodeId> + 'a {
    dom.traverse().filter(move |&id| dom.is_tag(id, tag))
}

/// `<source>` elements with a `parent_tag` ancestor.
fn sources_within<'a>(dom: &'a Dom, parent_tag: &'a str) -> impl Iterator<Item = NodeId> + 'a {
    elements(dom, "source").filter(move |&id| dom.ancestors(id).any(|a| dom.is_tag(a, parent_tag)))
}
