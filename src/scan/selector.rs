//! Chooses the element to hide for a matching text node.
//!
//! Pages that are worth filtering are mostly feeds: a column of cards, a
//! list of comments, a row of tiles. The element to hide is therefore the
//! ancestor that repeats, i.e. the one with enough similar-looking siblings.

use crate::input::document::{Document, NodeId};
use crate::input::geometry::is_similar;

/// Number of similar siblings at which an element counts as a feed entry.
/// Scores saturate here.
pub const FEED_THRESHOLD: usize = 3;

/// Score of a list item, above any geometric score.
pub const LIST_ITEM_SCORE: usize = FEED_THRESHOLD + 1;

/// Scores how much `node` looks like one entry of a feed.
pub fn feed_score<D: Document + ?Sized>(document: &D, node: NodeId) -> usize {
    if document.tag_name(node).as_ref().map(String::as_str) == Some("li") {
        return LIST_ITEM_SCORE;
    }
    let rect = match document.bounding_rect(node) {
        Some(rect) if rect.height > 0.0 => rect,
        _ => return 0,
    };
    let parent = match document.parent(node) {
        Some(parent) => parent,
        None => return 0,
    };
    let similar = document
        .children(parent)
        .into_iter()
        .filter(|sibling| *sibling != node)
        .filter_map(|sibling| document.bounding_rect(sibling))
        .filter(|sibling_rect| is_similar(&rect, sibling_rect))
        .count();
    similar.min(FEED_THRESHOLD)
}

/// Selects the content unit to hide for `node`. Always returns an element;
/// when nothing fits, the result is a detached placeholder so callers never
/// need a special case.
///
/// Candidates are scanned from the root inward and the first best score
/// wins, so on a tie the outermost candidate is kept.
pub fn select_content_unit<D: Document + ?Sized>(document: &mut D, node: NodeId) -> NodeId {
    let mut chain = document.ancestry(node);
    chain.reverse();

    let mut best: Option<NodeId> = None;
    let mut best_score = 0;
    for candidate in chain {
        let score = feed_score(&*document, candidate);
        if score > best_score {
            best_score = score;
            best = Some(candidate);
        }
    }

    let chosen = match best {
        Some(candidate) => candidate,
        None => {
            debug!("no feed-like ancestor for node {}, using its parent", node.0);
            match document.parent_element(node) {
                Some(parent) => parent,
                None => return placeholder(document, node),
            }
        }
    };

    if document.is_element(chosen) {
        chosen
    } else {
        match document.parent_element(chosen) {
            Some(parent) => parent,
            None => placeholder(document, node),
        }
    }
}

fn placeholder<D: Document + ?Sized>(document: &mut D, node: NodeId) -> NodeId {
    warn!(
        "node {} has no element ancestor; hiding a detached placeholder instead",
        node.0
    );
    document.create_element("div")
}
