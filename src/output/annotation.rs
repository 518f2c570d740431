//! This file provides the visual side of filtering: state classes on hidden
//! elements and the notice that lets the user reveal one of them.
//!
//! Every operation here is idempotent. Applying the same annotation twice
//! leaves the document exactly as applying it once.

use crate::common::validation::Issue;
use crate::input::document::{Document, NodeId};

/// Marks an element hidden with nothing left in its place.
pub const HIDDEN_CLASS: &str = "veil-hidden";
/// Marks an element collapsed behind a notice.
pub const BLURRED_CLASS: &str = "veil-blurred";
/// The notice element itself.
pub const NOTICE_CLASS: &str = "veil-notice";
/// The notice's content box, width-limited to its target.
pub const NOTICE_CONTENT_CLASS: &str = "veil-notice-content";
/// The button inside a notice that reveals its target.
pub const REVEAL_CLASS: &str = "veil-reveal";
/// Where a notice sits relative to its target: `inside` or `before`.
pub const PLACEMENT_ATTRIBUTE: &str = "data-veil-placement";
/// The id of the element a notice stands for. Position alone is not
/// enough: the page may insert content between a notice and its target.
pub const TARGET_ATTRIBUTE: &str = "data-veil-target";
/// Set on elements the user chose to reveal. They are never hidden again.
pub const EXEMPT_ATTRIBUTE: &str = "data-veil-exempt";

const NOTICE_MESSAGE: &str = "Hidden because it mentions a blacklisted phrase.";
const REVEAL_LABEL: &str = "Show anyway";

#[derive(Copy, Clone, Debug, PartialEq)]
pub enum Placement {
    /// First child of the target.
    Inside,
    /// Sibling immediately before the target.
    Before,
}

impl Placement {
    pub fn from_flag(put_inside: bool) -> Placement {
        if put_inside {
            Placement::Inside
        } else {
            Placement::Before
        }
    }

    fn as_str(&self) -> &'static str {
        match self {
            Placement::Inside => "inside",
            Placement::Before => "before",
        }
    }
}

pub fn is_exempt<D: Document + ?Sized>(document: &D, element: NodeId) -> bool {
    document.attribute(element, EXEMPT_ATTRIBUTE).is_some()
}

pub fn is_notice<D: Document + ?Sized>(document: &D, node: NodeId) -> bool {
    document.has_class(node, NOTICE_CLASS)
}

/// The element `notice` stands for, wherever the page has moved either.
pub fn notice_target<D: Document + ?Sized>(document: &D, notice: NodeId) -> Option<NodeId> {
    let value = document.attribute(notice, TARGET_ATTRIBUTE)?;
    value.parse::<usize>().ok().map(NodeId)
}

/// The notice already standing for `element`, if any.
fn existing_notice<D: Document + ?Sized>(document: &D, element: NodeId) -> Option<NodeId> {
    document
        .elements_with_class(NOTICE_CLASS)
        .into_iter()
        .find(|notice| notice_target(document, *notice) == Some(element))
}

/// Hides `element`, either completely or collapsed behind a notice.
///
/// # Arguments
/// * `hide_completely`: leave nothing behind instead of a notice
/// * `put_inside`: insert the notice as the first child of `element`
///   instead of as its preceding sibling
pub fn apply_hide<D: Document + ?Sized>(
    document: &mut D,
    element: NodeId,
    hide_completely: bool,
    put_inside: bool,
) -> Result<(), Issue> {
    if !document.is_element(element) {
        return Err(Issue::Error(format!(
            "node {} is not an element and cannot be hidden",
            element.0
        )));
    }
    if is_exempt(&*document, element) {
        debug!("node {} was revealed by the user; leaving it alone", element.0);
        return Ok(());
    }

    if hide_completely {
        document.add_class(element, HIDDEN_CLASS);
        return Ok(());
    }

    document.add_class(element, BLURRED_CLASS);
    let placement = Placement::from_flag(put_inside);
    if existing_notice(&*document, element).is_some() {
        return Ok(());
    }
    let notice = build_notice(document, element, placement);
    match placement {
        Placement::Inside => {
            let first = document.first_child(element);
            document.insert_before(element, notice, first)
        }
        Placement::Before => match document.parent(element) {
            Some(parent) => document.insert_before(parent, notice, Some(element)),
            None => Err(Issue::Warning(format!(
                "node {} has no parent to hold its notice",
                element.0
            ))),
        },
    }
}

fn build_notice<D: Document + ?Sized>(
    document: &mut D,
    element: NodeId,
    placement: Placement,
) -> NodeId {
    let notice = document.create_element("div");
    document.add_class(notice, NOTICE_CLASS);
    document.set_attribute(notice, PLACEMENT_ATTRIBUTE, placement.as_str());
    document.set_attribute(notice, TARGET_ATTRIBUTE, &element.0.to_string());

    let content = document.create_element("div");
    document.add_class(content, NOTICE_CONTENT_CLASS);
    if let Some(rect) = document.bounding_rect(element) {
        if rect.width > 0.0 {
            document.set_style(content, "max-width", &format!("{}px", rect.width));
        }
    }

    let message = document.create_text(NOTICE_MESSAGE);
    let button = document.create_element("button");
    document.add_class(button, REVEAL_CLASS);
    let label = document.create_text(REVEAL_LABEL);

    // Freshly created nodes always accept children.
    let _ = document.insert_before(button, label, None);
    let _ = document.insert_before(content, message, None);
    let _ = document.insert_before(content, button, None);
    let _ = document.insert_before(notice, content, None);
    notice
}

/// Handles the user activating a notice (or anything inside it): reveals the
/// notice's target, exempts it from future hiding and removes the notice.
///
/// Returns the revealed element.
pub fn reveal<D: Document + ?Sized>(document: &mut D, activated: NodeId) -> Result<NodeId, Issue> {
    let notice = match document
        .ancestry(activated)
        .into_iter()
        .find(|node| is_notice(&*document, *node))
    {
        Some(notice) => notice,
        None => {
            return Err(Issue::Warning(format!(
                "node {} is not part of a notice",
                activated.0
            )))
        }
    };
    let target = match notice_target(&*document, notice) {
        Some(target) => target,
        None => {
            return Err(Issue::Warning(format!(
                "notice {} has lost its target",
                notice.0
            )))
        }
    };

    document.remove(notice)?;
    document.remove_class(target, BLURRED_CLASS);
    document.remove_class(target, HIDDEN_CLASS);
    document.set_attribute(target, EXEMPT_ATTRIBUTE, "true");
    Ok(target)
}

/// Removes every state class and every notice from the document. User
/// exemptions are kept.
pub fn clear_all<D: Document + ?Sized>(document: &mut D) {
    for notice in document.elements_with_class(NOTICE_CLASS) {
        if let Err(issue) = document.remove(notice) {
            warn!("unable to remove notice {}: {}", notice.0, issue);
        }
    }
    for class in &[HIDDEN_CLASS, BLURRED_CLASS] {
        for element in document.elements_with_class(class) {
            document.remove_class(element, class);
        }
    }
}

/// Number of elements currently hidden or collapsed.
pub fn suppressed_count<D: Document + ?Sized>(document: &D) -> usize {
    let mut suppressed = document.elements_with_class(HIDDEN_CLASS);
    for element in document.elements_with_class(BLURRED_CLASS) {
        if !suppressed.contains(&element) {
            suppressed.push(element);
        }
    }
    suppressed.len()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::input::geometry::Rect;
    use crate::input::memory::{ElementSpec, MemoryDocument};

    fn document() -> MemoryDocument {
        MemoryDocument::from_spec(
            &ElementSpec::new("ul")
                .child(
                    ElementSpec::new("li")
                        .with_rect(Rect::new(0.0, 0.0, 420.0, 60.0))
                        .text("first")
                        .into(),
                )
                .child(ElementSpec::new("li").text("second").into()),
        )
    }

    fn items(document: &MemoryDocument) -> Vec<NodeId> {
        document
            .children(document.root())
            .into_iter()
            .filter(|node| !is_notice(document, *node))
            .collect()
    }

    #[test]
    fn test_hide_completely() {
        let mut document = document();
        let item = items(&document)[0];
        apply_hide(&mut document, item, true, false).unwrap();
        assert!(document.has_class(item, HIDDEN_CLASS));
        assert!(!document.has_class(item, BLURRED_CLASS));
        assert!(document.elements_with_class(NOTICE_CLASS).is_empty());
    }

    #[test]
    fn test_notice_before_is_idempotent() {
        let mut document = document();
        let item = items(&document)[0];
        apply_hide(&mut document, item, false, false).unwrap();
        apply_hide(&mut document, item, false, false).unwrap();
        assert!(document.has_class(item, BLURRED_CLASS));
        let notices = document.elements_with_class(NOTICE_CLASS);
        assert_eq!(notices.len(), 1);
        assert_eq!(document.previous_sibling(item), Some(notices[0]));
        assert_eq!(suppressed_count(&document), 1);
    }

    #[test]
    fn test_notice_inside_is_idempotent() {
        let mut document = document();
        let item = items(&document)[0];
        apply_hide(&mut document, item, false, true).unwrap();
        apply_hide(&mut document, item, false, true).unwrap();
        let notices = document.elements_with_class(NOTICE_CLASS);
        assert_eq!(notices.len(), 1);
        assert_eq!(document.first_child(item), Some(notices[0]));
    }

    #[test]
    fn test_notice_width_follows_target() {
        let mut document = document();
        let measured = items(&document)[0];
        apply_hide(&mut document, measured, false, false).unwrap();
        let content = document.elements_with_class(NOTICE_CONTENT_CLASS)[0];
        assert_eq!(document.style(content, "max-width"), Some(String::from("420px")));

        let unmeasured = items(&document)[1];
        apply_hide(&mut document, unmeasured, false, false).unwrap();
        let content = document.elements_with_class(NOTICE_CONTENT_CLASS)[1];
        assert_eq!(document.style(content, "max-width"), None);
    }

    #[test]
    fn test_reveal_exempts_target() {
        let mut document = document();
        let item = items(&document)[0];
        apply_hide(&mut document, item, false, false).unwrap();
        let button = document.elements_with_class(REVEAL_CLASS)[0];
        assert_eq!(reveal(&mut document, button).unwrap(), item);
        assert!(!document.has_class(item, BLURRED_CLASS));
        assert!(document.elements_with_class(NOTICE_CLASS).is_empty());
        assert!(is_exempt(&document, item));

        apply_hide(&mut document, item, false, false).unwrap();
        apply_hide(&mut document, item, true, false).unwrap();
        assert_eq!(suppressed_count(&document), 0);
        assert!(document.elements_with_class(NOTICE_CLASS).is_empty());
    }

    #[test]
    fn test_reveal_outside_notice() {
        let mut document = document();
        let item = items(&document)[0];
        assert!(reveal(&mut document, item).is_err());
    }

    #[test]
    fn test_displaced_notice_keeps_its_target() {
        let mut document = document();
        let item = items(&document)[0];
        apply_hide(&mut document, item, false, false).unwrap();
        let notice = document.elements_with_class(NOTICE_CLASS)[0];
        assert_eq!(notice_target(&document, notice), Some(item));

        let root = document.root();
        let inserted = document.create_element("li");
        document.insert_before(root, inserted, Some(item)).unwrap();
        assert_eq!(document.next_sibling(notice), Some(inserted));

        apply_hide(&mut document, item, false, false).unwrap();
        assert_eq!(document.elements_with_class(NOTICE_CLASS), vec![notice]);

        let button = document.elements_with_class(REVEAL_CLASS)[0];
        assert_eq!(reveal(&mut document, button), Ok(item));
        assert!(is_exempt(&document, item));
        assert!(!document.has_class(item, BLURRED_CLASS));
        assert!(!is_exempt(&document, inserted));
    }

    #[test]
    fn test_clear_all() {
        let mut document = document();
        let all = items(&document);
        apply_hide(&mut document, all[0], false, true).unwrap();
        apply_hide(&mut document, all[1], true, false).unwrap();
        assert_eq!(suppressed_count(&document), 2);
        clear_all(&mut document);
        assert_eq!(suppressed_count(&document), 0);
        assert!(document.elements_with_class(NOTICE_CLASS).is_empty());
        assert_eq!(document.children(all[0]).len(), 1);
    }

    #[test]
    fn test_detached_target() {
        let mut document = document();
        let placeholder = document.create_element("div");
        assert!(apply_hide(&mut document, placeholder, false, false).is_err());
        assert!(apply_hide(&mut document, placeholder, true, false).is_ok());
        let text = document.find_text("first").unwrap();
        assert!(apply_hide(&mut document, text, true, false).is_err());
    }
}
