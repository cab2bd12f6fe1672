//! Focusable-element queries
//!
//! Both queries are recomputed from the live tree on every call. Dialog and
//! rail content changes between key presses, so nothing here is cached.

use super::{attrs, Document, Element, NodeId, Tag};

/// Selection predicate for keyboard-reachable elements
///
/// Native controls, anchors with `href`, and anything carrying a tabindex,
/// minus elements with a negative tabindex and disabled elements.
pub fn is_interactive(element: &Element) -> bool {
    if element.is_disabled() {
        return false;
    }
    let tab_index = element.tab_index();
    if tab_index.is_some_and(|index| index < 0) {
        return false;
    }
    element.tag().is_native_interactive()
        || (element.tag() == Tag::Anchor && element.has_attribute(attrs::HREF))
        || tab_index.is_some()
}

/// Ordered focusable set of `container`
///
/// The container itself is never part of its own set. A missing, unknown or
/// detached container yields an empty set.
pub fn focusable_elements(doc: &Document, container: Option<NodeId>) -> Vec<NodeId> {
    let Some(container) = container else {
        return Vec::new();
    };
    if !doc.is_connected(container) {
        return Vec::new();
    }
    doc.descendants(container)
        .into_iter()
        .filter(|&node| doc.get(node).is_some_and(is_interactive))
        .collect()
}

/// Focusable descendants of `container` flagged with the rail `marker`
///
/// Narrower than [`focusable_elements`]: popover triggers and other controls
/// nested inside the rail are skipped unless they carry the marker.
pub fn rail_items(doc: &Document, container: Option<NodeId>, marker: &str) -> Vec<NodeId> {
    focusable_elements(doc, container)
        .into_iter()
        .filter(|&node| {
            doc.attribute(node, marker)
                .is_some_and(|value| value != "false")
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    const MARKER: &str = "data-rail-item";

    fn build() -> (Document, NodeId) {
        let mut doc = Document::new();
        let panel = doc
            .append(doc.body(), Element::new(Tag::Div).with_id("panel"))
            .unwrap();
        doc.append(panel, Element::new(Tag::Span).with_text("Title")).unwrap();
        doc.append(panel, Element::new(Tag::Input).with_id("name")).unwrap();
        let row = doc.append(panel, Element::new(Tag::Div)).unwrap();
        doc.append(row, Element::new(Tag::Anchor).with_id("docs").with_attr(attrs::HREF, "/docs"))
            .unwrap();
        doc.append(row, Element::new(Tag::Anchor).with_id("placeholder")).unwrap();
        doc.append(row, Element::new(Tag::Div).with_id("card").with_attr(attrs::TABINDEX, "0"))
            .unwrap();
        doc.append(row, Element::new(Tag::Button).with_id("hidden").with_attr(attrs::TABINDEX, "-1"))
            .unwrap();
        doc.append(panel, Element::new(Tag::Select).with_id("theme")).unwrap();
        doc.append(panel, Element::new(Tag::Textarea).with_id("notes")).unwrap();
        doc.append(panel, Element::new(Tag::Button).with_id("off").with_attr(attrs::DISABLED, ""))
            .unwrap();
        doc.append(panel, Element::new(Tag::Button).with_id("save")).unwrap();
        (doc, panel)
    }

    fn ids(doc: &Document, nodes: &[NodeId]) -> Vec<String> {
        nodes
            .iter()
            .filter_map(|&n| doc.get(n).and_then(Element::id).map(str::to_string))
            .collect()
    }

    #[test]
    fn test_focusable_elements_in_document_order() {
        let (doc, panel) = build();
        let set = focusable_elements(&doc, Some(panel));
        assert_eq!(
            ids(&doc, &set),
            vec!["name", "docs", "card", "theme", "notes", "save"]
        );
    }

    #[test]
    fn test_container_excluded_from_own_set() {
        let mut doc = Document::new();
        let dialog = doc
            .append(doc.body(), Element::new(Tag::Dialog).with_attr(attrs::TABINDEX, "0"))
            .unwrap();
        assert!(focusable_elements(&doc, Some(dialog)).is_empty());
    }

    #[test]
    fn test_missing_or_detached_container_is_empty() {
        let (mut doc, panel) = build();
        assert!(focusable_elements(&doc, None).is_empty());

        doc.remove(panel).unwrap();
        assert!(focusable_elements(&doc, Some(panel)).is_empty());
    }

    #[test]
    fn test_set_follows_live_changes() {
        let (mut doc, panel) = build();
        let before = focusable_elements(&doc, Some(panel)).len();

        let extra = doc.append(panel, Element::new(Tag::Button)).unwrap();
        assert_eq!(focusable_elements(&doc, Some(panel)).len(), before + 1);

        doc.set_attribute(extra, attrs::TABINDEX, "-1").unwrap();
        assert_eq!(focusable_elements(&doc, Some(panel)).len(), before);
    }

    #[test]
    fn test_rail_items_only_marked() {
        let mut doc = Document::new();
        let rail = doc.append(doc.body(), Element::new(Tag::Nav)).unwrap();
        doc.append(rail, Element::new(Tag::Button).with_id("x").with_attr(MARKER, ""))
            .unwrap();
        let popover = doc.append(rail, Element::new(Tag::Div)).unwrap();
        doc.append(popover, Element::new(Tag::Button).with_id("menu")).unwrap();
        doc.append(rail, Element::new(Tag::Button).with_id("y").with_attr(MARKER, "true"))
            .unwrap();
        doc.append(rail, Element::new(Tag::Button).with_id("off").with_attr(MARKER, "false"))
            .unwrap();
        doc.append(
            rail,
            Element::new(Tag::Button)
                .with_id("skipped")
                .with_attr(MARKER, "")
                .with_attr(attrs::TABINDEX, "-1"),
        )
        .unwrap();

        let items = rail_items(&doc, Some(rail), MARKER);
        assert_eq!(ids(&doc, &items), vec!["x", "y"]);
    }
}
