//! Serializes a `MemoryDocument` back to HTML, annotations included, so the
//! effect of a scan can be inspected.

use htmlescape::{encode_attribute, encode_minimal};

use crate::input::document::{Document, NodeId};
use crate::input::memory::MemoryDocument;

pub fn render_html(document: &MemoryDocument) -> String {
    let mut output = String::new();
    render_node(document, document.root(), 0, &mut output);
    output
}

fn render_node(document: &MemoryDocument, node: NodeId, depth: usize, output: &mut String) {
    let indent = "  ".repeat(depth);
    if let Some(text) = document.text(node) {
        output.push_str(&format!("{}{}\n", indent, encode_minimal(&text)));
        return;
    }
    let tag = match document.tag_name(node) {
        Some(tag) => tag,
        None => return,
    };

    let mut attributes: Vec<(String, String)> = Vec::new();
    let classes = document.classes(node);
    if !classes.is_empty() {
        attributes.push((String::from("class"), classes.join(" ")));
    }
    attributes.extend(document.attributes(node));
    if let Some(style) = document.style_text(node) {
        attributes.push((String::from("style"), style));
    }

    output.push_str(&indent);
    output.push('<');
    output.push_str(&tag);
    for (name, value) in attributes {
        output.push_str(&format!(" {}=\"{}\"", name, encode_attribute(&value)));
    }
    output.push_str(">\n");
    for child in document.children(node) {
        render_node(document, child, depth + 1, output);
    }
    output.push_str(&format!("{}</{}>\n", indent, tag));
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::input::memory::ElementSpec;

    #[test]
    fn test_render() {
        let mut document = MemoryDocument::from_spec(
            &ElementSpec::new("p").with_class("note").text("fish & chips"),
        );
        let root = document.root();
        document.set_attribute(root, "title", "a \"quote\"");
        let html = render_html(&document);
        assert!(html.starts_with("<p class=\"note\" title=\""));
        assert!(html.contains("fish &amp; chips"));
        assert!(!html.contains("\"quote\""));
        assert!(html.ends_with("</p>\n"));
    }
}
