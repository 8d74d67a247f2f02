// src/core/html.rs
//
// Tolerant HTML scanner building a `dom::Document`. This is third-party,
// framework-generated markup; we never validate it, we just take what we can
// match (unclosed tags are closed implicitly, unknown constructs skipped).

use crate::core::dom::{Document, NodeId};
use crate::core::sanitize::normalize_entities;

const VOID_TAGS: &[&str] = &[
    "area", "base", "br", "col", "embed", "hr", "img", "input", "link", "meta",
    "param", "source", "track", "wbr",
];

pub fn parse_document(input: &str) -> Document {
    let mut doc = Document::new();
    let root = doc.root();
    parse_into(&mut doc, root, input);
    doc
}

/// Parse `input` as a fragment appended under `parent`. Used both by
/// `parse_document` and to simulate host-page subtree re-renders.
pub fn parse_into(doc: &mut Document, parent: NodeId, input: &str) {
    let bytes = input.as_bytes();
    let mut stack: Vec<NodeId> = vec![parent];
    let mut i = 0;

    while i < bytes.len() {
        if bytes[i] == b'<' {
            if input[i..].starts_with("<!--") {
                i = match input[i..].find("-->") {
                    Some(rel) => i + rel + 3,
                    None => bytes.len(),
                };
                continue;
            }
            if input[i..].starts_with("</") {
                let end = match input[i..].find('>') {
                    Some(rel) => i + rel,
                    None => break,
                };
                let name = input[i + 2..end].trim().to_ascii_lowercase();
                close_tag(doc, &mut stack, &name);
                i = end + 1;
                continue;
            }
            if input[i..].starts_with("<!") || input[i..].starts_with("<?") {
                i = match input[i..].find('>') {
                    Some(rel) => i + rel + 1,
                    None => bytes.len(),
                };
                continue;
            }
            if let Some((tag, self_closed, next)) = parse_open_tag(doc, input, i, *stack.last().unwrap()) {
                let name = doc.tag(tag).to_string();
                i = next;
                if name == "script" || name == "style" {
                    // raw content, skip to the matching close tag
                    let close = format!("</{name}");
                    if let Some(rel) = input[i..].to_ascii_lowercase().find(&close) {
                        i += rel;
                    } else {
                        i = bytes.len();
                    }
                    continue;
                }
                if !self_closed && !VOID_TAGS.contains(&name.as_str()) {
                    stack.push(tag);
                }
                continue;
            }
            // stray '<', treat as text
            i += 1;
            continue;
        }

        let text_end = input[i..].find('<').map(|rel| i + rel).unwrap_or(bytes.len());
        let raw = &input[i..text_end];
        if !raw.trim().is_empty() {
            let text = doc.create_text(&normalize_entities(raw));
            let top = *stack.last().unwrap();
            doc.append_child(top, text);
        }
        i = text_end;
    }
}

/// Returns (node, self_closed, index past '>'). None if the tag is malformed.
fn parse_open_tag(
    doc: &mut Document,
    input: &str,
    at: usize,
    parent: NodeId,
) -> Option<(NodeId, bool, usize)> {
    let bytes = input.as_bytes();
    let mut i = at + 1;

    let name_start = i;
    while i < bytes.len() && (bytes[i].is_ascii_alphanumeric() || bytes[i] == b'-') {
        i += 1;
    }
    if i == name_start {
        return None;
    }
    let name = input[name_start..i].to_ascii_lowercase();
    let node = doc.create_element(&name);

    let mut self_closed = false;
    loop {
        while i < bytes.len() && bytes[i].is_ascii_whitespace() {
            i += 1;
        }
        if i >= bytes.len() {
            break;
        }
        match bytes[i] {
            b'>' => {
                i += 1;
                break;
            }
            b'/' => {
                self_closed = true;
                i += 1;
            }
            _ => {
                let (attr_end, value_end) = parse_attr(doc, node, input, i);
                debug_assert!(value_end >= attr_end);
                i = value_end;
            }
        }
    }

    doc.append_child(parent, node);
    Some((node, self_closed, i))
}

/// Parses one `name`, `name=bare`, `name="v"` or `name='v'` attribute.
/// Returns (end of name, end of whole attribute).
fn parse_attr(doc: &mut Document, node: NodeId, input: &str, at: usize) -> (usize, usize) {
    let bytes = input.as_bytes();
    let mut i = at;
    while i < bytes.len() && !bytes[i].is_ascii_whitespace() && !matches!(bytes[i], b'=' | b'>' | b'/') {
        i += 1;
    }
    let name = &input[at..i];
    let name_end = i;

    if i < bytes.len() && bytes[i] == b'=' {
        i += 1;
        if i < bytes.len() && (bytes[i] == b'"' || bytes[i] == b'\'') {
            let quote = bytes[i];
            i += 1;
            let val_start = i;
            while i < bytes.len() && bytes[i] != quote {
                i += 1;
            }
            let value = normalize_entities(&input[val_start..i]);
            doc.set_attr(node, name, &value);
            if i < bytes.len() {
                i += 1; // closing quote
            }
        } else {
            let val_start = i;
            while i < bytes.len() && !bytes[i].is_ascii_whitespace() && bytes[i] != b'>' {
                i += 1;
            }
            doc.set_attr(node, name, &input[val_start..i]);
        }
    } else if !name.is_empty() {
        doc.set_attr(node, name, "");
    }
    (name_end, i.max(at + 1))
}

fn close_tag(doc: &Document, stack: &mut Vec<NodeId>, name: &str) {
    // Close the nearest matching open element; ignore unmatched closers.
    if let Some(pos) = stack.iter().rposition(|&n| doc.tag(n) == name) {
        if pos > 0 {
            stack.truncate(pos);
        }
    }
}

/// Flatten markup to its visible text. Used by the GUI to project section
/// markup into plain labels.
pub fn strip_tags(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    let mut in_tag = false;
    for ch in s.chars() {
        match ch {
            '<' => in_tag = true,
            '>' => in_tag = false,
            _ if !in_tag => out.push(ch),
            _ => {}
        }
    }
    normalize_entities(&out)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn builds_a_tree() {
        let doc = parse_document(
            r#"<div class="row"><h3>Fish</h3><input name="price" value="4.20"><input name="quantity" value=10></div>"#,
        );
        let root = doc.root();
        let row = doc.children(root)[0];
        assert_eq!(doc.tag(row), "div");
        assert!(doc.has_class(row, "row"));

        let price = doc
            .find_descendant(row, |d, n| d.is_input_named(n, "price"))
            .unwrap();
        assert_eq!(doc.value(price), "4.20");

        let qty = doc
            .find_descendant(row, |d, n| d.is_input_named(n, "quantity"))
            .unwrap();
        assert_eq!(doc.value(qty), "10");

        assert_eq!(doc.text_content(row), "Fish");
    }

    #[test]
    fn tolerates_comments_scripts_and_unclosed_tags() {
        let doc = parse_document(
            "<div><!-- note --><script>let x = '<div>';</script><p>one<p>two</div>",
        );
        let root = doc.root();
        assert!(doc.text_content(root).contains("one"));
        assert!(doc.text_content(root).contains("two"));
        assert!(!doc.text_content(root).contains("let x"));
    }

    #[test]
    fn entities_decoded_in_text_and_attrs() {
        let doc = parse_document(r#"<a href="/a?x=1&amp;y=2">Fish &amp; Chips</a>"#);
        let root = doc.root();
        let a = doc.children(root)[0];
        assert_eq!(doc.attr(a, "href"), Some("/a?x=1&y=2"));
        assert_eq!(doc.text_content(a), "Fish & Chips");
    }
}
