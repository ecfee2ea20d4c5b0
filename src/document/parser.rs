//! XHTML parser
//!
//! Builds a `Document` from XHTML/XML markup with quick-xml. Comments,
//! processing instructions and doctypes are dropped. HTML named entities
//! common in book and article markup are resolved on top of the XML ones.

use quick_xml::events::{BytesStart, Event};
use quick_xml::Reader;

use super::error::DocumentError;
use super::tree::{Document, Element, NodeId};

/// Parse markup into a document tree
pub fn parse(markup: &str) -> Result<Document, DocumentError> {
    let mut reader = Reader::from_str(markup);
    reader.check_end_names(false);

    let mut doc: Option<Document> = None;
    let mut open: Vec<NodeId> = Vec::new();
    let mut declaration = false;

    loop {
        match reader.read_event()? {
            Event::Decl(_) => declaration = true,
            Event::Start(start) => {
                let element = element_from(&start)?;
                let id = insert_element(&mut doc, &open, element)?;
                open.push(id);
            }
            Event::Empty(start) => {
                let element = element_from(&start)?;
                insert_element(&mut doc, &open, element)?;
            }
            Event::End(end) => {
                let found = String::from_utf8_lossy(end.name().as_ref()).into_owned();
                let id = open
                    .pop()
                    .ok_or_else(|| DocumentError::Malformed(format!("unexpected </{}>", found)))?;
                let expected = doc
                    .as_ref()
                    .and_then(|d| d.tag_name(id))
                    .unwrap_or_default()
                    .to_string();
                if expected != found {
                    return Err(DocumentError::MismatchedEndTag { expected, found });
                }
            }
            Event::Text(text) => {
                let value = text.unescape_with(html_entity)?.into_owned();
                insert_text(&mut doc, &open, value)?;
            }
            Event::CData(data) => {
                let value = String::from_utf8(data.into_inner().into_owned())?;
                insert_text(&mut doc, &open, value)?;
            }
            Event::Eof => break,
            _ => {}
        }
    }

    if let Some(&unclosed) = open.last() {
        let name = doc
            .as_ref()
            .and_then(|d| d.tag_name(unclosed))
            .unwrap_or_default()
            .to_string();
        return Err(DocumentError::Unclosed(name));
    }

    let mut doc = doc.ok_or(DocumentError::Empty)?;
    doc.set_declaration(declaration);
    Ok(doc)
}

fn element_from(start: &BytesStart<'_>) -> Result<Element, DocumentError> {
    let mut element = Element::new(String::from_utf8_lossy(start.name().as_ref()).into_owned());
    for attr in start.html_attributes() {
        let attr = attr.map_err(quick_xml::Error::from)?;
        let key = String::from_utf8_lossy(attr.key.as_ref()).into_owned();
        let value = attr.unescape_value_with(html_entity)?.into_owned();
        element.attributes.push((key, value));
    }
    Ok(element)
}

fn insert_element(
    doc: &mut Option<Document>,
    open: &[NodeId],
    element: Element,
) -> Result<NodeId, DocumentError> {
    match (doc.as_mut(), open.last()) {
        (Some(doc), Some(&parent)) => {
            let id = doc.create_element(element);
            doc.append_child(parent, id);
            Ok(id)
        }
        (Some(_), None) => Err(DocumentError::Malformed(format!(
            "second root element <{}>",
            element.name
        ))),
        (None, _) => {
            let created = Document::new(element);
            let root = created.root();
            *doc = Some(created);
            Ok(root)
        }
    }
}

fn insert_text(
    doc: &mut Option<Document>,
    open: &[NodeId],
    value: String,
) -> Result<(), DocumentError> {
    match (doc.as_mut(), open.last()) {
        (Some(doc), Some(&parent)) => {
            let id = doc.create_text(value);
            doc.append_child(parent, id);
            Ok(())
        }
        // Whitespace around the root element carries no content
        _ if value.trim().is_empty() => Ok(()),
        _ => Err(DocumentError::Malformed(format!(
            "text outside the root element: {:?}",
            value.trim()
        ))),
    }
}

/// Resolve HTML named entities that plain XML does not define
fn html_entity(name: &str) -> Option<&'static str> {
    let resolved = match name {
        "nbsp" => "\u{a0}",
        "shy" => "\u{ad}",
        "ensp" => "\u{2002}",
        "emsp" => "\u{2003}",
        "thinsp" => "\u{2009}",
        "ndash" => "\u{2013}",
        "mdash" => "\u{2014}",
        "lsquo" => "\u{2018}",
        "rsquo" => "\u{2019}",
        "ldquo" => "\u{201c}",
        "rdquo" => "\u{201d}",
        "hellip" => "\u{2026}",
        "laquo" => "\u{ab}",
        "raquo" => "\u{bb}",
        "copy" => "\u{a9}",
        _ => return None,
    };
    Some(resolved)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_nested_inline() {
        let doc = parse("<body><p>Hello <b>bold</b> world</p></body>").unwrap();
        let p = doc.children(doc.root())[0];

        assert_eq!(doc.tag_name(p), Some("p"));
        assert_eq!(doc.children(p).len(), 3);
        assert_eq!(doc.text_content(p), "Hello bold world");
    }

    #[test]
    fn test_parse_attributes_and_entities() {
        let doc = parse(r#"<div class="note" data-x="a &amp; b">one&nbsp;two &mdash; three</div>"#)
            .unwrap();
        let root = doc.root();

        assert_eq!(doc.attribute(root, "class"), Some("note"));
        assert_eq!(doc.attribute(root, "data-x"), Some("a & b"));
        assert_eq!(doc.text_content(root), "one\u{a0}two \u{2014} three");
    }

    #[test]
    fn test_parse_valueless_attribute() {
        let doc = parse("<body><p hidden>secret</p></body>").unwrap();
        let p = doc.children(doc.root())[0];
        assert!(doc.has_attribute(p, "hidden"));
    }

    #[test]
    fn test_parse_declaration_and_comments() {
        let doc = parse("<?xml version=\"1.0\"?>\n<!-- note --><html><body>x</body></html>")
            .unwrap();
        assert!(doc.has_declaration());
        assert_eq!(doc.text_content(doc.root()), "x");
    }

    #[test]
    fn test_parse_mismatched_end_tag() {
        let err = parse("<body><p>text</div></body>").unwrap_err();
        assert!(matches!(err, DocumentError::MismatchedEndTag { .. }));
    }

    #[test]
    fn test_parse_unclosed() {
        let err = parse("<body><p>text").unwrap_err();
        assert!(matches!(err, DocumentError::Unclosed(_)));
    }

    #[test]
    fn test_parse_empty() {
        assert!(matches!(parse("   ").unwrap_err(), DocumentError::Empty));
    }
}
