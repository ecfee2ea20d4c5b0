//! XHTML writer
//!
//! Serializes a `Document` back to markup with quick-xml's `Writer`.

use quick_xml::{
    events::{BytesDecl, BytesEnd, BytesStart, BytesText, Event},
    Writer,
};
use std::io::{Cursor, Write};

use super::error::DocumentError;
use super::tree::{Document, NodeId, NodeKind};

/// Serialize the whole document
pub fn write(doc: &Document) -> Result<String, DocumentError> {
    let mut writer = Writer::new(Cursor::new(Vec::new()));

    if doc.has_declaration() {
        writer.write_event(Event::Decl(BytesDecl::new("1.0", Some("utf-8"), None)))?;
    }
    write_node(&mut writer, doc, doc.root())?;

    let result = writer.into_inner().into_inner();
    Ok(String::from_utf8(result)?)
}

fn write_node<W: Write>(
    writer: &mut Writer<W>,
    doc: &Document,
    id: NodeId,
) -> Result<(), DocumentError> {
    match doc.kind(id) {
        NodeKind::Text(text) => {
            writer.write_event(Event::Text(BytesText::new(text)))?;
        }
        NodeKind::Element(element) => {
            let mut start = BytesStart::new(element.name.as_str());
            for (key, value) in &element.attributes {
                start.push_attribute((key.as_str(), value.as_str()));
            }

            let children = doc.children(id);
            if children.is_empty() && is_void(&element.name) {
                writer.write_event(Event::Empty(start))?;
                return Ok(());
            }

            writer.write_event(Event::Start(start))?;
            for &child in children {
                write_node(writer, doc, child)?;
            }
            writer.write_event(Event::End(BytesEnd::new(element.name.as_str())))?;
        }
    }
    Ok(())
}

/// Elements that never have content; everything else gets an explicit end
/// tag so the output also reads correctly as HTML
fn is_void(name: &str) -> bool {
    matches!(
        name,
        "area" | "base" | "br" | "col" | "embed" | "hr" | "img" | "input" | "link" | "meta"
            | "param" | "source" | "track" | "wbr"
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::document::parse;

    #[test]
    fn test_write_round_trip() {
        let markup = r#"<body><p class="lead">Hello <b>bold</b> world</p><br/></body>"#;
        let doc = parse(markup).unwrap();
        assert_eq!(write(&doc).unwrap(), markup);
    }

    #[test]
    fn test_write_escapes_text() {
        let doc = parse("<p>a &lt; b &amp; c</p>").unwrap();
        let written = write(&doc).unwrap();
        assert!(written.contains("a &lt; b &amp; c"));
    }

    #[test]
    fn test_write_declaration() {
        let doc = parse("<?xml version=\"1.0\" encoding=\"utf-8\"?><html/>").unwrap();
        assert!(write(&doc).unwrap().starts_with("<?xml"));
    }

    #[test]
    fn test_write_empty_non_void_element() {
        let doc = parse(r#"<body><a class="nav"/><hr/></body>"#).unwrap();
        assert_eq!(
            write(&doc).unwrap(),
            r#"<body><a class="nav"></a><hr/></body>"#
        );
    }
}
