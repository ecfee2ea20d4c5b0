//! Line-flow layout
//!
//! Block elements start a new line, text advances a column cursor and wraps
//! at a fixed column count, and every line has the same height. Good enough
//! to place navigation markers and scroll targets without a browser.

use std::collections::HashMap;

use super::Viewport;
use crate::config::LayoutConfig;
use crate::document::{Document, Element, NodeId, NodeKind};

/// Elements that never produce a layout box
const NON_RENDERED: &[&str] = &["head", "script", "style", "template", "noscript", "title"];

/// Elements laid out as blocks
const BLOCKS: &[&str] = &[
    "address", "article", "aside", "blockquote", "body", "dd", "div", "dl", "dt", "figcaption",
    "figure", "footer", "h1", "h2", "h3", "h4", "h5", "h6", "header", "hr", "html", "li", "main",
    "nav", "ol", "p", "pre", "section", "table", "tr", "ul",
];

/// Deterministic `Viewport` over a line-flow model
#[derive(Debug, Clone)]
pub struct FlowLayout {
    config: LayoutConfig,
    scroll: f64,
}

#[derive(Debug, Default)]
struct Cursor {
    line: usize,
    column: usize,
}

impl Cursor {
    fn break_line(&mut self) {
        if self.column > 0 {
            self.line += 1;
            self.column = 0;
        }
    }

    fn advance(&mut self, chars: usize, columns: usize) {
        self.column += chars;
        while columns > 0 && self.column > columns {
            self.line += 1;
            self.column -= columns;
        }
    }

    fn lines_used(&self) -> usize {
        self.line + usize::from(self.column > 0)
    }
}

struct Flow {
    tops: HashMap<NodeId, f64>,
    height: f64,
}

impl FlowLayout {
    pub fn new(config: LayoutConfig) -> Self {
        Self { config, scroll: 0.0 }
    }

    fn flow(&self, doc: &Document) -> Flow {
        let mut cursor = Cursor::default();
        let mut tops = HashMap::new();
        self.walk(doc, doc.root(), &mut cursor, &mut tops);

        let height = cursor.lines_used() as f64 * self.config.line_height;
        Flow {
            tops,
            height: height.max(self.config.viewport_height),
        }
    }

    fn walk(
        &self,
        doc: &Document,
        id: NodeId,
        cursor: &mut Cursor,
        tops: &mut HashMap<NodeId, f64>,
    ) {
        match doc.kind(id) {
            NodeKind::Text(text) => {
                if text.trim().is_empty() && cursor.column == 0 {
                    return;
                }
                tops.insert(id, cursor.line as f64 * self.config.line_height);
                cursor.advance(collapsed_len(text), self.config.columns);
            }
            NodeKind::Element(element) => {
                if !has_box(element) {
                    return;
                }
                let block = BLOCKS.contains(&element.name.as_str());
                if block {
                    cursor.break_line();
                }
                tops.insert(id, cursor.line as f64 * self.config.line_height);
                for &child in doc.children(id) {
                    self.walk(doc, child, cursor, tops);
                }
                if block {
                    cursor.break_line();
                }
            }
        }
    }
}

impl Viewport for FlowLayout {
    fn is_rendered(&self, doc: &Document, node: NodeId) -> bool {
        if !doc.is_attached(node) {
            return false;
        }
        let mut current = Some(node);
        while let Some(id) = current {
            if let Some(element) = doc.element(id) {
                if !has_box(element) {
                    return false;
                }
            }
            current = doc.parent(id);
        }
        true
    }

    fn bounding_top(&self, doc: &Document, node: NodeId) -> f64 {
        let top = self.flow(doc).tops.get(&node).copied().unwrap_or(0.0);
        top - self.scroll
    }

    fn scroll_offset(&self) -> f64 {
        self.scroll
    }

    fn document_height(&self, doc: &Document) -> f64 {
        self.flow(doc).height
    }

    fn scroll_into_view(&mut self, doc: &Document, node: NodeId) {
        let flow = self.flow(doc);
        let Some(&top) = flow.tops.get(&node) else {
            return;
        };
        let target = top - self.config.viewport_height / 2.0 + self.config.line_height / 2.0;
        let max_scroll = (flow.height - self.config.viewport_height).max(0.0);
        self.scroll = target.clamp(0.0, max_scroll);
    }
}

fn has_box(element: &Element) -> bool {
    !NON_RENDERED.contains(&element.name.as_str())
        && !element.has_attribute("hidden")
        && !element.attribute("style").map(display_none).unwrap_or(false)
}

fn display_none(style: &str) -> bool {
    style.split(';').any(|declaration| {
        declaration
            .split_once(':')
            .map(|(name, value)| {
                name.trim().eq_ignore_ascii_case("display") && value.trim() == "none"
            })
            .unwrap_or(false)
    })
}

/// Character count with whitespace runs counted once
fn collapsed_len(text: &str) -> usize {
    let mut count = 0;
    let mut in_space = false;
    for c in text.chars() {
        if c.is_whitespace() {
            if !in_space {
                count += 1;
            }
            in_space = true;
        } else {
            count += 1;
            in_space = false;
        }
    }
    count
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::document::parse;

    fn layout() -> FlowLayout {
        FlowLayout::new(LayoutConfig {
            line_height: 20.0,
            columns: 10,
            viewport_height: 100.0,
        })
    }

    #[test]
    fn test_hidden_elements_have_no_box() {
        let doc = parse(concat!(
            "<body><p hidden=\"\">a</p><p style=\"color: red; display : none\">b</p>",
            "<script>c</script><div><p>d</p></div></body>"
        ))
        .unwrap();
        let children = doc.children(doc.root()).to_vec();
        let layout = layout();

        assert!(!layout.is_rendered(&doc, children[0]));
        assert!(!layout.is_rendered(&doc, children[1]));
        assert!(!layout.is_rendered(&doc, children[2]));
        assert!(layout.is_rendered(&doc, children[3]));
    }

    #[test]
    fn test_detached_node_is_not_rendered() {
        let mut doc = parse("<body><p>a</p></body>").unwrap();
        let p = doc.children(doc.root())[0];
        doc.detach(p);
        assert!(!layout().is_rendered(&doc, p));
    }

    #[test]
    fn test_blocks_and_wrapping() {
        // "0123456789abcde" wraps onto a second line at 10 columns
        let doc = parse("<body><p>0123456789abcde</p><p>next</p></body>").unwrap();
        let second = doc.children(doc.root())[1];
        let layout = layout();

        assert_eq!(layout.bounding_top(&doc, second), 40.0);
        assert_eq!(layout.document_height(&doc), 100.0);
    }

    #[test]
    fn test_scroll_into_view_centers_and_clamps() {
        let body: String = (0..30).map(|i| format!("<p>line {}</p>", i)).collect();
        let doc = parse(&format!("<body>{}</body>", body)).unwrap();
        let paragraphs = doc.children(doc.root()).to_vec();
        let mut layout = layout();

        layout.scroll_into_view(&doc, paragraphs[10]);
        assert_eq!(layout.scroll_offset(), 160.0);
        assert_eq!(layout.bounding_top(&doc, paragraphs[10]), 40.0);

        layout.scroll_into_view(&doc, paragraphs[29]);
        assert_eq!(layout.scroll_offset(), 500.0);

        layout.scroll_into_view(&doc, paragraphs[0]);
        assert_eq!(layout.scroll_offset(), 0.0);
    }

    #[test]
    fn test_collapsed_len() {
        assert_eq!(collapsed_len("a  b\n\tc"), 5);
    }
}
