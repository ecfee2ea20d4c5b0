//! Streaming markup passes using lol_html
//!
//! These run on serialized markup before it is parsed into a tree: one pass
//! removes active content, the other strips previously rendered highlight
//! regions so a document can be re-anchored from a clean slate.

use lol_html::{element, rewrite_str, RewriteStrSettings};

use crate::highlight::RegionMarkup;

/// Errors during markup rewriting
#[derive(Debug, thiserror::Error)]
pub enum MarkupError {
    #[error("HTML rewrite failed: {0}")]
    RewriteError(String),
}

/// Elements whose content must never reach the segment extractor
const ACTIVE_ELEMENTS: [&str; 6] = ["script", "style", "noscript", "iframe", "object", "embed"];

/// Attributes that may carry a navigable URL
const URL_ATTRIBUTES: [&str; 4] = ["href", "src", "xlink:href", "action"];

const SCRIPT_SCHEMES: [&str; 2] = ["javascript:", "vbscript:"];

/// Drop active content: scripting and embedding elements with their text,
/// every `on*` handler attribute, and script URLs
pub fn sanitize_html(html: &str) -> Result<String, MarkupError> {
    let mut handlers: Vec<_> = ACTIVE_ELEMENTS
        .iter()
        .map(|tag| {
            element!(tag, |el| {
                el.remove();
                Ok(())
            })
        })
        .collect();

    handlers.push(element!("*", |el| {
        let events: Vec<String> = el
            .attributes()
            .iter()
            .map(|attr| attr.name())
            .filter(|name| name.starts_with("on"))
            .collect();
        for name in events {
            el.remove_attribute(&name);
        }

        for name in URL_ATTRIBUTES {
            if el.get_attribute(name).is_some_and(|url| is_script_url(&url)) {
                el.remove_attribute(name);
            }
        }
        Ok(())
    }));

    rewrite_str(
        html,
        RewriteStrSettings {
            element_content_handlers: handlers,
            ..RewriteStrSettings::default()
        },
    )
    .map_err(|e| MarkupError::RewriteError(e.to_string()))
}

/// Browsers ignore embedded whitespace and control characters in a scheme
fn is_script_url(url: &str) -> bool {
    let scheme: String = url
        .chars()
        .filter(|c| !c.is_whitespace() && !c.is_control())
        .take(16)
        .collect::<String>()
        .to_ascii_lowercase();
    SCRIPT_SCHEMES.iter().any(|s| scheme.starts_with(s))
}

/// Remove rendered highlight regions from markup.
///
/// Regions are unwrapped in place (their text stays), note glyphs and
/// navigation markers are dropped.
pub fn strip_regions(html: &str, markup: &RegionMarkup) -> Result<String, MarkupError> {
    let icon_selector = format!("svg.{}", markup.note_icon_class);
    let nav_selector = format!("a.{}[{}]", markup.nav_class, markup.id_attribute);
    let region_selector = format!("{}[{}]", markup.region_tag, markup.id_attribute);

    let result = rewrite_str(
        html,
        RewriteStrSettings {
            element_content_handlers: vec![
                element!(icon_selector, |el| {
                    el.remove();
                    Ok(())
                }),
                element!(nav_selector, |el| {
                    el.remove();
                    Ok(())
                }),
                element!(region_selector, |el| {
                    el.remove_and_keep_content();
                    Ok(())
                }),
            ],
            ..RewriteStrSettings::default()
        },
    )
    .map_err(|e| MarkupError::RewriteError(e.to_string()))?;

    Ok(result)
}
