//! Candidate matching
//!
//! Aligns a source phrase against the extracted segments in one forward pass.
//! A cursor walks the phrase; for each segment a window anchored at the first
//! character this segment matched grows one character at a time for as long
//! as the segment still contains it. Whitespace in the phrase is free: it
//! advances the cursor without being looked up, which lets a phrase span tag
//! boundaries that dropped the literal space.
//!
//! There is no backtracking. Two resets recover from a false start instead:
//! - when a later segment contains the whole prefix matched so far, the
//!   match restarts there (the earlier partial match was a stale occurrence)
//! - when a segment contributes nothing at all, the match is abandoned
//!
//! The trade-off is linear time against completeness: documents that repeat
//! a prefix of the phrase in pathological ways may fail to anchor a phrase
//! that does occur.

use tracing::trace;

use super::extractor::Segment;
use super::whitespace::{collapse, contains_collapsed};
use crate::document::NodeId;

/// One segment's share of a match
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CoverEntry {
    pub node: NodeId,
    /// The part of the source phrase found in this segment, unmodified
    pub subphrase: String,
}

/// Ordered segment/sub-phrase pairs reconstructing a source phrase.
///
/// Either empty (no match) or complete; never a partial prefix.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Covering {
    entries: Vec<CoverEntry>,
}

impl Covering {
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn entries(&self) -> &[CoverEntry] {
        &self.entries
    }

    pub fn iter(&self) -> impl Iterator<Item = &CoverEntry> {
        self.entries.iter()
    }

    /// Sub-phrases joined in order
    pub fn text(&self) -> String {
        self.entries.iter().map(|e| e.subphrase.as_str()).collect()
    }
}

/// Find the covering of `source` over `segments`
pub fn find_covering(segments: &[Segment<'_>], source: &str) -> Covering {
    let source: Vec<char> = source.chars().collect();
    if source.iter().all(|c| c.is_whitespace()) {
        return Covering::default();
    }

    let mut entries: Vec<CoverEntry> = Vec::new();
    let mut cursor = 0;

    for segment in segments {
        let haystack = collapse(segment.text);

        // The matched prefix shows up whole in this segment: start over here
        if cursor > 0 {
            let prefix: String = source[..=cursor].iter().collect();
            let prefix = prefix.trim();
            if !prefix.is_empty() && contains_collapsed(&haystack, prefix) {
                trace!(position = segment.position, prefix, "restarting match");
                cursor = 0;
                entries.clear();
            }
        }

        let mut matches = 0;
        while cursor < source.len() {
            if source[cursor].is_whitespace() {
                matches += 1;
                cursor += 1;
                continue;
            }

            let window: String = source[cursor - matches..=cursor].iter().collect();
            if contains_collapsed(&haystack, &window) {
                matches += 1;
                cursor += 1;
                record(&mut entries, segment.node, window);
            } else {
                if matches == 0 {
                    trace!(position = segment.position, "segment breaks the match");
                    cursor = 0;
                    entries.clear();
                }
                break;
            }
        }

        if cursor >= source.len() {
            break;
        }
    }

    if cursor >= source.len() {
        Covering { entries }
    } else {
        Covering::default()
    }
}

fn record(entries: &mut Vec<CoverEntry>, node: NodeId, subphrase: String) {
    match entries.last_mut() {
        Some(last) if last.node == node => last.subphrase = subphrase,
        _ => entries.push(CoverEntry { node, subphrase }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::anchor::extract;
    use crate::config::LayoutConfig;
    use crate::document::{parse, Document};
    use crate::highlight::RegionMarkup;
    use crate::layout::FlowLayout;

    fn covering(doc: &Document, source: &str) -> Vec<(String, String)> {
        let layout = FlowLayout::new(LayoutConfig::default());
        let segments = extract(doc, doc.root(), &layout, &RegionMarkup::default());
        find_covering(&segments, source)
            .iter()
            .map(|e| {
                (
                    doc.text(e.node).unwrap_or_default().to_string(),
                    e.subphrase.clone(),
                )
            })
            .collect()
    }

    fn pairs(expected: &[(&str, &str)]) -> Vec<(String, String)> {
        expected
            .iter()
            .map(|(a, b)| (a.to_string(), b.to_string()))
            .collect()
    }

    #[test]
    fn test_two_segment_scenario() {
        let doc = parse("<body><p>Hello <b>world</b>, how are you?</p></body>").unwrap();
        assert_eq!(
            covering(&doc, "world, how"),
            pairs(&[("world", "world"), (", how are you?", ", how")])
        );
    }

    #[test]
    fn test_single_segment() {
        let doc = parse("<body><p>The quick brown fox</p></body>").unwrap();
        assert_eq!(
            covering(&doc, "quick brown"),
            pairs(&[("The quick brown fox", "quick brown")])
        );
    }

    #[test]
    fn test_three_segments_interior_fully_consumed() {
        let doc = parse("<body><p>alpha beta <em>gamma</em> delta epsilon</p></body>").unwrap();
        assert_eq!(
            covering(&doc, "beta gamma delta"),
            pairs(&[
                ("alpha beta ", "beta"),
                ("gamma", "gamma"),
                (" delta epsilon", "delta"),
            ])
        );
    }

    #[test]
    fn test_whitespace_across_tag_boundaries() {
        let doc = parse("<body><p><b>Hello</b><i>world</i></p></body>").unwrap();
        assert_eq!(
            covering(&doc, "Hello world"),
            pairs(&[("Hello", "Hello"), ("world", "world")])
        );
    }

    #[test]
    fn test_whitespace_runs_tolerated() {
        let doc = parse("<body><p>one   two\n three</p></body>").unwrap();
        let found = covering(&doc, "one two  three");
        assert_eq!(found.len(), 1);
        assert_eq!(found[0].1, "one two  three");
    }

    #[test]
    fn test_missing_phrase_is_empty() {
        let doc = parse("<body><p>Hello world</p></body>").unwrap();
        assert!(covering(&doc, "nonexistent phrase").is_empty());
    }

    #[test]
    fn test_partial_prefix_is_never_returned() {
        let doc = parse("<body><p>Hello world</p><p>and more</p></body>").unwrap();
        assert!(covering(&doc, "Hello zebra").is_empty());
    }

    #[test]
    fn test_empty_and_blank_source() {
        let doc = parse("<body><p>Hello world</p></body>").unwrap();
        assert!(covering(&doc, "").is_empty());
        assert!(covering(&doc, "   ").is_empty());
    }

    #[test]
    fn test_case_sensitive() {
        let doc = parse("<body><p>Hello world</p></body>").unwrap();
        assert!(covering(&doc, "hello world").is_empty());
    }

    #[test]
    fn test_repeated_phrase_restarts_on_later_occurrence() {
        let doc = parse("<body><p>the cat sat</p><p>the cat ran</p></body>").unwrap();
        assert_eq!(
            covering(&doc, "the cat ran"),
            pairs(&[("the cat ran", "the cat ran")])
        );
    }

    #[test]
    fn test_unrelated_segment_abandons_match() {
        let doc = parse("<body><p>Hello</p><p>zzz</p><p>Hello world</p></body>").unwrap();
        assert_eq!(
            covering(&doc, "Hello world"),
            pairs(&[("Hello world", "Hello world")])
        );
    }

    #[test]
    fn test_covering_text_reconstructs_phrase() {
        let doc = parse("<body><p>Hello <b>world</b>, how are you?</p></body>").unwrap();
        let layout = FlowLayout::new(LayoutConfig::default());
        let segments = extract(&doc, doc.root(), &layout, &RegionMarkup::default());
        let found = find_covering(&segments, "world, how");

        assert_eq!(found.len(), 2);
        assert_eq!(found.text(), "world, how");
    }

    // The restart check only asks whether a segment contains the matched
    // prefix, not whether the match could continue at the segment's start.
    // "x y x" does occur as "x" + "y x", but the second segment also holds
    // "x y" whole, so the match restarts there and runs out of segments.
    #[test]
    fn test_prefix_restart_edge_case() {
        let doc = parse("<body><p>x</p><p>y x y</p></body>").unwrap();
        assert!(covering(&doc, "x y x").is_empty());
    }
}
