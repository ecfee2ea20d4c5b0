//! Whitespace-collapsed comparison
//!
//! Runs of whitespace (including non-breaking spaces) compare equal to a
//! single space. Only comparisons are collapsed; matched text is always
//! reported and wrapped in its raw form.

use std::ops::Range;

/// Replace every run of whitespace with a single space
pub fn collapse(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    let mut in_space = false;
    for c in text.chars() {
        if c.is_whitespace() {
            if !in_space {
                out.push(' ');
            }
            in_space = true;
        } else {
            out.push(c);
            in_space = false;
        }
    }
    out
}

/// Does the already-collapsed `haystack` contain `needle` once collapsed?
pub fn contains_collapsed(haystack: &str, needle: &str) -> bool {
    haystack.contains(collapse(needle).as_str())
}

/// Find the first whitespace-tolerant occurrence of `needle` in `haystack`.
///
/// Returns the byte range in the raw `haystack`. A collapsed space matched at
/// either edge covers the whole whitespace run it stands for.
pub fn locate(haystack: &str, needle: &str) -> Option<Range<usize>> {
    let needle: Vec<char> = collapse(needle).chars().collect();
    if needle.is_empty() {
        return None;
    }

    // Collapsed haystack, with the raw byte span behind each collapsed char
    let mut chars: Vec<char> = Vec::with_capacity(haystack.len());
    let mut spans: Vec<Range<usize>> = Vec::with_capacity(haystack.len());
    for (offset, c) in haystack.char_indices() {
        let end = offset + c.len_utf8();
        if c.is_whitespace() {
            if chars.last() == Some(&' ') {
                if let Some(span) = spans.last_mut() {
                    span.end = end;
                }
                continue;
            }
            chars.push(' ');
        } else {
            chars.push(c);
        }
        spans.push(offset..end);
    }

    if needle.len() > chars.len() {
        return None;
    }
    (0..=chars.len() - needle.len())
        .find(|&start| chars[start..start + needle.len()] == needle[..])
        .map(|start| spans[start].start..spans[start + needle.len() - 1].end)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_collapse() {
        assert_eq!(collapse("a  b\n\t c\u{a0}d"), "a b c d");
        assert_eq!(collapse("  lead"), " lead");
    }

    #[test]
    fn test_contains_collapsed() {
        let haystack = collapse("one   two three");
        assert!(contains_collapsed(&haystack, "one two"));
        assert!(contains_collapsed(&haystack, "two\n three"));
        assert!(!contains_collapsed(&haystack, "onetwo"));
    }

    #[test]
    fn test_locate_exact() {
        assert_eq!(locate("Hello world", "world"), Some(6..11));
        assert_eq!(locate("Hello world", "planet"), None);
    }

    #[test]
    fn test_locate_first_occurrence() {
        assert_eq!(locate("the cat and the dog", "the"), Some(0..3));
    }

    #[test]
    fn test_locate_maps_whitespace_runs() {
        let haystack = "alpha   beta\u{a0}gamma";
        let range = locate(haystack, "alpha beta gamma").unwrap();
        assert_eq!(&haystack[range], haystack);

        let range = locate("x  y", "x ").unwrap();
        assert_eq!(range, 0..3);
    }

    #[test]
    fn test_locate_multibyte() {
        let haystack = "café crème";
        let range = locate(haystack, "crème").unwrap();
        assert_eq!(&haystack[range], "crème");
    }
}
