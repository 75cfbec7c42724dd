//! Link-facet detection.
//!
//! Bluesky does not linkify post text server-side; clients attach facets
//! addressed by UTF-8 byte offsets. This covers the link half of the
//! official SDK's `RichText.detectFacets` — mentions and hashtags are not
//! needed for mirrored bookmarks.

use std::sync::OnceLock;

use regex::Regex;

use crate::types::{ByteSlice, Facet, FacetFeature};

fn url_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"https?://[^\s]+").unwrap())
}

/// Characters that end a sentence rather than a URL.
const TRAILING_PUNCTUATION: &[char] = &['.', ',', ';', ':', '!', '?', ']', '"', '\''];

/// Strip sentence punctuation from the end of a URL match. A trailing
/// `)` is kept when it closes a paren inside the URL (wiki-style paths
/// like `/wiki/Foo_(bar)`), and trimmed only when unmatched.
fn trim_url(mut url: &str) -> &str {
    loop {
        let Some(last) = url.chars().last() else {
            return url;
        };
        if last == ')' {
            let opens = url.matches('(').count();
            let closes = url.matches(')').count();
            if closes > opens {
                url = &url[..url.len() - 1];
                continue;
            }
            return url;
        }
        if TRAILING_PUNCTUATION.contains(&last) {
            url = &url[..url.len() - last.len_utf8()];
            continue;
        }
        return url;
    }
}

/// Find every http(s) URL in `text` and return link facets with byte
/// offsets into the UTF-8 encoding of `text`.
pub fn detect_link_facets(text: &str) -> Vec<Facet> {
    url_re()
        .find_iter(text)
        .map(|m| {
            let trimmed = trim_url(m.as_str());
            Facet {
                index: ByteSlice {
                    byte_start: m.start(),
                    byte_end: m.start() + trimmed.len(),
                },
                features: vec![FacetFeature::Link {
                    uri: trimmed.to_string(),
                }],
            }
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn single_uri(facets: &[Facet]) -> &str {
        assert_eq!(facets.len(), 1);
        let FacetFeature::Link { uri } = &facets[0].features[0];
        uri
    }

    #[test]
    fn detects_plain_url() {
        let facets = detect_link_facets("see https://example.com/page for more");
        assert_eq!(single_uri(&facets), "https://example.com/page");
        assert_eq!(facets[0].index.byte_start, 4);
        assert_eq!(facets[0].index.byte_end, 4 + "https://example.com/page".len());
    }

    #[test]
    fn strips_trailing_sentence_punctuation() {
        let facets = detect_link_facets("read https://example.com/a.");
        assert_eq!(single_uri(&facets), "https://example.com/a");
    }

    #[test]
    fn keeps_balanced_trailing_paren() {
        let facets = detect_link_facets("see https://en.wikipedia.org/wiki/Foo_(bar)");
        assert_eq!(single_uri(&facets), "https://en.wikipedia.org/wiki/Foo_(bar)");
    }

    #[test]
    fn trims_unmatched_closing_paren() {
        let facets = detect_link_facets("(see https://example.com/page).");
        assert_eq!(single_uri(&facets), "https://example.com/page");
    }

    #[test]
    fn offsets_are_bytes_not_chars() {
        // Multibyte Japanese text ahead of the URL: byte offsets must
        // count UTF-8 bytes, which is what the lexicon expects.
        let text = "ブックマーク https://example.com";
        let facets = detect_link_facets(text);
        let start = facets[0].index.byte_start;
        assert_eq!(&text.as_bytes()[start..], "https://example.com".as_bytes());
        assert_eq!(start, "ブックマーク ".len());
    }

    #[test]
    fn multiple_urls_yield_multiple_facets() {
        let facets = detect_link_facets("https://a.example and http://b.example");
        assert_eq!(facets.len(), 2);
    }

    #[test]
    fn text_without_urls_has_no_facets() {
        assert!(detect_link_facets("just words").is_empty());
    }
}
