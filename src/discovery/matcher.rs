use log::debug;
use memchr::memchr2;
use once_cell::sync::Lazy;
use regex::{Captures, Regex};

use crate::core::constants::files;
use crate::core::types::{ContentPayload, MatchSet};

/// Composite extraction rule. Every candidate sits between single or double quotes.
///
/// Group 1 wraps the whole alternation, groups 2 to 6 are the five link shapes:
/// absolute or protocol-relative URLs, `/`, `../` and `./` paths, paths ending in a
/// short extension, generic multi-segment paths, and bare filenames with a known
/// extension.
pub const EXTRACTION_PATTERN: &str = r#"(?:"|')(((?:[a-zA-Z]{1,10}://|//)[^"'/]{1,}\.[a-zA-Z]{2,}[^"']{0,})|((?:/|\.\./|\./)[^"'><,;| *()(%%$^/\\\[\]][^"'><,;|()]{1,})|([a-zA-Z0-9_\-/]{1,}/[a-zA-Z0-9_\-/]{1,}\.(?:[a-zA-Z]{1,4}|action)(?:[\?|#][^"|']{0,}|))|([a-zA-Z0-9_\-/]{1,}/[a-zA-Z0-9_\-/]{3,}(?:[\?|#][^"|']{0,}|))|([a-zA-Z0-9_\-]{1,}\.(?:php|asp|aspx|jsp|json|action|html|js|txt|xml)(?:[\?|#][^"|']{0,}|)))(?:"|')"#;

/// Capture group indexes of the five link shapes, in priority order.
const SHAPE_GROUPS: [usize; 5] = [2, 3, 4, 5, 6];

static EXTRACTION_RULE: Lazy<Regex> =
    Lazy::new(|| Regex::new(EXTRACTION_PATTERN).expect("Failed to compile extraction pattern"));

/// Which alternative of the extraction rule produced a match.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LinkShape {
    AbsoluteUrl,
    RelativePath,
    PathWithExtension,
    MultiSegmentPath,
    BareFilename,
}

impl LinkShape {
    fn from_group(group: usize) -> Option<Self> {
        match group {
            2 => Some(LinkShape::AbsoluteUrl),
            3 => Some(LinkShape::RelativePath),
            4 => Some(LinkShape::PathWithExtension),
            5 => Some(LinkShape::MultiSegmentPath),
            6 => Some(LinkShape::BareFilename),
            _ => None,
        }
    }
}

/// Returns every distinct string in `text` that satisfies the extraction rule.
///
/// Scanning is leftmost-first and non-overlapping: after a match the next
/// attempt starts right after its closing quote.
pub fn extract(text: &str) -> MatchSet {
    let mut matches = MatchSet::with_capacity(files::DEFAULT_MATCH_CAPACITY);

    // Nothing can match without a quote character.
    if memchr2(b'"', b'\'', text.as_bytes()).is_none() {
        return matches;
    }

    for caps in EXTRACTION_RULE.captures_iter(text) {
        if let Some((_, value)) = first_shape(&caps) {
            matches.insert(value);
        }
    }

    matches
}

/// Like [`extract`] but also reports which shape each match came from.
pub fn extract_with_shapes(text: &str) -> Vec<(LinkShape, String)> {
    EXTRACTION_RULE
        .captures_iter(text)
        .filter_map(|caps| first_shape(&caps).map(|(shape, value)| (shape, value.to_string())))
        .collect()
}

/// Consume a payload and extract from its text.
pub fn extract_payload(payload: ContentPayload) -> MatchSet {
    let (provenance, text) = payload.into_parts();
    let matches = extract(&text);
    debug!(
        "{} match(es) in {} ({} bytes)",
        matches.len(),
        provenance,
        text.len()
    );
    matches
}

/// First non-empty shape group of a match.
///
/// The shapes are alternatives, so at most one should be set; checking them
/// in order makes the choice explicit instead of depending on the regex engine.
fn first_shape<'t>(caps: &Captures<'t>) -> Option<(LinkShape, &'t str)> {
    SHAPE_GROUPS.iter().find_map(|&group| {
        caps.get(group)
            .filter(|m| !m.as_str().is_empty())
            .and_then(|m| LinkShape::from_group(group).map(|shape| (shape, m.as_str())))
    })
}
