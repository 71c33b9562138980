//! Section-boundary predicates.
//!
//! Each predicate looks at one trimmed paragraph. The paragraph chunker ORs
//! them together, so adding a heuristic means adding a function here (or
//! passing one to `ParagraphChunker::with_boundary`).

use once_cell::sync::Lazy;
use regex::Regex;

/// Returns true when a paragraph marks a natural section boundary.
pub type BoundaryPredicate = fn(&str) -> bool;

/// Heading, bullet item, numbered item.
pub const DEFAULT_BOUNDARIES: [BoundaryPredicate; 3] =
    [is_heading, is_bullet_item, is_numbered_item];

const BULLET_GLYPHS: &[char] = &['•', '◦', '▪', '●', '·'];

/// Also used for hyphens, signs and emphasis, so a space must follow.
const BULLET_DASHES: &[char] = &['-', '*', '–'];

// `.` does not cross newlines and `$` is end of input, so a heading is a
// single line.
static HEADING: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^\p{Lu}.*:$").expect("heading pattern is valid"));

static NUMBERED_ITEM: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^\d+\.").expect("numbered item pattern is valid"));

/// A single capitalized line ending in a colon, e.g. `Allergies:`.
pub fn is_heading(paragraph: &str) -> bool {
    HEADING.is_match(paragraph)
}

/// A paragraph starting with a bullet glyph, or with `-`, `*` or `–`
/// followed by whitespace.
pub fn is_bullet_item(paragraph: &str) -> bool {
    if paragraph.starts_with(BULLET_GLYPHS) {
        return true;
    }

    let mut chars = paragraph.chars();
    matches!(
        (chars.next(), chars.next()),
        (Some(marker), Some(next)) if BULLET_DASHES.contains(&marker) && next.is_whitespace()
    )
}

/// A paragraph starting with `digits.`, e.g. `3. Dinner`.
pub fn is_numbered_item(paragraph: &str) -> bool {
    NUMBERED_ITEM.is_match(paragraph)
}

pub fn matches_any(paragraph: &str, predicates: &[BoundaryPredicate]) -> bool {
    predicates.iter().any(|predicate| predicate(paragraph))
}
