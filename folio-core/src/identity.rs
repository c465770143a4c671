//! Deterministic identity and slug generation.
//!
//! Identifiers are derived from a fixed namespace tag plus a seed string, so
//! the same seed always yields the same identifier across rebuilds.

use deunicode::deunicode;

/// Namespace for category identities
pub const CATEGORY_NAMESPACE: &str = "category:";

/// Namespace for tag identities
pub const TAG_NAMESPACE: &str = "tag:";

/// Sentinel slug for titles that normalize to nothing
pub const UNTITLED_SLUG: &str = "untitled";

const ID_LEN: usize = 16;
const SHORT_HASH_LEN: usize = 8;

/// Derive a stable identifier from a namespace tag and a seed string
pub fn article_id(namespace: &str, seed: &str) -> String {
    let mut hasher = blake3::Hasher::new();
    hasher.update(namespace.as_bytes());
    hasher.update(seed.as_bytes());
    hasher.finalize().to_hex()[..ID_LEN].to_string()
}

/// Derive a join-relation identifier from both sides' identifiers
pub fn relation_id(left_id: &str, right_id: &str) -> String {
    let mut hasher = blake3::Hasher::new();
    hasher.update(left_id.as_bytes());
    hasher.update(b"+");
    hasher.update(right_id.as_bytes());
    hasher.finalize().to_hex()[..ID_LEN].to_string()
}

/// Short content digest used for hashed anchor fallbacks
pub fn short_hash(input: &str) -> String {
    blake3::hash(input.as_bytes()).to_hex()[..SHORT_HASH_LEN].to_string()
}

/// Convert a title to a URL slug.
///
/// ASCII titles are lower-cased, stripped of non-alphanumeric characters,
/// and hyphen-joined. Titles containing non-Latin script are transliterated
/// token-by-token before the same normalization. An empty result falls back
/// to the `untitled` sentinel.
pub fn slugify(title: &str) -> String {
    let source = if title.is_ascii() {
        title.to_string()
    } else {
        // Token-by-token so transliteration keeps word boundaries
        title
            .split_whitespace()
            .map(deunicode)
            .collect::<Vec<_>>()
            .join(" ")
    };

    let normalized: String = source
        .to_lowercase()
        .chars()
        .map(|c| if c.is_ascii_alphanumeric() { c } else { ' ' })
        .collect();

    let slug = normalized.split_whitespace().collect::<Vec<_>>().join("-");

    if slug.is_empty() {
        UNTITLED_SLUG.to_string()
    } else {
        slug
    }
}
