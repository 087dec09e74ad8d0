//! Keyword-based content filter and the response-header gate that decides
//! whether the filter applies to a given response.

use crate::http::ResponseHeader;

/// Frozen for test determinism, do not reorder or add to this list without
/// also updating any golden-output test that depends on its exact contents.
pub const FILTERED_WORDS: &[&str] = &[
    "spongebob",
    "britney spears",
    "paris hilton",
    "norrkoping",
    "norrkÃ¶ping",
    "norrk%C3%B6ping",
    "norrk%C3%96ping",
    "norrkoeping",
];

/// Case-insensitive (ASCII-folding) substring search, a `strcasestr`
/// equivalent.
fn contains_word_ci(haystack: &[u8], word: &str) -> bool {
    let needle = word.as_bytes();
    if needle.is_empty() || haystack.len() < needle.len() {
        return false;
    }
    haystack
        .windows(needle.len())
        .any(|window| window.eq_ignore_ascii_case(needle))
}

/// True if `buffer` contains any keyword from [`FILTERED_WORDS`], checked in
/// list order so the first hit is reported the same way the reference
/// implementation's loop does.
pub fn matches_filtered_word(buffer: &[u8]) -> Option<&'static str> {
    FILTERED_WORDS
        .iter()
        .copied()
        .find(|word| contains_word_ci(buffer, word))
}

/// Whether a buffer (request URL line, or full response body) should be
/// blocked; any keyword hit anywhere in the buffer is sufficient.
pub fn is_blocked(buffer: &[u8]) -> bool {
    matches_filtered_word(buffer).is_some()
}

/// Decide whether the content filter should run over a response body, given
/// its parsed header: the `Content-Type` must contain `"text"` and any
/// `Content-Encoding` present must be `identity`. A compressed body can't be
/// scanned for plain keywords, so anything but identity encoding is gated
/// out.
pub fn content_filter_gate(header: &ResponseHeader) -> bool {
    let is_text = header
        .fields
        .get("Content-Type")
        .is_some_and(|v| v.contains("text"));

    let is_identity = match header.fields.get("Content-Encoding") {
        None => true,
        Some(v) => v.eq_ignore_ascii_case("identity"),
    };

    is_text && is_identity
}
