//! Page Normalizer

/// Collapse every whitespace run (newlines and tabs included) into a single
/// space and trim the ends.
///
/// Idempotent: `normalize_text(normalize_text(s)) == normalize_text(s)`.
pub fn normalize_text(raw: &str) -> String {
    raw.split_whitespace().collect::<Vec<_>>().join(" ")
}

/// Whether embedded text is too short to trust
///
/// Counts characters, not bytes, after trimming.
pub fn is_text_poor(text: &str, min_chars: usize) -> bool {
    text.trim().chars().count() < min_chars
}
