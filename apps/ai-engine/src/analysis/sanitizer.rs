//! Input text normalization applied before any prompt embedding.

/// Max CV characters embedded into the fast-tier extraction prompt.
/// Keeps the verbatim-copy call cheap; evaluation sees the full text.
pub const EXTRACTION_CHAR_BOUND: usize = 4000;

/// Collapses all runs of whitespace (including newlines from layout
/// reconstruction) into single spaces and trims the ends. Pure and
/// idempotent: sanitizing sanitized text is a no-op.
pub fn sanitize(text: &str) -> String {
    text.split_whitespace().collect::<Vec<_>>().join(" ")
}

/// Char-boundary-safe truncation. Byte slicing would panic mid-codepoint on
/// non-ASCII CVs.
pub fn truncate_chars(text: &str, max_chars: usize) -> &str {
    match text.char_indices().nth(max_chars) {
        Some((idx, _)) => &text[..idx],
        None => text,
    }
}
