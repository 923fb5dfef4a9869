/*!
 * Character-safe string helpers.
 *
 * Lengths, overlaps and chunk sizes are all counted in characters so that
 * multi-byte scripts are never cut in the middle of a code point.
 */

/// Number of characters in `s`.
pub fn char_len(s: &str) -> usize {
    s.chars().count()
}

/// Byte offset of the character at index `char_index`, or `s.len()` past the end.
pub fn byte_offset(s: &str, char_index: usize) -> usize {
    s.char_indices()
        .nth(char_index)
        .map(|(offset, _)| offset)
        .unwrap_or(s.len())
}

/// Character index of a byte offset that lies on a char boundary.
pub fn char_index(s: &str, byte_offset: usize) -> usize {
    s[..byte_offset].chars().count()
}

/// First `n` characters of `s`.
pub fn head(s: &str, n: usize) -> &str {
    &s[..byte_offset(s, n)]
}

/// Last `n` characters of `s`.
pub fn tail(s: &str, n: usize) -> &str {
    let len = char_len(s);
    if n >= len {
        return s;
    }
    &s[byte_offset(s, len - n)..]
}

/// Characters `start..end` of `s`, clamped to its length.
pub fn char_slice(s: &str, start: usize, end: usize) -> &str {
    let from = byte_offset(s, start);
    let to = byte_offset(s, end.max(start));
    &s[from..to]
}

/// Abbreviate `s` to `keep` characters on each side of an ellipsis.
pub fn truncate_middle(s: &str, keep: usize) -> String {
    if char_len(s) > keep * 2 {
        format!("{}...{}", head(s, keep), tail(s, keep))
    } else {
        s.to_string()
    }
}
