/*!
 * Splitting of a flattened document body into chunks.
 *
 * The body is first cut into near-equal character spans, then every boundary
 * is nudged onto a natural separator and past any leading tags, so that no
 * chunk starts in the middle of a sentence or right after a dangling tag.
 * Concatenating the chunks always yields the body unchanged.
 */

use log::{debug, info};
use serde::{Deserialize, Serialize};

use crate::structure::text::{byte_offset, char_index, char_len, char_slice, head, tail};
use crate::structure::tokenize;

/// Fraction of a chunk searched for a separator on each side of a boundary
const SEARCH_FRACTION: usize = 7;

/// A contiguous slice of the flattened body
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Chunk {
    /// Zero-based position in the chunk sequence
    pub index: usize,
    /// Flattened markup of the slice
    pub text: String,
}

/// Cut `body` into `len / max_size + 1` spans of equal character length.
pub fn split_even(body: &str, max_size: usize) -> Vec<Chunk> {
    let len = char_len(body);
    let count = len / max_size.max(1) + 1;
    let size = len / count + 1;

    (0..count)
        .map(|index| Chunk {
            index,
            text: char_slice(body, index * size, (index + 1) * size).to_string(),
        })
        .collect()
}

/// Split `body` and adjust the boundaries of the resulting chunks.
pub fn split_into_chunks(body: &str, max_size: usize, separators: &[String]) -> Vec<Chunk> {
    let mut chunks = split_even(body, max_size);
    adjust_boundaries(&mut chunks, separators);
    chunks
}

/// First occurrence of `sep` lying entirely in the first 1/7 of `text`, as a char index.
fn find_lead_in(text: &str, sep: &str) -> Option<usize> {
    let limit = byte_offset(text, char_len(text) / SEARCH_FRACTION);
    text[..limit].find(sep).map(|b| char_index(text, b))
}

/// Last occurrence of `sep` starting in the last 1/7 of `text`, as a char index.
fn find_tail_cut(text: &str, sep: &str) -> Option<usize> {
    let len = char_len(text);
    let start = byte_offset(text, len - len.div_ceil(SEARCH_FRACTION));
    text[start..].rfind(sep).map(|b| char_index(text, start + b))
}

/// Move text between `current` and `next` so their boundary sits after a separator.
fn cut_at_separator(current: &mut String, next: &mut String, separators: &[String]) {
    for sep in separators.iter().filter(|s| !s.is_empty()) {
        let sep_len = char_len(sep);
        let next_cut = find_lead_in(next, sep);
        let cut = find_tail_cut(current, sep);

        // Tail length of `current` after the cut, or its whole length plus one without one
        let tail_len = char_len(current) as isize - cut.map_or(-1, |c| c as isize);
        if let Some(next_cut) = next_cut {
            if (next_cut as isize) < tail_len - 2 * sep_len as isize {
                let moved = head(next, next_cut + sep_len).to_string();
                current.push_str(&moved);
                next.replace_range(..moved.len(), "");
                return;
            }
        }

        if let Some(cut) = cut {
            let at = byte_offset(current, cut + sep_len);
            let moved = current.split_off(at);
            next.insert_str(0, &moved);
            return;
        }
    }
}

/// Pull tags at the start of `next` into `current` until a text token is reached.
fn pull_leading_tags(current: &mut String, next: &mut String) {
    loop {
        let end = match tokenize(next).first() {
            Some(token) if token.is_tag => token.end_offset,
            _ => break,
        };
        current.push_str(&next[..end]);
        next.replace_range(..end, "");
    }
}

/// Adjust every boundary between adjacent chunks, in order.
pub fn adjust_boundaries(chunks: &mut [Chunk], separators: &[String]) {
    for i in 0..chunks.len().saturating_sub(1) {
        let (left, right) = chunks.split_at_mut(i + 1);
        let current = &mut left[i].text;
        let next = &mut right[0].text;

        cut_at_separator(current, next, separators);
        pull_leading_tags(current, next);

        info!(
            "Cut chunks {} ({}, {} chars): {}+ + +{}",
            i + 1,
            char_len(current),
            char_len(next),
            tail(current, 40),
            head(next, 40)
        );
    }
    debug!("Adjusted {} chunk boundaries", chunks.len().saturating_sub(1));
}
