/*!
 * Structural alignment of translated increments against the skeleton.
 *
 * Each increment is prefixed with the unconfirmed leftover of the previous
 * one, tokenized, and compared pairwise with the skeleton from the current
 * position. Only structure is compared: text content never is.
 */

use log::{debug, error, info};
use serde::{Deserialize, Serialize};

use crate::structure::text::{char_len, truncate_middle};
use crate::structure::{StructureToken, simplify_tags, tokenize};

/// Maximum number of tokens before the offending one in a context window
const CONTEXT_TOKENS: usize = 4;

/// Characters kept on each side of a token in a context window
const CONTEXT_CHARS: usize = 50;

/// Margin added to the consumed ratio so a retry can reach past the mismatch
const RATIO_MARGIN: f64 = 0.05;

/// Result of a successful alignment
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Alignment {
    /// New skeleton position
    pub position: usize,
    /// Unconfirmed trailing fragment to prefix to the next increment
    pub leftover: String,
}

/// Drift between the translated increment and the skeleton
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StructuralMismatch {
    /// Share of the increment that was consumed before the mismatch, plus a margin
    pub consumed_ratio: f64,
    /// Skeleton index of the expected token
    pub position: usize,
    /// Expected token: simplified tag or `text`
    pub original_token: String,
    /// Token found instead: tag or `text`
    pub translated_token: String,
    /// Skeleton tokens up to and including the expected one
    pub original_context: String,
    /// Translated tokens up to and including the offending one
    pub translated_context: String,
}

fn describe(token: &StructureToken, simplify: bool) -> String {
    match (token.is_tag, simplify) {
        (true, true) => simplify_tags(&token.text),
        (true, false) => token.text.clone(),
        (false, _) => "text".to_string(),
    }
}

fn context_window(tokens: &[StructureToken]) -> String {
    tokens
        .iter()
        .map(|t| truncate_middle(&t.text, CONTEXT_CHARS))
        .collect()
}

/// Validate `increment` against `skeleton` starting at `start`.
///
/// When the increment ends in text, that text is not confirmed yet: if it is
/// the only token the whole input is deferred as leftover; otherwise the
/// leftover is what follows the previous token, and when that leftover opens
/// a tag the final token is skipped instead of compared.
pub fn validate_increment(
    skeleton: &[StructureToken],
    start: usize,
    leftover: &str,
    increment: &str,
) -> Result<Alignment, StructuralMismatch> {
    let combined = format!("{}{}", leftover, increment);
    let translated = tokenize(&combined);
    let originals = skeleton.get(start..).unwrap_or(&[]);

    let Some(last_token) = translated.last() else {
        return Err(StructuralMismatch {
            consumed_ratio: RATIO_MARGIN,
            position: start,
            original_token: originals.first().map(|t| describe(t, true)).unwrap_or_default(),
            translated_token: "nothing".to_string(),
            original_context: context_window(&originals[..originals.len().min(1)]),
            translated_context: String::new(),
        });
    };
    let last = translated.len() - 1;

    let mut new_leftover = String::new();
    let mut skip_last = false;
    if !last_token.is_tag {
        if translated.len() == 1 {
            info!("Answer without markup inside, deferring it as leftover");
            new_leftover = combined.clone();
        } else {
            new_leftover = combined[translated[last - 1].end_offset..].to_string();
            skip_last = new_leftover.trim_start().starts_with('<');
        }
    }

    let compared = if skip_last { last } else { translated.len() };
    for (i, (original, candidate)) in originals.iter().zip(&translated[..compared]).enumerate() {
        if original.matches(candidate) {
            continue;
        }

        let pending = if i == last { new_leftover.as_str() } else { leftover };
        let consumed: usize = translated[..=i].iter().map(|t| char_len(&t.text)).sum();
        let increment_len = char_len(increment).max(1);
        let share = (consumed as f64 - char_len(pending) as f64) / increment_len as f64;
        let window_start = i.saturating_sub(CONTEXT_TOKENS);

        error!(
            "Structure mismatch: original positions {}-{} / {} | translated 0-{} / {}",
            start,
            start + i,
            skeleton.len().saturating_sub(1),
            i,
            last
        );

        return Err(StructuralMismatch {
            consumed_ratio: share.clamp(0.0, 1.0) + RATIO_MARGIN,
            position: start + i,
            original_token: describe(original, true),
            translated_token: describe(candidate, false),
            original_context: context_window(&originals[window_start..=i]),
            translated_context: context_window(&translated[window_start..=i]),
        });
    }

    let (position, leftover) = if last_token.is_tag {
        (start + translated.len(), String::new())
    } else {
        (start + translated.len() - 1, new_leftover)
    };

    debug!(
        "Validated original positions {}-{} / {} | end position {} leftover {:?}",
        start,
        start + compared.saturating_sub(1),
        skeleton.len().saturating_sub(1),
        position,
        truncate_middle(&leftover, 30)
    );

    Ok(Alignment { position, leftover })
}
