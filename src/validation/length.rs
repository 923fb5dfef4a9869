/*!
 * Length plausibility of generated increments.
 *
 * An answer carrying no markup at all can only be trusted when it is long
 * enough to plausibly cover the chunk it translates.
 */

use log::debug;
use once_cell::sync::Lazy;
use regex::Regex;

use crate::structure::text::char_len;

/// Regex for detecting any tag
static TAG_REGEX: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"<[^>]+>").expect("Invalid tag regex")
});

/// Prose-only output shorter than the scaled source length divided by this is rejected
const PROSE_DIVISOR: f64 = 3.0;

/// An answer that is too short to be trusted
#[derive(Debug, Clone, PartialEq)]
pub struct ImplausibleLength {
    /// Answer length in characters
    pub length: usize,
    /// Minimum acceptable length in characters
    pub expected_min: usize,
}

/// Validates answer length against the source chunk
#[derive(Debug, Clone, Default)]
pub struct LengthValidator;

impl LengthValidator {
    pub fn new() -> Self {
        Self
    }

    /// Reject answers without tags shorter than a third of the expected length
    pub fn check(&self, answer: &str, source_chars: usize, multiplier: f64) -> Option<ImplausibleLength> {
        if TAG_REGEX.is_match(answer) {
            return None;
        }

        let length = char_len(answer);
        let expected_min = source_chars as f64 * multiplier / PROSE_DIVISOR;
        if (length as f64) < expected_min {
            debug!("Answer of {} chars without markup, expected at least {:.0}", length, expected_min);
            return Some(ImplausibleLength {
                length,
                expected_min: expected_min.ceil() as usize,
            });
        }
        None
    }
}
