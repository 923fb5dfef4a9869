/*!
 * Detection of hallucinated looping in generated text.
 *
 * Markup and punctuation are stripped, then a sliding window moves over the
 * words (or characters, for scripts written without spaces). A window in
 * which more than two distinct tokens reach the threshold is a loop.
 */

use once_cell::sync::Lazy;
use regex::Regex;
use std::collections::HashMap;

use crate::structure::normalize_whitespace;

/// Regex for matching tags
static TAG_REGEX: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"<[^>]+>").expect("Invalid tag regex")
});

/// Regex for matching punctuation
static PUNCTUATION_REGEX: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"[^\w\s]").expect("Invalid punctuation regex")
});

/// Sliding-window repetition detector
#[derive(Debug, Clone)]
pub struct RepetitionValidator {
    window: usize,
    threshold: usize,
    unspaced_threshold: usize,
}

impl RepetitionValidator {
    pub fn new(window: usize, threshold: usize, unspaced_threshold: usize) -> Self {
        Self {
            window: window.max(2),
            threshold,
            unspaced_threshold,
        }
    }

    fn words(text: &str, unspaced: bool) -> Vec<String> {
        let plain = TAG_REGEX.replace_all(&text.replace("&nbsp;", " "), "").into_owned();
        let plain = PUNCTUATION_REGEX.replace_all(&plain, " ").into_owned();
        let plain = normalize_whitespace(&plain).to_lowercase();
        let plain = plain.trim();

        if unspaced {
            plain.chars().filter(|c| *c != ' ').map(String::from).collect()
        } else {
            plain.split_whitespace().map(String::from).collect()
        }
    }

    /// Tokens repeated abnormally often in one window, empty when none
    pub fn find_repetitions(&self, text: &str, unspaced: bool) -> Vec<String> {
        let words = Self::words(text, unspaced);
        let threshold = if unspaced { self.unspaced_threshold } else { self.threshold };
        if words.len() < self.window {
            return Vec::new();
        }

        for start in (0..=words.len() - self.window).step_by(self.window / 2) {
            let mut counts: HashMap<&str, usize> = HashMap::new();
            let mut order: Vec<&str> = Vec::new();
            for word in &words[start..start + self.window] {
                let count = counts.entry(word.as_str()).or_insert(0);
                if *count == 0 {
                    order.push(word.as_str());
                }
                *count += 1;
            }

            let repeated: Vec<String> = order
                .into_iter()
                .filter(|w| counts.get(w).copied().unwrap_or(0) >= threshold)
                .map(String::from)
                .collect();
            if repeated.len() > 2 {
                return repeated;
            }
        }
        Vec::new()
    }
}
