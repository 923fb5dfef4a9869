/*!
 * Detection of source-script characters leaking into a translation.
 */

use log::debug;

use crate::structure::text::char_slice;

/// Characters shown on each side of the first leak
const SNIPPET_RADIUS: usize = 20;

/// Finds characters that belong to the source script
#[derive(Debug, Clone)]
pub struct ScriptValidator {
    ranges: Vec<(u32, u32)>,
    cap: usize,
}

/// Leaked characters found in an answer
#[derive(Debug, Clone, PartialEq)]
pub struct ScriptLeak {
    /// Character positions, at most `cap` of them
    pub positions: Vec<usize>,
    /// Text around the first leaked character
    pub snippet: String,
}

impl ScriptValidator {
    /// Create a validator for inclusive code point ranges
    pub fn new(ranges: &[[u32; 2]], cap: usize) -> Self {
        Self {
            ranges: ranges.iter().map(|r| (r[0], r[1])).collect(),
            cap: cap.max(1),
        }
    }

    fn is_source_char(&self, c: char) -> bool {
        let code = c as u32;
        self.ranges.iter().any(|&(start, end)| start <= code && code <= end)
    }

    /// Character positions of source-script characters, stopping at the cap
    pub fn find_positions(&self, text: &str) -> Vec<usize> {
        let mut positions = Vec::new();
        for (i, c) in text.chars().enumerate() {
            if self.is_source_char(c) {
                positions.push(i);
                if positions.len() >= self.cap {
                    break;
                }
            }
        }
        positions
    }

    /// Check an answer for leaked characters
    pub fn check(&self, text: &str) -> Option<ScriptLeak> {
        let positions = self.find_positions(text);
        let first = *positions.first()?;
        let snippet = char_slice(
            text,
            first.saturating_sub(SNIPPET_RADIUS),
            first + SNIPPET_RADIUS,
        )
        .to_string();
        debug!("Source script found at positions {:?}", positions);
        Some(ScriptLeak { positions, snippet })
    }
}
