/*!
 * Tokenizer for markup documents.
 *
 * A token is either a tag (`<` up to the next `>`, with at least one
 * character in between) or a maximal run of characters other than `<`.
 * A `<` that cannot open a complete tag belongs to no token, and runs made
 * only of whitespace are dropped.
 */

use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::ops::Deref;

/// Regex for matching one tag or one text run
static TOKEN_REGEX: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(<[^>]+>|[^<]+)").expect("Invalid token regex")
});

/// Regex for matching an opening tag with its attributes
static OPENING_TAG_REGEX: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"<([^/>\s]+)[^>]*>").expect("Invalid opening tag regex")
});

/// Regex for matching runs of whitespace
static WHITESPACE_REGEX: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"\s+").expect("Invalid whitespace regex")
});

/// One tag or text run of a markup document
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StructureToken {
    /// Verbatim token text
    pub text: String,
    /// Whether the token is a tag
    pub is_tag: bool,
    /// Byte offset just past the token in the tokenized input
    pub end_offset: usize,
}

impl StructureToken {
    /// Tag name of the token; text tokens return their whole text.
    pub fn name(&self) -> &str {
        if self.is_tag { tag_name(&self.text) } else { &self.text }
    }

    /// Whether two tokens are structurally equivalent.
    ///
    /// Text content is never compared, only the kind and the tag name.
    pub fn matches(&self, other: &StructureToken) -> bool {
        self.is_tag == other.is_tag && (!self.is_tag || tag_name(&self.text) == tag_name(&other.text))
    }
}

/// Split markup into its ordered tag and text tokens.
pub fn tokenize(markup: &str) -> Vec<StructureToken> {
    TOKEN_REGEX
        .find_iter(markup)
        .filter(|m| !m.as_str().trim().is_empty())
        .map(|m| StructureToken {
            text: m.as_str().to_string(),
            is_tag: m.as_str().starts_with('<'),
            end_offset: m.end(),
        })
        .collect()
}

/// Name part of a tag: everything before the first whitespace or `>`,
/// without a self-closing slash (`<br/>` and `<br>` share the name `<br`).
pub fn tag_name(tag: &str) -> &str {
    let end = tag
        .find(|c: char| c.is_whitespace() || c == '>')
        .unwrap_or(tag.len());
    let name = &tag[..end];
    if name.len() > 2 && name.ends_with('/') {
        &name[..name.len() - 1]
    } else {
        name
    }
}

/// Strip attributes from every opening tag: `<div class="x">` becomes `<div>`.
pub fn simplify_tags(markup: &str) -> String {
    OPENING_TAG_REGEX.replace_all(markup, "<${1}>").into_owned()
}

/// Collapse whitespace runs to one space and drop the spaces that sit
/// between two tags or around a `<br>`.
pub fn normalize_whitespace(markup: &str) -> String {
    WHITESPACE_REGEX
        .replace_all(markup, " ")
        .replace("> <", "><")
        .replace(" <br>", "<br>")
        .replace("<br> ", "<br>")
}

/// The ordered token sequence of a document's translatable body.
///
/// Built once per document and never mutated.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Skeleton(Vec<StructureToken>);

impl Skeleton {
    /// Tokenize a body into its skeleton.
    pub fn from_markup(markup: &str) -> Self {
        Self(tokenize(markup))
    }

    /// Tokens in `start..end`, clamped to the skeleton length.
    pub fn span(&self, start: usize, end: usize) -> &[StructureToken] {
        let end = end.min(self.0.len());
        let start = start.min(end);
        &self.0[start..end]
    }
}

impl Deref for Skeleton {
    type Target = [StructureToken];

    fn deref(&self) -> &Self::Target {
        &self.0
    }
}
