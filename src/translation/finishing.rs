/*!
 * Finishing touches on a reassembled translated document.
 *
 * - Bracketed translator notes are removed from headline and editor
 *   elements, where they do not fit
 * - The untranslated `<title>` of the header is replaced by the translated
 *   headline followed by the site title of the target language
 */

use log::debug;
use once_cell::sync::Lazy;
use regex::{NoExpand, Regex};

/// Regex for headline and editor elements, captured as (opening, inner, closing)
static HEADLINE_ELEMENT_REGEX: Lazy<Regex> = Lazy::new(|| {
    Regex::new(
        r#"(?s)(<(?:div class="row">.*?<div|(?:div|span)[^>]*class="(?:mainheadline|headline|editor)"[^>]*>))(.*?)(</(?:div|span)>)"#,
    )
    .expect("Invalid headline element regex")
});

/// Regex for the main headline whose text becomes the page title
static HEADLINE_TEXT_REGEX: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r#"(?s)<(?:div|span|h1)[^>]*class="(?:main)?headline"[^>]*>(.*?)</(?:div|span|h1)>"#)
        .expect("Invalid headline text regex")
});

/// Regex for the first cell of a headline row
static ROW_HEADLINE_REGEX: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r#"(?s)<div class="row">.*?<div>(.*?)</div>"#).expect("Invalid row headline regex")
});

/// Regex for a bracketed translator note with its leading whitespace
static NOTE_REGEX: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?s)\s*\[.*?\]").expect("Invalid translator note regex")
});

/// Regex for the page title element
static TITLE_REGEX: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?s)<title>.*?</title>").expect("Invalid title regex")
});

/// Regex for any tag
static TAG_REGEX: Lazy<Regex> = Lazy::new(|| Regex::new(r"<[^>]*>").expect("Invalid tag regex"));

/// Remove bracketed notes inside headline and editor elements
pub fn strip_headline_notes(content: &str) -> String {
    HEADLINE_ELEMENT_REGEX
        .replace_all(content, |caps: &regex::Captures| {
            format!("{}{}{}", &caps[1], NOTE_REGEX.replace_all(&caps[2], ""), &caps[3])
        })
        .into_owned()
}

/// Plain text of the main headline, if the document has a non-empty one
pub fn headline_text(content: &str) -> Option<String> {
    let inner = HEADLINE_TEXT_REGEX
        .captures(content)
        .or_else(|| ROW_HEADLINE_REGEX.captures(content))?
        .get(1)?
        .as_str();
    let text = TAG_REGEX.replace_all(inner, "");
    let text = text.split_whitespace().collect::<Vec<_>>().join(" ");
    (!text.is_empty()).then_some(text)
}

/// Replace every `<title>` with "headline - site title", or the site title alone
pub fn retitle(content: &str, site_title: &str) -> String {
    let title = match headline_text(content) {
        Some(headline) => format!("{} - {}", headline, site_title),
        None => site_title.to_string(),
    };
    debug!("Page title: {}", title);
    TITLE_REGEX
        .replace_all(content, NoExpand(&format!("<title>{}</title>", title)))
        .into_owned()
}

/// Apply every finishing step to a reassembled document
pub fn finish_document(content: &str, site_title: &str) -> String {
    retitle(&strip_headline_notes(content), site_title)
}
