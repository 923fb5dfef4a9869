/*!
 * Degraded output for chunks that could not be completed.
 *
 * When a chunk runs out of attempts after some progress, the document is
 * closed with what was translated so far, the incomplete marker, enough
 * closing tags to balance any open containers and a notice linking to the
 * complete reference edition.
 */

use crate::app_config::{LanguageProfile, RecoveryConfig};

/// Closing `</div>` tags appended after the incomplete marker
const CLOSING_DIVS: usize = 20;

/// Drop a trailing `<` that never got its `>`
pub fn trim_dangling_tag(translation: &str) -> &str {
    match translation.rfind('<') {
        Some(open) if !translation[open..].contains('>') => &translation[..open],
        _ => translation,
    }
}

/// Closing form of a marker tag: `<x>` becomes `</x>`
fn closing_tag(marker: &str) -> String {
    marker.replacen('<', "</", 1)
}

/// Build the degraded fragment ending a document.
///
/// * `chunk_translation` - running translation of the failed chunk
/// * `incomplete_marker` - opening marker tag, e.g. `<incomplete-translation>`
/// * `stop_marker` - closing body tag
/// * `document_name` - name substituted into the reference link
pub fn degraded_fragment(
    chunk_translation: &str,
    incomplete_marker: &str,
    stop_marker: &str,
    recovery: &RecoveryConfig,
    profile: &LanguageProfile,
    document_name: &str,
) -> String {
    let mut fragment = String::with_capacity(chunk_translation.len() + 1024);
    fragment.push_str(trim_dangling_tag(chunk_translation));
    fragment.push_str(incomplete_marker);
    fragment.push_str(&closing_tag(incomplete_marker));
    fragment.push_str(&"</div>".repeat(CLOSING_DIVS));

    fragment.push_str(&format!(
        "<div style=\"text-align:center;margin:0 auto;\">{}<br><br><a style=\"text-decoration:underline;\" href=\"{}\">{}</a></div><br><br>",
        profile.incomplete_notice,
        recovery.reference_link.replace("{name}", document_name),
        recovery.reference_text
    ));

    if let Some(site_link) = &recovery.site_link {
        fragment.push_str(&format!(
            "<div style=\"font-size:13px;text-align:center;border-top:1px solid black;padding:4px;\"><a style=\"text-decoration:underline;\" href=\"{}\">{}</a></div>",
            site_link, recovery.site_text
        ));
    }

    fragment.push_str(stop_marker);
    fragment
}
