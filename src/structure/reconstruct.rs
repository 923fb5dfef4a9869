/*!
 * Reconstruction of full markup from tag-simplified translations.
 *
 * Attributes are stripped before translation to save tokens. Once a document
 * is translated, every skeleton tag is matched, in order, against the next
 * tag of the translation and replaced by its verbatim original.
 */

use log::{debug, error};

use super::text::{head, truncate_middle};
use super::tokenizer::{StructureToken, tag_name};
use crate::errors::TranslationError;

/// Restore the original tags of `skeleton` into `translated`.
///
/// Stops early, leaving the remainder untouched, when the next tag of the
/// translation is `incomplete_marker`.
pub fn reconstruct(
    skeleton: &[StructureToken],
    translated: &str,
    incomplete_marker: &str,
) -> Result<String, TranslationError> {
    let mut output = String::with_capacity(translated.len() * 2);
    let mut cursor = 0;

    for token in skeleton.iter().filter(|t| t.is_tag) {
        let target = format!("{}>", tag_name(&token.text));
        let rest = &translated[cursor..];
        let next_tag = rest.find('<');

        match (rest.find(&target), next_tag) {
            (Some(found), Some(next)) if found == next => {
                output.push_str(&rest[..found]);
                output.push_str(&token.text);
                cursor += found + target.len();
            }
            (_, Some(next)) if !incomplete_marker.is_empty() && rest[next..].starts_with(incomplete_marker) => {
                debug!("Reconstruction stopped at incomplete translation marker");
                break;
            }
            _ => {
                error!(
                    "Could not find a match for {} after position {}",
                    truncate_middle(&token.text, 30),
                    cursor
                );
                return Err(TranslationError::StructureReconstruction(format!(
                    "could not find a match for {} after position {} starting at {}... tag to find: {}",
                    truncate_middle(&token.text, 30),
                    cursor,
                    head(rest, 50),
                    target
                )));
            }
        }
    }

    output.push_str(&translated[cursor..]);
    Ok(output)
}
