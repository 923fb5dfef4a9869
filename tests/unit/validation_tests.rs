/*!
 * Tests for answer validation and structural alignment
 */

use yahtwai::errors::AttemptError;
use yahtwai::structure::text::{char_len, char_slice};
use yahtwai::structure::{Skeleton, normalize_whitespace, simplify_tags};
use yahtwai::validation::{AnswerContext, ValidationService, validate_increment};
use yahtwai::Config;

use crate::common;

fn flattened_sample() -> String {
    normalize_whitespace(&simplify_tags(&format!("<body>{}", common::sample_body())))
}

/// Cut points every `step` characters, moved forward out of any tag
fn cut_points(text: &str, step: usize) -> Vec<usize> {
    let chars: Vec<char> = text.chars().collect();
    let mut inside_tag = vec![false; chars.len() + 1];
    let mut open = false;
    for (i, c) in chars.iter().enumerate() {
        match c {
            '<' => open = true,
            '>' => open = false,
            _ => {}
        }
        // A cut at i + 1 splits a tag when the tag is still open after chars[i]
        inside_tag[i + 1] = open;
    }

    let mut cuts = Vec::new();
    let mut i = step;
    while i < chars.len() {
        if inside_tag[i] {
            i += 1;
            continue;
        }
        cuts.push(i);
        i += step;
    }
    cuts.push(chars.len());
    cuts
}

#[test]
fn test_validateIncrement_withWholeSimplifiedBody_shouldReachTheEnd() {
    let flattened = flattened_sample();
    let skeleton = Skeleton::from_markup(&flattened);
    let alignment = validate_increment(&skeleton, 0, "", &flattened).unwrap();
    assert_eq!(alignment.position, skeleton.len());
    assert_eq!(alignment.leftover, "");
}

#[test]
fn test_validateIncrement_withArbitraryPieces_shouldAccumulateToTheEnd() {
    let flattened = flattened_sample();
    let skeleton = Skeleton::from_markup(&flattened);

    for step in [5, 7, 13, 29, 64] {
        let mut position = 0;
        let mut leftover = String::new();
        let mut start = 0;
        for cut in cut_points(&flattened, step) {
            let piece = char_slice(&flattened, start, cut);
            let alignment = validate_increment(&skeleton, position, &leftover, piece)
                .unwrap_or_else(|e| panic!("step {} cut {}: {:?}", step, cut, e));
            assert!(alignment.position >= position);
            position = alignment.position;
            leftover = alignment.leftover;
            start = cut;
        }
        assert_eq!(start, char_len(&flattened));
        assert_eq!(position, skeleton.len(), "step {}", step);
        assert_eq!(leftover, "");
    }
}

#[test]
fn test_validateIncrement_withTranslatedText_shouldIgnoreContent() {
    let flattened = flattened_sample();
    let skeleton = Skeleton::from_markup(&flattened);
    let translated = common::translate_words(&flattened);
    let alignment = validate_increment(&skeleton, 0, "", &translated).unwrap();
    assert_eq!(alignment.position, skeleton.len());
}

#[test]
fn test_validateIncrement_withDroppedParagraph_shouldReportMismatchPosition() {
    let skeleton = Skeleton::from_markup("<body><p>a</p><p>b</p><b>c</b>");
    let mismatch = validate_increment(&skeleton, 0, "", "<body><p>A</p><b>C</b>").unwrap_err();
    assert_eq!(mismatch.position, 4);
    assert_eq!(mismatch.original_token, "<p>");
    assert_eq!(mismatch.translated_token, "<b>");
    assert!(mismatch.consumed_ratio > 0.05 && mismatch.consumed_ratio <= 1.05);
    assert!(mismatch.original_context.ends_with("<p>"));
    assert!(mismatch.translated_context.ends_with("<b>"));
}

#[test]
fn test_validateIncrement_endingInsideTag_shouldDeferTheFragment() {
    let skeleton = Skeleton::from_markup("<p>a</p><p>b</p>");
    let alignment = validate_increment(&skeleton, 0, "", "<p>A</p><p").unwrap();
    assert_eq!(alignment.position, 3);
    assert_eq!(alignment.leftover, "<p");

    let rest = validate_increment(&skeleton, alignment.position, &alignment.leftover, ">B</p>").unwrap();
    assert_eq!(rest.position, 6);
    assert_eq!(rest.leftover, "");
}

#[test]
fn test_validateIncrement_withTextOnly_shouldDeferEverything() {
    let skeleton = Skeleton::from_markup("<p>long text</p>");
    let alignment = validate_increment(&skeleton, 1, "", "long ").unwrap();
    assert_eq!(alignment.position, 1);
    assert_eq!(alignment.leftover, "long ");
}

fn validate(answer: &str, markup: &str) -> Result<usize, AttemptError> {
    let config = Config::default();
    let service = ValidationService::new(&config.validation);
    let skeleton = Skeleton::from_markup(markup);
    let profile = config.language_profile("en").unwrap();
    service
        .validate(
            answer,
            &AnswerContext {
                skeleton: &skeleton,
                position: 0,
                leftover: "",
                source_chars: char_len(markup),
                profile,
            },
        )
        .map(|a| a.position)
}

#[test]
fn test_validationService_withLoopingAnswer_shouldRejectRepetition() {
    let mut answer = String::from("<p>");
    for i in 0..30 {
        answer.push_str(&format!("the endless river word{} ", i));
    }
    for i in 0..100 {
        answer.push_str(&format!("filler{} ", i));
    }
    answer.push_str("</p>");

    let result = validate(&answer, "<p>x</p>");
    match result {
        Err(AttemptError::AbnormalRepetition { words }) => {
            assert_eq!(words, vec!["the", "endless", "river"]);
        }
        other => panic!("expected repetition, got {:?}", other),
    }
}

#[test]
fn test_validationService_withLeakAndMismatch_shouldReportLeakFirst() {
    let result = validate("<b>Hello שלום</b>", "<p>שלום</p>");
    assert!(matches!(result, Err(AttemptError::SourceLanguageLeak { .. })));
}

#[test]
fn test_validationService_withWhitespaceAnswer_shouldRejectAsEmpty() {
    assert!(matches!(validate("  \n ", "<p>x</p>"), Err(AttemptError::EmptyAnswer)));
}

#[test]
fn test_validationService_withMismatch_shouldCarryDetails() {
    match validate("<div>Hello</div>", "<p>שלום</p>") {
        Err(AttemptError::StructuralMismatch(mismatch)) => {
            assert_eq!(mismatch.position, 0);
            assert_eq!(mismatch.original_token, "<p>");
        }
        other => panic!("expected mismatch, got {:?}", other),
    }
}

#[test]
fn test_validationService_withGoodAnswer_shouldReturnPosition() {
    assert_eq!(validate("<p>Hello</p>", "<p>שלום</p>").unwrap(), 3);
}
