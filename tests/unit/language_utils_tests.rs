/*!
 * Tests for language utility functions
 */

use yahtwai::language_utils::{
    LanguageCodeType, get_language_name, language_codes_match, normalize_to_part1_or_part2t,
    normalize_to_part2t, validate_language_code,
};

/// Test validation of language codes
#[test]
fn test_validate_language_code_withValidCodes_shouldReturnCorrectType() {
    // ISO 639-1 tests
    assert_eq!(validate_language_code("he").unwrap(), LanguageCodeType::Part1);
    assert_eq!(validate_language_code("en").unwrap(), LanguageCodeType::Part1);

    // ISO 639-2/T tests
    assert_eq!(validate_language_code("heb").unwrap(), LanguageCodeType::Part2T);
    assert_eq!(validate_language_code("fra").unwrap(), LanguageCodeType::Part2T);

    // ISO 639-2/B tests
    assert_eq!(validate_language_code("fre").unwrap(), LanguageCodeType::Part2B);
    assert_eq!(validate_language_code("chi").unwrap(), LanguageCodeType::Part2B);

    // Whitespace and case tests
    assert_eq!(validate_language_code(" EN ").unwrap(), LanguageCodeType::Part1);
    assert_eq!(validate_language_code("ENG").unwrap(), LanguageCodeType::Part2T);

    // Invalid codes
    assert!(validate_language_code("123").is_err());
    assert!(validate_language_code("e").is_err());
    assert!(validate_language_code("english").is_err());
}

/// Test normalization of language codes to ISO 639-2/T format
#[test]
fn test_normalize_to_part2t_withValidCodes_shouldNormalizeCorrectly() {
    assert_eq!(normalize_to_part2t("he").unwrap(), "heb");
    assert_eq!(normalize_to_part2t("fr").unwrap(), "fra");
    assert_eq!(normalize_to_part2t("fre").unwrap(), "fra");
    assert_eq!(normalize_to_part2t("ger").unwrap(), "deu");
    assert_eq!(normalize_to_part2t(" JA ").unwrap(), "jpn");
    assert!(normalize_to_part2t("").is_err());
}

/// Target languages are used as directory names: 2-letter codes are preferred
#[test]
fn test_normalize_to_part1_or_part2t_shouldPreferTwoLetterCodes() {
    assert_eq!(normalize_to_part1_or_part2t("eng").unwrap(), "en");
    assert_eq!(normalize_to_part1_or_part2t("fre").unwrap(), "fr");
    assert_eq!(normalize_to_part1_or_part2t("ja").unwrap(), "ja");
    // No ISO 639-1 code exists for Hawaiian
    assert_eq!(normalize_to_part1_or_part2t("haw").unwrap(), "haw");
    assert!(normalize_to_part1_or_part2t("12").is_err());
}

/// Test matching of different language code formats
#[test]
fn test_language_codes_match_withMatchingCodes_shouldReturnTrue() {
    assert!(language_codes_match("he", "heb"));
    assert!(language_codes_match("fr", "fre"));
    assert!(language_codes_match("fra", "fre"));
    assert!(language_codes_match("EN", " eng "));

    // Non-matches
    assert!(!language_codes_match("en", "fra"));
    assert!(!language_codes_match("en", "??"));
}

/// Test retrieval of language names from codes
#[test]
fn test_get_language_name_withValidCodes_shouldReturnCorrectName() {
    assert_eq!(get_language_name("he").unwrap(), "Hebrew");
    assert_eq!(get_language_name("heb").unwrap(), "Hebrew");
    assert_eq!(get_language_name("fre").unwrap(), "French");
    assert_eq!(get_language_name("ja").unwrap(), "Japanese");

    // Invalid codes
    assert!(get_language_name("1").is_err());
}
