/*!
 * Tests for language code utilities
 */

use voicely::language_utils::{
    get_language_name, language_codes_match, normalize_to_part1_or_part2t, normalize_to_part2t, split_region,
    to_deepl_code, to_locale, to_lowercase_code, validate_language_code,
};

#[test]
fn test_validateLanguageCode_withValidCodes_shouldPass() {
    for code in ["en", "tr", "fr", "fre", "deu", "en-US", "pt_BR", "ZH-cn"] {
        assert!(validate_language_code(code).is_ok(), "{} should be valid", code);
    }
}

#[test]
fn test_validateLanguageCode_withInvalidCodes_shouldFail() {
    for code in ["", "x", "zz", "english", "12"] {
        assert!(validate_language_code(code).is_err(), "{} should be invalid", code);
    }
}

#[test]
fn test_splitRegion_shouldSeparatePrimaryAndRegion() {
    assert_eq!(split_region("en-us"), ("en".to_string(), Some("US".to_string())));
    assert_eq!(split_region("PT_br"), ("pt".to_string(), Some("BR".to_string())));
    assert_eq!(split_region(" tr "), ("tr".to_string(), None));
}

#[test]
fn test_normalizeToPart2t_shouldHandleBibliographicCodes() {
    assert_eq!(normalize_to_part2t("fr").unwrap(), "fra");
    assert_eq!(normalize_to_part2t("fre").unwrap(), "fra");
    assert_eq!(normalize_to_part2t("ger").unwrap(), "deu");
    assert_eq!(normalize_to_part2t("en-GB").unwrap(), "eng");
}

#[test]
fn test_normalizeToPart1OrPart2t_shouldPreferTwoLetterCode() {
    assert_eq!(normalize_to_part1_or_part2t("tur").unwrap(), "tr");
    assert_eq!(normalize_to_part1_or_part2t("es").unwrap(), "es");
}

#[test]
fn test_languageCodesMatch_acrossCodeForms_shouldMatch() {
    assert!(language_codes_match("de", "ger"));
    assert!(language_codes_match("en", "en-US"));
    assert!(!language_codes_match("en", "tr"));
    assert!(!language_codes_match("en", "zz"));
}

#[test]
fn test_getLanguageName_shouldReturnEnglishName() {
    assert_eq!(get_language_name("tr").unwrap(), "Turkish");
    assert_eq!(get_language_name("fra").unwrap(), "French");
    assert!(get_language_name("zz").is_err());
}

#[test]
fn test_providerCodeShapes_shouldMatchWireFormats() {
    assert_eq!(to_deepl_code("tr"), "TR");
    assert_eq!(to_deepl_code("en_us"), "EN-US");
    assert_eq!(to_lowercase_code("TR"), "tr");
    assert_eq!(to_lowercase_code("zh-cn"), "zh-CN");
    assert_eq!(to_locale("tr"), "tr-TR");
    assert_eq!(to_locale("en"), "en-US");
    assert_eq!(to_locale("pt-br"), "pt-BR");
}
