use std::fs;

use indoc::indoc;
use tempfile::TempDir;
use vdfloc::profile::DEFAULT_PROFILE_FILE;
use vdfloc::{
    Error, GrammarConfig, GrammarProfileProvider, GrammarValidator, LanguageGrammarProfile,
    check_plain_token, filter_variant_tokens,
};

const PROFILES: &str = indoc! {r##"
    {
        "languages": {
            "english":  { "genders": [], "plurals": 2 },
            "french":   { "genders": ["#|m|#", "#|f|#"], "plurals": 2 },
            "german":   { "genders": ["#|m|#", "#|f|#", "#|n|#"], "plurals": 2 },
            "polish":   { "genders": ["#|ma|#", "#|mi|#", "#|f|#", "#|n|#"], "plurals": 3 },
            "schinese": { "genders": [], "plurals": 0 }
        }
    }
"##};

fn load_config() -> GrammarConfig {
    let temp_dir = TempDir::new().unwrap();
    let path = temp_dir.path().join(DEFAULT_PROFILE_FILE);
    fs::write(&path, PROFILES).unwrap();
    GrammarConfig::load(&path).unwrap()
}

#[test]
fn test_profiles_load_from_file() {
    let config = load_config();
    assert_eq!(config.len(), 5);
    assert_eq!(config.plural_form_count("polish").unwrap(), 3);
    assert_eq!(config.gender_tags("german").unwrap().len(), 3);
}

#[test]
fn test_french_token_batch() {
    let config = load_config();
    let validator = GrammarValidator::new(&config);
    let tokens = [
        ("Title", "Trésor"),
        ("Noun1:np", "#|m|#Trésor#|m|#Trésors"),
        ("Adjective1:gp", "#|m|#peu Commun#|f|#peu Commune#|m|#peu Communs#|f|#peu Communes"),
        ("Adjective2:gp", "#|m|#Rare#|m|#Rares#|f|#Rare#|f|#Rares"),
        ("Hero:n", "#|f|#Héroïne"),
        ("Owner:g", "#|m|#son#|f|#sa"),
        ("Count:p{count}", "%count% pièce#|#%count% pièces"),
        ("Stray", "Rare#|#Rares"),
    ];

    let issues = validator.collect_issues(tokens, "french").unwrap();
    let names: Vec<&str> = issues.iter().map(|i| i.token.as_str()).collect();
    assert_eq!(names, ["Adjective2:gp", "Stray"]);
    assert!(issues[0].message.contains("incorrect order plural form: 2"));
    assert!(issues[1].message.contains("(#|#)"));
}

#[test]
fn test_polish_receiver_plural_with_four_genders() {
    let config = load_config();
    let validator = GrammarValidator::new(&config);
    let group = "#|ma|#a#|mi|#b#|f|#c#|n|#d";
    let value = group.repeat(3);
    assert_eq!(validator.check_variant("Adj:gp", &value, "polish").unwrap(), None);

    let short = group.repeat(2);
    let issue = validator.check_variant("Adj:gp", &short, "polish").unwrap().unwrap();
    assert!(issue.contains("found 2 occurrences while expecting 3"));
}

#[test]
fn test_genderless_language_plural_fallback() {
    let config = load_config();
    let validator = GrammarValidator::new(&config);
    assert_eq!(validator.check_variant("Noun:np", "apple#|#apples", "english").unwrap(), None);
    assert_eq!(validator.check_variant("Noun:gp", "apple#|#apples", "english").unwrap(), None);
    assert!(validator.check_variant("Noun:np", "#|m|#apple", "english").unwrap().is_some());
}

#[test]
fn test_language_without_plurals() {
    let config = load_config();
    let validator = GrammarValidator::new(&config);
    assert_eq!(validator.check_variant("Apples:p", "苹果", "schinese").unwrap(), None);
    assert_eq!(
        validator.check_variant("Apples:p", "苹果#|#苹果", "schinese").unwrap().as_deref(),
        Some("Expected number of plural forms: 1 - found: 2")
    );
}

#[test]
fn test_unknown_language_halts_batch() {
    let config = load_config();
    let validator = GrammarValidator::new(&config);
    let err = validator
        .collect_issues([("Stray", "#|m|#x"), ("Apples:p", "a#|#b")], "klingon")
        .unwrap_err();
    assert!(matches!(err, Error::UnknownLanguage(ref l) if l == "klingon"));
}

#[test]
fn test_custom_provider() {
    struct Fixed(LanguageGrammarProfile);

    impl GrammarProfileProvider for Fixed {
        fn profile(&self, _language: &str) -> Result<&LanguageGrammarProfile, Error> {
            Ok(&self.0)
        }
    }

    let provider = Fixed(LanguageGrammarProfile::new(["#|c|#", "#|n|#"], 1));
    let validator = GrammarValidator::new(&provider);
    assert_eq!(validator.check_variant("Adj:g", "#|c|#x#|n|#y", "any").unwrap(), None);
}

#[test]
fn test_filter_and_plain_check_together() {
    let names = ["Title", "Noun1:np", "Desc", "Count:p{n}"];
    let variants = filter_variant_tokens(names);
    assert_eq!(variants, ["Noun1:np", "Count:p{n}"]);
    let plain: Vec<&str> = names.into_iter().filter(|n| !variants.contains(n)).collect();
    assert_eq!(plain, ["Title", "Desc"]);
    assert!(check_plain_token("Desc", "#|mp|#x").is_some());
}
