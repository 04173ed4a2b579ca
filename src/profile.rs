//! Per-language grammar profiles: which gender tags a language uses and how many
//! plural forms it distinguishes.
//!
//! Profiles are loaded once into a [`GrammarConfig`] and handed to the validator by
//! reference. Any other source can be plugged in by implementing
//! [`GrammarProfileProvider`].

use std::{
    collections::{BTreeMap, BTreeSet},
    fs::File,
    io::{BufReader, Read},
    path::Path,
};

use serde::{Deserialize, Serialize};
use unic_langid::LanguageIdentifier;

use crate::{error::Error, tags::is_gender_tag};

/// Default profile file name, looked up in the working directory.
pub const DEFAULT_PROFILE_FILE: &str = "pluralgender.json";

/// Grammatical profile of one language.
#[derive(Debug, Clone, PartialEq, Eq, Default, Deserialize, Serialize)]
pub struct LanguageGrammarProfile {
    /// Gender tags meaningful for the language, in authoring order.
    #[serde(rename = "genders", default)]
    pub gender_tags: Vec<String>,
    /// Number of plural forms. `0` means plurals are not meaningful.
    #[serde(rename = "plurals", default)]
    pub plural_form_count: usize,
}

impl LanguageGrammarProfile {
    pub fn new<I, S>(gender_tags: I, plural_form_count: usize) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        LanguageGrammarProfile {
            gender_tags: gender_tags.into_iter().map(Into::into).collect(),
            plural_form_count,
        }
    }

    pub fn has_gender(&self, tag: &str) -> bool {
        self.gender_tags.iter().any(|g| g == tag)
    }

    /// Gender tags joined for diagnostics, e.g. `#|m|#,#|f|#`.
    pub fn gender_list(&self) -> String {
        self.gender_tags.join(",")
    }

    fn validate(&self, language: &str) -> Result<(), Error> {
        let mut seen = BTreeSet::new();
        for tag in &self.gender_tags {
            if !is_gender_tag(tag) {
                return Err(Error::invalid_profile(format!(
                    "language '{}': `{}` is not a gender tag",
                    language, tag
                )));
            }
            if !seen.insert(tag.as_str()) {
                return Err(Error::invalid_profile(format!(
                    "language '{}': gender tag `{}` listed twice",
                    language, tag
                )));
            }
        }
        Ok(())
    }
}

/// Source of grammar profiles, keyed by language identifier.
pub trait GrammarProfileProvider {
    /// Resolves a language; an unknown language is an [`Error::UnknownLanguage`].
    fn profile(&self, language: &str) -> Result<&LanguageGrammarProfile, Error>;

    fn plural_form_count(&self, language: &str) -> Result<usize, Error> {
        Ok(self.profile(language)?.plural_form_count)
    }

    fn gender_tags(&self, language: &str) -> Result<&[String], Error> {
        Ok(&self.profile(language)?.gender_tags)
    }
}

/// Grammar profiles for a set of languages, usually loaded from JSON:
///
/// ```json
/// { "languages": { "french": { "genders": ["#|m|#", "#|f|#"], "plurals": 2 } } }
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Default, Deserialize, Serialize)]
pub struct GrammarConfig {
    #[serde(default)]
    languages: BTreeMap<String, LanguageGrammarProfile>,
}

impl GrammarConfig {
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds or replaces a language profile.
    pub fn insert(
        &mut self,
        language: &str,
        profile: LanguageGrammarProfile,
    ) -> Result<(), Error> {
        profile.validate(language)?;
        self.languages.insert(normalize_language(language), profile);
        Ok(())
    }

    /// Builder-style [`GrammarConfig::insert`].
    pub fn with_language(
        mut self,
        language: &str,
        profile: LanguageGrammarProfile,
    ) -> Result<Self, Error> {
        self.insert(language, profile)?;
        Ok(self)
    }

    pub fn from_json_str(json: &str) -> Result<Self, Error> {
        let raw: GrammarConfig = serde_json::from_str(json)?;
        Self::from_raw(raw)
    }

    pub fn from_reader<R: Read>(reader: R) -> Result<Self, Error> {
        let raw: GrammarConfig = serde_json::from_reader(reader)?;
        Self::from_raw(raw)
    }

    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self, Error> {
        let file = File::open(path.as_ref()).map_err(Error::Io)?;
        let config = Self::from_reader(BufReader::new(file))?;
        tracing::debug!(
            path = %path.as_ref().display(),
            languages = config.languages.len(),
            "loaded grammar profiles"
        );
        Ok(config)
    }

    pub fn languages(&self) -> impl Iterator<Item = &str> {
        self.languages.keys().map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.languages.len()
    }

    pub fn is_empty(&self) -> bool {
        self.languages.is_empty()
    }

    fn from_raw(raw: GrammarConfig) -> Result<Self, Error> {
        let mut config = GrammarConfig::new();
        for (language, profile) in raw.languages {
            config.insert(&language, profile)?;
        }
        Ok(config)
    }
}

impl GrammarProfileProvider for GrammarConfig {
    fn profile(&self, language: &str) -> Result<&LanguageGrammarProfile, Error> {
        let key = normalize_language(language);
        if let Some(profile) = self.languages.get(&key) {
            return Ok(profile);
        }
        // Fall back to the primary subtag of a BCP 47 identifier (fr-CA -> fr).
        key.parse::<LanguageIdentifier>()
            .ok()
            .and_then(|lang_id| self.languages.get(lang_id.language.as_str()))
            .ok_or_else(|| Error::UnknownLanguage(language.to_string()))
    }
}

fn normalize_language(language: &str) -> String {
    language.trim().to_lowercase().replace('_', "-")
}
