//! Plural/gender markup vocabulary and token classification.
//!
//! Token names carry a suffix telling which kind of markup their value holds,
//! e.g. `Item_Sword:np` or `Count_Apples:p{count}`. Values carry the markup itself:
//! gender tags such as `#|m|#` and the plural separator `#|#`.

use std::{fmt::Display, str::FromStr};

use lazy_static::lazy_static;
use regex::Regex;
use serde::{Deserialize, Serialize};

/// The fixed universe of gender tags.
pub const GENDER_TAGS: [&str; 7] = [
    "#|f|#", "#|n|#", "#|c|#", "#|m|#", "#|ma|#", "#|mi|#", "#|mp|#",
];

/// Separator between successive plural forms.
pub const PLURAL_TAG: &str = "#|#";

lazy_static! {
    // Plain suffix, or the parameterized `:p{name}` plural form. The alternation
    // lists two-letter suffixes first so `:np` never classifies as `:p`.
    static ref VARIANT_SUFFIX_REGEX: Regex =
        Regex::new(r":(np|gp|p|n|g)$|:p\{[A-Za-z0-9_:]+\}$").unwrap();
}

/// Returns true when `tag` is one of the seven recognized gender tags.
pub fn is_gender_tag(tag: &str) -> bool {
    GENDER_TAGS.contains(&tag)
}

/// Every markup literal: the gender tags followed by the plural separator.
pub fn all_tags() -> impl Iterator<Item = &'static str> {
    GENDER_TAGS.into_iter().chain(std::iter::once(PLURAL_TAG))
}

/// Kind of markup a token carries, decided by its name suffix.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum VariantKind {
    /// `:p` - plural forms separated by `#|#`.
    Plural,
    /// `:n` - exactly one gender tag.
    GenderSender,
    /// `:g` - one form per gender tag of the language.
    GenderReceiver,
    /// `:np` - one gender tag per plural form.
    GenderSenderPlural,
    /// `:gp` - one group of gender forms per plural form.
    GenderReceiverPlural,
}

impl VariantKind {
    pub const ALL: [VariantKind; 5] = [
        VariantKind::Plural,
        VariantKind::GenderSender,
        VariantKind::GenderReceiver,
        VariantKind::GenderSenderPlural,
        VariantKind::GenderReceiverPlural,
    ];

    pub fn suffix(&self) -> &'static str {
        match self {
            VariantKind::Plural => ":p",
            VariantKind::GenderSender => ":n",
            VariantKind::GenderReceiver => ":g",
            VariantKind::GenderSenderPlural => ":np",
            VariantKind::GenderReceiverPlural => ":gp",
        }
    }

    /// Classifies a token by the suffix anchored at the end of its name.
    ///
    /// Returns `None` for plain tokens.
    pub fn classify(token_name: &str) -> Option<VariantKind> {
        let caps = VARIANT_SUFFIX_REGEX.captures(token_name)?;
        match caps.get(1) {
            Some(m) => format!(":{}", m.as_str()).parse().ok(),
            // Only `:p` accepts the `{name}` extension.
            None => Some(VariantKind::Plural),
        }
    }
}

impl Display for VariantKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.suffix())
    }
}

impl FromStr for VariantKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        VariantKind::ALL
            .into_iter()
            .find(|kind| kind.suffix() == s)
            .ok_or_else(|| format!("unknown variant suffix `{}`", s))
    }
}

/// A token as supplied by the container parser.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Token {
    pub name: String,
    pub raw_value: String,
    /// `None` for plain tokens.
    pub variant: Option<VariantKind>,
}

impl Token {
    pub fn new(name: impl Into<String>, raw_value: impl Into<String>) -> Self {
        let name = name.into();
        let variant = VariantKind::classify(&name);
        Token {
            name,
            raw_value: raw_value.into(),
            variant,
        }
    }

    pub fn is_variant(&self) -> bool {
        self.variant.is_some()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_classify_plain_suffixes() {
        assert_eq!(VariantKind::classify("Apples:p"), Some(VariantKind::Plural));
        assert_eq!(
            VariantKind::classify("Hero:n"),
            Some(VariantKind::GenderSender)
        );
        assert_eq!(
            VariantKind::classify("Sword_Adj:g"),
            Some(VariantKind::GenderReceiver)
        );
        assert_eq!(
            VariantKind::classify("Noun1:np"),
            Some(VariantKind::GenderSenderPlural)
        );
        assert_eq!(
            VariantKind::classify("Adjective1:gp"),
            Some(VariantKind::GenderReceiverPlural)
        );
    }

    #[test]
    fn test_classify_parameterized_plural() {
        assert_eq!(
            VariantKind::classify("Apples:p{count}"),
            Some(VariantKind::Plural)
        );
        assert_eq!(
            VariantKind::classify("Apples:p{inner:value_2}"),
            Some(VariantKind::Plural)
        );
        // Only the plural suffix takes a parameter.
        assert_eq!(VariantKind::classify("Hero:n{count}"), None);
        assert_eq!(VariantKind::classify("Noun:np{count}"), None);
        assert_eq!(VariantKind::classify("Apples:p{}"), None);
    }

    #[test]
    fn test_classify_is_anchored_at_end() {
        assert_eq!(VariantKind::classify("Apples:p_title"), None);
        assert_eq!(VariantKind::classify("Menu:gp:title"), None);
        assert_eq!(VariantKind::classify("plain_token"), None);
        assert_eq!(VariantKind::classify("p"), None);
        assert_eq!(VariantKind::classify(""), None);
    }

    #[test]
    fn test_classify_needs_colon_before_suffix() {
        assert_eq!(VariantKind::classify("Shop"), None);
        assert_eq!(VariantKind::classify("Big"), None);
        assert_eq!(VariantKind::classify("x:xnp"), None);
    }

    #[test]
    fn test_suffix_roundtrip_through_from_str() {
        for kind in VariantKind::ALL {
            assert_eq!(kind.suffix().parse::<VariantKind>(), Ok(kind));
        }
        assert!(":x".parse::<VariantKind>().is_err());
    }

    #[test]
    fn test_all_tags_ends_with_plural_separator() {
        let tags: Vec<&str> = all_tags().collect();
        assert_eq!(tags.len(), 8);
        assert_eq!(tags.last(), Some(&PLURAL_TAG));
        assert!(tags[..7].iter().all(|tag| is_gender_tag(tag)));
        assert!(!is_gender_tag(PLURAL_TAG));
    }

    #[test]
    fn test_token_new_classifies() {
        let token = Token::new("Noun1:np", "#|m|#Trésor#|m|#Trésors");
        assert_eq!(token.variant, Some(VariantKind::GenderSenderPlural));
        assert!(token.is_variant());
        assert!(!Token::new("Title", "Hello").is_variant());
    }
}
