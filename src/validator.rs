//! Plural/gender markup validation.
//!
//! [`GrammarValidator`] checks a token value against the grammar profile of its
//! language. Malformed markup is reported as an issue message (`Ok(Some(..))`);
//! only failures to resolve the language are errors.

use serde::Serialize;

use crate::{
    error::Error,
    profile::{GrammarProfileProvider, LanguageGrammarProfile},
    tags::{GENDER_TAGS, PLURAL_TAG, Token, VariantKind, all_tags},
};

/// A syntax issue found in one token, for batch reporting.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TokenIssue {
    pub token: String,
    pub language: String,
    pub message: String,
}

/// Validates token values against the profiles of a [`GrammarProfileProvider`].
#[derive(Debug)]
pub struct GrammarValidator<'a, P: ?Sized> {
    provider: &'a P,
}

impl<'a, P: GrammarProfileProvider + ?Sized> GrammarValidator<'a, P> {
    pub fn new(provider: &'a P) -> Self {
        GrammarValidator { provider }
    }

    /// Checks the value of a plural/gender token.
    ///
    /// Returns `Ok(None)` when the markup is well formed or when the token name has no
    /// variant suffix; plain tokens are checked by [`check_plain_token`] instead.
    pub fn check_variant(
        &self,
        token_name: &str,
        value: &str,
        language: &str,
    ) -> Result<Option<String>, Error> {
        let Some(kind) = VariantKind::classify(token_name) else {
            return Ok(None);
        };
        tracing::trace!(token = token_name, language, variant = %kind, "checking variant");

        let profile = self.provider.profile(language)?;
        let issue = check_kind(kind, value, profile);
        if let Some(message) = &issue {
            tracing::debug!(token = token_name, language, %message, "markup issue");
        }
        Ok(issue)
    }

    /// Checks any token: variant markup for plural/gender tokens, stray markup otherwise.
    pub fn check_token(&self, token: &Token, language: &str) -> Result<Option<String>, Error> {
        match token.variant {
            Some(_) => self.check_variant(&token.name, &token.raw_value, language),
            None => Ok(check_plain_token(&token.name, &token.raw_value)),
        }
    }

    /// Checks a batch of `(name, value)` pairs and collects every issue found.
    ///
    /// Stops at the first processing error (e.g. unknown language).
    pub fn collect_issues<I, K, V>(&self, tokens: I, language: &str) -> Result<Vec<TokenIssue>, Error>
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<String>,
    {
        let mut issues = Vec::new();
        for (name, value) in tokens {
            let token = Token::new(name, value);
            if let Some(message) = self.check_token(&token, language)? {
                issues.push(TokenIssue {
                    token: token.name,
                    language: language.to_string(),
                    message,
                });
            }
        }
        Ok(issues)
    }
}

/// Keeps only the plural/gender token names.
pub fn filter_variant_tokens<'t, I>(names: I) -> Vec<&'t str>
where
    I: IntoIterator<Item = &'t str>,
{
    names
        .into_iter()
        .filter(|name| VariantKind::classify(name).is_some())
        .collect()
}

/// Flags gender tags or plural separators in the value of a plain token.
pub fn check_plain_token(token_name: &str, value: &str) -> Option<String> {
    all_tags().find(|tag| value.contains(tag)).map(|tag| {
        format!(
            "Error - found plural separators and/or gender tags ({}) in a non gendered/plural token: {} - {}",
            tag, token_name, value
        )
    })
}

fn check_kind(kind: VariantKind, value: &str, profile: &LanguageGrammarProfile) -> Option<String> {
    match kind {
        VariantKind::Plural => check_plural(value, profile),
        VariantKind::GenderSender => check_gender_sender(value, profile),
        VariantKind::GenderReceiver => check_gender_receiver(value, profile),
        VariantKind::GenderSenderPlural => check_gender_sender_plural(value, profile),
        VariantKind::GenderReceiverPlural => check_gender_receiver_plural(value, profile),
    }
}

fn count(value: &str, tag: &str) -> usize {
    value.matches(tag).count()
}

/// `N` plural forms need `N - 1` separators.
fn expected_separators(profile: &LanguageGrammarProfile) -> usize {
    profile.plural_form_count.saturating_sub(1)
}

fn check_plural(value: &str, profile: &LanguageGrammarProfile) -> Option<String> {
    let expected = expected_separators(profile);
    let found = count(value, PLURAL_TAG);
    (found != expected).then(|| {
        format!(
            "Expected number of plural forms: {} - found: {}",
            expected + 1,
            found + 1
        )
    })
}

/// Gender-less languages separate the forms of `:np`/`:gp` tokens with the plural tag.
fn check_plural_fallback(value: &str, profile: &LanguageGrammarProfile) -> Option<String> {
    let expected = expected_separators(profile);
    let found = count(value, PLURAL_TAG);
    (found != expected).then(|| {
        format!(
            "Error with gender/plural form: found {} plural forms, while expecting {} separated with a plural tag",
            found + 1,
            expected + 1
        )
    })
}

fn check_gender_sender(value: &str, profile: &LanguageGrammarProfile) -> Option<String> {
    let list = profile.gender_list();
    let mut matched = 0;

    for tag in GENDER_TAGS {
        let ct = count(value, tag);
        let allowed = profile.has_gender(tag);
        if ct > 1 || (ct == 1 && !allowed) {
            return Some(if list.is_empty() {
                format!("Error with gender form: {} - no gender expected", tag)
            } else {
                format!("Error with gender form: {} - expected only one of: {}", tag, list)
            });
        }
        matched += ct;
    }

    (!profile.gender_tags.is_empty() && matched != 1)
        .then(|| format!("Error with gender form - expected {}", list))
}

fn check_gender_receiver(value: &str, profile: &LanguageGrammarProfile) -> Option<String> {
    let list = profile.gender_list();
    let mut matched = 0;
    let mut first_position: Option<usize> = None;

    for tag in GENDER_TAGS {
        let ct = count(value, tag);
        let allowed = profile.has_gender(tag);
        if (allowed && ct != 1) || (!allowed && ct != 0) {
            return Some(if list.is_empty() {
                format!("Error with gender form: {} - no gender expected", tag)
            } else {
                format!("Error with gender form: {} - expected one of each: {}", tag, list)
            });
        }
        if !allowed {
            continue;
        }
        if let Some(position) = value.find(tag) {
            matched += 1;
            first_position = Some(first_position.map_or(position, |p| p.min(position)));
        }
    }

    if matched != profile.gender_tags.len() {
        return Some(format!("Error with gender form - expected {}", list));
    }

    match first_position {
        Some(position) if profile.gender_tags.len() > 1 && position > 0 => Some(format!(
            "Error with gender form - the first gender tag should be at the beginning of the string. Found at position {}",
            position
        )),
        _ => None,
    }
}

fn check_gender_sender_plural(value: &str, profile: &LanguageGrammarProfile) -> Option<String> {
    if profile.gender_tags.is_empty() {
        return check_plural_fallback(value, profile);
    }

    let mut total = 0;
    for tag in GENDER_TAGS {
        let ct = count(value, tag);
        if ct > 0 && !profile.has_gender(tag) {
            return Some(format!(
                "Error with gender/plural form: this tag was unexpected {}",
                tag
            ));
        }
        total += ct;
    }

    (total != profile.plural_form_count).then(|| {
        format!(
            "Error with gender/plural forms - counted {} while expecting {}",
            total, profile.plural_form_count
        )
    })
}

fn check_gender_receiver_plural(value: &str, profile: &LanguageGrammarProfile) -> Option<String> {
    if profile.gender_tags.is_empty() {
        return check_plural_fallback(value, profile);
    }

    let list = profile.gender_list();
    let plurals = profile.plural_form_count;

    // Each allowed tag must appear once per plural form; nothing else may appear.
    for tag in GENDER_TAGS {
        let ct = count(value, tag);
        let allowed = profile.has_gender(tag);
        if (allowed && ct != plurals) || (!allowed && ct != 0) {
            return Some(if allowed {
                format!(
                    "Error with gender/plural form: {} - found {} occurrences while expecting {} of each gender group: {}",
                    tag, ct, plurals, list
                )
            } else {
                format!("Error with gender/plural form: {} - no gender expected", tag)
            });
        }
    }

    // positions[g][p]: byte offset of the p-th occurrence of the g-th profile tag.
    let positions: Vec<Vec<usize>> = profile
        .gender_tags
        .iter()
        .map(|tag| value.match_indices(tag.as_str()).map(|(i, _)| i).collect())
        .collect();

    // Group p must start after every tag of group p - 1.
    let mut previous_max = 0;
    for group in 0..plurals {
        let mut group_max = 0;
        for (tag, occurrences) in profile.gender_tags.iter().zip(&positions) {
            let position = occurrences[group];
            if group > 0 && position < previous_max {
                return Some(format!(
                    "Error with gender/plural form: incorrect order plural form: {}, gender tag: {}",
                    group + 1,
                    tag
                ));
            }
            group_max = group_max.max(position);
        }
        previous_max = group_max;
    }
    None
}
