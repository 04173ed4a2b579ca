#![forbid(unsafe_code)]
//! Encoding sniffing and plural/gender markup validation for key/value localization files.
//!
//! Localized strings annotated with gender tags (`#|m|#`, `#|f|#`, ...) and plural
//! separators (`#|#`) must match the grammar of their target language before they reach
//! the game or application. This crate covers the two pieces needed for that:
//!
//! - [`encoding`]: detect a file's encoding from its BOM or content and read it as UTF-8;
//!   write UTF-8 back out as UTF-8, UTF-16 or UTF-32.
//! - [`validator`]: classify tokens by name suffix (`:p`, `:n`, `:g`, `:np`, `:gp`) and
//!   check their markup against a [`LanguageGrammarProfile`].
//!
//! # Quick Start
//!
//! ```rust,no_run
//! use vdfloc::{GrammarConfig, GrammarValidator, encoding};
//!
//! let config = GrammarConfig::load("pluralgender.json")?;
//! let (text, decision) = encoding::read_to_string("french.txt", None)?;
//! println!("read {} bytes of {}", text.len(), decision.label);
//!
//! let validator = GrammarValidator::new(&config);
//! if let Some(issue) = validator.check_variant("Noun1:np", "#|m|#Trésor#|m|#Trésors", "french")? {
//!     eprintln!("{}", issue);
//! }
//! # Ok::<(), Box<dyn std::error::Error>>(())
//! ```
//!
//! Processing is synchronous and side-effect free apart from the stream I/O; validators
//! only borrow their profile provider.

pub mod encoding;
pub mod error;
pub mod profile;
pub mod tags;
pub mod validator;

// Re-export most used types for easy consumption
pub use crate::{
    encoding::{
        DecodedReader, EncodedWriter, EncodingDecision, EncodingLabel, convert_buffer, detect,
        open_writer, open_writer_by_name,
    },
    error::Error,
    profile::{GrammarConfig, GrammarProfileProvider, LanguageGrammarProfile},
    tags::{GENDER_TAGS, PLURAL_TAG, Token, VariantKind},
    validator::{GrammarValidator, TokenIssue, check_plain_token, filter_variant_tokens},
};
