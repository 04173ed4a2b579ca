//! CLI library for testing purposes

pub mod tokens;
pub mod validation;

pub use tokens::load_tokens;
