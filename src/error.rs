//! All error types for the vdfloc crate.
//!
//! These are processing errors: unreadable streams, unknown encodings, unresolvable
//! languages and malformed profile files. Malformed plural/gender markup is *not* an
//! error; it is reported as an issue string by the validator.

use thiserror::Error;

#[derive(Error, Debug)]
pub enum Error {
    #[error("unknown encoding `{0}`")]
    UnknownEncoding(String),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("stream seek error: {0}")]
    Seek(#[source] std::io::Error),

    #[error("encode error: {0}")]
    Encode(String),

    #[error("unknown language `{0}`")]
    UnknownLanguage(String),

    #[error("invalid grammar profile: {0}")]
    InvalidProfile(String),

    #[error("parse error: {0}")]
    Parse(#[from] serde_json::Error),
}

impl Error {
    /// Creates a new invalid profile error
    pub fn invalid_profile(message: impl Into<String>) -> Self {
        Error::InvalidProfile(message.into())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io;

    #[test]
    fn test_unknown_encoding_error() {
        let error = Error::UnknownEncoding("klingon-8".to_string());
        assert_eq!(error.to_string(), "unknown encoding `klingon-8`");
    }

    #[test]
    fn test_parse_error() {
        let json_error = serde_json::from_str::<serde_json::Value>("{ invalid json }").unwrap_err();
        let error = Error::Parse(json_error);
        assert!(error.to_string().contains("parse error"));
    }

    #[test]
    fn test_io_error() {
        let io_error = io::Error::new(io::ErrorKind::NotFound, "File not found");
        let error: Error = io_error.into();
        assert!(error.to_string().contains("I/O error"));
    }

    #[test]
    fn test_seek_error_keeps_source() {
        let io_error = io::Error::new(io::ErrorKind::Other, "cannot rewind");
        let error = Error::Seek(io_error);
        assert_eq!(error.to_string(), "stream seek error: cannot rewind");
        assert!(std::error::Error::source(&error).is_some());
    }

    #[test]
    fn test_unknown_language_error() {
        let error = Error::UnknownLanguage("elvish".to_string());
        assert_eq!(error.to_string(), "unknown language `elvish`");
    }

    #[test]
    fn test_invalid_profile_error() {
        let error = Error::invalid_profile("tag `#|x|#` is not a gender tag");
        assert_eq!(
            error.to_string(),
            "invalid grammar profile: tag `#|x|#` is not a gender tag"
        );
    }

    #[test]
    fn test_error_debug() {
        let error = Error::UnknownEncoding("test".to_string());
        let debug = format!("{:?}", error);
        assert!(debug.contains("UnknownEncoding"));
        assert!(debug.contains("test"));
    }
}
