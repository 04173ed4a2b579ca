//! Token input for the `check` and `filter` commands.
//!
//! The container format itself is parsed elsewhere; the CLI takes its tokens as a flat
//! JSON object mapping token names to values:
//!
//! ```json
//! { "Noun1:np": "#|m|#Trésor#|m|#Trésors", "Title": "Trésor" }
//! ```

use std::{fs::File, io::BufReader};

use serde_json::{Map, Value};

/// Loads `(name, value)` pairs from a flat JSON object, sorted by token name.
pub fn load_tokens(path: &str) -> Result<Vec<(String, String)>, String> {
    let file = File::open(path).map_err(|e| format!("Cannot open {}: {}", path, e))?;
    let map: Map<String, Value> = serde_json::from_reader(BufReader::new(file))
        .map_err(|e| format!("Invalid token file {}: {}", path, e))?;

    map.into_iter()
        .map(|(name, value)| match value {
            Value::String(s) => Ok((name, s)),
            other => Err(format!(
                "Token '{}' must have a string value, found: {}",
                name, other
            )),
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    #[test]
    fn test_load_tokens() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("tokens.json");
        fs::write(&path, r##"{"b:n": "#|m|#x", "a": "plain"}"##).unwrap();

        let tokens = load_tokens(path.to_str().unwrap()).unwrap();
        assert_eq!(
            tokens,
            vec![
                ("a".to_string(), "plain".to_string()),
                ("b:n".to_string(), "#|m|#x".to_string()),
            ]
        );
    }

    #[test]
    fn test_load_tokens_rejects_non_string_values() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("tokens.json");
        fs::write(&path, r#"{"count": 3}"#).unwrap();

        let err = load_tokens(path.to_str().unwrap()).unwrap_err();
        assert!(err.contains("must have a string value"));
    }

    #[test]
    fn test_load_tokens_missing_file() {
        let err = load_tokens("/no/such/tokens.json").unwrap_err();
        assert!(err.starts_with("Cannot open"));
    }
}
