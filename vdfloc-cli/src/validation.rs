use std::path::Path;

use vdfloc::EncodingLabel;

/// Validate file path exists and is readable
pub fn validate_file_path(path: &str) -> Result<(), String> {
    let path_obj = Path::new(path);

    if !path_obj.exists() {
        return Err(format!("File does not exist: {}", path));
    }

    if !path_obj.is_file() {
        return Err(format!("Path is not a file: {}", path));
    }

    Ok(())
}

/// Validate output directory exists or can be created
pub fn validate_output_path(path: &str) -> Result<(), String> {
    let path_obj = Path::new(path);

    if let Some(parent) = path_obj.parent() {
        if !parent.as_os_str().is_empty() && !parent.exists() {
            if let Err(e) = std::fs::create_dir_all(parent) {
                return Err(format!("Cannot create output directory: {}", e));
            }
        }
    }

    Ok(())
}

/// Validate an encoding name (`UTF8`, `UTF8BOM`, `UTF16LE`, `UTF16BE`, `UTF32LE`, `UTF32BE`)
pub fn validate_encoding_name(name: &str) -> Result<EncodingLabel, String> {
    name.trim().parse::<EncodingLabel>().map_err(|_| {
        format!(
            "Unsupported encoding: {}. Supported encodings: {}",
            name,
            EncodingLabel::ALL
                .iter()
                .map(EncodingLabel::as_str)
                .collect::<Vec<_>>()
                .join(", ")
        )
    })
}

/// Validate a language name as used by the grammar profiles
pub fn validate_language(lang: &str) -> Result<(), String> {
    if lang.trim().is_empty() {
        return Err("Language cannot be empty".to_string());
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_validate_file_path() {
        let temp_dir = TempDir::new().unwrap();
        let file = temp_dir.path().join("a.txt");
        std::fs::write(&file, "x").unwrap();

        assert!(validate_file_path(file.to_str().unwrap()).is_ok());
        assert!(
            validate_file_path(temp_dir.path().to_str().unwrap())
                .unwrap_err()
                .contains("not a file")
        );
        assert!(
            validate_file_path("/nope/missing.txt")
                .unwrap_err()
                .contains("does not exist")
        );
    }

    #[test]
    fn test_validate_output_path_creates_parent() {
        let temp_dir = TempDir::new().unwrap();
        let out = temp_dir.path().join("nested/dir/out.txt");
        assert!(validate_output_path(out.to_str().unwrap()).is_ok());
        assert!(temp_dir.path().join("nested/dir").is_dir());
        assert!(validate_output_path("bare.txt").is_ok());
    }

    #[test]
    fn test_validate_encoding_name() {
        assert_eq!(validate_encoding_name("utf-16be"), Ok(EncodingLabel::Utf16Be));
        let err = validate_encoding_name("latin1").unwrap_err();
        assert!(err.contains("UTF8, UTF8BOM, UTF16LE, UTF16BE, UTF32LE, UTF32BE"));
    }

    #[test]
    fn test_validate_language() {
        assert!(validate_language("french").is_ok());
        assert!(validate_language("  ").is_err());
    }
}
