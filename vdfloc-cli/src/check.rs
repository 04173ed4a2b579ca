use vdfloc::{GrammarConfig, GrammarValidator, filter_variant_tokens};
use vdfloc_cli::{
    load_tokens,
    validation::{validate_file_path, validate_language},
};

/// Run the check command: report every markup issue, one per line.
///
/// Exit code 0 when clean, 1 when issues were found, 2 on processing errors.
pub fn run_check_command(tokens_path: &str, lang: &str, profiles_path: &str) -> i32 {
    if let Err(e) = validate_language(lang)
        .and_then(|_| validate_file_path(tokens_path))
        .and_then(|_| validate_file_path(profiles_path))
    {
        eprintln!("Error: {}", e);
        return 2;
    }

    let config = match GrammarConfig::load(profiles_path) {
        Ok(config) => config,
        Err(e) => {
            eprintln!("Error loading profiles {}: {}", profiles_path, e);
            return 2;
        }
    };
    let tokens = match load_tokens(tokens_path) {
        Ok(tokens) => tokens,
        Err(e) => {
            eprintln!("Error: {}", e);
            return 2;
        }
    };

    let validator = GrammarValidator::new(&config);
    match validator.collect_issues(tokens, lang) {
        Ok(issues) if issues.is_empty() => {
            println!("✅ No plural/gender issues found");
            0
        }
        Ok(issues) => {
            for issue in &issues {
                println!("{}: {}", issue.token, issue.message);
            }
            eprintln!("❌ {} issue(s) found", issues.len());
            1
        }
        Err(e) => {
            eprintln!("Error: {}", e);
            2
        }
    }
}

/// Run the filter command: print the names of plural/gender tokens.
pub fn run_filter_command(tokens_path: &str) -> i32 {
    let tokens = match load_tokens(tokens_path) {
        Ok(tokens) => tokens,
        Err(e) => {
            eprintln!("Error: {}", e);
            return 2;
        }
    };

    for name in filter_variant_tokens(tokens.iter().map(|(name, _)| name.as_str())) {
        println!("{}", name);
    }
    0
}
