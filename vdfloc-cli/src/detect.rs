use std::fs::File;

use vdfloc::encoding;
use vdfloc_cli::validation::validate_file_path;

/// Run the detect command: print the encoding label and BOM length of a file.
pub fn run_detect_command(input: &str, encoding_name: Option<&str>) -> i32 {
    if let Err(e) = validate_file_path(input) {
        eprintln!("Error: {}", e);
        return 2;
    }

    let file = match File::open(input) {
        Ok(file) => file,
        Err(e) => {
            eprintln!("Error opening {}: {}", input, e);
            return 2;
        }
    };

    // Only the head of the file is read; content past the sniffed window is not decoded.
    match encoding::detect(file, encoding_name) {
        Ok((_, decision)) => {
            println!("{}: {} (BOM: {} bytes)", input, decision.label, decision.bom_length);
            0
        }
        Err(e) => {
            eprintln!("Error reading {}: {}", input, e);
            2
        }
    }
}
