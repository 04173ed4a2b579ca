use std::{fs::File, io::BufWriter};

use vdfloc::{Error, detect, open_writer};
use vdfloc_cli::validation::{validate_encoding_name, validate_file_path, validate_output_path};

/// Run the transcode command: decode `input` and write it to `output` in encoding `to`.
pub fn run_transcode_command(input: &str, output: &str, to: &str, encoding_name: Option<&str>) -> i32 {
    let label = match validate_file_path(input)
        .and_then(|_| validate_output_path(output))
        .and_then(|_| validate_encoding_name(to))
    {
        Ok(label) => label,
        Err(e) => {
            eprintln!("Error: {}", e);
            return 2;
        }
    };

    let result = (|| -> Result<_, Error> {
        let (mut reader, decision) = detect(File::open(input)?, encoding_name)?;
        let mut writer = open_writer(BufWriter::new(File::create(output)?), label)?;
        std::io::copy(&mut reader, &mut writer)?;
        writer.finish()?;
        Ok(decision)
    })();

    match result {
        Ok(decision) => {
            tracing::info!(input, output, from = %decision.label, to = %label, "transcoded");
            println!("✅ {} ({}) -> {} ({})", input, decision.label, output, label);
            0
        }
        Err(e) => {
            eprintln!("Error transcoding {}: {}", input, e);
            2
        }
    }
}
