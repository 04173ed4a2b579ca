mod check;
mod detect;
mod transcode;

use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;
use vdfloc::profile::DEFAULT_PROFILE_FILE;

use crate::{
    check::{run_check_command, run_filter_command},
    detect::run_detect_command,
    transcode::run_transcode_command,
};

#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Log debug events to stderr (overridden by RUST_LOG)
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    commands: Commands,
}

/// Supported subcommands.
#[derive(Subcommand, Debug)]
enum Commands {
    /// Detect the text encoding of a file.
    Detect {
        /// The input file to inspect
        #[arg(short, long)]
        input: String,
        /// Encoding to assume when the file has no BOM
        #[arg(short, long)]
        encoding: Option<String>,
    },

    /// Re-encode a file into another Unicode encoding.
    Transcode {
        /// The input file to process
        #[arg(short, long)]
        input: String,
        /// The output file to write the results to
        #[arg(short, long)]
        output: String,
        /// Target encoding: UTF8, UTF8BOM, UTF16LE, UTF16BE, UTF32LE or UTF32BE
        #[arg(short, long)]
        to: String,
        /// Encoding to assume when the input has no BOM
        #[arg(short, long)]
        encoding: Option<String>,
    },

    /// Check plural/gender markup of tokens against a language profile.
    Check {
        /// JSON object mapping token names to values
        #[arg(short, long)]
        tokens: String,
        /// Language of the token values
        #[arg(short, long)]
        lang: String,
        /// Grammar profile file
        #[arg(short, long, default_value = DEFAULT_PROFILE_FILE)]
        profiles: String,
    },

    /// List the plural/gender tokens of a token file.
    Filter {
        /// JSON object mapping token names to values
        #[arg(short, long)]
        tokens: String,
    },
}

fn init_logging(verbose: bool) {
    let default_level = if verbose { "debug" } else { "warn" };
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

fn main() {
    let args = Args::parse();
    init_logging(args.verbose);

    let code = match args.commands {
        Commands::Detect { input, encoding } => run_detect_command(&input, encoding.as_deref()),
        Commands::Transcode {
            input,
            output,
            to,
            encoding,
        } => run_transcode_command(&input, &output, &to, encoding.as_deref()),
        Commands::Check {
            tokens,
            lang,
            profiles,
        } => run_check_command(&tokens, &lang, &profiles),
        Commands::Filter { tokens } => run_filter_command(&tokens),
    };
    std::process::exit(code);
}
