// goldmerge CLI - merge overlapping CSV sources into one golden table

mod exit_codes;
mod recon;

use std::path::PathBuf;
use std::process::ExitCode;

use clap::{Parser, Subcommand};
use env_logger::Env;

use exit_codes::EXIT_SUCCESS;
use goldmerge_recon::config::{DEFAULT_LIMIT, DEFAULT_THRESHOLD};

#[derive(Parser)]
#[command(name = "goldmerge")]
#[command(about = "Fuzzy entity resolution across ordered CSV sources")]
#[command(long_version = long_version())]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run a merge from a TOML config file
    #[command(after_help = "\
Examples:
  goldmerge run colleges.merge.toml
  goldmerge run colleges.merge.toml --json
  goldmerge run colleges.merge.toml --output report.json")]
    Run {
        /// Path to the .merge.toml config file
        config: PathBuf,

        /// Print the JSON run report to stdout
        #[arg(long)]
        json: bool,

        /// Write the JSON run report to file
        #[arg(long)]
        output: Option<PathBuf>,

        /// Suppress the summary line on stderr
        #[arg(long, short = 'q')]
        quiet: bool,
    },

    /// Merge CSV files given on the command line, in order
    #[command(after_help = "\
Examples:
  goldmerge merge data_1.csv data_2.csv data_3.csv --key name
  goldmerge merge a.csv b.csv --key name --key city --threshold 90 -o golden.csv
  goldmerge merge a.csv b.csv --key name --stop-words common_words.json")]
    Merge {
        /// Source CSV files; the first seeds the golden table
        #[arg(required = true)]
        files: Vec<PathBuf>,

        /// Key column (repeat for a composite key, order matters)
        #[arg(long, short = 'k', required = true)]
        key: Vec<String>,

        /// Minimum similarity (0-100) for two records to be the same entity
        #[arg(long, default_value_t = DEFAULT_THRESHOLD)]
        threshold: u8,

        /// Candidates considered per record
        #[arg(long, default_value_t = DEFAULT_LIMIT)]
        limit: usize,

        /// Stop-word JSON resource ({"words": [...]})
        #[arg(long, env = "GOLDMERGE_STOP_WORDS")]
        stop_words: Option<PathBuf>,

        /// Write the golden CSV here instead of stdout
        #[arg(long, short = 'o')]
        output: Option<PathBuf>,

        /// Write the JSON run report to file
        #[arg(long)]
        report: Option<PathBuf>,

        /// Suppress the summary line on stderr
        #[arg(long, short = 'q')]
        quiet: bool,
    },

    /// Validate a merge config without running
    #[command(after_help = "\
Examples:
  goldmerge validate colleges.merge.toml")]
    Validate {
        /// Path to the .merge.toml config file
        config: PathBuf,
    },
}

fn long_version() -> &'static str {
    concat!(
        env!("CARGO_PKG_VERSION"),
        " (", env!("GIT_COMMIT_HASH"), ")",
        "\nengine:  goldmerge-recon ", env!("CARGO_PKG_VERSION"),
        "\ntarget:  ", env!("TARGET"),
    )
}

fn main() -> ExitCode {
    env_logger::Builder::from_env(Env::default().default_filter_or("warn")).init();

    let cli = Cli::parse();

    let result = match cli.command {
        Commands::Run { config, json, output, quiet } => recon::cmd_run(config, json, output, quiet),
        Commands::Merge {
            files,
            key,
            threshold,
            limit,
            stop_words,
            output,
            report,
            quiet,
        } => recon::cmd_merge(recon::MergeArgs {
            files,
            key,
            threshold,
            limit,
            stop_words,
            output,
            report,
            quiet,
        }),
        Commands::Validate { config } => recon::cmd_validate(config),
    };

    match result {
        Ok(()) => ExitCode::from(EXIT_SUCCESS),
        Err(CliError { code, message, hint }) => {
            if !message.is_empty() {
                eprintln!("error: {}", message);
            }
            if let Some(hint) = hint {
                eprintln!("hint:  {}", hint);
            }
            ExitCode::from(code)
        }
    }
}

#[derive(Debug)]
pub struct CliError {
    pub code: u8,
    pub message: String,
    pub hint: Option<String>,
}
