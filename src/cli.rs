use std::path::PathBuf;

use clap::{Parser, Subcommand, ValueEnum};

use crate::segment::LengthMode;

#[derive(ValueEnum, Debug, Clone, Copy)]
pub enum LogFormat {
    Text,
    Json,
}

#[derive(ValueEnum, Debug, Clone, Copy)]
pub enum LengthModeArg {
    /// Trust each stream's size field, clamped to the buffer
    Declared,
    /// Measure to the next signature hit
    Heuristic,
}

impl From<LengthModeArg> for LengthMode {
    fn from(arg: LengthModeArg) -> Self {
        match arg {
            LengthModeArg::Declared => LengthMode::Declared,
            LengthModeArg::Heuristic => LengthMode::Heuristic,
        }
    }
}

#[derive(Parser, Debug)]
#[command(author, version, about)]
pub struct CliOptions {
    /// Log output format
    #[arg(long, value_enum, default_value_t = LogFormat::Text)]
    pub log_format: LogFormat,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Scan host files for embedded RIFF/RIFX streams and dump each one
    Extract {
        /// Input host files (game bundles, raw dumps)
        #[arg(short, long, num_args = 1.., required = true)]
        input: Vec<PathBuf>,

        /// Output directory for dumped streams and metadata
        #[arg(short, long, default_value = "./output")]
        output: PathBuf,

        /// Optional path to config file (TOML)
        #[arg(long)]
        config_path: Option<PathBuf>,

        /// Stream length determination (overrides config when set)
        #[arg(long, value_enum)]
        length_mode: Option<LengthModeArg>,

        /// Disable label recovery for output naming
        #[arg(long)]
        no_labels: bool,

        /// Number of worker threads
        #[arg(long)]
        workers: Option<usize>,
    },

    /// Decode one stream's chunk tree and print a field-level report
    Inspect {
        /// Input stream file
        input: PathBuf,
    },
}

pub fn parse() -> CliOptions {
    CliOptions::parse()
}
