use clap::{Parser, Subcommand};
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "mp3wav")]
#[command(author, version, about = "Convert MP3 files to WAV with a staged mpg123 decoder")]
pub struct Cli {
    /// Path to config file
    #[arg(short, long, global = true)]
    pub config: Option<PathBuf>,

    /// Enable verbose logging
    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Convert one or more MP3 files to WAV
    Convert {
        /// Input files to convert
        #[arg(required = true)]
        inputs: Vec<PathBuf>,

        /// Output file (only valid with a single input)
        #[arg(short, long)]
        output: Option<PathBuf>,

        /// Postfix for generated output files (defaults to output.postfix from config)
        #[arg(long)]
        postfix: Option<String>,

        /// Extra decoder flag placed before the input path (repeatable)
        #[arg(long = "param", allow_hyphen_values = true)]
        params: Vec<String>,

        /// Print one JSON object per input
        #[arg(long)]
        json: bool,

        /// Leave the staged decoder in the staging directory on exit
        #[arg(long)]
        keep_decoder: bool,
    },

    /// Check that the bundled decoder can be found
    CheckTools,

    /// Validate configuration file
    Validate {
        /// Config file to validate (uses default if not specified)
        config: Option<PathBuf>,
    },

    /// Display version information
    Version,
}
