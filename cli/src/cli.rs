use std::path::PathBuf;

use clap::{Parser, Subcommand, ValueEnum};

#[derive(Parser, Debug)]
#[command(name = "charak")]
#[command(about = "Ask questions of Charak Samhita over a local vector index", long_about = None)]
#[command(version)]
pub struct Cli {
    /// Config file (defaults to ./charak.toml when present)
    #[arg(short, long, global = true, env = "CHARAK_CONFIG")]
    pub config: Option<PathBuf>,

    /// Enable debug logging
    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Clean and chunk a raw corpus file
    Chunk {
        /// Raw corpus: JSON array of {title, url, content}
        #[arg(short, long, default_value = "charak_raw.json")]
        input: PathBuf,

        /// Chunk file to write
        #[arg(short, long, default_value = "charak_chunks.json")]
        output: PathBuf,
    },

    /// Embed a chunk file into a fresh collection (replaces any existing one)
    BuildIndex {
        #[arg(short, long, default_value = "charak_chunks.json")]
        chunks: PathBuf,

        /// Index directory (defaults to index.default_path)
        #[arg(long)]
        path: Option<PathBuf>,
    },

    /// Show backend health and which index/collection would be served.
    /// Read-only: never extracts archives or creates an index
    Status {
        #[arg(long, value_enum, default_value_t = OutputFormat::Text)]
        format: OutputFormat,
    },

    /// Answer a single question
    Ask {
        question: String,

        #[arg(long, value_enum, default_value_t = OutputFormat::Text)]
        format: OutputFormat,
    },

    /// Interactive question loop (type `exit` to quit)
    Chat,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    Text,
    Json,
}
