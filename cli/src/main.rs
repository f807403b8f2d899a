//! charak: offline corpus/index steps and question answering.

mod cli;

use std::io;

use anyhow::Context;
use charak_ai::RagContext;
use charak_core::config::RagConfig;
use clap::Parser;
use cli::{Cli, Commands, OutputFormat};
use tracing_subscriber::EnvFilter;

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let default_level = if cli.verbose { "debug" } else { "info" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(io::stderr)
        .init();

    let config = RagConfig::load(cli.config.as_deref()).context("loading configuration")?;

    match cli.command {
        Commands::Chunk { input, output } => {
            let report = charak_lib::chunk_corpus(&config, &input, &output)?;
            println!("{}", serde_json::to_string_pretty(&report)?);
        }
        Commands::BuildIndex { chunks, path } => {
            let report = charak_lib::build_index(&config, &chunks, path.as_deref())?;
            println!("{}", serde_json::to_string_pretty(&report)?);
        }
        Commands::Status { format } => {
            let report = charak_lib::status(&config)?;
            match format {
                OutputFormat::Text => println!("{}", charak_lib::render_status(&report)),
                OutputFormat::Json => println!("{}", serde_json::to_string_pretty(&report)?),
            }
        }
        Commands::Ask { question, format } => {
            let rag = RagContext::open(config).context("starting the question-answering pipeline")?;
            let result = rag.ask(&question);
            match format {
                OutputFormat::Text => println!("{}", charak_lib::render_answer(&result)),
                OutputFormat::Json => println!("{}", serde_json::to_string_pretty(&result)?),
            }
        }
        Commands::Chat => {
            let rag = RagContext::open(config).context("starting the question-answering pipeline")?;
            let stdin = io::stdin();
            charak_lib::run_chat(&rag, stdin.lock(), io::stdout())?;
        }
    }

    Ok(())
}
