//! DualChat CLI: the main entry point.
//!
//! Commands:
//! - `serve`: Start the web UI and chat API
//! - `ingest`: Chunk, embed and index documents for the RAG panel
//! - `init`: Print (or write) a default config.toml

use clap::{Parser, Subcommand};
use std::path::PathBuf;

mod commands;

#[derive(Parser)]
#[command(
    name = "dualchat",
    about = "DualChat: compare a plain chat model and a RAG agent side by side",
    version
)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Enable verbose logging
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Config file (default: ~/.dualchat/config.toml)
    #[arg(short, long, global = true, env = "DUALCHAT_CONFIG")]
    config: Option<PathBuf>,
}

#[derive(Subcommand)]
enum Commands {
    /// Start the HTTP server with the chat UI
    Serve {
        /// Override the port
        #[arg(short, long)]
        port: Option<u16>,
    },

    /// Add documents to the vector index
    Ingest {
        /// Text, markdown or .jsonl files
        #[arg(required = true)]
        paths: Vec<PathBuf>,

        /// Source url recorded on every chunk that lacks one
        #[arg(long)]
        source_url: Option<String>,
    },

    /// Print a default config.toml
    Init {
        /// Write it to the config path instead (never overwrites)
        #[arg(long)]
        write: bool,
    },
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    // Initialize tracing
    let filter = if cli.verbose { "debug" } else { "info" };
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(filter)),
        )
        .with_target(false)
        .init();

    let config_path = cli.config.as_deref();
    match cli.command {
        Commands::Serve { port } => commands::serve::run(config_path, port).await?,
        Commands::Ingest { paths, source_url } => {
            commands::ingest::run(config_path, &paths, source_url.as_deref()).await?
        }
        Commands::Init { write } => commands::init::run(config_path, write)?,
    }

    Ok(())
}
