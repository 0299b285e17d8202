//! Command-line interface parsing and handling
//!
//! This module parses arguments and dispatches into the interactive chat
//! loop or the one-shot `say` command.

pub mod chat;
pub mod say;

use std::error::Error;

use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

use crate::core::config::Config;

#[derive(Parser)]
#[command(name = "repartee")]
#[command(about = "A line-oriented terminal chat client for Responses-style APIs")]
#[command(
    long_about = "Repartee keeps a sidebar's worth of conversations in memory and sends the \
active one's transcript to a Responses-style text-generation endpoint.\n\n\
Environment Variables:\n\
  GROQ_API_KEY      Bearer credential for the API (required to send)\n\
  GROQ_BASE_URL     Custom API base URL (optional)\n\n\
Commands inside the chat loop:\n\
  /new              Start a new conversation\n\
  /list             List conversations\n\
  /switch <n>       Switch to conversation n\n\
  /delete [n]       Delete conversation n (default: the active one)\n\
  /stop             Cancel the in-flight request\n\
  /reset            Clear recorded request state\n\
  /log [file]       Enable or pause transcript logging\n\
  /quit             Exit"
)]
pub struct Args {
    #[command(subcommand)]
    pub command: Option<Commands>,

    /// Model to use for chat
    #[arg(short = 'm', long, global = true, value_name = "MODEL")]
    pub model: Option<String>,

    /// Enable transcript logging to the specified file
    #[arg(short = 'l', long, global = true)]
    pub log: Option<String>,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Start the interactive chat loop (default)
    Chat,
    /// Send a single prompt and print the reply
    Say {
        #[arg(trailing_var_arg = true)]
        prompt: Vec<String>,
    },
}

pub fn main() -> Result<(), Box<dyn Error>> {
    tokio::runtime::Runtime::new()?.block_on(async_main())
}

async fn async_main() -> Result<(), Box<dyn Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .init();

    let args = Args::parse();
    let config = Config::load()?;

    match args.command.unwrap_or(Commands::Chat) {
        Commands::Chat => chat::run_chat(args.model, args.log, &config).await,
        Commands::Say { prompt } => say::run_say(prompt, args.model, &config).await,
    }
}
