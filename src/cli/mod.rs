use anyhow::Result;
use clap::{Parser, Subcommand};

pub mod chat;
pub mod commands;
pub mod editor;
pub mod key;

use crate::core::{AppConfig, logging};

#[derive(Subcommand)]
enum Command {
    /// Start an interactive chat session (the default)
    Chat {
        /// Model to select at startup. Must be one of ORCHAT_MODELS.
        #[arg(long)]
        model: Option<String>,
    },
    /// Validate and store an OpenRouter API key
    SetKey { key: String },
    /// Remove the stored API key
    ClearKey {},
}

#[derive(Parser)]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    #[command(subcommand)]
    command: Option<Command>,
}

pub async fn run() -> Result<()> {
    let args = Cli::parse();
    logging::init();

    let config = AppConfig::default();
    tracing::debug!("Loaded config: {:?}", config);

    match args.command {
        Some(Command::Chat { model }) => {
            chat::run(config, model).await?;
        }
        Some(Command::SetKey { key }) => {
            key::set(&config, &key)?;
        }
        Some(Command::ClearKey {}) => {
            key::clear(&config)?;
        }
        None => {
            chat::run(config, None).await?;
        }
    }

    Ok(())
}
