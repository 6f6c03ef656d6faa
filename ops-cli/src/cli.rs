use clap::{Parser, Subcommand};
use std::path::PathBuf;
use uuid::Uuid;

#[derive(Parser, Debug)]
#[command(name = "apteka")]
#[command(version, about = "Find pharmacies that stock the medicines you need")]
pub struct Cli {
    /// Configuration file (TOML or YAML)
    #[arg(long, short, env = "APTEKA_CONFIG", global = true)]
    pub config: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Apply catalog schema migrations
    Migrate,

    /// Check that the catalog database answers
    Health,

    /// Search pharmacies for a comma-separated list of medicines
    Search {
        #[arg(long)]
        text: String,

        /// Deliver replies to this chat instead of stdout
        #[arg(long, allow_negative_numbers = true)]
        chat_id: Option<i64>,
    },

    /// Transcribe a voice message and search the medicines it names
    Voice {
        #[arg(long)]
        file: PathBuf,

        /// Recorded duration in seconds, as reported by the messenger
        #[arg(long)]
        duration: u64,

        #[arg(long, allow_negative_numbers = true)]
        chat_id: Option<i64>,
    },

    /// Register a pharmacy owned by a chat
    Register {
        /// Group and supergroup chats have negative ids
        #[arg(long, allow_negative_numbers = true)]
        chat_id: i64,

        /// JSON payload: {"name": ..., "address": ..., "phone": ...}
        #[arg(long)]
        payload: String,
    },

    /// Catalog maintenance
    Catalog {
        #[command(subcommand)]
        command: CatalogCommand,
    },
}

#[derive(Subcommand, Debug)]
pub enum CatalogCommand {
    /// Add a medicine with optional aliases
    AddMedicine {
        name: String,

        #[arg(long = "alias")]
        aliases: Vec<String>,
    },

    /// Add an alias to an existing medicine
    AddAlias {
        #[arg(long)]
        medicine_id: Uuid,

        alias: String,
    },

    /// Mark a medicine as in stock at a pharmacy
    Stock {
        #[arg(long)]
        pharmacy_id: Uuid,

        #[arg(long)]
        medicine_id: Uuid,
    },
}
