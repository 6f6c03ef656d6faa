//! `apteka` command-line tool
//!
//! Usage:
//!   apteka --config apteka.toml search --text "Парацетамол, Тримол"
//!
//! Every setting can also come from `APTEKA_`-prefixed environment variables,
//! e.g. `APTEKA_DATABASE__URL` or `APTEKA_TELEGRAM__BOT_TOKEN`.

mod cli;

use anyhow::Context;
use apteka_ops::{QueryHandler, RegistrationHandler, StdoutMessenger};
use chat_dispatch::{DeliveryReceipt, DispatchThrottler, Messenger, TelegramMessenger};
use clap::Parser;
use cli::{CatalogCommand, Cli, Command};
use config_engine::EngineConfig;
use database_layer::models::{ChatId, InventoryEntry, MedicineId, NewMedicine, PharmacyId};
use database_layer::{CatalogAdmin, DatabasePool, PgCatalogStore};
use logger_redacted::redactor_for;
use pharmacy_search::PharmacySearch;
use std::sync::Arc;
use std::time::Duration;
use tracing::{info, warn};
use voice_recognition_service::{VoiceClip, VoiceService};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let config = EngineConfig::load(cli.config.as_deref()).context("Failed to load configuration")?;
    let _log_guard = logger_redacted::init(&config.logging).context("Failed to initialize logging")?;

    let pool = DatabasePool::connect(&config.database)
        .await
        .context("Failed to connect to database")?;
    let store = Arc::new(PgCatalogStore::new(pool.clone()));

    let result = run(cli.command, &config, &pool, store).await;
    pool.close().await;
    result
}

async fn run(
    command: Command,
    config: &EngineConfig,
    pool: &DatabasePool,
    store: Arc<PgCatalogStore>,
) -> anyhow::Result<()> {
    match command {
        Command::Migrate => {
            pool.migrate().await?;
            println!("✅ Migrations applied");
        }
        Command::Health => {
            if !pool.is_healthy().await {
                anyhow::bail!("Catalog database is not reachable");
            }
            println!("✅ Catalog database is healthy");
        }
        Command::Search { text, chat_id } => {
            let throttler = throttler(config, chat_id)?;
            let search = PharmacySearch::from_config(store, config);
            let handler = QueryHandler::new(search, throttler).with_redactor(redactor_for(&config.logging));
            let receipt = handler.handle_text(ChatId(chat_id.unwrap_or_default()), &text).await?;
            wait(receipt).await?;
        }
        Command::Voice {
            file,
            duration,
            chat_id,
        } => {
            let audio = tokio::fs::read(&file)
                .await
                .with_context(|| format!("Failed to read {}", file.display()))?;
            let file_name = file
                .file_name()
                .map(|n| n.to_string_lossy().into_owned())
                .unwrap_or_else(|| "voice.ogg".to_string());
            let clip = VoiceClip::new(audio, Duration::from_secs(duration)).with_file_name(file_name);

            let voice = Arc::new(VoiceService::new(&config.voice)?);
            let throttler = throttler(config, chat_id)?;
            let search = PharmacySearch::from_config(store, config);
            let handler = QueryHandler::new(search, throttler)
                .with_voice(voice)
                .with_redactor(redactor_for(&config.logging));
            let receipt = handler
                .handle_voice(ChatId(chat_id.unwrap_or_default()), clip)
                .await?;
            wait(receipt).await?;
        }
        Command::Register { chat_id, payload } => {
            let throttler = throttler(config, Some(chat_id))?;
            let handler = RegistrationHandler::new(store, throttler).with_redactor(redactor_for(&config.logging));
            let receipt = handler.handle_payload(ChatId(chat_id), &payload).await?;
            wait(receipt).await?;
        }
        Command::Catalog { command } => catalog(command, store.as_ref()).await?,
    }
    Ok(())
}

async fn catalog(command: CatalogCommand, admin: &dyn CatalogAdmin) -> anyhow::Result<()> {
    match command {
        CatalogCommand::AddMedicine { name, aliases } => {
            let medicine = NewMedicine { name, aliases };
            let id = admin.add_medicine(&medicine).await?;
            println!("{}", id);
        }
        CatalogCommand::AddAlias { medicine_id, alias } => {
            admin.add_alias(MedicineId(medicine_id), &alias).await?;
            info!(%medicine_id, "Alias added");
        }
        CatalogCommand::Stock {
            pharmacy_id,
            medicine_id,
        } => {
            admin
                .add_stock(InventoryEntry {
                    pharmacy_id: PharmacyId(pharmacy_id),
                    medicine_id: MedicineId(medicine_id),
                })
                .await?;
            info!(%pharmacy_id, %medicine_id, "Stock recorded");
        }
    }
    Ok(())
}

/// Telegram when a chat and a bot token are both given, stdout otherwise
fn throttler(config: &EngineConfig, chat_id: Option<i64>) -> anyhow::Result<DispatchThrottler> {
    let messenger: Arc<dyn Messenger> = match (chat_id, &config.telegram.bot_token) {
        (Some(_), Some(_)) => Arc::new(TelegramMessenger::new(&config.telegram)?),
        _ => Arc::new(StdoutMessenger),
    };
    let (throttler, _worker) = DispatchThrottler::spawn(messenger, &config.dispatch);
    Ok(throttler)
}

async fn wait(receipt: DeliveryReceipt) -> anyhow::Result<()> {
    let report = receipt.wait().await?;
    if !report.is_complete() {
        warn!(
            failed = report.failed,
            expired = report.expired,
            "Some replies were not delivered"
        );
    }
    Ok(())
}
