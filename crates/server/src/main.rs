//! Arena server entry point.
//!
//! Boots the arena from the environment and plays a demonstration match for
//! a local identity against an automated opponent.
mod demo;

use std::path::PathBuf;

use anyhow::{Context, Result};
use arena_runtime::{Arena, ArenaConfig, StaticAssetResolver};
use battle_content::{ContentFactory, decode_records};
use battle_core::AssetId;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;

const BUNDLED_ROSTER: &str = include_str!("../data/roster.json");

#[tokio::main]
async fn main() -> Result<()> {
    // Load .env file if it exists (silently ignore if not found)
    let _ = dotenvy::dotenv();

    let _guard = setup_logging()?;
    let config = ArenaConfig::from_env();

    let content = match &config.content_dir {
        Some(dir) => ContentFactory::new(dir.clone()),
        None => ContentFactory::builtin(),
    };
    let cards = content.load_cards()?;
    let templates = content.load_templates(&cards)?;

    let records = match std::env::var("ARENA_ROSTER_FILE") {
        Ok(path) => std::fs::read_to_string(&path)
            .with_context(|| format!("Failed to read roster file {path}"))?,
        Err(_) => BUNDLED_ROSTER.to_string(),
    };
    let records = decode_records(&records).context("Failed to decode roster records")?;
    let roster = records.iter().map(|r| AssetId::new(r.id.clone())).collect::<Vec<_>>();
    let resolver = StaticAssetResolver::from_records(records, &cards)?;

    tracing::info!(
        assets = resolver.len(),
        cards = cards.len(),
        "content loaded"
    );

    let arena = Arena::builder()
        .config(config)
        .resolver(resolver)
        .catalogs(cards, templates)
        .build()?;

    demo::run(&arena, roster).await
}

/// Installs stderr logging plus a file layer when a log directory is available.
///
/// The returned guard flushes the file writer when dropped.
fn setup_logging() -> Result<Option<tracing_appender::non_blocking::WorkerGuard>> {
    let env_filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info"));
    let stderr_layer = tracing_subscriber::fmt::layer().with_writer(std::io::stderr);

    let Some(log_dir) = log_directory() else {
        tracing_subscriber::registry()
            .with(env_filter)
            .with(stderr_layer)
            .init();
        return Ok(None);
    };

    std::fs::create_dir_all(&log_dir)
        .with_context(|| format!("Failed to create log directory {}", log_dir.display()))?;
    let file_appender = tracing_appender::rolling::daily(&log_dir, "arena.log");
    let (non_blocking_file, guard) = tracing_appender::non_blocking(file_appender);
    let file_layer = tracing_subscriber::fmt::layer()
        .with_writer(non_blocking_file)
        .with_ansi(false);

    tracing_subscriber::registry()
        .with(env_filter)
        .with(stderr_layer)
        .with(file_layer)
        .init();

    tracing::info!("Log directory: {}", log_dir.display());
    Ok(Some(guard))
}

/// `ARENA_LOG_DIR`, else the platform cache directory.
fn log_directory() -> Option<PathBuf> {
    if let Some(dir) = std::env::var_os("ARENA_LOG_DIR") {
        return Some(PathBuf::from(dir));
    }
    directories::ProjectDirs::from("", "", "arena").map(|dirs| dirs.cache_dir().join("logs"))
}
