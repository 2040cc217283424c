use anyhow::Result;
use console::{style, Emoji};
use indicatif::{ProgressBar, ProgressStyle};
use std::sync::Arc;
use std::time::Duration;

use super::{open_pipeline, retry_policy};
use crate::config::Config;
use crate::search::{Embedder, FlatStore, IndexStats, IngestReport, Indexer, VectorStore};

static INDEXING: Emoji<'_, '_> = Emoji("📊 ", "");
static SUCCESS: Emoji<'_, '_> = Emoji("✅ ", "");
static WARNING: Emoji<'_, '_> = Emoji("⚠️  ", "");
static INFO: Emoji<'_, '_> = Emoji("ℹ️  ", "");

pub async fn run_index(config: &Config, clear: bool) -> Result<()> {
    let (embedder, store) = open_pipeline(config)?;

    embedder.health_check().await?;

    if clear {
        store.clear().await?;
    } else if store.exists() {
        store.load().await?;
        println!(
            "{}Appending to existing index ({} entries)",
            INFO,
            style(store.count().await?).cyan()
        );
    }

    ingest(config, embedder, Arc::clone(&store)).await?;
    print_stats(&store.stats().await?);

    Ok(())
}

/// Ingest the data folder into `store` behind a spinner, persist, and report.
pub(crate) async fn ingest(
    config: &Config,
    embedder: Arc<dyn Embedder>,
    store: Arc<FlatStore>,
) -> Result<IngestReport> {
    let indexer = Indexer::new(store.clone(), embedder).with_retry(retry_policy(config));

    let pb = ProgressBar::new_spinner();
    pb.set_style(ProgressStyle::default_spinner().template("{spinner:.green} {msg}")?);
    pb.set_message(format!(
        "{}Indexing {}...",
        INDEXING,
        config.data_folder.display()
    ));
    pb.enable_steady_tick(Duration::from_millis(100));

    let result = indexer
        .ingest(
            &config.data_folder,
            config.chunking.chunk_size,
            config.chunking.chunk_overlap,
        )
        .await;
    pb.finish_and_clear();
    let report = result?;

    store.persist().await?;

    println!("\n{}Indexing complete!\n", SUCCESS);
    println!(
        "  Files processed: {}",
        style(report.files_processed).green()
    );
    println!("  Entries written: {}", style(report.entries_written).cyan());
    println!("  Files skipped:   {}", style(report.files_skipped).dim());

    if !report.warnings.is_empty() {
        println!("\n{}Warnings ({}):", WARNING, report.warnings.len());
        for warning in report.warnings.iter().take(10) {
            println!("  - {}", style(warning).yellow());
        }
        if report.warnings.len() > 10 {
            println!("  ... and {} more", report.warnings.len() - 10);
        }
    }

    Ok(report)
}

fn print_stats(stats: &IndexStats) {
    println!("\n{}Index Statistics:", INFO);
    println!("  Total sources:   {}", style(stats.total_sources).green());
    println!("  Total entries:   {}", style(stats.total_entries).cyan());
    if stats.duplicate_entries > 0 {
        println!(
            "  Duplicates:      {} (re-ingested content; use `docrag index --clear`)",
            style(stats.duplicate_entries).yellow()
        );
    }
    if let Some(dims) = stats.dimensions {
        println!("  Dimensions:      {}", dims);
    }
    println!(
        "  Index size:      {} KB",
        style(stats.index_size_bytes / 1024).yellow()
    );
    if let Some(updated) = stats.last_updated {
        println!(
            "  Last updated:    {}",
            style(updated.format("%Y-%m-%d %H:%M:%S")).dim()
        );
    }
}

pub async fn run_index_status(config: &Config) -> Result<()> {
    let store = FlatStore::new(config.index_path());

    if !store.exists() {
        println!("{}No index found at {}", INFO, store.path().display());
        println!("Run `docrag index` to build the index.");
        return Ok(());
    }

    store.load().await?;
    println!("\n{}Index Status: {}", INFO, store.path().display());
    print_stats(&store.stats().await?);

    Ok(())
}

pub async fn run_index_clear(config: &Config) -> Result<()> {
    let store = FlatStore::new(config.index_path());

    if !store.exists() {
        println!("{}No index found.", INFO);
        return Ok(());
    }

    store.clear().await?;
    println!("{}Index cleared successfully.", SUCCESS);

    Ok(())
}
