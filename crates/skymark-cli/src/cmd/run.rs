use anyhow::Context;
use std::path::Path;
use tracing::info;

use skymark_core::config::Config;
use skymark_core::{RedbStore, SyncEngine, SyncOutcome};
use skymark_feed::FeedSource;

use crate::poster::BlueskyPoster;

pub async fn run(config_path: &Path) -> anyhow::Result<()> {
    let config = Config::load(config_path).context("failed to load config")?;
    config.validate()?;

    let outcome = pass(&config).await?;
    summarize(&outcome);
    Ok(())
}

/// One full sync pass: fetch the snapshot, reconcile, prune.
///
/// Shared with `skymark watch`, which calls it on an interval.
pub(crate) async fn pass(config: &Config) -> anyhow::Result<SyncOutcome> {
    let entries = FeedSource::new()?
        .fetch(&config.hatena_id)
        .await
        .context("failed to fetch bookmark feed")?;
    info!(count = entries.len(), "fetched bookmark feed");

    let store = RedbStore::open(Path::new(&config.store_path))
        .with_context(|| format!("failed to open tracking store at {}", config.store_path))?;
    let poster = BlueskyPoster::connect(config)
        .await
        .context("failed to connect to bluesky")?;

    let mut engine = SyncEngine::new(&store, &poster);
    let outcome = engine.run(entries).await?;
    Ok(outcome)
}

pub(crate) fn summarize(outcome: &SyncOutcome) {
    if outcome.suppressed > 0 {
        println!(
            "First run: marked {} existing entries as posted without posting.",
            outcome.suppressed
        );
    } else if outcome.posted.is_empty() {
        println!("No new bookmark entries found.");
    } else {
        println!("Posted {} bookmark entries:", outcome.posted.len());
        for entry in &outcome.posted {
            println!("  {} ({})", entry.title, entry.link);
        }
    }
    if outcome.pruned > 0 {
        println!("Pruned {} stale tracking records.", outcome.pruned);
    }
}
