use anyhow::Context;
use std::path::Path;
use std::time::Duration;
use tracing::{error, info};

use skymark_core::config::Config;

use super::run::{pass, summarize};

/// Run sync passes forever, sleeping `watch_interval_minutes` between
/// them. A failed pass is logged and retried on the next interval — the
/// engine's mark-after-success ordering makes retries safe.
pub async fn run(config_path: &Path) -> anyhow::Result<()> {
    let config = Config::load(config_path).context("failed to load config")?;
    config.validate()?;

    let interval = Duration::from_secs(config.watch_interval_minutes * 60);
    info!(
        interval_minutes = config.watch_interval_minutes,
        "watching bookmark feed"
    );

    loop {
        match pass(&config).await {
            Ok(outcome) => summarize(&outcome),
            Err(err) => error!("sync pass failed; will retry: {err:#}"),
        }
        tokio::time::sleep(interval).await;
    }
}
