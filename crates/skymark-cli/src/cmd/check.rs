use anyhow::Context;
use std::path::Path;

use bsky_client::BskyClient;
use skymark_core::config::Config;

/// Validate the config and credentials; print the banner the way the
/// sync commands see the world.
pub async fn run(config_path: &Path) -> anyhow::Result<()> {
    let config = Config::load(config_path).context("failed to load config")?;
    config.validate()?;

    println!("skymark v{}", env!("CARGO_PKG_VERSION"));
    println!(
        "Feed:    https://b.hatena.ne.jp/{}/bookmark.rss",
        config.hatena_id
    );
    println!(
        "Bluesky: https://bsky.app/profile/{}",
        config.bluesky.identifier
    );

    let mut client = BskyClient::new(&config.bluesky.service)?;
    client
        .login(&config.bluesky.identifier, &config.bluesky.password)
        .await
        .context("bluesky login failed")?;
    println!(
        "Credentials OK ({})",
        client.handle().unwrap_or(&config.bluesky.identifier)
    );
    Ok(())
}
