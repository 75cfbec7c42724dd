use anyhow::{bail, Context};
use std::path::Path;

const STARTER_CONFIG: &str = r#"# skymark configuration
#
# Hatena account whose public bookmark feed is mirrored.
hatena_id: your-hatena-id

bluesky:
  # Handle or DID to post as.
  identifier: you.bsky.social
  # App password (Settings → App Passwords). Leave empty and set the
  # SKYMARK_BLUESKY_PASSWORD environment variable to keep it out of this file.
  password: ""
  # service: https://bsky.social

# Post body template. %title%, %link%, %description%; %% for a literal %.
template: "%title%\n%link%"

# Attach an Open Graph preview card to each post.
enable_preview: false

# Tracking-store database file.
store_path: skymark.redb

# Minutes between passes in `skymark watch`.
watch_interval_minutes: 30
"#;

pub fn run(config_path: &Path, force: bool) -> anyhow::Result<()> {
    if config_path.exists() && !force {
        bail!(
            "{} already exists (use --force to overwrite)",
            config_path.display()
        );
    }
    std::fs::write(config_path, STARTER_CONFIG)
        .with_context(|| format!("failed to write {}", config_path.display()))?;
    println!("Wrote {}", config_path.display());
    println!("Fill in hatena_id and the Bluesky credentials, then run `skymark check`.");
    Ok(())
}
