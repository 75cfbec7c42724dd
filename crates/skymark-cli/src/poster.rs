//! The per-entry side effect: render the template, unfurl the link, post.
//!
//! This is the `EntryAction` handed to the sync engine. Preview-card
//! failures degrade to a card-less post; posting failures propagate so
//! the engine aborts the run at that entry.

use async_trait::async_trait;
use tracing::{info, warn};

use bsky_client::{BskyClient, ExternalCard, PostRecord};
use skymark_core::config::Config;
use skymark_core::{template, Entry, EntryAction};
use skymark_feed::PreviewFetcher;

pub struct BlueskyPoster {
    client: BskyClient,
    preview: Option<PreviewFetcher>,
    template: String,
}

impl BlueskyPoster {
    /// Log in to Bluesky and prepare the posting pipeline from `config`.
    pub async fn connect(config: &Config) -> anyhow::Result<Self> {
        let mut client = BskyClient::new(&config.bluesky.service)?;
        client
            .login(&config.bluesky.identifier, &config.bluesky.password)
            .await?;

        let preview = if config.enable_preview {
            Some(PreviewFetcher::new()?)
        } else {
            None
        };

        Ok(Self {
            client,
            preview,
            template: config.template.clone(),
        })
    }

    async fn build_card(&self, entry: &Entry) -> Option<ExternalCard> {
        let fetcher = self.preview.as_ref()?;
        if entry.link.is_empty() {
            return None;
        }
        let preview = match fetcher.fetch(&entry.link).await {
            Ok(Some(p)) => p,
            Ok(None) => return None,
            Err(err) => {
                warn!(link = %entry.link, error = %err, "preview failed; posting without card");
                return None;
            }
        };
        let thumb = match preview.image {
            Some(image) => match self.client.upload_blob(image.bytes, &image.mime_type).await {
                Ok(blob) => Some(blob),
                Err(err) => {
                    warn!(link = %entry.link, error = %err, "thumbnail upload failed; card without image");
                    None
                }
            },
            None => None,
        };
        Some(ExternalCard {
            uri: entry.link.clone(),
            title: preview.title,
            description: preview.description,
            thumb,
        })
    }
}

#[async_trait]
impl EntryAction for BlueskyPoster {
    async fn invoke(
        &self,
        entry: &Entry,
    ) -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
        let body = template::render(&self.template, entry);
        info!(id = %entry.id, "posting:\n{body}");

        let mut record = PostRecord::new(body);
        if let Some(card) = self.build_card(entry).await {
            record = record.with_card(card);
        }

        self.client.post(&record).await?;
        Ok(())
    }
}
