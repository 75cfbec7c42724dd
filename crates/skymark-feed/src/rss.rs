//! Hatena bookmark RSS fetching and parsing.
//!
//! The public bookmark feed at `https://b.hatena.ne.jp/<id>/bookmark.rss`
//! is RSS 1.0 (RDF): a `<channel>` header followed by flat `<item>`
//! elements carrying `rdf:about`, `<title>`, `<link>`, `<description>`
//! (the user's comment) and `<dc:date>`. The `rdf:about` URI is stable
//! across re-fetches and serves as the entry id, with `<link>` as the
//! fallback for feeds that omit it.

use std::time::Duration;

use chrono::{DateTime, Utc};
use quick_xml::events::Event;
use quick_xml::Reader;
use tracing::warn;

use skymark_core::Entry;

use crate::error::{FeedError, Result};

const DEFAULT_BASE_URL: &str = "https://b.hatena.ne.jp";
const REQUEST_TIMEOUT: Duration = Duration::from_secs(30);

// ---------------------------------------------------------------------------
// FeedSource
// ---------------------------------------------------------------------------

pub struct FeedSource {
    http: reqwest::Client,
    base_url: String,
}

impl FeedSource {
    pub fn new() -> Result<Self> {
        Self::with_base_url(DEFAULT_BASE_URL)
    }

    /// Point the source at a different host. Tests use this to hit a
    /// local mock server.
    pub fn with_base_url(base_url: &str) -> Result<Self> {
        let http = reqwest::Client::builder()
            .timeout(REQUEST_TIMEOUT)
            .build()?;
        Ok(Self {
            http,
            base_url: base_url.trim_end_matches('/').to_string(),
        })
    }

    pub fn feed_url(&self, hatena_id: &str) -> String {
        format!("{}/{}/bookmark.rss", self.base_url, hatena_id)
    }

    /// Fetch and parse the bookmark feed for `hatena_id`.
    ///
    /// An unreachable feed and a feed with zero entries are both fatal:
    /// the sync run must not start from a snapshot that isn't real.
    pub async fn fetch(&self, hatena_id: &str) -> Result<Vec<Entry>> {
        let url = self.feed_url(hatena_id);
        let response = self.http.get(&url).send().await?;
        if !response.status().is_success() {
            return Err(FeedError::Unreachable {
                status: response.status().as_u16(),
                url,
            });
        }
        let body = response.text().await?;
        let entries = parse_feed(&body)?;
        if entries.is_empty() {
            return Err(FeedError::EmptyFeed(url));
        }
        Ok(entries)
    }
}

// ---------------------------------------------------------------------------
// RSS 1.0 parsing
// ---------------------------------------------------------------------------

#[derive(Default)]
struct ItemFields {
    about: Option<String>,
    title: String,
    link: String,
    description: String,
    date: Option<String>,
}

impl ItemFields {
    fn into_entry(self) -> Option<Entry> {
        let id = match self.about {
            Some(about) if !about.is_empty() => about,
            _ if !self.link.is_empty() => self.link.clone(),
            _ => {
                warn!("skipping feed item with no rdf:about and no link");
                return None;
            }
        };
        let published = self.date.as_deref().and_then(parse_dc_date);
        Some(Entry {
            id,
            published,
            title: self.title,
            link: self.link,
            comment: self.description,
        })
    }
}

fn parse_dc_date(raw: &str) -> Option<DateTime<Utc>> {
    match DateTime::parse_from_rfc3339(raw) {
        Ok(dt) => Some(dt.with_timezone(&Utc)),
        Err(err) => {
            warn!(raw, error = %err, "unparseable dc:date; treating as epoch");
            None
        }
    }
}

/// Parse an RSS 1.0 document into entries, in document order.
pub fn parse_feed(xml: &str) -> Result<Vec<Entry>> {
    let mut reader = Reader::from_str(xml);
    reader.config_mut().trim_text(true);

    let mut entries = Vec::new();
    let mut item: Option<ItemFields> = None;
    let mut field: Option<Vec<u8>> = None;

    loop {
        match reader.read_event()? {
            Event::Start(e) => {
                if e.name().as_ref() == b"item" {
                    let mut fields = ItemFields::default();
                    if let Some(attr) = e.try_get_attribute("rdf:about").map_err(quick_xml::Error::from)? {
                        fields.about = Some(attr.unescape_value()?.into_owned());
                    }
                    item = Some(fields);
                } else if item.is_some() {
                    field = Some(e.name().as_ref().to_vec());
                }
            }
            Event::Text(t) => {
                if let (Some(fields), Some(name)) = (item.as_mut(), field.as_deref()) {
                    append_field(fields, name, &t.unescape()?);
                }
            }
            Event::CData(t) => {
                if let (Some(fields), Some(name)) = (item.as_mut(), field.as_deref()) {
                    append_field(fields, name, &String::from_utf8_lossy(&t));
                }
            }
            Event::End(e) => {
                if e.name().as_ref() == b"item" {
                    if let Some(entry) = item.take().and_then(ItemFields::into_entry) {
                        entries.push(entry);
                    }
                } else {
                    field = None;
                }
            }
            Event::Eof => break,
            _ => {}
        }
    }

    Ok(entries)
}

fn append_field(fields: &mut ItemFields, name: &[u8], text: &str) {
    match name {
        b"title" => fields.title.push_str(text),
        b"link" => fields.link.push_str(text),
        b"description" => fields.description.push_str(text),
        b"dc:date" => fields.date.get_or_insert_with(String::new).push_str(text),
        _ => {}
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
