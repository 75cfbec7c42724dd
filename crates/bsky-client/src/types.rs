//! Typed XRPC request/response records.
//!
//! Field names follow the AT Protocol lexicons (camelCase on the wire,
//! `$type` discriminators), mapped to Rust naming with serde renames.

use chrono::{SecondsFormat, Utc};
use serde::{Deserialize, Serialize};

use crate::richtext::detect_link_facets;

// ---------------------------------------------------------------------------
// Session
// ---------------------------------------------------------------------------

#[derive(Debug, Serialize)]
pub(crate) struct CreateSessionRequest<'a> {
    pub identifier: &'a str,
    pub password: &'a str,
}

/// Response of `com.atproto.server.createSession`.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Session {
    pub access_jwt: String,
    pub did: String,
    pub handle: String,
}

// ---------------------------------------------------------------------------
// Blobs
// ---------------------------------------------------------------------------

/// A blob reference as returned by `uploadBlob`, passed through verbatim
/// when attaching a card thumbnail.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct BlobRef {
    #[serde(rename = "$type")]
    pub kind: String,
    #[serde(rename = "ref")]
    pub blob_ref: BlobLink,
    #[serde(rename = "mimeType")]
    pub mime_type: String,
    pub size: u64,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct BlobLink {
    #[serde(rename = "$link")]
    pub link: String,
}

#[derive(Debug, Deserialize)]
pub(crate) struct UploadBlobResponse {
    pub blob: BlobRef,
}

// ---------------------------------------------------------------------------
// Rich text facets
// ---------------------------------------------------------------------------

/// UTF-8 byte range within the post text.
#[derive(Debug, Clone, Serialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct ByteSlice {
    pub byte_start: usize,
    pub byte_end: usize,
}

#[derive(Debug, Clone, Serialize, PartialEq)]
#[serde(tag = "$type")]
pub enum FacetFeature {
    #[serde(rename = "app.bsky.richtext.facet#link")]
    Link { uri: String },
}

#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct Facet {
    pub index: ByteSlice,
    pub features: Vec<FacetFeature>,
}

// ---------------------------------------------------------------------------
// Post record + embeds
// ---------------------------------------------------------------------------

/// The external-link preview card (`app.bsky.embed.external`).
#[derive(Debug, Clone, Serialize)]
pub struct ExternalCard {
    pub uri: String,
    pub title: String,
    pub description: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub thumb: Option<BlobRef>,
}

#[derive(Debug, Clone, Serialize)]
#[serde(tag = "$type")]
pub enum Embed {
    #[serde(rename = "app.bsky.embed.external")]
    External { external: ExternalCard },
}

/// An `app.bsky.feed.post` record.
#[derive(Debug, Clone, Serialize)]
pub struct PostRecord {
    #[serde(rename = "$type")]
    pub record_type: String,
    pub text: String,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub facets: Vec<Facet>,
    #[serde(rename = "createdAt")]
    pub created_at: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub embed: Option<Embed>,
}

impl PostRecord {
    /// Build a post from `text`, detecting link facets and stamping the
    /// current time.
    pub fn new(text: impl Into<String>) -> Self {
        let text = text.into();
        let facets = detect_link_facets(&text);
        Self {
            record_type: "app.bsky.feed.post".to_string(),
            text,
            facets,
            created_at: Utc::now().to_rfc3339_opts(SecondsFormat::Millis, true),
            embed: None,
        }
    }

    pub fn with_card(mut self, card: ExternalCard) -> Self {
        self.embed = Some(Embed::External { external: card });
        self
    }
}

#[derive(Debug, Serialize)]
pub(crate) struct CreateRecordRequest<'a> {
    pub repo: &'a str,
    pub collection: &'a str,
    pub record: &'a PostRecord,
}

/// Response of `com.atproto.repo.createRecord`.
#[derive(Debug, Clone, Deserialize)]
pub struct RecordRef {
    pub uri: String,
    pub cid: String,
}

/// Error body XRPC endpoints return on non-2xx statuses.
#[derive(Debug, Deserialize)]
pub(crate) struct ApiErrorBody {
    #[serde(default)]
    pub error: String,
    #[serde(default)]
    pub message: String,
}
