//! `bsky-client` — the slice of the AT Protocol that skymark needs.
//!
//! Three XRPC calls, fully typed, nothing else:
//!
//! ```text
//! BskyClient::login      → com.atproto.server.createSession
//! BskyClient::upload_blob → com.atproto.repo.uploadBlob
//! BskyClient::post        → com.atproto.repo.createRecord
//! ```
//!
//! [`richtext::detect_link_facets`] mirrors the link-detection half of the
//! official SDK's RichText helper: URLs in the post body become clickable
//! link facets addressed by UTF-8 byte offsets.
//!
//! The service base URL is injectable, which is how the tests point the
//! client at a local mock server.

pub mod client;
pub mod error;
pub mod richtext;
pub mod types;

pub use client::BskyClient;
pub use error::{BskyError, Result};
pub use types::{BlobRef, Embed, ExternalCard, PostRecord, Session};
