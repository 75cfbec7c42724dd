//! `skymark-feed` — the feed-side collaborators of the sync engine.
//!
//! Two concerns, both plain single-shot I/O:
//!
//! - [`rss`]: fetch and parse a Hatena bookmark RSS feed into
//!   [`skymark_core::Entry`] values. The feed is RSS 1.0 (RDF); the
//!   `rdf:about` attribute is the stable entry id.
//! - [`preview`]: fetch a bookmarked page and extract Open Graph metadata
//!   for the Bluesky link card, including the preview image bytes.

pub mod error;
pub mod preview;
pub mod rss;

pub use error::{FeedError, Result};
pub use preview::{PagePreview, PreviewFetcher, PreviewImage};
pub use rss::FeedSource;
