use thiserror::Error;

#[derive(Debug, Error)]
pub enum FeedError {
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("feed request failed: {url} returned {status}")]
    Unreachable { url: String, status: u16 },

    #[error("no bookmark entries in feed: {0}")]
    EmptyFeed(String),

    #[error("malformed feed XML: {0}")]
    Xml(#[from] quick_xml::Error),
}

pub type Result<T> = std::result::Result<T, FeedError>;
