use thiserror::Error;

#[derive(Debug, Error)]
pub enum BskyError {
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("XRPC {status} {error}: {message}")]
    Api {
        status: u16,
        error: String,
        message: String,
    },

    #[error("not logged in: call login() first")]
    NotLoggedIn,

    #[error(transparent)]
    Json(#[from] serde_json::Error),
}

pub type Result<T> = std::result::Result<T, BskyError>;
