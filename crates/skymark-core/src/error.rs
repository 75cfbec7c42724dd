use thiserror::Error;

#[derive(Debug, Error)]
pub enum CoreError {
    #[error("tracking store error: {0}")]
    Store(String),

    #[error("classification failed for entry '{id}': {source}")]
    Classify {
        id: String,
        #[source]
        source: Box<CoreError>,
    },

    #[error("action failed for entry '{id}': {source}")]
    Action {
        id: String,
        #[source]
        source: Box<dyn std::error::Error + Send + Sync>,
    },

    #[error("failed to mark entry '{id}' as posted: {source}")]
    Mark {
        id: String,
        #[source]
        source: Box<CoreError>,
    },

    #[error("config file not found: {0}")]
    ConfigNotFound(String),

    #[error("invalid config: {0}")]
    InvalidConfig(String),

    #[error(transparent)]
    Io(#[from] std::io::Error),

    #[error(transparent)]
    Yaml(#[from] serde_yaml::Error),
}

pub type Result<T> = std::result::Result<T, CoreError>;
