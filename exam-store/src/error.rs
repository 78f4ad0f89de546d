#[derive(thiserror::Error, Debug)]
pub enum StoreError {
    #[error("stored {key} is not valid JSON: {source}")]
    Corrupt {
        key: &'static str,
        #[source]
        source: serde_json::Error,
    },
    #[error("stored question index '{0}' is not a number")]
    InvalidIndex(String),
    // Froms
    #[error("{0}")]
    Io(#[from] std::io::Error),
    #[error("{0}")]
    Exam(#[from] exam_utils::error::Error),
    #[error("{0}")]
    Serialization(#[from] serde_json::Error),
}
