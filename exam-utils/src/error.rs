use crate::{normalize::NormalizationError, validation::ValidationError};

#[derive(thiserror::Error, Debug)]
pub enum Error {
    #[error("Question at index {index} {source}")]
    Normalization {
        index: usize,
        #[source]
        source: NormalizationError,
    },
    #[error("{0}")]
    Validation(#[from] ValidationError),
    #[error("{0}")]
    InvalidConfig(String),
    #[error("No answer selected")]
    EmptySelection,
    #[error("Question {0} has already been answered")]
    AlreadyAnswered(u32),
    #[error("No question is currently active")]
    NoCurrentQuestion,
    // Froms
    #[error("Invalid JSON: {0}")]
    Json(#[from] serde_json::Error),
}

impl Error {
    /// Index of the offending record, for errors raised while loading a bank.
    pub fn index(&self) -> Option<usize> {
        match self {
            Error::Normalization { index, .. } => Some(*index),
            Error::Validation(e) => e.index(),
            _ => None,
        }
    }
}
