use anyhow::Context;
use exam_utils::{question::Question, validation::parse_bank};
use std::path::Path;
use tracing::{info, instrument};

/// 10 MiB
pub const MAX_FILE_SIZE: u64 = 10 * 1024 * 1024;

#[derive(thiserror::Error, Debug, PartialEq, Eq)]
pub enum UploadError {
    #[error("File must be a JSON file")]
    NotJson,
    #[error("File size must be less than 10MB")]
    TooLarge,
    #[error("File cannot be empty")]
    Empty,
}

/// Checks a question file before its contents are read.
pub fn validate_file(path: &Path, size: u64) -> Result<(), UploadError> {
    let is_json = path
        .extension()
        .is_some_and(|ext| ext.eq_ignore_ascii_case("json"));
    if !is_json {
        return Err(UploadError::NotJson);
    }
    if size > MAX_FILE_SIZE {
        return Err(UploadError::TooLarge);
    }
    if size == 0 {
        return Err(UploadError::Empty);
    }
    Ok(())
}

/// Reads and validates a question file. No partial bank is ever returned.
#[instrument(skip_all, fields(path = %path.display()), err(Debug))]
pub async fn read_bank(path: &Path) -> anyhow::Result<Vec<Question>> {
    let metadata = tokio::fs::metadata(path)
        .await
        .with_context(|| format!("unable to open {}", path.display()))?;
    validate_file(path, metadata.len())?;

    let content = tokio::fs::read_to_string(path)
        .await
        .with_context(|| format!("unable to read {}", path.display()))?;
    let bank = parse_bank(&content).context("invalid question file")?;

    info!(questions = bank.len(), "loaded question file");
    Ok(bank)
}
