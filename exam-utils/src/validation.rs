use serde_json::Value;
use std::collections::HashSet;
use tracing::debug;

use crate::{error::Error, normalize::normalize, question::Question};

const REQUIRED_FIELDS: [&str; 3] = ["question_number", "question", "options"];

#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum ValidationError {
    #[error("Data must be an array of questions")]
    NotAnArray,
    #[error("Question array cannot be empty")]
    EmptyBank,
    #[error("Question at index {index} {reason}")]
    Record { index: usize, reason: String },
}

impl ValidationError {
    pub fn index(&self) -> Option<usize> {
        match self {
            ValidationError::Record { index, .. } => Some(*index),
            _ => None,
        }
    }
}

fn record_error(index: usize, reason: impl Into<String>) -> ValidationError {
    ValidationError::Record {
        index,
        reason: reason.into(),
    }
}

/// Parses a JSON document into a validated question bank.
///
/// Uploaded files and persisted banks both come through here.
pub fn parse_bank(json: &str) -> Result<Vec<Question>, Error> {
    let value: Value = serde_json::from_str(json)?;
    let Value::Array(records) = value else {
        return Err(ValidationError::NotAnArray.into());
    };
    validate_bank(&records)
}

/// Parses a bank that is already in canonical form, such as a persisted one.
///
/// Records are checked but never normalized again: option text that happens
/// to look like `"B. text"` is content, not a letter prefix.
pub fn parse_questions(json: &str) -> Result<Vec<Question>, Error> {
    let value: Value = serde_json::from_str(json)?;
    if !value.is_array() {
        return Err(ValidationError::NotAnArray.into());
    }
    let questions: Vec<Question> = serde_json::from_value(value)?;
    validate_questions(&questions)?;
    Ok(questions)
}

/// Validates and normalizes every record of a bank.
///
/// Stops at the first invalid record; no partial bank is returned.
/// - record is an object with `question_number`, `question`, `options` and
///   `correct_answer` or `correct_answers`
/// - `question_number` is a positive integer, unique within the bank
/// - `question` is not blank
/// - record normalizes, then passes `validate_question`
#[tracing::instrument(skip_all, fields(records = records.len()), err(Debug))]
pub fn validate_bank(records: &[Value]) -> Result<Vec<Question>, Error> {
    if records.is_empty() {
        return Err(ValidationError::EmptyBank.into());
    }

    let mut questions = Vec::with_capacity(records.len());
    let mut seen = HashSet::new();

    for (index, record) in records.iter().enumerate() {
        check_raw_record(index, record)?;

        let question =
            normalize(record).map_err(|source| Error::Normalization { index, source })?;
        validate_question(index, &question)?;

        if !seen.insert(question.number) {
            return Err(record_error(
                index,
                format!("duplicates question_number {}", question.number),
            )
            .into());
        }
        questions.push(question);
    }

    debug!(questions = questions.len(), "question bank validated");
    Ok(questions)
}

fn check_raw_record(index: usize, record: &Value) -> Result<(), ValidationError> {
    let Some(object) = record.as_object() else {
        return Err(record_error(index, "is not a valid object"));
    };

    for field in REQUIRED_FIELDS {
        if !object.contains_key(field) {
            return Err(record_error(
                index,
                format!("is missing required field: {field}"),
            ));
        }
    }
    if !object.contains_key("correct_answers") && !object.contains_key("correct_answer") {
        return Err(record_error(
            index,
            "is missing required field: correct_answers",
        ));
    }

    let valid_number = object["question_number"]
        .as_u64()
        .is_some_and(|n| n > 0 && u32::try_from(n).is_ok());
    if !valid_number {
        return Err(record_error(index, "has invalid question_number"));
    }

    let valid_text = object["question"]
        .as_str()
        .is_some_and(|t| !t.trim().is_empty());
    if !valid_text {
        return Err(record_error(index, "has invalid question text"));
    }

    Ok(())
}

/// Structural checks on a canonical question.
pub fn validate_question(index: usize, question: &Question) -> Result<(), ValidationError> {
    if question.number == 0 {
        return Err(record_error(index, "has invalid question_number"));
    }
    if question.text.trim().is_empty() {
        return Err(record_error(index, "has invalid question text"));
    }

    if question.options.is_empty() {
        return Err(record_error(index, "has invalid options array"));
    }
    if question.options.iter().any(|o| o.trim().is_empty()) {
        return Err(record_error(index, "has invalid option text"));
    }

    if question.correct_answers.is_empty() {
        return Err(record_error(index, "has invalid correct_answers array"));
    }

    for letter in &question.correct_answers {
        if question.option(*letter).is_none() {
            return Err(record_error(
                index,
                format!("has correct answer '{letter}' that doesn't match available options"),
            ));
        }
    }

    Ok(())
}

/// Validates questions that are already canonical, with bank-level checks.
pub fn validate_questions(questions: &[Question]) -> Result<(), ValidationError> {
    if questions.is_empty() {
        return Err(ValidationError::EmptyBank);
    }

    let mut seen = HashSet::new();
    for (index, question) in questions.iter().enumerate() {
        validate_question(index, question)?;
        if !seen.insert(question.number) {
            return Err(record_error(
                index,
                format!("duplicates question_number {}", question.number),
            ));
        }
    }

    Ok(())
}
