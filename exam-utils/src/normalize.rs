use serde_json::{Map, Value};
use std::collections::{BTreeMap, BTreeSet};

use crate::question::{Question, option_letter};

#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum NormalizationError {
    #[error("is missing required field: {0}")]
    MissingField(&'static str),
    #[error("has invalid {0}")]
    InvalidField(&'static str),
    #[error("is not a valid object")]
    NotAnObject,
    #[error("has options that are neither a list nor a letter-keyed object")]
    UnrecognizedOptions,
    #[error("has a non-string option at {0}")]
    NonStringOption(String),
    #[error("has inconsistent option prefixing")]
    InconsistentPrefixing,
    #[error("has an empty option {0}")]
    EmptyOption(char),
    #[error("has more than one option labelled {0}")]
    DuplicateOptionLetter(char),
    #[error("has no correct_answer or correct_answers field")]
    MissingCorrectAnswers,
    #[error("has correct answers that are neither a string nor a list of strings")]
    UnrecognizedCorrectAnswers,
    #[error("has invalid correct answer")]
    EmptyCorrectAnswer,
    #[error("has invalid correct_answers array")]
    EmptyCorrectAnswers,
    #[error("has correct answer '{0}' that doesn't match available options")]
    UnmappedAnswer(char),
}

/// Options as found in the source file.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum RawOptions {
    /// `["A. text", ...]` or `["text", ...]`
    Sequence(Vec<String>),
    /// `{"A": "text", ...}`, canonical order is sorted key order
    Mapping(BTreeMap<String, String>),
}

/// Correct answers as found in the source file.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum RawAnswers {
    One(String),
    Many(Vec<String>),
}

/// An untrusted question record with its shapes discriminated.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct RawQuestionRecord {
    pub number: u32,
    pub text: String,
    pub options: RawOptions,
    pub answers: RawAnswers,
    pub explanation: Option<String>,
    pub topic: Option<String>,
    pub community_votes: Option<Vec<String>>,
}

/// Converts one raw JSON record into a canonical `Question`.
///
/// Deterministic: the same input always yields the same output.
pub fn normalize(value: &Value) -> Result<Question, NormalizationError> {
    RawQuestionRecord::from_value(value)?.normalize()
}

impl RawQuestionRecord {
    pub fn from_value(value: &Value) -> Result<Self, NormalizationError> {
        let object = value.as_object().ok_or(NormalizationError::NotAnObject)?;

        let number = object
            .get("question_number")
            .ok_or(NormalizationError::MissingField("question_number"))?
            .as_u64()
            .filter(|n| *n > 0)
            .and_then(|n| u32::try_from(n).ok())
            .ok_or(NormalizationError::InvalidField("question_number"))?;

        let text = object
            .get("question")
            .ok_or(NormalizationError::MissingField("question"))?
            .as_str()
            .ok_or(NormalizationError::InvalidField("question text"))?
            .to_owned();

        let options = parse_options(
            object
                .get("options")
                .ok_or(NormalizationError::MissingField("options"))?,
        )?;

        let answers = match answer_field(object) {
            Some(v) => parse_answers(v)?,
            None => return Err(NormalizationError::MissingCorrectAnswers),
        };

        Ok(Self {
            number,
            text,
            options,
            answers,
            explanation: optional_string(object, "explanation"),
            topic: optional_string(object, "topic"),
            community_votes: object
                .get("community_votes")
                .and_then(|v| serde_json::from_value(v.clone()).ok()),
        })
    }

    pub fn normalize(self) -> Result<Question, NormalizationError> {
        let (options, remap) = match self.options {
            RawOptions::Sequence(items) => canonicalize_sequence(items)?,
            // Keys are already sorted, so positions are the canonical letters.
            RawOptions::Mapping(map) => (map.into_values().collect(), None),
        };

        let entries = match self.answers {
            RawAnswers::One(answer) => vec![answer],
            RawAnswers::Many(answers) => answers,
        };
        if entries.is_empty() {
            return Err(NormalizationError::EmptyCorrectAnswers);
        }

        let mut correct_answers = BTreeSet::new();
        for entry in &entries {
            let letter = answer_letter(entry).ok_or(NormalizationError::EmptyCorrectAnswer)?;
            let letter = match &remap {
                Some(table) => *table
                    .get(&letter)
                    .ok_or(NormalizationError::UnmappedAnswer(letter))?,
                None => letter,
            };
            correct_answers.insert(letter);
        }

        Ok(Question {
            number: self.number,
            text: self.text,
            options,
            correct_answers,
            explanation: self.explanation,
            topic: self.topic,
            community_votes: self.community_votes,
        })
    }
}

/// `correct_answers` wins over `correct_answer`; explicit nulls count as absent.
fn answer_field(object: &Map<String, Value>) -> Option<&Value> {
    object
        .get("correct_answers")
        .filter(|v| !v.is_null())
        .or_else(|| object.get("correct_answer").filter(|v| !v.is_null()))
}

fn parse_options(value: &Value) -> Result<RawOptions, NormalizationError> {
    match value {
        Value::Array(items) => items
            .iter()
            .enumerate()
            .map(|(i, item)| {
                item.as_str()
                    .map(str::to_owned)
                    .ok_or_else(|| NormalizationError::NonStringOption(format!("position {i}")))
            })
            .collect::<Result<Vec<_>, _>>()
            .map(RawOptions::Sequence),
        Value::Object(map) => map
            .iter()
            .map(|(key, item)| {
                item.as_str()
                    .map(|s| (key.clone(), s.to_owned()))
                    .ok_or_else(|| NormalizationError::NonStringOption(format!("key {key}")))
            })
            .collect::<Result<BTreeMap<_, _>, _>>()
            .map(RawOptions::Mapping),
        _ => Err(NormalizationError::UnrecognizedOptions),
    }
}

fn parse_answers(value: &Value) -> Result<RawAnswers, NormalizationError> {
    match value {
        Value::String(s) => Ok(RawAnswers::One(s.clone())),
        Value::Array(items) => items
            .iter()
            .map(|item| {
                item.as_str()
                    .map(str::to_owned)
                    .ok_or(NormalizationError::UnrecognizedCorrectAnswers)
            })
            .collect::<Result<Vec<_>, _>>()
            .map(RawAnswers::Many),
        _ => Err(NormalizationError::UnrecognizedCorrectAnswers),
    }
}

fn optional_string(object: &Map<String, Value>, key: &str) -> Option<String> {
    object.get(key).and_then(Value::as_str).map(str::to_owned)
}

/// Strips options prefixed `"<LETTER>. "` and sorts them by their original
/// letter, returning the table from original letter to canonical letter.
/// Bare options are kept in the given order.
fn canonicalize_sequence(
    items: Vec<String>,
) -> Result<(Vec<String>, Option<BTreeMap<char, char>>), NormalizationError> {
    if items.iter().all(|o| split_letter_prefix(o).is_none()) {
        return Ok((items, None));
    }

    let mut by_letter = BTreeMap::new();
    for item in &items {
        let (letter, text) =
            split_letter_prefix(item).ok_or(NormalizationError::InconsistentPrefixing)?;
        if text.trim().is_empty() {
            return Err(NormalizationError::EmptyOption(letter));
        }
        if by_letter.insert(letter, text.to_owned()).is_some() {
            return Err(NormalizationError::DuplicateOptionLetter(letter));
        }
    }

    let remap = by_letter
        .keys()
        .enumerate()
        .map(|(rank, original)| (*original, option_letter(rank)))
        .collect();
    let options = by_letter.into_values().collect();

    Ok((options, Some(remap)))
}

/// Splits `"B. text"` into `('B', "text")`.
pub fn split_letter_prefix(option: &str) -> Option<(char, &str)> {
    let mut chars = option.chars();
    let letter = chars.next().filter(char::is_ascii_uppercase)?;
    let text = chars.as_str().strip_prefix(". ")?;
    Some((letter, text))
}

/// First character of an answer entry, upper-cased. Accepts `"b"` or `"B. text"`.
pub fn answer_letter(entry: &str) -> Option<char> {
    entry
        .trim()
        .chars()
        .next()
        .map(|c| c.to_ascii_uppercase())
}
