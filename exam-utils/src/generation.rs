use rand::{Rng, seq::SliceRandom};
use serde::{Deserialize, Serialize};
use tracing::trace;

use crate::{error::Error, question::Question};

/// User-entered exam configuration.
///
/// Values are kept as typed so that parsing rules live in one place.
/// A blank value counts as absent.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ExamConfig {
    #[serde(default)]
    pub start_range: Option<String>,
    #[serde(default)]
    pub end_range: Option<String>,
    #[serde(default)]
    pub randomize: bool,
    #[serde(default)]
    pub random_count: Option<String>,
}

impl ExamConfig {
    /// Configuration offered after a bank is loaded: every question, in order.
    pub fn for_bank(len: usize) -> Self {
        Self {
            start_range: Some("1".into()),
            end_range: Some(len.to_string()),
            randomize: false,
            random_count: None,
        }
    }

    fn range(&self) -> Option<(&str, &str)> {
        Some((present(&self.start_range)?, present(&self.end_range)?))
    }

    fn count(&self) -> Option<&str> {
        present(&self.random_count)
    }

    /// Human readable summary, e.g. `Questions 3-7, 5 random questions`.
    pub fn describe(&self) -> String {
        let mut parts = vec![];
        if let Some((start, end)) = self.range() {
            parts.push(format!("Questions {start}-{end}"));
        }
        if self.randomize {
            if let Some(count) = self.count() {
                parts.push(format!("{count} random questions"));
            }
        }

        if parts.is_empty() {
            "All questions".to_string()
        } else {
            parts.join(", ")
        }
    }
}

fn present(value: &Option<String>) -> Option<&str> {
    value.as_deref().map(str::trim).filter(|v| !v.is_empty())
}

/// Whole-string integer parse; trailing characters make the value invalid.
fn parse_int(value: &str) -> Option<i64> {
    value.trim().parse().ok()
}

/// Validate Exam Config against a bank of `total_questions`:
/// - range bounds are both numbers
/// - `start_range` is at least 1
/// - `end_range` does not exceed the bank
/// - `start_range` is less than `end_range`
/// - when randomizing, `random_count` is positive and does not exceed the bank
pub fn validate_config(config: &ExamConfig, total_questions: usize) -> Result<(), Error> {
    let total = total_questions as i64;

    if let Some((start, end)) = config.range() {
        let (Some(start), Some(end)) = (parse_int(start), parse_int(end)) else {
            return Err(Error::InvalidConfig(
                "Start and end range must be valid numbers".into(),
            ));
        };
        if start < 1 {
            return Err(Error::InvalidConfig(
                "Start range must be at least 1".into(),
            ));
        }
        if end > total {
            return Err(Error::InvalidConfig(format!(
                "End range cannot exceed total questions ({total_questions})"
            )));
        }
        if start >= end {
            return Err(Error::InvalidConfig(
                "Start range must be less than end range".into(),
            ));
        }
    }

    if config.randomize {
        if let Some(count) = config.count() {
            let count = parse_int(count).filter(|c| *c > 0).ok_or_else(|| {
                Error::InvalidConfig("Random count must be a positive number".into())
            })?;
            if count > total {
                return Err(Error::InvalidConfig(format!(
                    "Random count cannot exceed total questions ({total_questions})"
                )));
            }
        }
    }

    Ok(())
}

/// Generates the working set for a session from the bank.
///
/// Range filtering happens before randomization. An unusable range is
/// ignored rather than reported; `validate_config` is the strict path.
/// The bank itself is never modified.
pub fn generate_working_set<R>(bank: &[Question], config: &ExamConfig, rng: &mut R) -> Vec<Question>
where
    R: Rng + ?Sized,
{
    let mut working = bank.to_vec();

    if let Some((start, end)) = config.range() {
        match (parse_int(start), parse_int(end)) {
            (Some(start), Some(end)) if 1 <= start && start < end && end <= bank.len() as i64 => {
                working = bank[(start - 1) as usize..end as usize].to_vec();
                trace!(start, end, "applied question range");
            }
            _ => trace!(start, end, "ignoring unusable question range"),
        }
    }

    if config.randomize {
        working.shuffle(rng);

        if let Some(count) = config.count().and_then(parse_int).filter(|c| *c > 0) {
            let count = (count as usize).min(working.len());
            working.truncate(count);
            trace!(count, "truncated shuffled questions");
        }
    }

    working
}

/// `generate_working_set` with the thread-local generator.
pub fn generate_working_set_random(bank: &[Question], config: &ExamConfig) -> Vec<Question> {
    let mut rng = rand::rng();
    generate_working_set(bank, config, &mut rng)
}
