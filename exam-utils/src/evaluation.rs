use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};

use crate::{error::Error, normalize::answer_letter, question::Question};

/// One graded submission for one question.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GradedAnswer {
    pub question_number: u32,
    pub selected_letters: BTreeSet<char>,
    pub is_correct: bool,
    pub timestamp: DateTime<Utc>,
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SessionResults {
    pub total: usize,
    pub correct: usize,
    pub percentage: u32,
}

impl SessionResults {
    pub fn incorrect(&self) -> usize {
        self.total - self.correct
    }
}

/// Letters named by a selection. Takes the first character of each entry,
/// so `"a"` and `"A. option text"` both select `'A'`.
pub fn selected_letters<S: AsRef<str>>(selected: &[S]) -> BTreeSet<char> {
    selected
        .iter()
        .filter_map(|s| answer_letter(s.as_ref()))
        .collect()
}

/// Whether `selected` answers `question`.
///
/// A single-answer question needs exactly the one correct letter. A
/// multi-answer question needs the selected set to equal the correct set;
/// there is no partial credit.
pub fn is_correct<S: AsRef<str>>(question: &Question, selected: &[S]) -> bool {
    compare_answers(&question.correct_answers, &selected_letters(selected))
}

pub fn compare_answers(correct: &BTreeSet<char>, selected: &BTreeSet<char>) -> bool {
    match correct.len() {
        0 => false,
        1 => selected.len() == 1 && correct.is_superset(selected),
        _ => {
            selected.len() == correct.len()
                && selected.iter().all(|s| correct.contains(s))
                && correct.iter().all(|c| selected.contains(c))
        }
    }
}

/// Grades a selection for a question at `timestamp`.
pub fn grade<S: AsRef<str>>(
    question: &Question,
    selected: &[S],
    timestamp: DateTime<Utc>,
) -> Result<GradedAnswer, Error> {
    let selected_letters = selected_letters(selected);
    if selected_letters.is_empty() {
        return Err(Error::EmptySelection);
    }

    Ok(GradedAnswer {
        question_number: question.number,
        is_correct: compare_answers(&question.correct_answers, &selected_letters),
        selected_letters,
        timestamp,
    })
}

/// Totals for a set of graded answers. `percentage` is rounded half up and
/// is 0 when nothing has been answered.
pub fn calculate_score(graded: &BTreeMap<u32, GradedAnswer>) -> SessionResults {
    let total = graded.len();
    let correct = graded.values().filter(|a| a.is_correct).count();
    let percentage = if total > 0 {
        ((correct as f64 / total as f64) * 100.0).round() as u32
    } else {
        0
    };

    SessionResults {
        total,
        correct,
        percentage,
    }
}
