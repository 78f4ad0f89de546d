use chrono::Utc;
use rand::Rng;
use std::collections::BTreeMap;
use tracing::{debug, warn};

use crate::{
    error::Error,
    evaluation::{GradedAnswer, SessionResults, calculate_score, compare_answers, grade},
    generation::{ExamConfig, generate_working_set, validate_config},
    question::Question,
    report::{ExamReport, build_report},
};

/// State of one practice session.
///
/// Every transition replaces whole values; nothing outside the session holds
/// references into it.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct ExamSession {
    bank: Vec<Question>,
    working_set: Vec<Question>,
    graded: BTreeMap<u32, GradedAnswer>,
    current_index: usize,
    file_name: Option<String>,
}

impl ExamSession {
    /// Starts a session over a validated bank, presenting every question.
    pub fn new(bank: Vec<Question>, file_name: Option<String>) -> Self {
        Self {
            working_set: bank.clone(),
            bank,
            graded: BTreeMap::new(),
            current_index: 0,
            file_name,
        }
    }

    /// Rebuilds a session from persisted state.
    ///
    /// The persisted question list becomes both bank and working set and the
    /// index is clamped. Stored verdicts are not trusted: every answer is
    /// regraded, and answers for unknown questions or with an empty or
    /// out-of-range selection are dropped.
    pub fn restore(
        questions: Vec<Question>,
        graded: BTreeMap<u32, GradedAnswer>,
        current_index: usize,
        file_name: Option<String>,
    ) -> Self {
        let mut kept = BTreeMap::new();
        let mut unknown = vec![];
        let mut invalid = vec![];

        for (number, mut answer) in graded {
            let Some(question) = questions
                .iter()
                .find(|q| q.number == number && answer.question_number == number)
            else {
                unknown.push(number);
                continue;
            };

            let selectable = !answer.selected_letters.is_empty()
                && answer
                    .selected_letters
                    .iter()
                    .all(|letter| question.option(*letter).is_some());
            if !selectable {
                invalid.push(number);
                continue;
            }

            answer.is_correct =
                compare_answers(&question.correct_answers, &answer.selected_letters);
            kept.insert(number, answer);
        }

        if !unknown.is_empty() {
            warn!(dropped = ?unknown, "discarding answers for unknown questions");
        }
        if !invalid.is_empty() {
            warn!(dropped = ?invalid, "discarding answers with unusable selections");
        }
        let graded = kept;

        let current_index = current_index.min(questions.len().saturating_sub(1));
        debug!(
            questions = questions.len(),
            answered = graded.len(),
            current_index,
            "restored session"
        );

        Self {
            working_set: questions.clone(),
            bank: questions,
            graded,
            current_index,
            file_name,
        }
    }

    /// Applies a configuration. An invalid configuration leaves the session untouched.
    pub fn apply_config<R>(&mut self, config: &ExamConfig, rng: &mut R) -> Result<(), Error>
    where
        R: Rng + ?Sized,
    {
        validate_config(config, self.bank.len())?;
        let working_set = generate_working_set(&self.bank, config, rng);
        debug!(
            questions = working_set.len(),
            config = %config.describe(),
            "applied exam config"
        );
        self.start(working_set);
        Ok(())
    }

    /// Uses the whole bank in its original order.
    pub fn skip_configuration(&mut self) {
        self.start(self.bank.clone());
    }

    fn start(&mut self, working_set: Vec<Question>) {
        self.working_set = working_set;
        self.graded = BTreeMap::new();
        self.current_index = 0;
    }

    pub fn bank(&self) -> &[Question] {
        &self.bank
    }

    pub fn working_set(&self) -> &[Question] {
        &self.working_set
    }

    pub fn graded(&self) -> &BTreeMap<u32, GradedAnswer> {
        &self.graded
    }

    pub fn current_index(&self) -> usize {
        self.current_index
    }

    pub fn file_name(&self) -> Option<&str> {
        self.file_name.as_deref()
    }

    pub fn current_question(&self) -> Option<&Question> {
        self.working_set.get(self.current_index)
    }

    /// Moves forward; returns whether the index changed.
    pub fn next(&mut self) -> bool {
        if self.current_index + 1 < self.working_set.len() {
            self.current_index += 1;
            true
        } else {
            false
        }
    }

    /// Moves back; returns whether the index changed.
    pub fn previous(&mut self) -> bool {
        if self.current_index > 0 {
            self.current_index -= 1;
            true
        } else {
            false
        }
    }

    pub fn is_answered(&self, number: u32) -> bool {
        self.graded.contains_key(&number)
    }

    pub fn answer_for(&self, number: u32) -> Option<&GradedAnswer> {
        self.graded.get(&number)
    }

    /// Grades `selected` against the current question. A question is graded
    /// at most once per session.
    pub fn submit<S: AsRef<str>>(&mut self, selected: &[S]) -> Result<&GradedAnswer, Error> {
        let question = self
            .working_set
            .get(self.current_index)
            .ok_or(Error::NoCurrentQuestion)?;
        if self.graded.contains_key(&question.number) {
            return Err(Error::AlreadyAnswered(question.number));
        }

        let answer = grade(question, selected, Utc::now())?;
        debug!(
            question = answer.question_number,
            correct = answer.is_correct,
            "graded answer"
        );

        Ok(&*self
            .graded
            .entry(answer.question_number)
            .or_insert(answer))
    }

    pub fn results(&self) -> SessionResults {
        calculate_score(&self.graded)
    }

    pub fn answered_count(&self) -> usize {
        self.graded.len()
    }

    pub fn progress_percentage(&self) -> u32 {
        if self.working_set.is_empty() {
            return 0;
        }
        ((self.answered_count() as f64 / self.working_set.len() as f64) * 100.0).round() as u32
    }

    pub fn is_complete(&self) -> bool {
        !self.working_set.is_empty()
            && self
                .working_set
                .iter()
                .all(|q| self.graded.contains_key(&q.number))
    }

    pub fn report(&self) -> ExamReport {
        build_report(&self.working_set, &self.graded)
    }
}
