use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use crate::{
    evaluation::{GradedAnswer, SessionResults, calculate_score},
    format::format_answer_letters,
    question::Question,
};

/// Finalized results handed to a report renderer.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExamReport {
    pub summary: SessionResults,
    pub entries: Vec<ReportEntry>,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReportEntry {
    pub question_number: u32,
    pub text: String,
    pub options: Vec<ReportOption>,
    /// e.g. `"A, C"`
    pub selected: String,
    pub correct: String,
    pub is_correct: bool,
    pub explanation: Option<String>,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReportOption {
    pub letter: char,
    pub text: String,
    pub is_correct: bool,
    pub was_selected: bool,
}

/// Builds the report for graded answers, in ascending question number.
///
/// Answers whose question is not in `questions` are left out of the entries;
/// the summary always matches `calculate_score` for the full map.
pub fn build_report(questions: &[Question], graded: &BTreeMap<u32, GradedAnswer>) -> ExamReport {
    let entries = graded
        .iter()
        .filter_map(|(number, answer)| {
            let question = questions.iter().find(|q| q.number == *number)?;
            Some(report_entry(question, answer))
        })
        .collect();

    ExamReport {
        summary: calculate_score(graded),
        entries,
    }
}

fn report_entry(question: &Question, answer: &GradedAnswer) -> ReportEntry {
    let options = question
        .lettered_options()
        .map(|(letter, text)| ReportOption {
            letter,
            text: text.to_string(),
            is_correct: question.correct_answers.contains(&letter),
            was_selected: answer.selected_letters.contains(&letter),
        })
        .collect();

    ReportEntry {
        question_number: question.number,
        text: question.text.clone(),
        options,
        selected: format_answer_letters(&answer.selected_letters),
        correct: format_answer_letters(&question.correct_answers),
        is_correct: answer.is_correct,
        explanation: question.explanation.clone(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;
    use std::collections::BTreeSet;

    fn question(number: u32) -> Question {
        Question {
            number,
            text: format!("Question {number}"),
            options: vec!["one".into(), "two".into(), "three".into()],
            correct_answers: BTreeSet::from(['A', 'C']),
            explanation: Some("one and three".into()),
            topic: None,
            community_votes: None,
        }
    }

    fn answer(number: u32, letters: &[char], is_correct: bool) -> GradedAnswer {
        GradedAnswer {
            question_number: number,
            selected_letters: letters.iter().copied().collect(),
            is_correct,
            timestamp: Utc::now(),
        }
    }

    #[test]
    fn entries_follow_question_number_order() {
        let questions = vec![question(5), question(2)];
        let graded = BTreeMap::from([
            (5, answer(5, &['A', 'C'], true)),
            (2, answer(2, &['B'], false)),
        ]);

        let report = build_report(&questions, &graded);

        assert_eq!(report.summary.total, 2);
        assert_eq!(report.summary.correct, 1);
        assert_eq!(report.summary.percentage, 50);
        assert_eq!(
            report.entries.iter().map(|e| e.question_number).collect::<Vec<_>>(),
            vec![2, 5]
        );

        let wrong = &report.entries[0];
        assert_eq!(wrong.selected, "B");
        assert_eq!(wrong.correct, "A, C");
        assert!(wrong.options[1].was_selected && !wrong.options[1].is_correct);
        assert!(wrong.options[2].is_correct && !wrong.options[2].was_selected);
    }

    #[test]
    fn answers_without_question_only_count_in_summary() {
        let graded = BTreeMap::from([(9, answer(9, &['A'], true))]);
        let report = build_report(&[question(1)], &graded);

        assert!(report.entries.is_empty());
        assert_eq!(report.summary, calculate_score(&graded));
    }
}
