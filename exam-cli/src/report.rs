use exam_utils::{
    evaluation::SessionResults,
    format::{format_option, format_score},
    report::{ExamReport, ReportEntry},
};
use std::fmt::Write;

pub fn render_summary(summary: &SessionResults) -> String {
    format!(
        "Total Questions Answered: {}\nCorrect Answers: {}\nIncorrect Answers: {}\nScore: {}\n",
        summary.total,
        summary.correct,
        summary.incorrect(),
        format_score(summary.percentage)
    )
}

/// Plain text rendering of a report.
///
/// Option markers: `+` correct, `-` selected but wrong.
pub fn render_text(report: &ExamReport) -> String {
    let mut out = String::from("Exam Results Report\n\nSummary:\n");
    out.push_str(&render_summary(&report.summary));
    out.push_str("\nDetailed Results:\n");

    for entry in &report.entries {
        out.push('\n');
        render_entry(&mut out, entry);
    }

    out
}

fn render_entry(out: &mut String, entry: &ReportEntry) {
    // Writing to a String cannot fail.
    let _ = writeln!(out, "Question {}:", entry.question_number);
    let _ = writeln!(out, "{}", entry.text);

    for option in &entry.options {
        let marker = match (option.is_correct, option.was_selected) {
            (true, _) => '+',
            (false, true) => '-',
            (false, false) => ' ',
        };
        let _ = writeln!(out, "  {marker} {}", format_option(option.letter, &option.text));
    }

    if entry.is_correct {
        let _ = writeln!(out, "Your Answer: {} (Correct)", entry.selected);
    } else {
        let _ = writeln!(out, "Your Answer: {} (Incorrect)", entry.selected);
        let _ = writeln!(out, "Correct Answer(s): {}", entry.correct);
    }

    if let Some(explanation) = &entry.explanation {
        let _ = writeln!(out, "Explanation: {explanation}");
    }
}
