//! Display helpers shared by hosts and report renderers.

use std::collections::BTreeSet;

/// `A. option text`
pub fn format_option(letter: char, text: &str) -> String {
    format!("{letter}. {text}")
}

/// Sorted letters joined with `", "`.
pub fn format_answer_letters(letters: &BTreeSet<char>) -> String {
    letters
        .iter()
        .map(char::to_string)
        .collect::<Vec<_>>()
        .join(", ")
}

pub fn format_score(percentage: u32) -> String {
    format!("{percentage}%")
}

/// `2/3 (67%)`
pub fn format_score_detailed(correct: usize, total: usize, percentage: u32) -> String {
    format!("{correct}/{total} ({})", format_score(percentage))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn formats() {
        assert_eq!(format_option('B', "foo"), "B. foo");
        assert_eq!(format_answer_letters(&BTreeSet::from(['C', 'A'])), "A, C");
        assert_eq!(format_answer_letters(&BTreeSet::new()), "");
        assert_eq!(format_score_detailed(2, 3, 67), "2/3 (67%)");
    }
}
