use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

/// A question in canonical form.
///
/// Options are addressed by position: index `i` is the letter `'A' + i`.
/// `correct_answers` only ever holds upper case letters.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Question {
    #[serde(rename = "question_number")]
    pub number: u32,
    #[serde(rename = "question")]
    pub text: String,
    pub options: Vec<String>,
    pub correct_answers: BTreeSet<char>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub explanation: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub topic: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub community_votes: Option<Vec<String>>,
}

impl Question {
    /// Highest letter addressable by this question's options. Options past
    /// the 26th have no letter.
    pub fn max_letter(&self) -> Option<char> {
        self.options.len().min(26).checked_sub(1).map(option_letter)
    }

    pub fn is_multi_answer(&self) -> bool {
        self.correct_answers.len() > 1
    }

    /// Option text for a canonical letter.
    pub fn option(&self, letter: char) -> Option<&str> {
        letter_index(letter)
            .and_then(|i| self.options.get(i))
            .map(String::as_str)
    }

    /// `(letter, text)` pairs in canonical order.
    pub fn lettered_options(&self) -> impl Iterator<Item = (char, &str)> {
        self.options
            .iter()
            .enumerate()
            .map(|(i, o)| (option_letter(i), o.as_str()))
    }
}

/// Letter for a zero-based option position.
///
/// Positions past `'Z'` are not addressable and map to `'?'`.
pub fn option_letter(index: usize) -> char {
    u8::try_from(index)
        .ok()
        .filter(|i| *i < 26)
        .map(|i| char::from(b'A' + i))
        .unwrap_or('?')
}

/// Zero-based option position for an upper case letter.
pub fn letter_index(letter: char) -> Option<usize> {
    if letter.is_ascii_uppercase() {
        Some((letter as u8 - b'A') as usize)
    } else {
        None
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn question() -> Question {
        Question {
            number: 1,
            text: "Which?".into(),
            options: vec!["bar".into(), "foo".into(), "baz".into()],
            correct_answers: BTreeSet::from(['B']),
            explanation: None,
            topic: None,
            community_votes: None,
        }
    }

    #[test]
    fn letters_and_positions_agree() {
        assert_eq!(option_letter(0), 'A');
        assert_eq!(option_letter(25), 'Z');
        assert_eq!(option_letter(26), '?');
        assert_eq!(letter_index('C'), Some(2));
        assert_eq!(letter_index('c'), None);
    }

    #[test]
    fn option_lookup_uses_canonical_letters() {
        let q = question();
        assert_eq!(q.option('B'), Some("foo"));
        assert_eq!(q.option('D'), None);
        assert_eq!(q.max_letter(), Some('C'));
        assert!(!q.is_multi_answer());
    }

    #[test]
    fn max_letter_stops_at_z() {
        let mut q = question();
        q.options = (0..30).map(|i| i.to_string()).collect();
        assert_eq!(q.max_letter(), Some('Z'));
        assert_eq!(q.option('Z'), Some("25"));

        q.options.clear();
        assert_eq!(q.max_letter(), None);
    }

    #[test]
    fn serializes_with_source_field_names() {
        let value = serde_json::to_value(question()).unwrap();
        assert_eq!(value["question_number"], 1);
        assert_eq!(value["question"], "Which?");
        assert_eq!(value["correct_answers"], serde_json::json!(["B"]));
        assert!(value.get("explanation").is_none());
    }
}
