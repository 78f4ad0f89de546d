use std::collections::BTreeMap;

use exam_utils::{
    attempt::ExamSession, evaluation::GradedAnswer, question::Question,
    validation::parse_questions,
};
use tracing::{debug, instrument};

use crate::{error::StoreError, store::KeyValueStore};

pub const QUESTIONS_KEY: &str = "examQuestions";
pub const USER_ANSWERS_KEY: &str = "userAnswers";
pub const CURRENT_INDEX_KEY: &str = "currentQuestionIndex";
pub const FILE_NAME_KEY: &str = "uploadedFileName";

const KEYS: [&str; 4] = [
    QUESTIONS_KEY,
    USER_ANSWERS_KEY,
    CURRENT_INDEX_KEY,
    FILE_NAME_KEY,
];

/// Typed access to the persisted pieces of a session.
#[derive(Clone, Debug)]
pub struct SessionStore<S> {
    store: S,
}

impl<S: KeyValueStore> SessionStore<S> {
    pub fn new(store: S) -> Self {
        Self { store }
    }

    pub fn inner(&self) -> &S {
        &self.store
    }

    pub fn into_inner(self) -> S {
        self.store
    }

    pub fn save_questions(&mut self, questions: &[Question]) -> Result<(), StoreError> {
        let json = serde_json::to_string(questions)?;
        self.store.set(QUESTIONS_KEY, &json)
    }

    /// Raw persisted bank. Callers must validate it before use.
    pub fn load_questions(&self) -> Result<Option<String>, StoreError> {
        self.store.get(QUESTIONS_KEY)
    }

    pub fn save_user_answers(
        &mut self,
        answers: &BTreeMap<u32, GradedAnswer>,
    ) -> Result<(), StoreError> {
        let json = serde_json::to_string(answers)?;
        self.store.set(USER_ANSWERS_KEY, &json)
    }

    pub fn load_user_answers(&self) -> Result<Option<BTreeMap<u32, GradedAnswer>>, StoreError> {
        self.store
            .get(USER_ANSWERS_KEY)?
            .map(|json| {
                serde_json::from_str(&json).map_err(|source| StoreError::Corrupt {
                    key: USER_ANSWERS_KEY,
                    source,
                })
            })
            .transpose()
    }

    pub fn save_current_index(&mut self, index: usize) -> Result<(), StoreError> {
        self.store.set(CURRENT_INDEX_KEY, &index.to_string())
    }

    pub fn load_current_index(&self) -> Result<Option<usize>, StoreError> {
        self.store
            .get(CURRENT_INDEX_KEY)?
            .map(|value| {
                value
                    .trim()
                    .parse()
                    .map_err(|_| StoreError::InvalidIndex(value.clone()))
            })
            .transpose()
    }

    pub fn save_file_name(&mut self, file_name: &str) -> Result<(), StoreError> {
        self.store.set(FILE_NAME_KEY, file_name)
    }

    pub fn load_file_name(&self) -> Result<Option<String>, StoreError> {
        Ok(self
            .store
            .get(FILE_NAME_KEY)?
            .filter(|name| !name.is_empty()))
    }

    pub fn clear_all(&mut self) -> Result<(), StoreError> {
        for key in KEYS {
            self.store.remove(key)?;
        }
        Ok(())
    }

    /// Persists every piece of the session. The working set is what gets
    /// stored as the question bank.
    pub fn save_session(&mut self, session: &ExamSession) -> Result<(), StoreError> {
        self.save_questions(session.working_set())?;
        self.save_user_answers(session.graded())?;
        self.save_current_index(session.current_index())?;
        match session.file_name() {
            Some(name) => self.save_file_name(name),
            None => self.store.remove(FILE_NAME_KEY),
        }
    }
}

/// Restores the stored session, if there is one.
///
/// The stored bank is canonical, so it is checked with the same structural
/// rules as an upload but not normalized again. A corrupted bank is rejected
/// rather than trusted; stored answers are regraded against it.
#[instrument(skip_all, err(Debug))]
pub fn resume_session<S: KeyValueStore>(
    store: &SessionStore<S>,
) -> Result<Option<ExamSession>, StoreError> {
    let Some(questions) = store.load_questions()? else {
        debug!("no stored questions");
        return Ok(None);
    };
    let questions = parse_questions(&questions)?;

    let graded = store.load_user_answers()?.unwrap_or_default();
    let current_index = store.load_current_index()?.unwrap_or(0);
    let file_name = store.load_file_name()?;

    Ok(Some(ExamSession::restore(
        questions,
        graded,
        current_index,
        file_name,
    )))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::MemoryStore;
    use exam_utils::{error::Error, validation::parse_bank};
    use std::collections::BTreeSet;

    fn bank() -> Vec<Question> {
        (1..=3)
            .map(|number| Question {
                number,
                text: format!("Question {number}"),
                options: vec!["A".into(), "B".into()],
                correct_answers: BTreeSet::from(['B']),
                explanation: None,
                topic: None,
                community_votes: None,
            })
            .collect()
    }

    #[test]
    fn empty_store_has_nothing_to_resume() {
        let store = SessionStore::new(MemoryStore::new());
        assert!(resume_session(&store).unwrap().is_none());
    }

    #[test]
    fn session_round_trips() {
        let mut session = ExamSession::new(bank(), Some("bank.json".into()));
        session.submit(&["B"]).unwrap();
        session.next();
        session.submit(&["A"]).unwrap();

        let mut store = SessionStore::new(MemoryStore::new());
        store.save_session(&session).unwrap();

        let resumed = resume_session(&store).unwrap().unwrap();
        assert_eq!(resumed.working_set(), session.working_set());
        assert_eq!(resumed.graded(), session.graded());
        assert_eq!(resumed.current_index(), 1);
        assert_eq!(resumed.file_name(), Some("bank.json"));
        assert_eq!(resumed.results(), session.results());
    }

    #[test]
    fn prefixed_looking_option_text_survives_resume() {
        let bank = parse_bank(
            r#"[{"question_number": 1, "question": "Q", "options": {"A": "B. foo", "B": "A. bar"}, "correct_answer": "A"}]"#,
        )
        .unwrap();
        let mut store = SessionStore::new(MemoryStore::new());
        store
            .save_session(&ExamSession::new(bank.clone(), None))
            .unwrap();

        let resumed = resume_session(&store).unwrap().unwrap();
        assert_eq!(resumed.working_set(), bank.as_slice());
        assert_eq!(resumed.working_set()[0].option('A'), Some("B. foo"));
    }

    #[test]
    fn stored_answers_are_regraded() {
        let mut session = ExamSession::new(bank(), None);
        session.submit(&["A"]).unwrap();
        let mut store = SessionStore::new(MemoryStore::new());
        store.save_session(&session).unwrap();

        let raw = store.inner().get(USER_ANSWERS_KEY).unwrap().unwrap();
        let mut inner = store.into_inner();
        inner
            .set(USER_ANSWERS_KEY, &raw.replace("\"isCorrect\":false", "\"isCorrect\":true"))
            .unwrap();
        let store = SessionStore::new(inner);

        let resumed = resume_session(&store).unwrap().unwrap();
        assert!(!resumed.answer_for(1).unwrap().is_correct);
        assert_eq!(resumed.results().correct, 0);
    }

    #[test]
    fn stored_empty_selection_is_discarded() {
        let mut session = ExamSession::new(bank(), None);
        session.submit(&["A"]).unwrap();
        let mut store = SessionStore::new(MemoryStore::new());
        store.save_session(&session).unwrap();

        let raw = store.inner().get(USER_ANSWERS_KEY).unwrap().unwrap();
        let mut inner = store.into_inner();
        inner
            .set(
                USER_ANSWERS_KEY,
                &raw.replace("\"selectedLetters\":[\"A\"]", "\"selectedLetters\":[]")
                    .replace("\"isCorrect\":false", "\"isCorrect\":true"),
            )
            .unwrap();
        let store = SessionStore::new(inner);

        let resumed = resume_session(&store).unwrap().unwrap();
        assert_eq!(resumed.answered_count(), 0);
        assert_eq!(resumed.results().percentage, 0);
    }

    #[test]
    fn corrupted_bank_is_rejected() {
        let mut store = SessionStore::new(MemoryStore::new());
        store.save_questions(&bank()).unwrap();
        let raw = store.load_questions().unwrap().unwrap();
        let mut inner = store.into_inner();
        inner
            .set(QUESTIONS_KEY, &raw.replacen("[\"B\"]", "[\"E\"]", 1))
            .unwrap();
        let store = SessionStore::new(inner);

        let err = resume_session(&store).unwrap_err();
        assert!(matches!(err, StoreError::Exam(ref e) if e.index() == Some(0)));
    }

    #[test]
    fn corrupted_answers_are_rejected() {
        let mut inner = MemoryStore::new();
        inner
            .set(QUESTIONS_KEY, &serde_json::to_string(&bank()).unwrap())
            .unwrap();
        inner.set(USER_ANSWERS_KEY, "{not json").unwrap();
        let store = SessionStore::new(inner);

        assert!(matches!(
            resume_session(&store).unwrap_err(),
            StoreError::Corrupt {
                key: USER_ANSWERS_KEY,
                ..
            }
        ));
    }

    #[test]
    fn bad_index_is_an_error() {
        let mut inner = MemoryStore::new();
        inner.set(CURRENT_INDEX_KEY, "three").unwrap();
        let store = SessionStore::new(inner);
        assert!(matches!(
            store.load_current_index(),
            Err(StoreError::InvalidIndex(_))
        ));
    }

    #[test]
    fn non_array_bank_is_rejected() {
        let mut inner = MemoryStore::new();
        inner.set(QUESTIONS_KEY, "{}").unwrap();
        let store = SessionStore::new(inner);
        assert!(matches!(
            resume_session(&store).unwrap_err(),
            StoreError::Exam(Error::Validation(_))
        ));
    }

    #[test]
    fn clear_all_removes_every_key() {
        let mut store = SessionStore::new(MemoryStore::new());
        store
            .save_session(&ExamSession::new(bank(), Some("bank.json".into())))
            .unwrap();
        store.clear_all().unwrap();

        assert!(store.load_questions().unwrap().is_none());
        assert!(store.load_user_answers().unwrap().is_none());
        assert!(store.load_current_index().unwrap().is_none());
        assert!(store.load_file_name().unwrap().is_none());
    }
}
