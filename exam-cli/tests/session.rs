use exam_cli::{
    command::Command,
    runner::{Runner, Step, run},
};
use exam_store::{MemoryStore, SessionStore, resume_session};
use exam_utils::{attempt::ExamSession, validation::parse_bank};

const BANK: &str = r#"[
    {"question_number": 1, "question": "Which service is a queue?", "options": ["A. SNS", "B. SQS", "C. SES"], "correct_answer": "B", "explanation": "SQS is the queue."},
    {"question_number": 2, "question": "Pick two storage services", "options": ["S3", "EC2", "EBS"], "correct_answers": ["A", "C"]}
]"#;

fn runner() -> Runner<MemoryStore> {
    let session = ExamSession::new(parse_bank(BANK).unwrap(), Some("bank.json".into()));
    Runner::new(session, SessionStore::new(MemoryStore::new()))
}

#[tokio::test]
async fn answers_questions_and_quits() {
    let mut runner = runner();
    let input: &[u8] = b"b\n1\nn\nA C\nr\nq\nn\n";
    let mut output = Vec::new();

    run(&mut runner, input, &mut output).await.unwrap();
    let output = String::from_utf8(output).unwrap();

    assert!(output.contains("Question 1 of 2 (#1), 0 answered\nWhich service is a queue?\n"));
    assert!(output.contains("  A. SNS\n  B. SQS\n  C. SES\n"));
    assert!(output.contains("Correct!\nExplanation: SQS is the queue.\n"));
    assert!(output.contains("Unrecognized input. Type ? for help.\n"));
    assert!(output.contains("(select 2 answers)"));
    assert!(output.contains("All questions answered."));
    assert!(output.ends_with("Score: 100%\n"));

    let session = runner.session();
    assert_eq!(session.current_index(), 1);
    assert!(session.is_complete());

    let stored = resume_session(&runner.into_store()).unwrap().unwrap();
    assert_eq!(stored.answered_count(), 2);
    assert_eq!(stored.current_index(), 1);
}

#[test]
fn rejects_out_of_range_and_repeat_answers() {
    let mut runner = runner();

    let step = runner.handle(Command::Answer(vec!["D".into()])).unwrap();
    assert_eq!(step, Step::Continue("Choose letters between A and C.\n".into()));
    assert_eq!(runner.session().answered_count(), 0);

    let step = runner.handle(Command::Answer(vec!["A".into()])).unwrap();
    let Step::Continue(text) = step else {
        panic!("expected the session to continue");
    };
    assert!(text.starts_with("Incorrect. Correct answer(s): B\n"));

    let step = runner.handle(Command::Answer(vec!["B".into()])).unwrap();
    assert_eq!(
        step,
        Step::Continue("Question 1 has already been answered.\n".into())
    );
    assert!(!runner.session().answer_for(1).unwrap().is_correct);

    let Step::Continue(prompt) = runner.handle(Command::Previous).unwrap() else {
        panic!("expected the session to continue");
    };
    assert_eq!(prompt, "This is the first question.\n");
    assert!(runner.prompt().contains("Answered: A (incorrect)"));
}

#[test]
fn quit_reports_summary() {
    let mut runner = runner();
    runner.handle(Command::Answer(vec!["B".into()])).unwrap();
    runner.handle(Command::Next).unwrap();
    runner.handle(Command::Answer(vec!["A".into()])).unwrap();

    let step = runner.handle(Command::Quit).unwrap();
    assert_eq!(
        step,
        Step::Quit(
            "Total Questions Answered: 2\nCorrect Answers: 1\nIncorrect Answers: 1\nScore: 50%\n"
                .into()
        )
    );
}
