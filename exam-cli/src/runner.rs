use anyhow::Context;
use exam_store::{FileStore, KeyValueStore, SessionStore, resume_session};
use exam_utils::{
    attempt::ExamSession,
    error::Error,
    format::{format_answer_letters, format_option},
    question::letter_index,
};
use std::fmt::Write;
use tokio::io::{AsyncBufRead, AsyncBufReadExt, AsyncWrite, AsyncWriteExt, BufReader};
use tracing::{debug, info, instrument};

use crate::{
    command::{Command, HELP, parse_command},
    config::EnvVars,
    report::{render_summary, render_text},
    upload::read_bank,
};

/// What the loop should do after a command.
#[derive(Debug, PartialEq, Eq)]
pub enum Step {
    Continue(String),
    Quit(String),
}

/// Drives a session from commands, persisting after every change.
pub struct Runner<S> {
    session: ExamSession,
    store: SessionStore<S>,
}

impl<S: KeyValueStore> Runner<S> {
    pub fn new(session: ExamSession, store: SessionStore<S>) -> Self {
        Self { session, store }
    }

    pub fn session(&self) -> &ExamSession {
        &self.session
    }

    pub fn into_store(self) -> SessionStore<S> {
        self.store
    }

    pub fn persist(&mut self) -> anyhow::Result<()> {
        self.store
            .save_session(&self.session)
            .context("unable to save session")
    }

    pub fn handle(&mut self, command: Command) -> anyhow::Result<Step> {
        let step = match command {
            Command::Answer(letters) => Step::Continue(self.answer(&letters)),
            Command::Next => {
                if self.session.next() {
                    Step::Continue(self.prompt())
                } else {
                    Step::Continue("This is the last question.\n".into())
                }
            }
            Command::Previous => {
                if self.session.previous() {
                    Step::Continue(self.prompt())
                } else {
                    Step::Continue("This is the first question.\n".into())
                }
            }
            Command::Results => Step::Continue(render_summary(&self.session.results())),
            Command::Help => Step::Continue(HELP.into()),
            Command::Quit => Step::Quit(render_summary(&self.session.results())),
        };

        self.persist()?;
        Ok(step)
    }

    fn answer(&mut self, letters: &[String]) -> String {
        let Some(question) = self.session.current_question() else {
            return "There is no question to answer.\n".into();
        };
        let option_count = question.options.len();
        let out_of_range = letters.iter().any(|l| {
            l.chars()
                .next()
                .and_then(letter_index)
                .is_none_or(|i| i >= option_count)
        });
        if out_of_range {
            let max = question.max_letter().unwrap_or('A');
            return format!("Choose letters between A and {max}.\n");
        }

        match self.session.submit(letters) {
            Ok(answer) => {
                let answer = answer.clone();
                let mut out = String::new();
                let Some(question) = self.session.current_question() else {
                    return out;
                };
                if answer.is_correct {
                    out.push_str("Correct!\n");
                } else {
                    let _ = writeln!(
                        out,
                        "Incorrect. Correct answer(s): {}",
                        format_answer_letters(&question.correct_answers)
                    );
                }
                if let Some(explanation) = &question.explanation {
                    let _ = writeln!(out, "Explanation: {explanation}");
                }
                if self.session.is_complete() {
                    out.push_str("All questions answered. Type r for results or q to quit.\n");
                }
                out
            }
            Err(Error::AlreadyAnswered(number)) => {
                format!("Question {number} has already been answered.\n")
            }
            Err(e) => format!("{e}\n"),
        }
    }

    /// The current question with its options and any recorded answer.
    pub fn prompt(&self) -> String {
        let Some(question) = self.session.current_question() else {
            return "No questions in this session.\n".into();
        };

        let mut out = String::new();
        let _ = writeln!(
            out,
            "\nQuestion {} of {} (#{}), {} answered",
            self.session.current_index() + 1,
            self.session.working_set().len(),
            question.number,
            self.session.answered_count()
        );
        if let Some(topic) = &question.topic {
            let _ = writeln!(out, "Topic: {topic}");
        }
        let _ = writeln!(out, "{}", question.text);
        for (letter, text) in question.lettered_options() {
            let _ = writeln!(out, "  {}", format_option(letter, text));
        }
        if question.is_multi_answer() {
            let _ = writeln!(
                out,
                "(select {} answers)",
                question.correct_answers.len()
            );
        }

        if let Some(answer) = self.session.answer_for(question.number) {
            let verdict = if answer.is_correct {
                "correct"
            } else {
                "incorrect"
            };
            let _ = writeln!(
                out,
                "Answered: {} ({verdict})",
                format_answer_letters(&answer.selected_letters)
            );
        }

        out
    }
}

/// Reads commands line by line until input ends or the user quits.
pub async fn run<S, R, W>(runner: &mut Runner<S>, input: R, output: &mut W) -> anyhow::Result<()>
where
    S: KeyValueStore,
    R: AsyncBufRead + Unpin,
    W: AsyncWrite + Unpin,
{
    let mut lines = input.lines();
    output.write_all(runner.prompt().as_bytes()).await?;
    output.flush().await?;

    while let Some(line) = lines.next_line().await? {
        let Some(command) = parse_command(&line) else {
            output
                .write_all(b"Unrecognized input. Type ? for help.\n")
                .await?;
            output.flush().await?;
            continue;
        };
        debug!(?command, "handling command");

        match runner.handle(command)? {
            Step::Continue(text) => output.write_all(text.as_bytes()).await?,
            Step::Quit(text) => {
                output.write_all(text.as_bytes()).await?;
                break;
            }
        }
        output.flush().await?;
    }

    output.flush().await?;
    Ok(())
}

/// Loads or resumes a session, runs it on stdin/stdout and writes the report.
#[instrument(skip_all, err(Debug))]
pub async fn start(env_vars: &EnvVars) -> anyhow::Result<()> {
    let mut store = SessionStore::new(FileStore::new(&env_vars.state_dir));

    let session = match &env_vars.question_file {
        Some(path) => {
            let bank = read_bank(path).await?;
            let file_name = path
                .file_name()
                .map(|name| name.to_string_lossy().into_owned());
            let config = env_vars.exam_config(bank.len());

            let mut session = ExamSession::new(bank, file_name);
            session.apply_config(&config, &mut rand::rng())?;
            store.clear_all().context("unable to clear stored session")?;
            info!(
                questions = session.working_set().len(),
                config = %config.describe(),
                "starting new session"
            );
            session
        }
        None => {
            let session = resume_session(&store)?
                .context("no stored session. Set QUESTION_FILE to load a question file")?;
            info!(
                questions = session.working_set().len(),
                answered = session.answered_count(),
                "resuming session"
            );
            session
        }
    };

    let mut runner = Runner::new(session, store);
    runner.persist()?;

    let stdin = BufReader::new(tokio::io::stdin());
    let mut stdout = tokio::io::stdout();
    run(&mut runner, stdin, &mut stdout).await?;

    if let Some(path) = &env_vars.report_path {
        tokio::fs::write(path, render_text(&runner.session().report()))
            .await
            .with_context(|| format!("unable to write report to {}", path.display()))?;
        info!(path = %path.display(), "report written");
    }

    Ok(())
}
