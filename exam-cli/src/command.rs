/// A line of user input.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Command {
    /// Upper case option letters, e.g. `["A", "C"]`.
    Answer(Vec<String>),
    Next,
    Previous,
    Results,
    Help,
    Quit,
}

pub const HELP: &str = "\
Commands:
  A | A C | A,C | AC   submit the letters of your answer
  n, next              next question
  p, prev              previous question
  r, results           show the score so far
  q, quit              save and exit
  ?, help              show this help

The letters H, N, P, Q and R alone are commands. To answer with one of
them, add a comma: n,
";

/// Parses one line of input. Keywords win over option letters of the same name.
pub fn parse_command(line: &str) -> Option<Command> {
    let line = line.trim();
    let command = match line.to_lowercase().as_str() {
        "" => return None,
        "n" | "next" => Command::Next,
        "p" | "prev" | "previous" => Command::Previous,
        "r" | "results" => Command::Results,
        "?" | "h" | "help" => Command::Help,
        "q" | "quit" | "exit" => Command::Quit,
        _ => return parse_answer(line),
    };
    Some(command)
}

fn parse_answer(line: &str) -> Option<Command> {
    let mut letters = vec![];
    for token in line
        .split(|c: char| c.is_whitespace() || c == ',')
        .filter(|t| !t.is_empty())
    {
        if !token.chars().all(|c| c.is_ascii_alphabetic()) {
            return None;
        }
        letters.extend(token.chars().map(|c| c.to_ascii_uppercase().to_string()));
    }

    if letters.is_empty() {
        None
    } else {
        Some(Command::Answer(letters))
    }
}
