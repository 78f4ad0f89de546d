use exam_utils::generation::ExamConfig;
use std::{env::var, path::PathBuf};
use tracing::warn;

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct EnvVars {
    /// Question file to load. Without one the stored session is resumed.
    pub question_file: Option<PathBuf>,
    pub state_dir: PathBuf,
    pub start_range: Option<String>,
    pub end_range: Option<String>,
    pub randomize: bool,
    pub random_count: Option<String>,
    pub report_path: Option<PathBuf>,
}

impl EnvVars {
    pub fn new() -> Self {
        Self::from_lookup(|key| var(key).ok())
    }

    pub fn from_lookup<F>(lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let non_empty = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

        let question_file = non_empty("QUESTION_FILE").map(PathBuf::from);

        let state_dir = match non_empty("STATE_DIR") {
            Some(dir) => PathBuf::from(dir),
            None => {
                let default_state_dir = ".exam-practice";
                warn!("STATE_DIR not set. Defaulting to {default_state_dir}");
                PathBuf::from(default_state_dir)
            }
        };

        let randomize = match non_empty("RANDOMIZE") {
            Some(v) => match v.trim().to_lowercase().as_str() {
                "true" | "1" | "yes" => true,
                "false" | "0" | "no" => false,
                other => {
                    warn!("RANDOMIZE value '{other}' is not valid. Defaulting to false.");
                    false
                }
            },
            None => false,
        };

        Self {
            question_file,
            state_dir,
            start_range: non_empty("START_RANGE"),
            end_range: non_empty("END_RANGE"),
            randomize,
            random_count: non_empty("RANDOM_COUNT"),
            report_path: non_empty("REPORT_PATH").map(PathBuf::from),
        }
    }

    /// Exam configuration for a freshly loaded bank. When only one range bound
    /// is set, the other defaults to the edge of the bank.
    pub fn exam_config(&self, bank_len: usize) -> ExamConfig {
        let (start_range, end_range) = match (&self.start_range, &self.end_range) {
            (None, None) => (None, None),
            (start, end) => {
                let defaults = ExamConfig::for_bank(bank_len);
                (
                    start.clone().or(defaults.start_range),
                    end.clone().or(defaults.end_range),
                )
            }
        };

        ExamConfig {
            start_range,
            end_range,
            randomize: self.randomize,
            random_count: self.random_count.clone(),
        }
    }
}

impl Default for EnvVars {
    fn default() -> Self {
        Self::new()
    }
}
