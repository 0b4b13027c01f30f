//! Question catalog and its on-disk loader
//!
//! The catalog is the read-only list of survey questions a game is built
//! from. It is loaded once at process start from a directory of YAML
//! records and never mutated afterwards.

use std::{
    collections::BTreeSet,
    fs,
    path::{Path, PathBuf},
};

use garde::Validate;
use itertools::Itertools;
use serde::{Deserialize, Serialize};
use serde_with::{DefaultOnError, serde_as};
use thiserror::Error;
use tracing::{info, warn};

/// A single survey answer and the points it is worth
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Answer {
    /// Text shown on the board when the answer is revealed
    pub text: String,
    /// Points added to the round pot when the answer is revealed
    pub value: u64,
}

impl Answer {
    /// Creates a new answer
    pub fn new(text: impl Into<String>, value: u64) -> Self {
        Self {
            text: text.into(),
            value,
        }
    }
}

/// A survey question with its ranked answers
///
/// Answers are always kept in descending order of value so that index 0
/// is the top answer. [`Question::new`] sorts them; nothing else can
/// reorder them afterwards.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Question {
    /// Unique identifier, the record's file stem when loaded from disk
    pub id: String,
    /// The survey prompt read out to the teams
    pub prompt: String,
    /// Category tags used to filter questions during setup
    pub tags: BTreeSet<String>,
    answers: Vec<Answer>,
}

impl Question {
    /// Creates a question, sorting the answers by descending value
    ///
    /// The sort is stable, so answers of equal value keep their
    /// relative order.
    pub fn new(
        id: impl Into<String>,
        prompt: impl Into<String>,
        tags: impl IntoIterator<Item = String>,
        mut answers: Vec<Answer>,
    ) -> Self {
        answers.sort_by(|a, b| b.value.cmp(&a.value));
        Self {
            id: id.into(),
            prompt: prompt.into(),
            tags: tags.into_iter().collect(),
            answers,
        }
    }

    /// The answers, highest value first
    pub fn answers(&self) -> &[Answer] {
        &self.answers
    }

    /// Gets the answer at `index`, if there is one
    pub fn answer(&self, index: usize) -> Option<&Answer> {
        self.answers.get(index)
    }

    /// Number of answers on the board
    pub fn answer_count(&self) -> usize {
        self.answers.len()
    }
}

/// Errors that can occur while loading a catalog
#[derive(Error, Debug)]
pub enum Error {
    /// The question directory could not be listed
    #[error("failed to read question directory {}: {source}", .path.display())]
    ReadDir {
        /// Directory that was being read
        path: PathBuf,
        /// Underlying I/O failure
        #[source]
        source: std::io::Error,
    },
}

/// A response as written in a question file
#[derive(Debug, Deserialize, Validate)]
struct ResponseRecord {
    #[garde(length(min = 1, max = crate::constants::catalog::MAX_ANSWER_LENGTH))]
    answer: String,
    #[garde(range(min = 1, max = crate::constants::catalog::MAX_ANSWER_VALUE))]
    value: u64,
}

/// A question as written in a question file
///
/// A `types` entry that is not a list of strings is read as no tags.
#[serde_as]
#[derive(Debug, Deserialize, Validate)]
struct QuestionRecord {
    #[garde(length(min = 1, max = crate::constants::catalog::MAX_PROMPT_LENGTH))]
    question: String,
    #[serde_as(as = "DefaultOnError")]
    #[serde(default)]
    #[garde(skip)]
    types: Vec<String>,
    #[garde(length(min = 1, max = crate::constants::catalog::MAX_ANSWER_COUNT), dive)]
    responses: Vec<ResponseRecord>,
}

impl QuestionRecord {
    fn into_question(self, id: &str) -> Question {
        Question::new(
            id,
            self.question,
            self.types,
            self.responses
                .into_iter()
                .map(|r| Answer::new(r.answer, r.value))
                .collect_vec(),
        )
    }
}

/// The full set of questions available to the admin
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct Catalog {
    questions: Vec<Question>,
    tags: Vec<String>,
}

impl Catalog {
    /// Builds a catalog from already parsed questions
    pub fn new(questions: Vec<Question>) -> Self {
        let tags = questions
            .iter()
            .flat_map(|q| q.tags.iter().cloned())
            .sorted()
            .dedup()
            .collect_vec();
        Self { questions, tags }
    }

    /// Loads every `*.yaml` / `*.yml` record in `dir`
    ///
    /// Files are read in file-name order. A file that cannot be read,
    /// parsed or validated is skipped with a warning; only a directory
    /// that cannot be listed is an error.
    ///
    /// # Errors
    ///
    /// Returns [`Error::ReadDir`] if `dir` cannot be listed.
    pub fn load_dir(dir: impl AsRef<Path>) -> Result<Self, Error> {
        let dir = dir.as_ref();
        let read_dir_error = |source| Error::ReadDir {
            path: dir.to_path_buf(),
            source,
        };

        let paths = fs::read_dir(dir)
            .map_err(read_dir_error)?
            .map(|entry| entry.map(|e| e.path()))
            .collect::<Result<Vec<_>, _>>()
            .map_err(read_dir_error)?
            .into_iter()
            .filter(|path| {
                path.extension()
                    .is_some_and(|ext| ext == "yaml" || ext == "yml")
            })
            .sorted()
            .collect_vec();

        let questions = paths
            .iter()
            .filter_map(|path| load_record(path))
            .collect_vec();

        info!(
            count = questions.len(),
            dir = %dir.display(),
            "loaded question catalog"
        );

        Ok(Self::new(questions))
    }

    /// All questions, in load order
    pub fn questions(&self) -> &[Question] {
        &self.questions
    }

    /// Sorted distinct tags across every question
    pub fn tags(&self) -> &[String] {
        &self.tags
    }

    /// Returns the questions whose ids appear in `ids`, in catalog order
    ///
    /// Unknown ids are ignored.
    pub fn select<S: AsRef<str>>(&self, ids: &[S]) -> Vec<Question> {
        self.questions
            .iter()
            .filter(|q| ids.iter().any(|id| id.as_ref() == q.id))
            .cloned()
            .collect_vec()
    }

    /// Number of questions in the catalog
    pub fn len(&self) -> usize {
        self.questions.len()
    }

    /// Whether the catalog has no questions
    pub fn is_empty(&self) -> bool {
        self.questions.is_empty()
    }
}

fn load_record(path: &Path) -> Option<Question> {
    let id = path.file_stem()?.to_string_lossy().into_owned();

    let contents = match fs::read_to_string(path) {
        Ok(contents) => contents,
        Err(error) => {
            warn!(file = %path.display(), %error, "unreadable question file, skipping");
            return None;
        }
    };

    let record: QuestionRecord = match serde_yaml::from_str(&contents) {
        Ok(record) => record,
        Err(error) => {
            warn!(file = %path.display(), %error, "invalid question format, skipping");
            return None;
        }
    };

    if let Err(report) = record.validate() {
        warn!(file = %path.display(), %report, "invalid question record, skipping");
        return None;
    }

    Some(record.into_question(&id))
}
