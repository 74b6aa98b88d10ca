use std::io;
use std::path::PathBuf;

use thiserror::Error;

/// Failures surfaced by the core operations. Every variant is recovered at
/// the boundary of a single file or database action; none of them leave the
/// in-memory store half-updated.
#[derive(Error, Debug)]
pub enum CoreError {
    #[error("could not access {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("file does not exist: {0}")]
    NotFound(PathBuf),

    #[error("no company or question data was found in the file")]
    EmptyParse,

    #[error("the 'questions' table contains no rows")]
    EmptyResult,

    #[error("database structure error: 'questions' table is missing or malformed ({0})")]
    Schema(String),

    #[error("database error: {0}")]
    Database(#[from] rusqlite::Error),

    #[error(transparent)]
    Validation(#[from] ValidationError),
}

/// Input rejected before the store is touched.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ValidationError {
    #[error("company name cannot be empty")]
    EmptyName,

    #[error("company '{0}' already exists")]
    Duplicate(String),

    #[error("company '{0}' does not exist")]
    UnknownCompany(String),

    #[error("a company can hold at most {0} questions")]
    TooManyRecords(usize),

    #[error("question {0} does not exist")]
    UnknownRecord(usize),

    #[error("select a company first")]
    NoCompanySelected,

    #[error("there is no company data to save")]
    NothingToSave,
}

impl CoreError {
    pub(crate) fn io(path: impl Into<PathBuf>, source: io::Error) -> Self {
        CoreError::Io {
            path: path.into(),
            source,
        }
    }

    /// Warnings are outcomes the user should hear about but that are not
    /// failures of the program: nothing to load, nothing to save.
    pub fn is_warning(&self) -> bool {
        matches!(
            self,
            CoreError::EmptyParse
                | CoreError::EmptyResult
                | CoreError::Validation(ValidationError::NothingToSave)
        )
    }
}

pub type Result<T> = std::result::Result<T, CoreError>;
