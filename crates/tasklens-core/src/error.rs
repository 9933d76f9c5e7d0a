use thiserror::Error;

#[derive(Error, Debug)]
pub enum TaskLensError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Validation error: {0}")]
    Validation(String),

    #[error("{0} not found")]
    NotFound(RecordKind),
}

/// Which collection a lookup missed in; rendered into not-found messages.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RecordKind {
    Task,
    ContextEntry,
}

impl std::fmt::Display for RecordKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            RecordKind::Task => write!(f, "Task"),
            RecordKind::ContextEntry => write!(f, "Context entry"),
        }
    }
}

pub type Result<T> = std::result::Result<T, TaskLensError>;
