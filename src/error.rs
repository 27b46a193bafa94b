use std::path::PathBuf;
use thiserror::Error;

/// Fatal failures that stop a sync run before or after the copy phases
#[derive(Debug, Error)]
pub enum SyncError {
    #[error("Source directory {} does not exist", .0.display())]
    SourceMissing(PathBuf),

    #[error("Source {} and destination {} overlap", .source_dir.display(), .destination_dir.display())]
    OverlappingPaths {
        source_dir: PathBuf,
        destination_dir: PathBuf,
    },

    #[error("Destination does not match source: {0} discrepancies")]
    VerificationFailed(usize),
}

/// Per-file failures while reading a question bank. These never abort a merge.
#[derive(Debug, Error)]
pub enum BankError {
    #[error("failed to read file: {0}")]
    Read(#[from] std::io::Error),

    #[error("invalid JSON: {0}")]
    Parse(#[from] serde_json::Error),

    #[error("missing \"questionBank\" object")]
    MissingWrapper,

    #[error("\"questionBank.questions\" is missing or not an array")]
    MissingQuestions,

    #[error("question at index {0} is not an object")]
    InvalidRecord(usize),
}
