pub mod merge;
pub mod mirror;
pub mod verify;

pub use merge::{
    load_bank_questions, merge_question_banks, MergeConfig, MergeReport, MergedBank, SkippedBank,
};
pub use mirror::{
    mirror_question_banks, validate_mirror_paths, CopiedFile, MirrorConfig, MirrorReport,
    QUESTION_BANK_EXTENSIONS,
};
pub use verify::{hash_tree, verify_mirror, VerifyReport};
