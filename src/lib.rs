pub mod error;
pub mod models;
pub mod services;
pub mod utils;

use anyhow::Result;
use std::path::PathBuf;

// Re-export commonly used types
pub use error::{BankError, SyncError};
pub use models::{QuestionBankDocument, QuestionRecord, MERGED_FILE_NAME};
pub use services::{
    merge_question_banks, mirror_question_banks, verify_mirror, MergeConfig, MergeReport,
    MirrorConfig, MirrorReport, VerifyReport,
};

// Application configuration
#[derive(Debug, Clone)]
pub struct AppConfig {
    pub mirror: MirrorConfig,
    pub merge: MergeConfig,
    pub log_level: String,
    pub verify: bool,
    pub skip_merge: bool,
}

impl AppConfig {
    /// Configuration for a source/destination pair with every other setting defaulted
    pub fn for_paths(source_dir: impl Into<PathBuf>, destination_dir: impl Into<PathBuf>) -> Self {
        let source_dir = source_dir.into();
        let destination_dir = destination_dir.into();
        Self {
            mirror: MirrorConfig {
                source_dir: source_dir.clone(),
                destination_dir: destination_dir.clone(),
                ..MirrorConfig::default()
            },
            merge: MergeConfig {
                source_dir,
                destination_dir,
                ..MergeConfig::default()
            },
            ..Self::default()
        }
    }
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            mirror: MirrorConfig::default(),
            merge: MergeConfig::default(),
            log_level: "info".to_string(),
            verify: false,
            skip_merge: false,
        }
    }
}

/// Outcome of a full run
#[derive(Debug, Clone)]
pub struct SyncReport {
    pub mirror: MirrorReport,
    pub merge: Option<MergeReport>,
    pub verify: Option<VerifyReport>,
}

/// Mirror, then merge into the repopulated destination, then optionally verify
pub fn sync_question_banks(config: &AppConfig) -> Result<SyncReport> {
    let mirror = mirror_question_banks(&config.mirror)?;

    let merge = if config.skip_merge {
        None
    } else {
        Some(merge_question_banks(&config.merge)?)
    };

    let verify = if config.verify {
        let ignored = vec![PathBuf::from(&config.merge.output_file_name)];
        let report = verify_mirror(
            &config.mirror.source_dir,
            &config.mirror.destination_dir,
            config.mirror.extensions.as_slice(),
            &ignored,
        )?;
        if !report.is_clean() {
            return Err(SyncError::VerificationFailed(report.discrepancies()).into());
        }
        Some(report)
    } else {
        None
    };

    Ok(SyncReport {
        mirror,
        merge,
        verify,
    })
}
