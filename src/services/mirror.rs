use crate::error::SyncError;
use crate::utils::{
    clear_directory, copy_file_preserving_times, matches_extensions, metadata_to_datetime,
    paths_overlap, resolve_path,
};
use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use std::fs;
use std::path::{Path, PathBuf};
use tracing::{debug, info};
use walkdir::WalkDir;

/// Extensions published to the site
pub const QUESTION_BANK_EXTENSIONS: &[&str] = &["json", "md"];

/// Configuration for the mirror phase
#[derive(Debug, Clone)]
pub struct MirrorConfig {
    pub source_dir: PathBuf,
    pub destination_dir: PathBuf,
    pub extensions: Vec<String>,
}

impl Default for MirrorConfig {
    fn default() -> Self {
        Self {
            source_dir: PathBuf::from("question_banks"),
            destination_dir: PathBuf::from("docs/assets/question_banks"),
            extensions: QUESTION_BANK_EXTENSIONS.iter().map(|e| e.to_string()).collect(),
        }
    }
}

/// Check the source and destination before anything is touched
pub fn validate_mirror_paths(source_dir: &Path, destination_dir: &Path) -> Result<()> {
    if !source_dir.is_dir() {
        return Err(SyncError::SourceMissing(source_dir.to_path_buf()).into());
    }

    let source = resolve_path(source_dir)?;
    let destination = resolve_path(destination_dir)?;
    if paths_overlap(&source, &destination) {
        return Err(SyncError::OverlappingPaths {
            source_dir: source,
            destination_dir: destination,
        }
        .into());
    }

    Ok(())
}

/// Replace the destination's contents with the filtered source tree.
///
/// The destination is wiped unconditionally, including entries that never came
/// from the source. A copy failure part way through leaves it partially filled.
pub fn mirror_question_banks(config: &MirrorConfig) -> Result<MirrorReport> {
    let source_dir = config.source_dir.as_path();
    let destination_dir = config.destination_dir.as_path();

    validate_mirror_paths(source_dir, destination_dir)?;

    info!(
        "Mirroring {} into {}",
        source_dir.display(),
        destination_dir.display()
    );

    fs::create_dir_all(destination_dir)
        .with_context(|| format!("Failed to create directory: {:?}", destination_dir))?;

    let removed_entries = clear_directory(destination_dir)?;
    debug!("Removed {} existing entries", removed_entries);

    let mut report = MirrorReport {
        removed_entries,
        ..MirrorReport::default()
    };

    let walker = WalkDir::new(source_dir).min_depth(1).sort_by_file_name();
    for entry in walker {
        let entry = entry.with_context(|| format!("Failed to walk {:?}", source_dir))?;
        let source_path = entry.path();
        let relative = source_path
            .strip_prefix(source_dir)
            .with_context(|| format!("Path {:?} escaped {:?}", source_path, source_dir))?;
        let dest_path = destination_dir.join(relative);

        if entry.file_type().is_dir() {
            fs::create_dir_all(&dest_path)
                .with_context(|| format!("Failed to create directory: {:?}", dest_path))?;
            report.directories_created += 1;
            continue;
        }

        if !source_path.is_file() {
            continue;
        }

        if !matches_extensions(source_path, config.extensions.as_slice()) {
            debug!("Ignoring {}", relative.display());
            report.ignored_files += 1;
            continue;
        }

        let size_bytes = copy_file_preserving_times(source_path, &dest_path)?;
        let modified_at = metadata_to_datetime(
            entry.metadata().ok().and_then(|metadata| metadata.modified().ok()),
        );
        match modified_at {
            Some(time) => debug!(
                "Copied {} ({} bytes, modified {})",
                relative.display(),
                size_bytes,
                time.to_rfc3339()
            ),
            None => debug!("Copied {} ({} bytes)", relative.display(), size_bytes),
        }

        report.copied_files.push(CopiedFile {
            relative_path: relative.to_path_buf(),
            destination: dest_path,
            size_bytes,
            modified_at,
        });
    }

    info!(
        "Mirror completed. Copied: {}, Directories: {}, Ignored: {}, Removed: {}",
        report.copied_files.len(),
        report.directories_created,
        report.ignored_files,
        report.removed_entries
    );

    Ok(report)
}

/// Report structure for the mirror phase
#[derive(Debug, Clone, Default)]
pub struct MirrorReport {
    pub removed_entries: usize,
    pub directories_created: usize,
    pub ignored_files: usize,
    pub copied_files: Vec<CopiedFile>,
}

impl MirrorReport {
    pub fn total_bytes(&self) -> u64 {
        self.copied_files.iter().map(|file| file.size_bytes).sum()
    }
}

#[derive(Debug, Clone)]
pub struct CopiedFile {
    pub relative_path: PathBuf,
    pub destination: PathBuf,
    pub size_bytes: u64,
    /// Source modification time, carried onto the copy
    pub modified_at: Option<DateTime<Utc>>,
}
