use crate::utils::{matches_extensions, sha256_file};
use anyhow::{Context, Result};
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use tracing::{info, warn};
use walkdir::WalkDir;

/// Hash every relevant file under a root, keyed by path relative to it
pub fn hash_tree<S: AsRef<str>>(
    root: &Path,
    extensions: &[S],
) -> Result<BTreeMap<PathBuf, String>> {
    let mut digests = BTreeMap::new();

    for entry in WalkDir::new(root).min_depth(1) {
        let entry = entry.with_context(|| format!("Failed to walk {:?}", root))?;
        let path = entry.path();
        if !path.is_file() || !matches_extensions(path, extensions) {
            continue;
        }

        let relative = path
            .strip_prefix(root)
            .with_context(|| format!("Path {:?} escaped {:?}", path, root))?
            .to_path_buf();
        digests.insert(relative, sha256_file(path)?);
    }

    Ok(digests)
}

/// Compare source and destination trees by SHA-256 digest. Relative paths
/// named in `ignored` are left out on both sides.
pub fn verify_mirror<S: AsRef<str>>(
    source_dir: &Path,
    destination_dir: &Path,
    extensions: &[S],
    ignored: &[PathBuf],
) -> Result<VerifyReport> {
    let mut source = hash_tree(source_dir, extensions)?;
    let mut destination = hash_tree(destination_dir, extensions)?;
    for path in ignored {
        source.remove(path);
        destination.remove(path);
    }

    let mut report = VerifyReport {
        files_checked: source.len(),
        ..VerifyReport::default()
    };

    for (path, digest) in &source {
        match destination.remove(path) {
            None => report.missing.push(path.clone()),
            Some(copied) if &copied != digest => report.mismatched.push(path.clone()),
            Some(_) => {}
        }
    }
    report.unexpected = destination.into_keys().collect();

    if report.is_clean() {
        info!("Verified {} files", report.files_checked);
    } else {
        for path in &report.missing {
            warn!("Missing from destination: {}", path.display());
        }
        for path in &report.mismatched {
            warn!("Content differs: {}", path.display());
        }
        for path in &report.unexpected {
            warn!("Not present in source: {}", path.display());
        }
    }

    Ok(report)
}

#[derive(Debug, Clone, Default)]
pub struct VerifyReport {
    pub files_checked: usize,
    pub missing: Vec<PathBuf>,
    pub mismatched: Vec<PathBuf>,
    pub unexpected: Vec<PathBuf>,
}

impl VerifyReport {
    pub fn discrepancies(&self) -> usize {
        self.missing.len() + self.mismatched.len() + self.unexpected.len()
    }

    pub fn is_clean(&self) -> bool {
        self.discrepancies() == 0
    }
}
