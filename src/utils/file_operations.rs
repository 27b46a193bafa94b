use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use sha2::{Digest, Sha256};
use std::fs::{self, File, FileTimes};
use std::io::Read;
use std::path::{Path, PathBuf};

/// List regular files directly inside a directory matching given extensions,
/// sorted by file name. A missing directory yields an empty list.
pub fn list_files_with_extensions<P, S>(directory: P, extensions: &[S]) -> Result<Vec<PathBuf>>
where
    P: AsRef<Path>,
    S: AsRef<str>,
{
    let dir_path = directory.as_ref();

    if !dir_path.exists() {
        return Ok(Vec::new());
    }

    let entries = fs::read_dir(dir_path)
        .with_context(|| format!("Failed to read directory: {:?}", dir_path))?;

    let mut files = Vec::new();
    for entry in entries {
        let path = entry
            .with_context(|| format!("Failed to read entry in: {:?}", dir_path))?
            .path();
        if path.is_file() && matches_extensions(&path, extensions) {
            files.push(path);
        }
    }

    files.sort_by(|a, b| a.file_name().cmp(&b.file_name()));

    Ok(files)
}

/// Check if file matches any of the given extensions, ignoring case.
/// Extensions may be given with or without the leading dot.
pub fn matches_extensions<S: AsRef<str>>(path: &Path, extensions: &[S]) -> bool {
    if extensions.is_empty() {
        return true;
    }

    path.extension()
        .and_then(|ext| ext.to_str())
        .map(|ext| {
            extensions.iter().any(|target_ext| {
                let target = target_ext.as_ref();
                target.trim_start_matches('.').eq_ignore_ascii_case(ext)
            })
        })
        .unwrap_or(false)
}

/// Copy a file, carrying its access and modification times onto the copy.
/// Returns the number of bytes copied.
pub fn copy_file_preserving_times<P: AsRef<Path>, Q: AsRef<Path>>(
    source: P,
    destination: Q,
) -> Result<u64> {
    let src_path = source.as_ref();
    let dest_path = destination.as_ref();

    let metadata = fs::metadata(src_path)
        .with_context(|| format!("Failed to read metadata for: {:?}", src_path))?;

    let bytes = fs::copy(src_path, dest_path)
        .with_context(|| format!("Failed to copy file from {:?} to {:?}", src_path, dest_path))?;

    let mut times = FileTimes::new();
    if let Ok(accessed) = metadata.accessed() {
        times = times.set_accessed(accessed);
    }
    if let Ok(modified) = metadata.modified() {
        times = times.set_modified(modified);
    }

    // fs::copy also copies permissions. A read-only copy only gets a read
    // handle, which is enough on Unix for the owner but not on Windows.
    let handle = if metadata.permissions().readonly() {
        File::open(dest_path)
    } else {
        File::options().write(true).open(dest_path)
    };
    handle
        .and_then(|file| file.set_times(times))
        .with_context(|| format!("Failed to set file times on: {:?}", dest_path))?;

    Ok(bytes)
}

/// Remove every entry directly under a directory. Subdirectories go
/// recursively; symbolic links are unlinked, never followed.
/// Returns the number of top-level entries removed.
pub fn clear_directory<P: AsRef<Path>>(directory: P) -> Result<usize> {
    let dir_path = directory.as_ref();
    let entries = fs::read_dir(dir_path)
        .with_context(|| format!("Failed to read directory: {:?}", dir_path))?;

    let mut removed = 0;
    for entry in entries {
        let entry = entry.with_context(|| format!("Failed to read entry in: {:?}", dir_path))?;
        let path = entry.path();
        let file_type = entry
            .file_type()
            .with_context(|| format!("Failed to read file type for: {:?}", path))?;

        if file_type.is_dir() {
            fs::remove_dir_all(&path)
                .with_context(|| format!("Failed to remove directory: {:?}", path))?;
        } else {
            fs::remove_file(&path)
                .with_context(|| format!("Failed to remove file: {:?}", path))?;
        }
        removed += 1;
    }

    Ok(removed)
}

/// Compute the hex SHA-256 digest of a file in one streaming pass
pub fn sha256_file<P: AsRef<Path>>(file_path: P) -> Result<String> {
    let mut file = File::open(file_path.as_ref())
        .with_context(|| format!("Failed to open file: {:?}", file_path.as_ref()))?;

    let mut hasher = Sha256::new();
    let mut buffer = vec![0; 128 * 1024];

    loop {
        let bytes_read = file.read(&mut buffer).context("Failed to read from file")?;
        if bytes_read == 0 {
            break;
        }
        hasher.update(&buffer[..bytes_read]);
    }

    Ok(format!("{:x}", hasher.finalize()))
}

/// Convert system time to UTC DateTime, if the time is known and representable
pub fn metadata_to_datetime(
    system_time: Option<std::time::SystemTime>,
) -> Option<DateTime<Utc>> {
    system_time
        .and_then(|t| t.duration_since(std::time::UNIX_EPOCH).ok())
        .and_then(|d| DateTime::from_timestamp_millis(d.as_millis() as i64))
}

/// Absolute form of a path with symlinks resolved. For a path that does not
/// exist yet, the nearest existing ancestor is canonicalized and the rest
/// appended, so an overlap check sees both sides in the same form.
pub fn resolve_path<P: AsRef<Path>>(path: P) -> Result<PathBuf> {
    let path = path.as_ref();
    let absolute = std::path::absolute(path)
        .with_context(|| format!("Failed to resolve path: {:?}", path))?;

    let mut existing = absolute.as_path();
    let mut remainder = Vec::new();
    while !existing.exists() {
        match (existing.parent(), existing.file_name()) {
            (Some(parent), Some(name)) => {
                remainder.push(name.to_os_string());
                existing = parent;
            }
            _ => return Ok(absolute),
        }
    }

    let mut resolved = fs::canonicalize(existing)
        .with_context(|| format!("Failed to resolve path: {:?}", existing))?;
    resolved.extend(remainder.iter().rev());
    Ok(resolved)
}

/// True when either path is equal to or nested inside the other
pub fn paths_overlap(a: &Path, b: &Path) -> bool {
    a.starts_with(b) || b.starts_with(a)
}
