use std::io::ErrorKind;
use std::path::{Component, Path, PathBuf};

use tracing::{info, warn};

use crate::Result;

/// Directories certbot writes below the work directory.
const ACME_DIRS: [&str; 3] = ["config", "work", "logs"];

/// Parse an ignore file into paths relative to its directory.
///
/// Blank lines and `#` comments are skipped. Glob patterns, negations and
/// entries escaping the directory are skipped with a warning.
pub fn parse_ignore_file(content: &str) -> Vec<PathBuf> {
    content
        .lines()
        .map(str::trim)
        .filter(|line| !line.is_empty() && !line.starts_with('#'))
        .filter_map(|line| {
            if line.starts_with('!') || line.contains(['*', '?', '[']) {
                warn!("Skipping pattern {:?} in ignore file", line);
                return None;
            }
            let path = PathBuf::from(line.trim_start_matches('/').trim_end_matches('/'));
            let safe = path
                .components()
                .all(|component| matches!(component, Component::Normal(_) | Component::CurDir));
            if !safe || path.as_os_str().is_empty() {
                warn!("Skipping entry {:?} in ignore file", line);
                return None;
            }
            Some(path)
        })
        .collect()
}

/// Delete everything the ignore file lists, relative to `work_dir`.
///
/// Without an ignore file the ACME client's own directories are removed.
/// Returns the paths that were actually deleted.
pub async fn remove_ignored_paths(work_dir: &Path, ignore_file: &Path) -> Result<Vec<PathBuf>> {
    let entries = match tokio::fs::read_to_string(ignore_file).await {
        Ok(content) => parse_ignore_file(&content),
        Err(e) if e.kind() == ErrorKind::NotFound => {
            info!(
                "Ignore file {} not found, removing ACME client directories",
                ignore_file.display()
            );
            ACME_DIRS.iter().map(PathBuf::from).collect()
        }
        Err(e) => return Err(e.into()),
    };

    let mut removed = Vec::new();
    for entry in entries {
        let path = work_dir.join(entry);
        if path == ignore_file {
            continue;
        }
        let result = match tokio::fs::symlink_metadata(&path).await {
            Ok(meta) if meta.is_dir() => tokio::fs::remove_dir_all(&path).await,
            Ok(_) => tokio::fs::remove_file(&path).await,
            Err(e) => Err(e),
        };
        match result {
            Ok(()) => removed.push(path),
            Err(e) if e.kind() == ErrorKind::NotFound => {}
            Err(e) => return Err(e.into()),
        }
    }
    Ok(removed)
}
