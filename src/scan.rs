//! Recursive folder scan for supported image files.

use std::path::{Path, PathBuf};

use thiserror::Error;
use walkdir::WalkDir;

/// Extensions accepted by the scanner, matched case-insensitively.
pub const SUPPORTED_EXTENSIONS: &[&str] = &["jpg", "jpeg", "png", "bmp", "webp"];

/// Errors reported by the folder scan.
#[derive(Debug, Error)]
pub enum ScanError {
    /// The scan completed but matched nothing; the pipeline must not start.
    #[error("no supported image files found in {}", .0.display())]
    NoImages(PathBuf),

    /// The target is not a directory that can be scanned.
    #[error("{} is not a directory", .0.display())]
    NotADirectory(PathBuf),
}

/// Returns true when the path carries a supported image extension.
pub fn is_supported(path: &Path) -> bool {
    path.extension()
        .and_then(|ext| ext.to_str())
        .map(|ext| SUPPORTED_EXTENSIONS.contains(&ext.to_lowercase().as_str()))
        .unwrap_or(false)
}

/// Recursively enumerates `root` for supported image files.
///
/// Unreadable entries are skipped rather than failing the scan. The result
/// is sorted lexicographically so batch order is deterministic across runs.
///
/// # Errors
///
/// Returns `ScanError::NotADirectory` when `root` is not a directory and
/// `ScanError::NoImages` when the scan matches nothing.
pub fn scan_folder(root: &Path) -> Result<Vec<PathBuf>, ScanError> {
    if !root.is_dir() {
        return Err(ScanError::NotADirectory(root.to_path_buf()));
    }

    let mut found: Vec<PathBuf> = WalkDir::new(root)
        .into_iter()
        .filter_map(|entry| entry.ok())
        .filter(|entry| entry.file_type().is_file())
        .map(|entry| entry.into_path())
        .filter(|path| is_supported(path))
        .collect();

    if found.is_empty() {
        return Err(ScanError::NoImages(root.to_path_buf()));
    }

    found.sort();
    Ok(found)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn extension_match_is_case_insensitive() {
        assert!(is_supported(Path::new("a.jpg")));
        assert!(is_supported(Path::new("b.PNG")));
        assert!(is_supported(Path::new("c.JpEg")));
        assert!(is_supported(Path::new("d.webp")));
        assert!(is_supported(Path::new("e.bmp")));
    }

    #[test]
    fn unsupported_extensions_are_rejected() {
        assert!(!is_supported(Path::new("notes.txt")));
        assert!(!is_supported(Path::new("anim.gif")));
        assert!(!is_supported(Path::new("raw.cr2")));
        assert!(!is_supported(Path::new("no_extension")));
    }

    #[test]
    fn missing_directory_is_reported() {
        let result = scan_folder(Path::new("/nonexistent/pictag-test-dir"));
        assert!(matches!(result, Err(ScanError::NotADirectory(_))));
    }
}
