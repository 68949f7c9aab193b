//! File utilities for the ingestion folders.

use std::fs;
use std::path::{Path, PathBuf};

use walkdir::WalkDir;

/// Regular files directly inside `dir`, sorted by name. When `extension` is
/// given only files with that extension (case-insensitive) are returned.
pub fn list_files(dir: &Path, extension: Option<&str>) -> walkdir::Result<Vec<PathBuf>> {
    let mut files = Vec::new();

    for entry in WalkDir::new(dir)
        .min_depth(1)
        .max_depth(1)
        .sort_by_file_name()
    {
        let entry = entry?;
        if !entry.file_type().is_file() {
            continue;
        }

        let path = entry.into_path();
        if let Some(wanted) = extension
            && !has_extension(&path, wanted)
        {
            continue;
        }
        files.push(path);
    }

    Ok(files)
}

/// Check a path's extension, ignoring case.
pub fn has_extension(path: &Path, extension: &str) -> bool {
    path.extension()
        .map(|e| e.to_string_lossy().eq_ignore_ascii_case(extension))
        .unwrap_or(false)
}

/// Final path component as a string.
pub fn file_name(path: &Path) -> String {
    path.file_name()
        .map(|n| n.to_string_lossy().to_string())
        .unwrap_or_default()
}

/// `<dir>/<stem><suffix>`, e.g. `report.pdf` + `_raw.txt` -> `report_raw.txt`.
pub fn sibling_with_suffix(dir: &Path, source: &Path, suffix: &str) -> PathBuf {
    let stem = source
        .file_stem()
        .map(|s| s.to_string_lossy().to_string())
        .unwrap_or_default();
    dir.join(format!("{stem}{suffix}"))
}

/// Create a directory and its parents if missing.
pub fn ensure_dir(dir: &Path) -> std::io::Result<()> {
    fs::create_dir_all(dir)
}
