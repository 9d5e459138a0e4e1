//! File discovery for organisation folders.

use std::path::{Component, Path, PathBuf};

use crate::error::{IngestError, Result};

/// Rule files found under an organisation folder.
#[derive(Debug, Default)]
pub struct FileListing {
    /// Matching files, sorted by path.
    pub files: Vec<PathBuf>,
    /// Nested directories that could not be read.
    pub errors: Vec<IngestError>,
}

/// Checks that `dir` exists and is a directory.
pub fn ensure_directory(dir: &Path) -> Result<()> {
    if !dir.exists() {
        return Err(IngestError::DirectoryNotFound {
            path: dir.to_path_buf(),
        });
    }
    if !dir.is_dir() {
        return Err(IngestError::NotADirectory {
            path: dir.to_path_buf(),
        });
    }
    Ok(())
}

/// Lists the immediate child directories of `dir`.
///
/// Returns directories sorted by name.
pub fn list_subdirectories(dir: &Path) -> Result<Vec<PathBuf>> {
    ensure_directory(dir)?;
    let (mut dirs, _) = read_entries(dir)?;
    dirs.sort_by(|a, b| a.file_name().cmp(&b.file_name()));
    Ok(dirs)
}

/// Recursively lists rule files under `root`.
///
/// Only files whose extension is in `extensions` (case-insensitive) are
/// returned. Every nested directory is entered. A nested directory that
/// cannot be read is reported in [`FileListing::errors`]; only an
/// unreadable `root` is an error.
pub fn list_rule_files(root: &Path, extensions: &[String]) -> Result<FileListing> {
    ensure_directory(root)?;
    let mut listing = FileListing::default();
    let mut pending = vec![root.to_path_buf()];

    while let Some(dir) = pending.pop() {
        let (dirs, files) = match read_entries(&dir) {
            Ok(entries) => entries,
            Err(err) if dir == root => return Err(err),
            Err(err) => {
                listing.errors.push(err);
                continue;
            }
        };

        pending.extend(dirs);
        listing
            .files
            .extend(files.into_iter().filter(|path| has_extension(path, extensions)));
    }

    // Sort by path
    listing.files.sort();
    Ok(listing)
}

/// Final component of `path` as UTF-8, if any.
#[must_use]
pub fn folder_name(path: &Path) -> Option<&str> {
    path.file_name().and_then(|name| name.to_str())
}

/// True when the extension of `path` is one of `extensions`, ignoring case.
#[must_use]
pub fn has_extension(path: &Path, extensions: &[String]) -> bool {
    path.extension()
        .and_then(|ext| ext.to_str())
        .is_some_and(|ext| extensions.iter().any(|e| e.eq_ignore_ascii_case(ext)))
}

/// Directory names between `root` and the folder containing `file`,
/// outermost first.
#[must_use]
pub fn relative_directories(root: &Path, file: &Path) -> Vec<String> {
    let Some(parent) = file.parent() else {
        return Vec::new();
    };
    parent
        .strip_prefix(root)
        .map(directory_names)
        .unwrap_or_default()
}

/// Normal components of a directory path, outermost first.
#[must_use]
pub fn directory_names(dir: &Path) -> Vec<String> {
    dir.components()
        .filter_map(|component| match component {
            Component::Normal(name) => name.to_str().map(str::to_string),
            _ => None,
        })
        .collect()
}

fn read_entries(dir: &Path) -> Result<(Vec<PathBuf>, Vec<PathBuf>)> {
    let entries = std::fs::read_dir(dir).map_err(|e| IngestError::DirectoryRead {
        path: dir.to_path_buf(),
        source: e,
    })?;

    let mut dirs = Vec::new();
    let mut files = Vec::new();
    for entry_result in entries {
        let entry = entry_result.map_err(|e| IngestError::DirectoryRead {
            path: dir.to_path_buf(),
            source: e,
        })?;
        let path = entry.path();
        if path.is_dir() {
            dirs.push(path);
        } else if path.is_file() {
            files.push(path);
        }
    }
    Ok((dirs, files))
}
