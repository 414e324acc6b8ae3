//! Output directory and file naming.
//!
//! The directory name is the first 3 characters of the base name followed by its
//! trailing slice, so `"documento"` lands in `"docmento/documento.png"`. Callers rely
//! on this exact rule; it loses information for short names and that is accepted.
//! Slices clamp like Python slices, so names shorter than the slices overlap
//! (`"ab"` → `"abab"`).
//!
//! Known quirk: the file name historically appended a `[-2:-4]` slice of the
//! name, which is always empty. It is reproduced as no suffix at all.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::layout::LayoutError;

const HEAD_CHARS: usize = 3;
const TAIL_CHARS: usize = 5;
const EXTENSION: &str = "png";

/// Where a rendered page is written.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OutputPath {
    pub directory: PathBuf,
    pub file_path: PathBuf,
}

/// Derives the directory name for a base name. Pure; no filesystem access.
pub fn directory_name(base_name: &str) -> String {
    let chars: Vec<char> = base_name.chars().collect();
    let head = &chars[..chars.len().min(HEAD_CHARS)];
    let tail = &chars[chars.len().saturating_sub(TAIL_CHARS)..];
    head.iter().chain(tail).collect()
}

fn validate_base_name(base_name: &str) -> Result<(), LayoutError> {
    if base_name.trim().is_empty() {
        return Err(LayoutError::InvalidName(
            "base name cannot be empty".to_string(),
        ));
    }
    if base_name.contains(['/', '\\']) || base_name == "." || base_name == ".." {
        return Err(LayoutError::InvalidName(format!(
            "base name '{base_name}' must be a plain file name"
        )));
    }
    Ok(())
}

/// Resolves `root/<directory_name>/<base_name>.png`, creating the directory if needed.
pub fn resolve_output_path(root: &Path, base_name: &str) -> Result<OutputPath, LayoutError> {
    validate_base_name(base_name)?;

    let directory = root.join(directory_name(base_name));
    std::fs::create_dir_all(&directory)?;
    let file_path = directory.join(format!("{base_name}.{EXTENSION}"));

    debug!(directory = %directory.display(), file = %file_path.display(), "Output path resolved");
    Ok(OutputPath {
        directory,
        file_path,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_directory_name_documento() {
        assert_eq!(directory_name("documento"), "docmento");
    }

    #[test]
    fn test_directory_name_short_names_overlap() {
        assert_eq!(directory_name("ab"), "abab");
        assert_eq!(directory_name("abcde"), "abcabcde");
        assert_eq!(directory_name("x"), "xx");
    }

    #[test]
    fn test_directory_name_counts_characters() {
        assert_eq!(directory_name("canción"), "cannción");
    }

    #[test]
    fn test_resolve_output_path_documento() {
        let root = tempfile::tempdir().unwrap();
        let out = resolve_output_path(root.path(), "documento").unwrap();
        assert_eq!(out.directory, root.path().join("docmento"));
        assert_eq!(
            out.file_path,
            root.path().join("docmento").join("documento.png")
        );
        assert!(out.directory.is_dir());
    }

    #[test]
    fn test_resolve_output_path_is_idempotent() {
        let root = tempfile::tempdir().unwrap();
        let first = resolve_output_path(root.path(), "documento").unwrap();
        let second = resolve_output_path(root.path(), "documento").unwrap();
        assert_eq!(first, second);
    }

    #[test]
    fn test_resolve_output_path_rejects_empty_and_separators() {
        let root = tempfile::tempdir().unwrap();
        for bad in ["", "   ", "a/b", "a\\b", "..", "."] {
            assert!(
                matches!(
                    resolve_output_path(root.path(), bad),
                    Err(LayoutError::InvalidName(_))
                ),
                "'{bad}' should be rejected"
            );
        }
    }
}
