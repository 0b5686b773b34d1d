//! Path validation — keeps file tools inside the artifact output directory
//! and away from sensitive locations.

use std::path::{Path, PathBuf};

/// Error returned when path validation fails.
#[derive(Debug, thiserror::Error)]
pub enum PathValidationError {
    #[error("Path '{path}' is outside the output directory")]
    OutsideOutputDir { path: String },

    #[error("Path traversal detected in '{path}'")]
    PathTraversal { path: String },

    #[error("Failed to resolve path '{path}': {reason}")]
    ResolveFailed { path: String, reason: String },
}

/// Validate that a path is safe for a file tool to touch.
///
/// Checks:
/// 1. No path traversal (`..` components)
/// 2. Canonicalization resolves symlinks (for writes, the parent is resolved)
/// 3. The resolved path stays under `output_root`
///
/// Returns the resolved path on success. Relative paths are interpreted
/// against `output_root`.
pub fn validate_path(path: &str, output_root: &Path) -> Result<PathBuf, PathValidationError> {
    let normalized = path.replace('\\', "/");
    if normalized.split('/').any(|c| c == "..") {
        return Err(PathValidationError::PathTraversal { path: path.into() });
    }

    let joined = if Path::new(&normalized).is_absolute() {
        PathBuf::from(&normalized)
    } else {
        output_root.join(&normalized)
    };

    let root =
        output_root
            .canonicalize()
            .map_err(|e| PathValidationError::ResolveFailed {
                path: output_root.display().to_string(),
                reason: e.to_string(),
            })?;

    // For files that don't exist yet (writes), canonicalize the nearest
    // existing ancestor and re-append the missing components, so the
    // containment check always compares absolute paths.
    let resolved = if joined.exists() {
        joined
            .canonicalize()
            .map_err(|e| PathValidationError::ResolveFailed {
                path: path.into(),
                reason: e.to_string(),
            })?
    } else {
        let mut base = joined.as_path();
        let mut missing = Vec::new();
        while !base.exists() {
            match (base.parent(), base.file_name()) {
                (Some(parent), Some(name)) => {
                    missing.push(name.to_os_string());
                    base = parent;
                }
                _ => {
                    return Err(PathValidationError::ResolveFailed {
                        path: path.into(),
                        reason: "no existing ancestor directory".into(),
                    });
                }
            }
        }
        let mut resolved =
            base.canonicalize()
                .map_err(|e| PathValidationError::ResolveFailed {
                    path: path.into(),
                    reason: e.to_string(),
                })?;
        for component in missing.iter().rev() {
            resolved.push(component);
        }
        resolved
    };

    if !resolved.starts_with(&root) {
        return Err(PathValidationError::OutsideOutputDir { path: path.into() });
    }

    Ok(resolved)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn relative_path_resolves_under_root() {
        let dir = tempfile::tempdir().unwrap();
        let resolved = validate_path("report.csv", dir.path()).unwrap();
        assert!(resolved.starts_with(dir.path().canonicalize().unwrap()));
        assert!(resolved.ends_with("report.csv"));
    }

    #[test]
    fn nested_new_path_under_relative_root() {
        // The default output dir is relative ("./"); a write into a
        // directory that does not exist yet must still resolve under it.
        let resolved = validate_path("nested/report.csv", Path::new("./")).unwrap();
        assert!(resolved.is_absolute());
        assert!(resolved.ends_with("nested/report.csv"));
        assert!(resolved.starts_with(Path::new("./").canonicalize().unwrap()));
    }

    #[test]
    fn deeply_nested_new_path_resolves() {
        let dir = tempfile::tempdir().unwrap();
        let resolved = validate_path("a/b/c.txt", dir.path()).unwrap();
        assert!(resolved.starts_with(dir.path().canonicalize().unwrap()));
        assert!(resolved.ends_with("a/b/c.txt"));
    }

    #[test]
    fn traversal_rejected() {
        let dir = tempfile::tempdir().unwrap();
        let err = validate_path("../escape.txt", dir.path()).unwrap_err();
        assert!(matches!(err, PathValidationError::PathTraversal { .. }));
    }

    #[test]
    fn absolute_path_outside_root_rejected() {
        let dir = tempfile::tempdir().unwrap();
        let err = validate_path("/etc/passwd", dir.path()).unwrap_err();
        assert!(matches!(err, PathValidationError::OutsideOutputDir { .. }));
    }

    #[test]
    fn existing_file_inside_root_accepted() {
        let dir = tempfile::tempdir().unwrap();
        let file = dir.path().join("data.txt");
        std::fs::write(&file, "x").unwrap();
        let resolved = validate_path(file.to_str().unwrap(), dir.path()).unwrap();
        assert!(resolved.ends_with("data.txt"));
    }
}
