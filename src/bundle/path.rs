//! Conversion between filesystem paths and manifest entry paths.
//!
//! Entry paths are stored as UTF-8 with `/` separators regardless of the
//! platform that wrote the bundle. On extraction every path is checked
//! segment by segment before it is joined to the destination root.

use std::path::{Component, Path, PathBuf};

use crate::error::{BundleError, Result};

/// Turn a path relative to a walk root into an entry path.
pub fn to_entry_path(relative: &Path) -> Result<String> {
    let mut parts = Vec::new();
    for component in relative.components() {
        match component {
            Component::Normal(part) => {
                let part = part
                    .to_str()
                    .ok_or_else(|| BundleError::NonUtf8Path(relative.to_path_buf()))?;
                parts.push(part);
            }
            Component::CurDir => {}
            _ => {
                return Err(BundleError::UnsafePath {
                    path: relative.display().to_string(),
                });
            }
        }
    }

    if parts.is_empty() {
        return Err(BundleError::UnsafePath {
            path: relative.display().to_string(),
        });
    }

    Ok(parts.join("/"))
}

/// Validate an entry path and return it as a relative [`PathBuf`].
///
/// Absolute paths, `..` segments and empty paths are rejected, as is any
/// segment the host platform would not treat as a single plain file name
/// (a drive prefix or backslash on Windows, for instance).
pub fn sanitize_entry_path(path: &str) -> Result<PathBuf> {
    let unsafe_path = || BundleError::UnsafePath {
        path: path.to_string(),
    };

    if path.starts_with('/') {
        return Err(unsafe_path());
    }

    let mut out = PathBuf::new();
    for segment in path.split('/') {
        match segment {
            "" | "." => continue,
            ".." => return Err(unsafe_path()),
            s if s.contains('\0') => return Err(unsafe_path()),
            s => {
                let mut components = Path::new(s).components();
                match (components.next(), components.next()) {
                    (Some(Component::Normal(part)), None) => out.push(part),
                    _ => return Err(unsafe_path()),
                }
            }
        }
    }

    if out.as_os_str().is_empty() {
        return Err(unsafe_path());
    }

    Ok(out)
}

/// Join a validated entry path under `root`.
pub fn resolve_under(root: &Path, path: &str) -> Result<PathBuf> {
    Ok(root.join(sanitize_entry_path(path)?))
}
