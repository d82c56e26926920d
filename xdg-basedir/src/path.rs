//! Lexical path resolution
//!
//! Nothing in this module touches the filesystem: `..` is resolved against the
//! preceding components only, so symlinks are never followed. [`resolve`] is the
//! boundary that keeps caller-supplied relative paths (and configured prefixes)
//! inside the base directory they are joined to.

use std::path::{Component, Path, PathBuf};

use crate::error::{Result, XdgError};

/// Collapses `.` segments and resolves `..` against preceding segments.
///
/// On an absolute path a `..` at the root stays at the root. On a relative path
/// leading `..` segments that cannot be resolved are kept. Normalizing an already
/// normalized path returns it unchanged.
pub fn normalize(path: &Path) -> PathBuf {
    let mut normalized = PathBuf::new();
    // Normal components pushed so far, i.e. what `..` may still pop
    let mut depth = 0usize;

    for component in path.components() {
        match component {
            Component::Prefix(_) | Component::RootDir => normalized.push(component.as_os_str()),
            Component::CurDir => {}
            Component::ParentDir => {
                if depth > 0 {
                    normalized.pop();
                    depth -= 1;
                } else if !normalized.has_root() {
                    normalized.push("..");
                }
            }
            Component::Normal(name) => {
                normalized.push(name);
                depth += 1;
            }
        }
    }

    normalized
}

/// Joins `relative` onto `base`, refusing any result outside of `base`.
///
/// `base` is normalized first. The root of an absolute `relative` is dropped, so
/// `/foo` resolves to `base/foo`. Every `..` must be matched by a segment
/// descended earlier in `relative`, otherwise [`XdgError::PathEscapesBase`] is
/// returned.
///
/// ```
/// use std::path::Path;
/// use xdg_basedir::path::resolve;
///
/// let base = Path::new("/home/alice/.config");
/// assert_eq!(
///     resolve(base, Path::new("app/../app/app.toml")).unwrap(),
///     Path::new("/home/alice/.config/app/app.toml")
/// );
/// assert!(resolve(base, Path::new("../../etc/passwd")).is_err());
/// ```
pub fn resolve(base: &Path, relative: &Path) -> Result<PathBuf> {
    let mut resolved = normalize(base);
    let mut depth = 0usize;

    for component in relative.components() {
        match component {
            Component::Prefix(_) | Component::RootDir | Component::CurDir => {}
            Component::ParentDir => {
                if depth == 0 {
                    return Err(XdgError::PathEscapesBase {
                        base: base.to_path_buf(),
                        relative: relative.to_path_buf(),
                    });
                }
                resolved.pop();
                depth -= 1;
            }
            Component::Normal(name) => {
                resolved.push(name);
                depth += 1;
            }
        }
    }

    Ok(resolved)
}

/// Validates a relative fragment meant to be appended to several bases.
///
/// Returns the fragment normalized to plain segments; an empty fragment stays
/// empty. Fragments that climb above their starting point are rejected.
pub(crate) fn subpath(fragment: &Path) -> Result<PathBuf> {
    resolve(Path::new(""), fragment).map_err(|_| XdgError::InvalidPrefix(fragment.to_path_buf()))
}

/// Appends an already validated fragment without adding a trailing separator
/// when the fragment is empty.
pub(crate) fn append(base: &Path, fragment: &Path) -> PathBuf {
    let mut joined = base.to_path_buf();
    joined.extend(fragment.components());
    joined
}
