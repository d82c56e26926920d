//! Runtime directory selection and validation
//!
//! `$XDG_RUNTIME_DIR` must be a directory owned by the current user with mode
//! 0700. The remaining requirements of the freedesktop specification (lifetime
//! bound to the login session, local filesystem, ACLs) are not checked.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::env::{read_path, Environment};
use crate::error::RuntimeDirError;
use crate::fs::{EntryKind, FileSystem};
use crate::path::normalize;

/// Environment variable holding the runtime directory
pub const RUNTIME_DIR_ENV: &str = "XDG_RUNTIME_DIR";

/// The only mode accepted on the runtime directory
pub const RUNTIME_DIR_MODE: u32 = 0o700;

/// Hook run when the configured default runtime directory is used
pub type DefaultRuntimeDirHook = Box<dyn FnOnce(&Path) + Send>;

/// How the runtime directory is set up during resolution
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "mode", rename_all = "snake_case")]
pub enum RuntimeDirHandling {
    /// Do not look at the runtime directory at all
    Skip,
    /// Read `$XDG_RUNTIME_DIR`, falling back to `default_if_undefined`, and validate it
    Setup {
        #[serde(default, skip_serializing_if = "Option::is_none")]
        default_if_undefined: Option<PathBuf>,
    },
}

impl Default for RuntimeDirHandling {
    fn default() -> Self {
        Self::Setup {
            default_if_undefined: None,
        }
    }
}

impl RuntimeDirHandling {
    /// Setup falling back to `path` when `$XDG_RUNTIME_DIR` is unset
    pub fn with_default(path: impl Into<PathBuf>) -> Self {
        Self::Setup {
            default_if_undefined: Some(path.into()),
        }
    }
}

/// Picks the runtime directory candidate and validates it.
///
/// When the default is used, `on_default_used` is run once with it before any
/// filesystem access; without a hook a warning is logged instead. A relative
/// default is ignored, leaving the variable undefined.
pub fn resolve_runtime_dir<E, F>(
    handling: &RuntimeDirHandling,
    env: &E,
    fs: &F,
    on_default_used: Option<DefaultRuntimeDirHook>,
) -> Result<PathBuf, RuntimeDirError>
where
    E: Environment + ?Sized,
    F: FileSystem + ?Sized,
{
    let RuntimeDirHandling::Setup {
        default_if_undefined,
    } = handling
    else {
        return Err(RuntimeDirError::SetupSkipped);
    };

    let candidate = match read_path(env, RUNTIME_DIR_ENV) {
        Some(path) => path,
        None => {
            let default = default_if_undefined
                .as_ref()
                .ok_or(RuntimeDirError::EnvironmentUndefined)?;
            if !default.is_absolute() {
                debug!(
                    "Ignoring default runtime directory '{}': not absolute",
                    default.display()
                );
                return Err(RuntimeDirError::EnvironmentUndefined);
            }
            match on_default_used {
                Some(hook) => hook(default.as_path()),
                None => warn!(
                    "{} is not set, using default runtime directory {}",
                    RUNTIME_DIR_ENV,
                    default.display()
                ),
            }
            default.clone()
        }
    };

    validate(&candidate, fs)
}

/// Checks that `candidate` is usable as a runtime directory.
///
/// The checks run in order and stop at the first failure: the path must be an
/// existing directory, its attributes must be readable, it must be owned by the
/// current user and its mode must be exactly 0700. Returns the normalized path.
pub fn validate<F: FileSystem + ?Sized>(
    candidate: &Path,
    fs: &F,
) -> Result<PathBuf, RuntimeDirError> {
    let path = normalize(candidate);

    if fs.entry_kind(&path) != Some(EntryKind::Directory) {
        return Err(RuntimeDirError::NotADirectory(path));
    }

    let (ownership, current_user) = match (fs.ownership(&path), fs.current_user()) {
        (Ok(ownership), Some(user)) => (ownership, user),
        _ => return Err(RuntimeDirError::AttributesUnreadable(path)),
    };

    if ownership.owner != current_user {
        return Err(RuntimeDirError::NotOwnedByCurrentUser {
            path,
            owner: ownership.owner,
        });
    }

    if ownership.mode != RUNTIME_DIR_MODE {
        return Err(RuntimeDirError::InsecurePermissions {
            path,
            mode: ownership.mode,
        });
    }

    Ok(path)
}
