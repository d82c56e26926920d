//! Error types for base directory resolution

use std::path::PathBuf;
use thiserror::Error;

/// Core error type for base directory operations
#[derive(Error, Debug)]
pub enum XdgError {
    /// The home directory of the current user is unknown or not absolute
    #[error("Cannot determine the home directory of the current user")]
    CannotGetHomeOfUser,

    /// A relative path would leave the directory it is resolved against
    #[error(
        "Path '{}' escapes base directory '{}'",
        .relative.display(),
        .base.display()
    )]
    PathEscapesBase { base: PathBuf, relative: PathBuf },

    /// A shared prefix or profile fragment would leave the directories it is applied to
    #[error("Invalid prefix '{}': it must stay inside the base directories", .0.display())]
    InvalidPrefix(PathBuf),

    /// The runtime directory could not be used
    #[error(transparent)]
    RuntimeDir(#[from] RuntimeDirError),

    /// A lookup expecting a file only found a directory
    #[error("Expected a file but found a directory: {}", .0.display())]
    IsADirectory(PathBuf),

    /// Directory creation failed
    #[error("Failed to create directory '{}': {source}", .path.display())]
    CreateDir {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

/// Why the runtime directory is unavailable.
///
/// The outcome is computed once, when [`BaseDirectories`](crate::BaseDirectories)
/// is resolved, and stored alongside the other bases.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum RuntimeDirError {
    /// Runtime directory handling was configured as skipped
    #[error("Runtime directory setup was skipped")]
    SetupSkipped,

    /// XDG_RUNTIME_DIR is unset and no default was configured
    #[error("XDG_RUNTIME_DIR is not set and no default runtime directory is configured")]
    EnvironmentUndefined,

    /// The candidate does not exist or is not a directory
    #[error("Runtime directory '{}' does not exist or is not a directory", .0.display())]
    NotADirectory(PathBuf),

    /// Owner or permission bits could not be read
    #[error("Failed to read the attributes of runtime directory '{}'", .0.display())]
    AttributesUnreadable(PathBuf),

    /// The directory belongs to another account
    #[error(
        "Runtime directory '{}' is owned by '{owner}', not by the current user",
        .path.display()
    )]
    NotOwnedByCurrentUser { path: PathBuf, owner: String },

    /// Permission bits are anything other than 0700
    #[error(
        "Runtime directory '{}' has insecure permissions {mode:04o} (expected 0700)",
        .path.display()
    )]
    InsecurePermissions { path: PathBuf, mode: u32 },
}

/// Result type alias for base directory operations
pub type Result<T> = std::result::Result<T, XdgError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_io_error_is_kept_as_source() {
        let err = XdgError::CreateDir {
            path: PathBuf::from("/data/app"),
            source: std::io::Error::new(std::io::ErrorKind::PermissionDenied, "denied"),
        };

        let source = std::error::Error::source(&err).expect("source should be set");
        assert_eq!(source.to_string(), "denied");
        assert_eq!(
            err.to_string(),
            "Failed to create directory '/data/app': denied"
        );
    }

    #[test]
    fn test_runtime_dir_error_conversion() {
        let err: XdgError = RuntimeDirError::SetupSkipped.into();

        match err {
            XdgError::RuntimeDir(RuntimeDirError::SetupSkipped) => {}
            other => panic!("Expected RuntimeDir error, got {other:?}"),
        }
    }

    #[test]
    fn test_error_display() {
        let err = XdgError::PathEscapesBase {
            base: PathBuf::from("/home/alice/.config"),
            relative: PathBuf::from("../../etc/passwd"),
        };
        assert_eq!(
            err.to_string(),
            "Path '../../etc/passwd' escapes base directory '/home/alice/.config'"
        );

        let err = RuntimeDirError::InsecurePermissions {
            path: PathBuf::from("/run/user/1000"),
            mode: 0o755,
        };
        assert_eq!(
            err.to_string(),
            "Runtime directory '/run/user/1000' has insecure permissions 0755 (expected 0700)"
        );

        let err = RuntimeDirError::NotOwnedByCurrentUser {
            path: PathBuf::from("/run/user/0"),
            owner: "root".to_string(),
        };
        assert_eq!(
            err.to_string(),
            "Runtime directory '/run/user/0' is owned by 'root', not by the current user"
        );

        // Transparent wrapping keeps the inner message
        let err = XdgError::from(RuntimeDirError::EnvironmentUndefined);
        assert_eq!(
            err.to_string(),
            "XDG_RUNTIME_DIR is not set and no default runtime directory is configured"
        );
    }
}
