//! XDG Base Directory resolution
//!
//! Resolves where an application should keep its configuration, data, cache,
//! state and runtime files, following the freedesktop XDG Base Directory
//! specification:
//! - environment overrides with the specified defaults under the home directory
//! - a shared prefix (application name) and a per-user profile fragment
//! - validation of `$XDG_RUNTIME_DIR` (owned by the current user, mode 0700)
//! - lexical joining that refuses relative paths escaping their base
//! - helpers to create directories and search for existing files
//!
//! The environment and the filesystem are injected through the [`Environment`]
//! and [`FileSystem`] traits; [`BaseDirectories::new`] uses the real ones.

pub mod base_dirs;
pub mod config;
pub mod env;
pub mod error;
pub mod fs;
pub mod lookup;
pub mod path;
pub mod runtime;

// Re-export commonly used types
pub use base_dirs::{BaseDirectories, BaseDirectoriesBuilder, Category};
pub use config::XdgConfig;
pub use env::{Environment, MapEnvironment, StdEnvironment};
pub use error::{Result, RuntimeDirError, XdgError};
pub use fs::{EntryKind, FileSystem, MemoryFileSystem, Ownership, StdFileSystem};
pub use lookup::FindFiles;
pub use runtime::RuntimeDirHandling;
