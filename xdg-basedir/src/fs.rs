//! Filesystem collaborator
//!
//! The narrow surface resolution and lookups need from the host:
//! - home directory and current account name
//! - existence and type of a path
//! - owner account name and permission bits of a path
//! - recursive directory creation with an explicit mode
//!
//! [`StdFileSystem`] backs it with system calls, [`MemoryFileSystem`] with an
//! in-memory tree.

use std::collections::BTreeMap;
use std::fs::DirBuilder;
use std::io;
use std::os::unix::fs::{DirBuilderExt, MetadataExt, PermissionsExt};
use std::path::{Path, PathBuf};
use std::sync::{Mutex, MutexGuard, PoisonError};

use nix::unistd::{Uid, User};

/// Type of an existing filesystem entry
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EntryKind {
    /// A directory (symlinks to directories included)
    Directory,
    /// Anything that is not a directory
    File,
}

/// Owner account and permission bits of an entry
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Ownership {
    /// Account name of the owner
    pub owner: String,
    /// Permission bits, masked with `0o7777`
    pub mode: u32,
}

/// Filesystem capability used by resolution and the lookup helpers.
///
/// Implementations must be safe to call from any thread.
pub trait FileSystem: Send + Sync {
    /// Home directory of the current user
    fn home_dir(&self) -> Option<PathBuf>;

    /// Account name of the current user
    fn current_user(&self) -> Option<String>;

    /// Type of the entry at `path`, following symlinks; `None` if nothing exists there
    fn entry_kind(&self, path: &Path) -> Option<EntryKind>;

    /// Owner and permission bits of the entry at `path`
    fn ownership(&self, path: &Path) -> io::Result<Ownership>;

    /// Create `path` and any missing ancestors; new directories get `mode`
    fn create_dir_all(&self, path: &Path, mode: u32) -> io::Result<()>;

    /// Whether something that is not a directory exists at `path`
    fn is_file(&self, path: &Path) -> bool {
        self.entry_kind(path) == Some(EntryKind::File)
    }
}

/// System-call backed [`FileSystem`]
#[derive(Debug, Clone, Copy, Default)]
pub struct StdFileSystem;

impl FileSystem for StdFileSystem {
    fn home_dir(&self) -> Option<PathBuf> {
        dirs::home_dir()
    }

    fn current_user(&self) -> Option<String> {
        User::from_uid(Uid::current())
            .ok()
            .flatten()
            .map(|user| user.name)
    }

    fn entry_kind(&self, path: &Path) -> Option<EntryKind> {
        let metadata = std::fs::metadata(path).ok()?;
        Some(if metadata.is_dir() {
            EntryKind::Directory
        } else {
            EntryKind::File
        })
    }

    fn ownership(&self, path: &Path) -> io::Result<Ownership> {
        let metadata = std::fs::metadata(path)?;
        let uid = metadata.uid();
        let user = User::from_uid(Uid::from_raw(uid))?.ok_or_else(|| {
            io::Error::new(io::ErrorKind::NotFound, format!("no account for uid {uid}"))
        })?;

        Ok(Ownership {
            owner: user.name,
            mode: metadata.permissions().mode() & 0o7777,
        })
    }

    fn create_dir_all(&self, path: &Path, mode: u32) -> io::Result<()> {
        DirBuilder::new().recursive(true).mode(mode).create(path)
    }
}

#[derive(Debug, Clone)]
struct MemoryEntry {
    kind: EntryKind,
    // None when the attributes should be unreadable
    ownership: Option<Ownership>,
}

/// In-memory [`FileSystem`] for tests.
///
/// Every path passed to [`FileSystem::entry_kind`] is recorded, so callers can
/// assert the order in which candidates were probed.
#[derive(Debug, Default)]
pub struct MemoryFileSystem {
    home: Option<PathBuf>,
    user: Option<String>,
    entries: Mutex<BTreeMap<PathBuf, MemoryEntry>>,
    probes: Mutex<Vec<PathBuf>>,
}

impl MemoryFileSystem {
    /// Empty tree for `user`, whose home directory is `home`
    pub fn new(home: impl Into<PathBuf>, user: impl Into<String>) -> Self {
        Self {
            home: Some(home.into()),
            user: Some(user.into()),
            ..Default::default()
        }
    }

    /// Empty tree on a platform that cannot report a home directory
    pub fn without_home(user: impl Into<String>) -> Self {
        Self {
            user: Some(user.into()),
            ..Default::default()
        }
    }

    /// Add a file owned by the current user
    pub fn with_file(self, path: impl Into<PathBuf>) -> Self {
        let ownership = self.own(0o600);
        self.insert(path.into(), EntryKind::File, ownership);
        self
    }

    /// Add a directory with an explicit owner and mode
    pub fn with_dir(self, path: impl Into<PathBuf>, owner: &str, mode: u32) -> Self {
        let ownership = Some(Ownership {
            owner: owner.to_string(),
            mode,
        });
        self.insert(path.into(), EntryKind::Directory, ownership);
        self
    }

    /// Add a directory whose owner and mode cannot be read
    pub fn with_unreadable_dir(self, path: impl Into<PathBuf>) -> Self {
        self.insert(path.into(), EntryKind::Directory, None);
        self
    }

    /// Permission bits of the entry at `path`, if it exists and is readable
    pub fn mode(&self, path: &Path) -> Option<u32> {
        self.entries()
            .get(path)
            .and_then(|entry| entry.ownership.as_ref())
            .map(|ownership| ownership.mode)
    }

    /// Paths probed through [`FileSystem::entry_kind`], oldest first
    pub fn probes(&self) -> Vec<PathBuf> {
        lock(&self.probes).clone()
    }

    /// Forget recorded probes
    pub fn clear_probes(&self) {
        lock(&self.probes).clear();
    }

    fn own(&self, mode: u32) -> Option<Ownership> {
        self.user.clone().map(|owner| Ownership { owner, mode })
    }

    fn insert(&self, path: PathBuf, kind: EntryKind, ownership: Option<Ownership>) {
        let parent_ownership = self.own(0o755);
        let mut entries = self.entries();
        for ancestor in path.ancestors().skip(1) {
            if ancestor.as_os_str().is_empty() {
                continue;
            }
            entries
                .entry(ancestor.to_path_buf())
                .or_insert_with(|| MemoryEntry {
                    kind: EntryKind::Directory,
                    ownership: parent_ownership.clone(),
                });
        }
        entries.insert(path, MemoryEntry { kind, ownership });
    }

    fn entries(&self) -> MutexGuard<'_, BTreeMap<PathBuf, MemoryEntry>> {
        lock(&self.entries)
    }
}

impl FileSystem for MemoryFileSystem {
    fn home_dir(&self) -> Option<PathBuf> {
        self.home.clone()
    }

    fn current_user(&self) -> Option<String> {
        self.user.clone()
    }

    fn entry_kind(&self, path: &Path) -> Option<EntryKind> {
        lock(&self.probes).push(path.to_path_buf());
        self.entries().get(path).map(|entry| entry.kind)
    }

    fn ownership(&self, path: &Path) -> io::Result<Ownership> {
        let entries = self.entries();
        let entry = entries.get(path).ok_or_else(|| {
            io::Error::new(io::ErrorKind::NotFound, format!("{} not found", path.display()))
        })?;
        entry.ownership.clone().ok_or_else(|| {
            io::Error::new(
                io::ErrorKind::PermissionDenied,
                format!("cannot read attributes of {}", path.display()),
            )
        })
    }

    fn create_dir_all(&self, path: &Path, mode: u32) -> io::Result<()> {
        let ownership = self.own(mode);
        let mut entries = self.entries();

        // Check the whole chain first so a failure leaves the tree untouched
        let chain: Vec<&Path> = path
            .ancestors()
            .filter(|ancestor| !ancestor.as_os_str().is_empty())
            .collect();
        for ancestor in &chain {
            if let Some(entry) = entries.get(*ancestor) {
                if entry.kind != EntryKind::Directory {
                    return Err(io::Error::new(
                        io::ErrorKind::AlreadyExists,
                        format!("{} exists and is not a directory", ancestor.display()),
                    ));
                }
            }
        }

        for ancestor in chain {
            entries
                .entry(ancestor.to_path_buf())
                .or_insert_with(|| MemoryEntry {
                    kind: EntryKind::Directory,
                    ownership: ownership.clone(),
                });
        }
        Ok(())
    }
}

fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(PoisonError::into_inner)
}
