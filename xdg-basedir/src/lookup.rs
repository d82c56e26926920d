//! Path composition and file lookup on top of resolved base directories
//!
//! Relative paths given to these helpers go through [`path::resolve`], so a
//! value such as `../../etc/passwd` is rejected instead of leaving its base.

use std::iter::FusedIterator;
use std::path::{Path, PathBuf};

use tracing::debug;

use crate::base_dirs::{BaseDirectories, Category};
use crate::error::{Result, XdgError};
use crate::fs::{EntryKind, FileSystem};
use crate::path;

/// Mode given to directories created by the `ensure_*` helpers
pub const CREATED_DIR_MODE: u32 = 0o700;

impl<F: FileSystem> BaseDirectories<F> {
    /// Path of `relative` under the user base of `category`.
    ///
    /// For [`Category::Runtime`] this fails if the runtime directory could not
    /// be validated during resolution.
    pub fn file_path(&self, category: Category, relative: impl AsRef<Path>) -> Result<PathBuf> {
        path::resolve(self.home_base(category)?, relative.as_ref())
    }

    /// Like [`file_path`](Self::file_path), then creates the directory and its
    /// missing ancestors with mode 0700. Succeeds if it already existed.
    pub fn ensure_directory(
        &self,
        category: Category,
        relative: impl AsRef<Path>,
    ) -> Result<PathBuf> {
        let dir = self.file_path(category, relative)?;
        self.create_dir(&dir)?;
        Ok(dir)
    }

    /// Like [`file_path`](Self::file_path), then creates the parent directory
    /// of the returned path so the file can be written.
    pub fn ensure_parent_directory(
        &self,
        category: Category,
        relative: impl AsRef<Path>,
    ) -> Result<PathBuf> {
        let file = self.file_path(category, relative)?;
        if let Some(parent) = file.parent() {
            self.create_dir(parent)?;
        }
        Ok(file)
    }

    /// First existing file named `relative` in the search directories of
    /// `category`, user base first.
    ///
    /// Directories are skipped. If nothing but directories matched,
    /// [`XdgError::IsADirectory`] is returned for the first of them, since the
    /// caller most likely passed a directory path where a file was meant.
    pub fn find_file(
        &self,
        category: Category,
        relative: impl AsRef<Path>,
    ) -> Result<Option<PathBuf>> {
        let mut first_dir = None;

        for candidate in self.candidates(category, relative.as_ref())? {
            match self.fs.entry_kind(&candidate) {
                Some(EntryKind::File) => return Ok(Some(candidate)),
                Some(EntryKind::Directory) if first_dir.is_none() => first_dir = Some(candidate),
                _ => {}
            }
        }

        match first_dir {
            Some(dir) => Err(XdgError::IsADirectory(dir)),
            None => Ok(None),
        }
    }

    /// Every existing file named `relative` in the search directories of
    /// `category`, user base first.
    ///
    /// Candidates are composed up front, so traversal errors are reported
    /// here; existence is checked lazily while iterating.
    pub fn find_all_files(
        &self,
        category: Category,
        relative: impl AsRef<Path>,
    ) -> Result<FindFiles<'_, F>> {
        Ok(FindFiles {
            fs: &self.fs,
            candidates: self.candidates(category, relative.as_ref())?.into_iter(),
        })
    }

    fn candidates(&self, category: Category, relative: &Path) -> Result<Vec<PathBuf>> {
        self.search_dirs(category)?
            .into_iter()
            .map(|dir| path::resolve(dir, relative))
            .collect()
    }

    fn create_dir(&self, dir: &Path) -> Result<()> {
        self.fs
            .create_dir_all(dir, CREATED_DIR_MODE)
            .map_err(|source| XdgError::CreateDir {
                path: dir.to_path_buf(),
                source,
            })?;
        debug!("Ensured directory {}", dir.display());
        Ok(())
    }
}

/// Lazy iterator over existing files, see [`BaseDirectories::find_all_files`]
pub struct FindFiles<'a, F> {
    fs: &'a F,
    candidates: std::vec::IntoIter<PathBuf>,
}

impl<F: FileSystem> Iterator for FindFiles<'_, F> {
    type Item = PathBuf;

    fn next(&mut self) -> Option<PathBuf> {
        let fs = self.fs;
        self.candidates.find(|candidate| fs.is_file(candidate))
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        (0, Some(self.candidates.len()))
    }
}

impl<F: FileSystem> FusedIterator for FindFiles<'_, F> {}

impl<F> Clone for FindFiles<'_, F> {
    fn clone(&self) -> Self {
        Self {
            fs: self.fs,
            candidates: self.candidates.clone(),
        }
    }
}

impl<F> std::fmt::Debug for FindFiles<'_, F> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FindFiles")
            .field("candidates", &self.candidates.as_slice())
            .finish()
    }
}
