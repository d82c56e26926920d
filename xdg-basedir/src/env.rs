//! Environment variable access
//!
//! Resolution never reads the process environment directly: it goes through
//! the [`Environment`] trait so tests can supply fixtures.

use std::collections::HashMap;
use std::ffi::OsString;
use std::path::PathBuf;

use tracing::debug;

/// Read-only view of environment variables
pub trait Environment {
    /// Returns the raw value of `name`, or `None` when unset.
    fn var_os(&self, name: &str) -> Option<OsString>;
}

/// The environment of the current process
#[derive(Debug, Clone, Copy, Default)]
pub struct StdEnvironment;

impl Environment for StdEnvironment {
    fn var_os(&self, name: &str) -> Option<OsString> {
        std::env::var_os(name)
    }
}

/// Fixed set of variables, for tests and sandboxed lookups
#[derive(Debug, Clone, Default)]
pub struct MapEnvironment {
    vars: HashMap<String, OsString>,
}

impl MapEnvironment {
    /// Create an environment with no variables set
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder-style variant of [`MapEnvironment::set`]
    pub fn with(mut self, name: impl Into<String>, value: impl Into<OsString>) -> Self {
        self.set(name, value);
        self
    }

    /// Set `name` to `value`, replacing any previous value
    pub fn set(&mut self, name: impl Into<String>, value: impl Into<OsString>) {
        self.vars.insert(name.into(), value.into());
    }

    /// Unset `name`
    pub fn remove(&mut self, name: &str) {
        self.vars.remove(name);
    }
}

impl Environment for MapEnvironment {
    fn var_os(&self, name: &str) -> Option<OsString> {
        self.vars.get(name).cloned()
    }
}

/// Reads `name` as a single absolute path.
///
/// Unset, empty and relative values all yield `None`, which callers treat as
/// "use the default".
pub fn read_path<E: Environment + ?Sized>(env: &E, name: &str) -> Option<PathBuf> {
    let value = env.var_os(name).filter(|v| !v.is_empty())?;
    let path = PathBuf::from(value);
    if !path.is_absolute() {
        debug!("Ignoring {}: '{}' is not absolute", name, path.display());
        return None;
    }
    Some(path)
}

/// Reads `name` as a `:`-separated list of absolute paths.
///
/// `None` means "use the default list" and is returned when the variable is
/// unset or empty. Once the variable holds anything else the result is
/// `Some`, keeping only the absolute entries in order; it may be empty (e.g.
/// a value of `":"`), meaning "no directories".
pub fn read_path_list<E: Environment + ?Sized>(env: &E, name: &str) -> Option<Vec<PathBuf>> {
    let value = env.var_os(name).filter(|v| !v.is_empty())?;
    let paths = std::env::split_paths(&value)
        .filter(|entry| {
            let keep = entry.is_absolute();
            if !keep && !entry.as_os_str().is_empty() {
                debug!("Ignoring entry '{}' of {}: not absolute", entry.display(), name);
            }
            keep
        })
        .collect();
    Some(paths)
}
