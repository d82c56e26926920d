//! Base directory resolution
//!
//! Combines the environment, the home directory and the configured prefixes
//! into a [`BaseDirectories`], following
//! <https://specifications.freedesktop.org/basedir-spec/latest/>.

use std::fmt;
use std::path::{Path, PathBuf};

use tracing::debug;

use crate::config::XdgConfig;
use crate::env::{read_path, read_path_list, Environment, StdEnvironment};
use crate::error::{Result, RuntimeDirError, XdgError};
use crate::fs::{FileSystem, StdFileSystem};
use crate::path::{append, normalize, subpath};
use crate::runtime::{resolve_runtime_dir, DefaultRuntimeDirHook, RuntimeDirHandling};

/// Default system data directories, in search order
pub const DEFAULT_DATA_DIRS: [&str; 2] = ["/usr/local/share", "/usr/share"];

/// Default system configuration directories, in search order
pub const DEFAULT_CONFIG_DIRS: [&str; 1] = ["/etc/xdg"];

/// Kind of file, selecting the base directories it lives under
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Category {
    Config,
    Data,
    Cache,
    State,
    Runtime,
}

impl Category {
    /// Every category
    pub const ALL: [Category; 5] = [
        Category::Config,
        Category::Data,
        Category::Cache,
        Category::State,
        Category::Runtime,
    ];

    /// Variable overriding the user base of this category
    pub fn home_env_var(self) -> &'static str {
        match self {
            Category::Config => "XDG_CONFIG_HOME",
            Category::Data => "XDG_DATA_HOME",
            Category::Cache => "XDG_CACHE_HOME",
            Category::State => "XDG_STATE_HOME",
            Category::Runtime => crate::runtime::RUNTIME_DIR_ENV,
        }
    }

    /// Variable listing the system directories, for categories that have them
    pub fn dirs_env_var(self) -> Option<&'static str> {
        match self {
            Category::Config => Some("XDG_CONFIG_DIRS"),
            Category::Data => Some("XDG_DATA_DIRS"),
            _ => None,
        }
    }
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Category::Config => "config",
            Category::Data => "data",
            Category::Cache => "cache",
            Category::State => "state",
            Category::Runtime => "runtime",
        };
        f.write_str(name)
    }
}

/// Resolved base directories of an application.
///
/// Every path is absolute, lexically normalized and already prefixed: user
/// directories carry the shared prefix then the profile, system directories
/// only the shared prefix. The value is immutable once resolved; resolve again
/// to observe environment or filesystem changes.
///
/// ```no_run
/// use xdg_basedir::{BaseDirectories, Category};
///
/// let dirs = BaseDirectories::builder().prefix("myapp").profile("work").resolve()?;
/// // ~/.config/myapp/work/app.toml, else /etc/xdg/myapp/app.toml
/// let config = dirs.find_file(Category::Config, "app.toml")?;
/// # Ok::<(), xdg_basedir::XdgError>(())
/// ```
#[derive(Debug)]
pub struct BaseDirectories<F = StdFileSystem> {
    pub(crate) fs: F,

    home: PathBuf,
    prefix: PathBuf,
    user_prefix: PathBuf,

    config_home: PathBuf,
    data_home: PathBuf,
    cache_home: PathBuf,
    state_home: PathBuf,

    config_dirs: Vec<PathBuf>,
    data_dirs: Vec<PathBuf>,

    runtime_dir: std::result::Result<PathBuf, RuntimeDirError>,
    bin_dir: PathBuf,
}

impl BaseDirectories<StdFileSystem> {
    /// Resolve with default options from the process environment
    pub fn new() -> Result<Self> {
        Self::builder().resolve()
    }

    /// Resolve from the process environment with `prefix` as shared prefix
    pub fn with_prefix(prefix: impl Into<PathBuf>) -> Result<Self> {
        Self::builder().prefix(prefix).resolve()
    }

    /// Create a new builder for resolution options
    pub fn builder() -> BaseDirectoriesBuilder {
        BaseDirectoriesBuilder::new()
    }
}

impl<F: FileSystem> BaseDirectories<F> {
    /// Home directory of the current user
    pub fn home_dir(&self) -> &Path {
        &self.home
    }

    /// Shared prefix, normalized
    pub fn prefix(&self) -> &Path {
        &self.prefix
    }

    /// Shared prefix followed by the profile, normalized
    pub fn user_prefix(&self) -> &Path {
        &self.user_prefix
    }

    /// `$XDG_CONFIG_HOME` (or `~/.config`), prefixed
    pub fn config_home(&self) -> &Path {
        &self.config_home
    }

    /// `$XDG_DATA_HOME` (or `~/.local/share`), prefixed
    pub fn data_home(&self) -> &Path {
        &self.data_home
    }

    /// `$XDG_CACHE_HOME` (or `~/.cache`), prefixed
    pub fn cache_home(&self) -> &Path {
        &self.cache_home
    }

    /// `$XDG_STATE_HOME` (or `~/.local/state`), prefixed
    pub fn state_home(&self) -> &Path {
        &self.state_home
    }

    /// `$XDG_CONFIG_DIRS` (or `/etc/xdg`), each with the shared prefix
    pub fn config_dirs(&self) -> &[PathBuf] {
        &self.config_dirs
    }

    /// `$XDG_DATA_DIRS` (or `/usr/local/share:/usr/share`), each with the shared prefix
    pub fn data_dirs(&self) -> &[PathBuf] {
        &self.data_dirs
    }

    /// Validated runtime directory, prefixed, or why it is unusable
    pub fn runtime_dir(&self) -> std::result::Result<&Path, &RuntimeDirError> {
        self.runtime_dir.as_deref()
    }

    /// `~/.local/bin`, never prefixed. Meant for installers.
    pub fn bin_dir(&self) -> &Path {
        &self.bin_dir
    }

    /// Filesystem this instance performs lookups with
    pub fn file_system(&self) -> &F {
        &self.fs
    }

    /// User base directory of `category`.
    ///
    /// Fails with [`XdgError::RuntimeDir`] for [`Category::Runtime`] when the
    /// runtime directory could not be validated.
    pub fn home_base(&self, category: Category) -> Result<&Path> {
        let base = match category {
            Category::Config => self.config_home.as_path(),
            Category::Data => self.data_home.as_path(),
            Category::Cache => self.cache_home.as_path(),
            Category::State => self.state_home.as_path(),
            Category::Runtime => self.runtime_dir.as_deref().map_err(Clone::clone)?,
        };
        Ok(base)
    }

    /// System directories of `category`; empty for single-base categories
    pub fn system_dirs(&self, category: Category) -> &[PathBuf] {
        match category {
            Category::Config => self.config_dirs.as_slice(),
            Category::Data => self.data_dirs.as_slice(),
            _ => &[],
        }
    }

    /// Directories searched for `category`, most important first
    pub fn search_dirs(&self, category: Category) -> Result<Vec<&Path>> {
        let mut dirs = vec![self.home_base(category)?];
        dirs.extend(self.system_dirs(category).iter().map(PathBuf::as_path));
        Ok(dirs)
    }

    fn resolve<E: Environment + ?Sized>(
        config: &XdgConfig,
        on_default_runtime_dir: Option<DefaultRuntimeDirHook>,
        env: &E,
        fs: F,
    ) -> Result<Self> {
        let home = fs
            .home_dir()
            .filter(|home| home.is_absolute())
            .map(|home| normalize(&home))
            .ok_or(XdgError::CannotGetHomeOfUser)?;

        let prefix = subpath(&config.prefix)?;
        let user_prefix = append(&prefix, &subpath(&config.profile)?);

        let user_base = |category: Category, home_suffix: &str| -> PathBuf {
            let base = read_path(env, category.home_env_var())
                .unwrap_or_else(|| append(&home, Path::new(home_suffix)));
            append(&normalize(&base), &user_prefix)
        };
        let system_bases = |category: Category, defaults: &[&str]| -> Vec<PathBuf> {
            let dirs = category
                .dirs_env_var()
                .and_then(|var| read_path_list(env, var))
                .unwrap_or_else(|| defaults.iter().map(PathBuf::from).collect());
            dirs.iter()
                .map(|dir| append(&normalize(dir), &prefix))
                .collect()
        };

        let config_home = user_base(Category::Config, ".config");
        let data_home = user_base(Category::Data, ".local/share");
        let cache_home = user_base(Category::Cache, ".cache");
        let state_home = user_base(Category::State, ".local/state");

        let config_dirs = system_bases(Category::Config, &DEFAULT_CONFIG_DIRS[..]);
        let data_dirs = system_bases(Category::Data, &DEFAULT_DATA_DIRS[..]);

        let bin_dir = append(&home, Path::new(".local/bin"));

        let runtime_dir =
            resolve_runtime_dir(&config.runtime_dir, env, &fs, on_default_runtime_dir)
                .map(|dir| append(&dir, &user_prefix));
        if let Err(err) = &runtime_dir {
            debug!("Runtime directory unavailable: {}", err);
        }

        debug!(
            "Resolved base directories: config={}, data={}, cache={}, state={}",
            config_home.display(),
            data_home.display(),
            cache_home.display(),
            state_home.display()
        );

        Ok(Self {
            fs,
            home,
            prefix,
            user_prefix,
            config_home,
            data_home,
            cache_home,
            state_home,
            config_dirs,
            data_dirs,
            runtime_dir,
            bin_dir,
        })
    }
}

/// Builder for [`BaseDirectories`]
///
/// ```
/// use xdg_basedir::{BaseDirectories, MapEnvironment, MemoryFileSystem, RuntimeDirHandling};
///
/// let dirs = BaseDirectories::builder()
///     .prefix("myapp")
///     .profile("work")
///     .runtime_dir(RuntimeDirHandling::Skip)
///     .resolve_with(&MapEnvironment::new(), MemoryFileSystem::new("/home/alice", "alice"))
///     .unwrap();
///
/// assert_eq!(dirs.config_home(), std::path::Path::new("/home/alice/.config/myapp/work"));
/// assert_eq!(dirs.config_dirs(), [std::path::PathBuf::from("/etc/xdg/myapp")]);
/// ```
#[derive(Default)]
pub struct BaseDirectoriesBuilder {
    config: XdgConfig,
    on_default_runtime_dir: Option<DefaultRuntimeDirHook>,
}

impl BaseDirectoriesBuilder {
    /// Create a new builder with default options
    pub fn new() -> Self {
        Self::default()
    }

    /// Start from options loaded elsewhere, e.g. with [`XdgConfig::from_toml`]
    pub fn from_config(config: XdgConfig) -> Self {
        Self {
            config,
            on_default_runtime_dir: None,
        }
    }

    /// Set the shared prefix
    pub fn prefix(mut self, prefix: impl Into<PathBuf>) -> Self {
        self.config.prefix = prefix.into();
        self
    }

    /// Set the profile fragment, applied under the shared prefix to user directories
    pub fn profile(mut self, profile: impl Into<PathBuf>) -> Self {
        self.config.profile = profile.into();
        self
    }

    /// Set runtime directory handling
    pub fn runtime_dir(mut self, handling: RuntimeDirHandling) -> Self {
        self.config.runtime_dir = handling;
        self
    }

    /// Run `hook` instead of logging a warning when the default runtime directory is used
    pub fn on_default_runtime_dir(mut self, hook: impl FnOnce(&Path) + Send + 'static) -> Self {
        self.on_default_runtime_dir = Some(Box::new(hook));
        self
    }

    /// Resolve from the process environment and the real filesystem
    pub fn resolve(self) -> Result<BaseDirectories<StdFileSystem>> {
        self.resolve_with(&StdEnvironment, StdFileSystem)
    }

    /// Resolve from the given environment and filesystem
    pub fn resolve_with<E, F>(self, env: &E, fs: F) -> Result<BaseDirectories<F>>
    where
        E: Environment + ?Sized,
        F: FileSystem,
    {
        BaseDirectories::resolve(&self.config, self.on_default_runtime_dir, env, fs)
    }
}

impl fmt::Debug for BaseDirectoriesBuilder {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("BaseDirectoriesBuilder")
            .field("config", &self.config)
            .field(
                "on_default_runtime_dir",
                &self.on_default_runtime_dir.as_ref().map(|_| "<hook>"),
            )
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::env::MapEnvironment;
    use crate::fs::MemoryFileSystem;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Arc;

    fn alice_fs() -> MemoryFileSystem {
        MemoryFileSystem::new("/home/alice", "alice")
    }

    fn resolve(
        builder: BaseDirectoriesBuilder,
        env: &MapEnvironment,
    ) -> BaseDirectories<MemoryFileSystem> {
        builder.resolve_with(env, alice_fs()).unwrap()
    }

    #[test]
    fn test_defaults_without_environment() {
        let dirs = resolve(BaseDirectories::builder(), &MapEnvironment::new());

        assert_eq!(dirs.home_dir(), Path::new("/home/alice"));
        assert_eq!(dirs.config_home(), Path::new("/home/alice/.config"));
        assert_eq!(dirs.data_home(), Path::new("/home/alice/.local/share"));
        assert_eq!(dirs.cache_home(), Path::new("/home/alice/.cache"));
        assert_eq!(dirs.state_home(), Path::new("/home/alice/.local/state"));
        assert_eq!(dirs.bin_dir(), Path::new("/home/alice/.local/bin"));
        assert_eq!(
            dirs.data_dirs(),
            [PathBuf::from("/usr/local/share"), PathBuf::from("/usr/share")]
        );
        assert_eq!(dirs.config_dirs(), [PathBuf::from("/etc/xdg")]);
        assert_eq!(
            dirs.runtime_dir(),
            Err(&RuntimeDirError::EnvironmentUndefined)
        );
    }

    #[test]
    fn test_environment_overrides() {
        let env = MapEnvironment::new()
            .with("XDG_CONFIG_HOME", "/cfg")
            .with("XDG_DATA_HOME", "/data/./alice")
            .with("XDG_CACHE_HOME", "relative/cache")
            .with("XDG_STATE_HOME", "")
            .with("XDG_CONFIG_DIRS", "/opt/etc:/etc/xdg")
            .with("XDG_DATA_DIRS", "/srv/share");

        let dirs = resolve(BaseDirectories::builder(), &env);

        assert_eq!(dirs.config_home(), Path::new("/cfg"));
        assert_eq!(dirs.data_home(), Path::new("/data/alice"));
        // Relative and empty values fall back to the defaults
        assert_eq!(dirs.cache_home(), Path::new("/home/alice/.cache"));
        assert_eq!(dirs.state_home(), Path::new("/home/alice/.local/state"));
        assert_eq!(
            dirs.config_dirs(),
            [PathBuf::from("/opt/etc"), PathBuf::from("/etc/xdg")]
        );
        assert_eq!(dirs.data_dirs(), [PathBuf::from("/srv/share")]);
    }

    #[test]
    fn test_config_home_ignores_config_dirs() {
        for config_dirs in [None, Some(""), Some(":"), Some("/a:/b")] {
            let mut env = MapEnvironment::new().with("XDG_CONFIG_HOME", "/x/../cfg");
            if let Some(value) = config_dirs {
                env.set("XDG_CONFIG_DIRS", value);
            }

            let dirs = resolve(BaseDirectories::builder().prefix("app").profile("p"), &env);
            assert_eq!(dirs.config_home(), Path::new("/cfg/app/p"));
        }
    }

    #[test]
    fn test_separator_only_dirs_are_empty() {
        let env = MapEnvironment::new()
            .with("XDG_DATA_DIRS", "::")
            .with("XDG_CONFIG_DIRS", "");

        let dirs = resolve(BaseDirectories::builder().prefix("app"), &env);

        assert!(dirs.data_dirs().is_empty());
        assert_eq!(dirs.config_dirs(), [PathBuf::from("/etc/xdg/app")]);
    }

    #[test]
    fn test_prefix_and_profile() {
        let dirs = resolve(
            BaseDirectories::builder().prefix("myapp").profile("work"),
            &MapEnvironment::new(),
        );

        assert_eq!(dirs.prefix(), Path::new("myapp"));
        assert_eq!(dirs.user_prefix(), Path::new("myapp/work"));
        assert_eq!(dirs.config_home(), Path::new("/home/alice/.config/myapp/work"));
        assert_eq!(dirs.cache_home(), Path::new("/home/alice/.cache/myapp/work"));
        assert_eq!(dirs.config_dirs(), [PathBuf::from("/etc/xdg/myapp")]);
        assert_eq!(
            dirs.data_dirs(),
            [
                PathBuf::from("/usr/local/share/myapp"),
                PathBuf::from("/usr/share/myapp")
            ]
        );
        // The binaries directory is never prefixed
        assert_eq!(dirs.bin_dir(), Path::new("/home/alice/.local/bin"));
    }

    #[test]
    fn test_prefix_is_normalized() {
        let dirs = resolve(
            BaseDirectories::builder().prefix("./myapp/sub/..").profile("/work/"),
            &MapEnvironment::new(),
        );

        assert_eq!(dirs.config_home(), Path::new("/home/alice/.config/myapp/work"));
        assert_eq!(dirs.config_dirs(), [PathBuf::from("/etc/xdg/myapp")]);
    }

    #[test]
    fn test_escaping_prefix_is_rejected() {
        let result = BaseDirectories::builder()
            .prefix("../outside")
            .resolve_with(&MapEnvironment::new(), alice_fs());
        assert!(matches!(result, Err(XdgError::InvalidPrefix(_))));

        let result = BaseDirectories::builder()
            .prefix("myapp")
            .profile("../../x")
            .resolve_with(&MapEnvironment::new(), alice_fs());
        assert!(matches!(result, Err(XdgError::InvalidPrefix(p)) if p == Path::new("../../x")));
    }

    #[test]
    fn test_missing_home_is_fatal() {
        let result = BaseDirectories::builder()
            .resolve_with(&MapEnvironment::new(), MemoryFileSystem::without_home("alice"));
        assert!(matches!(result, Err(XdgError::CannotGetHomeOfUser)));

        // Even when every home-rooted variable is set
        let env = MapEnvironment::new()
            .with("XDG_CONFIG_HOME", "/cfg")
            .with("XDG_DATA_HOME", "/data")
            .with("XDG_CACHE_HOME", "/cache")
            .with("XDG_STATE_HOME", "/state");
        let result = BaseDirectories::builder()
            .resolve_with(&env, MemoryFileSystem::without_home("alice"));
        assert!(matches!(result, Err(XdgError::CannotGetHomeOfUser)));
    }

    #[test]
    fn test_relative_home_is_rejected() {
        let result = BaseDirectories::builder()
            .resolve_with(&MapEnvironment::new(), MemoryFileSystem::new("home/alice", "alice"));
        assert!(matches!(result, Err(XdgError::CannotGetHomeOfUser)));
    }

    #[test]
    fn test_runtime_dir_is_validated_and_prefixed() {
        let env = MapEnvironment::new().with("XDG_RUNTIME_DIR", "/run/user/1000");
        let fs = alice_fs().with_dir("/run/user/1000", "alice", 0o700);

        let dirs = BaseDirectories::builder()
            .prefix("myapp")
            .profile("work")
            .resolve_with(&env, fs)
            .unwrap();

        assert_eq!(dirs.runtime_dir(), Ok(Path::new("/run/user/1000/myapp/work")));
        assert_eq!(
            dirs.home_base(Category::Runtime).unwrap(),
            Path::new("/run/user/1000/myapp/work")
        );
    }

    #[test]
    fn test_runtime_failure_is_not_fatal() {
        let env = MapEnvironment::new().with("XDG_RUNTIME_DIR", "/run/user/1000");
        let fs = alice_fs().with_dir("/run/user/1000", "alice", 0o755);

        let dirs = BaseDirectories::builder().resolve_with(&env, fs).unwrap();

        assert_eq!(dirs.config_home(), Path::new("/home/alice/.config"));
        assert_eq!(
            dirs.runtime_dir(),
            Err(&RuntimeDirError::InsecurePermissions {
                path: PathBuf::from("/run/user/1000"),
                mode: 0o755,
            })
        );
        assert!(matches!(
            dirs.home_base(Category::Runtime),
            Err(XdgError::RuntimeDir(RuntimeDirError::InsecurePermissions { .. }))
        ));
        assert!(matches!(
            dirs.search_dirs(Category::Runtime),
            Err(XdgError::RuntimeDir(_))
        ));
    }

    #[test]
    fn test_runtime_skip() {
        let dirs = resolve(
            BaseDirectories::builder().runtime_dir(RuntimeDirHandling::Skip),
            &MapEnvironment::new().with("XDG_RUNTIME_DIR", "/run/user/1000"),
        );

        assert_eq!(dirs.runtime_dir(), Err(&RuntimeDirError::SetupSkipped));
        assert!(dirs.file_system().probes().is_empty());
    }

    #[test]
    fn test_runtime_default_hook() {
        let calls = Arc::new(AtomicUsize::new(0));
        let hook_calls = Arc::clone(&calls);
        let fs = alice_fs().with_dir("/tmp/alice", "alice", 0o700);

        let dirs = BaseDirectories::builder()
            .runtime_dir(RuntimeDirHandling::with_default("/tmp/alice"))
            .on_default_runtime_dir(move |_| {
                hook_calls.fetch_add(1, Ordering::SeqCst);
            })
            .resolve_with(&MapEnvironment::new(), fs)
            .unwrap();

        assert_eq!(dirs.runtime_dir(), Ok(Path::new("/tmp/alice")));
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn test_from_config() {
        let config = XdgConfig::from_toml(
            r#"
                prefix = "myapp"
                profile = "work"

                [runtime_dir]
                mode = "skip"
            "#,
        )
        .unwrap();

        let dirs = resolve(BaseDirectoriesBuilder::from_config(config), &MapEnvironment::new());

        assert_eq!(dirs.state_home(), Path::new("/home/alice/.local/state/myapp/work"));
        assert_eq!(dirs.runtime_dir(), Err(&RuntimeDirError::SetupSkipped));
    }

    #[test]
    fn test_search_dirs_order() {
        let dirs = resolve(BaseDirectories::builder().prefix("app"), &MapEnvironment::new());

        assert_eq!(
            dirs.search_dirs(Category::Data).unwrap(),
            [
                Path::new("/home/alice/.local/share/app"),
                Path::new("/usr/local/share/app"),
                Path::new("/usr/share/app"),
            ]
        );
        assert_eq!(
            dirs.search_dirs(Category::Cache).unwrap(),
            [Path::new("/home/alice/.cache/app")]
        );
    }

    #[test]
    fn test_category_env_vars() {
        assert_eq!(Category::Config.home_env_var(), "XDG_CONFIG_HOME");
        assert_eq!(Category::Runtime.home_env_var(), "XDG_RUNTIME_DIR");
        assert_eq!(Category::Data.dirs_env_var(), Some("XDG_DATA_DIRS"));
        assert_eq!(Category::State.dirs_env_var(), None);
        assert_eq!(Category::Cache.to_string(), "cache");
        assert_eq!(Category::ALL.len(), 5);
    }
}
