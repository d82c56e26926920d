//! Resolution options
//!
//! [`XdgConfig`] holds everything that shapes a resolution besides the
//! environment and the filesystem. It can be embedded in an application's own
//! TOML configuration:
//!
//! ```toml
//! prefix = "myapp"
//! profile = "work"
//!
//! [runtime_dir]
//! mode = "setup"
//! default_if_undefined = "/tmp/myapp-runtime"
//! ```

use serde::{Deserialize, Serialize};
use std::path::PathBuf;

use crate::runtime::RuntimeDirHandling;

/// Options for resolving base directories.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct XdgConfig {
    /// Shared prefix, applied to user and system directories alike
    pub prefix: PathBuf,

    /// Profile fragment, applied under `prefix` to user directories only
    pub profile: PathBuf,

    /// Runtime directory handling
    pub runtime_dir: RuntimeDirHandling,
}

impl XdgConfig {
    /// Options for an application using `prefix` and no profile
    pub fn with_prefix(prefix: impl Into<PathBuf>) -> Self {
        Self {
            prefix: prefix.into(),
            ..Default::default()
        }
    }

    /// Parse XdgConfig from TOML string.
    pub fn from_toml(content: &str) -> Result<Self, toml::de::Error> {
        toml::from_str(content)
    }

    /// Serialize XdgConfig to TOML string.
    pub fn to_toml(&self) -> Result<String, toml::ser::Error> {
        toml::to_string_pretty(self)
    }
}
