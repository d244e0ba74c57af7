//! Global Configuration (~/.jarsmith/config.toml)
//!
//! Handles user-level configuration stored in `~/.jarsmith/config.toml`.

use crate::{ConfigError, ConfigResult};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

/// Shell dialect names accepted in `[build] shell`
pub const SHELL_NAMES: &[&str] = &["bash", "cmd", "powershell"];

/// Global user configuration from ~/.jarsmith/config.toml
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Default)]
#[serde(deny_unknown_fields)]
pub struct GlobalConfig {
    /// Build behaviour
    #[serde(skip_serializing_if = "Option::is_none")]
    pub build: Option<BuildSection>,

    /// JDK selection
    #[serde(skip_serializing_if = "Option::is_none")]
    pub java: Option<JavaSection>,

    /// Native image toolchain
    #[serde(skip_serializing_if = "Option::is_none")]
    pub native: Option<NativeSection>,

    /// Properties handed to integration hooks
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub properties: BTreeMap<String, String>,
}

/// `[build]` section
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Default)]
#[serde(deny_unknown_fields)]
pub struct BuildSection {
    /// Always rebuild, ignoring any existing archive
    #[serde(skip_serializing_if = "Option::is_none")]
    pub fresh: Option<bool>,

    /// Shell dialect used when rendering command lines
    #[serde(skip_serializing_if = "Option::is_none")]
    pub shell: Option<String>,
}

/// `[java]` section
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Default)]
#[serde(deny_unknown_fields, rename_all = "kebab-case")]
pub struct JavaSection {
    /// Version used when a source does not request one
    #[serde(skip_serializing_if = "Option::is_none")]
    pub default_version: Option<String>,

    /// JDK installation directory
    #[serde(skip_serializing_if = "Option::is_none")]
    pub home: Option<PathBuf>,
}

/// `[native]` section
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Default)]
#[serde(deny_unknown_fields)]
pub struct NativeSection {
    /// Installation directory of the ahead-of-time compiler
    #[serde(skip_serializing_if = "Option::is_none")]
    pub home: Option<PathBuf>,
}

impl GlobalConfig {
    /// Load global configuration from a file
    pub fn load_from_file(path: &Path) -> ConfigResult<Self> {
        let content = std::fs::read_to_string(path).map_err(|e| {
            if e.kind() == std::io::ErrorKind::NotFound {
                ConfigError::NotFound(path.to_path_buf())
            } else {
                ConfigError::IoError(e)
            }
        })?;

        let config: Self = toml::from_str(&content).map_err(|e| ConfigError::TomlParseError {
            file: path.to_path_buf(),
            error: e,
        })?;

        config.validate()?;
        Ok(config)
    }

    /// Validate the global configuration
    pub fn validate(&self) -> ConfigResult<()> {
        if let Some(shell) = self.build.as_ref().and_then(|b| b.shell.as_deref()) {
            validate_shell("build.shell", shell)?;
        }

        if let Some(version) = self.java.as_ref().and_then(|j| j.default_version.as_deref()) {
            if !is_valid_java_version(version) {
                return Err(ConfigError::InvalidValue {
                    field: "java.default-version".to_string(),
                    reason: format!("invalid java version '{}'", version),
                });
            }
        }

        Ok(())
    }

    /// Get the global config file path (~/.jarsmith/config.toml)
    pub fn global_config_path() -> ConfigResult<PathBuf> {
        let home = dirs::home_dir().ok_or(ConfigError::HomeNotFound)?;
        Ok(home.join(".jarsmith").join("config.toml"))
    }

    pub fn fresh(&self) -> Option<bool> {
        self.build.as_ref().and_then(|b| b.fresh)
    }

    pub fn shell(&self) -> Option<&str> {
        self.build.as_ref().and_then(|b| b.shell.as_deref())
    }

    pub fn default_java_version(&self) -> Option<&str> {
        self.java.as_ref().and_then(|j| j.default_version.as_deref())
    }

    pub fn java_home(&self) -> Option<&Path> {
        self.java.as_ref().and_then(|j| j.home.as_deref())
    }

    pub fn native_home(&self) -> Option<&Path> {
        self.native.as_ref().and_then(|n| n.home.as_deref())
    }
}

/// Validate a shell dialect name
pub(crate) fn validate_shell(field: &str, value: &str) -> ConfigResult<()> {
    if !SHELL_NAMES.contains(&value) {
        return Err(ConfigError::InvalidValue {
            field: field.to_string(),
            reason: format!("must be 'bash', 'cmd', or 'powershell', got '{}'", value),
        });
    }
    Ok(())
}

/// Accepts `17`, `17+` and the legacy `1.8` form
fn is_valid_java_version(version: &str) -> bool {
    let version = version.strip_suffix('+').unwrap_or(version);
    let major = version.strip_prefix("1.").unwrap_or(version);
    !major.is_empty() && major.chars().all(|c| c.is_ascii_digit())
}
