//! Configuration Loader
//!
//! Handles loading and merging configuration from multiple sources with proper precedence.

use crate::global::{validate_shell, GlobalConfig};
use crate::ConfigResult;
use std::collections::BTreeMap;
use std::env;
use std::path::{Path, PathBuf};

/// Environment variable forcing a fresh build
pub const ENV_FRESH: &str = "JARSMITH_FRESH";
/// Environment variable selecting the shell dialect
pub const ENV_SHELL: &str = "JARSMITH_SHELL";
/// Environment variable pointing at the JDK installation
pub const ENV_JAVA_HOME: &str = "JAVA_HOME";
/// Environment variable pointing at the native-image installation
pub const ENV_NATIVE_HOME: &str = "GRAALVM_HOME";

/// Configuration loader
///
/// Loads configuration from multiple sources and merges them with proper precedence:
/// 1. Global config (~/.jarsmith/config.toml) - lowest priority
/// 2. Environment variables - overrides global
/// 3. CLI flags - highest priority (handled by caller)
pub struct ConfigLoader {
    /// Cached global config path
    global_config_path: Option<PathBuf>,
}

/// Merged configuration result
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Config {
    fresh: bool,
    shell: Option<String>,
    default_java_version: Option<String>,
    java_home: Option<PathBuf>,
    native_home: Option<PathBuf>,
    properties: BTreeMap<String, String>,
}

impl ConfigLoader {
    /// Create a new configuration loader
    pub fn new() -> Self {
        Self {
            global_config_path: None,
        }
    }

    /// Use an explicit global config file instead of ~/.jarsmith/config.toml
    pub fn with_global_path(path: impl Into<PathBuf>) -> Self {
        Self {
            global_config_path: Some(path.into()),
        }
    }

    /// Load the global config (if any) and apply environment overrides
    pub fn load(&mut self) -> ConfigResult<Config> {
        let global = self.load_global_config()?;
        let config = Config::from_global(&global);
        self.apply_env_overrides(config)
    }

    /// Load global configuration, defaulting when the file does not exist
    fn load_global_config(&mut self) -> ConfigResult<GlobalConfig> {
        let path = match &self.global_config_path {
            Some(path) => path.clone(),
            None => {
                let path = GlobalConfig::global_config_path()?;
                self.global_config_path = Some(path.clone());
                path
            }
        };

        if !path.exists() {
            return Ok(GlobalConfig::default());
        }

        GlobalConfig::load_from_file(&path)
    }

    /// Apply environment variable overrides
    fn apply_env_overrides(&self, mut config: Config) -> ConfigResult<Config> {
        if let Ok(fresh) = env::var(ENV_FRESH) {
            config.fresh = matches!(fresh.to_lowercase().as_str(), "true" | "1" | "yes");
        }

        if let Ok(shell) = env::var(ENV_SHELL) {
            let shell = shell.to_lowercase();
            validate_shell(ENV_SHELL, &shell)?;
            config.shell = Some(shell);
        }

        if let Some(home) = non_empty_var(ENV_JAVA_HOME) {
            config.java_home = Some(PathBuf::from(home));
        }

        if let Some(home) = non_empty_var(ENV_NATIVE_HOME) {
            config.native_home = Some(PathBuf::from(home));
        }

        Ok(config)
    }

    /// Get the global configuration directory (~/.jarsmith)
    pub fn global_config_dir() -> ConfigResult<PathBuf> {
        let path = GlobalConfig::global_config_path()?;
        Ok(path.parent().map(Path::to_path_buf).unwrap_or(path))
    }
}

impl Default for ConfigLoader {
    fn default() -> Self {
        Self::new()
    }
}

fn non_empty_var(name: &str) -> Option<String> {
    env::var(name).ok().filter(|v| !v.trim().is_empty())
}

impl Config {
    /// Build a config from the global file alone
    pub fn from_global(global: &GlobalConfig) -> Self {
        Self {
            fresh: global.fresh().unwrap_or(false),
            shell: global.shell().map(str::to_string),
            default_java_version: global.default_java_version().map(str::to_string),
            java_home: global.java_home().map(Path::to_path_buf),
            native_home: global.native_home().map(Path::to_path_buf),
            properties: global.properties.clone(),
        }
    }

    /// Force (or stop forcing) fresh builds
    pub fn with_fresh(mut self, fresh: bool) -> Self {
        self.fresh = fresh;
        self
    }

    pub fn fresh(&self) -> bool {
        self.fresh
    }

    /// Shell dialect name (`bash`, `cmd` or `powershell`)
    pub fn shell(&self) -> Option<&str> {
        self.shell.as_deref()
    }

    pub fn default_java_version(&self) -> Option<&str> {
        self.default_java_version.as_deref()
    }

    pub fn java_home(&self) -> Option<&Path> {
        self.java_home.as_deref()
    }

    /// Native-image installation, `GRAALVM_HOME` taking precedence over the file
    pub fn native_home(&self) -> Option<&Path> {
        self.native_home.as_deref()
    }

    pub fn properties(&self) -> &BTreeMap<String, String> {
        &self.properties
    }
}
