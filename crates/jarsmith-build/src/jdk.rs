//! JDK lookup and Java version handling

use jarsmith_config::Config;
use std::path::{Path, PathBuf};

/// Version assumed when neither the source nor the configuration names one
pub const DEFAULT_JAVA_VERSION: u32 = 17;

/// Locates JDK tools for a requested Java version
pub trait JdkProvider {
    /// Path (or bare name for PATH lookup) of `tool` for the requested version
    fn resolve_tool(&self, tool: &str, requested_version: Option<&str>) -> PathBuf;

    /// Major version used when nothing is requested
    fn default_version(&self) -> u32;

    /// Major version a build for `requested_version` will run with
    fn version_for(&self, requested_version: Option<&str>) -> u32 {
        requested_version
            .and_then(parse_java_version)
            .unwrap_or_else(|| self.default_version())
    }
}

/// Resolves tools from a single JDK installation, falling back to PATH
#[derive(Debug, Clone)]
pub struct JavaHome {
    home: Option<PathBuf>,
    default_version: u32,
}

impl JavaHome {
    pub fn new(home: Option<PathBuf>, default_version: u32) -> Self {
        Self {
            home,
            default_version,
        }
    }

    /// JDK from the merged configuration (`JAVA_HOME` / `[java]`)
    pub fn from_config(config: &Config) -> Self {
        let default_version = config
            .default_java_version()
            .and_then(parse_java_version)
            .unwrap_or(DEFAULT_JAVA_VERSION);
        Self::new(config.java_home().map(Path::to_path_buf), default_version)
    }
}

impl Default for JavaHome {
    fn default() -> Self {
        Self::new(None, DEFAULT_JAVA_VERSION)
    }
}

impl JdkProvider for JavaHome {
    fn resolve_tool(&self, tool: &str, _requested_version: Option<&str>) -> PathBuf {
        self.home
            .as_deref()
            .and_then(|home| find_in_bin(home, tool))
            .unwrap_or_else(|| PathBuf::from(tool))
    }

    fn default_version(&self) -> u32 {
        self.default_version
    }
}

/// Look for `<home>/bin/<tool>` with the platform's executable suffixes
pub fn find_in_bin(home: &Path, tool: &str) -> Option<PathBuf> {
    let bin = home.join("bin");
    let candidates: &[&str] = if cfg!(windows) {
        &[".exe", ".cmd", ".bat", ""]
    } else {
        &[""]
    };
    candidates
        .iter()
        .map(|suffix| bin.join(format!("{}{}", tool, suffix)))
        .find(|path| path.is_file())
}

/// Major version of a Java version string: `"11"`, `"17+"`, `"1.8"`, `"21.0.2"`
pub fn parse_java_version(version: &str) -> Option<u32> {
    let version = version.trim();
    let version = version.strip_suffix('+').unwrap_or(version);
    let version = version.strip_prefix("1.").unwrap_or(version);
    let digits: String = version.chars().take_while(|c| c.is_ascii_digit()).collect();
    digits.parse().ok()
}

/// Value recorded for the build JDK: `1.8` style below 9, bare number otherwise
pub fn format_build_jdk(major: u32) -> String {
    if major >= 9 {
        major.to_string()
    } else {
        format!("1.{}", major)
    }
}
