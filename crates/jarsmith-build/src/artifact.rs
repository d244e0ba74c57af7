//! Metadata of a previously packaged archive

use crate::error::{BuildError, BuildResult};
use crate::escape::split_portable;
use crate::jdk::parse_java_version;
use crate::manifest::{
    Manifest, ATTR_AGENT_CLASS, ATTR_BUILD_JDK, ATTR_CLASSPATH_DIGEST, ATTR_JAVA_OPTIONS,
    ATTR_MAIN_CLASS, ATTR_PREMAIN_CLASS, MANIFEST_PATH,
};
use crate::resolver::ClassPath;
use crate::source::SourceSet;
use std::fs::{self, File};
use std::io::Read;
use std::path::{Path, PathBuf};
use std::time::SystemTime;
use tracing::debug;
use zip::ZipArchive;

/// What an archive on disk records about the build that produced it
#[derive(Debug, Clone, PartialEq)]
pub struct Artifact {
    /// Archive location
    pub path: PathBuf,
    /// Entry point class
    pub main_class: Option<String>,
    /// Class with `agentmain`
    pub agent_main_class: Option<String>,
    /// Class with `premain`
    pub pre_main_class: Option<String>,
    /// Runtime options recorded at build time
    pub runtime_options: Vec<String>,
    /// Raw `Build-Jdk` value (`1.8`, `17`)
    pub java_version: Option<String>,
    /// Fingerprint of the class path used for compiling
    pub classpath_digest: Option<String>,
    /// Modification time of the archive
    pub modified: SystemTime,
    /// Native binary built from this archive, if present
    pub native_image: Option<PathBuf>,
}

impl Artifact {
    /// Read the metadata of the archive at `path`
    pub fn load(path: impl AsRef<Path>) -> BuildResult<Self> {
        let path = path.as_ref();
        let file = File::open(path).map_err(|e| BuildError::io(path, e))?;
        let modified = file
            .metadata()
            .and_then(|m| m.modified())
            .map_err(|e| BuildError::io(path, e))?;

        let mut archive =
            ZipArchive::new(file).map_err(|e| BuildError::invalid_artifact(path, e))?;
        let mut text = String::new();
        archive
            .by_name(MANIFEST_PATH)
            .map_err(|e| BuildError::invalid_artifact(path, format!("no manifest: {}", e)))?
            .read_to_string(&mut text)
            .map_err(|e| BuildError::invalid_artifact(path, e))?;
        let manifest = Manifest::parse(&text).map_err(|e| BuildError::invalid_artifact(path, e))?;

        Ok(Self::from_manifest(path, &manifest, modified))
    }

    fn from_manifest(path: &Path, manifest: &Manifest, modified: SystemTime) -> Self {
        let attr = |key: &str| manifest.get(key).map(str::to_string);
        Self {
            path: path.to_path_buf(),
            main_class: attr(ATTR_MAIN_CLASS),
            agent_main_class: attr(ATTR_AGENT_CLASS),
            pre_main_class: attr(ATTR_PREMAIN_CLASS),
            runtime_options: manifest
                .get(ATTR_JAVA_OPTIONS)
                .map(split_portable)
                .unwrap_or_default(),
            java_version: attr(ATTR_BUILD_JDK),
            classpath_digest: attr(ATTR_CLASSPATH_DIGEST),
            modified,
            native_image: None,
        }
    }

    /// Major version of the JDK that built the archive
    pub fn build_jdk(&self) -> Option<u32> {
        self.java_version.as_deref().and_then(parse_java_version)
    }

    /// Lowest Java version this archive can be run with; 0 when unknown
    pub fn min_java_version(&self) -> u32 {
        self.build_jdk().unwrap_or(0)
    }

    /// Whether the archive still reflects its inputs and dependencies
    pub fn is_up_to_date(&self, source_set: &SourceSet, class_path: &ClassPath) -> bool {
        for input in source_set.input_files() {
            match fs::metadata(input).and_then(|m| m.modified()) {
                Ok(modified) if modified <= self.modified => {}
                Ok(_) => {
                    debug!(path = ?input, "input newer than archive");
                    return false;
                }
                Err(e) => {
                    debug!(path = ?input, error = %e, "input not readable");
                    return false;
                }
            }
        }

        if !class_path.is_available() {
            debug!("resolved dependency missing");
            return false;
        }

        match &self.classpath_digest {
            Some(digest) if *digest != class_path.digest() => {
                debug!(recorded = %digest, "class path changed");
                false
            }
            _ => true,
        }
    }
}
