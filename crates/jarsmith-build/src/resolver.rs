//! Dependency resolution seam and resolved class paths

use crate::error::BuildResult;
use crate::source::SourceSet;
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use std::path::PathBuf;

/// Path list separator of the current platform
pub const CLASS_PATH_SEPARATOR: char = if cfg!(windows) { ';' } else { ':' };

/// A dependency resolved to a local file
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ResolvedArtifact {
    pub group_id: String,
    pub artifact_id: String,
    pub version: String,
    pub path: PathBuf,
}

impl ResolvedArtifact {
    pub fn new(
        group_id: impl Into<String>,
        artifact_id: impl Into<String>,
        version: impl Into<String>,
        path: impl Into<PathBuf>,
    ) -> Self {
        Self {
            group_id: group_id.into(),
            artifact_id: artifact_id.into(),
            version: version.into(),
            path: path.into(),
        }
    }

    /// `group:artifact:version`
    pub fn coordinate(&self) -> String {
        format!("{}:{}:{}", self.group_id, self.artifact_id, self.version)
    }
}

/// Class path of a build plus the artifacts it was made from
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ClassPath {
    pub class_path: String,
    pub artifacts: Vec<ResolvedArtifact>,
}

impl ClassPath {
    /// Class path joining the artifact files in order
    pub fn from_artifacts(artifacts: Vec<ResolvedArtifact>) -> Self {
        let class_path = artifacts
            .iter()
            .map(|a| a.path.to_string_lossy().to_string())
            .collect::<Vec<_>>()
            .join(&CLASS_PATH_SEPARATOR.to_string());
        Self {
            class_path,
            artifacts,
        }
    }

    pub fn is_blank(&self) -> bool {
        self.class_path.trim().is_empty()
    }

    /// SHA-256 fingerprint recorded in the archive
    pub fn digest(&self) -> String {
        let mut hasher = Sha256::new();
        hasher.update(self.class_path.as_bytes());
        format!("{:x}", hasher.finalize())
    }

    /// Whether every resolved file is still present
    pub fn is_available(&self) -> bool {
        self.artifacts.iter().all(|a| a.path.exists())
    }
}

/// Resolves the dependencies declared by a source set
pub trait DependencyResolver {
    fn resolve_class_path(&self, source_set: &SourceSet) -> BuildResult<ClassPath>;
}

/// Resolver returning a fixed class path
#[derive(Debug, Clone, Default)]
pub struct StaticClassPath {
    class_path: ClassPath,
}

impl StaticClassPath {
    pub fn new(artifacts: Vec<ResolvedArtifact>) -> Self {
        Self {
            class_path: ClassPath::from_artifacts(artifacts),
        }
    }
}

impl DependencyResolver for StaticClassPath {
    fn resolve_class_path(&self, _source_set: &SourceSet) -> BuildResult<ClassPath> {
        Ok(self.class_path.clone())
    }
}
