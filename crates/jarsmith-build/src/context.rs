/// Per-invocation build state shared by the pipeline stages
use crate::artifact::Artifact;
use crate::error::{BuildResult, BuildWarning};
use crate::resolver::{ClassPath, DependencyResolver};
use crate::source::SourceSet;
use std::collections::BTreeMap;
use tracing::warn;

/// Build configuration and results of one invocation.
///
/// Created once per invocation; the compile stage writes to it and the
/// packaging and native stages read from it.
#[derive(Debug, Clone, Default)]
pub struct BuildContext {
    /// Java version requested on the command line, overriding the source's
    pub java_version: Option<String>,
    /// Entry point forced by the user
    pub main_class: Option<String>,
    /// Whether a native binary was requested
    pub native_image: bool,
    /// Properties made visible to integration hooks
    pub properties: BTreeMap<String, String>,
    /// Runtime options imported from a reused archive
    pub runtime_options: Vec<String>,
    build_jdk: u32,
    class_path: Option<ClassPath>,
    warnings: Vec<BuildWarning>,
}

impl BuildContext {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_java_version(mut self, version: impl Into<String>) -> Self {
        self.java_version = Some(version.into());
        self
    }

    pub fn with_main_class(mut self, main_class: impl Into<String>) -> Self {
        self.main_class = Some(main_class.into());
        self
    }

    pub fn with_native_image(mut self, native_image: bool) -> Self {
        self.native_image = native_image;
        self
    }

    pub fn with_properties(mut self, properties: BTreeMap<String, String>) -> Self {
        self.properties = properties;
        self
    }

    /// Requested Java version, falling back to the one the source asks for
    pub fn java_version_or<'a>(&'a self, source_set: &'a SourceSet) -> Option<&'a str> {
        self.java_version
            .as_deref()
            .or(source_set.java_version.as_deref())
    }

    /// Entry point, preferring the user's choice over the source set's
    pub fn main_class_or<'a>(&'a self, source_set: &'a SourceSet) -> Option<&'a str> {
        self.main_class.as_deref().or(source_set.main_class.as_deref())
    }

    /// Resolve the class path once and reuse it for the rest of the invocation
    pub fn resolve_class_path(
        &mut self,
        source_set: &SourceSet,
        resolver: &dyn DependencyResolver,
    ) -> BuildResult<&ClassPath> {
        if self.class_path.is_none() {
            let resolved = resolver.resolve_class_path(source_set)?;
            self.class_path = Some(resolved);
        }
        Ok(self.class_path.get_or_insert_with(ClassPath::default))
    }

    /// Class path resolved earlier in this invocation, if any
    pub fn class_path(&self) -> Option<&ClassPath> {
        self.class_path.as_ref()
    }

    /// Major version of the JDK that compiled (or originally compiled) the archive; 0 if unknown
    pub fn build_jdk(&self) -> u32 {
        self.build_jdk
    }

    pub fn set_build_jdk(&mut self, major: u32) {
        self.build_jdk = major;
    }

    /// Log a recoverable problem and keep it for the caller
    pub fn warn(&mut self, warning: BuildWarning) {
        warn!("{}", warning);
        self.warnings.push(warning);
    }

    pub fn warnings(&self) -> &[BuildWarning] {
        &self.warnings
    }

    /// Adopt the metadata of a reused archive
    pub fn import_artifact_metadata(&mut self, artifact: &Artifact) {
        if self.main_class.is_none() {
            self.main_class = artifact.main_class.clone();
        }
        self.runtime_options
            .extend(artifact.runtime_options.iter().cloned());
        if let Some(jdk) = artifact.build_jdk() {
            self.build_jdk = jdk;
        }
    }
}
