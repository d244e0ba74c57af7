/// Build inputs: sources, resources and what to produce from them
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

/// Language of the sources, deciding compiler and main-source extension
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SourceLanguage {
    #[default]
    Java,
    Kotlin,
    Groovy,
}

impl SourceLanguage {
    /// Compiler executable for this language
    pub fn compiler_tool(&self) -> &'static str {
        match self {
            Self::Java => "javac",
            Self::Kotlin => "kotlinc",
            Self::Groovy => "groovyc",
        }
    }

    /// Extension of the main source file, including the dot
    pub fn main_extension(&self) -> &'static str {
        match self {
            Self::Java => ".java",
            Self::Kotlin => ".kt",
            Self::Groovy => ".groovy",
        }
    }
}

impl std::fmt::Display for SourceLanguage {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Java => write!(f, "java"),
            Self::Kotlin => write!(f, "kotlin"),
            Self::Groovy => write!(f, "groovy"),
        }
    }
}

/// A file copied verbatim into the archive
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResourceRef {
    /// File on disk
    pub source: PathBuf,
    /// Path inside the archive
    pub target: PathBuf,
}

impl ResourceRef {
    pub fn new(source: impl Into<PathBuf>, target: impl Into<PathBuf>) -> Self {
        Self {
            source: source.into(),
            target: target.into(),
        }
    }
}

/// Resolved inputs of one build.
///
/// Owned by the caller; the build reads it and records what it discovers
/// (entry points, extra runtime options).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SourceSet {
    /// Source language
    pub language: SourceLanguage,
    /// The file the user ran; `None` when the source came from stdin
    pub main_source: Option<PathBuf>,
    /// Files handed to the compiler
    pub sources: Vec<PathBuf>,
    /// Files copied into the archive
    pub resources: Vec<ResourceRef>,
    /// Archive to produce
    pub jar_file: PathBuf,
    /// Requested Java version (`"11"`, `"17+"`)
    pub java_version: Option<String>,
    /// Extra compiler flags
    pub compile_options: Vec<String>,
    /// Options for the JVM that will run the archive
    pub runtime_options: Vec<String>,
    /// Additional manifest attributes
    pub manifest_attributes: BTreeMap<String, String>,
    /// `group:artifact[:version]` coordinate of the produced package
    pub gav: Option<String>,
    /// Human readable description
    pub description: Option<String>,
    /// Entry point class
    pub main_class: Option<String>,
    /// Whether the source is a Java agent
    pub agent: bool,
    /// Class with `agentmain`
    pub agent_main_class: Option<String>,
    /// Class with `premain`
    pub pre_main_class: Option<String>,
}

impl SourceSet {
    /// Create a source set producing `jar_file`
    pub fn new(jar_file: impl Into<PathBuf>) -> Self {
        Self {
            language: SourceLanguage::Java,
            main_source: None,
            sources: Vec::new(),
            resources: Vec::new(),
            jar_file: jar_file.into(),
            java_version: None,
            compile_options: Vec::new(),
            runtime_options: Vec::new(),
            manifest_attributes: BTreeMap::new(),
            gav: None,
            description: None,
            main_class: None,
            agent: false,
            agent_main_class: None,
            pre_main_class: None,
        }
    }

    pub fn with_language(mut self, language: SourceLanguage) -> Self {
        self.language = language;
        self
    }

    /// Set the main source; it is also added to the compiled sources
    pub fn with_main_source(mut self, path: impl Into<PathBuf>) -> Self {
        let path = path.into();
        if !self.sources.contains(&path) {
            self.sources.insert(0, path.clone());
        }
        self.main_source = Some(path);
        self
    }

    pub fn with_sources(mut self, sources: Vec<PathBuf>) -> Self {
        for source in sources {
            if !self.sources.contains(&source) {
                self.sources.push(source);
            }
        }
        self
    }

    pub fn with_resources(mut self, resources: Vec<ResourceRef>) -> Self {
        self.resources = resources;
        self
    }

    pub fn with_java_version(mut self, version: impl Into<String>) -> Self {
        self.java_version = Some(version.into());
        self
    }

    pub fn with_compile_options(mut self, options: Vec<String>) -> Self {
        self.compile_options = options;
        self
    }

    pub fn with_runtime_options(mut self, options: Vec<String>) -> Self {
        self.runtime_options = options;
        self
    }

    pub fn with_manifest_attribute(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.manifest_attributes.insert(key.into(), value.into());
        self
    }

    pub fn with_gav(mut self, gav: impl Into<String>) -> Self {
        self.gav = Some(gav.into());
        self
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    pub fn with_main_class(mut self, main_class: impl Into<String>) -> Self {
        self.main_class = Some(main_class.into());
        self
    }

    pub fn with_agent(mut self, agent: bool) -> Self {
        self.agent = agent;
        self
    }

    /// Append runtime options, e.g. those contributed by integrations
    pub fn add_runtime_options(&mut self, options: impl IntoIterator<Item = String>) {
        self.runtime_options.extend(options);
    }

    /// Scratch directory used while compiling: `<jar>.tmp`
    pub fn compile_dir(&self) -> PathBuf {
        let mut name = self
            .jar_file
            .file_name()
            .map(|n| n.to_os_string())
            .unwrap_or_default();
        name.push(".tmp");
        self.jar_file.with_file_name(name)
    }

    /// Class name the main source most likely declares, e.g. `hello` for `hello.java`
    pub fn suggested_main(&self) -> Option<String> {
        let name = self.main_source.as_deref()?.file_name()?.to_str()?;
        let ext = self.language.main_extension();
        Some(name.strip_suffix(ext).unwrap_or(name).to_string())
    }

    /// Base name of the main source (or of the archive for stdin sources)
    pub fn base_name(&self) -> String {
        self.main_source
            .as_deref()
            .unwrap_or(&self.jar_file)
            .file_stem()
            .map(|s| s.to_string_lossy().to_string())
            .unwrap_or_default()
    }

    /// All files whose modification makes an archive stale
    pub fn input_files(&self) -> impl Iterator<Item = &Path> {
        self.sources
            .iter()
            .map(PathBuf::as_path)
            .chain(self.resources.iter().map(|r| r.source.as_path()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_compile_dir_next_to_jar() {
        let ss = SourceSet::new("/cache/jars/hello.java.jar");
        assert_eq!(ss.compile_dir(), PathBuf::from("/cache/jars/hello.java.jar.tmp"));
    }

    #[test]
    fn test_suggested_main_strips_extension() {
        let ss = SourceSet::new("out.jar").with_main_source("scripts/hello.java");
        assert_eq!(ss.suggested_main(), Some("hello".to_string()));

        let ss = SourceSet::new("out.jar")
            .with_language(SourceLanguage::Kotlin)
            .with_main_source("app.kt");
        assert_eq!(ss.suggested_main(), Some("app".to_string()));
    }

    #[test]
    fn test_suggested_main_none_for_stdin() {
        let ss = SourceSet::new("out.jar");
        assert_eq!(ss.suggested_main(), None);
        assert_eq!(ss.base_name(), "out");
    }

    #[test]
    fn test_main_source_added_once() {
        let ss = SourceSet::new("out.jar")
            .with_sources(vec![PathBuf::from("a.java")])
            .with_main_source("a.java")
            .with_sources(vec![PathBuf::from("a.java"), PathBuf::from("b.java")]);
        assert_eq!(ss.sources, vec![PathBuf::from("a.java"), PathBuf::from("b.java")]);
    }

    #[test]
    fn test_input_files_include_resources() {
        let ss = SourceSet::new("out.jar")
            .with_main_source("a.java")
            .with_resources(vec![ResourceRef::new("conf/app.properties", "app.properties")]);
        let inputs: Vec<_> = ss.input_files().collect();
        assert_eq!(inputs, vec![Path::new("a.java"), Path::new("conf/app.properties")]);
    }

    #[test]
    fn test_language_tools() {
        assert_eq!(SourceLanguage::Java.compiler_tool(), "javac");
        assert_eq!(SourceLanguage::Kotlin.compiler_tool(), "kotlinc");
        assert_eq!(SourceLanguage::Groovy.main_extension(), ".groovy");
        assert_eq!(SourceLanguage::Groovy.to_string(), "groovy");
    }
}
