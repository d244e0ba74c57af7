//! Package descriptor (`pom.xml`) generation

use crate::context::BuildContext;
use crate::error::BuildWarning;
use crate::resolver::ClassPath;
use crate::source::SourceSet;
use crate::template::{TemplateEngine, POM_TEMPLATE};
use serde_json::json;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::debug;

/// Version given to packages that do not declare one
pub const DEFAULT_VERSION: &str = "999-SNAPSHOT";
/// Group given to packages that do not declare one
pub const DEFAULT_GROUP: &str = "group";

/// `group:artifact:version` of the produced package
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Coordinate {
    pub group: String,
    pub artifact: String,
    pub version: String,
}

impl Coordinate {
    /// Parse `group:artifact[:version]`
    pub fn parse(gav: &str) -> Result<Self, String> {
        let parts: Vec<&str> = gav.trim().split(':').collect();
        if !(2..=3).contains(&parts.len()) || parts.iter().any(|p| p.is_empty()) {
            return Err(format!(
                "'{}' is not a valid coordinate, expected group:artifact[:version]",
                gav
            ));
        }
        Ok(Self {
            group: parts[0].to_string(),
            artifact: parts[1].to_string(),
            version: parts.get(2).unwrap_or(&DEFAULT_VERSION).to_string(),
        })
    }

    /// Coordinate declared by the source set, or the defaults derived from its name
    pub fn for_source(source_set: &SourceSet) -> Result<Self, String> {
        match source_set.gav.as_deref() {
            Some(gav) => Self::parse(gav),
            None => Ok(Self {
                group: DEFAULT_GROUP.to_string(),
                artifact: source_set.base_name(),
                version: DEFAULT_VERSION.to_string(),
            }),
        }
    }

    /// Descriptor location relative to the archive root
    pub fn descriptor_path(&self) -> PathBuf {
        let mut path = PathBuf::from("META-INF").join("maven");
        for segment in self.group.split('.') {
            path.push(segment);
        }
        path.join(POM_TEMPLATE)
    }
}

/// Render the descriptor into `compiled_dir`.
///
/// Best effort: every problem becomes a warning on the context and the
/// build carries on without a descriptor.
pub fn generate_descriptor(
    source_set: &SourceSet,
    context: &mut BuildContext,
    class_path: &ClassPath,
    templates: &dyn TemplateEngine,
    compiled_dir: &Path,
) -> Option<PathBuf> {
    match render_descriptor(source_set, class_path, templates, compiled_dir) {
        Ok(path) => path,
        Err(warning) => {
            context.warn(warning);
            None
        }
    }
}

fn render_descriptor(
    source_set: &SourceSet,
    class_path: &ClassPath,
    templates: &dyn TemplateEngine,
    compiled_dir: &Path,
) -> Result<Option<PathBuf>, BuildWarning> {
    let failed = |reason: String| BuildWarning::DescriptorFailed { reason };

    let coordinate = Coordinate::for_source(source_set).map_err(failed)?;
    let data = json!({
        "baseName": source_set.base_name(),
        "group": coordinate.group,
        "artifact": coordinate.artifact,
        "version": coordinate.version,
        "description": source_set.description.clone().unwrap_or_default(),
        "dependencies": class_path.artifacts,
    });

    let rendered = templates.render(POM_TEMPLATE, &data).map_err(failed)?;
    let Some(text) = rendered else {
        return Err(BuildWarning::MissingDescriptorTemplate {
            template: POM_TEMPLATE.to_string(),
        });
    };

    let target = compiled_dir.join(coordinate.descriptor_path());
    if let Some(parent) = target.parent() {
        fs::create_dir_all(parent).map_err(|e| failed(e.to_string()))?;
    }
    fs::write(&target, text).map_err(|e| failed(e.to_string()))?;
    debug!(path = ?target, "wrote package descriptor");

    Ok(Some(target))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::resolver::ResolvedArtifact;
    use crate::template::MapTemplateEngine;
    use pretty_assertions::assert_eq;
    use rstest::rstest;
    use tempfile::TempDir;

    #[rstest]
    #[case("dev.example:hello:1.2", "dev.example", "hello", "1.2")]
    #[case("dev.example:hello", "dev.example", "hello", DEFAULT_VERSION)]
    fn test_parse_coordinate(
        #[case] gav: &str,
        #[case] group: &str,
        #[case] artifact: &str,
        #[case] version: &str,
    ) {
        let coordinate = Coordinate::parse(gav).unwrap();
        assert_eq!(coordinate.group, group);
        assert_eq!(coordinate.artifact, artifact);
        assert_eq!(coordinate.version, version);
    }

    #[rstest]
    #[case("hello")]
    #[case("a:b:c:d")]
    #[case("a::1")]
    fn test_malformed_coordinate(#[case] gav: &str) {
        assert!(Coordinate::parse(gav).is_err());
    }

    #[test]
    fn test_default_coordinate_from_main_source() {
        let ss = SourceSet::new("/cache/hello.jar").with_main_source("/src/hello.java");
        let coordinate = Coordinate::for_source(&ss).unwrap();
        assert_eq!(coordinate.group, "group");
        assert_eq!(coordinate.artifact, "hello");
        assert_eq!(coordinate.version, "999-SNAPSHOT");
        assert_eq!(
            coordinate.descriptor_path(),
            PathBuf::from("META-INF/maven/group/pom.xml")
        );
    }

    #[test]
    fn test_descriptor_written_under_group_path() {
        let temp = TempDir::new().unwrap();
        let ss = SourceSet::new("hello.jar")
            .with_main_source("hello.java")
            .with_gav("dev.example:hello:1.0");
        let cp = ClassPath::from_artifacts(vec![ResolvedArtifact::new(
            "info.picocli",
            "picocli",
            "4.7.5",
            "/m2/picocli.jar",
        )]);
        let mut ctx = BuildContext::new();

        let path = generate_descriptor(
            &ss,
            &mut ctx,
            &cp,
            &MapTemplateEngine::with_builtin(),
            temp.path(),
        )
        .unwrap();

        assert_eq!(path, temp.path().join("META-INF/maven/dev/example/pom.xml"));
        let pom = fs::read_to_string(path).unwrap();
        assert!(pom.contains("<artifactId>hello</artifactId>"));
        assert!(pom.contains("<artifactId>picocli</artifactId>"));
        assert!(ctx.warnings().is_empty());
    }

    #[test]
    fn test_descriptor_escapes_description() {
        let temp = TempDir::new().unwrap();
        let ss = SourceSet::new("hello.jar")
            .with_main_source("hello.java")
            .with_description("a < b & c");
        let mut ctx = BuildContext::new();

        let path = generate_descriptor(
            &ss,
            &mut ctx,
            &ClassPath::default(),
            &MapTemplateEngine::with_builtin(),
            temp.path(),
        )
        .unwrap();

        let pom = fs::read_to_string(path).unwrap();
        assert!(pom.contains("<description>a &lt; b &amp; c</description>"));
        assert!(!pom.contains("a < b"));
    }

    #[test]
    fn test_missing_template_is_warning() {
        let temp = TempDir::new().unwrap();
        let mut ctx = BuildContext::new();
        let path = generate_descriptor(
            &SourceSet::new("hello.jar"),
            &mut ctx,
            &ClassPath::default(),
            &MapTemplateEngine::empty(),
            temp.path(),
        );
        assert_eq!(path, None);
        assert_eq!(
            ctx.warnings(),
            &[BuildWarning::MissingDescriptorTemplate {
                template: "pom.xml".to_string()
            }]
        );
    }

    #[test]
    fn test_bad_coordinate_is_warning() {
        let temp = TempDir::new().unwrap();
        let mut ctx = BuildContext::new();
        let ss = SourceSet::new("hello.jar").with_gav("nonsense");
        let path = generate_descriptor(
            &ss,
            &mut ctx,
            &ClassPath::default(),
            &MapTemplateEngine::with_builtin(),
            temp.path(),
        );
        assert_eq!(path, None);
        assert!(matches!(
            ctx.warnings(),
            [BuildWarning::DescriptorFailed { .. }]
        ));
    }
}
