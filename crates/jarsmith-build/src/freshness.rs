//! Deciding whether an existing archive can be reused

use crate::artifact::Artifact;
use crate::context::BuildContext;
use crate::error::BuildResult;
use crate::jdk::JdkProvider;
use crate::native::image_name;
use crate::resolver::DependencyResolver;
use crate::source::SourceSet;
use std::fmt;

/// Why an archive has to be (re)built
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RebuildReason {
    /// Fresh build explicitly requested
    Forced,
    /// A native binary is wanted and none exists yet
    NativeRequired,
    /// No archive at the target path
    NotFound,
    /// The archive exists but its metadata cannot be read
    Unreadable(String),
    /// Inputs or dependencies changed since the archive was built
    OutOfDate,
    /// The requested Java version is older than the one the archive was built for
    JavaDowngrade { requested: u32, built: u32 },
}

impl fmt::Display for RebuildReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Forced => write!(f, "fresh build explicitly requested"),
            Self::NativeRequired => write!(f, "native image required"),
            Self::NotFound => write!(f, "not found"),
            Self::Unreadable(reason) => write!(f, "unreadable: {}", reason),
            Self::OutOfDate => write!(f, "out of date"),
            Self::JavaDowngrade { requested, built } => write!(
                f,
                "requested Java {} is older than build Java {}",
                requested, built
            ),
        }
    }
}

/// Outcome of the freshness check
#[derive(Debug, Clone, PartialEq)]
pub enum Freshness {
    Reuse(Artifact),
    Rebuild(RebuildReason),
}

impl Freshness {
    pub fn needs_rebuild(&self) -> bool {
        matches!(self, Self::Rebuild(_))
    }
}

/// Decide whether `source_set.jar_file` must be rebuilt.
///
/// The first matching rule wins: forced, native binary missing, archive
/// missing, archive unreadable, archive out of date, Java downgrade.
/// Reuse is allowed when the archive was built for a newer Java than the
/// one requested.
pub fn check_freshness(
    source_set: &SourceSet,
    context: &mut BuildContext,
    resolver: &dyn DependencyResolver,
    jdk: &dyn JdkProvider,
    fresh: bool,
) -> BuildResult<Freshness> {
    if fresh {
        return Ok(Freshness::Rebuild(RebuildReason::Forced));
    }

    let jar = &source_set.jar_file;
    if context.native_image && !image_name(jar).exists() {
        return Ok(Freshness::Rebuild(RebuildReason::NativeRequired));
    }
    if !jar.exists() {
        return Ok(Freshness::Rebuild(RebuildReason::NotFound));
    }

    let artifact = match Artifact::load(jar) {
        Ok(artifact) => artifact,
        Err(e) => return Ok(Freshness::Rebuild(RebuildReason::Unreadable(e.to_string()))),
    };

    let class_path = context.resolve_class_path(source_set, resolver)?;
    if !artifact.is_up_to_date(source_set, class_path) {
        return Ok(Freshness::Rebuild(RebuildReason::OutOfDate));
    }

    let requested = jdk.version_for(context.java_version_or(source_set));
    let built = artifact.min_java_version();
    if requested < built {
        return Ok(Freshness::Rebuild(RebuildReason::JavaDowngrade { requested, built }));
    }

    Ok(Freshness::Reuse(artifact))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::jdk::JavaHome;
    use crate::manifest::{Manifest, ATTR_BUILD_JDK, MANIFEST_PATH};
    use crate::resolver::StaticClassPath;
    use pretty_assertions::assert_eq;
    use rstest::rstest;
    use std::fs::{self, File};
    use std::io::Write;
    use std::path::Path;
    use tempfile::TempDir;
    use zip::write::FileOptions;
    use zip::ZipWriter;

    fn write_jar(path: &Path, build_jdk: &str) {
        let mut manifest = Manifest::new();
        manifest.set("Manifest-Version", "1.0");
        manifest.set(ATTR_BUILD_JDK, build_jdk);
        let mut zip = ZipWriter::new(File::create(path).unwrap());
        zip.start_file(MANIFEST_PATH, FileOptions::default()).unwrap();
        zip.write_all(&manifest.to_bytes()).unwrap();
        zip.finish().unwrap();
    }

    fn check(ss: &SourceSet, ctx: &mut BuildContext, fresh: bool) -> Freshness {
        check_freshness(
            ss,
            ctx,
            &StaticClassPath::default(),
            &JavaHome::new(None, 17),
            fresh,
        )
        .unwrap()
    }

    #[test]
    fn test_missing_archive_not_found() {
        let temp = TempDir::new().unwrap();
        let ss = SourceSet::new(temp.path().join("a.jar"));
        assert_eq!(
            check(&ss, &mut BuildContext::new(), false),
            Freshness::Rebuild(RebuildReason::NotFound)
        );
    }

    #[test]
    fn test_fresh_always_rebuilds() {
        let temp = TempDir::new().unwrap();
        let jar = temp.path().join("a.jar");
        write_jar(&jar, "17");
        let ss = SourceSet::new(&jar);
        assert_eq!(
            check(&ss, &mut BuildContext::new(), true),
            Freshness::Rebuild(RebuildReason::Forced)
        );
    }

    #[test]
    fn test_native_without_binary_rebuilds() {
        let temp = TempDir::new().unwrap();
        let jar = temp.path().join("a.jar");
        write_jar(&jar, "17");
        let ss = SourceSet::new(&jar);
        let mut ctx = BuildContext::new().with_native_image(true);
        assert_eq!(
            check(&ss, &mut ctx, false),
            Freshness::Rebuild(RebuildReason::NativeRequired)
        );

        fs::write(image_name(&jar), "ELF").unwrap();
        assert!(!check(&ss, &mut ctx, false).needs_rebuild());
    }

    #[test]
    fn test_corrupt_archive_unreadable() {
        let temp = TempDir::new().unwrap();
        let jar = temp.path().join("a.jar");
        fs::write(&jar, "not a zip").unwrap();
        let ss = SourceSet::new(&jar);
        assert!(matches!(
            check(&ss, &mut BuildContext::new(), false),
            Freshness::Rebuild(RebuildReason::Unreadable(_))
        ));
    }

    #[test]
    fn test_deleted_source_out_of_date() {
        let temp = TempDir::new().unwrap();
        let jar = temp.path().join("a.jar");
        write_jar(&jar, "17");
        let ss = SourceSet::new(&jar).with_main_source(temp.path().join("gone.java"));
        assert_eq!(
            check(&ss, &mut BuildContext::new(), false),
            Freshness::Rebuild(RebuildReason::OutOfDate)
        );
    }

    #[rstest]
    #[case("17", "11", true)]
    #[case("17", "17", false)]
    #[case("17", "21", false)]
    #[case("1.8", "11", false)]
    #[case("11", "1.8", true)]
    fn test_version_downgrade(#[case] built: &str, #[case] requested: &str, #[case] rebuild: bool) {
        let temp = TempDir::new().unwrap();
        let jar = temp.path().join("a.jar");
        write_jar(&jar, built);
        let ss = SourceSet::new(&jar);
        let mut ctx = BuildContext::new().with_java_version(requested);
        assert_eq!(check(&ss, &mut ctx, false).needs_rebuild(), rebuild);
    }
}
