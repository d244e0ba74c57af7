//! Build orchestration: freshness check, compile, package, native image
use crate::artifact::Artifact;
use crate::compile::CompilePipeline;
use crate::context::BuildContext;
use crate::error::{BuildError, BuildResult};
use crate::escape::ShellDialect;
use crate::freshness::{check_freshness, Freshness, RebuildReason};
use crate::native::{build_native, image_name, install_native_image, resolve_native_image};
use crate::packager::package;
use crate::source::SourceSet;
use crate::toolchain::Toolchain;

use jarsmith_config::{Config, ConfigError};
use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use std::time::{Duration, Instant};
use tracing::{debug, info, warn};

/// Build configuration
#[derive(Debug, Clone)]
pub struct BuildConfig {
    /// Rebuild even when the archive looks up to date
    pub fresh: bool,
    /// Dialect used to render command lines in logs
    pub shell: ShellDialect,
    /// Installation searched first for `native-image`
    pub native_home: Option<PathBuf>,
}

impl Default for BuildConfig {
    fn default() -> Self {
        Self {
            fresh: false,
            shell: ShellDialect::detect(),
            native_home: None,
        }
    }
}

impl BuildConfig {
    /// Orchestrator settings from the merged configuration
    pub fn from_config(config: &Config) -> BuildResult<Self> {
        let shell = match config.shell() {
            Some(name) => {
                name.parse::<ShellDialect>()
                    .map_err(|reason| ConfigError::InvalidValue {
                        field: "build.shell".to_string(),
                        reason,
                    })?
            }
            None => ShellDialect::detect(),
        };
        Ok(Self {
            fresh: config.fresh(),
            shell,
            native_home: config.native_home().map(Path::to_path_buf),
        })
    }
}

/// Build statistics
#[derive(Debug, Clone, Default)]
pub struct BuildStats {
    /// Whether the archive was rebuilt, and why
    pub rebuild_reason: Option<RebuildReason>,
    /// Whether a native binary was produced or installed
    pub native_built: bool,
    /// Total build time
    pub total_time: Duration,
    /// Time spent compiling
    pub compilation_time: Duration,
    /// Time spent packaging
    pub packaging_time: Duration,
    /// Time spent in the native image stage
    pub native_time: Duration,
}

/// Scratch compile directory, removed when dropped
struct ScratchDir {
    path: PathBuf,
}

impl ScratchDir {
    /// Start from an empty directory, clearing leftovers of an earlier run
    fn create(path: PathBuf) -> BuildResult<Self> {
        match fs::remove_dir_all(&path) {
            Ok(()) => debug!(path = ?path, "removed stale compile directory"),
            Err(e) if e.kind() == ErrorKind::NotFound => {}
            Err(e) => return Err(BuildError::io(&path, e)),
        }
        fs::create_dir_all(&path).map_err(|e| BuildError::io(&path, e))?;
        Ok(Self { path })
    }

    fn path(&self) -> &Path {
        &self.path
    }
}

impl Drop for ScratchDir {
    fn drop(&mut self) {
        if let Err(e) = fs::remove_dir_all(&self.path) {
            if e.kind() != ErrorKind::NotFound {
                warn!(path = ?self.path, error = %e, "could not remove compile directory");
            }
        }
    }
}

/// Main builder for orchestrating one build invocation
pub struct Builder {
    source_set: SourceSet,
    context: BuildContext,
    toolchain: Toolchain,
    config: BuildConfig,
    stats: BuildStats,
}

impl Builder {
    /// Create a builder for `source_set` with default collaborators
    pub fn new(source_set: SourceSet) -> Self {
        Self {
            source_set,
            context: BuildContext::new(),
            toolchain: Toolchain::default(),
            config: BuildConfig::default(),
            stats: BuildStats::default(),
        }
    }

    /// Create a builder whose settings, JDK and hook properties come from `config`
    pub fn from_config(source_set: SourceSet, config: &Config) -> BuildResult<Self> {
        Ok(Self::new(source_set)
            .with_config(BuildConfig::from_config(config)?)
            .with_toolchain(Toolchain::from_config(config))
            .with_context(BuildContext::new().with_properties(config.properties().clone())))
    }

    /// Set build configuration
    pub fn with_config(mut self, config: BuildConfig) -> Self {
        self.config = config;
        self
    }

    /// Set the invocation context (requested version, forced main class, native)
    pub fn with_context(mut self, context: BuildContext) -> Self {
        self.context = context;
        self
    }

    /// Set the collaborators
    pub fn with_toolchain(mut self, toolchain: Toolchain) -> Self {
        self.toolchain = toolchain;
        self
    }

    /// Force a rebuild
    pub fn with_fresh(mut self, fresh: bool) -> Self {
        self.config.fresh = fresh;
        self
    }

    pub fn source_set(&self) -> &SourceSet {
        &self.source_set
    }

    pub fn context(&self) -> &BuildContext {
        &self.context
    }

    pub fn stats(&self) -> &BuildStats {
        &self.stats
    }

    /// Execute the build.
    ///
    /// Reuses the archive when it is still fresh, otherwise compiles into a
    /// scratch directory and packages the result. The scratch directory is
    /// gone when this returns, on success and on failure.
    pub fn build(&mut self) -> BuildResult<Artifact> {
        let build_start = Instant::now();
        self.stats = BuildStats::default();
        let jar = self.source_set.jar_file.clone();

        let freshness = check_freshness(
            &self.source_set,
            &mut self.context,
            self.toolchain.resolver.as_ref(),
            self.toolchain.jdk.as_ref(),
            self.config.fresh,
        )?;

        let mut hook_native = None;
        match freshness {
            Freshness::Reuse(artifact) => {
                debug!(path = ?jar, "archive up to date, reusing");
                self.context.import_artifact_metadata(&artifact);
            }
            Freshness::Rebuild(reason) => {
                if reason == RebuildReason::Forced {
                    debug!("Building as fresh build explicitly requested.");
                } else {
                    debug!(path = ?jar, reason = %reason, "building archive");
                }
                hook_native = self.compile_and_package(&jar)?;
                self.stats.rebuild_reason = Some(reason);
            }
        }

        if self.context.native_image {
            let native_start = Instant::now();
            let image = image_name(&jar);
            if let Some(from) = hook_native {
                install_native_image(&from, &image)?;
                self.stats.native_built = true;
            } else if self.stats.rebuild_reason.is_some() || !image.exists() {
                self.build_native_image(&jar)?;
                self.stats.native_built = true;
            }
            self.stats.native_time = native_start.elapsed();
        }

        let mut artifact = Artifact::load(&jar)?;
        let image = image_name(&jar);
        if image.exists() {
            artifact.native_image = Some(image);
        }

        self.stats.total_time = build_start.elapsed();
        debug!(
            path = ?jar,
            rebuilt = self.stats.rebuild_reason.is_some(),
            total_ms = self.stats.total_time.as_millis() as u64,
            "build finished"
        );
        Ok(artifact)
    }

    /// Compile into `<jar>.tmp` and package; returns a hook-provided native binary
    fn compile_and_package(&mut self, jar: &Path) -> BuildResult<Option<PathBuf>> {
        let scratch = ScratchDir::create(self.source_set.compile_dir())?;

        let compile_start = Instant::now();
        let pipeline = CompilePipeline::new(&self.toolchain, self.config.shell);
        let integration =
            pipeline.compile(&mut self.source_set, &mut self.context, scratch.path())?;
        self.stats.compilation_time = compile_start.elapsed();

        let package_start = Instant::now();
        package(&self.source_set, &self.context, scratch.path(), jar)?;
        self.stats.packaging_time = package_start.elapsed();

        Ok(integration.native_image_path)
    }

    fn build_native_image(&mut self, jar: &Path) -> BuildResult<PathBuf> {
        let requested = self
            .context
            .java_version_or(&self.source_set)
            .map(str::to_string);
        let tool = resolve_native_image(
            self.config.native_home.as_deref(),
            self.toolchain.jdk.as_ref(),
            requested.as_deref(),
        );
        let class_path = self
            .context
            .resolve_class_path(&self.source_set, self.toolchain.resolver.as_ref())?
            .clone();

        info!("Building native image...");
        build_native(&tool, jar, &class_path, self.config.shell)
    }
}
