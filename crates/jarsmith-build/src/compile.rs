//! Compile stage: compiler run, resources, descriptor, integrations, entry points

use crate::context::BuildContext;
use crate::descriptor::generate_descriptor;
use crate::discovery::discover_entry_points;
use crate::error::{BuildError, BuildResult, BuildWarning};
use crate::escape::ShellDialect;
use crate::hooks::IntegrationResult;
use crate::process::{run_tool, ToolStage};
use crate::source::SourceSet;
use crate::toolchain::Toolchain;
use std::fs;
use std::path::Path;
use tracing::{debug, info};

/// Compiles a source set into a directory of classes
pub struct CompilePipeline<'a> {
    toolchain: &'a Toolchain,
    dialect: ShellDialect,
}

impl<'a> CompilePipeline<'a> {
    pub fn new(toolchain: &'a Toolchain, dialect: ShellDialect) -> Self {
        Self { toolchain, dialect }
    }

    /// Compile `source_set` into `compiled_dir`.
    ///
    /// Records the build JDK on the context and the discovered entry points
    /// on the source set. Fails if the compiler does not exit zero.
    pub fn compile(
        &self,
        source_set: &mut SourceSet,
        context: &mut BuildContext,
        compiled_dir: &Path,
    ) -> BuildResult<IntegrationResult> {
        let requested = context.java_version_or(source_set).map(str::to_string);
        let class_path = context
            .resolve_class_path(source_set, self.toolchain.resolver.as_ref())?
            .clone();
        let compiler = self
            .toolchain
            .jdk
            .resolve_tool(source_set.language.compiler_tool(), requested.as_deref());

        let out_dir = if compiled_dir.is_absolute() {
            compiled_dir.to_path_buf()
        } else {
            std::env::current_dir()?.join(compiled_dir)
        };
        let mut args = source_set.compile_options.clone();
        if !class_path.is_blank() {
            args.push("-classpath".to_string());
            args.push(class_path.class_path.clone());
        }
        args.push("-d".to_string());
        args.push(out_dir.display().to_string());
        args.extend(source_set.sources.iter().map(|s| s.display().to_string()));

        copy_resources(source_set, compiled_dir)?;
        let descriptor = generate_descriptor(
            source_set,
            context,
            &class_path,
            self.toolchain.templates.as_ref(),
            compiled_dir,
        );

        if source_set.agent {
            info!("Building javaagent...");
        } else {
            info!("Building jar...");
        }
        let elapsed = run_tool(ToolStage::Compile, &compiler, &args, self.dialect, None)?;
        debug!(elapsed_ms = elapsed.as_millis() as u64, "compiler finished");

        context.set_build_jdk(self.toolchain.jdk.version_for(requested.as_deref()));

        let result =
            self.toolchain
                .hooks
                .run(source_set, context, compiled_dir, descriptor.as_deref())?;

        // an explicitly configured entry point is never replaced
        let mut want_main = context.main_class_or(source_set).is_none();
        if want_main {
            if let Some(main_class) = &result.main_class {
                context.main_class = Some(main_class.clone());
                want_main = false;
            }
        }
        if want_main || source_set.agent {
            self.discover(source_set, context, compiled_dir, want_main)?;
        }

        source_set.add_runtime_options(result.java_args.iter().cloned());
        Ok(result)
    }

    fn discover(
        &self,
        source_set: &mut SourceSet,
        context: &mut BuildContext,
        compiled_dir: &Path,
        want_main: bool,
    ) -> BuildResult<()> {
        let suggested = source_set.suggested_main();
        let found = discover_entry_points(
            compiled_dir,
            self.toolchain.indexer.as_ref(),
            suggested.as_deref(),
            source_set.agent,
        )?;

        if want_main {
            if found.is_ambiguous() {
                if let Some(chosen) = &found.main_class {
                    context.warn(BuildWarning::AmbiguousEntryPoint {
                        chosen: chosen.clone(),
                        candidates: found.candidates.clone(),
                    });
                }
            }
            source_set.main_class = found.main_class;
        }
        if source_set.agent {
            source_set.agent_main_class = found.agent_main_class;
            source_set.pre_main_class = found.pre_main_class;
        }
        Ok(())
    }
}

/// Copy declared resources into the compiled tree unmodified
fn copy_resources(source_set: &SourceSet, compiled_dir: &Path) -> BuildResult<()> {
    for resource in &source_set.resources {
        let target = compiled_dir.join(&resource.target);
        if let Some(parent) = target.parent() {
            fs::create_dir_all(parent).map_err(|e| BuildError::io(parent, e))?;
        }
        fs::copy(&resource.source, &target).map_err(|e| BuildError::io(&resource.source, e))?;
        debug!(from = ?resource.source, to = ?target, "copied resource");
    }
    Ok(())
}
