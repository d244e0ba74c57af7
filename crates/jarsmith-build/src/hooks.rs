//! Post-compile integration hooks

use crate::context::BuildContext;
use crate::error::BuildResult;
use crate::source::SourceSet;
use std::path::{Path, PathBuf};

/// What the hooks want changed about the build
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct IntegrationResult {
    /// Entry point overriding discovery
    pub main_class: Option<String>,
    /// Extra runtime options
    pub java_args: Vec<String>,
    /// Native binary the hook already produced
    pub native_image_path: Option<PathBuf>,
}

/// A post-compile step that may alter build metadata.
///
/// Hooks see `BuildContext::properties` as their configuration; the build
/// never changes process-wide state on their behalf.
pub trait IntegrationHooks {
    fn run(
        &self,
        source_set: &SourceSet,
        context: &BuildContext,
        compiled_dir: &Path,
        descriptor: Option<&Path>,
    ) -> BuildResult<IntegrationResult>;
}

/// No integrations installed
#[derive(Debug, Clone, Copy, Default)]
pub struct NoHooks;

impl IntegrationHooks for NoHooks {
    fn run(
        &self,
        _source_set: &SourceSet,
        _context: &BuildContext,
        _compiled_dir: &Path,
        _descriptor: Option<&Path>,
    ) -> BuildResult<IntegrationResult> {
        Ok(IntegrationResult::default())
    }
}

/// Runs several hooks in order and merges their results.
///
/// Later hooks win for the entry point and native binary; runtime options
/// accumulate. The first failing hook aborts the chain.
#[derive(Default)]
pub struct HookChain {
    hooks: Vec<Box<dyn IntegrationHooks>>,
}

impl HookChain {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_hook(mut self, hook: impl IntegrationHooks + 'static) -> Self {
        self.hooks.push(Box::new(hook));
        self
    }

    pub fn len(&self) -> usize {
        self.hooks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.hooks.is_empty()
    }
}

impl IntegrationHooks for HookChain {
    fn run(
        &self,
        source_set: &SourceSet,
        context: &BuildContext,
        compiled_dir: &Path,
        descriptor: Option<&Path>,
    ) -> BuildResult<IntegrationResult> {
        let mut merged = IntegrationResult::default();
        for hook in &self.hooks {
            let result = hook.run(source_set, context, compiled_dir, descriptor)?;
            if result.main_class.is_some() {
                merged.main_class = result.main_class;
            }
            if result.native_image_path.is_some() {
                merged.native_image_path = result.native_image_path;
            }
            merged.java_args.extend(result.java_args);
        }
        Ok(merged)
    }
}
