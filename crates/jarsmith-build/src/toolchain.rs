//! Collaborators the build calls out to

use crate::classfile::{BytecodeIndexer, ClassFileIndexer};
use crate::hooks::{IntegrationHooks, NoHooks};
use crate::jdk::{JavaHome, JdkProvider};
use crate::resolver::{DependencyResolver, StaticClassPath};
use crate::template::{MapTemplateEngine, TemplateEngine};
use jarsmith_config::Config;

/// JDK lookup, dependency resolution, class indexing, integrations and templates
pub struct Toolchain {
    pub jdk: Box<dyn JdkProvider>,
    pub resolver: Box<dyn DependencyResolver>,
    pub indexer: Box<dyn BytecodeIndexer>,
    pub hooks: Box<dyn IntegrationHooks>,
    pub templates: Box<dyn TemplateEngine>,
}

impl Toolchain {
    /// Toolchain around `jdk` with the built-in defaults for everything else
    pub fn new(jdk: impl JdkProvider + 'static) -> Self {
        Self {
            jdk: Box::new(jdk),
            resolver: Box::new(StaticClassPath::default()),
            indexer: Box::new(ClassFileIndexer),
            hooks: Box::new(NoHooks),
            templates: Box::new(MapTemplateEngine::with_builtin()),
        }
    }

    /// Defaults with the JDK taken from the merged configuration
    pub fn from_config(config: &Config) -> Self {
        Self::new(JavaHome::from_config(config))
    }

    pub fn with_resolver(mut self, resolver: impl DependencyResolver + 'static) -> Self {
        self.resolver = Box::new(resolver);
        self
    }

    pub fn with_indexer(mut self, indexer: impl BytecodeIndexer + 'static) -> Self {
        self.indexer = Box::new(indexer);
        self
    }

    pub fn with_hooks(mut self, hooks: impl IntegrationHooks + 'static) -> Self {
        self.hooks = Box::new(hooks);
        self
    }

    pub fn with_templates(mut self, templates: impl TemplateEngine + 'static) -> Self {
        self.templates = Box::new(templates);
        self
    }
}

impl Default for Toolchain {
    fn default() -> Self {
        Self::new(JavaHome::default())
    }
}

impl std::fmt::Debug for Toolchain {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Toolchain")
            .field("default_version", &self.jdk.default_version())
            .finish_non_exhaustive()
    }
}
