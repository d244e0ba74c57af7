//! Jarsmith build core
//!
//! Turns a set of JVM sources into a runnable archive, reusing the previous
//! archive whenever it is still fresh:
//! - Freshness check against the archive's recorded metadata
//! - Compilation through an external compiler, resources and descriptor
//! - Entry-point discovery over the compiled classes
//! - Packaging with a manifest that records what the next run needs
//! - Optional ahead-of-time native image
//! - Argument escaping for POSIX, cmd, PowerShell and persisted metadata
//!
//! # Example
//!
//! ```no_run
//! use jarsmith_build::{Builder, SourceSet};
//!
//! let source_set = SourceSet::new("/tmp/cache/hello.jar").with_main_source("hello.java");
//! let artifact = Builder::new(source_set).build().unwrap();
//! println!("main class: {:?}", artifact.main_class);
//! ```

pub mod artifact;
pub mod builder;
pub mod classfile;
pub mod compile;
pub mod context;
pub mod descriptor;
pub mod discovery;
pub mod error;
pub mod escape;
pub mod freshness;
pub mod hooks;
pub mod jdk;
pub mod manifest;
pub mod native;
pub mod packager;
pub mod process;
pub mod resolver;
pub mod source;
pub mod template;
pub mod toolchain;

// Re-export main types
pub use artifact::Artifact;
pub use builder::{BuildConfig, BuildStats, Builder};
pub use classfile::{BytecodeIndexer, ClassFileIndexer, ClassInfo, MethodInfo};
pub use compile::CompilePipeline;
pub use context::BuildContext;
pub use descriptor::{generate_descriptor, Coordinate};
pub use discovery::{discover_entry_points, EntryPoints};
pub use error::{BuildError, BuildResult, BuildWarning};
pub use escape::{command_line, escape, escape_all, split_portable, ShellDialect};
pub use freshness::{check_freshness, Freshness, RebuildReason};
pub use hooks::{HookChain, IntegrationHooks, IntegrationResult, NoHooks};
pub use jdk::{parse_java_version, JavaHome, JdkProvider, DEFAULT_JAVA_VERSION};
pub use manifest::Manifest;
pub use native::{build_native, image_name, install_native_image, resolve_native_image};
pub use packager::{build_manifest, package};
pub use resolver::{ClassPath, DependencyResolver, ResolvedArtifact, StaticClassPath};
pub use source::{ResourceRef, SourceLanguage, SourceSet};
pub use template::{MapTemplateEngine, TemplateEngine};
pub use toolchain::Toolchain;
