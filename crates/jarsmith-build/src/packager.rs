//! Archive packaging

use crate::context::BuildContext;
use crate::error::{BuildError, BuildResult};
use crate::escape::{escape_all, ShellDialect};
use crate::jdk::format_build_jdk;
use crate::manifest::{
    Manifest, ATTR_AGENT_CLASS, ATTR_BUILD_JDK, ATTR_CLASSPATH_DIGEST, ATTR_JAVA_OPTIONS,
    ATTR_MAIN_CLASS, ATTR_MANIFEST_VERSION, ATTR_PREMAIN_CLASS, MANIFEST_PATH,
};
use crate::source::SourceSet;
use std::fs::{self, File};
use std::io::{self, Write};
use std::path::{Component, Path};
use tempfile::NamedTempFile;
use tracing::debug;
use walkdir::WalkDir;
use zip::write::FileOptions;
use zip::{CompressionMethod, ZipWriter};

/// Manifest describing the archive built from `source_set`.
///
/// Fails when an attribute could not be read back from the written archive.
pub fn build_manifest(source_set: &SourceSet, context: &BuildContext) -> BuildResult<Manifest> {
    let mut manifest = Manifest::new();
    manifest.set(ATTR_MANIFEST_VERSION, "1.0");

    if let Some(main_class) = context.main_class_or(source_set) {
        manifest.set(ATTR_MAIN_CLASS, main_class);
    }
    for (key, value) in &source_set.manifest_attributes {
        manifest.set(key.as_str(), value.as_str());
    }
    if let Some(agent) = &source_set.agent_main_class {
        manifest.set(ATTR_AGENT_CLASS, agent.as_str());
    }
    if let Some(premain) = &source_set.pre_main_class {
        manifest.set(ATTR_PREMAIN_CLASS, premain.as_str());
    }

    if !source_set.runtime_options.is_empty() {
        let options = escape_all(&source_set.runtime_options, ShellDialect::Portable).join(" ");
        manifest.set(ATTR_JAVA_OPTIONS, options);
    }
    if context.build_jdk() > 0 {
        manifest.set(ATTR_BUILD_JDK, format_build_jdk(context.build_jdk()));
    }
    if let Some(class_path) = context.class_path() {
        manifest.set(ATTR_CLASSPATH_DIGEST, class_path.digest());
    }

    manifest
        .validate()
        .map_err(|e| BuildError::packaging(&source_set.jar_file, e))?;
    Ok(manifest)
}

/// Package `compiled_dir` plus its manifest into the archive at `target`.
///
/// The archive is written next to `target` and renamed over it once
/// complete, so a failure leaves any previous archive in place.
pub fn package(
    source_set: &SourceSet,
    context: &BuildContext,
    compiled_dir: &Path,
    target: &Path,
) -> BuildResult<()> {
    let manifest = build_manifest(source_set, context)?;
    let parent = match target.parent() {
        Some(p) if !p.as_os_str().is_empty() => p,
        _ => Path::new("."),
    };
    fs::create_dir_all(parent).map_err(|e| BuildError::io(parent, e))?;

    let mut temp = NamedTempFile::new_in(parent).map_err(|e| BuildError::io(parent, e))?;
    write_archive(temp.as_file_mut(), &manifest, compiled_dir)
        .map_err(|e| BuildError::packaging(target, e))?;
    temp.persist(target)
        .map_err(|e| BuildError::packaging(target, e.error))?;

    debug!(path = ?target, entries = manifest.len(), "packaged archive");
    Ok(())
}

fn write_archive(out: &mut File, manifest: &Manifest, compiled_dir: &Path) -> Result<(), String> {
    let mut zip = ZipWriter::new(out);
    let options = FileOptions::default().compression_method(CompressionMethod::Deflated);

    zip.add_directory("META-INF/", options)
        .map_err(|e| format!("Failed to add META-INF: {}", e))?;
    zip.start_file(MANIFEST_PATH, options)
        .map_err(|e| format!("Failed to start manifest: {}", e))?;
    zip.write_all(&manifest.to_bytes())
        .map_err(|e| format!("Failed to write manifest: {}", e))?;

    for entry in WalkDir::new(compiled_dir).sort_by_file_name() {
        let entry = entry.map_err(|e| format!("Failed to walk {}: {}", compiled_dir.display(), e))?;
        let Ok(relative) = entry.path().strip_prefix(compiled_dir) else {
            continue;
        };
        let name = entry_name(relative);
        if name.is_empty() || name == "META-INF" || name.eq_ignore_ascii_case(MANIFEST_PATH) {
            continue;
        }

        if entry.file_type().is_dir() {
            zip.add_directory(name.as_str(), options)
                .map_err(|e| format!("Failed to add directory {}: {}", name, e))?;
        } else {
            zip.start_file(name.as_str(), options)
                .map_err(|e| format!("Failed to start file {}: {}", name, e))?;
            let mut f = File::open(entry.path())
                .map_err(|e| format!("Failed to open {}: {}", entry.path().display(), e))?;
            io::copy(&mut f, &mut zip).map_err(|e| format!("Failed to write {}: {}", name, e))?;
        }
    }

    zip.finish()
        .map_err(|e| format!("Failed to finalize archive: {}", e))?;
    Ok(())
}

/// Archive entry name: `/`-separated, relative
fn entry_name(relative: &Path) -> String {
    relative
        .components()
        .filter_map(|c| match c {
            Component::Normal(part) => Some(part.to_string_lossy()),
            _ => None,
        })
        .collect::<Vec<_>>()
        .join("/")
}
