//! Ahead-of-time native image stage

use crate::error::{BuildError, BuildResult};
use crate::escape::ShellDialect;
use crate::jdk::{find_in_bin, JdkProvider};
use crate::process::{run_tool, ToolStage};
use crate::resolver::ClassPath;
use std::ffi::OsString;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::{debug, info};

/// Name of the ahead-of-time compiler executable
pub const NATIVE_IMAGE_TOOL: &str = "native-image";

/// Native binary location for `jar`: `<jar>.exe` on Windows, `<jar>.bin` elsewhere
pub fn image_name(jar: &Path) -> PathBuf {
    let suffix = if cfg!(windows) { ".exe" } else { ".bin" };
    let mut name = OsString::from(jar.as_os_str());
    name.push(suffix);
    PathBuf::from(name)
}

/// Find `native-image`: the configured installation first, then next to the JDK
pub fn resolve_native_image(
    native_home: Option<&Path>,
    jdk: &dyn JdkProvider,
    requested_version: Option<&str>,
) -> PathBuf {
    native_home
        .and_then(|home| find_in_bin(home, NATIVE_IMAGE_TOOL))
        .unwrap_or_else(|| jdk.resolve_tool(NATIVE_IMAGE_TOOL, requested_version))
}

/// Compile `jar` into a native binary with `tool`.
///
/// Tool output goes to a kept temporary log whose location is reported
/// whether or not the tool succeeds.
pub fn build_native(
    tool: &Path,
    jar: &Path,
    class_path: &ClassPath,
    dialect: ShellDialect,
) -> BuildResult<PathBuf> {
    let image = image_name(jar);

    let mut args = vec![
        "-H:+ReportExceptionStackTraces".to_string(),
        "--enable-https".to_string(),
    ];
    if !class_path.is_blank() {
        args.push(format!("--class-path={}", class_path.class_path));
    }
    args.push("-jar".to_string());
    args.push(jar.display().to_string());
    args.push(image.display().to_string());

    let log = tempfile::Builder::new()
        .prefix("jarsmith")
        .suffix(NATIVE_IMAGE_TOOL)
        .tempfile()
        .map_err(|e| BuildError::native_build(format!("cannot create log file: {}", e)))?
        .into_temp_path()
        .keep()
        .map_err(|e| BuildError::native_build(format!("cannot keep log file: {}", e)))?;

    let result = run_tool(ToolStage::NativeImage, tool, &args, dialect, Some(&log));
    info!("log: {}", log.display());
    result?;

    Ok(image)
}

/// Move a binary produced elsewhere (e.g. by an integration) into place
pub fn install_native_image(from: &Path, to: &Path) -> BuildResult<()> {
    if from == to {
        return Ok(());
    }
    if fs::rename(from, to).is_ok() {
        debug!(from = ?from, to = ?to, "moved native image");
        return Ok(());
    }
    fs::copy(from, to).map_err(|e| BuildError::io(to, e))?;
    fs::remove_file(from).map_err(|e| BuildError::io(from, e))?;
    debug!(from = ?from, to = ?to, "copied native image");
    Ok(())
}
