//! Running external build tools

use crate::error::{BuildError, BuildResult};
use crate::escape::{command_line, ShellDialect};
use std::fs::File;
use std::io::ErrorKind;
use std::path::Path;
use std::process::{Command, Stdio};
use std::time::{Duration, Instant};
use tracing::debug;

/// Which stage a tool runs for; decides how its failures are reported
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ToolStage {
    Compile,
    NativeImage,
}

impl ToolStage {
    fn failure(&self, tool: &str, message: String) -> BuildError {
        match self {
            Self::Compile => BuildError::compile(tool, message),
            Self::NativeImage => BuildError::native_build(message),
        }
    }
}

/// Run `program` to completion and fail unless it exits zero.
///
/// Standard streams are inherited. With `log_file` set, standard output is
/// appended to that file instead. There is no timeout and no retry.
pub fn run_tool(
    stage: ToolStage,
    program: &Path,
    args: &[String],
    dialect: ShellDialect,
    log_file: Option<&Path>,
) -> BuildResult<Duration> {
    let tool = program
        .file_name()
        .map(|n| n.to_string_lossy().to_string())
        .unwrap_or_else(|| program.display().to_string());

    let mut line = vec![program.display().to_string()];
    line.extend(args.iter().cloned());
    debug!(tool = %tool, "{}", command_line(&line, dialect));

    let mut command = Command::new(program);
    command.args(args);
    if let Some(log) = log_file {
        let out = File::options()
            .create(true)
            .append(true)
            .open(log)
            .map_err(|e| BuildError::io(log, e))?;
        command.stdout(Stdio::from(out));
    }

    let start = Instant::now();
    let mut child = command
        .spawn()
        .map_err(|e| stage.failure(&tool, format!("failed to start {}: {}", program.display(), e)))?;

    let status = match child.wait() {
        Ok(status) => status,
        Err(e) if e.kind() == ErrorKind::Interrupted => {
            return Err(BuildError::Interrupted { tool });
        }
        Err(e) => return Err(stage.failure(&tool, e.to_string())),
    };

    match status.code() {
        Some(0) => Ok(start.elapsed()),
        Some(code) => Err(stage.failure(&tool, format!("exit code {}", code))),
        None => Err(BuildError::Interrupted { tool }),
    }
}
