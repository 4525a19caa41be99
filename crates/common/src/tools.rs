//! Helpers for invoking the ffmpeg/ffprobe command line tools.

use crate::{ProcessingError, Result};
use std::ffi::OsStr;
use std::process::{Command, Output};
use tracing::debug;

/// Run an external tool to completion and return its output.
///
/// A missing binary and a non-zero exit status both map to
/// [`ProcessingError::FFmpegError`], carrying stderr for diagnostics.
pub fn run_tool<I, S>(program: &str, args: I) -> Result<Output>
where
    I: IntoIterator<Item = S>,
    S: AsRef<OsStr>,
{
    let mut command = Command::new(program);
    command.args(args);
    debug!("Running {:?}", command);

    let output = command.output().map_err(|e| {
        if e.kind() == std::io::ErrorKind::NotFound {
            ProcessingError::FFmpegError(format!("{program} not found in PATH"))
        } else {
            ProcessingError::FFmpegError(format!("failed to run {program}: {e}"))
        }
    })?;

    if !output.status.success() {
        let stderr = String::from_utf8_lossy(&output.stderr);
        return Err(ProcessingError::FFmpegError(format!(
            "{program} exited with {}: {}",
            output.status,
            stderr.trim()
        )));
    }

    Ok(output)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_missing_program_reports_ffmpeg_error() {
        let err = run_tool("definitely-not-a-real-tool-7f3a", ["-version"]).unwrap_err();
        match err {
            ProcessingError::FFmpegError(msg) => assert!(msg.contains("not found")),
            other => panic!("unexpected error: {other:?}"),
        }
    }
}
