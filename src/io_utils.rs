use std::fmt;
use std::io::{self, Write};
use std::path::Path;

use tempfile::NamedTempFile;

use crate::error::CompileError;

/// Error shown to the user by the `codetable` binary: a finished message
/// plus the underlying cause, if any.
#[derive(Debug)]
pub struct CliError {
    pub msg: String,
    pub source: Option<Box<dyn std::error::Error + Send + Sync>>,
}

impl CliError {
    /// Error without an underlying cause.
    pub fn msg(msg: impl Into<String>) -> Self {
        Self {
            msg: msg.into(),
            source: None,
        }
    }

    /// I/O failure on `path` while doing `action` ("reading", "writing").
    pub fn io(action: &str, path: &Path, err: io::Error) -> Self {
        Self {
            msg: describe_io_error(action, path, &err),
            source: Some(Box::new(err)),
        }
    }
}

impl fmt::Display for CliError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.msg)
    }
}

impl std::error::Error for CliError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        self.source
            .as_deref()
            .map(|e| e as &(dyn std::error::Error + 'static))
    }
}

impl From<CompileError> for CliError {
    fn from(err: CompileError) -> Self {
        Self {
            msg: cli_hint(&err),
            source: Some(Box::new(err)),
        }
    }
}

// ENOSPC on Linux and macOS.
const NO_SPACE: i32 = 28;

/// What the user can do about an I/O error on a table or fragment file.
fn io_advice(err: &io::Error) -> &'static str {
    match err.kind() {
        io::ErrorKind::NotFound => "Make sure the path names an existing file.",
        io::ErrorKind::PermissionDenied => "The current user may not access this path.",
        io::ErrorKind::InvalidData => "Tables must be UTF-8 text.",
        io::ErrorKind::WriteZero => "The target device accepted no data; is it full?",
        _ if err.raw_os_error() == Some(NO_SPACE) => "The target device is out of space.",
        _ => "Check the path and retry.",
    }
}

/// One-line description of an I/O failure, ending in advice.
pub fn describe_io_error(action: &str, path: &Path, err: &io::Error) -> String {
    format!("Failed {action} '{}': {err}. {}", path.display(), io_advice(err))
}

/// Return an actionable message for a compiler error variant.
pub fn cli_hint(err: &CompileError) -> String {
    use CompileError::*;
    match err {
        InputNotFound { path } => format!(
            "Input table '{}' not found. Make sure the path names an existing file.",
            path.display()
        ),
        InputUnreadable {
            path,
            line: Some(line),
            source,
        } => format!(
            "{} (stopped at line {line})",
            describe_io_error("reading", path, source)
        ),
        InputUnreadable {
            path,
            line: None,
            source,
        } => describe_io_error("reading", path, source),
        DuplicateCode { .. } => format!(
            "{err}. Remove one of the lines or pass --duplicates keep-first|keep-last."
        ),
        Render(msg) => format!("{msg}. This is a bug."),
        OutputWriteFailure { path, source } => format!(
            "{} The previous file was left untouched.",
            describe_io_error("writing", path, source)
        ),
        OutputUnreadable { path, source } => format!(
            "{} Cannot compare against it in --check mode.",
            describe_io_error("reading existing output", path, source)
        ),
        Config(msg) => format!("{msg}. Invalid configuration."),
    }
}

/// Replace `path` with `data` so that readers see either the old contents or
/// the new ones, never a partial write.
///
/// The data goes to a temporary file in the same directory, is synced, and is
/// then renamed over `path`. On failure the temporary file is removed when it
/// drops.
pub fn write_atomic(path: &Path, data: &[u8]) -> io::Result<()> {
    let dir = match path.parent() {
        Some(p) if !p.as_os_str().is_empty() => p,
        _ => Path::new("."),
    };
    let mut tmp = NamedTempFile::new_in(dir)?;
    tmp.write_all(data)?;
    tmp.as_file().sync_all()?;
    tmp.persist(path).map_err(|e| e.error)?;
    Ok(())
}
