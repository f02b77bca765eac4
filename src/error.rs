use std::path::PathBuf;

use thiserror::Error;

#[derive(Error, Debug)]
pub enum CompileError {
    /// The input table does not exist.
    #[error("input file '{}' not found", path.display())]
    InputNotFound { path: PathBuf },

    /// The input table exists but could not be opened or read to the end.
    #[error("cannot read input '{}'{}: {source}", path.display(), line_suffix(*line))]
    InputUnreadable {
        path: PathBuf,
        /// Line at which reading stopped, if any line was reached.
        line: Option<usize>,
        #[source]
        source: std::io::Error,
    },

    /// A code appeared twice under the `reject` duplicate policy.
    #[error(
        "duplicate code '{code}' in '{}' on line {line} (first defined on line {first_line})",
        path.display()
    )]
    DuplicateCode {
        path: PathBuf,
        code: String,
        first_line: usize,
        line: usize,
    },

    /// Rendering hit an entry that cannot be expressed as a match arm.
    #[error("render error: {0}")]
    Render(String),

    /// The artifact could not be written to its destination.
    #[error("cannot write output '{}': {source}", path.display())]
    OutputWriteFailure {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// The existing artifact could not be read for comparison.
    #[error("cannot read existing output '{}': {source}", path.display())]
    OutputUnreadable {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Configuration error.
    #[error("config error: {0}")]
    Config(String),
}

fn line_suffix(line: Option<usize>) -> String {
    match line {
        Some(n) => format!(" at line {n}"),
        None => String::new(),
    }
}

pub type Result<T> = std::result::Result<T, CompileError>;
