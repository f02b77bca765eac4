//! Compiler from a delimited code/name table to a Rust `match` fragment.
//!
//! The input is one entry per line, `<code><delimiter><name>[...]`, such as
//! a manufacturer code list. The output is a bare `match code { ... }`
//! expression with one arm per entry and a `_` fallback arm, meant to be
//! pasted into a hand-written lookup function.
//!
//! ```
//! use codetable::{parse, render, DuplicatePolicy, RenderOptions};
//! use std::path::Path;
//!
//! let input = "17\tAcme Corp\n5\tBolt \"Inc\"\n";
//! let parsed = parse(input.as_bytes(), Path::new("ids.txt"), '\t', DuplicatePolicy::Reject).unwrap();
//! let artifact = render(&parsed.table, &RenderOptions::default()).unwrap();
//! assert!(artifact.as_str().contains("5 => \"Bolt \\\"Inc\\\"\","));
//! ```

pub mod code;
pub mod config;
pub mod error;
pub mod io_utils;
pub mod render;
pub mod report;
pub mod table;

use std::fmt;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};

pub use code::{classify, CodeKey};
pub use config::{Config, DuplicatePolicy};
pub use error::CompileError;
pub use render::{escape, render, RenderOptions, RenderedArtifact};
pub use report::Summary;
pub use table::{parse, parse_file, Diagnostic, Entry, Parsed, SkipReason, Table};

/// Pipeline position of a [`Compiler`] run.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Stage {
    Idle,
    Parsing,
    Rendering,
    Writing,
    Done,
    Failed,
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Stage::Idle => "idle",
            Stage::Parsing => "parsing",
            Stage::Rendering => "rendering",
            Stage::Writing => "writing",
            Stage::Done => "done",
            Stage::Failed => "failed",
        };
        f.write_str(s)
    }
}

/// Where the rendered artifact goes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Sink {
    /// Atomically replace the file.
    File(PathBuf),
    /// Compare with the file and report whether it is current; never write.
    Check(PathBuf),
    /// Hand the artifact back to the caller.
    Memory,
}

/// Output of [`Compiler::run`].
#[derive(Debug, Clone)]
pub struct Compiled {
    pub summary: Summary,
    pub artifact: RenderedArtifact,
}

/// Drives one compilation through parse, render and write, stopping at the
/// first failing stage.
#[derive(Debug)]
pub struct Compiler {
    config: Config,
    stage: Stage,
}

impl Compiler {
    pub fn new(config: Config) -> Self {
        Self {
            config,
            stage: Stage::Idle,
        }
    }

    pub fn stage(&self) -> Stage {
        self.stage
    }

    fn enter(&mut self, stage: Stage) {
        log::debug!("stage {} -> {}", self.stage, stage);
        self.stage = stage;
    }

    /// Run every stage. On error the compiler is left in [`Stage::Failed`] and
    /// nothing has been written.
    pub fn run(&mut self, sink: &Sink) -> error::Result<Compiled> {
        match self.run_stages(sink) {
            Ok(out) => {
                self.enter(Stage::Done);
                Ok(out)
            }
            Err(e) => {
                self.enter(Stage::Failed);
                Err(e)
            }
        }
    }

    fn run_stages(&mut self, sink: &Sink) -> error::Result<Compiled> {
        self.config.validate()?;
        let input = self
            .config
            .input_path
            .clone()
            .ok_or_else(|| CompileError::Config("no input path given".into()))?;

        self.enter(Stage::Parsing);
        let parsed = parse_file(&input, self.config.delimiter, self.config.duplicate_policy)?;

        self.enter(Stage::Rendering);
        let artifact = render(&parsed.table, &RenderOptions::from(&self.config))?;

        let mut summary = Summary::new(parsed.table.len(), parsed.diagnostics, None);
        match sink {
            Sink::File(path) => {
                self.enter(Stage::Writing);
                write(&artifact, path)?;
                summary.output = Some(path.clone());
            }
            Sink::Check(path) => {
                summary.up_to_date = Some(is_up_to_date(&artifact, path)?);
            }
            Sink::Memory => {}
        }
        Ok(Compiled { summary, artifact })
    }
}

/// Parse, render and write according to `config.output_path`.
pub fn compile(config: Config) -> error::Result<Summary> {
    let output = config
        .output_path
        .clone()
        .ok_or_else(|| CompileError::Config("no output path given".into()))?;
    let compiled = Compiler::new(config).run(&Sink::File(output))?;
    log::debug!("{}", compiled.summary.describe());
    Ok(compiled.summary)
}

/// Atomically replace `destination` with `artifact`.
pub fn write(artifact: &RenderedArtifact, destination: &Path) -> error::Result<()> {
    io_utils::write_atomic(destination, artifact.as_bytes()).map_err(|source| {
        CompileError::OutputWriteFailure {
            path: destination.to_path_buf(),
            source,
        }
    })?;
    log::debug!("wrote {} bytes to {}", artifact.as_bytes().len(), destination.display());
    Ok(())
}

/// Whether `path` already holds exactly `artifact`. A missing file is stale.
pub fn is_up_to_date(artifact: &RenderedArtifact, path: &Path) -> error::Result<bool> {
    match fs::read(path) {
        Ok(existing) => Ok(existing == artifact.as_bytes()),
        Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(false),
        Err(source) => Err(CompileError::OutputUnreadable {
            path: path.to_path_buf(),
            source,
        }),
    }
}
