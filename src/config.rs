use std::fs;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::error::{CompileError, Result};

/// Fallback text emitted for codes missing from the table.
pub const DEFAULT_FALLBACK: &str = "Unknown company code";
/// Field separator of the input table.
pub const DEFAULT_DELIMITER: char = '\t';
/// Spaces per indentation level in the rendered fragment.
pub const DEFAULT_INDENT: usize = 4;
/// Name of the variable the generated `match` inspects.
pub const DEFAULT_SCRUTINEE: &str = "code";

/// What to do when a code appears on more than one line.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "kebab-case")]
pub enum DuplicatePolicy {
    /// Abort with [`CompileError::DuplicateCode`].
    #[default]
    Reject,
    /// Keep the earliest line for each code.
    KeepFirst,
    /// Keep the latest line for each code.
    KeepLast,
}

/// Runtime configuration for a single compilation.
///
/// Loaded from an optional JSON file and then overridden field by field from
/// the command line.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct Config {
    /// Source table location.
    pub input_path: Option<PathBuf>,
    /// Destination of the rendered fragment.
    pub output_path: Option<PathBuf>,
    /// Field separator.
    pub delimiter: char,
    /// String produced for unmatched codes.
    pub fallback_text: String,
    pub duplicate_policy: DuplicatePolicy,
    /// Spaces per indentation level.
    pub indent: usize,
    pub scrutinee: String,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            input_path: None,
            output_path: None,
            delimiter: DEFAULT_DELIMITER,
            fallback_text: DEFAULT_FALLBACK.to_string(),
            duplicate_policy: DuplicatePolicy::default(),
            indent: DEFAULT_INDENT,
            scrutinee: DEFAULT_SCRUTINEE.to_string(),
        }
    }
}

impl Config {
    /// Read a JSON configuration file. Missing fields take their defaults.
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let text = fs::read_to_string(path).map_err(|e| {
            CompileError::Config(format!("cannot read '{}': {e}", path.display()))
        })?;
        let config: Config = serde_json::from_str(&text).map_err(|e| {
            CompileError::Config(format!("invalid config '{}': {e}", path.display()))
        })?;
        log::debug!("loaded config from {}", path.display());
        config.validate()?;
        Ok(config)
    }

    /// Reject settings that would make the input ambiguous or the output
    /// unparseable.
    pub fn validate(&self) -> Result<()> {
        if self.delimiter == '\n' || self.delimiter == '\r' {
            return Err(CompileError::Config(
                "delimiter cannot be a line terminator".into(),
            ));
        }
        if self.delimiter.is_whitespace() && self.delimiter != '\t' && self.delimiter != ' ' {
            return Err(CompileError::Config(format!(
                "unsupported whitespace delimiter {:?}",
                self.delimiter
            )));
        }
        if !crate::render::is_identifier(&self.scrutinee) {
            return Err(CompileError::Config(format!(
                "scrutinee '{}' is not a valid identifier",
                self.scrutinee
            )));
        }
        Ok(())
    }
}

/// Parse a delimiter given on the command line.
///
/// Accepts a single character or one of the spellings `\t`, `tab`, `space`.
pub fn parse_delimiter(s: &str) -> std::result::Result<char, String> {
    match s {
        "\\t" | "tab" | "TAB" => return Ok('\t'),
        "space" => return Ok(' '),
        _ => {}
    }
    let mut chars = s.chars();
    match (chars.next(), chars.next()) {
        (Some(c), None) => Ok(c),
        _ => Err(format!("delimiter must be a single character, got '{s}'")),
    }
}
