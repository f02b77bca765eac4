//! Parsing of the delimited source table into an ordered, duplicate-free
//! [`Table`].

use std::collections::HashMap;
use std::fmt;
use std::fs::File;
use std::io::{self, BufRead, BufReader};
use std::path::Path;

use serde::Serialize;

use crate::code::{classify, is_valid_code, CodeKey};
use crate::config::DuplicatePolicy;
use crate::error::{CompileError, Result};

/// One `(code, name)` pair taken from the input.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Entry {
    /// Literal pattern token, e.g. `42` or `0x1F`.
    pub code: String,
    /// Display name, unescaped.
    pub name: String,
    /// 1-based source line.
    pub line: usize,
}

/// Why a source line did not become an entry.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "kebab-case", tag = "kind")]
pub enum SkipReason {
    Blank,
    MissingField,
    EmptyCode,
    InvalidCode,
    EmptyName,
    /// Dropped by a keep-first/keep-last policy in favour of `kept_line`.
    Duplicate { kept_line: usize },
}

impl fmt::Display for SkipReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SkipReason::Blank => f.write_str("blank line"),
            SkipReason::MissingField => f.write_str("missing name field"),
            SkipReason::EmptyCode => f.write_str("empty code"),
            SkipReason::InvalidCode => f.write_str("code is not a literal pattern"),
            SkipReason::EmptyName => f.write_str("empty name"),
            SkipReason::Duplicate { kept_line } => {
                write!(f, "duplicate code, kept line {kept_line}")
            }
        }
    }
}

/// A skipped line, reported back to the caller instead of being printed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Diagnostic {
    pub line: usize,
    pub reason: SkipReason,
    /// Raw line text without its terminator.
    pub content: String,
}

/// Ordered entries with unique codes.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Table {
    entries: Vec<Entry>,
}

/// Result of [`parse`]: the table plus every skipped line.
#[derive(Debug, Clone, Default)]
pub struct Parsed {
    pub table: Table,
    pub diagnostics: Vec<Diagnostic>,
}

impl Table {
    /// Build a table from entries, applying `policy` to repeated codes.
    ///
    /// Codes are compared by [`CodeKey`], so `42` and `0x2A` collide.
    /// Entries dropped under `KeepFirst`/`KeepLast` are returned as
    /// diagnostics, in source order. `source` names the input in errors.
    pub fn resolve_duplicates(
        entries: Vec<Entry>,
        policy: DuplicatePolicy,
        source: &Path,
    ) -> Result<(Table, Vec<Diagnostic>)> {
        let mut dropped = Vec::new();
        let kept = match policy {
            DuplicatePolicy::Reject => {
                let mut seen: HashMap<CodeKey, usize> = HashMap::new();
                for e in &entries {
                    if let Some(&first_line) = seen.get(&e.key()) {
                        return Err(CompileError::DuplicateCode {
                            path: source.to_path_buf(),
                            code: e.code.clone(),
                            first_line,
                            line: e.line,
                        });
                    }
                    seen.insert(e.key(), e.line);
                }
                entries
            }
            DuplicatePolicy::KeepFirst => {
                let mut seen: HashMap<CodeKey, usize> = HashMap::new();
                let mut kept = Vec::with_capacity(entries.len());
                for e in entries {
                    match seen.get(&e.key()) {
                        Some(&kept_line) => dropped.push(duplicate(&e, kept_line)),
                        None => {
                            seen.insert(e.key(), e.line);
                            kept.push(e);
                        }
                    }
                }
                kept
            }
            DuplicatePolicy::KeepLast => {
                // later lines overwrite earlier ones
                let last: HashMap<CodeKey, usize> =
                    entries.iter().map(|e| (e.key(), e.line)).collect();
                let mut kept = Vec::with_capacity(last.len());
                for e in entries {
                    let kept_line = last[&e.key()];
                    if kept_line == e.line {
                        kept.push(e);
                    } else {
                        dropped.push(duplicate(&e, kept_line));
                    }
                }
                kept
            }
        };
        for d in &dropped {
            log::debug!("line {}: {}", d.line, d.reason);
        }
        Ok((Table { entries: kept }, dropped))
    }

    pub fn entries(&self) -> &[Entry] {
        &self.entries
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Look up a name the way the generated fragment would, so any spelling
    /// of an integer code finds its entry.
    pub fn get(&self, code: &str) -> Option<&str> {
        let key = classify(code)?;
        self.entries
            .iter()
            .find(|e| e.key() == key)
            .map(|e| e.name.as_str())
    }
}

impl Entry {
    /// Duplicate-detection key. Tokens that do not classify (only possible
    /// for hand-built entries) fall back to their trimmed text.
    pub fn key(&self) -> CodeKey {
        classify(&self.code).unwrap_or_else(|| CodeKey::Path(self.code.trim().to_string()))
    }
}

fn duplicate(e: &Entry, kept_line: usize) -> Diagnostic {
    Diagnostic {
        line: e.line,
        reason: SkipReason::Duplicate { kept_line },
        content: format!("{}\t{}", e.code, e.name),
    }
}

/// Classify one line. `Ok` is an entry, `Err` is the reason to skip it.
fn parse_line(line: &str, delimiter: char) -> std::result::Result<(String, String), SkipReason> {
    if line.trim().is_empty() {
        return Err(SkipReason::Blank);
    }
    let mut fields = line.split(delimiter);
    let code = fields.next().unwrap_or_default().trim();
    let name = match fields.next() {
        Some(n) => n.trim(),
        None => return Err(SkipReason::MissingField),
    };
    if code.is_empty() {
        return Err(SkipReason::EmptyCode);
    }
    if !is_valid_code(code) {
        return Err(SkipReason::InvalidCode);
    }
    if name.is_empty() {
        return Err(SkipReason::EmptyName);
    }
    Ok((code.to_string(), name.to_string()))
}

/// Parse the table from a reader. Fails only if reading itself fails; bad
/// lines are skipped and reported in [`Parsed::diagnostics`].
///
/// `source` names the input in errors.
pub fn parse<R: BufRead>(
    reader: R,
    source: &Path,
    delimiter: char,
    policy: DuplicatePolicy,
) -> Result<Parsed> {
    let mut entries = Vec::new();
    let mut diagnostics = Vec::new();

    for (idx, line) in reader.lines().enumerate() {
        let line_no = idx + 1;
        let line = line.map_err(|e| CompileError::InputUnreadable {
            path: source.to_path_buf(),
            line: Some(line_no),
            source: e,
        })?;
        match parse_line(&line, delimiter) {
            Ok((code, name)) => {
                log::trace!("line {line_no}: {code} => {name}");
                entries.push(Entry {
                    code,
                    name,
                    line: line_no,
                });
            }
            Err(reason) => {
                log::debug!("line {line_no}: skipped, {reason}");
                diagnostics.push(Diagnostic {
                    line: line_no,
                    reason,
                    content: line,
                });
            }
        }
    }

    let (table, dropped) = Table::resolve_duplicates(entries, policy, source)?;
    diagnostics.extend(dropped);
    diagnostics.sort_by_key(|d| d.line);
    Ok(Parsed { table, diagnostics })
}

/// Open `path` and [`parse`] it.
pub fn parse_file<P: AsRef<Path>>(
    path: P,
    delimiter: char,
    policy: DuplicatePolicy,
) -> Result<Parsed> {
    let path = path.as_ref();
    let file = File::open(path).map_err(|e| match e.kind() {
        io::ErrorKind::NotFound => CompileError::InputNotFound {
            path: path.to_path_buf(),
        },
        _ => CompileError::InputUnreadable {
            path: path.to_path_buf(),
            line: None,
            source: e,
        },
    })?;
    log::debug!("parsing {}", path.display());
    parse(BufReader::new(file), path, delimiter, policy)
}
