//! Run summaries and the skipped-line CSV report.

use std::path::{Path, PathBuf};

use serde::Serialize;

use crate::table::Diagnostic;

/// Outcome of a successful compilation.
#[derive(Debug, Clone, Serialize)]
pub struct Summary {
    /// Number of match arms generated, excluding the fallback.
    pub entries: usize,
    /// Number of source lines that did not become arms.
    pub skipped: usize,
    pub skipped_lines: Vec<usize>,
    /// Where the artifact went; `None` when printed to stdout or checked.
    pub output: Option<PathBuf>,
    /// Whether `--check` found the destination up to date.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub up_to_date: Option<bool>,
    #[serde(skip)]
    pub diagnostics: Vec<Diagnostic>,
}

impl Summary {
    pub fn new(entries: usize, diagnostics: Vec<Diagnostic>, output: Option<PathBuf>) -> Self {
        Self {
            entries,
            skipped: diagnostics.len(),
            skipped_lines: diagnostics.iter().map(|d| d.line).collect(),
            output,
            up_to_date: None,
            diagnostics,
        }
    }

    /// One-line human summary.
    pub fn describe(&self) -> String {
        let mut msg = format!("compiled {} entries", self.entries);
        if self.skipped > 0 {
            let lines: Vec<String> = self.skipped_lines.iter().map(|l| l.to_string()).collect();
            msg.push_str(&format!(
                ", skipped {} line(s): {}",
                self.skipped,
                lines.join(", ")
            ));
        } else {
            msg.push_str(", skipped 0 lines");
        }
        if let Some(out) = &self.output {
            msg.push_str(&format!(" -> {}", out.display()));
        }
        msg
    }
}

#[derive(Serialize)]
struct Row<'a> {
    line: usize,
    reason: String,
    content: &'a str,
}

/// Write diagnostics as CSV with header `line,reason,content`.
pub fn write_skipped_csv<W: std::io::Write>(w: W, diagnostics: &[Diagnostic]) -> csv::Result<()> {
    let mut wtr = csv::Writer::from_writer(w);
    for d in diagnostics {
        wtr.serialize(Row {
            line: d.line,
            reason: d.reason.to_string(),
            content: &d.content,
        })?;
    }
    wtr.flush()?;
    Ok(())
}

/// [`write_skipped_csv`] to a file path.
pub fn write_skipped_report(path: &Path, diagnostics: &[Diagnostic]) -> csv::Result<()> {
    let file = std::fs::File::create(path)?;
    write_skipped_csv(file, diagnostics)
}
