//! Rendering of a [`Table`] as a Rust `match` fragment.

use std::fmt::Write as _;

use crate::code::is_valid_code;
use crate::config::{Config, DEFAULT_FALLBACK, DEFAULT_INDENT, DEFAULT_SCRUTINEE};
use crate::error::{CompileError, Result};
use crate::table::Table;

/// Options controlling the shape of the generated fragment.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RenderOptions {
    /// Text produced by the `_` arm.
    pub fallback: String,
    /// Spaces per indentation level. The `match` line gets one level, arms two.
    pub indent: usize,
    /// Variable matched on.
    pub scrutinee: String,
}

impl Default for RenderOptions {
    fn default() -> Self {
        Self {
            fallback: DEFAULT_FALLBACK.to_string(),
            indent: DEFAULT_INDENT,
            scrutinee: DEFAULT_SCRUTINEE.to_string(),
        }
    }
}

impl From<&Config> for RenderOptions {
    fn from(cfg: &Config) -> Self {
        Self {
            fallback: cfg.fallback_text.clone(),
            indent: cfg.indent,
            scrutinee: cfg.scrutinee.clone(),
        }
    }
}

/// Generated source text, ready to be spliced into a function body.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RenderedArtifact(String);

impl RenderedArtifact {
    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn as_bytes(&self) -> &[u8] {
        self.0.as_bytes()
    }

    pub fn into_string(self) -> String {
        self.0
    }
}

impl std::fmt::Display for RenderedArtifact {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

/// Escape `name` for use between double quotes in a Rust string literal.
pub fn escape(name: &str) -> String {
    let mut out = String::with_capacity(name.len());
    for c in name.chars() {
        match c {
            '"' => out.push_str("\\\""),
            '\\' => out.push_str("\\\\"),
            '\n' => out.push_str("\\n"),
            '\r' => out.push_str("\\r"),
            '\t' => out.push_str("\\t"),
            '\0' => out.push_str("\\0"),
            c if c.is_control() => {
                let _ = write!(out, "\\u{{{:x}}}", c as u32);
            }
            c => out.push(c),
        }
    }
    out
}

/// True if `s` is a plain (non-raw) Rust identifier.
pub fn is_identifier(s: &str) -> bool {
    let mut chars = s.chars();
    match chars.next() {
        Some(c) if c == '_' || c.is_ascii_alphabetic() => {}
        _ => return false,
    }
    s != "_" && chars.all(|c| c == '_' || c.is_ascii_alphanumeric())
}

/// Render `table` as a `match` expression with a trailing `_` arm.
///
/// Output is a pure function of its inputs: same table and options, same
/// bytes.
pub fn render(table: &Table, opts: &RenderOptions) -> Result<RenderedArtifact> {
    if !is_identifier(&opts.scrutinee) {
        return Err(CompileError::Render(format!(
            "scrutinee '{}' is not an identifier",
            opts.scrutinee
        )));
    }
    let outer = " ".repeat(opts.indent);
    let inner = " ".repeat(opts.indent * 2);

    let mut out = String::new();
    let _ = writeln!(out, "{outer}match {} {{", opts.scrutinee);
    for e in table.entries() {
        if !is_valid_code(&e.code) {
            return Err(CompileError::Render(format!(
                "code '{}' from line {} is not a valid pattern",
                e.code, e.line
            )));
        }
        let _ = writeln!(out, "{inner}{} => \"{}\",", e.code, escape(&e.name));
    }
    let _ = writeln!(out, "{inner}_ => \"{}\",", escape(&opts.fallback));
    let _ = writeln!(out, "{outer}}}");
    log::debug!("rendered {} arms, {} bytes", table.len() + 1, out.len());
    Ok(RenderedArtifact(out))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::DuplicatePolicy;
    use crate::table::{parse, Entry};
    use std::path::Path;

    fn table(input: &str) -> Table {
        parse(input.as_bytes(), Path::new("<test>"), '\t', DuplicatePolicy::Reject)
            .unwrap()
            .table
    }

    #[test]
    fn escapes_quotes_and_backslashes() {
        assert_eq!(escape(r#"Bolt "Inc""#), r#"Bolt \"Inc\""#);
        assert_eq!(escape(r"C:\dir"), r"C:\\dir");
        assert_eq!(escape("a\tb"), "a\\tb");
        assert_eq!(escape("bell\u{7}"), "bell\\u{7}");
        assert_eq!(escape("Müller GmbH"), "Müller GmbH");
    }

    #[test]
    fn renders_reference_fragment() {
        let t = table("17\tAcme Corp\n\n5\tBolt \"Inc\"\tignored-extra-field\n");
        let out = render(&t, &RenderOptions::default()).unwrap();
        let expected = concat!(
            "    match code {\n",
            "        17 => \"Acme Corp\",\n",
            "        5 => \"Bolt \\\"Inc\\\"\",\n",
            "        _ => \"Unknown company code\",\n",
            "    }\n",
        );
        assert_eq!(out.as_str(), expected);
    }

    #[test]
    fn empty_table_has_only_fallback() {
        let out = render(&Table::default(), &RenderOptions::default()).unwrap();
        assert_eq!(
            out.as_str(),
            "    match code {\n        _ => \"Unknown company code\",\n    }\n"
        );
    }

    #[test]
    fn custom_shape_and_escaped_fallback() {
        let t = table("1\tOne\n");
        let opts = RenderOptions {
            fallback: "say \"what\"".into(),
            indent: 2,
            scrutinee: "mfr".into(),
        };
        let out = render(&t, &opts).unwrap();
        assert_eq!(
            out.as_str(),
            "  match mfr {\n    1 => \"One\",\n    _ => \"say \\\"what\\\"\",\n  }\n"
        );
    }

    #[test]
    fn invalid_code_is_render_failure() {
        let (t, _) = Table::resolve_duplicates(
            vec![Entry {
                code: "1 | 2".into(),
                name: "x".into(),
                line: 1,
            }],
            DuplicatePolicy::Reject,
            Path::new("<test>"),
        )
        .unwrap();
        assert!(matches!(
            render(&t, &RenderOptions::default()),
            Err(CompileError::Render(_))
        ));
    }

    #[test]
    fn identifiers() {
        assert!(is_identifier("code"));
        assert!(is_identifier("_c2"));
        assert!(!is_identifier("_"));
        assert!(!is_identifier("2c"));
        assert!(!is_identifier("a-b"));
        assert!(!is_identifier(""));
    }
}
