//! Code tokens: the left-hand side of each generated match arm.
//!
//! A token is accepted only if it is a literal or path pattern that cannot
//! bind a variable. Integer spellings are reduced to their value so that
//! `42`, `0x2A` and `4_2` are recognised as the same code.

use std::fmt;

use crate::render::is_identifier;

/// Identity of a code for duplicate detection.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum CodeKey {
    /// Integer literal, optionally negative, in any base.
    Int(i128),
    /// Path pattern such as `Kind::Foo` or an uppercase constant.
    Path(String),
}

impl fmt::Display for CodeKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CodeKey::Int(v) => write!(f, "{v}"),
            CodeKey::Path(p) => f.write_str(p),
        }
    }
}

// Strict and reserved keywords that cannot appear as a path segment.
const KEYWORDS: &[&str] = &[
    "as", "async", "await", "break", "const", "continue", "dyn", "else", "enum", "extern",
    "false", "fn", "for", "if", "impl", "in", "let", "loop", "match", "mod", "move", "mut",
    "pub", "ref", "return", "static", "struct", "trait", "true", "type", "unsafe", "use",
    "where", "while", "abstract", "become", "box", "do", "final", "gen", "macro", "override",
    "priv", "try", "typeof", "unsized", "virtual", "yield",
];

// Segments only valid at the start of a path.
const PATH_ROOTS: &[&str] = &["crate", "self", "super", "Self"];

/// Classify `token`, returning `None` if it cannot stand alone as a match
/// pattern.
pub fn classify(token: &str) -> Option<CodeKey> {
    let first = token.chars().next()?;
    if first == '-' || first.is_ascii_digit() {
        return parse_int(token).map(CodeKey::Int);
    }
    if is_path(token) {
        return Some(CodeKey::Path(token.to_string()));
    }
    None
}

/// True if `token` is accepted by [`classify`].
pub fn is_valid_code(token: &str) -> bool {
    classify(token).is_some()
}

fn parse_int(token: &str) -> Option<i128> {
    let (negative, body) = match token.strip_prefix('-') {
        Some(rest) => (true, rest),
        None => (false, token),
    };
    if !body.starts_with(|c: char| c.is_ascii_digit()) {
        return None;
    }
    let (radix, digits) = match body.get(..2) {
        Some("0x") => (16, &body[2..]),
        Some("0o") => (8, &body[2..]),
        Some("0b") => (2, &body[2..]),
        _ => (10, body),
    };
    if !digits.chars().all(|c| c == '_' || c.is_digit(radix)) {
        return None;
    }
    let digits: String = digits.chars().filter(|&c| c != '_').collect();
    if digits.is_empty() {
        return None;
    }
    let magnitude = i128::from_str_radix(&digits, radix).ok()?;
    Some(if negative { -magnitude } else { magnitude })
}

fn is_path(token: &str) -> bool {
    let segments: Vec<&str> = token.split("::").collect();
    for (i, seg) in segments.iter().enumerate() {
        if !is_identifier(seg) || KEYWORDS.contains(seg) {
            return false;
        }
        if i > 0 && PATH_ROOTS.contains(seg) && *seg != "super" {
            return false;
        }
    }
    match segments.as_slice() {
        // a lone lowercase identifier would bind instead of compare
        [single] => single.starts_with(|c: char| c.is_ascii_uppercase()) && *single != "Self",
        [.., last] => !PATH_ROOTS.contains(last),
        [] => false,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn integer_spellings_share_a_key() {
        for token in ["42", "0x2A", "0x2a", "4_2", "0o52", "0b10_1010", "042"] {
            assert_eq!(classify(token), Some(CodeKey::Int(42)), "{token}");
        }
        assert_eq!(classify("-1"), Some(CodeKey::Int(-1)));
        assert_eq!(classify("-0x10"), Some(CodeKey::Int(-16)));
        assert_eq!(classify("1_"), Some(CodeKey::Int(1)));
    }

    #[test]
    fn path_tokens() {
        for ok in ["Kind::Foo", "MAX_ID", "Foo", "crate::Kind::Bar", "self::X", "super::super::Y", "u8::MAX"] {
            assert_eq!(classify(ok), Some(CodeKey::Path(ok.to_string())), "{ok}");
        }
    }

    #[test]
    fn rejects_tokens_that_break_or_bind() {
        for bad in [
            "", "-", "--1", "-x", "a.b", "1.5", "1..=3", "1:2", "x:::y", "::x", "x::", "a::::b",
            "foo", "_", "_x", "Self", "Kind::self", "fn::X", "x::crate::Y", "0x", "0x_", "0xG",
            "1a", "12u8", "1 2", "1,2", "\"x\"", "{", "=>", "a|b",
            "999999999999999999999999999999999999999999",
        ] {
            assert_eq!(classify(bad), None, "{bad:?}");
        }
    }
}
