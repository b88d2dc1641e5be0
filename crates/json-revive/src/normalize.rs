//! Source-text normalizer for function bodies.
//!
//! Strips comments while respecting string, template-literal, and
//! regex-literal boundaries, then collapses newline runs, so that two
//! functions differing only in comments or layout encode to the same
//! tagged string.

use std::sync::OnceLock;

use regex::Regex;

#[derive(Clone, Copy, PartialEq)]
enum Mode {
    Code,
    /// Inside a quoted string; tracks the opening quote character.
    Quoted(char),
    BlockComment,
    LineComment,
    RegexLiteral,
}

/// Normalize function source text.
///
/// A single left-to-right scan drops `/* … */` and `// …` comment
/// characters and keeps everything else, entering and leaving lexical modes
/// on next-character-pair lookahead. A raw newline closes any quoted string
/// except a template literal. After the scan, newline runs and their
/// surrounding indentation collapse to a single space and the result is
/// trimmed.
///
/// Idempotent for well-formed source. This is a heuristic scanner, not a
/// grammar lexer; degenerate inputs (for instance a division sign read as a
/// regex-literal opener) can be misclassified.
pub fn normalize_source(source: &str) -> String {
    let chars: Vec<char> = source.chars().collect();
    let mut out = String::with_capacity(source.len());
    let mut mode = Mode::Code;
    let mut i = 0;
    while i < chars.len() {
        let ch = chars[i];
        let next = chars.get(i + 1).copied();
        match mode {
            Mode::Code => match ch {
                '/' if next == Some('*') => {
                    mode = Mode::BlockComment;
                    i += 2;
                    continue;
                }
                '/' if next == Some('/') => {
                    mode = Mode::LineComment;
                    i += 2;
                    continue;
                }
                '/' => {
                    mode = Mode::RegexLiteral;
                    out.push(ch);
                }
                '"' | '\'' | '`' => {
                    mode = Mode::Quoted(ch);
                    out.push(ch);
                }
                _ => out.push(ch),
            },
            Mode::Quoted(quote) => {
                out.push(ch);
                if ch == '\\' {
                    if let Some(escaped) = next {
                        out.push(escaped);
                        i += 2;
                        continue;
                    }
                } else if ch == quote || (ch == '\n' && quote != '`') {
                    mode = Mode::Code;
                }
            }
            Mode::BlockComment => {
                if ch == '*' && next == Some('/') {
                    mode = Mode::Code;
                    i += 2;
                    continue;
                }
            }
            Mode::LineComment => {
                if ch == '\n' {
                    mode = Mode::Code;
                    out.push(ch);
                }
            }
            Mode::RegexLiteral => {
                out.push(ch);
                if ch == '\\' {
                    if let Some(escaped) = next {
                        out.push(escaped);
                        i += 2;
                        continue;
                    }
                } else if ch == '/' || ch == '\n' {
                    mode = Mode::Code;
                }
            }
        }
        i += 1;
    }
    let collapsed = newline_run().replace_all(&out, " ");
    collapsed.trim().to_string()
}

fn newline_run() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"[ \t]*[\r\n][ \t\r\n]*").expect("valid pattern"))
}
