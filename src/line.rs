//! Line classification for the vtab wire format.
//!
//! Each input line falls into exactly one category; the parser drives the
//! cross-line state, this module only recognizes single lines.

use once_cell::sync::Lazy;
use regex::Regex;

/// Match a barline (or title underline), yielding the marker run and any
/// trailing decoration text.
/// Template is: "============ <decoration>"
static RE_BARLINE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^\s*(:*[-=]{4}[-=]*:*)\s*(.*)$").expect("barline regex"));

/// Match a run of '#' characters, yielding the associated comment.
/// Template is: "# This is a comment"
static RE_COMMENT: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^\s*#+\s*(.*)$").expect("comment regex"));

/// Match a key-value pair, yielding key and value.
/// Template is: "Key : Value"
static RE_KEYPAIR: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^\s*(\w+)\s*:\s*(.*)$").expect("keypair regex"));

/// Recognize a tab row: at least four whitespace-separated string tokens.
/// This only recognizes, the tokens are re-split for parsing.
/// Template is: " | 10  |  9"
static RE_NOTE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^\s*(?:[hp-]*[|:0-9]+-*\s+){3}[hp-]*[|:0-9]+-*").expect("note row regex")
});

/// One classified input line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Line {
    Blank,
    Comment(String),
    KeyPair { key: String, value: String },
    Barline { marker: String, decorations: Vec<String> },
    NoteRow { tokens: Vec<String> },
    Text(String),
}

/// Categorize one line (already stripped of its newline). First match in
/// the barline / comment / key-pair / note-row order wins; anything else
/// is plain text or blank.
pub fn classify(line: &str) -> Line {
    if let Some(captures) = RE_BARLINE.captures(line) {
        return Line::Barline {
            marker: captures[1].to_string(),
            decorations: split_tokens(&captures[2]),
        };
    }

    if let Some(captures) = RE_COMMENT.captures(line) {
        return Line::Comment(captures[1].trim_end().to_string());
    }

    if let Some(captures) = RE_KEYPAIR.captures(line) {
        return Line::KeyPair {
            key: captures[1].to_string(),
            value: captures[2].trim_end().to_string(),
        };
    }

    if RE_NOTE.is_match(line) {
        return Line::NoteRow {
            tokens: split_tokens(line),
        };
    }

    if line.trim().is_empty() {
        Line::Blank
    } else {
        Line::Text(line.to_string())
    }
}

/// Match a single `key:value` shaped token, as found in decorations.
pub(crate) fn keypair(token: &str) -> Option<(String, String)> {
    RE_KEYPAIR
        .captures(token)
        .map(|c| (c[1].to_string(), c[2].trim_end().to_string()))
}

/// Split a line into whitespace-separated tokens, honouring single and
/// double quotes anywhere inside a token (the quotes themselves are
/// stripped). An unterminated quote runs to the end of the line.
pub fn split_tokens(s: &str) -> Vec<String> {
    let mut tokens = Vec::new();
    let mut current = String::new();
    let mut in_token = false;
    let mut quote: Option<char> = None;

    for c in s.chars() {
        match quote {
            Some(q) if c == q => quote = None,
            Some(_) => current.push(c),
            None if c == '"' || c == '\'' => {
                quote = Some(c);
                in_token = true;
            }
            None if c.is_whitespace() => {
                if in_token {
                    tokens.push(std::mem::take(&mut current));
                    in_token = false;
                }
            }
            None => {
                current.push(c);
                in_token = true;
            }
        }
    }
    if in_token {
        tokens.push(current);
    }

    tokens
}
