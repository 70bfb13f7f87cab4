//! Root-relative accessor paths used by back-reference tokens.
//!
//! Grammar:
//!
//! ```text
//! path   := "$" step*
//! step   := "[" digit+ "]"
//!         | "[" json-string "]"
//! ```
//!
//! A path is parsed into a list of [`PathStep`]s and resolved by plain
//! index/key lookups. Nothing ever evaluates a path as code, and anything that
//! does not match the grammar is simply not a path.

use smallvec::SmallVec;

/// The root token.
pub const ROOT: &str = "$";

/// One accessor of a path.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum PathStep {
    /// `[3]`
    Index(usize),
    /// `["name"]`
    Key(String),
}

pub type PathSteps = SmallVec<[PathStep; 8]>;

/// `path[i]`
pub fn index_step(path: &str, index: usize) -> String {
    format!("{path}[{index}]")
}

/// `path["key"]`, with the key JSON-quoted.
pub fn key_step(path: &str, key: &str) -> String {
    format!("{path}[{}]", quote_key(key))
}

fn quote_key(key: &str) -> String {
    serde_json::Value::String(key.to_owned()).to_string()
}

/// Render steps back into path text.
pub fn format_path(steps: &[PathStep]) -> String {
    steps.iter().fold(ROOT.to_owned(), |path, step| match step {
        PathStep::Index(i) => index_step(&path, *i),
        PathStep::Key(k) => key_step(&path, k),
    })
}

/// `true` if `path` matches the path grammar.
pub fn is_path(path: &str) -> bool {
    parse_path(path).is_some()
}

/// Parse `path` into accessor steps, or `None` if it is not a path.
pub fn parse_path(path: &str) -> Option<PathSteps> {
    let mut rest = path.strip_prefix(ROOT)?;
    let mut steps = PathSteps::new();

    while !rest.is_empty() {
        rest = rest.strip_prefix('[')?;
        let (step, after) = if rest.starts_with('"') {
            parse_key(rest)?
        } else {
            parse_index(rest)?
        };
        rest = after.strip_prefix(']')?;
        steps.push(step);
    }

    Some(steps)
}

/// Digits too long for `usize` are still a valid step. They become a key
/// step, which can match an object key but never an array element.
fn parse_index(input: &str) -> Option<(PathStep, &str)> {
    let digits = input.bytes().take_while(u8::is_ascii_digit).count();
    if digits == 0 {
        return None;
    }
    let text = &input[..digits];
    let step = match text.parse::<usize>() {
        Ok(index) => PathStep::Index(index),
        Err(_) => PathStep::Key(text.to_owned()),
    };
    Some((step, &input[digits..]))
}

/// Scan a quoted key starting at the opening quote and decode it.
fn parse_key(input: &str) -> Option<(PathStep, &str)> {
    let mut chars = input.char_indices().skip(1);
    let end = loop {
        let (i, c) = chars.next()?;
        match c {
            '"' => break i + 1,
            '\\' => {
                let (_, escaped) = chars.next()?;
                match escaped {
                    '\\' | '"' | '/' | 'b' | 'f' | 'n' | 'r' | 't' => {}
                    'u' => {
                        for _ in 0..4 {
                            let (_, h) = chars.next()?;
                            if !h.is_ascii_alphanumeric() {
                                return None;
                            }
                        }
                    }
                    _ => return None,
                }
            }
            c if (c as u32) < 0x20 => return None,
            _ => {}
        }
    };
    let key: String = serde_json::from_str(&input[..end]).ok()?;
    Some((PathStep::Key(key), &input[end..]))
}
