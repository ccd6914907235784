//! Splits a template into literal text and `{{...}}` tokens.

use once_cell::sync::Lazy;
use regex::Regex;

const OPEN: &str = "{{";
const CLOSE: &str = "}}";

static VARIABLE_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^[A-Za-z_][A-Za-z0-9_]*$").expect("variable pattern is valid"));

static STYLE_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r#"^([A-Za-z_]\w*)\.([A-Za-z_]\w*)\(\s*(?:"([^"]*)"|'([^']*)')\s*\)$"#)
        .expect("style pattern is valid")
});

static HANDLER_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^([A-Za-z_]\w*)\(\s*(?:args\[\s*(\d+)\s*\])?\s*\)$").expect("handler pattern is valid")
});

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Segment {
    Literal(String),
    /// An unresolved token: `raw` is the full `{{...}}` text, `inner` the
    /// trimmed content between the braces.
    Token { raw: String, inner: String },
    /// Output of a pass. Never looked at again by later passes.
    Resolved(String),
}

pub fn tokenize(template: &str) -> Vec<Segment> {
    let mut segments = Vec::new();
    let mut rest = template;
    while let Some(open) = rest.find(OPEN) {
        let after_open = &rest[open + OPEN.len()..];
        let Some(close) = after_open.find(CLOSE) else {
            break;
        };
        // A stray opener before the close: keep it as text and restart at the inner one.
        if let Some(inner_open) = after_open[..close].find(OPEN) {
            let restart = open + OPEN.len() + inner_open;
            segments.push(Segment::Literal(rest[..restart].to_string()));
            rest = &rest[restart..];
            continue;
        }
        if open > 0 {
            segments.push(Segment::Literal(rest[..open].to_string()));
        }
        let end = open + OPEN.len() + close + CLOSE.len();
        segments.push(Segment::Token {
            raw: rest[open..end].to_string(),
            inner: after_open[..close].trim().to_string(),
        });
        rest = &rest[end..];
    }
    if !rest.is_empty() {
        segments.push(Segment::Literal(rest.to_string()));
    }
    segments
}

pub fn as_variable(inner: &str) -> Option<&str> {
    VARIABLE_RE.is_match(inner).then_some(inner)
}

/// `ns.fn("text")` → (`"ns.fn"`, `text`).
pub fn as_style_call(inner: &str) -> Option<(String, &str)> {
    let caps = STYLE_RE.captures(inner)?;
    let name = format!("{}.{}", caps.get(1)?.as_str(), caps.get(2)?.as_str());
    let text = caps.get(3).or_else(|| caps.get(4))?.as_str();
    Some((name, text))
}

/// `fn(args[N])` → (`fn`, `Some(N)`); `fn()` → (`fn`, `None`).
/// An index too large for `usize` is treated as absent.
pub fn as_handler_call(inner: &str) -> Option<(&str, Option<usize>)> {
    let caps = HANDLER_RE.captures(inner)?;
    let name = caps.get(1)?.as_str();
    let index = match caps.get(2) {
        Some(m) => m.as_str().parse().ok(),
        None => None,
    };
    Some((name, index))
}
