//! Input sanitization.
//!
//! Everything here is pure. The `&str` variants are total; the `*_value`
//! variants accept untyped transport input and fail with
//! [`ShellError::InvalidInput`] when it is not a string.

use crate::error::{Result, ShellError};
use once_cell::sync::Lazy;
use regex::Regex;
use serde_json::Value;
use url::Url;

pub const DEFAULT_MAX_STRING_LEN: usize = 1000;
pub const MAX_COMMAND_LEN: usize = 200;
pub const MAX_PATH_LEN: usize = 255;
pub const MAX_EMAIL_LEN: usize = 254;
pub const MAX_URL_LEN: usize = 2048;

const MARKUP_CHARS: &[char] = &['<', '>', '"', '\'', '&'];
const SHELL_METACHARS: &[char] = &[';', '&', '|', '`', '$', '(', ')', '{', '}', '[', ']', '\\'];

static EMAIL_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^[^\s@]+@[^\s@]+\.[^\s@]+$").expect("email pattern is valid")
});

/// C0 controls, DEL and C1 controls.
fn is_control(c: char) -> bool {
    matches!(c, '\u{0000}'..='\u{001F}' | '\u{007F}'..='\u{009F}')
}

fn truncate_chars(s: &str, max_len: usize) -> &str {
    match s.char_indices().nth(max_len) {
        Some((idx, _)) => &s[..idx],
        None => s,
    }
}

/// trim → truncate → strip `<>"'&` → strip control characters.
pub fn sanitize_string(input: &str, max_len: usize) -> String {
    truncate_chars(input.trim(), max_len)
        .chars()
        .filter(|c| !MARKUP_CHARS.contains(c) && !is_control(*c))
        .collect()
}

/// trim → truncate to 200 → strip shell metacharacters → strip control
/// characters → collapse whitespace runs.
pub fn sanitize_command(input: &str) -> String {
    let stripped: String = truncate_chars(input.trim(), MAX_COMMAND_LEN)
        .chars()
        .filter(|c| !SHELL_METACHARS.contains(c) && !is_control(*c))
        .collect();
    collapse_whitespace(&stripped)
}

fn collapse_whitespace(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    let mut in_space = false;
    for c in s.chars() {
        if c.is_whitespace() {
            if !in_space {
                out.push(' ');
            }
            in_space = true;
        } else {
            out.push(c);
            in_space = false;
        }
    }
    out
}

/// Removes `..`, keeps `[a-zA-Z0-9._/-]`, collapses repeated `/` and
/// truncates to 255.
pub fn sanitize_path(input: &str) -> String {
    let without_parent = input.replace("..", "");
    let mut out = String::with_capacity(without_parent.len());
    for c in without_parent.chars() {
        if !(c.is_ascii_alphanumeric() || matches!(c, '.' | '_' | '/' | '-')) {
            continue;
        }
        if c == '/' && out.ends_with('/') {
            continue;
        }
        out.push(c);
    }
    truncate_chars(&out, MAX_PATH_LEN).to_string()
}

pub fn validate_email(input: &str) -> bool {
    input.len() <= MAX_EMAIL_LEN && EMAIL_RE.is_match(input)
}

pub fn validate_url(input: &str) -> bool {
    if input.len() > MAX_URL_LEN {
        return false;
    }
    match Url::parse(input) {
        Ok(url) => matches!(url.scheme(), "http" | "https") && url.host_str().is_some(),
        Err(_) => false,
    }
}

fn expect_text<'a>(value: &'a Value, what: &str) -> Result<&'a str> {
    value.as_str().ok_or_else(|| {
        ShellError::InvalidInput(format!("{} must be a string, got {}", what, kind_of(value)))
    })
}

fn kind_of(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}

/// [`sanitize_string`] for untyped input.
pub fn sanitize_value(value: &Value, max_len: usize) -> Result<String> {
    expect_text(value, "argument").map(|s| sanitize_string(s, max_len))
}

/// [`sanitize_command`] for untyped input.
pub fn sanitize_command_value(value: &Value) -> Result<String> {
    expect_text(value, "command").map(sanitize_command)
}
