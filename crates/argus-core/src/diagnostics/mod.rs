//! Mismatch diagnostics in the house error style.
//!
//! A failed match renders as `"<expected>, got <actual>"`, where the
//! expected side lists every acceptable type in its verbose display form
//! and the actual side describes the offending value. The wording is
//! deterministic for identical inputs: token order follows the
//! declaration (with a `?`-synthesized `nil` last) and container
//! elements are attributed in sorted key order.

use crate::classify::split_composite;
use crate::value::{Key, Value};

/// Describe a failed match of `actual` against the `expected` tokens.
///
/// `index` is the container key when an element (rather than the whole
/// value) mismatched; element context renders only the element side of
/// composite tokens, so `table of int` reports `integer expected ... at
/// index k`.
pub fn mismatch(expected: &[String], actual: Option<&Value>, index: Option<&Key>) -> String {
    let expectedstr = expected_string(expected, index.is_some(), actual);
    let actualstr = actual_description(&expectedstr, expected, actual, index);
    format!("{expectedstr}, got {actualstr}")
}

/// The expected side: display forms joined with commas and a final
/// `or`, suffixed `expected`.
fn expected_string(expected: &[String], indexed: bool, actual: Option<&Value>) -> String {
    let mut shown: Vec<String> = Vec::new();
    for token in expected {
        let display = display_token(token, indexed);
        if !shown.contains(&display) {
            shown.push(display);
        }
    }

    let joined = match shown.len() {
        0 => String::new(),
        1 => shown[0].clone(),
        n => format!("{} or {}", shown[..n - 1].join(", "), shown[n - 1]),
    };

    let mut out = format!("{joined} expected");
    // A missing argument against `?any` is simply a missing argument
    if actual.is_none() {
        out = out.replace("any value or nil", "argument");
    }
    out
}

/// Verbose display form of one token. In element context (`indexed`)
/// composite tokens render only their element side.
fn display_token(token: &str, indexed: bool) -> String {
    if let Some((container, element)) = split_composite(token) {
        let element_display = display_token(element, false);
        if indexed {
            return element_display;
        }
        return format!("{} of {}", display_token(container, false), pluralize(&element_display));
    }
    match token {
        "func" | "function" => "function".to_string(),
        "bool" | "boolean" => "boolean".to_string(),
        "int" | "integer" => "integer".to_string(),
        "any" => "any value".to_string(),
        "file" => "FILE handle".to_string(),
        "#table" => "non-empty table".to_string(),
        "#list" => "non-empty list".to_string(),
        other => other.to_string(),
    }
}

fn pluralize(word: &str) -> String {
    if word.ends_with('s') {
        word.to_string()
    } else {
        format!("{word}s")
    }
}

/// The actual side: the value's apparent type, refined for the cases
/// the house style calls out.
fn actual_description(
    expectedstr: &str,
    expected: &[String],
    actual: Option<&Value>,
    index: Option<&Key>,
) -> String {
    let description = match actual {
        None => "no value".to_string(),
        Some(v @ (Value::Int(_) | Value::Float(_)))
            if expectedstr == "integer expected" && v.as_integer().is_none() =>
        {
            let subtype = v.number_subtype().unwrap_or("number");
            format!("{subtype} has no integer representation")
        }
        Some(Value::String(s)) if s.starts_with(':') => s.clone(),
        Some(Value::File(h)) if !h.is_open() => "closed file".to_string(),
        Some(Value::Table(t)) => {
            let table = t.borrow();
            if table.call_capability().is_some() {
                "functable".to_string()
            } else if let Some(tag) = table.type_tag() {
                tag
            } else if table.is_empty() {
                if expected.len() == 1 && expected[0] == "#list" {
                    "empty list".to_string()
                } else {
                    "empty table".to_string()
                }
            } else {
                "table".to_string()
            }
        }
        Some(v) => v.type_name().to_string(),
    };

    match index {
        Some(key) => format!("{description} at index {key}"),
        None => description,
    }
}
