//! Declaration-string parsing.
//!
//! A declaration names a function and its positional typespecs, with an
//! optional result section:
//!
//! ```text
//! name(typespec, typespec, ...) => typespec, ... or typespec, ...
//! ```
//!
//! Positions may be bracketed (`[int]`, optional), the final position
//! may carry an ellipsis (`any...`, variadic tail), and a colon instead
//! of a dot before the final name segment marks a method whose first
//! argument is implicit and unchecked. Result alternatives after `=>`
//! are separated by the word `or`.
//!
//! Parsing happens once, when a function is wrapped; a declaration that
//! does not parse is a bug in the declaring code and fails fast with a
//! [`DeclarationError`].

use chumsky::prelude::*;

pub mod errors;

pub use errors::DeclarationError;

/// A parsed declaration: the raw positional specs are kept as written
/// and expanded later by the permutation expander.
#[derive(Debug, Clone, PartialEq)]
pub struct Declaration {
    /// Full dotted name as written, e.g. `std.io.open` or `obj:method`.
    pub name: String,
    /// True when a colon precedes the final name segment.
    pub is_method: bool,
    /// Raw argument positions, in declaration order.
    pub args: Vec<String>,
    /// Result alternatives: each group is a list of raw positions.
    pub results: Option<Vec<Vec<String>>>,
}

type RawDecl = (((String, bool), Vec<String>), Option<String>);

/// Parser for whitespace between declaration elements
fn ws<'a>() -> impl Parser<'a, &'a str, (), extra::Err<Rich<'a, char>>> + Clone {
    one_of(" \t\r\n").ignored().repeated()
}

fn parser<'a>() -> impl Parser<'a, &'a str, RawDecl, extra::Err<Rich<'a, char>>> {
    let segment = text::ident();

    // Dotted name with an optional method colon before the final segment
    let name = segment
        .clone()
        .then(
            one_of(".:")
                .then(segment)
                .repeated()
                .collect::<Vec<(char, &str)>>(),
        )
        .try_map(|(first, rest): (&str, Vec<(char, &str)>), span| {
            let mut is_method = false;
            for (i, (sep, _)) in rest.iter().enumerate() {
                if *sep == ':' {
                    if i + 1 != rest.len() {
                        return Err(Rich::custom(
                            span,
                            "method colon must precede the final name segment",
                        ));
                    }
                    is_method = true;
                }
            }
            let mut full = String::from(first);
            for (sep, seg) in &rest {
                full.push(*sep);
                full.push_str(seg);
            }
            Ok((full, is_method))
        });

    // One raw position: everything up to the next top-level comma or the
    // closing paren, trimmed. Splitting into tokens happens downstream.
    let position = none_of(",)")
        .repeated()
        .at_least(1)
        .to_slice()
        .map(|s: &str| s.trim().to_string());

    let args = position
        .separated_by(just(','))
        .collect::<Vec<String>>()
        .delimited_by(just('('), just(')'));

    // The result section is captured raw and split on the word `or`
    // after parsing; commas and `or` never nest in typespecs.
    let results = ws()
        .ignore_then(just("=>"))
        .ignore_then(
            any()
                .repeated()
                .at_least(1)
                .to_slice()
                .map(|s: &str| s.to_string()),
        );

    ws().ignore_then(name)
        .then_ignore(ws())
        .then(args)
        .then(results.or_not())
        .then_ignore(ws())
        .then_ignore(end())
}

/// Parse a declaration string, validating position markers.
pub fn parse(decl: &str) -> Result<Declaration, DeclarationError> {
    let (output, errs) = parser().parse(decl).into_output_errors();

    let Some((((name, is_method), raw_args), raw_results)) = output else {
        return Err(errors::errors_to_declaration_error(errs, decl));
    };

    let args = clean_positions(decl, raw_args)?;
    validate_positions(decl, &args)?;

    let results = match raw_results {
        Some(raw) => {
            let mut groups = Vec::new();
            for group in split_on_word(&raw, "or") {
                let positions: Vec<String> =
                    group.split(',').map(|s| s.trim().to_string()).collect();
                let positions = clean_positions(decl, positions)?;
                if positions.is_empty() {
                    return Err(DeclarationError::new(decl, "empty result alternative"));
                }
                validate_positions(decl, &positions)?;
                groups.push(positions);
            }
            Some(groups)
        }
        None => None,
    };

    Ok(Declaration {
        name,
        is_method,
        args,
        results,
    })
}

/// An all-whitespace list is no positions at all; an empty position
/// between commas is malformed.
fn clean_positions(
    decl: &str,
    positions: Vec<String>,
) -> Result<Vec<String>, DeclarationError> {
    if positions.len() == 1 && positions[0].is_empty() {
        return Ok(Vec::new());
    }
    if positions.iter().any(String::is_empty) {
        return Err(DeclarationError::new(decl, "empty position in list"));
    }
    Ok(positions)
}

fn validate_positions(decl: &str, positions: &[String]) -> Result<(), DeclarationError> {
    for (i, raw) in positions.iter().enumerate() {
        validate_markers(decl, raw)?;
        if i + 1 != positions.len() && raw.contains("...") {
            return Err(DeclarationError::new(
                decl,
                format!("ellipsis before the final position in `{raw}`"),
            ));
        }
    }
    Ok(())
}

/// Brackets must wrap the whole position and an ellipsis may only be a
/// suffix (either inside or outside a closing bracket).
fn validate_markers(decl: &str, raw: &str) -> Result<(), DeclarationError> {
    let opens = raw.matches('[').count();
    let closes = raw.matches(']').count();
    if opens != closes || opens > 1 {
        return Err(DeclarationError::new(
            decl,
            format!("unbalanced brackets in `{raw}`"),
        ));
    }
    if opens == 1 {
        let stripped = raw.strip_suffix("...").unwrap_or(raw).trim_end();
        if !raw.starts_with('[') || !stripped.ends_with(']') {
            return Err(DeclarationError::new(
                decl,
                format!("misplaced brackets in `{raw}`"),
            ));
        }
    }
    match raw.matches("...").count() {
        0 => Ok(()),
        1 => {
            let idx = raw.find("...").unwrap_or(0);
            let suffix = idx + 3 == raw.len();
            let before_bracket = raw.ends_with(']') && idx + 4 == raw.len();
            if suffix || before_bracket {
                Ok(())
            } else {
                Err(DeclarationError::new(
                    decl,
                    format!("misplaced ellipsis in `{raw}`"),
                ))
            }
        }
        _ => Err(DeclarationError::new(
            decl,
            format!("repeated ellipsis in `{raw}`"),
        )),
    }
}

/// Split on a standalone, whitespace-delimited word. Commas glued to
/// their neighbours survive intact for the later comma split.
fn split_on_word(s: &str, word: &str) -> Vec<String> {
    let mut parts = Vec::new();
    let mut current: Vec<&str> = Vec::new();
    for w in s.split_whitespace() {
        if w == word {
            parts.push(current.join(" "));
            current = Vec::new();
        } else {
            current.push(w);
        }
    }
    parts.push(current.join(" "));
    parts
}
