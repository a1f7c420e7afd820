//! Typespec splitting.
//!
//! A typespec string names the acceptable types for one position:
//! alternatives separated by `|` or the word `or`, with a leading `?`
//! shorthand for "or nil". Splitting never fails; tokens that name no
//! known type simply fail later at classification time.

/// Split a typespec into its ordered, deduplicated type tokens.
///
/// `"?int|string"` becomes `["int", "string", "nil"]`: the `?` marker is
/// stripped from its token and a single `nil` is appended after all
/// explicit tokens. Interior whitespace of composite tokens is
/// normalized, so `"table  of  int"` and `"table of int"` split equally.
pub fn typesplit(spec: &str) -> Vec<String> {
    let mut tokens: Vec<String> = Vec::new();
    let mut wants_nil = false;

    for alternative in split_alternatives(spec) {
        let token = match alternative.strip_prefix('?') {
            Some(rest) => {
                wants_nil = true;
                rest.trim_start().to_string()
            }
            None => alternative,
        };
        if token.is_empty() {
            continue;
        }
        if !tokens.contains(&token) {
            tokens.push(token);
        }
    }

    if wants_nil {
        let nil = "nil".to_string();
        if !tokens.contains(&nil) {
            tokens.push(nil);
        }
    }

    tokens
}

/// Re-normalize an already-split token list. Splitting is idempotent:
/// deduping a `typesplit` result is the identity.
pub fn dedupe(tokens: &[String]) -> Vec<String> {
    let mut out: Vec<String> = Vec::new();
    for token in tokens {
        let token = normalize(token);
        if !token.is_empty() && !out.contains(&token) {
            out.push(token);
        }
    }
    out
}

/// Split on `|` and on the standalone word `or`, normalizing whitespace.
/// The word must stand alone: `"table of int or string"` splits after
/// `int`, but `origin` stays intact.
fn split_alternatives(spec: &str) -> Vec<String> {
    let mut out = Vec::new();
    for chunk in spec.split('|') {
        let mut current: Vec<&str> = Vec::new();
        for word in chunk.split_whitespace() {
            if word == "or" {
                out.push(current.join(" "));
                current = Vec::new();
            } else {
                current.push(word);
            }
        }
        out.push(current.join(" "));
    }
    out
}

fn normalize(token: &str) -> String {
    token.split_whitespace().collect::<Vec<_>>().join(" ")
}
