//! Positional permutation expansion.
//!
//! A declaration's argument list is a sequence of positions, some
//! bracketed as optional and the last possibly ellipsis-suffixed.
//! Expansion enumerates every concrete shape the call can take: each
//! optional position doubles the set, so k optional positions yield 2^k
//! permutations. The matcher tries them longest-first.

use crate::typespec::typesplit;

/// One concrete call shape: a typespec per position, and a `dots` flag
/// when the final typespec repeats for any further trailing values.
#[derive(Debug, Clone, PartialEq)]
pub struct Permutation {
    pub specs: Vec<Vec<String>>,
    pub dots: bool,
}

impl Permutation {
    pub fn len(&self) -> usize {
        self.specs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.specs.is_empty()
    }

    /// Typespec governing the value at `index` (0-based). Past the end,
    /// a `dots` permutation extends its final typespec.
    pub fn spec_at(&self, index: usize) -> Option<&[String]> {
        if index < self.specs.len() {
            self.specs.get(index).map(Vec::as_slice)
        } else if self.dots {
            self.specs.last().map(Vec::as_slice)
        } else {
            None
        }
    }
}

/// Expand raw position strings into every valid call shape.
///
/// Positions arrive as written in the declaration: `"int"`, `"[int]"`,
/// `"?any..."`, `"[string...]"` (with `"[string]..."` normalized to the
/// bracket-interior form first). The result is sorted by descending
/// length, so the first permutation is the all-optionals-present shape.
pub fn permute(positions: &[String]) -> Vec<Permutation> {
    let mut perms = vec![Permutation {
        specs: Vec::new(),
        dots: false,
    }];

    for raw in positions {
        let (spec, optional, dots) = strip_markers(raw);
        let tokens = typesplit(&spec);
        if optional {
            let omitted = perms.clone();
            for perm in &mut perms {
                perm.specs.push(tokens.clone());
                if dots {
                    perm.dots = true;
                }
            }
            perms.extend(omitted);
        } else {
            for perm in &mut perms {
                perm.specs.push(tokens.clone());
                if dots {
                    perm.dots = true;
                }
            }
        }
    }

    // Stable sort: equal lengths keep construction order, which already
    // puts the optionals-present branch ahead of the omitted branch.
    perms.sort_by(|a, b| b.specs.len().cmp(&a.specs.len()));
    perms
}

/// Peel `[...]` and a trailing ellipsis off one raw position, returning
/// the bare typespec and the two markers.
fn strip_markers(raw: &str) -> (String, bool, bool) {
    let mut s = raw.trim().to_string();

    // Normalize "[type]..." to "[type...]"
    if let Some(prefix) = s.strip_suffix("...") {
        let prefix = prefix.trim_end();
        if let Some(inner) = prefix.strip_suffix(']') {
            s = format!("{inner}...]");
        }
    }

    let mut optional = false;
    if s.starts_with('[') && s.ends_with(']') {
        optional = true;
        s = s[1..s.len() - 1].trim().to_string();
    }

    let mut dots = false;
    if let Some(rest) = s.strip_suffix("...") {
        dots = true;
        s = rest.trim_end().to_string();
    }

    (s, optional, dots)
}
