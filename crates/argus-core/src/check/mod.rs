//! Call-time matching and the declaration decorator.
//!
//! A declaration compiles once into a [`Signature`]: the permutation
//! tables for its arguments and (optionally) its results. Wrapping a
//! host function with [`argscheck`] attaches a signature; every call
//! then matches the live argument list against the permutations,
//! longest shape first, and a fully-matching permutation ends the
//! search. When nothing matches, the failure is attributed to the
//! permutation that progressed furthest before failing, on the theory
//! that it is the interpretation the caller intended.
//!
//! The signature tables are built once and only ever read afterwards,
//! so a wrapped function can be shared freely.

pub mod errors;

pub use errors::{CheckError, Subject};

use std::rc::Rc;
use std::sync::atomic::{AtomicBool, Ordering};

use crate::classify::{classify, split_composite};
use crate::diagnostics;
use crate::parser::{self, DeclarationError};
use crate::permute::{Permutation, permute};
use crate::typespec::typesplit;
use crate::value::{HostFn, Key, Value};

static CHECKS_ENABLED: AtomicBool = AtomicBool::new(true);

/// Turn declaration checking on or off process-wide.
///
/// The switch is read once, inside [`argscheck`]; functions wrapped
/// while checking was off stay unchecked even if it is turned back on,
/// and vice versa.
pub fn set_checks_enabled(enabled: bool) {
    CHECKS_ENABLED.store(enabled, Ordering::SeqCst);
}

pub fn checks_enabled() -> bool {
    CHECKS_ENABLED.load(Ordering::SeqCst)
}

/// A compiled declaration: name, method flag, and the permutation
/// tables the matcher reads on every call.
#[derive(Debug, Clone)]
pub struct Signature {
    name: String,
    is_method: bool,
    arg_perms: Vec<Permutation>,
    result_perms: Option<Vec<Permutation>>,
}

impl Signature {
    /// Compile a declaration string.
    pub fn parse(decl: &str) -> Result<Signature, DeclarationError> {
        let declaration = parser::parse(decl)?;
        let arg_perms = permute(&declaration.args);
        let result_perms = declaration.results.as_ref().map(|groups| {
            let mut perms: Vec<Permutation> =
                groups.iter().flat_map(|group| permute(group)).collect();
            // Alternative groups each expand on their own; the combined
            // table is re-sorted so the most complete shape leads.
            perms.sort_by(|a, b| b.len().cmp(&a.len()));
            perms
        });
        Ok(Signature {
            name: declaration.name,
            is_method: declaration.is_method,
            arg_perms,
            result_perms,
        })
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn is_method(&self) -> bool {
        self.is_method
    }

    pub fn argument_permutations(&self) -> &[Permutation] {
        &self.arg_perms
    }

    pub fn result_permutations(&self) -> Option<&[Permutation]> {
        self.result_perms.as_deref()
    }

    /// Validate a call's argument list. For a method declaration the
    /// leading self argument is skipped and positions count from the
    /// first checked argument.
    pub fn check_arguments(&self, args: &[Value]) -> Result<(), CheckError> {
        let args = if self.is_method && !args.is_empty() {
            &args[1..]
        } else {
            args
        };
        self.check_values(Subject::Argument, &self.arg_perms, args)
    }

    /// Validate a call's result list, when the declaration has one.
    pub fn check_results(&self, results: &[Value]) -> Result<(), CheckError> {
        match &self.result_perms {
            Some(perms) => self.check_values(Subject::Result, perms, results),
            None => Ok(()),
        }
    }

    fn check_values(
        &self,
        subject: Subject,
        perms: &[Permutation],
        values: &[Value],
    ) -> Result<(), CheckError> {
        match match_permutations(perms, values) {
            None => Ok(()),
            Some(Failure::TooMany { max }) => Err(CheckError::TooMany {
                subject,
                name: self.name.clone(),
                max,
                got: values.len(),
            }),
            Some(Failure::Mismatch {
                position,
                expected,
                element,
            }) => {
                let message = match &element {
                    Some((key, value)) => {
                        diagnostics::mismatch(&expected, Some(value), Some(key))
                    }
                    None => diagnostics::mismatch(&expected, values.get(position - 1), None),
                };
                Err(CheckError::Mismatch {
                    subject,
                    name: self.name.clone(),
                    position,
                    message,
                })
            }
        }
    }
}

/// A host function wrapped with a compiled declaration.
pub struct Checked {
    signature: Option<Rc<Signature>>,
    inner: HostFn,
}

impl std::fmt::Debug for Checked {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Checked")
            .field("signature", &self.signature)
            .field("inner", &"<host fn>")
            .finish()
    }
}

impl Checked {
    /// Invoke the wrapped function, validating arguments before and
    /// declared results after. Results come back with arity preserved,
    /// trailing nils included.
    pub fn call(&self, args: &[Value]) -> Result<Vec<Value>, CheckError> {
        let Some(signature) = &self.signature else {
            return (self.inner)(args).map_err(CheckError::Host);
        };
        signature.check_arguments(args)?;
        let results = (self.inner)(args).map_err(CheckError::Host)?;
        signature.check_results(&results)?;
        Ok(results)
    }

    /// The compiled signature, or `None` when wrapping happened with
    /// checking disabled.
    pub fn signature(&self) -> Option<&Signature> {
        self.signature.as_deref()
    }
}

/// Wrap a host function so every call is validated against `decl`.
///
/// With checking disabled the declaration is not parsed at all and the
/// wrapper forwards straight to the target.
pub fn argscheck(decl: &str, inner: HostFn) -> Result<Checked, DeclarationError> {
    if !checks_enabled() {
        return Ok(Checked {
            signature: None,
            inner,
        });
    }
    let signature = Signature::parse(decl)?;
    Ok(Checked {
        signature: Some(Rc::new(signature)),
        inner,
    })
}

/// Validate one value against one typespec, independent of any wrapped
/// function. Returns the bare diagnostic string on mismatch.
pub fn check(spec: &str, value: Option<&Value>) -> Result<(), String> {
    let tokens = typesplit(spec);
    if spec_matches(&tokens, value) {
        return Ok(());
    }
    match failing_element(&tokens, value) {
        Some((key, element)) => Err(diagnostics::mismatch(&tokens, Some(&element), Some(&key))),
        None => Err(diagnostics::mismatch(&tokens, value, None)),
    }
}

enum Attempt {
    Matched,
    FailedAt(usize),
    Excess,
}

enum Failure {
    Mismatch {
        position: usize,
        expected: Vec<String>,
        element: Option<(Key, Value)>,
    },
    TooMany {
        max: usize,
    },
}

fn spec_matches(tokens: &[String], value: Option<&Value>) -> bool {
    tokens.iter().any(|token| classify(token, value))
}

fn try_permutation(perm: &Permutation, values: &[Value]) -> Attempt {
    for i in 0..perm.len() {
        if !spec_matches(&perm.specs[i], values.get(i)) {
            return Attempt::FailedAt(i + 1);
        }
    }
    if values.len() <= perm.len() {
        return Attempt::Matched;
    }
    if !perm.dots {
        return Attempt::Excess;
    }
    match perm.specs.last() {
        Some(last) => {
            for i in perm.len()..values.len() {
                if !spec_matches(last, values.get(i)) {
                    return Attempt::FailedAt(i + 1);
                }
            }
            Attempt::Matched
        }
        None => Attempt::Excess,
    }
}

/// Try every permutation, longest first. `None` means some permutation
/// matched completely. A permutation that matches all its positions but
/// leaves surplus values fails at length + 1, so overflowing a fully
/// matched shape outranks an earlier genuine mismatch.
fn match_permutations(perms: &[Permutation], values: &[Value]) -> Option<Failure> {
    let mut best: Option<(usize, usize, bool)> = None;
    for (pi, perm) in perms.iter().enumerate() {
        let (index, excess) = match try_permutation(perm, values) {
            Attempt::Matched => return None,
            Attempt::FailedAt(i) => (i, false),
            Attempt::Excess => (perm.len() + 1, true),
        };
        if best.map_or(true, |(furthest, _, _)| index > furthest) {
            best = Some((index, pi, excess));
        }
    }

    let (position, pi, excess) = best?;
    if excess {
        return Some(Failure::TooMany {
            max: perms[pi].len(),
        });
    }
    let perm = &perms[pi];
    let expected: Vec<String> = perm.spec_at(position - 1).unwrap_or(&[]).to_vec();
    let element = failing_element(&expected, values.get(position - 1));
    Some(Failure::Mismatch {
        position,
        expected,
        element,
    })
}

/// When the mismatched position expects a container composite and the
/// actual value satisfies the container type, blame the first offending
/// element (sorted key order) instead of the whole value.
fn failing_element(expected: &[String], value: Option<&Value>) -> Option<(Key, Value)> {
    let table = match value {
        Some(Value::Table(t)) => t,
        _ => return None,
    };
    for token in expected {
        if let Some((container, element)) = split_composite(token) {
            if classify(container, value) {
                for (key, elem) in table.borrow().sorted_entries() {
                    if !classify(element, Some(&elem)) {
                        return Some((key, elem));
                    }
                }
            }
        }
    }
    None
}
