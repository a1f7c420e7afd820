//! Run-time gradual type checking for dynamically-typed host functions.
//!
//! A host function is annotated with a compact textual signature and
//! every call is validated against it:
//!
//! ```text
//! open(string, [:r|:w|:a]) => file or nil, string
//! ```
//!
//! ## How checking works
//!
//! 1. **Compile**: the declaration parses into a name and positional
//!    typespecs, and the optional/variadic markers expand into every
//!    concrete call shape (one permutation per subset of optional
//!    arguments present).
//! 2. **Match**: each call's live argument list is tried against the
//!    permutations, longest shape first; any token of a position's
//!    typespec may accept the value there.
//! 3. **Diagnose**: when nothing matches, the shape that progressed
//!    furthest is blamed and a house-style message names the exact
//!    position, the acceptable types, and what actually arrived, down
//!    to the offending element of a mismatched container.
//!
//! Checking is a development aid: [`set_checks_enabled`] turns it off
//! process-wide, and functions wrapped while it is off pay no per-call
//! cost at all.

pub mod check;
pub mod classify;
pub mod diagnostics;
pub mod parser;
pub mod permute;
pub mod typespec;
pub mod value;

// Re-export the public surface for convenience
pub use check::{
    CheckError, Checked, Signature, Subject, argscheck, check, checks_enabled, set_checks_enabled,
};
pub use classify::classify;
pub use parser::{Declaration, DeclarationError};
pub use permute::{Permutation, permute};
pub use typespec::typesplit;
pub use value::{FileHandle, HostFn, Key, Table, Value};
