//! Error type for malformed declarations.
//!
//! Converts chumsky parse errors into a single readable error carrying
//! the offending declaration and an offset where available.

use chumsky::error::{Rich, RichReason};
use std::fmt;

/// A declaration string that did not parse. Raised when a function is
/// wrapped, never per call.
#[derive(Debug, Clone)]
pub struct DeclarationError {
    pub declaration: String,
    pub message: String,
    pub offset: Option<usize>,
}

impl DeclarationError {
    pub fn new(declaration: &str, message: impl Into<String>) -> Self {
        DeclarationError {
            declaration: declaration.to_string(),
            message: message.into(),
            offset: None,
        }
    }
}

impl fmt::Display for DeclarationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "malformed declaration `{}`: {}",
            self.declaration, self.message
        )?;
        if let Some(offset) = self.offset {
            write!(f, " at offset {offset}")?;
        }
        Ok(())
    }
}

impl std::error::Error for DeclarationError {}

/// Convert chumsky error reason to a readable message
fn format_reason(reason: &RichReason<char>) -> String {
    match reason {
        RichReason::ExpectedFound { found, .. } => match found {
            Some(c) => format!("unexpected '{}'", c.escape_debug()),
            None => "unexpected end of declaration".to_string(),
        },
        RichReason::Custom(msg) => msg.to_string(),
    }
}

/// Collapse accumulated chumsky errors into one [`DeclarationError`],
/// keeping the earliest offset.
pub(crate) fn errors_to_declaration_error(
    errors: Vec<Rich<char>>,
    declaration: &str,
) -> DeclarationError {
    match errors.into_iter().next() {
        Some(e) => DeclarationError {
            declaration: declaration.to_string(),
            message: format_reason(e.reason()),
            offset: Some(e.span().start),
        },
        None => DeclarationError::new(declaration, "unrecognized declaration"),
    }
}
