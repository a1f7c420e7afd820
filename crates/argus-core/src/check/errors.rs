//! Run-time check failures.

use std::fmt;

/// Whether a failure concerns a call's arguments or its results.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Subject {
    Argument,
    Result,
}

impl Subject {
    fn noun(self) -> &'static str {
        match self {
            Subject::Argument => "argument",
            Subject::Result => "result",
        }
    }

    fn preposition(self) -> &'static str {
        match self {
            Subject::Argument => "to",
            Subject::Result => "from",
        }
    }
}

/// A failed call-time check. Raised at the point of detection and never
/// retried; a result failure signals a contract violation inside the
/// wrapped function rather than caller misuse.
#[derive(Debug, Clone)]
pub enum CheckError {
    /// A value failed every acceptable token at some position.
    Mismatch {
        subject: Subject,
        name: String,
        position: usize,
        message: String,
    },
    /// More values supplied or returned than the declaration allows.
    TooMany {
        subject: Subject,
        name: String,
        max: usize,
        got: usize,
    },
    /// The wrapped function's own error, passed through unchanged.
    Host(String),
}

impl fmt::Display for CheckError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CheckError::Mismatch {
                subject,
                name,
                position,
                message,
            } => write!(
                f,
                "bad {} #{} {} '{}' ({})",
                subject.noun(),
                position,
                subject.preposition(),
                name,
                message
            ),
            CheckError::TooMany {
                subject,
                name,
                max,
                got,
            } => {
                let noun = subject.noun();
                let plural = if *max == 1 { "" } else { "s" };
                write!(
                    f,
                    "bad {} #{} {} '{}' (no more than {} {}{} expected, got {})",
                    noun,
                    max + 1,
                    subject.preposition(),
                    name,
                    max,
                    noun,
                    plural,
                    got
                )
            }
            CheckError::Host(message) => write!(f, "{message}"),
        }
    }
}

impl std::error::Error for CheckError {}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_argument_mismatch_display() {
        let err = CheckError::Mismatch {
            subject: Subject::Argument,
            name: "f".to_string(),
            position: 2,
            message: "integer expected, got string".to_string(),
        };
        assert_eq!(
            err.to_string(),
            "bad argument #2 to 'f' (integer expected, got string)"
        );
    }

    #[test]
    fn test_result_mismatch_display() {
        let err = CheckError::Mismatch {
            subject: Subject::Result,
            name: "f".to_string(),
            position: 1,
            message: "string expected, got nil".to_string(),
        };
        assert_eq!(
            err.to_string(),
            "bad result #1 from 'f' (string expected, got nil)"
        );
    }

    #[test]
    fn test_too_many_display_singular_and_plural() {
        let err = CheckError::TooMany {
            subject: Subject::Argument,
            name: "f".to_string(),
            max: 1,
            got: 2,
        };
        assert_eq!(
            err.to_string(),
            "bad argument #2 to 'f' (no more than 1 argument expected, got 2)"
        );

        let err = CheckError::TooMany {
            subject: Subject::Result,
            name: "f".to_string(),
            max: 2,
            got: 4,
        };
        assert_eq!(
            err.to_string(),
            "bad result #3 from 'f' (no more than 2 results expected, got 4)"
        );
    }

    #[test]
    fn test_host_error_passthrough() {
        let err = CheckError::Host("disk full".to_string());
        assert_eq!(err.to_string(), "disk full");
    }
}
