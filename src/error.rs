// error.rs - Idiomatic Rust error type for compilation failures.
//
// Groups the parse error codes into a pattern-error variant and an
// engine-defect variant while preserving the original code.

use std::fmt;

use crate::regerror::{error_code_to_format, is_internal_error, ErrorCode};

/// Error type for regex compilation.
///
/// Matching never fails; only [`compile`](crate::regcomp::compile) and the
/// constructors built on it return this.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RegexError {
    /// Syntax error in the pattern.
    Syntax { code: ErrorCode, message: String },
    /// Internal engine bug (should not occur in correct usage).
    InternalBug { code: ErrorCode, message: String },
}

impl fmt::Display for RegexError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RegexError::Syntax { message, .. } => write!(f, "syntax error: {}", message),
            RegexError::InternalBug { message, .. } => write!(f, "internal error: {}", message),
        }
    }
}

impl std::error::Error for RegexError {}

impl From<ErrorCode> for RegexError {
    fn from(code: ErrorCode) -> Self {
        let message = error_code_to_format(code).to_string();
        if is_internal_error(code) {
            RegexError::InternalBug { code, message }
        } else {
            RegexError::Syntax { code, message }
        }
    }
}

impl RegexError {
    /// Returns the parse error code.
    pub fn code(&self) -> ErrorCode {
        match self {
            RegexError::Syntax { code, .. } => *code,
            RegexError::InternalBug { code, .. } => *code,
        }
    }

    /// Returns the canonical message, without the `syntax error:` prefix.
    pub fn message(&self) -> &str {
        match self {
            RegexError::Syntax { message, .. } => message,
            RegexError::InternalBug { message, .. } => message,
        }
    }
}
