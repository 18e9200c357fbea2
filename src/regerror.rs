// regerror.rs - Parse error kinds and their canonical messages.
//
// Every compile failure is one of these kinds. The message table is the
// single source of the human-readable text carried by `RegexError`.

use std::fmt;

/// The ways a pattern can fail to parse.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorCode {
    /// The parser reached a state it should never reach.
    Internal,
    /// `(` without a closing `)`.
    UnmatchedLpar,
    /// `)` without an opening `(`.
    UnmatchedRpar,
    /// `[` without a closing `]`.
    UnmatchedLbkt,
    /// `]` outside of a character class.
    UnmatchedRbkt,
    /// Malformed or reversed range inside a character class.
    BadRange,
    /// A backslash at the very end of the pattern.
    ExtraneousBackslash,
    /// A closure applied to a closure (`a**`, `a+?`, ...).
    BadClosure,
    /// A closure with nothing before it (`*a`).
    BareClosure,
    /// A backslash followed by a character that has no escape meaning.
    BadBackslash,
}

/// Get the canonical message for an error code.
pub fn error_code_to_format(code: ErrorCode) -> &'static str {
    match code {
        ErrorCode::Internal => "internal error",
        ErrorCode::UnmatchedLpar => "unmatched '('",
        ErrorCode::UnmatchedRpar => "unmatched ')'",
        ErrorCode::UnmatchedLbkt => "unmatched '['",
        ErrorCode::UnmatchedRbkt => "unmatched ']'",
        ErrorCode::BadRange => "bad range in character class",
        ErrorCode::ExtraneousBackslash => "extraneous backslash",
        ErrorCode::BadClosure => "repeated closure (**, ++, etc.)",
        ErrorCode::BareClosure => "closure applies to nothing",
        ErrorCode::BadBackslash => "illegal backslash escape",
    }
}

/// Check if an error code reports a defect in the engine rather than in the
/// pattern.
pub fn is_internal_error(code: ErrorCode) -> bool {
    matches!(code, ErrorCode::Internal)
}

impl fmt::Display for ErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(error_code_to_format(*self))
    }
}
