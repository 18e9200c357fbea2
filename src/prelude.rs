// prelude.rs - Convenient re-exports for the idiomatic API.
//
//! # Prelude
//!
//! ```
//! use regexp_nfa::prelude::*;
//!
//! let re = Regex::new(r"[0-9]+").unwrap();
//! let m = re.find("answer: 42").unwrap();
//! assert_eq!(m.as_str(), "42");
//! ```

pub use crate::api::{
    is_match, quote_meta, Captures, CapturesIter, CapturesMatches, FindIter, Match, Regex,
    RegexBuilder,
};
pub use crate::error::RegexError;
pub use crate::regint::CompileOptions;
