//! # regexp-nfa
//!
//! Pure-Rust regular expressions compiled to a small Thompson NFA and run by
//! a backtracking-free simulation with leftmost-longest semantics and
//! submatch tracking. Literal prefixes are located with
//! [`memchr`](https://crates.io/crates/memchr) before the simulation starts.
//!
//! Matching time is bounded by `O(program size × text length)`; there is no
//! pathological input.
//!
//! ## Quick Start
//!
//! ```rust
//! use regexp_nfa::prelude::*;
//!
//! let re = Regex::new(r"a(b|c)*d").unwrap();
//! let caps = re.captures("xxabcbcd").unwrap();
//! assert_eq!(caps.get(0).unwrap().as_str(), "abcbcd");
//! assert_eq!(caps.get(1).unwrap().as_str(), "c");
//! ```
//!
//! For fine-grained control, use [`RegexBuilder`](api::RegexBuilder):
//!
//! ```rust
//! use regexp_nfa::prelude::*;
//!
//! let re = Regex::builder("[0-9]+")
//!     .dump_program(true)
//!     .build()
//!     .unwrap();
//! assert_eq!(re.replace_all("ab123cd45", "#"), "ab#cd#");
//! ```
//!
//! ## Pattern Syntax
//!
//! | Syntax | Meaning |
//! |--------|---------|
//! | `x` | literal rune; `\` escapes punctuation, `\a \b \f \n \r \t \v` name controls |
//! | `.` | any rune, newline included |
//! | `[abc]` `[a-z]` `[^0-9]` | character class; `-` first or last is literal |
//! | `^` `$` | beginning and end of the whole text |
//! | `x*` `x+` `x?` | zero or more, one or more, optional (no stacking) |
//! | `x\|y` | alternation |
//! | `(x)` | capture group, numbered by its opening parenthesis |
//!
//! ## Low-Level API
//!
//! The compiled program and the matcher are public too:
//!
//! ```rust
//! use regexp_nfa::regcomp::compile;
//! use regexp_nfa::regexec::execute;
//!
//! let prog = compile("[0-9]+").unwrap();
//! let slots = execute(&prog, b"ab123cd", 0).unwrap();
//! assert_eq!(&slots[..], &[2, 5]);
//! ```
//!
//! ## Module Structure
//!
//! | Module | Purpose |
//! |--------|---------|
//! | [`regparse`] | Recursive-descent parser producing the instruction graph |
//! | [`regcomp`] | Compile pipeline: no-op elimination, literal prefix |
//! | [`regexec`] | Match-vector arena and NFA simulation |
//! | [`regint`] | Instructions, character classes, `Program` |
//! | [`regerror`] | Error codes and messages |
//! | [`encodings`] | UTF-8 rune decoding |
//! | [`api`] | `Regex`, `Match`, `Captures` and friends |

pub mod api;
pub mod encodings;
pub mod error;
pub mod prelude;
pub mod regcomp;
pub mod regerror;
pub mod regexec;
pub mod regint;
pub mod regparse;
