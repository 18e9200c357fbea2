// regcomp.rs - Pattern compilation pipeline.
//
// parse -> link check -> no-op elimination -> literal prefix extraction.
// The result is an immutable Program ready for regexec.

use log::debug;

use crate::encodings::utf8::RUNE_ERROR;
use crate::error::RegexError;
use crate::regerror::ErrorCode;
use crate::regint::*;
use crate::regparse;

/// Compile `pattern` with default options.
pub fn compile(pattern: &str) -> Result<Program, RegexError> {
    compile_with_options(pattern, CompileOptions::empty())
}

/// Compile `pattern`. Fails on the first syntax error; there is no partial
/// program.
pub fn compile_with_options(
    pattern: &str,
    options: CompileOptions,
) -> Result<Program, RegexError> {
    let mut prog = Program::new(pattern, options);
    regparse::parse(&mut prog, pattern)?;
    dump_stage(&prog, "parsed");

    check_links(&prog)?;
    eliminate_nops(&mut prog);
    dump_stage(&prog, "nops eliminated");

    set_prefix(&mut prog);
    dump_stage(&prog, "prefix set");

    debug!(
        "compiled {:?}: {} insts, {} groups, prefix {:?}, anchored {}",
        prog.expr,
        prog.insts.len(),
        prog.num_bra,
        prog.prefix,
        prog.is_anchored()
    );
    Ok(prog)
}

fn dump_stage(prog: &Program, stage: &str) {
    if prog.options.contains(CompileOptions::DUMP_PROGRAM) {
        debug!("{:?} {}:\n{}", prog.expr, stage, prog);
    }
}

/// Every instruction but `End` must have been linked by the parser.
fn check_links(prog: &Program) -> Result<(), ErrorCode> {
    let len = prog.insts.len();
    for inst in &prog.insts {
        if matches!(inst.op, Op::End) {
            continue;
        }
        if inst.next >= len {
            return Err(ErrorCode::Internal);
        }
        if let Op::Alt { left } = inst.op {
            if left >= len {
                return Err(ErrorCode::Internal);
            }
        }
    }
    Ok(())
}

// ============================================================================
// No-op elimination
// ============================================================================

fn un_nop(prog: &Program, mut id: InstId) -> InstId {
    while matches!(prog.insts[id].op, Op::Nop) {
        id = prog.insts[id].next;
    }
    id
}

/// Redirect every `next`/`left` link past chains of `Nop`s. The `Nop`s stay
/// in the array but become unreachable.
pub fn eliminate_nops(prog: &mut Program) {
    for i in 0..prog.insts.len() {
        if matches!(prog.insts[i].op, Op::End) {
            continue;
        }
        let next = un_nop(prog, prog.insts[i].next);
        prog.insts[i].next = next;
        if let Op::Alt { left } = prog.insts[i].op {
            let left = un_nop(prog, left);
            prog.insts[i].op = Op::Alt { left };
        }
    }
}

// ============================================================================
// Literal prefix
// ============================================================================

/// Collect the plain characters every match must begin with, skipping a
/// leading `^`. Stops at the first non-`Char`, or before a `Char` whose
/// successor can match the empty string (`^`, `$`, or an `Alt`).
pub fn set_prefix(prog: &mut Program) {
    let mut prefix = String::new();
    let mut id = prog.first();
    while matches!(prog.insts[id].op, Op::BeginText) {
        id = prog.insts[id].next;
    }
    loop {
        let inst = &prog.insts[id];
        let Op::Char(c) = inst.op else {
            break;
        };
        // also matches malformed input, which a byte search cannot see
        if c == RUNE_ERROR {
            break;
        }
        if matches!(
            prog.insts[inst.next].op,
            Op::BeginText | Op::EndText | Op::Alt { .. }
        ) {
            break;
        }
        prefix.push(c);
        id = inst.next;
    }
    prog.prefix = prefix;
    prog.prefix_start = id;
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    fn prefix_of(pattern: &str) -> (String, Op) {
        let prog = compile(pattern).unwrap();
        (prog.prefix.clone(), prog.insts[prog.prefix_start].op.clone())
    }

    #[test]
    fn keeps_source_text() {
        for pattern in ["", "a", "a(b|c)*d", "[^\\n]+$"] {
            assert_eq!(compile(pattern).unwrap().expr, pattern);
        }
    }

    #[test]
    fn capture_count() {
        assert_eq!(compile("(a)(b(c))").unwrap().num_bra, 3);
        assert_eq!(compile("abc").unwrap().num_bra, 0);
        assert_eq!(compile("(a|(b))*").unwrap().num_bra, 2);
    }

    #[test]
    fn no_nop_is_reachable() {
        for pattern in ["", "a?", "a|b", "(|a)*", "(a?)?b", "x(|)y"] {
            let prog = compile(pattern).unwrap();
            for inst in &prog.insts {
                if matches!(inst.op, Op::End) {
                    continue;
                }
                assert!(!matches!(prog.insts[inst.next].op, Op::Nop), "{}", pattern);
                if let Op::Alt { left } = inst.op {
                    assert!(!matches!(prog.insts[left].op, Op::Nop), "{}", pattern);
                }
            }
        }
    }

    #[test]
    fn empty_pattern_goes_straight_to_end() {
        let prog = compile("").unwrap();
        assert!(matches!(prog.insts[prog.first()].op, Op::End));
    }

    #[test]
    fn plain_literal_prefix() {
        assert_eq!(prefix_of("abc"), ("abc".to_string(), Op::End));
        assert_eq!(prefix_of("日本語"), ("日本語".to_string(), Op::End));
    }

    #[test]
    fn prefix_skips_leading_anchor() {
        assert_eq!(prefix_of("^abc"), ("abc".to_string(), Op::End));
    }

    #[test]
    fn prefix_stops_before_empty_matchers() {
        // 'c' is followed by '$', 'b' by the closure's alt
        assert_eq!(prefix_of("abc$"), ("ab".to_string(), Op::Char('c')));
        assert_eq!(prefix_of("ab*"), ("".to_string(), Op::Char('a')));
        assert_eq!(prefix_of("abc*"), ("a".to_string(), Op::Char('b')));
        assert_eq!(prefix_of("ab+c").0, "a");
    }

    #[test]
    fn prefix_stops_at_non_char() {
        assert_eq!(prefix_of("ab(c)").0, "ab");
        assert_eq!(prefix_of("ab.").0, "ab");
        assert_eq!(prefix_of("a|b").0, "");
        assert_eq!(prefix_of("[ab]c").0, "");
        assert_eq!(prefix_of("(abc)").0, "");
    }

    #[test]
    fn prefix_stops_at_replacement_char() {
        assert_eq!(prefix_of("\u{FFFD}b").0, "");
        assert_eq!(prefix_of("ab\u{FFFD}c").0, "ab");
    }

    #[test]
    fn anchoring() {
        assert!(compile("^abc").unwrap().is_anchored());
        assert!(!compile("abc").unwrap().is_anchored());
        assert!(!compile("^a|b").unwrap().is_anchored());
        assert!(!compile("(^a)").unwrap().is_anchored());
    }

    #[test]
    fn literal_prefix_completeness() {
        let prog = compile("abc").unwrap();
        assert_eq!(prog.literal_prefix(), ("abc", true));
        let prog = compile("abc+").unwrap();
        assert_eq!(prog.literal_prefix(), ("ab", false));
        let prog = compile("^abc").unwrap();
        assert_eq!(prog.literal_prefix(), ("abc", false));
        let prog = compile("").unwrap();
        assert_eq!(prog.literal_prefix(), ("", true));
    }

    #[test]
    fn prefix_is_computed_even_without_scan() {
        let prog = compile_with_options("abc", CompileOptions::NO_PREFIX_SCAN).unwrap();
        assert_eq!(prog.prefix, "abc");
    }

    #[test]
    fn errors_carry_code_and_message() {
        let err = compile("(").unwrap_err();
        assert_eq!(err.code(), ErrorCode::UnmatchedLpar);
        assert_eq!(err.message(), "unmatched '('");
        let err = compile("a**").unwrap_err();
        assert_eq!(err.code(), ErrorCode::BadClosure);
    }

    #[test]
    fn dump_lists_every_instruction() {
        let prog = compile_with_options("a(b)?", CompileOptions::DUMP_PROGRAM).unwrap();
        let dump = prog.to_string();
        assert!(dump.starts_with("prefix <>\n"));
        assert!(dump.contains("0: start -> "));
        assert!(dump.contains("char a"));
        assert!(dump.contains("bra1"));
        assert!(dump.contains("ebra1"));
        assert!(dump.contains(": end\n"));
        assert_eq!(dump.lines().count(), prog.insts.len() + 1);
    }
}
