// regint.rs - Internal program representation.
// Instruction graph, character classes, compile options and the compiled
// Program shared by the parser, the prefix optimizer and the matcher.

use std::fmt;

use bitflags::bitflags;

use crate::encodings::utf8::MAX_RUNE;

// === Index Types ===

/// Index of an instruction inside [`Program::insts`].
pub type InstId = usize;

/// Placeholder link of an instruction whose successor is not patched yet.
/// Only the final `End` instruction keeps it once compilation succeeds.
pub const NO_INST: InstId = InstId::MAX;

/// Slot value of a capture group that did not participate in the match.
pub const NOTPOS: isize = -1;

// === Compile Options ===

bitflags! {
    /// Flags accepted by [`compile_with_options`](crate::regcomp::compile_with_options).
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
    pub struct CompileOptions: u32 {
        /// Log the instruction graph after every compile stage.
        const DUMP_PROGRAM = 1 << 0;
        /// Never use the literal prefix to skip ahead in the subject.
        const NO_PREFIX_SCAN = 1 << 1;
    }
}

// === Character Class ===

/// A bracketed character class such as `[a-z_]` or `[^0-9]`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CharClass {
    pub negate: bool,
    /// Closed ranges in the order they were written; `x` is stored as `(x, x)`.
    pub ranges: Vec<(char, char)>,
    pub cmin: char,
    pub cmax: char,
}

impl CharClass {
    pub fn new() -> Self {
        // cmin > cmax until the first range lands, so every rune takes the
        // out-of-bounds path.
        CharClass {
            negate: false,
            ranges: Vec::with_capacity(2),
            cmin: MAX_RUNE,
            cmax: '\0',
        }
    }

    /// Add the inclusive range `lo..=hi`.
    pub fn add_range(&mut self, lo: char, hi: char) {
        self.ranges.push((lo, hi));
        if lo < self.cmin {
            self.cmin = lo;
        }
        if hi > self.cmax {
            self.cmax = hi;
        }
    }

    /// Class membership: `negate XOR (c in any range)`.
    #[inline]
    pub fn matches(&self, c: char) -> bool {
        if c < self.cmin || c > self.cmax {
            return self.negate;
        }
        for &(lo, hi) in &self.ranges {
            if lo <= c && c <= hi {
                return !self.negate;
            }
        }
        self.negate
    }
}

impl Default for CharClass {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for CharClass {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("charclass")?;
        if self.negate {
            f.write_str(" (negated)")?;
        }
        for &(lo, hi) in &self.ranges {
            if lo == hi {
                write!(f, " [{}]", lo.escape_debug())?;
            } else {
                write!(f, " [{}-{}]", lo.escape_debug(), hi.escape_debug())?;
            }
        }
        Ok(())
    }
}

// === Instructions ===

/// What an instruction does when the matcher reaches it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Op {
    /// Entry point of the program.
    Start,
    /// Accept: the thread that reaches it has matched.
    End,
    /// `^`, beginning of text.
    BeginText,
    /// `$`, end of text.
    EndText,
    /// A literal rune.
    Char(char),
    /// `[...]`
    CharClass(CharClass),
    /// `.`, any rune including newline.
    AnyChar,
    /// `[^\n]`, any rune but newline.
    AnyCharNotNL,
    /// Group marker: `2*n` opens group `n`, `2*n+1` closes it.
    Bra(usize),
    /// Nondeterministic choice between `left` and the instruction's `next`.
    Alt { left: InstId },
    /// Does nothing; removed from every path before matching.
    Nop,
}

impl Op {
    /// True for instructions that advance over one rune of input.
    #[inline]
    pub fn is_consuming(&self) -> bool {
        matches!(
            self,
            Op::Char(_) | Op::CharClass(_) | Op::AnyChar | Op::AnyCharNotNL
        )
    }
}

/// One node of the instruction graph.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Inst {
    pub op: Op,
    pub next: InstId,
}

impl fmt::Display for Inst {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.op {
            Op::Start => f.write_str("start"),
            Op::End => f.write_str("end"),
            Op::BeginText => f.write_str("bot"),
            Op::EndText => f.write_str("eot"),
            Op::Char(c) => write!(f, "char {}", c.escape_debug()),
            Op::CharClass(cc) => fmt::Display::fmt(cc, f),
            Op::AnyChar => f.write_str("any"),
            Op::AnyCharNotNL => f.write_str("notnl"),
            Op::Bra(n) if n % 2 == 0 => write!(f, "bra{}", n / 2),
            Op::Bra(n) => write!(f, "ebra{}", n / 2),
            Op::Alt { left } => write!(f, "alt({})", left),
            Op::Nop => f.write_str("nop"),
        }
    }
}

// === Program ===

/// A compiled regular expression: an append-only instruction graph plus the
/// facts the matcher needs about it. Immutable once compilation returns.
#[derive(Debug, Clone)]
pub struct Program {
    /// The source pattern.
    pub expr: String,
    pub insts: Vec<Inst>,
    /// The `Start` instruction; always 0.
    pub start: InstId,
    /// Number of parenthesized subexpressions (group 0 not included).
    pub num_bra: usize,
    /// Literal text every match begins with (after a leading `^`).
    pub prefix: String,
    /// First instruction after the literal prefix.
    pub prefix_start: InstId,
    pub options: CompileOptions,
}

impl Program {
    pub fn new(expr: &str, options: CompileOptions) -> Self {
        Program {
            expr: expr.to_string(),
            insts: Vec::with_capacity(10),
            start: 0,
            num_bra: 0,
            prefix: String::new(),
            prefix_start: NO_INST,
            options,
        }
    }

    /// Append an instruction with an unpatched `next` link.
    pub fn add(&mut self, op: Op) -> InstId {
        self.insts.push(Inst { op, next: NO_INST });
        self.insts.len() - 1
    }

    #[inline]
    pub fn set_next(&mut self, id: InstId, next: InstId) {
        self.insts[id].next = next;
    }

    /// First real instruction, the successor of `Start`.
    #[inline]
    pub fn first(&self) -> InstId {
        self.insts[self.start].next
    }

    /// Anchored programs begin with `^` and can only match at offset 0.
    #[inline]
    pub fn is_anchored(&self) -> bool {
        matches!(self.insts[self.first()].op, Op::BeginText)
    }

    /// Width of a match vector: a start/end pair per group, group 0 included.
    #[inline]
    pub fn num_slots(&self) -> usize {
        2 * (self.num_bra + 1)
    }

    /// The literal prefix, and whether it is the whole pattern.
    pub fn literal_prefix(&self) -> (&str, bool) {
        let complete = !self.is_anchored()
            && self
                .insts
                .get(self.prefix_start)
                .is_some_and(|inst| matches!(inst.op, Op::End));
        (&self.prefix, complete)
    }
}

impl fmt::Display for Program {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "prefix <{}>", self.prefix)?;
        for (i, inst) in self.insts.iter().enumerate() {
            write!(f, "{}: {}", i, inst)?;
            if inst.next != NO_INST {
                write!(f, " -> {}", inst.next)?;
            }
            writeln!(f)?;
        }
        Ok(())
    }
}
