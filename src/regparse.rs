// regparse.rs - Recursive-descent parser.
// Turns a pattern into the raw instruction graph of a Program.
//
// Grammar:
//
//   regexp        := concatenation ('|' concatenation)*
//   concatenation := closure*
//   closure       := term ('*' | '+' | '?')?
//   term          := '^' | '$' | '.' | char | '[' class ']' | '(' regexp ')'
//   class         := '^'? (char ('-' char)?)*
//
// Each production returns a fragment: the ids of its first and last
// instruction. The last instruction's `next` stays unpatched until the
// caller links the fragment to whatever follows it.

use crate::encodings::utf8::decode_rune;
use crate::regerror::ErrorCode;
use crate::regint::*;

/// A partially linked piece of the graph: (first, last).
type Frag = (InstId, InstId);

// ============================================================================
// Character helpers
// ============================================================================

/// Characters that are metacharacters outside a class.
pub fn is_special(c: char) -> bool {
    matches!(
        c,
        '\\' | '.' | '+' | '*' | '?' | '(' | ')' | '|' | '[' | ']' | '^' | '$'
    )
}

fn is_punct(c: char) -> bool {
    c.is_ascii_punctuation()
}

/// Control character named by `\a \b \f \n \r \t \v`.
fn escape(c: char) -> Option<char> {
    match c {
        'a' => Some('\x07'),
        'b' => Some('\x08'),
        'f' => Some('\x0c'),
        'n' => Some('\n'),
        'r' => Some('\r'),
        't' => Some('\t'),
        'v' => Some('\x0b'),
        _ => None,
    }
}

// ============================================================================
// Parser
// ============================================================================

pub struct Parser<'a> {
    prog: &'a mut Program,
    pattern: &'a [u8],
    /// Byte offset of the rune after `ch`.
    pos: usize,
    /// Current rune; `None` once the pattern is exhausted.
    ch: Option<char>,
    /// Number of `(` still waiting for their `)`.
    nlpar: usize,
}

impl<'a> Parser<'a> {
    pub fn new(prog: &'a mut Program, pattern: &'a str) -> Self {
        let mut p = Parser {
            prog,
            pattern: pattern.as_bytes(),
            pos: 0,
            ch: None,
            nlpar: 0,
        };
        p.nextc();
        p
    }

    /// Parse the whole pattern into `prog`: `Start -> regexp -> End`.
    pub fn parse(mut self) -> Result<(), ErrorCode> {
        let start = self.prog.add(Op::Start);
        self.prog.start = start;
        let (s, e) = self.regexp()?;
        self.prog.set_next(start, s);
        let end = self.prog.add(Op::End);
        self.prog.set_next(e, end);
        Ok(())
    }

    #[inline]
    fn c(&self) -> Option<char> {
        self.ch
    }

    fn nextc(&mut self) -> Option<char> {
        let (c, width) = decode_rune(self.pattern, self.pos);
        self.ch = if width == 0 { None } else { Some(c) };
        self.pos += width;
        self.ch
    }

    /// The rune after the current one, without consuming anything.
    fn peek(&self) -> Option<char> {
        let (c, width) = decode_rune(self.pattern, self.pos);
        (width != 0).then_some(c)
    }

    /// Resolve a backslash escape starting at the current rune `c`.
    fn check_backslash(&mut self, c: char) -> Result<char, ErrorCode> {
        if c != '\\' {
            return Ok(c);
        }
        match self.nextc() {
            None => Err(ErrorCode::ExtraneousBackslash),
            Some(c) if is_punct(c) => Ok(c),
            Some(c) => escape(c).ok_or(ErrorCode::BadBackslash),
        }
    }

    /// Parse the body of `[...]`; the opening bracket is already consumed and
    /// the closing one is left for the caller.
    fn char_class(&mut self) -> Result<InstId, ErrorCode> {
        let mut cc = CharClass::new();
        if self.c() == Some('^') {
            cc.negate = true;
            self.nextc();
        }
        let mut first = true;
        let mut left: Option<char> = None;
        loop {
            match self.c() {
                Some(']') | None => {
                    // a '-' right before ']' is literal
                    if let Some(l) = left {
                        cc.add_range(l, l);
                        cc.add_range('-', '-');
                    }
                    return Ok(self.finish_class(cc));
                }
                // '-' only means something between two collected characters;
                // checked before backslash processing so `\-` stays literal.
                Some('-') if !first && self.peek() != Some(']') => {
                    return Err(ErrorCode::BadRange)
                }
                Some(c) => {
                    let c = self.check_backslash(c)?;
                    self.nextc();
                    first = false;
                    match left {
                        None => {
                            if self.c() == Some('-') {
                                self.nextc();
                                left = Some(c);
                            } else {
                                cc.add_range(c, c);
                            }
                        }
                        Some(l) if l <= c => {
                            cc.add_range(l, c);
                            left = None;
                        }
                        Some(_) => return Err(ErrorCode::BadRange),
                    }
                }
            }
        }
    }

    /// Emit the instruction for a finished class, collapsing the common
    /// single-rune shapes.
    fn finish_class(&mut self, cc: CharClass) -> InstId {
        let collapsed = match cc.ranges.as_slice() {
            // [^\n]
            [('\n', '\n')] if cc.negate => Some(Op::AnyCharNotNL),
            // [a] -> a
            &[(lo, hi)] if !cc.negate && lo == hi => Some(Op::Char(lo)),
            _ => None,
        };
        let op = collapsed.unwrap_or_else(|| Op::CharClass(cc));
        self.prog.add(op)
    }

    fn term(&mut self) -> Result<Option<Frag>, ErrorCode> {
        match self.c() {
            None | Some('|') => Ok(None),
            Some('*' | '+' | '?') => Err(ErrorCode::BareClosure),
            Some(')') => {
                if self.nlpar == 0 {
                    return Err(ErrorCode::UnmatchedRpar);
                }
                Ok(None)
            }
            Some(']') => Err(ErrorCode::UnmatchedRbkt),
            Some('^') => {
                self.nextc();
                let i = self.prog.add(Op::BeginText);
                Ok(Some((i, i)))
            }
            Some('$') => {
                self.nextc();
                let i = self.prog.add(Op::EndText);
                Ok(Some((i, i)))
            }
            Some('.') => {
                self.nextc();
                let i = self.prog.add(Op::AnyChar);
                Ok(Some((i, i)))
            }
            Some('[') => {
                self.nextc();
                let i = self.char_class()?;
                if self.c() != Some(']') {
                    return Err(ErrorCode::UnmatchedLbkt);
                }
                self.nextc();
                Ok(Some((i, i)))
            }
            Some('(') => {
                self.nextc();
                self.nlpar += 1;
                // number before recursing so outer groups come first
                self.prog.num_bra += 1;
                let nbra = self.prog.num_bra;
                let (start, end) = self.regexp()?;
                if self.c() != Some(')') {
                    return Err(ErrorCode::UnmatchedLpar);
                }
                self.nlpar -= 1;
                self.nextc();
                let bra = self.prog.add(Op::Bra(2 * nbra));
                let ebra = self.prog.add(Op::Bra(2 * nbra + 1));
                self.prog.set_next(bra, start);
                self.prog.set_next(end, ebra);
                Ok(Some((bra, ebra)))
            }
            Some(c) => {
                let c = self.check_backslash(c)?;
                self.nextc();
                let i = self.prog.add(Op::Char(c));
                Ok(Some((i, i)))
            }
        }
    }

    fn closure(&mut self) -> Result<Option<Frag>, ErrorCode> {
        let Some((mut start, mut end)) = self.term()? else {
            return Ok(None);
        };
        match self.c() {
            Some('*') => {
                // (start,end)*: loop back through alt, alt is both ends
                let alt = self.prog.add(Op::Alt { left: start });
                self.prog.set_next(end, alt);
                start = alt;
                end = alt;
            }
            Some('+') => {
                // (start,end)+: same loop, but entry is unconditional
                let alt = self.prog.add(Op::Alt { left: start });
                self.prog.set_next(end, alt);
                end = alt;
            }
            Some('?') => {
                // (start,end)?: both branches join at nop
                let alt = self.prog.add(Op::Alt { left: start });
                let nop = self.prog.add(Op::Nop);
                self.prog.set_next(alt, nop);
                self.prog.set_next(end, nop);
                start = alt;
                end = nop;
            }
            _ => return Ok(Some((start, end))),
        }
        if matches!(self.nextc(), Some('*' | '+' | '?')) {
            return Err(ErrorCode::BadClosure);
        }
        Ok(Some((start, end)))
    }

    fn concatenation(&mut self) -> Result<Frag, ErrorCode> {
        let mut frag: Option<Frag> = None;
        loop {
            match (self.closure()?, frag) {
                // the empty string
                (None, None) => {
                    let nop = self.prog.add(Op::Nop);
                    return Ok((nop, nop));
                }
                (None, Some(f)) => return Ok(f),
                (Some(f), None) => frag = Some(f),
                (Some((nstart, nend)), Some((start, end))) => {
                    self.prog.set_next(end, nstart);
                    frag = Some((start, nend));
                }
            }
        }
    }

    fn regexp(&mut self) -> Result<Frag, ErrorCode> {
        let (mut start, mut end) = self.concatenation()?;
        while self.c() == Some('|') {
            self.nextc();
            let (nstart, nend) = self.concatenation()?;
            let alt = self.prog.add(Op::Alt { left: start });
            self.prog.set_next(alt, nstart);
            let nop = self.prog.add(Op::Nop);
            self.prog.set_next(end, nop);
            self.prog.set_next(nend, nop);
            start = alt;
            end = nop;
        }
        Ok((start, end))
    }
}

/// Parse `pattern` into the empty program `prog`.
pub fn parse(prog: &mut Program, pattern: &str) -> Result<(), ErrorCode> {
    Parser::new(prog, pattern).parse()
}

// ============================================================================
// Tests
// ============================================================================
