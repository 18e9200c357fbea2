// regexec.rs - NFA simulation.
// Match-vector arena, deduplicating thread lists, the lock-step matcher and
// the driving loop behind every "all matches" operation.
//
// Threads advance one rune at a time over two alternating lists. A list never
// holds two threads on the same instruction; the earliest-started thread
// claims it, which bounds the work per position by the program size.

use log::trace;
use memchr::memmem;
use smallvec::SmallVec;

use crate::encodings::utf8::decode_rune;
use crate::regint::*;

/// Flat submatch positions: `[start0, end0, start1, end1, ...]`, with
/// [`NOTPOS`] for groups that did not participate.
pub type Slots = SmallVec<[isize; 8]>;

// ============================================================================
// Match-vector arena
// ============================================================================

/// Handle of a vector inside a [`MatchArena`].
pub type VecId = usize;

/// Vectors are handed out in blocks of this many.
const ARENA_BLOCK: usize = 10;

/// Pool of fixed-width, reference-counted match vectors backed by one flat
/// buffer. Scoped to a single matcher; never shared between threads.
///
/// A freshly allocated vector has no references. Every thread-list entry and
/// the best-match holder own one reference each; a vector returns to the free
/// list when its count drops back to zero.
#[derive(Debug)]
pub struct MatchArena {
    width: usize,
    slots: Vec<isize>,
    refs: Vec<usize>,
    free: Vec<VecId>,
}

impl MatchArena {
    pub fn new(width: usize) -> Self {
        MatchArena {
            width,
            slots: Vec::with_capacity(width * ARENA_BLOCK),
            refs: Vec::with_capacity(ARENA_BLOCK),
            free: Vec::with_capacity(ARENA_BLOCK),
        }
    }

    /// Forget every vector but keep the storage.
    pub fn reset(&mut self) {
        self.slots.clear();
        self.refs.clear();
        self.free.clear();
    }

    /// Number of vectors ever handed out, free or not.
    pub fn capacity(&self) -> usize {
        self.refs.len()
    }

    /// Number of vectors waiting on the free list.
    pub fn free_count(&self) -> usize {
        self.free.len()
    }

    /// Add a block of vectors; returns the first, the rest go on the free list.
    fn grow(&mut self) -> VecId {
        let base = self.refs.len();
        self.slots.resize(self.slots.len() + self.width * ARENA_BLOCK, NOTPOS);
        self.refs.resize(base + ARENA_BLOCK, 0);
        self.free.extend((base + 1..base + ARENA_BLOCK).rev());
        base
    }

    /// A vector with no references and unspecified contents.
    pub fn alloc(&mut self) -> VecId {
        let v = match self.free.pop() {
            Some(v) => v,
            None => self.grow(),
        };
        self.refs[v] = 0;
        v
    }

    /// A fresh vector with every slot unset, owned by the caller.
    pub fn no_match(&mut self) -> VecId {
        let v = self.alloc();
        self.get_mut(v).fill(NOTPOS);
        self.refs[v] = 1;
        v
    }

    /// An unreferenced copy of `v`.
    pub fn copy(&mut self, v: VecId) -> VecId {
        let c = self.alloc();
        let w = self.width;
        self.slots.copy_within(v * w..(v + 1) * w, c * w);
        c
    }

    #[inline]
    pub fn retain(&mut self, v: VecId) {
        self.refs[v] += 1;
    }

    /// Drop one reference; the vector is recycled once none remain.
    #[inline]
    pub fn free(&mut self, v: VecId) {
        debug_assert!(self.refs[v] > 0, "vector {} freed too often", v);
        self.refs[v] -= 1;
        if self.refs[v] == 0 {
            self.free.push(v);
        }
    }

    /// Recycle `v` if nothing ever took a reference to it.
    #[inline]
    pub fn release_unused(&mut self, v: VecId) {
        if self.refs[v] == 0 {
            self.free.push(v);
        }
    }

    #[inline]
    pub fn refs(&self, v: VecId) -> usize {
        self.refs[v]
    }

    /// Write one slot. Only the sole owner may do this.
    #[inline]
    pub fn stamp(&mut self, v: VecId, slot: usize, pos: isize) {
        debug_assert!(self.refs[v] <= 1, "stamping shared vector {}", v);
        self.slots[v * self.width + slot] = pos;
    }

    #[inline]
    pub fn get(&self, v: VecId) -> &[isize] {
        &self.slots[v * self.width..(v + 1) * self.width]
    }

    #[inline]
    fn get_mut(&mut self, v: VecId) -> &mut [isize] {
        &mut self.slots[v * self.width..(v + 1) * self.width]
    }
}

// ============================================================================
// Thread lists
// ============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct Thread {
    inst: InstId,
    m: VecId,
}

/// Insertion-ordered set of threads keyed by instruction, with O(1)
/// membership and O(1) clear (sparse-set representation).
#[derive(Debug)]
struct ThreadList {
    dense: Vec<Thread>,
    sparse: Box<[usize]>,
}

impl ThreadList {
    fn new(size: usize) -> Self {
        ThreadList {
            dense: Vec::with_capacity(size),
            sparse: vec![0; size].into_boxed_slice(),
        }
    }

    #[inline]
    fn contains(&self, inst: InstId) -> bool {
        let i = self.sparse[inst];
        i < self.dense.len() && self.dense[i].inst == inst
    }

    #[inline]
    fn push(&mut self, t: Thread) {
        self.sparse[t.inst] = self.dense.len();
        self.dense.push(t);
    }

    #[inline]
    fn len(&self) -> usize {
        self.dense.len()
    }

    #[inline]
    fn is_empty(&self) -> bool {
        self.dense.is_empty()
    }

    #[inline]
    fn clear(&mut self) {
        self.dense.clear();
    }
}

// ============================================================================
// Matcher
// ============================================================================

/// Per-subject matching state. Reusable across calls to [`Matcher::exec`] on
/// the same text; each call starts from a clean arena.
pub struct Matcher<'p, 't> {
    prog: &'p Program,
    text: &'t [u8],
    arena: MatchArena,
    lists: [ThreadList; 2],
    stack: Vec<(InstId, VecId)>,
}

impl<'p, 't> Matcher<'p, 't> {
    pub fn new(prog: &'p Program, text: &'t [u8]) -> Self {
        let n = prog.insts.len();
        Matcher {
            prog,
            text,
            arena: MatchArena::new(prog.num_slots()),
            lists: [ThreadList::new(n), ThreadList::new(n)],
            stack: Vec::new(),
        }
    }

    /// Follow the zero-width instructions reachable from `inst` at `pos` and
    /// add every thread that lands on a consuming instruction, `End` or an
    /// `Alt` to list `which`.
    fn add_state(&mut self, which: usize, inst: InstId, m: VecId, pos: usize) {
        let prog = self.prog;
        let end = self.text.len();
        self.stack.push((inst, m));
        while let Some((mut id, m)) = self.stack.pop() {
            loop {
                let inst = &prog.insts[id];
                match inst.op {
                    Op::BeginText => {
                        if pos != 0 {
                            break;
                        }
                        id = inst.next;
                    }
                    Op::EndText => {
                        if pos != end {
                            break;
                        }
                        id = inst.next;
                    }
                    Op::Bra(n) => {
                        self.arena.stamp(m, n, pos as isize);
                        id = inst.next;
                    }
                    _ => {
                        let list = &mut self.lists[which];
                        if list.contains(id) {
                            break;
                        }
                        list.push(Thread { inst: id, m });
                        self.arena.retain(m);
                        if let Op::Alt { left } = inst.op {
                            // each branch stamps its own copy; left is
                            // explored first
                            let r = self.arena.copy(m);
                            let l = self.arena.copy(m);
                            self.stack.push((inst.next, r));
                            self.stack.push((left, l));
                        }
                        break;
                    }
                }
            }
            self.arena.release_unused(m);
        }
    }

    fn free_list(&mut self, which: usize) {
        for t in &self.lists[which].dense {
            self.arena.free(t.m);
        }
        self.lists[which].clear();
    }

    fn reset(&mut self) {
        self.arena.reset();
        self.lists[0].clear();
        self.lists[1].clear();
        self.stack.clear();
    }

    /// Leftmost-longest match starting at or after byte offset `pos`.
    pub fn exec(&mut self, pos: usize) -> Option<Slots> {
        self.reset();
        let prog = self.prog;
        let text = self.text;
        let end = text.len();
        if pos > end {
            return None;
        }
        let anchored = prog.is_anchored();
        if anchored && pos > 0 {
            return None;
        }

        let prefix = prog.prefix.as_bytes();
        let scan = !prefix.is_empty() && !prog.options.contains(CompileOptions::NO_PREFIX_SCAN);
        let mut pos = pos;
        if scan {
            if anchored {
                if !text[pos..].starts_with(prefix) {
                    return None;
                }
            } else {
                pos += memmem::find(&text[pos..], prefix)?;
            }
        }

        let start_pos = pos;
        let (mut inp, mut out) = (0, 1);
        let mut best: Option<VecId> = None;
        while pos <= end {
            if best.is_none() && (pos == start_pos || !anchored) {
                if scan && !anchored && pos != start_pos && self.lists[out].is_empty() {
                    // nothing live: jump straight to the next prefix occurrence
                    match memmem::find(&text[pos..], prefix) {
                        Some(skip) => {
                            if skip > 0 {
                                trace!("prefix skip {} -> {}", pos, pos + skip);
                            }
                            pos += skip;
                        }
                        None => break,
                    }
                }
                let m = self.arena.no_match();
                self.arena.stamp(m, 0, pos as isize);
                self.add_state(out, prog.first(), m, pos);
                self.arena.free(m);
            } else if self.lists[out].is_empty() {
                break;
            }
            std::mem::swap(&mut inp, &mut out);
            self.free_list(out);

            let (c, width) = if pos < end {
                let (c, w) = decode_rune(text, pos);
                (Some(c), w)
            } else {
                (None, 1)
            };
            pos += width;

            for i in 0..self.lists[inp].len() {
                let t = self.lists[inp].dense[i];
                let inst = &prog.insts[t.inst];
                let advance = match &inst.op {
                    Op::Char(want) => c == Some(*want),
                    Op::CharClass(cc) => c.is_some_and(|c| cc.matches(c)),
                    Op::AnyChar => c.is_some(),
                    Op::AnyCharNotNL => c.is_some_and(|c| c != '\n'),
                    Op::End => {
                        let at = (pos - width) as isize;
                        let start = self.arena.get(t.m)[0];
                        let better = match best {
                            None => true,
                            Some(b) => {
                                let b = self.arena.get(b);
                                start < b[0] || (start == b[0] && at > b[1])
                            }
                        };
                        if better {
                            self.arena.stamp(t.m, 1, at);
                            self.arena.retain(t.m);
                            if let Some(old) = best.replace(t.m) {
                                self.arena.free(old);
                            }
                        }
                        false
                    }
                    _ => false,
                };
                if advance {
                    self.add_state(out, inst.next, t.m, pos);
                }
            }
        }

        let best = best?;
        let slots = Slots::from_slice(self.arena.get(best));
        trace!("{:?} matched {:?}", prog.expr, slots);
        Some(slots)
    }
}

/// Leftmost-longest match of `prog` in `text` at or after byte offset `pos`.
pub fn execute(prog: &Program, text: &[u8], pos: usize) -> Option<Slots> {
    Matcher::new(prog, text).exec(pos)
}

// ============================================================================
// Driving loop
// ============================================================================

/// Successive non-overlapping matches, left to right.
///
/// An empty match that begins where the previous match ended is skipped, and
/// the scan always moves forward by at least one rune after an empty match.
pub struct AllMatches<'p, 't> {
    matcher: Matcher<'p, 't>,
    pos: usize,
    prev_end: isize,
    remaining: usize,
}

impl<'p, 't> AllMatches<'p, 't> {
    fn done(&mut self) {
        self.pos = self.matcher.text.len() + 1;
    }
}

impl Iterator for AllMatches<'_, '_> {
    type Item = Slots;

    fn next(&mut self) -> Option<Slots> {
        let text = self.matcher.text;
        let end = text.len();
        while self.remaining > 0 && self.pos <= end {
            let Some(m) = self.matcher.exec(self.pos) else {
                self.done();
                return None;
            };
            let (start, stop) = (m[0], m[1]);
            let accept = if stop as usize == self.pos {
                let (_, width) = decode_rune(text, self.pos);
                if width > 0 {
                    self.pos += width;
                } else {
                    self.pos = end + 1;
                }
                start != self.prev_end
            } else {
                self.pos = stop as usize;
                true
            };
            self.prev_end = stop;
            if accept {
                self.remaining -= 1;
                return Some(m);
            }
        }
        None
    }
}

impl std::iter::FusedIterator for AllMatches<'_, '_> {}

/// Iterate over at most `n` matches of `prog` in `text`. A negative `n` caps
/// the count at one match per input byte (one for empty input).
pub fn all_matches<'p, 't>(prog: &'p Program, text: &'t [u8], n: isize) -> AllMatches<'p, 't> {
    let remaining = if n < 0 {
        text.len().max(1)
    } else {
        n as usize
    };
    AllMatches {
        matcher: Matcher::new(prog, text),
        pos: 0,
        prev_end: NOTPOS,
        remaining,
    }
}

/// Iterate over every match of `prog` in `text`, including a trailing empty
/// match at the end of the text.
pub fn iter_matches<'p, 't>(prog: &'p Program, text: &'t [u8]) -> AllMatches<'p, 't> {
    AllMatches {
        matcher: Matcher::new(prog, text),
        pos: 0,
        prev_end: NOTPOS,
        remaining: usize::MAX,
    }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::regcomp::{compile, compile_with_options};

    fn exec(pattern: &str, text: &str) -> Option<Vec<isize>> {
        let prog = compile(pattern).unwrap();
        let fast = execute(&prog, text.as_bytes(), 0).map(|s| s.to_vec());
        let plain = compile_with_options(pattern, CompileOptions::NO_PREFIX_SCAN).unwrap();
        let slow = execute(&plain, text.as_bytes(), 0).map(|s| s.to_vec());
        assert_eq!(fast, slow, "prefix scan changed the result of {:?} on {:?}", pattern, text);
        fast
    }

    fn spans(pattern: &str, text: &str, n: isize) -> Vec<(isize, isize)> {
        let prog = compile(pattern).unwrap();
        all_matches(&prog, text.as_bytes(), n)
            .map(|m| (m[0], m[1]))
            .collect()
    }

    #[test]
    fn arena_recycles() {
        let mut arena = MatchArena::new(4);
        let a = arena.alloc();
        assert_eq!(arena.capacity(), ARENA_BLOCK);
        assert_eq!(arena.refs(a), 0);
        arena.retain(a);
        arena.retain(a);
        arena.free(a);
        assert_eq!(arena.free_count(), ARENA_BLOCK - 1);
        arena.free(a);
        assert_eq!(arena.free_count(), ARENA_BLOCK);
        // most recently freed comes back first
        assert_eq!(arena.alloc(), a);
    }

    #[test]
    fn arena_grows_in_blocks() {
        let mut arena = MatchArena::new(2);
        for _ in 0..ARENA_BLOCK + 1 {
            arena.no_match();
        }
        assert_eq!(arena.capacity(), 2 * ARENA_BLOCK);
    }

    #[test]
    fn arena_copy_and_no_match() {
        let mut arena = MatchArena::new(4);
        let m = arena.no_match();
        assert_eq!(arena.get(m), &[NOTPOS; 4]);
        assert_eq!(arena.refs(m), 1);
        arena.stamp(m, 0, 7);
        let c = arena.copy(m);
        assert_ne!(c, m);
        assert_eq!(arena.refs(c), 0);
        assert_eq!(arena.get(c), &[7, NOTPOS, NOTPOS, NOTPOS]);
        arena.stamp(c, 1, 9);
        assert_eq!(arena.get(m)[1], NOTPOS);
        arena.release_unused(c);
        arena.release_unused(m);
        assert_eq!(arena.free_count(), ARENA_BLOCK - 1);
    }

    #[test]
    fn thread_list_dedups() {
        let mut list = ThreadList::new(8);
        assert!(!list.contains(3));
        list.push(Thread { inst: 3, m: 0 });
        list.push(Thread { inst: 5, m: 1 });
        assert!(list.contains(3));
        assert!(list.contains(5));
        assert!(!list.contains(0));
        assert_eq!(list.len(), 2);
        list.clear();
        assert!(list.is_empty());
        assert!(!list.contains(3));
    }

    #[test]
    fn literal() {
        assert_eq!(exec("abc", "xabcx"), Some(vec![1, 4]));
        assert_eq!(exec("abc", "ab"), None);
        assert_eq!(exec("", ""), Some(vec![0, 0]));
        assert_eq!(exec("", "abc"), Some(vec![0, 0]));
    }

    #[test]
    fn leftmost_longest() {
        assert_eq!(exec("a+", "baaab"), Some(vec![1, 4]));
        assert_eq!(exec("a*", "baaab"), Some(vec![0, 0]));
        assert_eq!(exec("a|ab", "ab"), Some(vec![0, 2]));
        assert_eq!(exec("ab|a", "ab"), Some(vec![0, 2]));
        assert_eq!(exec("zx+", "zzx"), Some(vec![1, 3]));
    }

    #[test]
    fn anchors() {
        assert_eq!(exec("^abc", "abc"), Some(vec![0, 3]));
        assert_eq!(exec("^abc", "xabc"), None);
        assert_eq!(exec("ab$", "abcab"), Some(vec![3, 5]));
        assert_eq!(exec("/$", "/abc/"), Some(vec![4, 5]));
        assert_eq!(exec("^$", ""), Some(vec![0, 0]));
        assert_eq!(exec("^$", "a"), None);
    }

    #[test]
    fn anchored_never_matches_past_zero() {
        let prog = compile("^abc").unwrap();
        assert!(execute(&prog, b"abcabc", 0).is_some());
        assert!(execute(&prog, b"abcabc", 3).is_none());
        let prog = compile("^").unwrap();
        assert!(execute(&prog, b"x", 1).is_none());
    }

    #[test]
    fn start_offset() {
        let prog = compile("a").unwrap();
        assert_eq!(execute(&prog, b"aba", 1).map(|s| s.to_vec()), Some(vec![2, 3]));
        assert_eq!(execute(&prog, b"aba", 3), None);
        assert_eq!(execute(&prog, b"aba", 4), None);
    }

    #[test]
    fn submatches() {
        assert_eq!(exec("(a)(b(c))", "abc"), Some(vec![0, 3, 0, 1, 1, 3, 2, 3]));
        assert_eq!(exec("a(b|c)*d", "abcbcd"), Some(vec![0, 6, 4, 5]));
        assert_eq!(exec("a(b)?c", "ac"), Some(vec![0, 2, -1, -1]));
        assert_eq!(exec("(aa)*$", "a"), Some(vec![1, 1, -1, -1]));
        assert_eq!(exec("((a|b|c)*(d))", "abcd"), Some(vec![0, 4, 0, 4, 2, 3, 3, 4]));
        assert_eq!(exec("(([^xyz]*)(d))", "abcd"), Some(vec![0, 4, 0, 4, 0, 3, 3, 4]));
        assert_eq!(exec("da(.)a$", "daXY data"), Some(vec![5, 9, 7, 8]));
    }

    #[test]
    fn empty_loops_terminate() {
        assert_eq!(exec("()*", "abc").map(|m| m[..2].to_vec()), Some(vec![0, 0]));
        assert_eq!(exec("(a*)*", "aab").map(|m| m[..2].to_vec()), Some(vec![0, 2]));
        assert_eq!(exec("(a|)+", "aa").map(|m| m[..2].to_vec()), Some(vec![0, 2]));
    }

    #[test]
    fn classes() {
        assert_eq!(exec("[^a-z]+", "ab1234cd"), Some(vec![2, 6]));
        assert_eq!(exec("[a\\-\\]z]+", "az]-bcz"), Some(vec![0, 4]));
        assert_eq!(exec("[^\\n]+", "abcd\n"), Some(vec![0, 4]));
        assert_eq!(exec("[]", "abc"), None);
        assert_eq!(exec("[^]", "abc"), Some(vec![0, 1]));
        assert_eq!(exec("[0-9]+", "ab123cd"), Some(vec![2, 5]));
    }

    #[test]
    fn any_char() {
        assert_eq!(exec(".", "\n"), Some(vec![0, 1]));
        assert_eq!(exec("[^\\n]", "\n"), None);
        assert_eq!(exec("a.c", "abc"), Some(vec![0, 3]));
        assert_eq!(exec("a.", "a"), None);
    }

    #[test]
    fn multibyte() {
        assert_eq!(exec("日本語+", "日本語語語語"), Some(vec![0, 18]));
        assert_eq!(exec("(.)(.)", "日a"), Some(vec![0, 4, 0, 3, 3, 4]));
        assert_eq!(exec("本", "日本"), Some(vec![3, 6]));
    }

    #[test]
    fn malformed_input_decodes_as_replacement() {
        let prog = compile("a.b").unwrap();
        assert_eq!(
            execute(&prog, b"a\xffb", 0).map(|s| s.to_vec()),
            Some(vec![0, 3])
        );
        // a literal U+FFFD also matches malformed bytes, so it is never
        // part of the byte-level prefix
        let prog = compile("\u{FFFD}b").unwrap();
        assert_eq!(
            execute(&prog, b"x\xe6\x97b", 0).map(|s| s.to_vec()),
            Some(vec![2, 4])
        );
    }

    #[test]
    fn prefix_rescan_finds_later_occurrences() {
        assert_eq!(exec("abx", "abababx"), Some(vec![4, 7]));
        assert_eq!(exec("ab+c", "ab abbbc"), Some(vec![3, 8]));
        assert_eq!(exec("xyz", "xyxyxy"), None);
    }

    #[test]
    fn matcher_is_reusable() {
        let prog = compile("b+").unwrap();
        let mut m = Matcher::new(&prog, b"abba bb");
        assert_eq!(m.exec(0).map(|s| s.to_vec()), Some(vec![1, 3]));
        assert_eq!(m.exec(3).map(|s| s.to_vec()), Some(vec![5, 7]));
        assert_eq!(m.exec(0).map(|s| s.to_vec()), Some(vec![1, 3]));
    }

    #[test]
    fn all_matches_empty_pattern() {
        assert_eq!(spans("", "abc", -1), vec![(0, 0), (1, 1), (2, 2)]);
        assert_eq!(spans("", "", -1), vec![(0, 0)]);
        assert_eq!(spans("", "abc", 2), vec![(0, 0), (1, 1)]);
        assert_eq!(spans("", "abc", 0), vec![]);
    }

    #[test]
    fn iter_matches_is_unbounded() {
        let prog = compile("").unwrap();
        let spans: Vec<_> = iter_matches(&prog, b"abc").map(|m| (m[0], m[1])).collect();
        assert_eq!(spans, vec![(0, 0), (1, 1), (2, 2), (3, 3)]);
        let prog = compile("a*").unwrap();
        let spans: Vec<_> = iter_matches(&prog, b"baaab").map(|m| (m[0], m[1])).collect();
        assert_eq!(spans, vec![(0, 0), (1, 4), (5, 5)]);
    }

    #[test]
    fn all_matches_skips_adjacent_empty() {
        assert_eq!(spans("a*", "baaab", -1), vec![(0, 0), (1, 4), (5, 5)]);
        assert_eq!(spans("b*", "abbc", -1), vec![(0, 0), (1, 3), (4, 4)]);
    }

    #[test]
    fn all_matches_non_overlapping() {
        assert_eq!(spans("a", "aaa", -1), vec![(0, 1), (1, 2), (2, 3)]);
        assert_eq!(spans("aa", "aaaaa", -1), vec![(0, 2), (2, 4)]);
        assert_eq!(spans("o", "foo bar", -1), vec![(1, 2), (2, 3)]);
        assert_eq!(spans("x", "abc", -1), vec![]);
    }

    #[test]
    fn all_matches_steps_whole_runes() {
        assert_eq!(spans("", "日本", -1), vec![(0, 0), (3, 3), (6, 6)]);
    }

    #[test]
    fn all_matches_is_fused() {
        let prog = compile("a").unwrap();
        let mut it = all_matches(&prog, b"a", -1);
        assert!(it.next().is_some());
        assert!(it.next().is_none());
        assert!(it.next().is_none());
    }
}
