// api.rs - Idiomatic Rust API for regexp-nfa.
//
// Wraps the compiler and the NFA matcher with Rust-native types: Regex,
// RegexBuilder, Match, Captures and the match iterators.

use std::fmt;
use std::ops::Range;
use std::str::FromStr;

use crate::error::RegexError;
use crate::regcomp::compile_with_options;
use crate::regexec::{all_matches, execute, iter_matches, AllMatches, Slots};
use crate::regint::{CompileOptions, Program, NOTPOS};
use crate::regparse::is_special;

/// A compiled regular expression.
///
/// Matching is leftmost-longest: among all matches the one starting earliest
/// wins, and among those the longest.
///
/// # Examples
///
/// ```
/// use regexp_nfa::api::Regex;
///
/// let re = Regex::new(r"[0-9]+").unwrap();
/// assert!(re.is_match("hello 42"));
///
/// let m = re.find("hello 42").unwrap();
/// assert_eq!(m.as_str(), "42");
/// assert_eq!(m.start(), 6);
/// assert_eq!(m.end(), 8);
/// ```
#[derive(Clone)]
pub struct Regex {
    prog: Program,
}

impl Regex {
    /// Compile a pattern with default options.
    pub fn new(pattern: &str) -> Result<Regex, RegexError> {
        RegexBuilder::new(pattern).build()
    }

    /// Create a [`RegexBuilder`] for fine-grained control over compilation.
    pub fn builder(pattern: &str) -> RegexBuilder {
        RegexBuilder::new(pattern)
    }

    /// Return the leftmost-longest match in `text`, or `None` if no match.
    pub fn find<'t>(&self, text: &'t str) -> Option<Match<'t>> {
        self.find_bytes(text.as_bytes())
    }

    /// Return the leftmost-longest match in `text` (as bytes), or `None`.
    pub fn find_bytes<'t>(&self, text: &'t [u8]) -> Option<Match<'t>> {
        self.find_at_bytes(text, 0)
    }

    /// Return the first match starting at or after byte offset `start`.
    ///
    /// A pattern beginning with `^` never matches when `start > 0`.
    pub fn find_at<'t>(&self, text: &'t str, start: usize) -> Option<Match<'t>> {
        self.find_at_bytes(text.as_bytes(), start)
    }

    /// Byte form of [`find_at`](Self::find_at).
    pub fn find_at_bytes<'t>(&self, text: &'t [u8], start: usize) -> Option<Match<'t>> {
        let slots = execute(&self.prog, text, start)?;
        Match::from_slots(text, &slots, 0)
    }

    /// Check whether `text` matches the pattern anywhere.
    pub fn is_match(&self, text: &str) -> bool {
        self.is_match_bytes(text.as_bytes())
    }

    /// Check whether `text` (as bytes) matches the pattern anywhere.
    pub fn is_match_bytes(&self, text: &[u8]) -> bool {
        execute(&self.prog, text, 0).is_some()
    }

    /// Raw submatch positions of the first match: `[start0, end0, start1,
    /// end1, ...]`, `-1` for groups that did not participate.
    pub fn find_submatch_index(&self, text: &[u8]) -> Option<Slots> {
        execute(&self.prog, text, 0)
    }

    /// Return the first match with all capture groups, or `None`.
    pub fn captures<'t>(&self, text: &'t str) -> Option<Captures<'t>> {
        self.captures_bytes(text.as_bytes())
    }

    /// Return the first match with all capture groups (bytes), or `None`.
    pub fn captures_bytes<'t>(&self, text: &'t [u8]) -> Option<Captures<'t>> {
        let slots = execute(&self.prog, text, 0)?;
        Some(Captures { text, slots })
    }

    /// Iterate over all non-overlapping matches in `text`.
    pub fn find_iter<'r, 't>(&'r self, text: &'t str) -> FindIter<'r, 't> {
        self.find_iter_bytes(text.as_bytes())
    }

    /// Iterate over all non-overlapping matches in `text` (as bytes).
    pub fn find_iter_bytes<'r, 't>(&'r self, text: &'t [u8]) -> FindIter<'r, 't> {
        FindIter {
            text,
            inner: iter_matches(&self.prog, text),
        }
    }

    /// Iterate over the capture groups of all non-overlapping matches.
    pub fn captures_iter<'r, 't>(&'r self, text: &'t str) -> CapturesMatches<'r, 't> {
        self.captures_iter_bytes(text.as_bytes())
    }

    /// Byte form of [`captures_iter`](Self::captures_iter).
    pub fn captures_iter_bytes<'r, 't>(&'r self, text: &'t [u8]) -> CapturesMatches<'r, 't> {
        CapturesMatches {
            text,
            inner: iter_matches(&self.prog, text),
        }
    }

    /// Collect at most `n` successive matches; a negative `n` allows up to
    /// one match per byte of `text` (one for empty text).
    ///
    /// An empty match right after the previous match is skipped, so the
    /// scan always makes progress.
    ///
    /// ```
    /// use regexp_nfa::api::Regex;
    ///
    /// let re = Regex::new("").unwrap();
    /// let starts: Vec<usize> = re.find_all("abc", -1).iter().map(|m| m.start()).collect();
    /// assert_eq!(starts, vec![0, 1, 2]);
    /// ```
    pub fn find_all<'t>(&self, text: &'t str, n: isize) -> Vec<Match<'t>> {
        self.find_all_bytes(text.as_bytes(), n)
    }

    /// Byte form of [`find_all`](Self::find_all).
    pub fn find_all_bytes<'t>(&self, text: &'t [u8], n: isize) -> Vec<Match<'t>> {
        all_matches(&self.prog, text, n)
            .filter_map(|slots| Match::from_slots(text, &slots, 0))
            .collect()
    }

    /// Like [`find_all`](Self::find_all) but with every capture group.
    pub fn captures_all<'t>(&self, text: &'t str, n: isize) -> Vec<Captures<'t>> {
        self.captures_all_bytes(text.as_bytes(), n)
    }

    /// Byte form of [`captures_all`](Self::captures_all).
    pub fn captures_all_bytes<'t>(&self, text: &'t [u8], n: isize) -> Vec<Captures<'t>> {
        all_matches(&self.prog, text, n)
            .map(|slots| Captures { text, slots })
            .collect()
    }

    /// Replace every match in `text` with `rep`. The replacement is inserted
    /// literally; `$1` or `\1` have no special meaning.
    ///
    /// ```
    /// use regexp_nfa::api::Regex;
    ///
    /// let re = Regex::new("o").unwrap();
    /// assert_eq!(re.replace_all("foo bar", "0"), "f00 bar");
    /// ```
    pub fn replace_all(&self, text: &str, rep: &str) -> String {
        self.replace_all_fn(text, |_| rep.to_string())
    }

    /// Replace every match with the result of `rep` applied to the matched
    /// text.
    pub fn replace_all_fn<F>(&self, text: &str, mut rep: F) -> String
    where
        F: FnMut(&str) -> String,
    {
        let mut out = String::with_capacity(text.len());
        let mut last = 0;
        for r in self.match_ranges(text.as_bytes()) {
            out.push_str(&text[last..r.start]);
            out.push_str(&rep(&text[r.clone()]));
            last = r.end;
        }
        out.push_str(&text[last..]);
        out
    }

    /// Byte form of [`replace_all`](Self::replace_all).
    pub fn replace_all_bytes(&self, text: &[u8], rep: &[u8]) -> Vec<u8> {
        self.replace_all_bytes_fn(text, |_| rep.to_vec())
    }

    /// Byte form of [`replace_all_fn`](Self::replace_all_fn).
    pub fn replace_all_bytes_fn<F>(&self, text: &[u8], mut rep: F) -> Vec<u8>
    where
        F: FnMut(&[u8]) -> Vec<u8>,
    {
        let mut out = Vec::with_capacity(text.len());
        let mut last = 0;
        for r in self.match_ranges(text) {
            out.extend_from_slice(&text[last..r.start]);
            out.extend_from_slice(&rep(&text[r.clone()]));
            last = r.end;
        }
        out.extend_from_slice(&text[last..]);
        out
    }

    /// Split `text` into the pieces between matches.
    ///
    /// `limit == 0` yields nothing, `limit > 0` at most `limit` pieces with
    /// the unsplit remainder in the last one, and `limit < 0` every piece.
    ///
    /// ```
    /// use regexp_nfa::api::Regex;
    ///
    /// let re = Regex::new(",").unwrap();
    /// assert_eq!(re.split("a,b,c", -1), vec!["a", "b", "c"]);
    /// assert_eq!(re.split("a,b,c", 2), vec!["a", "b,c"]);
    /// ```
    pub fn split<'t>(&self, text: &'t str, limit: isize) -> Vec<&'t str> {
        self.split_ranges(text.as_bytes(), limit)
            .into_iter()
            .map(|r| &text[r])
            .collect()
    }

    /// Byte form of [`split`](Self::split).
    pub fn split_bytes<'t>(&self, text: &'t [u8], limit: isize) -> Vec<&'t [u8]> {
        self.split_ranges(text, limit)
            .into_iter()
            .map(|r| &text[r])
            .collect()
    }

    fn match_ranges<'a>(&'a self, text: &'a [u8]) -> impl Iterator<Item = Range<usize>> + 'a {
        iter_matches(&self.prog, text).map(|m| m[0] as usize..m[1] as usize)
    }

    fn split_ranges(&self, text: &[u8], limit: isize) -> Vec<Range<usize>> {
        if limit == 0 {
            return Vec::new();
        }
        if !self.prog.expr.is_empty() && text.is_empty() {
            return vec![0..0];
        }
        let matches = if limit > 0 {
            all_matches(&self.prog, text, limit)
        } else {
            iter_matches(&self.prog, text)
        };
        let mut pieces = Vec::new();
        let (mut beg, mut end) = (0, 0);
        for m in matches {
            if limit > 0 && pieces.len() == (limit - 1) as usize {
                break;
            }
            end = m[0] as usize;
            // no empty piece for a match at the very start
            if m[1] != 0 {
                pieces.push(beg..end);
            }
            beg = m[1] as usize;
        }
        if end != text.len() {
            pieces.push(beg..text.len());
        }
        pieces
    }

    /// Number of capture groups in the pattern (not counting group 0).
    pub fn captures_len(&self) -> usize {
        self.prog.num_bra
    }

    /// The source pattern.
    pub fn as_str(&self) -> &str {
        &self.prog.expr
    }

    /// The literal text every match must begin with, and whether that text
    /// is the entire pattern.
    ///
    /// ```
    /// use regexp_nfa::api::Regex;
    ///
    /// assert_eq!(Regex::new("abc").unwrap().literal_prefix(), ("abc", true));
    /// assert_eq!(Regex::new("abc+").unwrap().literal_prefix(), ("ab", false));
    /// ```
    pub fn literal_prefix(&self) -> (&str, bool) {
        self.prog.literal_prefix()
    }

    /// Access the compiled program (for advanced use or debugging).
    pub fn as_program(&self) -> &Program {
        &self.prog
    }
}

impl fmt::Display for Regex {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.prog.expr)
    }
}

impl fmt::Debug for Regex {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("Regex").field(&self.prog.expr).finish()
    }
}

impl FromStr for Regex {
    type Err = RegexError;

    fn from_str(s: &str) -> Result<Regex, RegexError> {
        Regex::new(s)
    }
}

// === Package-level helpers ===

/// Escape every metacharacter in `text` so the result is a pattern matching
/// `text` literally.
///
/// ```
/// use regexp_nfa::api::quote_meta;
///
/// assert_eq!(quote_meta("1.5*x"), r"1\.5\*x");
/// ```
pub fn quote_meta(text: &str) -> String {
    let mut out = String::with_capacity(2 * text.len());
    for c in text.chars() {
        if is_special(c) {
            out.push('\\');
        }
        out.push(c);
    }
    out
}

/// Compile `pattern` and report whether it matches `text` anywhere.
pub fn is_match(pattern: &str, text: &str) -> Result<bool, RegexError> {
    Ok(Regex::new(pattern)?.is_match(text))
}

/// Byte form of [`is_match`].
pub fn is_match_bytes(pattern: &str, text: &[u8]) -> Result<bool, RegexError> {
    Ok(Regex::new(pattern)?.is_match_bytes(text))
}

// === RegexBuilder ===

/// Builder for compiling a [`Regex`] with custom options.
///
/// # Examples
///
/// ```
/// use regexp_nfa::api::Regex;
///
/// let re = Regex::builder("hello world")
///     .literal_prefix_scan(false)
///     .build()
///     .unwrap();
/// assert!(re.is_match("say hello world"));
/// ```
pub struct RegexBuilder {
    pattern: String,
    options: CompileOptions,
}

impl RegexBuilder {
    /// Create a new builder for the given pattern.
    pub fn new(pattern: &str) -> Self {
        RegexBuilder {
            pattern: pattern.to_string(),
            options: CompileOptions::empty(),
        }
    }

    /// Log the program after every compile stage at `debug` level.
    pub fn dump_program(mut self, yes: bool) -> Self {
        self.options.set(CompileOptions::DUMP_PROGRAM, yes);
        self
    }

    /// Use the literal prefix to skip ahead in the text (default: on).
    pub fn literal_prefix_scan(mut self, yes: bool) -> Self {
        self.options.set(CompileOptions::NO_PREFIX_SCAN, !yes);
        self
    }

    /// Add raw option flags.
    pub fn option(mut self, flags: CompileOptions) -> Self {
        self.options |= flags;
        self
    }

    /// Compile the pattern into a [`Regex`].
    pub fn build(self) -> Result<Regex, RegexError> {
        let prog = compile_with_options(&self.pattern, self.options)?;
        Ok(Regex { prog })
    }
}

// === Match ===

/// A single match result referencing the original text.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Match<'t> {
    text: &'t [u8],
    start: usize,
    end: usize,
}

impl<'t> Match<'t> {
    /// Group `group` of a slot vector, if it participated.
    fn from_slots(text: &'t [u8], slots: &[isize], group: usize) -> Option<Match<'t>> {
        let start = *slots.get(2 * group)?;
        let end = *slots.get(2 * group + 1)?;
        if start == NOTPOS || end == NOTPOS {
            return None;
        }
        Some(Match {
            text,
            start: start as usize,
            end: end as usize,
        })
    }

    /// Byte offset of the start of the match.
    pub fn start(&self) -> usize {
        self.start
    }

    /// Byte offset of the end of the match (exclusive).
    pub fn end(&self) -> usize {
        self.end
    }

    /// Byte range of the match.
    pub fn range(&self) -> Range<usize> {
        self.start..self.end
    }

    /// The matched text as a byte slice.
    pub fn as_bytes(&self) -> &'t [u8] {
        &self.text[self.start..self.end]
    }

    /// The matched text as a `&str`.
    ///
    /// # Panics
    ///
    /// Panics if the matched bytes are not valid UTF-8.
    pub fn as_str(&self) -> &'t str {
        std::str::from_utf8(self.as_bytes()).expect("match is not valid UTF-8")
    }

    /// Returns the length of the match in bytes.
    pub fn len(&self) -> usize {
        self.end - self.start
    }

    /// Returns `true` if the match is empty (zero-length).
    pub fn is_empty(&self) -> bool {
        self.start == self.end
    }
}

// === Captures ===

/// All capture groups from a single match.
///
/// Group 0 is the entire match. Groups 1..N correspond to `(...)` in the
/// pattern, numbered by their opening parenthesis.
#[derive(Clone)]
pub struct Captures<'t> {
    text: &'t [u8],
    slots: Slots,
}

impl<'t> Captures<'t> {
    /// Get capture group `i`, or `None` if the group did not participate.
    pub fn get(&self, i: usize) -> Option<Match<'t>> {
        Match::from_slots(self.text, &self.slots, i)
    }

    /// Number of capture groups (including group 0).
    pub fn len(&self) -> usize {
        self.slots.len() / 2
    }

    /// Returns `true` if there are no capture groups (never the case for a
    /// real match).
    pub fn is_empty(&self) -> bool {
        self.slots.is_empty()
    }

    /// The raw slot vector.
    pub fn slots(&self) -> &[isize] {
        &self.slots
    }

    /// Iterate over all capture groups.
    pub fn iter(&self) -> CapturesIter<'_, 't> {
        CapturesIter {
            captures: self,
            index: 0,
        }
    }
}

impl fmt::Debug for Captures<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut list = f.debug_list();
        for i in 0..self.len() {
            list.entry(&self.get(i).map(|m| m.range()));
        }
        list.finish()
    }
}

// === CapturesIter ===

/// Iterator over capture groups in a [`Captures`].
pub struct CapturesIter<'c, 't> {
    captures: &'c Captures<'t>,
    index: usize,
}

impl<'c, 't> Iterator for CapturesIter<'c, 't> {
    type Item = Option<Match<'t>>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.index >= self.captures.len() {
            return None;
        }
        let m = self.captures.get(self.index);
        self.index += 1;
        Some(m)
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        let remaining = self.captures.len() - self.index;
        (remaining, Some(remaining))
    }
}

impl ExactSizeIterator for CapturesIter<'_, '_> {}

// === FindIter ===

/// Iterator over all non-overlapping matches in a text.
pub struct FindIter<'r, 't> {
    text: &'t [u8],
    inner: AllMatches<'r, 't>,
}

impl<'r, 't> Iterator for FindIter<'r, 't> {
    type Item = Match<'t>;

    fn next(&mut self) -> Option<Match<'t>> {
        let slots = self.inner.next()?;
        Match::from_slots(self.text, &slots, 0)
    }
}

impl std::iter::FusedIterator for FindIter<'_, '_> {}

// === CapturesMatches ===

/// Iterator over the [`Captures`] of all non-overlapping matches.
pub struct CapturesMatches<'r, 't> {
    text: &'t [u8],
    inner: AllMatches<'r, 't>,
}

impl<'r, 't> Iterator for CapturesMatches<'r, 't> {
    type Item = Captures<'t>;

    fn next(&mut self) -> Option<Captures<'t>> {
        let slots = self.inner.next()?;
        Some(Captures {
            text: self.text,
            slots,
        })
    }
}

impl std::iter::FusedIterator for CapturesMatches<'_, '_> {}
