// encodings/utf8.rs - UTF-8 rune decoding (RFC 3629 range: U+0000 - U+10FFFF).
//
// The matcher decodes as it scans, one rune per step. Malformed input never
// fails: it decodes as RUNE_ERROR with a width of one byte so the scan always
// makes progress.

/// The rune substituted for every malformed or truncated sequence.
pub const RUNE_ERROR: char = '\u{FFFD}';

/// Largest valid Unicode code point.
pub const MAX_RUNE: char = '\u{10FFFF}';

// === UTF-8 Helpers ===

#[inline]
fn utf8_istail(c: u8) -> bool {
    (c & 0xc0) == 0x80
}

// === EncLen_UTF8 Table ===
// Maps first byte to sequence length. Bytes that can never start a sequence
// (tails, 0xc0/0xc1 overlongs, 0xf5..) map to 1 and decode as RUNE_ERROR.

static ENC_LEN_UTF8: [u8; 256] = [
    1, 1, 1, 1, 1, 1, 1, 1, 1, 1, 1, 1, 1, 1, 1, 1, 1, 1, 1, 1, 1, 1, 1, 1, 1, 1, 1, 1, 1, 1, 1, 1,
    1, 1, 1, 1, 1, 1, 1, 1, 1, 1, 1, 1, 1, 1, 1, 1, 1, 1, 1, 1, 1, 1, 1, 1, 1, 1, 1, 1, 1, 1, 1, 1,
    1, 1, 1, 1, 1, 1, 1, 1, 1, 1, 1, 1, 1, 1, 1, 1, 1, 1, 1, 1, 1, 1, 1, 1, 1, 1, 1, 1, 1, 1, 1, 1,
    1, 1, 1, 1, 1, 1, 1, 1, 1, 1, 1, 1, 1, 1, 1, 1, 1, 1, 1, 1, 1, 1, 1, 1, 1, 1, 1, 1, 1, 1, 1, 1,
    1, 1, 1, 1, 1, 1, 1, 1, 1, 1, 1, 1, 1, 1, 1, 1, 1, 1, 1, 1, 1, 1, 1, 1, 1, 1, 1, 1, 1, 1, 1, 1,
    1, 1, 1, 1, 1, 1, 1, 1, 1, 1, 1, 1, 1, 1, 1, 1, 1, 1, 1, 1, 1, 1, 1, 1, 1, 1, 1, 1, 1, 1, 1, 1,
    1, 1, 2, 2, 2, 2, 2, 2, 2, 2, 2, 2, 2, 2, 2, 2, 2, 2, 2, 2, 2, 2, 2, 2, 2, 2, 2, 2, 2, 2, 2, 2,
    3, 3, 3, 3, 3, 3, 3, 3, 3, 3, 3, 3, 3, 3, 3, 3, 4, 4, 4, 4, 4, 1, 1, 1, 1, 1, 1, 1, 1, 1, 1, 1,
];

// Smallest code point each sequence length may encode; anything below is an
// overlong form.
static MIN_CODE_FOR_LEN: [u32; 5] = [0, 0, 0x80, 0x800, 0x10000];

/// Decode the rune starting at `pos` in `text`.
///
/// Returns the rune and its encoded width in bytes. At or past the end of
/// `text` the result is `(RUNE_ERROR, 0)`; a malformed, overlong, surrogate
/// or truncated sequence yields `(RUNE_ERROR, 1)`.
pub fn decode_rune(text: &[u8], pos: usize) -> (char, usize) {
    let Some(&lead) = text.get(pos) else {
        return (RUNE_ERROR, 0);
    };
    if lead < 0x80 {
        return (lead as char, 1);
    }

    let len = ENC_LEN_UTF8[lead as usize] as usize;
    if len == 1 || pos + len > text.len() {
        return (RUNE_ERROR, 1);
    }

    let mut n = (lead as u32) & ((1u32 << (7 - len)) - 1);
    for &b in &text[pos + 1..pos + len] {
        if !utf8_istail(b) {
            return (RUNE_ERROR, 1);
        }
        n = (n << 6) | ((b as u32) & 0x3f);
    }
    if n < MIN_CODE_FOR_LEN[len] {
        return (RUNE_ERROR, 1);
    }
    // char::from_u32 rejects surrogates and values above MAX_RUNE.
    match char::from_u32(n) {
        Some(c) => (c, len),
        None => (RUNE_ERROR, 1),
    }
}

/// Number of bytes needed to encode `c`.
#[inline]
pub fn rune_len(c: char) -> usize {
    c.len_utf8()
}

/// Encode `c` into `buf`, returning the number of bytes written.
#[inline]
pub fn encode_rune(c: char, buf: &mut [u8; 4]) -> usize {
    c.encode_utf8(buf).len()
}
