// encodings/mod.rs - Text encoding support.
// Patterns and subjects are UTF-8; everything the engine needs lives in utf8.

pub mod utf8;

pub use utf8::{decode_rune, encode_rune, rune_len, MAX_RUNE, RUNE_ERROR};
