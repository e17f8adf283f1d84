//! Byte-order helpers for assembling a Stratum block header from hex wire fields.
//!
//! Stratum sends `version`, `ntime`, `nbits` and `prevhash` as big-endian hex words, but the
//! block header format wants each 4-byte word byte-reversed. These two helpers do exactly
//! that and nothing else; the header-assembly order lives in [`crate::job`].

use anyhow::{bail, Result};

const WORD_BYTES: usize = 4;

/// Decodes a single 4-byte hex word and reverses its bytes.
pub fn swap_endian_word(hex: &str) -> Result<[u8; WORD_BYTES]> {
    let bytes = hex::decode(hex)?;
    if bytes.len() != WORD_BYTES {
        bail!(
            "swap_endian_word: expected {WORD_BYTES} bytes, got {} (input {hex:?})",
            bytes.len()
        );
    }
    let mut word: [u8; WORD_BYTES] = bytes.try_into().unwrap();
    word.reverse();
    Ok(word)
}

/// Decodes a hex buffer whose length is a multiple of 4 bytes, reversing each 4-byte word in
/// place while leaving word order untouched.
pub fn swap_endian_words(hex: &str) -> Result<Vec<u8>> {
    let bytes = hex::decode(hex)?;
    if bytes.len() % WORD_BYTES != 0 {
        bail!(
            "swap_endian_words: length {} is not a multiple of {WORD_BYTES} (input {hex:?})",
            bytes.len()
        );
    }

    let mut out = bytes;
    for word in out.chunks_exact_mut(WORD_BYTES) {
        word.reverse();
    }
    Ok(out)
}
