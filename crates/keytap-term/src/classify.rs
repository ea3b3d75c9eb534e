// SPDX-License-Identifier: MIT
//
// Character classification and incremental UTF-8 decoding.
//
// The emitter consumes one character at a time, so a character must
// never be split. Two things guarantee that:
//
// - `Utf8Decoder` holds the leading bytes of a multi-byte character that
//   was cut by a `read()` boundary until its continuation bytes arrive.
// - `is_single_char` tells the emitter whether an accumulated sequence is
//   exactly one character, however many bytes that character takes.

/// Unicode replacement character, emitted for bytes that cannot start or
/// continue a valid UTF-8 character.
pub const REPLACEMENT: char = '\u{FFFD}';

/// Expected byte length of a UTF-8 character from its lead byte.
/// Returns 0 for invalid lead bytes (continuation bytes, 0xF8..=0xFF).
#[must_use]
pub const fn utf8_char_len(lead: u8) -> usize {
    match lead {
        0x00..=0x7F => 1,
        0xC0..=0xDF => 2,
        0xE0..=0xEF => 3,
        0xF0..=0xF7 => 4,
        _ => 0,
    }
}

/// Byte length of the character starting at byte `index` of `s`.
///
/// Returns 0 when `index` is past the end or not on a character boundary.
#[must_use]
pub fn char_len_at(s: &str, index: usize) -> usize {
    s.get(index..)
        .and_then(|rest| rest.chars().next())
        .map_or(0, char::len_utf8)
}

/// Whether `s` consists of exactly one character.
#[must_use]
pub fn is_single_char(s: &str) -> bool {
    !s.is_empty() && char_len_at(s, 0) == s.len()
}

/// Streaming UTF-8 decoder for raw stdin chunks.
///
/// Complete characters are returned immediately. A trailing partial
/// character stays pending until the next [`decode`](Self::decode) call.
/// Bytes that can never form a character become [`REPLACEMENT`].
#[derive(Debug, Default)]
pub struct Utf8Decoder {
    pending: Vec<u8>,
}

impl Utf8Decoder {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Decode `bytes`, prefixed by whatever was pending from the last call.
    pub fn decode(&mut self, bytes: &[u8]) -> String {
        self.pending.extend_from_slice(bytes);

        let buf = &self.pending;
        let mut out = String::with_capacity(buf.len());
        let mut pos = 0;

        while pos < buf.len() {
            let expected = utf8_char_len(buf[pos]);
            if expected == 0 {
                out.push(REPLACEMENT);
                pos += 1;
                continue;
            }

            if pos + expected > buf.len() {
                // Wait for the rest only if what we have so far is a valid prefix.
                if buf[pos + 1..].iter().all(|&b| b & 0xC0 == 0x80) {
                    break;
                }
                out.push(REPLACEMENT);
                pos += 1;
                continue;
            }

            if let Ok(s) = std::str::from_utf8(&buf[pos..pos + expected]) {
                out.push_str(s);
                pos += expected;
            } else {
                out.push(REPLACEMENT);
                pos += 1;
            }
        }

        self.pending.drain(..pos);
        out
    }

    /// Bytes held back waiting for the rest of a character.
    #[must_use]
    pub fn pending(&self) -> &[u8] {
        &self.pending
    }

    /// Give up on the held bytes: each becomes one [`REPLACEMENT`].
    pub fn finish(&mut self) -> String {
        self.pending.drain(..).map(|_| REPLACEMENT).collect()
    }
}
