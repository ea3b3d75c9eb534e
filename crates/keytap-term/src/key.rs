// SPDX-License-Identifier: MIT
//
// The key event, the only value that flows through the pipeline.
//
// A key is created by the emitter for one atomic input unit (a plain
// character, a complete escape sequence) or by the paste buffer for a
// whole paste. `sequence` always holds the exact characters read for that
// unit, even when `name` and the flags are synthesized, so downstream
// stages can still recognize mouse and focus reports by their bytes.

use std::fmt;

use bitflags::bitflags;

/// Name of the marker key produced by `CSI 200~`.
pub const PASTE_START: &str = "paste-start";
/// Name of the marker key produced by `CSI 201~`.
pub const PASTE_END: &str = "paste-end";
/// Name given to escape sequences that match no known key.
pub const UNDEFINED: &str = "undefined";

bitflags! {
    /// Modifier bitmask as encoded in CSI parameters.
    ///
    /// Terminals send `1 + bitmask`, so `ESC [ 1 ; 6 C` carries
    /// `SHIFT | CTRL`. Bit 8 is Meta on xterm; it folds into
    /// [`Key::meta`] together with Alt.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Hash)]
    pub struct Modifiers: u8 {
        const SHIFT = 0b0000_0001;
        const ALT   = 0b0000_0010;
        const CTRL  = 0b0000_0100;
        const META  = 0b0000_1000;
    }
}

impl Modifiers {
    /// Decode a CSI modifier parameter (`1 + bitmask`).
    ///
    /// A missing parameter means "no modifiers". Only the low bits carry
    /// flags, so arithmetic wraps instead of saturating.
    #[allow(clippy::cast_possible_truncation)]
    #[must_use]
    pub fn from_param(param: Option<&str>) -> Self {
        let value = param.map_or(1, |digits| {
            digits
                .bytes()
                .filter(u8::is_ascii_digit)
                .fold(0u32, |acc, b| acc.wrapping_mul(10).wrapping_add(u32::from(b - b'0')))
        });
        Self::from_bits_truncate(value.wrapping_sub(1) as u8)
    }

    /// Alt and Meta both read as `meta`.
    #[inline]
    #[must_use]
    pub const fn is_meta(self) -> bool {
        self.intersects(Self::ALT.union(Self::META))
    }
}

/// A decoded keypress.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Key {
    /// Symbolic key name: `"a"`, `"up"`, `"return"`, `"escape"`, ...
    ///
    /// Empty for unnamed printable text and for paste events.
    pub name: String,
    pub ctrl: bool,
    /// Alt or Meta.
    pub meta: bool,
    pub shift: bool,
    /// Set only on the synthetic event carrying a bracketed paste.
    pub paste: bool,
    /// The key is literal text for an edit buffer rather than a
    /// control or navigation key.
    pub insertable: bool,
    /// The raw characters that produced this key.
    pub sequence: String,
}

impl Key {
    /// The single event delivered for a completed paste.
    #[must_use]
    pub fn pasted(text: String) -> Self {
        Self {
            name: String::new(),
            ctrl: false,
            meta: false,
            shift: false,
            paste: true,
            insertable: true,
            sequence: text,
        }
    }

    /// Whether this key carries the given symbolic name.
    #[inline]
    #[must_use]
    pub fn is(&self, name: &str) -> bool {
        self.name == name
    }

    /// Whether the emitter failed to recognize the escape sequence.
    #[inline]
    #[must_use]
    pub fn is_undefined(&self) -> bool {
        self.name == UNDEFINED
    }
}

impl fmt::Display for Key {
    /// Compact chord notation: `ctrl+shift+right`, `text("é")`,
    /// `paste(12 chars)`, `undefined(ESC[99z)`.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.paste {
            return write!(f, "paste({} chars)", self.sequence.chars().count());
        }
        if self.is_undefined() {
            return write!(f, "undefined({})", printable(&self.sequence));
        }
        if self.ctrl {
            f.write_str("ctrl+")?;
        }
        if self.meta {
            f.write_str("meta+")?;
        }
        if self.shift {
            f.write_str("shift+")?;
        }
        if self.name.is_empty() {
            write!(f, "text({:?})", self.sequence)
        } else {
            f.write_str(&self.name)
        }
    }
}

/// Render a raw sequence for humans: ESC as `ESC`, other controls escaped.
#[must_use]
pub fn printable(sequence: &str) -> String {
    let mut out = String::with_capacity(sequence.len() + 4);
    for ch in sequence.chars() {
        if ch == '\x1b' {
            out.push_str("ESC");
        } else {
            out.extend(ch.escape_debug());
        }
    }
    out
}
