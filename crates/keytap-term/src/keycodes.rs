// SPDX-License-Identifier: MIT
//
// Escape-sequence key-code table.
//
// The emitter reduces every `ESC [ ...` / `ESC O ...` sequence to a short
// `code` (the introducer plus the parameter-stripped tail, e.g. `[A`,
// `[15~`, `OP`) and looks it up here. Some codes carry modifiers in the
// name itself (rxvt sends `ESC [ a` for Shift+Up and `ESC O a` for
// Ctrl+Up), so entries can force `shift` or `ctrl` on regardless of the
// numeric modifier field.

/// What a key code resolves to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct KeyInfo {
    pub name: &'static str,
    /// Shift is implied by the code itself.
    pub shift: bool,
    /// Ctrl is implied by the code itself.
    pub ctrl: bool,
}

const fn plain(name: &'static str) -> KeyInfo {
    KeyInfo {
        name,
        shift: false,
        ctrl: false,
    }
}

const fn shifted(name: &'static str) -> KeyInfo {
    KeyInfo {
        name,
        shift: true,
        ctrl: false,
    }
}

const fn ctrl(name: &'static str) -> KeyInfo {
    KeyInfo {
        name,
        shift: false,
        ctrl: true,
    }
}

/// Every escape code the emitter knows by name.
#[rustfmt::skip]
pub static KEY_CODES: &[(&str, KeyInfo)] = &[
    // ── Bracketed paste markers ─────────────────────────────────
    ("[200~", plain(crate::key::PASTE_START)),
    ("[201~", plain(crate::key::PASTE_END)),

    // ── Linux console function keys (doubled bracket) ───────────
    ("[[A", plain("f1")),
    ("[[B", plain("f2")),
    ("[[C", plain("f3")),
    ("[[D", plain("f4")),
    ("[[E", plain("f5")),
    ("[[5~", plain("pageup")),
    ("[[6~", plain("pagedown")),

    // ── Editing keys (tilde) ────────────────────────────────────
    ("[1~", plain("home")),
    ("[2~", plain("insert")),
    ("[3~", plain("delete")),
    ("[4~", plain("end")),
    ("[5~", plain("pageup")),
    ("[6~", plain("pagedown")),
    ("[7~", plain("home")),
    ("[8~", plain("end")),

    // ── Function keys (tilde) ───────────────────────────────────
    ("[11~", plain("f1")),
    ("[12~", plain("f2")),
    ("[13~", plain("f3")),
    ("[14~", plain("f4")),
    ("[15~", plain("f5")),
    ("[17~", plain("f6")),
    ("[18~", plain("f7")),
    ("[19~", plain("f8")),
    ("[20~", plain("f9")),
    ("[21~", plain("f10")),
    ("[23~", plain("f11")),
    ("[24~", plain("f12")),

    // ── CSI letter keys ─────────────────────────────────────────
    ("[A", plain("up")),
    ("[B", plain("down")),
    ("[C", plain("right")),
    ("[D", plain("left")),
    ("[E", plain("clear")),
    ("[F", plain("end")),
    ("[H", plain("home")),
    ("[P", plain("f1")),
    ("[Q", plain("f2")),
    ("[R", plain("f3")),
    ("[S", plain("f4")),

    // ── SS3 keys ────────────────────────────────────────────────
    ("OA", plain("up")),
    ("OB", plain("down")),
    ("OC", plain("right")),
    ("OD", plain("left")),
    ("OE", plain("clear")),
    ("OF", plain("end")),
    ("OH", plain("home")),
    ("OP", plain("f1")),
    ("OQ", plain("f2")),
    ("OR", plain("f3")),
    ("OS", plain("f4")),

    // ── CSI-u (kitty / modifyOtherKeys) ─────────────────────────
    ("[9u", plain("tab")),
    ("[13u", plain("return")),
    ("[27u", plain("escape")),
    ("[127u", plain("backspace")),
    ("[57414u", plain("return")), // keypad Enter

    // ── rxvt shifted keys ───────────────────────────────────────
    ("[a", shifted("up")),
    ("[b", shifted("down")),
    ("[c", shifted("right")),
    ("[d", shifted("left")),
    ("[e", shifted("clear")),
    ("[2$", shifted("insert")),
    ("[3$", shifted("delete")),
    ("[5$", shifted("pageup")),
    ("[6$", shifted("pagedown")),
    ("[7$", shifted("home")),
    ("[8$", shifted("end")),
    ("[Z", shifted("tab")),

    // ── rxvt ctrl keys ──────────────────────────────────────────
    ("Oa", ctrl("up")),
    ("Ob", ctrl("down")),
    ("Oc", ctrl("right")),
    ("Od", ctrl("left")),
    ("Oe", ctrl("clear")),
    ("[2^", ctrl("insert")),
    ("[3^", ctrl("delete")),
    ("[5^", ctrl("pageup")),
    ("[6^", ctrl("pagedown")),
    ("[7^", ctrl("home")),
    ("[8^", ctrl("end")),
];

/// Resolve an escape code to its key.
#[must_use]
pub fn lookup(code: &str) -> Option<KeyInfo> {
    KEY_CODES
        .iter()
        .find(|(known, _)| *known == code)
        .map(|&(_, info)| info)
}

/// Characters macOS terminals send for Option+letter when Option is not
/// configured as Meta, mapped back to the letter.
#[rustfmt::skip]
pub static MAC_ALT_GLYPHS: &[(char, &str)] = &[
    ('\u{222B}', "b"), // ∫  word back
    ('\u{0192}', "f"), // ƒ  word forward
    ('\u{00B5}', "m"), // µ
    ('\u{03A9}', "z"), // Ω
    ('\u{00B8}', "Z"), // ¸  Option+Shift+Z
];

/// Letter for a macOS Option glyph, if `ch` is one.
#[must_use]
pub fn mac_alt_letter(ch: char) -> Option<&'static str> {
    MAC_ALT_GLYPHS
        .iter()
        .find(|(glyph, _)| *glyph == ch)
        .map(|&(_, letter)| letter)
}
