// SPDX-License-Identifier: MIT
//
// Mouse report recognition.
//
// The emitter consumes mouse reports as opaque `undefined` keys. This
// module recognizes them by their raw bytes so the filter can drop them,
// and decodes them into a `MouseReport` for callers that want to log
// what was filtered. Two encodings exist:
//
//   SGR  ESC [ < Cb ; Cx ; Cy M|m     decimal, 1-based, `m` = release
//   X11  ESC [ M cb cx cy             each byte offset by 32, 1-based

use std::sync::LazyLock;

use regex::Regex;

use crate::classify::REPLACEMENT;
use crate::key::Modifiers;

static SGR_REPORT: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^\x1b\[<([0-9]+);([0-9]+);([0-9]+)([mM])").expect("static regex")
});

const X11_PREFIX: &str = "\x1b[M";

/// A decoded mouse report.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MouseReport {
    pub kind: MouseKind,
    /// 0-indexed column.
    pub col: u16,
    /// 0-indexed row.
    pub row: u16,
    /// Shift, Alt and Ctrl as reported in the button byte.
    pub modifiers: Modifiers,
}

/// What the mouse did.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MouseKind {
    Press(MouseButton),
    /// X11 reports do not say which button was released.
    Release(Option<MouseButton>),
    Drag(MouseButton),
    Move,
    ScrollUp,
    ScrollDown,
    ScrollLeft,
    ScrollRight,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MouseButton {
    Left,
    Middle,
    Right,
}

/// Parse a raw sequence as a mouse report.
///
/// Returns `None` for anything that is not an SGR or X11 report.
#[must_use]
pub fn parse_mouse_event(sequence: &str) -> Option<MouseReport> {
    if let Some(caps) = SGR_REPORT.captures(sequence) {
        let cb = parse_u16(&caps[1]);
        let x = parse_u16(&caps[2]);
        let y = parse_u16(&caps[3]);
        let release = &caps[4] == "m";
        return Some(decode(cb, x, y, release, false));
    }

    let raw = x11_bytes(sequence.strip_prefix(X11_PREFIX)?);
    let &[cb, x, y, ..] = raw.as_slice() else {
        return None;
    };
    let [cb, x, y] = [cb, x, y].map(|b| u16::from(b.saturating_sub(32)));
    // Legacy encoding has no release flag: button 3 means "released".
    let release = cb & 0b11 == 3 && cb & 64 == 0 && cb & 32 == 0;
    Some(decode(cb, x, y, release, true))
}

/// Recover the raw report bytes from decoded text. Coordinates past 95
/// are single bytes >= 0x80, which may have merged into one character or
/// become [`REPLACEMENT`]. A replacement's original byte is lost; it
/// reads as 0xFF.
fn x11_bytes(payload: &str) -> Vec<u8> {
    let mut bytes = Vec::with_capacity(payload.len());
    for c in payload.chars() {
        if c == REPLACEMENT {
            bytes.push(0xFF);
        } else {
            let mut buf = [0; 4];
            bytes.extend_from_slice(c.encode_utf8(&mut buf).as_bytes());
        }
    }
    bytes
}

/// Whether `sequence` is any kind of mouse report.
#[inline]
#[must_use]
pub fn is_mouse_event(sequence: &str) -> bool {
    parse_mouse_event(sequence).is_some()
}

fn decode(cb: u16, x: u16, y: u16, release: bool, legacy: bool) -> MouseReport {
    let mut modifiers = Modifiers::empty();
    if cb & 4 != 0 {
        modifiers |= Modifiers::SHIFT;
    }
    if cb & 8 != 0 {
        modifiers |= Modifiers::ALT;
    }
    if cb & 16 != 0 {
        modifiers |= Modifiers::CTRL;
    }

    let base = cb & 3;
    let kind = if cb & 64 != 0 {
        match base {
            0 => MouseKind::ScrollUp,
            1 => MouseKind::ScrollDown,
            2 => MouseKind::ScrollLeft,
            _ => MouseKind::ScrollRight,
        }
    } else if cb & 32 != 0 {
        button(base).map_or(MouseKind::Move, MouseKind::Drag)
    } else if release {
        MouseKind::Release(if legacy { None } else { button(base) })
    } else {
        button(base).map_or(MouseKind::Release(None), MouseKind::Press)
    };

    MouseReport {
        kind,
        col: x.saturating_sub(1),
        row: y.saturating_sub(1),
        modifiers,
    }
}

const fn button(base: u16) -> Option<MouseButton> {
    match base {
        0 => Some(MouseButton::Left),
        1 => Some(MouseButton::Middle),
        2 => Some(MouseButton::Right),
        _ => None,
    }
}

fn parse_u16(digits: &str) -> u16 {
    digits.bytes().fold(0u16, |acc, b| {
        acc.saturating_mul(10).saturating_add(u16::from(b - b'0'))
    })
}
