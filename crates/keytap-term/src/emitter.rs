// SPDX-License-Identifier: MIT
//
// Key-event emitter: the escape-sequence state machine.
//
// Consumes one character per call and emits a key once an atomic input
// unit is complete: a plain character, or an escape sequence of the form
//
//   ESC O [digit] letter                         (SS3)
//   ESC [ [[] digits (; digits)* terminator       (CSI)
//   ESC [ < digits ; digits ; digits (M|m)        (SGR mouse)
//   ESC [ M b x y                                 (X11 mouse)
//
// Mouse reports are consumed whole so their bytes never leak into the
// next key; they come out as `undefined` keys and the filter drops them.
//
// # Flushing
//
// Terminals send sequences as unframed bursts. When the burst ends in
// the middle of a sequence (a lone ESC keypress is the common case) the
// chunk driver feeds [`Input::Flush`], and the emitter resolves whatever
// it has as if the stream ended there. Flush never adds characters to
// the key's `sequence`.
//
// # Tail grammar
//
// Once a CSI sequence is complete, the part after the introducer is
// matched against two shapes to recover a `code` and a modifier mask:
//
//   digits [; digits [; digits]] (~ ^ $ u)   → code = digits + terminator
//   [digits] [; digits] letter               → code = letter
//
// `CSI 27 ; mod ; key ~` is xterm's modifyOtherKeys encoding and is
// rewritten to the CSI-u form `key u`.

use std::mem;
use std::sync::LazyLock;

use regex::Regex;
use tracing::{debug, trace};

use crate::classify::{is_single_char, REPLACEMENT};
use crate::key::{printable, Key, Modifiers, UNDEFINED};
use crate::keycodes;

const ESC: char = '\x1b';

/// `digits[;digits[;digits]]` followed by `~`, `^`, `$` or `u`.
static NUMERIC_TAIL: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^([0-9]+)(?:;([0-9]+))?(?:;([0-9]+))?([~^$u])$").expect("static regex")
});

/// Optional `digits[;digits]` followed by an ASCII letter.
static LETTER_TAIL: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^([0-9]+)?(?:;([0-9]+))?([A-Za-z])$").expect("static regex")
});

/// One step of input for the emitter.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Input {
    /// The next decoded character.
    Char(char),
    /// No more input is coming for now: resolve any partial sequence.
    Flush,
}

/// Where the emitter is inside the escape grammar.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum State {
    /// Between keys.
    Ground,
    /// Saw ESC.
    Escape,
    /// Saw ESC ESC.
    DoubleEscape,
    /// Saw ESC O.
    Ss3,
    /// Saw ESC O digit.
    Ss3Modified,
    /// Saw ESC [.
    CsiStart,
    /// Inside the CSI body, collecting leading digits.
    CsiBody,
    /// After a `;`, collecting modifier groups.
    CsiParams,
    /// After `<`, collecting an SGR mouse report.
    SgrMouse,
    /// After `M`, this many raw X11 mouse bytes still to come.
    X11Mouse(u8),
}

/// Incremental key decoder.
///
/// Feed characters with [`feed`](Self::feed); completed keys are pushed
/// onto the caller's vector in input order.
#[derive(Debug)]
pub struct KeyEmitter {
    state: State,
    /// Every character consumed for the key in progress.
    sequence: String,
    /// The key in progress started with ESC.
    escaped: bool,
    /// Introducer plus reduced tail, looked up in the key-code table.
    code: String,
    /// Raw modifier mask (`param - 1`).
    modifier: u8,
    /// Byte offset in `sequence` where the CSI tail begins.
    cmd_start: usize,
    mac_alt_glyphs: bool,
}

impl KeyEmitter {
    /// Create an emitter. `mac_alt_glyphs` enables mapping macOS Option
    /// glyphs (`∫`, `ƒ`, ...) back to Meta+letter.
    #[must_use]
    pub const fn new(mac_alt_glyphs: bool) -> Self {
        Self {
            state: State::Ground,
            sequence: String::new(),
            escaped: false,
            code: String::new(),
            modifier: 0,
            cmd_start: 0,
            mac_alt_glyphs,
        }
    }

    /// Whether a partial sequence is waiting for more input.
    #[inline]
    #[must_use]
    pub fn has_pending(&self) -> bool {
        self.state != State::Ground
    }

    /// Consume one input step, pushing any completed keys onto `out`.
    pub fn feed(&mut self, input: Input, out: &mut Vec<Key>) {
        let ch = match input {
            Input::Char(c) => {
                self.sequence.push(c);
                Some(c)
            }
            Input::Flush => None,
        };

        match self.state {
            State::Ground => match ch {
                None => {}
                Some(ESC) => {
                    self.escaped = true;
                    self.state = State::Escape;
                }
                Some(_) => self.finish_plain(ch, out),
            },
            State::Escape => match ch {
                Some(ESC) => self.state = State::DoubleEscape,
                Some(c @ ('O' | '[')) => self.begin_ansi(c),
                _ => self.finish_plain(ch, out),
            },
            State::DoubleEscape => match ch {
                Some(c @ ('O' | '[')) => self.begin_ansi(c),
                _ => self.finish_plain(ch, out),
            },
            State::Ss3 => match ch {
                Some(d @ '0'..='9') => {
                    self.modifier = Modifiers::from_param(Some(d.to_string().as_str())).bits();
                    self.state = State::Ss3Modified;
                }
                _ => self.finish_ss3(ch, out),
            },
            State::Ss3Modified => self.finish_ss3(ch, out),
            State::CsiStart => {
                if ch == Some('[') {
                    // ESC [ [ is the Linux console function-key prefix.
                    self.code.push('[');
                    self.cmd_start = self.sequence.len();
                    self.state = State::CsiBody;
                } else {
                    self.cmd_start = self.sequence.len() - ch.map_or(0, char::len_utf8);
                    self.csi_body(ch, out);
                }
            }
            State::CsiBody => self.csi_body(ch, out),
            State::CsiParams => match ch {
                Some('0'..='9' | ';') => {}
                _ => self.finish_csi(out),
            },
            State::SgrMouse => match ch {
                // A flush mid-report keeps waiting; slow mouse bursts are common.
                None | Some('0'..='9' | ';') => {}
                _ => self.finish_csi(out),
            },
            State::X11Mouse(remaining) => match ch {
                None => {}
                Some(c) => {
                    let used = x11_byte_len(c);
                    if remaining > used {
                        self.state = State::X11Mouse(remaining - used);
                    } else {
                        self.finish_csi(out);
                    }
                }
            },
        }
    }

    fn begin_ansi(&mut self, introducer: char) {
        self.code.push(introducer);
        self.state = if introducer == 'O' {
            State::Ss3
        } else {
            State::CsiStart
        };
    }

    fn csi_body(&mut self, ch: Option<char>, out: &mut Vec<Key>) {
        let next = match ch {
            Some('0'..='9') => State::CsiBody,
            Some(';') => State::CsiParams,
            Some('<') => State::SgrMouse,
            Some('M') => State::X11Mouse(3),
            _ => {
                self.finish_csi(out);
                return;
            }
        };
        self.state = next;
    }

    fn finish_ss3(&mut self, ch: Option<char>, out: &mut Vec<Key>) {
        if let Some(c) = ch {
            self.code.push(c);
        }
        self.finish_escape(out);
    }

    fn finish_csi(&mut self, out: &mut Vec<Key>) {
        let (suffix, modifier) = reduce_csi_tail(&self.sequence[self.cmd_start..]);
        self.code.push_str(&suffix);
        self.modifier = modifier.bits();
        self.finish_escape(out);
    }

    /// Resolve a complete `ESC O` / `ESC [` sequence into a key.
    fn finish_escape(&mut self, out: &mut Vec<Key>) {
        let modifiers = Modifiers::from_bits_truncate(self.modifier);
        let mut ctrl = modifiers.contains(Modifiers::CTRL);
        let meta = modifiers.is_meta();
        let mut shift = modifiers.contains(Modifiers::SHIFT);

        let name = if let Some(info) = keycodes::lookup(&self.code) {
            shift |= info.shift;
            ctrl |= info.ctrl;
            info.name.to_owned()
        } else if ctrl || meta {
            modified_letter(&self.code).map_or_else(|| UNDEFINED.to_owned(), String::from)
        } else {
            UNDEFINED.to_owned()
        };

        let key = Key {
            name,
            ctrl,
            meta,
            shift,
            paste: false,
            insertable: false,
            sequence: mem::take(&mut self.sequence),
        };
        self.reset();
        emit(key, out);
    }

    /// Resolve a single character, possibly ESC-prefixed.
    fn finish_plain(&mut self, ch: Option<char>, out: &mut Vec<Key>) {
        let escaped = self.escaped;
        let mut name: Option<String> = None;
        let mut ctrl = false;
        let mut meta = false;
        let mut shift = false;
        let mut insertable = false;

        match ch {
            Some('\r') => {
                name = Some("return".into());
                meta = escaped;
            }
            Some('\n') => {
                name = Some("enter".into());
                meta = escaped;
            }
            Some('\t') => {
                name = Some("tab".into());
                meta = escaped;
            }
            Some('\x08' | '\x7f') => {
                name = Some("backspace".into());
                meta = escaped;
            }
            Some(ESC) => {
                name = Some("escape".into());
                meta = escaped;
            }
            Some(' ') => {
                name = Some("space".into());
                meta = escaped;
                insertable = true;
            }
            Some(c) if !escaped && c <= '\x1a' => {
                // Ctrl+letter arrives as the letter's position in the alphabet.
                name = char::from_u32(u32::from(c) + 0x60).map(String::from);
                ctrl = true;
            }
            Some(c) if c.is_ascii_alphanumeric() => {
                name = Some(c.to_ascii_lowercase().to_string());
                shift = c.is_ascii_uppercase();
                meta = escaped;
                insertable = true;
            }
            Some(c) if self.mac_alt_glyphs && keycodes::mac_alt_letter(c).is_some() => {
                name = keycodes::mac_alt_letter(c).map(String::from);
                meta = true;
            }
            None if self.sequence == "\x1b\x1b" => {
                // ESC ESC then silence: the first ESC is its own keypress,
                // the second is Meta+Escape.
                emit(
                    Key {
                        name: "escape".into(),
                        sequence: ESC.to_string(),
                        ..Key::default()
                    },
                    out,
                );
                self.sequence.truncate(ESC.len_utf8());
                name = Some("escape".into());
                meta = true;
            }
            None if escaped => {
                // Lone ESC then silence.
                name = Some("escape".into());
                meta = true;
            }
            _ if escaped => {
                meta = true;
            }
            _ => {
                insertable = true;
            }
        }

        let sequence = mem::take(&mut self.sequence);
        let complete = (!sequence.is_empty() && (name.is_some() || escaped))
            || is_single_char(&sequence);
        self.reset();

        if complete {
            emit(
                Key {
                    name: name.unwrap_or_default(),
                    ctrl,
                    meta,
                    shift,
                    paste: false,
                    insertable,
                    sequence,
                },
                out,
            );
        }
    }

    fn reset(&mut self) {
        self.state = State::Ground;
        self.sequence.clear();
        self.escaped = false;
        self.code.clear();
        self.modifier = 0;
        self.cmd_start = 0;
    }
}

impl Default for KeyEmitter {
    fn default() -> Self {
        Self::new(cfg!(target_os = "macos"))
    }
}

fn emit(key: Key, out: &mut Vec<Key>) {
    if key.is_undefined() {
        debug!(sequence = %printable(&key.sequence), "unrecognized escape sequence");
    } else {
        trace!(key = %key, sequence = %printable(&key.sequence), "key");
    }
    out.push(key);
}

/// How many raw X11 report bytes `c` stood for on the wire. Each
/// [`REPLACEMENT`] is one byte the decoder could not use.
fn x11_byte_len(c: char) -> u8 {
    if c == REPLACEMENT {
        1
    } else {
        u8::try_from(c.len_utf8()).unwrap_or(u8::MAX)
    }
}

/// Reduce a CSI tail (everything after `ESC [` or `ESC [ [`) to the code
/// suffix used for lookup, plus its modifier mask.
fn reduce_csi_tail(cmd: &str) -> (String, Modifiers) {
    if let Some(caps) = NUMERIC_TAIL.captures(cmd) {
        let modifiers = Modifiers::from_param(caps.get(2).map(|m| m.as_str()));
        let terminator = &caps[4];
        return match caps.get(3) {
            Some(key) if &caps[1] == "27" && terminator == "~" => {
                (format!("{}u", key.as_str()), modifiers)
            }
            _ => (format!("{}{terminator}", &caps[1]), modifiers),
        };
    }

    if let Some(caps) = LETTER_TAIL.captures(cmd) {
        let param = caps.get(2).or_else(|| caps.get(1)).map(|m| m.as_str());
        return (caps[3].to_owned(), Modifiers::from_param(param));
    }

    (cmd.to_owned(), Modifiers::empty())
}

/// Recover a Ctrl/Meta-modified lowercase letter from a CSI-u or tilde
/// code such as `[97u`, which names the key by its codepoint.
fn modified_letter(code: &str) -> Option<char> {
    if !(code.ends_with('u') || code.ends_with('~')) {
        return None;
    }
    let digits: String = code
        .chars()
        .skip(1)
        .take_while(char::is_ascii_digit)
        .collect();
    let codepoint: u32 = digits.parse().ok()?;
    char::from_u32(codepoint).filter(char::is_ascii_lowercase)
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    /// Feed every character of `input`, without flushing.
    fn keys_with(emitter: &mut KeyEmitter, input: &str) -> Vec<Key> {
        let mut out = Vec::new();
        for ch in input.chars() {
            emitter.feed(Input::Char(ch), &mut out);
        }
        out
    }

    fn keys(input: &str) -> Vec<Key> {
        keys_with(&mut KeyEmitter::new(false), input)
    }

    /// Feed `input`, then a flush.
    fn keys_flushed(input: &str) -> Vec<Key> {
        let mut emitter = KeyEmitter::new(false);
        let mut out = keys_with(&mut emitter, input);
        emitter.feed(Input::Flush, &mut out);
        out
    }

    fn one(input: &str) -> Key {
        let mut out = keys(input);
        assert_eq!(out.len(), 1, "expected one key for {input:?}, got {out:?}");
        out.remove(0)
    }

    fn key(name: &str, sequence: &str) -> Key {
        Key {
            name: name.into(),
            sequence: sequence.into(),
            ..Key::default()
        }
    }

    fn text(name: &str, sequence: &str) -> Key {
        Key {
            insertable: true,
            ..key(name, sequence)
        }
    }

    // ── Printable characters ────────────────────────────────────────

    #[test]
    fn lowercase_letter() {
        assert_eq!(one("a"), text("a", "a"));
    }

    #[test]
    fn uppercase_letter_sets_shift() {
        assert_eq!(
            one("A"),
            Key {
                shift: true,
                ..text("a", "A")
            }
        );
    }

    #[test]
    fn digit() {
        assert_eq!(one("7"), text("7", "7"));
    }

    #[test]
    fn space_is_named_and_insertable() {
        assert_eq!(one(" "), text("space", " "));
    }

    #[test]
    fn punctuation_is_unnamed_text() {
        assert_eq!(one("\\"), text("", "\\"));
        assert_eq!(one("~"), text("", "~"));
    }

    #[test]
    fn multibyte_is_one_key() {
        assert_eq!(one("é"), text("", "é"));
        assert_eq!(one("😀"), text("", "😀"));
    }

    #[test]
    fn several_chars_in_order() {
        let names: Vec<_> = keys("ab1").into_iter().map(|k| k.name).collect();
        assert_eq!(names, ["a", "b", "1"]);
    }

    // ── Control characters ──────────────────────────────────────────

    #[test]
    fn carriage_return() {
        assert_eq!(one("\r"), key("return", "\r"));
    }

    #[test]
    fn line_feed_is_enter() {
        assert_eq!(one("\n"), key("enter", "\n"));
    }

    #[test]
    fn tab() {
        assert_eq!(one("\t"), key("tab", "\t"));
    }

    #[test]
    fn backspace_both_bytes() {
        assert_eq!(one("\x7f"), key("backspace", "\x7f"));
        assert_eq!(one("\x08"), key("backspace", "\x08"));
    }

    #[test]
    fn ctrl_letters() {
        assert_eq!(
            one("\x03"),
            Key {
                ctrl: true,
                ..key("c", "\x03")
            }
        );
        assert_eq!(one("\x1a").name, "z");
        assert!(one("\x01").ctrl);
    }

    // ── Alt / ESC-prefixed ──────────────────────────────────────────

    #[test]
    fn alt_letter() {
        assert_eq!(
            one("\x1bx"),
            Key {
                meta: true,
                ..text("x", "\x1bx")
            }
        );
    }

    #[test]
    fn alt_return() {
        let k = one("\x1b\r");
        assert_eq!(k.name, "return");
        assert!(k.meta);
    }

    #[test]
    fn alt_punctuation_is_unnamed_meta() {
        let k = one("\x1b.");
        assert_eq!(k.name, "");
        assert!(k.meta);
        assert_eq!(k.sequence, "\x1b.");
    }

    #[test]
    fn lone_escape_waits_for_flush() {
        let mut emitter = KeyEmitter::new(false);
        let mut out = keys_with(&mut emitter, "\x1b");
        assert!(out.is_empty());
        assert!(emitter.has_pending());

        emitter.feed(Input::Flush, &mut out);
        assert_eq!(
            out,
            vec![Key {
                meta: true,
                ..key("escape", "\x1b")
            }]
        );
        assert!(!emitter.has_pending());
    }

    #[test]
    fn double_escape_emits_two_keys() {
        let out = keys_flushed("\x1b\x1b");
        assert_eq!(
            out,
            vec![
                key("escape", "\x1b"),
                Key {
                    meta: true,
                    ..key("escape", "\x1b")
                },
            ]
        );
    }

    #[test]
    fn double_escape_prefix_on_sequence() {
        let k = one("\x1b\x1b[A");
        assert_eq!(k.name, "up");
        assert_eq!(k.sequence, "\x1b\x1b[A");
    }

    #[test]
    fn flush_when_idle_emits_nothing() {
        assert!(keys_flushed("").is_empty());
    }

    // ── CSI / SS3 keys ──────────────────────────────────────────────

    #[test]
    fn arrow_up_is_atomic() {
        let mut emitter = KeyEmitter::new(false);
        assert!(keys_with(&mut emitter, "\x1b[").is_empty());
        assert_eq!(keys_with(&mut emitter, "A"), vec![key("up", "\x1b[A")]);
    }

    #[test]
    fn ss3_arrows_and_function_keys() {
        assert_eq!(one("\x1bOA"), key("up", "\x1bOA"));
        assert_eq!(one("\x1bOP"), key("f1", "\x1bOP"));
    }

    #[test]
    fn ss3_with_modifier_digit() {
        let k = one("\x1bO5C");
        assert_eq!(k.name, "right");
        assert!(k.ctrl);
        assert!(!k.shift);
    }

    #[test]
    fn ctrl_shift_right() {
        assert_eq!(
            one("\x1b[1;6C"),
            Key {
                ctrl: true,
                shift: true,
                ..key("right", "\x1b[1;6C")
            }
        );
    }

    #[test]
    fn alt_down() {
        let k = one("\x1b[1;3B");
        assert_eq!(k.name, "down");
        assert!(k.meta);
        assert!(!k.ctrl);
    }

    #[test]
    fn tilde_keys() {
        assert_eq!(one("\x1b[3~"), key("delete", "\x1b[3~"));
        assert_eq!(one("\x1b[15~").name, "f5");
        assert_eq!(one("\x1b[24~").name, "f12");
    }

    #[test]
    fn tilde_key_with_modifier() {
        let k = one("\x1b[3;5~");
        assert_eq!(k.name, "delete");
        assert!(k.ctrl);
    }

    #[test]
    fn doubled_bracket_function_keys() {
        assert_eq!(one("\x1b[[A").name, "f1");
        assert_eq!(one("\x1b[[5~").name, "pageup");
    }

    #[test]
    fn rxvt_intrinsic_modifiers() {
        let k = one("\x1b[a");
        assert_eq!(k.name, "up");
        assert!(k.shift);

        let k = one("\x1bOd");
        assert_eq!(k.name, "left");
        assert!(k.ctrl);

        let k = one("\x1b[6^");
        assert_eq!(k.name, "pagedown");
        assert!(k.ctrl);
    }

    #[test]
    fn shift_tab() {
        let k = one("\x1b[Z");
        assert_eq!(k.name, "tab");
        assert!(k.shift);
    }

    #[test]
    fn paste_markers_are_named() {
        assert_eq!(one("\x1b[200~").name, "paste-start");
        assert_eq!(one("\x1b[201~").name, "paste-end");
    }

    // ── CSI-u and modifyOtherKeys ───────────────────────────────────

    #[test]
    fn csi_u_known_keys() {
        assert_eq!(one("\x1b[13u").name, "return");
        assert_eq!(one("\x1b[57414u").name, "return");

        let k = one("\x1b[13;2u");
        assert_eq!(k.name, "return");
        assert!(k.shift);
    }

    #[test]
    fn csi_u_ctrl_letter() {
        let k = one("\x1b[97;5u");
        assert_eq!(k.name, "a");
        assert!(k.ctrl);
    }

    #[test]
    fn modify_other_keys_rewritten_to_csi_u() {
        let k = one("\x1b[27;5;106~");
        assert_eq!(k.name, "j");
        assert!(k.ctrl);
        assert_eq!(k.sequence, "\x1b[27;5;106~");

        let k = one("\x1b[27;2;13~");
        assert_eq!(k.name, "return");
        assert!(k.shift);
    }

    #[test]
    fn unmodified_codepoint_stays_undefined() {
        assert_eq!(one("\x1b[97u").name, UNDEFINED);
    }

    // ── Unrecognized sequences ──────────────────────────────────────

    #[test]
    fn unknown_code_keeps_bytes() {
        assert_eq!(one("\x1b[y"), key(UNDEFINED, "\x1b[y"));
    }

    #[test]
    fn unknown_code_still_decodes_modifier_field() {
        // 99 - 1 = 0b110_0010: the Alt bit is set.
        let k = one("\x1b[99z");
        assert_eq!(k.name, UNDEFINED);
        assert!(k.meta);
        assert_eq!(k.sequence, "\x1b[99z");
    }

    #[test]
    fn truncated_csi_flushes_as_undefined() {
        assert_eq!(keys_flushed("\x1b["), vec![key(UNDEFINED, "\x1b[")]);
    }

    #[test]
    fn truncated_ss3_flushes_as_undefined() {
        assert_eq!(keys_flushed("\x1bO"), vec![key(UNDEFINED, "\x1bO")]);
    }

    #[test]
    fn focus_reports_are_consumed() {
        assert_eq!(one("\x1b[I"), key(UNDEFINED, "\x1b[I"));
        assert_eq!(one("\x1b[O"), key(UNDEFINED, "\x1b[O"));
    }

    // ── Mouse reports ───────────────────────────────────────────────

    #[test]
    fn sgr_mouse_consumed_whole() {
        let out = keys("\x1b[<0;10;20Mx");
        assert_eq!(
            out,
            vec![key(UNDEFINED, "\x1b[<0;10;20M"), text("x", "x")]
        );
    }

    #[test]
    fn sgr_mouse_survives_flush_mid_report() {
        let mut emitter = KeyEmitter::new(false);
        let mut out = keys_with(&mut emitter, "\x1b[<35;1");
        emitter.feed(Input::Flush, &mut out);
        assert!(out.is_empty());
        out.extend(keys_with(&mut emitter, "0;5m"));
        assert_eq!(out, vec![key(UNDEFINED, "\x1b[<35;10;5m")]);
    }

    #[test]
    fn x11_mouse_takes_three_bytes() {
        let out = keys("\x1b[M !!a");
        assert_eq!(out, vec![key(UNDEFINED, "\x1b[M !!"), text("a", "a")]);
    }

    #[test]
    fn x11_mouse_counts_bytes_not_chars() {
        // Column byte 0xC3 and row byte 0xA9 decode as one `é`.
        let out = keys("\x1b[M \u{e9}a");
        assert_eq!(
            out,
            vec![key(UNDEFINED, "\x1b[M \u{e9}"), text("a", "a")]
        );
    }

    #[test]
    fn x11_mouse_counts_replacement_as_one_byte() {
        let out = keys("\x1b[M\u{FFFD}\u{FFFD}\u{FFFD}a");
        assert_eq!(out.len(), 2);
        assert_eq!(out[1], text("a", "a"));
    }

    #[test]
    fn x11_mouse_waits_through_flush() {
        let mut emitter = KeyEmitter::new(false);
        let mut out = keys_with(&mut emitter, "\x1b[M ");
        emitter.feed(Input::Flush, &mut out);
        assert!(out.is_empty());
        out.extend(keys_with(&mut emitter, "!!"));
        assert_eq!(out, vec![key(UNDEFINED, "\x1b[M !!")]);
    }

    // ── macOS Option glyphs ─────────────────────────────────────────

    #[test]
    fn mac_glyph_maps_to_meta_letter() {
        let out = keys_with(&mut KeyEmitter::new(true), "∫");
        assert_eq!(
            out,
            vec![Key {
                meta: true,
                ..key("b", "∫")
            }]
        );
    }

    #[test]
    fn mac_glyph_is_text_when_disabled() {
        assert_eq!(one("∫"), text("", "∫"));
    }

    // ── Tail reduction ──────────────────────────────────────────────

    #[test]
    fn reduce_numeric_tail() {
        assert_eq!(
            reduce_csi_tail("3;5~"),
            ("3~".to_owned(), Modifiers::CTRL)
        );
        assert_eq!(reduce_csi_tail("200~"), ("200~".to_owned(), Modifiers::empty()));
    }

    #[test]
    fn reduce_letter_tail() {
        assert_eq!(
            reduce_csi_tail("1;2A"),
            ("A".to_owned(), Modifiers::SHIFT)
        );
        assert_eq!(reduce_csi_tail("A"), ("A".to_owned(), Modifiers::empty()));
    }

    #[test]
    fn reduce_unmatched_tail_verbatim() {
        assert_eq!(
            reduce_csi_tail("<0;1;1M"),
            ("<0;1;1M".to_owned(), Modifiers::empty())
        );
    }

    #[test]
    fn modified_letter_bounds() {
        assert_eq!(modified_letter("[97u"), Some('a'));
        assert_eq!(modified_letter("[122~"), Some('z'));
        assert_eq!(modified_letter("[65u"), None);
        assert_eq!(modified_letter("[97z"), None);
    }
}
