// SPDX-License-Identifier: MIT
//
// Backslash+Enter disambiguation.
//
// Many terminals cannot send Shift+Enter, so users type `\` then Enter
// to mean "newline, don't submit". Both keys arrive in the same burst
// when typed that way. A lone `\` is therefore held for a few
// milliseconds:
//
// - Enter follows → one `return` key with `shift` set and sequence `\r`.
// - anything else follows → `\`, then that key, unchanged.
// - nothing follows → `\` alone.

use std::time::{Duration, Instant};

use crate::config::BACKSLASH_ENTER_TIMEOUT;
use crate::key::Key;

#[derive(Debug)]
pub struct BackslashEnterBuffer {
    /// The `\` key waiting for its follower.
    held: Option<Key>,
    timeout: Duration,
    deadline: Option<Instant>,
}

impl BackslashEnterBuffer {
    #[must_use]
    pub const fn new(timeout: Duration) -> Self {
        Self {
            held: None,
            timeout,
            deadline: None,
        }
    }

    /// When a held `\` will be released on its own.
    #[inline]
    #[must_use]
    pub const fn deadline(&self) -> Option<Instant> {
        self.deadline
    }

    /// Take one key from upstream, received at `now`.
    pub fn push(&mut self, key: Key, now: Instant, out: &mut Vec<Key>) {
        if let Some(backslash) = self.held.take() {
            self.deadline = None;
            if key.is("return") {
                out.push(Key {
                    shift: true,
                    sequence: "\r".into(),
                    ..key
                });
            } else {
                out.push(backslash);
                out.push(key);
            }
            return;
        }

        if key.sequence == "\\" {
            self.held = Some(key);
            self.deadline = Some(now + self.timeout);
        } else {
            out.push(key);
        }
    }

    /// The window closed with no follower: release the `\`.
    pub fn expire(&mut self, out: &mut Vec<Key>) {
        self.deadline = None;
        if let Some(backslash) = self.held.take() {
            out.push(backslash);
        }
    }
}

impl Default for BackslashEnterBuffer {
    fn default() -> Self {
        Self::new(BACKSLASH_ENTER_TIMEOUT)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn backslash() -> Key {
        Key {
            insertable: true,
            sequence: "\\".into(),
            ..Key::default()
        }
    }

    fn key(name: &str, sequence: &str) -> Key {
        Key {
            name: name.into(),
            sequence: sequence.into(),
            ..Key::default()
        }
    }

    #[test]
    fn other_keys_pass_straight_through() {
        let mut b = BackslashEnterBuffer::default();
        let mut out = Vec::new();
        b.push(key("a", "a"), Instant::now(), &mut out);
        assert_eq!(out, vec![key("a", "a")]);
        assert_eq!(b.deadline(), None);
    }

    #[test]
    fn backslash_is_held() {
        let mut b = BackslashEnterBuffer::default();
        let now = Instant::now();
        let mut out = Vec::new();
        b.push(backslash(), now, &mut out);
        assert!(out.is_empty());
        assert_eq!(b.deadline(), Some(now + BACKSLASH_ENTER_TIMEOUT));
    }

    #[test]
    fn backslash_then_return_is_shift_return() {
        let mut b = BackslashEnterBuffer::default();
        let now = Instant::now();
        let mut out = Vec::new();
        b.push(backslash(), now, &mut out);
        b.push(key("return", "\r"), now, &mut out);
        assert_eq!(
            out,
            vec![Key {
                shift: true,
                ..key("return", "\r")
            }]
        );
        assert_eq!(b.deadline(), None);
    }

    #[test]
    fn csi_u_return_is_rewritten_to_cr() {
        let mut b = BackslashEnterBuffer::default();
        let now = Instant::now();
        let mut out = Vec::new();
        b.push(backslash(), now, &mut out);
        b.push(key("return", "\x1b[13u"), now, &mut out);
        assert_eq!(out[0].sequence, "\r");
        assert!(out[0].shift);
    }

    #[test]
    fn backslash_then_other_replays_both() {
        let mut b = BackslashEnterBuffer::default();
        let now = Instant::now();
        let mut out = Vec::new();
        b.push(backslash(), now, &mut out);
        b.push(key("x", "x"), now, &mut out);
        assert_eq!(out, vec![backslash(), key("x", "x")]);
    }

    #[test]
    fn second_backslash_is_not_held() {
        let mut b = BackslashEnterBuffer::default();
        let now = Instant::now();
        let mut out = Vec::new();
        b.push(backslash(), now, &mut out);
        b.push(backslash(), now, &mut out);
        assert_eq!(out, vec![backslash(), backslash()]);
        assert_eq!(b.deadline(), None);
    }

    #[test]
    fn expire_releases_backslash() {
        let mut b = BackslashEnterBuffer::default();
        let mut out = Vec::new();
        b.push(backslash(), Instant::now(), &mut out);
        b.expire(&mut out);
        assert_eq!(out, vec![backslash()]);
        assert_eq!(b.deadline(), None);
    }

    #[test]
    fn expire_without_held_key_is_noop() {
        let mut b = BackslashEnterBuffer::default();
        let mut out = Vec::new();
        b.expire(&mut out);
        assert!(out.is_empty());
    }
}
