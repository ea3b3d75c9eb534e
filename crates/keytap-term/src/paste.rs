// SPDX-License-Identifier: MIT
//
// Paste buffer.
//
// With bracketed paste enabled the terminal wraps pasted text in
// `CSI 200~` ... `CSI 201~`. The emitter turns those markers into
// `paste-start` / `paste-end` keys and decodes the text between them as
// ordinary keys. This stage reassembles the text from those keys' raw
// sequences and delivers it as one `paste` event.
//
// A paste whose end marker never arrives (terminal bug, dropped bytes) is
// delivered after `paste_idle_timeout` without a new key. The markers
// themselves never go downstream.

use std::time::{Duration, Instant};

use tracing::debug;

use crate::config::PASTE_TIMEOUT;
use crate::key::{Key, PASTE_END, PASTE_START};

#[derive(Debug)]
pub struct PasteBuffer {
    /// Text collected since `paste-start`, or `None` when idle.
    buffer: Option<String>,
    idle_timeout: Duration,
    deadline: Option<Instant>,
}

impl PasteBuffer {
    #[must_use]
    pub const fn new(idle_timeout: Duration) -> Self {
        Self {
            buffer: None,
            idle_timeout,
            deadline: None,
        }
    }

    /// Whether a paste is being collected.
    #[inline]
    #[must_use]
    pub const fn is_buffering(&self) -> bool {
        self.buffer.is_some()
    }

    /// When an unterminated paste will be delivered, if one is open.
    #[inline]
    #[must_use]
    pub const fn deadline(&self) -> Option<Instant> {
        self.deadline
    }

    /// Take one key from upstream, received at `now`.
    pub fn push(&mut self, key: Key, now: Instant, out: &mut Vec<Key>) {
        match self.buffer.as_mut() {
            None if key.is(PASTE_START) => {
                self.buffer = Some(String::new());
                self.deadline = Some(now + self.idle_timeout);
            }
            None => out.push(key),
            Some(_) if key.is(PASTE_END) => self.finish(out, "end marker"),
            Some(text) => {
                text.push_str(&key.sequence);
                self.deadline = Some(now + self.idle_timeout);
            }
        }
    }

    /// The idle deadline passed: deliver what was collected.
    pub fn expire(&mut self, out: &mut Vec<Key>) {
        self.finish(out, "idle timeout");
    }

    fn finish(&mut self, out: &mut Vec<Key>, reason: &str) {
        self.deadline = None;
        let Some(text) = self.buffer.take() else {
            return;
        };
        debug!(chars = text.chars().count(), reason, "paste complete");
        if !text.is_empty() {
            out.push(Key::pasted(text));
        }
    }
}

impl Default for PasteBuffer {
    fn default() -> Self {
        Self::new(PASTE_TIMEOUT)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn key(name: &str, sequence: &str) -> Key {
        Key {
            name: name.into(),
            sequence: sequence.into(),
            ..Key::default()
        }
    }

    fn start() -> Key {
        key(PASTE_START, "\x1b[200~")
    }

    fn end() -> Key {
        key(PASTE_END, "\x1b[201~")
    }

    #[test]
    fn passes_through_when_idle() {
        let mut p = PasteBuffer::default();
        let mut out = Vec::new();
        p.push(key("a", "a"), Instant::now(), &mut out);
        assert_eq!(out, vec![key("a", "a")]);
        assert_eq!(p.deadline(), None);
    }

    #[test]
    fn collects_raw_sequences_until_end() {
        let mut p = PasteBuffer::default();
        let now = Instant::now();
        let mut out = Vec::new();
        p.push(start(), now, &mut out);
        p.push(key("h", "h"), now, &mut out);
        p.push(key("return", "\r"), now, &mut out);
        p.push(key("up", "\x1b[A"), now, &mut out);
        assert!(out.is_empty());
        assert!(p.is_buffering());

        p.push(end(), now, &mut out);
        assert_eq!(out, vec![Key::pasted("h\r\x1b[A".into())]);
        assert!(!p.is_buffering());
        assert_eq!(p.deadline(), None);
    }

    #[test]
    fn empty_paste_emits_nothing() {
        let mut p = PasteBuffer::default();
        let now = Instant::now();
        let mut out = Vec::new();
        p.push(start(), now, &mut out);
        p.push(end(), now, &mut out);
        assert!(out.is_empty());
    }

    #[test]
    fn idle_deadline_slides_with_each_key() {
        let mut p = PasteBuffer::new(Duration::from_secs(30));
        let t0 = Instant::now();
        p.push(start(), t0, &mut Vec::new());
        assert_eq!(p.deadline(), Some(t0 + Duration::from_secs(30)));

        let t1 = t0 + Duration::from_secs(10);
        p.push(key("x", "x"), t1, &mut Vec::new());
        assert_eq!(p.deadline(), Some(t1 + Duration::from_secs(30)));
    }

    #[test]
    fn expire_delivers_partial_paste() {
        let mut p = PasteBuffer::default();
        let mut out = Vec::new();
        p.push(start(), Instant::now(), &mut out);
        p.push(key("o", "o"), Instant::now(), &mut out);
        p.push(key("k", "k"), Instant::now(), &mut out);
        p.expire(&mut out);
        assert_eq!(out, vec![Key::pasted("ok".into())]);
        assert!(!p.is_buffering());
    }

    #[test]
    fn expire_when_idle_is_noop() {
        let mut p = PasteBuffer::default();
        let mut out = Vec::new();
        p.expire(&mut out);
        assert!(out.is_empty());
    }

    #[test]
    fn nested_start_marker_is_collected_verbatim() {
        let mut p = PasteBuffer::default();
        let now = Instant::now();
        let mut out = Vec::new();
        p.push(start(), now, &mut out);
        p.push(start(), now, &mut out);
        p.push(end(), now, &mut out);
        assert_eq!(out, vec![Key::pasted("\x1b[200~".into())]);
    }
}
