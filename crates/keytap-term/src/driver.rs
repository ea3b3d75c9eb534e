// SPDX-License-Identifier: MIT
//
// Data-chunk driver: feeds stdin chunks into the emitter.
//
// Each chunk is decoded to characters and fed one at a time. After a
// non-empty chunk the driver arms a short flush deadline; if no further
// data arrives before it passes, the emitter is told to resolve whatever
// partial sequence it holds. That is what turns a lone ESC keypress into
// an `escape` key instead of leaving it pending forever.

use std::time::{Duration, Instant};

use crate::classify::Utf8Decoder;
use crate::config::ESC_TIMEOUT;
use crate::emitter::{Input, KeyEmitter};
use crate::key::Key;

/// Chunk-to-key front end of the pipeline.
#[derive(Debug)]
pub struct ChunkDriver {
    emitter: KeyEmitter,
    decoder: Utf8Decoder,
    escape_timeout: Duration,
    flush_deadline: Option<Instant>,
}

impl ChunkDriver {
    #[must_use]
    pub fn new(emitter: KeyEmitter, escape_timeout: Duration) -> Self {
        Self {
            emitter,
            decoder: Utf8Decoder::new(),
            escape_timeout,
            flush_deadline: None,
        }
    }

    /// Feed one raw chunk read at `now`.
    ///
    /// Cancels any pending flush, emits every key the chunk completes, then
    /// re-arms the flush deadline if the chunk carried data.
    pub fn process(&mut self, data: &[u8], now: Instant, out: &mut Vec<Key>) {
        self.flush_deadline = None;

        let text = self.decoder.decode(data);
        for ch in text.chars() {
            self.emitter.feed(Input::Char(ch), out);
        }

        if !data.is_empty() {
            self.flush_deadline = Some(now + self.escape_timeout);
        }
    }

    /// When the pending flush fires, if one is armed.
    #[inline]
    #[must_use]
    pub const fn deadline(&self) -> Option<Instant> {
        self.flush_deadline
    }

    /// Fire the flush: resolve a truncated UTF-8 character and any
    /// partial escape sequence.
    pub fn flush(&mut self, out: &mut Vec<Key>) {
        self.flush_deadline = None;
        for ch in self.decoder.finish().chars() {
            self.emitter.feed(Input::Char(ch), out);
        }
        self.emitter.feed(Input::Flush, out);
    }

    /// Whether input is held back: undecoded bytes or a sequence the
    /// emitter has not finished.
    #[must_use]
    pub fn has_pending(&self) -> bool {
        !self.decoder.pending().is_empty() || self.emitter.has_pending()
    }
}

impl Default for ChunkDriver {
    fn default() -> Self {
        Self::new(KeyEmitter::default(), ESC_TIMEOUT)
    }
}
