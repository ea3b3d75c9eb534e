// SPDX-License-Identifier: MIT
//
// Keypress pipeline: the decoding stages wired in order.
//
//   bytes ─→ ChunkDriver ─→ PasteBuffer ─→ BackslashEnterBuffer ─→ filter ─→ out
//
// Each stage that waits on silence keeps its own deadline. Nothing here
// sleeps or spawns timers. The owner asks for `next_deadline()`, waits
// however it likes, then calls `process_due(now)`. Expired deadlines are
// fired oldest first and each stage sees the deadline itself as "now",
// so a late wake-up produces exactly the keys a punctual one would have.

use std::time::Instant;

use crate::backslash::BackslashEnterBuffer;
use crate::config::KeypressConfig;
use crate::driver::ChunkDriver;
use crate::emitter::KeyEmitter;
use crate::filter;
use crate::key::Key;
use crate::paste::PasteBuffer;

/// Which stage owns a deadline. Declaration order breaks ties: upstream
/// stages fire first.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Timer {
    EscapeFlush,
    PasteIdle,
    Backslash,
}

/// Bytes in, filtered key events out.
#[derive(Debug)]
pub struct KeypressPipeline {
    driver: ChunkDriver,
    paste: PasteBuffer,
    backslash: BackslashEnterBuffer,
}

impl KeypressPipeline {
    #[must_use]
    pub fn new(config: &KeypressConfig) -> Self {
        Self {
            driver: ChunkDriver::new(
                KeyEmitter::new(config.mac_alt_glyphs),
                config.escape_timeout,
            ),
            paste: PasteBuffer::new(config.paste_idle_timeout),
            backslash: BackslashEnterBuffer::new(config.backslash_enter_timeout),
        }
    }

    /// Feed one chunk of raw stdin read at `now`.
    ///
    /// Deadlines that expired up to `now` fire first, so keys come out in
    /// the order a live timer would have produced them.
    pub fn process(&mut self, data: &[u8], now: Instant) -> Vec<Key> {
        let mut out = self.process_due(now);

        let mut decoded = Vec::new();
        self.driver.process(data, now, &mut decoded);
        self.forward(decoded, now, &mut out);
        out
    }

    /// Fire every deadline at or before `now`, oldest first.
    pub fn process_due(&mut self, now: Instant) -> Vec<Key> {
        let mut out = Vec::new();
        while let Some((timer, at)) = self.earliest().filter(|&(_, at)| at <= now) {
            let mut keys = Vec::new();
            match timer {
                Timer::EscapeFlush => {
                    self.driver.flush(&mut keys);
                    self.forward(keys, at, &mut out);
                }
                Timer::PasteIdle => {
                    self.paste.expire(&mut keys);
                    self.forward_from_backslash(keys, at, &mut out);
                }
                Timer::Backslash => {
                    self.backslash.expire(&mut keys);
                    out.extend(keys.into_iter().filter_map(filter::keyboard_only));
                }
            }
        }
        out
    }

    /// The earliest pending deadline across all stages.
    #[must_use]
    pub fn next_deadline(&self) -> Option<Instant> {
        self.earliest().map(|(_, at)| at)
    }

    /// Whether any stage is holding input back.
    #[must_use]
    pub fn is_idle(&self) -> bool {
        !self.driver.has_pending() && self.next_deadline().is_none()
    }

    fn earliest(&self) -> Option<(Timer, Instant)> {
        [
            (Timer::EscapeFlush, self.driver.deadline()),
            (Timer::PasteIdle, self.paste.deadline()),
            (Timer::Backslash, self.backslash.deadline()),
        ]
        .into_iter()
        .filter_map(|(timer, at)| at.map(|at| (timer, at)))
        .min_by_key(|&(_, at)| at)
    }

    /// Run freshly decoded keys through every stage after the driver.
    fn forward(&mut self, keys: Vec<Key>, now: Instant, out: &mut Vec<Key>) {
        let mut unpasted = Vec::new();
        for key in keys {
            self.paste.push(key, now, &mut unpasted);
        }
        self.forward_from_backslash(unpasted, now, out);
    }

    fn forward_from_backslash(&mut self, keys: Vec<Key>, now: Instant, out: &mut Vec<Key>) {
        let mut resolved = Vec::new();
        for key in keys {
            self.backslash.push(key, now, &mut resolved);
        }
        out.extend(resolved.into_iter().filter_map(filter::keyboard_only));
    }
}

impl Default for KeypressPipeline {
    fn default() -> Self {
        Self::new(&KeypressConfig::default())
    }
}
