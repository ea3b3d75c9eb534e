// SPDX-License-Identifier: MIT
//
// Keypress context: owns the pipeline, the subscribers and, while
// mounted, the terminal session.
//
// Mounting puts stdin in raw mode (unless it already is), turns on
// bracketed paste and starts the background reader. The owner then calls
// `pump` in its loop. Each call waits for a chunk or the next pipeline
// deadline, whichever comes first, and hands the resulting keys to every
// subscriber. Unmounting reverses the setup in the opposite order.
//
// `feed` and `tick` drive the same pipeline with caller-supplied bytes and
// clock, so the context works without a terminal.

use std::io;
use std::sync::mpsc::{Receiver, RecvTimeoutError};
use std::time::{Duration, Instant};

use tracing::{debug, info, warn};

use crate::broadcast::{Broadcaster, SubscriptionId};
use crate::config::KeypressConfig;
use crate::error::{Error, Result};
use crate::key::Key;
use crate::pipeline::KeypressPipeline;
use crate::reader::StdinReader;
use crate::terminal::{self, RawMode};

/// Outcome of one [`KeypressContext::pump`] call.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Pump {
    /// This many keys reached the subscribers.
    Delivered(usize),
    /// Nothing to deliver yet.
    Idle,
    /// The reader stopped (stdin closed). Further pumps will not deliver.
    Closed,
}

/// Terminal state held while mounted.
#[derive(Debug)]
struct Session {
    raw: RawMode,
    reader: StdinReader,
    chunks: Receiver<Vec<u8>>,
    bracketed_paste: bool,
}

#[derive(Debug)]
pub struct KeypressContext {
    config: KeypressConfig,
    pipeline: KeypressPipeline,
    subscribers: Broadcaster,
    session: Option<Session>,
}

impl KeypressContext {
    #[must_use]
    pub fn new(config: KeypressConfig) -> Self {
        Self {
            config,
            pipeline: KeypressPipeline::new(&config),
            subscribers: Broadcaster::new(),
            session: None,
        }
    }

    #[inline]
    #[must_use]
    pub const fn is_mounted(&self) -> bool {
        self.session.is_some()
    }

    /// Register a handler for every delivered key.
    pub fn subscribe<F>(&mut self, handler: F) -> SubscriptionId
    where
        F: FnMut(&Key) + 'static,
    {
        self.subscribers.subscribe(handler)
    }

    /// Remove a handler. Returns `false` if it was not registered.
    pub fn unsubscribe(&mut self, id: SubscriptionId) -> bool {
        self.subscribers.unsubscribe(id)
    }

    /// Take over the terminal and start reading stdin.
    ///
    /// # Errors
    ///
    /// [`Error::AlreadyMounted`] on a second mount, [`Error::Io`] if raw
    /// mode or the bracketed-paste write fails, [`Error::ReaderSpawn`] if
    /// the reader thread cannot start. A failed mount leaves the terminal
    /// as it found it.
    pub fn mount(&mut self) -> Result<()> {
        if self.session.is_some() {
            return Err(Error::AlreadyMounted);
        }

        terminal::install_panic_hook();
        let raw = RawMode::enable()?;

        let bracketed_paste = self.config.bracketed_paste;
        if bracketed_paste {
            terminal::enable_bracketed_paste(&mut io::stdout().lock())?;
        }

        let (reader, chunks) = match StdinReader::spawn(self.config.reader_poll_interval) {
            Ok(spawned) => spawned,
            Err(err) => {
                if bracketed_paste {
                    let cleanup = terminal::disable_bracketed_paste(&mut io::stdout().lock());
                    if let Err(cleanup_err) = cleanup {
                        warn!(%cleanup_err, "failed to disable bracketed paste after failed mount");
                    }
                }
                return Err(err);
            }
        };

        info!(
            raw_mode = raw.changed_terminal(),
            bracketed_paste, "keypress context mounted"
        );
        self.session = Some(Session {
            raw,
            reader,
            chunks,
            bracketed_paste,
        });
        Ok(())
    }

    /// Stop reading and give the terminal back.
    ///
    /// Input still held by the pipeline (a half-read escape sequence, an
    /// open paste) is discarded.
    ///
    /// # Errors
    ///
    /// [`Error::NotMounted`] if not mounted, [`Error::Io`] if a teardown
    /// step fails. Every step is attempted; the first failure is returned.
    pub fn unmount(&mut self) -> Result<()> {
        let mut session = self.session.take().ok_or(Error::NotMounted)?;
        session.reader.stop();

        let mut first_err = None;
        if session.bracketed_paste {
            if let Err(err) = terminal::disable_bracketed_paste(&mut io::stdout().lock()) {
                warn!(%err, "failed to disable bracketed paste");
                first_err = first_err.or(Some(err));
            }
        }
        if let Err(err) = session.raw.restore() {
            warn!(%err, "failed to restore terminal mode");
            first_err = first_err.or(Some(err));
        }

        if !self.pipeline.is_idle() {
            debug!("discarding pending input on unmount");
        }
        self.pipeline = KeypressPipeline::new(&self.config);
        info!("keypress context unmounted");

        first_err.map_or(Ok(()), |err| Err(err.into()))
    }

    /// Wait up to `max_wait` for input or a pipeline deadline, then
    /// deliver whatever keys resulted.
    ///
    /// # Errors
    ///
    /// [`Error::NotMounted`] if not mounted.
    pub fn pump(&mut self, max_wait: Duration) -> Result<Pump> {
        let session = self.session.as_ref().ok_or(Error::NotMounted)?;

        let now = Instant::now();
        let wait = self
            .pipeline
            .next_deadline()
            .map_or(max_wait, |at| max_wait.min(at.saturating_duration_since(now)));

        let keys = match session.chunks.recv_timeout(wait) {
            Ok(chunk) => self.pipeline.process(&chunk, Instant::now()),
            Err(RecvTimeoutError::Timeout) => self.pipeline.process_due(Instant::now()),
            Err(RecvTimeoutError::Disconnected) => {
                debug!("stdin reader channel closed");
                return Ok(Pump::Closed);
            }
        };

        Ok(match self.deliver(&keys) {
            0 => Pump::Idle,
            n => Pump::Delivered(n),
        })
    }

    /// Push `bytes` through the pipeline as if read at `now` and deliver
    /// the result. Returns the number of keys delivered.
    pub fn feed(&mut self, bytes: &[u8], now: Instant) -> usize {
        let keys = self.pipeline.process(bytes, now);
        self.deliver(&keys)
    }

    /// Fire pipeline deadlines up to `now` and deliver the result.
    pub fn tick(&mut self, now: Instant) -> usize {
        let keys = self.pipeline.process_due(now);
        self.deliver(&keys)
    }

    /// The earliest instant at which [`tick`](Self::tick) would do work.
    #[must_use]
    pub fn next_deadline(&self) -> Option<Instant> {
        self.pipeline.next_deadline()
    }

    fn deliver(&mut self, keys: &[Key]) -> usize {
        for key in keys {
            self.subscribers.broadcast(key);
        }
        keys.len()
    }
}

impl Default for KeypressContext {
    fn default() -> Self {
        Self::new(KeypressConfig::default())
    }
}

impl Drop for KeypressContext {
    fn drop(&mut self) {
        if self.session.is_some() {
            if let Err(err) = self.unmount() {
                warn!(%err, "unmount on drop failed");
            }
        }
    }
}
