// SPDX-License-Identifier: MIT
#![allow(unsafe_code)]
//
// Background stdin reader.
//
// `read()` on stdin blocks, and the owner of the pipeline has deadlines
// to keep. A dedicated thread therefore reads raw chunks and sends them
// over a channel, and the owner waits with `recv_timeout()`.
//
// Shutdown: the thread `poll()`s stdin with a short timeout and checks an
// `AtomicBool` stop flag between polls, so it never sits in a blocking
// `read()` when asked to exit. It also exits on EOF, on a read error, or
// when the receiver is dropped. In every case the channel closes.

#[cfg(unix)]
use std::io;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::mpsc::{self, Receiver, Sender};
use std::thread::{self, JoinHandle};
use std::time::Duration;

use tracing::debug;

use crate::error::{Error, Result};

/// A keypress is a few bytes, a paste can be kilobytes.
const READ_BUF_SIZE: usize = 4096;

/// Background stdin reader thread. Stops when dropped.
#[derive(Debug)]
pub struct StdinReader {
    handle: Option<JoinHandle<()>>,
    stop: Arc<AtomicBool>,
}

impl StdinReader {
    /// Spawn the reader. Returns the handle and the receiving end of the
    /// chunk channel. Every chunk is non-empty.
    ///
    /// # Errors
    ///
    /// Returns [`Error::ReaderSpawn`] if the OS cannot create the thread.
    pub fn spawn(poll_interval: Duration) -> Result<(Self, Receiver<Vec<u8>>)> {
        let (tx, rx) = mpsc::channel();
        let stop = Arc::new(AtomicBool::new(false));
        let stop_flag = Arc::clone(&stop);

        let handle = thread::Builder::new()
            .name("keytap-stdin".into())
            .spawn(move || {
                debug!("stdin reader started");
                let reason = reader_loop(&tx, &stop_flag, poll_interval);
                debug!(reason, "stdin reader exited");
            })
            .map_err(Error::ReaderSpawn)?;

        Ok((
            Self {
                handle: Some(handle),
                stop,
            },
            rx,
        ))
    }

    /// Whether the thread is still running.
    #[must_use]
    pub fn is_running(&self) -> bool {
        self.handle.as_ref().is_some_and(|h| !h.is_finished())
    }

    /// Signal the thread to stop and join it. Idempotent.
    pub fn stop(&mut self) {
        self.stop.store(true, Ordering::Relaxed);
        if let Some(handle) = self.handle.take() {
            let _ = handle.join();
        }
    }
}

impl Drop for StdinReader {
    fn drop(&mut self) {
        self.stop();
    }
}

#[cfg(unix)]
fn reader_loop(tx: &Sender<Vec<u8>>, stop: &AtomicBool, poll_interval: Duration) -> &'static str {
    use std::os::unix::io::AsRawFd;

    let stdin_fd = io::stdin().as_raw_fd();
    let timeout_ms = i32::try_from(poll_interval.as_millis()).unwrap_or(i32::MAX);
    let mut buf = [0u8; READ_BUF_SIZE];

    loop {
        if stop.load(Ordering::Relaxed) {
            return "stopped";
        }

        let ready = unsafe {
            let mut pfd = libc::pollfd {
                fd: stdin_fd,
                events: libc::POLLIN,
                revents: 0,
            };
            libc::poll(&raw mut pfd, 1, timeout_ms)
        };
        if ready <= 0 {
            continue;
        }

        let n = unsafe { libc::read(stdin_fd, buf.as_mut_ptr().cast(), buf.len()) };
        if n == 0 {
            return "eof";
        }
        if n < 0 {
            return "read error";
        }

        #[allow(clippy::cast_sign_loss)] // n > 0 checked above.
        let chunk = buf[..n as usize].to_vec();
        if tx.send(chunk).is_err() {
            return "receiver dropped";
        }
    }
}

/// Blocking fallback: the stop flag is only seen between reads.
#[cfg(not(unix))]
fn reader_loop(tx: &Sender<Vec<u8>>, stop: &AtomicBool, _poll_interval: Duration) -> &'static str {
    use std::io::Read;

    let stdin = std::io::stdin();
    let mut buf = [0u8; READ_BUF_SIZE];

    loop {
        if stop.load(Ordering::Relaxed) {
            return "stopped";
        }
        match stdin.lock().read(&mut buf) {
            Ok(0) => return "eof",
            Ok(n) => {
                if tx.send(buf[..n].to_vec()).is_err() {
                    return "receiver dropped";
                }
            }
            Err(_) => return "read error",
        }
    }
}
