// SPDX-License-Identifier: MIT
//
// Crate error type.
//
// Only the terminal lifecycle can fail. Decoding never does: malformed
// input degrades to an `undefined` key instead of an error.

use std::io;

/// Errors raised while mounting, pumping, or unmounting a keypress context.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// A termios call or a terminal write failed.
    #[error("terminal i/o failed: {0}")]
    Io(#[from] io::Error),

    /// The OS refused to spawn the stdin reader thread.
    #[error("failed to spawn stdin reader thread: {0}")]
    ReaderSpawn(#[source] io::Error),

    /// `mount` was called on a context that is already mounted.
    #[error("keypress context is already mounted")]
    AlreadyMounted,

    /// A terminal operation needs a mounted context.
    #[error("keypress context is not mounted")]
    NotMounted,
}

/// Shorthand for results carrying [`Error`].
pub type Result<T> = std::result::Result<T, Error>;
