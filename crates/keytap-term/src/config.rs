// SPDX-License-Identifier: MIT
//
// Timing and feature configuration for the keypress pipeline.
//
// The defaults are the production constants. They are plain fields so
// embedders and tests can shrink or stretch the windows, but nothing
// reads them from the environment.

use std::time::Duration;

/// How long to wait after the last chunk before flushing an incomplete
/// escape sequence. A lone ESC keypress is resolved after this delay.
pub const ESC_TIMEOUT: Duration = Duration::from_millis(50);

/// How long a lone `\` waits for a following Enter before it is
/// delivered on its own.
pub const BACKSLASH_ENTER_TIMEOUT: Duration = Duration::from_millis(5);

/// Idle time after which an unterminated bracketed paste is delivered
/// with whatever was collected.
pub const PASTE_TIMEOUT: Duration = Duration::from_secs(30);

/// How often the stdin reader thread wakes to check its stop flag.
pub const READER_POLL_INTERVAL: Duration = Duration::from_millis(50);

/// Configuration for a [`KeypressPipeline`](crate::KeypressPipeline) and
/// the [`KeypressContext`](crate::KeypressContext) that owns it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct KeypressConfig {
    /// Silence window before an incomplete escape sequence is flushed.
    pub escape_timeout: Duration,
    /// Window in which `\` followed by Enter becomes Shift+Enter.
    pub backslash_enter_timeout: Duration,
    /// Idle window that ends an unterminated paste.
    pub paste_idle_timeout: Duration,
    /// Map macOS Option-key glyphs (`∫`, `ƒ`, ...) back to Alt+letter.
    ///
    /// Defaults to `true` only when compiled for macOS.
    pub mac_alt_glyphs: bool,
    /// Ask the terminal to frame pastes with `CSI 200~` / `CSI 201~`
    /// while mounted.
    pub bracketed_paste: bool,
    /// Stop-flag polling interval of the background reader.
    pub reader_poll_interval: Duration,
}

impl Default for KeypressConfig {
    fn default() -> Self {
        Self {
            escape_timeout: ESC_TIMEOUT,
            backslash_enter_timeout: BACKSLASH_ENTER_TIMEOUT,
            paste_idle_timeout: PASTE_TIMEOUT,
            mac_alt_glyphs: cfg!(target_os = "macos"),
            bracketed_paste: true,
            reader_poll_interval: READER_POLL_INTERVAL,
        }
    }
}
