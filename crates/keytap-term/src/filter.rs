// SPDX-License-Identifier: MIT
//
// Non-keyboard filter, the last stage before subscribers.
//
// Mouse and focus reports are real input on the wire but not keypresses.
// The emitter consumes them whole; here they are recognized by their raw
// sequence and dropped.

use tracing::debug;

use crate::key::{printable, Key};
use crate::mouse::is_mouse_event;

/// Focus reporting: terminal gained focus.
pub const FOCUS_IN: &str = "\x1b[I";
/// Focus reporting: terminal lost focus.
pub const FOCUS_OUT: &str = "\x1b[O";

/// Whether `key` came from a mouse or focus report rather than a keyboard.
#[must_use]
pub fn is_non_keyboard(key: &Key) -> bool {
    key.sequence == FOCUS_IN
        || key.sequence == FOCUS_OUT
        || is_mouse_event(&key.sequence)
}

/// Pass keyboard keys through, drop everything else.
#[must_use]
pub fn keyboard_only(key: Key) -> Option<Key> {
    if is_non_keyboard(&key) {
        debug!(sequence = %printable(&key.sequence), "dropped non-keyboard event");
        None
    } else {
        Some(key)
    }
}
