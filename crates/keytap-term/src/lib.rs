// SPDX-License-Identifier: MIT
//
// keytap-term: raw terminal keypress decoding.
//
// Turns the bytes a terminal writes to stdin into a stream of structured
// key events. Terminals send escape sequences as unframed bursts, so the
// decoder is a chain of small state machines:
//
//   stdin bytes → driver (UTF-8 + flush timer) → emitter (escape grammar)
//     → paste buffer → backslash+Enter buffer → non-keyboard filter
//     → broadcaster → subscribers
//
// Every stage is synchronous and single-threaded. Timers are deadlines
// (`Instant`s) that the owner fires through `KeypressPipeline::process_due`,
// which keeps the whole chain deterministic under test.
//
// The terminal plumbing (`terminal`, `reader`, `context`) is thin: raw
// mode on mount, a background reader thread, restore on unmount.

pub mod backslash;
pub mod broadcast;
pub mod classify;
pub mod config;
pub mod context;
pub mod driver;
pub mod emitter;
pub mod error;
pub mod filter;
pub mod key;
pub mod keycodes;
pub mod mouse;
pub mod paste;
pub mod pipeline;
pub mod reader;
pub mod terminal;

pub use broadcast::{Broadcaster, SubscriptionId};
pub use config::KeypressConfig;
pub use context::{KeypressContext, Pump};
pub use error::{Error, Result};
pub use key::Key;
pub use pipeline::KeypressPipeline;
