// SPDX-License-Identifier: MIT
//
// Subscriber registry.
//
// Every key that survives the pipeline is handed to each registered
// handler, in no particular order. Handlers are identified by the id
// returned from `subscribe`, so the same closure type can be registered
// more than once and removed individually.

use std::collections::HashMap;
use std::fmt;

use crate::key::Key;

/// Opaque handle for a registered handler.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct SubscriptionId(u64);

type Handler = Box<dyn FnMut(&Key)>;

#[derive(Default)]
pub struct Broadcaster {
    handlers: HashMap<SubscriptionId, Handler>,
    next_id: u64,
}

impl Broadcaster {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Register `handler`; it sees every key broadcast from now on.
    pub fn subscribe<F>(&mut self, handler: F) -> SubscriptionId
    where
        F: FnMut(&Key) + 'static,
    {
        let id = SubscriptionId(self.next_id);
        self.next_id += 1;
        self.handlers.insert(id, Box::new(handler));
        id
    }

    /// Remove a handler. Returns `false` if `id` was not registered.
    pub fn unsubscribe(&mut self, id: SubscriptionId) -> bool {
        self.handlers.remove(&id).is_some()
    }

    /// Deliver `key` to every handler.
    pub fn broadcast(&mut self, key: &Key) {
        for handler in self.handlers.values_mut() {
            handler(key);
        }
    }

    #[inline]
    #[must_use]
    pub fn len(&self) -> usize {
        self.handlers.len()
    }

    #[inline]
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.handlers.is_empty()
    }
}

impl fmt::Debug for Broadcaster {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Broadcaster")
            .field("subscribers", &self.handlers.len())
            .finish_non_exhaustive()
    }
}
