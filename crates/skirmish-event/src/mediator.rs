//! The mediator: a FIFO message queue with per-channel listener lists.
//!
//! Producers and consumers only share event-kind tokens and the mediator
//! handle itself; neither side knows the other exists. Delivery is
//! deferred: `queue` never dispatches, `tick` drains up to a budget.

use std::collections::VecDeque;
use std::fmt;
use std::sync::Arc;

use hashbrown::HashMap;
use parking_lot::RwLock;
use tracing::{trace, warn};

use crate::event::EventKind;
use crate::listener::{Listener, SharedListener, shared};
use crate::message::Message;

#[derive(Default)]
struct MediatorInner {
    queue: VecDeque<Message>,
    listeners: HashMap<EventKind, Vec<SharedListener>>,
}

/// Cloneable handle to one shared message bus.
///
/// Clones refer to the same queue and listener table, so a handle can be
/// given to every producer and consumer of a scene.
#[derive(Clone, Default)]
pub struct Mediator {
    inner: Arc<RwLock<MediatorInner>>,
}

impl Mediator {
    /// Create an empty mediator.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a listener for one channel, at the end of that channel's
    /// dispatch order. The same listener may be registered on several
    /// channels.
    pub fn register(&self, kind: EventKind, listener: SharedListener) {
        let mut inner = self.inner.write();
        inner.listeners.entry(kind).or_default().push(listener);
    }

    /// Convenience: wrap a closure or value and register it in one call.
    pub fn observe<L: Listener + 'static>(&self, kind: EventKind, listener: L) -> SharedListener {
        let listener = shared(listener);
        self.register(kind, listener.clone());
        listener
    }

    /// Append a message to the queue. Never dispatches; listeners see the
    /// message on a later [`tick`](Self::tick).
    ///
    /// Safe to call from inside a listener: the queue lock is not held
    /// during dispatch.
    pub fn queue(&self, message: Message) {
        trace!(kind = message.kind().label(), "queued");
        self.inner.write().queue.push_back(message);
    }

    /// Dispatch up to `budget` messages in FIFO order and return how many
    /// were dispatched.
    ///
    /// Messages queued by listeners during this very call are eligible in
    /// the same call, counted against the same budget. A message with no
    /// listeners still consumes budget. Listener failures are logged and
    /// never stop dispatch.
    pub fn tick(&self, budget: usize) -> usize {
        let mut dispatched = 0;

        while dispatched < budget {
            // Pop and snapshot under one short lock, then dispatch without
            // it so listeners can queue or register re-entrantly.
            let (message, listeners) = {
                let mut inner = self.inner.write();
                let Some(message) = inner.queue.pop_front() else {
                    break;
                };
                let listeners = inner
                    .listeners
                    .get(message.kind())
                    .cloned()
                    .unwrap_or_default();
                (message, listeners)
            };
            dispatched += 1;

            for listener in &listeners {
                if let Err(error) = listener.lock().handle_message(&message) {
                    warn!(
                        kind = message.kind().label(),
                        %error,
                        "listener failed, continuing dispatch"
                    );
                }
            }
        }

        dispatched
    }

    /// Number of messages waiting in the queue.
    #[must_use]
    pub fn len(&self) -> usize {
        self.inner.read().queue.len()
    }

    /// Check whether the queue is empty.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.inner.read().queue.is_empty()
    }

    /// Number of listeners registered for a channel.
    #[must_use]
    pub fn listener_count(&self, kind: &EventKind) -> usize {
        self.inner
            .read()
            .listeners
            .get(kind)
            .map_or(0, Vec::len)
    }
}

impl fmt::Debug for Mediator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let inner = self.inner.read();
        f.debug_struct("Mediator")
            .field("queued", &inner.queue.len())
            .field("channels", &inner.listeners.len())
            .finish()
    }
}
