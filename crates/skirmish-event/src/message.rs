//! Messages: an event kind plus an opaque shared payload.

use std::any::Any;
use std::fmt;
use std::sync::Arc;

use crate::event::EventKind;

/// One queued notification: the channel it travels on and its payload.
///
/// The payload is type-erased; listeners downcast with
/// [`payload`](Self::payload) to the type they expect for that channel.
#[derive(Clone)]
pub struct Message {
    kind: EventKind,
    payload: Arc<dyn Any + Send + Sync>,
}

impl Message {
    /// Build a message carrying `payload` on the given channel.
    #[must_use]
    pub fn new<P: Any + Send + Sync>(kind: EventKind, payload: P) -> Self {
        Self {
            kind,
            payload: Arc::new(payload),
        }
    }

    /// The channel this message travels on.
    #[must_use]
    pub fn kind(&self) -> &EventKind {
        &self.kind
    }

    /// Downcast the payload to `P`, or `None` on a type mismatch.
    #[must_use]
    pub fn payload<P: Any + Send + Sync>(&self) -> Option<&P> {
        self.payload.downcast_ref()
    }
}

impl fmt::Debug for Message {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Message")
            .field("kind", &self.kind)
            .finish_non_exhaustive()
    }
}
