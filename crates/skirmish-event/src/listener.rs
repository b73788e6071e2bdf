//! Listeners and their failure modes.

use std::sync::Arc;

use parking_lot::Mutex;
use thiserror::Error;

use crate::message::Message;

/// Errors a listener can report back to the dispatcher.
///
/// A failing listener never stops dispatch: the mediator logs the error and
/// carries on with the remaining listeners for the same message.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum EventError {
    /// The payload did not downcast to the type expected for the channel.
    #[error("unexpected payload on channel `{0}`")]
    BadPayload(String),

    /// The listener's own handling logic failed.
    #[error("listener failed: {0}")]
    Handler(String),
}

/// A consumer of messages on channels it registered for.
pub trait Listener: Send {
    /// Handle one dispatched message.
    fn handle_message(&mut self, message: &Message) -> Result<(), EventError>;
}

impl<F> Listener for F
where
    F: FnMut(&Message) -> Result<(), EventError> + Send,
{
    fn handle_message(&mut self, message: &Message) -> Result<(), EventError> {
        self(message)
    }
}

/// Shared, lockable listener as stored by the mediator.
///
/// Listeners are behind a mutex of their own so dispatch can run without
/// holding any mediator-wide lock.
pub type SharedListener = Arc<Mutex<dyn Listener>>;

/// Wrap a listener for registration.
pub fn shared<L: Listener + 'static>(listener: L) -> SharedListener {
    Arc::new(Mutex::new(listener))
}
