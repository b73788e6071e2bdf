#![allow(missing_docs)]
#![allow(clippy::missing_errors_doc)]
#![allow(clippy::module_name_repetitions)]

//! Skirmish Event System
//!
//! A mediator message bus that decouples producers from consumers.
//!
//! # Core Concept: Channels as Tokens
//!
//! A channel is an [`EventKind`] token minted by [`EventKind::new`]. Only
//! code holding a clone of the token can queue to or listen on the channel;
//! there is no global registry and labels are diagnostics only.
//!
//! # Delivery
//!
//! - `queue` appends and returns; nothing runs inline
//! - `tick(budget)` drains FIFO, up to `budget` messages
//! - messages queued by listeners mid-tick join the same drain
//! - a failing listener is logged and skipped, never fatal
//!
//! # Example
//!
//! ```ignore
//! let mediator = Mediator::new();
//! let damage = EventKind::new("damage");
//!
//! mediator.observe(damage.clone(), |message: &Message| {
//!     let info: &DamageInfo = message.payload().ok_or_else(|| {
//!         EventError::BadPayload(message.kind().label().into())
//!     })?;
//!     apply(info);
//!     Ok(())
//! });
//!
//! mediator.queue(Message::new(damage, DamageInfo { target, amount: 10 }));
//! mediator.tick(usize::MAX);
//! ```

mod event;
mod listener;
mod mediator;
mod message;

pub use event::EventKind;
pub use listener::{EventError, Listener, SharedListener, shared};
pub use mediator::Mediator;
pub use message::Message;

/// Prelude for convenient imports
pub mod prelude {
    pub use crate::{EventError, EventKind, Listener, Mediator, Message};
}
