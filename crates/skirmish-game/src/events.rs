//! Event channels and payloads shared by the gameplay systems.
//!
//! The channels are identity tokens; every participant of one scene must be
//! handed a clone of the same [`GameEvents`] bundle. Two scenes minting
//! their own bundles never hear each other.

use skirmish_ecs::EntityId;
use skirmish_event::EventKind;

/// The three channels of the gameplay vocabulary.
#[derive(Debug, Clone)]
pub struct GameEvents {
    /// Something deals damage to an entity. Payload: [`DamageInfo`].
    pub damage: EventKind,
    /// An entity's life reached zero. Payload: [`DeathInfo`].
    pub death: EventKind,
    /// A line of text for whatever output the scene has. Payload:
    /// [`MessageInfo`].
    pub show_message: EventKind,
}

impl GameEvents {
    /// Mint a fresh bundle of channels.
    #[must_use]
    pub fn new() -> Self {
        Self {
            damage: EventKind::new("damage"),
            death: EventKind::new("death"),
            show_message: EventKind::new("show-message"),
        }
    }
}

impl Default for GameEvents {
    fn default() -> Self {
        Self::new()
    }
}

/// Payload of the damage channel.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DamageInfo {
    /// Entity taking the damage.
    pub target: EntityId,
    /// Amount before any shield absorption.
    pub amount: i32,
}

/// Payload of the death channel.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DeathInfo {
    /// Entity whose life reached zero.
    pub target: EntityId,
}

/// Payload of the show-message channel.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MessageInfo {
    /// Already formatted line of text.
    pub text: String,
}

impl MessageInfo {
    #[must_use]
    pub fn new(text: impl Into<String>) -> Self {
        Self { text: text.into() }
    }
}
