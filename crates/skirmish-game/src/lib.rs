#![allow(missing_docs)]
#![allow(clippy::missing_errors_doc)]
#![allow(clippy::module_name_repetitions)]

//! Skirmish gameplay: health, shields, poison, and the battlefield scene.
//!
//! The systems never call each other. Poison queues damage messages, the
//! health system consumes them and queues death messages, and the scene
//! reaps the dead back into its pool. The only shared vocabulary is the
//! [`GameEvents`] channel bundle.

mod battlefield;
mod components;
mod directory;
mod events;
mod health;
mod poison;

pub use battlefield::{Action, Battlefield};
pub use components::{HealthComponent, PoisonComponent, ShieldComponent};
pub use directory::ParityDirectory;
pub use events::{DamageInfo, DeathInfo, GameEvents, MessageInfo};
pub use health::HealthSystem;
pub use poison::PoisonSystem;

/// Prelude for convenient imports
pub mod prelude {
    pub use crate::{
        Action, Battlefield, DamageInfo, DeathInfo, GameEvents, HealthComponent, HealthSystem,
        MessageInfo, PoisonComponent, PoisonSystem, ShieldComponent,
    };
}
