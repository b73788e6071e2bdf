#![allow(missing_docs)]
#![allow(clippy::missing_errors_doc)]
#![allow(clippy::missing_panics_doc)]
#![allow(clippy::module_name_repetitions)]

//! Skirmish ECS - entity/component core with deferred structural mutation
//!
//! Entities hold at most one component per kind; systems declare the kinds
//! they track and receive register/unregister callbacks as components enter
//! and leave the live world.
//!
//! # Key Concepts
//!
//! - **Entity**: An identity plus its attached components
//! - **Component**: A plain data record, one kind per concrete Rust type
//! - **Directory**: Pluggable registry of the live entities
//! - **System**: Per-step behavior over the component kinds it declared
//! - **World**: Composition root; `add`/`remove` stage changes, `process`
//!   commits them in FIFO order, `update` drives the systems
//!
//! # Lifecycle
//!
//! ```ignore
//! let mut world = World::new();
//! world.add_system(HealthSystem::new(mediator, events));
//! world.initialize();
//!
//! world.add(soldier)?;     // staged, not yet visible
//! world.process();         // committed: directory + system registration
//! world.update(elapsed);   // systems run over the stable live set
//! ```

mod component;
mod directory;
mod entity;
mod system;
mod world;

pub use component::{Component, ComponentKind, ComponentRef, Handle};
pub use directory::{EntityDirectory, IdentityDirectory};
pub use entity::{Entity, EntityId};
pub use system::{System, SystemId, SystemManager};
pub use world::{Commit, RejectedAdd, Residency, World, WorldError};

/// Prelude for convenient imports
pub mod prelude {
    pub use crate::{
        Component, ComponentKind, ComponentRef, Entity, EntityDirectory, EntityId, Handle, System,
        World,
    };
}
