//! Systems and the ordered system manager.
//!
//! A system declares the component kinds it cares about once, then receives
//! `register`/`unregister` callbacks as matching components enter and leave
//! the live world. Routing from kind to interested systems is an explicit
//! table built when systems are added, not per-call type inspection.

use std::fmt;
use std::time::Duration;

use hashbrown::HashMap;
use smallvec::SmallVec;
use tracing::trace;

use crate::component::{ComponentKind, ComponentRef};

/// A unit of per-frame behavior over one or more component kinds.
///
/// `register`/`unregister` may be called outside of `update` — a component
/// mutation on a live entity routes here synchronously — so implementations
/// must keep their internal indices consistent regardless of call timing.
pub trait System: Send {
    /// Name for diagnostics.
    fn name(&self) -> &str {
        std::any::type_name::<Self>()
    }

    /// The component kinds this system is interested in. Immutable for the
    /// system's lifetime.
    fn kinds(&self) -> &[ComponentKind];

    /// Called once, after all startup systems are added and before the
    /// first `update`. A chance to subscribe to the mediator or seed state.
    fn initialize(&mut self) {}

    /// Advance the system by the elapsed time of this step.
    fn update(&mut self, elapsed: Duration);

    /// A component of an interesting kind entered the live world.
    fn register(&mut self, component: &ComponentRef);

    /// A component of an interesting kind left the live world.
    ///
    /// Returns whether the component was actually tracked.
    fn unregister(&mut self, component: &ComponentRef) -> bool;
}

/// Identifier of a system within a manager, assigned on add.
#[derive(Clone, Copy, PartialEq, Eq, Hash, Debug)]
pub struct SystemId(u64);

struct Slot {
    id: SystemId,
    system: Box<dyn System>,
}

/// Ordered collection of systems with a kind → systems routing table.
#[derive(Default)]
pub struct SystemManager {
    slots: Vec<Slot>,
    routes: HashMap<ComponentKind, SmallVec<[usize; 4]>>,
    next_id: u64,
    initialized: bool,
}

impl SystemManager {
    /// Create an empty manager.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a system at the end of the update order.
    ///
    /// If the manager is already initialized, the system is initialized
    /// immediately.
    pub fn add<S: System + 'static>(&mut self, system: S) -> SystemId {
        let id = SystemId(self.next_id);
        self.next_id += 1;

        let mut system = Box::new(system);
        if self.initialized {
            system.initialize();
        }

        let index = self.slots.len();
        for &kind in system.kinds() {
            self.routes.entry(kind).or_default().push(index);
        }
        self.slots.push(Slot { id, system });

        id
    }

    /// Remove a system, rebuilding the routing table.
    pub fn remove(&mut self, id: SystemId) -> Option<Box<dyn System>> {
        let index = self.slots.iter().position(|slot| slot.id == id)?;
        let slot = self.slots.remove(index);
        self.rebuild_routes();
        Some(slot.system)
    }

    /// Initialize every system, once. Subsequent calls are no-ops.
    pub fn initialize(&mut self) {
        if self.initialized {
            return;
        }
        self.initialized = true;
        for slot in &mut self.slots {
            slot.system.initialize();
        }
    }

    /// Update every system in add order with the same elapsed value.
    pub fn update(&mut self, elapsed: Duration) {
        for slot in &mut self.slots {
            slot.system.update(elapsed);
        }
    }

    /// Route a component entering the live world to every interested system.
    pub fn register_component(&mut self, component: &ComponentRef) {
        let Some(indices) = self.routes.get(&component.kind()) else {
            return;
        };
        for &index in indices {
            let slot = &mut self.slots[index];
            trace!(
                system = slot.system.name(),
                kind = component.kind().name(),
                owner = %component.owner(),
                "register"
            );
            slot.system.register(component);
        }
    }

    /// Route a component leaving the live world to every interested system.
    ///
    /// Returns whether any system reported the component as tracked.
    pub fn unregister_component(&mut self, component: &ComponentRef) -> bool {
        let Some(indices) = self.routes.get(&component.kind()) else {
            return false;
        };
        let mut tracked = false;
        for &index in indices {
            tracked |= self.slots[index].system.unregister(component);
        }
        tracked
    }

    /// Number of systems.
    #[must_use]
    pub fn len(&self) -> usize {
        self.slots.len()
    }

    /// Check whether the manager holds no systems.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.slots.is_empty()
    }

    fn rebuild_routes(&mut self) {
        self.routes.clear();
        for (index, slot) in self.slots.iter().enumerate() {
            for &kind in slot.system.kinds() {
                self.routes.entry(kind).or_default().push(index);
            }
        }
    }
}

impl fmt::Debug for SystemManager {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SystemManager")
            .field("systems", &self.slots.len())
            .field("routed_kinds", &self.routes.len())
            .finish()
    }
}
