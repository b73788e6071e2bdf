//! The world: composition root for entities, systems, and the deferred
//! structural-change queue.
//!
//! `add`/`remove` only stage changes; `process` commits them in FIFO order
//! in one confined step. Iteration (system updates, message dispatch) always
//! runs over a stable snapshot of the live set, which is the sole mechanism
//! preventing iterator invalidation and double-registration.

use std::collections::VecDeque;
use std::fmt;
use std::time::Duration;

use rustc_hash::FxHashSet;
use thiserror::Error;
use tracing::debug;

use crate::component::{Component, ComponentKind, ComponentRef, Handle};
use crate::directory::{EntityDirectory, IdentityDirectory};
use crate::entity::{Entity, EntityId};
use crate::system::{System, SystemId, SystemManager};

/// Protocol errors for structural world operations.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum WorldError {
    /// The identity is already live (or staged for removal, which keeps it
    /// resident until the next commit).
    #[error("entity {0} is already live in this world")]
    AlreadyLive(EntityId),

    /// The identity is already staged for addition.
    #[error("entity {0} is already pending add")]
    AlreadyPendingAdd(EntityId),

    /// The identity is already staged for removal.
    #[error("entity {0} is already pending remove")]
    AlreadyPendingRemove(EntityId),

    /// The identity is not live in this world.
    #[error("entity {0} is not live in this world")]
    NotLive(EntityId),

    /// Two staged additions carried the same identity.
    #[error("duplicate identity {0} in one commit")]
    DuplicateIdentity(EntityId),

    /// The directory cannot be swapped once the world holds entities or
    /// staged changes.
    #[error("directory can only be replaced before the world is populated")]
    DirectoryInUse,
}

/// A staged `add` that was refused; hands the entity back to the caller.
#[derive(Debug, Error)]
#[error("{reason}")]
pub struct RejectedAdd {
    /// Why the addition was refused.
    pub reason: WorldError,
    /// The entity, returned untouched.
    pub entity: Entity,
}

/// Residency of an identity relative to one world.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Residency {
    /// Not known to this world.
    Unregistered,
    /// Staged for addition; invisible to the directory until commit.
    PendingAdd,
    /// Committed; visible to the directory and registered with systems.
    Live,
    /// Staged for removal; still resident until commit.
    PendingRemove,
}

/// Outcome of one `process` call.
#[derive(Default)]
pub struct Commit {
    /// Identities that became live.
    pub added: Vec<EntityId>,
    /// Entities handed back to the caller: committed removals, plus any
    /// addition rejected at commit time.
    pub removed: Vec<Entity>,
    /// Structural changes found invalid at commit time. These never corrupt
    /// the directory or system registration state.
    pub rejected: Vec<WorldError>,
}

impl Commit {
    /// Check whether the commit changed nothing and rejected nothing.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.added.is_empty() && self.removed.is_empty() && self.rejected.is_empty()
    }
}

impl fmt::Debug for Commit {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Commit")
            .field("added", &self.added)
            .field("removed", &self.removed.len())
            .field("rejected", &self.rejected)
            .finish()
    }
}

enum Pending {
    Add(Entity),
    Remove(EntityId),
}

/// Composition root owning the entity directory, the system manager, and
/// the pending structural-change queue.
pub struct World {
    directory: Box<dyn EntityDirectory>,
    systems: SystemManager,
    pending: VecDeque<Pending>,
    pending_adds: FxHashSet<EntityId>,
    pending_removes: FxHashSet<EntityId>,
}

impl Default for World {
    fn default() -> Self {
        Self::new()
    }
}

impl World {
    /// Create a world with the default identity-indexed directory.
    #[must_use]
    pub fn new() -> Self {
        Self::with_directory(IdentityDirectory::new())
    }

    /// Create a world with a caller-supplied directory.
    #[must_use]
    pub fn with_directory<D: EntityDirectory + 'static>(directory: D) -> Self {
        Self {
            directory: Box::new(directory),
            systems: SystemManager::new(),
            pending: VecDeque::new(),
            pending_adds: FxHashSet::default(),
            pending_removes: FxHashSet::default(),
        }
    }

    /// Replace the directory. Only allowed before the world holds any
    /// entity or staged change.
    pub fn set_directory<D: EntityDirectory + 'static>(
        &mut self,
        directory: D,
    ) -> Result<(), WorldError> {
        if !self.directory.is_empty() || !self.pending.is_empty() {
            return Err(WorldError::DirectoryInUse);
        }
        self.directory = Box::new(directory);
        Ok(())
    }

    // ==================== Structural changes ====================

    /// Stage an entity for addition. The directory and systems are not
    /// touched until the next [`process`](Self::process).
    ///
    /// Re-adding a resident or already-pending identity is a reported
    /// error; the entity is handed back untouched.
    pub fn add(&mut self, entity: Entity) -> Result<(), RejectedAdd> {
        let id = entity.id();
        if self.directory.contains(id) {
            return Err(RejectedAdd {
                reason: WorldError::AlreadyLive(id),
                entity,
            });
        }
        if !self.pending_adds.insert(id) {
            return Err(RejectedAdd {
                reason: WorldError::AlreadyPendingAdd(id),
                entity,
            });
        }
        self.pending.push_back(Pending::Add(entity));
        Ok(())
    }

    /// Stage a live entity for removal, committed by the next
    /// [`process`](Self::process).
    ///
    /// Only live entities can be staged: removing an unknown or merely
    /// pending-add identity is a reported error.
    pub fn remove(&mut self, id: EntityId) -> Result<(), WorldError> {
        if self.pending_removes.contains(&id) {
            return Err(WorldError::AlreadyPendingRemove(id));
        }
        if !self.directory.contains(id) {
            return Err(WorldError::NotLive(id));
        }
        self.pending_removes.insert(id);
        self.pending.push_back(Pending::Remove(id));
        Ok(())
    }

    /// Commit every staged change in FIFO order.
    ///
    /// Additions insert into the directory first, then register each
    /// attached component with interested systems; removals unregister
    /// first, then extract from the directory, handing the entity back via
    /// the returned [`Commit`]. Idempotent when the queue is empty.
    pub fn process(&mut self) -> Commit {
        let mut commit = Commit::default();

        while let Some(change) = self.pending.pop_front() {
            match change {
                Pending::Add(entity) => {
                    let id = entity.id();
                    self.pending_adds.remove(&id);
                    if self.directory.contains(id) {
                        commit.rejected.push(WorldError::DuplicateIdentity(id));
                        commit.removed.push(entity);
                        continue;
                    }

                    let components: Vec<ComponentRef> = entity.components().cloned().collect();
                    self.directory.added(entity);
                    for component in &components {
                        self.systems.register_component(component);
                    }
                    debug!(entity = %id, components = components.len(), "committed add");
                    commit.added.push(id);
                }
                Pending::Remove(id) => {
                    self.pending_removes.remove(&id);
                    let components: Option<Vec<ComponentRef>> = self
                        .directory
                        .get(id)
                        .map(|entity| entity.components().cloned().collect());
                    let Some(components) = components else {
                        commit.rejected.push(WorldError::NotLive(id));
                        continue;
                    };

                    for component in &components {
                        self.systems.unregister_component(component);
                    }
                    if let Some(entity) = self.directory.removed(id) {
                        debug!(entity = %id, "committed remove");
                        commit.removed.push(entity);
                    }
                }
            }
        }

        commit
    }

    /// Update every system with the elapsed time of this step.
    pub fn update(&mut self, elapsed: Duration) {
        self.systems.update(elapsed);
    }

    // ==================== Live component mutation ====================

    /// Attach a component to a live entity.
    ///
    /// Interested systems see the change synchronously, in the same
    /// logical step: a displaced component of the same kind is
    /// unregistered, then the new one is registered.
    pub fn attach<C: Component>(&mut self, id: EntityId, component: C) -> Result<(), WorldError> {
        let entity = self.directory.get_mut(id).ok_or(WorldError::NotLive(id))?;
        let kind = ComponentKind::of::<C>();
        let displaced = entity.attach(component);
        let attached = entity.component(kind).cloned();

        if let Some(old) = displaced {
            self.systems.unregister_component(&old);
        }
        if let Some(new) = attached {
            self.systems.register_component(&new);
        }
        Ok(())
    }

    /// Detach a component from a live entity, unregistering it from
    /// interested systems synchronously.
    pub fn detach(
        &mut self,
        id: EntityId,
        kind: ComponentKind,
    ) -> Result<Option<ComponentRef>, WorldError> {
        let entity = self.directory.get_mut(id).ok_or(WorldError::NotLive(id))?;
        let detached = entity.detach(kind);
        if let Some(component) = &detached {
            self.systems.unregister_component(component);
        }
        Ok(detached)
    }

    // ==================== Lookup ====================

    /// Look up a live entity.
    #[must_use]
    pub fn entity(&self, id: EntityId) -> Option<&Entity> {
        self.directory.get(id)
    }

    /// Get a typed handle to a live entity's component of kind `C`.
    #[must_use]
    pub fn component<C: Component>(&self, id: EntityId) -> Option<Handle<C>> {
        self.directory.get(id).and_then(Entity::get)
    }

    /// Residency of an identity relative to this world.
    #[must_use]
    pub fn residency(&self, id: EntityId) -> Residency {
        if self.pending_removes.contains(&id) {
            Residency::PendingRemove
        } else if self.directory.contains(id) {
            Residency::Live
        } else if self.pending_adds.contains(&id) {
            Residency::PendingAdd
        } else {
            Residency::Unregistered
        }
    }

    /// Number of live entities.
    #[must_use]
    pub fn entity_count(&self) -> usize {
        self.directory.len()
    }

    // ==================== Systems ====================

    /// Add a system at the end of the update order.
    pub fn add_system<S: System + 'static>(&mut self, system: S) -> SystemId {
        self.systems.add(system)
    }

    /// Remove a system from the update order.
    pub fn remove_system(&mut self, id: SystemId) -> Option<Box<dyn System>> {
        self.systems.remove(id)
    }

    /// Initialize every system, once, before the first update.
    pub fn initialize(&mut self) {
        self.systems.initialize();
    }
}

impl fmt::Debug for World {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("World")
            .field("live", &self.directory.len())
            .field("pending", &self.pending.len())
            .field("systems", &self.systems)
            .finish()
    }
}
