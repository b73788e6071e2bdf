//! Entity directories: pluggable registries of live entities.
//!
//! A directory owns the entities that are live in a world. It is only
//! touched from [`World::process`](crate::World::process) — additions and
//! removals staged on the world reach the directory at commit time, never
//! mid-iteration.

use rustc_hash::FxHashMap;

use crate::entity::{Entity, EntityId};

/// Registry of live entities, keyed by identity.
///
/// Implementations may keep additional partitions over any derived key for
/// specialized iteration, as long as `get` stays correct for every live
/// entity.
pub trait EntityDirectory: Send {
    /// Called when an entity becomes live. The directory takes ownership.
    fn added(&mut self, entity: Entity);

    /// Called when a live entity is removed. Returns the entity, handing
    /// ownership back to the world.
    fn removed(&mut self, id: EntityId) -> Option<Entity>;

    /// Look up a live entity by identity.
    fn get(&self, id: EntityId) -> Option<&Entity>;

    /// Look up a live entity mutably.
    fn get_mut(&mut self, id: EntityId) -> Option<&mut Entity>;

    /// Number of live entities.
    fn len(&self) -> usize;

    /// Check whether no entities are live.
    fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Check whether an identity is live.
    fn contains(&self, id: EntityId) -> bool {
        self.get(id).is_some()
    }
}

/// Default directory: a flat identity-indexed map, O(1) lookup.
#[derive(Default)]
pub struct IdentityDirectory {
    entities: FxHashMap<EntityId, Entity>,
}

impl IdentityDirectory {
    /// Create an empty directory.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Iterate over the live entities.
    pub fn iter(&self) -> impl Iterator<Item = &Entity> {
        self.entities.values()
    }
}

impl EntityDirectory for IdentityDirectory {
    fn added(&mut self, entity: Entity) {
        self.entities.insert(entity.id(), entity);
    }

    fn removed(&mut self, id: EntityId) -> Option<Entity> {
        self.entities.remove(&id)
    }

    fn get(&self, id: EntityId) -> Option<&Entity> {
        self.entities.get(&id)
    }

    fn get_mut(&mut self, id: EntityId) -> Option<&mut Entity> {
        self.entities.get_mut(&id)
    }

    fn len(&self) -> usize {
        self.entities.len()
    }
}
