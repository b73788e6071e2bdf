//! Entity identities and the per-entity component map.
//!
//! An entity is an identity plus at most one component per kind. Entities
//! are created freestanding (no world); they only become *live* once an
//! `Add` staged on a [`World`](crate::World) is committed by `process`.

use std::fmt;

use hashbrown::HashMap;

use crate::component::{Component, ComponentKind, ComponentRef, Handle};

/// Identity of an entity.
///
/// Identities are assigned by whoever owns the entity's lifecycle (the
/// battlefield scene, in the gameplay sample) and must be unique among the
/// entities concurrently live in one world.
#[derive(Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct EntityId(u64);

impl EntityId {
    /// Create an identity from a raw value.
    #[must_use]
    pub const fn new(id: u64) -> Self {
        Self(id)
    }

    /// Get the raw identity value.
    #[must_use]
    pub const fn raw(self) -> u64 {
        self.0
    }
}

impl fmt::Debug for EntityId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "EntityId({})", self.0)
    }
}

impl fmt::Display for EntityId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// An identity plus its attached components, at most one per kind.
///
/// The entity owns its components outright; the `owner` field carried by
/// each [`ComponentRef`] is a back-reference, never an ownership edge.
pub struct Entity {
    id: EntityId,
    components: HashMap<ComponentKind, ComponentRef>,
}

impl Entity {
    /// Create a detached entity with the given identity.
    #[must_use]
    pub fn new(id: EntityId) -> Self {
        Self {
            id,
            components: HashMap::new(),
        }
    }

    /// Get the entity's identity.
    #[must_use]
    pub const fn id(&self) -> EntityId {
        self.id
    }

    /// Reassign the entity's identity, rewriting the owner back-reference
    /// on every attached component.
    ///
    /// Only meaningful while the entity is detached: systems holding
    /// component refs for a live entity would keep the stale owner.
    pub fn set_id(&mut self, id: EntityId) {
        self.id = id;
        for component in self.components.values_mut() {
            component.set_owner(id);
        }
    }

    /// Attach a component, displacing any existing component of the same
    /// kind. Returns the displaced component, if any.
    ///
    /// Attaching directly on the entity has local effect only; for a live
    /// entity, go through [`World::attach`](crate::World::attach) so
    /// interested systems see the change.
    pub fn attach<C: Component>(&mut self, component: C) -> Option<ComponentRef> {
        let component = ComponentRef::new(self.id, component);
        self.components.insert(component.kind(), component)
    }

    /// Detach the component of the given kind, if attached.
    pub fn detach(&mut self, kind: ComponentKind) -> Option<ComponentRef> {
        self.components.remove(&kind)
    }

    /// Get the attached component of the given kind.
    #[must_use]
    pub fn component(&self, kind: ComponentKind) -> Option<&ComponentRef> {
        self.components.get(&kind)
    }

    /// Get a typed handle to the attached component of kind `C`.
    #[must_use]
    pub fn get<C: Component>(&self) -> Option<Handle<C>> {
        self.components
            .get(&ComponentKind::of::<C>())
            .and_then(ComponentRef::handle)
    }

    /// Check whether a component of the given kind is attached.
    #[must_use]
    pub fn has(&self, kind: ComponentKind) -> bool {
        self.components.contains_key(&kind)
    }

    /// Iterate over the attached components.
    pub fn components(&self) -> impl Iterator<Item = &ComponentRef> {
        self.components.values()
    }

    /// Iterate over the attached component kinds.
    pub fn kinds(&self) -> impl Iterator<Item = ComponentKind> + '_ {
        self.components.keys().copied()
    }

    /// Get the number of attached components.
    #[must_use]
    pub fn len(&self) -> usize {
        self.components.len()
    }

    /// Check whether the entity has no components.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.components.is_empty()
    }
}

impl fmt::Debug for Entity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Entity")
            .field("id", &self.id)
            .field("components", &self.components.len())
            .finish()
    }
}
