//! Component kinds, shared component cells, and typed handles.
//!
//! A component is a plain data record owned by exactly one entity. Kinds
//! are identified by Rust type: every concrete component type is one kind,
//! and user code adds new kinds without touching this crate.

use std::any::{Any, TypeId};
use std::fmt;
use std::hash::{Hash, Hasher};
use std::marker::PhantomData;
use std::sync::Arc;

use parking_lot::{
    MappedRwLockReadGuard, MappedRwLockWriteGuard, RwLock, RwLockReadGuard, RwLockWriteGuard,
};

use crate::entity::EntityId;

/// Marker trait for types usable as components.
///
/// Blanket-implemented for every `Any + Send + Sync` type; defining a new
/// component kind is just defining a new type.
pub trait Component: Any + Send + Sync {
    /// Upcast to `Any` for downcasting to the concrete type.
    fn as_any(&self) -> &dyn Any;

    /// Mutable upcast to `Any`.
    fn as_any_mut(&mut self) -> &mut dyn Any;
}

impl<T: Any + Send + Sync> Component for T {
    fn as_any(&self) -> &dyn Any {
        self
    }

    fn as_any_mut(&mut self) -> &mut dyn Any {
        self
    }
}

/// Identifier of a component kind — one kind per concrete component type.
///
/// Equality and hashing use the underlying `TypeId` only; the captured type
/// name is carried for diagnostics.
#[derive(Clone, Copy)]
pub struct ComponentKind {
    type_id: TypeId,
    name: &'static str,
}

impl ComponentKind {
    /// Get the kind for a concrete component type.
    #[must_use]
    pub fn of<C: Component>() -> Self {
        Self {
            type_id: TypeId::of::<C>(),
            name: std::any::type_name::<C>(),
        }
    }

    /// Get the component type name (for diagnostics only).
    #[must_use]
    pub const fn name(self) -> &'static str {
        self.name
    }
}

impl PartialEq for ComponentKind {
    fn eq(&self, other: &Self) -> bool {
        self.type_id == other.type_id
    }
}

impl Eq for ComponentKind {}

impl Hash for ComponentKind {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.type_id.hash(state);
    }
}

impl fmt::Debug for ComponentKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "ComponentKind({})", self.name)
    }
}

/// Shared component cell.
type ComponentCell = Arc<RwLock<dyn Component>>;

/// A component attached to an entity: the shared data cell plus the kind
/// and the owning entity's identity.
///
/// Clones share the same cell; systems keep clones of the refs they were
/// registered with. The owner field is a plain identity, not an ownership
/// edge — the entity owns the component, the ref only points back.
#[derive(Clone)]
pub struct ComponentRef {
    owner: EntityId,
    kind: ComponentKind,
    cell: ComponentCell,
}

impl ComponentRef {
    /// Wrap a component value for attachment to the given owner.
    #[must_use]
    pub fn new<C: Component>(owner: EntityId, component: C) -> Self {
        Self {
            owner,
            kind: ComponentKind::of::<C>(),
            cell: Arc::new(RwLock::new(component)),
        }
    }

    /// Identity of the owning entity.
    #[must_use]
    pub const fn owner(&self) -> EntityId {
        self.owner
    }

    /// Kind of the underlying component.
    #[must_use]
    pub const fn kind(&self) -> ComponentKind {
        self.kind
    }

    /// Check whether the underlying component is of type `C`.
    #[must_use]
    pub fn is<C: Component>(&self) -> bool {
        self.kind == ComponentKind::of::<C>()
    }

    /// Get a typed handle, or `None` if the component is not a `C`.
    #[must_use]
    pub fn handle<C: Component>(&self) -> Option<Handle<C>> {
        self.is::<C>().then(|| Handle {
            raw: self.clone(),
            _marker: PhantomData,
        })
    }

    /// Check whether two refs share the same component cell.
    #[must_use]
    pub fn same_cell(&self, other: &Self) -> bool {
        Arc::ptr_eq(&self.cell, &other.cell)
    }

    pub(crate) fn set_owner(&mut self, owner: EntityId) {
        self.owner = owner;
    }
}

impl fmt::Debug for ComponentRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ComponentRef")
            .field("owner", &self.owner)
            .field("kind", &self.kind)
            .finish_non_exhaustive()
    }
}

/// Typed view over a [`ComponentRef`].
///
/// The concrete type is checked once at construction, so `read`/`write`
/// can hand out guards for `C` directly.
pub struct Handle<C: Component> {
    raw: ComponentRef,
    _marker: PhantomData<fn() -> C>,
}

impl<C: Component> Handle<C> {
    /// Identity of the owning entity.
    #[must_use]
    pub const fn owner(&self) -> EntityId {
        self.raw.owner()
    }

    /// The untyped ref backing this handle.
    #[must_use]
    pub const fn raw(&self) -> &ComponentRef {
        &self.raw
    }

    /// Lock the component for reading.
    #[must_use]
    pub fn read(&self) -> MappedRwLockReadGuard<'_, C> {
        RwLockReadGuard::map(self.raw.cell.read(), |component| {
            // Type checked when the handle was created.
            component.as_any().downcast_ref::<C>().unwrap()
        })
    }

    /// Lock the component for writing.
    #[must_use]
    pub fn write(&self) -> MappedRwLockWriteGuard<'_, C> {
        RwLockWriteGuard::map(self.raw.cell.write(), |component| {
            component.as_any_mut().downcast_mut::<C>().unwrap()
        })
    }
}

impl<C: Component> Clone for Handle<C> {
    fn clone(&self) -> Self {
        Self {
            raw: self.raw.clone(),
            _marker: PhantomData,
        }
    }
}

impl<C: Component> fmt::Debug for Handle<C> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Handle")
            .field("owner", &self.raw.owner)
            .field("kind", &self.raw.kind)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct Health {
        life: i32,
    }

    struct Shield {
        power: i32,
    }

    #[test]
    fn test_kind_identity() {
        assert_eq!(ComponentKind::of::<Health>(), ComponentKind::of::<Health>());
        assert_ne!(ComponentKind::of::<Health>(), ComponentKind::of::<Shield>());
    }

    #[test]
    fn test_typed_handle() {
        let component = ComponentRef::new(EntityId::new(3), Health { life: 100 });

        assert!(component.is::<Health>());
        assert!(!component.is::<Shield>());
        assert!(component.handle::<Shield>().is_none());

        let handle = component.handle::<Health>().unwrap();
        assert_eq!(handle.owner(), EntityId::new(3));
        assert_eq!(handle.read().life, 100);

        handle.write().life = 42;
        assert_eq!(handle.read().life, 42);
    }

    #[test]
    fn test_clones_share_cell() {
        let component = ComponentRef::new(EntityId::new(0), Health { life: 100 });
        let clone = component.clone();

        assert!(component.same_cell(&clone));

        clone.handle::<Health>().unwrap().write().life = 1;
        assert_eq!(component.handle::<Health>().unwrap().read().life, 1);
    }

    #[test]
    fn test_distinct_cells() {
        let a = ComponentRef::new(EntityId::new(0), Health { life: 100 });
        let b = ComponentRef::new(EntityId::new(0), Health { life: 100 });
        assert!(!a.same_cell(&b));
    }
}
