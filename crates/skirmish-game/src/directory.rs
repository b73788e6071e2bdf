//! A custom entity directory partitioning soldiers by identity parity.
//!
//! Demonstrates swapping the world's default registry for one with extra
//! iteration structure: even and odd identities live in separate partitions
//! while plain lookup stays correct for every live entity.

use skirmish_ecs::{Entity, EntityDirectory, EntityId};

/// Directory keeping even-id and odd-id entities in separate partitions.
#[derive(Default)]
pub struct ParityDirectory {
    even: Vec<Entity>,
    odd: Vec<Entity>,
}

impl ParityDirectory {
    /// Create an empty directory.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// The even-id partition, in insertion order.
    #[must_use]
    pub fn even(&self) -> &[Entity] {
        &self.even
    }

    /// The odd-id partition, in insertion order.
    #[must_use]
    pub fn odd(&self) -> &[Entity] {
        &self.odd
    }

    fn partition(&self, id: EntityId) -> &Vec<Entity> {
        if id.raw() % 2 == 0 { &self.even } else { &self.odd }
    }

    fn partition_mut(&mut self, id: EntityId) -> &mut Vec<Entity> {
        if id.raw() % 2 == 0 {
            &mut self.even
        } else {
            &mut self.odd
        }
    }
}

impl EntityDirectory for ParityDirectory {
    fn added(&mut self, entity: Entity) {
        self.partition_mut(entity.id()).push(entity);
    }

    fn removed(&mut self, id: EntityId) -> Option<Entity> {
        let partition = self.partition_mut(id);
        let index = partition.iter().position(|entity| entity.id() == id)?;
        Some(partition.remove(index))
    }

    fn get(&self, id: EntityId) -> Option<&Entity> {
        self.partition(id).iter().find(|entity| entity.id() == id)
    }

    fn get_mut(&mut self, id: EntityId) -> Option<&mut Entity> {
        self.partition_mut(id)
            .iter_mut()
            .find(|entity| entity.id() == id)
    }

    fn len(&self) -> usize {
        self.even.len() + self.odd.len()
    }
}
