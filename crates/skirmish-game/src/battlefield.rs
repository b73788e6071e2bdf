//! The battlefield scene: a pooled queue of soldiers driven by player
//! actions.
//!
//! Every action targets the oldest living soldier. Soldiers come from a
//! fixed pool; when one dies it is reset and returned, and the next oldest
//! becomes the target. Identities increase monotonically across respawns,
//! so the pool never reuses an id.

use std::sync::Arc;
use std::time::Duration;

use parking_lot::Mutex;
use skirmish_ecs::{ComponentKind, Entity, EntityId, World};
use skirmish_event::{EventError, Mediator, Message};
use tracing::{info, warn};

use crate::components::{HealthComponent, PoisonComponent, ShieldComponent};
use crate::events::{DamageInfo, DeathInfo, GameEvents, MessageInfo};
use crate::health::HealthSystem;
use crate::poison::PoisonSystem;

/// A player action against the oldest living soldier.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Action {
    /// Take a soldier from the pool and add it to the queue.
    Spawn,
    /// Deal a fixed amount of damage.
    Hit,
    /// Activate the shield.
    ShieldOn,
    /// Disable the shield.
    ShieldOff,
    /// Attach poison. No-op if already poisoned.
    PoisonOn,
    /// Detach poison.
    PoisonOff,
}

/// Scene wiring the world, the systems, and the mediator together.
pub struct Battlefield {
    world: World,
    mediator: Mediator,
    events: GameEvents,
    pool: Vec<Entity>,
    next_id: u64,
    current_id: u64,
    since_trigger: Duration,
    deaths: Arc<Mutex<Vec<EntityId>>>,
}

impl Battlefield {
    /// Soldiers that can be live at the same time.
    pub const SOLDIER_CAP: usize = 10;
    /// Damage of one hit action.
    pub const HIT_DAMAGE: i32 = 10;
    /// Minimum time between two accepted actions.
    pub const TRIGGER_DELAY: Duration = Duration::from_millis(550);

    /// Build a scene with the default pool size.
    #[must_use]
    pub fn new() -> Self {
        Self::with_capacity(Self::SOLDIER_CAP)
    }

    /// Build a scene with a custom pool size.
    #[must_use]
    pub fn with_capacity(capacity: usize) -> Self {
        let mediator = Mediator::new();
        let events = GameEvents::new();

        let mut world = World::new();
        world.add_system(HealthSystem::new(mediator.clone(), events.clone()));
        world.add_system(PoisonSystem::new(mediator.clone(), events.clone()));
        world.initialize();

        let pool = (0..capacity)
            .map(|_| {
                let mut soldier = Entity::new(EntityId::new(0));
                soldier.attach(HealthComponent::default());
                soldier.attach(ShieldComponent::default());
                soldier
            })
            .collect();

        // Deaths are recorded during dispatch and reaped after it; removing
        // mid-dispatch would mutate the world while listeners still run.
        let deaths = Arc::new(Mutex::new(Vec::new()));
        let sink = deaths.clone();
        mediator.observe(events.death.clone(), move |message: &Message| {
            let info: &DeathInfo = message
                .payload()
                .ok_or_else(|| EventError::BadPayload("death".into()))?;
            sink.lock().push(info.target);
            Ok(())
        });

        mediator.observe(events.show_message.clone(), |message: &Message| {
            let info: &MessageInfo = message
                .payload()
                .ok_or_else(|| EventError::BadPayload("show-message".into()))?;
            info!("{}", info.text);
            Ok(())
        });

        Self {
            world,
            mediator,
            events,
            pool,
            next_id: 0,
            current_id: 0,
            since_trigger: Duration::ZERO,
            deaths,
        }
    }

    /// Advance the scene by one step.
    ///
    /// The action, if any, is debounced: at least
    /// [`TRIGGER_DELAY`](Self::TRIGGER_DELAY) must pass between two accepted
    /// actions, and a debounced action is dropped, not queued. Then systems
    /// update, queued messages are dispatched to exhaustion, and dead
    /// soldiers are reaped back into the pool.
    pub fn update(&mut self, elapsed: Duration, action: Option<Action>) {
        self.since_trigger = self
            .since_trigger
            .saturating_add(elapsed)
            .min(Self::TRIGGER_DELAY);
        if let Some(action) = action {
            if self.since_trigger >= Self::TRIGGER_DELAY {
                self.apply(action);
                self.since_trigger = Duration::ZERO;
            }
        }

        self.world.update(elapsed);
        self.mediator.tick(usize::MAX);
        if self.reap() > 0 {
            // Flush the death narration queued by the reap step.
            self.mediator.tick(usize::MAX);
        }
    }

    fn apply(&mut self, action: Action) {
        match action {
            Action::Spawn => self.spawn(),
            Action::Hit => self.hit(),
            Action::ShieldOn => self.switch_shield(true),
            Action::ShieldOff => self.switch_shield(false),
            Action::PoisonOn => self.add_poison(),
            Action::PoisonOff => self.remove_poison(),
        }
    }

    fn spawn(&mut self) {
        let Some(mut soldier) = self.pool.pop() else {
            self.say("The queue is full, kill a soldier before trying to add new one");
            return;
        };

        soldier.set_id(EntityId::new(self.next_id));
        self.next_id += 1;

        match self.world.add(soldier) {
            Ok(()) => {
                self.world.process();
                self.say(format!(
                    "The soldier {} is added to the queue...",
                    self.next_id - 1
                ));
            }
            Err(rejected) => {
                warn!(reason = %rejected.reason, "spawn refused");
                self.pool.push(rejected.entity);
            }
        }
    }

    fn hit(&mut self) {
        let Some(id) = self.current() else {
            self.say("No soldiers in the queue, create one first");
            return;
        };

        self.mediator.queue(Message::new(
            self.events.damage.clone(),
            DamageInfo {
                target: id,
                amount: Self::HIT_DAMAGE,
            },
        ));
    }

    fn switch_shield(&mut self, activated: bool) {
        let Some(id) = self.current() else {
            self.say("No soldiers in the queue, create one first");
            return;
        };

        if let Some(shield) = self.world.component::<ShieldComponent>(id) {
            shield.write().activated = activated;
            self.say(if activated {
                "Shield activated"
            } else {
                "Shield disabled"
            });
        }
    }

    fn add_poison(&mut self) {
        let Some(id) = self.current() else {
            self.say("No soldiers in the queue, create one first");
            return;
        };

        let poisoned = self
            .world
            .entity(id)
            .is_some_and(|soldier| soldier.has(ComponentKind::of::<PoisonComponent>()));
        if poisoned {
            return;
        }

        if self.world.attach(id, PoisonComponent::default()).is_ok() {
            self.say(format!("The soldier {} has been poisoned", self.current_id));
        }
    }

    fn remove_poison(&mut self) {
        let Some(id) = self.current() else {
            self.say("No soldiers in the queue, create one first");
            return;
        };

        if self
            .world
            .detach(id, ComponentKind::of::<PoisonComponent>())
            .is_ok()
        {
            self.say(format!(
                "The poison has been removed of the soldier {}",
                self.current_id
            ));
        }
    }

    fn reap(&mut self) -> usize {
        let dead: Vec<EntityId> = std::mem::take(&mut *self.deaths.lock());
        let reaped = dead.len();
        for id in dead {
            self.say(format!("The soldier {id} is dead..."));

            if let Err(error) = self.world.remove(id) {
                warn!(%error, "dead soldier not removable");
                continue;
            }
            let commit = self.world.process();
            for mut soldier in commit.removed {
                Self::reset(&mut soldier);
                self.pool.push(soldier);
            }

            // Ids are handed out in order, so the next oldest soldier has
            // the next id.
            self.current_id += 1;
        }
        reaped
    }

    fn reset(soldier: &mut Entity) {
        if let Some(health) = soldier.get::<HealthComponent>() {
            health.write().life = HealthComponent::MAX_LIFE;
        }
        if let Some(shield) = soldier.get::<ShieldComponent>() {
            shield.write().power = ShieldComponent::MAX_POWER;
        }
        soldier.detach(ComponentKind::of::<PoisonComponent>());
    }

    fn current(&self) -> Option<EntityId> {
        let id = EntityId::new(self.current_id);
        self.world.entity(id).is_some().then_some(id)
    }

    // Scene narration travels the same channel as system narration; the
    // listener registered at construction turns it into log output.
    fn say(&self, text: impl Into<String>) {
        self.mediator.queue(Message::new(
            self.events.show_message.clone(),
            MessageInfo::new(text),
        ));
    }

    /// Identity of the oldest living soldier, whether or not one is live.
    #[must_use]
    pub fn current_id(&self) -> EntityId {
        EntityId::new(self.current_id)
    }

    /// Soldiers waiting in the pool.
    #[must_use]
    pub fn pool_len(&self) -> usize {
        self.pool.len()
    }

    /// The scene's world.
    #[must_use]
    pub fn world(&self) -> &World {
        &self.world
    }

    /// The scene's mediator.
    #[must_use]
    pub fn mediator(&self) -> &Mediator {
        &self.mediator
    }

    /// The scene's event channels.
    #[must_use]
    pub fn events(&self) -> &GameEvents {
        &self.events
    }
}

impl Default for Battlefield {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const STEP: Duration = Duration::from_millis(600);

    fn act(scene: &mut Battlefield, action: Action) {
        scene.update(STEP, Some(action));
    }

    #[test]
    fn test_spawn_from_pool() {
        let mut scene = Battlefield::with_capacity(2);
        assert_eq!(scene.pool_len(), 2);

        act(&mut scene, Action::Spawn);
        assert_eq!(scene.pool_len(), 1);
        assert_eq!(scene.world().entity_count(), 1);
        assert!(scene.world().entity(EntityId::new(0)).is_some());
    }

    #[test]
    fn test_spawn_refused_when_pool_empty() {
        let mut scene = Battlefield::with_capacity(2);
        act(&mut scene, Action::Spawn);
        act(&mut scene, Action::Spawn);
        act(&mut scene, Action::Spawn);

        assert_eq!(scene.pool_len(), 0);
        assert_eq!(scene.world().entity_count(), 2);
    }

    #[test]
    fn test_debounce_drops_early_action() {
        let mut scene = Battlefield::with_capacity(2);

        // 300ms in: below the trigger delay, the action is dropped.
        scene.update(Duration::from_millis(300), Some(Action::Spawn));
        assert_eq!(scene.world().entity_count(), 0);

        // Another 300ms: accumulated time passes the threshold.
        scene.update(Duration::from_millis(300), Some(Action::Spawn));
        assert_eq!(scene.world().entity_count(), 1);

        // Accepted action reset the timer.
        scene.update(Duration::from_millis(100), Some(Action::Spawn));
        assert_eq!(scene.world().entity_count(), 1);
    }

    #[test]
    fn test_hits_kill_and_recycle_in_order() {
        let mut scene = Battlefield::with_capacity(2);
        act(&mut scene, Action::Spawn);
        act(&mut scene, Action::Spawn);
        assert_eq!(scene.current_id(), EntityId::new(0));

        // 100 life, 10 per hit, shield inactive.
        for _ in 0..10 {
            act(&mut scene, Action::Hit);
        }

        // Soldier 0 died and went back to the pool; soldier 1 is next.
        assert_eq!(scene.current_id(), EntityId::new(1));
        assert_eq!(scene.pool_len(), 1);
        assert_eq!(scene.world().entity_count(), 1);
        assert!(scene.world().entity(EntityId::new(0)).is_none());

        // The recycled soldier spawns with a fresh id and full life.
        act(&mut scene, Action::Spawn);
        assert!(scene.world().entity(EntityId::new(2)).is_some());
        let health = scene
            .world()
            .component::<HealthComponent>(EntityId::new(2))
            .unwrap();
        assert_eq!(health.read().life, HealthComponent::MAX_LIFE);
    }

    #[test]
    fn test_narration_travels_the_message_channel() {
        let mut scene = Battlefield::with_capacity(1);
        let lines = Arc::new(Mutex::new(Vec::new()));
        let sink = lines.clone();
        scene.mediator().observe(
            scene.events().show_message.clone(),
            move |message: &Message| {
                let info: &MessageInfo = message
                    .payload()
                    .ok_or_else(|| EventError::BadPayload("show-message".into()))?;
                sink.lock().push(info.text.clone());
                Ok(())
            },
        );

        act(&mut scene, Action::Hit);
        assert!(
            lines
                .lock()
                .iter()
                .any(|line| line == "No soldiers in the queue, create one first")
        );

        act(&mut scene, Action::Spawn);
        assert!(
            lines
                .lock()
                .iter()
                .any(|line| line == "The soldier 0 is added to the queue...")
        );

        for _ in 0..10 {
            act(&mut scene, Action::Hit);
        }
        assert!(
            lines
                .lock()
                .iter()
                .any(|line| line == "The soldier 0 is dead...")
        );
    }

    #[test]
    fn test_hit_with_empty_queue_is_harmless() {
        let mut scene = Battlefield::with_capacity(1);
        act(&mut scene, Action::Hit);
        assert_eq!(scene.world().entity_count(), 0);
    }

    #[test]
    fn test_shield_absorbs_hits() {
        let mut scene = Battlefield::with_capacity(1);
        act(&mut scene, Action::Spawn);
        act(&mut scene, Action::ShieldOn);
        act(&mut scene, Action::Hit);

        let shield = scene
            .world()
            .component::<ShieldComponent>(EntityId::new(0))
            .unwrap();
        assert_eq!(shield.read().power, 140);

        let health = scene
            .world()
            .component::<HealthComponent>(EntityId::new(0))
            .unwrap();
        assert_eq!(health.read().life, HealthComponent::MAX_LIFE);

        act(&mut scene, Action::ShieldOff);
        act(&mut scene, Action::Hit);
        assert_eq!(health.read().life, 90);
        assert_eq!(shield.read().power, 140);
    }

    #[test]
    fn test_poison_attach_detach() {
        let mut scene = Battlefield::with_capacity(1);
        act(&mut scene, Action::Spawn);

        act(&mut scene, Action::PoisonOn);
        let poisoned = scene
            .world()
            .entity(EntityId::new(0))
            .unwrap()
            .has(ComponentKind::of::<PoisonComponent>());
        assert!(poisoned);

        // Second attach is a no-op, not a timer reset.
        act(&mut scene, Action::PoisonOn);

        act(&mut scene, Action::PoisonOff);
        let poisoned = scene
            .world()
            .entity(EntityId::new(0))
            .unwrap()
            .has(ComponentKind::of::<PoisonComponent>());
        assert!(!poisoned);
    }

    #[test]
    fn test_poison_eventually_kills() {
        let mut scene = Battlefield::with_capacity(1);
        act(&mut scene, Action::Spawn);
        act(&mut scene, Action::PoisonOn);

        // Worst case: 1 damage per 4s tick on 100 life.
        for _ in 0..110 {
            scene.update(PoisonComponent::DEFAULT_FREQUENCY, None);
        }

        assert_eq!(scene.world().entity_count(), 0);
        assert_eq!(scene.pool_len(), 1);
        assert_eq!(scene.current_id(), EntityId::new(1));
    }

    #[test]
    fn test_recycled_soldier_is_clean() {
        let mut scene = Battlefield::with_capacity(1);
        act(&mut scene, Action::Spawn);
        act(&mut scene, Action::ShieldOn);
        act(&mut scene, Action::PoisonOn);

        for _ in 0..40 {
            act(&mut scene, Action::Hit);
            if scene.world().entity_count() == 0 {
                break;
            }
        }
        assert_eq!(scene.world().entity_count(), 0);

        act(&mut scene, Action::Spawn);
        let id = scene.current_id();
        let soldier = scene.world().entity(id).unwrap();
        assert!(!soldier.has(ComponentKind::of::<PoisonComponent>()));
        assert_eq!(
            soldier.get::<HealthComponent>().unwrap().read().life,
            HealthComponent::MAX_LIFE
        );
        assert_eq!(
            soldier.get::<ShieldComponent>().unwrap().read().power,
            ShieldComponent::MAX_POWER
        );
    }
}
