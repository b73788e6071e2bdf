//! Integration tests for skirmish-game
//!
//! Exercises the full stack through public APIs only: world commits,
//! mediator dispatch, and the battlefield turn loop.

use std::sync::Arc;
use std::time::Duration;

use parking_lot::Mutex;
use rand::SeedableRng;
use rand::rngs::SmallRng;
use skirmish_ecs::{ComponentKind, Entity, EntityId, World};
use skirmish_event::{EventError, Mediator, Message};
use skirmish_game::prelude::*;
use skirmish_game::ParityDirectory;

const STEP: Duration = Duration::from_millis(600);

// ============================================================================
// Helpers
// ============================================================================

fn soldier(id: u64) -> Entity {
    let mut entity = Entity::new(EntityId::new(id));
    entity.attach(HealthComponent::default());
    entity.attach(ShieldComponent::default());
    entity
}

fn collect_messages(mediator: &Mediator, events: &GameEvents) -> Arc<Mutex<Vec<String>>> {
    let lines = Arc::new(Mutex::new(Vec::new()));
    let sink = lines.clone();
    mediator.observe(events.show_message.clone(), move |message: &Message| {
        let info: &MessageInfo = message
            .payload()
            .ok_or_else(|| EventError::BadPayload("show-message".into()))?;
        sink.lock().push(info.text.clone());
        Ok(())
    });
    lines
}

// ============================================================================
// World + systems, wired by hand
// ============================================================================

#[test]
fn test_poison_damage_flows_through_health() {
    let mediator = Mediator::new();
    let events = GameEvents::new();

    let mut world = World::new();
    world.add_system(HealthSystem::new(mediator.clone(), events.clone()));
    world.add_system(PoisonSystem::with_rng(
        mediator.clone(),
        events.clone(),
        SmallRng::seed_from_u64(42),
    ));
    world.initialize();

    let mut target = soldier(0);
    target.attach(PoisonComponent::default());
    world.add(target).unwrap();
    world.process();

    let health = world.component::<HealthComponent>(EntityId::new(0)).unwrap();
    assert_eq!(health.read().life, HealthComponent::MAX_LIFE);

    // One poison interval: the tick queues damage, dispatch applies it.
    world.update(PoisonComponent::DEFAULT_FREQUENCY);
    mediator.tick(usize::MAX);

    let life = health.read().life;
    assert!(life < HealthComponent::MAX_LIFE);
    assert!(life >= HealthComponent::MAX_LIFE - PoisonComponent::DEFAULT_MAX_DAMAGE);
}

#[test]
fn test_damage_narration_order() {
    let mediator = Mediator::new();
    let events = GameEvents::new();
    let lines = collect_messages(&mediator, &events);

    let mut world = World::new();
    world.add_system(HealthSystem::new(mediator.clone(), events.clone()));
    world.initialize();

    world.add(soldier(0)).unwrap();
    world.process();
    world
        .component::<ShieldComponent>(EntityId::new(0))
        .unwrap()
        .write()
        .activated = true;

    mediator.queue(Message::new(
        events.damage.clone(),
        DamageInfo {
            target: EntityId::new(0),
            amount: 40,
        },
    ));
    mediator.tick(usize::MAX);

    let lines = lines.lock();
    assert_eq!(
        *lines,
        vec![
            "The soldier 0 received 40 damage".to_owned(),
            "The shield has absorbed 40 damage, 110 power remaining".to_owned(),
            "0 point of life lost, 100 point of life remaining".to_owned(),
        ]
    );
}

#[test]
fn test_mid_dispatch_structural_change_is_deferred() {
    let mediator = Mediator::new();
    let events = GameEvents::new();

    let mut world = World::new();
    world.add_system(HealthSystem::new(mediator.clone(), events.clone()));
    world.initialize();

    world.add(soldier(0)).unwrap();
    world.process();

    // Kill, then check the world still holds the soldier until the scene
    // decides to commit a removal.
    mediator.queue(Message::new(
        events.damage.clone(),
        DamageInfo {
            target: EntityId::new(0),
            amount: 200,
        },
    ));
    mediator.tick(usize::MAX);

    assert!(world.entity(EntityId::new(0)).is_some());
    world.remove(EntityId::new(0)).unwrap();
    let commit = world.process();
    assert_eq!(commit.removed.len(), 1);
}

#[test]
fn test_parity_directory_under_a_world() {
    let mediator = Mediator::new();
    let events = GameEvents::new();

    let mut world = World::with_directory(ParityDirectory::new());
    world.add_system(HealthSystem::new(mediator.clone(), events.clone()));
    world.initialize();

    for id in 0..4 {
        world.add(soldier(id)).unwrap();
    }
    world.process();

    // Lookup and damage behave the same as with the default directory.
    mediator.queue(Message::new(
        events.damage.clone(),
        DamageInfo {
            target: EntityId::new(3),
            amount: 25,
        },
    ));
    mediator.tick(usize::MAX);

    let health = world.component::<HealthComponent>(EntityId::new(3)).unwrap();
    assert_eq!(health.read().life, 75);
    assert_eq!(world.entity_count(), 4);
}

// ============================================================================
// Battlefield scene
// ============================================================================

#[test]
fn test_kill_order_is_fifo() {
    let mut scene = Battlefield::with_capacity(3);
    for _ in 0..3 {
        scene.update(STEP, Some(Action::Spawn));
    }
    assert_eq!(scene.world().entity_count(), 3);

    let mut fallen = Vec::new();
    for _ in 0..3 {
        let target = scene.current_id();
        while scene.current_id() == target {
            scene.update(STEP, Some(Action::Hit));
        }
        fallen.push(target);
    }

    assert_eq!(
        fallen,
        vec![EntityId::new(0), EntityId::new(1), EntityId::new(2)]
    );
    assert_eq!(scene.world().entity_count(), 0);
    assert_eq!(scene.pool_len(), 3);
}

#[test]
fn test_ids_never_recycle() {
    let mut scene = Battlefield::with_capacity(1);
    let mut seen = Vec::new();

    for _ in 0..3 {
        scene.update(STEP, Some(Action::Spawn));
        let id = scene.current_id();
        seen.push(id);
        while scene.current_id() == id {
            scene.update(STEP, Some(Action::Hit));
        }
    }

    assert_eq!(
        seen,
        vec![EntityId::new(0), EntityId::new(1), EntityId::new(2)]
    );
}

#[test]
fn test_actions_only_touch_the_oldest() {
    let mut scene = Battlefield::with_capacity(2);
    scene.update(STEP, Some(Action::Spawn));
    scene.update(STEP, Some(Action::Spawn));

    scene.update(STEP, Some(Action::Hit));

    let first = scene
        .world()
        .component::<HealthComponent>(EntityId::new(0))
        .unwrap();
    let second = scene
        .world()
        .component::<HealthComponent>(EntityId::new(1))
        .unwrap();
    assert_eq!(first.read().life, 90);
    assert_eq!(second.read().life, HealthComponent::MAX_LIFE);

    scene.update(STEP, Some(Action::PoisonOn));
    assert!(
        scene
            .world()
            .entity(EntityId::new(0))
            .unwrap()
            .has(ComponentKind::of::<PoisonComponent>())
    );
    assert!(
        !scene
            .world()
            .entity(EntityId::new(1))
            .unwrap()
            .has(ComponentKind::of::<PoisonComponent>())
    );
}
