//! Health and shield bookkeeping.
//!
//! The system pairs each soldier's health with its optional shield and owns
//! the alive/dead flag. Damage never reaches it through direct calls: it
//! listens on the damage channel, so attackers only need the mediator and
//! the channel token.

use std::sync::Arc;
use std::time::Duration;

use parking_lot::Mutex;
use rustc_hash::FxHashMap;
use skirmish_ecs::{ComponentKind, ComponentRef, EntityId, Handle, System};
use skirmish_event::{EventError, EventKind, Mediator, Message};
use tracing::warn;

use crate::components::{HealthComponent, ShieldComponent};
use crate::events::{DamageInfo, DeathInfo, GameEvents, MessageInfo};

/// Health and shield state of one soldier.
struct HealthRecord {
    dead: bool,
    health: Option<Handle<HealthComponent>>,
    shield: Option<Handle<ShieldComponent>>,
    since_damage: Duration,
}

impl Default for HealthRecord {
    fn default() -> Self {
        // A record exists before its health registers (shields may arrive
        // first); it counts as dead until then.
        Self {
            dead: true,
            health: None,
            shield: None,
            since_damage: Duration::ZERO,
        }
    }
}

/// Outgoing side of the health system: queues notifications, never
/// dispatches them inline.
struct GameBus {
    mediator: Mediator,
    events: GameEvents,
}

impl GameBus {
    fn show(&self, text: String) {
        self.mediator.queue(Message::new(
            self.events.show_message.clone(),
            MessageInfo::new(text),
        ));
    }

    fn death(&self, target: EntityId) {
        self.mediator
            .queue(Message::new(self.events.death.clone(), DeathInfo { target }));
    }
}

struct HealthState {
    records: FxHashMap<EntityId, HealthRecord>,
    bus: GameBus,
}

impl HealthState {
    fn step(&mut self, elapsed: Duration) {
        for (id, record) in &mut self.records {
            if record.dead {
                continue;
            }

            record.since_damage = record.since_damage.saturating_add(elapsed);

            if let Some(shield) = &record.shield {
                let mut shield = shield.write();
                shield.last_regeneration = shield
                    .last_regeneration
                    .saturating_add(elapsed)
                    .min(shield.regeneration_frequency);

                let ready = shield.activated
                    && shield.power < ShieldComponent::MAX_POWER
                    && shield.last_regeneration >= shield.regeneration_frequency
                    && record.since_damage >= shield.regeneration_delay;
                if ready {
                    shield.power =
                        (shield.power + shield.regeneration).min(ShieldComponent::MAX_POWER);
                    shield.last_regeneration = Duration::ZERO;

                    self.bus.show(format!(
                        "The shield of soldier {id} has regenerated {} power",
                        shield.regeneration
                    ));
                }
            }
        }
    }

    fn apply_damage(&mut self, id: EntityId, damage: i32) {
        let Some(record) = self.records.get_mut(&id) else {
            return;
        };
        if record.dead {
            return;
        }

        self.bus
            .show(format!("The soldier {id} received {damage} damage"));

        let mut remaining = damage;
        if let Some(shield) = &record.shield {
            let mut shield = shield.write();
            if shield.activated {
                let diff = shield.power - damage;
                shield.power = diff.max(ShieldComponent::MIN_POWER);
                remaining = if diff < 0 { -diff } else { 0 };

                self.bus.show(format!(
                    "The shield has absorbed {} damage, {} power remaining",
                    damage - remaining,
                    shield.power
                ));
            }
        }

        let Some(health) = &record.health else {
            return;
        };
        let life = {
            let mut health = health.write();
            health.life = (health.life - remaining).max(HealthComponent::MIN_LIFE);
            health.life
        };

        record.since_damage = Duration::ZERO;

        self.bus.show(format!(
            "{remaining} point of life lost, {life} point of life remaining"
        ));

        if life <= HealthComponent::MIN_LIFE {
            record.dead = true;
            self.bus.death(id);
        }
    }
}

/// System tracking every live soldier's health and shield.
pub struct HealthSystem {
    kinds: [ComponentKind; 2],
    mediator: Mediator,
    damage_kind: EventKind,
    state: Arc<Mutex<HealthState>>,
}

impl HealthSystem {
    /// Build the system over a shared mediator and channel bundle.
    #[must_use]
    pub fn new(mediator: Mediator, events: GameEvents) -> Self {
        let damage_kind = events.damage.clone();
        let state = Arc::new(Mutex::new(HealthState {
            records: FxHashMap::default(),
            bus: GameBus {
                mediator: mediator.clone(),
                events,
            },
        }));
        Self {
            kinds: [
                ComponentKind::of::<HealthComponent>(),
                ComponentKind::of::<ShieldComponent>(),
            ],
            mediator,
            damage_kind,
            state,
        }
    }
}

impl System for HealthSystem {
    fn name(&self) -> &str {
        "health"
    }

    fn kinds(&self) -> &[ComponentKind] {
        &self.kinds
    }

    fn initialize(&mut self) {
        // Subscribe to the damage channel; everything dealing damage stays
        // unaware of this system.
        let state = self.state.clone();
        let label = self.damage_kind.label().to_owned();
        self.mediator
            .observe(self.damage_kind.clone(), move |message: &Message| {
                let info: &DamageInfo = message
                    .payload()
                    .ok_or_else(|| EventError::BadPayload(label.clone()))?;
                state.lock().apply_damage(info.target, info.amount);
                Ok(())
            });
    }

    fn update(&mut self, elapsed: Duration) {
        self.state.lock().step(elapsed);
    }

    fn register(&mut self, component: &ComponentRef) {
        let mut state = self.state.lock();
        let record = state.records.entry(component.owner()).or_default();

        if let Some(health) = component.handle::<HealthComponent>() {
            record.dead = false;
            record.health = Some(health);
        } else if let Some(shield) = component.handle::<ShieldComponent>() {
            record.shield = Some(shield);
        } else {
            warn!(kind = component.kind().name(), "unexpected component kind");
        }
    }

    fn unregister(&mut self, component: &ComponentRef) -> bool {
        let mut state = self.state.lock();
        let id = component.owner();

        if component.is::<HealthComponent>() {
            state.records.remove(&id).is_some()
        } else if component.is::<ShieldComponent>() {
            match state.records.get_mut(&id) {
                Some(record) => record.shield.take().is_some(),
                None => false,
            }
        } else {
            false
        }
    }
}
